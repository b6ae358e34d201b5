// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! softraster: a CPU-only rendering pipeline
//!
//! This crate implements the fixed-function back end of a classic
//! rasterizing GPU in software: clipping, primitive assembly with a shaded
//! vertex cache, scanline rasterization with perspective-correct
//! interpolation, depth testing and blending into a packed RGBA8 framebuffer.
//!
//! # Architecture
//!
//! The pipeline is organized into the following modules:
//!
//! - [`core`]: Mesh data, shaders, clipping, rasterization and presentation
//!
//! # Example
//!
//! ```
//! use softraster::core::mesh::MeshBuffer;
//! use softraster::core::renderer::Renderer;
//! use softraster::core::surface::MemorySurface;
//!
//! let mesh = MeshBuffer::builder()
//!     .attribute("position", 3, vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0])
//!     .build()?;
//!
//! let mut renderer = Renderer::new(MemorySurface::new(64, 64));
//! renderer.clear();
//! renderer.render(&mesh)?;
//! let primitives = renderer.flush();
//! assert_eq!(primitives, 1);
//! # Ok::<(), softraster::RasterError>(())
//! ```
//!
//! # Getting Started
//!
//! 1. Build a [`core::mesh::MeshBuffer`] from attribute arrays
//! 2. Create a [`core::renderer::Renderer`] over a [`core::surface::Surface`]
//! 3. Set shaders, uniforms and matrices
//! 4. `clear`, `render` and `flush` once per frame
//!
//! # Modules
//!
//! - [`core::mesh`]: Vertex attribute storage and draw ranges
//! - [`core::varyings`]: Per-vertex shader outputs and interpolation
//! - [`core::shader`]: Shader traits, uniforms, textures, lighting and built-in programs
//! - [`core::clip`]: View volume clipping
//! - [`core::assembler`]: Topology walking and the vertex cache
//! - [`core::raster`]: Scan conversion, depth test, blending and the framebuffer
//! - [`core::renderer`]: High-level front end
//! - [`core::config`]: TOML render state configuration
//!
//! # Error Handling
//!
//! All fallible operations return [`core::error::Result<T>`] which is an alias for
//! `Result<T, RasterError>`. Rejected state values are reported as
//! [`ConfigWarning`] and never abort a frame.

pub mod core;

// Re-export commonly used types
pub use core::error::{ConfigWarning, RasterError, Result};
pub use core::mesh::{MeshBuffer, SubMesh, Topology};
pub use core::raster::Raster;
pub use core::renderer::Renderer;
pub use core::varyings::Varyings;
