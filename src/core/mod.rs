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

//! Core rendering pipeline
//!
//! Data flows through the modules in this order:
//!
//! ```text
//! MeshBuffer ─▶ PrimitiveAssembler ─▶ VertexShader ─▶ Raster ─▶ Surface
//!  (mesh)        (assembler)           (shader)        │          (surface)
//!                                                      ├─ clip
//!                                                      ├─ scan conversion
//!                                                      ├─ FragmentShader
//!                                                      └─ depth test / blend
//! ```

pub mod assembler;
pub mod clip;
pub mod config;
pub mod error;
pub mod mesh;
pub mod raster;
pub mod renderer;
pub mod shader;
pub mod surface;
pub mod varyings;
