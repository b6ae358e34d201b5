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

//! Error types for the rendering pipeline
//!
//! Fatal conditions (caller bugs such as out-of-range vertex indices) are
//! reported through [`RasterError`]. Rejected configuration values are not
//! errors: they surface as [`ConfigWarning`] and leave the previous state
//! untouched.

use thiserror::Error;

use super::varyings::AttributeSet;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RasterError>;

/// Fatal pipeline errors
#[derive(Debug, Error)]
pub enum RasterError {
    /// A resolved vertex index points past the bound mesh's vertex count
    #[error("vertex index {index} out of range (mesh has {vertex_count} vertices)")]
    VertexIndexOutOfRange { index: usize, vertex_count: usize },

    /// A draw range reads past the end of the element list
    #[error("element {position} out of range (element count is {len})")]
    ElementOutOfRange { position: usize, len: usize },

    /// Vertices of a single primitive were shaded with different attribute sets
    #[error("varyings schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: AttributeSet,
        found: AttributeSet,
    },

    /// Invalid mesh construction
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Render config could not be parsed
    #[error("failed to parse render config: {0}")]
    Config(#[from] toml::de::Error),

    /// Render config could not be serialized
    #[error("failed to serialize render config: {0}")]
    ConfigSave(#[from] toml::ser::Error),

    /// PNG encoding of a presented frame failed
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),

    /// I/O failure while loading configuration or writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while packing mesh data into a [`MeshBuffer`](super::mesh::MeshBuffer)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("attribute '{name}' must have at least one component")]
    ZeroComponents { name: String },

    #[error("attribute '{name}' has {len} values, not a multiple of {components} components")]
    RaggedAttribute {
        name: String,
        len: usize,
        components: usize,
    },

    #[error("attribute '{name}' has {found} vertices, expected {expected}")]
    VertexCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate attribute '{0}'")]
    DuplicateAttribute(String),
}

/// A rejected configuration value
///
/// The state setter that produced this warning kept its previous value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {setting} value '{value}', keeping previous value")]
pub struct ConfigWarning {
    /// Name of the state being configured (e.g. `depth_func`)
    pub setting: &'static str,
    /// The rejected textual value
    pub value: String,
}

impl ConfigWarning {
    pub fn new(setting: &'static str, value: impl Into<String>) -> Self {
        Self {
            setting,
            value: value.into(),
        }
    }
}
