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

//! Packed mesh buffers
//!
//! A [`MeshBuffer`] is the read-only input of the pipeline: an interleaved
//! vertex array described by an ordered attribute layout, an optional index
//! list and one or more [`SubMesh`] draw ranges.
//!
//! # Layout
//!
//! Attributes are interleaved per vertex in declaration order:
//!
//! ```text
//! | position (3) | color (4) | uv (2) | position (3) | color (4) | uv (2) | ...
//! ```
//!
//! # Identity
//!
//! Every built mesh receives a process-unique id. The primitive assembler uses
//! it to decide whether cached vertex attributes still belong to the bound
//! mesh, so two separately built meshes never share cache entries even when
//! their contents are equal.

mod attributes;

pub use attributes::VertexAttributes;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::error::{MeshError, RasterError, Result};
use super::shader::VertexShader;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Primitive topology of a draw range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Independent triangles: (0,1,2), (3,4,5), ...
    Triangles,
    /// Triangle strip: each new element forms a triangle with the previous two
    TriangleStrip,
    /// Triangle fan: every triangle shares the first element
    TriangleFan,
    /// Independent line segments: (0,1), (2,3), ...
    Lines,
    /// Connected line segments
    LineStrip,
    /// Connected line segments closed back to the first element
    LineLoop,
}

impl Topology {
    /// Canonical GL-style name
    pub fn name(&self) -> &'static str {
        match self {
            Topology::Triangles => "TRIANGLES",
            Topology::TriangleStrip => "TRIANGLE_STRIP",
            Topology::TriangleFan => "TRIANGLE_FAN",
            Topology::Lines => "LINES",
            Topology::LineStrip => "LINE_STRIP",
            Topology::LineLoop => "LINE_LOOP",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRIANGLES" => Ok(Topology::Triangles),
            "TRIANGLE_STRIP" => Ok(Topology::TriangleStrip),
            "TRIANGLE_FAN" => Ok(Topology::TriangleFan),
            "LINES" => Ok(Topology::Lines),
            "LINE_STRIP" => Ok(Topology::LineStrip),
            "LINE_LOOP" => Ok(Topology::LineLoop),
            _ => Err(format!("unknown topology '{}'", s)),
        }
    }
}

/// A draw range over the mesh's element list
///
/// A submesh may carry its own vertex shader. Without one, the renderer's
/// current vertex shader is used.
#[derive(Clone)]
pub struct SubMesh {
    /// First element
    pub offset: usize,
    /// Number of elements
    pub count: usize,
    pub topology: Topology,
    /// Vertex shader override for this range
    pub vertex_shader: Option<Arc<dyn VertexShader>>,
}

impl SubMesh {
    pub fn new(offset: usize, count: usize, topology: Topology) -> Self {
        Self {
            offset,
            count,
            topology,
            vertex_shader: None,
        }
    }

    /// Shade this range with `shader` instead of the renderer's
    pub fn with_vertex_shader(mut self, shader: impl VertexShader + 'static) -> Self {
        self.vertex_shader = Some(Arc::new(shader));
        self
    }
}

impl fmt::Debug for SubMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubMesh")
            .field("offset", &self.offset)
            .field("count", &self.count)
            .field("topology", &self.topology)
            .field("vertex_shader", &self.vertex_shader.is_some())
            .finish()
    }
}

/// Ranges compare by value, shader overrides by identity
impl PartialEq for SubMesh {
    fn eq(&self, other: &Self) -> bool {
        let same_shader = match (&self.vertex_shader, &other.vertex_shader) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.offset == other.offset
            && self.count == other.count
            && self.topology == other.topology
            && same_shader
    }
}

/// Name, width and interleaved offset of one vertex attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub name: String,
    /// Number of f32 components per vertex
    pub components: usize,
    /// Offset of the first component within a vertex record
    pub offset: usize,
}

/// Immutable, interleaved mesh data handed to the renderer
///
/// # Examples
///
/// ```
/// use softraster::core::mesh::{MeshBuffer, Topology};
///
/// let mesh = MeshBuffer::builder()
///     .attribute("position", 3, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
///     .attribute("uv", 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0])
///     .build()
///     .unwrap();
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.sub_meshes()[0].topology, Topology::Triangles);
/// ```
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    id: u64,
    indices: Option<Vec<u32>>,
    layout: Arc<[AttributeDescriptor]>,
    data: Vec<f32>,
    stride: usize,
    vertex_count: usize,
    sub_meshes: Vec<SubMesh>,
}

impl MeshBuffer {
    /// Start building a mesh
    pub fn builder() -> MeshBuilder {
        MeshBuilder::default()
    }

    /// Process-unique identity of this mesh
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn layout(&self) -> &[AttributeDescriptor] {
        &self.layout
    }

    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    /// Number of addressable elements: the index count, or the vertex count
    /// when the mesh has no index buffer
    pub fn element_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.vertex_count,
        }
    }

    /// Resolve an element position to a vertex index
    ///
    /// Applies the index buffer when present; otherwise the position is the
    /// vertex index.
    pub fn resolve_index(&self, position: usize) -> Result<usize> {
        let len = self.element_count();
        if position >= len {
            return Err(RasterError::ElementOutOfRange { position, len });
        }
        Ok(match &self.indices {
            Some(indices) => indices[position] as usize,
            None => position,
        })
    }

    /// Copy the attributes of one vertex into `out`
    ///
    /// `out` is re-targeted at this mesh's layout; its storage is reused.
    pub fn read_vertex(&self, index: usize, out: &mut VertexAttributes) -> Result<()> {
        if index >= self.vertex_count {
            return Err(RasterError::VertexIndexOutOfRange {
                index,
                vertex_count: self.vertex_count,
            });
        }
        let start = index * self.stride;
        out.assign(&self.layout, &self.data[start..start + self.stride]);
        Ok(())
    }
}

/// Builder for [`MeshBuffer`]
#[derive(Debug, Default)]
pub struct MeshBuilder {
    attributes: Vec<(String, usize, Vec<f32>)>,
    indices: Option<Vec<u32>>,
    sub_meshes: Vec<SubMesh>,
}

impl MeshBuilder {
    /// Add a named attribute with `components` floats per vertex
    pub fn attribute(mut self, name: impl Into<String>, components: usize, values: Vec<f32>) -> Self {
        self.attributes.push((name.into(), components, values));
        self
    }

    pub fn indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn sub_mesh(mut self, sub_mesh: SubMesh) -> Self {
        self.sub_meshes.push(sub_mesh);
        self
    }

    /// Validate and interleave the attribute arrays
    ///
    /// Without explicit submeshes a single TRIANGLES range over every element
    /// is added.
    pub fn build(self) -> std::result::Result<MeshBuffer, MeshError> {
        let mut layout = Vec::with_capacity(self.attributes.len());
        let mut stride = 0;
        let mut vertex_count: Option<usize> = None;

        for (name, components, values) in &self.attributes {
            if *components == 0 {
                return Err(MeshError::ZeroComponents { name: name.clone() });
            }
            if values.len() % components != 0 {
                return Err(MeshError::RaggedAttribute {
                    name: name.clone(),
                    len: values.len(),
                    components: *components,
                });
            }
            if layout.iter().any(|d: &AttributeDescriptor| &d.name == name) {
                return Err(MeshError::DuplicateAttribute(name.clone()));
            }

            let count = values.len() / components;
            match vertex_count {
                None => vertex_count = Some(count),
                Some(expected) if expected != count => {
                    return Err(MeshError::VertexCountMismatch {
                        name: name.clone(),
                        expected,
                        found: count,
                    });
                }
                Some(_) => {}
            }

            layout.push(AttributeDescriptor {
                name: name.clone(),
                components: *components,
                offset: stride,
            });
            stride += components;
        }

        let vertex_count = vertex_count.unwrap_or(0);
        let mut data = Vec::with_capacity(vertex_count * stride);
        for vertex in 0..vertex_count {
            for (_, components, values) in &self.attributes {
                let start = vertex * components;
                data.extend(
                    values[start..start + components]
                        .iter()
                        .map(|v| if v.is_finite() { *v } else { 0.0 }),
                );
            }
        }

        let mut sub_meshes = self.sub_meshes;
        if sub_meshes.is_empty() {
            let count = self
                .indices
                .as_ref()
                .map_or(vertex_count, |indices| indices.len());
            sub_meshes.push(SubMesh::new(0, count, Topology::Triangles));
        }

        Ok(MeshBuffer {
            id: NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed),
            indices: self.indices,
            layout: layout.into(),
            data,
            stride,
            vertex_count,
            sub_meshes,
        })
    }
}
