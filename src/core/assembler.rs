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

//! Primitive assembly with a shaded-vertex cache
//!
//! The assembler walks a draw range of a [`MeshBuffer`], resolves each
//! element to a vertex index, shades the vertex and forwards lines or
//! triangles to the [`Raster`].
//!
//! # Vertex Cache
//!
//! Every vertex index owns one cache slot holding its raw attributes and its
//! shaded [`Varyings`]. Slots are never cleared. Two counters decide when a
//! slot is stale:
//!
//! - the attribute generation, bumped when a different mesh is bound; a
//!   slot from an older generation re-reads its attributes (and re-shades)
//! - the render generation, bumped once per draw call; a slot from an older
//!   generation re-runs the vertex shader
//!
//! Within one draw call each vertex is therefore shaded exactly once, no
//! matter how many primitives share it.
//!
//! # Topologies
//!
//! | topology         | primitive `i`                                   |
//! |------------------|-------------------------------------------------|
//! | `Triangles`      | `(3i, 3i+1, 3i+2)`                              |
//! | `TriangleStrip`  | even `i`: `(i, i+1, i+2)`, odd: `(i+1, i, i+2)` |
//! | `TriangleFan`    | `(0, i+1, i+2)`                                 |
//! | `Lines`          | `(2i, 2i+1)`                                    |
//! | `LineStrip`      | `(i, i+1)`                                      |
//! | `LineLoop`       | `(i, (i+1) mod count)`                          |
//!
//! All positions are relative to the draw range offset.

use super::error::{RasterError, Result};
use super::mesh::{MeshBuffer, SubMesh, Topology, VertexAttributes};
use super::raster::Raster;
use super::shader::{Uniforms, VertexShader};
use super::varyings::Varyings;

/// One cached vertex
#[derive(Debug, Default)]
struct CacheEntry {
    attrs_generation: u64,
    render_generation: u64,
    attrs: VertexAttributes,
    varyings: Varyings,
}

/// Turns mesh draw ranges into shaded primitives
///
/// # Examples
///
/// ```
/// use softraster::core::assembler::PrimitiveAssembler;
/// use softraster::core::mesh::MeshBuffer;
/// use softraster::core::raster::Raster;
/// use softraster::core::shader::{builtin, Uniforms};
///
/// let mesh = MeshBuffer::builder()
///     .attribute("position", 3, vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0])
///     .build()?;
///
/// let mut raster = Raster::new(16, 16);
/// let mut assembler = PrimitiveAssembler::new();
/// let uniforms = Uniforms::default();
///
/// let mut bound = assembler.load_buffer(&mesh);
/// bound.triangles(0, 3, &uniforms, &builtin::default_vertex, &mut raster)?;
/// assert_eq!(raster.primitive_count(), 1);
/// # Ok::<(), softraster::RasterError>(())
/// ```
#[derive(Debug)]
pub struct PrimitiveAssembler {
    cache: Vec<Option<CacheEntry>>,
    attrs_generation: u64,
    render_generation: u64,
    bound_mesh: Option<u64>,
}

impl Default for PrimitiveAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimitiveAssembler {
    pub fn new() -> Self {
        Self {
            cache: Vec::new(),
            // Fresh slots start at generation 0, so both counters start above it
            attrs_generation: 1,
            render_generation: 1,
            bound_mesh: None,
        }
    }

    /// Bind a mesh for the following draws
    ///
    /// Binding a different mesh invalidates every cached attribute record.
    /// The cache grows to the mesh's vertex count and never shrinks.
    pub fn load_buffer<'a, 'm>(&'a mut self, mesh: &'m MeshBuffer) -> BoundMesh<'a, 'm> {
        if self.bound_mesh != Some(mesh.id()) {
            self.attrs_generation += 1;
            self.bound_mesh = Some(mesh.id());
            log::debug!(
                "Bound mesh {} ({} vertices), attribute generation {}",
                mesh.id(),
                mesh.vertex_count(),
                self.attrs_generation
            );
        }
        if self.cache.len() < mesh.vertex_count() {
            self.cache.resize_with(mesh.vertex_count(), || None);
        }
        BoundMesh {
            assembler: self,
            mesh,
        }
    }

    /// Number of cache slots allocated so far
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn attrs_generation(&self) -> u64 {
        self.attrs_generation
    }

    pub fn render_generation(&self) -> u64 {
        self.render_generation
    }
}

/// An assembler with a mesh bound to it
pub struct BoundMesh<'a, 'm> {
    assembler: &'a mut PrimitiveAssembler,
    mesh: &'m MeshBuffer,
}

impl<'m> BoundMesh<'_, 'm> {
    pub fn mesh(&self) -> &'m MeshBuffer {
        self.mesh
    }

    /// Shaded varyings of vertex `index`
    ///
    /// Returns the cached record when it is current; otherwise re-reads the
    /// attributes and/or re-runs `shader`. The shader always starts from a
    /// zeroed record.
    ///
    /// # Errors
    ///
    /// [`RasterError::VertexIndexOutOfRange`] when `index` is not a vertex of
    /// the bound mesh.
    pub fn get_vertex(
        &mut self,
        index: usize,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
    ) -> Result<&Varyings> {
        let vertex_count = self.mesh.vertex_count();
        let assembler = &mut *self.assembler;
        let slot = assembler
            .cache
            .get_mut(index)
            .filter(|_| index < vertex_count)
            .ok_or(RasterError::VertexIndexOutOfRange {
                index,
                vertex_count,
            })?;
        let entry = slot.get_or_insert_with(CacheEntry::default);

        let refetch = entry.attrs_generation != assembler.attrs_generation;
        if refetch {
            self.mesh.read_vertex(index, &mut entry.attrs)?;
            entry.attrs_generation = assembler.attrs_generation;
        }

        if refetch || entry.render_generation != assembler.render_generation {
            entry.varyings = Varyings::default();
            shader.shade(&mut entry.varyings, &entry.attrs, uniforms);
            entry.render_generation = assembler.render_generation;
        }

        Ok(&entry.varyings)
    }

    /// Shaded varyings of the element at `position` in the draw order
    fn element(&mut self, position: usize, uniforms: &Uniforms, shader: &dyn VertexShader) -> Result<Varyings> {
        let index = self.mesh.resolve_index(position)?;
        self.get_vertex(index, uniforms, shader).copied()
    }

    /// Start a new draw call: every vertex is re-shaded on first use
    fn begin_draw(&mut self, topology: Topology, offset: usize, count: usize) {
        self.assembler.render_generation += 1;
        log::trace!(
            "Draw {} offset={} count={} (render generation {})",
            topology,
            offset,
            count,
            self.assembler.render_generation
        );
    }

    fn triangle(
        &mut self,
        [a, b, c]: [usize; 3],
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        let v0 = self.element(a, uniforms, shader)?;
        let v1 = self.element(b, uniforms, shader)?;
        let v2 = self.element(c, uniforms, shader)?;
        raster.raster_triangle(&v0, &v1, &v2, uniforms)
    }

    fn line(
        &mut self,
        [a, b]: [usize; 2],
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        let v0 = self.element(a, uniforms, shader)?;
        let v1 = self.element(b, uniforms, shader)?;
        raster.raster_line(&v0, &v1, uniforms)
    }

    /// Independent triangles; a trailing partial triangle is ignored
    pub fn triangles(
        &mut self,
        offset: usize,
        count: usize,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        self.begin_draw(Topology::Triangles, offset, count);
        for i in (0..count / 3).map(|p| offset + p * 3) {
            self.triangle([i, i + 1, i + 2], uniforms, shader, raster)?;
        }
        Ok(())
    }

    /// Triangle strip; odd triangles swap their first two vertices to keep
    /// a consistent winding
    pub fn triangle_strip(
        &mut self,
        offset: usize,
        count: usize,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        self.begin_draw(Topology::TriangleStrip, offset, count);
        for i in 0..count.saturating_sub(2) {
            let base = offset + i;
            let elements = if i % 2 == 0 {
                [base, base + 1, base + 2]
            } else {
                [base + 1, base, base + 2]
            };
            self.triangle(elements, uniforms, shader, raster)?;
        }
        Ok(())
    }

    pub fn triangle_fan(
        &mut self,
        offset: usize,
        count: usize,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        self.begin_draw(Topology::TriangleFan, offset, count);
        for i in 1..count.saturating_sub(1) {
            self.triangle([offset, offset + i, offset + i + 1], uniforms, shader, raster)?;
        }
        Ok(())
    }

    pub fn lines(
        &mut self,
        offset: usize,
        count: usize,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        self.begin_draw(Topology::Lines, offset, count);
        for i in (0..count / 2).map(|p| offset + p * 2) {
            self.line([i, i + 1], uniforms, shader, raster)?;
        }
        Ok(())
    }

    pub fn line_strip(
        &mut self,
        offset: usize,
        count: usize,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        self.begin_draw(Topology::LineStrip, offset, count);
        for i in 0..count.saturating_sub(1) {
            self.line([offset + i, offset + i + 1], uniforms, shader, raster)?;
        }
        Ok(())
    }

    /// Closed line strip; fewer than two elements draw nothing
    pub fn line_loop(
        &mut self,
        offset: usize,
        count: usize,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        self.begin_draw(Topology::LineLoop, offset, count);
        if count < 2 {
            return Ok(());
        }
        for i in 0..count {
            self.line([offset + i, offset + (i + 1) % count], uniforms, shader, raster)?;
        }
        Ok(())
    }

    /// Dispatch a draw range to the entry point for `topology`
    pub fn draw(
        &mut self,
        topology: Topology,
        offset: usize,
        count: usize,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        match topology {
            Topology::Triangles => self.triangles(offset, count, uniforms, shader, raster),
            Topology::TriangleStrip => self.triangle_strip(offset, count, uniforms, shader, raster),
            Topology::TriangleFan => self.triangle_fan(offset, count, uniforms, shader, raster),
            Topology::Lines => self.lines(offset, count, uniforms, shader, raster),
            Topology::LineStrip => self.line_strip(offset, count, uniforms, shader, raster),
            Topology::LineLoop => self.line_loop(offset, count, uniforms, shader, raster),
        }
    }

    /// Draw one submesh range
    ///
    /// The submesh's own vertex shader wins over `shader`. Every draw starts
    /// a new render generation, so vertices shared with a range drawn by a
    /// different shader are re-shaded.
    pub fn draw_sub_mesh(
        &mut self,
        sub_mesh: &SubMesh,
        uniforms: &Uniforms,
        shader: &dyn VertexShader,
        raster: &mut Raster,
    ) -> Result<()> {
        let shader = sub_mesh.vertex_shader.as_deref().unwrap_or(shader);
        self.draw(
            sub_mesh.topology,
            sub_mesh.offset,
            sub_mesh.count,
            uniforms,
            shader,
            raster,
        )
    }
}
