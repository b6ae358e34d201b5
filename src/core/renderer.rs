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

//! Renderer facade
//!
//! [`Renderer`] ties the pipeline together: it owns the [`Raster`], the
//! [`PrimitiveAssembler`], the current shaders, the transform matrices and
//! the output [`Surface`].
//!
//! # Frame Structure
//!
//! ```text
//! renderer.clear();
//! renderer.render(&mesh_a)?;
//! renderer.render(&mesh_b)?;
//! let primitives = renderer.flush();
//! ```

use glam::{Mat3, Mat4, Vec4};

use super::assembler::PrimitiveAssembler;
use super::error::{ConfigWarning, Result};
use super::mesh::MeshBuffer;
use super::raster::{BlendEquation, BlendFactor, CullFace, DepthFunc, Raster, Viewport};
use super::shader::{builtin, FragmentShader, Uniforms, VertexShader};
use super::surface::Surface;

/// Inverse transpose of the upper 3×3 of `model_view`
///
/// A singular matrix is used as-is.
fn normal_matrix(model_view: &Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(*model_view);
    let det = linear.determinant();
    if det == 0.0 || !det.is_finite() {
        log::debug!("Model-view matrix is singular, using it as the normal matrix");
        return linear;
    }
    linear.inverse().transpose()
}

/// High-level rendering front end
///
/// # Examples
///
/// ```
/// use glam::Vec4;
/// use softraster::core::mesh::MeshBuffer;
/// use softraster::core::renderer::Renderer;
/// use softraster::core::surface::MemorySurface;
///
/// let mut renderer = Renderer::new(MemorySurface::new(32, 32));
/// renderer.uniforms_mut().set("diffuse", Vec4::new(1.0, 0.0, 0.0, 1.0));
///
/// let mesh = MeshBuffer::builder()
///     .attribute("position", 3, vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0])
///     .build()?;
///
/// renderer.clear();
/// renderer.render(&mesh)?;
/// assert_eq!(renderer.flush(), 1);
/// assert_eq!(renderer.surface().pixel(16, 30), Some([255, 0, 0, 255]));
/// # Ok::<(), softraster::RasterError>(())
/// ```
pub struct Renderer<S: Surface> {
    raster: Raster,
    assembler: PrimitiveAssembler,
    surface: S,
    vertex_shader: Box<dyn VertexShader>,

    /// User uniforms, merged into every draw
    uniforms: Uniforms,
    model_matrix: Mat4,
    view_matrix: Mat4,
    projection_matrix: Mat4,

    clear_color: Vec4,
    clear_depth: f32,
}

impl<S: Surface> Renderer<S> {
    /// Create a renderer sized to `surface`
    ///
    /// Starts with the default vertex and fragment shaders, identity
    /// matrices and an opaque black clear color.
    pub fn new(surface: S) -> Self {
        let (width, height) = surface.size();
        log::info!("Creating {}x{} renderer", width, height);

        Self {
            raster: Raster::new(width, height),
            assembler: PrimitiveAssembler::new(),
            surface,
            vertex_shader: Box::new(builtin::default_vertex),
            uniforms: Uniforms::default(),
            model_matrix: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            clear_depth: 1.0,
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Direct access to the raster for state not covered by the setters below
    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn assembler(&self) -> &PrimitiveAssembler {
        &self.assembler
    }

    // ========== Shaders and uniforms ==========

    pub fn set_vertex_shader(&mut self, shader: impl VertexShader + 'static) {
        self.vertex_shader = Box::new(shader);
    }

    pub fn set_fragment_shader(&mut self, shader: impl FragmentShader + 'static) {
        self.raster.set_fragment_shader(shader);
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut Uniforms {
        &mut self.uniforms
    }

    /// Replace the user uniforms
    pub fn set_uniforms(&mut self, uniforms: Uniforms) {
        self.uniforms = uniforms;
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn set_model_matrix(&mut self, matrix: Mat4) {
        self.model_matrix = matrix;
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn set_view_matrix(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn set_projection_matrix(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    // ========== Raster state ==========

    pub fn set_viewport(&mut self, viewport: Viewport) -> std::result::Result<(), ConfigWarning> {
        self.raster.set_viewport(viewport)
    }

    pub fn set_cull_face(&mut self, cull_face: CullFace) {
        self.raster.set_cull_face(cull_face);
    }

    pub fn set_depth_func(&mut self, depth_func: DepthFunc) {
        self.raster.set_depth_func(depth_func);
    }

    pub fn set_depth_write(&mut self, enabled: bool) {
        self.raster.set_depth_write(enabled);
    }

    pub fn set_blend_enabled(&mut self, enabled: bool) {
        self.raster.set_blend_enabled(enabled);
    }

    pub fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.raster.set_blend_func(src, dst);
    }

    pub fn set_blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.raster
            .set_blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    pub fn set_blend_equation(&mut self, equation: BlendEquation) {
        self.raster.set_blend_equation(equation);
    }

    pub fn set_blend_equation_separate(&mut self, rgb: BlendEquation, alpha: BlendEquation) {
        self.raster.set_blend_equation_separate(rgb, alpha);
    }

    pub fn set_blend_color(&mut self, color: Vec4) {
        self.raster.set_blend_color(color);
    }

    // ========== Named raster state ==========
    //
    // Same as the raster's named setters: unknown names are reported and the
    // previous value is kept.

    pub fn set_cull_face_named(&mut self, name: &str) -> std::result::Result<(), ConfigWarning> {
        self.raster.set_cull_face_named(name)
    }

    pub fn set_depth_func_named(&mut self, name: &str) -> std::result::Result<(), ConfigWarning> {
        self.raster.set_depth_func_named(name)
    }

    pub fn set_blend_func_named(&mut self, src: &str, dst: &str) -> std::result::Result<(), ConfigWarning> {
        self.raster.set_blend_func_named(src, dst)
    }

    pub fn set_blend_func_separate_named(
        &mut self,
        src_rgb: &str,
        dst_rgb: &str,
        src_alpha: &str,
        dst_alpha: &str,
    ) -> std::result::Result<(), ConfigWarning> {
        self.raster
            .set_blend_func_separate_named(src_rgb, dst_rgb, src_alpha, dst_alpha)
    }

    pub fn set_blend_equation_named(&mut self, name: &str) -> std::result::Result<(), ConfigWarning> {
        self.raster.set_blend_equation_named(name)
    }

    pub fn set_blend_equation_separate_named(
        &mut self,
        rgb: &str,
        alpha: &str,
    ) -> std::result::Result<(), ConfigWarning> {
        self.raster.set_blend_equation_separate_named(rgb, alpha)
    }

    // ========== Clear values ==========

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    /// Normalized depth written by [`clear`](Self::clear); `1.0` is the far plane
    pub fn set_clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth;
    }

    // ========== Frame ==========

    /// Clear color and depth and reset the primitive counter
    pub fn clear(&mut self) {
        self.raster.clear(self.clear_color, self.clear_depth);
    }

    /// Reallocate the framebuffer to the surface's current size
    ///
    /// A surface reporting a zero dimension keeps the current buffers.
    pub fn resize(&mut self) {
        let (width, height) = self.surface.size();
        self.raster.resize(width, height);
    }

    /// Draw every submesh of `mesh`
    ///
    /// Derives the model-view, pmv and normal matrices and the camera
    /// position from the current transforms, merges them with the user
    /// uniforms, binds the mesh and walks its submeshes in order. A submesh
    /// with its own vertex shader is drawn with it; the rest use the
    /// renderer's.
    ///
    /// # Errors
    ///
    /// Propagates index and schema errors from assembly; primitives drawn
    /// before the error stay in the framebuffer.
    pub fn render(&mut self, mesh: &MeshBuffer) -> Result<()> {
        let model_view = self.view_matrix * self.model_matrix;

        let mut uniforms = Uniforms {
            model_matrix: self.model_matrix,
            view_matrix: self.view_matrix,
            projection_matrix: self.projection_matrix,
            model_view_matrix: model_view,
            pmv_matrix: self.projection_matrix * model_view,
            normal_matrix: normal_matrix(&model_view),
            camera_position: -self.view_matrix.w_axis.truncate(),
            ..Uniforms::default()
        };
        uniforms.extend_from(&self.uniforms);

        let mut bound = self.assembler.load_buffer(mesh);
        for sub_mesh in mesh.sub_meshes() {
            bound.draw_sub_mesh(sub_mesh, &uniforms, &*self.vertex_shader, &mut self.raster)?;
        }
        Ok(())
    }

    /// Present the frame to the surface
    ///
    /// # Returns
    ///
    /// Number of primitives drawn since the last clear
    pub fn flush(&mut self) -> usize {
        let count = self.raster.flush(&mut self.surface);
        log::debug!("Presented frame with {} primitives", count);
        count
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;
    use crate::core::error::RasterError;
    use crate::core::mesh::{SubMesh, Topology, VertexAttributes};
    use crate::core::surface::MemorySurface;
    use crate::core::varyings::Varyings;

    fn triangle_mesh() -> MeshBuffer {
        MeshBuffer::builder()
            .attribute(
                "position",
                3,
                vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
            )
            .build()
            .unwrap()
    }

    fn renderer(size: usize) -> Renderer<MemorySurface> {
        let mut renderer = Renderer::new(MemorySurface::new(size, size));
        renderer.clear();
        renderer
    }

    #[test]
    fn test_render_and_flush() {
        let mut renderer = renderer(10);
        renderer.render(&triangle_mesh()).unwrap();

        assert_eq!(renderer.flush(), 1);
        let surface = renderer.surface();
        assert_eq!(surface.present_count(), 1);
        assert_eq!(surface.frame_size(), (10, 10));
        assert_eq!(surface.pixel(5, 9), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_user_uniforms_reach_shaders() {
        let mut renderer = renderer(10);
        renderer.uniforms_mut().set("diffuse", Vec4::new(0.0, 1.0, 0.0, 1.0));
        renderer.render(&triangle_mesh()).unwrap();
        renderer.flush();

        assert_eq!(renderer.surface().pixel(5, 9), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_model_matrix_moves_geometry() {
        let mut renderer = renderer(10);
        renderer.set_cull_face(CullFace::None);
        // Shrink the triangle into the left half
        renderer.set_model_matrix(
            Mat4::from_translation(Vec3::new(-0.5, 0.0, 0.0)) * Mat4::from_scale(Vec3::new(0.5, 1.0, 1.0)),
        );
        renderer.render(&triangle_mesh()).unwrap();
        renderer.flush();

        assert_eq!(renderer.surface().pixel(2, 9), Some([255, 255, 255, 255]));
        assert_eq!(renderer.surface().pixel(8, 9), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_derived_uniforms() {
        let mut renderer = renderer(4);
        let view = Mat4::from_translation(Vec3::new(1.0, 2.0, -5.0));
        let model = Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
        let projection = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 100.0);
        renderer.set_view_matrix(view);
        renderer.set_model_matrix(model);
        renderer.set_projection_matrix(projection);

        let seen = std::rc::Rc::new(std::cell::RefCell::new(None));
        let capture = seen.clone();
        renderer.set_vertex_shader(move |out: &mut Varyings, attrs: &VertexAttributes, u: &Uniforms| {
            out.position = attrs.position();
            *capture.borrow_mut() = Some(u.clone());
        });
        renderer.render(&triangle_mesh()).unwrap();

        let uniforms = seen.borrow().clone().unwrap();
        assert_eq!(uniforms.model_view_matrix, view * model);
        assert_eq!(uniforms.pmv_matrix, projection * (view * model));
        assert_eq!(uniforms.camera_position, Vec3::new(-1.0, -2.0, 5.0));
        let expected_normal = Mat3::from_diagonal(Vec3::splat(0.5));
        assert!(uniforms.normal_matrix.abs_diff_eq(expected_normal, 1e-6));
    }

    #[test]
    fn test_singular_model_view_keeps_normal_matrix_finite() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
        let normal = normal_matrix(&flat);
        assert!(normal.is_finite());
    }

    #[test]
    fn test_sub_meshes_drawn_in_order() {
        let mesh = MeshBuffer::builder()
            .attribute(
                "position",
                3,
                vec![
                    -1.0, -1.0, 0.0, //
                    1.0, -1.0, 0.0, //
                    0.0, 1.0, 0.0, //
                    -0.9, 0.9, 0.0, //
                    0.9, 0.9, 0.0,
                ],
            )
            .sub_mesh(SubMesh::new(0, 3, Topology::Triangles))
            .sub_mesh(SubMesh::new(3, 2, Topology::Lines))
            .build()
            .unwrap();

        let mut renderer = renderer(10);
        renderer.render(&mesh).unwrap();
        assert_eq!(renderer.flush(), 2);
        // The line runs along the top row
        assert_eq!(renderer.surface().pixel(3, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_sub_mesh_vertex_shader_override() {
        let quad = vec![
            -0.9, -0.9, 0.0, //
            0.9, -0.9, 0.0, //
            0.9, 0.9, 0.0, //
            -0.9, 0.9, 0.0,
        ];
        let mesh = MeshBuffer::builder()
            .attribute("position", 3, quad)
            .indices(vec![0, 1, 2, 0, 2, 3])
            .sub_mesh(SubMesh::new(0, 3, Topology::Triangles))
            .sub_mesh(SubMesh::new(3, 3, Topology::Triangles).with_vertex_shader(
                |out: &mut Varyings, attrs: &VertexAttributes, u: &Uniforms| {
                    out.position = u.pmv_matrix * attrs.position();
                    out.color = Vec4::new(0.0, 0.0, 1.0, 1.0);
                },
            ))
            .build()
            .unwrap();

        let mut renderer = renderer(10);
        renderer.uniforms_mut().set("diffuse", Vec4::new(1.0, 0.0, 0.0, 1.0));
        renderer.render(&mesh).unwrap();
        assert_eq!(renderer.flush(), 2);

        // Lower-right half: renderer shader; upper-left half: submesh shader
        assert_eq!(renderer.surface().pixel(8, 8), Some([255, 0, 0, 255]));
        assert_eq!(renderer.surface().pixel(1, 1), Some([0, 0, 255, 255]));

        // The override does not leak into later draws
        renderer.clear();
        renderer.render(&triangle_mesh()).unwrap();
        renderer.flush();
        assert_eq!(renderer.surface().pixel(5, 9), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_render_reports_bad_indices() {
        let mesh = MeshBuffer::builder()
            .attribute("position", 3, vec![0.0; 9])
            .indices(vec![0, 1, 5])
            .build()
            .unwrap();
        let mut renderer = renderer(4);
        assert!(matches!(
            renderer.render(&mesh),
            Err(RasterError::VertexIndexOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn test_resize_follows_surface() {
        let mut renderer = renderer(4);
        renderer.surface_mut().set_size(8, 6);
        renderer.resize();
        assert_eq!((renderer.raster().width(), renderer.raster().height()), (8, 6));

        renderer.surface_mut().set_size(0, 6);
        renderer.resize();
        assert_eq!((renderer.raster().width(), renderer.raster().height()), (8, 6));
    }

    #[test]
    fn test_separate_blend_setters_forward() {
        let mut renderer = renderer(2);
        renderer.set_blend_func_separate(
            BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha,
            BlendFactor::One,
            BlendFactor::Zero,
        );
        renderer.set_blend_equation_separate(BlendEquation::Sub, BlendEquation::Max);

        let blend = renderer.raster().state().blend;
        assert_eq!(blend.src_rgb, BlendFactor::SrcAlpha);
        assert_eq!(blend.dst_rgb, BlendFactor::OneMinusSrcAlpha);
        assert_eq!(blend.src_alpha, BlendFactor::One);
        assert_eq!(blend.dst_alpha, BlendFactor::Zero);
        assert_eq!(blend.equation_rgb, BlendEquation::Sub);
        assert_eq!(blend.equation_alpha, BlendEquation::Max);
    }

    #[test]
    fn test_named_setters_forward() {
        let mut renderer = renderer(2);
        renderer.set_cull_face_named("front").unwrap();
        renderer.set_depth_func_named("lequal").unwrap();
        renderer
            .set_blend_func_separate_named("srcAlpha", "oneMinusSrcAlpha", "one", "zero")
            .unwrap();
        renderer.set_blend_equation_separate_named("invSub", "min").unwrap();

        let state = renderer.raster().state();
        assert_eq!(state.cull_face, CullFace::Front);
        assert_eq!(state.depth_func, DepthFunc::LEqual);
        assert_eq!(state.blend.dst_rgb, BlendFactor::OneMinusSrcAlpha);
        assert_eq!(state.blend.equation_rgb, BlendEquation::InvSub);
        assert_eq!(state.blend.equation_alpha, BlendEquation::Min);

        // Unknown names leave the state alone
        assert!(renderer.set_blend_func_named("one", "sideways").is_err());
        assert!(renderer.set_blend_equation_named("bogus").is_err());
        assert_eq!(renderer.raster().state().blend.dst_rgb, BlendFactor::OneMinusSrcAlpha);
        assert_eq!(renderer.raster().state().blend.equation_rgb, BlendEquation::InvSub);
    }

    #[test]
    fn test_clear_color() {
        let mut renderer = renderer(2);
        renderer.set_clear_color(Vec4::new(0.0, 0.0, 1.0, 1.0));
        renderer.clear();
        renderer.flush();
        assert_eq!(renderer.surface().pixel(1, 1), Some([0, 0, 255, 255]));
    }
}
