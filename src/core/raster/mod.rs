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

//! Fixed-function back end of the pipeline
//!
//! The raster receives shaded vertices in clip space and turns them into
//! pixels:
//!
//! 1. Clip against the view volume
//! 2. Project to device space (pixels + fixed-point depth, `w` kept)
//! 3. Cull by winding (triangles only)
//! 4. Scan convert, interpolating varyings with perspective correction
//! 5. Depth test
//! 6. Run the fragment shader
//! 7. Blend and write color/depth
//!
//! # Device Space
//!
//! ```text
//! nx = x/w · 0.5 + 0.5           vx = (nx · vp.width + vp.x) · width
//! ny = y/w · 0.5 + 0.5           vy = ((1 - ny) · vp.height + vp.y) · height
//! nz = z/w · 0.5 + 0.5           vz = nz · MAX_DEPTH
//! ```
//!
//! Device y grows downwards. Device coordinates stay floating point until a
//! pixel is sampled; triangle coverage is decided at pixel centers.

mod blend;
mod framebuffer;
mod line;
mod state;
mod triangle;

#[cfg(test)]
mod tests;

pub use blend::{BlendEquation, BlendFactor, BlendState};
pub use framebuffer::{depth_from_unit, ColorPacking, Framebuffer, MAX_DEPTH};
pub use state::{CullFace, DepthFunc, RenderState, Viewport};

use std::str::FromStr;

use glam::Vec4;

use super::clip::{clip_line, Clipper};
use super::error::{ConfigWarning, RasterError, Result};
use super::shader::{builtin, FragmentShader, Uniforms};
use super::surface::Surface;
use super::varyings::Varyings;

/// A vertex after projection, still pointing at its clip-space varyings
#[derive(Debug, Clone, Copy)]
pub(crate) struct DeviceVertex<'v> {
    /// `(x, y)` in pixels, `z` in `[0, MAX_DEPTH]`, `w` from clip space
    pub position: Vec4,
    pub varyings: &'v Varyings,
}

/// Borrowed view of everything the per-pixel stages touch
///
/// Kept separate from [`Raster`] so the clipper's output can be read while
/// fragments are written.
pub(crate) struct PixelPipeline<'a> {
    framebuffer: &'a mut Framebuffer,
    state: &'a RenderState,
    shader: &'a dyn FragmentShader,
    uniforms: &'a Uniforms,
}

impl PixelPipeline<'_> {
    #[inline]
    pub(crate) fn width(&self) -> usize {
        self.framebuffer.width()
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.framebuffer.height()
    }

    /// Project a clip-space position to device space
    fn to_device(&self, clip: Vec4) -> Vec4 {
        let w = clip.w;
        let n = clip.truncate() / w * 0.5 + 0.5;
        let vp = &self.state.viewport;

        Vec4::new(
            (n.x * vp.width + vp.x) * self.width() as f32,
            ((1.0 - n.y) * vp.height + vp.y) * self.height() as f32,
            n.z * MAX_DEPTH as f32,
            w,
        )
    }

    fn project<'v>(&self, varyings: &'v Varyings) -> DeviceVertex<'v> {
        DeviceVertex {
            position: self.to_device(varyings.position),
            varyings,
        }
    }

    /// Depth test a candidate fragment
    ///
    /// Fails for pixels outside the framebuffer and for depths outside
    /// `[0, MAX_DEPTH)`.
    ///
    /// # Returns
    ///
    /// Buffer offset and fixed-point depth when the fragment passes
    #[inline]
    pub(crate) fn depth_test(&self, x: i32, y: i32, z: f32) -> Option<(usize, u16)> {
        let index = self.framebuffer.index(x, y)?;
        let z = z.trunc();
        if !(z >= 0.0 && z < MAX_DEPTH as f32) {
            return None;
        }
        let depth = z as u16;
        self.state
            .depth_func
            .test(self.framebuffer.stored_depth(index), depth)
            .then_some((index, depth))
    }

    /// Run the fragment shader and write the result
    ///
    /// A discarded fragment leaves both buffers untouched.
    #[inline]
    pub(crate) fn shade(&mut self, (index, depth): (usize, u16), varyings: &Varyings) {
        let Some(color) = self.shader.shade(varyings, self.uniforms) else {
            return;
        };

        let blend = &self.state.blend;
        let color = if blend.enabled {
            blend.apply(color, self.framebuffer.stored_color(index))
        } else {
            color
        };

        let depth = self.state.depth_write.then_some(depth);
        self.framebuffer.write(index, color, depth);
    }
}

/// Twice the signed area of a device-space triangle
///
/// Negative for triangles that are counter-clockwise in NDC (y flips).
#[inline]
fn signed_area(a: Vec4, b: Vec4, c: Vec4) -> f32 {
    a.x * b.y - b.x * a.y + b.x * c.y - c.x * b.y + c.x * a.y - a.x * c.y
}

/// Ensure every vertex of a primitive carries the same secondary attributes
fn check_schema(first: &Varyings, rest: &[&Varyings]) -> Result<()> {
    let expected = first.attributes();
    match rest.iter().find(|v| v.attributes() != expected) {
        Some(v) => Err(RasterError::SchemaMismatch {
            expected,
            found: v.attributes(),
        }),
        None => Ok(()),
    }
}

/// Parse a named setting, logging rejected names
fn parse_setting<T: FromStr<Err = ConfigWarning>>(name: &str) -> std::result::Result<T, ConfigWarning> {
    name.parse()
        .inspect_err(|warning: &ConfigWarning| log::warn!("{}", warning))
}

/// Software rasterizer with its framebuffer and fixed-function state
///
/// # Examples
///
/// ```
/// use glam::Vec4;
/// use softraster::core::raster::{DepthFunc, Raster};
/// use softraster::core::shader::Uniforms;
/// use softraster::core::varyings::Varyings;
///
/// let mut raster = Raster::new(10, 10);
/// raster.set_depth_func(DepthFunc::Always);
/// raster.clear(Vec4::new(0.0, 0.0, 0.0, 1.0), 1.0);
///
/// let white = Vec4::ONE;
/// raster.raster_triangle(
///     &Varyings::new(Vec4::new(-1.0, -1.0, 0.0, 1.0), white),
///     &Varyings::new(Vec4::new(1.0, -1.0, 0.0, 1.0), white),
///     &Varyings::new(Vec4::new(0.0, 1.0, 0.0, 1.0), white),
///     &Uniforms::default(),
/// )?;
///
/// assert_eq!(raster.primitive_count(), 1);
/// assert_eq!(raster.framebuffer().pixel(5, 9), Some(white));
/// # Ok::<(), softraster::RasterError>(())
/// ```
pub struct Raster {
    framebuffer: Framebuffer,
    state: RenderState,
    clipper: Clipper,
    fragment_shader: Box<dyn FragmentShader>,
    primitives: usize,
}

impl Raster {
    /// Create a raster with a `width` × `height` framebuffer and default state
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            state: RenderState::default(),
            clipper: Clipper::new(),
            fragment_shader: Box::new(builtin::default_fragment),
            primitives: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width()
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Primitives drawn since the last [`clear`](Self::clear)
    pub fn primitive_count(&self) -> usize {
        self.primitives
    }

    pub fn set_fragment_shader(&mut self, shader: impl FragmentShader + 'static) {
        self.fragment_shader = Box::new(shader);
    }

    // ========== State setters ==========

    /// Set the viewport; non-finite or empty rectangles are rejected
    pub fn set_viewport(&mut self, viewport: Viewport) -> std::result::Result<(), ConfigWarning> {
        if !viewport.is_valid() {
            let warning = ConfigWarning::new("viewport", format!("{:?}", viewport));
            log::warn!("{}", warning);
            return Err(warning);
        }
        self.state.viewport = viewport;
        Ok(())
    }

    pub fn set_cull_face(&mut self, cull_face: CullFace) {
        self.state.cull_face = cull_face;
    }

    pub fn set_depth_func(&mut self, depth_func: DepthFunc) {
        self.state.depth_func = depth_func;
    }

    pub fn set_depth_write(&mut self, enabled: bool) {
        self.state.depth_write = enabled;
    }

    pub fn set_blend_enabled(&mut self, enabled: bool) {
        self.state.blend.enabled = enabled;
    }

    /// Set the same source/destination factors for RGB and alpha
    pub fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.set_blend_func_separate(src, dst, src, dst);
    }

    pub fn set_blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        let blend = &mut self.state.blend;
        blend.src_rgb = src_rgb;
        blend.dst_rgb = dst_rgb;
        blend.src_alpha = src_alpha;
        blend.dst_alpha = dst_alpha;
    }

    pub fn set_blend_equation(&mut self, equation: BlendEquation) {
        self.set_blend_equation_separate(equation, equation);
    }

    pub fn set_blend_equation_separate(&mut self, rgb: BlendEquation, alpha: BlendEquation) {
        self.state.blend.equation_rgb = rgb;
        self.state.blend.equation_alpha = alpha;
    }

    pub fn set_blend_color(&mut self, color: Vec4) {
        self.state.blend.color = color;
    }

    // ========== Named state setters ==========
    //
    // Each rejects unknown names with a warning and keeps the previous value.
    // Multi-value setters apply nothing unless every name is valid.

    pub fn set_cull_face_named(&mut self, name: &str) -> std::result::Result<(), ConfigWarning> {
        self.state.cull_face = parse_setting(name)?;
        Ok(())
    }

    pub fn set_depth_func_named(&mut self, name: &str) -> std::result::Result<(), ConfigWarning> {
        self.state.depth_func = parse_setting(name)?;
        Ok(())
    }

    pub fn set_blend_func_named(&mut self, src: &str, dst: &str) -> std::result::Result<(), ConfigWarning> {
        self.set_blend_func_separate_named(src, dst, src, dst)
    }

    pub fn set_blend_func_separate_named(
        &mut self,
        src_rgb: &str,
        dst_rgb: &str,
        src_alpha: &str,
        dst_alpha: &str,
    ) -> std::result::Result<(), ConfigWarning> {
        let src_rgb = parse_setting(src_rgb)?;
        let dst_rgb = parse_setting(dst_rgb)?;
        let src_alpha = parse_setting(src_alpha)?;
        let dst_alpha = parse_setting(dst_alpha)?;
        self.set_blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
        Ok(())
    }

    pub fn set_blend_equation_named(&mut self, name: &str) -> std::result::Result<(), ConfigWarning> {
        self.set_blend_equation_separate_named(name, name)
    }

    pub fn set_blend_equation_separate_named(
        &mut self,
        rgb: &str,
        alpha: &str,
    ) -> std::result::Result<(), ConfigWarning> {
        let rgb = parse_setting(rgb)?;
        let alpha = parse_setting(alpha)?;
        self.set_blend_equation_separate(rgb, alpha);
        Ok(())
    }

    // ========== Frame control ==========

    /// Reallocate the framebuffer; zero sizes are ignored
    pub fn resize(&mut self, width: usize, height: usize) {
        self.framebuffer.resize(width, height);
    }

    /// Clear color (and depth, when depth writes are enabled)
    ///
    /// `depth` is normalized: `1.0` is the far plane. Resets the primitive
    /// counter.
    pub fn clear(&mut self, color: Vec4, depth: f32) {
        let depth = self.state.depth_write.then(|| depth_from_unit(depth));
        self.framebuffer.clear(color, depth);
        self.primitives = 0;
    }

    /// Present the color buffer to `surface`
    ///
    /// # Returns
    ///
    /// Number of primitives drawn since the last clear
    pub fn flush(&self, surface: &mut dyn Surface) -> usize {
        surface.present(
            self.framebuffer.rgba_bytes(),
            self.framebuffer.width(),
            self.framebuffer.height(),
        );
        self.primitives
    }

    // ========== Primitives ==========

    /// Rasterize one triangle given in clip space
    ///
    /// # Arguments
    ///
    /// * `v0`, `v1`, `v2` - Shaded vertices in clip space
    /// * `uniforms` - Uniforms passed to the fragment shader
    ///
    /// # Errors
    ///
    /// [`RasterError::SchemaMismatch`] when the vertices carry different
    /// secondary attributes. Degenerate or invisible triangles are skipped
    /// silently.
    pub fn raster_triangle(
        &mut self,
        v0: &Varyings,
        v1: &Varyings,
        v2: &Varyings,
        uniforms: &Uniforms,
    ) -> Result<()> {
        check_schema(v0, &[v1, v2])?;

        let Self {
            framebuffer,
            state,
            clipper,
            fragment_shader,
            primitives,
        } = self;

        let fan = clipper.clip_triangle(v0, v1, v2);
        if fan.len() < 3 {
            log::trace!("Triangle clipped away");
            return Ok(());
        }

        let state: &RenderState = state;
        let mut pipeline = PixelPipeline {
            framebuffer,
            state,
            shader: &**fragment_shader,
            uniforms,
        };

        let origin = pipeline.project(&fan[0]);
        for pair in fan[1..].windows(2) {
            let b = pipeline.project(&pair[0]);
            let c = pipeline.project(&pair[1]);

            let area = signed_area(origin.position, b.position, c.position);
            if area == 0.0 || !area.is_finite() {
                log::trace!("Skipping degenerate triangle");
                continue;
            }
            if state.cull_face.culls(area) {
                log::trace!("Culled triangle (area {})", area);
                continue;
            }

            triangle::fill_triangle(&mut pipeline, [origin, b, c]);
            *primitives += 1;
        }

        Ok(())
    }

    /// Rasterize one line segment given in clip space
    ///
    /// The endpoints are copied before clipping; the inputs are never
    /// modified.
    ///
    /// # Errors
    ///
    /// [`RasterError::SchemaMismatch`] when the endpoints carry different
    /// secondary attributes.
    pub fn raster_line(&mut self, v0: &Varyings, v1: &Varyings, uniforms: &Uniforms) -> Result<()> {
        check_schema(v0, &[v1])?;

        let mut a = *v0;
        let mut b = *v1;
        if clip_line(&mut a, &mut b).is_outside() {
            log::trace!("Line clipped away");
            return Ok(());
        }

        let mut pipeline = PixelPipeline {
            framebuffer: &mut self.framebuffer,
            state: &self.state,
            shader: &*self.fragment_shader,
            uniforms,
        };
        let from = pipeline.project(&a);
        let to = pipeline.project(&b);
        line::draw_line(&mut pipeline, from, to);

        self.primitives += 1;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn depth_at(&self, x: i32, y: i32) -> Option<u16> {
        self.framebuffer.depth_at(x, y)
    }
}
