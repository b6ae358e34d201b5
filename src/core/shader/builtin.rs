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

//! Built-in shader programs
//!
//! Plain functions with the shader signatures, so they can be handed to the
//! pipeline directly (`&builtin::default_vertex`).
//!
//! Uniform names read here:
//!
//! | name        | type    | default       |
//! |-------------|---------|---------------|
//! | `diffuse`   | vec4    | `(1,1,1,1)`   |
//! | `specular`  | vec3    | `(1,1,1)`     |
//! | `shininess` | float   | `20`          |
//! | `emission`  | vec3    | `(0,0,0)`     |
//! | `ambient`   | vec3    | `(0,0,0)`     |
//! | `lights`    | lights  | empty         |
//! | `text1`     | texture | opaque white  |
//! | `textScale` | float   | per shader    |
//! | `lineWidth` | float   | `0.01`        |
//! | `celLevel`  | float   | `4`           |
//! | `fogColor`  | vec3    | `(0.5,0.5,0.5)` |
//! | `fogStart`  | float   | `1`           |
//! | `fogEnd`    | float   | `50`          |
//! | `fogDensity`| float   | `0.05`        |
//! | `time`      | float   | `0`           |
//! | `intensity` | float   | `0.02`        |
//! | `speed`     | float   | `2`           |

use std::fmt;
use std::str::FromStr;

use glam::{Vec3, Vec4};

use super::lighting::{self, Material};
use super::texture::sample_or_white;
use super::Uniforms;
use crate::core::mesh::VertexAttributes;
use crate::core::varyings::Varyings;

/// Transform position by the pmv matrix, copy uv, color from `diffuse`
pub fn default_vertex(out: &mut Varyings, attrs: &VertexAttributes, uniforms: &Uniforms) {
    out.set_uv(attrs.vec2("uv"));
    out.position = uniforms.pmv_matrix * attrs.position();
    out.color = uniforms.vec4_or("diffuse", Vec4::ONE);
}

/// Emit view-space normal and position for per-fragment lighting
///
/// Color is set to `diffuse` so the output is still visible with the
/// default fragment shader.
pub fn phong_vertex(out: &mut Varyings, attrs: &VertexAttributes, uniforms: &Uniforms) {
    let normal = (uniforms.normal_matrix * attrs.vec3("normal")).normalize_or_zero();
    let position = attrs.position();
    out.set_normal(normal);
    out.set_world_position((uniforms.model_view_matrix * position).truncate());
    out.set_uv(attrs.vec2("uv"));
    out.position = uniforms.pmv_matrix * position;
    out.color = uniforms.vec4_or("diffuse", Vec4::ONE);
}

/// Gouraud shading: phong lighting evaluated per vertex into `color`
pub fn vertex_lit(out: &mut Varyings, attrs: &VertexAttributes, uniforms: &Uniforms) {
    let normal = (uniforms.normal_matrix * attrs.vec3("normal")).normalize_or_zero();
    let position = attrs.position();
    let view_position = (uniforms.model_view_matrix * position).truncate();
    let uv = attrs.vec2("uv");
    let scale = uniforms.float_or("textScale", 1.0);

    let texel = sample_or_white(uniforms.texture("text1"), uv.x * scale, uv.y * scale);
    let material = Material::from_uniforms(uniforms).with_texel(texel);

    out.color = lighting::phong(
        Vec3::ZERO,
        view_position,
        normal,
        uniforms.lights("lights"),
        &material,
    );
    out.set_uv(uv);
    out.position = uniforms.pmv_matrix * position;
}

/// Per-vertex toon shading: [`lighting::cel`] evaluated into `color`
pub fn vertex_cel(out: &mut Varyings, attrs: &VertexAttributes, uniforms: &Uniforms) {
    let normal = (uniforms.normal_matrix * attrs.vec3("normal")).normalize_or_zero();
    let position = attrs.position();
    let view_position = (uniforms.model_view_matrix * position).truncate();
    let uv = attrs.vec2("uv");
    let scale = uniforms.float_or("textScale", 1.0);

    let texel = sample_or_white(uniforms.texture("text1"), uv.x * scale, uv.y * scale);
    let material = Material::from_uniforms(uniforms).with_texel(texel);

    out.color = lighting::cel(
        Vec3::ZERO,
        view_position,
        normal,
        uniforms.lights("lights"),
        &material,
        uniforms.float_or("celLevel", 4.0),
    );
    out.set_uv(uv);
    out.position = uniforms.pmv_matrix * position;
}

// ========== Fog ==========

/// Fog falloff over view-space distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FogMode {
    /// `(fogEnd - d) / (fogEnd - fogStart)`, clamped to `[0, 1]`
    #[default]
    Linear,
    /// `exp(-d * fogDensity)`
    Exp,
    /// `exp(-(d * fogDensity)²)`
    Exp2,
}

impl FogMode {
    pub fn name(&self) -> &'static str {
        match self {
            FogMode::Linear => "linear",
            FogMode::Exp => "exp",
            FogMode::Exp2 => "exp2",
        }
    }

    /// Share of the surface color left at `distance`; 1 means no fog
    ///
    /// A factor that is not a number (zero-length linear range) counts as
    /// full fog.
    pub fn factor(&self, distance: f32, uniforms: &Uniforms) -> f32 {
        let factor = match self {
            FogMode::Linear => {
                let start = uniforms.float_or("fogStart", 1.0);
                let end = uniforms.float_or("fogEnd", 50.0);
                ((end - distance) / (end - start)).clamp(0.0, 1.0)
            }
            FogMode::Exp => (-distance * uniforms.float_or("fogDensity", 0.05)).exp(),
            FogMode::Exp2 => {
                let e = distance * uniforms.float_or("fogDensity", 0.05);
                (-e * e).exp()
            }
        };
        if factor.is_nan() {
            0.0
        } else {
            factor
        }
    }
}

impl fmt::Display for FogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FogMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(FogMode::Linear),
            "exp" => Ok(FogMode::Exp),
            "exp2" => Ok(FogMode::Exp2),
            _ => Err(format!("unknown fog mode '{}'", s)),
        }
    }
}

/// Fogged vertex shader for `mode`
///
/// `diffuse` is blended towards `fogColor` by the fog factor of the
/// vertex's view-space depth; the rasterizer carries the result to the
/// fragments through `color`.
///
/// # Examples
///
/// ```
/// use softraster::core::shader::builtin::{fog_vertex, FogMode};
/// use softraster::core::renderer::Renderer;
/// use softraster::core::surface::MemorySurface;
///
/// let mut renderer = Renderer::new(MemorySurface::new(8, 8));
/// renderer.set_vertex_shader(fog_vertex(FogMode::Exp2));
/// renderer.uniforms_mut().set("fogDensity", 0.1_f32);
/// ```
pub fn fog_vertex(mode: FogMode) -> impl Fn(&mut Varyings, &VertexAttributes, &Uniforms) + Copy {
    move |out, attrs, uniforms| {
        let view_position = uniforms.model_view_matrix * attrs.position();
        let factor = mode.factor(-view_position.z, uniforms);

        let diffuse = uniforms.vec4_or("diffuse", Vec4::ONE);
        let fog_color = uniforms.vec3_or("fogColor", Vec3::splat(0.5));
        out.color = fog_color.lerp(diffuse.truncate(), factor).extend(diffuse.w);
        out.set_uv(attrs.vec2("uv"));
        out.position = uniforms.projection_matrix * view_position;
    }
}

// ========== Water ==========

/// Animated water surface
///
/// Vertices bob along their normal with a phase of `speed · time · d`,
/// where `d` is the distance of the scaled uv from the origin. The displaced
/// vertex is lit with phong lighting, and the result is brightened by how
/// far it moved relative to `intensity`.
pub fn water_vertex(out: &mut Varyings, attrs: &VertexAttributes, uniforms: &Uniforms) {
    let time = uniforms.float_or("time", 0.0);
    let intensity = uniforms.float_or("intensity", 0.02);
    let speed = uniforms.float_or("speed", 2.0);
    let scale = uniforms.float_or("textScale", 1.0);

    let position = attrs.position().truncate();
    let normal = attrs.vec3("normal");
    let uv = attrs.vec2("uv");
    let d = ((uv * scale) % scale).length();

    let phase = speed * time * d;
    let wave = Vec3::new(phase.sin(), phase.cos(), phase.sin()) * intensity;
    let displaced = position + wave * normal;

    let offset = (displaced - position).length();
    let crest = if offset > f32::EPSILON {
        intensity / offset
    } else {
        1.0
    };

    let view_normal = (uniforms.normal_matrix * normal).normalize_or_zero();
    let view_position = uniforms.model_view_matrix * displaced.extend(1.0);

    let texel = sample_or_white(uniforms.texture("text1"), uv.x * scale, uv.y * scale);
    let material = Material::from_uniforms(uniforms).with_texel(texel);
    let lit = lighting::phong(
        Vec3::ZERO,
        view_position.truncate(),
        view_normal,
        uniforms.lights("lights"),
        &material,
    );

    out.color = (lit.truncate() * crest)
        .clamp(Vec3::ZERO, Vec3::ONE)
        .extend(lit.w);
    out.set_normal(view_normal);
    out.set_uv(uv);
    out.position = uniforms.projection_matrix * view_position;
}

/// Pass the interpolated color through
pub fn default_fragment(input: &Varyings, _uniforms: &Uniforms) -> Option<Vec4> {
    Some(input.color)
}

/// Modulate the interpolated color by `text1`
pub fn base_texture(input: &Varyings, uniforms: &Uniforms) -> Option<Vec4> {
    let scale = uniforms.float_or("textScale", 1.0);
    let uv = input.uv() * scale;
    Some(input.color * sample_or_white(uniforms.texture("text1"), uv.x, uv.y))
}

/// Procedural checkerboard over uv space
///
/// Even cells darken the color to 10%; alpha is kept.
pub fn checkers(input: &Varyings, uniforms: &Uniforms) -> Option<Vec4> {
    let scale = uniforms.float_or("textScale", 8.0);
    let uv = input.uv();
    let cu = (uv.x * scale) as i32;
    let cv = (uv.y * scale) as i32;

    let color = input.color;
    if (cu + cv) % 2 == 0 {
        Some((color.truncate() * 0.1).extend(color.w))
    } else {
        Some(color)
    }
}

/// Draw only the uv grid lines; everything else is discarded
pub fn uv_wire(input: &Varyings, uniforms: &Uniforms) -> Option<Vec4> {
    let scale = uniforms.float_or("textScale", 8.0);
    let line_width = uniforms.float_or("lineWidth", 0.01);
    let factor = scale * line_width;
    let half = factor * 0.5;

    let uv = input.uv();
    let cu = (uv.x * scale).abs() + half;
    let cv = (uv.y * scale).abs() + half;

    if cu.fract() < factor || cv.fract() < factor {
        Some(input.color)
    } else {
        None
    }
}

/// Per-fragment toon shading
///
/// Expects view-space normal and position from [`phong_vertex`].
pub fn cel_fragment(input: &Varyings, uniforms: &Uniforms) -> Option<Vec4> {
    let scale = uniforms.float_or("textScale", 1.0);
    let uv = input.uv() * scale;
    let texel = sample_or_white(uniforms.texture("text1"), uv.x, uv.y);
    let material = Material::from_uniforms(uniforms).with_texel(texel);

    Some(lighting::cel(
        Vec3::ZERO,
        input.world_position(),
        input.normal().normalize_or_zero(),
        uniforms.lights("lights"),
        &material,
        uniforms.float_or("celLevel", 4.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::MeshBuffer;
    use crate::core::shader::{Light, Texture};
    use crate::core::varyings::AttributeSet;
    use glam::{Mat4, Vec2};

    fn attrs() -> VertexAttributes {
        attrs_with_normal(Vec3::new(0.0, 0.0, 2.0))
    }

    fn attrs_with_normal(normal: Vec3) -> VertexAttributes {
        let mesh = MeshBuffer::builder()
            .attribute("position", 3, vec![1.0, 2.0, 3.0])
            .attribute("normal", 3, normal.to_array().to_vec())
            .attribute("uv", 2, vec![0.25, 0.75])
            .build()
            .unwrap();
        let mut attrs = VertexAttributes::default();
        mesh.read_vertex(0, &mut attrs).unwrap();
        attrs
    }

    fn close(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    /// Uniforms placing the test vertex 10 units in front of the camera
    fn fog_uniforms() -> Uniforms {
        let mut uniforms = Uniforms::default();
        uniforms.model_view_matrix = Mat4::from_translation(Vec3::new(0.0, 0.0, -13.0));
        uniforms.set("diffuse", Vec4::new(1.0, 0.0, 0.0, 1.0));
        uniforms.set("fogColor", Vec3::new(0.0, 0.0, 1.0));
        uniforms
    }

    fn with_uv(uv: Vec2) -> Varyings {
        let mut v = Varyings::new(Vec4::W, Vec4::new(1.0, 0.5, 0.5, 1.0));
        v.set_uv(uv);
        v
    }

    #[test]
    fn test_default_vertex() {
        let mut uniforms = Uniforms::default();
        uniforms.pmv_matrix = Mat4::from_scale(Vec3::splat(2.0));
        uniforms.set("diffuse", Vec4::new(1.0, 0.0, 0.0, 1.0));

        let mut out = Varyings::default();
        default_vertex(&mut out, &attrs(), &uniforms);

        assert_eq!(out.position, Vec4::new(2.0, 4.0, 6.0, 1.0));
        assert_eq!(out.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(out.uv(), Vec2::new(0.25, 0.75));
        assert_eq!(out.attributes(), AttributeSet::UV);
    }

    #[test]
    fn test_phong_vertex_sets_view_space_attributes() {
        let mut uniforms = Uniforms::default();
        uniforms.model_view_matrix = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));

        let mut out = Varyings::default();
        phong_vertex(&mut out, &attrs(), &uniforms);

        assert_eq!(out.normal(), Vec3::Z);
        assert_eq!(out.world_position(), Vec3::new(1.0, 2.0, -2.0));
        assert_eq!(
            out.attributes(),
            AttributeSet::NORMAL | AttributeSet::WORLD_POSITION | AttributeSet::UV
        );
    }

    #[test]
    fn test_vertex_lit_without_lights_is_black() {
        let uniforms = Uniforms::default();
        let mut out = Varyings::default();
        vertex_lit(&mut out, &attrs(), &uniforms);
        assert_eq!(out.color, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_vertex_lit_with_light() {
        let mut uniforms = Uniforms::default();
        uniforms.set("lights", vec![Light::directional(Vec3::Z, Vec3::ONE)]);
        uniforms.set("specular", Vec3::ZERO);
        let mut out = Varyings::default();
        vertex_lit(&mut out, &attrs(), &uniforms);
        assert_eq!(out.color, Vec4::ONE);
    }

    #[test]
    fn test_vertex_cel_without_lights_is_black() {
        let mut out = Varyings::default();
        vertex_cel(&mut out, &attrs(), &Uniforms::default());
        assert_eq!(out.color, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(out.position, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_vertex_cel_with_light() {
        let mut uniforms = Uniforms::default();
        uniforms.set("diffuse", Vec4::new(1.0, 1.0, 1.0, 0.5));
        uniforms.set("lights", vec![Light::directional(Vec3::Z, Vec3::ONE)]);
        let mut out = Varyings::default();
        vertex_cel(&mut out, &attrs(), &uniforms);
        assert!(out.color.x > 0.9);
        assert_eq!(out.color.w, 0.5);
        assert_eq!(out.uv(), Vec2::new(0.25, 0.75));
    }

    #[test]
    fn test_fog_linear() {
        let mut uniforms = fog_uniforms();
        uniforms.set("fogStart", 0.0_f32);
        uniforms.set("fogEnd", 20.0_f32);

        let mut out = Varyings::default();
        fog_vertex(FogMode::Linear)(&mut out, &attrs(), &uniforms);
        assert!(close(out.color, Vec4::new(0.5, 0.0, 0.5, 1.0)), "got {:?}", out.color);
        assert_eq!(out.position, Vec4::new(1.0, 2.0, -10.0, 1.0));

        // Past the end only fog is left
        uniforms.set("fogEnd", 5.0_f32);
        fog_vertex(FogMode::Linear)(&mut out, &attrs(), &uniforms);
        assert!(close(out.color, Vec4::new(0.0, 0.0, 1.0, 1.0)), "got {:?}", out.color);
    }

    #[test]
    fn test_fog_exponential() {
        let mut uniforms = fog_uniforms();
        uniforms.set("fogDensity", 0.05_f32);
        let mut out = Varyings::default();

        fog_vertex(FogMode::Exp)(&mut out, &attrs(), &uniforms);
        let f = (-0.5_f32).exp();
        assert!(close(out.color, Vec4::new(f, 0.0, 1.0 - f, 1.0)), "got {:?}", out.color);

        fog_vertex(FogMode::Exp2)(&mut out, &attrs(), &uniforms);
        let f = (-0.25_f32).exp();
        assert!(close(out.color, Vec4::new(f, 0.0, 1.0 - f, 1.0)), "got {:?}", out.color);
    }

    #[test]
    fn test_fog_empty_linear_range_is_full_fog() {
        let mut uniforms = fog_uniforms();
        uniforms.set("fogStart", 10.0_f32);
        uniforms.set("fogEnd", 10.0_f32);
        assert_eq!(FogMode::Linear.factor(10.0, &uniforms), 0.0);
    }

    #[test]
    fn test_fog_mode_names() {
        assert_eq!("EXP2".parse::<FogMode>(), Ok(FogMode::Exp2));
        assert_eq!(FogMode::Linear.to_string(), "linear");
        assert!("cubic".parse::<FogMode>().is_err());
    }

    #[test]
    fn test_water_displaces_along_normal() {
        let attrs = attrs_with_normal(Vec3::Y);
        let mut uniforms = Uniforms::default();
        let mut out = Varyings::default();

        // At time 0 the wave is cos(0) = 1 along y
        water_vertex(&mut out, &attrs, &uniforms);
        assert!(close(out.position, Vec4::new(1.0, 2.02, 3.0, 1.0)), "got {:?}", out.position);
        assert_eq!(out.normal(), Vec3::Y);

        uniforms.set("time", 1.0_f32);
        let mut later = Varyings::default();
        water_vertex(&mut later, &attrs, &uniforms);
        assert!(!close(later.position, out.position));
        assert_eq!(later.position.x, 1.0);
    }

    #[test]
    fn test_water_is_lit() {
        let mut uniforms = Uniforms::default();
        uniforms.set("lights", vec![Light::directional(Vec3::Y, Vec3::ONE)]);
        uniforms.set("specular", Vec3::ZERO);

        let mut out = Varyings::default();
        water_vertex(&mut out, &attrs_with_normal(Vec3::Y), &uniforms);
        assert_eq!(out.color, Vec4::ONE);

        // A normal with no y component does not move at time 0
        let mut flat = Varyings::default();
        water_vertex(&mut flat, &attrs(), &Uniforms::default());
        assert!(flat.color.is_finite());
        assert_eq!(flat.position, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_default_fragment_passes_color() {
        let v = with_uv(Vec2::ZERO);
        assert_eq!(default_fragment(&v, &Uniforms::default()), Some(v.color));
    }

    #[test]
    fn test_base_texture() {
        let mut uniforms = Uniforms::default();
        uniforms.set(
            "text1",
            Texture::new(1, 1, vec![Vec4::new(0.5, 0.5, 0.5, 1.0)]).unwrap(),
        );
        let c = base_texture(&with_uv(Vec2::ZERO), &uniforms).unwrap();
        assert_eq!(c, Vec4::new(0.5, 0.25, 0.25, 1.0));

        // No texture bound: color passes through
        let c = base_texture(&with_uv(Vec2::ZERO), &Uniforms::default()).unwrap();
        assert_eq!(c, Vec4::new(1.0, 0.5, 0.5, 1.0));
    }

    #[test]
    fn test_checkers_alternates() {
        let uniforms = Uniforms::default();
        let even = checkers(&with_uv(Vec2::new(0.01, 0.01)), &uniforms).unwrap();
        let odd = checkers(&with_uv(Vec2::new(0.2, 0.01)), &uniforms).unwrap();
        assert!((even - Vec4::new(0.1, 0.05, 0.05, 1.0)).abs().max_element() < 1e-6);
        assert_eq!(odd, Vec4::new(1.0, 0.5, 0.5, 1.0));
    }

    #[test]
    fn test_uv_wire_discards_between_lines() {
        let uniforms = Uniforms::default();
        assert!(uv_wire(&with_uv(Vec2::new(0.0, 0.0)), &uniforms).is_some());
        assert!(uv_wire(&with_uv(Vec2::new(0.06, 0.06)), &uniforms).is_none());
    }

    #[test]
    fn test_cel_fragment_keeps_alpha() {
        let mut uniforms = Uniforms::default();
        uniforms.set("diffuse", Vec4::new(1.0, 1.0, 1.0, 0.5));
        uniforms.set("lights", vec![Light::directional(Vec3::Z, Vec3::ONE)]);
        let mut v = with_uv(Vec2::ZERO);
        v.set_normal(Vec3::Z);
        v.set_world_position(Vec3::new(0.0, 0.0, -3.0));
        let c = cel_fragment(&v, &uniforms).unwrap();
        assert_eq!(c.w, 0.5);
        assert!(c.x > 0.9);
    }
}
