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

//! Programmable stages and the uniform bag
//!
//! The pipeline has two programmable stages:
//!
//! - [`VertexShader`]: fills a [`Varyings`] record from raw vertex attributes
//! - [`FragmentShader`]: turns interpolated varyings into a color, or discards
//!
//! Both are implemented for plain closures with the matching signature, so
//! callers can pass `|out, attrs, uniforms| { ... }` directly.
//!
//! Shaders only read [`Uniforms`] and write to the output they are given.

pub mod builtin;
pub mod lighting;
pub mod texture;

pub use lighting::Light;
pub use texture::Texture;

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use super::mesh::VertexAttributes;
use super::varyings::Varyings;

/// Per-vertex stage
///
/// `out` starts zeroed for every invocation; the shader must write at least
/// `out.position` (clip space) and normally `out.color`.
pub trait VertexShader {
    fn shade(&self, out: &mut Varyings, attrs: &VertexAttributes, uniforms: &Uniforms);
}

impl<F> VertexShader for F
where
    F: Fn(&mut Varyings, &VertexAttributes, &Uniforms),
{
    fn shade(&self, out: &mut Varyings, attrs: &VertexAttributes, uniforms: &Uniforms) {
        self(out, attrs, uniforms)
    }
}

/// Per-fragment stage
///
/// Returns the RGBA color to write, or `None` to discard the fragment
/// (neither color nor depth are written).
pub trait FragmentShader {
    fn shade(&self, input: &Varyings, uniforms: &Uniforms) -> Option<Vec4>;
}

impl<F> FragmentShader for F
where
    F: Fn(&Varyings, &Uniforms) -> Option<Vec4>,
{
    fn shade(&self, input: &Varyings, uniforms: &Uniforms) -> Option<Vec4> {
        self(input, uniforms)
    }
}

/// A single named uniform value
#[derive(Debug, Clone)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    Texture(Arc<Texture>),
    Lights(Arc<[Light]>),
}

/// Uniform bag passed to both shader stages
///
/// The transform fields are filled by the [`Renderer`](super::renderer::Renderer)
/// before every draw. Everything else lives in a name-keyed map; typed
/// lookups return the caller's default when a name is missing or holds a
/// value of a different type.
///
/// # Examples
///
/// ```
/// use glam::Vec4;
/// use softraster::core::shader::Uniforms;
///
/// let mut uniforms = Uniforms::default();
/// uniforms.set("diffuse", Vec4::new(1.0, 0.0, 0.0, 1.0));
/// uniforms.set("textScale", 4.0_f32);
///
/// assert_eq!(uniforms.vec4_or("diffuse", Vec4::ONE), Vec4::new(1.0, 0.0, 0.0, 1.0));
/// assert_eq!(uniforms.float_or("textScale", 8.0), 4.0);
/// assert_eq!(uniforms.float_or("shininess", 20.0), 20.0);
/// ```
#[derive(Debug, Clone)]
pub struct Uniforms {
    pub model_matrix: Mat4,
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    pub model_view_matrix: Mat4,
    /// projection · view · model
    pub pmv_matrix: Mat4,
    /// Inverse transpose of the model-view rotation part
    pub normal_matrix: Mat3,
    pub camera_position: Vec3,
    pub(crate) values: HashMap<String, UniformValue>,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            model_matrix: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            model_view_matrix: Mat4::IDENTITY,
            pmv_matrix: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            camera_position: Vec3::ZERO,
            values: HashMap::new(),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        UniformValue::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Mat3> for UniformValue {
    fn from(value: Mat3) -> Self {
        UniformValue::Mat3(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

impl From<Texture> for UniformValue {
    fn from(value: Texture) -> Self {
        UniformValue::Texture(Arc::new(value))
    }
}

impl From<Arc<Texture>> for UniformValue {
    fn from(value: Arc<Texture>) -> Self {
        UniformValue::Texture(value)
    }
}

impl From<Vec<Light>> for UniformValue {
    fn from(value: Vec<Light>) -> Self {
        UniformValue::Lights(value.into())
    }
}

impl Uniforms {
    /// Insert or replace a named value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    /// Copy every named value of `other` into `self`, replacing duplicates
    pub fn extend_from(&mut self, other: &Uniforms) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    pub fn float_or(&self, name: &str, default: f32) -> f32 {
        match self.values.get(name) {
            Some(UniformValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn vec2_or(&self, name: &str, default: Vec2) -> Vec2 {
        match self.values.get(name) {
            Some(UniformValue::Vec2(v)) => *v,
            _ => default,
        }
    }

    /// Vec3 lookup; a Vec4 value is truncated
    pub fn vec3_or(&self, name: &str, default: Vec3) -> Vec3 {
        match self.values.get(name) {
            Some(UniformValue::Vec3(v)) => *v,
            Some(UniformValue::Vec4(v)) => v.truncate(),
            _ => default,
        }
    }

    pub fn vec4_or(&self, name: &str, default: Vec4) -> Vec4 {
        match self.values.get(name) {
            Some(UniformValue::Vec4(v)) => *v,
            _ => default,
        }
    }

    pub fn mat4_or(&self, name: &str, default: Mat4) -> Mat4 {
        match self.values.get(name) {
            Some(UniformValue::Mat4(v)) => *v,
            _ => default,
        }
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        match self.values.get(name) {
            Some(UniformValue::Texture(t)) => Some(t),
            _ => None,
        }
    }

    /// Light list; empty when unset
    pub fn lights(&self, name: &str) -> &[Light] {
        match self.values.get(name) {
            Some(UniformValue::Lights(lights)) => lights,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookup_falls_back_on_type_mismatch() {
        let mut uniforms = Uniforms::default();
        uniforms.set("diffuse", 1.0_f32);
        assert_eq!(uniforms.vec4_or("diffuse", Vec4::ONE), Vec4::ONE);
        assert_eq!(uniforms.float_or("diffuse", 0.0), 1.0);
    }

    #[test]
    fn test_vec3_lookup_truncates_vec4() {
        let mut uniforms = Uniforms::default();
        uniforms.set("specular", Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(uniforms.vec3_or("specular", Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_extend_from_overrides() {
        let mut base = Uniforms::default();
        base.set("a", 1.0_f32);
        base.set("b", 2.0_f32);
        let mut user = Uniforms::default();
        user.set("b", 3.0_f32);
        base.extend_from(&user);
        assert_eq!(base.float_or("a", 0.0), 1.0);
        assert_eq!(base.float_or("b", 0.0), 3.0);
    }

    #[test]
    fn test_closures_are_shaders() {
        let vs = |out: &mut Varyings, attrs: &VertexAttributes, _: &Uniforms| {
            out.position = attrs.position();
        };
        let fs = |_: &Varyings, _: &Uniforms| Some(Vec4::ONE);

        let uniforms = Uniforms::default();
        let mut out = Varyings::default();
        VertexShader::shade(&vs, &mut out, &VertexAttributes::default(), &uniforms);
        assert_eq!(out.position, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(FragmentShader::shade(&fs, &out, &uniforms), Some(Vec4::ONE));
    }
}
