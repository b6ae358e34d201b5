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

//! Raw per-vertex attribute records handed to vertex shaders

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};

use super::AttributeDescriptor;

/// The raw attributes of one vertex, extracted from a [`MeshBuffer`](super::MeshBuffer)
///
/// Lookups by name never fail: an attribute the mesh does not provide reads
/// as zeros of the requested shape, and missing trailing components are
/// zero-filled.
#[derive(Debug, Clone)]
pub struct VertexAttributes {
    layout: Arc<[AttributeDescriptor]>,
    values: Vec<f32>,
}

impl Default for VertexAttributes {
    fn default() -> Self {
        Self {
            layout: Arc::from(Vec::new()),
            values: Vec::new(),
        }
    }
}

impl VertexAttributes {
    /// Replace the contents with one vertex record, reusing the storage
    pub(crate) fn assign(&mut self, layout: &Arc<[AttributeDescriptor]>, record: &[f32]) {
        if !Arc::ptr_eq(&self.layout, layout) {
            self.layout = Arc::clone(layout);
        }
        self.values.clear();
        self.values.extend_from_slice(record);
    }

    /// Components of the named attribute, if the mesh provides it
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.layout
            .iter()
            .find(|d| d.name == name)
            .map(|d| &self.values[d.offset..d.offset + d.components])
    }

    fn fill<const N: usize>(&self, name: &str) -> [f32; N] {
        let mut out = [0.0; N];
        if let Some(values) = self.get(name) {
            for (o, v) in out.iter_mut().zip(values) {
                *o = *v;
            }
        }
        out
    }

    pub fn scalar(&self, name: &str) -> f32 {
        self.fill::<1>(name)[0]
    }

    pub fn vec2(&self, name: &str) -> Vec2 {
        Vec2::from_array(self.fill(name))
    }

    pub fn vec3(&self, name: &str) -> Vec3 {
        Vec3::from_array(self.fill(name))
    }

    pub fn vec4(&self, name: &str) -> Vec4 {
        Vec4::from_array(self.fill(name))
    }

    /// Object-space position as a homogeneous point (w = 1)
    pub fn position(&self) -> Vec4 {
        self.vec3("position").extend(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::MeshBuffer;
    use super::*;

    #[test]
    fn test_missing_attribute_reads_as_zero() {
        let mesh = MeshBuffer::builder()
            .attribute("position", 3, vec![1.0, 2.0, 3.0])
            .build()
            .unwrap();
        let mut attrs = VertexAttributes::default();
        mesh.read_vertex(0, &mut attrs).unwrap();

        assert_eq!(attrs.get("uv"), None);
        assert_eq!(attrs.vec2("uv"), Vec2::ZERO);
        assert_eq!(attrs.vec3("normal"), Vec3::ZERO);
    }

    #[test]
    fn test_short_attribute_is_zero_padded() {
        let mesh = MeshBuffer::builder()
            .attribute("position", 3, vec![1.0, 2.0, 3.0])
            .build()
            .unwrap();
        let mut attrs = VertexAttributes::default();
        mesh.read_vertex(0, &mut attrs).unwrap();

        assert_eq!(attrs.vec4("position"), Vec4::new(1.0, 2.0, 3.0, 0.0));
        assert_eq!(attrs.position(), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(attrs.scalar("position"), 1.0);
    }
}
