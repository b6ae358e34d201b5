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

//! Vertex shader outputs and their interpolation
//!
//! [`Varyings`] is a fixed-schema record: the clip-space `position` and the
//! `color` are always present, and the secondary attributes (normal,
//! view-space position, two uv sets) are flagged in an [`AttributeSet`] when
//! a vertex shader writes them. Every vertex of one primitive must carry the
//! same set; the rasterizer rejects primitives that mix schemas.
//!
//! # Interpolation
//!
//! Two blends are provided:
//!
//! - [`Varyings::linear_interpolate`]: `a + t·(b - a)` on every component. Used
//!   while clipping, where vertices are still in homogeneous clip space.
//! - [`Varyings::perspective_corrected_interpolate`]: weights each endpoint by
//!   its reciprocal `w` so that attributes stay correct after the perspective
//!   divide. Used for every fragment-level blend.
//!
//! Varyings are plain `Copy` values; the pipeline mutates scratch instances in
//! place rather than allocating per fragment.

use bitflags::bitflags;
use glam::{Vec2, Vec3, Vec4};

bitflags! {
    /// Secondary attributes written by a vertex shader
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttributeSet: u8 {
        /// Surface normal
        const NORMAL = 1 << 0;
        /// Position before projection (view or world space)
        const WORLD_POSITION = 1 << 1;
        /// Primary texture coordinates
        const UV = 1 << 2;
        /// Secondary texture coordinates
        const UV2 = 1 << 3;
    }
}

/// Per-vertex shading outputs
///
/// # Examples
///
/// ```
/// use glam::{Vec2, Vec4};
/// use softraster::core::varyings::{AttributeSet, Varyings};
///
/// let mut v = Varyings::default();
/// v.position = Vec4::new(0.0, 0.0, 0.0, 1.0);
/// v.set_uv(Vec2::new(0.5, 0.5));
///
/// assert_eq!(v.attributes(), AttributeSet::UV);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Varyings {
    /// Clip-space position (before the perspective divide)
    pub position: Vec4,
    /// RGBA color, nominally in `[0, 1]`
    pub color: Vec4,
    normal: Vec3,
    world_position: Vec3,
    uv: Vec2,
    uv2: Vec2,
    attributes: AttributeSet,
}

impl Varyings {
    /// Create varyings with the given position and color and no secondary attributes
    pub fn new(position: Vec4, color: Vec4) -> Self {
        Self {
            position,
            color,
            ..Self::default()
        }
    }

    /// Secondary attributes present on this record
    pub fn attributes(&self) -> AttributeSet {
        self.attributes
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn set_normal(&mut self, normal: Vec3) {
        self.normal = normal;
        self.attributes |= AttributeSet::NORMAL;
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    pub fn set_world_position(&mut self, position: Vec3) {
        self.world_position = position;
        self.attributes |= AttributeSet::WORLD_POSITION;
    }

    pub fn uv(&self) -> Vec2 {
        self.uv
    }

    pub fn set_uv(&mut self, uv: Vec2) {
        self.uv = uv;
        self.attributes |= AttributeSet::UV;
    }

    pub fn uv2(&self) -> Vec2 {
        self.uv2
    }

    pub fn set_uv2(&mut self, uv: Vec2) {
        self.uv2 = uv;
        self.attributes |= AttributeSet::UV2;
    }

    /// Deep copy of `other`, schema included
    #[inline]
    pub fn copy_from(&mut self, other: &Varyings) {
        *self = *other;
    }

    /// Set `self` to `a + t·(b - a)` on every component, position included
    ///
    /// Only valid in clip space (before the perspective divide).
    #[inline]
    pub fn linear_interpolate(&mut self, a: &Varyings, b: &Varyings, t: f32) {
        self.blend(a, b, 1.0, 1.0, t);
    }

    /// Set `self` to the perspective-corrected blend of `a` and `b`
    ///
    /// With `rw0 = 1/a.w`, `rw1 = 1/b.w`, `w = 1/(rw0 + t·(rw1 - rw0))`,
    /// `r0 = rw0·w` and `r1 = rw1·w`, every component becomes
    /// `a·r0 + t·(b·r1 - a·r0)`. The interpolated `position.w` is therefore
    /// the perspective-correct `w` at `t`.
    ///
    /// When either `w` is zero, or the reciprocal blend is not finite, the
    /// correction is undefined and the linear blend is used instead.
    #[inline]
    pub fn perspective_corrected_interpolate(&mut self, a: &Varyings, b: &Varyings, t: f32) {
        let w0 = a.position.w;
        let w1 = b.position.w;
        if w0 == 0.0 || w1 == 0.0 {
            self.blend(a, b, 1.0, 1.0, t);
            return;
        }

        let rw0 = 1.0 / w0;
        let rw1 = 1.0 / w1;
        let denominator = rw0 + t * (rw1 - rw0);
        if denominator == 0.0 || !denominator.is_finite() {
            self.blend(a, b, 1.0, 1.0, t);
            return;
        }

        let w = 1.0 / denominator;
        self.blend(a, b, rw0 * w, rw1 * w, t);
    }

    /// `out = a·r0 + t·(b·r1 - a·r0)` for every component
    #[inline(always)]
    fn blend(&mut self, a: &Varyings, b: &Varyings, r0: f32, r1: f32, t: f32) {
        #[inline(always)]
        fn mix<V>(a: V, b: V, r0: f32, r1: f32, t: f32) -> V
        where
            V: Copy
                + std::ops::Mul<f32, Output = V>
                + std::ops::Add<Output = V>
                + std::ops::Sub<Output = V>,
        {
            let a = a * r0;
            let b = b * r1;
            a + (b - a) * t
        }

        self.position = mix(a.position, b.position, r0, r1, t);
        self.color = mix(a.color, b.color, r0, r1, t);
        self.normal = mix(a.normal, b.normal, r0, r1, t);
        self.world_position = mix(a.world_position, b.world_position, r0, r1, t);
        self.uv = mix(a.uv, b.uv, r0, r1, t);
        self.uv2 = mix(a.uv2, b.uv2, r0, r1, t);
        self.attributes = a.attributes;
    }
}
