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

//! Unit tests for the raster

mod state;
mod triangle;

use glam::Vec4;

use super::Raster;
use crate::core::shader::Uniforms;
use crate::core::varyings::Varyings;

pub(super) const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
pub(super) const WHITE: Vec4 = Vec4::ONE;
pub(super) const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub(super) const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// Clip-space vertex with `w = 1`
pub(super) fn vertex(x: f32, y: f32, z: f32, color: Vec4) -> Varyings {
    Varyings::new(Vec4::new(x, y, z, 1.0), color)
}

/// Counter-clockwise triangle covering the lower part of the viewport
///
/// On a 10×10 target it projects to `(0, 10)`, `(10, 10)`, `(5, 0)`.
pub(super) fn screen_triangle(z: f32, color: Vec4) -> [Varyings; 3] {
    [
        vertex(-1.0, -1.0, z, color),
        vertex(1.0, -1.0, z, color),
        vertex(0.0, 1.0, z, color),
    ]
}

/// Raster cleared to opaque black at the far plane
pub(super) fn cleared(width: usize, height: usize) -> Raster {
    let mut raster = Raster::new(width, height);
    raster.clear(BLACK, 1.0);
    raster
}

pub(super) fn draw(raster: &mut Raster, [a, b, c]: &[Varyings; 3]) {
    raster.raster_triangle(a, b, c, &Uniforms::default()).unwrap();
}

pub(super) fn approx_eq(a: Vec4, b: Vec4, tolerance: f32) -> bool {
    (a - b).abs().max_element() <= tolerance
}
