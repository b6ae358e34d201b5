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

//! Scanline triangle fill
//!
//! # Algorithm
//!
//! 1. Sort vertices by device y (top to bottom)
//! 2. Split at the middle vertex into an upper half (top → middle) and a
//!    lower half (middle → bottom); both halves share the long edge
//!    top → bottom
//! 3. For every row whose pixel center lies inside a half, interpolate x,
//!    depth and varyings at both edges
//! 4. Walk the span between the edges, sampling pixel centers
//!
//! Coverage is half-open on both axes: a pixel is filled when its center
//! satisfies `top <= y < bottom` and `left <= x < right`, so edges shared by
//! adjacent triangles are drawn exactly once.

use std::ops::Range;

use super::{DeviceVertex, PixelPipeline};
use crate::core::varyings::Varyings;

/// First pixel index whose center is at or past `coord`
#[inline]
fn first_center(coord: f32) -> i32 {
    (coord - 0.5).ceil() as i32
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One end of a span
#[derive(Clone, Copy)]
struct SpanEnd<'a> {
    x: f32,
    z: f32,
    varyings: &'a Varyings,
}

/// Fill a projected triangle
///
/// Triangles with zero height produce no rows and are skipped without
/// dividing by their extent.
pub(super) fn fill_triangle(pipeline: &mut PixelPipeline<'_>, vertices: [DeviceVertex<'_>; 3]) {
    let mut sorted = vertices;
    sorted.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
    let [top, mid, bottom] = sorted;

    if !(bottom.position.y > top.position.y) {
        return;
    }

    let rows = pipeline.height() as i32;
    let upper = first_center(top.position.y).max(0)..first_center(mid.position.y).min(rows);
    let lower = first_center(mid.position.y).max(0)..first_center(bottom.position.y).min(rows);

    fill_half(pipeline, (&top, &mid), (&top, &bottom), upper);
    fill_half(pipeline, (&mid, &bottom), (&top, &bottom), lower);
}

/// Fill the rows of one half between a short edge and the long edge
fn fill_half(
    pipeline: &mut PixelPipeline<'_>,
    short: (&DeviceVertex<'_>, &DeviceVertex<'_>),
    long: (&DeviceVertex<'_>, &DeviceVertex<'_>),
    rows: Range<i32>,
) {
    let (s0, s1) = (short.0.position, short.1.position);
    let (l0, l1) = (long.0.position, long.1.position);
    let short_dy = s1.y - s0.y;
    let long_dy = l1.y - l0.y;

    // Spans with zero vertical extent
    if !(short_dy > 0.0 && long_dy > 0.0) {
        return;
    }

    let mut edge_a = Varyings::default();
    let mut edge_b = Varyings::default();
    let mut fragment = Varyings::default();

    for y in rows {
        let center = y as f32 + 0.5;
        let ta = (center - s0.y) / short_dy;
        let tb = (center - l0.y) / long_dy;

        edge_a.perspective_corrected_interpolate(short.0.varyings, short.1.varyings, ta);
        edge_b.perspective_corrected_interpolate(long.0.varyings, long.1.varyings, tb);

        let a = SpanEnd {
            x: lerp(s0.x, s1.x, ta),
            z: lerp(s0.z, s1.z, ta),
            varyings: &edge_a,
        };
        let b = SpanEnd {
            x: lerp(l0.x, l1.x, tb),
            z: lerp(l0.z, l1.z, tb),
            varyings: &edge_b,
        };
        draw_span(pipeline, y, a, b, &mut fragment);
    }
}

/// Shade the pixels of row `y` whose centers fall in `[left.x, right.x)`
fn draw_span(
    pipeline: &mut PixelPipeline<'_>,
    y: i32,
    a: SpanEnd<'_>,
    b: SpanEnd<'_>,
    fragment: &mut Varyings,
) {
    let (left, right) = if a.x <= b.x { (a, b) } else { (b, a) };
    let width = right.x - left.x;
    if !(width > 0.0) {
        return;
    }

    let first = first_center(left.x).max(0);
    let last = first_center(right.x).min(pipeline.width() as i32);
    let dz = right.z - left.z;

    for x in first..last {
        let t = (x as f32 + 0.5 - left.x) / width;
        let z = left.z + dz * t;
        if let Some(slot) = pipeline.depth_test(x, y, z) {
            fragment.perspective_corrected_interpolate(left.varyings, right.varyings, t);
            pipeline.shade(slot, fragment);
        }
    }
}
