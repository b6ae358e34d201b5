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

//! Homogeneous clip-space clipping
//!
//! Primitives are clipped against the six planes of the canonical view
//! volume before the perspective divide, so the rasterizer never sees a
//! vertex with non-positive `w`.
//!
//! # Plane Test
//!
//! Each plane is a `(component, sign)` pair and a point `p` is inside when
//! its signed distance is positive:
//!
//! ```text
//! d = p.w - sign · p[component]
//!
//! near:   z, -1  ->  w + z      far:   z, +1  ->  w - z
//! left:   x, -1  ->  w + x      right: x, +1  ->  w - x
//! bottom: y, -1  ->  w + y      top:   y, +1  ->  w - y
//! ```
//!
//! A point exactly on a plane (`d == 0`) counts as outside.
//!
//! # References
//!
//! - [Sutherland–Hodgman algorithm](https://en.wikipedia.org/wiki/Sutherland%E2%80%93Hodgman_algorithm)
//! - [Blinn & Newell, Clipping using homogeneous coordinates](https://dl.acm.org/doi/10.1145/965139.807398)

use bitflags::bitflags;
use glam::Vec4;

use super::varyings::Varyings;

/// One of the six view-volume planes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPlane {
    Near,
    Far,
    Left,
    Right,
    Bottom,
    Top,
}

impl ClipPlane {
    /// All planes in clipping order
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Near,
        ClipPlane::Far,
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
    ];

    /// Tested component (0 = x, 1 = y, 2 = z) and plane sign
    #[inline(always)]
    fn component_and_sign(self) -> (usize, f32) {
        match self {
            ClipPlane::Near => (2, -1.0),
            ClipPlane::Far => (2, 1.0),
            ClipPlane::Left => (0, -1.0),
            ClipPlane::Right => (0, 1.0),
            ClipPlane::Bottom => (1, -1.0),
            ClipPlane::Top => (1, 1.0),
        }
    }

    /// Signed distance `w - sign · component`; positive is inside
    #[inline(always)]
    pub fn distance(self, p: Vec4) -> f32 {
        let (component, sign) = self.component_and_sign();
        p.w - sign * p[component]
    }
}

/// Classification of a triangle against the view volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleClass {
    /// All three vertices fail the same plane
    Outside,
    /// All three vertices pass every plane
    Inside,
    /// Anything else; needs clipping
    Intersecting,
}

bitflags! {
    /// Outcome of clipping a line segment
    ///
    /// The empty set means the segment is entirely outside.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineClip: u8 {
        /// Some part of the segment is inside
        const INSIDE = 0b0001;
        /// The first endpoint was moved onto a plane
        const CLIPPED_0 = 0b0010;
        /// The second endpoint was moved onto a plane
        const CLIPPED_1 = 0b0100;
    }
}

impl LineClip {
    /// True when the whole segment was rejected
    pub fn is_outside(&self) -> bool {
        !self.contains(LineClip::INSIDE)
    }
}

/// Classify a triangle by its clip-space positions
///
/// # Examples
///
/// ```
/// use glam::Vec4;
/// use softraster::core::clip::{classify_triangle, TriangleClass};
///
/// let inside = classify_triangle(
///     Vec4::new(-0.5, -0.5, 0.0, 1.0),
///     Vec4::new(0.5, -0.5, 0.0, 1.0),
///     Vec4::new(0.0, 0.5, 0.0, 1.0),
/// );
/// assert_eq!(inside, TriangleClass::Inside);
/// ```
pub fn classify_triangle(p0: Vec4, p1: Vec4, p2: Vec4) -> TriangleClass {
    let mut inside = true;
    for plane in ClipPlane::ALL {
        let d0 = plane.distance(p0);
        let d1 = plane.distance(p1);
        let d2 = plane.distance(p2);

        if d0.max(d1).max(d2) <= 0.0 {
            return TriangleClass::Outside;
        }
        if d0.min(d1).min(d2) <= 0.0 {
            inside = false;
        }
    }

    if inside {
        TriangleClass::Inside
    } else {
        TriangleClass::Intersecting
    }
}

/// Clip a segment against a single plane, moving the outside endpoint onto it
///
/// Endpoints are rewritten in place with the clip-space linear blend.
pub fn clip_line_against_plane(v0: &mut Varyings, v1: &mut Varyings, plane: ClipPlane) -> LineClip {
    let d0 = plane.distance(v0.position);
    let d1 = plane.distance(v1.position);

    if d0 <= 0.0 && d1 <= 0.0 {
        return LineClip::empty();
    }

    if d0 <= 0.0 {
        // d1 > 0 >= d0, so the denominator is strictly positive
        let t = d1 / (d1 - d0);
        let inner = *v1;
        let outer = *v0;
        v0.linear_interpolate(&inner, &outer, t);
        LineClip::INSIDE | LineClip::CLIPPED_0
    } else if d1 <= 0.0 {
        let t = d0 / (d0 - d1);
        let inner = *v0;
        let outer = *v1;
        v1.linear_interpolate(&inner, &outer, t);
        LineClip::INSIDE | LineClip::CLIPPED_1
    } else {
        LineClip::INSIDE
    }
}

/// Clip a segment against all six planes in order
///
/// Stops at the first plane that rejects the segment. The returned flags
/// accumulate which endpoints were moved.
pub fn clip_line(v0: &mut Varyings, v1: &mut Varyings) -> LineClip {
    let mut outcome = LineClip::INSIDE;
    for plane in ClipPlane::ALL {
        let step = clip_line_against_plane(v0, v1, plane);
        if step.is_outside() {
            return LineClip::empty();
        }
        outcome |= step;
    }
    outcome
}

/// One Sutherland–Hodgman pass: clip the closed polygon `input` into `out`
fn clip_polygon_against_plane(input: &[Varyings], out: &mut Vec<Varyings>, plane: ClipPlane) {
    out.clear();
    let len = input.len();
    for i in 0..len {
        let mut a = input[i];
        let mut b = input[(i + 1) % len];

        let outcome = clip_line_against_plane(&mut a, &mut b, plane);
        if outcome.contains(LineClip::INSIDE) {
            out.push(a);
            if outcome.contains(LineClip::CLIPPED_1) {
                out.push(b);
            }
        }
    }
}

/// Triangle clipper with reusable polygon storage
///
/// A triangle clipped by six planes has at most nine vertices; the two
/// internal buffers are sized for that once and reused for every triangle.
#[derive(Debug)]
pub struct Clipper {
    polygon: Vec<Varyings>,
    scratch: Vec<Varyings>,
}

impl Default for Clipper {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipper {
    pub fn new() -> Self {
        Self {
            polygon: Vec::with_capacity(9),
            scratch: Vec::with_capacity(9),
        }
    }

    /// Clip a triangle to the view volume, returning a convex polygon
    ///
    /// The result is a triangle fan around its first vertex:
    /// - empty when the triangle is fully outside
    /// - exactly `[v0, v1, v2]` when it is fully inside
    /// - the clipped polygon otherwise (possibly empty)
    pub fn clip_triangle(&mut self, v0: &Varyings, v1: &Varyings, v2: &Varyings) -> &[Varyings] {
        self.polygon.clear();

        match classify_triangle(v0.position, v1.position, v2.position) {
            TriangleClass::Outside => return &self.polygon,
            TriangleClass::Inside => {
                self.polygon.extend_from_slice(&[*v0, *v1, *v2]);
                return &self.polygon;
            }
            TriangleClass::Intersecting => {
                self.polygon.extend_from_slice(&[*v0, *v1, *v2]);
            }
        }

        for plane in ClipPlane::ALL {
            clip_polygon_against_plane(&self.polygon, &mut self.scratch, plane);
            std::mem::swap(&mut self.polygon, &mut self.scratch);
            if self.polygon.is_empty() {
                break;
            }
        }

        &self.polygon
    }
}
