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

//! Line rasterization
//!
//! Lines are walked with Bresenham's integer error algorithm. Depth and
//! varyings are interpolated with `t = step / max(|dx|, |dy|)`, so `t`
//! advances once per plotted pixel and reaches 1 at the last endpoint.
//! Segments reaching past the framebuffer are cut first; `t` then runs over
//! the visible part of `[0, 1]` only.
//!
//! # References
//!
//! - [Bresenham's line algorithm](https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm)

use glam::DVec2;

use super::{DeviceVertex, PixelPipeline};
use crate::core::varyings::Varyings;

/// Parametric range `[t0, t1]` of the segment `from -> to` inside the box
/// `[min, max]` (Liang–Barsky)
///
/// Runs in f64: device coordinates can be far larger than the target when
/// the viewport is, and f32 would misplace the cut by whole pixels.
fn visible_range(from: DVec2, to: DVec2, min: DVec2, max: DVec2) -> Option<(f64, f64)> {
    let d = to - from;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [
        (-d.x, from.x - min.x),
        (d.x, max.x - from.x),
        (-d.y, from.y - min.y),
        (d.y, max.y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

/// Draw a projected line segment, endpoints inclusive
///
/// The segment is first cut to the framebuffer plus a one pixel margin, so
/// the walk never leaves the target no matter how large the viewport is.
/// Varyings and depth still use `t` over the whole segment.
pub(super) fn draw_line(pipeline: &mut PixelPipeline<'_>, from: DeviceVertex<'_>, to: DeviceVertex<'_>) {
    let p0 = from.position.truncate().truncate().as_dvec2();
    let p1 = to.position.truncate().truncate().as_dvec2();
    let bounds = DVec2::new(pipeline.width() as f64, pipeline.height() as f64) + 1.0;
    let Some((t0, t1)) = visible_range(p0, p1, DVec2::splat(-1.0), bounds) else {
        return;
    };

    let start = if t0 > 0.0 { p0.lerp(p1, t0) } else { p0 };
    let end = if t1 < 1.0 { p0.lerp(p1, t1) } else { p1 };

    let mut x = start.x.floor() as i64;
    let mut y = start.y.floor() as i64;
    let x1 = end.x.floor() as i64;
    let y1 = end.y.floor() as i64;

    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let steps = dx.max(dy);
    let step_t = if steps > 0 { (t1 - t0) / steps as f64 } else { 0.0 };
    let z0 = from.position.z;
    let dz = to.position.z - z0;

    let mut t = t0;
    let mut fragment = Varyings::default();

    loop {
        let t_frag = (t as f32).min(1.0);
        let z = z0 + dz * t_frag;
        if let Some(slot) = pipeline.depth_test(x as i32, y as i32, z) {
            fragment.perspective_corrected_interpolate(from.varyings, to.varyings, t_frag);
            pipeline.shade(slot, &fragment);
        }

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
        t += step_t;
    }
}
