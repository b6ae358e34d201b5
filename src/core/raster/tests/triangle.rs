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

//! Unit tests for triangle coverage, culling and clipping

use glam::Vec4;

use super::*;
use crate::core::error::RasterError;
use crate::core::raster::{BlendFactor, CullFace, Viewport, MAX_DEPTH};
use crate::core::shader::Uniforms;
use crate::core::surface::MemorySurface;

/// Columns covered in each row of the 10×10 screen triangle
fn expected_span(row: i32) -> Option<std::ops::RangeInclusive<i32>> {
    match row {
        0 => None,
        1 | 2 => Some(4..=5),
        3 | 4 => Some(3..=6),
        5 | 6 => Some(2..=7),
        7 | 8 => Some(1..=8),
        9 => Some(0..=9),
        _ => None,
    }
}

#[test]
fn test_triangle_coverage_mask() {
    let mut raster = cleared(10, 10);
    draw(&mut raster, &screen_triangle(0.0, WHITE));

    assert_eq!(raster.primitive_count(), 1);
    for y in 0..10 {
        for x in 0..10 {
            let inside = expected_span(y).is_some_and(|span| span.contains(&x));
            let (color, depth) = if inside { (WHITE, 32767) } else { (BLACK, MAX_DEPTH) };
            assert_eq!(raster.framebuffer().pixel(x, y), Some(color), "color at ({}, {})", x, y);
            assert_eq!(raster.depth_at(x, y), Some(depth), "depth at ({}, {})", x, y);
        }
    }
}

#[test]
fn test_shared_edge_drawn_once() {
    // Two triangles forming a square; every pixel is touched exactly once
    let mut raster = cleared(8, 8);
    raster.set_blend_enabled(true);
    raster.set_blend_func(BlendFactor::One, BlendFactor::One);
    raster.clear(Vec4::new(0.0, 0.0, 0.0, 0.0), 1.0);

    let step = Vec4::new(0.25, 0.25, 0.25, 0.25);
    let quad = [
        vertex(-1.0, -1.0, 0.0, step),
        vertex(1.0, -1.0, 0.0, step),
        vertex(1.0, 1.0, 0.0, step),
        vertex(-1.0, 1.0, 0.0, step),
    ];
    let uniforms = Uniforms::default();
    raster.raster_triangle(&quad[0], &quad[1], &quad[2], &uniforms).unwrap();
    raster.raster_triangle(&quad[0], &quad[2], &quad[3], &uniforms).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let pixel = raster.framebuffer().pixel(x, y).unwrap();
            assert!(approx_eq(pixel, step, 1.0 / 255.0), "pixel ({}, {}) = {:?}", x, y, pixel);
        }
    }
}

#[test]
fn test_color_interpolation() {
    let mut raster = cleared(10, 10);
    let [a, b, c] = screen_triangle(0.0, RED);
    let b = Varyings::new(b.position, BLUE);
    raster.raster_triangle(&a, &b, &c, &Uniforms::default()).unwrap();

    let left = raster.framebuffer().pixel(0, 9).unwrap();
    let right = raster.framebuffer().pixel(9, 9).unwrap();
    assert!(left.x > left.z);
    assert!(right.z > right.x);
}

#[test]
fn test_back_face_culled_by_default() {
    let mut raster = cleared(10, 10);
    let [a, b, c] = screen_triangle(0.0, WHITE);

    draw(&mut raster, &[a, c, b]);
    assert_eq!(raster.primitive_count(), 0);
    assert_eq!(raster.framebuffer().pixel(5, 9), Some(BLACK));

    draw(&mut raster, &[a, b, c]);
    assert_eq!(raster.primitive_count(), 1);
}

#[test]
fn test_front_face_culling() {
    let mut raster = cleared(10, 10);
    raster.set_cull_face(CullFace::Front);
    let [a, b, c] = screen_triangle(0.0, WHITE);

    draw(&mut raster, &[a, b, c]);
    assert_eq!(raster.primitive_count(), 0);

    draw(&mut raster, &[a, c, b]);
    assert_eq!(raster.primitive_count(), 1);
    assert_eq!(raster.framebuffer().pixel(5, 9), Some(WHITE));
}

#[test]
fn test_cull_none_draws_both_windings() {
    let mut raster = cleared(10, 10);
    raster.set_cull_face(CullFace::None);
    let [a, b, c] = screen_triangle(0.0, WHITE);

    draw(&mut raster, &[a, c, b]);
    draw(&mut raster, &[a, b, c]);
    assert_eq!(raster.primitive_count(), 2);
}

#[test]
fn test_degenerate_triangle_skipped() {
    let mut raster = cleared(10, 10);
    raster.set_cull_face(CullFace::None);
    draw(
        &mut raster,
        &[
            vertex(-1.0, -1.0, 0.0, WHITE),
            vertex(0.0, 0.0, 0.0, WHITE),
            vertex(1.0, 1.0, 0.0, WHITE),
        ],
    );

    assert_eq!(raster.primitive_count(), 0);
    assert!(raster.framebuffer().color().iter().all(|&c| c == raster.framebuffer().packing().pack(BLACK)));
}

#[test]
fn test_triangle_behind_near_plane() {
    let mut raster = cleared(10, 10);
    draw(&mut raster, &screen_triangle(-2.0, WHITE));
    assert_eq!(raster.primitive_count(), 0);
}

#[test]
fn test_partially_visible_triangle_is_clipped() {
    let mut raster = cleared(10, 10);
    raster.set_cull_face(CullFace::None);
    draw(
        &mut raster,
        &[
            vertex(-3.0, -1.0, 0.0, WHITE),
            vertex(1.0, -1.0, 0.0, WHITE),
            vertex(1.0, 1.0, 0.0, WHITE),
        ],
    );

    assert!(raster.primitive_count() >= 1);
    // Lower-right corner is inside, upper-left corner is not
    assert_eq!(raster.framebuffer().pixel(9, 9), Some(WHITE));
    assert_eq!(raster.framebuffer().pixel(0, 0), Some(BLACK));
}

#[test]
fn test_viewport_restricts_output() {
    let mut raster = cleared(10, 10);
    raster.set_viewport(Viewport::new(0.5, 0.0, 0.5, 1.0)).unwrap();
    draw(&mut raster, &screen_triangle(0.0, WHITE));

    for x in 0..5 {
        assert_eq!(raster.framebuffer().pixel(x, 9), Some(BLACK));
    }
    assert_eq!(raster.framebuffer().pixel(7, 9), Some(WHITE));
}

#[test]
fn test_discarded_fragments_write_nothing() {
    let mut raster = cleared(10, 10);
    raster.set_fragment_shader(|_: &Varyings, _: &Uniforms| -> Option<Vec4> { None });
    draw(&mut raster, &screen_triangle(0.0, WHITE));

    // The primitive still counts
    assert_eq!(raster.primitive_count(), 1);
    assert_eq!(raster.framebuffer().pixel(5, 9), Some(BLACK));
    assert_eq!(raster.depth_at(5, 9), Some(MAX_DEPTH));
}

#[test]
fn test_schema_mismatch_rejected() {
    let mut raster = cleared(10, 10);
    let [a, b, c] = screen_triangle(0.0, WHITE);
    let mut c = c;
    c.set_uv(glam::Vec2::new(0.5, 0.5));

    let result = raster.raster_triangle(&a, &b, &c, &Uniforms::default());
    assert!(matches!(result, Err(RasterError::SchemaMismatch { .. })));
    assert_eq!(raster.primitive_count(), 0);
}

#[test]
fn test_flush_presents_and_reports_count() {
    let mut raster = cleared(10, 10);
    draw(&mut raster, &screen_triangle(0.0, WHITE));

    let mut surface = MemorySurface::new(10, 10);
    assert_eq!(raster.flush(&mut surface), 1);
    assert_eq!(surface.frame_size(), (10, 10));
    assert_eq!(surface.pixel(5, 9), Some([255, 255, 255, 255]));
    assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 255]));

    raster.clear(BLACK, 1.0);
    assert_eq!(raster.primitive_count(), 0);
}
