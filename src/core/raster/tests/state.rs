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

//! Unit tests for raster state handling

use super::*;
use crate::core::raster::{
    BlendEquation, BlendFactor, CullFace, DepthFunc, RenderState, Viewport,
};

#[test]
fn test_default_state() {
    let raster = Raster::new(4, 4);
    assert_eq!(*raster.state(), RenderState::default());
    assert_eq!(raster.state().cull_face, CullFace::Back);
    assert_eq!(raster.state().depth_func, DepthFunc::Less);
    assert!(raster.state().depth_write);
    assert!(!raster.state().blend.enabled);
}

#[test]
fn test_named_setters_accept_any_case() {
    let mut raster = Raster::new(4, 4);
    raster.set_cull_face_named("FRONT").unwrap();
    raster.set_depth_func_named("lequal").unwrap();
    raster.set_blend_func_named("src_alpha", "ONE_MINUS_SRC_ALPHA").unwrap();
    raster.set_blend_equation_named("invSub").unwrap();

    let state = raster.state();
    assert_eq!(state.cull_face, CullFace::Front);
    assert_eq!(state.depth_func, DepthFunc::LEqual);
    assert_eq!(state.blend.src_rgb, BlendFactor::SrcAlpha);
    assert_eq!(state.blend.dst_alpha, BlendFactor::OneMinusSrcAlpha);
    assert_eq!(state.blend.equation_rgb, BlendEquation::InvSub);
    assert_eq!(state.blend.equation_alpha, BlendEquation::InvSub);
}

#[test]
fn test_unknown_names_keep_previous_state() {
    let mut raster = Raster::new(4, 4);
    let before = *raster.state();

    let warning = raster.set_cull_face_named("sideways").unwrap_err();
    assert_eq!(warning.setting, "cull_face");
    assert_eq!(warning.value, "sideways");

    assert!(raster.set_depth_func_named("sometimes").is_err());
    assert!(raster.set_blend_equation_named("mul").is_err());

    assert_eq!(*raster.state(), before);
}

#[test]
fn test_separate_setters_are_atomic() {
    let mut raster = Raster::new(4, 4);
    let before = *raster.state();

    assert!(raster
        .set_blend_func_separate_named("one", "one", "srcAlpha", "bogus")
        .is_err());
    assert!(raster.set_blend_equation_separate_named("max", "bogus").is_err());
    assert_eq!(*raster.state(), before);

    raster
        .set_blend_func_separate_named("one", "zero", "dstAlpha", "constantAlpha")
        .unwrap();
    let blend = raster.state().blend;
    assert_eq!(blend.src_rgb, BlendFactor::One);
    assert_eq!(blend.dst_rgb, BlendFactor::Zero);
    assert_eq!(blend.src_alpha, BlendFactor::DstAlpha);
    assert_eq!(blend.dst_alpha, BlendFactor::ConstantAlpha);
}

#[test]
fn test_invalid_viewport_rejected() {
    let mut raster = Raster::new(4, 4);
    assert!(raster.set_viewport(Viewport::new(0.0, 0.0, 0.0, 1.0)).is_err());
    assert!(raster.set_viewport(Viewport::new(f32::NAN, 0.0, 1.0, 1.0)).is_err());
    assert_eq!(raster.state().viewport, Viewport::default());

    raster.set_viewport(Viewport::new(0.25, 0.25, 0.5, 0.5)).unwrap();
    assert_eq!(raster.state().viewport, Viewport::new(0.25, 0.25, 0.5, 0.5));
}

#[test]
fn test_resize() {
    let mut raster = Raster::new(4, 4);
    raster.resize(0, 8);
    assert_eq!((raster.width(), raster.height()), (4, 4));

    raster.resize(6, 3);
    assert_eq!((raster.width(), raster.height()), (6, 3));
    assert_eq!(raster.framebuffer().color().len(), 18);
}

#[test]
fn test_draw_after_resize_uses_new_size() {
    let mut raster = Raster::new(4, 4);
    raster.resize(10, 10);
    raster.clear(BLACK, 1.0);
    draw(&mut raster, &screen_triangle(0.0, WHITE));
    assert_eq!(raster.framebuffer().pixel(9, 9), Some(WHITE));
}
