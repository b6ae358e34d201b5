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

//! Fixed-function blend stage
//!
//! Blending combines the fragment color (`src`) with the color already in
//! the framebuffer (`dst`):
//!
//! ```text
//! rgb   = eq_rgb(src_factor_rgb(src.rgb), dst_factor_rgb(dst.rgb))
//! alpha = eq_alpha(src_factor_alpha(src.a), dst_factor_alpha(dst.a))
//! ```
//!
//! Every factor scales its input by a term taken from the source color, the
//! destination color or the constant blend color. The RGB and alpha tables
//! share names but the alpha variants only look at the `a` channel of each
//! operand (so the alpha `srcColor` factor is `src.a`).

use std::fmt;
use std::str::FromStr;

use glam::{Vec3, Vec4};

use super::state::matches_name;
use crate::core::error::ConfigWarning;

/// Blend factor selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

impl BlendFactor {
    pub const ALL: [BlendFactor; 14] = [
        BlendFactor::Zero,
        BlendFactor::One,
        BlendFactor::SrcColor,
        BlendFactor::OneMinusSrcColor,
        BlendFactor::DstColor,
        BlendFactor::OneMinusDstColor,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha,
        BlendFactor::ConstantColor,
        BlendFactor::OneMinusConstantColor,
        BlendFactor::ConstantAlpha,
        BlendFactor::OneMinusConstantAlpha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlendFactor::Zero => "zero",
            BlendFactor::One => "one",
            BlendFactor::SrcColor => "srcColor",
            BlendFactor::OneMinusSrcColor => "oneMinusSrcColor",
            BlendFactor::DstColor => "dstColor",
            BlendFactor::OneMinusDstColor => "oneMinusDstColor",
            BlendFactor::SrcAlpha => "srcAlpha",
            BlendFactor::OneMinusSrcAlpha => "oneMinusSrcAlpha",
            BlendFactor::DstAlpha => "dstAlpha",
            BlendFactor::OneMinusDstAlpha => "oneMinusDstAlpha",
            BlendFactor::ConstantColor => "constantColor",
            BlendFactor::OneMinusConstantColor => "oneMinusConstantColor",
            BlendFactor::ConstantAlpha => "constantAlpha",
            BlendFactor::OneMinusConstantAlpha => "oneMinusConstantAlpha",
        }
    }

    /// Scale the RGB part of `color` by this factor
    ///
    /// # Arguments
    ///
    /// * `color` - The operand being scaled (src or dst rgb)
    /// * `src` - Fragment color
    /// * `dst` - Framebuffer color
    /// * `constant` - Constant blend color
    pub fn rgb(self, color: Vec3, src: Vec4, dst: Vec4, constant: Vec4) -> Vec3 {
        match self {
            BlendFactor::Zero => Vec3::ZERO,
            BlendFactor::One => color,
            BlendFactor::SrcColor => color * src.truncate(),
            BlendFactor::OneMinusSrcColor => color * (Vec3::ONE - src.truncate()),
            BlendFactor::DstColor => color * dst.truncate(),
            BlendFactor::OneMinusDstColor => color * (Vec3::ONE - dst.truncate()),
            BlendFactor::SrcAlpha => color * src.w,
            BlendFactor::OneMinusSrcAlpha => color * (1.0 - src.w),
            BlendFactor::DstAlpha => color * dst.w,
            BlendFactor::OneMinusDstAlpha => color * (1.0 - dst.w),
            BlendFactor::ConstantColor => color * constant.truncate(),
            BlendFactor::OneMinusConstantColor => color * (Vec3::ONE - constant.truncate()),
            BlendFactor::ConstantAlpha => color * constant.w,
            BlendFactor::OneMinusConstantAlpha => color * (1.0 - constant.w),
        }
    }

    /// Scale an alpha value by this factor
    pub fn alpha(self, alpha: f32, src: Vec4, dst: Vec4, constant: Vec4) -> f32 {
        match self {
            BlendFactor::Zero => 0.0,
            BlendFactor::One => alpha,
            BlendFactor::SrcColor | BlendFactor::SrcAlpha => alpha * src.w,
            BlendFactor::OneMinusSrcColor | BlendFactor::OneMinusSrcAlpha => alpha * (1.0 - src.w),
            BlendFactor::DstColor | BlendFactor::DstAlpha => alpha * dst.w,
            BlendFactor::OneMinusDstColor | BlendFactor::OneMinusDstAlpha => alpha * (1.0 - dst.w),
            BlendFactor::ConstantColor | BlendFactor::ConstantAlpha => alpha * constant.w,
            BlendFactor::OneMinusConstantColor | BlendFactor::OneMinusConstantAlpha => {
                alpha * (1.0 - constant.w)
            }
        }
    }
}

impl fmt::Display for BlendFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendFactor {
    type Err = ConfigWarning;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|factor| matches_name(s, factor.name()))
            .ok_or_else(|| ConfigWarning::new("blend_factor", s))
    }
}

/// Blend equation selector
///
/// `a` is the scaled source term, `b` the scaled destination term. Every
/// result is clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendEquation {
    /// `a + b`
    #[default]
    Add,
    /// `a - b`
    Sub,
    /// `b - a`
    InvSub,
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
}

impl BlendEquation {
    pub const ALL: [BlendEquation; 5] = [
        BlendEquation::Add,
        BlendEquation::Sub,
        BlendEquation::InvSub,
        BlendEquation::Min,
        BlendEquation::Max,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlendEquation::Add => "add",
            BlendEquation::Sub => "sub",
            BlendEquation::InvSub => "invSub",
            BlendEquation::Min => "min",
            BlendEquation::Max => "max",
        }
    }

    pub fn rgb(self, a: Vec3, b: Vec3) -> Vec3 {
        let out = match self {
            BlendEquation::Add => a + b,
            BlendEquation::Sub => a - b,
            BlendEquation::InvSub => b - a,
            BlendEquation::Min => a.min(b),
            BlendEquation::Max => a.max(b),
        };
        out.clamp(Vec3::ZERO, Vec3::ONE)
    }

    pub fn alpha(self, a: f32, b: f32) -> f32 {
        let out = match self {
            BlendEquation::Add => a + b,
            BlendEquation::Sub => a - b,
            BlendEquation::InvSub => b - a,
            BlendEquation::Min => a.min(b),
            BlendEquation::Max => a.max(b),
        };
        out.clamp(0.0, 1.0)
    }
}

impl fmt::Display for BlendEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendEquation {
    type Err = ConfigWarning;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|eq| matches_name(s, eq.name()))
            .ok_or_else(|| ConfigWarning::new("blend_equation", s))
    }
}

/// Complete blend configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendState {
    pub enabled: bool,
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub equation_rgb: BlendEquation,
    pub equation_alpha: BlendEquation,
    /// Constant color used by the `constant*` factors
    pub color: Vec4,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            enabled: false,
            src_rgb: BlendFactor::One,
            dst_rgb: BlendFactor::Zero,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
            equation_rgb: BlendEquation::Add,
            equation_alpha: BlendEquation::Add,
            color: Vec4::ZERO,
        }
    }
}

impl BlendState {
    /// Combine a fragment color with the destination color
    ///
    /// # Examples
    ///
    /// ```
    /// use glam::Vec4;
    /// use softraster::core::raster::{BlendFactor, BlendState};
    ///
    /// let blend = BlendState {
    ///     enabled: true,
    ///     src_rgb: BlendFactor::SrcAlpha,
    ///     dst_rgb: BlendFactor::OneMinusSrcAlpha,
    ///     ..BlendState::default()
    /// };
    /// let out = blend.apply(Vec4::new(1.0, 0.0, 0.0, 0.5), Vec4::new(0.0, 0.0, 1.0, 1.0));
    /// assert!((out.x - 0.5).abs() < 1e-6);
    /// assert!((out.z - 0.5).abs() < 1e-6);
    /// ```
    pub fn apply(&self, src: Vec4, dst: Vec4) -> Vec4 {
        let c = self.color;
        let src_term = self.src_rgb.rgb(src.truncate(), src, dst, c);
        let dst_term = self.dst_rgb.rgb(dst.truncate(), src, dst, c);
        let rgb = self.equation_rgb.rgb(src_term, dst_term);

        let src_a = self.src_alpha.alpha(src.w, src, dst, c);
        let dst_a = self.dst_alpha.alpha(dst.w, src, dst, c);
        let alpha = self.equation_alpha.alpha(src_a, dst_a);

        rgb.extend(alpha)
    }
}
