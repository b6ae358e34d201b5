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

//! Persistent raster configuration
//!
//! The raster behaves like a fixed-function state machine: every setting
//! stays in effect for all following draws until it is changed.

use std::fmt;
use std::str::FromStr;

use super::blend::BlendState;
use crate::core::error::ConfigWarning;

/// Compare a user-supplied name against a canonical camelCase name
///
/// Case, `_` and `-` are ignored, so `oneMinusSrcAlpha`,
/// `one_minus_src_alpha` and `ONE-MINUS-SRC-ALPHA` all match.
pub(crate) fn matches_name(input: &str, canonical: &str) -> bool {
    let mut input = input
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase());
    let mut canonical = canonical.chars().map(|c| c.to_ascii_lowercase());
    loop {
        match (input.next(), canonical.next()) {
            (None, None) => return true,
            (Some(a), Some(b)) if a == b => continue,
            _ => return false,
        }
    }
}

/// Which winding gets discarded
///
/// Winding is measured in device space, where y grows downwards: a triangle
/// that is counter-clockwise in normalized device coordinates has a negative
/// signed area on screen and is front facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullFace {
    /// Draw both windings
    None,
    /// Discard front faces (negative device area)
    Front,
    /// Discard back faces (positive device area)
    #[default]
    Back,
}

impl CullFace {
    pub const ALL: [CullFace; 3] = [CullFace::None, CullFace::Front, CullFace::Back];

    pub fn name(self) -> &'static str {
        match self {
            CullFace::None => "none",
            CullFace::Front => "front",
            CullFace::Back => "back",
        }
    }

    /// Whether a triangle with this signed device-space area is discarded
    #[inline]
    pub fn culls(self, signed_area: f32) -> bool {
        match self {
            CullFace::None => false,
            CullFace::Front => signed_area < 0.0,
            CullFace::Back => signed_area > 0.0,
        }
    }
}

impl fmt::Display for CullFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CullFace {
    type Err = ConfigWarning;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if matches_name(s, "off") {
            return Ok(CullFace::None);
        }
        Self::ALL
            .into_iter()
            .find(|mode| matches_name(s, mode.name()))
            .ok_or_else(|| ConfigWarning::new("cull_face", s))
    }
}

/// Depth comparison function
///
/// Called as `test(stored, candidate)`; `Less` passes when the candidate is
/// nearer than what is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFunc {
    Never,
    #[default]
    Less,
    Equal,
    LEqual,
    Greater,
    GEqual,
    NotEqual,
    Always,
}

impl DepthFunc {
    pub const ALL: [DepthFunc; 8] = [
        DepthFunc::Never,
        DepthFunc::Less,
        DepthFunc::Equal,
        DepthFunc::LEqual,
        DepthFunc::Greater,
        DepthFunc::GEqual,
        DepthFunc::NotEqual,
        DepthFunc::Always,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DepthFunc::Never => "never",
            DepthFunc::Less => "less",
            DepthFunc::Equal => "equal",
            DepthFunc::LEqual => "lequal",
            DepthFunc::Greater => "greater",
            DepthFunc::GEqual => "gequal",
            DepthFunc::NotEqual => "notequal",
            DepthFunc::Always => "always",
        }
    }

    /// Compare a candidate depth against the stored one
    ///
    /// # Examples
    ///
    /// ```
    /// use softraster::core::raster::DepthFunc;
    ///
    /// assert!(DepthFunc::LEqual.test(100, 99));
    /// assert!(DepthFunc::LEqual.test(100, 100));
    /// assert!(!DepthFunc::LEqual.test(100, 101));
    /// ```
    #[inline]
    pub fn test(self, stored: u16, candidate: u16) -> bool {
        match self {
            DepthFunc::Never => false,
            DepthFunc::Less => stored > candidate,
            DepthFunc::Equal => stored == candidate,
            DepthFunc::LEqual => stored >= candidate,
            DepthFunc::Greater => stored < candidate,
            DepthFunc::GEqual => stored <= candidate,
            DepthFunc::NotEqual => stored != candidate,
            DepthFunc::Always => true,
        }
    }
}

impl fmt::Display for DepthFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DepthFunc {
    type Err = ConfigWarning;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|func| matches_name(s, func.name()))
            .ok_or_else(|| ConfigWarning::new("depth_func", s))
    }
}

/// Viewport rectangle, normalized to the framebuffer size
///
/// `{0, 0, 1, 1}` covers the whole framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Full raster state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub cull_face: CullFace,
    pub depth_func: DepthFunc,
    /// When false, passing fragments are tested but never update depth
    pub depth_write: bool,
    pub blend: BlendState,
    pub viewport: Viewport,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            cull_face: CullFace::default(),
            depth_func: DepthFunc::default(),
            depth_write: true,
            blend: BlendState::default(),
            viewport: Viewport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_name() {
        assert!(matches_name("lequal", "lequal"));
        assert!(matches_name("LEqual", "lequal"));
        assert!(matches_name("one_minus_src_alpha", "oneMinusSrcAlpha"));
        assert!(!matches_name("lequ", "lequal"));
        assert!(!matches_name("lequals", "lequal"));
    }

    #[test]
    fn test_depth_func_truth_table() {
        let cases = [
            (DepthFunc::Never, [false, false, false]),
            (DepthFunc::Less, [true, false, false]),
            (DepthFunc::Equal, [false, true, false]),
            (DepthFunc::LEqual, [true, true, false]),
            (DepthFunc::Greater, [false, false, true]),
            (DepthFunc::GEqual, [false, true, true]),
            (DepthFunc::NotEqual, [true, false, true]),
            (DepthFunc::Always, [true, true, true]),
        ];
        for (func, expected) in cases {
            let got = [99, 100, 101].map(|candidate| func.test(100, candidate));
            assert_eq!(got, expected, "{func}");
        }
    }

    #[test]
    fn test_cull_face() {
        assert!(CullFace::Back.culls(1.0));
        assert!(!CullFace::Back.culls(-1.0));
        assert!(CullFace::Front.culls(-1.0));
        assert!(!CullFace::None.culls(1.0));
        assert!(!CullFace::None.culls(-1.0));
    }

    #[test]
    fn test_parse_state_names() {
        assert_eq!("lequal".parse::<DepthFunc>(), Ok(DepthFunc::LEqual));
        assert_eq!("not_equal".parse::<DepthFunc>(), Ok(DepthFunc::NotEqual));
        assert_eq!("off".parse::<CullFace>(), Ok(CullFace::None));
        assert_eq!("BACK".parse::<CullFace>(), Ok(CullFace::Back));
        assert_eq!(
            "sometimes".parse::<DepthFunc>(),
            Err(ConfigWarning::new("depth_func", "sometimes"))
        );
    }

    #[test]
    fn test_viewport_validation() {
        assert!(Viewport::default().is_valid());
        assert!(!Viewport::new(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Viewport::new(f32::NAN, 0.0, 1.0, 1.0).is_valid());
    }

    #[test]
    fn test_default_state() {
        let state = RenderState::default();
        assert_eq!(state.cull_face, CullFace::Back);
        assert_eq!(state.depth_func, DepthFunc::Less);
        assert!(state.depth_write);
        assert!(!state.blend.enabled);
    }
}
