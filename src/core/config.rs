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

//! Render state configuration files
//!
//! A [`RenderConfig`] is the textual form of the raster state, loaded from
//! TOML. Every field is optional; missing fields leave the current state
//! alone.
//!
//! ```toml
//! cull_face = "back"
//! depth_func = "lequal"
//! depth_write = true
//! viewport = [0.0, 0.0, 1.0, 1.0]
//! clear_color = [0.1, 0.1, 0.1, 1.0]
//! clear_depth = 1.0
//!
//! [blend]
//! enabled = true
//! src_rgb = "srcAlpha"
//! dst_rgb = "oneMinusSrcAlpha"
//! equation_rgb = "add"
//! color = [0.0, 0.0, 0.0, 0.0]
//! ```
//!
//! Names are matched without regard to case, `_` or `-`. Unknown names are
//! reported as [`ConfigWarning`]s and the previous value is kept.

use std::path::Path;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use super::error::{ConfigWarning, Result};
use super::raster::{Raster, RenderState, Viewport};
use super::renderer::Renderer;
use super::surface::Surface;

/// Blend section of a [`RenderConfig`]
///
/// Factor and equation fields that are left out keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_rgb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_rgb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_alpha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_alpha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation_rgb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation_alpha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 4]>,
}

/// Render state configuration that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cull_face: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_func: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_write: Option<bool>,
    /// Normalized `[x, y, width, height]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<[f32; 4]>,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub blend: BlendConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cull_face: None,
            depth_func: None,
            depth_write: None,
            viewport: None,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            clear_depth: 1.0,
            blend: BlendConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Capture a full raster state with every field set
    pub fn from_state(state: &RenderState) -> Self {
        let blend = &state.blend;
        let vp = &state.viewport;
        Self {
            cull_face: Some(state.cull_face.name().to_string()),
            depth_func: Some(state.depth_func.name().to_string()),
            depth_write: Some(state.depth_write),
            viewport: Some([vp.x, vp.y, vp.width, vp.height]),
            blend: BlendConfig {
                enabled: Some(blend.enabled),
                src_rgb: Some(blend.src_rgb.name().to_string()),
                dst_rgb: Some(blend.dst_rgb.name().to_string()),
                src_alpha: Some(blend.src_alpha.name().to_string()),
                dst_alpha: Some(blend.dst_alpha.name().to_string()),
                equation_rgb: Some(blend.equation_rgb.name().to_string()),
                equation_alpha: Some(blend.equation_alpha.name().to_string()),
                color: Some(blend.color.to_array()),
            },
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded render config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), contents)?;
        log::debug!("Saved render config to {}", path.as_ref().display());
        Ok(())
    }

    pub fn clear_color(&self) -> Vec4 {
        Vec4::from_array(self.clear_color)
    }

    /// Apply the raster state fields to `raster`
    ///
    /// # Returns
    ///
    /// One warning per rejected value; everything else is applied.
    pub fn apply_to_raster(&self, raster: &mut Raster) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(name) = &self.cull_face {
            warnings.extend(raster.set_cull_face_named(name).err());
        }
        if let Some(name) = &self.depth_func {
            warnings.extend(raster.set_depth_func_named(name).err());
        }
        if let Some(enabled) = self.depth_write {
            raster.set_depth_write(enabled);
        }
        if let Some([x, y, width, height]) = self.viewport {
            warnings.extend(raster.set_viewport(Viewport::new(x, y, width, height)).err());
        }

        let blend = &self.blend;
        if let Some(enabled) = blend.enabled {
            raster.set_blend_enabled(enabled);
        }

        let current = raster.state().blend;
        let factors = [&blend.src_rgb, &blend.dst_rgb, &blend.src_alpha, &blend.dst_alpha];
        if factors.iter().any(|f| f.is_some()) {
            let pick = |name: &Option<String>, fallback: &'static str| -> String {
                name.clone().unwrap_or_else(|| fallback.to_string())
            };
            warnings.extend(
                raster
                    .set_blend_func_separate_named(
                        &pick(&blend.src_rgb, current.src_rgb.name()),
                        &pick(&blend.dst_rgb, current.dst_rgb.name()),
                        &pick(&blend.src_alpha, current.src_alpha.name()),
                        &pick(&blend.dst_alpha, current.dst_alpha.name()),
                    )
                    .err(),
            );
        }

        if blend.equation_rgb.is_some() || blend.equation_alpha.is_some() {
            let rgb = blend.equation_rgb.as_deref().unwrap_or(current.equation_rgb.name());
            let alpha = blend
                .equation_alpha
                .as_deref()
                .unwrap_or(current.equation_alpha.name());
            warnings.extend(raster.set_blend_equation_separate_named(rgb, alpha).err());
        }

        if let Some(color) = blend.color {
            raster.set_blend_color(Vec4::from_array(color));
        }

        warnings
    }

    /// Apply raster state and clear values to a renderer
    pub fn apply<S: Surface>(&self, renderer: &mut Renderer<S>) -> Vec<ConfigWarning> {
        renderer.set_clear_color(self.clear_color());
        renderer.set_clear_depth(self.clear_depth);
        self.apply_to_raster(renderer.raster_mut())
    }
}
