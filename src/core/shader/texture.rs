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

//! Texture storage and nearest-texel sampling
//!
//! Textures hold RGBA texels as floats in row-major order. Sampling is
//! nearest-neighbour only, with repeat wrapping in both directions:
//!
//! ```text
//! tx = trunc(width · u) mod width     (negative results wrap to the end)
//! ty = trunc(height · v) mod height
//! ```

use glam::Vec4;

/// RGBA float texture
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Vec4>,
}

impl Texture {
    /// Create a texture from row-major texels
    ///
    /// Returns `None` when `texels.len() != width * height`.
    pub fn new(width: usize, height: usize, texels: Vec<Vec4>) -> Option<Self> {
        if texels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            texels,
        })
    }

    /// Build a texture from 8-bit RGBA bytes
    pub fn from_rgba8(width: usize, height: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width * height * 4 {
            return None;
        }
        let texels = bytes
            .chunks_exact(4)
            .map(|px| {
                Vec4::new(
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                    px[3] as f32 / 255.0,
                )
            })
            .collect();
        Self::new(width, height, texels)
    }

    /// Two-color checkerboard, `cells` squares per side
    pub fn checkerboard(size: usize, cells: usize, a: Vec4, b: Vec4) -> Self {
        let cell = (size / cells.max(1)).max(1);
        let texels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    a
                } else {
                    b
                }
            })
            .collect();
        Self {
            width: size,
            height: size,
            texels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Nearest texel at `(u, v)` with repeat wrapping
    ///
    /// An empty texture samples as opaque white so it is neutral when
    /// multiplied into a color.
    pub fn sample(&self, u: f32, v: f32) -> Vec4 {
        if self.width == 0 || self.height == 0 {
            return Vec4::ONE;
        }
        let tx = wrap((self.width as f32 * u) as i64, self.width);
        let ty = wrap((self.height as f32 * v) as i64, self.height);
        self.texels[tx + ty * self.width]
    }
}

/// Sample an optional texture; a missing texture reads as opaque white
pub fn sample_or_white(texture: Option<&Texture>, u: f32, v: f32) -> Vec4 {
    texture.map_or(Vec4::ONE, |t| t.sample(u, v))
}

#[inline]
fn wrap(coord: i64, size: usize) -> usize {
    coord.rem_euclid(size as i64) as usize
}
