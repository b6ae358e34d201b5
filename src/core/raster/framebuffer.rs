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

//! Color and depth buffers
//!
//! # Color Format
//!
//! Pixels are stored as one `u32` each, packed so that the bytes in memory
//! always read `R, G, B, A` regardless of host byte order:
//!
//! ```text
//! little endian:  a << 24 | b << 16 | g << 8 | r
//! big endian:     r << 24 | g << 16 | b << 8 | a
//! ```
//!
//! This lets the color buffer be handed to a presentation surface as an
//! RGBA byte slice without conversion.
//!
//! # Depth Format
//!
//! Depth is a 16-bit fixed-point value in `[0, MAX_DEPTH]`; smaller is
//! nearer.

use glam::Vec4;

/// Largest representable depth value (the far plane)
pub const MAX_DEPTH: u16 = 0xFFFF;

/// Host channel order for packed 32-bit colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPacking {
    LittleEndian,
    BigEndian,
}

impl ColorPacking {
    /// Detect the host byte order by writing a known pattern
    pub fn detect() -> Self {
        let marker: u32 = 0x0F00_0000;
        let bytes = bytemuck::bytes_of(&marker);
        if bytes[0] == 0x0F {
            ColorPacking::BigEndian
        } else {
            ColorPacking::LittleEndian
        }
    }

    /// Quantize and pack an RGBA color
    ///
    /// Channels are clamped to `[0, 1]` and rounded to 8 bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use glam::Vec4;
    /// use softraster::core::raster::ColorPacking;
    ///
    /// let packed = ColorPacking::LittleEndian.pack(Vec4::new(1.0, 0.0, 0.0, 1.0));
    /// assert_eq!(packed, 0xFF00_00FF);
    /// ```
    #[inline]
    pub fn pack(self, color: Vec4) -> u32 {
        let r = quantize(color.x);
        let g = quantize(color.y);
        let b = quantize(color.z);
        let a = quantize(color.w);
        match self {
            ColorPacking::LittleEndian => (a << 24) | (b << 16) | (g << 8) | r,
            ColorPacking::BigEndian => (r << 24) | (g << 16) | (b << 8) | a,
        }
    }

    /// Unpack a stored pixel back to normalized RGBA
    #[inline]
    pub fn unpack(self, packed: u32) -> Vec4 {
        let bytes = match self {
            ColorPacking::LittleEndian => [packed, packed >> 8, packed >> 16, packed >> 24],
            ColorPacking::BigEndian => [packed >> 24, packed >> 16, packed >> 8, packed],
        };
        Vec4::from_array(bytes.map(|c| (c & 0xFF) as f32 / 255.0))
    }
}

#[inline]
fn quantize(channel: f32) -> u32 {
    // NaN saturates to 0 in the cast
    (channel.clamp(0.0, 1.0) * 255.0).round() as u32
}

/// Convert a normalized depth in `[0, 1]` to the fixed-point range
pub fn depth_from_unit(depth: f32) -> u16 {
    (depth * MAX_DEPTH as f32).clamp(0.0, MAX_DEPTH as f32) as u16
}

/// Width × height color and depth buffers
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    packing: ColorPacking,
    color: Vec<u32>,
    depth: Vec<u16>,
}

impl Framebuffer {
    /// Allocate buffers; color starts transparent black and depth at the far plane
    pub fn new(width: usize, height: usize) -> Self {
        let packing = ColorPacking::detect();
        log::debug!(
            "Allocating {}x{} framebuffer ({:?} color packing)",
            width,
            height,
            packing
        );
        Self {
            width,
            height,
            packing,
            color: vec![0; width * height],
            depth: vec![MAX_DEPTH; width * height],
        }
    }

    /// Reallocate for a new size
    ///
    /// A zero dimension is ignored and the current buffers are kept.
    ///
    /// # Returns
    ///
    /// `true` when the buffers were reallocated
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return false;
        }
        *self = Self::new(width, height);
        true
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn packing(&self) -> ColorPacking {
        self.packing
    }

    /// Buffer offset of `(x, y)`, or `None` outside the framebuffer
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(x + y * self.width)
    }

    /// Fill the color buffer, and the depth buffer when `depth` is given
    pub fn clear(&mut self, color: Vec4, depth: Option<u16>) {
        self.color.fill(self.packing.pack(color));
        if let Some(depth) = depth {
            self.depth.fill(depth);
        }
    }

    /// Unpacked color at `(x, y)`
    pub fn pixel(&self, x: i32, y: i32) -> Option<Vec4> {
        self.index(x, y).map(|i| self.packing.unpack(self.color[i]))
    }

    /// Raw packed pixels, row-major
    pub fn color(&self) -> &[u32] {
        &self.color
    }

    /// Color buffer as RGBA bytes
    pub fn rgba_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color)
    }

    #[inline]
    pub(crate) fn stored_depth(&self, index: usize) -> u16 {
        self.depth[index]
    }

    #[inline]
    pub(crate) fn stored_color(&self, index: usize) -> Vec4 {
        self.packing.unpack(self.color[index])
    }

    #[inline]
    pub(crate) fn write(&mut self, index: usize, color: Vec4, depth: Option<u16>) {
        self.color[index] = self.packing.pack(color);
        if let Some(depth) = depth {
            self.depth[index] = depth;
        }
    }

    #[cfg(test)]
    pub(crate) fn depth_at(&self, x: i32, y: i32) -> Option<u16> {
        self.index(x, y).map(|i| self.depth[i])
    }
}
