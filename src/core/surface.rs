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

//! Presentation targets
//!
//! A [`Surface`] receives finished frames as tightly packed RGBA8 rows and
//! reports the size the next frame should have.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::error::Result;

/// Output target for presented frames
pub trait Surface {
    /// Desired framebuffer size `(width, height)`
    fn size(&self) -> (usize, usize);

    /// Receive a frame of `width * height` RGBA8 pixels
    fn present(&mut self, rgba: &[u8], width: usize, height: usize);
}

/// Surface that keeps a copy of the last presented frame
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    width: usize,
    height: usize,
    frame: Vec<u8>,
    frame_size: (usize, usize),
    presents: usize,
}

impl MemorySurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Change the size reported to the renderer
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// RGBA8 bytes of the last presented frame (empty before the first present)
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Size of the last presented frame
    pub fn frame_size(&self) -> (usize, usize) {
        self.frame_size
    }

    /// Number of frames presented so far
    pub fn present_count(&self) -> usize {
        self.presents
    }

    /// RGBA8 value of one pixel in the last frame
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        let (width, height) = self.frame_size;
        if x >= width || y >= height {
            return None;
        }
        let offset = (x + y * width) * 4;
        let px = self.frame.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encode the last frame as a PNG file
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let (width, height) = self.frame_size;
        write_png(path, &self.frame, width, height)
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn present(&mut self, rgba: &[u8], width: usize, height: usize) {
        self.frame.clear();
        self.frame.extend_from_slice(rgba);
        self.frame_size = (width, height);
        self.presents += 1;
    }
}

/// Write RGBA8 pixels to a PNG file
pub fn write_png(path: impl AsRef<Path>, rgba: &[u8], width: usize, height: usize) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()?;

    log::debug!("Wrote {}x{} PNG to {}", width, height, path.display());
    Ok(())
}
