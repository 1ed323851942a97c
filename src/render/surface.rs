use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Resolution, Rgb8};
use crate::foundation::error::CheckergenResult;
use crate::render::format::ImageFormat;

/// Axis-aligned rectangle in integer pixels, `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width, nothing is drawn when `<= 0`.
    pub w: i64,
    /// Height, nothing is drawn when `<= 0`.
    pub h: i64,
}

impl PixelRect {
    /// Build a rectangle from its corner and size.
    pub const fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }
}

/// Render target that can fill axis-aligned rectangles.
///
/// `begin_batch`/`end_batch` bracket the fills of one board; surfaces may use them to lock
/// pixel memory once per board instead of once per fill.
pub trait Surface {
    /// Surface size in pixels.
    fn size(&self) -> Resolution;

    /// Fill `rect` with `color`, clipped to the surface.
    fn fill_rect(&mut self, rect: PixelRect, color: Rgb8);

    /// Start a group of fills.
    fn begin_batch(&mut self) {}

    /// End a group of fills.
    fn end_batch(&mut self) {}
}

/// A rendered frame as RGB8 pixels, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGB {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes.
    pub data: Vec<u8>,
}

impl FrameRGB {
    /// Allocate a frame filled with `bg`.
    pub fn new(res: Resolution, bg: Rgb8) -> Self {
        let len = (res.width as usize) * (res.height as usize);
        let mut data = Vec::with_capacity(len * 3);
        for _ in 0..len {
            data.extend_from_slice(&[bg.r, bg.g, bg.b]);
        }
        Self {
            width: res.width,
            height: res.height,
            data,
        }
    }

    /// Overwrite every pixel with `color`.
    pub fn clear(&mut self, color: Rgb8) {
        for px in self.data.chunks_exact_mut(3) {
            px.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    /// Read one pixel, `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 3;
        Some(Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    /// Pack pixels as `0RGB` words, the layout window backends expect.
    pub fn to_xrgb(&self) -> Vec<u32> {
        self.data
            .chunks_exact(3)
            .map(|px| (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2]))
            .collect()
    }

    /// Write the frame to `path` as a still image.
    pub fn save(&self, path: &Path, format: ImageFormat) -> CheckergenResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgb8,
            format.to_image_format(),
        )
        .with_context(|| format!("write {} '{}'", format.extension(), path.display()))?;
        Ok(())
    }
}

impl Surface for FrameRGB {
    fn size(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb8) {
        let x0 = rect.x.clamp(0, i64::from(self.width));
        let y0 = rect.y.clamp(0, i64::from(self.height));
        let x1 = rect.x.saturating_add(rect.w).clamp(0, i64::from(self.width));
        let y1 = rect.y.saturating_add(rect.h).clamp(0, i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let stride = (self.width as usize) * 3;
        let rgb = [color.r, color.g, color.b];
        for y in y0 as usize..y1 as usize {
            let row = &mut self.data[y * stride..(y + 1) * stride];
            for px in row[x0 as usize * 3..x1 as usize * 3].chunks_exact_mut(3) {
                px.copy_from_slice(&rgb);
            }
        }
    }
}

/// Surface that records every fill in order, for tests and diagnostics.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    res: Resolution,
    fills: Vec<(PixelRect, Rgb8)>,
    batches: usize,
}

impl RecordingSurface {
    /// Create an empty recording surface of the given size.
    pub fn new(res: Resolution) -> Self {
        Self {
            res,
            fills: Vec::new(),
            batches: 0,
        }
    }

    /// Recorded fills, in call order.
    pub fn fills(&self) -> &[(PixelRect, Rgb8)] {
        &self.fills
    }

    /// Number of completed batches.
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Resolution {
        self.res
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb8) {
        self.fills.push((rect, color));
    }

    fn end_batch(&mut self) {
        self.batches += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
