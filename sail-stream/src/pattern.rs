//! Moving colour-bar test pattern.

use anyhow::{anyhow, Result};
use sail_pixelbuffer::{ManagedPixelBuffer, Orientation, Rect, SailPixelFormat};

/// RGBA colours of the vertical bars, left to right.
const BARS: [[u8; 4]; 8] = [
    [255, 255, 255, 255],
    [255, 255, 0, 255],
    [0, 255, 255, 255],
    [0, 255, 0, 255],
    [255, 0, 255, 255],
    [255, 0, 0, 255],
    [0, 0, 255, 255],
    [0, 0, 0, 255],
];

/// Grey band marking the top of the image.
const MARKER: [u8; 4] = [128, 128, 128, 255];

/// Eight vertical bars scrolling to the right, with a band across the top.
///
/// The band is drawn into the rows the display shows at the top, so a wall
/// showing it at the bottom has been told the wrong orientation.
pub struct ColorBars {
    buffer: ManagedPixelBuffer,
    orientation: Orientation,
    bars: Vec<Vec<u8>>,
    marker: Vec<u8>,
}

impl ColorBars {
    pub fn new(
        width: u32,
        height: u32,
        format: SailPixelFormat,
        orientation: Orientation,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("Pattern size must be positive, got {}x{}", width, height));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(anyhow!("Pattern size {}x{} is too large", width, height));
        }

        let pf = format.pixel_format();
        Ok(Self {
            buffer: ManagedPixelBuffer::new(width, height, pf),
            orientation,
            bars: BARS.iter().map(|&c| pf.from_rgb888(c)).collect(),
            marker: pf.from_rgb888(MARKER),
        })
    }

    /// Draws frame number `frame` and returns its bytes.
    pub fn render(&mut self, frame: u64) -> Result<&[u8]> {
        let (width, height) = self.buffer.dimensions();
        let step = u64::from((width / 64).max(1));
        let shift = ((frame * step) % u64::from(width)) as u32;

        for (i, colour) in self.bars.iter().enumerate() {
            let i = i as u32;
            let x0 = (u64::from(width) * u64::from(i) / 8) as u32;
            let x1 = (u64::from(width) * u64::from(i + 1) / 8) as u32;
            if x1 == x0 {
                continue;
            }

            // Shifted span, split in two where it wraps past the right edge.
            let start = (x0 + shift) % width;
            let len = x1 - x0;
            let first = len.min(width - start);
            self.buffer
                .fill_rect(Rect::new(start as i32, 0, first, height), colour)?;
            if first < len {
                self.buffer
                    .fill_rect(Rect::new(0, 0, len - first, height), colour)?;
            }
        }

        let band = (height / 16).max(1);
        let band_top = self
            .orientation
            .source_row(0, height)
            .min(self.orientation.source_row(band - 1, height));
        self.buffer
            .fill_rect(Rect::new(0, band_top as i32, width, band), &self.marker)?;

        Ok(self.buffer.data())
    }

    pub fn frame_len(&self) -> usize {
        self.buffer.frame_len()
    }
}
