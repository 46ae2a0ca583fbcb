//! Owned pixel buffer implementation.
//!
//! [`ManagedPixelBuffer`] owns its pixel data in a `Vec<u8>`. The bridge uses
//! it on both sides of a hand-off: producers draw frames into one, and the
//! in-memory loopback library keeps its double buffers in two of them.
//!
//! # Example
//!
//! ```
//! use sail_pixelbuffer::{ManagedPixelBuffer, PixelFormat, Rect};
//!
//! let mut buffer = ManagedPixelBuffer::new(100, 100, PixelFormat::bgra8888());
//! let red = buffer.format().from_rgb888([255, 0, 0, 255]);
//! buffer.fill_rect(Rect::new(10, 10, 50, 50), &red).unwrap();
//! assert_eq!(buffer.dimensions(), (100, 100));
//! ```

use crate::{PixelFormat, Rect};
use anyhow::{anyhow, Result};

/// A pixel buffer that manages its own memory.
///
/// # Memory Layout
///
/// Row-major with no padding:
///
/// ```text
/// Total size = W * H * B bytes
/// Pixel at (x, y) starts at offset: (y * W + x) * B
/// ```
#[derive(Debug, Clone)]
pub struct ManagedPixelBuffer {
    /// Buffer width in pixels
    width: u32,

    /// Buffer height in pixels
    height: u32,

    /// Pixel format describing how pixels are encoded
    format: PixelFormat,

    /// Raw pixel data (row-major, no padding)
    data: Vec<u8>,
}

impl ManagedPixelBuffer {
    /// Creates a zero-filled buffer with the specified dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let bytes_per_pixel = format.bytes_per_pixel() as usize;
        let data = vec![0u8; width as usize * height as usize * bytes_per_pixel];

        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Returns `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the raw pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw pixel data for writing.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns a reference to the pixel format.
    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    /// Total bytes held by the buffer.
    pub fn frame_len(&self) -> usize {
        self.data.len()
    }

    /// Fills a rectangle with a solid pixel value.
    ///
    /// `pixel` must be exactly one pixel wide in this buffer's format.
    pub fn fill_rect(&mut self, rect: Rect, pixel: &[u8]) -> Result<()> {
        self.validate_rect(rect)?;

        let bytes_per_pixel = self.format.bytes_per_pixel() as usize;
        if pixel.len() != bytes_per_pixel {
            return Err(anyhow!(
                "Invalid pixel size: got {} bytes, expected {}",
                pixel.len(),
                bytes_per_pixel
            ));
        }

        for y in 0..rect.height as usize {
            let row_offset =
                ((rect.y as usize + y) * self.width as usize + rect.x as usize) * bytes_per_pixel;

            for x in 0..rect.width as usize {
                let offset = row_offset + x * bytes_per_pixel;
                self.data[offset..offset + bytes_per_pixel].copy_from_slice(pixel);
            }
        }

        Ok(())
    }

    fn validate_rect(&self, rect: Rect) -> Result<()> {
        if rect.x < 0
            || rect.y < 0
            || rect.x as u64 + rect.width as u64 > self.width as u64
            || rect.y as u64 + rect.height as u64 > self.height as u64
        {
            return Err(anyhow!(
                "Rectangle out of bounds: {:?} (buffer size: {}x{})",
                rect,
                self.width,
                self.height
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_buffer() {
        let buffer = ManagedPixelBuffer::new(100, 100, PixelFormat::bgra8888());
        assert_eq!(buffer.dimensions(), (100, 100));
        assert_eq!(buffer.data().len(), 100 * 100 * 4);
        assert_eq!(buffer.frame_len(), 100 * 100 * 4);
    }

    #[test]
    fn test_fill_rect() {
        let mut buffer = ManagedPixelBuffer::new(100, 100, PixelFormat::bgra8888());
        let red = buffer.format().from_rgb888([255, 0, 0, 255]);

        buffer.fill_rect(Rect::new(10, 10, 20, 20), &red).unwrap();

        let row = &buffer.data()[15 * 400..16 * 400];
        assert_eq!(&row[15 * 4..16 * 4], &red[..]);
        assert_eq!(&row[0..4], &[0, 0, 0, 0]);
        assert_eq!(&row[30 * 4..31 * 4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_fill_rect_wrong_pixel_size() {
        let mut buffer = ManagedPixelBuffer::new(10, 10, PixelFormat::bgra8888());
        assert!(buffer.fill_rect(Rect::new(0, 0, 1, 1), &[0, 0, 0]).is_err());
    }

    #[test]
    fn test_validate_rect_out_of_bounds() {
        let buffer = ManagedPixelBuffer::new(100, 100, PixelFormat::bgra8888());

        assert!(buffer.validate_rect(Rect::new(90, 50, 20, 10)).is_err());
        assert!(buffer.validate_rect(Rect::new(50, 90, 10, 20)).is_err());
        assert!(buffer.validate_rect(Rect::new(-1, 0, 10, 10)).is_err());
        assert!(buffer.validate_rect(Rect::new(50, 50, 40, 40)).is_ok());
    }
}
