//! # 1-bit Bitmaps
//!
//! Converts an encoded image (PNG, JPEG, ...) into packed monochrome rows for
//! raster commands, using Bayer 8x8 ordered dithering.
//!
//! Ordered dithering is deterministic: the same image always produces the
//! same bytes, which keeps transformer output reproducible.
//!
//! ## Bit Packing
//!
//! - Bit 7 (MSB) = leftmost dot
//! - 1 = black (print dot), 0 = white
//! - Rows are padded with white to a whole number of bytes

use image::imageops::FilterType;

/// Bayer 8x8 dithering matrix (values 0-63)
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Threshold in (0, 1) for the dot at (x, y).
#[inline]
pub fn threshold(x: usize, y: usize) -> f32 {
    (BAYER8[y & 7][x & 7] as f32 + 0.5) / 64.0
}

/// `intensity`: 0.0 = white, 1.0 = black
#[inline]
pub fn should_print(x: usize, y: usize, intensity: f32) -> bool {
    intensity > threshold(x, y)
}

/// A packed monochrome image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u16,
    pub height: u16,
    /// `width_bytes() * height` bytes, row-major
    pub data: Vec<u8>,
}

impl Bitmap {
    pub fn width_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Decode and dither an encoded image.
    ///
    /// Images wider than `max_width` dots are scaled down, keeping the aspect
    /// ratio. Transparent pixels are composited onto white paper. Returns
    /// `None` when the bytes are not a decodable image.
    pub fn from_encoded(bytes: &[u8], max_width: u32) -> Option<Self> {
        let mut img = image::load_from_memory(bytes).ok()?;
        if img.width() > max_width {
            let height = (img.height() as u64 * max_width as u64 / img.width() as u64).max(1);
            img = img.resize_exact(max_width, height as u32, FilterType::Triangle);
        }

        let rgba = img.to_rgba8();
        let width = rgba.width().min(u16::MAX as u32) as usize;
        let height = rgba.height().min(u16::MAX as u32) as usize;
        if width == 0 || height == 0 {
            return None;
        }

        let width_bytes = width.div_ceil(8);
        let mut data = vec![0u8; width_bytes * height];
        for y in 0..height {
            for x in 0..width {
                let [r, g, b, a] = rgba.get_pixel(x as u32, y as u32).0;
                let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
                let alpha = a as f32 / 255.0;
                let intensity = (1.0 - luma / 255.0) * alpha;
                if should_print(x, y, intensity) {
                    data[y * width_bytes + x / 8] |= 0x80 >> (x % 8);
                }
            }
        }

        Some(Self {
            width: width as u16,
            height: height as u16,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_black_prints_every_dot() {
        let bitmap = Bitmap::from_encoded(&png(8, 2, [0, 0, 0, 255]), 576).unwrap();
        assert_eq!(bitmap.width, 8);
        assert_eq!(bitmap.height, 2);
        assert_eq!(bitmap.data, vec![0xFF, 0xFF]);
    }

    #[test]
    fn test_white_and_transparent_print_nothing() {
        let white = Bitmap::from_encoded(&png(10, 1, [255, 255, 255, 255]), 576).unwrap();
        assert_eq!(white.data, vec![0x00, 0x00]);

        let clear = Bitmap::from_encoded(&png(10, 1, [0, 0, 0, 0]), 576).unwrap();
        assert_eq!(clear.data, vec![0x00, 0x00]);
    }

    #[test]
    fn test_partial_byte_is_padded_white() {
        let bitmap = Bitmap::from_encoded(&png(3, 1, [0, 0, 0, 255]), 576).unwrap();
        assert_eq!(bitmap.width_bytes(), 1);
        assert_eq!(bitmap.data, vec![0b1110_0000]);
    }

    #[test]
    fn test_wide_image_is_scaled_down() {
        let bitmap = Bitmap::from_encoded(&png(1000, 500, [0, 0, 0, 255]), 500).unwrap();
        assert_eq!(bitmap.width, 500);
        assert_eq!(bitmap.height, 250);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Bitmap::from_encoded(b"not an image", 576).is_none());
    }

    #[test]
    fn test_gray_is_dithered() {
        let bitmap = Bitmap::from_encoded(&png(8, 8, [128, 128, 128, 255]), 576).unwrap();
        let dots: u32 = bitmap.data.iter().map(|b| b.count_ones()).sum();
        assert!(dots > 20 && dots < 44);
    }
}
