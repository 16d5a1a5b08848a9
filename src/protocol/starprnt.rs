//! # StarPRNT
//!
//! Command set of Star Micronics receipt printers (TSP100/650/700 series).
//!
//! StarPRNT shares `ESC @` with ESC/POS but diverges almost everywhere else:
//! bold is two separate commands, size takes height before width, and raster
//! graphics live under `ESC GS S`.
//!
//! ## Reference
//!
//! "StarPRNT Command Specifications Rev. 4.10", Star Micronics Co., Ltd.

use super::{Alignment, CommandLanguage, ESC, GS, u16_le};

/// Star Micronics StarPRNT dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct StarPrnt;

impl CommandLanguage for StarPrnt {
    fn init(&self) -> Vec<u8> {
        vec![ESC, b'@']
    }

    /// ESC E (on) / ESC F (off)
    fn bold(&self, on: bool) -> Vec<u8> {
        vec![ESC, if on { b'E' } else { b'F' }]
    }

    fn underline(&self, on: bool) -> Vec<u8> {
        vec![ESC, b'-', on as u8]
    }

    /// ESC i n1 n2 (height multiplier, width multiplier; 0 = normal)
    fn double_size(&self, on: bool) -> Vec<u8> {
        let n = on as u8;
        vec![ESC, b'i', n, n]
    }

    /// ESC 4 (on) / ESC 5 (off)
    fn invert(&self, on: bool) -> Vec<u8> {
        vec![ESC, if on { b'4' } else { b'5' }]
    }

    fn align(&self, alignment: Alignment) -> Vec<u8> {
        vec![ESC, GS, b'a', alignment as u8]
    }

    /// # Raster Graphics (ESC GS S)
    ///
    /// ```text
    /// ESC GS S m xL xH yL yH n [data...]
    /// ```
    ///
    /// `m = 1` monochrome, `x` = width in bytes, `y` = rows, `n = 0` black.
    fn raster(&self, width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
        let width_bytes = width_dots.div_ceil(8);
        debug_assert_eq!(data.len(), width_bytes as usize * height as usize);

        let [xl, xh] = u16_le(width_bytes);
        let [yl, yh] = u16_le(height);

        let mut cmd = Vec::with_capacity(9 + data.len());
        cmd.extend_from_slice(&[ESC, GS, b'S', 1, xl, xh, yl, yh, 0]);
        cmd.extend_from_slice(data);
        cmd
    }

    /// ESC d 3: feed to cut position, then partial cut
    fn cut(&self) -> Vec<u8> {
        vec![ESC, b'd', 3]
    }
}
