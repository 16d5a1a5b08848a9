//! # ESC/POS
//!
//! The Epson command set spoken by most generic thermal printers.
//!
//! | Command | Bytes | Effect |
//! |---------|-------|--------|
//! | Initialize | `ESC @` | Reset |
//! | Emphasis | `ESC E n` | Bold on/off |
//! | Underline | `ESC - n` | 1-dot underline on/off |
//! | Character size | `GS ! n` | `0x11` = double width and height |
//! | Reverse | `GS B n` | White on black |
//! | Justification | `ESC a n` | 0 left, 1 center, 2 right |
//! | Raster image | `GS v 0 m xL xH yL yH d...` | Print bit image |
//! | Cut | `GS V 66 n` | Feed to cutter, partial cut |

use super::{Alignment, CommandLanguage, ESC, GS, u16_le};

/// Epson ESC/POS dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct EscPos;

impl CommandLanguage for EscPos {
    fn init(&self) -> Vec<u8> {
        vec![ESC, b'@']
    }

    fn bold(&self, on: bool) -> Vec<u8> {
        vec![ESC, b'E', on as u8]
    }

    fn underline(&self, on: bool) -> Vec<u8> {
        vec![ESC, b'-', on as u8]
    }

    fn double_size(&self, on: bool) -> Vec<u8> {
        vec![GS, b'!', if on { 0x11 } else { 0x00 }]
    }

    fn invert(&self, on: bool) -> Vec<u8> {
        vec![GS, b'B', on as u8]
    }

    fn align(&self, alignment: Alignment) -> Vec<u8> {
        vec![ESC, b'a', alignment as u8]
    }

    fn raster(&self, width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
        let width_bytes = width_dots.div_ceil(8);
        debug_assert_eq!(data.len(), width_bytes as usize * height as usize);

        let [xl, xh] = u16_le(width_bytes);
        let [yl, yh] = u16_le(height);

        let mut cmd = Vec::with_capacity(8 + data.len());
        cmd.extend_from_slice(&[GS, b'v', b'0', 0, xl, xh, yl, yh]);
        cmd.extend_from_slice(data);
        cmd
    }

    fn cut(&self) -> Vec<u8> {
        // GS V 66 0: feed to cut position, then partial cut
        vec![GS, b'V', 66, 0]
    }
}
