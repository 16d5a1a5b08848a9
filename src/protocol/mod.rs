//! # Printer Command Languages
//!
//! Low-level command builders for the two receipt printer dialects the
//! transformer can target.
//!
//! ## Module Structure
//!
//! - [`escpos`]: Epson ESC/POS
//! - [`starprnt`]: Star Micronics StarPRNT
//! - [`bitmap`]: 1-bit images for raster commands
//!
//! Both dialects implement [`CommandLanguage`], so the markup encoder never
//! needs to know which one it is talking to.
//!
//! ## Usage Example
//!
//! ```
//! use receipt_relay::printer::CommandSet;
//! use receipt_relay::protocol;
//!
//! let lang = protocol::language(CommandSet::StarPrnt).unwrap();
//! let mut data = lang.init();
//! data.extend(lang.bold(true));
//! data.extend(b"RECEIPT\n");
//! data.extend(lang.bold(false));
//! data.extend(lang.cut());
//! assert_eq!(&data[..2], &[0x1B, 0x40]);
//! ```

pub mod bitmap;
pub mod escpos;
pub mod starprnt;

use crate::printer::CommandSet;

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print and advance one line
pub const LF: u8 = 0x0A;

/// Horizontal alignment for images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// Commands the markup encoder needs from a printer dialect.
pub trait CommandLanguage: Send + Sync {
    /// Reset the printer to its power-on state
    fn init(&self) -> Vec<u8>;

    fn bold(&self, on: bool) -> Vec<u8>;

    fn underline(&self, on: bool) -> Vec<u8>;

    /// Double width and double height
    fn double_size(&self, on: bool) -> Vec<u8>;

    /// White on black
    fn invert(&self, on: bool) -> Vec<u8>;

    fn align(&self, alignment: Alignment) -> Vec<u8>;

    /// Print a 1-bit image, MSB = leftmost dot
    fn raster(&self, width_dots: u16, height: u16, data: &[u8]) -> Vec<u8>;

    /// Feed to the cutter and cut
    fn cut(&self) -> Vec<u8>;

    /// Feed `lines` blank lines
    fn feed(&self, lines: u8) -> Vec<u8> {
        vec![LF; lines as usize]
    }
}

/// The dialect behind a command set; `None` for the SVG preview.
pub fn language(set: CommandSet) -> Option<&'static dyn CommandLanguage> {
    match set {
        CommandSet::EscPos => Some(&escpos::EscPos),
        CommandSet::StarPrnt => Some(&starprnt::StarPrnt),
        CommandSet::Svg => None,
    }
}

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ```
/// use receipt_relay::protocol::u16_le;
///
/// assert_eq!(u16_le(576), [0x40, 0x02]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}
