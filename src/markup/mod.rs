//! # Receipt Markup
//!
//! Converts plain-text receipt documents into printer commands or an SVG
//! preview.
//!
//! ## Syntax
//!
//! ```text
//! ^"COFFEE HOUSE"          centered, bold, double size
//! ---                      horizontal rule
//! |Espresso | 2 | $6.00    three columns
//! |Thank you               left aligned
//! {i:iVBORw0KGgo...}       embedded image (base64)
//! =                        cut
//! ```
//!
//! | Markup | Meaning |
//! |--------|---------|
//! | `\|` | Column separator; leading/trailing pipes set alignment |
//! | `"` | Toggle bold |
//! | `_` | Toggle underline |
//! | `` ` `` | Toggle invert |
//! | `^` | Toggle double size |
//! | `\` | Escape the next character |
//! | `{i:...}` | Image row |
//!
//! ## Output Encoding
//!
//! [`Transformer::transform`] returns a `String`. Printer commands are
//! carried one byte per `char` (U+0000..U+00FF); use [`command_bytes`] to get
//! the wire bytes back. SVG previews are ordinary UTF-8 text.

pub mod encode;
pub mod layout;
pub mod parse;
pub mod svg;

use crate::printer::PrintOptions;
use crate::protocol;

/// Document-to-command conversion.
pub trait Transformer: Send + Sync {
    /// Convert a document for a printer with the given options.
    ///
    /// Must be deterministic: the same input always yields the same output.
    fn transform(&self, document: &str, options: &PrintOptions) -> String;
}

/// The built-in receipt markup transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiptMarkup;

impl Transformer for ReceiptMarkup {
    fn transform(&self, document: &str, options: &PrintOptions) -> String {
        let rows = parse::parse_document(document);
        match protocol::language(options.command) {
            Some(lang) => encode::encode(&rows, options, lang)
                .into_iter()
                .map(char::from)
                .collect(),
            None => svg::render(&rows, options),
        }
    }
}

/// Whether a transformer output is an SVG preview rather than commands.
pub fn is_svg(command: &str) -> bool {
    command.starts_with("<svg")
}

/// Wire bytes for a transformer output.
///
/// SVG previews are sent as UTF-8; everything else is binary, one byte per
/// `char` (only the low 8 bits are kept).
pub fn command_bytes(command: &str) -> Vec<u8> {
    if is_svg(command) {
        command.as_bytes().to_vec()
    } else {
        binary_bytes(command)
    }
}

/// One byte per `char`, low 8 bits.
pub fn binary_bytes(command: &str) -> Vec<u8> {
    command.chars().map(|c| (u32::from(c) & 0xFF) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::CommandSet;
    use pretty_assertions::assert_eq;

    const RECEIPT: &str = "^\"CAFE\"\n---\n|Espresso | $3.00\n|Bagel | $2.50\n=\n";

    #[test]
    fn test_transform_is_deterministic() {
        let options = PrintOptions::default();
        let first = ReceiptMarkup.transform(RECEIPT, &options);
        for _ in 0..5 {
            assert_eq!(ReceiptMarkup.transform(RECEIPT, &options), first);
        }
    }

    #[test]
    fn test_commands_round_trip_through_chars() {
        let options = PrintOptions {
            cpl: 8,
            ..Default::default()
        };
        let command = ReceiptMarkup.transform("|\u{e9}", &options);
        assert!(!is_svg(&command));
        assert_eq!(command_bytes(&command), vec![0x1B, 0x40, 0xE9, b' ', b' ', b' ', b' ', b' ', b' ', b' ', 0x0A]);
    }

    #[test]
    fn test_svg_is_sent_as_utf8() {
        let options = PrintOptions {
            command: CommandSet::Svg,
            ..Default::default()
        };
        let command = ReceiptMarkup.transform("caf\u{e9}", &options);
        assert!(is_svg(&command));
        let bytes = command_bytes(&command);
        assert_eq!(bytes, command.as_bytes());
        assert!(bytes.windows(2).any(|w| w == [0xC3, 0xA9]));
    }

    #[test]
    fn test_binary_keeps_low_byte() {
        assert_eq!(binary_bytes("A\u{1b}\u{141}"), vec![0x41, 0x1B, 0x41]);
    }

    #[test]
    fn test_command_sets_differ() {
        let escpos = ReceiptMarkup.transform(RECEIPT, &PrintOptions::default());
        let star = ReceiptMarkup.transform(
            RECEIPT,
            &PrintOptions::default().with_command(CommandSet::StarPrnt),
        );
        assert_ne!(escpos, star);
        assert!(command_bytes(&star).ends_with(&[0x1B, b'd', 3]));
    }
}
