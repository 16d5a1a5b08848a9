//! Rows to printer commands.

use super::layout::layout_line;
use super::parse::{Row, Style};
use crate::printer::PrintOptions;
use crate::protocol::bitmap::Bitmap;
use crate::protocol::{Alignment, CommandLanguage, LF};

/// Blank lines fed instead of cutting when `cutting` is off
const FEED_WITHOUT_CUT: u8 = 3;

/// Encode parsed rows for one printer dialect.
pub fn encode(rows: &[Row], options: &PrintOptions, lang: &dyn CommandLanguage) -> Vec<u8> {
    let cpl = options.cpl as usize;
    let mut out = lang.init();

    for row in rows {
        match row {
            Row::Text(columns) => {
                let mut current = Style::default();
                for span in layout_line(columns, cpl) {
                    out.extend(style_change(lang, current, span.style));
                    current = span.style;
                    out.extend(span.text.chars().map(latin1));
                }
                out.extend(style_change(lang, current, Style::default()));
                out.push(LF);
            }
            Row::Rule => {
                out.extend(std::iter::repeat_n(b'-', cpl));
                out.push(LF);
            }
            Row::Cut if options.cutting => out.extend(lang.cut()),
            Row::Cut => out.extend(lang.feed(FEED_WITHOUT_CUT)),
            Row::Image(bytes) => {
                let Some(bitmap) = Bitmap::from_encoded(bytes, options.width_dots()) else {
                    tracing::debug!(len = bytes.len(), "skipping undecodable image");
                    continue;
                };
                out.extend(lang.align(Alignment::Center));
                out.extend(lang.raster(bitmap.width, bitmap.height, &bitmap.data));
                out.extend(lang.align(Alignment::Left));
            }
        }
    }

    out
}

/// Commands that switch from one style to another, touching only what differs.
fn style_change(lang: &dyn CommandLanguage, from: Style, to: Style) -> Vec<u8> {
    let mut cmd = Vec::new();
    if from.bold != to.bold {
        cmd.extend(lang.bold(to.bold));
    }
    if from.underline != to.underline {
        cmd.extend(lang.underline(to.underline));
    }
    if from.invert != to.invert {
        cmd.extend(lang.invert(to.invert));
    }
    if from.double != to.double {
        cmd.extend(lang.double_size(to.double));
    }
    cmd
}

/// Characters outside Latin-1 print as `?`.
fn latin1(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(b'?')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse::parse_document;
    use crate::protocol::escpos::EscPos;
    use crate::protocol::starprnt::StarPrnt;
    use pretty_assertions::assert_eq;

    fn options(cpl: u16) -> PrintOptions {
        PrintOptions {
            cpl,
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_line() {
        let out = encode(&parse_document("|Hi"), &options(4), &EscPos);
        assert_eq!(out, b"\x1b@Hi  \n".to_vec());
    }

    #[test]
    fn test_bold_is_switched_on_and_off() {
        let out = encode(&parse_document("|\"A\""), &options(2), &EscPos);
        assert_eq!(out, b"\x1b@\x1bE\x01A\x1bE\x00 \n".to_vec());
    }

    #[test]
    fn test_style_reset_at_end_of_line() {
        let out = encode(&parse_document("|_U"), &options(1), &StarPrnt);
        assert_eq!(out, b"\x1b@\x1b-\x01U\x1b-\x00\n".to_vec());
    }

    #[test]
    fn test_rule_and_cut() {
        let out = encode(&parse_document("--\n="), &options(3), &EscPos);
        assert_eq!(out, b"\x1b@---\n\x1dVB\x00".to_vec());
    }

    #[test]
    fn test_cut_disabled_feeds() {
        let opts = PrintOptions {
            cpl: 3,
            cutting: false,
            ..Default::default()
        };
        let out = encode(&parse_document("="), &opts, &StarPrnt);
        assert_eq!(out, b"\x1b@\n\n\n".to_vec());
    }

    #[test]
    fn test_non_latin1_becomes_question_mark() {
        let out = encode(&parse_document("|é€"), &options(2), &EscPos);
        assert_eq!(out, vec![0x1b, b'@', 0xE9, b'?', LF]);
    }
}
