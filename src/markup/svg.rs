//! SVG preview of a receipt.
//!
//! One character cell is 12 px wide and a row 24 px tall (48 px when it holds
//! double-size text), matching font A on a 203 DPI printer. The output always
//! starts with `<svg`, which is how the dispatcher tells previews apart from
//! binary command streams.

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::layout::layout_line;
use super::parse::Row;
use crate::printer::PrintOptions;

const CELL_WIDTH: u32 = 12;
const ROW_HEIGHT: u32 = 24;
const FONT_SIZE: u32 = 20;

/// Render rows as a standalone SVG document.
pub fn render(rows: &[Row], options: &PrintOptions) -> String {
    let cpl = options.cpl as usize;
    let width = options.width_dots();
    let mut body = String::new();
    let mut y = 0u32;

    for row in rows {
        match row {
            Row::Text(columns) => {
                let spans = layout_line(columns, cpl);
                let height = if spans.iter().any(|s| s.style.double) {
                    ROW_HEIGHT * 2
                } else {
                    ROW_HEIGHT
                };
                let baseline = below(y, height - height / 5);
                let mut x = 0u32;
                for span in spans {
                    let scale = span.style.cell_width() as u32;
                    let span_width = span.text.chars().count() as u32 * CELL_WIDTH * scale;
                    if span.text.trim().is_empty() && !span.style.invert {
                        x += span_width;
                        continue;
                    }
                    if span.style.invert {
                        let _ = write!(
                            body,
                            r#"<rect x="{x}" y="{y}" width="{span_width}" height="{height}" fill="black"/>"#
                        );
                    }
                    let _ = write!(
                        body,
                        r#"<text x="{x}" y="{baseline}" font-size="{}" textLength="{span_width}" lengthAdjust="spacingAndGlyphs""#,
                        FONT_SIZE * scale
                    );
                    if span.style.bold {
                        body.push_str(r#" font-weight="bold""#);
                    }
                    if span.style.underline {
                        body.push_str(r#" text-decoration="underline""#);
                    }
                    if span.style.invert {
                        body.push_str(r#" fill="white""#);
                    }
                    let _ = write!(body, ">{}</text>", escape(&span.text));
                    x += span_width;
                }
                y = below(y, height);
            }
            Row::Rule => {
                let mid = below(y, ROW_HEIGHT / 2);
                let _ = write!(
                    body,
                    r#"<line x1="0" y1="{mid}" x2="{width}" y2="{mid}" stroke="black" stroke-width="2"/>"#
                );
                y = below(y, ROW_HEIGHT);
            }
            Row::Cut => {
                let mid = below(y, ROW_HEIGHT / 2);
                let _ = write!(
                    body,
                    r#"<line x1="0" y1="{mid}" x2="{width}" y2="{mid}" stroke="gray" stroke-dasharray="6 4"/>"#
                );
                y = below(y, ROW_HEIGHT);
            }
            Row::Image(bytes) => {
                let Some((w, h, mime)) = image_box(bytes, width) else {
                    continue;
                };
                let x = (width - w) / 2;
                let _ = write!(
                    body,
                    r#"<image x="{x}" y="{y}" width="{w}" height="{h}" href="data:{mime};base64,{}"/>"#,
                    BASE64.encode(bytes)
                );
                y = below(y, h);
            }
        }
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{y}" viewBox="0 0 {width} {y}"><rect width="100%" height="100%" fill="white"/><g font-family="monospace" fill="black">{body}</g></svg>"#
    )
}

/// Position `height` px below `y`, pinned at the largest representable one.
fn below(y: u32, height: u32) -> u32 {
    y.saturating_add(height)
}

/// Display size (scaled to fit `max_width`) and MIME type of an image.
fn image_box(bytes: &[u8], max_width: u32) -> Option<(u32, u32, &'static str)> {
    let format = image::guess_format(bytes).ok()?;
    let img = image::load_from_memory_with_format(bytes, format).ok()?;
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return None;
    }
    let (w, h) = if w > max_width {
        (max_width, ((h as u64 * max_width as u64) / w as u64).max(1) as u32)
    } else {
        (w, h)
    };
    Some((w, h, format.to_mime_type()))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse::parse_document;

    fn options(cpl: u16) -> PrintOptions {
        PrintOptions {
            cpl,
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_with_svg_tag() {
        let svg = render(&parse_document("Hello"), &options(10));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"width="120" height="24""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = render(&parse_document("|a<b & c"), &options(10));
        assert!(svg.contains("a&lt;b &amp; c"));
    }

    #[test]
    fn test_double_rows_are_taller() {
        let svg = render(&parse_document("^BIG\n---"), &options(10));
        assert!(svg.contains(r#"height="72""#));
        assert!(svg.contains(r#"font-size="40""#));
    }

    #[test]
    fn test_styles_become_attributes() {
        let svg = render(&parse_document("|\"b\" _u_ `i`"), &options(10));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r#"text-decoration="underline""#));
        assert!(svg.contains(r#"fill="white""#));
    }

    #[test]
    fn test_row_positions_saturate() {
        assert_eq!(below(24, ROW_HEIGHT), 48);
        assert_eq!(below(u32::MAX - 10, ROW_HEIGHT), u32::MAX);
        assert_eq!(below(u32::MAX, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_undecodable_image_is_skipped() {
        let svg = render(&parse_document("{i:AAEC}"), &options(10));
        assert!(!svg.contains("<image"));
        assert!(svg.contains(r#"height="0""#));
    }
}
