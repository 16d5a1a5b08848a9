//! Fixed-width line layout shared by the command encoder and the SVG preview.

use super::parse::{Align, Column, Span, Style};

/// Lay out the columns of one text row into exactly `cpl` cells.
///
/// The line is divided evenly between columns (leftover cells go to the
/// leftmost ones), each column is truncated to its share and padded with
/// unstyled spaces according to its alignment. Adjacent runs with the same
/// style are merged.
pub fn layout_line(columns: &[Column], cpl: usize) -> Vec<Span> {
    let mut out: Vec<Span> = Vec::new();
    if columns.is_empty() {
        return out;
    }

    let base = cpl / columns.len();
    let extra = cpl % columns.len();

    for (i, column) in columns.iter().enumerate() {
        let width = base + usize::from(i < extra);
        let (spans, used) = truncate(&column.spans, width);
        let free = width - used;
        let (left, right) = match column.align {
            Align::Left => (0, free),
            Align::Right => (free, 0),
            Align::Center => (free / 2, free - free / 2),
        };

        push(&mut out, Style::default(), &" ".repeat(left));
        for span in spans {
            push(&mut out, span.style, &span.text);
        }
        push(&mut out, Style::default(), &" ".repeat(right));
    }

    out
}

/// Cells a run of spans occupies.
pub fn cells(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| s.text.chars().count() * s.style.cell_width())
        .sum()
}

/// Keep as many characters as fit in `width` cells.
fn truncate(spans: &[Span], width: usize) -> (Vec<Span>, usize) {
    let mut kept = Vec::new();
    let mut used = 0;

    'spans: for span in spans {
        let step = span.style.cell_width();
        let mut text = String::new();
        for c in span.text.chars() {
            if used + step > width {
                if !text.is_empty() {
                    kept.push(Span { style: span.style, text });
                }
                break 'spans;
            }
            used += step;
            text.push(c);
        }
        if !text.is_empty() {
            kept.push(Span { style: span.style, text });
        }
    }

    (kept, used)
}

fn push(out: &mut Vec<Span>, style: Style, text: &str) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => out.push(Span {
            style,
            text: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse::{Row, parse_line};
    use pretty_assertions::assert_eq;

    fn line(markup: &str, cpl: usize) -> Vec<Span> {
        match parse_line(markup) {
            Some(Row::Text(cols)) => layout_line(&cols, cpl),
            other => panic!("expected text row, got {:?}", other),
        }
    }

    fn flat(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_alignment() {
        assert_eq!(flat(&line("abc", 9)), "   abc   ");
        assert_eq!(flat(&line("|abc", 9)), "abc      ");
        assert_eq!(flat(&line("abc|", 9)), "      abc");
    }

    #[test]
    fn test_columns_share_width() {
        assert_eq!(flat(&line("Apple | $1.00", 12)), "Apple  $1.00");
        assert_eq!(flat(&line("a | b | c", 10)), "a    b   c");
    }

    #[test]
    fn test_every_line_is_cpl_cells() {
        for markup in ["x", "^Big^ deal", "a|b|c|d|e", "\"toolongtoolongtoolong\""] {
            assert_eq!(cells(&line(markup, 16)), 16, "{}", markup);
        }
    }

    #[test]
    fn test_truncation() {
        assert_eq!(flat(&line("|abcdefgh", 4)), "abcd");
    }

    #[test]
    fn test_double_width_truncation_leaves_padding() {
        let spans = line("|^abc", 5);
        assert_eq!(flat(&spans), "ab ");
        assert!(spans[0].style.double);
        assert_eq!(cells(&spans), 5);
    }

    #[test]
    fn test_padding_is_unstyled() {
        let spans = line("\"B\"", 3);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].style, Style::default());
        assert!(spans[1].style.bold);
        assert_eq!(spans[2].style, Style::default());
    }
}
