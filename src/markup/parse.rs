//! Receipt markup parser.
//!
//! Turns a document into [`Row`]s. Parsing never fails: anything that is not
//! recognized markup is printed as text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Inline decoration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub bold: bool,
    pub underline: bool,
    pub invert: bool,
    /// Double width and height; each character takes two cells
    pub double: bool,
}

impl Style {
    /// Cells one character occupies in this style
    pub fn cell_width(&self) -> usize {
        if self.double { 2 } else { 1 }
    }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub style: Style,
    pub text: String,
}

/// Column alignment within its share of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub align: Align,
    pub spans: Vec<Span>,
}

/// One receipt row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Columns of text; empty for a blank line
    Text(Vec<Column>),
    /// Horizontal rule (`---`)
    Rule,
    /// Paper cut (`===`)
    Cut,
    /// Encoded image bytes from an `{i:...}` property
    Image(Vec<u8>),
}

/// Parse a whole document, one row per line.
pub fn parse_document(document: &str) -> Vec<Row> {
    document.lines().filter_map(parse_line).collect()
}

/// Parse one line. `None` means the line produces no output (an image
/// property whose payload is not valid base64).
pub fn parse_line(line: &str) -> Option<Row> {
    let line = line.trim_end_matches('\r');

    if !line.is_empty() && line.chars().all(|c| c == '-') {
        return Some(Row::Rule);
    }
    if !line.is_empty() && line.chars().all(|c| c == '=') {
        return Some(Row::Cut);
    }

    let (text, properties) = split_properties(line);
    if let Some(encoded) = properties
        .iter()
        .find(|(key, _)| key == "i" || key == "image")
        .map(|(_, value)| value)
    {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        return BASE64.decode(compact).ok().map(Row::Image);
    }

    Some(Row::Text(parse_columns(&text)))
}

/// Separate `{key:value; ...}` blocks from the printable text.
///
/// Escapes are preserved in the returned text so column splitting can still
/// see them.
fn split_properties(line: &str) -> (String, Vec<(String, String)>) {
    let mut text = String::with_capacity(line.len());
    let mut properties = Vec::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                text.push(c);
                if let Some(next) = chars.next() {
                    text.push(next);
                }
            }
            '{' => {
                let mut block = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    block.push(inner);
                }
                if closed {
                    properties.extend(block.split(';').filter_map(|pair| {
                        let (key, value) = pair.split_once(':')?;
                        Some((key.trim().to_ascii_lowercase(), value.trim().to_string()))
                    }));
                } else {
                    text.push('{');
                    text.push_str(&block);
                }
            }
            _ => text.push(c),
        }
    }

    (text, properties)
}

/// Split on unescaped `|` and decide each column's alignment.
fn parse_columns(text: &str) -> Vec<Column> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                // keep the escape for span parsing
                current.push('\\');
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '|' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    let split = parts.len() > 1;
    let leading = split && parts.first().is_some_and(|p| p.trim().is_empty());
    let trailing = split && parts.last().is_some_and(|p| p.trim().is_empty());
    if trailing {
        parts.pop();
    }
    if leading && !parts.is_empty() {
        parts.remove(0);
    }

    if !split && parts.iter().all(|p| p.trim().is_empty()) {
        return Vec::new();
    }

    let count = parts.len();
    let mut style = Style::default();
    parts
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let align = match (count, i) {
                (1, _) if leading && !trailing => Align::Left,
                (1, _) if trailing && !leading => Align::Right,
                (1, _) => Align::Center,
                (_, 0) => Align::Left,
                (n, i) if i == n - 1 => Align::Right,
                _ => Align::Center,
            };
            let spans = parse_spans(raw.trim(), &mut style);
            Column { align, spans }
        })
        .collect()
}

/// Apply the inline toggles (`"` bold, `_` underline, `` ` `` invert,
/// `^` double size). Style carries over between columns of one line.
fn parse_spans(raw: &str, style: &mut Style) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        let toggle: fn(&mut Style) = match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                continue;
            }
            '"' => |s| s.bold = !s.bold,
            '_' => |s| s.underline = !s.underline,
            '`' => |s| s.invert = !s.invert,
            '^' => |s| s.double = !s.double,
            _ => {
                current.push(c);
                continue;
            }
        };
        flush_span(&mut current, *style, &mut spans);
        toggle(style);
    }
    flush_span(&mut current, *style, &mut spans);
    spans
}

fn flush_span(current: &mut String, style: Style, spans: &mut Vec<Span>) {
    if !current.is_empty() {
        spans.push(Span {
            style,
            text: std::mem::take(current),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(text: &str) -> Span {
        Span {
            style: Style::default(),
            text: text.to_string(),
        }
    }

    fn single(row: Row) -> Column {
        match row {
            Row::Text(mut cols) if cols.len() == 1 => cols.remove(0),
            other => panic!("expected one column, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_and_cut() {
        assert_eq!(parse_line("-"), Some(Row::Rule));
        assert_eq!(parse_line("------"), Some(Row::Rule));
        assert_eq!(parse_line("==="), Some(Row::Cut));
        assert_eq!(parse_line("=-="), Some(Row::Text(vec![Column {
            align: Align::Center,
            spans: vec![plain("=-=")],
        }])));
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_line(""), Some(Row::Text(Vec::new())));
        assert_eq!(parse_line("   "), Some(Row::Text(Vec::new())));
    }

    #[test]
    fn test_single_column_alignment() {
        assert_eq!(single(parse_line("Total").unwrap()).align, Align::Center);
        assert_eq!(single(parse_line("|Total").unwrap()).align, Align::Left);
        assert_eq!(single(parse_line("Total|").unwrap()).align, Align::Right);
        assert_eq!(single(parse_line("|Total|").unwrap()).align, Align::Center);
    }

    #[test]
    fn test_columns() {
        let Some(Row::Text(cols)) = parse_line("Apple | 2 | $1.00") else {
            panic!("expected text row");
        };
        let aligns: Vec<Align> = cols.iter().map(|c| c.align).collect();
        assert_eq!(aligns, vec![Align::Left, Align::Center, Align::Right]);
        assert_eq!(cols[2].spans, vec![plain("$1.00")]);
    }

    #[test]
    fn test_escapes() {
        let col = single(parse_line(r#"a\|b \"quoted\""#).unwrap());
        assert_eq!(col.spans, vec![plain("a|b \"quoted\"")]);
    }

    #[test]
    fn test_style_toggles() {
        let col = single(parse_line(r#"|"Bold" and _under_"#).unwrap());
        assert_eq!(col.spans.len(), 3);
        assert!(col.spans[0].style.bold);
        assert_eq!(col.spans[0].text, "Bold");
        assert_eq!(col.spans[1], plain(" and "));
        assert!(col.spans[2].style.underline);
    }

    #[test]
    fn test_style_carries_across_columns() {
        let Some(Row::Text(cols)) = parse_line("^Big | Still") else {
            panic!("expected text row");
        };
        assert!(cols[0].spans[0].style.double);
        assert!(cols[1].spans[0].style.double);
    }

    #[test]
    fn test_image_property() {
        assert_eq!(parse_line("|{i:AAEC}"), Some(Row::Image(vec![0, 1, 2])));
        assert_eq!(parse_line("{image: AAEC }"), Some(Row::Image(vec![0, 1, 2])));
        assert_eq!(parse_line("{i:***}"), None);
    }

    #[test]
    fn test_other_properties_are_dropped() {
        let col = single(parse_line("{width:*,10}|Hello").unwrap());
        assert_eq!(col.spans, vec![plain("Hello")]);
    }

    #[test]
    fn test_unclosed_brace_is_text() {
        let col = single(parse_line("{oops").unwrap());
        assert_eq!(col.spans, vec![plain("{oops")]);
    }

    #[test]
    fn test_document_lines() {
        let rows = parse_document("Title\r\n---\nItem|1\n=");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], Row::Rule);
        assert_eq!(rows[3], Row::Cut);
    }
}
