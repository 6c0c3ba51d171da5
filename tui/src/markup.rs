//! Inline Markup
//!
//! Assistant answers use a small line-based convention:
//!
//! - a line starting with `-`, `•` or `*` followed by whitespace is a list
//!   item (marker stripped)
//! - `**text**` is emphasized
//! - a blank line is a paragraph break
//!
//! Everything else is a plain paragraph line. Parsing never fails; markup
//! that does not match is shown literally.

/// A run of text inside a line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    /// Plain text
    Text(String),
    /// Emphasized (`**text**`)
    Emphasis(String),
}

impl Inline {
    /// The text without markers
    pub fn text(&self) -> &str {
        match self {
            Self::Text(s) | Self::Emphasis(s) => s,
        }
    }
}

/// One rendered line of an answer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupBlock {
    /// Ordinary text line
    Paragraph(Vec<Inline>),
    /// Bulleted list item
    ListItem(Vec<Inline>),
    /// Blank line
    Break,
}

const BULLET_MARKERS: [char; 3] = ['-', '•', '*'];

/// Parse an answer into display blocks, one per source line
pub fn parse(answer: &str) -> Vec<MarkupBlock> {
    answer.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> MarkupBlock {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return MarkupBlock::Break;
    }

    match strip_bullet(trimmed) {
        Some(rest) => MarkupBlock::ListItem(parse_inline(rest)),
        None => MarkupBlock::Paragraph(parse_inline(trimmed)),
    }
}

/// Marker followed by at least one whitespace character
fn strip_bullet(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let marker = chars.next()?;
    if !BULLET_MARKERS.contains(&marker) {
        return None;
    }
    let rest = chars.as_str();
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

/// Split a line into plain and emphasized runs
///
/// Pairs `**` markers left to right; a span needs at least one character.
pub fn parse_inline(line: &str) -> Vec<Inline> {
    let mut runs = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        // Non-empty span: search for the closing marker after the first char
        let Some(first) = after_open.chars().next() else {
            break;
        };
        let Some(close) = after_open[first.len_utf8()..].find("**") else {
            break;
        };
        let close = close + first.len_utf8();

        plain.push_str(&rest[..open]);
        if !plain.is_empty() {
            runs.push(Inline::Text(std::mem::take(&mut plain)));
        }
        runs.push(Inline::Emphasis(after_open[..close].to_string()));
        rest = &after_open[close + 2..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        runs.push(Inline::Text(plain));
    }
    runs
}
