use std::sync::LazyLock;

use regex::Regex;

use super::Notation;

static START_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bdo\b").unwrap());
// The capture group sits on the delimiter; a `{` right after `#` is interpolation.
static START_BRACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^#](\{)").unwrap());
static END_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bend\b").unwrap());
static END_BRACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}$").unwrap());

/// Which side of a block a marker closes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

pub struct Markers;

impl Markers {
    /// Trailing `~` characters are ignorable and stripped before matching.
    pub fn strip_ignorable(line: &str) -> &str {
        line.trim_end_matches('~')
    }

    pub fn pattern(edge: Edge, notation: Notation) -> &'static Regex {
        match (edge, notation) {
            (Edge::Start, Notation::Keyword) => &*START_KEYWORD,
            (Edge::Start, Notation::Brace) => &*START_BRACE,
            (Edge::End, Notation::Keyword) => &*END_KEYWORD,
            (Edge::End, Notation::Brace) => &*END_BRACE,
        }
    }

    /// Character column of the first `edge` delimiter of `notation` on `line`,
    /// ignoring anything before character column `from_column`.
    pub fn find(edge: Edge, notation: Notation, line: &str, from_column: usize) -> Option<usize> {
        let from_byte = byte_offset(line, from_column)?;
        let caps = Self::pattern(edge, notation).captures_at(line, from_byte)?;
        let delimiter = caps.get(1).or_else(|| caps.get(0))?;
        Some(char_column(line, delimiter.start()))
    }
}

fn char_column(line: &str, byte: usize) -> usize {
    line[..byte].chars().count()
}

fn byte_offset(line: &str, column: usize) -> Option<usize> {
    if column == 0 {
        return Some(0);
    }
    line.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(line.len()))
        .nth(column)
}
