use thiserror::Error;

use crate::locate::Notation;

/// Errors raised while locating or converting a block.
///
/// A cursor outside any block is a caller error; the host is expected to
/// report it rather than recover.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToggleError {
    #[error("line {requested} is out of range (buffer has {line_count} lines)")]
    LineOutOfRange { requested: usize, line_count: usize },

    #[error("block starts on line {start_line} after it ends on line {end_line}")]
    InvertedBlock { start_line: usize, end_line: usize },

    #[error("no enclosing block found: no block start above line {from_line}")]
    NoBlockStart { from_line: usize },

    #[error("no enclosing block found: no {} block end below line {from_line}", notation_label(.notation))]
    NoBlockEnd {
        from_line: usize,
        notation: Option<Notation>,
    },
}

fn notation_label(notation: &Option<Notation>) -> String {
    match notation {
        Some(notation) => notation.to_string(),
        None => "do/end or brace".to_string(),
    }
}
