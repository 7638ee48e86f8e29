//! Block locator.
//!
//! Finds the block around a cursor line by scanning outward from it: upward
//! for the nearest start delimiter, then downward for an end delimiter of the
//! same notation. Nothing outside the scanned lines is parsed.

pub mod markers;

use std::fmt;

use log::trace;
use serde::Serialize;

use crate::error::ToggleError;
use markers::{Edge, Markers};

/// The two equivalent ways of delimiting a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
    /// `do ... end`
    Keyword,
    /// `{ ... }`
    Brace,
}

impl Notation {
    /// Order in which notations are tried on each scanned line.
    pub const PRIORITY: [Notation; 2] = [Notation::Keyword, Notation::Brace];

    pub fn other(self) -> Notation {
        match self {
            Notation::Keyword => Notation::Brace,
            Notation::Brace => Notation::Keyword,
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notation::Keyword => f.write_str("do/end"),
            Notation::Brace => f.write_str("brace"),
        }
    }
}

/// A point in the buffer. `column` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct LinePosition {
    pub line: usize,
    pub column: usize,
}

impl LinePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Where a start or end delimiter was found, and which kind it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerPosition {
    pub position: LinePosition,
    pub notation: Notation,
}

/// A fully resolved block.
///
/// `start` is at or before `end`; on a single line the start column is
/// strictly less than the end column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockDescriptor {
    pub notation: Notation,
    pub start: LinePosition,
    pub end: LinePosition,
}

/// Nearest block start at or above `cursor_line`.
pub fn find_block_start<S: AsRef<str>>(
    buffer: &[S],
    cursor_line: usize,
) -> Result<MarkerPosition, ToggleError> {
    scan(buffer, cursor_line, 0, Edge::Start, None)
}

/// Nearest block end at or below `cursor_line`.
///
/// With `notation` set only that notation's end delimiter is considered, so a
/// hash literal's `}` inside a `do ... end` block is not taken for the end.
pub fn find_block_end<S: AsRef<str>>(
    buffer: &[S],
    cursor_line: usize,
    notation: Option<Notation>,
) -> Result<MarkerPosition, ToggleError> {
    scan(buffer, cursor_line, 0, Edge::End, notation)
}

/// Resolves the block enclosing `cursor_line`.
pub fn current_block_descriptor<S: AsRef<str>>(
    buffer: &[S],
    cursor_line: usize,
) -> Result<BlockDescriptor, ToggleError> {
    let start = find_block_start(buffer, cursor_line)?;

    // On the start line itself the end has to come after the opener.
    let from_column = if start.position.line == cursor_line {
        start.position.column + 1
    } else {
        0
    };
    let end = scan(
        buffer,
        cursor_line,
        from_column,
        Edge::End,
        Some(start.notation),
    )?;

    Ok(BlockDescriptor {
        notation: start.notation,
        start: start.position,
        end: end.position,
    })
}

fn scan<S: AsRef<str>>(
    buffer: &[S],
    cursor_line: usize,
    first_line_column: usize,
    edge: Edge,
    only: Option<Notation>,
) -> Result<MarkerPosition, ToggleError> {
    if cursor_line >= buffer.len() {
        return Err(ToggleError::LineOutOfRange {
            requested: cursor_line,
            line_count: buffer.len(),
        });
    }

    let mut line_index = cursor_line;
    let mut from_column = first_line_column;
    loop {
        let line = Markers::strip_ignorable(buffer[line_index].as_ref());
        for notation in Notation::PRIORITY {
            if only.is_some_and(|only| only != notation) {
                continue;
            }
            if let Some(column) = Markers::find(edge, notation, line, from_column) {
                trace!("{edge:?} {notation} marker at {line_index}:{column}");
                return Ok(MarkerPosition {
                    position: LinePosition::new(line_index, column),
                    notation,
                });
            }
        }

        from_column = 0;
        line_index = match edge {
            Edge::Start => line_index.checked_sub(1).ok_or(ToggleError::NoBlockStart {
                from_line: cursor_line,
            })?,
            Edge::End if line_index + 1 < buffer.len() => line_index + 1,
            Edge::End => {
                return Err(ToggleError::NoBlockEnd {
                    from_line: cursor_line,
                    notation: only,
                });
            }
        };
    }
}
