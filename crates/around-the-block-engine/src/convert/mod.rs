//! Block converter.
//!
//! Renders a located block in the other notation. `do ... end` blocks of up
//! to [`COLLAPSE_MAX_LINES`] lines collapse onto one brace line; single-line
//! brace blocks expand to three `do ... end` lines. Longer blocks only have
//! their delimiters swapped.
//!
//! Block arguments are found with a greedy `|...|` match on the first line.
//! A body that uses `|` for anything else on that line will confuse it.

use std::sync::LazyLock;

use log::debug;
use regex::{NoExpand, Regex};
use serde::Serialize;

use crate::error::ToggleError;
use crate::locate::{
    BlockDescriptor, Notation, current_block_descriptor,
    markers::{Edge, Markers},
};

/// A `do ... end` block spanning at most this many lines collapses to one line.
pub const COLLAPSE_MAX_LINES: usize = 3;

/// Extra indentation for the body of an expanded single-line block.
const BODY_INDENT: &str = "  ";

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static LEADING_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*").unwrap());
static ARGUMENT_LIST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|.*\|").unwrap());

/// Replacement for buffer lines `start_line..=end_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggledCode {
    pub replacement_lines: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
}

/// Toggles the notation of the block enclosing `cursor_line`.
pub fn block_toggle<S: AsRef<str>>(
    buffer: &[S],
    cursor_line: usize,
) -> Result<ToggledCode, ToggleError> {
    let block = current_block_descriptor(buffer, cursor_line)?;
    let replacement_lines = match block.notation {
        Notation::Keyword => doend_replacement_lines(buffer, &block)?,
        Notation::Brace => brace_replacement_lines(buffer, &block)?,
    };

    debug!(
        "toggled {} block on lines {}..={} into {} line(s) of {}",
        block.notation,
        block.start.line,
        block.end.line,
        replacement_lines.len(),
        block.notation.other()
    );

    Ok(ToggledCode {
        replacement_lines,
        start_line: block.start.line,
        end_line: block.end.line,
    })
}

/// `do ... end` to braces.
pub fn doend_replacement_lines<S: AsRef<str>>(
    buffer: &[S],
    block: &BlockDescriptor,
) -> Result<Vec<String>, ToggleError> {
    let mut lines = block_lines(buffer, block)?;

    // End first: on a shared line the start swap shifts later columns.
    let last_index = lines.len() - 1;
    lines[last_index] = swap_keyword(&lines[last_index], Edge::End, block.end.column, "}");
    lines[0] = swap_keyword(&lines[0], Edge::Start, block.start.column, "{");

    if lines.len() > COLLAPSE_MAX_LINES {
        return Ok(lines);
    }

    let indent = indentation(&lines[0]).to_string();
    let joined = lines.join(" ");
    let collapsed = WHITESPACE_RUN.replace_all(&joined, " ");
    let reindented = LEADING_WHITESPACE.replace(&collapsed, NoExpand(&indent));
    Ok(vec![reindented.into_owned()])
}

/// Braces to `do ... end`.
pub fn brace_replacement_lines<S: AsRef<str>>(
    buffer: &[S],
    block: &BlockDescriptor,
) -> Result<Vec<String>, ToggleError> {
    let mut lines = block_lines(buffer, block)?;
    let open = block.start.column;
    let close = block.end.column;

    let argument_list = ARGUMENT_LIST
        .find(&lines[0])
        .map(|found| found.as_str().to_string());
    let args = argument_list
        .as_deref()
        .map(|list| format!(" {list}"))
        .unwrap_or_default();

    if let [line] = lines.as_slice() {
        let indent = indentation(line);
        let do_line = format!("{}do{args}", char_prefix(line, open));
        let mut body = char_range(line, open + 1, close).trim().to_string();
        if let Some(list) = &argument_list {
            body = body.replacen(list.as_str(), "", 1).trim().to_string();
        }
        return Ok(vec![
            do_line,
            format!("{indent}{BODY_INDENT}{body}"),
            format!("{indent}end"),
        ]);
    }

    let first = format!("{}do{args}", char_prefix(&lines[0], open));
    lines[0] = first;
    let last_index = lines.len() - 1;
    let last = format!("{}end", char_prefix(&lines[last_index], close));
    lines[last_index] = last;
    Ok(lines)
}

fn block_lines<S: AsRef<str>>(
    buffer: &[S],
    block: &BlockDescriptor,
) -> Result<Vec<String>, ToggleError> {
    if block.end.line >= buffer.len() {
        return Err(ToggleError::LineOutOfRange {
            requested: block.end.line,
            line_count: buffer.len(),
        });
    }
    if block.start.line > block.end.line {
        return Err(ToggleError::InvertedBlock {
            start_line: block.start.line,
            end_line: block.end.line,
        });
    }
    Ok(buffer[block.start.line..=block.end.line]
        .iter()
        .map(|line| line.as_ref().to_string())
        .collect())
}

/// Replaces the first keyword marker at or after `column`.
fn swap_keyword(line: &str, edge: Edge, column: usize, replacement: &str) -> String {
    let from = char_prefix(line, column).len();
    match Markers::pattern(edge, Notation::Keyword).find_at(line, from) {
        Some(found) => format!(
            "{}{replacement}{}",
            &line[..found.start()],
            &line[found.end()..]
        ),
        None => line.to_string(),
    }
}

fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn char_prefix(line: &str, column: usize) -> &str {
    char_range(line, 0, column)
}

/// Characters `start..end` of `line`, clamped to the line.
fn char_range(line: &str, start: usize, end: usize) -> &str {
    let byte_at = |column: usize| {
        line.char_indices()
            .nth(column)
            .map_or(line.len(), |(byte, _)| byte)
    };
    let start = byte_at(start);
    let end = byte_at(end).max(start);
    &line[start..end]
}
