use log::debug;
use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::convert::{ToggledCode, block_toggle};
use crate::editing::Patch;
use crate::error::ToggleError;

/// Line terminator detected in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A source file held in an xi-rope buffer.
///
/// The locator and converter work on a plain line snapshot; `Document`
/// produces that snapshot and applies the resulting [`ToggledCode`] back onto
/// the rope as a single replace delta. Bytes outside the replaced line range
/// are never touched.
#[derive(Clone)]
pub struct Document {
    /// Entire file as UTF-8
    pub(crate) buffer: Rope,
    /// Current selection/cursor as byte offsets in buffer
    pub(crate) selection: std::ops::Range<usize>,
    /// Incremented on each applied toggle
    pub(crate) version: u64,
    /// Detected over the whole file; used when the replaced lines carry none
    pub(crate) line_ending: LineEnding,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        let buffer = Rope::from(text);
        let len = buffer.len();

        Ok(Self {
            buffer,
            selection: len..len,
            version: 0,
            line_ending: LineEnding::detect(text),
        })
    }

    /// Get the document's content as raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> std::ops::Range<usize> {
        self.selection.clone()
    }

    pub fn set_selection(&mut self, selection: std::ops::Range<usize>) {
        self.selection = selection;
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Line snapshot split on `\n`; a trailing newline yields a final empty
    /// line. Carriage returns are dropped from line ends.
    pub fn lines(&self) -> Vec<String> {
        self.buffer
            .to_string()
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.lines().len()
    }

    /// Toggle the block around `cursor_line` and write it back into the buffer.
    ///
    /// On error the document is left unchanged.
    pub fn toggle_block_at(&mut self, cursor_line: usize) -> Result<Patch, ToggleError> {
        let toggled = block_toggle(&self.lines(), cursor_line)?;

        let text = self.buffer.to_string();
        let start = line_start_offset(&text, toggled.start_line);
        let end = line_start_offset(&text, toggled.end_line + 1);

        // Follow the replaced lines' own terminator in mixed files.
        let replaced = &text[start..end];
        let eol = if replaced.contains('\n') {
            LineEnding::detect(replaced)
        } else {
            self.line_ending
        }
        .as_str();
        let mut replacement = toggled.replacement_lines.join(eol);
        if replaced.ends_with('\n') {
            replacement.push_str(eol);
        }

        let delta = self.compile_replace(start..end, &replacement);
        self.buffer = delta.apply(&self.buffer);

        let inserted = start..start + replacement.len();
        self.selection = if toggled.replacement_lines.len() == 1 {
            start..start
        } else {
            transform_selection(&self.selection, &(start..end), replacement.len())
        };
        self.version += 1;

        debug!(
            "replaced bytes {start}..{end} with {} bytes, version {}",
            replacement.len(),
            self.version
        );

        Ok(Patch {
            changed: vec![inserted],
            new_selection: self.selection.clone(),
            version: self.version,
            toggled,
        })
    }

    /// Preview the toggle without changing the document
    pub fn preview_toggle(&self, cursor_line: usize) -> Result<ToggledCode, ToggleError> {
        block_toggle(&self.lines(), cursor_line)
    }

    fn compile_replace(&self, range: std::ops::Range<usize>, text: &str) -> Delta<RopeInfo> {
        let mut builder = Builder::new(self.buffer.len());
        builder.replace(range, Rope::from(text));
        builder.build()
    }
}

/// Byte offset where `line` starts, or the end of `text` past the last line
fn line_start_offset(text: &str, line: usize) -> usize {
    if line == 0 {
        return 0;
    }
    text.match_indices('\n')
        .nth(line - 1)
        .map_or(text.len(), |(newline, _)| newline + 1)
}

fn transform_selection(
    selection: &std::ops::Range<usize>,
    replaced: &std::ops::Range<usize>,
    insert_len: usize,
) -> std::ops::Range<usize> {
    if replaced.end <= selection.start {
        // Replacement is before selection - shift by net change
        let shift = |offset: usize| offset - replaced.len() + insert_len;
        shift(selection.start)..shift(selection.end)
    } else if replaced.start >= selection.end {
        selection.clone()
    } else {
        // Overlap - collapse to the start of the replaced lines
        replaced.start..replaced.start
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.buffer.to_string() == other.buffer.to_string()
            && self.selection == other.selection
            && self.version == other.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_from_bytes_valid_utf8() {
        let text = "foo do\n  bar\nend\n";
        let doc = Document::from_bytes(text.as_bytes()).expect("valid UTF-8");

        assert_eq!(doc.to_bytes(), text.as_bytes());
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.selection(), text.len()..text.len());
        assert_eq!(doc.line_ending(), LineEnding::Lf);
    }

    #[test]
    fn test_document_from_bytes_invalid_utf8() {
        let invalid_bytes = vec![0xFF, 0xFE, 0xFD];
        assert!(Document::from_bytes(&invalid_bytes).is_err());
    }

    #[test]
    fn test_lines_keep_trailing_empty_line() {
        let doc = Document::from_bytes(b"a\nb\n").unwrap();
        assert_eq!(doc.lines(), vec!["a", "b", ""]);
        assert_eq!(doc.line_count(), 3);
    }

    #[test]
    fn test_toggle_collapses_nested_block() {
        let text = "describe 'x' do\n  let(:foo) do\n    create(:foo)\n  end\nend\n";
        let mut doc = Document::from_bytes(text.as_bytes()).unwrap();

        let patch = doc.toggle_block_at(2).unwrap();

        assert_eq!(
            doc.text(),
            "describe 'x' do\n  let(:foo) { create(:foo) }\nend\n"
        );
        assert_eq!(patch.changed, vec![16..45]);
        assert_eq!(patch.new_selection, 16..16);
        assert_eq!(patch.version, 1);
        assert_eq!((patch.toggled.start_line, patch.toggled.end_line), (1, 3));
    }

    #[test]
    fn test_toggle_then_toggle_back() {
        let text = "describe 'x' do\n  let(:foo) do\n    create(:foo)\n  end\nend\n";
        let mut doc = Document::from_bytes(text.as_bytes()).unwrap();

        doc.toggle_block_at(2).unwrap();
        doc.toggle_block_at(1).unwrap();

        assert_eq!(doc.text(), text);
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_toggle_last_line_without_newline() {
        let mut doc = Document::from_bytes(b"items.each { |i| puts i }").unwrap();

        let patch = doc.toggle_block_at(0).unwrap();

        assert_eq!(doc.text(), "items.each do |i|\n  puts i\nend");
        // Multi-line result keeps the cursor where it was: at the end
        assert_eq!(patch.new_selection, 30..30);
    }

    #[test]
    fn test_toggle_preserves_crlf() {
        let mut doc = Document::from_bytes(b"foo do\r\n  bar\r\nend\r\n").unwrap();
        assert_eq!(doc.line_ending(), LineEnding::CrLf);

        doc.toggle_block_at(1).unwrap();

        assert_eq!(doc.text(), "foo { bar }\r\n");
    }

    #[test]
    fn test_mixed_line_endings_follow_the_replaced_lines() {
        let mut doc = Document::from_bytes(b"a\r\nfoo { bar }\nz\n").unwrap();
        assert_eq!(doc.line_ending(), LineEnding::CrLf);

        doc.toggle_block_at(1).unwrap();

        assert_eq!(doc.text(), "a\r\nfoo do\n  bar\nend\nz\n");
    }

    #[test]
    fn test_unterminated_last_line_uses_document_line_ending() {
        let mut doc = Document::from_bytes(b"a\r\nfoo { bar }").unwrap();

        doc.toggle_block_at(1).unwrap();

        assert_eq!(doc.text(), "a\r\nfoo do\r\n  bar\r\nend");
    }

    #[test]
    fn test_failed_toggle_leaves_document_untouched() {
        let text = "puts 1\nputs 2\n";
        let mut doc = Document::from_bytes(text.as_bytes()).unwrap();

        let err = doc.toggle_block_at(1).unwrap_err();

        assert_eq!(err, ToggleError::NoBlockStart { from_line: 1 });
        assert_eq!(doc.text(), text);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_preview_does_not_modify() {
        let doc = Document::from_bytes(b"foo { bar }\n").unwrap();
        let toggled = doc.preview_toggle(0).unwrap();

        assert_eq!(toggled.replacement_lines, vec!["foo do", "  bar", "end"]);
        assert_eq!(doc.text(), "foo { bar }\n");
    }

    #[test]
    fn test_single_line_result_moves_cursor_to_block_start() {
        let text = "puts 1\nfoo do\n  bar\nend\n";
        let mut doc = Document::from_bytes(text.as_bytes()).unwrap();
        doc.set_selection(2..4);

        doc.toggle_block_at(2).unwrap();

        assert_eq!(doc.selection(), 7..7);
    }

    #[test]
    fn test_selection_before_expanded_block_is_unchanged() {
        let mut doc = Document::from_bytes(b"puts 1\nfoo { bar }\n").unwrap();
        doc.set_selection(2..4);

        doc.toggle_block_at(1).unwrap();

        assert_eq!(doc.text(), "puts 1\nfoo do\n  bar\nend\n");
        assert_eq!(doc.selection(), 2..4);
    }

    #[test]
    fn test_transform_selection_shifts_after_replacement() {
        assert_eq!(transform_selection(&(20..22), &(5..10), 8), 23..25);
        assert_eq!(transform_selection(&(0..3), &(5..10), 8), 0..3);
        assert_eq!(transform_selection(&(6..12), &(5..10), 8), 5..5);
    }

    #[test]
    fn test_line_start_offset() {
        let text = "ab\ncd\n";
        assert_eq!(line_start_offset(text, 0), 0);
        assert_eq!(line_start_offset(text, 1), 3);
        assert_eq!(line_start_offset(text, 2), 6);
        assert_eq!(line_start_offset(text, 3), 6);
    }
}
