/// Document access over open buffers: positions, ranges, line endings.
///
/// Positions follow LSP conventions (0-based line, UTF-16 column) and offsets
/// are byte offsets into the document text.
use ropey::{Rope, RopeSlice};
use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent};

/// The line terminator used by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Detect the line ending of `text` from its first line break.
pub(crate) fn line_ending_of(text: &str) -> LineEnding {
    match text.find('\n') {
        Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => LineEnding::CrLf,
        _ => LineEnding::Lf,
    }
}

/// Byte span of one line of a `&str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineSpan {
    /// Offset of the first byte of the line.
    pub start: usize,
    /// Offset one past the line content, excluding `\n`, `\r\n` or `\r`.
    pub end: usize,
    /// Offset of the next line (past the terminator).
    pub next: usize,
}

/// Iterate the lines of `text` as byte spans.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`, the same breaks LSP clients use.
pub(crate) fn line_spans(text: &str) -> impl Iterator<Item = LineSpan> + '_ {
    let bytes = text.as_bytes();
    let mut offset = 0;
    std::iter::from_fn(move || {
        if offset >= bytes.len() {
            return None;
        }
        let start = offset;
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .map_or(bytes.len(), |i| start + i);
        let next = match bytes.get(end) {
            Some(b'\r') if bytes.get(end + 1) == Some(&b'\n') => end + 2,
            Some(_) => end + 1,
            None => end,
        };
        offset = next;
        Some(LineSpan { start, end, next })
    })
}

/// What the link and selection logic needs from a document.
pub(crate) trait DocumentAccess {
    /// Full raw text.
    fn text(&self) -> String;

    /// Byte offset of `position`, clamped to the line's content.
    fn offset_at(&self, position: Position) -> usize;

    /// Position of the byte `offset`, clamped to the document length.
    fn position_at(&self, offset: usize) -> Position;

    /// Text between two positions.
    fn text_in_range(&self, range: Range) -> String;

    /// Number of lines; a trailing line break opens one more (empty) line.
    fn line_count(&self) -> usize;

    fn line_ending(&self) -> LineEnding;

    /// Content of `line` without its terminator, empty past the last line.
    fn line_text(&self, line: u32) -> String {
        self.text_in_range(Range::new(
            Position::new(line, 0),
            Position::new(line, u32::MAX),
        ))
    }
}

impl DocumentAccess for Rope {
    fn text(&self) -> String {
        self.to_string()
    }

    fn offset_at(&self, position: Position) -> usize {
        self.char_to_byte(char_at(self, position))
    }

    fn position_at(&self, offset: usize) -> Position {
        let char_idx = self.byte_to_char(offset.min(self.len_bytes()));
        let line = self.char_to_line(char_idx);
        let line_start = self.line_to_char(line);
        let column = self.char_to_utf16_cu(char_idx) - self.char_to_utf16_cu(line_start);
        Position::new(line as u32, column as u32)
    }

    fn text_in_range(&self, range: Range) -> String {
        let a = char_at(self, range.start);
        let b = char_at(self, range.end);
        self.slice(a.min(b)..a.max(b)).to_string()
    }

    fn line_count(&self) -> usize {
        self.len_lines()
    }

    fn line_ending(&self) -> LineEnding {
        line_ending_of(&self.line(0).to_string())
    }
}

/// Char index of an LSP position in `rope`.
fn char_at(rope: &Rope, position: Position) -> usize {
    let line = position.line as usize;
    if line >= rope.len_lines() {
        return rope.len_chars();
    }
    let line_start = rope.line_to_char(line);
    let content_end = line_start + content_len(rope.line(line));
    let start_cu = rope.char_to_utf16_cu(line_start);
    let end_cu = rope.char_to_utf16_cu(content_end);
    let target_cu = start_cu
        .saturating_add(position.character as usize)
        .min(end_cu);
    rope.utf16_cu_to_char(target_cu)
}

/// Length in chars of a rope line without its line break.
fn content_len(line: RopeSlice) -> usize {
    let len = line.len_chars();
    if len == 0 {
        return 0;
    }
    match line.char(len - 1) {
        '\n' if len >= 2 && line.char(len - 2) == '\r' => len - 2,
        '\n' | '\r' => len - 1,
        _ => len,
    }
}

/// Apply one `didChange` content change to `rope`.
pub(crate) fn apply_change(rope: &mut Rope, change: TextDocumentContentChangeEvent) {
    match change.range {
        Some(range) => {
            let start = rope.byte_to_char(rope.offset_at(range.start));
            let end = rope.byte_to_char(rope.offset_at(range.end)).max(start);
            rope.remove(start..end);
            rope.insert(start, &change.text);
        }
        None => *rope = Rope::from_str(&change.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_line_endings() {
        assert_eq!(line_ending_of("a\r\nb"), LineEnding::CrLf);
        assert_eq!(line_ending_of("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(line_ending_of("no breaks"), LineEnding::Lf);
        assert_eq!(Rope::from_str("x\r\ny").line_ending(), LineEnding::CrLf);
        assert_eq!(Rope::from_str("").line_ending(), LineEnding::Lf);
    }

    #[test]
    fn line_spans_strip_terminators() {
        let spans: Vec<_> = line_spans("ab\r\nc\n\nd").collect();
        assert_eq!(
            spans,
            vec![
                LineSpan { start: 0, end: 2, next: 4 },
                LineSpan { start: 4, end: 5, next: 6 },
                LineSpan { start: 6, end: 6, next: 7 },
                LineSpan { start: 7, end: 8, next: 8 },
            ]
        );
    }

    #[test]
    fn lone_carriage_return_breaks_lines() {
        let spans: Vec<_> = line_spans("a\rb\r\n").collect();
        assert_eq!(
            spans,
            vec![
                LineSpan { start: 0, end: 1, next: 2 },
                LineSpan { start: 2, end: 3, next: 5 },
            ]
        );
        let rope = Rope::from_str("a\rb");
        assert_eq!(rope.line_count(), 2);
        assert_eq!(rope.position_at(2), Position::new(1, 0));
    }

    #[test]
    fn unicode_separators_do_not_break_lines() {
        let text = "say \u{2028} hi\nnext\u{2029}line\n";
        assert_eq!(line_spans(text).count(), 2);
        let rope = Rope::from_str(text);
        assert_eq!(rope.line_count(), 3);
        assert_eq!(rope.line_text(1), "next\u{2029}line");
        let second = text.find("next").unwrap();
        assert_eq!(rope.position_at(second), Position::new(1, 0));
    }

    #[test]
    fn edits_after_a_line_separator_land_on_the_right_line() {
        let mut rope = Rope::from_str("say \u{2028} hi\n```ts\nx\n```\n");
        apply_change(
            &mut rope,
            TextDocumentContentChangeEvent {
                range: Some(Range::new(Position::new(1, 3), Position::new(1, 5))),
                range_length: None,
                text: "js".to_string(),
            },
        );
        assert_eq!(rope.to_string(), "say \u{2028} hi\n```js\nx\n```\n");
    }

    #[test]
    fn offsets_and_positions_agree() {
        let rope = Rope::from_str("first\nsecond line\n");
        assert_eq!(rope.offset_at(Position::new(1, 3)), 9);
        assert_eq!(rope.position_at(9), Position::new(1, 3));
        assert_eq!(rope.position_at(0), Position::new(0, 0));
        assert_eq!(rope.position_at(1000), Position::new(2, 0));
    }

    #[test]
    fn columns_are_utf16() {
        // 'é' is one UTF-16 unit and two bytes; '😀' is two units and four bytes.
        let rope = Rope::from_str("é😀x\n");
        assert_eq!(rope.offset_at(Position::new(0, 3)), 6);
        assert_eq!(rope.position_at(6), Position::new(0, 3));
        assert_eq!(rope.text_in_range(Range::new(Position::new(0, 3), Position::new(0, 4))), "x");
    }

    #[test]
    fn columns_clamp_to_line_content() {
        let rope = Rope::from_str("ab\r\ncd");
        assert_eq!(rope.offset_at(Position::new(0, 99)), 2);
        assert_eq!(rope.line_text(0), "ab");
        assert_eq!(rope.line_text(1), "cd");
        assert_eq!(rope.line_text(7), "");
        assert_eq!(rope.offset_at(Position::new(9, 0)), 6);
    }

    #[test]
    fn incremental_change_replaces_range() {
        let mut rope = Rope::from_str("hello world\n");
        apply_change(
            &mut rope,
            TextDocumentContentChangeEvent {
                range: Some(Range::new(Position::new(0, 6), Position::new(0, 11))),
                range_length: None,
                text: "there".to_string(),
            },
        );
        assert_eq!(rope.to_string(), "hello there\n");

        apply_change(
            &mut rope,
            TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "replaced".to_string(),
            },
        );
        assert_eq!(rope.to_string(), "replaced");
    }
}
