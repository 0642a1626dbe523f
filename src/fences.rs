/// Fenced code block scanner.
///
/// Finds backtick-fenced blocks in raw Markdown text and reports their
/// language tag, content and byte offsets in document order.
use tracing::debug;

use crate::document::line_spans;

/// Language tags offered a playground link unless configured otherwise.
pub(crate) const DEFAULT_LANGUAGES: [&str; 4] = ["js", "javascript", "ts", "typescript"];

/// A closed fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeBlock {
    /// Rest of the opening fence line, verbatim; empty when absent.
    pub language: String,
    /// Inner text between the fence lines, less the opener's indentation.
    pub code: String,
    /// The whole block from the opening backticks through the closing fence.
    pub block_text: String,
    /// Byte offset of the first backtick of the opening fence.
    pub start_offset: usize,
    /// Byte offset one past the closing fence.
    pub end_offset: usize,
    /// Number of backticks in the opening fence.
    pub fence_len: usize,
}

impl CodeBlock {
    /// Byte offset where the language tag starts.
    pub fn tag_offset(&self) -> usize {
        self.start_offset + self.fence_len
    }

    /// Byte span of the language tag.
    pub fn tag_span(&self) -> (usize, usize) {
        let start = self.tag_offset();
        (start, start + self.language.len())
    }
}

/// An opening fence: up to three spaces, then three or more backticks.
#[derive(Debug, Clone, Copy)]
struct Fence {
    indent: usize,
    len: usize,
}

/// Scan `text` for fenced code blocks.
///
/// An opening fence is a line with up to three spaces of indentation and three
/// or more backticks; it is closed by a later line, indented the same way, of
/// at least as many backticks and nothing else but trailing whitespace. An
/// opening fence that is never closed ends the scan.
pub(crate) fn scan(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut lines = line_spans(text);

    while let Some(opener) = lines.next() {
        let Some(fence) = opening_fence(&text[opener.start..opener.end]) else {
            continue;
        };
        let start_offset = opener.start + fence.indent;
        let language = text[start_offset + fence.len..opener.end].to_string();

        let mut code = String::new();
        let closer = loop {
            match lines.next() {
                Some(line) if is_closing_fence(&text[line.start..line.end], fence.len) => {
                    break Some(line);
                }
                Some(line) => {
                    code.push_str(strip_indent(&text[line.start..line.next], fence.indent));
                }
                None => break None,
            }
        };
        let Some(closer) = closer else {
            debug!(offset = start_offset, "fences: unterminated fence");
            break;
        };

        blocks.push(CodeBlock {
            language,
            code,
            block_text: text[start_offset..closer.end].to_string(),
            start_offset,
            end_offset: closer.end,
            fence_len: fence.len,
        });
    }

    blocks
}

/// Keep the blocks whose language tag exactly matches one of `languages`.
pub(crate) fn accepted_blocks<S: AsRef<str>>(
    blocks: Vec<CodeBlock>,
    languages: &[S],
) -> Vec<CodeBlock> {
    blocks
        .into_iter()
        .filter(|block| languages.iter().any(|l| l.as_ref() == block.language))
        .collect()
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

fn opening_fence(line: &str) -> Option<Fence> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let len = rest.bytes().take_while(|&b| b == b'`').count();
    if len < 3 {
        return None;
    }
    // A backtick in the info string makes this an inline code span.
    if rest[len..].contains('`') {
        return None;
    }
    Some(Fence { indent, len })
}

fn is_closing_fence(line: &str, fence_len: usize) -> bool {
    let indent = leading_spaces(line);
    if indent > 3 {
        return false;
    }
    let trimmed = line[indent..].trim_end();
    trimmed.len() >= fence_len && trimmed.bytes().all(|b| b == b'`')
}

/// Drop up to `indent` leading spaces from a content line.
fn strip_indent(line: &str, indent: usize) -> &str {
    &line[leading_spaces(line).min(indent)..]
}
