/// Selection text extraction with per-selection dedent.
use tower_lsp::lsp_types::{Position, Range};

use crate::document::DocumentAccess;
use crate::playground;

/// Extract the text of `selections`, each dedented on its own, joined by a
/// blank line in the order given.
pub(crate) fn extract_text<D: DocumentAccess + ?Sized>(doc: &D, selections: &[Range]) -> String {
    let eol = doc.line_ending().as_str();
    selections
        .iter()
        .map(|selection| dedent(&selection_lines(doc, *selection)).join(eol))
        .collect::<Vec<_>>()
        .join(&eol.repeat(2))
}

/// Playground URL for the text of `selections`.
pub(crate) fn selection_url<D: DocumentAccess + ?Sized>(
    doc: &D,
    selections: &[Range],
    base_url: &str,
) -> String {
    playground::build_playground_url(base_url, &extract_text(doc, selections))
}

/// The selected part of every line `selection` touches.
///
/// The first line is padded with spaces up to the selection's start column so
/// it lines up with the lines below it.
fn selection_lines<D: DocumentAccess + ?Sized>(doc: &D, selection: Range) -> Vec<String> {
    let (start, end) = ordered(selection);
    // Columns past the end of the line mean the end of the line.
    let start_column = doc.position_at(doc.offset_at(start)).character as usize;
    let last_line = end.line.min(doc.line_count().saturating_sub(1) as u32);
    (start.line..=last_line)
        .map(|line| {
            let text = if line != start.line && line != end.line {
                doc.line_text(line)
            } else {
                let from = if line == start.line { start.character } else { 0 };
                let to = if line == end.line { end.character } else { u32::MAX };
                doc.text_in_range(Range::new(
                    Position::new(line, from),
                    Position::new(line, to),
                ))
            };
            if line == start.line {
                format!("{}{}", " ".repeat(start_column), text)
            } else {
                text
            }
        })
        .collect()
}

fn ordered(range: Range) -> (Position, Position) {
    if (range.start.line, range.start.character) <= (range.end.line, range.end.character) {
        (range.start, range.end)
    } else {
        (range.end, range.start)
    }
}

/// Strip the indentation shared by all non-blank lines.
///
/// Blank lines lose at most that much; if every line is blank, all become
/// empty.
pub(crate) fn dedent(lines: &[String]) -> Vec<String> {
    let trim = lines
        .iter()
        .filter_map(|line| line.chars().position(|c| !c.is_whitespace()))
        .min();
    lines
        .iter()
        .map(|line| match trim {
            Some(n) => line.chars().skip(n).collect(),
            None => String::new(),
        })
        .collect()
}
