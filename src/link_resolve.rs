/// Resolve a code block link back to its block, from the current text.
use tower_lsp::lsp_types::{Position, Range, Url};
use tracing::debug;

use crate::config::PlaygroundConfig;
use crate::document::DocumentAccess;
use crate::fences::{self, CodeBlock};
use crate::playground;

/// The accepted code blocks of `doc`, each with the range of its language tag.
pub(crate) fn accepted_with_ranges<D: DocumentAccess + ?Sized>(
    doc: &D,
    config: &PlaygroundConfig,
) -> Vec<(CodeBlock, Range)> {
    let text = doc.text();
    fences::accepted_blocks(fences::scan(&text), config.languages.as_slice())
        .into_iter()
        .map(|block| {
            let (start, end) = block.tag_span();
            let range = Range::new(doc.position_at(start), doc.position_at(end));
            (block, range)
        })
        .collect()
}

/// Find the accepted block whose language tag starts at `position`.
///
/// Always rescans `doc`: positions handed out earlier may predate an edit.
pub(crate) fn find_block<D: DocumentAccess + ?Sized>(
    doc: &D,
    config: &PlaygroundConfig,
    position: Position,
) -> Option<CodeBlock> {
    let found = accepted_with_ranges(doc, config)
        .into_iter()
        .find(|(_, range)| range.start == position)
        .map(|(block, _)| block);
    match &found {
        Some(block) => debug!(
            language = %block.language,
            start = block.start_offset,
            end = block.end_offset,
            len = block.block_text.len(),
            "link_resolve: matched code block"
        ),
        None => debug!(
            line = position.line,
            character = position.character,
            "link_resolve: could not find the code block"
        ),
    }
    found
}

/// Playground target for the block at `position`, if there still is one.
pub(crate) fn resolve_target<D: DocumentAccess + ?Sized>(
    doc: &D,
    config: &PlaygroundConfig,
    position: Position,
) -> Option<Url> {
    let block = find_block(doc, config, position)?;
    playground::playground_target(&config.base_url, &block.code)
}
