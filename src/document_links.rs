/// DocumentLink provider: one link per accepted code block's language tag.
///
/// Links are handed out without a target; the target is computed on
/// `documentLink/resolve` against the document's text at that time.
use serde::Deserialize;
use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::config::PlaygroundConfig;
use crate::document::DocumentAccess;
use crate::link_resolve;
use crate::state::{self, BackendState};

/// Payload carried in `DocumentLink::data` between provide and resolve.
#[derive(Debug, Deserialize)]
struct LinkData {
    uri: Url,
}

/// Build the `textDocument/documentLink` response for a document.
pub(crate) fn provide(state: &BackendState, uri: &Url) -> Option<Vec<DocumentLink>> {
    if !state::is_markdown(uri) {
        return None;
    }
    let doc = state.document(uri)?;
    Some(links_for(&doc, uri, &state.config()))
}

pub(crate) fn links_for<D: DocumentAccess + ?Sized>(
    doc: &D,
    uri: &Url,
    config: &PlaygroundConfig,
) -> Vec<DocumentLink> {
    link_resolve::accepted_with_ranges(doc, config)
        .into_iter()
        .map(|(_, range)| DocumentLink {
            range,
            target: None,
            tooltip: Some(config.tooltip.clone()),
            data: Some(serde_json::json!({ "uri": uri })),
        })
        .collect()
}

/// Handle `documentLink/resolve`. A link that no longer matches a block comes
/// back unchanged, without a target.
pub(crate) fn resolve(state: &BackendState, link: DocumentLink) -> DocumentLink {
    let Some(uri) = link_uri(&link) else {
        debug!("document_links: link without document data");
        return link;
    };
    let Some(doc) = state.document(&uri) else {
        debug!(uri = %uri, "document_links: document no longer open");
        return link;
    };
    resolve_in(&doc, &state.config(), link)
}

pub(crate) fn resolve_in<D: DocumentAccess + ?Sized>(
    doc: &D,
    config: &PlaygroundConfig,
    link: DocumentLink,
) -> DocumentLink {
    match link_resolve::resolve_target(doc, config, link.range.start) {
        Some(target) => DocumentLink {
            target: Some(target),
            ..link
        },
        None => link,
    }
}

fn link_uri(link: &DocumentLink) -> Option<Url> {
    let data = link.data.as_ref()?;
    LinkData::deserialize(data).ok().map(|d| d.uri)
}
