use serde::Deserialize;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tracing::{debug, warn};

use crate::document::DocumentAccess;
use crate::playground;
use crate::selection;
use crate::state::BackendState;

pub(crate) const OPEN_DOCUMENT: &str = "tsPlayground.openDocument";
pub(crate) const COPY_DOCUMENT_URL: &str = "tsPlayground.copyDocumentUrl";
pub(crate) const OPEN_SELECTION: &str = "tsPlayground.openSelection";
pub(crate) const COPY_SELECTION_URL: &str = "tsPlayground.copySelectionUrl";

pub(crate) const ALL: [&str; 4] = [
    OPEN_DOCUMENT,
    COPY_DOCUMENT_URL,
    OPEN_SELECTION,
    COPY_SELECTION_URL,
];

/// Arguments of the selection commands.
#[derive(Debug, Deserialize)]
struct SelectionArgs {
    uri: Url,
    selections: Vec<Range>,
}

/// Execute a workspace command.
///
/// The `copy` variants return the URL for the client to put on the
/// clipboard; the `open` variants also ask the client to open it externally.
pub async fn execute(
    client: &Client,
    state: &BackendState,
    params: &ExecuteCommandParams,
) -> Result<Option<serde_json::Value>> {
    let args: &[serde_json::Value] = &params.arguments;
    match params.command.as_str() {
        OPEN_DOCUMENT => open_external(client, document_url(state, args)).await,
        COPY_DOCUMENT_URL => Ok(document_url(state, args).map(serde_json::Value::String)),
        OPEN_SELECTION => open_external(client, selection_url(state, args)).await,
        COPY_SELECTION_URL => Ok(selection_url(state, args).map(serde_json::Value::String)),
        _ => {
            client
                .log_message(
                    MessageType::WARNING,
                    format!("Unknown command: {}", params.command),
                )
                .await;
            Ok(None)
        }
    }
}

/// Playground URL of a whole open document. Expects `[uri]`.
pub(crate) fn document_url(state: &BackendState, args: &[serde_json::Value]) -> Option<String> {
    let uri = args.first().and_then(|v| Url::deserialize(v).ok());
    let Some(uri) = uri else {
        warn!("commands: expected a document URI argument");
        return None;
    };
    let Some(doc) = state.document(&uri) else {
        debug!(uri = %uri, "commands: document not open");
        return None;
    };
    Some(playground::build_playground_url(
        &state.config().base_url,
        &doc.text(),
    ))
}

/// Playground URL of selections in an open document. Expects
/// `[{ "uri": .., "selections": [Range, ..] }]`.
pub(crate) fn selection_url(state: &BackendState, args: &[serde_json::Value]) -> Option<String> {
    let parsed = args.first().map(SelectionArgs::deserialize);
    let args = match parsed {
        Some(Ok(args)) => args,
        Some(Err(e)) => {
            warn!(error = %e, "commands: invalid selection arguments");
            return None;
        }
        None => {
            warn!("commands: missing selection arguments");
            return None;
        }
    };
    let Some(doc) = state.document(&args.uri) else {
        debug!(uri = %args.uri, "commands: document not open");
        return None;
    };
    Some(selection::selection_url(
        &doc,
        &args.selections,
        &state.config().base_url,
    ))
}

async fn open_external(
    client: &Client,
    url: Option<String>,
) -> Result<Option<serde_json::Value>> {
    let Some(url) = url else {
        return Ok(None);
    };
    let uri = match Url::parse(&url) {
        Ok(uri) => uri,
        Err(e) => {
            warn!(error = %e, "commands: playground URL does not parse");
            return Ok(None);
        }
    };
    let shown = client
        .show_document(ShowDocumentParams {
            uri,
            external: Some(true),
            take_focus: Some(true),
            selection: None,
        })
        .await;
    if let Err(e) = shown {
        warn!(error = %e, "commands: client could not open the playground");
    }
    Ok(Some(serde_json::Value::String(url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ropey::Rope;

    fn state_with(text: &str) -> (BackendState, Url) {
        let state = BackendState::new();
        let uri = Url::parse("file:///notes/snippets.md").unwrap();
        state.documents.insert(uri.clone(), Rope::from_str(text));
        (state, uri)
    }

    #[test]
    fn whole_document_url() {
        let (state, uri) = state_with("let a = 1;\n");
        let url = document_url(&state, &[serde_json::json!(uri)]).unwrap();
        assert_eq!(url, "https://www.typescriptlang.org/play/#src=let%20a%20%3D%201%3B%0A");
    }

    #[test]
    fn selection_url_from_arguments() {
        let (state, uri) = state_with("  foo\nbar\n");
        let args = serde_json::json!({
            "uri": uri,
            "selections": [
                { "start": { "line": 0, "character": 0 }, "end": { "line": 0, "character": 5 } },
                { "start": { "line": 1, "character": 0 }, "end": { "line": 1, "character": 3 } }
            ]
        });
        let url = selection_url(&state, &[args]).unwrap();
        assert_eq!(url, "https://www.typescriptlang.org/play/#src=foo%0A%0Abar");
    }

    #[test]
    fn no_active_document_is_a_no_op() {
        let (state, _) = state_with("x");
        let closed = serde_json::json!("file:///notes/closed.md");
        assert!(document_url(&state, &[closed.clone()]).is_none());
        assert!(document_url(&state, &[]).is_none());
        assert!(selection_url(&state, &[]).is_none());
        assert!(selection_url(&state, &[serde_json::json!({ "uri": closed, "selections": [] })]).is_none());
        assert!(selection_url(&state, &[serde_json::json!({ "selections": 1 })]).is_none());
    }

    #[test]
    fn advertised_commands_are_distinct() {
        let mut names = ALL.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}
