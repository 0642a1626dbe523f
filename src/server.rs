use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, warn};

use crate::config;
use crate::document;
use crate::state::BackendState;

pub struct PlaygroundLanguageServer {
    client: Client,
    state: BackendState,
}

impl PlaygroundLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: BackendState::new(),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for PlaygroundLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Workspace root from the first folder, else the legacy root URI
        let root_uri = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| &folder.uri)
            .or(params.root_uri.as_ref());
        if let Some(Ok(path)) = root_uri.map(|uri| uri.to_file_path()) {
            *self.state.workspace_root.write().unwrap() = Some(path);
        }
        self.state
            .load_config(params.initialization_options.as_ref());

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                document_link_provider: Some(DocumentLinkOptions {
                    resolve_provider: Some(true),
                    work_done_progress_options: Default::default(),
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: crate::commands::ALL.iter().map(|c| c.to_string()).collect(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "TypeScript playground LSP initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        self.state.documents.insert(uri, ropey::Rope::from_str(&text));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(mut doc) = self.state.documents.get_mut(&uri) else {
            debug!(uri = %uri, "did_change: document not open");
            return;
        };
        for change in params.content_changes {
            document::apply_change(&mut doc, change);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state.documents.remove(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        match config::settings_overrides(&params.settings) {
            Ok(overrides) => self.state.apply_overrides(overrides),
            Err(e) => warn!(error = %e, "did_change_configuration: ignoring settings"),
        }
    }

    async fn document_link(&self, params: DocumentLinkParams) -> Result<Option<Vec<DocumentLink>>> {
        Ok(crate::document_links::provide(&self.state, &params.text_document.uri))
    }

    async fn document_link_resolve(&self, params: DocumentLink) -> Result<DocumentLink> {
        Ok(crate::document_links::resolve(&self.state, params))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<serde_json::Value>> {
        crate::commands::execute(&self.client, &self.state, &params).await
    }
}
