use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::Url;
use tracing::info;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::config::{ConfigOverrides, PlaygroundConfig};

/// Shared backend state for the LSP server.
///
/// Holds the workspace root, the effective configuration, and the in-memory
/// contents of open documents. Nothing derived from document text is kept
/// here; links are recomputed from the current text on every request.
pub struct BackendState {
    /// Root of the first workspace folder, where the config file is looked up.
    pub workspace_root: RwLock<Option<PathBuf>>,

    config: RwLock<Arc<PlaygroundConfig>>,

    /// In-memory content of open documents, keyed by URI.
    pub documents: DashMap<Url, Rope>,
}

impl BackendState {
    pub fn new() -> Self {
        Self {
            workspace_root: RwLock::new(None),
            config: RwLock::new(Arc::new(PlaygroundConfig::default())),
            documents: DashMap::new(),
        }
    }

    pub fn config(&self) -> Arc<PlaygroundConfig> {
        self.config.read().unwrap().clone()
    }

    /// Reload the configuration from the workspace root and client options.
    pub fn load_config(&self, init_options: Option<&serde_json::Value>) {
        let root = self.workspace_root.read().unwrap().clone();
        let config = PlaygroundConfig::load(root.as_deref(), init_options);
        info!(
            base_url = %config.base_url,
            languages = ?config.languages,
            "config: effective configuration"
        );
        *self.config.write().unwrap() = Arc::new(config);
    }

    /// Layer settings pushed by the client on top of the current config.
    pub fn apply_overrides(&self, overrides: ConfigOverrides) {
        let mut guard = self.config.write().unwrap();
        let mut config = PlaygroundConfig::clone(&guard);
        config.apply(overrides);
        *guard = Arc::new(config);
    }

    /// Snapshot of an open document; cheap, ropes share their storage.
    pub fn document(&self, uri: &Url) -> Option<Rope> {
        self.documents.get(uri).map(|r| r.clone())
    }
}

/// Whether links should be offered for `uri`.
pub(crate) fn is_markdown(uri: &Url) -> bool {
    if uri.scheme() == "untitled" {
        return true;
    }
    let path = uri.path().to_ascii_lowercase();
    path.ends_with(".md") || path.ends_with(".markdown")
}
