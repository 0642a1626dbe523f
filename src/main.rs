use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod document;
mod document_links;
mod fences;
mod link_resolve;
mod playground;
mod selection;
mod server;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    info!(version = env!("CARGO_PKG_VERSION"), "ts-playground-lsp: serving on stdio");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(server::PlaygroundLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
