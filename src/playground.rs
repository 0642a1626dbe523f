/// Playground URL construction.
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tower_lsp::lsp_types::Url;
use tracing::warn;

pub(crate) const DEFAULT_BASE_URL: &str = "https://www.typescriptlang.org/play/#src=";

/// Characters left as-is by a URI component encoder.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Append `code`, percent-encoded as a URI component, to `base_url`.
pub(crate) fn build_playground_url(base_url: &str, code: &str) -> String {
    format!("{}{}", base_url, utf8_percent_encode(code, URI_COMPONENT))
}

/// Like [`build_playground_url`], parsed into a link target.
pub(crate) fn playground_target(base_url: &str, code: &str) -> Option<Url> {
    let url = build_playground_url(base_url, code);
    match Url::parse(&url) {
        Ok(target) => Some(target),
        Err(e) => {
            warn!(base_url, error = %e, "playground: invalid playground URL");
            None
        }
    }
}
