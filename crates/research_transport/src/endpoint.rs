use thiserror::Error;
use url::Url;

/// Fixed path of the research WebSocket on the orchestrator.
pub const RESEARCH_PATH: &str = "/research";

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid origin url: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("unsupported origin scheme {0:?} (expected http, https, ws or wss)")]
    UnsupportedScheme(String),
}

/// Derives the WebSocket endpoint from an HTTP(S) origin: the scheme is
/// upgraded to its WebSocket equivalent, the host kept, and the path
/// replaced by [`RESEARCH_PATH`].
pub fn research_endpoint(origin: &str) -> Result<Url, EndpointError> {
    let mut url = Url::parse(origin)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| EndpointError::UnsupportedScheme(scheme.to_string()))?;
    url.set_path(RESEARCH_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
