use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

pub const LAUNCHER_NAME: &str = "InterfaceOficial";
pub const LAUNCHER_VERSION: &str = env!("CARGO_PKG_VERSION");

const APP_USER_AGENT: &str = concat!("InterfaceOficial/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for manifests and artifacts.
///
/// `identity` encoding keeps the bytes on disk identical to what the
/// manifest hashes describe.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}
