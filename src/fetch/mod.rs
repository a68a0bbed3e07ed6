mod auth;
mod basic;
mod client;

pub use auth::{METEOBLUE_KEY_PARAM, UrlParam};
pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

/// Issues a GET for `url` and returns the body.
///
/// # Errors
///
/// Fails on an unparsable URL, a transport error, or a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid URL {url:?}"))?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    debug!(status = %resp.status(), "Upstream responded");
    Ok(resp.bytes().await?.to_vec())
}
