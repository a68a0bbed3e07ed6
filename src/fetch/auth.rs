use crate::fetch::client::HttpClient;
use async_trait::async_trait;

/// Query parameter meteoblue reads its API key from.
pub const METEOBLUE_KEY_PARAM: &str = "apikey";

/// An [`HttpClient`] wrapper that appends an API key as a URL query parameter.
///
/// Keeping the key out of the configured URL means the URL can be logged.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> UrlParam<C> {
    /// Wraps `inner` so every request carries `apikey=<key>`.
    pub fn meteoblue(inner: C, key: String) -> Self {
        Self {
            inner,
            param_name: METEOBLUE_KEY_PARAM.to_string(),
            key,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}
