//! HTTP client for the upstream public profile endpoint.
//!
//! One best-effort GET per cache miss: no retries and no timeout beyond the
//! client defaults. The header set mirrors what the upstream's own web app
//! sends for an anonymous visitor.

use std::time::Instant;

use axum::http::{HeaderMap, HeaderValue, header};
use feedlens_core::Username;
use feedlens_core::metrics::record_upstream;

use crate::error::EdgeError;

/// Path of the profile info endpoint, relative to the upstream base URL.
const PROFILE_INFO_PATH: &str = "/api/v1/users/web_profile_info/";

/// Desktop Chrome user agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123 Safari/537.36";

/// Application id the upstream web app identifies itself with.
pub const APP_ID: &str = "936619743392459";

/// Origin of the upstream web app.
const WEB_ORIGIN: &str = "https://www.instagram.com";

/// Client for the upstream profile API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Build a client against `base_url` (scheme and host, no trailing slash).
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("x-ig-app-id", HeaderValue::from_static(APP_ID));
        headers.insert(header::ORIGIN, HeaderValue::from_static(WEB_ORIGIN));

        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Full request URL for a username.
    pub fn profile_url(&self, username: &Username) -> String {
        format!(
            "{}{PROFILE_INFO_PATH}?username={}",
            self.base_url,
            urlencoding::encode(username.as_str())
        )
    }

    /// Fetch the raw profile payload for `username`.
    ///
    /// Non-2xx responses become [`EdgeError::UpstreamStatus`]; network and
    /// JSON decoding failures become [`EdgeError::Upstream`].
    pub async fn fetch_profile(&self, username: &Username) -> Result<serde_json::Value, EdgeError> {
        let url = self.profile_url(username);
        let started = Instant::now();

        let result = self
            .http
            .get(&url)
            .header(header::REFERER, username.profile_url())
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                record_upstream("error".to_string(), started.elapsed());
                return Err(e.into());
            }
        };

        let status = response.status();
        record_upstream(status.as_u16().to_string(), started.elapsed());
        tracing::debug!(
            username = %username,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "upstream responded"
        );

        if !status.is_success() {
            return Err(EdgeError::UpstreamStatus(status.as_u16()));
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}
