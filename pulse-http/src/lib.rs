//! Minimal HTTP client for the Pulse backends.
//!
//! - Base-URL anchored JSON POST with optional bearer auth
//! - Per-request timeouts, no automatic retries: the pipeline owns its one
//!   designed repair round-trip, so a failed call must surface immediately
//! - Distinguishes timeout, HTTP status error, network error, and decode
//!   error so callers can route each differently
//! - Structured `tracing` events with secrets redacted
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo() -> Result<(), pulse_http::HttpError> {
//! let client = pulse_http::HttpClient::new("https://api.example.com/v1/")?;
//! let got: serde_json::Value = client
//!     .post_json("chat/completions", Some("sk-token"), &serde_json::json!({}))
//!     .await?;
//! # Ok(()) }
//! ```

use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {body}")]
    Api { status: StatusCode, body: String },
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the default request timeout.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// POST a JSON body and decode a JSON response, optionally with bearer auth.
    ///
    /// A single attempt only. Timeouts are reported as [`HttpError::Timeout`],
    /// other transport failures as [`HttpError::Network`], and non-2xx
    /// statuses as [`HttpError::Api`] with the body preserved for diagnostics.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_json_timeout(path, bearer, body, self.default_timeout)
            .await
    }

    /// Like [`HttpClient::post_json`] with an explicit per-request timeout.
    pub async fn post_json_timeout<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
        timeout: Duration,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut rb = self.inner.post(url.clone()).timeout(timeout).json(body);
        if let Some(tok) = bearer {
            rb = rb.bearer_auth(sanitize_api_key(tok)?);
        }

        let req_id = format!(
            "r{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );

        tracing::debug!(
            req_id = %req_id,
            host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            timeout_ms = timeout.as_millis() as u64,
            auth = %if bearer.is_some() { "bearer" } else { "none" },
            "http.request.start"
        );

        let t0 = std::time::Instant::now();
        let resp = match rb.send().await {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                tracing::warn!(req_id = %req_id, timeout_ms = timeout.as_millis() as u64, "http.timeout");
                return Err(HttpError::Timeout(timeout));
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(req_id = %req_id, message = %message, "http.network_error.send");
                return Err(HttpError::Network(message));
            }
        };

        let status = resp.status();
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) if err.is_timeout() => {
                tracing::warn!(req_id = %req_id, "http.timeout.body");
                return Err(HttpError::Timeout(timeout));
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(req_id = %req_id, message = %message, "http.network_error.body");
                return Err(HttpError::Network(message));
            }
        };

        tracing::debug!(
            req_id = %req_id,
            %status,
            duration_ms = t0.elapsed().as_millis() as u64,
            body_len = bytes.len(),
            "http.response"
        );

        if !status.is_success() {
            let body = snip_body(&bytes);
            tracing::warn!(req_id = %req_id, %status, body_snippet = %body, "http.error");
            return Err(HttpError::Api { status, body });
        }

        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            let snippet = snip_body(&bytes);
            tracing::warn!(
                req_id = %req_id,
                serde_err = %e.to_string(),
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let cut = (0..=500).rev().find(|i| snip.is_char_boundary(*i)).unwrap_or(0);
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // Trim outer spaces/quotes, then drop all ASCII whitespace so a key
    // pasted with a stray newline still forms a valid header.
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
