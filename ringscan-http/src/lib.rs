//! Shared HTTP client for page fetching, with safe structured logging.
//!
//! - One pooled `reqwest::Client` per [`HttpClient`]; clones share the pool
//! - Plain GET, no retries, no custom headers, default redirect policy
//! - Per-request timeout, surfaced as [`HttpError::Timeout`]
//! - Strict UTF-8 decoding unless the response declares another charset
//! - Optional *raw* request/response logging via `RINGSCAN_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo() -> Result<(), ringscan_http::HttpError> {
//! let client = ringscan_http::HttpClient::new()?;
//! let html = client
//!     .get_text("https://example.com/contacts", ringscan_http::RequestOpts::default())
//!     .await?;
//! # let _ = html;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `RINGSCAN_HTTP_RAW=1`.
//! Query parameters that look like credentials are redacted in every event.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Response, Url};
use std::env;
use std::error::Error as _;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub use reqwest::StatusCode;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "RINGSCAN_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(url: &Url) -> String {
    let mut redacted = url.clone();
    let (_, pairs) = redact_query(url);
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    format!("curl -XGET '{}'", redacted.as_str().replace('\'', r"'\''"))
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("set-cookie") || key.eq_ignore_ascii_case("authorization")
            {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("client build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("server returned error {status}, body_snippet: {body_snippet}")]
    Status {
        status: StatusCode,
        body_snippet: String,
    },
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
}

// ==============================
// Client & Request Options
// ==============================

/// Settings fixed when the connection pool is created.
///
/// No `User-Agent` is sent unless one is configured.
///
/// ```
/// use ringscan_http::ClientOptions;
/// use std::time::Duration;
///
/// let opts = ClientOptions::default();
/// assert_eq!(opts.connect_timeout, Duration::from_secs(10));
/// assert!(opts.user_agent.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
        }
    }
}

/// Per-request tuning knobs.
///
/// ```
/// use ringscan_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 5);
/// assert!(RequestOpts::default().timeout.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    options: ClientOptions,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client with [`ClientOptions::default`].
    ///
    /// ```no_run
    /// use ringscan_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        Self::with_options(ClientOptions::default())
    }

    pub fn with_options(options: ClientOptions) -> Result<Self, HttpError> {
        let mut builder = Client::builder().connect_timeout(options.connect_timeout);
        if let Some(agent) = &options.user_agent {
            builder = builder.user_agent(agent.as_str());
        }
        let inner = builder
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            options,
            default_timeout: Duration::from_secs(30),
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Rebuild the pool with a different connect timeout.
    ///
    /// ```no_run
    /// use ringscan_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?.with_connect_timeout(Duration::from_secs(3))?;
    /// assert_eq!(client.options().connect_timeout, Duration::from_secs(3));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_connect_timeout(self, dur: Duration) -> Result<Self, HttpError> {
        let options = ClientOptions {
            connect_timeout: dur,
            ..self.options.clone()
        };
        self.rebuild(options)
    }

    /// Rebuild the pool so every request carries `User-Agent: <agent>`.
    pub fn with_user_agent(self, agent: impl Into<String>) -> Result<Self, HttpError> {
        let options = ClientOptions {
            user_agent: Some(agent.into()),
            ..self.options.clone()
        };
        self.rebuild(options)
    }

    fn rebuild(self, options: ClientOptions) -> Result<Self, HttpError> {
        Ok(Self::with_options(options)?.with_timeout(self.default_timeout))
    }

    /// Override the default request timeout.
    ///
    /// ```no_run
    /// use ringscan_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?.with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// GET `url` and return the body decoded as text.
    ///
    /// Non-2xx responses are errors. A body without a declared charset, or
    /// declared as UTF-8, must be valid UTF-8; other declared charsets are
    /// decoded by reqwest.
    pub async fn get_text(&self, url: &str, opts: RequestOpts) -> Result<String, HttpError> {
        let url = Url::parse(url).map_err(|e| HttpError::Url(format!("{url}: {e}")))?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let req_id = Uuid::new_v4().simple().to_string();
        let (host_path, redacted_q) = redact_query(&url);

        tracing::debug!(
            req_id=%req_id,
            method="GET",
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&url);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = self
            .inner
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| transport_error(&req_id, "send", timeout, err))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let charset = declared_charset(&headers);

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=t0.elapsed().as_millis() as u64,
            content_length=?content_len(&headers),
            charset=?charset,
            "http.response.headers"
        );

        // ----- Non-success -----
        if !status.is_success() {
            let bytes = resp.bytes().await.unwrap_or_default();
            let body_snippet = snip_body(&bytes);
            tracing::warn!(
                req_id=%req_id,
                %status,
                body_snippet=%body_snippet,
                "http.error"
            );
            return Err(HttpError::Status {
                status,
                body_snippet,
            });
        }

        // ----- Success path -----
        let text = match charset.as_deref() {
            None | Some("utf-8") | Some("utf8") => {
                read_utf8(&req_id, timeout, resp).await?
            }
            Some(_) => resp
                .text()
                .await
                .map_err(|err| transport_error(&req_id, "body", timeout, err))?,
        };

        tracing::debug!(
            req_id=%req_id,
            duration_ms=t0.elapsed().as_millis() as u64,
            body_len=text.len(),
            "http.response.body"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = text.len() > RAW_MAX_BODY;
            let body = truncate_at_char(&text, RAW_MAX_BODY);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                headers=?hdrs,
                body=%body,
                truncated
            );
        }

        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snip_body(text.as_bytes()),
            "http.response.body_snippet"
        );

        Ok(text)
    }
}

// ==============================
// Helpers
// ==============================

async fn read_utf8(req_id: &str, timeout: Duration, resp: Response) -> Result<String, HttpError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|err| transport_error(req_id, "body", timeout, err))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        let snippet = snip_body(&bytes);
        tracing::warn!(
            req_id=%req_id,
            valid_up_to=e.utf8_error().valid_up_to(),
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn transport_error(req_id: &str, stage: &str, timeout: Duration, err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        tracing::warn!(
            req_id=%req_id,
            stage,
            timeout_ms=timeout.as_millis() as u64,
            "http.timeout"
        );
        return HttpError::Timeout(timeout);
    }
    let message = error_chain(&err);
    tracing::warn!(req_id=%req_id, stage, message=%message, "http.network_error");
    HttpError::Network(message)
}

/// reqwest hides the interesting part (DNS, TLS, refused) in `source()`.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn declared_charset(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

fn snip_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut snip = truncate_at_char(&text, SNIPPET_MAX).to_string();
    if snip.len() < text.len() {
        snip.push_str("...");
    }
    snip
}

fn truncate_at_char(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    // Return "host + path" string and redacted query list for logging
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let k = k.to_string();
            let v = v.to_string();
            let is_secret = matches!(
                k.to_ascii_lowercase().as_str(),
                "access_token"
                    | "authorization"
                    | "auth"
                    | "key"
                    | "api_key"
                    | "token"
                    | "secret"
                    | "client_secret"
                    | "password"
            );
            (k, if is_secret { "<redacted>".into() } else { v })
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

fn content_len(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
}
