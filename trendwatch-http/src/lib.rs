//! Minimal HTTP client with safe logging, retries, and flexible auth.
//!
//! - Request options: headers, [`Auth`], query params, timeout, retries
//! - JSON responses, `application/x-www-form-urlencoded` request bodies
//! - Redacts credentials in logs; only the auth *kind* is ever recorded
//! - Retries network errors, 429 and 5xx with exponential backoff and `Retry-After`
//! - Optional raw response logging (target `http.raw`) via `TRENDWATCH_HTTP_RAW=1`
//!
//! ```no_run
//! # async fn demo() -> Result<(), trendwatch_http::HttpError> {
//! use trendwatch_http::{Auth, HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://api.x.com")?;
//! let trends: serde_json::Value = client
//!     .get_json(
//!         "2/trends/by/woeid/1",
//!         RequestOpts {
//!             auth: Some(Auth::Bearer("token")),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! # Ok(()) }
//! ```

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use url::{Url, form_urlencoded};
use uuid::Uuid;

const RAW_ENV: &str = "TRENDWATCH_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_CHARS: usize = 500;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

const SECRET_QUERY_KEYS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for [`HttpError::Api`], `None` for transport/decode failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the client.
///
/// ```
/// use trendwatch_http::Auth;
///
/// let basic = Auth::Basic { username: "key", password: "secret" };
/// assert_eq!(basic.kind(), "basic");
/// assert_eq!(Auth::Bearer("t").kind(), "bearer");
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`
    Bearer(&'a str),
    /// `Authorization: Basic base64(username:password)`
    Basic {
        username: &'a str,
        password: &'a str,
    },
    None,
}

impl Auth<'_> {
    /// Label safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Basic { .. } => "basic",
            Auth::None => "none",
        }
    }
}

/// Per-request tuning knobs.
///
/// ```
/// use trendwatch_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(0),
///     query: Some(vec![("id", Cow::Borrowed("1"))]),
///     ..Default::default()
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.auth.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

/// Pre-encoded request body so retries resend the same payload.
enum Payload {
    Form(String),
}

impl Payload {
    fn len(&self) -> usize {
        match self {
            Payload::Form(s) => s.len(),
        }
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL. Relative request paths are
    /// joined onto it, so a trailing `/` is added when missing.
    ///
    /// ```no_run
    /// use trendwatch_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.x.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("trendwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET and decode a JSON response.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_internal(Method::GET, path, None, opts).await
    }

    /// POST a urlencoded form and decode a JSON response.
    pub async fn post_form<T>(
        &self,
        path: &str,
        form: &[(&str, &str)],
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter())
            .finish();
        self.request_internal(Method::POST, path, Some(Payload::Form(encoded)), opts)
            .await
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_internal<T>(
        &self,
        method: Method,
        path: &str,
        payload: Option<Payload>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let auth_kind = opts.auth.as_ref().map_or("none", Auth::kind);
        let bearer = match &opts.auth {
            Some(Auth::Bearer(tok)) => Some(sanitize_token(tok)?),
            _ => None,
        };
        let redacted_q = redact_query(opts.query.as_deref().unwrap_or_default());
        let req_id = Uuid::new_v4().simple().to_string();
        let mut attempt = 0usize;

        loop {
            // ----- Build request -----
            let mut rb = self
                .inner
                .request(method.clone(), url.clone())
                .timeout(timeout);

            if let Some(q) = &opts.query {
                let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
                rb = rb.query(&pairs);
            }

            if let Some(Payload::Form(encoded)) = &payload {
                rb = rb
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body(encoded.clone());
            }

            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }

            match (&opts.auth, &bearer) {
                (Some(Auth::Bearer(_)), Some(tok)) => rb = rb.bearer_auth(tok),
                (Some(Auth::Basic { username, password }), _) => {
                    rb = rb.basic_auth(username, Some(password))
                }
                _ => {}
            }

            tracing::debug!(
                req_id = %req_id,
                attempt = attempt + 1,
                max_retries,
                method = %method,
                host_path = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                query = ?redacted_q,
                timeout_ms = timeout.as_millis() as u64,
                auth_kind,
                body_len = payload.as_ref().map_or(0, Payload::len),
                "http.request.start"
            );

            // ----- Send -----
            let t0 = Instant::now();
            let sent = match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    resp.bytes().await.map(|b| (status, headers, b))
                }
                Err(err) => Err(err),
            };
            let (status, headers, bytes) = match sent {
                Ok(parts) => parts,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id = %req_id,
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(
                        req_id = %req_id,
                        attempt,
                        message = %message,
                        "http.network_error"
                    );
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let server_req_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-transaction-id"))
                .or_else(|| headers.get("x-correlation-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();

            tracing::debug!(
                req_id = %req_id,
                %status,
                duration_ms = dur_ms,
                body_len = bytes.len(),
                x_request_id = %server_req_id,
                rate_limit.limit = ?header_str(&headers, "x-rate-limit-limit"),
                rate_limit.remaining = ?header_str(&headers, "x-rate-limit-remaining"),
                rate_limit.reset = ?header_str(&headers, "x-rate-limit-reset"),
                "http.response.headers"
            );

            if raw_enabled() {
                let cap = bytes.len().min(RAW_MAX_BODY);
                tracing::info!(
                    target: "http.raw",
                    req_id = %req_id,
                    %status,
                    headers = ?redact_headers(&headers),
                    body = %String::from_utf8_lossy(&bytes[..cap]),
                    truncated = bytes.len() > RAW_MAX_BODY,
                    "response"
                );
            }

            let snippet = snip_body(&bytes);

            // ----- Success path -----
            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        req_id = %req_id,
                        serde_line = e.line(),
                        serde_col = e.column(),
                        serde_err = %e,
                        body_snippet = %snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            // ----- Non-success: maybe retry -----
            let message = extract_error_message(&bytes);
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

            if retryable && attempt < max_retries {
                attempt += 1;
                let retry_after = retry_after_delay_secs(&headers);
                let delay = match retry_after {
                    Some(secs) => Duration::from_secs(secs),
                    None if status == StatusCode::TOO_MANY_REQUESTS => {
                        backoff(attempt).max(Duration::from_millis(1100))
                    }
                    None => backoff(attempt),
                };
                tracing::warn!(
                    req_id = %req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    retry_after_secs = ?retry_after,
                    message = %message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id = %req_id,
                %status,
                message = %message,
                x_request_id = %server_req_id,
                body_snippet = %snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id: server_req_id,
            });
        }
    }
}

// ==============================
// Helpers
// ==============================

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt - 1).min(16)))
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn redact_query(q: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    q.iter()
        .map(|(k, v)| {
            let secret = SECRET_QUERY_KEYS.contains(&k.to_ascii_lowercase().as_str());
            let shown = if secret {
                "<redacted>".to_string()
            } else {
                v.to_string()
            };
            ((*k).to_string(), shown)
        })
        .collect()
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if matches!(key.as_str(), "authorization" | "set-cookie") {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// Pull a human-readable message out of the error shapes the X API and
/// OAuth endpoints use, falling back to a body snippet.
fn extract_error_message(body: &[u8]) -> String {
    // v1.1 and oauth2/token: {"errors":[{"code":99,"message":"..."}]}
    #[derive(Deserialize)]
    struct Errors {
        errors: Vec<ErrorItem>,
    }
    #[derive(Deserialize)]
    struct ErrorItem {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    // v2 problem details: {"title":"...","detail":"...","type":"..."}
    // OAuth style: {"error":"invalid_client","error_description":"..."}
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        error_description: String,
        #[serde(default)]
        error: Option<serde_json::Value>,
    }

    if let Ok(env) = serde_json::from_slice::<Errors>(body) {
        if let Some(first) = env.errors.into_iter().next() {
            for candidate in [first.message, first.detail, first.title] {
                if !candidate.is_empty() {
                    return candidate;
                }
            }
        }
    }
    if let Ok(flat) = serde_json::from_slice::<Flat>(body) {
        let error = match flat.error {
            Some(serde_json::Value::String(s)) => s,
            _ => String::new(),
        };
        for candidate in [
            flat.detail,
            flat.error_description,
            flat.message,
            error,
            flat.title,
        ] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .trim()
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}

fn sanitize_token(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("bearer token is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("bearer token contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "bearer token contains control characters".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
