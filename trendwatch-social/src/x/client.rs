//! Thin wrapper over the X trends endpoints.
//!
//! Auth is app-only: a bearer token either comes from configuration or is
//! exchanged once from the consumer key/secret. Tokens are never cached or
//! refreshed here.
use crate::x::types::{ApiTrend, PlaceTrends, TokenResponse, TrendLocation, TrendsResponse};
use std::borrow::Cow;
use tracing::{debug, info};
use trendwatch_common::{Result, TrendError};
use trendwatch_http::{Auth, HttpClient, HttpError, RequestOpts};

pub const DEFAULT_BASE_URL: &str = "https://api.x.com/";

type ApiResult<T> = std::result::Result<T, HttpError>;

/// App-only API credentials as read from configuration. Any field may be
/// absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub api_secret_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mark(v: &Option<String>) -> &'static str {
            if v.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("Credentials")
            .field("api_key", &mark(&self.api_key))
            .field("api_secret_key", &mark(&self.api_secret_key))
            .field("bearer_token", &mark(&self.bearer_token))
            .finish()
    }
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Exchange the consumer key/secret for an app-only bearer token.
pub async fn exchange_bearer_token(
    http: &HttpClient,
    api_key: &str,
    api_secret: &str,
) -> Result<String> {
    let resp: TokenResponse = http
        .post_form(
            "oauth2/token",
            &[("grant_type", "client_credentials")],
            RequestOpts {
                auth: Some(Auth::Basic {
                    username: api_key,
                    password: api_secret,
                }),
                retries: Some(0),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| TrendError::Api(format!("failed to obtain bearer token: {e}")))?;

    if !resp.token_type.eq_ignore_ascii_case("bearer") {
        return Err(TrendError::Api(format!(
            "unexpected token type {:?}",
            resp.token_type
        )));
    }
    if resp.access_token.trim().is_empty() {
        return Err(TrendError::Api(
            "token endpoint returned an empty access token".into(),
        ));
    }
    info!(target: "social.x", "obtained app-only bearer token");
    Ok(resp.access_token)
}

/// A configured bearer token wins; otherwise exchange the consumer key/secret.
pub async fn resolve_bearer(http: &HttpClient, creds: &Credentials) -> Result<String> {
    if let Some(bearer) = present(&creds.bearer_token) {
        debug!(target: "social.x", "using configured bearer token");
        return Ok(bearer.to_string());
    }
    match (present(&creds.api_key), present(&creds.api_secret_key)) {
        (Some(key), Some(secret)) => exchange_bearer_token(http, key, secret).await,
        _ => Err(TrendError::Config(
            "no bearer token and no API key/secret configured".into(),
        )),
    }
}

/// Case-insensitive exact match on the location name; first hit wins.
pub fn find_woeid(locations: &[TrendLocation], name: &str) -> Option<u64> {
    let wanted = name.trim().to_lowercase();
    locations
        .iter()
        .find(|loc| loc.name.to_lowercase() == wanted)
        .map(|loc| loc.woeid)
}

#[derive(Clone)]
pub struct XApi {
    http: HttpClient,
    bearer: String,
}

impl XApi {
    pub fn new(bearer_token: impl Into<String>) -> ApiResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, bearer_token)
    }

    pub fn with_base_url(base: &str, bearer_token: impl Into<String>) -> ApiResult<Self> {
        Ok(Self::with_client(HttpClient::new(base)?, bearer_token))
    }

    /// Reuse an existing client, e.g. the one used for the token exchange.
    pub fn with_client(http: HttpClient, bearer_token: impl Into<String>) -> Self {
        Self {
            http,
            bearer: bearer_token.into(),
        }
    }

    fn opts(&self) -> RequestOpts<'_> {
        RequestOpts {
            auth: Some(Auth::Bearer(&self.bearer)),
            ..Default::default()
        }
    }

    /// `GET 2/trends/by/woeid/{woeid}`. A body without `data` is an empty list.
    pub async fn trends_by_woeid(&self, woeid: u64) -> ApiResult<Vec<ApiTrend>> {
        let resp: TrendsResponse = self
            .http
            .get_json(&format!("2/trends/by/woeid/{woeid}"), self.opts())
            .await?;
        let trends = resp.data.unwrap_or_default();
        debug!(target: "social.x", woeid, count = trends.len(), "v2 trends fetched");
        Ok(trends)
    }

    /// `GET 1.1/trends/available.json`.
    pub async fn available_locations(&self) -> ApiResult<Vec<TrendLocation>> {
        let locations: Vec<TrendLocation> = self
            .http
            .get_json("1.1/trends/available.json", self.opts())
            .await?;
        debug!(target: "social.x", count = locations.len(), "trend locations fetched");
        Ok(locations)
    }

    /// `GET 1.1/trends/place.json?id={woeid}`; `None` when the array is empty.
    pub async fn place_trends(&self, woeid: u64) -> ApiResult<Option<PlaceTrends>> {
        let id = woeid.to_string();
        let places: Vec<PlaceTrends> = self
            .http
            .get_json(
                "1.1/trends/place.json",
                RequestOpts {
                    query: Some(vec![("id", Cow::Owned(id))]),
                    ..self.opts()
                },
            )
            .await?;
        Ok(places.into_iter().next())
    }
}
