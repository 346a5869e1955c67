//! Supabase client: GoTrue auth API and PostgREST row API.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared by auth, profile and content calls
//! - Every request carries the project anon key as `apikey`, and the user's
//!   access token (or the anon key) as the bearer token
//! - Identities resolved from access tokens are cached via `moka` (60s TTL)
//! - Session changes are published on a `tokio::sync::broadcast` channel
//!
//! # Degraded mode
//!
//! Built without credentials, the client performs no network I/O at all:
//! token lookups find no session, sign-in and sign-up fail with
//! [`SupabaseError::NotConfigured`], sign-out succeeds and profile reads
//! return nothing.

mod auth;
mod profiles;
mod tables;
pub mod types;

pub use tables::SupabaseTable;

use std::sync::Arc;
use std::time::Duration;

use market_secret_core::Identity;
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;

use crate::config::SupabaseConfig;
use crate::services::SessionChange;
use types::ApiErrorBody;

/// How long a resolved identity is trusted before asking GoTrue again.
const IDENTITY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Pending session-change notifications per subscriber.
const SESSION_CHANNEL_CAPACITY: usize = 64;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// No project credentials are configured.
    #[error("Supabase not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The response parsed but made no sense.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SupabaseError {
    /// Message suitable for showing on a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => self.to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Http(_) => "Could not reach the authentication service".to_string(),
            Self::Parse(_) | Self::Url(_) | Self::InvalidResponse(_) => {
                "Unexpected response from the authentication service".to_string()
            }
        }
    }
}

/// Client for one Supabase project.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Option<Arc<SupabaseClientInner>>,
    changes: broadcast::Sender<SessionChange>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    config: SupabaseConfig,
    identities: Cache<String, Identity>,
}

impl SupabaseClient {
    /// Create a client. `None` builds a degraded client.
    #[must_use]
    pub fn new(config: Option<SupabaseConfig>) -> Self {
        let (changes, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);

        let inner = config.map(|config| {
            let identities = Cache::builder()
                .max_capacity(10_000)
                .time_to_live(IDENTITY_CACHE_TTL)
                .build();

            Arc::new(SupabaseClientInner {
                http: reqwest::Client::new(),
                config,
                identities,
            })
        });

        Self { inner, changes }
    }

    /// Whether requests will reach a real project.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    fn inner(&self) -> Result<&SupabaseClientInner, SupabaseError> {
        self.inner.as_deref().ok_or(SupabaseError::NotConfigured)
    }

    /// Publish a session change. Having no subscribers is fine.
    fn publish(&self, change: SessionChange) {
        tracing::debug!(?change, "Session change");
        let _ = self.changes.send(change);
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    /// Start a request with the project headers.
    ///
    /// The bearer token is the user's access token when given, else the
    /// anon key.
    fn request(
        &self,
        method: Method,
        url: Url,
        access_token: Option<&SecretString>,
    ) -> Result<RequestBuilder, SupabaseError> {
        let inner = self.inner()?;
        let anon_key = inner.config.anon_key();
        let bearer = access_token.map_or(anon_key, |token| token.expose_secret());

        Ok(inner
            .http
            .request(method, url)
            .header("apikey", anon_key)
            .bearer_auth(bearer))
    }

    /// URL of a GoTrue endpoint.
    fn auth_endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        Ok(Url::parse(&self.inner()?.config.auth_url(path))?)
    }

    /// URL of a PostgREST table with query parameters.
    fn table_endpoint(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, SupabaseError> {
        let mut url = Url::parse(&self.inner()?.config.rest_url(table))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

/// Turn a non-success response into `SupabaseError::Api`.
async fn check(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| body.chars().take(200).collect());

    tracing::debug!(status = %status, message = %message, "Supabase returned error");

    Err(SupabaseError::Api {
        status: status.as_u16(),
        message,
    })
}
