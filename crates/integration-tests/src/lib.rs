//! Integration test support for The Market Secret portal.
//!
//! The full router is driven in process with `tower::ServiceExt::oneshot`.
//! Identity and profiles come from the fakes below; content uses the
//! in-memory store seeded with the fixture catalog.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p market-secret-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::DateTime;
use market_secret_core::{
    ContentEntity, Email, Identity, Profile, SubscriptionTier, UserId, fixtures,
};
use market_secret_portal::config::PortalConfig;
use market_secret_portal::services::{
    AuthSession, ContentService, EntityStore, IdentityProvider, InMemoryStore, ProfileStore,
    SessionChange, SignUpOutcome,
};
use market_secret_portal::state::AppState;
use market_secret_portal::supabase::SupabaseError;
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tower::ServiceExt;

/// Administrator address used by the default test configuration.
pub const ADMIN_EMAIL: &str = "admin@themarketsecret.com";

/// Password of every fake account.
pub const PASSWORD: &str = "correct horse battery staple";

// =============================================================================
// Fake identity provider
// =============================================================================

/// In-memory stand-in for GoTrue.
pub struct FakeIdentityProvider {
    accounts: RwLock<HashMap<String, Identity>>,
    tokens: RwLock<HashMap<String, Identity>>,
    changes: broadcast::Sender<SessionChange>,
    require_confirmation: bool,
}

impl Default for FakeIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            accounts: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            changes,
            require_confirmation: false,
        }
    }

    /// Sign-ups wait for email confirmation instead of signing in.
    #[must_use]
    pub const fn requiring_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Register an account with [`PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics on an invalid email.
    #[allow(clippy::unwrap_used)]
    pub fn add_account(&self, email: &str, name: Option<&str>) -> Identity {
        let identity = Identity {
            id: UserId::generate(),
            email: Email::parse(email).unwrap(),
            display_name: name.map(ToOwned::to_owned),
            created_at: DateTime::UNIX_EPOCH,
            last_login: None,
        };
        self.accounts
            .write()
            .insert(email.to_string(), identity.clone());
        identity
    }

    /// Invalidate every issued token, as if they had all expired.
    pub fn revoke_all_tokens(&self) {
        self.tokens.write().clear();
    }

    /// Number of live tokens.
    #[must_use]
    pub fn live_tokens(&self) -> usize {
        self.tokens.read().len()
    }

    fn issue(&self, identity: Identity) -> AuthSession {
        let token = format!("token-{}", uuid::Uuid::new_v4());
        self.tokens.write().insert(token.clone(), identity.clone());
        AuthSession {
            access_token: SecretString::from(token),
            identity,
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn current_identity(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<Identity>, SupabaseError> {
        let identity = self.tokens.read().get(access_token.expose_secret()).cloned();
        if identity.is_none() {
            let _ = self.changes.send(SessionChange::TokenRejected);
        }
        Ok(identity)
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, SupabaseError> {
        let identity = self.accounts.read().get(email.as_str()).cloned();
        match identity {
            Some(identity) if password.expose_secret() == PASSWORD => {
                let _ = self.changes.send(SessionChange::SignedIn {
                    user_id: identity.id,
                });
                Ok(self.issue(identity))
            }
            _ => Err(SupabaseError::Api {
                status: 400,
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    async fn sign_up(
        &self,
        email: &Email,
        _password: &SecretString,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, SupabaseError> {
        if self.accounts.read().contains_key(email.as_str()) {
            return Err(SupabaseError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let identity = self.add_account(email.as_str(), full_name);
        let _ = self.changes.send(SessionChange::SignedUp {
            user_id: identity.id,
        });
        if self.require_confirmation {
            Ok(SignUpOutcome::ConfirmationRequired(identity))
        } else {
            Ok(SignUpOutcome::Session(self.issue(identity)))
        }
    }

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), SupabaseError> {
        self.tokens.write().remove(access_token.expose_secret());
        let _ = self.changes.send(SessionChange::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }
}

// =============================================================================
// Fake profile store
// =============================================================================

/// In-memory `profiles` table. Can be switched to fail every read.
#[derive(Default)]
pub struct FakeProfileStore {
    rows: RwLock<Vec<Profile>>,
    failing: RwLock<bool>,
}

impl FakeProfileStore {
    /// Add a profile row for `identity`.
    pub fn set_tier(&self, identity: &Identity, tier: SubscriptionTier) {
        let mut rows = self.rows.write();
        rows.retain(|p| p.id != identity.id);
        rows.push(Profile::synthesize(identity, tier, None));
    }

    /// Make every read fail.
    pub fn fail(&self) {
        *self.failing.write() = true;
    }

    fn check(&self) -> Result<(), SupabaseError> {
        if *self.failing.read() {
            return Err(SupabaseError::Api {
                status: 503,
                message: "profiles unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn list_profiles(
        &self,
        _access_token: Option<&SecretString>,
    ) -> Result<Vec<Profile>, SupabaseError> {
        self.check()?;
        Ok(self.rows.read().clone())
    }

    async fn get_profile(
        &self,
        _access_token: Option<&SecretString>,
        id: UserId,
    ) -> Result<Option<Profile>, SupabaseError> {
        self.check()?;
        Ok(self.rows.read().iter().find(|p| p.id == id).cloned())
    }
}

// =============================================================================
// Write-rejecting content store
// =============================================================================

/// Content store that serves the seed rows but rejects every write, the way
/// PostgREST does when row-level security denies the caller.
pub struct RejectingWrites<T> {
    rows: InMemoryStore<T>,
}

impl<T: ContentEntity> RejectingWrites<T> {
    #[must_use]
    pub const fn new(rows: Vec<T>) -> Self {
        Self {
            rows: InMemoryStore::new(rows),
        }
    }
}

/// Message of every rejected write to `T`'s table.
#[must_use]
pub fn rejected_write_message<T: ContentEntity>() -> String {
    format!("new row violates row-level security policy for table {}", T::TABLE)
}

fn rejected<T: ContentEntity>() -> SupabaseError {
    SupabaseError::Api {
        status: 403,
        message: rejected_write_message::<T>(),
    }
}

#[async_trait]
impl<T: ContentEntity> EntityStore<T> for RejectingWrites<T> {
    async fn all(&self, access_token: Option<&SecretString>) -> Result<Vec<T>, SupabaseError> {
        self.rows.all(access_token).await
    }

    async fn insert(
        &self,
        _access_token: Option<&SecretString>,
        _entity: T,
    ) -> Result<T, SupabaseError> {
        Err(rejected::<T>())
    }

    async fn replace(
        &self,
        _access_token: Option<&SecretString>,
        _entity: T,
    ) -> Result<Option<T>, SupabaseError> {
        Err(rejected::<T>())
    }

    async fn remove(
        &self,
        _access_token: Option<&SecretString>,
        _id: T::Id,
    ) -> Result<bool, SupabaseError> {
        Err(rejected::<T>())
    }
}

/// Seed content whose every write is rejected.
#[must_use]
pub fn rejecting_content() -> ContentService {
    ContentService::from_stores(
        Arc::new(RejectingWrites::new(fixtures::videos())),
        Arc::new(RejectingWrites::new(fixtures::stories())),
    )
}

// =============================================================================
// Test app
// =============================================================================

/// A response with its body read to a string.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Whether this is a redirect to `path`.
    #[must_use]
    pub fn redirects_to(&self, path: &str) -> bool {
        self.status.is_redirection() && self.location.as_deref() == Some(path)
    }
}

/// The portal router plus one browser's cookie jar.
pub struct TestApp {
    pub identity: Arc<FakeIdentityProvider>,
    pub profiles: Arc<FakeProfileStore>,
    pub state: AppState,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Portal with the default configuration, fake backends and seed content.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be built.
    #[must_use]
    pub fn new() -> Self {
        Self::with_identity(FakeIdentityProvider::new())
    }

    /// Portal with a customised identity provider.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be built.
    #[must_use]
    pub fn with_identity(identity: FakeIdentityProvider) -> Self {
        Self::build(identity, ContentService::in_memory())
    }

    /// Portal with a customised content service.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be built.
    #[must_use]
    pub fn with_content(content: ContentService) -> Self {
        Self::build(FakeIdentityProvider::new(), content)
    }

    #[allow(clippy::unwrap_used)]
    fn build(identity: FakeIdentityProvider, content: ContentService) -> Self {
        let config = PortalConfig::from_lookup(|_| None).unwrap();
        let identity = Arc::new(identity);
        let profiles = Arc::new(FakeProfileStore::default());
        let state = AppState::from_parts(config, identity.clone(), profiles.clone(), content);
        Self {
            router: market_secret_portal::app(state.clone()),
            identity,
            profiles,
            state,
            cookie: None,
        }
    }

    /// Register the administrator account.
    pub fn admin(&self) -> Identity {
        self.identity.add_account(ADMIN_EMAIL, Some("Site Admin"))
    }

    /// Register a student with a profile on `tier`.
    pub fn student(&self, email: &str, name: Option<&str>, tier: SubscriptionTier) -> Identity {
        let identity = self.identity.add_account(email, name);
        self.profiles.set_tier(&identity, tier);
        identity
    }

    /// A second browser: same server, empty cookie jar.
    #[must_use]
    pub fn new_browser(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            profiles: self.profiles.clone(),
            state: self.state.clone(),
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Whether the browser holds a session cookie.
    #[must_use]
    pub const fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    /// Replace the session cookie, simulating a tampered or stale cookie.
    pub fn set_cookie(&mut self, cookie: &str) {
        self.cookie = Some(cookie.to_string());
    }

    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path);
        self.send(request, Body::empty()).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = form
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(path).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(request, Body::from(body)).await
    }

    /// Sign in through the form, asserting it lands on `/auth`.
    ///
    /// # Panics
    ///
    /// Panics if the sign-in is rejected.
    pub async fn sign_in(&mut self, email: &str) {
        let response = self
            .post_form("/auth/sign-in", &[("email", email), ("password", PASSWORD)])
            .await;
        assert!(
            response.redirects_to("/auth"),
            "sign-in for {email} failed: {:?}",
            response.location
        );
    }

    #[allow(clippy::unwrap_used)]
    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap_or_default().trim();
            let expired = raw.to_ascii_lowercase().contains("max-age=0");
            if expired || pair.ends_with('=') {
                self.cookie = None;
            } else {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the id from the first `/admin/{kind}/{id}/edit` link in `html`.
#[must_use]
pub fn first_edit_id(html: &str, kind: &str) -> Option<String> {
    let marker = format!("/admin/{kind}/");
    html.match_indices(&marker).find_map(|(start, _)| {
        let rest = html.get(start + marker.len()..)?;
        let (id, tail) = rest.split_once('/')?;
        tail.starts_with("edit").then(|| id.to_string())
    })
}
