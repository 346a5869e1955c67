//! Authentication extractors.
//!
//! Every request re-resolves the signed-in identity from the stored access
//! token and asks the [`AccessPolicy`](market_secret_core::AccessPolicy)
//! whether the requested section may be rendered. Nothing about the decision
//! is cached in the session.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use market_secret_core::{Identity, PortalPath, RouteDecision};
use tower_sessions::Session;
use tracing::Span;

use crate::models::{CurrentSession, session_keys};
use crate::state::AppState;

/// The current visitor: signed in or not.
///
/// A session whose token the provider no longer accepts is cleared and
/// treated as signed out. A provider failure is also treated as signed out,
/// without clearing, so the next request tries again.
pub struct Viewer(pub Option<CurrentSession>);

impl Viewer {
    /// The signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref().map(|current| &current.identity)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };
        Ok(Self(resolve(session, state).await))
    }
}

async fn resolve(session: &Session, state: &AppState) -> Option<CurrentSession> {
    let stored = session
        .get::<CurrentSession>(session_keys::CURRENT_SESSION)
        .await
        .ok()
        .flatten()?;

    match state.identity().current_identity(&stored.access_token).await {
        Ok(Some(identity)) => {
            Span::current().record("user_id", identity.id.to_string());
            Some(CurrentSession {
                access_token: stored.access_token,
                identity,
            })
        }
        Ok(None) => {
            tracing::info!(user_id = %stored.identity.id, "Stored session no longer valid");
            if let Err(e) = clear_current_session(session).await {
                tracing::warn!(error = %e, "Failed to clear stale session");
            }
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed, treating as signed out");
            None
        }
    }
}

/// Rejection sending the browser to another section.
#[derive(Debug)]
pub struct GateRedirect(pub PortalPath);

impl IntoResponse for GateRedirect {
    fn into_response(self) -> Response {
        Redirect::to(self.0.as_str()).into_response()
    }
}

async fn gate(
    parts: &mut Parts,
    state: &AppState,
    path: PortalPath,
) -> Result<CurrentSession, GateRedirect> {
    let Ok(Viewer(current)) = Viewer::from_request_parts(parts, state).await;
    match state
        .policy()
        .route(path, current.as_ref().map(|c| &c.identity))
    {
        RouteDecision::Render(_) => current.ok_or(GateRedirect(PortalPath::Auth)),
        RouteDecision::Redirect(to) => Err(GateRedirect(to)),
    }
}

/// Extractor for the admin section.
///
/// Anyone but the administrator is redirected to `/auth`.
pub struct RequireAdmin(pub CurrentSession);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GateRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, PortalPath::Admin).await.map(Self)
    }
}

/// Extractor for the student section.
///
/// Visitors who are not signed in, and the administrator, are redirected to
/// `/auth`.
pub struct RequireStudent(pub CurrentSession);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = GateRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, PortalPath::Student).await.map(Self)
    }
}

/// Helper to store the current sign-in in the session.
///
/// The session ID is cycled first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_session(
    session: &Session,
    current: &CurrentSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_SESSION, current)
        .await
}

/// Helper to clear the current sign-in from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_session(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentSession>(session_keys::CURRENT_SESSION)
        .await?;
    Ok(())
}
