//! Authentication route handlers.
//!
//! Sign-in and sign-up go to the identity provider. On success the token and
//! identity are stored in the session and the browser is sent back to
//! `/auth`, where the access policy picks the right dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use market_secret_core::{Email, PortalPath, RouteDecision};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Viewer, set_current_session};
use crate::models::{CurrentSession, session_keys};
use crate::services::{AuthSession, SignUpOutcome};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the auth page.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    /// `signup` shows the registration form.
    pub mode: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Auth page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub signup: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

fn redirect_with_error(message: &str, signup: bool) -> Redirect {
    let mode = if signup { "mode=signup&" } else { "" };
    Redirect::to(&format!(
        "/auth?{mode}error={}",
        urlencoding::encode(message)
    ))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the auth form, or send signed-in users to their dashboard.
pub async fn auth_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<AuthQuery>,
) -> Response {
    match state.policy().route(PortalPath::Auth, viewer.identity()) {
        RouteDecision::Redirect(to) => Redirect::to(to.as_str()).into_response(),
        RouteDecision::Render(_) => AuthTemplate {
            signup: query.mode.as_deref() == Some("signup"),
            error: query.error,
            success: query.success,
        }
        .into_response(),
    }
}

async fn start_session(session: &Session, auth: AuthSession) -> Result<Redirect> {
    set_sentry_user(&auth.identity.id, Some(auth.identity.email.as_str()));
    let current = CurrentSession {
        access_token: auth.access_token,
        identity: auth.identity,
    };
    set_current_session(session, &current).await?;
    Ok(Redirect::to(PortalPath::Auth.as_str()))
}

/// Handle sign-in form submission.
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Result<Redirect> {
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(redirect_with_error("Please enter a valid email address", false));
    };
    let password = SecretString::from(form.password);

    match state.identity().sign_in(&email, &password).await {
        Ok(auth) => {
            tracing::info!(user_id = %auth.identity.id, "User signed in");
            start_session(&session, auth).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-in failed");
            Ok(redirect_with_error(&e.user_message(), false))
        }
    }
}

/// Handle sign-up form submission.
///
/// When the provider requires email confirmation no session is created and
/// the form shows a confirmation notice instead.
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Result<Redirect> {
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(redirect_with_error("Please enter a valid email address", true));
    };
    let password = SecretString::from(form.password);
    let full_name = form
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match state.identity().sign_up(&email, &password, full_name).await {
        Ok(SignUpOutcome::Session(auth)) => {
            tracing::info!(user_id = %auth.identity.id, "User signed up");
            start_session(&session, auth).await
        }
        Ok(SignUpOutcome::ConfirmationRequired(identity)) => {
            tracing::info!(user_id = %identity.id, "User signed up, confirmation pending");
            Ok(Redirect::to(&format!(
                "/auth?success={}",
                urlencoding::encode("Check your email to confirm your account, then sign in.")
            )))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            Ok(redirect_with_error(&e.user_message(), true))
        }
    }
}

/// Handle sign-out.
///
/// The provider session is revoked on a best-effort basis; the cookie
/// session is always flushed.
pub async fn sign_out(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let stored = session
        .get::<CurrentSession>(session_keys::CURRENT_SESSION)
        .await
        .ok()
        .flatten();

    if let Some(current) = stored {
        if let Err(e) = state.identity().sign_out(&current.access_token).await {
            tracing::warn!(error = %e, "Provider sign-out failed");
        }
        tracing::info!(user_id = %current.identity.id, "User signed out");
    }

    session.flush().await?;
    clear_sentry_user();

    Ok(Redirect::to(PortalPath::Landing.as_str()))
}
