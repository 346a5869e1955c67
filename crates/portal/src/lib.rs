//! The Market Secret portal library.
//!
//! Landing page, student dashboard and admin content manager, served by one
//! axum router. The binary in `main.rs` adds configuration, logging and the
//! listener; everything else lives here so it can be driven in process by
//! the integration tests.
//!
//! # Architecture
//!
//! - Axum handlers gated by the core `AccessPolicy` on every request
//! - Askama templates for server-side rendering
//! - Supabase GoTrue for identity, PostgREST for profiles and content
//! - An in-memory content store when Supabase is not configured

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod supabase;

use axum::http::Request;
use axum::{Router, routing::get};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::rate_limit::RateLimiterLayer;
use crate::services::SessionChange;
use crate::state::AppState;

/// Static assets, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/portal/static";

/// Build the portal router without rate limiting.
///
/// Used by tests, which have no peer address to key the limiter on.
pub fn app(state: AppState) -> Router {
    build_router(state, None)
}

/// Build the portal router with the auth form posts rate limited.
pub fn rate_limited_app(state: AppState) -> Router {
    let limiter = middleware::auth_rate_limiter();
    if limiter.is_none() {
        tracing::warn!("Rate limiter configuration rejected, serving without it");
    }
    build_router(state, limiter)
}

fn build_router(state: AppState, limiter: Option<RateLimiterLayer>) -> Router {
    let auth_actions = match limiter {
        Some(layer) => routes::auth_action_routes().layer(layer),
        None => routes::auth_action_routes(),
    };
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::landing_routes())
        .merge(routes::auth_page_routes())
        .merge(auth_actions)
        .merge(routes::admin_routes())
        .merge(routes::student_routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Log every session change published by the identity provider.
///
/// The task ends when the provider is dropped.
pub fn spawn_session_change_logger(state: &AppState) -> JoinHandle<()> {
    let mut changes = state.identity().subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(SessionChange::SignedIn { user_id }) => {
                    tracing::info!(%user_id, "Session change: signed in");
                }
                Ok(SessionChange::SignedUp { user_id }) => {
                    tracing::info!(%user_id, "Session change: signed up");
                }
                Ok(SessionChange::SignedOut) => tracing::info!("Session change: signed out"),
                Ok(SessionChange::TokenRejected) => {
                    tracing::info!("Session change: access token rejected");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session change logger fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
