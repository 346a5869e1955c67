//! Route gating: who may see `/auth`, `/admin` and `/student`.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use market_secret_core::SubscriptionTier;
use market_secret_integration_tests::{ADMIN_EMAIL, TestApp};

#[tokio::test]
async fn test_landing_renders_for_everyone() {
    let mut app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Choose Your Path to Success"));

    app.admin();
    app.sign_in(ADMIN_EMAIL).await;
    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unauthenticated_dashboards_redirect_to_auth() {
    let mut app = TestApp::new();
    assert!(app.get("/admin").await.redirects_to("/auth"));
    assert!(app.get("/student").await.redirects_to("/auth"));
    assert!(app.get("/admin/videos/new").await.redirects_to("/auth"));
    assert!(
        app.post_form("/admin/videos", &[("title", "x")])
            .await
            .redirects_to("/auth")
    );
}

#[tokio::test]
async fn test_unauthenticated_auth_shows_form() {
    let mut app = TestApp::new();
    let response = app.get("/auth").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("action=\"/auth/sign-in\""));

    let response = app.get("/auth?mode=signup").await;
    assert!(response.body.contains("action=\"/auth/sign-up\""));
}

#[tokio::test]
async fn test_admin_at_auth_goes_to_admin() {
    let mut app = TestApp::new();
    app.admin();
    app.sign_in(ADMIN_EMAIL).await;

    assert!(app.get("/auth").await.redirects_to("/admin"));
    assert_eq!(app.get("/admin").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_open_student_dashboard() {
    let mut app = TestApp::new();
    app.admin();
    app.sign_in(ADMIN_EMAIL).await;

    assert!(app.get("/student").await.redirects_to("/auth"));
}

#[tokio::test]
async fn test_student_at_auth_goes_to_student() {
    let mut app = TestApp::new();
    app.student("sarah@example.com", Some("Sarah"), SubscriptionTier::Starter);
    app.sign_in("sarah@example.com").await;

    assert!(app.get("/auth").await.redirects_to("/student"));
    assert_eq!(app.get("/student").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_student_cannot_reach_admin_pages() {
    let mut app = TestApp::new();
    app.student("sarah@example.com", None, SubscriptionTier::Advanced);
    app.sign_in("sarah@example.com").await;

    assert!(app.get("/admin").await.redirects_to("/auth"));
    assert!(app.get("/admin?tab=users").await.redirects_to("/auth"));
    assert!(
        app.post_form("/admin/stories", &[("student_name", "Eve")])
            .await
            .redirects_to("/auth")
    );
}

#[tokio::test]
async fn test_admin_match_is_case_sensitive() {
    let mut app = TestApp::new();
    app.identity
        .add_account("Admin@TheMarketSecret.com", Some("Impostor"));
    app.sign_in("Admin@TheMarketSecret.com").await;

    assert!(app.get("/auth").await.redirects_to("/student"));
    assert!(app.get("/admin").await.redirects_to("/auth"));
}

#[tokio::test]
async fn test_revoked_token_fails_closed() {
    let mut app = TestApp::new();
    app.admin();
    app.sign_in(ADMIN_EMAIL).await;
    assert_eq!(app.get("/admin").await.status, StatusCode::OK);

    app.identity.revoke_all_tokens();

    assert!(app.get("/admin").await.redirects_to("/auth"));
    // The stale session was cleared, so the form renders again
    assert_eq!(app.get("/auth").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_cookie_is_signed_out() {
    let mut app = TestApp::new();
    app.set_cookie("tms_session=not-a-real-session");
    assert!(app.get("/student").await.redirects_to("/auth"));
    assert_eq!(app.get("/auth").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_sessions_are_per_browser() {
    let mut admin = TestApp::new();
    admin.admin();
    admin.sign_in(ADMIN_EMAIL).await;

    let mut visitor = admin.new_browser();
    assert!(visitor.get("/admin").await.redirects_to("/auth"));
    assert_eq!(admin.get("/admin").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_headers() {
    let mut app = TestApp::new();
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert!(response.headers.contains_key("x-request-id"));
    assert!(response.headers.contains_key("content-security-policy"));
}
