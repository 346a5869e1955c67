//! Tier gating and module filtering on `/student`.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use market_secret_core::SubscriptionTier;
use market_secret_integration_tests::TestApp;

const EMAIL: &str = "student@example.com";

async fn signed_in(tier: Option<SubscriptionTier>) -> TestApp {
    let mut app = TestApp::new();
    match tier {
        Some(tier) => {
            app.student(EMAIL, Some("Michael Chen"), tier);
        }
        None => {
            app.identity.add_account(EMAIL, Some("Michael Chen"));
        }
    }
    app.sign_in(EMAIL).await;
    app
}

fn watch_links(body: &str) -> usize {
    body.matches("Watch Now").count()
}

#[tokio::test]
async fn test_unpaid_student_sees_no_videos_in_any_module() {
    let mut app = signed_in(Some(SubscriptionTier::Unpaid)).await;
    for path in [
        "/student",
        "/student?module=all",
        "/student?module=Forex%20Basics",
        "/student?module=Elliott%20Wave",
    ] {
        let page = app.get(path).await;
        assert_eq!(page.status, StatusCode::OK);
        assert_eq!(watch_links(&page.body), 0, "{path}");
        assert!(page.body.contains("View Packages"));
        assert!(!page.body.contains("Course Modules"));
    }
}

#[tokio::test]
async fn test_missing_profile_counts_as_unpaid() {
    let mut app = signed_in(None).await;
    let page = app.get("/student").await;
    assert_eq!(watch_links(&page.body), 0);
    assert!(page.body.contains("Unpaid"));
}

#[tokio::test]
async fn test_starter_sees_shared_videos_only() {
    let mut app = signed_in(Some(SubscriptionTier::Starter)).await;
    let page = app.get("/student").await;

    assert_eq!(watch_links(&page.body), 6);
    assert!(page.body.contains("Currency Pairs Explained"));
    assert!(page.body.contains("SMC Market Structure"));
    assert!(!page.body.contains("Elliott Wave Theory"));
    assert!(!page.body.contains("View Packages"));
}

#[tokio::test]
async fn test_advanced_sees_whole_catalog() {
    let mut app = signed_in(Some(SubscriptionTier::Advanced)).await;
    let page = app.get("/student").await;

    assert_eq!(watch_links(&page.body), 9);
    assert!(page.body.contains("Elliott Wave Patterns"));
    assert!(page.body.contains("9 videos &middot; 3 modules"));
}

#[tokio::test]
async fn test_module_filter_narrows_visible_set() {
    let mut app = signed_in(Some(SubscriptionTier::Advanced)).await;

    let page = app.get("/student?module=Elliott%20Wave").await;
    assert_eq!(watch_links(&page.body), 3);
    assert!(!page.body.contains("Currency Pairs Explained"));
    // The module buttons still list every visible module
    assert!(page.body.contains(">Forex Basics</a>"));

    let page = app.get("/student?module=Nonexistent").await;
    assert_eq!(watch_links(&page.body), 0);

    // Module names match exactly, surrounding spaces included
    let page = app.get("/student?module=%20Elliott%20Wave").await;
    assert_eq!(watch_links(&page.body), 0);
}

#[tokio::test]
async fn test_starter_cannot_filter_into_advanced_module() {
    let mut app = signed_in(Some(SubscriptionTier::Starter)).await;
    let page = app.get("/student?module=Elliott%20Wave").await;
    assert_eq!(watch_links(&page.body), 0);
    assert!(!page.body.contains(">Elliott Wave</a>"));
}

#[tokio::test]
async fn test_profile_outage_fails_closed() {
    let mut app = signed_in(Some(SubscriptionTier::Advanced)).await;
    app.profiles.fail();
    let page = app.get("/student").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(watch_links(&page.body), 0);
    assert!(!page.body.contains("Course Modules"));
}

#[tokio::test]
async fn test_welcome_falls_back_to_student() {
    let mut app = TestApp::new();
    app.student("anon@example.com", None, SubscriptionTier::Starter);
    app.sign_in("anon@example.com").await;
    let page = app.get("/student").await;
    assert!(page.body.contains("Welcome back, Student!"));
    assert!(page.body.contains("anon@example.com"));
}
