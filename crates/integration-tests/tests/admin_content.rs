//! Admin dashboard: users tab and video/story management.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use market_secret_core::{SubscriptionTier, Video};
use market_secret_integration_tests::{
    ADMIN_EMAIL, TestApp, first_edit_id, rejected_write_message, rejecting_content,
};

async fn admin_app() -> TestApp {
    let mut app = TestApp::new();
    app.admin();
    app.sign_in(ADMIN_EMAIL).await;
    app
}

fn video_form<'a>(title: &'a str, module: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("title", title),
        ("description", "Reading institutional order flow"),
        ("video_url", "https://example.com/new"),
        ("thumbnail_url", ""),
        ("module", module),
        ("order_index", "3"),
        ("package_type", "starter"),
    ]
}

#[tokio::test]
async fn test_users_tab_lists_profiles_with_stats() {
    let mut app = admin_app().await;
    app.student("sarah@example.com", Some("Sarah Johnson"), SubscriptionTier::Starter);
    app.student("mike@example.com", Some("Michael Chen"), SubscriptionTier::Unpaid);

    let page = app.get("/admin").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Sarah Johnson"));
    assert!(page.body.contains("Michael Chen"));
    assert!(page.body.contains("Total Users</p><p class=\"value\">2<"));
    assert!(page.body.contains("Paid Users</p><p class=\"value\">1<"));
    assert!(page.body.contains("Total Videos</p><p class=\"value\">9<"));
    assert!(page.body.contains("Success Stories</p><p class=\"value\">2<"));

    let page = app.get("/admin?tab=users&q=johnson").await;
    assert!(page.body.contains("Sarah Johnson"));
    assert!(!page.body.contains("Michael Chen"));
}

#[tokio::test]
async fn test_users_tab_falls_back_to_current_admin() {
    let mut app = admin_app().await;
    app.profiles.fail();

    let page = app.get("/admin").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(ADMIN_EMAIL));
    assert!(page.body.contains("Total Users</p><p class=\"value\">1<"));
    assert!(page.body.contains("Advanced"));
}

#[tokio::test]
async fn test_video_search_matches_title_or_module() {
    let mut app = admin_app().await;
    let page = app.get("/admin?tab=videos&q=SMC").await;

    assert!(page.body.contains("SMC Market Structure"));
    assert!(page.body.contains("Order Blocks and Fair Value Gaps"));
    assert!(!page.body.contains("Forex Basics Introduction"));
    // Stats still count the whole catalog
    assert!(page.body.contains("Total Videos</p><p class=\"value\">9<"));
}

#[tokio::test]
async fn test_create_video_appears_in_list_and_for_students() {
    let mut app = admin_app().await;
    let response = app
        .post_form("/admin/videos", &video_form("Liquidity Sweeps", "SMC Course"))
        .await;
    assert!(response.status.is_redirection());
    assert!(
        response
            .location
            .unwrap()
            .starts_with("/admin?tab=videos&success=")
    );

    let page = app.get("/admin?tab=videos").await;
    assert!(page.body.contains("Liquidity Sweeps"));
    assert!(page.body.contains("Total Videos</p><p class=\"value\">10<"));

    let mut student = app.new_browser();
    student.student("sarah@example.com", None, SubscriptionTier::Starter);
    student.sign_in("sarah@example.com").await;
    let page = student.get("/student").await;
    assert!(page.body.contains("Liquidity Sweeps"));
}

#[tokio::test]
async fn test_create_video_rejects_blank_title() {
    let mut app = admin_app().await;
    let response = app
        .post_form("/admin/videos", &video_form("   ", "SMC Course"))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("title is required"));
    // The rest of the form is kept
    assert!(response.body.contains("Reading institutional order flow"));

    let page = app.get("/admin?tab=videos").await;
    assert!(page.body.contains("Total Videos</p><p class=\"value\">9<"));
}

#[tokio::test]
async fn test_backend_write_failure_is_shown_on_form() {
    let mut app = TestApp::with_content(rejecting_content());
    app.admin();
    app.sign_in(ADMIN_EMAIL).await;
    let message = rejected_write_message::<Video>();

    let response = app
        .post_form("/admin/videos", &video_form("Liquidity Sweeps", "SMC Course"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body.contains(&message));
    assert!(response.body.contains("Add New Video"));
    assert!(response.body.contains("value=\"Liquidity Sweeps\""));

    let page = app.get("/admin?tab=videos&q=SMC%20Market%20Structure").await;
    let id = first_edit_id(&page.body, "videos").unwrap();
    let response = app
        .post_form(
            &format!("/admin/videos/{id}"),
            &video_form("SMC Market Structure II", "SMC Course"),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body.contains(&message));
    assert!(response.body.contains("Update Video"));

    let page = app.get("/admin?tab=videos").await;
    assert!(!page.body.contains("Liquidity Sweeps"));
    assert!(!page.body.contains("SMC Market Structure II"));
    assert!(page.body.contains("Total Videos</p><p class=\"value\">9<"));
}

#[tokio::test]
async fn test_large_order_index_is_accepted() {
    let mut app = admin_app().await;
    let mut form = video_form("Liquidity Sweeps", "SMC Course");
    form.retain(|(k, _)| *k != "order_index");
    form.push(("order_index", "70000"));
    let response = app.post_form("/admin/videos", &form).await;
    assert!(response.status.is_redirection());

    let page = app.get("/admin?tab=videos&q=Liquidity").await;
    assert!(page.body.contains("#70000"));
}

#[tokio::test]
async fn test_negative_order_index_is_rejected() {
    let mut app = admin_app().await;
    let mut form = video_form("Liquidity Sweeps", "SMC Course");
    form.retain(|(k, _)| *k != "order_index");
    form.push(("order_index", "-2"));
    let response = app.post_form("/admin/videos", &form).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("order_index must not be negative"));
}

#[tokio::test]
async fn test_create_video_rejects_bad_order_index() {
    let mut app = admin_app().await;
    let mut form = video_form("Liquidity Sweeps", "SMC Course");
    form.retain(|(k, _)| *k != "order_index");
    form.push(("order_index", "first"));
    let response = app.post_form("/admin/videos", &form).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("order_index must be a whole number"));
}

#[tokio::test]
async fn test_edit_and_update_video() {
    let mut app = admin_app().await;
    let page = app.get("/admin?tab=videos&q=Elliott%20Wave%20Patterns").await;
    let id = first_edit_id(&page.body, "videos").unwrap();

    let form = app.get(&format!("/admin/videos/{id}/edit")).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("value=\"Elliott Wave Patterns\""));

    let update = video_form("Elliott Wave Patterns II", "Elliott Wave");
    for _ in 0..2 {
        let response = app.post_form(&format!("/admin/videos/{id}"), &update).await;
        assert!(response.status.is_redirection());
    }

    let page = app.get("/admin?tab=videos").await;
    assert!(page.body.contains("Elliott Wave Patterns II"));
    assert!(page.body.contains("SMC Market Structure"));
    assert!(page.body.contains("Total Videos</p><p class=\"value\">9<"));
}

#[tokio::test]
async fn test_unknown_video_id_is_not_found() {
    let mut app = admin_app().await;
    let missing = "00000000-0000-0000-0000-0000000000ff";

    let response = app.get(&format!("/admin/videos/{missing}/edit")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post_form(&format!("/admin/videos/{missing}"), &video_form("X", "Y"))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post_form(&format!("/admin/videos/{missing}/delete"), &[])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_video_removes_only_target() {
    let mut app = admin_app().await;
    let page = app.get("/admin?tab=videos&q=SMC%20Market%20Structure").await;
    let id = first_edit_id(&page.body, "videos").unwrap();

    let response = app
        .post_form(&format!("/admin/videos/{id}/delete"), &[])
        .await;
    assert!(response.status.is_redirection());

    let page = app.get("/admin?tab=videos").await;
    assert!(!page.body.contains("SMC Market Structure"));
    assert!(page.body.contains("Market Structure Basics"));
    assert!(page.body.contains("Total Videos</p><p class=\"value\">8<"));
}

#[tokio::test]
async fn test_story_lifecycle() {
    let mut app = admin_app().await;
    let response = app
        .post_form(
            "/admin/stories",
            &[
                ("student_name", "Emma Rodriguez"),
                ("profit_amount", "$32,000"),
                ("timeframe", "4 months"),
                ("testimonial", "The live sessions made the difference."),
                ("image_url", ""),
                ("is_featured", "on"),
            ],
        )
        .await;
    assert!(response.status.is_redirection());

    let page = app.get("/admin?tab=stories&q=emma").await;
    assert!(page.body.contains("Emma Rodriguez"));
    assert!(!page.body.contains("Sarah Johnson"));
    assert!(page.body.contains("Featured"));
    let id = first_edit_id(&page.body, "stories").unwrap();

    let response = app
        .post_form(
            &format!("/admin/stories/{id}"),
            &[
                ("student_name", "Emma Rodriguez"),
                ("profit_amount", "$35,000"),
                ("timeframe", "5 months"),
                ("testimonial", "Still going strong."),
            ],
        )
        .await;
    assert!(response.status.is_redirection());
    let page = app.get("/admin?tab=stories&q=emma").await;
    assert!(page.body.contains("$35,000"));
    assert!(!page.body.contains("badge-featured"));

    let response = app
        .post_form(&format!("/admin/stories/{id}/delete"), &[])
        .await;
    assert!(response.status.is_redirection());
    let page = app.get("/admin?tab=stories").await;
    assert!(!page.body.contains("Emma Rodriguez"));
    assert!(page.body.contains("Sarah Johnson"));
}

#[tokio::test]
async fn test_story_requires_testimonial() {
    let mut app = admin_app().await;
    let response = app
        .post_form(
            "/admin/stories",
            &[
                ("student_name", "Emma Rodriguez"),
                ("profit_amount", "$32,000"),
                ("timeframe", "4 months"),
                ("testimonial", ""),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("testimonial is required"));
}
