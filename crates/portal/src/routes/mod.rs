//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Landing page (?open= expands topics)
//! GET  /health                         - Health check
//!
//! # Auth
//! GET  /auth                           - Sign-in / sign-up form, or redirect by role
//! POST /auth/sign-in                   - Sign in with email and password
//! POST /auth/sign-up                   - Create an account
//! POST /auth/sign-out                  - Sign out
//!
//! # Admin (administrator only)
//! GET  /admin                          - Dashboard (?tab=users|videos|stories&q=)
//! GET  /admin/videos/new               - New video form
//! POST /admin/videos                   - Create video
//! GET  /admin/videos/{id}/edit         - Edit video form
//! POST /admin/videos/{id}              - Update video
//! POST /admin/videos/{id}/delete       - Delete video
//! GET  /admin/stories/new              - New success story form
//! POST /admin/stories                  - Create success story
//! GET  /admin/stories/{id}/edit        - Edit success story form
//! POST /admin/stories/{id}             - Update success story
//! POST /admin/stories/{id}/delete      - Delete success story
//!
//! # Student (signed-in students only)
//! GET  /student                        - Course videos (?module=)
//! ```

pub mod admin;
pub mod auth;
pub mod landing;
pub mod student;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Public pages.
pub fn landing_routes() -> Router<AppState> {
    Router::new().route("/", get(landing::landing))
}

/// The auth form page.
pub fn auth_page_routes() -> Router<AppState> {
    Router::new().route("/auth", get(auth::auth_page))
}

/// Auth form posts. Rate limited when serving.
pub fn auth_action_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-out", post(auth::sign_out))
}

/// Admin dashboard and content management.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/videos", post(admin::create_video))
        .route("/admin/videos/new", get(admin::new_video))
        .route("/admin/videos/{id}", post(admin::update_video))
        .route("/admin/videos/{id}/edit", get(admin::edit_video))
        .route("/admin/videos/{id}/delete", post(admin::delete_video))
        .route("/admin/stories", post(admin::create_story))
        .route("/admin/stories/new", get(admin::new_story))
        .route("/admin/stories/{id}", post(admin::update_story))
        .route("/admin/stories/{id}/edit", get(admin::edit_story))
        .route("/admin/stories/{id}/delete", post(admin::delete_story))
}

/// Student dashboard.
pub fn student_routes() -> Router<AppState> {
    Router::new().route("/student", get(student::dashboard))
}
