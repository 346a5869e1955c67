//! Admin dashboard route handlers.
//!
//! Every handler takes [`RequireAdmin`], so anyone but the administrator is
//! redirected to `/auth` before a handler body runs. Content mutations go
//! through [`ContentService`](crate::services::ContentService) with the
//! admin's token, so row-level security applies when Supabase is configured.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use market_secret_core::{
    ContentEntity, PackageType, Profile, StoryDraft, StoryId, SuccessStory, ValidationError,
    Video, VideoDraft, VideoId,
};
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::services::{ContentCollection, ContentError, load_users_with_fallback};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
    pub q: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Users,
    Videos,
    Stories,
}

impl Tab {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("videos") => Self::Videos,
            Some("stories") => Self::Stories,
            _ => Self::Users,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Videos => "videos",
            Self::Stories => "stories",
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Video form as submitted. Kept as strings so a rejected form can be shown
/// again exactly as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub order_index: String,
    #[serde(default)]
    pub package_type: String,
}

impl VideoForm {
    /// Convert to a draft.
    ///
    /// A blank order index means 1 and a blank package means `both`. Negative
    /// indexes get through here and are rejected by [`Video::validate`].
    fn to_draft(&self) -> std::result::Result<VideoDraft, ValidationError> {
        let order_index = match self.order_index.trim() {
            "" => 1,
            raw => raw.parse::<i32>().map_err(|_| ValidationError::Invalid {
                field: "order_index",
                reason: "must be a whole number".to_string(),
            })?,
        };
        let package_type = match self.package_type.trim() {
            "" => PackageType::default(),
            raw => raw.parse().map_err(|_| ValidationError::Invalid {
                field: "package_type",
                reason: format!("must be one of starter, advanced, both (got {raw})"),
            })?,
        };

        Ok(VideoDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            video_url: self.video_url.clone(),
            thumbnail_url: Some(self.thumbnail_url.clone()),
            module: self.module.clone(),
            order_index,
            package_type,
        })
    }
}

impl From<&Video> for VideoForm {
    fn from(video: &Video) -> Self {
        Self {
            title: video.title.clone(),
            description: video.description.clone(),
            video_url: video.video_url.clone(),
            thumbnail_url: video.thumbnail_url.clone().unwrap_or_default(),
            module: video.module.clone(),
            order_index: video.order_index.to_string(),
            package_type: video.package_type.as_str().to_string(),
        }
    }
}

/// Success story form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryForm {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub profit_amount: String,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub testimonial: String,
    #[serde(default)]
    pub image_url: String,
    /// Checkbox: present when ticked.
    pub is_featured: Option<String>,
}

impl StoryForm {
    fn to_draft(&self) -> StoryDraft {
        StoryDraft {
            student_name: self.student_name.clone(),
            profit_amount: self.profit_amount.clone(),
            timeframe: self.timeframe.clone(),
            testimonial: self.testimonial.clone(),
            image_url: Some(self.image_url.clone()),
            is_featured: self.is_featured.is_some(),
        }
    }

    const fn featured(&self) -> bool {
        self.is_featured.is_some()
    }
}

impl From<&SuccessStory> for StoryForm {
    fn from(story: &SuccessStory) -> Self {
        Self {
            student_name: story.student_name.clone(),
            profit_amount: story.profit_amount.clone(),
            timeframe: story.timeframe.clone(),
            testimonial: story.testimonial.clone(),
            image_url: story.image_url.clone().unwrap_or_default(),
            is_featured: story.is_featured.then(|| "on".to_string()),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// A row of the users table.
pub struct UserRow {
    pub name: String,
    pub email: String,
    pub tier: String,
    pub paid: bool,
    pub joined: String,
    pub last_login: String,
}

impl From<&Profile> for UserRow {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.full_name.clone().unwrap_or_else(|| "No name".to_string()),
            email: profile.email.to_string(),
            tier: profile.subscription_status.as_str().to_string(),
            paid: profile.subscription_status.is_paid(),
            joined: profile.created_at.format("%b %-d, %Y").to_string(),
            last_login: profile
                .last_login
                .map_or_else(|| "Never".to_string(), |t| t.format("%b %-d, %Y").to_string()),
        }
    }
}

/// Dashboard stats cards.
pub struct Stats {
    pub total_users: usize,
    pub paid_users: usize,
    pub total_videos: usize,
    pub total_stories: usize,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin_email: String,
    pub tab: &'static str,
    pub search: String,
    pub stats: Stats,
    pub users: Vec<UserRow>,
    pub videos: Vec<Video>,
    pub stories: Vec<SuccessStory>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Video create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/video_form.html")]
pub struct VideoFormTemplate {
    pub heading: &'static str,
    pub action: String,
    pub submit: &'static str,
    pub form: VideoForm,
    pub packages: Vec<PackageOption>,
    pub error: Option<String>,
}

/// An entry of the package select.
pub struct PackageOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Success story create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/story_form.html")]
pub struct StoryFormTemplate {
    pub heading: &'static str,
    pub action: String,
    pub submit: &'static str,
    pub featured: bool,
    pub form: StoryForm,
    pub error: Option<String>,
}

fn package_options(current: &str) -> Vec<PackageOption> {
    let current = current.parse().unwrap_or_default();
    PackageType::ALL
        .iter()
        .map(|&package| PackageOption {
            value: package.as_str(),
            label: package.admin_label(),
            selected: package == current,
        })
        .collect()
}

fn video_form_page(
    heading: &'static str,
    action: String,
    submit: &'static str,
    form: VideoForm,
    error: Option<String>,
) -> VideoFormTemplate {
    VideoFormTemplate {
        heading,
        action,
        submit,
        packages: package_options(&form.package_type),
        form,
        error,
    }
}

fn story_form_page(
    heading: &'static str,
    action: String,
    submit: &'static str,
    form: StoryForm,
    error: Option<String>,
) -> StoryFormTemplate {
    StoryFormTemplate {
        heading,
        action,
        submit,
        featured: form.featured(),
        form,
        error,
    }
}

/// Re-render a form after a failed write, or bubble up errors that are not
/// about the form.
fn form_failure(err: ContentError, render: impl FnOnce(String) -> Response) -> Result<Response> {
    match err {
        ContentError::Validation(e) => {
            let mut response = render(e.to_string());
            *response.status_mut() = StatusCode::UNPROCESSABLE_ENTITY;
            Ok(response)
        }
        ContentError::Backend(e) => {
            tracing::error!(error = %e, "Content write failed");
            let mut response = render(e.user_message());
            *response.status_mut() = StatusCode::BAD_GATEWAY;
            Ok(response)
        }
        err @ ContentError::NotFound { .. } => Err(AppError::Content(err)),
    }
}

fn back_to_tab(tab: Tab, success: &str) -> Redirect {
    Redirect::to(&format!(
        "/admin?tab={}&success={}",
        tab.as_str(),
        urlencoding::encode(success)
    ))
}

// =============================================================================
// Dashboard
// =============================================================================

async fn list_or_empty<T: ContentEntity>(
    collection: &ContentCollection<T>,
    token: &SecretString,
    term: &str,
) -> Vec<T> {
    match collection.list(Some(token), term).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, kind = T::KIND, "Failed to list content");
            Vec::new()
        }
    }
}

/// Display the admin dashboard.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    let tab = Tab::parse(query.tab.as_deref());
    let search = query.q.unwrap_or_default();
    let term = search.as_str();
    let token = &current.access_token;
    let content = state.content();

    let profiles =
        load_users_with_fallback(state.profiles(), Some(token), &current.identity).await;
    let videos = list_or_empty(&content.videos, token, "").await;
    let stories = list_or_empty(&content.stories, token, "").await;

    let stats = Stats {
        total_users: profiles.len(),
        paid_users: profiles
            .iter()
            .filter(|p| p.subscription_status.is_paid())
            .count(),
        total_videos: videos.len(),
        total_stories: stories.len(),
    };

    let users = profiles
        .iter()
        .filter(|p| tab != Tab::Users || term.is_empty() || p.matches_search(term))
        .map(UserRow::from)
        .collect();
    let videos = if tab == Tab::Videos && !term.is_empty() {
        list_or_empty(&content.videos, token, term).await
    } else {
        videos
    };
    let stories = if tab == Tab::Stories && !term.is_empty() {
        list_or_empty(&content.stories, token, term).await
    } else {
        stories
    };

    DashboardTemplate {
        admin_email: current.identity.email.to_string(),
        tab: tab.as_str(),
        search,
        stats,
        users,
        videos,
        stories,
        error: query.error,
        success: query.success,
    }
}

// =============================================================================
// Videos
// =============================================================================

/// Display the new video form.
pub async fn new_video(_admin: RequireAdmin) -> impl IntoResponse {
    video_form_page(
        "Add New Video",
        "/admin/videos".to_string(),
        "Add Video",
        VideoForm::default(),
        None,
    )
}

/// Handle new video submission.
pub async fn create_video(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Form(form): Form<VideoForm>,
) -> Result<Response> {
    let render = |form: VideoForm| {
        move |error: String| {
            video_form_page(
                "Add New Video",
                "/admin/videos".to_string(),
                "Add Video",
                form,
                Some(error),
            )
            .into_response()
        }
    };

    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(e) => return form_failure(e.into(), render(form)),
    };
    match state
        .content()
        .videos
        .create(Some(&current.access_token), draft)
        .await
    {
        Ok(_) => Ok(back_to_tab(Tab::Videos, "Video created").into_response()),
        Err(e) => form_failure(e, render(form)),
    }
}

/// Display the edit form for a video.
pub async fn edit_video(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<VideoId>,
) -> Result<impl IntoResponse> {
    let video = state
        .content()
        .videos
        .get(Some(&current.access_token), id)
        .await?;
    Ok(video_form_page(
        "Edit Video",
        format!("/admin/videos/{id}"),
        "Update Video",
        VideoForm::from(&video),
        None,
    ))
}

/// Handle video edit submission.
pub async fn update_video(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<VideoId>,
    Form(form): Form<VideoForm>,
) -> Result<Response> {
    let render = |form: VideoForm| {
        move |error: String| {
            video_form_page(
                "Edit Video",
                format!("/admin/videos/{id}"),
                "Update Video",
                form,
                Some(error),
            )
            .into_response()
        }
    };

    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(e) => return form_failure(e.into(), render(form)),
    };
    match state
        .content()
        .videos
        .update(Some(&current.access_token), id, draft)
        .await
    {
        Ok(_) => Ok(back_to_tab(Tab::Videos, "Video updated").into_response()),
        Err(e) => form_failure(e, render(form)),
    }
}

/// Delete a video.
pub async fn delete_video(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<VideoId>,
) -> Result<Redirect> {
    state
        .content()
        .videos
        .delete(Some(&current.access_token), id)
        .await?;
    Ok(back_to_tab(Tab::Videos, "Video deleted"))
}

// =============================================================================
// Success stories
// =============================================================================

/// Display the new success story form.
pub async fn new_story(_admin: RequireAdmin) -> impl IntoResponse {
    story_form_page(
        "Add Success Story",
        "/admin/stories".to_string(),
        "Add Story",
        StoryForm::default(),
        None,
    )
}

/// Handle new success story submission.
pub async fn create_story(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Form(form): Form<StoryForm>,
) -> Result<Response> {
    let draft = form.to_draft();
    match state
        .content()
        .stories
        .create(Some(&current.access_token), draft)
        .await
    {
        Ok(_) => Ok(back_to_tab(Tab::Stories, "Success story created").into_response()),
        Err(e) => form_failure(e, |error| {
            story_form_page(
                "Add Success Story",
                "/admin/stories".to_string(),
                "Add Story",
                form,
                Some(error),
            )
            .into_response()
        }),
    }
}

/// Display the edit form for a success story.
pub async fn edit_story(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<StoryId>,
) -> Result<impl IntoResponse> {
    let story = state
        .content()
        .stories
        .get(Some(&current.access_token), id)
        .await?;
    Ok(story_form_page(
        "Edit Success Story",
        format!("/admin/stories/{id}"),
        "Update Story",
        StoryForm::from(&story),
        None,
    ))
}

/// Handle success story edit submission.
pub async fn update_story(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<StoryId>,
    Form(form): Form<StoryForm>,
) -> Result<Response> {
    let draft = form.to_draft();
    match state
        .content()
        .stories
        .update(Some(&current.access_token), id, draft)
        .await
    {
        Ok(_) => Ok(back_to_tab(Tab::Stories, "Success story updated").into_response()),
        Err(e) => form_failure(e, |error| {
            story_form_page(
                "Edit Success Story",
                format!("/admin/stories/{id}"),
                "Update Story",
                form,
                Some(error),
            )
            .into_response()
        }),
    }
}

/// Delete a success story.
pub async fn delete_story(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<StoryId>,
) -> Result<Redirect> {
    state
        .content()
        .stories
        .delete(Some(&current.access_token), id)
        .await?;
    Ok(back_to_tab(Tab::Stories, "Success story deleted"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> VideoForm {
        VideoForm {
            title: "Order Blocks".to_string(),
            description: "Institutional footprints".to_string(),
            video_url: "https://example.com/ob".to_string(),
            module: "SMC Course".to_string(),
            ..VideoForm::default()
        }
    }

    #[test]
    fn test_video_form_defaults() {
        let draft = filled().to_draft().unwrap();
        assert_eq!(draft.order_index, 1);
        assert_eq!(draft.package_type, PackageType::Both);
    }

    #[test]
    fn test_video_form_rejects_bad_order_index() {
        let mut form = filled();
        form.order_index = "two".to_string();
        assert_eq!(
            form.to_draft().unwrap_err().to_string(),
            "order_index must be a whole number"
        );

        form.order_index = "-3".to_string();
        let draft = form.to_draft().unwrap();
        assert_eq!(
            Video::validate(&draft).unwrap_err().to_string(),
            "order_index must not be negative"
        );
    }

    #[test]
    fn test_video_form_accepts_large_order_index() {
        let mut form = filled();
        form.order_index = "70000".to_string();
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.order_index, 70_000);
        assert!(Video::validate(&draft).is_ok());
    }

    #[test]
    fn test_video_form_parses_package() {
        let mut form = filled();
        form.package_type = "advanced".to_string();
        form.order_index = " 4 ".to_string();
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.package_type, PackageType::Advanced);
        assert_eq!(draft.order_index, 4);

        form.package_type = "gold".to_string();
        assert!(form.to_draft().is_err());
    }

    #[test]
    fn test_blank_thumbnail_is_stored_as_absent() {
        let draft = filled().to_draft().unwrap();
        let video = Video::from_draft(VideoId::from_u128(1), chrono::Utc::now(), draft);
        assert_eq!(video.thumbnail_url, None);
    }

    #[test]
    fn test_story_checkbox() {
        let mut form = StoryForm::default();
        assert!(!form.to_draft().is_featured);
        form.is_featured = Some("on".to_string());
        assert!(form.to_draft().is_featured);
    }

    #[test]
    fn test_package_select_marks_current_value() {
        let selected = |raw: &str| {
            package_options(raw)
                .into_iter()
                .filter(|o| o.selected)
                .map(|o| o.value)
                .collect::<Vec<_>>()
        };
        assert_eq!(selected(""), vec!["both"]);
        assert_eq!(selected("starter"), vec!["starter"]);
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!(Tab::parse(None), Tab::Users);
        assert_eq!(Tab::parse(Some("videos")), Tab::Videos);
        assert_eq!(Tab::parse(Some("stories")), Tab::Stories);
        assert_eq!(Tab::parse(Some("bogus")), Tab::Users);
    }
}
