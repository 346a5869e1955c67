//! Student dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use market_secret_core::{ModuleFilter, StudentContext, Video, modules_of, visible_videos};
use serde::Deserialize;

use crate::filters;
use crate::middleware::RequireStudent;
use crate::services::load_profile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StudentQuery {
    pub module: Option<String>,
}

/// Icon key for a module card.
#[must_use]
pub fn module_icon(module: &str) -> &'static str {
    match module {
        "Forex Basics" => "book-open",
        "SMC Course" => "bar-chart",
        "Elliott Wave" => "target",
        "Risk Management" => "shield",
        "Psychology" => "zap",
        "Live Trading" => "globe",
        _ => "play",
    }
}

/// A module selector button.
pub struct ModuleButton {
    pub label: String,
    pub href: String,
    pub selected: bool,
}

/// A video card.
pub struct VideoCard {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub module: String,
    pub icon: &'static str,
    pub badge: &'static str,
    pub package: &'static str,
}

impl From<Video> for VideoCard {
    fn from(video: Video) -> Self {
        Self {
            icon: module_icon(&video.module),
            badge: video.package_type.badge(),
            package: video.package_type.as_str(),
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            module: video.module,
        }
    }
}

/// "All Modules" followed by one button per module. Empty when there are no
/// modules to choose from.
fn module_buttons(modules: &[String], selected: &ModuleFilter) -> Vec<ModuleButton> {
    if modules.is_empty() {
        return Vec::new();
    }
    std::iter::once(ModuleFilter::All)
        .chain(modules.iter().cloned().map(ModuleFilter::Named))
        .map(|filter| ModuleButton {
            label: match &filter {
                ModuleFilter::All => "All Modules".to_string(),
                ModuleFilter::Named(name) => name.clone(),
            },
            href: format!("/student?module={}", urlencoding::encode(filter.as_query())),
            selected: &filter == selected,
        })
        .collect()
}

/// Student dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "student/dashboard.html")]
pub struct StudentDashboardTemplate {
    pub header_name: String,
    pub welcome_name: String,
    pub tier: String,
    pub paid: bool,
    pub video_count: usize,
    pub module_count: usize,
    pub modules: Vec<ModuleButton>,
    pub videos: Vec<VideoCard>,
}

/// Display the student dashboard.
///
/// Only videos the student's tier unlocks are listed. The module filter then
/// narrows that set.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStudent(current): RequireStudent,
    Query(query): Query<StudentQuery>,
) -> impl IntoResponse {
    let token = &current.access_token;
    let profile = load_profile(state.profiles(), Some(token), current.identity.id).await;
    let student = StudentContext::new(current.identity, profile.as_ref());

    let catalog = match state.content().videos.list(Some(token), "").await {
        Ok(videos) => videos,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load videos for student");
            Vec::new()
        }
    };
    let visible = visible_videos(&catalog, student.tier);
    let modules = modules_of(&visible);
    let filter = ModuleFilter::parse(query.module.as_deref());

    tracing::debug!(
        user_id = %student.identity.id,
        tier = %student.tier,
        visible = visible.len(),
        "Student dashboard"
    );

    StudentDashboardTemplate {
        header_name: student
            .display_name()
            .map_or_else(|| student.identity.email.to_string(), ToOwned::to_owned),
        welcome_name: student.display_name().unwrap_or("Student").to_string(),
        tier: student.tier.as_str().to_string(),
        paid: student.tier.is_paid(),
        video_count: visible.len(),
        module_count: modules.len(),
        modules: module_buttons(&modules, &filter),
        videos: filter.apply(visible).into_iter().map(VideoCard::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_icons() {
        assert_eq!(module_icon("Forex Basics"), "book-open");
        assert_eq!(module_icon("Elliott Wave"), "target");
        assert_eq!(module_icon("Something New"), "play");
    }

    #[test]
    fn test_module_buttons_start_with_all() {
        let modules = vec!["Forex Basics".to_string(), "SMC Course".to_string()];
        let buttons = module_buttons(&modules, &ModuleFilter::Named("SMC Course".to_string()));
        let labels: Vec<&str> = buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["All Modules", "Forex Basics", "SMC Course"]);
        assert_eq!(
            buttons.iter().filter(|b| b.selected).count(),
            1,
            "exactly one button is selected"
        );
        assert!(buttons.last().is_some_and(|b| b.selected));
        assert!(buttons.iter().any(|b| b.href == "/student?module=SMC%20Course"));
    }

    #[test]
    fn test_no_modules_means_no_buttons() {
        assert!(module_buttons(&[], &ModuleFilter::All).is_empty());
    }
}
