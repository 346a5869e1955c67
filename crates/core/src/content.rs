//! Course videos and student success stories.
//!
//! Both kinds are managed through the same create/read/update/delete flow,
//! so they share the [`ContentEntity`] trait. A *draft* is what the admin form
//! submits; the entity is the draft plus an ID and a creation timestamp.

use std::fmt::Display;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PackageType, StoryId, VideoId};

/// A draft failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{field} is required")]
    Required {
        /// Form field name.
        field: &'static str,
    },
    /// A field had a value that could not be used.
    #[error("{field} {reason}")]
    Invalid {
        /// Form field name.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Operations shared by every kind of admin-managed content.
pub trait ContentEntity: Clone + Send + Sync + 'static {
    /// Typed row ID.
    type Id: Copy + Eq + Hash + Display + Send + Sync + 'static;
    /// Editable fields as submitted by the admin form.
    type Draft: Clone + Send + Sync + 'static;

    /// Singular noun used in logs and error messages.
    const KIND: &'static str;
    /// Table name in the hosted data service.
    const TABLE: &'static str;

    fn id(&self) -> Self::Id;
    fn created_at(&self) -> DateTime<Utc>;

    /// Case-insensitive substring match over the searchable fields.
    fn matches_search(&self, term: &str) -> bool;

    /// Check required fields before a create or update.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    fn validate(draft: &Self::Draft) -> Result<(), ValidationError>;

    /// Build the entity from a validated draft.
    fn from_draft(id: Self::Id, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    /// Allocate a new ID.
    fn new_id() -> Self::Id;
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

fn clean(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_owned()
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(clean).filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// =============================================================================
// Videos
// =============================================================================

/// A course video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub module: String,
    pub order_index: i32,
    pub package_type: PackageType,
    pub created_at: DateTime<Utc>,
}

/// Editable video fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDraft {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub module: String,
    pub order_index: i32,
    pub package_type: PackageType,
}

impl Default for VideoDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            video_url: String::new(),
            thumbnail_url: None,
            module: String::new(),
            order_index: 1,
            package_type: PackageType::Both,
        }
    }
}

impl From<&Video> for VideoDraft {
    fn from(video: &Video) -> Self {
        Self {
            title: video.title.clone(),
            description: video.description.clone(),
            video_url: video.video_url.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            module: video.module.clone(),
            order_index: video.order_index,
            package_type: video.package_type,
        }
    }
}

impl ContentEntity for Video {
    type Id = VideoId;
    type Draft = VideoDraft;

    const KIND: &'static str = "video";
    const TABLE: &'static str = "videos";

    fn id(&self) -> VideoId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn matches_search(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        contains_ignore_case(&self.title, &needle) || contains_ignore_case(&self.module, &needle)
    }

    fn validate(draft: &VideoDraft) -> Result<(), ValidationError> {
        require("title", &draft.title)?;
        require("description", &draft.description)?;
        require("video_url", &draft.video_url)?;
        require("module", &draft.module)?;
        if draft.order_index < 0 {
            return Err(ValidationError::Invalid {
                field: "order_index",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }

    fn from_draft(id: VideoId, created_at: DateTime<Utc>, draft: VideoDraft) -> Self {
        Self {
            id,
            title: clean(draft.title),
            description: clean(draft.description),
            video_url: clean(draft.video_url),
            thumbnail_url: clean_optional(draft.thumbnail_url),
            module: clean(draft.module),
            order_index: draft.order_index,
            package_type: draft.package_type,
            created_at,
        }
    }

    fn new_id() -> VideoId {
        VideoId::generate()
    }
}

// =============================================================================
// Success stories
// =============================================================================

/// A student testimonial managed from the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessStory {
    pub id: StoryId,
    pub student_name: String,
    /// Free text as entered, e.g. "$45,000".
    pub profit_amount: String,
    /// Free text as entered, e.g. "6 months".
    pub timeframe: String,
    pub testimonial: String,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Editable success story fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoryDraft {
    pub student_name: String,
    pub profit_amount: String,
    pub timeframe: String,
    pub testimonial: String,
    pub image_url: Option<String>,
    pub is_featured: bool,
}

impl From<&SuccessStory> for StoryDraft {
    fn from(story: &SuccessStory) -> Self {
        Self {
            student_name: story.student_name.clone(),
            profit_amount: story.profit_amount.clone(),
            timeframe: story.timeframe.clone(),
            testimonial: story.testimonial.clone(),
            image_url: story.image_url.clone(),
            is_featured: story.is_featured,
        }
    }
}

impl ContentEntity for SuccessStory {
    type Id = StoryId;
    type Draft = StoryDraft;

    const KIND: &'static str = "success story";
    const TABLE: &'static str = "success_stories";

    fn id(&self) -> StoryId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn matches_search(&self, term: &str) -> bool {
        contains_ignore_case(&self.student_name, &term.to_lowercase())
    }

    fn validate(draft: &StoryDraft) -> Result<(), ValidationError> {
        require("student_name", &draft.student_name)?;
        require("profit_amount", &draft.profit_amount)?;
        require("timeframe", &draft.timeframe)?;
        require("testimonial", &draft.testimonial)
    }

    fn from_draft(id: StoryId, created_at: DateTime<Utc>, draft: StoryDraft) -> Self {
        Self {
            id,
            student_name: clean(draft.student_name),
            profit_amount: clean(draft.profit_amount),
            timeframe: clean(draft.timeframe),
            testimonial: clean(draft.testimonial),
            image_url: clean_optional(draft.image_url),
            is_featured: draft.is_featured,
            created_at,
        }
    }

    fn new_id() -> StoryId {
        StoryId::generate()
    }
}
