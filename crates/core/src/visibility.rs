//! Which videos a student may see.
//!
//! An unpaid student sees nothing. A paid student sees every video marked
//! `both` plus the videos of their own package. Catalog order is preserved.

use crate::content::Video;
use crate::types::{PackageType, SubscriptionTier};

/// Whether a student on `tier` may watch a video from `package`.
#[must_use]
pub fn can_view(tier: SubscriptionTier, package: PackageType) -> bool {
    tier.is_paid() && (package == PackageType::Both || package.tier() == Some(tier))
}

/// The subset of `videos` visible to `tier`, in the order given.
#[must_use]
pub fn visible_videos(videos: &[Video], tier: SubscriptionTier) -> Vec<Video> {
    videos
        .iter()
        .filter(|video| can_view(tier, video.package_type))
        .cloned()
        .collect()
}

/// Distinct module names in first-seen order.
#[must_use]
pub fn modules_of(videos: &[Video]) -> Vec<String> {
    let mut modules: Vec<String> = Vec::new();
    for video in videos {
        if !modules.iter().any(|m| m == &video.module) {
            modules.push(video.module.clone());
        }
    }
    modules
}

/// The student dashboard's module selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModuleFilter {
    #[default]
    All,
    Named(String),
}

impl ModuleFilter {
    /// Parse the `module` query parameter. Missing, empty or `all` selects
    /// every module. Anything else must equal a module name exactly.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("" | "all") => Self::All,
            Some(name) => Self::Named(name.to_owned()),
        }
    }

    /// Query value for links; `all` for [`ModuleFilter::All`].
    #[must_use]
    pub fn as_query(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Named(name) => name,
        }
    }

    #[must_use]
    pub fn matches(&self, video: &Video) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => &video.module == name,
        }
    }

    /// Keep only the videos of the selected module.
    #[must_use]
    pub fn apply(&self, videos: Vec<Video>) -> Vec<Video> {
        match self {
            Self::All => videos,
            Self::Named(_) => videos.into_iter().filter(|v| self.matches(v)).collect(),
        }
    }
}
