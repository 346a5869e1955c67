//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use market_secret_core::{PackageType, SubscriptionTier};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Human-readable subscription tier.
///
/// Usage in templates: `{{ profile.subscription_status|tier_label }}`
#[askama::filter_fn]
pub fn tier_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw
        .parse::<SubscriptionTier>()
        .map_or(raw, |tier| tier.label().to_string()))
}

/// Admin label for a video package type.
///
/// Usage in templates: `{{ video.package_type|package_label }}`
#[askama::filter_fn]
pub fn package_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw
        .parse::<PackageType>()
        .map_or(raw, |package| package.admin_label().to_string()))
}
