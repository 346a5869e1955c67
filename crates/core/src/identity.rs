//! Signed-in identities and their profile rows.
//!
//! The identity provider only knows who someone is. What they have paid for
//! lives on a separate profile row, so both are merged into a
//! [`StudentContext`] before any visibility decision is made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, SubscriptionTier, UserId};

/// An authenticated user as known to the identity provider.
///
/// Read-only to the portal: created on signup by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user ID (also the profile row key).
    pub id: UserId,
    /// Email address used to sign in.
    pub email: Email,
    /// Name entered at signup, if any.
    pub display_name: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// Most recent sign-in, if the provider reports one.
    pub last_login: Option<DateTime<Utc>>,
}

impl Identity {
    /// Name to greet the user with, if they gave one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub subscription_status: SubscriptionTier,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Profile {
    /// Build a profile from the identity alone.
    ///
    /// Used when the profile table cannot be read. `fallback_name` is applied
    /// when the identity carries no display name.
    #[must_use]
    pub fn synthesize(
        identity: &Identity,
        tier: SubscriptionTier,
        fallback_name: Option<&str>,
    ) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            full_name: identity
                .name()
                .or(fallback_name)
                .map(ToOwned::to_owned),
            subscription_status: tier,
            created_at: identity.created_at,
            last_login: identity.last_login,
        }
    }

    /// Case-insensitive match on email or full name, for the admin users tab.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.email.as_str().to_lowercase().contains(&needle)
            || self
                .full_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
    }
}

/// Identity merged with its profile: the input to every student decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentContext {
    pub identity: Identity,
    pub tier: SubscriptionTier,
    full_name: Option<String>,
}

impl StudentContext {
    /// Merge an identity with its profile row.
    ///
    /// A missing profile means the student has not paid.
    #[must_use]
    pub fn new(identity: Identity, profile: Option<&Profile>) -> Self {
        let tier = profile.map_or(SubscriptionTier::Unpaid, |p| p.subscription_status);
        let full_name = profile
            .and_then(|p| p.full_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned);

        Self {
            identity,
            tier,
            full_name,
        }
    }

    /// Name for the dashboard header: profile name, then signup name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.full_name.as_deref().or_else(|| self.identity.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identity(name: Option<&str>) -> Identity {
        Identity {
            id: UserId::from_u128(1),
            email: Email::parse("sarah@example.com").unwrap(),
            display_name: name.map(ToOwned::to_owned),
            created_at: DateTime::UNIX_EPOCH,
            last_login: None,
        }
    }

    #[test]
    fn test_blank_display_name_is_none() {
        assert_eq!(identity(Some("   ")).name(), None);
        assert_eq!(identity(Some("Sarah")).name(), Some("Sarah"));
    }

    #[test]
    fn test_synthesize_uses_fallback_name() {
        let profile = Profile::synthesize(&identity(None), SubscriptionTier::Advanced, Some("Admin"));
        assert_eq!(profile.full_name.as_deref(), Some("Admin"));
        assert_eq!(profile.subscription_status, SubscriptionTier::Advanced);

        let named = Profile::synthesize(&identity(Some("Sarah")), SubscriptionTier::Advanced, Some("Admin"));
        assert_eq!(named.full_name.as_deref(), Some("Sarah"));
    }

    #[test]
    fn test_missing_profile_is_unpaid() {
        let ctx = StudentContext::new(identity(Some("Sarah")), None);
        assert_eq!(ctx.tier, SubscriptionTier::Unpaid);
        assert_eq!(ctx.display_name(), Some("Sarah"));
    }

    #[test]
    fn test_profile_name_wins_over_identity() {
        let mut profile = Profile::synthesize(&identity(None), SubscriptionTier::Starter, None);
        profile.full_name = Some("Sarah Johnson".to_string());
        let ctx = StudentContext::new(identity(Some("sarah")), Some(&profile));
        assert_eq!(ctx.tier, SubscriptionTier::Starter);
        assert_eq!(ctx.display_name(), Some("Sarah Johnson"));
    }

    #[test]
    fn test_profile_search_matches_email_and_name() {
        let mut profile = Profile::synthesize(&identity(None), SubscriptionTier::Starter, None);
        profile.full_name = Some("Sarah Johnson".to_string());
        assert!(profile.matches_search("JOHNSON"));
        assert!(profile.matches_search("example.com"));
        assert!(!profile.matches_search("chen"));
    }
}
