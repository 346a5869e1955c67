//! Profile rows: read-only, written by the provider's signup trigger.

use async_trait::async_trait;
use market_secret_core::{Identity, Profile, SubscriptionTier, UserId};
use secrecy::SecretString;

use crate::supabase::SupabaseError;

/// Read access to the `profiles` table.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// Every profile row.
    async fn list_profiles(
        &self,
        access_token: Option<&SecretString>,
    ) -> Result<Vec<Profile>, SupabaseError>;

    /// The profile row for one user, if it exists.
    async fn get_profile(
        &self,
        access_token: Option<&SecretString>,
        id: UserId,
    ) -> Result<Option<Profile>, SupabaseError>;
}

/// Profiles for the admin users tab.
///
/// If the table cannot be read, the tab shows the signed-in admin alone.
pub async fn load_users_with_fallback(
    profiles: &dyn ProfileStore,
    access_token: Option<&SecretString>,
    current: &Identity,
) -> Vec<Profile> {
    match profiles.list_profiles(access_token).await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch profiles, showing current user only");
            vec![Profile::synthesize(
                current,
                SubscriptionTier::Advanced,
                Some("Admin"),
            )]
        }
    }
}

/// The tier of one student. Missing or unreadable rows mean unpaid.
pub async fn load_profile(
    profiles: &dyn ProfileStore,
    access_token: Option<&SecretString>,
    id: UserId,
) -> Option<Profile> {
    match profiles.get_profile(access_token, id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, user_id = %id, "Failed to fetch profile");
            None
        }
    }
}
