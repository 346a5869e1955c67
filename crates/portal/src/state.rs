//! Application state shared across handlers.

use std::sync::Arc;

use market_secret_core::AccessPolicy;

use crate::config::PortalConfig;
use crate::services::{ContentService, IdentityProvider, ProfileStore};
use crate::supabase::SupabaseClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, the access policy and the backend seams.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    policy: AccessPolicy,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    content: ContentService,
}

impl AppState {
    /// Create the production state from configuration.
    ///
    /// With Supabase configured, identity, profiles and content all go to the
    /// project. Without it, content is served from the in-memory seed catalog.
    #[must_use]
    pub fn new(config: PortalConfig) -> Self {
        let supabase = SupabaseClient::new(config.supabase.clone());
        let content = if supabase.is_configured() {
            ContentService::supabase(&supabase)
        } else {
            tracing::info!("Supabase not configured, serving seed content from memory");
            ContentService::in_memory()
        };

        Self::from_parts(
            config,
            Arc::new(supabase.clone()),
            Arc::new(supabase),
            content,
        )
    }

    /// Assemble state from explicit parts.
    #[must_use]
    pub fn from_parts(
        config: PortalConfig,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        content: ContentService,
    ) -> Self {
        let policy = AccessPolicy::new(config.admin_email.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                policy,
                identity,
                profiles,
                content,
            }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the access policy.
    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.inner.policy
    }

    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    #[must_use]
    pub fn profiles(&self) -> &dyn ProfileStore {
        self.inner.profiles.as_ref()
    }

    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }
}
