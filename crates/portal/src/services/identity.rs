//! Identity provider seam.
//!
//! The portal never checks passwords itself. Sign-in, sign-up and token
//! validation are delegated to an [`IdentityProvider`]; the production
//! implementation is [`crate::supabase::SupabaseClient`], tests plug in a
//! fake.

use async_trait::async_trait;
use market_secret_core::{Email, Identity, UserId};
use secrecy::SecretString;
use tokio::sync::broadcast;

use crate::supabase::SupabaseError;

/// A freshly issued provider session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: SecretString,
    pub identity: Identity,
}

/// Result of a sign-up.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// The provider signed the new user straight in.
    Session(AuthSession),
    /// The account exists but the email address must be confirmed first.
    ConfirmationRequired(Identity),
}

/// Session lifecycle notification.
///
/// Published on a broadcast channel. Subscribers unsubscribe by dropping
/// their receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn { user_id: UserId },
    SignedUp { user_id: UserId },
    SignedOut,
    /// The provider refused a stored access token (expired or revoked).
    TokenRejected,
}

/// Authentication backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Resolve the identity behind an access token.
    ///
    /// `Ok(None)` means the token is not (or no longer) valid.
    async fn current_identity(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<Identity>, SupabaseError>;

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, SupabaseError>;

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, SupabaseError>;

    /// Invalidate the provider session behind `access_token`.
    async fn sign_out(&self, access_token: &SecretString) -> Result<(), SupabaseError>;

    /// Listen for session changes.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}
