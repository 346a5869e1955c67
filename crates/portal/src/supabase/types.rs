//! Wire types for the GoTrue and PostgREST APIs.

use chrono::{DateTime, Utc};
use market_secret_core::{Email, Identity, Profile, SubscriptionTier, UserId};
use serde::{Deserialize, Serialize};

use super::SupabaseError;

/// A user object as returned by GoTrue.
#[derive(Debug, Clone, Deserialize)]
pub struct GoTrueUser {
    pub id: UserId,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    pub created_at: DateTime<Utc>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Free-form metadata attached at signup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl GoTrueUser {
    /// Convert to the portal's identity type.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::InvalidResponse` if the user has no usable
    /// email address.
    pub fn into_identity(self) -> Result<Identity, SupabaseError> {
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| SupabaseError::InvalidResponse("user has no email".to_string()))
            .and_then(|raw| {
                Email::parse(raw).map_err(|e| SupabaseError::InvalidResponse(e.to_string()))
            })?;

        Ok(Identity {
            id: self.id,
            email,
            display_name: self.user_metadata.full_name,
            created_at: self.created_at,
            last_login: self.last_sign_in_at,
        })
    }
}

/// Response of `POST /token?grant_type=password`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: GoTrueUser,
}

/// Response of `POST /signup`.
///
/// With email confirmation enabled GoTrue returns the bare user; with
/// autoconfirm it returns a full session.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(TokenResponse),
    User(GoTrueUser),
}

/// Request body for password sign-in.
#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for sign-up.
#[derive(Debug, Serialize)]
pub struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: UserMetadata,
}

/// Error body of either API.
///
/// GoTrue uses `msg` or `error_description`; PostgREST uses `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The most descriptive message present.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub subscription_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl ProfileRow {
    /// Convert to a typed profile.
    ///
    /// An absent or unknown `subscription_status` is read as unpaid. Rows
    /// without a valid email are dropped.
    #[must_use]
    pub fn into_profile(self) -> Option<Profile> {
        let email = match Email::parse(&self.email) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(user_id = %self.id, error = %e, "Skipping profile with invalid email");
                return None;
            }
        };

        let subscription_status = match self.subscription_status.as_deref() {
            None => SubscriptionTier::Unpaid,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(user_id = %self.id, status = raw, "Unknown subscription status");
                SubscriptionTier::Unpaid
            }),
        };

        Some(Profile {
            id: self.id,
            email,
            full_name: self.full_name.filter(|name| !name.trim().is_empty()),
            subscription_status,
            created_at: self.created_at,
            last_login: self.last_login,
        })
    }
}
