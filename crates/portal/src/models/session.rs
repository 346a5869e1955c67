//! Session-related types.
//!
//! Types stored in the session for authentication state.

use market_secret_core::Identity;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Session-stored sign-in.
///
/// The identity is a snapshot from sign-in time. Every request re-resolves
/// it from the access token, so a revoked token stops working even while
/// the cookie lives on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentSession {
    /// Provider access token.
    #[serde(with = "secret_string")]
    pub access_token: SecretString,
    /// Who signed in.
    pub identity: Identity,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current sign-in.
    pub const CURRENT_SESSION: &str = "current_session";
}

mod secret_string {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
        String::deserialize(deserializer).map(SecretString::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::DateTime;
    use market_secret_core::{Email, UserId};
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_session_survives_json_and_redacts_debug() {
        let session = CurrentSession {
            access_token: SecretString::from("jwt-token"),
            identity: Identity {
                id: UserId::from_u128(1),
                email: Email::parse("sarah@example.com").unwrap(),
                display_name: Some("Sarah".to_string()),
                created_at: DateTime::UNIX_EPOCH,
                last_login: None,
            },
        };

        let json = serde_json::to_value(&session).unwrap();
        let back: CurrentSession = serde_json::from_value(json).unwrap();
        assert_eq!(back.access_token.expose_secret(), "jwt-token");
        assert_eq!(back.identity, session.identity);
        assert!(!format!("{session:?}").contains("jwt-token"));
    }
}
