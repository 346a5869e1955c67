//! GoTrue endpoints: `/user`, `/token`, `/signup`, `/logout`.

use async_trait::async_trait;
use market_secret_core::{Email, Identity};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tracing::instrument;

use super::types::{
    GoTrueUser, PasswordGrant, SignUpRequest, SignUpResponse, TokenResponse, UserMetadata,
};
use super::{SupabaseClient, SupabaseError, check};
use crate::services::{AuthSession, IdentityProvider, SessionChange, SignUpOutcome};

impl SupabaseClient {
    async fn session_from(&self, token: TokenResponse) -> Result<AuthSession, SupabaseError> {
        let identity = token.user.into_identity()?;
        if let Some(inner) = self.inner.as_deref() {
            inner
                .identities
                .insert(token.access_token.clone(), identity.clone())
                .await;
        }
        Ok(AuthSession {
            access_token: SecretString::from(token.access_token),
            identity,
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    #[instrument(skip_all)]
    async fn current_identity(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<Identity>, SupabaseError> {
        let Some(inner) = self.inner.as_deref() else {
            return Ok(None);
        };

        let key = access_token.expose_secret();
        if let Some(identity) = inner.identities.get(key).await {
            return Ok(Some(identity));
        }

        let response = self
            .request(Method::GET, self.auth_endpoint("user")?, Some(access_token))?
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            self.publish(SessionChange::TokenRejected);
            return Ok(None);
        }

        let user: GoTrueUser = check(response).await?.json().await?;
        let identity = user.into_identity()?;
        inner
            .identities
            .insert(key.to_string(), identity.clone())
            .await;
        Ok(Some(identity))
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, SupabaseError> {
        let body = PasswordGrant {
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let response = self
            .request(
                Method::POST,
                self.auth_endpoint("token?grant_type=password")?,
                None,
            )?
            .json(&body)
            .send()
            .await?;

        let token: TokenResponse = check(response).await?.json().await?;
        let session = self.session_from(token).await?;
        self.publish(SessionChange::SignedIn {
            user_id: session.identity.id,
        });
        tracing::info!(user_id = %session.identity.id, "Signed in");
        Ok(session)
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, SupabaseError> {
        let body = SignUpRequest {
            email: email.as_str(),
            password: password.expose_secret(),
            data: UserMetadata {
                full_name: full_name.map(ToOwned::to_owned),
            },
        };

        let response = self
            .request(Method::POST, self.auth_endpoint("signup")?, None)?
            .json(&body)
            .send()
            .await?;

        let outcome = match check(response).await?.json::<SignUpResponse>().await? {
            SignUpResponse::Session(token) => {
                SignUpOutcome::Session(self.session_from(token).await?)
            }
            SignUpResponse::User(user) => {
                SignUpOutcome::ConfirmationRequired(user.into_identity()?)
            }
        };

        let user_id = match &outcome {
            SignUpOutcome::Session(session) => session.identity.id,
            SignUpOutcome::ConfirmationRequired(identity) => identity.id,
        };
        self.publish(SessionChange::SignedUp { user_id });
        tracing::info!(%user_id, "Signed up");
        Ok(outcome)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &SecretString) -> Result<(), SupabaseError> {
        let Some(inner) = self.inner.as_deref() else {
            self.publish(SessionChange::SignedOut);
            return Ok(());
        };

        inner
            .identities
            .invalidate(access_token.expose_secret())
            .await;

        let response = self
            .request(Method::POST, self.auth_endpoint("logout")?, Some(access_token))?
            .send()
            .await?;
        self.publish(SessionChange::SignedOut);

        // An already expired token is as good as signed out.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.subscribe_changes()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::parse("sarah@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_degraded_has_no_session() {
        let client = SupabaseClient::new(None);
        let token = SecretString::from("anything");
        assert!(client.current_identity(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_degraded_sign_in_fails() {
        let client = SupabaseClient::new(None);
        let err = client
            .sign_in(&email(), &SecretString::from("pw"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Supabase not configured");
    }

    #[tokio::test]
    async fn test_degraded_sign_up_fails() {
        let client = SupabaseClient::new(None);
        let err = client
            .sign_up(&email(), &SecretString::from("pw"), Some("Sarah"))
            .await
            .unwrap_err();
        assert!(matches!(err, SupabaseError::NotConfigured));
    }

    #[tokio::test]
    async fn test_degraded_sign_out_succeeds_and_notifies() {
        let client = SupabaseClient::new(None);
        let mut changes = client.subscribe();
        client.sign_out(&SecretString::from("t")).await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), SessionChange::SignedOut);
    }
}
