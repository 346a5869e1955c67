//! The `profiles` table.

use async_trait::async_trait;
use market_secret_core::{Profile, UserId};
use reqwest::Method;
use secrecy::SecretString;

use super::types::ProfileRow;
use super::{SupabaseClient, SupabaseError, check};
use crate::services::ProfileStore;

const PROFILES_TABLE: &str = "profiles";

impl SupabaseClient {
    async fn fetch_profiles(
        &self,
        access_token: Option<&SecretString>,
        query: &[(&str, &str)],
    ) -> Result<Vec<Profile>, SupabaseError> {
        let url = self.table_endpoint(PROFILES_TABLE, query)?;
        let response = self
            .request(Method::GET, url, access_token)?
            .send()
            .await?;
        let rows: Vec<ProfileRow> = check(response).await?.json().await?;
        Ok(rows.into_iter().filter_map(ProfileRow::into_profile).collect())
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn list_profiles(
        &self,
        access_token: Option<&SecretString>,
    ) -> Result<Vec<Profile>, SupabaseError> {
        if !self.is_configured() {
            return Ok(Vec::new());
        }
        self.fetch_profiles(access_token, &[("select", "*"), ("order", "created_at.asc")])
            .await
    }

    async fn get_profile(
        &self,
        access_token: Option<&SecretString>,
        id: UserId,
    ) -> Result<Option<Profile>, SupabaseError> {
        if !self.is_configured() {
            return Ok(None);
        }
        let filter = format!("eq.{id}");
        let profiles = self
            .fetch_profiles(access_token, &[("select", "*"), ("id", &filter)])
            .await?;
        Ok(profiles.into_iter().next())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_degraded_profiles_are_empty() {
        let client = SupabaseClient::new(None);
        assert!(client.list_profiles(None).await.unwrap().is_empty());
        assert!(
            client
                .get_profile(None, UserId::from_u128(1))
                .await
                .unwrap()
                .is_none()
        );
    }
}
