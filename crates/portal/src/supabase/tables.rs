//! Content rows stored in PostgREST tables.

use std::marker::PhantomData;

use async_trait::async_trait;
use market_secret_core::ContentEntity;
use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{SupabaseClient, SupabaseError, check};
use crate::services::EntityStore;

/// An [`EntityStore`] over the table named by `T::TABLE`.
pub struct SupabaseTable<T> {
    client: SupabaseClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> SupabaseTable<T> {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }
}

impl<T> SupabaseTable<T>
where
    T: ContentEntity + Serialize + DeserializeOwned,
{
    /// Send a request that returns rows and decode them.
    async fn rows(
        &self,
        method: Method,
        query: &[(&str, &str)],
        access_token: Option<&SecretString>,
        body: Option<&T>,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.client.table_endpoint(T::TABLE, query)?;
        let mut request = self
            .client
            .request(method, url, access_token)?
            .header("Prefer", "return=representation");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl<T> EntityStore<T> for SupabaseTable<T>
where
    T: ContentEntity + Serialize + DeserializeOwned,
{
    async fn all(&self, access_token: Option<&SecretString>) -> Result<Vec<T>, SupabaseError> {
        self.rows(
            Method::GET,
            &[("select", "*"), ("order", "created_at.asc")],
            access_token,
            None,
        )
        .await
    }

    async fn insert(
        &self,
        access_token: Option<&SecretString>,
        entity: T,
    ) -> Result<T, SupabaseError> {
        self.rows(Method::POST, &[], access_token, Some(&entity))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SupabaseError::InvalidResponse(format!("insert into {} returned no row", T::TABLE))
            })
    }

    async fn replace(
        &self,
        access_token: Option<&SecretString>,
        entity: T,
    ) -> Result<Option<T>, SupabaseError> {
        let filter = format!("eq.{}", entity.id());
        Ok(self
            .rows(Method::PATCH, &[("id", &filter)], access_token, Some(&entity))
            .await?
            .into_iter()
            .next())
    }

    async fn remove(
        &self,
        access_token: Option<&SecretString>,
        id: T::Id,
    ) -> Result<bool, SupabaseError> {
        let filter = format!("eq.{id}");
        let removed = self
            .rows(Method::DELETE, &[("id", &filter)], access_token, None)
            .await?;
        Ok(!removed.is_empty())
    }
}
