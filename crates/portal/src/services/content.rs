//! Admin-managed content: videos and success stories.
//!
//! Both kinds go through one generic [`ContentCollection`], backed by an
//! [`EntityStore`]. With Supabase configured the store is a PostgREST table;
//! otherwise it is an [`InMemoryStore`] seeded from the fixture catalog.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use market_secret_core::{ContentEntity, SuccessStory, ValidationError, Video, fixtures};
use parking_lot::RwLock;
use secrecy::SecretString;
use thiserror::Error;

use crate::supabase::{SupabaseClient, SupabaseError, SupabaseTable};

/// Errors from content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The submitted form failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No row with this ID.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The backing store failed.
    #[error(transparent)]
    Backend(#[from] SupabaseError),
}

/// Row storage for one kind of content.
///
/// `access_token` is the signed-in user's token, forwarded so row-level
/// security applies. Stores without access control ignore it.
#[async_trait]
pub trait EntityStore<T: ContentEntity>: Send + Sync + 'static {
    /// Every row, in insertion order.
    async fn all(&self, access_token: Option<&SecretString>) -> Result<Vec<T>, SupabaseError>;

    /// Append a row and return it as stored.
    async fn insert(
        &self,
        access_token: Option<&SecretString>,
        entity: T,
    ) -> Result<T, SupabaseError>;

    /// Replace the row with the same ID. `Ok(None)` if there is none.
    async fn replace(
        &self,
        access_token: Option<&SecretString>,
        entity: T,
    ) -> Result<Option<T>, SupabaseError>;

    /// Delete a row. `Ok(false)` if there is none.
    async fn remove(
        &self,
        access_token: Option<&SecretString>,
        id: T::Id,
    ) -> Result<bool, SupabaseError>;
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local rows behind a read-write lock.
///
/// Each mutation takes the write lock once.
pub struct InMemoryStore<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> InMemoryStore<T> {
    #[must_use]
    pub const fn new(rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl<T: ContentEntity> EntityStore<T> for InMemoryStore<T> {
    async fn all(&self, _access_token: Option<&SecretString>) -> Result<Vec<T>, SupabaseError> {
        Ok(self.rows.read().clone())
    }

    async fn insert(
        &self,
        _access_token: Option<&SecretString>,
        entity: T,
    ) -> Result<T, SupabaseError> {
        self.rows.write().push(entity.clone());
        Ok(entity)
    }

    async fn replace(
        &self,
        _access_token: Option<&SecretString>,
        entity: T,
    ) -> Result<Option<T>, SupabaseError> {
        let mut rows = self.rows.write();
        let Some(slot) = rows.iter_mut().find(|row| row.id() == entity.id()) else {
            return Ok(None);
        };
        *slot = entity.clone();
        Ok(Some(entity))
    }

    async fn remove(
        &self,
        _access_token: Option<&SecretString>,
        id: T::Id,
    ) -> Result<bool, SupabaseError> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() != before)
    }
}

// =============================================================================
// Collection
// =============================================================================

/// CRUD over one kind of content.
pub struct ContentCollection<T: ContentEntity> {
    store: Arc<dyn EntityStore<T>>,
}

impl<T: ContentEntity> Clone for ContentCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: ContentEntity> ContentCollection<T> {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore<T>>) -> Self {
        Self { store }
    }

    /// Rows containing `term` as typed, in insertion order. An empty term
    /// matches all.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Backend` if the store cannot be read.
    pub async fn list(
        &self,
        access_token: Option<&SecretString>,
        term: &str,
    ) -> Result<Vec<T>, ContentError> {
        let rows = self.store.all(access_token).await?;
        if term.is_empty() {
            return Ok(rows);
        }
        Ok(rows
            .into_iter()
            .filter(|row| row.matches_search(term))
            .collect())
    }

    /// One row by ID.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` for an unknown ID.
    pub async fn get(
        &self,
        access_token: Option<&SecretString>,
        id: T::Id,
    ) -> Result<T, ContentError> {
        self.store
            .all(access_token)
            .await?
            .into_iter()
            .find(|row| row.id() == id)
            .ok_or_else(|| not_found::<T>(id))
    }

    /// Validate and append a new row with a fresh ID and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Validation` for a bad draft, or
    /// `ContentError::Backend` if the store rejects the write.
    pub async fn create(
        &self,
        access_token: Option<&SecretString>,
        draft: T::Draft,
    ) -> Result<T, ContentError> {
        T::validate(&draft)?;
        let entity = T::from_draft(T::new_id(), Utc::now(), draft);
        let stored = self.store.insert(access_token, entity).await?;
        tracing::info!(kind = T::KIND, id = %stored.id(), "Content created");
        Ok(stored)
    }

    /// Replace the editable fields of an existing row.
    ///
    /// The ID and creation timestamp are kept.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` for an unknown ID, plus the errors of
    /// [`ContentCollection::create`].
    pub async fn update(
        &self,
        access_token: Option<&SecretString>,
        id: T::Id,
        draft: T::Draft,
    ) -> Result<T, ContentError> {
        T::validate(&draft)?;
        let existing = self.get(access_token, id).await?;
        let entity = T::from_draft(id, existing.created_at(), draft);
        let stored = self
            .store
            .replace(access_token, entity)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;
        tracing::info!(kind = T::KIND, %id, "Content updated");
        Ok(stored)
    }

    /// Delete a row.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` for an unknown ID.
    pub async fn delete(
        &self,
        access_token: Option<&SecretString>,
        id: T::Id,
    ) -> Result<(), ContentError> {
        if !self.store.remove(access_token, id).await? {
            return Err(not_found::<T>(id));
        }
        tracing::info!(kind = T::KIND, %id, "Content deleted");
        Ok(())
    }
}

fn not_found<T: ContentEntity>(id: T::Id) -> ContentError {
    ContentError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}

// =============================================================================
// Service
// =============================================================================

/// Videos and success stories, as injected into handlers.
#[derive(Clone)]
pub struct ContentService {
    pub videos: ContentCollection<Video>,
    pub stories: ContentCollection<SuccessStory>,
}

impl ContentService {
    /// Memory-backed service seeded with the fixture catalog.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_stores(
            Arc::new(InMemoryStore::new(fixtures::videos())),
            Arc::new(InMemoryStore::new(fixtures::stories())),
        )
    }

    /// Service backed by the Supabase `videos` and `success_stories` tables.
    #[must_use]
    pub fn supabase(client: &SupabaseClient) -> Self {
        Self::from_stores(
            Arc::new(SupabaseTable::<Video>::new(client.clone())),
            Arc::new(SupabaseTable::<SuccessStory>::new(client.clone())),
        )
    }

    #[must_use]
    pub fn from_stores(
        videos: Arc<dyn EntityStore<Video>>,
        stories: Arc<dyn EntityStore<SuccessStory>>,
    ) -> Self {
        Self {
            videos: ContentCollection::new(videos),
            stories: ContentCollection::new(stories),
        }
    }
}
