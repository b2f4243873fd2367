use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};
use thiserror::Error;

use crate::core::filters::matches_hint;
use crate::models::{CandidateHint, ProfileDocument, ProfileId};
use crate::services::appwrite::AppwriteError;
use crate::services::postgres::PostgresError;

/// Errors raised by a profile store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Appwrite store error: {0}")]
    Appwrite(#[from] AppwriteError),

    #[error("PostgreSQL store error: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Lazy, finite, non-restartable sequence of candidate documents
pub type CandidateStream<'a> = BoxStream<'a, Result<ProfileDocument, StoreError>>;

/// Read-only source of profiles for the matching engine
///
/// Implementations return raw documents; validation happens in the engine
/// so one malformed record never fails a whole query.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile, `None` when it does not exist
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<ProfileDocument>, StoreError>;

    /// Stream candidate profiles, applying `hint` where the backend can
    async fn stream_candidates<'a>(&'a self, hint: CandidateHint) -> Result<CandidateStream<'a>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Profile store held entirely in memory
///
/// Candidates are streamed in id order. `insert` takes `&self`, so a store
/// shared behind an `Arc` can be edited while the engine reads from it.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<BTreeMap<String, ProfileDocument>>,
}

impl InMemoryProfileStore {
    pub fn new(documents: impl IntoIterator<Item = ProfileDocument>) -> Self {
        let profiles = documents
            .into_iter()
            .map(|doc| (doc.id.clone(), doc))
            .collect();
        Self {
            profiles: RwLock::new(profiles),
        }
    }

    // A writer panicking mid-insert leaves the map itself consistent
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, ProfileDocument>> {
        self.profiles.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load a JSON array of profile documents
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("cannot read {}: {}", path.display(), e)))?;
        let documents: Vec<ProfileDocument> = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Unavailable(format!("cannot parse {}: {}", path.display(), e)))?;
        Ok(Self::new(documents))
    }

    /// Add or replace a profile; later queries see the new version
    pub fn insert(&self, document: ProfileDocument) {
        self.profiles
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(document.id.clone(), document);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<ProfileDocument>, StoreError> {
        Ok(self.read().get(id.as_str()).cloned())
    }

    async fn stream_candidates<'a>(&'a self, hint: CandidateHint) -> Result<CandidateStream<'a>, StoreError> {
        // Snapshot under the lock; the guard must not live across awaits
        let candidates: Vec<Result<ProfileDocument, StoreError>> = self
            .read()
            .values()
            .filter(|doc| matches_hint(doc, &hint))
            .take(hint.limit)
            .cloned()
            .map(Ok)
            .collect();

        Ok(stream::iter(candidates).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use futures::TryStreamExt;
    use serde_json::json;

    fn doc(id: &str, gender: &str, verified: bool) -> ProfileDocument {
        serde_json::from_value(json!({
            "id": id,
            "basicInfo": { "gender": gender, "dateOfBirth": "1995-05-05" },
            "isVerified": verified
        }))
        .unwrap()
    }

    fn store() -> InMemoryProfileStore {
        InMemoryProfileStore::new(vec![
            doc("seeker", "female", true),
            doc("m2", "male", true),
            doc("m1", "male", true),
            doc("m3", "male", false),
            doc("f1", "female", true),
        ])
    }

    #[tokio::test]
    async fn test_get_profile() {
        let store = store();

        let found = store.get_profile(&ProfileId::new("m1")).await.unwrap();
        let missing = store.get_profile(&ProfileId::new("nobody")).await.unwrap();

        assert_eq!(found.map(|d| d.id), Some("m1".to_string()));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_stream_applies_hint_in_id_order() {
        let store = store();
        let hint = CandidateHint {
            exclude_id: ProfileId::new("seeker"),
            gender: Some(Gender::Male),
            verified_only: true,
            limit: 100,
        };

        let ids: Vec<String> = store
            .stream_candidates(hint)
            .await
            .unwrap()
            .map_ok(|d| d.id)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[test]
    fn test_load_from_json_file() {
        let path = std::env::temp_dir().join(format!("profiles-{}.json", uuid::Uuid::new_v4()));
        let seed = json!([
            { "$id": "p1", "basicInfo": { "gender": "female", "dateOfBirth": "1998-01-10" } },
            { "$id": "p2", "basicInfo": { "gender": "male", "dateOfBirth": "1996-02-02" } }
        ]);
        std::fs::write(&path, seed.to_string()).unwrap();

        let store = InMemoryProfileStore::from_json_file(&path).unwrap();
        let found = tokio_test::block_on(store.get_profile(&ProfileId::new("p2"))).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(store.len(), 2);
        assert!(found.is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let err = InMemoryProfileStore::from_json_file("/nonexistent/profiles.json").unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_insert_replaces_shared_profile() {
        let store = std::sync::Arc::new(store());
        let shared = store.clone();

        let mut edited = doc("m1", "male", true);
        edited.name = Some("Edited".to_string());
        shared.insert(edited);

        let found = store.get_profile(&ProfileId::new("m1")).await.unwrap().unwrap();
        assert_eq!(found.name.as_deref(), Some("Edited"));
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn test_stream_respects_limit() {
        let store = store();
        let hint = CandidateHint {
            exclude_id: ProfileId::new("seeker"),
            gender: None,
            verified_only: false,
            limit: 2,
        };

        let count = store.stream_candidates(hint).await.unwrap().count().await;

        assert_eq!(count, 2);
    }
}
