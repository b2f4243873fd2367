use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{CandidateHint, ProfileDocument, ProfileId};
use crate::services::store::{CandidateStream, ProfileStore, StoreError};

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Connection details for the Appwrite document store
#[derive(Debug, Clone)]
pub struct AppwriteConnection {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub profiles_collection: String,
}

/// Profile store backed by an Appwrite document collection
///
/// Candidates are fetched page by page as the stream is polled, so a caller
/// that stops early never pays for the rest of the collection.
pub struct AppwriteProfileStore {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    collection: String,
    page_size: usize,
    client: Client,
}

struct PageCursor {
    offset: usize,
    done: bool,
}

impl AppwriteProfileStore {
    pub fn new(connection: AppwriteConnection, page_size: usize) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url: connection.endpoint.trim_end_matches('/').to_string(),
            api_key: connection.api_key,
            project_id: connection.project_id,
            database_id: connection.database_id,
            collection: connection.profiles_collection,
            page_size: page_size.max(1),
            client,
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url, self.database_id, self.collection
        )
    }

    /// Quote a string value for an Appwrite query, escaping `"` and `\`
    fn quote(value: &str) -> String {
        Value::from(value).to_string()
    }

    /// Appwrite queries for one page of candidates
    fn candidate_queries(hint: &CandidateHint, offset: usize, limit: usize) -> Vec<String> {
        let mut queries = vec![format!(
            "notEqual(\"$id\", {})",
            Self::quote(hint.exclude_id.as_str())
        )];

        if hint.verified_only {
            queries.push("equal(\"isVerified\", true)".to_string());
        }

        if let Some(gender) = hint.gender {
            queries.push(format!(
                "equal(\"basicInfo.gender\", {})",
                Self::quote(gender.as_str())
            ));
        }

        queries.push("orderAsc(\"$id\")".to_string());
        queries.push(format!("limit({})", limit));
        queries.push(format!("offset({})", offset));
        queries
    }

    fn check_status(status: StatusCode, what: &str) -> Result<(), AppwriteError> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppwriteError::Unauthorized),
            s => Err(AppwriteError::ApiError(format!("Failed to {}: {}", what, s))),
        }
    }

    /// Extract profile data from an Appwrite document
    fn parse_document(doc: &Value) -> Result<ProfileDocument, serde_json::Error> {
        let data = doc.get("data").unwrap_or(doc);
        serde_json::from_value(data.clone())
    }

    async fn fetch_page(
        &self,
        hint: &CandidateHint,
        offset: usize,
        limit: usize,
    ) -> Result<(usize, Vec<ProfileDocument>), AppwriteError> {
        let queries = Self::candidate_queries(hint, offset, limit);
        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;
        let url = format!("{}?query={}", self.documents_url(), urlencoding::encode(&queries_json));

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        Self::check_status(response.status(), "query candidates")?;

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let profiles: Vec<ProfileDocument> = documents
            .iter()
            .filter_map(|doc| match Self::parse_document(doc) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping unparseable profile document: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Fetched {} candidate documents at offset {}",
            profiles.len(),
            offset
        );

        Ok((documents.len(), profiles))
    }
}

#[async_trait]
impl ProfileStore for AppwriteProfileStore {
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<ProfileDocument>, StoreError> {
        let url = format!(
            "{}/{}",
            self.documents_url(),
            urlencoding::encode(id.as_str())
        );

        tracing::debug!("Fetching profile {}", id);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await
            .map_err(AppwriteError::from)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::check_status(response.status(), "fetch profile")?;

        let json: Value = response.json().await.map_err(AppwriteError::from)?;

        let mut profile = Self::parse_document(&json).map_err(|e| {
            AppwriteError::InvalidResponse(format!("Failed to parse profile: {}", e))
        })?;
        if profile.id.is_empty() {
            profile.id = id.to_string();
        }

        Ok(Some(profile))
    }

    async fn stream_candidates<'a>(&'a self, hint: CandidateHint) -> Result<CandidateStream<'a>, StoreError> {
        let max = hint.limit;
        let page_size = self.page_size;

        let pages = stream::try_unfold(
            PageCursor { offset: 0, done: false },
            move |cursor| {
                let hint = hint.clone();
                async move {
                    if cursor.done || cursor.offset >= max {
                        return Ok::<_, StoreError>(None);
                    }
                    let limit = page_size.min(max - cursor.offset);
                    let (returned, profiles) = self.fetch_page(&hint, cursor.offset, limit).await?;
                    let next = PageCursor {
                        offset: cursor.offset + returned,
                        done: returned < limit,
                    };
                    Ok(Some((profiles, next)))
                }
            },
        );

        let candidates = pages
            .map_ok(|profiles| stream::iter(profiles.into_iter().map(Ok::<_, StoreError>)))
            .try_flatten();

        Ok(candidates.boxed())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await
            .map_err(AppwriteError::from)?;
        Ok(response.status().is_success())
    }
}
