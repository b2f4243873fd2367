use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

use crate::core::MatchEngine;
use crate::error::MatchError;
use crate::models::{
    ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, MatchesQuery,
    PageRequest, ProfileId,
};
use crate::services::{CacheManager, ProfileStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchEngine>,
    pub store: Arc<dyn ProfileStore>,
    pub cache: Option<Arc<CacheManager>>,
    pub default_limit: usize,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/profiles/{id}/matches", web::get().to(profile_matches));
}

impl ResponseError for MatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            MatchError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            MatchError::PreferencesIncomplete(_) | MatchError::InvalidProfile { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            MatchError::Store(_) => StatusCode::BAD_GATEWAY,
            MatchError::PreconditionViolated(_) | MatchError::ScoringFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error, message) = match self {
            MatchError::ProfileNotFound(_) => (
                "profile_not_found",
                "Please complete your profile first".to_string(),
            ),
            MatchError::PreferencesIncomplete(_) => ("preferences_incomplete", self.to_string()),
            MatchError::InvalidProfile { .. } => ("invalid_profile", self.to_string()),
            MatchError::Store(_) => ("store_unavailable", self.to_string()),
            MatchError::PreconditionViolated(_) | MatchError::ScoringFailed(_) => {
                ("internal_error", self.to_string())
            }
        };
        let status = self.status_code();

        HttpResponse::build(status).json(ErrorResponse {
            error: error.to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Profile store health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_entries: state.cache.as_ref().map(|c| c.stats().l1_entries),
        timestamp: chrono::Utc::now(),
    })
}

async fn run_find(state: &AppState, seeker_id: ProfileId, page: PageRequest) -> Result<HttpResponse, MatchError> {
    let span = tracing::info_span!(
        "find_matches",
        request_id = %uuid::Uuid::new_v4(),
        seeker = %seeker_id
    );

    async move {
        match state.engine.find_matches(&seeker_id, page).await {
            Ok(result) => Ok(HttpResponse::Ok().json(FindMatchesResponse::from(&result))),
            Err(e) => {
                match &e {
                    MatchError::Store(_)
                    | MatchError::PreconditionViolated(_)
                    | MatchError::ScoringFailed(_) => {
                        tracing::error!("Failed to find matches for {}: {}", seeker_id, e)
                    }
                    _ => tracing::info!("Rejected match request for {}: {}", seeker_id, e),
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "seekerId": "string",
///   "offset": 0,
///   "limit": 20
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> Result<HttpResponse, MatchError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return Ok(validation_failed(errors));
    }

    let req = req.into_inner();
    let page = PageRequest::new(req.offset, req.limit.unwrap_or(state.default_limit));

    run_find(&state, ProfileId::new(req.seeker_id), page).await
}

/// Matches for a stored profile
///
/// GET /api/v1/profiles/{id}/matches?offset=0&limit=20
async fn profile_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<MatchesQuery>,
) -> Result<HttpResponse, MatchError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_failed(errors));
    }

    let page = PageRequest::new(
        query.offset.unwrap_or(0),
        query.limit.unwrap_or(state.default_limit),
    );

    run_find(&state, ProfileId::new(path.into_inner()), page).await
}
