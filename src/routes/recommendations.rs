use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use super::AppState;
use crate::models::{ErrorResponse, RecommendationRequest, RecommendationsResponse};
use crate::services::{CacheKey, EngineError};

/// Configure recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/recommendations", web::post().to(get_recommendations))
        .route("/recommendations/{user_id}/cache", web::delete().to(invalidate_cache));
}

/// Get recommendations endpoint
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 10,
///   "sources": { "searchHistory": false },
///   "filters": { "location": "Lisbon", "maxPrice": 150 }
/// }
/// ```
async fn get_recommendations(
    state: web::Data<AppState>,
    req: web::Json<RecommendationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendations request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let cache_key = match CacheKey::fingerprint(&(req.limit, &req.sources, &req.filters)) {
        Ok(fingerprint) => Some(CacheKey::recommendations(&req.user_id, &fingerprint)),
        Err(e) => {
            tracing::warn!("Could not fingerprint request, skipping cache: {}", e);
            None
        }
    };

    if let Some(key) = &cache_key {
        if let Ok(cached) = state.cache.get::<RecommendationsResponse>(key).await {
            tracing::debug!("Serving cached recommendations for {}", req.user_id);
            return HttpResponse::Ok().json(cached);
        }
    }

    match state.engine.get_recommendations(&req).await {
        Ok(response) => {
            if let Some(key) = &cache_key {
                if let Err(e) = state.cache.set(key, &response).await {
                    tracing::warn!("Failed to cache recommendations for {}: {}", req.user_id, e);
                }
            }
            HttpResponse::Ok().json(response)
        }
        Err(EngineError::Validation(message)) => {
            HttpResponse::BadRequest().json(ErrorResponse::new("Validation failed", message, 400))
        }
        Err(e @ EngineError::NotFound { .. }) => {
            HttpResponse::NotFound().json(ErrorResponse::new("Not found", e.to_string(), 404))
        }
        Err(EngineError::Accessor(e)) => {
            tracing::error!("Failed to build recommendations for {}: {}", req.user_id, e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                "Store unavailable",
                e.to_string(),
                503,
            ))
        }
    }
}

/// Drop a user's cached recommendations
///
/// DELETE /api/v1/recommendations/{userId}/cache
async fn invalidate_cache(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let user_id = path.into_inner();

    match state.cache.invalidate_prefix(&CacheKey::user_prefix(&user_id)).await {
        Ok(()) => {
            tracing::info!("Invalidated cached recommendations for {}", user_id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            tracing::error!("Failed to invalidate cache for {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Cache invalidation failed",
                e.to_string(),
                500,
            ))
        }
    }
}
