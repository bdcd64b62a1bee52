use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use super::AppState;
use crate::models::{ErrorResponse, HealthResponse, StayRequest, VerdictReason};

/// Configure health and availability routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/availability/check", web::post().to(check_availability));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = match &state.postgres {
        Some(postgres) => postgres.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Check availability endpoint
///
/// POST /api/v1/availability/check
///
/// Request body:
/// ```json
/// {
///   "propertyId": "string",
///   "checkIn": "2025-01-12",
///   "checkOut": "2025-01-14",
///   "guestCount": 2
/// }
/// ```
///
/// The body is always a verdict; the status code reflects its reason.
async fn check_availability(
    state: web::Data<AppState>,
    req: web::Json<StayRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for availability request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    tracing::info!(
        "Checking availability for property {} ({} to {}, {} guests)",
        req.property_id,
        req.check_in,
        req.check_out,
        req.guest_count
    );

    let verdict = state.engine.check_availability(&req).await;

    HttpResponse::build(status_for(verdict.reason)).json(verdict)
}

/// HTTP status carrying a verdict
pub fn status_for(reason: VerdictReason) -> StatusCode {
    match reason {
        VerdictReason::InvalidDateRange | VerdictReason::InvalidGuestCount => StatusCode::BAD_REQUEST,
        VerdictReason::NotFound | VerdictReason::Inactive => StatusCode::NOT_FOUND,
        VerdictReason::AccessorFailure => StatusCode::SERVICE_UNAVAILABLE,
        VerdictReason::Bookable
        | VerdictReason::CapacityExceeded
        | VerdictReason::BelowMinimumStay
        | VerdictReason::ExceedsMaximumStay
        | VerdictReason::Conflict => StatusCode::OK,
    }
}
