// HTTP tests for Stay Engine routes

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use chrono::NaiveDate;
use serde_json::{json, Value};
use stay_engine::models::{
    Booking, BookingStatus, Property, PropertyStatus, RecommendationsResponse, SearchFilters,
    SourceToggles, TravelProfile, UserSignalBundle,
};
use stay_engine::routes::{configure_routes, handle_json_payload_error, AppState};
use stay_engine::services::{
    BookingEngine, CacheKey, CacheManager, InMemoryBookings, InMemoryCatalog, InMemorySignals,
};

fn create_property(id: &str, amenities: &[&str], rating: f64) -> Property {
    Property {
        id: id.to_string(),
        title: format!("Listing {}", id),
        property_type: "apartment".to_string(),
        status: PropertyStatus::Active,
        city: "Lisbon".to_string(),
        country: Some("PT".to_string()),
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
        max_guests: 4,
        min_nights: 2,
        max_nights: None,
        base_price: 100.0,
        cleaning_fee: Some(20.0),
        currency: "EUR".to_string(),
        rating: Some(rating),
        review_count: 3,
        deleted_at: None,
        created_at: None,
    }
}

fn create_state() -> AppState {
    let check_in = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    let check_out = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

    let engine = BookingEngine::new(
        Arc::new(InMemoryCatalog::with_properties(vec![
            create_property("loft", &["wifi"], 4.2),
            create_property("studio", &[], 4.9),
        ])),
        Arc::new(InMemoryBookings::with_bookings(vec![Booking {
            id: "b1".to_string(),
            property_id: "loft".to_string(),
            check_in,
            check_out,
            status: BookingStatus::Confirmed,
        }])),
        Arc::new(InMemorySignals::with_bundles(vec![UserSignalBundle {
            travel_profile: Some(TravelProfile {
                must_have_amenities: vec!["wifi".to_string()],
                ..TravelProfile::default()
            }),
            ..UserSignalBundle::empty("guest_1")
        }])),
    );

    AppState {
        engine,
        cache: Arc::new(CacheManager::in_memory(100, 60)),
        postgres: None,
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!(create_state());
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_availability_ok() {
    let app = init_app!(create_state());
    let req = test::TestRequest::post()
        .uri("/api/v1/availability/check")
        .set_json(json!({
            "propertyId": "loft",
            "checkIn": "2025-01-16",
            "checkOut": "2025-01-19",
            "guestCount": 2
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "available");
    assert_eq!(body["pricing"]["total"], 320.0);
}

#[actix_web::test]
async fn test_availability_conflict_is_ok_status() {
    let app = init_app!(create_state());
    let req = test::TestRequest::post()
        .uri("/api/v1/availability/check")
        .set_json(json!({
            "propertyId": "loft",
            "checkIn": "2025-01-12",
            "checkOut": "2025-01-14",
            "guestCount": 2
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unavailable");
    assert_eq!(body["reason"], "conflict");
    assert_eq!(body["suggestion"]["suggestedCheckIn"], "2025-01-21");
}

#[actix_web::test]
async fn test_availability_status_codes() {
    let app = init_app!(create_state());

    let cases = [
        (json!({"propertyId": "loft", "checkIn": "2025-01-14", "checkOut": "2025-01-12"}), StatusCode::BAD_REQUEST),
        (json!({"propertyId": "missing", "checkIn": "2025-02-01", "checkOut": "2025-02-04"}), StatusCode::NOT_FOUND),
        (json!({"propertyId": "", "checkIn": "2025-02-01", "checkOut": "2025-02-04"}), StatusCode::BAD_REQUEST),
        (json!({"propertyId": "loft", "checkIn": "2025-02-01", "checkOut": "2025-02-02"}), StatusCode::OK),
    ];

    for (payload, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/availability/check")
            .set_json(payload.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "payload {}", payload);
    }
}

#[actix_web::test]
async fn test_malformed_json_returns_json_error() {
    let app = init_app!(create_state());
    let req = test::TestRequest::post()
        .uri("/api/v1/availability/check")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_recommendations_ranked() {
    let app = init_app!(create_state());
    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({"userId": "guest_1", "limit": 5}))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["userId"], "guest_1");
    assert_eq!(body["fallback"], false);
    assert_eq!(body["recommendations"][0]["id"], "loft");
    let top = body["recommendations"][0]["matchScore"].as_f64().unwrap();
    let runner_up = body["recommendations"][1]["matchScore"].as_f64().unwrap();
    assert!(top > runner_up);
}

#[actix_web::test]
async fn test_recommendations_unknown_user() {
    let app = init_app!(create_state());
    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({"userId": "ghost"}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_recommendations_invalid_limit() {
    let app = init_app!(create_state());
    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({"userId": "guest_1", "limit": 500}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_cached_recommendations_are_invalidated() {
    let state = create_state();
    let cache = state.cache.clone();
    let app = init_app!(state);

    let request = || {
        test::TestRequest::post()
            .uri("/api/v1/recommendations")
            .set_json(json!({"userId": "guest_1"}))
            .to_request()
    };

    let first: Value = test::call_and_read_body_json(&app, request()).await;
    let second: Value = test::call_and_read_body_json(&app, request()).await;
    // the cached response is replayed, timestamp included
    assert_eq!(first["generatedAt"], second["generatedAt"]);

    let req = test::TestRequest::delete()
        .uri("/api/v1/recommendations/guest_1/cache")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let fingerprint = CacheKey::fingerprint(&(None::<u16>, &SourceToggles::default(), &None::<SearchFilters>)).unwrap();
    let key = CacheKey::recommendations("guest_1", &fingerprint);
    assert!(cache.get::<RecommendationsResponse>(&key).await.is_err());

    let third: Value = test::call_and_read_body_json(&app, request()).await;
    assert_eq!(third["recommendations"][0]["id"], "loft");
}
