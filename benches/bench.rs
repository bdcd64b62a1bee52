// Criterion benchmarks for Stay Engine

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use serde_json::json;
use stay_engine::core::{AvailabilityChecker, MatchScorer, Ranker};
use stay_engine::models::{
    Booking, BookingStatus, PreferenceValue, Property, PropertyStatus, SearchLogEntry,
    StayRequest, TravelProfile, UserPreference, UserSignalBundle,
};

const TYPES: [&str; 4] = ["apartment", "house", "villa", "cabin"];
const CITIES: [&str; 3] = ["Lisbon", "Porto", "Faro"];

fn create_property(id: usize) -> Property {
    let amenities = if id % 2 == 0 {
        vec!["wifi".to_string(), "kitchen".to_string()]
    } else {
        vec!["parking".to_string()]
    };

    Property {
        id: id.to_string(),
        title: format!("Listing {}", id),
        property_type: TYPES[id % TYPES.len()].to_string(),
        status: PropertyStatus::Active,
        city: CITIES[id % CITIES.len()].to_string(),
        country: Some("PT".to_string()),
        amenities,
        max_guests: 2 + (id % 6) as u32,
        min_nights: 1 + (id % 3) as u32,
        max_nights: Some(30),
        base_price: 60.0 + (id % 200) as f64,
        cleaning_fee: Some(25.0),
        currency: "EUR".to_string(),
        rating: Some(3.5 + (id % 15) as f64 / 10.0),
        review_count: (id % 50) as u32,
        deleted_at: None,
        created_at: None,
    }
}

fn create_signals() -> UserSignalBundle {
    UserSignalBundle {
        user_id: "bench_user".to_string(),
        preferences: vec![
            UserPreference::new(PreferenceValue::PropertyType(vec!["apartment".to_string()]), 8),
            UserPreference::new(PreferenceValue::Amenities(vec!["wifi".to_string()]), 6),
        ],
        travel_profile: Some(TravelProfile {
            name: "Workation".to_string(),
            preferred_property_types: vec!["apartment".to_string(), "house".to_string()],
            must_have_amenities: vec!["wifi".to_string()],
            nice_to_have_amenities: vec!["kitchen".to_string()],
            budget_min: Some(50.0),
            budget_max: Some(180.0),
        }),
        saved_properties: (0..5).map(create_property).collect(),
        recent_bookings: vec![],
        recent_searches: vec![
            SearchLogEntry {
                criteria: json!({"location": "Lisbon", "propertyType": "apartment", "maxPrice": 150}),
                created_at: None,
            },
            SearchLogEntry {
                criteria: json!({"city": "Porto", "priceRange": {"min": 80, "max": 200}}),
                created_at: None,
            },
        ],
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bench_match_score(c: &mut Criterion) {
    let scorer = MatchScorer::default();
    let signals = create_signals();
    let property = create_property(42);

    c.bench_function("match_score", |b| {
        b.iter(|| scorer.score(black_box(&property), black_box(&signals)));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let ranker = Ranker::default();
    let signals = create_signals();

    let mut group = c.benchmark_group("ranking");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<Property> = (0..*candidate_count).map(create_property).collect();

        group.bench_with_input(
            BenchmarkId::new("rank", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    ranker.rank(
                        black_box(&signals),
                        black_box(candidates.clone()),
                        black_box(20),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_availability(c: &mut Criterion) {
    let checker = AvailabilityChecker::default();
    let property = create_property(3);
    let bookings: Vec<Booking> = (0..24)
        .map(|i| {
            let check_in = date(2025, 1, 1) + chrono::Duration::days(i * 14);
            Booking {
                id: format!("b{}", i),
                property_id: property.id.clone(),
                check_in,
                check_out: check_in + chrono::Duration::days(5),
                status: if i % 3 == 0 { BookingStatus::Cancelled } else { BookingStatus::Confirmed },
            }
        })
        .collect();
    let blocked = vec![date(2025, 3, 3), date(2025, 7, 19)];

    let open = StayRequest::new(property.id.clone(), "2025-01-08", "2025-01-12", 2);
    let conflicting = StayRequest::new(property.id.clone(), "2025-01-16", "2025-01-20", 2);

    let mut group = c.benchmark_group("availability");

    group.bench_function("available", |b| {
        b.iter(|| checker.evaluate(black_box(&open), Some(&property), &blocked, &bookings));
    });

    group.bench_function("conflict", |b| {
        b.iter(|| checker.evaluate(black_box(&conflicting), Some(&property), &blocked, &bookings));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_match_score,
    bench_ranking,
    bench_availability
);

criterion_main!(benches);
