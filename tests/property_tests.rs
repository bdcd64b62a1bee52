// Property tests for scoring and availability invariants

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use serde_json::json;
use stay_engine::core::{AvailabilityChecker, MatchScorer};
use stay_engine::models::{
    AbsentSourcePolicy, Booking, BookingStatus, PreferenceValue, Property, PropertyStatus,
    ScoringWeights, SearchLogEntry, StayRequest, TravelProfile, UserPreference, UserSignalBundle,
    VerdictReason, VerdictStatus,
};

const LABELS: [&str; 5] = ["apartment", "house", "villa", "Lisbon", "wifi"];

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn label() -> impl Strategy<Value = String> {
    prop::sample::select(LABELS.to_vec()).prop_map(str::to_string)
}

fn property_strategy() -> impl Strategy<Value = Property> {
    (
        label(),
        label(),
        prop::collection::vec(label(), 0..4),
        1u32..10,
        1u32..5,
        0.0f64..1_000.0,
    )
        .prop_map(|(property_type, city, amenities, max_guests, min_nights, base_price)| Property {
            id: "p".to_string(),
            title: "Generated".to_string(),
            property_type,
            status: PropertyStatus::Active,
            city,
            country: None,
            amenities,
            max_guests,
            min_nights,
            max_nights: None,
            base_price,
            cleaning_fee: Some(25.0),
            currency: "USD".to_string(),
            rating: None,
            review_count: 0,
            deleted_at: None,
            created_at: None,
        })
}

fn preference_strategy() -> impl Strategy<Value = PreferenceValue> {
    prop_oneof![
        prop::collection::vec(label(), 0..3).prop_map(PreferenceValue::PropertyType),
        (label(), prop::option::of(label()))
            .prop_map(|(city, country)| PreferenceValue::Location { city, country }),
        prop::collection::vec(label(), 0..3).prop_map(PreferenceValue::Amenities),
        (prop::option::of(0.0f64..500.0), prop::option::of(0.0f64..2_000.0))
            .prop_map(|(min, max)| PreferenceValue::BudgetRange { min, max }),
        label().prop_map(PreferenceValue::TravelStyle),
        label().prop_map(|kind| PreferenceValue::Unknown { kind, raw: json!(null) }),
    ]
}

fn search_strategy() -> impl Strategy<Value = SearchLogEntry> {
    (
        prop::option::of(label()),
        prop::option::of(label()),
        prop::option::of(-100.0f64..1_000.0),
        prop::option::of(-100.0f64..2_000.0),
        any::<bool>(),
    )
        .prop_map(|(location, property_type, min, max, nested)| {
            let criteria = if nested {
                json!({
                    "location": location,
                    "propertyType": property_type,
                    "priceRange": { "min": min, "max": max },
                })
            } else {
                json!({
                    "city": location,
                    "type": property_type,
                    "minPrice": min,
                    "maxPrice": max,
                })
            };
            SearchLogEntry { criteria, created_at: None }
        })
}

fn signals_strategy() -> impl Strategy<Value = UserSignalBundle> {
    (
        prop::option::of((
            prop::collection::vec(label(), 0..3),
            prop::collection::vec(label(), 0..3),
            prop::collection::vec(label(), 0..3),
            prop::option::of(0.0f64..500.0),
            prop::option::of(0.0f64..2_000.0),
        )),
        prop::collection::vec((preference_strategy(), 0u8..=10), 0..4),
        prop::collection::vec(property_strategy(), 0..3),
        prop::collection::vec(search_strategy(), 0..4),
    )
        .prop_map(|(profile, preferences, saved, searches)| UserSignalBundle {
            user_id: "u".to_string(),
            travel_profile: profile.map(|(types, must, nice, min, max)| TravelProfile {
                name: String::new(),
                preferred_property_types: types,
                must_have_amenities: must,
                nice_to_have_amenities: nice,
                budget_min: min,
                budget_max: max,
            }),
            preferences: preferences
                .into_iter()
                .map(|(value, weight)| UserPreference::new(value, weight))
                .collect(),
            saved_properties: saved,
            recent_searches: searches,
            ..UserSignalBundle::default()
        })
}

fn weights_strategy() -> impl Strategy<Value = ScoringWeights> {
    (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0).prop_map(|(a, b, c, d)| ScoringWeights {
        travel_profile: a,
        preferences: b,
        search_history: c,
        saved_properties: d,
    })
}

proptest! {
    #[test]
    fn score_stays_within_bounds(
        property in property_strategy(),
        signals in signals_strategy(),
        weights in weights_strategy(),
        fixed in any::<bool>(),
    ) {
        let policy = if fixed { AbsentSourcePolicy::FixedCeiling } else { AbsentSourcePolicy::Renormalize };
        let score = MatchScorer::new(weights, policy).score(&property, &signals).score;
        prop_assert!(score.is_finite());
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn must_have_amenity_never_lowers_score(
        property in property_strategy(),
        signals in signals_strategy(),
    ) {
        let scorer = MatchScorer::default();
        let mut signals = signals;
        let profile = signals.travel_profile.get_or_insert_with(TravelProfile::default);
        profile.must_have_amenities.push("hot tub".to_string());

        let without = scorer.score(&property, &signals).score;
        let mut upgraded = property.clone();
        upgraded.amenities.push("hot tub".to_string());
        let with = scorer.score(&upgraded, &signals).score;

        prop_assert!(with >= without - 1e-9);
    }

    #[test]
    fn inverted_range_is_always_invalid(
        offset in 0i64..365,
        back in 0i64..30,
        guests in -5i64..20,
    ) {
        let check_in = base_date() + Duration::days(offset);
        let check_out = check_in - Duration::days(back);
        let request = StayRequest::new(
            "p",
            check_in.format("%Y-%m-%d").to_string(),
            check_out.format("%Y-%m-%d").to_string(),
            guests,
        );

        let verdict = AvailabilityChecker::default()
            .validate(&request)
            .expect_err("inverted range must not validate");
        prop_assert_eq!(verdict.reason, VerdictReason::InvalidDateRange);
        prop_assert_eq!(verdict.status, VerdictStatus::Error);
    }

    #[test]
    fn capacity_and_minimum_stay_are_enforced(
        property in property_strategy(),
        nights in 1i64..20,
        guests in 1i64..15,
    ) {
        let check_in = base_date();
        let check_out = check_in + Duration::days(nights);
        let request = StayRequest::new(
            "p",
            check_in.format("%Y-%m-%d").to_string(),
            check_out.format("%Y-%m-%d").to_string(),
            guests,
        );

        let verdict = AvailabilityChecker::default().evaluate(&request, Some(&property), &[], &[]);

        if guests > i64::from(property.max_guests) {
            prop_assert_eq!(verdict.reason, VerdictReason::CapacityExceeded);
            prop_assert!(verdict.pricing.is_none());
        } else if nights < i64::from(property.min_nights) {
            prop_assert_eq!(verdict.reason, VerdictReason::BelowMinimumStay);
        } else {
            prop_assert!(verdict.is_available());
            let pricing = verdict.pricing.expect("available verdict carries pricing");
            prop_assert!((pricing.total - (pricing.base_total + pricing.cleaning_fee)).abs() < 0.011);
        }
    }

    #[test]
    fn overlapping_confirmed_booking_always_conflicts(
        start in 0i64..60,
        length in 1i64..10,
        shift in -9i64..9,
    ) {
        let booking_in = base_date() + Duration::days(start);
        let booking = Booking {
            id: "b".to_string(),
            property_id: "p".to_string(),
            check_in: booking_in,
            check_out: booking_in + Duration::days(length),
            status: BookingStatus::Confirmed,
        };
        let request_in = booking_in + Duration::days(shift);
        let request_out = request_in + Duration::days(3);
        let overlaps = request_in < booking.check_out && request_out > booking.check_in;

        let property = Property {
            id: "p".to_string(),
            title: "Generated".to_string(),
            property_type: "house".to_string(),
            status: PropertyStatus::Active,
            city: "Lisbon".to_string(),
            country: None,
            amenities: vec![],
            max_guests: 2,
            min_nights: 1,
            max_nights: None,
            base_price: 90.0,
            cleaning_fee: None,
            currency: "EUR".to_string(),
            rating: None,
            review_count: 0,
            deleted_at: None,
            created_at: None,
        };

        let request = StayRequest::new(
            "p",
            request_in.format("%Y-%m-%d").to_string(),
            request_out.format("%Y-%m-%d").to_string(),
            1,
        );
        let verdict = AvailabilityChecker::default().evaluate(&request, Some(&property), &[], &[booking]);

        if overlaps {
            prop_assert_eq!(verdict.reason, VerdictReason::Conflict);
        } else {
            prop_assert!(verdict.is_available());
        }
    }
}
