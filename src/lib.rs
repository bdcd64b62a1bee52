//! Stay Engine - availability checks and property recommendations for a
//! short-term rental marketplace.
//!
//! The pure rules live in [`core`]; [`services::BookingEngine`] runs them over
//! the catalog, booking and user-signal accessors.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{AvailabilityChecker, MatchScorer, Ranker};
pub use models::{
    AvailabilityVerdict, Property, RecommendationRequest, RecommendationsResponse, StayRequest,
    UserSignalBundle, VerdictReason, VerdictStatus,
};
pub use services::{BookingEngine, EngineError, EngineOptions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let verdict = AvailabilityChecker::default()
            .validate(&StayRequest::new("p1", "2025-01-14", "2025-01-12", 1))
            .unwrap_err();
        assert_eq!(verdict.reason, VerdictReason::InvalidDateRange);
        assert_eq!(verdict.status, VerdictStatus::Error);
    }
}
