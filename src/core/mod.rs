// Core algorithm exports
pub mod availability;
pub mod calendar;
pub mod filters;
pub mod ranker;
pub mod scoring;

pub use availability::{AvailabilityChecker, calculate_pricing, DEFAULT_SUGGESTION_GAP_DAYS};
pub use calendar::{nights_between, parse_stay_date};
pub use filters::{build_catalog_filter, explicit_catalog_filter, matches_catalog_filter};
pub use ranker::{Ranker, RankedResult};
pub use scoring::MatchScorer;
