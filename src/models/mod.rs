// Model exports
pub mod availability;
pub mod domain;
pub mod requests;
pub mod responses;
pub mod signals;

pub use availability::{AvailabilityVerdict, PricingBreakdown, StayRequest, StaySuggestion, ValidatedStay, VerdictReason, VerdictStatus};
pub use domain::{AbsentSourcePolicy, Booking, BookingStatus, Candidate, CatalogFilter, DateRange, MatchScore, Property, PropertyConstraints, PropertyStatus, ScoreBreakdown, ScoringWeights};
pub use requests::{RecommendationRequest, SearchFilters, SourceToggles};
pub use responses::{ErrorResponse, HealthResponse, RecommendationsResponse};
pub use signals::{PastBooking, PreferenceValue, RawPreference, SearchCriteria, SearchLogEntry, TravelProfile, UserPreference, UserSignalBundle};
