//! Orchestration of the availability and recommendation flows over the accessors.
//!
//! Every store call is bounded by the configured accessor timeout. Availability
//! never fails: store problems become an `error` verdict. Recommendations
//! surface store problems as [`EngineError`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use validator::Validate;

use crate::core::filters::{build_catalog_filter, explicit_catalog_filter};
use crate::core::{AvailabilityChecker, Ranker};
use crate::models::{
    AvailabilityVerdict, BookingStatus, RecommendationRequest, RecommendationsResponse,
    StayRequest, ValidatedStay, VerdictReason,
};

use super::accessors::{AccessorError, BookingAccessor, CatalogAccessor, SignalAccessor};

/// Errors returned by the recommendation flow
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Accessor(#[from] AccessorError),
}

/// Tunables for the engine
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub accessor_timeout: Duration,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Candidates fetched per requested result, so ranking has room to reorder
    pub candidate_pool_multiplier: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            accessor_timeout: Duration::from_millis(2_000),
            default_limit: 10,
            max_limit: 100,
            candidate_pool_multiplier: 5,
        }
    }
}

/// Availability checks and recommendations over a set of accessors
#[derive(Clone)]
pub struct BookingEngine {
    catalog: Arc<dyn CatalogAccessor>,
    bookings: Arc<dyn BookingAccessor>,
    signals: Arc<dyn SignalAccessor>,
    checker: AvailabilityChecker,
    ranker: Ranker,
    options: EngineOptions,
}

impl BookingEngine {
    pub fn new(
        catalog: Arc<dyn CatalogAccessor>,
        bookings: Arc<dyn BookingAccessor>,
        signals: Arc<dyn SignalAccessor>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            signals,
            checker: AvailabilityChecker::default(),
            ranker: Ranker::default(),
            options: EngineOptions::default(),
        }
    }

    pub fn with_checker(mut self, checker: AvailabilityChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Decide whether a stay can be booked
    ///
    /// Validation runs before any store access. The calendar is only read
    /// once the property's own rules pass.
    pub async fn check_availability(&self, request: &StayRequest) -> AvailabilityVerdict {
        let stay = match self.checker.validate(request) {
            Ok(stay) => stay,
            Err(verdict) => {
                tracing::debug!("Rejected stay request for {}: {}", request.property_id, verdict.message);
                return verdict;
            }
        };

        let property = match self
            .bounded("get_property", self.catalog.get_property(&stay.property_id))
            .await
        {
            Ok(property) => property,
            Err(e) => return accessor_failure(&stay, e),
        };

        if let Some(verdict) = self.checker.check_rules(&stay, property.as_ref()) {
            tracing::debug!("Stay {} rejected: {:?}", stay.property_id, verdict.reason);
            return verdict;
        }

        let Some(property) = property else {
            return AvailabilityVerdict::for_stay(VerdictReason::NotFound, &stay, "Property not found");
        };

        let range = stay.range();
        let calendar = tokio::try_join!(
            self.bounded(
                "find_blocked_dates",
                self.bookings.find_blocked_dates(&stay.property_id, range),
            ),
            self.bounded(
                "find_overlapping_bookings",
                self.bookings
                    .find_overlapping_bookings(&stay.property_id, range, &BookingStatus::BLOCKING),
            ),
        );

        let (blocked_dates, bookings) = match calendar {
            Ok(calendar) => calendar,
            Err(e) => return accessor_failure(&stay, e),
        };

        if let Some(verdict) = self.checker.check_calendar(&stay, &blocked_dates, &bookings) {
            return verdict;
        }

        let verdict = self.checker.quote(&stay, &property);
        tracing::info!(
            "Stay {} {}..{} available for {} guest(s)",
            stay.property_id,
            stay.check_in,
            stay.check_out,
            stay.guest_count
        );
        verdict
    }

    /// Rank properties for a user
    ///
    /// Users without any enabled signal get catalog order with `fallback` set.
    pub async fn get_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationsResponse, EngineError> {
        request
            .validate()
            .map_err(|e| EngineError::Validation(e.to_string()))?;

        let limit = self.resolve_limit(request.limit);

        let bundle = self
            .bounded("load_signals", self.signals.load_signals(&request.user_id))
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "User",
                id: request.user_id.clone(),
            })?;
        let signals = bundle.restricted_to(&request.sources);
        let explicit = request.filters.as_ref();

        let ranked = if signals.is_empty() {
            tracing::info!("No signals for user {}, using catalog order", request.user_id);
            let filter = explicit_catalog_filter(explicit, limit);
            let pool = self
                .bounded("find_candidates", self.catalog.find_candidates(&filter))
                .await?;
            self.ranker.rank(&signals, pool, limit)
        } else {
            let pool_size = limit
                .saturating_mul(self.options.candidate_pool_multiplier)
                .max(limit);
            let filter = build_catalog_filter(&signals, explicit, pool_size);
            let mut pool = self
                .bounded("find_candidates", self.catalog.find_candidates(&filter))
                .await?;

            if pool.is_empty() {
                let widened = explicit_catalog_filter(explicit, pool_size);
                if widened != filter {
                    tracing::debug!(
                        "Signal filter for {} matched nothing, retrying with explicit filters only",
                        request.user_id
                    );
                    pool = self
                        .bounded("find_candidates", self.catalog.find_candidates(&widened))
                        .await?;
                }
            }

            self.ranker.rank(&signals, pool, limit)
        };

        tracing::info!(
            "Returning {} recommendations for user {} ({} candidates, fallback={})",
            ranked.candidates.len(),
            request.user_id,
            ranked.total_candidates,
            ranked.fallback
        );

        Ok(RecommendationsResponse {
            user_id: request.user_id.clone(),
            recommendations: ranked.candidates,
            total_candidates: ranked.total_candidates,
            fallback: ranked.fallback,
            generated_at: Utc::now(),
        })
    }

    fn resolve_limit(&self, requested: Option<u16>) -> usize {
        let max = self.options.max_limit.max(1);
        requested
            .map(usize::from)
            .unwrap_or(self.options.default_limit)
            .clamp(1, max)
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, AccessorError>
    where
        F: Future<Output = Result<T, AccessorError>>,
    {
        let after = self.options.accessor_timeout;
        match tokio::time::timeout(after, call).await {
            Ok(result) => result,
            Err(_) => Err(AccessorError::Timeout { operation, after }),
        }
    }
}

fn accessor_failure(stay: &ValidatedStay, error: AccessorError) -> AvailabilityVerdict {
    tracing::error!("Availability check for {} failed: {}", stay.property_id, error);
    AvailabilityVerdict::for_stay(
        VerdictReason::AccessorFailure,
        stay,
        format!("Unable to check availability right now: {}", error),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::{InMemoryBookings, InMemoryCatalog, InMemorySignals};

    fn create_engine() -> BookingEngine {
        BookingEngine::new(
            Arc::new(InMemoryCatalog::default()),
            Arc::new(InMemoryBookings::default()),
            Arc::new(InMemorySignals::default()),
        )
    }

    #[test]
    fn test_resolve_limit() {
        let engine = create_engine().with_options(EngineOptions {
            default_limit: 10,
            max_limit: 25,
            ..EngineOptions::default()
        });

        assert_eq!(engine.resolve_limit(None), 10);
        assert_eq!(engine.resolve_limit(Some(3)), 3);
        assert_eq!(engine.resolve_limit(Some(80)), 25);
    }

    #[tokio::test]
    async fn test_timeout_becomes_accessor_error() {
        let engine = create_engine().with_options(EngineOptions {
            accessor_timeout: Duration::from_millis(10),
            ..EngineOptions::default()
        });

        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, AccessorError>(())
        };
        let result = engine.bounded("slow_call", slow).await;

        assert!(matches!(
            result,
            Err(AccessorError::Timeout { operation: "slow_call", .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_not_found() {
        let engine = create_engine();
        let result = engine
            .get_recommendations(&RecommendationRequest::for_user("ghost"))
            .await;
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_lookup() {
        let engine = create_engine();
        let result = engine
            .get_recommendations(&RecommendationRequest::for_user(""))
            .await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }
}
