use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Booking, BookingStatus, CatalogFilter, DateRange, Property, UserSignalBundle};

/// Errors raised by the stores behind the engine
#[derive(Debug, Error)]
pub enum AccessorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to property listings
#[async_trait]
pub trait CatalogAccessor: Send + Sync {
    /// Fetch a property regardless of status; `None` when it does not exist
    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, AccessorError>;

    /// Active, non-deleted properties matching the filter, best rated first
    async fn find_candidates(&self, filter: &CatalogFilter) -> Result<Vec<Property>, AccessorError>;
}

/// Read access to a property's calendar
#[async_trait]
pub trait BookingAccessor: Send + Sync {
    /// Dates inside `range` the host marked unavailable
    async fn find_blocked_dates(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> Result<Vec<NaiveDate>, AccessorError>;

    /// Bookings in one of `statuses` that overlap `range`
    async fn find_overlapping_bookings(
        &self,
        property_id: &str,
        range: DateRange,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>, AccessorError>;
}

/// Read access to everything the scorer knows about a user
#[async_trait]
pub trait SignalAccessor: Send + Sync {
    /// `None` when the user does not exist
    async fn load_signals(&self, user_id: &str) -> Result<Option<UserSignalBundle>, AccessorError>;
}
