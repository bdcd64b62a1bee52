//! In-memory accessors for tests, benchmarks and local runs without a database.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::core::filters::matches_catalog_filter;
use crate::models::{Booking, BookingStatus, CatalogFilter, DateRange, Property, UserSignalBundle};

use super::accessors::{AccessorError, BookingAccessor, CatalogAccessor, SignalAccessor};

/// Property catalog held in insertion order
#[derive(Default)]
pub struct InMemoryCatalog {
    properties: RwLock<Vec<Property>>,
}

impl InMemoryCatalog {
    pub fn with_properties(properties: Vec<Property>) -> Self {
        Self {
            properties: RwLock::new(properties),
        }
    }

    /// Insert or replace a property by id
    pub async fn upsert(&self, property: Property) {
        let mut properties = self.properties.write().await;
        match properties.iter_mut().find(|p| p.id == property.id) {
            Some(existing) => *existing = property,
            None => properties.push(property),
        }
    }
}

#[async_trait]
impl CatalogAccessor for InMemoryCatalog {
    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, AccessorError> {
        let properties = self.properties.read().await;
        Ok(properties.iter().find(|p| p.id == property_id).cloned())
    }

    async fn find_candidates(&self, filter: &CatalogFilter) -> Result<Vec<Property>, AccessorError> {
        let properties = self.properties.read().await;
        let mut matches: Vec<Property> = properties
            .iter()
            .filter(|p| matches_catalog_filter(p, filter))
            .cloned()
            .collect();

        // Same ordering as the SQL accessor: rating desc (nulls last), newest first
        matches.sort_by(|a, b| {
            match (a.rating, b.rating) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| b.created_at.cmp(&a.created_at))
        });

        if filter.limit > 0 {
            matches.truncate(filter.limit);
        }
        Ok(matches)
    }
}

/// Bookings and host blocks
#[derive(Default)]
pub struct InMemoryBookings {
    bookings: RwLock<Vec<Booking>>,
    blocked: RwLock<HashMap<String, BTreeSet<NaiveDate>>>,
}

impl InMemoryBookings {
    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: RwLock::new(bookings),
            blocked: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_booking(&self, booking: Booking) {
        self.bookings.write().await.push(booking);
    }

    pub async fn block_date(&self, property_id: &str, date: NaiveDate) {
        self.blocked
            .write()
            .await
            .entry(property_id.to_string())
            .or_default()
            .insert(date);
    }
}

#[async_trait]
impl BookingAccessor for InMemoryBookings {
    async fn find_blocked_dates(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> Result<Vec<NaiveDate>, AccessorError> {
        let blocked = self.blocked.read().await;
        Ok(blocked
            .get(property_id)
            .map(|dates| {
                dates
                    .range(range.start..range.end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_overlapping_bookings(
        &self,
        property_id: &str,
        range: DateRange,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>, AccessorError> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .filter(|b| b.property_id == property_id)
            .filter(|b| statuses.contains(&b.status))
            .filter(|b| range.overlaps(&b.stay()))
            .cloned()
            .collect())
    }
}

/// Signal bundles keyed by user id
#[derive(Default)]
pub struct InMemorySignals {
    bundles: RwLock<HashMap<String, UserSignalBundle>>,
}

impl InMemorySignals {
    pub fn with_bundles(bundles: Vec<UserSignalBundle>) -> Self {
        Self {
            bundles: RwLock::new(
                bundles
                    .into_iter()
                    .map(|bundle| (bundle.user_id.clone(), bundle))
                    .collect(),
            ),
        }
    }

    pub async fn save(&self, bundle: UserSignalBundle) {
        self.bundles
            .write()
            .await
            .insert(bundle.user_id.clone(), bundle);
    }
}

#[async_trait]
impl SignalAccessor for InMemorySignals {
    async fn load_signals(&self, user_id: &str) -> Result<Option<UserSignalBundle>, AccessorError> {
        let bundles = self.bundles.read().await;
        Ok(bundles.get(user_id).cloned())
    }
}
