use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Listing lifecycle state as stored in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Active,
    Inactive,
}

impl PropertyStatus {
    /// Parse a stored status, anything other than "active" is treated as inactive
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("active") {
            PropertyStatus::Active
        } else {
            PropertyStatus::Inactive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Active => "active",
            PropertyStatus::Inactive => "inactive",
        }
    }
}

/// Property listing with pricing, stay rules and amenities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    pub property_type: String,
    pub status: PropertyStatus,
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub max_guests: u32,
    #[serde(default = "default_min_nights")]
    pub min_nights: u32,
    #[serde(default)]
    pub max_nights: Option<u32>,
    pub base_price: f64,
    #[serde(default)]
    pub cleaning_fee: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_min_nights() -> u32 { 1 }
fn default_currency() -> String { "USD".to_string() }

impl Property {
    /// Active and not soft-deleted
    pub fn is_listed(&self) -> bool {
        self.status == PropertyStatus::Active && self.deleted_at.is_none()
    }

    /// Snapshot of the rules an availability check runs against
    pub fn constraints(&self) -> PropertyConstraints {
        PropertyConstraints {
            capacity_guests: self.max_guests,
            min_nights: self.min_nights,
            max_nights: self.max_nights,
            base_price: self.base_price,
            cleaning_fee: self.cleaning_fee,
            currency: self.currency.clone(),
            status: self.status,
        }
    }
}

/// Immutable booking rules for a single property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyConstraints {
    pub capacity_guests: u32,
    pub min_nights: u32,
    pub max_nights: Option<u32>,
    pub base_price: f64,
    pub cleaning_fee: Option<f64>,
    pub currency: String,
    pub status: PropertyStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Statuses that hold the calendar
    pub const BLOCKING: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn blocks_calendar(&self) -> bool {
        Self::BLOCKING.contains(self)
    }
}

/// Existing reservation on a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub property_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
}

/// Half-open calendar range, `end` is exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Catalog query parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    /// Empty means any type
    pub property_types: Vec<String>,
    /// Empty means any city
    pub cities: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Every listed amenity must be present
    pub amenities: Vec<String>,
    pub limit: usize,
}

/// Weight of each signal source in the match score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub travel_profile: f64,
    pub preferences: f64,
    pub search_history: f64,
    pub saved_properties: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            travel_profile: 0.4,
            preferences: 0.3,
            search_history: 0.2,
            saved_properties: 0.1,
        }
    }
}

/// How the scorer treats a signal source the user has no data for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentSourcePolicy {
    /// Divide by the weights of the sources that are present, so any user can reach 100
    #[default]
    Renormalize,
    /// Keep the raw weighted sum, so missing sources lower the ceiling
    FixedCeiling,
}

/// Per-source sub-scores in `0.0..=1.0`; `None` when the source was absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_profile: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_history: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_properties: Option<f64>,
}

/// Match score for one (property, user) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Property enriched with its match score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(flatten)]
    pub property: Property,
    pub match_score: f64,
    pub score_breakdown: ScoreBreakdown,
}
