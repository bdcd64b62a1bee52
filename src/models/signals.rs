//! User signal bundle consumed by the match scorer.
//!
//! Preference values are stored upstream as free-form JSON keyed by a
//! preference type. They are decoded here into [`PreferenceValue`]; anything
//! that does not fit a known shape is kept as [`PreferenceValue::Unknown`] and
//! scores zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::domain::Property;
use crate::models::requests::SourceToggles;

/// Importance assigned when a stored preference has none
pub const DEFAULT_PREFERENCE_WEIGHT: u8 = 5;
pub const MAX_PREFERENCE_WEIGHT: u8 = 10;

/// Decoded preference value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PreferenceValue {
    PropertyType(Vec<String>),
    Location { city: String, country: Option<String> },
    Amenities(Vec<String>),
    BudgetRange { min: Option<f64>, max: Option<f64> },
    TravelStyle(String),
    Unknown { kind: String, raw: Value },
}

impl PreferenceValue {
    /// Decode a stored (type, value) pair, falling back to `Unknown`
    pub fn from_raw(kind: &str, raw: Value) -> Self {
        let decoded = match kind.trim().to_lowercase().replace('-', "_").as_str() {
            "property_type" | "propertytype" | "property_types" => {
                string_list(&raw, &["types", "type", "propertyTypes", "propertyType"])
                    .map(PreferenceValue::PropertyType)
            }
            "location" | "city" => location(&raw),
            "amenities" | "amenity" => {
                string_list(&raw, &["amenities"]).map(PreferenceValue::Amenities)
            }
            "budget_range" | "budgetrange" | "budget" => budget(&raw),
            "travel_style" | "travelstyle" => {
                string_field(&raw, &["style", "travelStyle"]).map(PreferenceValue::TravelStyle)
            }
            _ => None,
        };

        decoded.unwrap_or_else(|| PreferenceValue::Unknown {
            kind: kind.to_string(),
            raw,
        })
    }
}

fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    match raw {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn string_list(raw: &Value, keys: &[&str]) -> Option<Vec<String>> {
    match raw {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        ),
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(|nested| match nested {
                Value::Object(_) => None,
                other => string_list(other, &[]),
            }),
        _ => None,
    }
}

fn location(raw: &Value) -> Option<PreferenceValue> {
    let city = string_field(raw, &["city", "location"])?;
    let country = match raw {
        Value::Object(map) => map
            .get("country")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string()),
        _ => None,
    };
    Some(PreferenceValue::Location { city, country })
}

fn budget(raw: &Value) -> Option<PreferenceValue> {
    let map = raw.as_object()?;
    let min = ["min", "minPrice", "min_price"]
        .iter()
        .find_map(|key| map.get(*key))
        .and_then(lenient_number);
    let max = ["max", "maxPrice", "max_price"]
        .iter()
        .find_map(|key| map.get(*key))
        .and_then(lenient_number);

    if min.is_none() && max.is_none() {
        return None;
    }
    Some(PreferenceValue::BudgetRange { min, max })
}

/// Numbers in stored blobs are sometimes strings
pub(crate) fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Stored preference row as it comes out of the store
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPreference {
    #[serde(alias = "preference_type")]
    pub preference_type: String,
    #[serde(alias = "preference_value", default)]
    pub preference_value: Value,
    #[serde(default)]
    pub weight: Option<i64>,
}

/// Explicit preference with its importance (0-10)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPreference")]
pub struct UserPreference {
    pub value: PreferenceValue,
    pub weight: u8,
}

impl UserPreference {
    pub fn new(value: PreferenceValue, weight: u8) -> Self {
        Self {
            value,
            weight: weight.min(MAX_PREFERENCE_WEIGHT),
        }
    }

    /// Importance as a factor in `0.0..=1.0`
    pub fn importance(&self) -> f64 {
        f64::from(self.weight) / f64::from(MAX_PREFERENCE_WEIGHT)
    }
}

impl From<RawPreference> for UserPreference {
    fn from(raw: RawPreference) -> Self {
        let weight = raw
            .weight
            .map(|w| w.clamp(0, i64::from(MAX_PREFERENCE_WEIGHT)) as u8)
            .unwrap_or(DEFAULT_PREFERENCE_WEIGHT);
        Self::new(
            PreferenceValue::from_raw(&raw.preference_type, raw.preference_value),
            weight,
        )
    }
}

/// The user's default travel profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub preferred_property_types: Vec<String>,
    #[serde(default)]
    pub must_have_amenities: Vec<String>,
    #[serde(default)]
    pub nice_to_have_amenities: Vec<String>,
    #[serde(default)]
    pub budget_min: Option<f64>,
    #[serde(default)]
    pub budget_max: Option<f64>,
}

/// Completed stay from the user's booking history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastBooking {
    pub property_id: String,
    pub property_type: String,
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// One logged search; `criteria` is whatever the search UI sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLogEntry {
    pub criteria: Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SearchLogEntry {
    pub fn parsed(&self) -> SearchCriteria {
        SearchCriteria::from_value(&self.criteria)
    }
}

/// Fields the scorer understands from a search blob
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SearchCriteria {
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| map.get(*key))
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let number = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| map.get(*key))
                .and_then(lenient_number)
        };

        let price_range = map.get("priceRange").and_then(|v| v.as_object());
        let nested = |key: &str| price_range.and_then(|r| r.get(key)).and_then(lenient_number);

        Self {
            location: text(&["location", "city", "destination"]),
            property_type: text(&["propertyType", "property_type", "type"]),
            min_price: number(&["minPrice", "min_price"]).or_else(|| nested("min")),
            max_price: number(&["maxPrice", "max_price"]).or_else(|| nested("max")),
        }
    }
}

/// Everything the scorer knows about a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignalBundle {
    pub user_id: String,
    #[serde(default)]
    pub preferences: Vec<UserPreference>,
    #[serde(default)]
    pub travel_profile: Option<TravelProfile>,
    #[serde(default)]
    pub saved_properties: Vec<Property>,
    #[serde(default)]
    pub recent_bookings: Vec<PastBooking>,
    #[serde(default)]
    pub recent_searches: Vec<SearchLogEntry>,
}

impl UserSignalBundle {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// True when no source carries any data
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty()
            && self.travel_profile.is_none()
            && self.saved_properties.is_empty()
            && self.recent_bookings.is_empty()
            && self.recent_searches.is_empty()
    }

    /// Drop the sources the caller switched off
    pub fn restricted_to(mut self, sources: &SourceToggles) -> Self {
        if !sources.preferences {
            self.preferences.clear();
        }
        if !sources.travel_profile {
            self.travel_profile = None;
        }
        if !sources.saved_properties {
            self.saved_properties.clear();
        }
        if !sources.booking_history {
            self.recent_bookings.clear();
        }
        if !sources.search_history {
            self.recent_searches.clear();
        }
        self
    }
}
