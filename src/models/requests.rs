use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request for ranked property recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id")]
    pub user_id: String,
    /// Falls back to the configured default when absent
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default)]
    pub sources: SourceToggles,
    #[validate(nested)]
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

impl RecommendationRequest {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            limit: None,
            sources: SourceToggles::default(),
            filters: None,
        }
    }
}

/// Which signal sources feed the ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceToggles {
    #[serde(default = "enabled")]
    pub preferences: bool,
    #[serde(default = "enabled")]
    pub travel_profile: bool,
    #[serde(default = "enabled")]
    pub saved_properties: bool,
    #[serde(default = "enabled")]
    pub booking_history: bool,
    #[serde(default = "enabled")]
    pub search_history: bool,
}

fn enabled() -> bool {
    true
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self {
            preferences: true,
            travel_profile: true,
            saved_properties: true,
            booking_history: true,
            search_history: true,
        }
    }
}

/// Explicit search criteria intersected with the signal-derived catalog query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "property_type")]
    pub property_type: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "min_price")]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "max_price")]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
}
