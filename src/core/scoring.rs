use crate::core::filters::{amenity_coverage, contains_label, labels_match, price_within};
use crate::models::{
    AbsentSourcePolicy, MatchScore, PreferenceValue, Property, ScoreBreakdown, ScoringWeights,
    SearchLogEntry, TravelProfile, UserPreference, UserSignalBundle,
};

/// Computes the 0-100 match score between a property and a user's signals
///
/// Scoring formula:
/// score = (
///     travel_profile * 0.4 +      # type, must-have/nice-to-have amenities, budget
///     preferences * 0.3 +         # explicit weighted preferences
///     search_history * 0.2 +      # location/type/price of recent searches
///     saved_properties * 0.1      # similarity to saved listings
/// ) * 100
///
/// A source the user has no data for is left out of the sum. With
/// [`AbsentSourcePolicy::Renormalize`] the sum is divided by the weights of the
/// sources that are present; with [`AbsentSourcePolicy::FixedCeiling`] it is
/// not, so the best reachable score is the sum of the present weights.
#[derive(Debug, Clone, Copy)]
pub struct MatchScorer {
    weights: ScoringWeights,
    policy: AbsentSourcePolicy,
}

impl MatchScorer {
    pub fn new(weights: ScoringWeights, policy: AbsentSourcePolicy) -> Self {
        let sanitize = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        Self {
            weights: ScoringWeights {
                travel_profile: sanitize(weights.travel_profile),
                preferences: sanitize(weights.preferences),
                search_history: sanitize(weights.search_history),
                saved_properties: sanitize(weights.saved_properties),
            },
            policy,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), AbsentSourcePolicy::default())
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn policy(&self) -> AbsentSourcePolicy {
        self.policy
    }

    /// Score one property for one user
    pub fn score(&self, property: &Property, signals: &UserSignalBundle) -> MatchScore {
        let breakdown = ScoreBreakdown {
            travel_profile: signals
                .travel_profile
                .as_ref()
                .map(|profile| travel_profile_score(property, profile)),
            preferences: preference_score(property, &signals.preferences),
            search_history: search_history_score(property, &signals.recent_searches),
            saved_properties: saved_properties_score(property, &signals.saved_properties),
        };

        MatchScore {
            score: self.combine(&breakdown),
            breakdown,
        }
    }

    fn combine(&self, breakdown: &ScoreBreakdown) -> f64 {
        let terms = [
            (breakdown.travel_profile, self.weights.travel_profile),
            (breakdown.preferences, self.weights.preferences),
            (breakdown.search_history, self.weights.search_history),
            (breakdown.saved_properties, self.weights.saved_properties),
        ];

        let (weighted, present_weight) = terms
            .iter()
            .filter_map(|(sub, weight)| sub.map(|sub| (sub * weight, *weight)))
            .fold((0.0, 0.0), |(sum, total), (term, weight)| (sum + term, total + weight));

        if present_weight <= 0.0 {
            return 0.0;
        }

        let normalized = match self.policy {
            AbsentSourcePolicy::Renormalize => weighted / present_weight,
            AbsentSourcePolicy::FixedCeiling => weighted,
        };

        let score = normalized * 100.0;
        if score.is_finite() {
            score.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Travel profile score (0-1)
///
/// +0.3 preferred type, +0.4 x must-have coverage, +0.2 x nice-to-have
/// coverage, +0.1 price inside the budget when both bounds are set.
pub fn travel_profile_score(property: &Property, profile: &TravelProfile) -> f64 {
    let mut score = 0.0;

    if contains_label(&profile.preferred_property_types, &property.property_type) {
        score += 0.3;
    }

    // Empty amenity lists contribute nothing
    if let Some(coverage) = amenity_coverage(&profile.must_have_amenities, &property.amenities) {
        score += coverage * 0.4;
    }
    if let Some(coverage) = amenity_coverage(&profile.nice_to_have_amenities, &property.amenities) {
        score += coverage * 0.2;
    }

    if let (Some(min), Some(max)) = (profile.budget_min, profile.budget_max) {
        if price_within(property.base_price, Some(min), Some(max)) {
            score += 0.1;
        }
    }

    unit(score)
}

/// Explicit preference score (0-1), `None` without preferences
///
/// Each record contributes its importance (weight / 10) times how well it
/// matches; the result is the average over all records. Kinds other than
/// type, location and amenities contribute zero but still count.
pub fn preference_score(property: &Property, preferences: &[UserPreference]) -> Option<f64> {
    if preferences.is_empty() {
        return None;
    }

    let total: f64 = preferences
        .iter()
        .map(|pref| pref.importance() * preference_match(property, &pref.value))
        .sum();

    Some(unit(total / preferences.len() as f64))
}

fn preference_match(property: &Property, value: &PreferenceValue) -> f64 {
    match value {
        PreferenceValue::PropertyType(types) => {
            if contains_label(types, &property.property_type) { 1.0 } else { 0.0 }
        }
        PreferenceValue::Location { city, .. } => {
            if labels_match(city, &property.city) { 1.0 } else { 0.0 }
        }
        PreferenceValue::Amenities(amenities) => {
            amenity_coverage(amenities, &property.amenities).unwrap_or(0.0)
        }
        PreferenceValue::BudgetRange { .. }
        | PreferenceValue::TravelStyle(_)
        | PreferenceValue::Unknown { .. } => 0.0,
    }
}

/// Search history score (0-1), `None` without searches
///
/// Per search: +0.4 city contains the searched location, +0.3 same type,
/// +0.3 price inside the searched range (only when a bound was given).
pub fn search_history_score(property: &Property, searches: &[SearchLogEntry]) -> Option<f64> {
    if searches.is_empty() {
        return None;
    }

    let city = property.city.to_lowercase();
    let total: f64 = searches
        .iter()
        .map(|entry| {
            let criteria = entry.parsed();
            let mut score = 0.0;

            if let Some(location) = &criteria.location {
                if city.contains(&location.trim().to_lowercase()) {
                    score += 0.4;
                }
            }

            if let Some(property_type) = &criteria.property_type {
                if labels_match(property_type, &property.property_type) {
                    score += 0.3;
                }
            }

            let has_price_range = criteria.min_price.is_some() || criteria.max_price.is_some();
            if has_price_range
                && price_within(property.base_price, criteria.min_price, criteria.max_price)
            {
                score += 0.3;
            }

            score
        })
        .sum();

    Some(unit(total / searches.len() as f64))
}

/// Saved properties score (0-1), `None` without saved listings
///
/// Per saved listing: +0.3 same type, +0.3 same city, up to +0.4 for a
/// similar nightly price.
pub fn saved_properties_score(property: &Property, saved: &[Property]) -> Option<f64> {
    if saved.is_empty() {
        return None;
    }

    let total: f64 = saved
        .iter()
        .map(|other| {
            let mut score = 0.0;
            if labels_match(&other.property_type, &property.property_type) {
                score += 0.3;
            }
            if labels_match(&other.city, &property.city) {
                score += 0.3;
            }
            score + 0.4 * (1.0 - relative_price_distance(property.base_price, other.base_price))
        })
        .sum();

    Some(unit(total / saved.len() as f64))
}

/// |a - b| / max(a, b), in `0.0..=1.0`
#[inline]
fn relative_price_distance(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max <= 0.0 {
        // two free listings are identical in price
        return if a == b { 0.0 } else { 1.0 };
    }
    unit((a - b).abs() / max)
}

#[inline]
fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
