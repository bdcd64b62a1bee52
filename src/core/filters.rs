use crate::models::{CatalogFilter, Property, SearchFilters, UserSignalBundle};

/// Case- and whitespace-insensitive label comparison
#[inline]
pub fn labels_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// True when `label` appears in `list`
#[inline]
pub fn contains_label(list: &[String], label: &str) -> bool {
    list.iter().any(|item| labels_match(item, label))
}

/// Share of `wanted` present in `available`, or `None` when nothing is wanted
pub fn amenity_coverage(wanted: &[String], available: &[String]) -> Option<f64> {
    if wanted.is_empty() {
        return None;
    }
    let hits = wanted
        .iter()
        .filter(|amenity| contains_label(available, amenity))
        .count();
    Some(hits as f64 / wanted.len() as f64)
}

/// True when the price sits inside the optional bounds
#[inline]
pub fn price_within(price: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| price >= min) && max.map_or(true, |max| price <= max)
}

/// Build the catalog query for a user's recommendations
///
/// Sources are applied in a fixed order so the result is deterministic:
/// 1. travel profile (preferred types, budget range)
/// 2. saved property types
/// 3. booking history types
/// 4. explicit search filters
///
/// Each later type source replaces the type list from earlier ones. Explicit
/// filters replace type and city, narrow the price range and add required
/// amenities.
pub fn build_catalog_filter(
    signals: &UserSignalBundle,
    explicit: Option<&SearchFilters>,
    limit: usize,
) -> CatalogFilter {
    let mut filter = CatalogFilter {
        limit,
        ..CatalogFilter::default()
    };

    if let Some(profile) = &signals.travel_profile {
        if !profile.preferred_property_types.is_empty() {
            filter.property_types = dedup_labels(profile.preferred_property_types.iter());
        }
        filter.min_price = profile.budget_min;
        filter.max_price = profile.budget_max;
    }

    if !signals.saved_properties.is_empty() {
        filter.property_types =
            dedup_labels(signals.saved_properties.iter().map(|p| &p.property_type));
    }

    if !signals.recent_bookings.is_empty() {
        filter.property_types =
            dedup_labels(signals.recent_bookings.iter().map(|b| &b.property_type));
    }

    if let Some(explicit) = explicit {
        apply_explicit_filters(&mut filter, explicit);
    }

    filter
}

/// Catalog query from explicit filters only, used when signals are missing
pub fn explicit_catalog_filter(explicit: Option<&SearchFilters>, limit: usize) -> CatalogFilter {
    let mut filter = CatalogFilter {
        limit,
        ..CatalogFilter::default()
    };
    if let Some(explicit) = explicit {
        apply_explicit_filters(&mut filter, explicit);
    }
    filter
}

fn apply_explicit_filters(filter: &mut CatalogFilter, explicit: &SearchFilters) {
    if let Some(property_type) = non_blank(explicit.property_type.as_deref()) {
        filter.property_types = vec![property_type.to_string()];
    }

    if let Some(location) = non_blank(explicit.location.as_deref()) {
        filter.cities = vec![location.to_string()];
    }

    filter.min_price = tighter(filter.min_price, explicit.min_price, f64::max);
    filter.max_price = tighter(filter.max_price, explicit.max_price, f64::min);

    for amenity in &explicit.amenities {
        if non_blank(Some(amenity)).is_some() && !contains_label(&filter.amenities, amenity) {
            filter.amenities.push(amenity.trim().to_string());
        }
    }
}

fn tighter(current: Option<f64>, incoming: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (current, incoming) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn dedup_labels<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        if non_blank(Some(label)).is_some() && !contains_label(&out, label) {
            out.push(label.trim().to_string());
        }
    }
    out
}

/// Check if a property satisfies a catalog query
///
/// Mirrors what the SQL accessor does, for in-memory catalogs.
#[inline]
pub fn matches_catalog_filter(property: &Property, filter: &CatalogFilter) -> bool {
    // Only bookable listings are ever candidates
    if !property.is_listed() {
        return false;
    }

    if !filter.property_types.is_empty()
        && !contains_label(&filter.property_types, &property.property_type) {
        return false;
    }

    if !filter.cities.is_empty() && !contains_label(&filter.cities, &property.city) {
        return false;
    }

    if !price_within(property.base_price, filter.min_price, filter.max_price) {
        return false;
    }

    filter
        .amenities
        .iter()
        .all(|amenity| contains_label(&property.amenities, amenity))
}
