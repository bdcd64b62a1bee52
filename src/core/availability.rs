//! Availability checking for a requested stay.
//!
//! Rules run in a fixed order and the first failing rule decides the verdict:
//! input validation, listing state, capacity, minimum and maximum stay, then
//! the calendar (host blocks and pending/confirmed bookings). A stay that
//! passes every rule is priced. Conflicts come back with a suggested window of
//! the same length a fixed number of days after the requested check-out.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::core::calendar::parse_stay_date;
use crate::models::{
    AvailabilityVerdict, Booking, DateRange, PricingBreakdown, Property, PropertyStatus,
    StayRequest, StaySuggestion, ValidatedStay, VerdictReason,
};

/// Days between the requested check-out and the suggested check-in
pub const DEFAULT_SUGGESTION_GAP_DAYS: i64 = 7;

/// Validates stays against a property's rules and calendar
///
/// Holds no state besides its configuration, so one instance is shared by
/// every request.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityChecker {
    suggestion_gap_days: i64,
}

impl AvailabilityChecker {
    pub fn new(suggestion_gap_days: i64) -> Self {
        Self {
            suggestion_gap_days: suggestion_gap_days.max(0),
        }
    }

    pub fn suggestion_gap_days(&self) -> i64 {
        self.suggestion_gap_days
    }

    /// Parse and sanity-check the raw request
    ///
    /// Runs before any store access. Returns the error verdict on failure.
    pub fn validate(&self, request: &StayRequest) -> Result<ValidatedStay, AvailabilityVerdict> {
        let invalid_range = || {
            AvailabilityVerdict::new(
                VerdictReason::InvalidDateRange,
                request.property_id.clone(),
                format!(
                    "Invalid date range: check-in '{}' must be a date before check-out '{}'",
                    request.check_in, request.check_out
                ),
            )
        };

        let (Some(check_in), Some(check_out)) = (
            parse_stay_date(&request.check_in),
            parse_stay_date(&request.check_out),
        ) else {
            return Err(invalid_range());
        };

        if check_in >= check_out {
            return Err(invalid_range());
        }

        if request.guest_count < 1 {
            return Err(AvailabilityVerdict::new(
                VerdictReason::InvalidGuestCount,
                request.property_id.clone(),
                format!("Invalid guest count: {} (at least 1 guest required)", request.guest_count),
            ));
        }
        // Oversized counts saturate and fail the capacity rule instead
        let guest_count = u32::try_from(request.guest_count).unwrap_or(u32::MAX);

        let nights = DateRange::new(check_in, check_out).nights();

        Ok(ValidatedStay {
            property_id: request.property_id.clone(),
            check_in,
            check_out,
            guest_count,
            nights: u32::try_from(nights).unwrap_or(u32::MAX),
        })
    }

    /// Listing state, capacity and stay-length rules
    ///
    /// Returns `Some(verdict)` for the first rule that fails.
    pub fn check_rules(&self, stay: &ValidatedStay, property: Option<&Property>) -> Option<AvailabilityVerdict> {
        let Some(property) = property else {
            return Some(AvailabilityVerdict::for_stay(
                VerdictReason::NotFound,
                stay,
                format!("Property {} not found", stay.property_id),
            ));
        };

        if property.deleted_at.is_some() {
            return Some(AvailabilityVerdict::for_stay(
                VerdictReason::NotFound,
                stay,
                format!("Property {} not found", stay.property_id),
            ));
        }

        let rules = property.constraints();

        if rules.status != PropertyStatus::Active {
            return Some(AvailabilityVerdict::for_stay(
                VerdictReason::Inactive,
                stay,
                format!("Property {} is not currently accepting bookings", stay.property_id),
            ));
        }

        if stay.guest_count > rules.capacity_guests {
            return Some(AvailabilityVerdict {
                capacity: Some(rules.capacity_guests),
                ..AvailabilityVerdict::for_stay(
                    VerdictReason::CapacityExceeded,
                    stay,
                    format!(
                        "Capacity exceeded: this property accommodates up to {} guests",
                        rules.capacity_guests
                    ),
                )
            });
        }

        if stay.nights < rules.min_nights {
            return Some(AvailabilityVerdict {
                min_nights: Some(rules.min_nights),
                ..AvailabilityVerdict::for_stay(
                    VerdictReason::BelowMinimumStay,
                    stay,
                    format!(
                        "Below minimum stay: {} night(s) requested, minimum is {}",
                        stay.nights, rules.min_nights
                    ),
                )
            });
        }

        if let Some(max_nights) = rules.max_nights {
            if stay.nights > max_nights {
                return Some(AvailabilityVerdict {
                    max_nights: Some(max_nights),
                    ..AvailabilityVerdict::for_stay(
                        VerdictReason::ExceedsMaximumStay,
                        stay,
                        format!(
                            "Exceeds maximum stay: {} night(s) requested, maximum is {}",
                            stay.nights, max_nights
                        ),
                    )
                });
            }
        }

        None
    }

    /// Host blocks and existing bookings over every night of the stay
    ///
    /// Bookings that are not pending or confirmed are ignored even if the
    /// accessor returned them.
    pub fn check_calendar(
        &self,
        stay: &ValidatedStay,
        blocked_dates: &[NaiveDate],
        bookings: &[Booking],
    ) -> Option<AvailabilityVerdict> {
        let range = stay.range();
        let blocked: BTreeSet<NaiveDate> = blocked_dates.iter().copied().collect();

        let conflicting_dates: Vec<NaiveDate> = range
            .dates()
            .filter(|date| {
                blocked.contains(date) || bookings.iter().any(|booking| booking.occupies(*date))
            })
            .collect();

        if conflicting_dates.is_empty() {
            return None;
        }

        let suggestion = range.shifted_after(self.suggestion_gap_days).map(|next| StaySuggestion {
            suggested_check_in: next.start,
            suggested_check_out: next.end,
            nights: stay.nights,
        });
        tracing::debug!(
            "Stay {} {}..{} conflicts on {} night(s), suggestion {:?}",
            stay.property_id,
            stay.check_in,
            stay.check_out,
            conflicting_dates.len(),
            suggestion
        );

        Some(AvailabilityVerdict {
            conflicting_dates,
            suggestion,
            ..AvailabilityVerdict::for_stay(
                VerdictReason::Conflict,
                stay,
                format!(
                    "Not available: the property is already booked or blocked between {} and {}",
                    stay.check_in, stay.check_out
                ),
            )
        })
    }

    /// Price a stay that passed every rule
    pub fn quote(&self, stay: &ValidatedStay, property: &Property) -> AvailabilityVerdict {
        let pricing = calculate_pricing(property, stay.nights);
        AvailabilityVerdict {
            message: format!(
                "Available for {} night(s): {:.2} {} total",
                stay.nights, pricing.total, pricing.currency
            ),
            pricing: Some(pricing),
            ..AvailabilityVerdict::for_stay(VerdictReason::Bookable, stay, String::new())
        }
    }

    /// Run the full rule chain over data already fetched from the store
    pub fn evaluate(
        &self,
        request: &StayRequest,
        property: Option<&Property>,
        blocked_dates: &[NaiveDate],
        bookings: &[Booking],
    ) -> AvailabilityVerdict {
        let stay = match self.validate(request) {
            Ok(stay) => stay,
            Err(verdict) => return verdict,
        };

        if let Some(verdict) = self.check_rules(&stay, property) {
            return verdict;
        }

        if let Some(verdict) = self.check_calendar(&stay, blocked_dates, bookings) {
            return verdict;
        }

        match property {
            Some(property) => self.quote(&stay, property),
            // check_rules already rejected a missing property
            None => AvailabilityVerdict::for_stay(VerdictReason::NotFound, &stay, "Property not found"),
        }
    }
}

impl Default for AvailabilityChecker {
    fn default() -> Self {
        Self::new(DEFAULT_SUGGESTION_GAP_DAYS)
    }
}

/// basePrice x nights + cleaning fee, rounded to cents
pub fn calculate_pricing(property: &Property, nights: u32) -> PricingBreakdown {
    let rules = property.constraints();
    let base_total = round_currency(rules.base_price * f64::from(nights));
    let cleaning_fee = round_currency(rules.cleaning_fee.unwrap_or(0.0));

    PricingBreakdown {
        nightly_rate: rules.base_price,
        nights,
        base_total,
        cleaning_fee,
        total: round_currency(base_total + cleaning_fee),
        currency: rules.currency,
    }
}

#[inline]
fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
