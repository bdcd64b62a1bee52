use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::DateRange;

/// Requested stay as sent by the caller; dates are parsed by the checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StayRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "property_id")]
    pub property_id: String,
    #[serde(alias = "check_in")]
    pub check_in: String,
    #[serde(alias = "check_out")]
    pub check_out: String,
    #[serde(alias = "guest_count", default = "default_guest_count")]
    pub guest_count: i64,
}

fn default_guest_count() -> i64 {
    1
}

impl StayRequest {
    pub fn new(
        property_id: impl Into<String>,
        check_in: impl Into<String>,
        check_out: impl Into<String>,
        guest_count: i64,
    ) -> Self {
        Self {
            property_id: property_id.into(),
            check_in: check_in.into(),
            check_out: check_out.into(),
            guest_count,
        }
    }
}

/// Stay request that passed input validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedStay {
    pub property_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: u32,
    pub nights: u32,
}

impl ValidatedStay {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.check_in,
            end: self.check_out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Available,
    Unavailable,
    Error,
}

/// Why a verdict came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    Bookable,
    InvalidDateRange,
    InvalidGuestCount,
    NotFound,
    Inactive,
    CapacityExceeded,
    BelowMinimumStay,
    ExceedsMaximumStay,
    Conflict,
    AccessorFailure,
}

impl VerdictReason {
    pub fn status(&self) -> VerdictStatus {
        match self {
            VerdictReason::Bookable => VerdictStatus::Available,
            VerdictReason::CapacityExceeded
            | VerdictReason::BelowMinimumStay
            | VerdictReason::ExceedsMaximumStay
            | VerdictReason::Conflict => VerdictStatus::Unavailable,
            VerdictReason::InvalidDateRange
            | VerdictReason::InvalidGuestCount
            | VerdictReason::NotFound
            | VerdictReason::Inactive
            | VerdictReason::AccessorFailure => VerdictStatus::Error,
        }
    }

    /// Input problems that are rejected before any store access
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            VerdictReason::InvalidDateRange | VerdictReason::InvalidGuestCount
        )
    }
}

/// Price of a bookable stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub nightly_rate: f64,
    pub nights: u32,
    pub base_total: f64,
    pub cleaning_fee: f64,
    pub total: f64,
    pub currency: String,
}

/// Alternative window offered when the requested dates conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaySuggestion {
    pub suggested_check_in: NaiveDate,
    pub suggested_check_out: NaiveDate,
    pub nights: u32,
}

/// Result of an availability check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityVerdict {
    pub status: VerdictStatus,
    pub reason: VerdictReason,
    pub message: String,
    pub property_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicting_dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<StaySuggestion>,
}

impl AvailabilityVerdict {
    pub fn new(reason: VerdictReason, property_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: reason.status(),
            reason,
            message: message.into(),
            property_id: property_id.into(),
            check_in: None,
            check_out: None,
            nights: None,
            guest_count: None,
            pricing: None,
            capacity: None,
            min_nights: None,
            max_nights: None,
            conflicting_dates: Vec::new(),
            suggestion: None,
        }
    }

    /// Echo the validated stay back to the caller
    pub fn for_stay(reason: VerdictReason, stay: &ValidatedStay, message: impl Into<String>) -> Self {
        Self {
            check_in: Some(stay.check_in),
            check_out: Some(stay.check_out),
            nights: Some(stay.nights),
            guest_count: Some(stay.guest_count),
            ..Self::new(reason, stay.property_id.clone(), message)
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == VerdictStatus::Available
    }
}
