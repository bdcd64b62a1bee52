use chrono::{DateTime, Duration, NaiveDate, Utc};
use crate::models::{Booking, DateRange};

/// Parse a stay date
///
/// Accepts `YYYY-MM-DD` with a four-digit year, or an RFC 3339 timestamp,
/// in which case the UTC calendar date is used.
pub fn parse_stay_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let plain_date = raw.len() == 10 && raw.as_bytes()[..4].iter().all(u8::is_ascii_digit);
    let parsed = if plain_date {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    } else {
        None
    };
    parsed.or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Number of nights between check-in and the exclusive check-out
///
/// Negative when the range is inverted.
#[inline]
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn nights(&self) -> i64 {
        nights_between(self.start, self.end)
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Every night of the range, check-out excluded
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d < end)
    }

    /// Overlap test for half-open ranges
    ///
    /// Covers an existing stay that starts inside the range, ends inside it,
    /// or spans it entirely. Back-to-back stays (one checks out the day the
    /// other checks in) do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &DateRange) -> bool {
        other.start < self.end && other.end > self.start
    }

    /// Same length window starting `gap_days` after this range ends
    ///
    /// `None` when the window would fall outside the representable calendar.
    pub fn shifted_after(&self, gap_days: i64) -> Option<DateRange> {
        let start = self.end.checked_add_signed(Duration::try_days(gap_days)?)?;
        let end = start.checked_add_signed(Duration::try_days(self.nights().max(0))?)?;
        Some(DateRange { start, end })
    }
}

impl Booking {
    pub fn stay(&self) -> DateRange {
        DateRange::new(self.check_in, self.check_out)
    }

    /// True when this booking occupies the night of `date`
    #[inline]
    pub fn occupies(&self, date: NaiveDate) -> bool {
        self.status.blocks_calendar() && self.stay().contains(date)
    }
}
