//! Battery backup unit lifecycle rules.
//!
//! A BBU is modeled as serviceable for a fixed 1825 days after manufacture, with no leap
//! year adjustment. Callers always pass the current date in; nothing here reads a clock.

use chrono::{DateTime, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Service life of a battery backup unit, in days.
pub const BBU_LIFESPAN_DAYS: u64 = 1825;

/// Format of precomputed expiration dates.
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%d";

/// Manufacture date formats, tried in order; the first that parses wins.
pub const MANUFACTURE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Parses a precomputed expiration date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the text does not match [`EXPIRATION_FORMAT`].
pub fn parse_expiration(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), EXPIRATION_FORMAT)
        .map_err(|e| Error::InvalidDate(format!("expiration `{text}`: {e}")))
}

/// Parses a manufacture date.
///
/// Tries month/day/year, year-month-day and day/month/year in that order, then an
/// RFC 3339 timestamp as written by controller firmware, whose local calendar date is used.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if no format matches.
pub fn parse_manufacture_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    MANUFACTURE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
        .ok_or_else(|| Error::InvalidDate(format!("manufacture date `{text}`")))
}

/// Expiration date for a battery manufactured on `manufactured`.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the result falls outside the representable range.
pub fn expiration_from_manufacture(manufactured: NaiveDate) -> Result<NaiveDate> {
    manufactured
        .checked_add_days(Days::new(BBU_LIFESPAN_DAYS))
        .ok_or_else(|| Error::InvalidDate(format!("expiration overflow from {manufactured}")))
}

/// Formats an expiration date the way it is persisted.
#[must_use]
pub fn format_expiration(date: NaiveDate) -> String {
    date.format(EXPIRATION_FORMAT).to_string()
}

/// Converts a manufacture date string straight into a persisted expiration string.
///
/// Returns `None` with a logged warning if the date cannot be parsed.
#[must_use]
pub fn expiration_for_manufacture(text: &str) -> Option<String> {
    match parse_manufacture_date(text).and_then(expiration_from_manufacture) {
        Ok(date) => Some(format_expiration(date)),
        Err(err) => {
            warn!(%err, "cannot compute BBU expiration");
            None
        }
    }
}

/// Signed number of days from `today` until `expiration`.
#[must_use]
pub fn remaining_days(expiration: NaiveDate, today: NaiveDate) -> i64 {
    (expiration - today).num_days()
}

/// Renders remaining life as `"<n> days"` or `"Expired <n> days ago"`.
#[must_use]
pub fn render_remaining(days: i64) -> String {
    if days < 0 {
        format!("Expired {} days ago", days.unsigned_abs())
    } else {
        format!("{days} days")
    }
}

/// Date information known for one battery slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BbuSlot {
    /// Precomputed expiration date (`YYYY-MM-DD`)
    pub expiration: Option<String>,
    /// Manufacture date in one of the accepted formats
    pub manufacture: Option<String>,
}

impl BbuSlot {
    /// Create a slot from optional expiration and manufacture dates.
    #[must_use]
    pub fn new(expiration: Option<String>, manufacture: Option<String>) -> Self {
        Self {
            expiration,
            manufacture,
        }
    }

    /// Returns true if the slot carries no date at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expiration.is_none() && self.manufacture.is_none()
    }

    /// Resolves the slot's expiration date.
    ///
    /// A parseable precomputed expiration wins; otherwise the manufacture date plus the
    /// service life is used. Unparseable dates are logged and skipped.
    #[must_use]
    pub fn resolve(&self) -> Option<NaiveDate> {
        if let Some(expiration) = self.expiration.as_deref() {
            match parse_expiration(expiration) {
                Ok(date) => return Some(date),
                Err(err) => warn!(%err, "ignoring precomputed BBU expiration"),
            }
        }

        let manufacture = self.manufacture.as_deref()?;
        match parse_manufacture_date(manufacture).and_then(expiration_from_manufacture) {
            Ok(date) => Some(date),
            Err(err) => {
                warn!(%err, "ignoring BBU manufacture date");
                None
            }
        }
    }

    /// Evaluates the slot against the injected current date.
    #[must_use]
    pub fn evaluate(&self, today: NaiveDate) -> Option<BbuStatus> {
        self.resolve()
            .map(|expiration| BbuStatus::new(expiration, today))
    }
}

/// Lifecycle state of one battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BbuStatus {
    /// Date the battery reaches end of service life
    pub expiration: NaiveDate,
    /// Days left until expiration; negative once expired
    pub remaining_days: i64,
}

impl BbuStatus {
    /// Computes the status of a battery expiring on `expiration`.
    #[must_use]
    pub fn new(expiration: NaiveDate, today: NaiveDate) -> Self {
        Self {
            expiration,
            remaining_days: remaining_days(expiration, today),
        }
    }

    /// Returns true once the expiration date has passed.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining_days < 0
    }

    /// Human rendering of the remaining life.
    #[must_use]
    pub fn render_remaining(&self) -> String {
        render_remaining(self.remaining_days)
    }
}

/// Lifecycle state of both battery slots of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceBbuStatus {
    /// Slot 1
    pub bbu1: Option<BbuStatus>,
    /// Slot 2
    pub bbu2: Option<BbuStatus>,
}

impl DeviceBbuStatus {
    /// Evaluates both slots; returns `None` if neither yields a date.
    #[must_use]
    pub fn evaluate(bbu1: &BbuSlot, bbu2: &BbuSlot, today: NaiveDate) -> Option<Self> {
        let status = Self {
            bbu1: bbu1.evaluate(today),
            bbu2: bbu2.evaluate(today),
        };
        if status.bbu1.is_none() && status.bbu2.is_none() {
            None
        } else {
            Some(status)
        }
    }
}
