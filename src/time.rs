//! Time normalization for bulletin timestamps.
//!
//! Header and pick lines encode the time of day independently of the
//! calendar date, with seconds as a decimal number. A `Timestamp` is built by
//! combining a calendar date with hour, minute and decimal seconds.
//!
//! Seconds of 60 or more do not carry into the minute: the whole-second part
//! wraps modulo 60 and the minute is left as written. Picks inherit the
//! origin's calendar date even when their time of day is earlier than the
//! origin's (no rollover past midnight).

use crate::error::{CatalogError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;

const MICROS_PER_SECOND: f64 = 1_000_000.0;
const MAX_MICROS: u32 = 999_999;

/// Absolute UTC instant with microsecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Build a timestamp from a calendar date and a time of day
    pub fn from_components(date: NaiveDate, hour: u32, minute: u32, seconds: f64) -> Result<Self> {
        if hour > 23 {
            return Err(CatalogError::invalid_time(format!("hour {} out of range", hour)));
        }
        if minute > 59 {
            return Err(CatalogError::invalid_time(format!(
                "minute {} out of range",
                minute
            )));
        }

        let (whole, micros) = split_seconds(seconds)?;
        let time = NaiveTime::from_hms_micro_opt(hour, minute, whole, micros).ok_or_else(|| {
            CatalogError::invalid_time(format!(
                "{:02}:{:02}:{:02}.{:06} is not a valid time of day",
                hour, minute, whole, micros
            ))
        })?;

        Ok(Self(NaiveDateTime::new(date, time)))
    }

    /// Build a timestamp from year, month and day plus a time of day
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        seconds: f64,
    ) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            CatalogError::invalid_time(format!(
                "{:04}-{:02}-{:02} is not a valid date",
                year, month, day
            ))
        })?;
        Self::from_components(date, hour, minute, seconds)
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    pub fn microsecond(&self) -> u32 {
        self.0.nanosecond() / 1_000
    }

    /// Compact identifier: `YYYYMMDDhhmmss` followed by two centisecond digits
    pub fn public_id(&self) -> String {
        format!(
            "{}{:02}",
            self.0.format("%Y%m%d%H%M%S"),
            self.microsecond() / 10_000
        )
    }
}

impl fmt::Display for Timestamp {
    /// Renders `YYYY-MM-DDThh:mm:ss[.d]Z`, one decimal digit when a fraction exists
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))?;
        let micros = self.microsecond();
        if micros > 0 {
            write!(f, ".{}", micros / 100_000)?;
        }
        f.write_str("Z")
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Split decimal seconds into whole seconds (modulo 60) and microseconds
pub fn split_seconds(seconds: f64) -> Result<(u32, u32)> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(CatalogError::invalid_time(format!(
            "seconds value {} is not a non-negative number",
            seconds
        )));
    }

    let whole = seconds.trunc();
    let micros = ((seconds - whole) * MICROS_PER_SECOND).round() as u32;

    Ok(((whole as u64 % 60) as u32, micros.min(MAX_MICROS)))
}
