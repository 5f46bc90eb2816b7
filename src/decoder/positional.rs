//! Positional bulletin dialect.
//!
//! Header and pick lines are matched with whitespace-delimited patterns
//! instead of column ranges, which tolerates lines that have lost their
//! leading blank column. Date and time come entirely from the header line.
//!
//! Example lines:
//! ```text
//! 2016  8 3 0737 54.5 L  72.790 127.098 10.8  BER  4 0.3 0.5LBER 0.4CBER        1
//! 628  0Z IP     C  738  1.68   16
//! ```

use super::{BulletinDecoder, extract_magnitudes, parse_optional_f64, split_hour_minute};
use crate::error::{CatalogError, Result};
use crate::models::{DecodedHeader, OriginHeader, PhaseCode, PickRecord, RawEventGroup};
use crate::time::Timestamp;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

static DATE_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})\s+(\d{1,2})\s+(\d{1,2})\s+(\d{3,4})\s+([\d.]+)")
        .expect("valid date/time regex")
});

/// Location-quality marker followed by latitude, longitude and depth
static LOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"L\s+([\d.-]+)\s+([\d.-]+)\s+([\d.-]+)").expect("valid location regex")
});

static AGENCY_AFTER_LOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"L\s+[\d.-]+\s+[\d.-]+\s+[\d.-]+\s+(\w{3})").expect("valid agency regex")
});

static AGENCY_AFTER_MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"L\s+(\w{3})").expect("valid agency regex"));

/// A line starting with a three digit station code
static STATION_SHAPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{3}\s").expect("valid station regex"));

/// Station, channel, phase of one to four characters, optional polarity, HHMM, seconds
static PICK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{3})\s+(\w{2})\s+(\w{1,4})\s+(?:([A-Za-z])\s+)?(\d{3,4})\s+([\d.]+)")
        .expect("valid pick regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalDecoder;

impl PositionalDecoder {
    pub fn new() -> Self {
        Self
    }

    fn parse_origin_time(line: &str, event_index: usize) -> Result<Timestamp> {
        let caps = DATE_TIME_PATTERN.captures(line).ok_or_else(|| {
            CatalogError::malformed_header(event_index, "no date/time at start of header line")
        })?;

        let malformed = |what: &str| CatalogError::malformed_header(event_index, what.to_string());

        let year: i32 = caps[1].parse().map_err(|_| malformed("invalid year"))?;
        let month: u32 = caps[2].parse().map_err(|_| malformed("invalid month"))?;
        let day: u32 = caps[3].parse().map_err(|_| malformed("invalid day"))?;
        let (hour, minute) =
            split_hour_minute(&caps[4]).ok_or_else(|| malformed("invalid hour/minute"))?;
        let seconds: f64 = caps[5].parse().map_err(|_| malformed("invalid seconds"))?;

        Timestamp::from_ymd_hms(year, month, day, hour, minute, seconds)
            .map_err(|e| CatalogError::malformed_header(event_index, e.to_string()))
    }
}

impl BulletinDecoder for PositionalDecoder {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn parse_header(&self, group: &RawEventGroup<'_>) -> Result<DecodedHeader> {
        let line = group
            .header_line()
            .map(str::trim)
            .ok_or_else(|| CatalogError::malformed_header(group.index, "empty event group"))?;

        let origin_time = Self::parse_origin_time(line, group.index)?;

        let (latitude_deg, longitude_deg, depth_km) = match LOCATION_PATTERN.captures(line) {
            Some(caps) => (
                parse_optional_f64(&caps[1]),
                parse_optional_f64(&caps[2]),
                parse_optional_f64(&caps[3]),
            ),
            None => (None, None, None),
        };

        let agency_code = AGENCY_AFTER_LOCATION_PATTERN
            .captures(line)
            .or_else(|| AGENCY_AFTER_MARKER_PATTERN.captures(line))
            .map(|caps| caps[1].to_string());

        let (local_magnitude, duration_magnitude) = extract_magnitudes(line);

        Ok(DecodedHeader::new(OriginHeader {
            origin_time,
            latitude_deg,
            longitude_deg,
            depth_km,
            agency_code,
            local_magnitude,
            duration_magnitude,
        }))
    }

    fn parse_pick(&self, line: &str, origin_date: NaiveDate) -> Result<Option<PickRecord>> {
        if !STATION_SHAPE_PATTERN.is_match(line) {
            return Ok(None);
        }

        let caps = PICK_PATTERN.captures(line).ok_or_else(|| {
            CatalogError::malformed_pick(format!("'{}' lacks channel, phase or time", line.trim()))
        })?;

        let station = &caps[1];
        let (hour, minute) = split_hour_minute(&caps[5]).ok_or_else(|| {
            CatalogError::malformed_pick(format!("station {}: invalid hour/minute", station))
        })?;
        let seconds: f64 = caps[6].parse().map_err(|_| {
            CatalogError::malformed_pick(format!(
                "station {}: seconds '{}' is not numeric",
                station, &caps[6]
            ))
        })?;

        let pick_time = Timestamp::from_components(origin_date, hour, minute, seconds)
            .map_err(|e| CatalogError::malformed_pick(format!("station {}: {}", station, e)))?;

        trace!("Decoded {} pick at {} for {}", &caps[3], pick_time, station);

        Ok(Some(PickRecord {
            station_code: station.to_string(),
            channel_code: caps[2].to_string(),
            phase: PhaseCode::normalize(&caps[3]),
            polarity: caps.get(4).and_then(|m| m.as_str().chars().next()),
            pick_time,
        }))
    }
}
