//! Fixed-column bulletin dialect.
//!
//! The calendar date and time of day come from the event identifier line
//! (`ID:YYYYMMDDhhmmss`), which is reliable even when the type-1 header line
//! is misaligned. Fractional seconds, location, depth and agency are read from
//! fixed columns of the first line of the group.

use super::{BulletinDecoder, column, extract_magnitudes, parse_optional_f64};
use crate::constants::{ID_LINE_MARKER, header_columns, pick_columns};
use crate::error::{CatalogError, Result};
use crate::models::{DecodedHeader, OriginHeader, PhaseCode, PickRecord, RawEventGroup};
use crate::time::Timestamp;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ID:(\d{4})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})").expect("valid ID regex")
});

static AGENCY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s([A-Z]{3})\s").expect("valid agency regex"));

/// Column 80 of a Nordic line holds its record type
const LINE_TYPE_COLUMN: usize = 79;

/// Record types that never carry a phase reading
const NON_PHASE_LINE_TYPES: &[char] = &['1', '2', '3', '5', '6', '7', 'E', 'F', 'H', 'I', 'M'];

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedColumnDecoder;

impl FixedColumnDecoder {
    pub fn new() -> Self {
        Self
    }

    fn is_non_phase_line(line: &str) -> bool {
        line.as_bytes()
            .get(LINE_TYPE_COLUMN)
            .is_some_and(|&b| NON_PHASE_LINE_TYPES.contains(&(b as char)))
    }
}

impl BulletinDecoder for FixedColumnDecoder {
    fn name(&self) -> &'static str {
        "fixed-column"
    }

    fn parse_header(&self, group: &RawEventGroup<'_>) -> Result<DecodedHeader> {
        let header = group
            .header_line()
            .ok_or_else(|| CatalogError::malformed_header(group.index, "empty event group"))?;

        let id_caps = group
            .lines
            .iter()
            .find(|line| line.contains(ID_LINE_MARKER))
            .and_then(|line| ID_PATTERN.captures(line))
            .ok_or_else(|| {
                CatalogError::malformed_header(group.index, "no ID:YYYYMMDDhhmmss line in event")
            })?;

        // every capture is 2-4 ASCII digits, so these parses cannot fail
        let field = |i: usize| id_caps[i].parse::<u32>().unwrap_or_default();
        let year = id_caps[1].parse::<i32>().unwrap_or_default();
        let (month, day, hour, minute, id_seconds) = (field(2), field(3), field(4), field(5), field(6));

        // the header keeps the fractional part the ID line drops
        let seconds = parse_optional_f64(column(header, header_columns::SECONDS))
            .unwrap_or(f64::from(id_seconds));

        let origin_time = Timestamp::from_ymd_hms(year, month, day, hour, minute, seconds)
            .map_err(|e| CatalogError::malformed_header(group.index, e.to_string()))?;

        let (local_magnitude, duration_magnitude) = extract_magnitudes(header);

        let origin = OriginHeader {
            origin_time,
            latitude_deg: parse_optional_f64(column(header, header_columns::LATITUDE)),
            longitude_deg: parse_optional_f64(column(header, header_columns::LONGITUDE)),
            depth_km: parse_optional_f64(column(header, header_columns::DEPTH)),
            agency_code: AGENCY_PATTERN
                .captures(header)
                .map(|caps| caps[1].to_string()),
            local_magnitude,
            duration_magnitude,
        };

        Ok(DecodedHeader::new(origin))
    }

    fn parse_pick(&self, line: &str, origin_date: NaiveDate) -> Result<Option<PickRecord>> {
        let station = column(line, pick_columns::STATION);
        if station.is_empty()
            || line.len() < pick_columns::MIN_LINE_WIDTH
            || Self::is_non_phase_line(line)
        {
            return Ok(None);
        }

        let required = |range, name: &str| {
            let value = column(line, range);
            if value.is_empty() {
                Err(CatalogError::malformed_pick(format!(
                    "station {}: blank {}",
                    station, name
                )))
            } else {
                Ok(value)
            }
        };

        let channel = required(pick_columns::CHANNEL, "channel")?;
        let phase = required(pick_columns::PHASE, "phase")?;
        let hour = required(pick_columns::HOUR, "hour")?;
        let minute = required(pick_columns::MINUTE, "minute")?;
        let seconds = required(pick_columns::SECONDS, "seconds")?;

        let numeric_error = |name: &str, value: &str| {
            CatalogError::malformed_pick(format!("station {}: {} '{}' is not numeric", station, name, value))
        };
        let hour: u32 = hour.parse().map_err(|_| numeric_error("hour", hour))?;
        let minute: u32 = minute.parse().map_err(|_| numeric_error("minute", minute))?;
        let seconds: f64 = seconds
            .parse()
            .map_err(|_| numeric_error("seconds", seconds))?;

        let pick_time = Timestamp::from_components(origin_date, hour, minute, seconds).map_err(
            |e| CatalogError::malformed_pick(format!("station {}: {}", station, e)),
        )?;

        let polarity = line
            .as_bytes()
            .get(pick_columns::POLARITY)
            .map(|&b| b as char)
            .filter(|c| c.is_ascii_alphabetic());

        trace!("Decoded {} pick at {} for {}", phase, pick_time, station);

        Ok(Some(PickRecord {
            station_code: station.to_string(),
            channel_code: channel.to_string(),
            phase: PhaseCode::normalize(phase),
            polarity,
            pick_time,
        }))
    }
}
