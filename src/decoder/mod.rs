//! Bulletin decoding strategies
//!
//! Two dialects of the nominal Nordic layout are in circulation and they
//! disagree on where the fields live. Each dialect is a [`BulletinDecoder`];
//! the caller chooses one explicitly through [`DecoderKind`], there is no
//! automatic detection.
//!
//! ## Strategies
//!
//! - [`fixed_column`] - date/time from the `ID:` line of the event, all other
//!   header and pick fields from fixed column ranges
//! - [`positional`] - whitespace-delimited regular patterns anchored on the
//!   start of the header and pick lines
//!
//! ## Usage
//!
//! ```rust
//! use nordic_catalog::decoder::DecoderKind;
//! use nordic_catalog::segment::segment_events;
//!
//! let text = "2016  8 3 0737 54.5 L  72.790 127.098 10.8  BER  4 0.3 0.5LBER 0.4CBER        1\n";
//! let decoder = DecoderKind::Positional.decoder();
//! let group = segment_events(text).next().unwrap();
//! let header = decoder.parse_header(&group).unwrap();
//! assert_eq!(header.origin.agency_code.as_deref(), Some("BER"));
//! ```

pub mod fixed_column;
pub mod positional;

pub use fixed_column::FixedColumnDecoder;
pub use positional::PositionalDecoder;

use crate::error::Result;
use crate::models::{DecodedHeader, PickRecord, RawEventGroup};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

/// Capability shared by both bulletin dialects
pub trait BulletinDecoder: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Decode the origin of one event group
    ///
    /// Fails with `MalformedHeader` when no date/time can be recovered.
    /// Unparseable location fields are returned as `None`, never as zero.
    fn parse_header(&self, group: &RawEventGroup<'_>) -> Result<DecodedHeader>;

    /// Decode one line as a pick, dating it with the origin's calendar day
    ///
    /// `Ok(None)` means the line is not a pick line at all. A line that looks
    /// like a pick but has a blank, unparseable or out-of-range required field
    /// fails with `MalformedPick`.
    fn parse_pick(&self, line: &str, origin_date: NaiveDate) -> Result<Option<PickRecord>>;
}

/// Selects the decoding strategy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DecoderKind {
    /// Dates from the `ID:` line, fields from fixed columns
    #[default]
    FixedColumn,
    /// Fields from whitespace-delimited patterns
    Positional,
}

impl DecoderKind {
    pub fn decoder(self) -> Box<dyn BulletinDecoder> {
        match self {
            DecoderKind::FixedColumn => Box::new(FixedColumnDecoder::new()),
            DecoderKind::Positional => Box::new(PositionalDecoder::new()),
        }
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderKind::FixedColumn => f.write_str("fixed-column"),
            DecoderKind::Positional => f.write_str("positional"),
        }
    }
}

// =============================================================================
// Helpers shared by both strategies
// =============================================================================

static LOCAL_MAGNITUDE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)L").expect("valid local magnitude regex"));

static DURATION_MAGNITUDE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)C").expect("valid duration magnitude regex"));

/// Trimmed contents of a column range, empty when the line is too short
pub(crate) fn column(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    if range.start >= end {
        return "";
    }
    line.get(range.start..end).map(str::trim).unwrap_or("")
}

/// Parse a number, treating blanks and garbage as absent
pub(crate) fn parse_optional_f64(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Local (`0.5L`) and duration (`0.4C`) magnitudes anywhere on the line
pub(crate) fn extract_magnitudes(line: &str) -> (Option<f64>, Option<f64>) {
    let find = |pattern: &Regex| {
        pattern
            .captures(line)
            .and_then(|caps| parse_optional_f64(&caps[1]))
    };
    (
        find(&LOCAL_MAGNITUDE_PATTERN),
        find(&DURATION_MAGNITUDE_PATTERN),
    )
}

/// Split a packed `hmm`/`hhmm` field into hour and minute
pub(crate) fn split_hour_minute(packed: &str) -> Option<(u32, u32)> {
    let (hour, minute) = match packed.len() {
        3 => packed.split_at(1),
        4 => packed.split_at(2),
        _ => return None,
    };
    Some((hour.parse().ok()?, minute.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_clamps_to_line() {
        assert_eq!(column("abcdef", 1..3), "bc");
        assert_eq!(column("abcdef", 4..10), "ef");
        assert_eq!(column("abc", 5..8), "");
        assert_eq!(column("  x  ", 0..5), "x");
    }

    #[test]
    fn test_column_non_ascii_is_blank() {
        // a multi-byte char straddling the column boundary
        assert_eq!(column("aé", 0..2), "");
    }

    #[test]
    fn test_magnitudes_independent() {
        let line = " 2016  8 3 0737 54.5 L  72.790 127.098 10.8  BER  4 0.3 0.5LBER 0.4CBER        1";
        assert_eq!(extract_magnitudes(line), (Some(0.5), Some(0.4)));

        assert_eq!(extract_magnitudes("1.2LBER"), (Some(1.2), None));
        assert_eq!(extract_magnitudes("2.1CBER"), (None, Some(2.1)));
        assert_eq!(extract_magnitudes("no magnitudes"), (None, None));
    }

    #[test]
    fn test_split_hour_minute() {
        assert_eq!(split_hour_minute("738"), Some((7, 38)));
        assert_eq!(split_hour_minute("1524"), Some((15, 24)));
        assert_eq!(split_hour_minute("0737"), Some((7, 37)));
        assert_eq!(split_hour_minute("73"), None);
        assert_eq!(split_hour_minute("12345"), None);
    }

    #[test]
    fn test_decoder_kind_names() {
        assert_eq!(DecoderKind::default(), DecoderKind::FixedColumn);
        assert_eq!(DecoderKind::FixedColumn.decoder().name(), "fixed-column");
        assert_eq!(DecoderKind::Positional.decoder().name(), "positional");
        assert_eq!(DecoderKind::Positional.to_string(), "positional");
    }
}
