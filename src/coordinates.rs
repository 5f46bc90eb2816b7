//! Degree/minute/hemisphere coordinate decoding.
//!
//! Station files encode a position as `DDMM.MMh` immediately followed by
//! `DDDMM.MMh`, e.g. `7239.24N12420.82E`.

use crate::error::{CatalogError, Result};
use regex::Regex;
use std::sync::LazyLock;

static LATITUDE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2}\.\d{2})([NS])").expect("valid latitude regex"));

static LONGITUDE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})(\d{2}\.\d{2})([EW])").expect("valid longitude regex"));

/// Decode a packed latitude/longitude string into signed decimal degrees
///
/// Both halves must match; there is no partial result.
pub fn decode_coordinates(value: &str) -> Result<(f64, f64)> {
    let invalid = || CatalogError::invalid_coordinate_string(value);

    let lat_caps = LATITUDE_PATTERN.captures(value).ok_or_else(invalid)?;
    let lat_end = lat_caps.get(0).map_or(0, |m| m.end());
    let latitude = to_decimal(&lat_caps[1], &lat_caps[2], &lat_caps[3] == "S").ok_or_else(invalid)?;

    let lon_caps = LONGITUDE_PATTERN
        .captures(&value[lat_end..])
        .ok_or_else(invalid)?;
    let longitude =
        to_decimal(&lon_caps[1], &lon_caps[2], &lon_caps[3] == "W").ok_or_else(invalid)?;

    Ok((latitude, longitude))
}

fn to_decimal(degrees: &str, minutes: &str, negative: bool) -> Option<f64> {
    let degrees: f64 = degrees.parse().ok()?;
    let minutes: f64 = minutes.parse().ok()?;
    let value = degrees + minutes / 60.0;
    Some(if negative { -value } else { value })
}
