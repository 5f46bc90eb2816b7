//! Core data structures for bulletin decoding and catalog assembly.
//!
//! Decoded fragments (`OriginHeader`, `PickRecord`), the assembled catalog
//! document, station/velocity records and run statistics.

use crate::constants::phases;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Lines of one event, bounded by blank lines in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventGroup<'a> {
    /// 1-based position of the group in the input
    pub index: usize,
    pub lines: Vec<&'a str>,
}

impl<'a> RawEventGroup<'a> {
    /// The conventional header line (first line of the group)
    pub fn header_line(&self) -> Option<&'a str> {
        self.lines.first().copied()
    }

    /// Every line after the header
    pub fn body_lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().skip(1).copied()
    }
}

/// Fields decoded from an event header
#[derive(Debug, Clone, PartialEq)]
pub struct OriginHeader {
    pub origin_time: Timestamp,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub depth_km: Option<f64>,
    pub agency_code: Option<String>,
    pub local_magnitude: Option<f64>,
    pub duration_magnitude: Option<f64>,
}

impl OriginHeader {
    /// Both coordinates are needed before an origin can be published
    pub fn has_coordinates(&self) -> bool {
        self.latitude_deg.is_some() && self.longitude_deg.is_some()
    }
}

/// Header decoder output: origin fields plus the time-derived identifier
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedHeader {
    pub origin: OriginHeader,
    pub public_id: String,
}

impl DecodedHeader {
    pub fn new(origin: OriginHeader) -> Self {
        let public_id = origin.origin_time.public_id();
        Self { origin, public_id }
    }
}

/// Seismic phase label after normalization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhaseCode {
    P,
    S,
    Other(String),
}

impl PhaseCode {
    /// `IP` becomes `P`, `ES` becomes `S` (any case); everything else is kept
    pub fn normalize(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("IP") {
            PhaseCode::P
        } else if raw.eq_ignore_ascii_case("ES") {
            PhaseCode::S
        } else {
            PhaseCode::Other(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PhaseCode::P => phases::P,
            PhaseCode::S => phases::S,
            PhaseCode::Other(code) => code,
        }
    }
}

impl fmt::Display for PhaseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PhaseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One decoded detection line
#[derive(Debug, Clone, PartialEq)]
pub struct PickRecord {
    pub station_code: String,
    pub channel_code: String,
    pub phase: PhaseCode,
    /// First-motion polarity (C, D, ...) when present; decoded but not exported
    pub polarity: Option<char>,
    pub pick_time: Timestamp,
}

// =============================================================================
// Catalog document
// =============================================================================

/// Root of the assembled catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogDocument {
    pub public_id: String,
    pub events: Vec<CatalogEvent>,
}

impl CatalogDocument {
    pub fn new(public_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEvent {
    pub public_id: String,
    /// 1-based position of the source group in the bulletin
    pub event_index: usize,
    pub origin: Origin,
    pub magnitudes: Vec<Magnitude>,
    pub picks: Vec<Pick>,
}

impl CatalogEvent {
    /// Local magnitude if present, otherwise the first magnitude
    pub fn preferred_magnitude(&self) -> Option<&Magnitude> {
        self.magnitudes
            .iter()
            .find(|mag| mag.magnitude_type == MagnitudeType::Local)
            .or_else(|| self.magnitudes.first())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Origin {
    pub public_id: String,
    pub time: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    /// Depth below surface in metres
    pub depth_m: Option<f64>,
    pub agency_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MagnitudeType {
    #[serde(rename = "ML")]
    Local,
    #[serde(rename = "Md")]
    Duration,
}

impl MagnitudeType {
    pub fn code(&self) -> &'static str {
        match self {
            MagnitudeType::Local => "ML",
            MagnitudeType::Duration => "Md",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Magnitude {
    pub public_id: String,
    pub value: f64,
    pub magnitude_type: MagnitudeType,
    pub agency_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaveformId {
    pub network_code: String,
    pub station_code: String,
    pub channel_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub public_id: String,
    pub time: Timestamp,
    pub waveform_id: WaveformId,
    pub phase_hint: PhaseCode,
}

// =============================================================================
// Station / velocity records
// =============================================================================

/// Top of a constant-velocity layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityLayer {
    /// Negative below the surface
    pub top_depth_meters: f64,
    pub p_velocity_km_s: f64,
}

impl VelocityLayer {
    /// Build a layer from a depth given in kilometres below the surface
    pub fn from_depth_km(depth_km: f64, p_velocity_km_s: f64) -> Self {
        let top_depth_meters = -depth_km * 1000.0;
        Self {
            // avoid rendering the surface layer as -0
            top_depth_meters: if top_depth_meters == 0.0 {
                0.0
            } else {
                top_depth_meters
            },
            p_velocity_km_s,
        }
    }

    pub fn depth_below_surface_m(&self) -> f64 {
        -self.top_depth_meters
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCoordinate {
    pub code: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_meters: f64,
}

// =============================================================================
// Statistics
// =============================================================================

/// Outcome counts for one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub groups_seen: usize,
    pub events_processed: usize,
    /// Malformed headers plus events without coordinates
    pub events_skipped: usize,
    pub malformed_headers: usize,
    pub missing_coordinates: usize,
    /// Events dropped by the pick requirement (not counted as skipped)
    pub events_filtered: usize,
    pub picks_decoded: usize,
    pub pick_lines_rejected: usize,
}

/// Outcome counts for a station/velocity file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StationFileStats {
    pub lines_seen: usize,
    pub marker_lines: usize,
    pub velocity_layers: usize,
    pub stations_decoded: usize,
    pub stations_skipped: usize,
    pub unrecognised_lines: usize,
}
