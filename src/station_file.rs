//! Station and velocity model extraction from a station file.
//!
//! The file mixes three kinds of lines:
//! - station lines: `620 7239.24N12420.82E 12` (code, packed coordinates, elevation)
//! - velocity lines: `5.01 0.0` (P velocity in km/s, layer top in km)
//! - control markers and labels (`RESET TEST ...`, agency codes, comments)
//!
//! Markers and unrecognised lines are skipped without error.

use crate::config::StationFileSettings;
use crate::coordinates::decode_coordinates;
use crate::error::{CatalogError, Result};
use crate::models::{StationCoordinate, StationFileStats, VelocityLayer};
use regex::Regex;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// `DDMM.M...` at the start, or any hemisphere letter
static PACKED_COORDINATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}\.\d|[NSEW]").expect("valid coordinate shape regex"));

/// Decoded contents of a station file
#[derive(Debug, Clone, PartialEq)]
pub struct StationFile {
    pub stations: Vec<StationCoordinate>,
    /// Sorted by increasing depth below the surface
    pub layers: Vec<VelocityLayer>,
    pub stats: StationFileStats,
}

impl StationFile {
    pub fn read(path: &Path, settings: &StationFileSettings) -> Result<Self> {
        info!("Reading station file: {}", path.display());
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::read_failed(path, e))?;
        Self::parse(&content, settings)
    }

    /// Decode stations and the velocity table; fails when no layer is present
    pub fn parse(content: &str, settings: &StationFileSettings) -> Result<Self> {
        let mut stats = StationFileStats::default();
        let mut candidates = Vec::new();

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            stats.lines_seen += 1;
            if is_marker(line, &settings.marker_prefixes) {
                stats.marker_lines += 1;
            } else {
                candidates.push(line);
            }
        }

        let layers = extract_velocity_layers(candidates.iter().copied())?;
        stats.velocity_layers = layers.len();

        let mut stations = Vec::new();
        for line in candidates
            .into_iter()
            .filter(|line| parse_velocity_line(line).is_none())
        {
            if !looks_like_station(line) {
                stats.unrecognised_lines += 1;
                continue;
            }

            match parse_station_line(line, settings) {
                Ok(station) => stations.push(station),
                Err(e) => {
                    warn!("Skipping station line '{}': {}", line, e);
                    stats.stations_skipped += 1;
                }
            }
        }
        stats.stations_decoded = stations.len();

        debug!(
            "Station file: {} stations, {} layers, {} skipped",
            stats.stations_decoded, stats.velocity_layers, stats.stations_skipped
        );

        Ok(Self {
            stations,
            layers,
            stats,
        })
    }
}

/// Extract the velocity table from arbitrary lines
///
/// Only lines made of exactly two numeric tokens count. The result is sorted
/// by increasing depth below the surface.
pub fn extract_velocity_layers<'a, I>(lines: I) -> Result<Vec<VelocityLayer>>
where
    I: IntoIterator<Item = &'a str>,
{
    let layers = lines
        .into_iter()
        .filter_map(|line| parse_velocity_line(line.trim()))
        .collect();
    sort_velocity_layers(layers)
}

/// `velocity depth_km` with exactly two numeric tokens
pub fn parse_velocity_line(line: &str) -> Option<VelocityLayer> {
    let mut tokens = line.split_whitespace();
    let (velocity, depth, rest) = (tokens.next()?, tokens.next()?, tokens.next());
    if rest.is_some() {
        return None;
    }

    let velocity: f64 = velocity.parse().ok().filter(|v: &f64| v.is_finite())?;
    let depth_km: f64 = depth.parse().ok().filter(|d: &f64| d.is_finite())?;
    Some(VelocityLayer::from_depth_km(depth_km, velocity))
}

/// Order layers from the surface down and reject duplicate depths
pub fn sort_velocity_layers(mut layers: Vec<VelocityLayer>) -> Result<Vec<VelocityLayer>> {
    if layers.is_empty() {
        return Err(CatalogError::EmptyVelocityModel);
    }

    layers.sort_by(|a, b| {
        a.depth_below_surface_m()
            .partial_cmp(&b.depth_below_surface_m())
            .unwrap_or(Ordering::Equal)
    });

    if let Some(pair) = layers
        .windows(2)
        .find(|pair| pair[0].top_depth_meters == pair[1].top_depth_meters)
    {
        return Err(CatalogError::invalid_velocity_model(format!(
            "duplicate layer top at {} m",
            pair[0].top_depth_meters
        )));
    }

    Ok(layers)
}

/// `CODE DDMM.MMhDDDMM.MMh [elevation]`
pub fn parse_station_line(line: &str, settings: &StationFileSettings) -> Result<StationCoordinate> {
    let mut tokens = line.split_whitespace();
    let code = tokens
        .next()
        .ok_or_else(|| CatalogError::invalid_coordinate_string(line))?;
    let packed = tokens
        .next()
        .ok_or_else(|| CatalogError::invalid_coordinate_string(line))?;

    let (latitude_deg, longitude_deg) = decode_coordinates(packed)?;

    let elevation = match tokens.next() {
        Some(value) => value.parse::<f64>().unwrap_or_else(|_| {
            warn!("Station {}: unreadable elevation '{}', using 0", code, value);
            0.0
        }),
        None => 0.0,
    };

    Ok(StationCoordinate {
        code: code.to_string(),
        latitude_deg,
        longitude_deg,
        elevation_meters: settings.elevation_unit.to_meters(elevation),
    })
}

fn is_marker(line: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| line.starts_with(prefix.as_str()))
}

/// A code followed by something shaped like a packed coordinate
///
/// Whether the coordinate actually decodes is left to `parse_station_line`,
/// so a bad hemisphere letter is a skipped station, not an unknown line.
fn looks_like_station(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    matches!(
        (tokens.next(), tokens.next()),
        (Some(_), Some(packed)) if PACKED_COORDINATE_SHAPE.is_match(packed)
    )
}
