//! Application constants for the Nordic catalog converter
//!
//! Column layouts for the fixed-column bulletin dialect, identifier and
//! namespace defaults for the QuakeML output, and the default relocation
//! parameters handed to the external solver.

// =============================================================================
// Fixed-column layout (0-based, end-exclusive byte ranges)
// =============================================================================

/// Header line (type 1) columns
pub mod header_columns {
    use std::ops::Range;

    /// Origin seconds with fractional part (cols 16-21)
    pub const SECONDS: Range<usize> = 15..21;

    /// Latitude in decimal degrees (cols 24-30)
    pub const LATITUDE: Range<usize> = 23..30;

    /// Longitude in decimal degrees (cols 31-38)
    pub const LONGITUDE: Range<usize> = 30..38;

    /// Depth in kilometres (cols 39-44)
    pub const DEPTH: Range<usize> = 38..44;
}

/// Phase line (type 4) columns
pub mod pick_columns {
    use std::ops::Range;

    pub const STATION: Range<usize> = 0..5;
    pub const CHANNEL: Range<usize> = 6..9;
    pub const PHASE: Range<usize> = 9..15;
    pub const POLARITY: usize = 16;
    pub const HOUR: Range<usize> = 18..20;
    pub const MINUTE: Range<usize> = 20..22;
    pub const SECONDS: Range<usize> = 23..29;

    /// Shortest line that can hold every required field
    pub const MIN_LINE_WIDTH: usize = 29;
}

/// Marker that introduces the `YYYYMMDDhhmmss` event identifier
pub const ID_LINE_MARKER: &str = "ID:";

// =============================================================================
// Catalog output
// =============================================================================

/// Default prefix for QuakeML resource identifiers
pub const DEFAULT_RESOURCE_PREFIX: &str = "smi:local";

/// Default FDSN network code written into pick waveform identifiers
pub const DEFAULT_NETWORK_CODE: &str = "SI";

/// QuakeML envelope namespace
pub const QUAKEML_NAMESPACE: &str = "http://quakeml.org/xmlns/quakeml/1.2";

/// QuakeML basic event description namespace
pub const QUAKEML_BED_NAMESPACE: &str = "http://quakeml.org/xmlns/bed/1.2";

/// Phase hints counted individually in pick summaries
pub mod phases {
    pub const P: &str = "P";
    pub const S: &str = "S";
    pub const AMPLITUDE: &str = "IAML";
}

// =============================================================================
// Station / velocity file
// =============================================================================

/// Lines starting with these prefixes are control markers, not data
pub const DEFAULT_MARKER_PREFIXES: &[&str] = &["RESET"];

// =============================================================================
// Relocation defaults
// =============================================================================

/// Velocity model type understood by the relocation collaborator
pub const VELOCITY_MODEL_TYPE: &str = "layered_p_velocity_with_constant_vp_vs_ratio";

/// Default P to S velocity ratio
pub const DEFAULT_VP_VS_RATIO: f64 = 1.73;

/// Solver values forced regardless of the solver's own defaults
pub const DEFAULT_FORCED_CONFIGURATION: &[(&str, f64)] = &[
    ("MINWGHT", 0.0),
    ("MAXDIST", 200.0),
    ("MAXSEP", 20.0),
    ("MAXNGH", 15.0),
    ("MINLNK", 4.0),
    ("MINOBS", 4.0),
    ("MAXOBS", 100.0),
];

/// Cross-correlation window and filter defaults
pub mod cross_correlation {
    pub const TIME_BEFORE_S: f64 = 2.0;
    pub const TIME_AFTER_S: f64 = 2.0;
    pub const MAX_LAG_S: f64 = 0.8;
    pub const FILTER_MIN_HZ: f64 = 6.0;
    pub const FILTER_MAX_HZ: f64 = 16.0;
    pub const MIN_ALLOWED_COEFFICIENT: f64 = 0.5;
}

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither --verbose nor --quiet is given
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Directory name under the user config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "nordic-catalog";
pub const CONFIG_FILE_NAME: &str = "config.toml";
