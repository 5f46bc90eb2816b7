//! Configuration management and validation.
//!
//! Configuration is an immutable value built once at startup: defaults,
//! optionally overridden by a TOML file, then by command-line flags through
//! the `with_*` builders. Every section can be omitted from the file.
//!
//! ```toml
//! decoder = "positional"
//!
//! [catalog]
//! resource_prefix = "smi:local"
//! network_code = "SI"
//! require_picks = true
//!
//! [relocation]
//! vp_vs_ratio = 1.75
//!
//! [relocation.forced_configuration]
//! MAXDIST = 150.0
//! ```

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_FORCED_CONFIGURATION, DEFAULT_MARKER_PREFIXES,
    DEFAULT_NETWORK_CODE, DEFAULT_RESOURCE_PREFIX, DEFAULT_VP_VS_RATIO, cross_correlation,
};
use crate::decoder::DecoderKind;
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Global configuration for conversion runs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bulletin dialect used to decode headers and picks
    pub decoder: DecoderKind,

    /// Catalog output settings
    pub catalog: CatalogSettings,

    /// Station/velocity file settings
    pub station_file: StationFileSettings,

    /// Parameters handed to the relocation collaborator
    pub relocation: RelocationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Prefix of every resource identifier in the output document
    pub resource_prefix: String,

    /// Network code written into pick waveform identifiers
    pub network_code: String,

    /// Drop events that end up without any pick
    pub require_picks: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            resource_prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
            network_code: DEFAULT_NETWORK_CODE.to_string(),
            require_picks: false,
        }
    }
}

/// Unit of the elevation column in station lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationUnit {
    #[default]
    Kilometers,
    Meters,
}

impl ElevationUnit {
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            ElevationUnit::Kilometers => value * 1000.0,
            ElevationUnit::Meters => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationFileSettings {
    /// Lines starting with any of these are control markers
    pub marker_prefixes: Vec<String>,

    pub elevation_unit: ElevationUnit,
}

impl Default for StationFileSettings {
    fn default() -> Self {
        Self {
            marker_prefixes: DEFAULT_MARKER_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            elevation_unit: ElevationUnit::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocationSettings {
    /// P to S velocity ratio applied to the whole model
    pub vp_vs_ratio: f64,

    /// Solver parameters overridden regardless of solver defaults
    pub forced_configuration: BTreeMap<String, f64>,

    pub cross_correlation: CrossCorrelationSettings,
}

impl Default for RelocationSettings {
    fn default() -> Self {
        Self {
            vp_vs_ratio: DEFAULT_VP_VS_RATIO,
            forced_configuration: DEFAULT_FORCED_CONFIGURATION
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
            cross_correlation: CrossCorrelationSettings::default(),
        }
    }
}

/// Waveform cross-correlation window and filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossCorrelationSettings {
    pub time_before_s: f64,
    pub time_after_s: f64,
    pub max_lag_s: f64,
    pub filter_min_freq_hz: f64,
    pub filter_max_freq_hz: f64,
    /// Channel component weights for P picks
    pub p_phase_weighting: BTreeMap<String, f64>,
    /// Channel component weights for S picks
    pub s_phase_weighting: BTreeMap<String, f64>,
    pub min_allowed_cross_corr_coeff: f64,
    /// Shift stations so the deepest sits at elevation zero
    pub shift_stations: bool,
}

impl Default for CrossCorrelationSettings {
    fn default() -> Self {
        let vertical_only = BTreeMap::from([("Z".to_string(), 1.0)]);
        Self {
            time_before_s: cross_correlation::TIME_BEFORE_S,
            time_after_s: cross_correlation::TIME_AFTER_S,
            max_lag_s: cross_correlation::MAX_LAG_S,
            filter_min_freq_hz: cross_correlation::FILTER_MIN_HZ,
            filter_max_freq_hz: cross_correlation::FILTER_MAX_HZ,
            p_phase_weighting: vertical_only.clone(),
            s_phase_weighting: vertical_only,
            min_allowed_cross_corr_coeff: cross_correlation::MIN_ALLOWED_COEFFICIENT,
            shift_stations: true,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, the user config file, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// `<user config dir>/nordic-catalog/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::read_failed(path, e))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CatalogError::configuration(format!("invalid configuration file: {}", e)))
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.catalog.resource_prefix.trim().is_empty() {
            return Err(CatalogError::configuration(
                "catalog.resource_prefix must not be empty",
            ));
        }
        if self.catalog.network_code.trim().is_empty() {
            return Err(CatalogError::configuration(
                "catalog.network_code must not be empty",
            ));
        }
        if !(self.relocation.vp_vs_ratio.is_finite() && self.relocation.vp_vs_ratio > 1.0) {
            return Err(CatalogError::configuration(format!(
                "relocation.vp_vs_ratio must be greater than 1, got {}",
                self.relocation.vp_vs_ratio
            )));
        }

        let cc = &self.relocation.cross_correlation;
        if cc.filter_min_freq_hz >= cc.filter_max_freq_hz {
            return Err(CatalogError::configuration(format!(
                "cross-correlation filter band {}-{} Hz is empty",
                cc.filter_min_freq_hz, cc.filter_max_freq_hz
            )));
        }
        if !(0.0..=1.0).contains(&cc.min_allowed_cross_corr_coeff) {
            return Err(CatalogError::configuration(
                "cross_correlation.min_allowed_cross_corr_coeff must be within 0..=1",
            ));
        }

        Ok(())
    }

    pub fn with_decoder(mut self, decoder: DecoderKind) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_require_picks(mut self, require_picks: bool) -> Self {
        self.catalog.require_picks = require_picks;
        self
    }

    pub fn with_resource_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.catalog.resource_prefix = prefix.into();
        self
    }

    pub fn with_network_code(mut self, network_code: impl Into<String>) -> Self {
        self.catalog.network_code = network_code.into();
        self
    }

    pub fn with_vp_vs_ratio(mut self, vp_vs_ratio: f64) -> Self {
        self.relocation.vp_vs_ratio = vp_vs_ratio;
        self
    }

    pub fn with_elevation_unit(mut self, unit: ElevationUnit) -> Self {
        self.station_file.elevation_unit = unit;
        self
    }
}
