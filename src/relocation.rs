//! Parameter hand-off to the external relocation engine.
//!
//! The relocation solver itself is not part of this crate. It receives one
//! immutable [`RelocationParameters`] value: the layered P-velocity model, the
//! Vp/Vs ratio, station coordinates, forced solver values and the
//! cross-correlation settings.

use crate::config::{CrossCorrelationSettings, RelocationSettings};
use crate::constants::VELOCITY_MODEL_TYPE;
use crate::error::{CatalogError, Result};
use crate::models::{StationCoordinate, VelocityLayer};
use crate::station_file::{StationFile, sort_velocity_layers};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Layered P-velocity model ordered from the surface down
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityModel {
    pub model_type: &'static str,
    pub layer_tops: Vec<VelocityLayer>,
    pub vp_vs_ratio: f64,
}

impl VelocityModel {
    /// Validates ordering and the ratio
    pub fn new(layers: Vec<VelocityLayer>, vp_vs_ratio: f64) -> Result<Self> {
        if !(vp_vs_ratio.is_finite() && vp_vs_ratio > 1.0) {
            return Err(CatalogError::invalid_velocity_model(format!(
                "Vp/Vs ratio must be greater than 1, got {}",
                vp_vs_ratio
            )));
        }

        Ok(Self {
            model_type: VELOCITY_MODEL_TYPE,
            layer_tops: sort_velocity_layers(layers)?,
            vp_vs_ratio,
        })
    }
}

/// Everything the relocation engine needs besides events and waveforms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelocationParameters {
    pub velocity_model: VelocityModel,
    pub stations: Vec<StationCoordinate>,
    pub forced_configuration: BTreeMap<String, f64>,
    pub cross_correlation: CrossCorrelationSettings,
}

impl RelocationParameters {
    pub fn from_station_file(file: StationFile, settings: &RelocationSettings) -> Result<Self> {
        let velocity_model = VelocityModel::new(file.layers, settings.vp_vs_ratio)?;

        info!(
            "Velocity model: {} layers, Vp/Vs {}; {} stations",
            velocity_model.layer_tops.len(),
            velocity_model.vp_vs_ratio,
            file.stations.len()
        );

        Ok(Self {
            velocity_model,
            stations: file.stations,
            forced_configuration: settings.forced_configuration.clone(),
            cross_correlation: settings.cross_correlation.clone(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()? + "\n")?;
        info!("Wrote relocation parameters to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationFileSettings;

    fn layers() -> Vec<VelocityLayer> {
        vec![
            VelocityLayer::from_depth_km(0.4, 6.31),
            VelocityLayer::from_depth_km(0.0, 5.01),
        ]
    }

    #[test]
    fn test_model_sorted_and_typed() {
        let model = VelocityModel::new(layers(), 1.73).unwrap();
        assert_eq!(model.model_type, "layered_p_velocity_with_constant_vp_vs_ratio");
        assert_eq!(model.layer_tops[0].top_depth_meters, 0.0);
        assert_eq!(model.layer_tops[1].top_depth_meters, -400.0);
    }

    #[test]
    fn test_invalid_ratio() {
        assert!(VelocityModel::new(layers(), 0.5).is_err());
        assert!(VelocityModel::new(layers(), f64::NAN).is_err());
    }

    #[test]
    fn test_parameters_json() {
        let file = StationFile::parse(
            "620 7239.24N12420.82E 12\n5.01 0.0\n6.31 0.4\n",
            &StationFileSettings::default(),
        )
        .unwrap();
        let params =
            RelocationParameters::from_station_file(file, &RelocationSettings::default()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&params.to_json().unwrap()).unwrap();
        assert_eq!(
            json["velocity_model"]["model_type"],
            "layered_p_velocity_with_constant_vp_vs_ratio"
        );
        assert_eq!(json["velocity_model"]["vp_vs_ratio"], 1.73);
        assert_eq!(json["velocity_model"]["layer_tops"][1]["top_depth_meters"], -400.0);
        assert_eq!(json["stations"][0]["code"], "620");
        assert_eq!(json["forced_configuration"]["MINOBS"], 4.0);
        assert_eq!(json["cross_correlation"]["max_lag_s"], 0.8);
    }
}
