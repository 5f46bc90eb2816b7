//! Integration tests for station file decoding and relocation parameters

use nordic_catalog::config::{Config, ElevationUnit, StationFileSettings};
use nordic_catalog::error::CatalogError;
use nordic_catalog::relocation::RelocationParameters;
use nordic_catalog::station_file::StationFile;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("STATION0.HYP")
}

#[test]
fn test_read_station_fixture() {
    let file = StationFile::read(&fixture_path(), &StationFileSettings::default()).unwrap();

    let codes: Vec<&str> = file.stations.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, vec!["620", "621", "628", "629"]);

    let station = &file.stations[1];
    assert!((station.latitude_deg - (73.0 + 5.56 / 60.0)).abs() < 1e-9);
    assert!((station.longitude_deg - (126.0 + 33.10 / 60.0)).abs() < 1e-9);
    assert_eq!(station.elevation_meters, 25_000.0);
    assert_eq!(file.stations[3].elevation_meters, 0.0);

    assert_eq!(file.stats.marker_lines, 4);
    assert_eq!(file.stats.stations_skipped, 1);
    assert_eq!(file.stats.unrecognised_lines, 2);
}

#[test]
fn test_fixture_velocity_model() {
    let file = StationFile::read(&fixture_path(), &StationFileSettings::default()).unwrap();

    let tops: Vec<f64> = file.layers.iter().map(|l| l.top_depth_meters).collect();
    assert_eq!(
        tops,
        vec![
            0.0, -400.0, -9500.0, -15000.0, -20300.0, -31000.0, -35000.0, -38700.0, -42100.0,
            -60000.0
        ]
    );
    assert_eq!(file.layers[0].p_velocity_km_s, 5.01);
    assert_eq!(file.layers[9].p_velocity_km_s, 8.5);
}

#[test]
fn test_relocation_parameters_from_fixture() {
    let config = Config::default();
    let file = StationFile::read(&fixture_path(), &config.station_file).unwrap();
    let parameters = RelocationParameters::from_station_file(file, &config.relocation).unwrap();

    assert_eq!(parameters.velocity_model.vp_vs_ratio, 1.73);
    assert_eq!(parameters.stations.len(), 4);
    assert_eq!(parameters.forced_configuration["MINWGHT"], 0.0);
    assert_eq!(parameters.forced_configuration["MAXOBS"], 100.0);
    assert!(parameters.cross_correlation.shift_stations);

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("relocation.json");
    parameters.write_json(&output).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["velocity_model"]["layer_tops"].as_array().map(Vec::len), Some(10));
    assert_eq!(json["cross_correlation"]["filter_min_freq_hz"], 6.0);
    assert_eq!(json["cross_correlation"]["filter_max_freq_hz"], 16.0);
    assert_eq!(json["cross_correlation"]["p_phase_weighting"]["Z"], 1.0);
}

#[test]
fn test_configured_elevation_and_ratio() {
    let mut config_file = NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "[station_file]\nelevation_unit = \"meters\"\n\n[relocation]\nvp_vs_ratio = 1.76"
    )
    .unwrap();

    let config = Config::load(Some(config_file.path())).unwrap();
    assert_eq!(config.station_file.elevation_unit, ElevationUnit::Meters);

    let file = StationFile::read(&fixture_path(), &config.station_file).unwrap();
    assert_eq!(file.stations[0].elevation_meters, 12.0);

    let parameters = RelocationParameters::from_station_file(file, &config.relocation).unwrap();
    assert_eq!(parameters.velocity_model.vp_vs_ratio, 1.76);
}

#[test]
fn test_station_file_without_layers() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "RESET TEST(02)=500.0\n  620 7239.24N12420.82E 12\nBER").unwrap();

    let result = StationFile::read(file.path(), &StationFileSettings::default());
    assert!(matches!(result, Err(CatalogError::EmptyVelocityModel)));
}

#[test]
fn test_missing_station_file() {
    let result = StationFile::read(
        &PathBuf::from("/nonexistent/STATION0.HYP"),
        &StationFileSettings::default(),
    );
    assert!(matches!(result, Err(CatalogError::ReadFailed { .. })));
}
