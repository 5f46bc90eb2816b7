//! Command-line interface definitions and logging setup.

use crate::catalog::OutputFormat;
use crate::config::{Config, ElevationUnit};
use crate::constants::DEFAULT_LOG_LEVEL;
use crate::decoder::DecoderKind;
use crate::error::{CatalogError, Result};
use clap::{Parser, Subcommand};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Convert Nordic seismic bulletins into a QuakeML event catalog
///
/// Reads bulletins in the Nordic fixed-width text layout, decodes event
/// origins, magnitudes and phase picks, and writes a QuakeML 1.2 catalog.
/// Station/velocity files are turned into relocation parameters.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nordic-catalog",
    version,
    about = "Convert Nordic seismic bulletins into a QuakeML event catalog"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// TOML configuration file; defaults to <config dir>/nordic-catalog/config.toml
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only show errors
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also append log records to this file
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert a bulletin into a catalog document
    Convert(ConvertArgs),
    /// Build relocation parameters from a station/velocity file
    Velocity(VelocityArgs),
    /// Print per-event pick counts of a bulletin
    Picks(PicksArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Bulletin file in Nordic format
    #[arg(value_name = "BULLETIN")]
    pub input: PathBuf,

    /// Output file; defaults to the bulletin path with a .xml or .json extension
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Bulletin dialect (overrides the configuration file)
    #[arg(short = 'd', long = "decoder", value_enum)]
    pub decoder: Option<DecoderKind>,

    #[arg(short = 'f', long = "format", value_enum, default_value = "quakeml")]
    pub format: OutputFormat,

    /// Drop events without any decoded pick
    #[arg(long = "require-picks")]
    pub require_picks: bool,

    /// Prefix of resource identifiers
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Network code written into pick waveform identifiers
    #[arg(long = "network", value_name = "CODE")]
    pub network: Option<String>,
}

impl ConvertArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension(self.format.extension()))
    }

    /// Layer command-line overrides on top of the loaded configuration
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(decoder) = self.decoder {
            config = config.with_decoder(decoder);
        }
        if self.require_picks {
            config = config.with_require_picks(true);
        }
        if let Some(prefix) = &self.prefix {
            config = config.with_resource_prefix(prefix.as_str());
        }
        if let Some(network) = &self.network {
            config = config.with_network_code(network.as_str());
        }
        config
    }
}

#[derive(Debug, Clone, Parser)]
pub struct VelocityArgs {
    /// Station/velocity file
    #[arg(value_name = "STATION_FILE")]
    pub input: PathBuf,

    /// Output JSON file; printed to stdout when omitted
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Vp/Vs ratio (overrides the configuration file)
    #[arg(long = "vp-vs", value_name = "RATIO")]
    pub vp_vs: Option<f64>,

    /// Unit of the station elevation column
    #[arg(long = "elevation-unit", value_parser = parse_elevation_unit)]
    pub elevation_unit: Option<ElevationUnit>,
}

impl VelocityArgs {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(ratio) = self.vp_vs {
            config = config.with_vp_vs_ratio(ratio);
        }
        if let Some(unit) = self.elevation_unit {
            config = config.with_elevation_unit(unit);
        }
        config
    }
}

#[derive(Debug, Clone, Parser)]
pub struct PicksArgs {
    /// Bulletin file in Nordic format
    #[arg(value_name = "BULLETIN")]
    pub input: PathBuf,

    #[arg(short = 'd', long = "decoder", value_enum)]
    pub decoder: Option<DecoderKind>,
}

fn parse_elevation_unit(value: &str) -> std::result::Result<ElevationUnit, String> {
    match value.to_ascii_lowercase().as_str() {
        "km" | "kilometers" => Ok(ElevationUnit::Kilometers),
        "m" | "meters" => Ok(ElevationUnit::Meters),
        other => Err(format!("unknown elevation unit '{}' (expected km or m)", other)),
    }
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => DEFAULT_LOG_LEVEL,
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress bars are hidden in quiet mode
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Set up structured logging on stderr, plus an optional append-only file
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nordic_catalog={}", log_level)));

    let file_layer = match &args.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| CatalogError::configuration(format!("failed to initialise logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            CatalogError::configuration(format!(
                "log file {} cannot be opened for appending: {}",
                path.display(),
                e
            ))
        })
}
