//! Nordic Catalog Library
//!
//! Converts seismic bulletins in the Nordic fixed-width text layout into a
//! QuakeML 1.2 event catalog, and extracts the station list and layered
//! P-velocity model that a relocation engine needs.
//!
//! This library provides tools for:
//! - Splitting a bulletin into blank-line separated event groups
//! - Decoding event headers and phase picks with one of two dialect decoders
//! - Normalizing Nordic time fields and packed station coordinates
//! - Assembling a catalog document with per-event failure isolation
//! - Rendering the catalog as QuakeML or JSON
//! - Building relocation parameters from a station/velocity file

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod coordinates;
pub mod decoder;
pub mod error;
pub mod models;
pub mod quakeml;
pub mod relocation;
pub mod segment;
pub mod station_file;
pub mod time;

// Re-export commonly used types
pub use catalog::{AssembledCatalog, CatalogAssembler, OutputFormat, PickSummary};
pub use config::Config;
pub use decoder::{BulletinDecoder, DecoderKind};
pub use error::{CatalogError, Result};
pub use models::{CatalogDocument, CatalogEvent, ConversionStats, PhaseCode, PickRecord};
pub use relocation::RelocationParameters;
pub use station_file::StationFile;
pub use time::Timestamp;
