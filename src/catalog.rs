//! Catalog assembly.
//!
//! Drives segmentation and decoding over a whole bulletin and collects the
//! surviving events into a [`CatalogDocument`]. Failures are isolated per
//! event group (header problems) and per line (pick problems); they are
//! logged, counted in [`ConversionStats`] and never abort the run.

use crate::config::{CatalogSettings, Config};
use crate::constants::phases;
use crate::decoder::BulletinDecoder;
use crate::error::{CatalogError, Result};
use crate::models::{
    CatalogDocument, CatalogEvent, ConversionStats, DecodedHeader, Magnitude, MagnitudeType,
    Origin, PhaseCode, Pick, RawEventGroup, WaveformId,
};
use crate::quakeml::render_quakeml;
use crate::segment::segment_events;
use chrono::NaiveDate;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Result of one assembly run
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledCatalog {
    pub document: CatalogDocument,
    pub stats: ConversionStats,
}

pub struct CatalogAssembler {
    decoder: Box<dyn BulletinDecoder>,
    settings: CatalogSettings,
}

impl CatalogAssembler {
    pub fn new(decoder: Box<dyn BulletinDecoder>, settings: CatalogSettings) -> Self {
        Self { decoder, settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.decoder.decoder(), config.catalog.clone())
    }

    pub fn decoder_name(&self) -> &'static str {
        self.decoder.name()
    }

    /// Assemble a catalog from the full bulletin text
    pub fn assemble(&self, text: &str) -> AssembledCatalog {
        self.assemble_with_progress(text, None)
    }

    /// Same as [`assemble`](Self::assemble), ticking `progress` once per event group
    pub fn assemble_with_progress(
        &self,
        text: &str,
        progress: Option<&ProgressBar>,
    ) -> AssembledCatalog {
        let mut document = CatalogDocument::new(format!(
            "{}/eventParameters",
            self.settings.resource_prefix
        ));
        let mut stats = ConversionStats::default();
        let mut seen_ids = HashSet::new();

        debug!("Assembling catalog with {} decoder", self.decoder.name());

        for group in segment_events(text) {
            stats.groups_seen += 1;
            if let Some(pb) = progress {
                pb.inc(1);
            }

            let header = match self.decode_origin(&group) {
                Ok(header) => header,
                Err(e) => {
                    match e {
                        CatalogError::MissingCoordinates { .. } => stats.missing_coordinates += 1,
                        _ => stats.malformed_headers += 1,
                    }
                    stats.events_skipped += 1;
                    warn!("Skipping event {}: {}", group.index, e);
                    continue;
                }
            };

            let mut public_id = header.public_id.clone();
            if !seen_ids.insert(public_id.clone()) {
                public_id = format!("{}-{}", header.public_id, group.index);
                debug!(
                    "Event {} shares origin time {} with an earlier event, using {}",
                    group.index, header.public_id, public_id
                );
                seen_ids.insert(public_id.clone());
            }

            let picks = self.decode_picks(&group, header.origin.origin_time.date(), &mut stats);

            if self.settings.require_picks && picks.is_empty() {
                debug!("Event {} ({}) has no picks, filtered", group.index, public_id);
                stats.events_filtered += 1;
                continue;
            }

            stats.picks_decoded += picks.len();
            document
                .events
                .push(self.build_event(&group, &header, &public_id, picks));
            stats.events_processed += 1;
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        info!(
            "Catalog assembled: {} processed, {} skipped",
            stats.events_processed, stats.events_skipped
        );

        AssembledCatalog { document, stats }
    }

    /// Header decode plus the coordinate requirement
    fn decode_origin(&self, group: &RawEventGroup<'_>) -> Result<DecodedHeader> {
        let header = self.decoder.parse_header(group)?;
        if !header.origin.has_coordinates() {
            return Err(CatalogError::missing_coordinates(
                group.index,
                header.public_id,
            ));
        }
        Ok(header)
    }

    fn decode_picks(
        &self,
        group: &RawEventGroup<'_>,
        origin_date: NaiveDate,
        stats: &mut ConversionStats,
    ) -> Vec<Pick> {
        let mut picks = Vec::new();

        for line in group.body_lines() {
            match self.decoder.parse_pick(line, origin_date) {
                Ok(Some(record)) => {
                    picks.push(Pick {
                        public_id: format!(
                            "{}/e{}p{}",
                            self.settings.resource_prefix,
                            group.index,
                            picks.len() + 1
                        ),
                        time: record.pick_time,
                        waveform_id: WaveformId {
                            network_code: self.settings.network_code.clone(),
                            station_code: record.station_code,
                            channel_code: record.channel_code,
                        },
                        phase_hint: record.phase,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    stats.pick_lines_rejected += 1;
                    debug!("Event {}: {}", group.index, e);
                }
            }
        }

        picks
    }

    fn build_event(
        &self,
        group: &RawEventGroup<'_>,
        header: &DecodedHeader,
        public_id: &str,
        picks: Vec<Pick>,
    ) -> CatalogEvent {
        let prefix = &self.settings.resource_prefix;
        let origin = &header.origin;

        let magnitudes = [
            (origin.local_magnitude, MagnitudeType::Local),
            (origin.duration_magnitude, MagnitudeType::Duration),
        ]
        .into_iter()
        .filter_map(|(value, magnitude_type)| {
            value.map(|value| Magnitude {
                public_id: format!("{}/mag/{}/{}", prefix, public_id, magnitude_type.code()),
                value,
                magnitude_type,
                agency_id: origin.agency_code.clone(),
            })
        })
        .collect();

        CatalogEvent {
            public_id: format!("{}/event/{}", prefix, public_id),
            event_index: group.index,
            origin: Origin {
                public_id: format!("{}/origin/{}", prefix, public_id),
                time: origin.origin_time,
                // both present, checked in decode_origin
                latitude: origin.latitude_deg.unwrap_or_default(),
                longitude: origin.longitude_deg.unwrap_or_default(),
                depth_m: origin.depth_km.map(|km| (km * 1000.0).round()),
                agency_id: origin.agency_code.clone(),
            },
            magnitudes,
            picks,
        }
    }
}

/// Serialization format of the catalog document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[value(name = "quakeml")]
    QuakeMl,
    Json,
}

impl OutputFormat {
    pub fn render(self, document: &CatalogDocument) -> Result<String> {
        match self {
            OutputFormat::QuakeMl => Ok(render_quakeml(document)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(document)? + "\n"),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::QuakeMl => "xml",
            OutputFormat::Json => "json",
        }
    }
}

/// Pick counts of one event by phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickSummary {
    pub event_index: usize,
    pub event_id: String,
    pub origin_date: NaiveDate,
    pub total: usize,
    pub p: usize,
    pub s: usize,
    pub amplitude: usize,
    pub other: usize,
}

pub fn summarize_picks(document: &CatalogDocument) -> Vec<PickSummary> {
    document
        .events
        .iter()
        .map(|event| {
            let mut summary = PickSummary {
                event_index: event.event_index,
                event_id: event.public_id.clone(),
                origin_date: event.origin.time.date(),
                total: event.picks.len(),
                p: 0,
                s: 0,
                amplitude: 0,
                other: 0,
            };
            for pick in &event.picks {
                match &pick.phase_hint {
                    PhaseCode::P => summary.p += 1,
                    PhaseCode::S => summary.s += 1,
                    PhaseCode::Other(code) if code == phases::AMPLITUDE => summary.amplitude += 1,
                    PhaseCode::Other(_) => summary.other += 1,
                }
            }
            summary
        })
        .collect()
}
