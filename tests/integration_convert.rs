//! Integration tests for bulletin conversion
//!
//! Runs the full pipeline (segmentation, decoding, assembly, rendering) over a
//! four-event fixed-column bulletin fixture and over an inline bulletin in the
//! positional dialect.

use nordic_catalog::catalog::{CatalogAssembler, OutputFormat, summarize_picks};
use nordic_catalog::cli::ConvertArgs;
use nordic_catalog::commands::run_convert;
use nordic_catalog::config::{CatalogSettings, Config};
use nordic_catalog::decoder::DecoderKind;
use nordic_catalog::models::PhaseCode;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("collect.out")
}

fn fixture() -> String {
    std::fs::read_to_string(fixture_path()).expect("bulletin fixture")
}

fn fixed_column(settings: CatalogSettings) -> CatalogAssembler {
    CatalogAssembler::new(DecoderKind::FixedColumn.decoder(), settings)
}

/// Every group is accounted for: processed, skipped or filtered
#[test]
fn test_fixture_statistics() {
    let result = fixed_column(CatalogSettings::default()).assemble(&fixture());
    let stats = &result.stats;

    assert_eq!(stats.groups_seen, 4);
    assert_eq!(stats.events_processed, 3);
    assert_eq!(stats.events_skipped, 1);
    assert_eq!(stats.missing_coordinates, 1);
    assert_eq!(stats.malformed_headers, 0);
    assert_eq!(stats.events_filtered, 0);
    assert_eq!(stats.picks_decoded, 4);
    assert_eq!(stats.pick_lines_rejected, 1);
    assert_eq!(
        stats.groups_seen,
        stats.events_processed + stats.events_skipped + stats.events_filtered
    );
}

#[test]
fn test_fixture_events() {
    let result = fixed_column(CatalogSettings::default()).assemble(&fixture());
    let events = &result.document.events;

    let indices: Vec<usize> = events.iter().map(|e| e.event_index).collect();
    assert_eq!(indices, vec![1, 3, 4]);

    let first = &events[0];
    assert_eq!(first.origin.time.to_string(), "2016-08-03T07:37:54.5Z");
    assert_eq!(first.origin.latitude, 72.79);
    assert_eq!(first.origin.longitude, 127.098);
    assert_eq!(first.origin.depth_m, Some(10800.0));
    assert_eq!(first.origin.agency_id.as_deref(), Some("BER"));
    assert_eq!(first.magnitudes.len(), 2);
    assert_eq!(first.preferred_magnitude().map(|m| m.value), Some(0.5));

    let phases: Vec<&PhaseCode> = first.picks.iter().map(|p| &p.phase_hint).collect();
    assert_eq!(
        phases,
        vec![
            &PhaseCode::P,
            &PhaseCode::S,
            &PhaseCode::Other("IAML".to_string())
        ]
    );
    assert_eq!(first.picks[2].waveform_id.station_code, "629");
}

/// A pick after midnight keeps the origin's calendar day
#[test]
fn test_pick_after_midnight_keeps_origin_date() {
    let result = fixed_column(CatalogSettings::default()).assemble(&fixture());
    let event = &result.document.events[1];

    assert_eq!(event.origin.time.to_string(), "2016-08-04T23:58:30.2Z");
    assert_eq!(event.public_id, "smi:local/event/2016080423583020");
    assert_eq!(event.picks.len(), 1);
    assert_eq!(event.picks[0].public_id, "smi:local/e3p1");
    assert_eq!(event.picks[0].time.to_string(), "2016-08-04T00:01:02.5Z");
    assert_eq!(event.picks[0].phase_hint.as_str(), "EP");
}

/// Header seconds of 60.0 wrap to zero without touching the minute
#[test]
fn test_sixty_seconds_header() {
    let result = fixed_column(CatalogSettings::default()).assemble(&fixture());
    let event = &result.document.events[2];

    assert_eq!(event.origin.time.to_string(), "2016-08-05T12:01:00Z");
    assert!(event.picks.is_empty());
    assert_eq!(event.magnitudes.len(), 1);
}

#[test]
fn test_require_picks() {
    let settings = CatalogSettings {
        require_picks: true,
        ..CatalogSettings::default()
    };
    let result = fixed_column(settings).assemble(&fixture());

    assert_eq!(result.stats.events_processed, 2);
    assert_eq!(result.stats.events_filtered, 1);
    assert_eq!(result.stats.events_skipped, 1);
    assert!(result.document.events.iter().all(|e| !e.picks.is_empty()));
}

#[test]
fn test_custom_prefix_and_network() {
    let settings = CatalogSettings {
        resource_prefix: "smi:no.uib".to_string(),
        network_code: "NS".to_string(),
        require_picks: false,
    };
    let result = fixed_column(settings).assemble(&fixture());
    let xml = OutputFormat::QuakeMl.render(&result.document).unwrap();

    assert!(xml.contains("<eventParameters publicID=\"smi:no.uib/eventParameters\">"));
    assert!(xml.contains("<pick publicID=\"smi:no.uib/e1p1\">"));
    assert!(xml.contains("networkCode=\"NS\""));
    assert!(!xml.contains("smi:local"));
}

#[test]
fn test_quakeml_document() {
    let result = fixed_column(CatalogSettings::default()).assemble(&fixture());
    let xml = OutputFormat::QuakeMl.render(&result.document).unwrap();

    assert_eq!(xml.matches("<event ").count(), 3);
    assert_eq!(xml.matches("<pick ").count(), 4);
    assert!(xml.contains(
        "<preferredMagnitudeID>smi:local/mag/2016080307375450/ML</preferredMagnitudeID>"
    ));
    assert!(xml.contains("<time><value>2016-08-03T07:38:01.6Z</value></time>"));
    assert!(xml.contains("<latitude><value>72.79</value></latitude>"));
    assert!(xml.contains("<longitude><value>127.098</value></longitude>"));
    assert!(xml.contains("<depth><value>10800</value></depth>"));
    assert!(xml.contains("<phaseHint>IAML</phaseHint>"));
    assert!(!xml.contains("ns0:"));
}

#[test]
fn test_conversion_is_deterministic() {
    let text = fixture();
    let first = fixed_column(CatalogSettings::default()).assemble(&text);
    let second = fixed_column(CatalogSettings::default()).assemble(&text);

    assert_eq!(first, second);
    for format in [OutputFormat::QuakeMl, OutputFormat::Json] {
        assert_eq!(
            format.render(&first.document).unwrap(),
            format.render(&second.document).unwrap()
        );
    }
}

#[test]
fn test_pick_summary_over_fixture() {
    let result = fixed_column(CatalogSettings::default()).assemble(&fixture());
    let summaries = summarize_picks(&result.document);

    let totals: Vec<(usize, usize, usize, usize, usize)> = summaries
        .iter()
        .map(|s| (s.total, s.p, s.s, s.amplitude, s.other))
        .collect();
    assert_eq!(totals, vec![(3, 1, 1, 1, 0), (1, 0, 0, 0, 1), (0, 0, 0, 0, 0)]);
}

#[test]
fn test_positional_bulletin() {
    let text = "\
2017  3 23 0812 5.0 L  72.100 126.500 3.0  BER  3 0.2 1.1LBER
621  0Z IP     C  812  9.40
621  0N ES        812 12.75
621  0Z IAML      812 13.00
STAT SP IPHASW D HRMM SECON

2017  3 23 0915 44.1 L  72.200 126.600 7.5  BER
622  0Z IP

junk
";
    let assembler = CatalogAssembler::new(
        DecoderKind::Positional.decoder(),
        CatalogSettings::default(),
    );
    let result = assembler.assemble(text);

    assert_eq!(result.stats.groups_seen, 3);
    assert_eq!(result.stats.events_processed, 2);
    assert_eq!(result.stats.malformed_headers, 1);
    assert_eq!(result.stats.picks_decoded, 3);
    assert_eq!(result.stats.pick_lines_rejected, 1);

    let first = &result.document.events[0];
    assert_eq!(first.origin.time.to_string(), "2017-03-23T08:12:05Z");
    assert_eq!(first.picks[1].time.to_string(), "2017-03-23T08:12:12.7Z");
    assert_eq!(first.picks[1].waveform_id.channel_code, "0N");
    assert_eq!(first.picks[2].phase_hint.as_str(), "IAML");
}

#[test]
fn test_run_convert_json_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("catalog.json");

    let args = ConvertArgs {
        input: fixture_path(),
        output: Some(output.clone()),
        decoder: None,
        format: OutputFormat::Json,
        require_picks: false,
        prefix: None,
        network: None,
    };
    let stats = run_convert(&args, args.apply(Config::default()), false).unwrap();
    assert_eq!(stats.events_processed, 3);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(json["public_id"], "smi:local/eventParameters");
    assert_eq!(json["events"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["events"][1]["event_index"], 3);
}
