//! QuakeML 1.2 rendering of an assembled catalog.
//!
//! Output is deterministic: identical documents render to identical bytes.
//! Element order follows the QuakeML BED schema (preferred ids, origins,
//! magnitudes, picks).

use crate::constants::{QUAKEML_BED_NAMESPACE, QUAKEML_NAMESPACE};
use crate::models::{CatalogDocument, CatalogEvent, Magnitude, Origin, Pick};
use std::fmt::Write;

const INDENT: &str = "  ";

/// Render the document as a QuakeML 1.2 XML string
pub fn render_quakeml(document: &CatalogDocument) -> String {
    let mut out = String::with_capacity(512 + document.events.len() * 1024);

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<q:quakeml xmlns:q=\"{}\" xmlns=\"{}\">",
        QUAKEML_NAMESPACE, QUAKEML_BED_NAMESPACE
    );
    let _ = writeln!(
        out,
        "{}<eventParameters publicID=\"{}\">",
        INDENT,
        escape(&document.public_id)
    );

    for event in &document.events {
        write_event(&mut out, event, 2);
    }

    let _ = writeln!(out, "{}</eventParameters>", INDENT);
    out.push_str("</q:quakeml>\n");
    out
}

fn write_event(out: &mut String, event: &CatalogEvent, depth: usize) {
    open(out, depth, "event", Some(&event.public_id));
    leaf(out, depth + 1, "preferredOriginID", &event.origin.public_id);
    if let Some(magnitude) = event.preferred_magnitude() {
        leaf(out, depth + 1, "preferredMagnitudeID", &magnitude.public_id);
    }

    write_origin(out, &event.origin, depth + 1);
    for magnitude in &event.magnitudes {
        write_magnitude(out, magnitude, depth + 1);
    }
    for pick in &event.picks {
        write_pick(out, pick, depth + 1);
    }

    close(out, depth, "event");
}

fn write_origin(out: &mut String, origin: &Origin, depth: usize) {
    open(out, depth, "origin", Some(&origin.public_id));
    quantity(out, depth + 1, "time", &origin.time.to_string());
    quantity(out, depth + 1, "latitude", &format_decimal(origin.latitude));
    quantity(out, depth + 1, "longitude", &format_decimal(origin.longitude));
    if let Some(depth_m) = origin.depth_m {
        quantity(out, depth + 1, "depth", &format!("{}", depth_m as i64));
    }
    if let Some(agency) = &origin.agency_id {
        creation_info(out, depth + 1, agency);
    }
    close(out, depth, "origin");
}

fn write_magnitude(out: &mut String, magnitude: &Magnitude, depth: usize) {
    open(out, depth, "magnitude", Some(&magnitude.public_id));
    quantity(out, depth + 1, "mag", &format_decimal(magnitude.value));
    leaf(out, depth + 1, "type", magnitude.magnitude_type.code());
    if let Some(agency) = &magnitude.agency_id {
        creation_info(out, depth + 1, agency);
    }
    close(out, depth, "magnitude");
}

fn write_pick(out: &mut String, pick: &Pick, depth: usize) {
    open(out, depth, "pick", Some(&pick.public_id));
    quantity(out, depth + 1, "time", &pick.time.to_string());
    let _ = writeln!(
        out,
        "{}<waveformID networkCode=\"{}\" stationCode=\"{}\" channelCode=\"{}\"/>",
        INDENT.repeat(depth + 1),
        escape(&pick.waveform_id.network_code),
        escape(&pick.waveform_id.station_code),
        escape(&pick.waveform_id.channel_code)
    );
    leaf(out, depth + 1, "phaseHint", pick.phase_hint.as_str());
    close(out, depth, "pick");
}

fn creation_info(out: &mut String, depth: usize, agency: &str) {
    open(out, depth, "creationInfo", None);
    leaf(out, depth + 1, "agencyID", agency);
    close(out, depth, "creationInfo");
}

/// `<name><value>text</value></name>` on one line
fn quantity(out: &mut String, depth: usize, name: &str, value: &str) {
    let _ = writeln!(
        out,
        "{}<{name}><value>{}</value></{name}>",
        INDENT.repeat(depth),
        escape(value)
    );
}

fn leaf(out: &mut String, depth: usize, name: &str, text: &str) {
    let _ = writeln!(
        out,
        "{}<{name}>{}</{name}>",
        INDENT.repeat(depth),
        escape(text)
    );
}

fn open(out: &mut String, depth: usize, name: &str, public_id: Option<&str>) {
    match public_id {
        Some(id) => {
            let _ = writeln!(
                out,
                "{}<{} publicID=\"{}\">",
                INDENT.repeat(depth),
                name,
                escape(id)
            );
        }
        None => {
            let _ = writeln!(out, "{}<{}>", INDENT.repeat(depth), name);
        }
    }
}

fn close(out: &mut String, depth: usize, name: &str) {
    let _ = writeln!(out, "{}</{}>", INDENT.repeat(depth), name);
}

/// Shortest round-trip decimal, always with a fractional part (`10.0`, `72.79`)
pub fn format_decimal(value: f64) -> String {
    format!("{:?}", value)
}

/// Escape text for use in XML content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MagnitudeType, PhaseCode, WaveformId};
    use crate::time::Timestamp;

    fn sample_document() -> CatalogDocument {
        let time = Timestamp::from_ymd_hms(2016, 8, 3, 7, 37, 54.5).unwrap();
        let pick_time = Timestamp::from_ymd_hms(2016, 8, 3, 7, 38, 1.68).unwrap();
        let mut document = CatalogDocument::new("smi:local/eventParameters");
        document.events.push(CatalogEvent {
            public_id: "smi:local/event/2016080307375450".to_string(),
            event_index: 1,
            origin: Origin {
                public_id: "smi:local/origin/2016080307375450".to_string(),
                time,
                latitude: 72.79,
                longitude: 127.098,
                depth_m: Some(10800.0),
                agency_id: Some("BER".to_string()),
            },
            magnitudes: vec![Magnitude {
                public_id: "smi:local/mag/2016080307375450/ML".to_string(),
                value: 0.5,
                magnitude_type: MagnitudeType::Local,
                agency_id: Some("BER".to_string()),
            }],
            picks: vec![Pick {
                public_id: "smi:local/e1p1".to_string(),
                time: pick_time,
                waveform_id: WaveformId {
                    network_code: "SI".to_string(),
                    station_code: "628".to_string(),
                    channel_code: "HHZ".to_string(),
                },
                phase_hint: PhaseCode::P,
            }],
        });
        document
    }

    #[test]
    fn test_render_structure() {
        let xml = render_quakeml(&sample_document());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains(
            "<q:quakeml xmlns:q=\"http://quakeml.org/xmlns/quakeml/1.2\" xmlns=\"http://quakeml.org/xmlns/bed/1.2\">"
        ));
        assert!(xml.contains("<event publicID=\"smi:local/event/2016080307375450\">"));
        assert!(xml.contains(
            "<preferredOriginID>smi:local/origin/2016080307375450</preferredOriginID>"
        ));
        assert!(xml.contains("<time><value>2016-08-03T07:37:54.5Z</value></time>"));
        assert!(xml.contains("<latitude><value>72.79</value></latitude>"));
        assert!(xml.contains("<longitude><value>127.098</value></longitude>"));
        assert!(xml.contains("<depth><value>10800</value></depth>"));
        assert!(xml.contains("<agencyID>BER</agencyID>"));
        assert!(xml.contains("<mag><value>0.5</value></mag>"));
        assert!(xml.contains("<type>ML</type>"));
        assert!(xml.contains(
            "<waveformID networkCode=\"SI\" stationCode=\"628\" channelCode=\"HHZ\"/>"
        ));
        assert!(xml.contains("<phaseHint>P</phaseHint>"));
        assert!(xml.ends_with("</q:quakeml>\n"));
        assert!(!xml.contains("ns0:"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let document = sample_document();
        assert_eq!(render_quakeml(&document), render_quakeml(&document));
    }

    #[test]
    fn test_element_order() {
        let xml = render_quakeml(&sample_document());
        let origin = xml.find("<origin ").unwrap();
        let magnitude = xml.find("<magnitude ").unwrap();
        let pick = xml.find("<pick ").unwrap();
        assert!(origin < magnitude && magnitude < pick);
    }

    #[test]
    fn test_escape_and_decimal() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(format_decimal(10.0), "10.0");
        assert_eq!(format_decimal(72.79), "72.79");
    }

    #[test]
    fn test_empty_document() {
        let xml = render_quakeml(&CatalogDocument::new("smi:local/eventParameters"));
        assert!(xml.contains("<eventParameters publicID=\"smi:local/eventParameters\">"));
        assert!(!xml.contains("<event "));
    }
}
