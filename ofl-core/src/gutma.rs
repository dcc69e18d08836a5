//! GUTMA flight-logging document rendering
//!
//! Renders an accumulated track into the fixed `flight_logging_submission`
//! JSON document exchanged with flight-logging services. Layout and numeric
//! formatting are part of the external contract: items are fixed-point text
//! (three decimals for time/altitude/speed, six for longitude/latitude,
//! never scientific notation) and date-times are second-precision ISO-8601
//! in UTC with a trailing `Z`.

use chrono::{DateTime, Utc};

use crate::model::Track;

const LOGGING_HEADER: &str = r#"{
    "exchange": {
        "exchange_type": "flight_logging",
        "message": {
            "flight_logging": {
                "flight_logging_items": [
"#;

const LOGGING_KEYS: &str = r#"                ],
                "flight_logging_keys": [
                    "timestamp", "gps_lon", "gps_lat", "gps_altitude", "speed"
                ],
                "altitude_system": "WGS84",
"#;

const LOGGING_FOOTER: &str = r####"            },
            "file": {
                "logging_type": "GUTMA_DX_JSON",
                "filename": "###FILENAME###",
                "creation_dtg": "###FILEDATE###Z"
            },
           "message_type": "flight_logging_submission"
        }
    }
}
"####;

/// Render `track` as a GUTMA flight-logging submission.
///
/// `filename_stem` is the destination base name recorded in the footer;
/// `created` stamps the document creation time. Callers must not render an
/// empty track — the conversion contract is to remove the destination file
/// instead of writing a header-only document.
pub fn render(track: &Track, filename_stem: &str, created: DateTime<Utc>) -> String {
    let mut out = String::with_capacity(LOGGING_HEADER.len() + track.len() * 72 + 512);
    out.push_str(LOGGING_HEADER);
    for (index, sample) in track.samples.iter().enumerate() {
        let separator = if index + 1 < track.len() { ",\n" } else { "\n" };
        out.push_str(&format!(
            "                    [{:.3}, {:.6}, {:.6}, {:.3}, {:.3} ]{}",
            sample.time_s,
            sample.lon_deg,
            sample.lat_deg,
            sample.alt_m,
            sample.speed_mps,
            separator,
        ));
    }
    out.push_str(LOGGING_KEYS);
    out.push_str(&format!(
        "                \"logging_start_dtg\": \"{}Z\"\n",
        start_dtg(track.start_us)
    ));
    out.push_str(
        &LOGGING_FOOTER
            .replace("###FILENAME###", filename_stem)
            .replace("###FILEDATE###", &iso8601(created)),
    );
    out
}

/// Track start, truncated to millisecond precision before rendering.
fn start_dtg(start_us: u64) -> String {
    let dt = DateTime::<Utc>::from_timestamp_millis((start_us / 1000) as i64)
        .unwrap_or(DateTime::UNIX_EPOCH);
    iso8601(dt)
}

fn iso8601(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}
