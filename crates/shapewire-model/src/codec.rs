//! Lexical codecs for scalar values shared by every wire format.
//!
//! Parsers return the parser's own message on failure; callers attach the wire
//! location and build the matching [`TranscodeError`](crate::TranscodeError).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::shape::TimestampFormat;

/// Parse a boolean: `1`, `t`, `T`, `true`, `TRUE`, `True` and their false
/// counterparts.
pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(format!("invalid boolean: {s}")),
    }
}

/// Parse a signed 64-bit integer.
pub fn parse_int(s: &str) -> Result<i64, String> {
    s.parse::<i64>().map_err(|e| e.to_string())
}

/// Parse a 64-bit float.
pub fn parse_float(s: &str) -> Result<f64, String> {
    s.parse::<f64>().map_err(|e| e.to_string())
}

/// Decode standard base64.
pub fn decode_blob(s: &str) -> Result<Bytes, String> {
    STANDARD
        .decode(s.as_bytes())
        .map(Bytes::from)
        .map_err(|e| e.to_string())
}

/// Encode standard base64.
#[must_use]
pub fn encode_blob(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Parse a timestamp in the given format.
pub fn parse_timestamp(s: &str, format: TimestampFormat) -> Result<DateTime<Utc>, String> {
    match format {
        TimestampFormat::Iso8601 => parse_iso8601(s),
        TimestampFormat::UnixTimestamp => parse_unix(s),
        TimestampFormat::Rfc822 => DateTime::parse_from_rfc2822(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| e.to_string()),
    }
}

/// Format a timestamp in the given format.
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>, format: TimestampFormat) -> String {
    match format {
        TimestampFormat::Iso8601 => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        TimestampFormat::UnixTimestamp => {
            let nanos = dt.timestamp_subsec_nanos();
            if nanos == 0 {
                dt.timestamp().to_string()
            } else {
                let frac = format!("{nanos:09}");
                format!("{}.{}", dt.timestamp(), frac.trim_end_matches('0'))
            }
        }
        TimestampFormat::Rfc822 => dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
    }
}

/// Render a float the way the wire formats expect (`1.5`, `200`, `NaN`, `Infinity`).
#[must_use]
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_owned()
    } else if f.is_infinite() {
        if f.is_sign_positive() {
            "Infinity".to_owned()
        } else {
            "-Infinity".to_owned()
        }
    } else {
        f.to_string()
    }
}

fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| e.to_string())
}

/// Seconds with an optional fraction; fractional digits beyond nanoseconds are
/// truncated.
fn parse_unix(s: &str) -> Result<DateTime<Utc>, String> {
    let (secs, frac) = match s.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (s, ""),
    };
    let secs = secs.parse::<i64>().map_err(|e| e.to_string())?;
    let nanos = if frac.is_empty() {
        0
    } else {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid fractional seconds: {frac}"));
        }
        let digits: String = frac.chars().take(9).collect();
        let padded = format!("{digits:0<9}");
        padded.parse::<u32>().map_err(|e| e.to_string())?
    };
    Utc.timestamp_opt(secs, nanos)
        .single()
        .ok_or_else(|| format!("timestamp out of range: {s}"))
}
