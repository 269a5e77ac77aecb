//! CSV parsing and row accounting for per-device accelerometer exports.
//!
//! Expected layout is `Timestamp,x,y,z`. Timestamps come in two shapes:
//! the study's display format `%m-%d %H:%M:%S.%L` (no year) and the raw
//! epoch numbers the organizing scripts emit. Malformed rows are counted
//! and skipped rather than failing the load.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

pub const EXPECTED_COLUMNS: [&str; 4] = ["Timestamp", "x", "y", "z"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRow {
    pub ts: NaiveDateTime,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SampleRow {
    /// Measurement for one accelerometer axis, by dimension name.
    pub fn axis_value(&self, axis: &str) -> Option<f64> {
        match axis {
            "x" => Some(self.x),
            "y" => Some(self.y),
            "z" => Some(self.z),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSeries {
    pub rows: Vec<SampleRow>,
    pub bad_rows: u64,
    pub warnings: Vec<String>,
}

/// Outcome of one CSV load attempt. A failure is data, not a panic: it is
/// recorded and the rest of the run proceeds.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded {
        rows: u64,
        bad_rows: u64,
        body_sha256: String,
    },
    Failed {
        reason: String,
    },
}

/// Parse a whole CSV body. Blank lines and `#` comments are skipped; a
/// header row is recognized case-insensitively and checked against the
/// expected columns.
pub fn parse_rows(body: &str, base_year: i32) -> ParsedSeries {
    let mut parsed = ParsedSeries::default();
    let mut saw_header = false;

    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !saw_header && trimmed.to_lowercase().starts_with("timestamp,") {
            saw_header = true;
            let header: Vec<&str> = trimmed.split(',').map(|s| s.trim()).collect();
            let expected: Vec<String> =
                EXPECTED_COLUMNS.iter().map(|s| s.to_lowercase()).collect();
            let got: Vec<String> = header.iter().map(|s| s.to_lowercase()).collect();
            if got != expected {
                parsed
                    .warnings
                    .push(format!("unexpected header: {:?}", header));
            }
            continue;
        }
        match parse_row(trimmed, base_year) {
            Ok(row) => parsed.rows.push(row),
            Err(err) => {
                parsed.bad_rows += 1;
                parsed.warnings.push(format!("bad_row: {}", err));
            }
        }
    }

    if !saw_header {
        parsed.warnings.push("missing_header".to_string());
    }
    parsed
}

fn parse_row(line: &str, base_year: i32) -> Result<SampleRow, String> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 4 {
        return Err(format!("expected 4 columns, got {}", parts.len()));
    }
    let ts = parse_timestamp(parts[0], base_year)?;
    let x = parse_field(parts[1], "x")?;
    let y = parse_field(parts[2], "y")?;
    let z = parse_field(parts[3], "z")?;
    Ok(SampleRow { ts, x, y, z })
}

fn parse_field(raw: &str, name: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| format!("bad {}: {}", name, e))
}

/// Parse a timestamp in the study's `%m-%d %H:%M:%S.%L` display format
/// (the configured base year is assumed) or as an epoch number in seconds
/// or milliseconds.
pub fn parse_timestamp(raw: &str, base_year: i32) -> Result<NaiveDateTime, String> {
    let t = raw.trim();
    if let Ok(n) = t.parse::<f64>() {
        return epoch_to_datetime(n).ok_or_else(|| format!("epoch out of range: {}", t));
    }
    NaiveDateTime::parse_from_str(&format!("{}-{}", base_year, t), "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| format!("bad timestamp {:?}: {}", t, e))
}

fn epoch_to_datetime(n: f64) -> Option<NaiveDateTime> {
    // Values past the year-5000 mark in seconds are taken as milliseconds.
    let (secs, nanos) = if n.abs() >= 1e11 {
        let secs = (n / 1000.0).floor();
        let frac_ms = n - secs * 1000.0;
        (secs as i64, (frac_ms * 1_000_000.0) as u32)
    } else {
        let secs = n.floor();
        (secs as i64, ((n - secs) * 1_000_000_000.0) as u32)
    };
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
}
