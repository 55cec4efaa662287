//! Tracker sample types for the Gazeflow signal stream.
//!
//! Samples are recorded in append-only JSONL format so traces survive a
//! crash mid-session. Pointer coordinates are normalized to `[0.0, 1.0]`
//! relative to the tracked input range; the eye-aspect-ratio is the raw
//! scalar produced by the landmark geometry stage.

use serde::{Deserialize, Serialize};

/// Monotonic timestamp in nanoseconds since tracking start.
pub type TimestampNs = u64;

/// One frame of tracker output: where the head points and how open the eye is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerSample {
    /// Monotonic nanoseconds since tracking start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Normalized X coordinate [0.0, 1.0].
    pub x: f64,

    /// Normalized Y coordinate [0.0, 1.0].
    pub y: f64,

    /// Eye-aspect-ratio; low values indicate a closed eye.
    pub ear: f64,
}

impl TrackerSample {
    pub fn new(timestamp_ns: TimestampNs, x: f64, y: f64, ear: f64) -> Self {
        Self {
            timestamp_ns,
            x,
            y,
            ear,
        }
    }

    /// Timestamp as fractional seconds since tracking start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }

    /// Whether every field holds a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.ear.is_finite()
    }
}

/// Trace metadata written as a `#`-prefixed header line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at tracking start (ISO 8601).
    pub epoch_wall: String,

    /// Nominal tracker frame rate (Hz).
    pub sample_rate_hz: u32,
}

impl TraceHeader {
    pub fn new(epoch_wall: impl Into<String>, sample_rate_hz: u32) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            epoch_wall: epoch_wall.into(),
            sample_rate_hz,
        }
    }
}

/// Parse samples from JSONL content (one JSON object per line).
pub fn parse_samples(jsonl: &str) -> Result<Vec<TrackerSample>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize samples to JSONL format.
pub fn serialize_samples(samples: &[TrackerSample]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for sample in samples {
        output.push_str(&serde_json::to_string(sample)?);
        output.push('\n');
    }
    Ok(output)
}
