//! Blink debouncing and classification.
//!
//! Raw per-frame threshold crossings of the eye-aspect-ratio are too jumpy
//! to drive a click. `BlinkStabilizer` trades detection latency for
//! stability with a sliding majority vote; `BlinkClassifier` then turns the
//! debounced closed/open signal into discrete click-worthy events graded by
//! duration and repetition.

use gazeflow_common::{GazeflowError, GazeflowResult};
use serde::{Deserialize, Serialize};

use crate::ring::Ring;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Sliding-window length in frames.
    pub window_size: usize,

    /// Fraction of the window that must indicate closure.
    pub confirmation_threshold: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            confirmation_threshold: 0.6,
        }
    }
}

/// Aggregate EAR statistics over the current history.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EarStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Majority-vote debouncer over per-frame blink indicators.
#[derive(Debug, Clone)]
pub struct BlinkStabilizer {
    ear_history: Ring<f64>,
    blink_history: Ring<bool>,
    window_size: usize,
    confirmation_threshold: f64,
}

impl BlinkStabilizer {
    pub fn new(config: BlinkConfig) -> GazeflowResult<Self> {
        if config.window_size == 0 {
            return Err(GazeflowError::config("blink window must be at least 1"));
        }
        if !(config.confirmation_threshold.is_finite()
            && config.confirmation_threshold > 0.0
            && config.confirmation_threshold <= 1.0)
        {
            return Err(GazeflowError::config(format!(
                "confirmation threshold must be in (0, 1], got {}",
                config.confirmation_threshold
            )));
        }

        Ok(Self {
            ear_history: Ring::new(config.window_size),
            blink_history: Ring::new(config.window_size),
            window_size: config.window_size,
            confirmation_threshold: config.confirmation_threshold,
        })
    }

    /// Record one frame: the raw EAR and its thresholded indicator.
    pub fn add_ear_value(&mut self, ear: f64, threshold: f64) {
        self.ear_history.push(ear);
        self.blink_history.push(ear < threshold);
    }

    /// Debounced blink signal. Stays `false` until a full window of
    /// indicators has accumulated.
    pub fn get_stable_blink(&self) -> bool {
        if self.blink_history.len() < self.window_size {
            return false;
        }
        let closed = self.blink_history.iter().filter(|&&b| b).count();
        let ratio = closed as f64 / self.window_size as f64;
        ratio >= self.confirmation_threshold
    }

    /// (mean, min, max) over the EAR history; zeros when empty.
    pub fn get_ear_stats(&self) -> EarStats {
        if self.ear_history.is_empty() {
            return EarStats::default();
        }
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &ear in self.ear_history.iter() {
            sum += ear;
            min = min.min(ear);
            max = max.max(ear);
        }
        EarStats {
            mean: sum / self.ear_history.len() as f64,
            min,
            max,
        }
    }
}

/// Classified blink event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlinkKind {
    Single,
    Double,
    Long,
}

/// A discrete blink event emitted on eye re-opening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlinkEvent {
    pub kind: BlinkKind,
    /// How long the eye stayed closed, in seconds.
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkPatternConfig {
    /// Closed frames required before a release counts as a blink.
    pub min_closed_frames: u32,

    /// Two releases within this many seconds form a double blink.
    pub double_window_secs: f64,

    /// Closures longer than this many seconds are long blinks.
    pub long_threshold_secs: f64,

    /// Minimum seconds between emitted events.
    pub cooldown_secs: f64,
}

impl Default for BlinkPatternConfig {
    fn default() -> Self {
        Self {
            min_closed_frames: 2,
            double_window_secs: 0.5,
            long_threshold_secs: 0.3,
            cooldown_secs: 0.5,
        }
    }
}

/// Turns the debounced closed/open signal into classified blink events.
///
/// Feed it one indicator per frame together with the frame timestamp; an
/// event is emitted at the frame where the eye re-opens.
#[derive(Debug, Clone)]
pub struct BlinkClassifier {
    config: BlinkPatternConfig,
    closed_frames: u32,
    closed_since: f64,
    release_times: Vec<f64>,
    last_emit: Option<f64>,
}

impl BlinkClassifier {
    pub fn new(config: BlinkPatternConfig) -> GazeflowResult<Self> {
        if config.min_closed_frames == 0 {
            return Err(GazeflowError::config(
                "minimum closed frames must be at least 1",
            ));
        }
        for (name, value) in [
            ("double window", config.double_window_secs),
            ("long threshold", config.long_threshold_secs),
            ("cooldown", config.cooldown_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GazeflowError::config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        Ok(Self {
            config,
            closed_frames: 0,
            closed_since: 0.0,
            release_times: Vec::new(),
            last_emit: None,
        })
    }

    /// Advance one frame. Returns an event when a qualifying closure ends.
    pub fn update(&mut self, closed: bool, timestamp: f64) -> Option<BlinkEvent> {
        if closed {
            if self.closed_frames == 0 {
                self.closed_since = timestamp;
            }
            self.closed_frames += 1;
            return None;
        }

        let frames = self.closed_frames;
        self.closed_frames = 0;
        if frames < self.config.min_closed_frames {
            return None;
        }

        let duration = timestamp - self.closed_since;
        self.release_times.push(timestamp);
        self.release_times
            .retain(|&t| timestamp - t < self.config.double_window_secs);

        let kind = if self.release_times.len() >= 2 {
            BlinkKind::Double
        } else if duration > self.config.long_threshold_secs {
            BlinkKind::Long
        } else {
            BlinkKind::Single
        };

        if let Some(last) = self.last_emit {
            if timestamp - last < self.config.cooldown_secs {
                return None;
            }
        }

        self.last_emit = Some(timestamp);
        Some(BlinkEvent {
            kind,
            duration_secs: duration,
        })
    }
}
