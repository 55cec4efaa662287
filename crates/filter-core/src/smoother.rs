//! Final-stage exponential smoothing with a speed-adaptive gain.
//!
//! Slow movement gets the base gain (heavy smoothing, steady pointer);
//! fast movement raises the gain toward `max_alpha` so deliberate motion
//! is not dragged behind the user's head.

use gazeflow_common::{GazeflowError, GazeflowResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    /// Gain applied below the speed threshold.
    pub base_alpha: f64,

    /// Speed (normalized units per second) above which the gain grows.
    pub speed_threshold: f64,

    /// Upper bound on the speed-raised gain.
    pub max_alpha: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            base_alpha: 0.3,
            speed_threshold: 50.0,
            max_alpha: 0.8,
        }
    }
}

/// The previous raw sample, kept for speed estimation.
#[derive(Debug, Clone, Copy)]
struct PrevSample {
    x: f64,
    y: f64,
    timestamp: f64,
}

/// Speed-adaptive exponential smoother.
#[derive(Debug, Clone)]
pub struct AdaptiveSmoother {
    base_alpha: f64,
    speed_threshold: f64,
    max_alpha: f64,
    prev: Option<PrevSample>,
    smoothed_x: f64,
    smoothed_y: f64,
}

impl AdaptiveSmoother {
    pub fn new(config: SmootherConfig) -> GazeflowResult<Self> {
        if !(config.base_alpha.is_finite() && config.base_alpha > 0.0 && config.base_alpha <= 1.0)
        {
            return Err(GazeflowError::config(format!(
                "base alpha must be in (0, 1], got {}",
                config.base_alpha
            )));
        }
        if !(config.max_alpha.is_finite()
            && config.max_alpha >= config.base_alpha
            && config.max_alpha <= 1.0)
        {
            return Err(GazeflowError::config(format!(
                "max alpha must be in [base_alpha, 1], got {}",
                config.max_alpha
            )));
        }
        if !(config.speed_threshold.is_finite() && config.speed_threshold >= 0.0) {
            return Err(GazeflowError::config(format!(
                "speed threshold must be finite and non-negative, got {}",
                config.speed_threshold
            )));
        }

        Ok(Self {
            base_alpha: config.base_alpha,
            speed_threshold: config.speed_threshold,
            max_alpha: config.max_alpha,
            prev: None,
            smoothed_x: 0.0,
            smoothed_y: 0.0,
        })
    }

    /// Smooth one sample. The first call seeds the state and passes the raw
    /// sample through unchanged.
    pub fn smooth(&mut self, x: f64, y: f64, timestamp: f64) -> (f64, f64) {
        match self.prev {
            None => {
                self.smoothed_x = x;
                self.smoothed_y = y;
            }
            Some(prev) => {
                let dt = timestamp - prev.timestamp;
                let alpha = if dt > 0.0 {
                    let distance = ((x - prev.x).powi(2) + (y - prev.y).powi(2)).sqrt();
                    let speed = distance / dt;
                    if speed < self.speed_threshold {
                        self.base_alpha
                    } else {
                        self.max_alpha
                            .min(self.base_alpha + (speed - self.speed_threshold) / 100.0)
                    }
                } else {
                    // Stalled or backwards clock: no speed estimate, keep the
                    // base gain.
                    self.base_alpha
                };

                self.smoothed_x = alpha * x + (1.0 - alpha) * self.smoothed_x;
                self.smoothed_y = alpha * y + (1.0 - alpha) * self.smoothed_y;
            }
        }

        self.prev = Some(PrevSample { x, y, timestamp });
        (self.smoothed_x, self.smoothed_y)
    }

    /// The configured base gain, for diagnostics.
    pub fn base_alpha(&self) -> f64 {
        self.base_alpha
    }
}
