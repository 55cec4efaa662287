//! First-stage adaptive low-pass on the raw head pose.
//!
//! A plain exponential filter with two gains: the stable gain while the raw
//! sample sits close to the current estimate, and a doubled (capped) gain
//! when the deviation jumps — sudden head motion should not be smoothed
//! away. The regime is chosen fresh on every call; there is no hysteresis.

use gazeflow_common::{GazeflowError, GazeflowResult};
use serde::{Deserialize, Serialize};

/// Most responsive gain the motion regime may reach.
const MAX_MOTION_ALPHA: f64 = 0.8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseFilterConfig {
    /// Smoothing gain in the stable regime.
    pub alpha: f64,

    /// Per-axis squared-deviation threshold separating the regimes.
    pub variance_threshold: f64,
}

impl Default for PoseFilterConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            variance_threshold: 0.01,
        }
    }
}

/// Variance-gated exponential filter over the normalized pose.
#[derive(Debug, Clone)]
pub struct HeadPoseFilter {
    alpha: f64,
    variance_threshold: f64,
    filtered_x: f64,
    filtered_y: f64,
    x_variance: f64,
    y_variance: f64,
}

impl HeadPoseFilter {
    pub fn new(config: PoseFilterConfig) -> GazeflowResult<Self> {
        if !(config.alpha.is_finite() && config.alpha > 0.0 && config.alpha <= 1.0) {
            return Err(GazeflowError::config(format!(
                "pose alpha must be in (0, 1], got {}",
                config.alpha
            )));
        }
        if !(config.variance_threshold.is_finite() && config.variance_threshold > 0.0) {
            return Err(GazeflowError::config(format!(
                "variance threshold must be finite and positive, got {}",
                config.variance_threshold
            )));
        }

        Ok(Self {
            alpha: config.alpha,
            variance_threshold: config.variance_threshold,
            // Seed at screen center, the neutral pointing position.
            filtered_x: 0.5,
            filtered_y: 0.5,
            x_variance: 0.0,
            y_variance: 0.0,
        })
    }

    /// Filter one raw pose sample; returns the updated estimate.
    pub fn filter_pose(&mut self, x: f64, y: f64) -> (f64, f64) {
        self.x_variance = (x - self.filtered_x).powi(2);
        self.y_variance = (y - self.filtered_y).powi(2);

        let alpha = if self.x_variance < self.variance_threshold
            && self.y_variance < self.variance_threshold
        {
            self.alpha
        } else {
            MAX_MOTION_ALPHA.min(2.0 * self.alpha)
        };

        self.filtered_x = alpha * x + (1.0 - alpha) * self.filtered_x;
        self.filtered_y = alpha * y + (1.0 - alpha) * self.filtered_y;

        (self.filtered_x, self.filtered_y)
    }

    /// Last per-axis squared deviation, for diagnostics.
    pub fn variance(&self) -> (f64, f64) {
        (self.x_variance, self.y_variance)
    }
}
