//! Per-axis constant-velocity Kalman estimation.
//!
//! One `Kalman1D` tracks a single coordinate; the pipeline runs two
//! independent instances (x, y). State is `[position, velocity]` under the
//! transition `F = [[1, dt], [0, 1]]` with measurement `H = [1, 0]`.

use gazeflow_common::{GazeflowError, GazeflowResult};
use serde::{Deserialize, Serialize};

/// Noise scales for one Kalman axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanConfig {
    /// Process-noise scale `q`.
    pub process_variance: f64,

    /// Measurement-noise scale `r`.
    pub measurement_variance: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_variance: 1e-3,
            measurement_variance: 1e-1,
        }
    }
}

/// 1D constant-velocity Kalman filter.
///
/// Cold-starts at position 0 with identity covariance; the first few frames
/// converge toward the measurement rather than snapping to it, which is the
/// intended behavior, not a defect.
#[derive(Debug, Clone)]
pub struct Kalman1D {
    state: [f64; 2],
    covariance: [[f64; 2]; 2],
    q: f64,
    r: f64,
}

impl Kalman1D {
    pub fn new(config: KalmanConfig) -> GazeflowResult<Self> {
        if !(config.process_variance.is_finite() && config.process_variance > 0.0) {
            return Err(GazeflowError::config(format!(
                "process variance must be finite and positive, got {}",
                config.process_variance
            )));
        }
        if !(config.measurement_variance.is_finite() && config.measurement_variance > 0.0) {
            return Err(GazeflowError::config(format!(
                "measurement variance must be finite and positive, got {}",
                config.measurement_variance
            )));
        }

        Ok(Self {
            state: [0.0, 0.0],
            covariance: [[1.0, 0.0], [0.0, 1.0]],
            q: config.process_variance,
            r: config.measurement_variance,
        })
    }

    /// Advance the state by `dt` under the constant-velocity model.
    ///
    /// The process-noise matrix `Q = q * [[1/4, 1/2], [1/2, 1]]` is a fixed
    /// per-step injection, not rescaled by `dt`.
    pub fn predict(&mut self, dt: f64) {
        self.state[0] += self.state[1] * dt;

        // P = F P F^T + Q with F = [[1, dt], [0, 1]]
        let p00 = self.covariance[0][0];
        let p01 = self.covariance[0][1];
        let p10 = self.covariance[1][0];
        let p11 = self.covariance[1][1];

        self.covariance[0][0] = p00 + dt * (p01 + p10) + dt * dt * p11 + 0.25 * self.q;
        self.covariance[0][1] = p01 + dt * p11 + 0.5 * self.q;
        self.covariance[1][0] = p10 + dt * p11 + 0.5 * self.q;
        self.covariance[1][1] = p11 + self.q;
    }

    /// Fold in a position measurement.
    pub fn update(&mut self, measurement: f64) {
        // Innovation covariance S = H P H^T + R with H = [1, 0]
        let s = self.covariance[0][0] + self.r;

        // Gain K = P H^T S^-1 = [p00 / s, p10 / s]^T
        let k0 = self.covariance[0][0] / s;
        let k1 = self.covariance[1][0] / s;

        let innovation = measurement - self.state[0];
        self.state[0] += k0 * innovation;
        self.state[1] += k1 * innovation;

        // P = (I - K H) P
        let p00 = self.covariance[0][0];
        let p01 = self.covariance[0][1];
        let p10 = self.covariance[1][0];
        let p11 = self.covariance[1][1];

        self.covariance[0][0] = (1.0 - k0) * p00;
        self.covariance[0][1] = (1.0 - k0) * p01;
        self.covariance[1][0] = p10 - k1 * p00;
        self.covariance[1][1] = p11 - k1 * p01;
    }

    /// Predict-then-update cycle; returns the filtered position.
    pub fn filter(&mut self, measurement: f64, dt: f64) -> f64 {
        self.predict(dt);
        self.update(measurement);
        self.state[0]
    }

    pub fn position(&self) -> f64 {
        self.state[0]
    }

    pub fn velocity(&self) -> f64 {
        self.state[1]
    }
}
