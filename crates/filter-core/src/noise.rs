//! History-based noise reduction: robust outlier rejection followed by
//! local polynomial smoothing.
//!
//! A short per-axis sample history feeds two passes. Outliers are dropped
//! with a median-absolute-deviation test, then a degree-2 polynomial is fit
//! over the surviving window and evaluated at the most recent sample, the
//! endpoint behavior of a Savitzky-Golay filter.

use gazeflow_common::{GazeflowError, GazeflowResult};
use serde::{Deserialize, Serialize};

use crate::ring::Ring;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Ring-buffer capacity for the per-axis sample history.
    pub history_size: usize,

    /// MAD multiplier `k`: a sample survives only if its deviation from the
    /// median stays strictly below `k * MAD` on both axes.
    pub outlier_threshold: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            history_size: 5,
            outlier_threshold: 3.0,
        }
    }
}

/// Multi-stage noise reduction over a bounded sample history.
#[derive(Debug, Clone)]
pub struct NoiseReducer {
    x_history: Ring<f64>,
    y_history: Ring<f64>,
    outlier_threshold: f64,
    window: usize,
}

impl NoiseReducer {
    pub fn new(config: NoiseConfig) -> GazeflowResult<Self> {
        if config.history_size == 0 {
            return Err(GazeflowError::config("history size must be at least 1"));
        }
        if !(config.outlier_threshold.is_finite() && config.outlier_threshold > 0.0) {
            return Err(GazeflowError::config(format!(
                "outlier threshold must be finite and positive, got {}",
                config.outlier_threshold
            )));
        }

        // Smoothing window: at most 5 samples, and always odd.
        let mut window = config.history_size.min(5);
        if window % 2 == 0 {
            window += 1;
        }

        Ok(Self {
            x_history: Ring::new(config.history_size),
            y_history: Ring::new(config.history_size),
            outlier_threshold: config.outlier_threshold,
            window,
        })
    }

    /// Push a sample into both axis histories.
    pub fn add_point(&mut self, x: f64, y: f64) {
        self.x_history.push(x);
        self.y_history.push(y);
    }

    /// Drop samples whose deviation from the median reaches `k * MAD` on
    /// either axis. Order is preserved; with fewer than 3 samples the
    /// history is returned unchanged.
    pub fn remove_outliers(&self) -> (Vec<f64>, Vec<f64>) {
        let xs = self.x_history.to_vec();
        let ys = self.y_history.to_vec();
        if xs.len() < 3 {
            return (xs, ys);
        }

        let x_median = median(&xs);
        let y_median = median(&ys);
        let x_mad = mad(&xs, x_median);
        let y_mad = mad(&ys, y_median);

        let k = self.outlier_threshold;
        let mut x_clean = Vec::with_capacity(xs.len());
        let mut y_clean = Vec::with_capacity(ys.len());
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            if deviation_ok(x, x_median, x_mad, k) && deviation_ok(y, y_median, y_mad, k) {
                x_clean.push(x);
                y_clean.push(y);
            }
        }

        (x_clean, y_clean)
    }

    /// Smooth the current history down to a single per-axis value.
    ///
    /// Falls back to the most recent sample whenever the history or the
    /// outlier-cleaned window is too short to fit a polynomial.
    pub fn smooth_savgol(&self) -> (f64, f64) {
        if self.x_history.len() < self.window {
            return (
                self.x_history.latest().unwrap_or(0.0),
                self.y_history.latest().unwrap_or(0.0),
            );
        }

        let (x_clean, y_clean) = self.remove_outliers();
        if x_clean.len() < self.window {
            return match (x_clean.last(), y_clean.last()) {
                (Some(&x), Some(&y)) => (x, y),
                // Degenerate histories can reject every sample; the most
                // recent raw sample is still a sane output.
                _ => (
                    self.x_history.latest().unwrap_or(0.0),
                    self.y_history.latest().unwrap_or(0.0),
                ),
            };
        }

        let xw = &x_clean[x_clean.len() - self.window..];
        let yw = &y_clean[y_clean.len() - self.window..];
        (quadratic_endpoint(xw), quadratic_endpoint(yw))
    }

    /// Public entry: push a sample, return the smoothed position.
    pub fn filter_point(&mut self, x: f64, y: f64) -> (f64, f64) {
        self.add_point(x, y);
        self.smooth_savgol()
    }

    /// Number of samples currently held.
    pub fn history_len(&self) -> usize {
        self.x_history.len()
    }
}

fn deviation_ok(value: f64, median: f64, mad: f64, k: f64) -> bool {
    let deviation = (value - median).abs();
    if mad > 0.0 {
        deviation < k * mad
    } else {
        // Zero MAD means the recent history is constant on this axis; only
        // exact matches with the median survive.
        deviation == 0.0
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn mad(values: &[f64], center: f64) -> f64 {
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// Fit `y = a0 + a1*t + a2*t^2` over `values` (abscissa 0..n-1) and evaluate
/// at the final abscissa. Falls back to the last value if the fit degenerates.
fn quadratic_endpoint(values: &[f64]) -> f64 {
    let n = values.len();
    let last = values[n - 1];
    if n < 3 {
        return last;
    }

    let mut s = [0.0_f64; 5];
    let mut b = [0.0_f64; 3];
    for (i, &v) in values.iter().enumerate() {
        let t = i as f64;
        let mut pow = 1.0;
        for (j, entry) in s.iter_mut().enumerate() {
            *entry += pow;
            if j < 3 {
                b[j] += pow * v;
            }
            pow *= t;
        }
    }

    let m = [
        [s[0], s[1], s[2], b[0]],
        [s[1], s[2], s[3], b[1]],
        [s[2], s[3], s[4], b[2]],
    ];
    match solve3(m) {
        Some([a0, a1, a2]) => {
            let t = (n - 1) as f64;
            a0 + a1 * t + a2 * t * t
        }
        None => last,
    }
}

/// Gaussian elimination with partial pivoting on a 3x4 augmented matrix.
fn solve3(mut m: [[f64; 4]; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot = (col..3).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot);
        for row in col + 1..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..4 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut out = [0.0_f64; 3];
    for row in (0..3).rev() {
        let mut acc = m[row][3];
        for k in row + 1..3 {
            acc -= m[row][k] * out[k];
        }
        out[row] = acc / m[row][row];
    }
    Some(out)
}
