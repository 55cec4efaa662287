//! The full stabilization pipeline.
//!
//! Owns one instance of every estimator and fixes their composition order:
//!
//! raw pose → HeadPoseFilter → Kalman1D(x) / Kalman1D(y) → NoiseReducer →
//! AdaptiveSmoother → smoothed pose
//!
//! The blink path runs independently: EAR + threshold → BlinkStabilizer →
//! debounced boolean.
//!
//! Timing is caller-supplied: every call takes an explicit timestamp in
//! seconds, so replaying a recorded trace is fully deterministic.

use gazeflow_common::{GazeflowError, GazeflowResult};
use gazeflow_signal_model::NormPoint;
use serde::{Deserialize, Serialize};

use crate::blink::{BlinkConfig, BlinkStabilizer, EarStats};
use crate::kalman::{Kalman1D, KalmanConfig};
use crate::noise::{NoiseConfig, NoiseReducer};
use crate::pose::{HeadPoseFilter, PoseFilterConfig};
use crate::smoother::{AdaptiveSmoother, SmootherConfig};

/// Construction-time parameters for the whole pipeline.
///
/// The stage defaults are tuned for head-pointer use and deliberately
/// differ from the individual components' own defaults: a tighter Kalman
/// measurement noise, a deeper sample history, and a more responsive pose
/// gain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub kalman: KalmanConfig,
    pub pose: PoseFilterConfig,
    pub noise: NoiseConfig,
    pub smoother: SmootherConfig,
    pub blink: BlinkConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            kalman: KalmanConfig {
                process_variance: 1e-3,
                measurement_variance: 1e-2,
            },
            pose: PoseFilterConfig {
                alpha: 0.4,
                variance_threshold: 0.005,
            },
            noise: NoiseConfig {
                history_size: 7,
                outlier_threshold: 2.5,
            },
            smoother: SmootherConfig {
                base_alpha: 0.3,
                speed_threshold: 30.0,
                max_alpha: 0.7,
            },
            blink: BlinkConfig {
                window_size: 8,
                confirmation_threshold: 0.5,
            },
        }
    }
}

/// Read-only diagnostics gathered from every stage.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DebugSnapshot {
    /// EAR statistics over the blink history.
    pub ear: EarStats,

    /// Last per-axis squared deviation seen by the pose filter.
    pub head_variance: (f64, f64),

    /// Current Kalman position estimates.
    pub kalman_position: NormPoint,

    /// Base gain of the adaptive smoother.
    pub base_alpha: f64,
}

/// The stabilization pipeline. One instance per tracked face; no state is
/// shared between instances.
#[derive(Debug, Clone)]
pub struct FilterPipeline {
    pose_filter: HeadPoseFilter,
    kalman_x: Kalman1D,
    kalman_y: Kalman1D,
    noise_reducer: NoiseReducer,
    adaptive_smoother: AdaptiveSmoother,
    blink_stabilizer: BlinkStabilizer,
    last_timestamp: Option<f64>,
}

impl FilterPipeline {
    pub fn new(config: PipelineConfig) -> GazeflowResult<Self> {
        let pipeline = Self {
            pose_filter: HeadPoseFilter::new(config.pose)?,
            kalman_x: Kalman1D::new(config.kalman)?,
            kalman_y: Kalman1D::new(config.kalman)?,
            noise_reducer: NoiseReducer::new(config.noise)?,
            adaptive_smoother: AdaptiveSmoother::new(config.smoother)?,
            blink_stabilizer: BlinkStabilizer::new(config.blink)?,
            last_timestamp: None,
        };
        tracing::debug!(?config, "filter pipeline constructed");
        Ok(pipeline)
    }

    /// Create a pipeline with the default stage tuning.
    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default()).expect("default pipeline configuration is valid")
    }

    /// Run one raw pose sample through every stage.
    ///
    /// `timestamp` is seconds on the caller's clock. The first call runs
    /// with `dt = 0`; a backwards-stepping clock also clamps to 0 so the
    /// Kalman predict never extrapolates into the past.
    ///
    /// Non-finite input is rejected before any stage state is touched;
    /// finite positions are clamped into the normalized range.
    pub fn filter_position(
        &mut self,
        x: f64,
        y: f64,
        timestamp: f64,
    ) -> GazeflowResult<NormPoint> {
        if !(x.is_finite() && y.is_finite() && timestamp.is_finite()) {
            tracing::warn!(x, y, timestamp, "rejecting non-finite pose sample");
            return Err(GazeflowError::signal(format!(
                "non-finite pose sample ({x}, {y}) at t={timestamp}"
            )));
        }

        let x = x.clamp(0.0, 1.0);
        let y = y.clamp(0.0, 1.0);

        let dt = match self.last_timestamp {
            Some(last) => (timestamp - last).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp);

        let (pose_x, pose_y) = self.pose_filter.filter_pose(x, y);

        let kalman_x = self.kalman_x.filter(pose_x, dt);
        let kalman_y = self.kalman_y.filter(pose_y, dt);

        let (noise_x, noise_y) = self.noise_reducer.filter_point(kalman_x, kalman_y);

        let (smooth_x, smooth_y) = self.adaptive_smoother.smooth(noise_x, noise_y, timestamp);

        Ok(NormPoint::clamped(smooth_x, smooth_y))
    }

    /// Feed one EAR sample and read back the debounced blink signal.
    pub fn stabilize_blink(&mut self, ear: f64, threshold: f64) -> GazeflowResult<bool> {
        if !(ear.is_finite() && threshold.is_finite()) {
            tracing::warn!(ear, threshold, "rejecting non-finite EAR sample");
            return Err(GazeflowError::signal(format!(
                "non-finite EAR sample {ear} (threshold {threshold})"
            )));
        }

        self.blink_stabilizer.add_ear_value(ear, threshold);
        Ok(self.blink_stabilizer.get_stable_blink())
    }

    /// Gather diagnostics from every stage; no side effects.
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            ear: self.blink_stabilizer.get_ear_stats(),
            head_variance: self.pose_filter.variance(),
            kalman_position: NormPoint::new(self.kalman_x.position(), self.kalman_y.position()),
            base_alpha: self.adaptive_smoother.base_alpha(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_stage_config_is_rejected() {
        let config = PipelineConfig {
            noise: NoiseConfig {
                history_size: 0,
                outlier_threshold: 2.5,
            },
            ..Default::default()
        };
        assert!(FilterPipeline::new(config).is_err());
    }

    #[test]
    fn test_output_stays_normalized() {
        let mut pipeline = FilterPipeline::with_defaults();
        for i in 0..50 {
            let t = i as f64 / 30.0;
            let point = pipeline.filter_position(0.9, 0.1, t).unwrap();
            assert!((0.0..=1.0).contains(&point.x));
            assert!((0.0..=1.0).contains(&point.y));
        }
    }

    #[test]
    fn test_non_finite_sample_leaves_state_untouched() {
        let mut pipeline = FilterPipeline::with_defaults();
        for i in 0..10 {
            let t = i as f64 / 30.0;
            pipeline.filter_position(0.5, 0.5, t).unwrap();
            pipeline.stabilize_blink(0.3, 0.2).unwrap();
        }
        let before = pipeline.debug_snapshot();

        assert!(pipeline.filter_position(f64::NAN, 0.5, 1.0).is_err());
        assert!(pipeline.filter_position(0.5, 0.5, f64::INFINITY).is_err());
        assert!(pipeline.stabilize_blink(f64::NAN, 0.2).is_err());

        let after = pipeline.debug_snapshot();
        assert_eq!(after.kalman_position, before.kalman_position);
        assert_eq!(after.head_variance, before.head_variance);
        assert_eq!(after.ear.mean, before.ear.mean);
    }

    #[test]
    fn test_out_of_range_position_is_clamped() {
        let mut pipeline = FilterPipeline::with_defaults();
        let point = pipeline.filter_position(1.7, -0.3, 0.0).unwrap();
        assert!((0.0..=1.0).contains(&point.x));
        assert!((0.0..=1.0).contains(&point.y));
    }

    #[test]
    fn test_backwards_clock_does_not_extrapolate() {
        let mut pipeline = FilterPipeline::with_defaults();
        pipeline.filter_position(0.5, 0.5, 1.0).unwrap();
        pipeline.filter_position(0.6, 0.5, 2.0).unwrap();
        // A stalled clock must still produce a valid output.
        let point = pipeline.filter_position(0.6, 0.5, 0.5).unwrap();
        assert!(point.is_finite());
    }

    #[test]
    fn test_blink_needs_full_window() {
        let mut pipeline = FilterPipeline::with_defaults();
        for _ in 0..7 {
            assert!(!pipeline.stabilize_blink(0.1, 0.2).unwrap());
        }
        assert!(pipeline.stabilize_blink(0.1, 0.2).unwrap());
    }

    #[test]
    fn test_debug_snapshot_reports_stage_state() {
        let mut pipeline = FilterPipeline::with_defaults();
        pipeline.filter_position(0.7, 0.4, 0.0).unwrap();
        pipeline.stabilize_blink(0.25, 0.2).unwrap();

        let snapshot = pipeline.debug_snapshot();
        assert!(snapshot.kalman_position.x > 0.0);
        assert!((snapshot.base_alpha - 0.3).abs() < 1e-12);
        assert!((snapshot.ear.mean - 0.25).abs() < 1e-12);
        assert!(snapshot.head_variance.0 > 0.0);
    }

    #[test]
    fn test_deterministic_for_fixed_inputs() {
        let run = || {
            let mut pipeline = FilterPipeline::with_defaults();
            let mut outputs = Vec::new();
            for i in 0..40 {
                let t = i as f64 / 30.0;
                let x = 0.5 + 0.2 * (0.3 * i as f64).sin();
                let y = 0.5 - 0.2 * (0.3 * i as f64).cos();
                outputs.push(pipeline.filter_position(x, y, t).unwrap());
            }
            outputs
        };
        assert_eq!(run(), run());
    }
}
