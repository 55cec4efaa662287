//! Gazeflow Filter Core — The Stabilization Chain
//!
//! Turns noisy per-frame tracker output into pointer-grade signals:
//! - **HeadPoseFilter:** variance-gated low-pass on the raw pose
//! - **Kalman1D:** per-axis constant-velocity position/velocity estimation
//! - **NoiseReducer:** MAD outlier rejection + local polynomial smoothing
//! - **AdaptiveSmoother:** speed-adaptive exponential smoothing
//! - **BlinkStabilizer / BlinkClassifier:** debounce and classification of
//!   the eye-closure signal
//!
//! This crate is pure computation — no I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod blink;
pub mod kalman;
pub mod noise;
pub mod pipeline;
pub mod pose;
pub mod ring;
pub mod smoother;

pub use blink::{BlinkClassifier, BlinkEvent, BlinkKind, BlinkStabilizer, EarStats};
pub use kalman::Kalman1D;
pub use noise::NoiseReducer;
pub use pipeline::{DebugSnapshot, FilterPipeline, PipelineConfig};
pub use pose::HeadPoseFilter;
pub use smoother::AdaptiveSmoother;
