//! Gazeflow Common Utilities
//!
//! Shared infrastructure for all Gazeflow crates:
//! - Error types and result aliases
//! - Frame clock utilities for timestamping tracker samples
//! - Tracing/logging initialization

pub mod clock;
pub mod error;
pub mod logging;

pub use clock::*;
pub use error::*;
