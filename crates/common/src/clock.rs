//! Frame clock utilities.
//!
//! The filter core never reads a clock: every filtering call takes an
//! explicit timestamp supplied by the caller. `FrameClock` is the
//! caller-boundary convenience for processing loops that run off the
//! wall clock. It anchors a monotonic epoch at tracking start and
//! hands out elapsed timestamps from it.

use std::time::Instant;

/// A tracking clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment tracking started).
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// The instant tracking started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl FrameClock {
    /// Create a new frame clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a clock from a known epoch (for replaying saved traces).
    pub fn from_epoch(epoch: Instant, wall: String) -> Self {
        Self {
            epoch,
            epoch_wall: wall,
        }
    }

    /// Get nanoseconds elapsed since tracking start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since tracking start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at tracking start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Convert seconds to nanoseconds.
    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs * 1_000_000_000.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = FrameClock::start();
        // Should be very small but non-negative
        assert!(clock.elapsed_ns() < 1_000_000_000); // less than 1 second
    }

    #[test]
    fn test_ns_to_secs_conversion() {
        assert!((FrameClock::ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
        assert_eq!(FrameClock::secs_to_ns(2.0), 2_000_000_000);
    }

    #[test]
    fn test_elapsed_secs_monotonic() {
        let clock = FrameClock::start();
        let a = clock.elapsed_secs();
        let b = clock.elapsed_secs();
        assert!(b >= a);
    }
}
