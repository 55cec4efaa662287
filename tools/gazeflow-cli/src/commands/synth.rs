//! Generate a deterministic synthetic tracker trace.
//!
//! The head follows a slow circular sweep with seeded Gaussian jitter, and
//! the eye blinks once every few seconds. Useful for exercising the replay
//! path without a camera.

use std::path::PathBuf;

use gazeflow_common::FrameClock;
use gazeflow_signal_model::{serialize_samples, TraceHeader, TrackerSample};

/// Open-eye EAR baseline and the dip used for synthetic blinks.
const EAR_OPEN: f64 = 0.30;
const EAR_CLOSED: f64 = 0.08;

/// Deterministic pseudo-random source (64-bit LCG).
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_gaussian(&mut self) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

pub fn run(output: PathBuf, frames: usize, fps: u32, noise: f64, seed: u64) -> anyhow::Result<()> {
    if fps == 0 {
        anyhow::bail!("fps must be at least 1");
    }

    let mut rng = Lcg::new(seed);
    let frame_ns = 1_000_000_000u64 / fps as u64;

    // Blink for ~5 frames once every 3 seconds.
    let blink_period = (3 * fps) as usize;
    let blink_len = ((fps as usize) / 6).max(2);

    let mut samples = Vec::with_capacity(frames);
    for i in 0..frames {
        let t = i as f64;
        let x = 0.5 + 0.3 * (0.1 * t).sin() + noise * rng.next_gaussian();
        let y = 0.5 + 0.3 * (0.1 * t).cos() + noise * rng.next_gaussian();

        let blinking = i % blink_period < blink_len;
        let ear_base = if blinking { EAR_CLOSED } else { EAR_OPEN };
        let ear = ear_base + 0.01 * rng.next_gaussian();

        samples.push(TrackerSample::new(
            i as u64 * frame_ns,
            x.clamp(0.0, 1.0),
            y.clamp(0.0, 1.0),
            ear.max(0.0),
        ));
    }

    let clock = FrameClock::start();
    let header = TraceHeader::new(clock.epoch_wall(), fps);
    let mut content = format!("# {}\n", serde_json::to_string(&header)?);
    content.push_str(&serialize_samples(&samples)?);
    std::fs::write(&output, content)?;

    println!(
        "Wrote {} frames ({:.1}s at {} Hz) to {}",
        samples.len(),
        frames as f64 / fps as f64,
        fps,
        output.display()
    );

    Ok(())
}
