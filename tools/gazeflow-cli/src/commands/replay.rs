//! Run the filter pipeline over a recorded trace.

use std::path::PathBuf;

use gazeflow_filter_core::blink::{BlinkClassifier, BlinkPatternConfig};
use gazeflow_filter_core::pipeline::{FilterPipeline, PipelineConfig};
use gazeflow_signal_model::{parse_samples, serialize_samples, TrackerSample};

pub fn run(
    path: PathBuf,
    params: Option<PathBuf>,
    ear_threshold: f64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Replaying trace: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .map_err(|_| anyhow::anyhow!("Trace file not found: {}", path.display()))?;
    let samples =
        parse_samples(&content).map_err(|e| anyhow::anyhow!("Failed to parse trace: {e}"))?;
    println!("  Loaded {} samples", samples.len());

    if samples.is_empty() {
        println!("  Nothing to replay.");
        return Ok(());
    }

    let config = match params {
        Some(params_path) => {
            let raw = std::fs::read_to_string(&params_path)
                .map_err(|_| anyhow::anyhow!("Params file not found: {}", params_path.display()))?;
            serde_json::from_str::<PipelineConfig>(&raw)
                .map_err(|e| anyhow::anyhow!("Failed to parse params: {e}"))?
        }
        None => PipelineConfig::default(),
    };
    tracing::debug!(?config, "replaying with pipeline config");

    let mut pipeline =
        FilterPipeline::new(config).map_err(|e| anyhow::anyhow!("Invalid params: {e}"))?;
    let mut classifier = BlinkClassifier::new(BlinkPatternConfig::default())
        .map_err(|e| anyhow::anyhow!("Invalid blink pattern config: {e}"))?;

    let mut smoothed = Vec::with_capacity(samples.len());
    let mut blink_events = Vec::new();
    let mut skipped = 0usize;

    for sample in &samples {
        if !sample.is_finite() {
            skipped += 1;
            continue;
        }
        let t = sample.timestamp_secs();
        let point = pipeline
            .filter_position(sample.x, sample.y, t)
            .map_err(|e| anyhow::anyhow!("Pipeline rejected sample: {e}"))?;
        let closed = pipeline
            .stabilize_blink(sample.ear, ear_threshold)
            .map_err(|e| anyhow::anyhow!("Pipeline rejected EAR: {e}"))?;

        if let Some(event) = classifier.update(closed, t) {
            blink_events.push((t, event));
        }

        smoothed.push(TrackerSample::new(
            sample.timestamp_ns,
            point.x,
            point.y,
            sample.ear,
        ));
    }

    if skipped > 0 {
        println!("  Skipped {skipped} non-finite samples");
    }

    let raw_jitter = jitter(&samples);
    let smooth_jitter = jitter(&smoothed);
    println!("  Pointer jitter (frame-to-frame variance):");
    println!("    raw:      {raw_jitter:.8}");
    println!("    smoothed: {smooth_jitter:.8}");
    if raw_jitter > 0.0 {
        println!(
            "    reduction: {:.1}%",
            (1.0 - smooth_jitter / raw_jitter) * 100.0
        );
    }

    println!("  Blink events ({}):", blink_events.len());
    for (t, event) in &blink_events {
        println!(
            "    {t:7.3}s  {:?} ({:.0} ms closed)",
            event.kind,
            event.duration_secs * 1000.0
        );
    }

    let snapshot = pipeline.debug_snapshot();
    println!(
        "  Final snapshot: {}",
        serde_json::to_string_pretty(&snapshot)?
    );

    if let Some(output_path) = output {
        let jsonl = serialize_samples(&smoothed)?;
        std::fs::write(&output_path, jsonl)?;
        println!("  Smoothed trace written to: {}", output_path.display());
    }

    println!("\nReplay complete.");
    Ok(())
}

/// Variance of the frame-to-frame pointer increments.
fn jitter(samples: &[TrackerSample]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = samples
        .windows(2)
        .flat_map(|w| [w[1].x - w[0].x, w[1].y - w[0].y])
        .collect();
    let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
    diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / diffs.len() as f64
}
