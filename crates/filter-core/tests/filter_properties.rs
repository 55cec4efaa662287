//! Property-based invariants for the filter chain.

use gazeflow_filter_core::noise::{NoiseConfig, NoiseReducer};
use gazeflow_filter_core::pipeline::FilterPipeline;
use gazeflow_filter_core::ring::Ring;
use proptest::prelude::*;

proptest! {
    #[test]
    fn ring_never_exceeds_capacity(
        capacity in 1usize..16,
        values in prop::collection::vec(any::<i64>(), 0..64),
    ) {
        let mut ring = Ring::new(capacity);
        for &v in &values {
            ring.push(v);
            prop_assert!(ring.len() <= capacity);
        }
    }

    #[test]
    fn ring_keeps_the_newest_values_in_order(
        capacity in 1usize..16,
        values in prop::collection::vec(any::<i64>(), 0..64),
    ) {
        let mut ring = Ring::new(capacity);
        for &v in &values {
            ring.push(v);
        }
        let start = values.len().saturating_sub(capacity);
        prop_assert_eq!(ring.to_vec(), values[start..].to_vec());
    }

    #[test]
    fn outlier_rejection_returns_an_ordered_subsequence(
        history_size in 1usize..12,
        samples in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 0..32),
    ) {
        let mut reducer = NoiseReducer::new(NoiseConfig {
            history_size,
            outlier_threshold: 2.5,
        }).unwrap();
        for &(x, y) in &samples {
            reducer.add_point(x, y);
        }

        let (x_clean, y_clean) = reducer.remove_outliers();
        prop_assert_eq!(x_clean.len(), y_clean.len());
        prop_assert!(x_clean.len() <= reducer.history_len());

        // Survivors must appear in the history's order.
        let held = samples[samples.len().saturating_sub(history_size)..].to_vec();
        let mut cursor = 0;
        for (&x, &y) in x_clean.iter().zip(y_clean.iter()) {
            let found = held[cursor..]
                .iter()
                .position(|&(hx, hy)| hx == x && hy == y);
            prop_assert!(found.is_some(), "cleaned sample not in history order");
            cursor += found.unwrap() + 1;
        }
    }

    #[test]
    fn pipeline_outputs_stay_finite_and_normalized(
        samples in prop::collection::vec((-0.5f64..1.5, -0.5f64..1.5, 0.0f64..0.1), 1..64),
    ) {
        let mut pipeline = FilterPipeline::with_defaults();
        let mut t = 0.0;
        for &(x, y, dt) in &samples {
            t += dt;
            let point = pipeline.filter_position(x, y, t).unwrap();
            prop_assert!(point.is_finite());
            prop_assert!((0.0..=1.0).contains(&point.x));
            prop_assert!((0.0..=1.0).contains(&point.y));
        }
    }
}
