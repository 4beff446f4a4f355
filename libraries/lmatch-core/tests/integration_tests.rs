//! Integration tests for lmatch-core
//!
//! Tests include:
//! - Property-based tests with proptest
//! - Interval lookup against a brute-force reference
//! - Concurrent learning and querying

use lmatch_core::persist::{decode_history, encode_history};
use lmatch_core::{GainTracker, LoudnessKind, Snapshot};
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

// ========== Helper Functions ==========

/// Gain every snapshot reports for `ShortTerm`, unclamped, side anchored
fn snapshot_gain(snapshot: &Snapshot<f64>) -> f64 {
    snapshot.gain(LoudnessKind::ShortTerm, false, None)
}

/// Reference lookup: linear scan for the interval containing `position`
fn brute_force_gain(history: &[Snapshot<f64>], position: i64) -> f64 {
    history
        .windows(2)
        .find(|pair| pair[0].position() <= position && position < pair[1].position())
        .map_or(0.0, |pair| snapshot_gain(&pair[1]))
}

/// Build a tracker with one snapshot per position, gains 1, 2, 3, ...
fn tracker_with_positions(positions: &[i64]) -> GainTracker<f64> {
    let tracker = GainTracker::<f64>::new();
    tracker.set_bound(1000.0);
    for (step, &position) in positions.iter().enumerate() {
        tracker.set_position(position);
        tracker.learn_diff([-50.0; 3], [-50.0 + (step + 1) as f64; 3], -60.0);
    }
    tracker
}

fn arb_snapshot() -> impl Strategy<Value = (Vec<f32>, f32, i64)> {
    (
        prop::collection::vec(-120.0_f32..20.0, 6),
        -120.0_f32..20.0,
        any::<i64>(),
    )
}

// ========== Property-Based Tests ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Encoding then decoding any history reproduces it exactly
    #[test]
    fn persisted_history_roundtrips(records in prop::collection::vec(arb_snapshot(), 0..=50)) {
        let history: Vec<Snapshot<f32>> = records
            .iter()
            .map(|(values, peak, position)| {
                Snapshot::new(
                    [values[0], values[1], values[2]],
                    [values[3], values[4], values[5]],
                    *peak,
                    *position,
                )
            })
            .collect();

        let decoded = decode_history::<f32>(&encode_history(&history)).unwrap();
        prop_assert_eq!(decoded, history);
    }

    /// Cursor-hinted lookup agrees with a linear scan for any query order
    #[test]
    fn lookup_matches_brute_force(
        gaps in prop::collection::vec(1_i64..500, 1..40),
        queries in prop::collection::vec(-100_i64..25_000, 1..200),
    ) {
        let positions: Vec<i64> = gaps
            .iter()
            .scan(0_i64, |position, gap| {
                *position += gap;
                Some(*position)
            })
            .collect();
        let tracker = tracker_with_positions(&positions);
        let history = tracker.history();

        for query in queries {
            tracker.set_position(query);
            prop_assert_eq!(tracker.get_diff(), brute_force_gain(&history, query));
        }
    }

    /// Learning never leaves history unordered, whatever the transport does
    #[test]
    fn learning_keeps_history_ordered(positions in prop::collection::vec(-1000_i64..1000, 1..100)) {
        let tracker = GainTracker::<f64>::new();
        for position in &positions {
            tracker.set_position(*position);
            tracker.learn_diff([-20.0; 3], [-18.0; 3], -6.0);

            let history = tracker.history();
            prop_assert!(!history.is_empty());
            prop_assert_eq!(history.last().unwrap().position(), *position);
            prop_assert!(history.windows(2).all(|w| w[0].position() < w[1].position()));
        }
    }

    /// The returned gain never leaves the configured bound
    #[test]
    fn gain_respects_bound(
        bound in 0.0_f64..30.0,
        main in -80.0_f64..0.0,
        target in -80.0_f64..0.0,
        query in 0_i64..100,
    ) {
        let tracker = GainTracker::<f64>::new();
        tracker.set_bound(bound);
        tracker.set_position(100);
        tracker.learn_diff([main; 3], [target; 3], -1.0);
        tracker.set_position(query);

        let gain = tracker.get_diff();
        prop_assert!(gain.abs() <= bound);
        prop_assert_eq!(gain, (target - main).clamp(-bound, bound));
    }
}

// ========== Edge Case Tests ==========

#[test]
fn test_truncation_example() {
    let tracker = tracker_with_positions(&[100, 200, 300]);
    tracker.set_position(150);
    tracker.learn_diff([-20.0; 3], [-20.0; 3], -6.0);

    let positions: Vec<i64> = tracker.history().iter().map(|s| s.position()).collect();
    assert_eq!(positions, vec![0, 100, 150]);
}

#[test]
fn test_backward_and_forward_jumps() {
    let tracker = tracker_with_positions(&[100, 200, 300, 400, 500]);
    let expected = [(450, 5.0), (50, 1.0), (350, 4.0), (150, 2.0), (499, 5.0), (100, 2.0)];
    for (position, gain) in expected {
        tracker.set_position(position);
        assert_eq!(tracker.get_diff(), gain, "position {}", position);
    }
}

#[test]
fn test_negative_positions() {
    let tracker = GainTracker::<f64>::new();
    tracker.set_position(-500);
    tracker.reset();
    tracker.set_position(-100);
    tracker.learn_diff([-20.0; 3], [-17.0; 3], -6.0);

    tracker.set_position(-300);
    assert_eq!(tracker.get_diff(), 3.0);
    tracker.set_position(-501);
    assert_eq!(tracker.get_diff(), 0.0);
}

// ========== Concurrency Tests ==========

#[test]
fn test_concurrent_learn_and_query() {
    let tracker = Arc::new(GainTracker::<f64>::new());
    tracker.set_bound(12.0);
    let running = Arc::new(AtomicBool::new(true));

    let producer = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || {
            for step in 1..=2000_i64 {
                // Loop the transport every 500 windows
                tracker.set_position((step % 500) * 256 + 256);
                tracker.learn_diff([-20.0; 3], [-20.0 + (step % 7) as f64; 3], -3.0);
                if step % 100 == 0 {
                    tracker.set_ceiling(step % 200 == 0);
                }
            }
        })
    };

    let consumer = {
        let tracker = Arc::clone(&tracker);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut queries = 0_u64;
            loop {
                let gain = tracker.get_diff();
                assert!(gain.is_finite());
                assert!(gain.abs() <= 12.0);
                queries += 1;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
            }
            queries
        })
    };

    producer.join().unwrap();
    running.store(false, Ordering::Relaxed);
    let queries = consumer.join().unwrap();
    assert!(queries > 0);

    let history = tracker.history();
    assert!(history.windows(2).all(|w| w[0].position() < w[1].position()));
}
