//! Position-indexed gain tracking
//!
//! [`GainTracker`] keeps the loudness history of a session and answers "what
//! gain applies at this position" for the audio thread.
//!
//! # Threads
//!
//! ```text
//! analysis thread                         audio thread
//! ───────────────                         ────────────
//! learn_diff / reset / from_persisted     set_position
//!   take `writer` lock                    get_diff
//!   build next history (copy)               lock-free load of the history
//!   swap it into `history` ─────────────►   search the immutable history
//!   retire the old one
//! ```
//!
//! The audio thread never takes a lock. Replaced histories stay in the
//! producer's retire list until no reader holds them, so the last reference
//! is always dropped on the analysis thread.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::params::{GainPolicy, MatchParams};
use crate::persist::{decode_history, encode_history, validate_order};
use crate::sample::Sample;
use crate::search::find_from_hint;
use crate::settings::{MatchSettings, TrackerState};
use crate::snapshot::Snapshot;
use crate::types::{LoudnessKind, LoudnessValues, Measurement, SideSelector};

/// Shared, immutable view of the history
pub type History<T> = Arc<Vec<Snapshot<T>>>;

/// Loudness history plus the policy that turns it into gain
///
/// Every [`learn_diff`](Self::learn_diff) copies the history before
/// publishing it, which is O(n) on the analysis thread. At ten measurements
/// per second a three hour session holds about 100k snapshots, a few MB per
/// copy.
///
/// # Example
///
/// ```
/// use lmatch_core::GainTracker;
///
/// let tracker = GainTracker::<f32>::new();
///
/// // Analysis thread: a measurement window finished at sample 48000
/// tracker.set_position(48_000);
/// tracker.learn_diff([-20.0; 3], [-14.0; 3], -1.0);
///
/// // Audio thread: somewhere inside the measured window
/// tracker.set_position(24_000);
/// assert_eq!(tracker.get_diff(), 6.0);
/// ```
#[derive(Debug)]
pub struct GainTracker<T: Sample> {
    /// Current playback position in samples
    position: AtomicI64,
    /// Index of the last resolved snapshot (lookup hint only)
    cursor: AtomicUsize,
    params: MatchParams<T>,
    history: ArcSwap<Vec<Snapshot<T>>>,
    /// Replaced histories still held by a reader; the lock serializes producers
    retired: Mutex<Vec<History<T>>>,
}

fn lock<U>(mutex: &Mutex<U>) -> MutexGuard<'_, U> {
    // The retire list holds plain `Arc`s, always left consistent
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Sample> GainTracker<T> {
    /// Create a tracker at position 0 with a neutral history
    pub fn new() -> Self {
        Self {
            position: AtomicI64::new(0),
            cursor: AtomicUsize::new(0),
            params: MatchParams::new(),
            history: ArcSwap::from_pointee(vec![Snapshot::neutral(0)]),
            retired: Mutex::new(Vec::new()),
        }
    }

    /// Create a tracker with the given settings applied
    pub fn with_settings(settings: &MatchSettings) -> Result<Self> {
        let tracker = Self::new();
        tracker.apply_settings(settings)?;
        Ok(tracker)
    }

    /// Drop all history and seed a neutral snapshot at the current position
    pub fn reset(&self) {
        let mut retired = lock(&self.retired);
        let position = self.position();
        self.publish(&mut retired, vec![Snapshot::neutral(position)]);
        self.cursor.store(0, Ordering::Relaxed);
        debug!(position, "Loudness history reset");
    }

    /// Publish the playback position used by the next learn or query
    pub fn set_position(&self, position: i64) {
        self.position.store(position, Ordering::Relaxed);
    }

    pub fn position(&self) -> i64 {
        self.position.load(Ordering::Relaxed)
    }

    pub fn set_ceiling(&self, enabled: bool) {
        self.params.set_ceiling(enabled);
    }

    pub fn set_side(&self, side: SideSelector) {
        self.params.set_side(side);
    }

    pub fn set_loudness_kind(&self, kind: LoudnessKind) {
        self.params.set_loudness_kind(kind);
    }

    /// Set the maximum correction magnitude in dB
    pub fn set_bound(&self, bound: T) {
        self.params.set_bound(bound);
    }

    /// Set the absolute target in LUFS
    pub fn set_target(&self, target: T) {
        self.params.set_target(target);
    }

    /// Current policy values
    pub fn policy(&self) -> GainPolicy<T> {
        self.params.load()
    }

    pub fn apply_settings(&self, settings: &MatchSettings) -> Result<()> {
        settings.validate()?;
        self.params.set_ceiling(settings.ceiling);
        self.params.set_loudness_kind(settings.loudness);
        self.params.set_side(settings.side);
        self.params.set_bound(T::from_f64(settings.bound_db));
        self.params.set_target(T::from_f64(settings.target_lufs));
        Ok(())
    }

    pub fn settings(&self) -> MatchSettings {
        let policy = self.params.load();
        MatchSettings {
            ceiling: policy.ceiling,
            loudness: policy.kind,
            side: policy.side,
            bound_db: policy.bound.to_f64(),
            target_lufs: policy.target.to_f64(),
        }
    }

    /// Record a measurement at the current position
    ///
    /// Any snapshot at or after the current position is dropped first, so
    /// after a rewind or loop the new measurement supersedes the old future.
    pub fn learn_diff(
        &self,
        main_loudness: LoudnessValues<T>,
        target_loudness: LoudnessValues<T>,
        main_peak: T,
    ) {
        let mut retired = lock(&self.retired);
        let position = self.position();
        let current = self.history();

        let keep = current.partition_point(|snapshot| snapshot.position() < position);
        if keep < current.len() {
            debug!(
                position,
                superseded = current.len() - keep,
                "Superseding loudness history after transport moved back"
            );
        }

        let mut next = Vec::with_capacity(keep + 1);
        next.extend_from_slice(&current[..keep]);
        next.push(Snapshot::new(
            main_loudness,
            target_loudness,
            main_peak,
            position,
        ));
        drop(current);

        trace!(position, len = next.len(), "Learned loudness snapshot");
        self.publish(&mut retired, next);
    }

    /// [`learn_diff`](Self::learn_diff) from a monitor measurement
    pub fn learn(&self, measurement: &Measurement<T>) {
        self.learn_diff(measurement.main, measurement.target, measurement.peak);
    }

    /// Gain in dB for the current position
    ///
    /// Returns zero when the position is before the first snapshot or at or
    /// after the last one. Otherwise the snapshot ending the interval that
    /// contains the position supplies the gain, clamped to the bound.
    pub fn get_diff(&self) -> T {
        let position = self.position();
        let history = self.history.load();

        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return T::ZERO;
        };
        if position < first.position() || position >= last.position() {
            return T::ZERO;
        }

        let hint = self.cursor.load(Ordering::Relaxed);
        let found = find_from_hint(history.len(), hint, |index| {
            index > 0
                && history[index - 1].position() <= position
                && position < history[index].position()
        });
        let Some(index) = found else {
            return T::ZERO;
        };
        self.cursor.store(index, Ordering::Relaxed);

        let policy = self.params.load();
        history[index]
            .gain(policy.kind, policy.ceiling, policy.absolute_target())
            .clamp_magnitude(policy.bound)
    }

    /// Current history (cheap `Arc` clone)
    pub fn history(&self) -> History<T> {
        self.history.load_full()
    }

    /// Number of snapshots in the history
    pub fn len(&self) -> usize {
        self.history().len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.history().is_empty()
    }

    /// Encode the full history as base64 records
    pub fn to_persisted(&self) -> String {
        encode_history(&self.history())
    }

    /// Replace the history with a decoded one
    ///
    /// On error the current history is left untouched. An empty string yields
    /// a neutral history at the current position.
    pub fn from_persisted(&self, encoded: &str) -> Result<()> {
        let mut decoded = decode_history::<T>(encoded)?;
        validate_order(&decoded)?;
        if decoded.is_empty() {
            decoded.push(Snapshot::neutral(self.position()));
        }

        let mut retired = lock(&self.retired);
        debug!(len = decoded.len(), "Restored loudness history");
        self.publish(&mut retired, decoded);
        self.cursor.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Settings and history for a host state blob
    pub fn save_state(&self) -> TrackerState {
        TrackerState {
            settings: self.settings(),
            history: self.to_persisted(),
        }
    }

    /// Restore settings and history; nothing changes if either is invalid
    pub fn restore_state(&self, state: &TrackerState) -> Result<()> {
        let restored = state
            .settings
            .validate()
            .and_then(|()| self.from_persisted(&state.history));
        if let Err(err) = restored {
            warn!(error = %err, "Rejected saved loudness state");
            return Err(err);
        }
        self.apply_settings(&state.settings)
    }

    /// Swap in a new history and free every retired one no reader holds
    fn publish(&self, retired: &mut Vec<History<T>>, next: Vec<Snapshot<T>>) {
        retired.push(self.history.swap(Arc::new(next)));
        retired.retain(|history| Arc::strong_count(history) > 1);
    }
}

impl<T: Sample> Default for GainTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}
