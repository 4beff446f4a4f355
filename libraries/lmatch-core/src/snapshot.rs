//! Immutable loudness snapshots
//!
//! A snapshot holds the main and side loudness for every definition plus the
//! main peak, valid at a sample position. It knows how to turn itself into a
//! gain and how to read and write its fixed-size record.
//!
//! # Record layout
//!
//! ```text
//! ┌───────────────────┬─────────────────────┬──────┬──────────────┐
//! │ main[N] (T, LE)   │ target[N] (T, LE)   │ peak │ position i64 │
//! └───────────────────┴─────────────────────┴──────┴──────────────┘
//! ```

use crate::sample::Sample;
use crate::types::{LoudnessKind, LoudnessValues, Measurement, LOUDNESS_KINDS};

/// Loudness measurements valid at a playback position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<T> {
    main_loudness: LoudnessValues<T>,
    target_loudness: LoudnessValues<T>,
    peak: T,
    position: i64,
}

impl<T: Sample> Snapshot<T> {
    /// Size of one persisted record in bytes
    pub const RECORD_SIZE: usize =
        T::BYTES * (2 * LOUDNESS_KINDS + 1) + std::mem::size_of::<i64>();

    pub fn new(
        main_loudness: LoudnessValues<T>,
        target_loudness: LoudnessValues<T>,
        peak: T,
        position: i64,
    ) -> Self {
        Self {
            main_loudness,
            target_loudness,
            peak,
            position,
        }
    }

    /// Snapshot that always yields zero gain
    pub fn neutral(position: i64) -> Self {
        Self::new([T::ZERO; LOUDNESS_KINDS], [T::ZERO; LOUDNESS_KINDS], T::ZERO, position)
    }

    pub fn from_measurement(measurement: &Measurement<T>, position: i64) -> Self {
        Self::new(
            measurement.main,
            measurement.target,
            measurement.peak,
            position,
        )
    }

    /// Gain in dB that moves the main loudness onto the target
    ///
    /// With `absolute_target` set the main loudness is matched against that
    /// value instead of the side loudness. With `ceiling` the gain never
    /// pushes the recorded peak above 0 dBFS.
    pub fn gain(&self, kind: LoudnessKind, ceiling: bool, absolute_target: Option<T>) -> T {
        let main = self.main_loudness[kind.index()];
        let reference = absolute_target.unwrap_or(self.target_loudness[kind.index()]);
        let gain = reference - main;
        if ceiling {
            gain.min_of(-self.peak)
        } else {
            gain
        }
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn main_loudness(&self) -> &LoudnessValues<T> {
        &self.main_loudness
    }

    pub fn target_loudness(&self) -> &LoudnessValues<T> {
        &self.target_loudness
    }

    pub fn peak(&self) -> T {
        self.peak
    }

    /// Whether every loudness value and the peak are finite
    pub fn is_finite(&self) -> bool {
        self.main_loudness
            .iter()
            .chain(&self.target_loudness)
            .all(|value| value.is_finite())
            && self.peak.is_finite()
    }

    /// Append this snapshot's record to `out`
    pub fn write_record(&self, out: &mut Vec<u8>) {
        for value in self.main_loudness.iter().chain(&self.target_loudness) {
            value.write_le(out);
        }
        self.peak.write_le(out);
        out.extend_from_slice(&self.position.to_le_bytes());
    }

    /// Read one record of exactly [`Self::RECORD_SIZE`] bytes
    pub(crate) fn read_record(record: &[u8]) -> Self {
        debug_assert_eq!(record.len(), Self::RECORD_SIZE);

        let mut values = record.chunks_exact(T::BYTES).map(T::read_le);
        let mut next_values = || {
            let mut out = [T::ZERO; LOUDNESS_KINDS];
            for (slot, value) in out.iter_mut().zip(values.by_ref()) {
                *slot = value;
            }
            out
        };
        let main_loudness = next_values();
        let target_loudness = next_values();

        let peak_at = 2 * LOUDNESS_KINDS * T::BYTES;
        let position_at = peak_at + T::BYTES;
        let peak = T::read_le(&record[peak_at..position_at]);

        let mut position = [0u8; 8];
        position.copy_from_slice(&record[position_at..]);

        Self::new(
            main_loudness,
            target_loudness,
            peak,
            i64::from_le_bytes(position),
        )
    }
}
