//! Policy parameters shared between the control and audio threads
//!
//! Every value lives in its own atomic. A reader gets each value consistent on
//! its own, but two values read in one [`MatchParams::load`] may come from
//! different writes. Parameter changes are user driven, so a mix of old and
//! new values for one block is inaudible.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::warn;

use crate::sample::{AtomicSample, Sample};
use crate::types::{LoudnessKind, SideSelector};
use crate::{DEFAULT_BOUND_DB, DEFAULT_TARGET_LUFS};

/// Values read once per gain query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainPolicy<T> {
    /// Cap gain so the main peak stays at or below 0 dBFS
    pub ceiling: bool,
    /// Loudness definition to compare
    pub kind: LoudnessKind,
    /// Side loudness or absolute value as the reference
    pub side: SideSelector,
    /// Symmetric clamp magnitude in dB
    pub bound: T,
    /// Absolute target in LUFS, used with [`SideSelector::Value`]
    pub target: T,
}

impl<T: Sample> GainPolicy<T> {
    /// The absolute target, if the side selector asks for one
    pub fn absolute_target(&self) -> Option<T> {
        self.side.uses_absolute_target().then_some(self.target)
    }
}

/// Independently updatable policy values
#[derive(Debug)]
pub struct MatchParams<T: Sample> {
    ceiling: AtomicBool,
    kind: AtomicUsize,
    side: AtomicUsize,
    bound: AtomicSample<T>,
    target: AtomicSample<T>,
}

impl<T: Sample> MatchParams<T> {
    pub fn new() -> Self {
        Self {
            ceiling: AtomicBool::new(false),
            kind: AtomicUsize::new(LoudnessKind::default().index()),
            side: AtomicUsize::new(SideSelector::default().index()),
            bound: AtomicSample::new(T::from_f64(DEFAULT_BOUND_DB)),
            target: AtomicSample::new(T::from_f64(DEFAULT_TARGET_LUFS)),
        }
    }

    pub fn set_ceiling(&self, enabled: bool) {
        self.ceiling.store(enabled, Ordering::Relaxed);
    }

    pub fn set_loudness_kind(&self, kind: LoudnessKind) {
        self.kind.store(kind.index(), Ordering::Relaxed);
    }

    pub fn set_side(&self, side: SideSelector) {
        self.side.store(side.index(), Ordering::Relaxed);
    }

    /// Set the clamp magnitude (the sign is ignored)
    ///
    /// Non-finite values are dropped and the previous bound stays in effect.
    pub fn set_bound(&self, bound: T) {
        if !bound.is_finite() {
            warn!(bound = bound.to_f64(), "Ignoring non-finite gain bound");
            return;
        }
        self.bound.store(bound.abs());
    }

    /// Set the absolute target; non-finite values are dropped
    pub fn set_target(&self, target: T) {
        if !target.is_finite() {
            warn!(target = target.to_f64(), "Ignoring non-finite loudness target");
            return;
        }
        self.target.store(target);
    }

    /// Read every value once
    pub fn load(&self) -> GainPolicy<T> {
        GainPolicy {
            ceiling: self.ceiling.load(Ordering::Relaxed),
            kind: LoudnessKind::from_index(self.kind.load(Ordering::Relaxed)).unwrap_or_default(),
            side: SideSelector::from_index(self.side.load(Ordering::Relaxed)).unwrap_or_default(),
            bound: self.bound.load(),
            target: self.target.load(),
        }
    }
}

impl<T: Sample> Default for MatchParams<T> {
    fn default() -> Self {
        Self::new()
    }
}
