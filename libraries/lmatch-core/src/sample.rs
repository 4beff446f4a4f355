//! Floating point widths usable for loudness values
//!
//! The tracker is generic over `f32` and `f64`. Values cross threads through
//! [`AtomicSample`], which stores the bit pattern in an `AtomicU64`.

use std::fmt::Debug;
use std::ops::{Neg, Sub};
use std::sync::atomic::{AtomicU64, Ordering};

/// A floating point type loudness values are stored in
pub trait Sample:
    Copy + Default + PartialOrd + Debug + Send + Sync + Sub<Output = Self> + Neg<Output = Self> + 'static
{
    /// Width of one value in the persisted record layout
    const BYTES: usize;

    /// Neutral gain
    const ZERO: Self;

    /// Append the little-endian bytes of this value
    fn write_le(self, out: &mut Vec<u8>);

    /// Read a value from exactly [`Self::BYTES`] little-endian bytes
    fn read_le(bytes: &[u8]) -> Self;

    fn to_bits_u64(self) -> u64;

    fn from_bits_u64(bits: u64) -> Self;

    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;

    fn abs(self) -> Self;

    fn is_finite(self) -> bool;

    /// Smaller of two values
    fn min_of(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Clamp into `[-bound, bound]`
    fn clamp_magnitude(self, bound: Self) -> Self {
        let bound = bound.abs();
        if self > bound {
            bound
        } else if self < -bound {
            -bound
        } else {
            self
        }
    }
}

impl Sample for f32 {
    const BYTES: usize = 4;
    const ZERO: Self = 0.0;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        f32::from_le_bytes(buf)
    }

    fn to_bits_u64(self) -> u64 {
        u64::from(self.to_bits())
    }

    fn from_bits_u64(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn abs(self) -> Self {
        f32::abs(self)
    }

    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl Sample for f64 {
    const BYTES: usize = 8;
    const ZERO: Self = 0.0;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        f64::from_le_bytes(buf)
    }

    fn to_bits_u64(self) -> u64 {
        self.to_bits()
    }

    fn from_bits_u64(bits: u64) -> Self {
        f64::from_bits(bits)
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn abs(self) -> Self {
        f64::abs(self)
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

/// Lock-free cell for a single [`Sample`]
#[derive(Debug)]
pub struct AtomicSample<T: Sample> {
    bits: AtomicU64,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Sample> AtomicSample<T> {
    pub fn new(value: T) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits_u64()),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn load(&self) -> T {
        T::from_bits_u64(self.bits.load(Ordering::Relaxed))
    }

    pub fn store(&self, value: T) {
        self.bits.store(value.to_bits_u64(), Ordering::Relaxed);
    }
}

impl<T: Sample> Default for AtomicSample<T> {
    fn default() -> Self {
        Self::new(T::ZERO)
    }
}
