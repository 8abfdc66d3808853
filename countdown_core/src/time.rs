// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wall-clock instants and signed millisecond durations.
//!
//! [`WallTime`] is a point in time as milliseconds since the Unix epoch, the
//! unit browsers report from `Date.now()`. [`Millis`] is a signed duration in
//! the same unit; offsets and lead-times may both be negative.
//!
//! All arithmetic saturates at the `i64` bounds instead of wrapping, so a
//! pathological override can never panic inside the tick loop.

use core::fmt;
use core::ops::{Add, Neg, Sub};

/// Milliseconds per hour.
pub const MS_PER_HOUR: i64 = 3_600_000;
/// Milliseconds per minute.
pub const MS_PER_MINUTE: i64 = 60_000;
/// Milliseconds per second.
pub const MS_PER_SECOND: i64 = 1_000;

/// A point in time as milliseconds since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WallTime(pub i64);

impl WallTime {
    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }

    /// Signed duration from `earlier` to `self`.
    #[inline]
    #[must_use]
    pub const fn since(self, earlier: Self) -> Millis {
        Millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Millis> for WallTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Millis) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub<Millis> for WallTime {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Millis) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sub for WallTime {
    type Output = Millis;

    #[inline]
    fn sub(self, rhs: Self) -> Millis {
        self.since(rhs)
    }
}

impl fmt::Debug for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WallTime({})", self.0)
    }
}

/// A signed duration in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(pub i64);

impl Millis {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Creates a duration from whole seconds.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(MS_PER_SECOND))
    }

    /// Creates a duration from fractional seconds.
    ///
    /// Sub-millisecond fractions are truncated toward zero. Returns `None`
    /// for NaN or infinite input.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float-to-int `as` saturates; sub-millisecond truncation is intentional"
    )]
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        Some(Self((secs * 1000.0) as i64))
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Millis {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for Millis {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl Neg for Millis {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl fmt::Debug for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Millis({})", self.0)
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_is_signed() {
        let a = WallTime(1_000);
        let b = WallTime(4_500);
        assert_eq!(b.since(a), Millis(3_500));
        assert_eq!(a.since(b), Millis(-3_500));
        assert_eq!(a - b, Millis(-3_500));
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let t = WallTime(i64::MAX - 5);
        assert_eq!(t + Millis(100), WallTime(i64::MAX));
        assert_eq!(WallTime(i64::MIN) - Millis(1), WallTime(i64::MIN));
        assert_eq!(-Millis(i64::MIN), Millis(i64::MAX));
    }

    #[test]
    fn fractional_seconds_truncate() {
        assert_eq!(Millis::from_secs_f64(1.5), Some(Millis(1_500)));
        assert_eq!(Millis::from_secs_f64(0.0004), Some(Millis(0)));
        assert_eq!(Millis::from_secs_f64(-2.25), Some(Millis(-2_250)));
        assert_eq!(Millis::from_secs_f64(f64::NAN), None);
        assert_eq!(Millis::from_secs_f64(f64::INFINITY), None);
    }

    #[test]
    fn whole_seconds() {
        assert_eq!(Millis::from_secs(11), Millis(11_000));
        assert_eq!(Millis::from_secs(-3), Millis(-3_000));
    }
}
