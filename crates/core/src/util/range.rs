use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, ops::RangeInclusive};

/// A type of value that we can create ranges of, where a range has a min and
/// max. Shapes use ranges of `f64` for continuous extents (lattice
/// coordinates, radii, angles) and ranges of `i32` for index extents (hex
/// columns, rows, layers).
pub trait Rangeable: Copy + Debug + PartialOrd {
    fn zero() -> Self;
}

impl Rangeable for f64 {
    fn zero() -> Self {
        0.0
    }
}

impl Rangeable for i32 {
    fn zero() -> Self {
        0
    }
}

/// A range between two numeric values, inclusive on both ends. Ranges come
/// straight from user-facing shape parameters, so nothing stops `min` from
/// exceeding `max`. Call [NumRange::sorted] before doing math on one.
#[derive(Copy, Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
#[display(fmt = "[{:?}, {:?}]", min, max)]
pub struct NumRange<T: Rangeable> {
    pub min: T,
    pub max: T,
}

impl<T: Rangeable> NumRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Get a copy of this range with the bounds in ascending order
    pub fn sorted(self) -> Self {
        let Self { mut min, mut max } = self;
        crate::util::swap_if(min > max, &mut min, &mut max);
        Self { min, max }
    }

    /// Check if a value is in this range. Ranges are inclusive on both ends.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Force a value into this range. If it's already in the range, return
    /// that value. If it's outside the range, return the bound (lower or upper)
    /// that's closest to the value.
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Raise the lower bound to at least zero. Used for radial extents, where
    /// a negative radius is meaningless.
    pub fn non_negative(self) -> Self {
        let zero = T::zero();
        Self {
            min: if self.min < zero { zero } else { self.min },
            max: if self.max < zero { zero } else { self.max },
        }
    }
}

impl NumRange<f64> {
    /// Max minus min
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Linear interpolation, `t = 0` is min and `t = 1` is max
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + self.span() * t
    }

    /// All integers that fall within this range. Empty if the range holds no
    /// integer (or is inverted).
    pub fn integers(&self) -> RangeInclusive<i64> {
        (self.min.ceil() as i64)..=(self.max.floor() as i64)
    }

    /// Number of integers that fall within this range
    pub fn integer_count(&self) -> usize {
        let ints = self.integers();
        if ints.is_empty() {
            0
        } else {
            (ints.end() - ints.start() + 1) as usize
        }
    }
}

impl NumRange<i32> {
    /// Number of integers in the range, inclusive on both ends. Zero if the
    /// range is inverted.
    pub fn len(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            self.max.abs_diff(self.min) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }
}
