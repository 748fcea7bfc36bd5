//! Smallest-unit measure value objects.
//!
//! Quantity, volume and weight are carried as `i64` in a caller-chosen
//! smallest unit (whole pieces, millilitres, grams, ...), the same convention
//! the accounting world uses for cents. Arithmetic on smallest units is exact;
//! there is no floating point anywhere in the allocation path. Values may be
//! negative: a negative measure is a removal.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Item count in smallest units (whole pieces).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(i64);

/// Volume in smallest units (e.g. millilitres or cm³).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(i64);

/// Weight in smallest units (e.g. grams).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(i64);

macro_rules! impl_measure {
    ($t:ty) => {
        impl $t {
            pub const ZERO: Self = Self(0);

            pub const fn new(units: i64) -> Self {
                Self(units)
            }

            pub const fn units(self) -> i64 {
                self.0
            }

            pub const fn is_negative(self) -> bool {
                self.0 < 0
            }

            /// Even share when splitting across `n` receivers, truncating
            /// toward zero. The caller gives the remainder to the last share.
            pub const fn div_even(self, n: i64) -> Self {
                Self(self.0 / n)
            }

            pub const fn saturating_add(self, other: Self) -> Self {
                Self(self.0.saturating_add(other.0))
            }

            pub const fn saturating_sub(self, other: Self) -> Self {
                Self(self.0.saturating_sub(other.0))
            }
        }

        impl core::ops::Add for $t {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl core::ops::Sub for $t {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl core::iter::Sum for $t {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|m| m.0).sum())
            }
        }

        impl ValueObject for $t {}
    };
}

impl_measure!(Quantity);
impl_measure!(Volume);
impl_measure!(Weight);

/// Physical dimensions of a handling unit, smallest units per axis.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: i64,
    pub width: i64,
    pub height: i64,
}

impl Dimensions {
    pub const fn new(length: i64, width: i64, height: i64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Scale every axis by `1/n`, truncating.
    ///
    /// This is an audit-display convention, not a geometric subdivision:
    /// a pallet split across three bins does not become three pallets of a
    /// third of each edge. Consumers must treat scaled dimensions as
    /// annotation only.
    pub const fn div_even(self, n: i64) -> Self {
        Self {
            length: self.length / n,
            width: self.width / n,
            height: self.height / n,
        }
    }
}

impl ValueObject for Dimensions {}
