// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Module providing a trait to abstract over the arithmetic used for voter
//! shares, utilities and thresholds, and implementations of this arithmetic.
//!
//! Tie probabilities are transcendental quantities and are always computed
//! with [`f64`], see [`crate::asymptotic`]. Everything that is a share of the
//! electorate is generic over [`Rational`], so that profiles given as exact
//! fractions can be handled without rounding.

mod exact;
mod float64;

use num::traits::{One, Zero};
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Sub, SubAssign};

/// Trait representing rational numbers. Here we only consider the arithmetic
/// operations needed to manipulate shares of voters.
pub trait Rational:
    Clone
    + Display
    + Debug
    + PartialEq
    + PartialOrd
    + Zero
    + One
    + AddAssign
    + SubAssign
    + MulAssign
    + Sum
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> Sum<&'a Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + for<'a> Div<&'a Self, Output = Self>
where
    for<'a> &'a Self: RationalRef<Self>,
{
    /// Obtains a number equal to the ratio between the given numerator and
    /// denominator.
    fn ratio(num: usize, denom: usize) -> Self;

    /// Obtains a number equal to the given integer.
    fn from_usize(i: usize) -> Self {
        Self::ratio(i, 1)
    }

    /// Converts a floating-point number, simplifying it into the simplest
    /// representable number within [`SIMPLIFICATION_TOLERANCE`] for types
    /// that have a choice.
    fn from_f64(x: f64) -> Self;

    /// Converts a number into its floating-point approximation.
    fn to_f64(&self) -> f64;

    /// Whether the two numbers differ by at most the given absolute
    /// tolerance.
    fn is_close(&self, other: &Self, tolerance: &Self) -> bool {
        let difference = if self > other {
            self - other
        } else {
            other - self
        };
        difference <= *tolerance
    }

    /// Absolute tolerance used to compare tau-vectors and utilities.
    fn default_tolerance() -> Self {
        Self::ratio(1, 1_000_000_000)
    }

    /// Allows to customize equality assertion to inexact types such as [`f64`].
    #[track_caller]
    fn assert_eq(a: Self, b: Self, msg: &str) {
        assert_eq!(a, b, "{msg}");
    }

    /// Whether this type represents exact arithmetic.
    fn is_exact() -> bool;

    /// Description of the implemented arithmetic, e.g. "64-bit floating point
    /// arithmetic".
    fn description() -> &'static str;

    /// Positive values to run the generic numeric tests on.
    #[cfg(test)]
    fn get_positive_test_values() -> Vec<Self>;
}

/// Helper trait that rational references implement.
pub trait RationalRef<Output>:
    Sized
    + Add<Self, Output = Output>
    + Sub<Self, Output = Output>
    + Mul<Self, Output = Output>
    + Div<Self, Output = Output>
{
}

/// Relative precision of the simplification performed by
/// [`Rational::from_f64()`].
pub const SIMPLIFICATION_TOLERANCE: f64 = 1e-12;
