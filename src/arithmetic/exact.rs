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

//! Module implementing the [`Rational`] trait for [`BigRational`].

use super::{Rational, RationalRef, SIMPLIFICATION_TOLERANCE};
use num::rational::Ratio;
use num::traits::ToPrimitive;
use num::{BigInt, BigRational};

/// Convergents with a larger denominator aren't useful to approximate an
/// [`f64`].
const MAX_DENOMINATOR: i128 = 1 << 60;

impl RationalRef<BigRational> for &BigRational {}

impl Rational for BigRational {
    fn ratio(num: usize, denom: usize) -> Self {
        Ratio::new(BigInt::from(num), BigInt::from(denom))
    }

    /// Returns the first convergent of the continued fraction of `x` that
    /// approximates it within [`SIMPLIFICATION_TOLERANCE`].
    fn from_f64(x: f64) -> Self {
        assert!(x.is_finite(), "Cannot convert {x} to a rational number");

        let tolerance = SIMPLIFICATION_TOLERANCE * x.abs().max(1.0);
        let floor = x.floor();
        let mut rest = x - floor;
        let (mut num_prev, mut num) = (1i128, floor as i128);
        let (mut denom_prev, mut denom) = (0i128, 1i128);

        while rest > 0.0 && (x - num as f64 / denom as f64).abs() > tolerance {
            let inverse = 1.0 / rest;
            let term = inverse.floor();
            rest = inverse - term;

            let term = term as i128;
            let next_denom = term.saturating_mul(denom).saturating_add(denom_prev);
            if next_denom > MAX_DENOMINATOR {
                break;
            }
            (num_prev, num) = (num, term * num + num_prev);
            (denom_prev, denom) = (denom, next_denom);
        }

        Ratio::new(BigInt::from(num), BigInt::from(denom))
    }

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn is_exact() -> bool {
        true
    }

    fn description() -> &'static str {
        "exact rational arithmetic"
    }

    #[cfg(test)]
    fn get_positive_test_values() -> Vec<Self> {
        vec![
            Self::ratio(1, 1),
            Self::ratio(2, 1),
            Self::ratio(3, 1),
            Self::ratio(1000, 1),
            Self::ratio(1, 2),
            Self::ratio(1, 3),
            Self::ratio(2, 3),
            Self::ratio(1, 10),
            Self::ratio(7, 8),
            Self::ratio(1, 1_000_000),
        ]
    }
}
