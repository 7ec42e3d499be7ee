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

//! Module implementing the [`Rational`] trait for [`f64`].

use super::{Rational, RationalRef};
use log::trace;

impl RationalRef<f64> for &f64 {}

impl Rational for f64 {
    fn ratio(num: usize, denom: usize) -> Self {
        num as f64 / denom as f64
    }

    fn from_f64(x: f64) -> Self {
        x
    }

    fn to_f64(&self) -> f64 {
        *self
    }

    fn assert_eq(a: Self, b: Self, msg: &str) {
        if a != b {
            let error = 2f64 * (a - b).abs() / (a.abs() + b.abs());
            let error_eps = (error / f64::EPSILON).round() as usize;
            if error_eps <= 1000 {
                trace!("{msg}: Failed comparison {a} != {b} (error = {error_eps} * eps)");
            } else {
                panic!("{msg}: Failed comparison {a} != {b} (error = {error_eps} * eps)");
            }
        }
    }

    fn is_exact() -> bool {
        false
    }

    fn description() -> &'static str {
        "64-bit floating-point arithmetic"
    }

    #[cfg(test)]
    fn get_positive_test_values() -> Vec<Self> {
        vec![
            1.0,
            2.0,
            3.0,
            1000.0,
            0.5,
            1.0 / 3.0,
            2.0 / 3.0,
            0.1,
            0.875,
            1e-6,
        ]
    }
}
