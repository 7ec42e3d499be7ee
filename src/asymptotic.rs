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

//! Module providing the algebra of asymptotic values, i.e. probabilities of
//! rare events when the expected number of voters `n` tends to infinity.
//!
//! A value `(mu, nu, xi)` represents `exp(mu * n + nu * log(n) + xi + o(1))`.
//! Two values of different orders are compared by `mu` first, then by `nu`;
//! only values of equal order (up to [`ORDER_TOLERANCE`]) mix their
//! prefactors `exp(xi)`.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::ops::{Add, Div, Mul};

/// Absolute tolerance below which two exponents are considered equal.
pub const ORDER_TOLERANCE: f64 = 1e-9;

/// Asymptotic development `exp(mu * n + nu * log(n) + xi + o(1))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Asymptotic {
    /// Coefficient of `n` in the exponent, non-positive for probabilities.
    pub mu: f64,
    /// Coefficient of `log(n)` in the exponent.
    pub nu: f64,
    /// Constant term in the exponent.
    pub xi: f64,
}

impl Asymptotic {
    /// Constructs an asymptotic value from its three exponents.
    pub fn new(mu: f64, nu: f64, xi: f64) -> Self {
        Asymptotic { mu, nu, xi }
    }

    /// Probability of an impossible event.
    pub fn zero() -> Self {
        Asymptotic::new(f64::NEG_INFINITY, 0.0, 0.0)
    }

    /// Probability of an almost sure event.
    pub fn one() -> Self {
        Asymptotic::new(0.0, 0.0, 0.0)
    }

    /// Value whose order of magnitude is unknown.
    pub fn undefined() -> Self {
        Asymptotic::new(f64::NAN, f64::NAN, f64::NAN)
    }

    /// Constant value, independent of `n`.
    pub fn constant(value: f64) -> Self {
        Asymptotic::one() * value
    }

    /// Whether this is the value of an impossible event.
    pub fn is_zero(&self) -> bool {
        self.mu == f64::NEG_INFINITY
    }

    /// Whether the order of magnitude and the prefactor are known.
    pub fn is_defined(&self) -> bool {
        !(self.mu.is_nan() || self.nu.is_nan() || self.xi.is_nan())
    }

    /// Compares the orders of magnitude, ignoring the prefactors. Returns
    /// [`None`] if one of the orders is unknown.
    pub fn cmp_order(&self, other: &Self) -> Option<Ordering> {
        if self.is_zero() && other.is_zero() {
            return Some(Ordering::Equal);
        }
        match compare_exponents(self.mu, other.mu)? {
            Ordering::Equal => compare_exponents(self.nu, other.nu),
            ordering => Some(ordering),
        }
    }

    /// Limit of the value when `n` tends to infinity: `0`, `+inf`, a positive
    /// constant when both `mu` and `nu` vanish, or `NaN` when the order of
    /// magnitude is unknown.
    pub fn limit(&self) -> f64 {
        match compare_exponents(self.mu, 0.0) {
            None => f64::NAN,
            Some(Ordering::Less) => 0.0,
            Some(Ordering::Greater) => f64::INFINITY,
            Some(Ordering::Equal) => match compare_exponents(self.nu, 0.0) {
                None => f64::NAN,
                Some(Ordering::Less) => 0.0,
                Some(Ordering::Greater) => f64::INFINITY,
                Some(Ordering::Equal) => self.xi.exp(),
            },
        }
    }
}

/// Compares two exponents up to [`ORDER_TOLERANCE`].
fn compare_exponents(x: f64, y: f64) -> Option<Ordering> {
    if x.is_nan() || y.is_nan() {
        None
    } else if x == y {
        Some(Ordering::Equal)
    } else if x > y + ORDER_TOLERANCE {
        Some(Ordering::Greater)
    } else if x < y - ORDER_TOLERANCE {
        Some(Ordering::Less)
    } else {
        Some(Ordering::Equal)
    }
}

/// Computes `log(exp(x) + exp(y))` without overflow. `NaN` if either input is.
fn log_add_exp(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() {
        return f64::NAN;
    }
    let max = x.max(y);
    let min = x.min(y);
    max + (min - max).exp().ln_1p()
}

impl Add for Asymptotic {
    type Output = Asymptotic;

    fn add(self, rhs: Asymptotic) -> Asymptotic {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        match compare_exponents(self.mu, rhs.mu) {
            None => Asymptotic::undefined(),
            Some(Ordering::Greater) => self,
            Some(Ordering::Less) => rhs,
            Some(Ordering::Equal) => {
                let mu = self.mu.max(rhs.mu);
                match compare_exponents(self.nu, rhs.nu) {
                    None => Asymptotic::new(mu, f64::NAN, f64::NAN),
                    Some(Ordering::Greater) => Asymptotic::new(mu, self.nu, self.xi),
                    Some(Ordering::Less) => Asymptotic::new(mu, rhs.nu, rhs.xi),
                    Some(Ordering::Equal) => Asymptotic::new(
                        mu,
                        self.nu.max(rhs.nu),
                        log_add_exp(self.xi, rhs.xi),
                    ),
                }
            }
        }
    }
}

impl Mul for Asymptotic {
    type Output = Asymptotic;

    fn mul(self, rhs: Asymptotic) -> Asymptotic {
        let mu = self.mu + rhs.mu;
        if mu == f64::NEG_INFINITY {
            return Asymptotic::zero();
        }
        Asymptotic::new(mu, self.nu + rhs.nu, self.xi + rhs.xi)
    }
}

impl Div for Asymptotic {
    type Output = Asymptotic;

    fn div(self, rhs: Asymptotic) -> Asymptotic {
        let mu = self.mu - rhs.mu;
        if mu == f64::NEG_INFINITY {
            return Asymptotic::zero();
        }
        Asymptotic::new(mu, self.nu - rhs.nu, self.xi - rhs.xi)
    }
}

impl Mul<f64> for Asymptotic {
    type Output = Asymptotic;

    fn mul(self, factor: f64) -> Asymptotic {
        if factor > 0.0 {
            Asymptotic::new(self.mu, self.nu, self.xi + factor.ln())
        } else if factor == 0.0 && !self.mu.is_nan() && self.mu != f64::INFINITY {
            Asymptotic::zero()
        } else {
            Asymptotic::undefined()
        }
    }
}

impl Div<f64> for Asymptotic {
    type Output = Asymptotic;

    fn div(self, factor: f64) -> Asymptotic {
        self * factor.recip()
    }
}

impl Display for Asymptotic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            f.write_str("0")
        } else {
            write!(
                f,
                "exp({} n + {} log n + {} + o(1))",
                self.mu, self.nu, self.xi
            )
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "{actual} != {expected}"
        );
    }

    #[test]
    fn test_zero_and_one() {
        assert!(Asymptotic::zero().is_zero());
        assert!(!Asymptotic::one().is_zero());
        assert_eq!(Asymptotic::zero().limit(), 0.0);
        assert_eq!(Asymptotic::one().limit(), 1.0);
        assert!(Asymptotic::undefined().limit().is_nan());
        assert!(!Asymptotic::undefined().is_defined());
    }

    #[test]
    fn test_constant() {
        assert_close(Asymptotic::constant(2.0).limit(), 2.0);
        assert!(Asymptotic::constant(0.0).is_zero());
        assert!(!Asymptotic::constant(-1.0).is_defined());
    }

    #[test]
    fn test_add_keeps_dominant_order() {
        let big = Asymptotic::new(-1.0, -0.5, 3.0);
        let small = Asymptotic::new(-2.0, 0.0, 10.0);
        assert_eq!(big + small, big);
        assert_eq!(small + big, big);

        let slower = Asymptotic::new(-1.0, -1.0, 10.0);
        assert_eq!(big + slower, big);
        assert_eq!(slower + big, big);
    }

    #[test]
    fn test_add_same_order() {
        let x = Asymptotic::new(-1.0, -0.5, 0.0);
        let y = Asymptotic::new(-1.0, -0.5, 3f64.ln());
        let sum = x + y;
        assert_eq!(sum.mu, -1.0);
        assert_eq!(sum.nu, -0.5);
        assert_close(sum.xi, 4f64.ln());
    }

    #[test]
    fn test_add_zero() {
        let x = Asymptotic::new(-1.0, -0.5, 0.0);
        assert_eq!(x + Asymptotic::zero(), x);
        assert_eq!(Asymptotic::zero() + x, x);
        assert!((Asymptotic::zero() + Asymptotic::zero()).is_zero());
    }

    #[test]
    fn test_add_undefined_prefactor() {
        let x = Asymptotic::new(-1.0, -0.5, 0.0);
        let y = Asymptotic::new(-1.0, f64::NAN, f64::NAN);
        assert!(!(x + y).is_defined());
        let w = Asymptotic::new(-1.0, -0.5, f64::NAN);
        assert!(!(x + w).is_defined());
        assert!(!(w + x).is_defined());
        assert!((x / (x + w)).limit().is_nan());
        // A dominated undefined prefactor doesn't matter.
        let z = Asymptotic::new(-2.0, f64::NAN, f64::NAN);
        assert_eq!(x + z, x);
    }

    #[test]
    fn test_mul_div() {
        let x = Asymptotic::new(-1.0, -0.5, 1.0);
        let y = Asymptotic::new(-2.0, 1.0, 2.0);
        assert_eq!(x * y, Asymptotic::new(-3.0, 0.5, 3.0));
        assert_eq!(x / y, Asymptotic::new(1.0, -1.5, -1.0));
        assert!((x * Asymptotic::zero()).is_zero());
        assert!((Asymptotic::zero() / x).is_zero());
        assert!(!(Asymptotic::zero() / Asymptotic::zero()).is_defined());
        assert_eq!((x / Asymptotic::zero()).limit(), f64::INFINITY);
    }

    #[test]
    fn test_mul_scalar() {
        let x = Asymptotic::new(-1.0, -0.5, 1.0);
        let half = x * 0.5;
        assert_eq!(half.mu, -1.0);
        assert_eq!(half.nu, -0.5);
        assert_close(half.xi, 1.0 - 2f64.ln());
        assert_close((x / 0.5).xi, 1.0 + 2f64.ln());
        assert!((x * 0.0).is_zero());
    }

    #[test]
    fn test_limit_of_ratios() {
        let x = Asymptotic::new(-1.0, -0.5, 1.0);
        let y = Asymptotic::new(-1.0, -0.5, 3.0);
        assert_close((x / (x + y)).limit(), 1.0 / (1.0 + 2f64.exp()));
        assert_eq!((x / y).limit(), (-2f64).exp());

        let z = Asymptotic::new(-1.0, -1.0, 3.0);
        assert_eq!((z / x).limit(), 0.0);
        assert_eq!((x / z).limit(), f64::INFINITY);

        let w = Asymptotic::new(-1.5, 0.0, 0.0);
        assert_eq!((w / x).limit(), 0.0);
        assert_eq!((x / w).limit(), f64::INFINITY);
    }

    #[test]
    fn test_limit_undefined() {
        let x = Asymptotic::new(-1.0, -0.5, 1.0);
        let y = Asymptotic::new(-1.0, -0.5, f64::NAN);
        assert!((x / (x + y)).limit().is_nan());
        let z = Asymptotic::new(-1.0, f64::NAN, f64::NAN);
        assert!((x / z).limit().is_nan());
    }

    #[test]
    fn test_tolerance() {
        let x = Asymptotic::new(-1.0, -0.5, 0.0);
        let y = Asymptotic::new(-1.0 + 1e-12, -0.5, 0.0);
        assert_eq!(x.cmp_order(&y), Some(Ordering::Equal));
        assert_close((x / (x + y)).limit(), 0.5);

        let z = Asymptotic::new(-1.0 + 1e-6, -0.5, 0.0);
        assert_eq!(x.cmp_order(&z), Some(Ordering::Less));
        assert_eq!(z.cmp_order(&x), Some(Ordering::Greater));
    }

    #[test]
    fn test_display() {
        assert_eq!(Asymptotic::zero().to_string(), "0");
        assert_eq!(
            Asymptotic::new(-1.0, -0.5, 2.0).to_string(),
            "exp(-1 n + -0.5 log n + 2 + o(1))"
        );
    }
}
