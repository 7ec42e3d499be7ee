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

//! Offsets and pseudo-offsets of the three-way trio event.
//!
//! The offset `phi_X` of a ballot `X` is the asymptotic ratio between the
//! probabilities of two score configurations of the trio that differ by one
//! ballot `X`. It is undefined when nobody casts `X` (a "hole"). The
//! pseudo-offset `psi_X` fills a hole with the product of the offsets of the
//! two neighbors of `X` in the compass order, which is always possible unless
//! two consecutive ballots are holes.

use crate::types::{Ballot, Ranking};
use std::fmt::{self, Display};

/// Returns `phi` if it is defined, and the product of the two neighboring
/// offsets otherwise.
pub fn pseudo_offset(
    phi: Option<f64>,
    phi_left: Option<f64>,
    phi_right: Option<f64>,
) -> Option<f64> {
    phi.or_else(|| Some(phi_left? * phi_right?))
}

/// Whether two ballots that are adjacent in the compass order both satisfy
/// the given predicate.
pub fn has_two_consecutive_zeros(is_zero: impl Fn(Ballot) -> bool) -> bool {
    Ballot::COMPASS
        .iter()
        .zip(Ballot::COMPASS.iter().cycle().skip(1))
        .any(|(&x, &y)| is_zero(x) && is_zero(y))
}

/// Offsets of the trio, indexed like [`Ballot::ALL`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Offsets {
    phi: [Option<f64>; 6],
}

/// Pseudo-offsets of the trio seen from a ranking `i > j > k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelativeOffsets {
    /// Pseudo-offset of `{i}`.
    pub i: f64,
    /// Pseudo-offset of `{j}`.
    pub j: f64,
    /// Pseudo-offset of `{k}`.
    pub k: f64,
    /// Pseudo-offset of `{i, j}`.
    pub ij: f64,
    /// Pseudo-offset of `{i, k}`.
    pub ik: f64,
}

impl Offsets {
    /// Creates offsets from their (optional) values, indexed like
    /// [`Ballot::ALL`].
    pub fn new(phi: [Option<f64>; 6]) -> Self {
        Offsets { phi }
    }

    /// Offsets of a walk that has no saddle point: all undefined.
    pub fn undefined() -> Self {
        Offsets { phi: [None; 6] }
    }

    /// Offset of the given ballot. Pairs are unordered, so that e.g. `ba`
    /// aliases `ab`.
    pub fn phi(&self, ballot: Ballot) -> Option<f64> {
        self.phi[ballot.index()]
    }

    /// Pseudo-offset of the given ballot.
    pub fn psi(&self, ballot: Ballot) -> Option<f64> {
        let (left, right) = ballot.compass_neighbors();
        pseudo_offset(self.phi(ballot), self.phi(left), self.phi(right))
    }

    /// All the pseudo-offsets needed for the offset method, or [`None`] if one
    /// of them is undefined.
    pub fn relative(&self, ranking: Ranking) -> Option<RelativeOffsets> {
        let (i, j, k) = (ranking.first(), ranking.second(), ranking.third());
        Some(RelativeOffsets {
            i: self.psi(Ballot::single(i))?,
            j: self.psi(Ballot::single(j))?,
            k: self.psi(Ballot::single(k))?,
            ij: self.psi(Ballot::pair(i, j))?,
            ik: self.psi(Ballot::pair(i, k))?,
        })
    }
}

impl Display for Offsets {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("<")?;
        for (n, ballot) in Ballot::ALL.iter().enumerate() {
            if n != 0 {
                f.write_str(", ")?;
            }
            match self.phi(*ballot) {
                Some(phi) => write!(f, "{ballot}: {phi}")?,
                None => write!(f, "{ballot}: undefined")?,
            }
        }
        f.write_str(">")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Candidate;

    #[test]
    fn test_pseudo_offset() {
        assert_eq!(pseudo_offset(Some(0.5), Some(2.0), Some(3.0)), Some(0.5));
        assert_eq!(pseudo_offset(None, Some(2.0), Some(3.0)), Some(6.0));
        assert_eq!(pseudo_offset(None, None, Some(3.0)), None);
        assert_eq!(pseudo_offset(None, None, None), None);
        assert_eq!(pseudo_offset(Some(0.5), None, None), Some(0.5));
    }

    #[test]
    fn test_has_two_consecutive_zeros() {
        let zeros = |ballots: &[Ballot]| has_two_consecutive_zeros(|b| ballots.contains(&b));
        assert!(!zeros(&[]));
        assert!(!zeros(&[Ballot::A]));
        assert!(!zeros(&[Ballot::A, Ballot::B, Ballot::C]));
        assert!(!zeros(&[Ballot::AB, Ballot::AC, Ballot::BC]));
        assert!(zeros(&[Ballot::A, Ballot::AB]));
        assert!(zeros(&[Ballot::BC, Ballot::C]));
        // The compass order wraps around.
        assert!(zeros(&[Ballot::AC, Ballot::A]));
        assert!(!zeros(&[Ballot::AC, Ballot::B]));
    }

    #[test]
    fn test_psi_fills_one_hole() {
        let offsets = Offsets::new([Some(0.5), Some(2.0), Some(1.0), None, Some(0.5), Some(2.0)]);
        assert_eq!(offsets.phi(Ballot::AB), None);
        assert_eq!(offsets.psi(Ballot::AB), Some(1.0));
        assert_eq!(offsets.psi(Ballot::pair(Candidate::B, Candidate::A)), Some(1.0));
        assert_eq!(offsets.psi(Ballot::C), Some(1.0));
    }

    #[test]
    fn test_psi_two_consecutive_holes() {
        let offsets = Offsets::new([None, Some(2.0), Some(1.0), None, Some(0.5), Some(2.0)]);
        assert_eq!(offsets.psi(Ballot::A), None);
        assert_eq!(offsets.psi(Ballot::AB), None);
        assert_eq!(offsets.psi(Ballot::B), Some(2.0));
        let abc: Ranking = "abc".parse().unwrap();
        assert_eq!(offsets.relative(abc), None);
        assert_eq!(Offsets::undefined().relative(abc), None);
    }

    #[test]
    fn test_relative() {
        let offsets = Offsets::new([
            Some(0.5),
            Some(0.8),
            Some(2.5),
            Some(0.4),
            Some(1.25),
            Some(2.0),
        ]);
        let cab: Ranking = "cab".parse().unwrap();
        assert_eq!(
            offsets.relative(cab),
            Some(RelativeOffsets {
                i: 2.5,
                j: 0.5,
                k: 0.8,
                ij: 1.25,
                ik: 2.0,
            })
        );
    }

    #[test]
    fn test_display() {
        let offsets = Offsets::new([Some(0.5), Some(2.0), Some(1.0), None, Some(0.5), Some(2.0)]);
        assert_eq!(
            offsets.to_string(),
            "<a: 0.5, b: 2, c: 1, ab: undefined, ac: 0.5, bc: 2>"
        );
    }
}
