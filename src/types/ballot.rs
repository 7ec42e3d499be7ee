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

use super::Candidate;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

/// Ballot cast by a voter: a non-empty proper subset of the candidates,
/// packed as a bit mask.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ballot(u8);

impl Ballot {
    /// Ballot for `a` only.
    pub const A: Ballot = Ballot(0b001);
    /// Ballot for `b` only.
    pub const B: Ballot = Ballot(0b010);
    /// Ballot for `c` only.
    pub const C: Ballot = Ballot(0b100);
    /// Ballot for `a` and `b`.
    pub const AB: Ballot = Ballot(0b011);
    /// Ballot for `a` and `c`.
    pub const AC: Ballot = Ballot(0b101);
    /// Ballot for `b` and `c`.
    pub const BC: Ballot = Ballot(0b110);

    /// All the ballots, in the order used to index tau-vectors.
    pub const ALL: [Ballot; 6] = [
        Ballot::A,
        Ballot::B,
        Ballot::C,
        Ballot::AB,
        Ballot::AC,
        Ballot::BC,
    ];

    /// All the ballots, in the cyclic order of their score vectors around the
    /// origin. Two consecutive ballots share exactly one candidate.
    pub const COMPASS: [Ballot; 6] = [
        Ballot::A,
        Ballot::AB,
        Ballot::B,
        Ballot::BC,
        Ballot::C,
        Ballot::AC,
    ];

    /// Ballot for a single candidate.
    pub fn single(candidate: Candidate) -> Self {
        Ballot(1 << candidate.index())
    }

    /// Ballot for two distinct candidates, in any order.
    pub fn pair(x: Candidate, y: Candidate) -> Self {
        assert_ne!(x, y, "A pair ballot must contain two distinct candidates");
        Ballot((1 << x.index()) | (1 << y.index()))
    }

    /// Ballot containing exactly the given candidates, in any order.
    pub fn from_candidates(candidates: &[Candidate]) -> Option<Self> {
        match *candidates {
            [x] => Some(Ballot::single(x)),
            [x, y] if x != y => Some(Ballot::pair(x, y)),
            _ => None,
        }
    }

    /// Whether the ballot approves the given candidate.
    pub fn contains(self, candidate: Candidate) -> bool {
        self.0 & (1 << candidate.index()) != 0
    }

    /// Number of points that the ballot gives to the candidate.
    pub fn score(self, candidate: Candidate) -> i64 {
        i64::from(self.contains(candidate))
    }

    /// Whether the ballot contains two candidates.
    pub fn is_pair(self) -> bool {
        self.0.count_ones() == 2
    }

    /// Candidates approved by this ballot, in alphabetical order.
    pub fn candidates(self) -> impl Iterator<Item = Candidate> {
        Candidate::ALL.into_iter().filter(move |&c| self.contains(c))
    }

    /// Index of the ballot in [`Self::ALL`].
    pub fn index(self) -> usize {
        match self.0 {
            0b001 => 0,
            0b010 => 1,
            0b100 => 2,
            0b011 => 3,
            0b101 => 4,
            0b110 => 5,
            _ => unreachable!(),
        }
    }

    /// The two ballots adjacent to this one in [`Self::COMPASS`].
    pub fn compass_neighbors(self) -> (Ballot, Ballot) {
        let position = Ballot::COMPASS
            .iter()
            .position(|&b| b == self)
            .unwrap_or_else(|| unreachable!());
        (
            Ballot::COMPASS[(position + 5) % 6],
            Ballot::COMPASS[(position + 1) % 6],
        )
    }
}

impl Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in self.candidates() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Debug for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ballot({self})")
    }
}

impl FromStr for Ballot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let candidates: Vec<Candidate> = s
            .chars()
            .map(|c| Candidate::from_letter(c).ok_or_else(|| format!("Unknown candidate: {c}")))
            .collect::<Result<_, _>>()?;
        Ballot::from_candidates(&candidates).ok_or_else(|| format!("Invalid ballot: {s}"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_index() {
        for (i, ballot) in Ballot::ALL.into_iter().enumerate() {
            assert_eq!(ballot.index(), i, "Wrong index for {ballot}");
        }
    }

    #[test]
    fn test_display() {
        let displays: Vec<String> = Ballot::ALL.iter().map(|b| b.to_string()).collect();
        assert_eq!(displays, ["a", "b", "c", "ab", "ac", "bc"]);
        assert_eq!(format!("{:?}", Ballot::BC), "Ballot(bc)");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ab".parse::<Ballot>(), Ok(Ballot::AB));
        assert_eq!("ba".parse::<Ballot>(), Ok(Ballot::AB));
        assert_eq!("c".parse::<Ballot>(), Ok(Ballot::C));
        assert_eq!("aa".parse::<Ballot>(), Err("Invalid ballot: aa".to_owned()));
        assert_eq!("abc".parse::<Ballot>(), Err("Invalid ballot: abc".to_owned()));
        assert_eq!("".parse::<Ballot>(), Err("Invalid ballot: ".to_owned()));
        assert_eq!("x".parse::<Ballot>(), Err("Unknown candidate: x".to_owned()));
    }

    #[test]
    fn test_compass_neighbors_share_one_candidate() {
        for ballot in Ballot::ALL {
            let (left, right) = ballot.compass_neighbors();
            for neighbor in [left, right] {
                let common = Candidate::ALL
                    .iter()
                    .filter(|&&c| ballot.contains(c) && neighbor.contains(c))
                    .count();
                assert_eq!(common, 1, "{ballot} and {neighbor} must share a candidate");
                assert_ne!(ballot.is_pair(), neighbor.is_pair());
            }
        }
        assert_eq!(Ballot::A.compass_neighbors(), (Ballot::AC, Ballot::AB));
        assert_eq!(Ballot::BC.compass_neighbors(), (Ballot::B, Ballot::C));
    }

    #[test]
    fn test_scores() {
        assert_eq!(Ballot::AB.score(Candidate::A), 1);
        assert_eq!(Ballot::AB.score(Candidate::C), 0);
        assert!(Ballot::AC.is_pair());
        assert!(!Ballot::C.is_pair());
        assert_eq!(
            Ballot::pair(Candidate::C, Candidate::A),
            Ballot::pair(Candidate::A, Candidate::C)
        );
    }
}
