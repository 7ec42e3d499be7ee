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

//! Types to represent the preferences and ballots of a three-candidate
//! election.

mod ballot;
mod voting_rule;

pub use ballot::Ballot;
pub use voting_rule::{RuleCapabilities, VotingRule, WeakOrderBallots};
use std::fmt::{self, Display};
use std::str::FromStr;

/// One of the three candidates of the election.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Candidate {
    /// Candidate `a`.
    A,
    /// Candidate `b`.
    B,
    /// Candidate `c`.
    C,
}

impl Candidate {
    /// All the candidates, in alphabetical order.
    pub const ALL: [Candidate; 3] = [Candidate::A, Candidate::B, Candidate::C];

    /// Index of the candidate in [`Self::ALL`].
    pub fn index(self) -> usize {
        match self {
            Candidate::A => 0,
            Candidate::B => 1,
            Candidate::C => 2,
        }
    }

    /// Letter representing the candidate.
    pub fn letter(self) -> char {
        match self {
            Candidate::A => 'a',
            Candidate::B => 'b',
            Candidate::C => 'c',
        }
    }

    /// Parses a candidate from its letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a' => Some(Candidate::A),
            'b' => Some(Candidate::B),
            'c' => Some(Candidate::C),
            _ => None,
        }
    }

    /// The third candidate, different from both given (distinct) candidates.
    pub fn other(x: Candidate, y: Candidate) -> Candidate {
        assert_ne!(x, y, "Candidates must be distinct");
        Candidate::ALL[3 - x.index() - y.index()]
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Strict preference order of a voter over the three candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ranking {
    order: [Candidate; 3],
}

impl Ranking {
    /// All the rankings, in lexicographic order.
    pub const ALL: [Ranking; 6] = [
        Ranking::from_order([Candidate::A, Candidate::B, Candidate::C]),
        Ranking::from_order([Candidate::A, Candidate::C, Candidate::B]),
        Ranking::from_order([Candidate::B, Candidate::A, Candidate::C]),
        Ranking::from_order([Candidate::B, Candidate::C, Candidate::A]),
        Ranking::from_order([Candidate::C, Candidate::A, Candidate::B]),
        Ranking::from_order([Candidate::C, Candidate::B, Candidate::A]),
    ];

    const fn from_order(order: [Candidate; 3]) -> Self {
        Ranking { order }
    }

    /// Constructs the ranking `first > second > third`.
    pub fn new(first: Candidate, second: Candidate, third: Candidate) -> Self {
        assert!(
            first != second && first != third && second != third,
            "A ranking must contain each candidate once"
        );
        Ranking {
            order: [first, second, third],
        }
    }

    /// Preferred candidate, usually named `i`.
    pub fn first(self) -> Candidate {
        self.order[0]
    }

    /// Middle candidate, usually named `j`.
    pub fn second(self) -> Candidate {
        self.order[1]
    }

    /// Least preferred candidate, usually named `k`.
    pub fn third(self) -> Candidate {
        self.order[2]
    }

    /// Index of the ranking in [`Self::ALL`].
    pub fn index(self) -> usize {
        2 * self.first().index() + usize::from(self.second() > self.third())
    }
}

impl Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}", self.order[0], self.order[1], self.order[2])
    }
}

impl FromStr for Ranking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let candidates: Vec<Candidate> = s
            .chars()
            .map(|c| Candidate::from_letter(c).ok_or_else(|| format!("Unknown candidate: {c}")))
            .collect::<Result<_, _>>()?;
        match candidates[..] {
            [i, j, k] if i != j && i != k && j != k => Ok(Ranking::new(i, j, k)),
            _ => Err(format!("Invalid ranking: {s}")),
        }
    }
}

/// Preference order of a voter who is indifferent between two candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeakOrder {
    /// Voter who prefers the given candidate to the two others, e.g.
    /// `a>b~c`.
    Lover(Candidate),
    /// Voter who prefers the two others to the given candidate, e.g.
    /// `a~b>c`.
    Hater(Candidate),
}

impl WeakOrder {
    /// All the weak orders.
    pub const ALL: [WeakOrder; 6] = [
        WeakOrder::Lover(Candidate::A),
        WeakOrder::Lover(Candidate::B),
        WeakOrder::Lover(Candidate::C),
        WeakOrder::Hater(Candidate::A),
        WeakOrder::Hater(Candidate::B),
        WeakOrder::Hater(Candidate::C),
    ];

    /// Index of the weak order in [`Self::ALL`].
    pub fn index(self) -> usize {
        match self {
            WeakOrder::Lover(c) => c.index(),
            WeakOrder::Hater(c) => 3 + c.index(),
        }
    }
}

impl Display for WeakOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            WeakOrder::Lover(c) => {
                let (x, y) = others(c);
                write!(f, "{c}>{x}~{y}")
            }
            WeakOrder::Hater(c) => {
                let (x, y) = others(c);
                write!(f, "{x}~{y}>{c}")
            }
        }
    }
}

impl FromStr for WeakOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeakOrder::ALL
            .into_iter()
            .find(|weak_order| {
                let canonical = weak_order.to_string();
                // The two tied candidates may be given in any order.
                let bytes = canonical.as_bytes();
                let swapped = match *weak_order {
                    WeakOrder::Lover(_) => {
                        format!("{}>{}~{}", bytes[0] as char, bytes[4] as char, bytes[2] as char)
                    }
                    WeakOrder::Hater(_) => {
                        format!("{}~{}>{}", bytes[2] as char, bytes[0] as char, bytes[4] as char)
                    }
                };
                s == canonical || s == swapped
            })
            .ok_or_else(|| format!("Invalid weak order: {s}"))
    }
}

/// The two candidates other than the given one, in alphabetical order.
fn others(c: Candidate) -> (Candidate, Candidate) {
    match c {
        Candidate::A => (Candidate::B, Candidate::C),
        Candidate::B => (Candidate::A, Candidate::C),
        Candidate::C => (Candidate::A, Candidate::B),
    }
}
