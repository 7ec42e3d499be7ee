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

use super::{Ballot, Candidate, Ranking, WeakOrder};
use crate::events::cells::{PivotCell, ANTI_PLURALITY_CELLS, APPROVAL_CELLS, PLURALITY_CELLS};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Voting rule of the election. The winner is the candidate with the most
/// points, ties being broken uniformly at random.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VotingRule {
    /// Each voter approves one or two candidates.
    Approval,
    /// Each voter votes for exactly one candidate.
    Plurality,
    /// Each voter votes against exactly one candidate, i.e. for two
    /// candidates.
    AntiPlurality,
}

/// Rule-specific functions, selected once per computation.
pub struct RuleCapabilities {
    /// Ballot cast by the voters of a ranking whose utility for their middle
    /// candidate is close to 0.
    pub ballot_low_u: fn(Ranking) -> Ballot,
    /// Ballot cast by the voters of a ranking whose utility for their middle
    /// candidate is close to 1.
    pub ballot_high_u: fn(Ranking) -> Ballot,
    /// Lattice cells where switching from the low-utility ballot to the
    /// high-utility ballot changes the outcome.
    pub cells: &'static [PivotCell],
    /// Whether the limit pivot theorem can be used to compute best responses.
    pub limit_pivot_theorem: bool,
}

static APPROVAL: RuleCapabilities = RuleCapabilities {
    ballot_low_u: top,
    ballot_high_u: top_two,
    cells: &APPROVAL_CELLS,
    limit_pivot_theorem: true,
};

static PLURALITY: RuleCapabilities = RuleCapabilities {
    ballot_low_u: top,
    ballot_high_u: middle,
    cells: &PLURALITY_CELLS,
    limit_pivot_theorem: false,
};

static ANTI_PLURALITY: RuleCapabilities = RuleCapabilities {
    ballot_low_u: against_middle,
    ballot_high_u: top_two,
    cells: &ANTI_PLURALITY_CELLS,
    limit_pivot_theorem: false,
};

fn top(ranking: Ranking) -> Ballot {
    Ballot::single(ranking.first())
}

fn middle(ranking: Ranking) -> Ballot {
    Ballot::single(ranking.second())
}

fn top_two(ranking: Ranking) -> Ballot {
    Ballot::pair(ranking.first(), ranking.second())
}

fn against_middle(ranking: Ranking) -> Ballot {
    Ballot::pair(ranking.first(), ranking.third())
}

/// Ballots cast by the voters of a weak order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeakOrderBallots {
    /// All the voters cast this ballot.
    Single(Ballot),
    /// Half of the voters cast each ballot.
    Split(Ballot, Ballot),
}

impl VotingRule {
    /// All the voting rules.
    pub const ALL: [VotingRule; 3] = [
        VotingRule::Approval,
        VotingRule::Plurality,
        VotingRule::AntiPlurality,
    ];

    /// Rule-specific functions.
    pub fn capabilities(self) -> &'static RuleCapabilities {
        match self {
            VotingRule::Approval => &APPROVAL,
            VotingRule::Plurality => &PLURALITY,
            VotingRule::AntiPlurality => &ANTI_PLURALITY,
        }
    }

    /// Whether the ballot can be cast under this rule.
    pub fn is_legal(self, ballot: Ballot) -> bool {
        match self {
            VotingRule::Approval => true,
            VotingRule::Plurality => !ballot.is_pair(),
            VotingRule::AntiPlurality => ballot.is_pair(),
        }
    }

    /// Ballots that can be cast under this rule.
    pub fn legal_ballots(self) -> impl Iterator<Item = Ballot> {
        Ballot::ALL.into_iter().filter(move |&b| self.is_legal(b))
    }

    /// Ballot cast by the voters of a ranking whose utility for their middle
    /// candidate is close to 0.
    pub fn ballot_low_u(self, ranking: Ranking) -> Ballot {
        (self.capabilities().ballot_low_u)(ranking)
    }

    /// Ballot cast by the voters of a ranking whose utility for their middle
    /// candidate is close to 1.
    pub fn ballot_high_u(self, ranking: Ranking) -> Ballot {
        (self.capabilities().ballot_high_u)(ranking)
    }

    /// Ballots cast by the voters of a weak order, which have a dominant
    /// strategy (up to the choice between equivalent ballots).
    pub fn weak_order_ballots(self, weak_order: WeakOrder) -> WeakOrderBallots {
        match (self, weak_order) {
            (VotingRule::Approval | VotingRule::Plurality, WeakOrder::Lover(c)) => {
                WeakOrderBallots::Single(Ballot::single(c))
            }
            (VotingRule::Approval | VotingRule::AntiPlurality, WeakOrder::Hater(c)) => {
                let (x, y) = pair_without(c);
                WeakOrderBallots::Single(Ballot::pair(x, y))
            }
            (VotingRule::Plurality, WeakOrder::Hater(c)) => {
                let (x, y) = pair_without(c);
                WeakOrderBallots::Split(Ballot::single(x), Ballot::single(y))
            }
            (VotingRule::AntiPlurality, WeakOrder::Lover(c)) => {
                let (x, y) = pair_without(c);
                WeakOrderBallots::Split(Ballot::pair(c, x), Ballot::pair(c, y))
            }
        }
    }
}

fn pair_without(c: Candidate) -> (Candidate, Candidate) {
    let mut others = Candidate::ALL.into_iter().filter(move |&x| x != c);
    match (others.next(), others.next()) {
        (Some(x), Some(y)) => (x, y),
        _ => unreachable!(),
    }
}

impl Display for VotingRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VotingRule::Approval => f.write_str("Approval"),
            VotingRule::Plurality => f.write_str("Plurality"),
            VotingRule::AntiPlurality => f.write_str("Anti-Plurality"),
        }
    }
}

impl FromStr for VotingRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approval" => Ok(VotingRule::Approval),
            "plurality" => Ok(VotingRule::Plurality),
            "anti-plurality" => Ok(VotingRule::AntiPlurality),
            _ => Err(format!("Unknown voting rule: {s}")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ballots_are_legal() {
        for rule in VotingRule::ALL {
            for ranking in Ranking::ALL {
                let low = rule.ballot_low_u(ranking);
                let high = rule.ballot_high_u(ranking);
                assert!(rule.is_legal(low), "{low} is illegal under {rule}");
                assert!(rule.is_legal(high), "{high} is illegal under {rule}");
                assert_ne!(low, high);
                assert!(low.contains(ranking.first()) || high.contains(ranking.first()));
            }
            for weak_order in WeakOrder::ALL {
                match rule.weak_order_ballots(weak_order) {
                    WeakOrderBallots::Single(b) => assert!(rule.is_legal(b)),
                    WeakOrderBallots::Split(b1, b2) => {
                        assert!(rule.is_legal(b1) && rule.is_legal(b2));
                        assert_ne!(b1, b2);
                    }
                }
            }
        }
    }

    #[test]
    fn test_legal_ballots() {
        let ballots = |rule: VotingRule| rule.legal_ballots().collect::<Vec<_>>();
        assert_eq!(ballots(VotingRule::Approval), Ballot::ALL);
        assert_eq!(
            ballots(VotingRule::Plurality),
            [Ballot::A, Ballot::B, Ballot::C]
        );
        assert_eq!(
            ballots(VotingRule::AntiPlurality),
            [Ballot::AB, Ballot::AC, Ballot::BC]
        );
    }

    #[test]
    fn test_ballots_of_ranking() {
        let bca: Ranking = "bca".parse().unwrap();
        assert_eq!(VotingRule::Approval.ballot_low_u(bca), Ballot::B);
        assert_eq!(VotingRule::Approval.ballot_high_u(bca), Ballot::BC);
        assert_eq!(VotingRule::Plurality.ballot_low_u(bca), Ballot::B);
        assert_eq!(VotingRule::Plurality.ballot_high_u(bca), Ballot::C);
        assert_eq!(VotingRule::AntiPlurality.ballot_low_u(bca), Ballot::AB);
        assert_eq!(VotingRule::AntiPlurality.ballot_high_u(bca), Ballot::BC);
    }

    #[test]
    fn test_weak_order_ballots() {
        let lover_a = WeakOrder::Lover(Candidate::A);
        let hater_c = WeakOrder::Hater(Candidate::C);
        assert_eq!(
            VotingRule::Approval.weak_order_ballots(hater_c),
            WeakOrderBallots::Single(Ballot::AB)
        );
        assert_eq!(
            VotingRule::Plurality.weak_order_ballots(hater_c),
            WeakOrderBallots::Split(Ballot::A, Ballot::B)
        );
        assert_eq!(
            VotingRule::AntiPlurality.weak_order_ballots(lover_a),
            WeakOrderBallots::Split(Ballot::AB, Ballot::AC)
        );
    }

    #[test]
    fn test_from_str() {
        for rule in VotingRule::ALL {
            let name = rule.to_string().to_lowercase();
            assert_eq!(name.parse::<VotingRule>(), Ok(rule));
        }
        assert_eq!(
            "borda".parse::<VotingRule>(),
            Err("Unknown voting rule: borda".to_owned())
        );
    }
}
