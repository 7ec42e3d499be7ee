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

//! Tau-vectors, i.e. the shares of each ballot in the electorate.

use crate::arithmetic::{Rational, RationalRef};
use crate::best_response::{best_response, BestResponse};
use crate::events::TieEvents;
use crate::offsets;
use crate::types::{Ballot, Candidate, Ranking, VotingRule};
use std::fmt::{self, Display};

/// Shares of the ballots, summing to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct TauVector<R> {
    voting_rule: VotingRule,
    shares: [R; 6],
}

impl<R> TauVector<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Creates a tau-vector from the shares of some ballots. Ballots that
    /// appear several times are accumulated.
    ///
    /// Panics if a ballot is illegal under the voting rule, if a share is
    /// negative or if the total is not 1.
    pub fn new(voting_rule: VotingRule, shares: impl IntoIterator<Item = (Ballot, R)>) -> Self {
        let mut result: [R; 6] = std::array::from_fn(|_| R::zero());
        for (ballot, share) in shares {
            assert!(
                share >= R::zero(),
                "Share of {ballot} must be non-negative, found {share}"
            );
            if share > R::zero() {
                assert!(
                    voting_rule.is_legal(ballot),
                    "Ballot {ballot} is illegal under {voting_rule}"
                );
            }
            result[ballot.index()] += share;
        }
        let total: R = result.iter().sum();
        R::assert_eq(total, R::one(), "Total share of a tau-vector");
        TauVector {
            voting_rule,
            shares: result,
        }
    }

    /// Voting rule of the election.
    pub fn voting_rule(&self) -> VotingRule {
        self.voting_rule
    }

    /// Share of the given ballot.
    pub fn share(&self, ballot: Ballot) -> &R {
        &self.shares[ballot.index()]
    }

    /// Expected score of each candidate, per voter.
    pub fn scores(&self) -> [R; 3] {
        Candidate::ALL.map(|c| {
            Ballot::ALL
                .iter()
                .filter(|b| b.contains(c))
                .map(|b| &self.shares[b.index()])
                .sum()
        })
    }

    /// Candidates whose score is within the tolerance of the highest score.
    pub fn winners(&self, tolerance: &R) -> Vec<Candidate> {
        let scores = self.scores();
        let max = scores
            .iter()
            .fold(R::zero(), |max, s| if *s > max { s.clone() } else { max });
        Candidate::ALL
            .into_iter()
            .filter(|c| scores[c.index()].is_close(&max, tolerance))
            .collect()
    }

    /// Returns `(1 - ratio) * self + ratio * other`.
    pub fn barycenter(&self, other: &Self, ratio: &R) -> Self {
        assert_eq!(self.voting_rule, other.voting_rule);
        if *ratio == R::one() {
            return other.clone();
        }
        if *ratio == R::zero() {
            return self.clone();
        }
        let keep = R::one() - ratio;
        TauVector::new(
            self.voting_rule,
            Ballot::ALL.iter().map(|&b| {
                (
                    b,
                    &keep * &self.shares[b.index()] + ratio * &other.shares[b.index()],
                )
            }),
        )
    }

    /// Whether all the shares are within the tolerance of the other
    /// tau-vector's shares.
    pub fn is_close(&self, other: &Self, tolerance: &R) -> bool {
        self.voting_rule == other.voting_rule
            && self
                .shares
                .iter()
                .zip(&other.shares)
                .all(|(x, y)| x.is_close(y, tolerance))
    }

    /// Whether two ballots adjacent in the compass order are never cast.
    pub fn has_two_consecutive_zeros(&self) -> bool {
        offsets::has_two_consecutive_zeros(|b| self.shares[b.index()] == R::zero())
    }

    /// Computes all the tie events of this tau-vector.
    pub fn tie_events(&self) -> TieEvents {
        TieEvents::new(
            self.voting_rule,
            std::array::from_fn(|i| self.shares[i].to_f64()),
            self.to_string(),
        )
    }

    /// Best response of the voters of the given ranking.
    pub fn best_response(&self, ranking: Ranking) -> BestResponse<R> {
        best_response(&self.tie_events(), ranking)
    }

    /// Best responses of all the rankings, sharing the computation of the
    /// tie events.
    pub fn best_responses(&self) -> [BestResponse<R>; 6] {
        let events = self.tie_events();
        Ranking::ALL.map(|r| best_response(&events, r))
    }
}

impl<R> Display for TauVector<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("<")?;
        let mut first = true;
        for ballot in Ballot::ALL {
            let share = &self.shares[ballot.index()];
            if *share != R::zero() {
                if !first {
                    f.write_str(", ")?;
                }
                first = false;
                write!(f, "{ballot}: {share}")?;
            }
        }
        write!(f, "> ({})", self.voting_rule)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num::BigRational;

    fn tau(voting_rule: VotingRule, shares: &[(Ballot, f64)]) -> TauVector<f64> {
        TauVector::new(voting_rule, shares.iter().copied())
    }

    #[test]
    fn test_scores_and_winners() {
        let tau = tau(
            VotingRule::Approval,
            &[(Ballot::A, 0.4), (Ballot::BC, 0.4), (Ballot::AC, 0.2)],
        );
        assert_eq!(tau.scores(), [0.6000000000000001, 0.4, 0.6000000000000001]);
        assert_eq!(tau.winners(&1e-9), vec![Candidate::A, Candidate::C]);
        assert_eq!(tau.winners(&0.0), vec![Candidate::A, Candidate::C]);
    }

    #[test]
    fn test_barycenter() {
        let x = tau(VotingRule::Plurality, &[(Ballot::A, 1.0)]);
        let y = tau(VotingRule::Plurality, &[(Ballot::B, 0.5), (Ballot::C, 0.5)]);
        assert_eq!(x.barycenter(&y, &1.0), y);
        assert_eq!(x.barycenter(&y, &0.0), x);
        let z = x.barycenter(&y, &0.5);
        assert_eq!(*z.share(Ballot::A), 0.5);
        assert_eq!(*z.share(Ballot::B), 0.25);
        assert!(z.is_close(&tau(
            VotingRule::Plurality,
            &[(Ballot::A, 0.5), (Ballot::B, 0.25), (Ballot::C, 0.25)]
        ), &1e-9));
        assert!(!z.is_close(&x, &1e-9));
    }

    #[test]
    fn test_display() {
        let tau = tau(VotingRule::Plurality, &[(Ballot::A, 0.7), (Ballot::B, 0.3)]);
        assert_eq!(tau.to_string(), "<a: 0.7, b: 0.3> (Plurality)");
        let exact: TauVector<BigRational> = TauVector::new(
            VotingRule::Approval,
            [
                (Ballot::AB, BigRational::ratio(1, 3)),
                (Ballot::C, BigRational::ratio(2, 3)),
            ],
        );
        assert_eq!(exact.to_string(), "<c: 2/3, ab: 1/3> (Approval)");
    }

    #[test]
    fn test_has_two_consecutive_zeros() {
        assert!(!tau(
            VotingRule::Plurality,
            &[(Ballot::A, 0.5), (Ballot::B, 0.3), (Ballot::C, 0.2)]
        )
        .has_two_consecutive_zeros());
        assert!(tau(VotingRule::Plurality, &[(Ballot::A, 0.7), (Ballot::B, 0.3)])
            .has_two_consecutive_zeros());
    }

    #[test]
    fn test_best_responses() {
        let tau = tau(
            VotingRule::Approval,
            &[(Ballot::A, 1.0 / 3.0), (Ballot::B, 1.0 / 3.0), (Ballot::C, 1.0 / 3.0)],
        );
        for response in tau.best_responses() {
            assert!((response.threshold_utility - 0.5).abs() < 1e-9);
            assert_eq!(response, tau.best_response(response.ranking));
        }
    }

    #[test]
    #[should_panic(expected = "Ballot ab is illegal under Plurality")]
    fn test_illegal_ballot() {
        tau(VotingRule::Plurality, &[(Ballot::AB, 1.0)]);
    }

    #[test]
    #[should_panic(expected = "Total share of a tau-vector: Failed comparison 0.5 != 1")]
    fn test_total_share() {
        tau(VotingRule::Plurality, &[(Ballot::A, 0.5)]);
    }
}
