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

//! Module deciding whether a strategy is an equilibrium of a profile.

use crate::arithmetic::{Rational, RationalRef};
use crate::best_response::{best_response, BallotChoice, BestResponse};
use crate::profile::Profile;
use crate::strategy::{Strategy, StrategyEntry};
use crate::types::Ranking;
use log::debug;
use std::fmt::{self, Display};

/// Whether a strategy is an equilibrium. Statuses are ordered from the most
/// negative to the most positive, and the status of a strategy is the
/// minimum over all the rankings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EquilibriumStatus {
    /// Some voters would be better off with another ballot.
    NotEquilibrium,
    /// The strategy doesn't say what some voters do.
    Inconclusive,
    /// The answer depends on the utilities, which the profile doesn't know.
    UtilityDependent,
    /// All the voters play a best response.
    Equilibrium,
}

impl Display for EquilibriumStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            EquilibriumStatus::NotEquilibrium => "Not equilibrium",
            EquilibriumStatus::Inconclusive => "Inconclusive",
            EquilibriumStatus::UtilityDependent => "Utility-dependent",
            EquilibriumStatus::Equilibrium => "Equilibrium",
        })
    }
}

/// Decides whether the strategy is an equilibrium of the profile, i.e.
/// whether all the voters play a best response to the tau-vector that the
/// strategy induces.
pub fn is_equilibrium<R, P>(profile: &P, strategy: &Strategy<R>) -> EquilibriumStatus
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
    P: Profile<R> + ?Sized,
{
    let tau = profile.tau(strategy);
    let events = tau.tie_events();
    let mut status = EquilibriumStatus::Equilibrium;
    for ranking in Ranking::ALL {
        if profile.share(ranking) == R::zero() {
            continue;
        }
        let response: BestResponse<R> = best_response(&events, ranking);
        let ranking_status = ranking_status(profile, ranking, strategy.entry(ranking), &response);
        debug!("{ranking}: {ranking_status} (best response {response})");
        if ranking_status == EquilibriumStatus::NotEquilibrium {
            return ranking_status;
        }
        status = status.min(ranking_status);
    }
    assert_ne!(
        status,
        EquilibriumStatus::Inconclusive,
        "Inconclusive equilibrium status for {strategy} with tau = {tau}"
    );
    status
}

fn ranking_status<R, P>(
    profile: &P,
    ranking: Ranking,
    entry: &StrategyEntry<R>,
    response: &BestResponse<R>,
) -> EquilibriumStatus
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
    P: Profile<R> + ?Sized,
{
    let voting_rule = profile.voting_rule();

    if !profile.has_utilities() {
        return match (entry, response.ballot) {
            (StrategyEntry::Unspecified, _) => EquilibriumStatus::Inconclusive,
            (_, BallotChoice::UtilityDependent) => EquilibriumStatus::UtilityDependent,
            (StrategyEntry::Ballot(ballot), BallotChoice::Ballot(best)) if *ballot == best => {
                EquilibriumStatus::Equilibrium
            }
            _ => EquilibriumStatus::NotEquilibrium,
        };
    }

    // A ballot is equivalent to a threshold at one end of the utility range.
    let (threshold, ratio_optimistic) = match entry {
        StrategyEntry::Unspecified => return EquilibriumStatus::Inconclusive,
        StrategyEntry::Ballot(ballot) if *ballot == voting_rule.ballot_high_u(ranking) => {
            (R::zero(), R::one())
        }
        StrategyEntry::Ballot(ballot) if *ballot == voting_rule.ballot_low_u(ranking) => {
            (R::one(), R::zero())
        }
        StrategyEntry::Ballot(_) => return EquilibriumStatus::NotEquilibrium,
        StrategyEntry::Threshold {
            utility,
            ratio_optimistic,
        } => (utility.clone(), ratio_optimistic.clone()),
    };

    let best = &response.threshold_utility;
    let (at_threshold, at_best) = match (
        profile.split(ranking, &threshold),
        profile.split(ranking, best),
    ) {
        (Some(at_threshold), Some(at_best)) => (at_threshold, at_best),
        _ => return EquilibriumStatus::Inconclusive,
    };

    // Share of the voters of the ranking who cast a different ballot than
    // their best response. Voters exactly at the best threshold are
    // indifferent.
    let misplaced = if threshold < *best {
        at_threshold.above - at_best.above - at_best.equal + ratio_optimistic * at_threshold.equal
    } else if threshold > *best {
        at_best.above - at_threshold.above - &at_threshold.equal
            + (R::one() - ratio_optimistic) * at_threshold.equal
    } else {
        R::zero()
    };

    if misplaced.is_close(&R::zero(), &R::default_tolerance()) {
        EquilibriumStatus::Equilibrium
    } else {
        EquilibriumStatus::NotEquilibrium
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::profile::{ProfileDiscrete, ProfileOrdinal};
    use crate::types::{Ballot, VotingRule};

    fn symmetric_approval(utility: f64) -> ProfileDiscrete<f64> {
        Ranking::ALL
            .iter()
            .fold(ProfileDiscrete::builder(VotingRule::Approval), |builder, &r| {
                builder.ranking(r, utility, 1.0 / 6.0)
            })
            .build()
    }

    #[test]
    fn test_approval_single_votes() {
        let low = symmetric_approval(0.3);
        let strategy = low.fanatic_strategy();
        assert_eq!(low.is_equilibrium(&strategy), EquilibriumStatus::Equilibrium);

        let high = symmetric_approval(0.7);
        let strategy = high.fanatic_strategy();
        assert_eq!(high.is_equilibrium(&strategy), EquilibriumStatus::NotEquilibrium);
        assert_eq!(
            high.is_equilibrium(&high.sincere_strategy()),
            EquilibriumStatus::Equilibrium
        );
    }

    #[test]
    fn test_ordinal_utility_dependent() {
        let profile = Ranking::ALL
            .iter()
            .fold(ProfileOrdinal::builder(VotingRule::Approval), |builder, &r| {
                builder.ranking(r, 1.0 / 6.0)
            })
            .build();
        let strategy = profile.fanatic_strategy();
        assert_eq!(
            profile.is_equilibrium(&strategy),
            EquilibriumStatus::UtilityDependent
        );
    }

    fn plurality_profile() -> ProfileDiscrete<f64> {
        ProfileDiscrete::builder(VotingRule::Plurality)
            .ranking("abc".parse().unwrap(), 0.5, 0.5)
            .ranking("bac".parse().unwrap(), 0.5, 0.3)
            .ranking("cab".parse().unwrap(), 0.5, 0.2)
            .build()
    }

    #[test]
    fn test_plurality() {
        let profile = plurality_profile();
        let strategy = Strategy::new(VotingRule::Plurality)
            .with_ballot("abc".parse().unwrap(), Ballot::A)
            .with_ballot("bac".parse().unwrap(), Ballot::B)
            .with_ballot("cab".parse().unwrap(), Ballot::A);
        assert_eq!(profile.is_equilibrium(&strategy), EquilibriumStatus::Equilibrium);
        assert_eq!(
            profile.is_equilibrium(&profile.sincere_strategy()),
            EquilibriumStatus::NotEquilibrium
        );
    }

    #[test]
    fn test_plurality_ordinal() {
        let profile = ProfileOrdinal::builder(VotingRule::Plurality)
            .ranking("abc".parse().unwrap(), 0.5)
            .ranking("bac".parse().unwrap(), 0.3)
            .ranking("cab".parse().unwrap(), 0.2)
            .build();
        let strategy = Strategy::new(VotingRule::Plurality)
            .with_ballot("abc".parse().unwrap(), Ballot::A)
            .with_ballot("bac".parse().unwrap(), Ballot::B)
            .with_ballot("cab".parse().unwrap(), Ballot::A);
        assert_eq!(profile.is_equilibrium(&strategy), EquilibriumStatus::Equilibrium);
        assert_eq!(
            profile.is_equilibrium(&profile.sincere_strategy()),
            EquilibriumStatus::NotEquilibrium
        );
    }

    #[test]
    fn test_dominated_ballot() {
        let profile = plurality_profile();
        // Voting for the least-liked candidate is neither ballot of the
        // threshold family.
        let strategy = Strategy::new(VotingRule::Plurality)
            .with_ballot("abc".parse().unwrap(), Ballot::C)
            .with_ballot("bac".parse().unwrap(), Ballot::B)
            .with_ballot("cab".parse().unwrap(), Ballot::A);
        assert_eq!(profile.is_equilibrium(&strategy), EquilibriumStatus::NotEquilibrium);
    }

    #[test]
    fn test_best_responses_are_equilibrium() {
        let profile = plurality_profile();
        let tau = profile.tau(&profile.sincere_strategy());
        let strategy = profile.best_responses_to(&tau);
        let tau = profile.tau(&strategy);
        let strategy = profile.best_responses_to(&tau);
        assert_eq!(profile.is_equilibrium(&strategy), EquilibriumStatus::Equilibrium);
    }

    #[test]
    fn test_ordering() {
        assert!(EquilibriumStatus::NotEquilibrium < EquilibriumStatus::Inconclusive);
        assert!(EquilibriumStatus::Inconclusive < EquilibriumStatus::UtilityDependent);
        assert!(EquilibriumStatus::UtilityDependent < EquilibriumStatus::Equilibrium);
        assert_eq!(EquilibriumStatus::UtilityDependent.to_string(), "Utility-dependent");
    }
}
