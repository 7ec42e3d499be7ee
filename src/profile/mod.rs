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

//! Profiles, i.e. the distribution of preferences in the electorate.

mod discrete;
mod ordinal;

pub use discrete::{Atom, ProfileDiscrete, ProfileDiscreteBuilder};
pub use ordinal::{ProfileOrdinal, ProfileOrdinalBuilder};

use crate::arithmetic::{Rational, RationalRef};
use crate::best_response::BallotChoice;
use crate::equilibrium::{self, EquilibriumStatus};
use crate::strategy::{Strategy, StrategyEntry};
use crate::tau::TauVector;
use crate::types::{Ballot, Ranking, VotingRule, WeakOrder, WeakOrderBallots};

/// Shares of the voters of a ranking, depending on how their utility for
/// their middle candidate compares with a given utility.
#[derive(Clone, Debug, PartialEq)]
pub struct UtilitySplit<R> {
    /// Share of the voters whose utility is strictly above.
    pub above: R,
    /// Share of the voters whose utility is equal.
    pub equal: R,
    /// Share of the voters whose utility is strictly below.
    pub below: R,
}

/// Distribution of preferences in the electorate. Shares sum to 1.
pub trait Profile<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Voting rule of the election.
    fn voting_rule(&self) -> VotingRule;

    /// Share of the voters with the given ranking.
    fn share(&self, ranking: Ranking) -> R;

    /// Share of the voters with the given weak order.
    fn share_weak_order(&self, weak_order: WeakOrder) -> R;

    /// Splits the voters of a ranking according to their utility for their
    /// middle candidate, or returns [`None`] if the profile has no
    /// utilities.
    fn split(&self, ranking: Ranking, utility: &R) -> Option<UtilitySplit<R>>;

    /// Whether the profile knows the utilities of the voters.
    fn has_utilities(&self) -> bool;

    /// Computes the tau-vector induced by a strategy.
    ///
    /// On a profile without utilities, the voters of a ranking with a
    /// threshold strategy split between the high-utility ballot (a share
    /// `ratio_optimistic`) and the low-utility ballot.
    ///
    /// Panics if the strategy is unspecified for a ranking that has voters.
    fn tau(&self, strategy: &Strategy<R>) -> TauVector<R> {
        let voting_rule = self.voting_rule();
        assert_eq!(
            strategy.voting_rule(),
            voting_rule,
            "The strategy and the profile have different voting rules"
        );
        let mut shares: Vec<(Ballot, R)> = Vec::new();
        for ranking in Ranking::ALL {
            let share = self.share(ranking);
            if share == R::zero() {
                continue;
            }
            match strategy.entry(ranking) {
                StrategyEntry::Ballot(ballot) => shares.push((*ballot, share)),
                StrategyEntry::Threshold {
                    utility,
                    ratio_optimistic,
                } => {
                    // Without utilities, all the voters are at the threshold.
                    let split = self.split(ranking, utility).unwrap_or(UtilitySplit {
                        above: R::zero(),
                        equal: share,
                        below: R::zero(),
                    });
                    let high = split.above + ratio_optimistic * &split.equal;
                    let low = split.below + (R::one() - ratio_optimistic) * split.equal;
                    shares.push((voting_rule.ballot_high_u(ranking), high));
                    shares.push((voting_rule.ballot_low_u(ranking), low));
                }
                StrategyEntry::Unspecified => {
                    panic!("The strategy is unspecified for {ranking}, whose share is {share}")
                }
            }
        }
        shares.extend(weak_order_shares(self));
        TauVector::new(voting_rule, shares)
    }

    /// Strategy made of the best responses to the given tau-vector, for the
    /// rankings that have voters.
    ///
    /// Without utilities, rankings whose best response is utility-dependent
    /// get a threshold, so that their voters split evenly between the two
    /// ballots.
    fn best_responses_to(&self, tau: &TauVector<R>) -> Strategy<R> {
        let mut strategy = Strategy::new(self.voting_rule());
        for response in tau.best_responses() {
            if self.share(response.ranking) == R::zero() {
                continue;
            }
            let entry = match response.ballot {
                BallotChoice::Ballot(ballot) if !self.has_utilities() => {
                    StrategyEntry::Ballot(ballot)
                }
                _ => StrategyEntry::Threshold {
                    utility: response.threshold_utility,
                    ratio_optimistic: R::ratio(1, 2),
                },
            };
            strategy.set(response.ranking, entry);
        }
        strategy
    }

    /// Whether the strategy is an equilibrium of this profile.
    fn is_equilibrium(&self, strategy: &Strategy<R>) -> EquilibriumStatus {
        equilibrium::is_equilibrium(self, strategy)
    }

    /// Sincere strategy: threshold 1/2 in Approval, vote for the favorite in
    /// Plurality, vote against the least-liked candidate in Anti-Plurality.
    fn sincere_strategy(&self) -> Strategy<R> {
        let voting_rule = self.voting_rule();
        let mut strategy = Strategy::new(voting_rule);
        for ranking in Ranking::ALL {
            if self.share(ranking) == R::zero() {
                continue;
            }
            let entry = match voting_rule {
                VotingRule::Approval => StrategyEntry::Threshold {
                    utility: R::ratio(1, 2),
                    ratio_optimistic: R::ratio(1, 2),
                },
                VotingRule::Plurality => StrategyEntry::Ballot(Ballot::single(ranking.first())),
                VotingRule::AntiPlurality => {
                    StrategyEntry::Ballot(Ballot::pair(ranking.first(), ranking.second()))
                }
            };
            strategy.set(ranking, entry);
        }
        strategy
    }

    /// Fanatic strategy: every voter casts the low-utility ballot.
    fn fanatic_strategy(&self) -> Strategy<R> {
        let voting_rule = self.voting_rule();
        let mut strategy = Strategy::new(voting_rule);
        for ranking in Ranking::ALL {
            if self.share(ranking) != R::zero() {
                strategy.set(
                    ranking,
                    StrategyEntry::Ballot(voting_rule.ballot_low_u(ranking)),
                );
            }
        }
        strategy
    }
}

/// Shares of the ballots cast by the voters with weak orders, which don't
/// depend on any strategy.
pub(crate) fn weak_order_shares<R, P>(profile: &P) -> Vec<(Ballot, R)>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
    P: Profile<R> + ?Sized,
{
    let mut shares = Vec::new();
    for weak_order in WeakOrder::ALL {
        let share = profile.share_weak_order(weak_order);
        if share == R::zero() {
            continue;
        }
        match profile.voting_rule().weak_order_ballots(weak_order) {
            WeakOrderBallots::Single(ballot) => shares.push((ballot, share)),
            WeakOrderBallots::Split(first, second) => {
                let half = share * R::ratio(1, 2);
                shares.push((first, half.clone()));
                shares.push((second, half));
            }
        }
    }
    shares
}

/// Divides all the shares by their total, warning if the total is not close
/// to 1.
fn normalize<'s, R>(shares: impl IntoIterator<Item = &'s mut R>)
where
    R: Rational + 's,
    for<'a> &'a R: RationalRef<R>,
{
    let shares: Vec<&mut R> = shares.into_iter().collect();
    let total: R = shares.iter().map(|s| &**s).sum();
    assert!(
        total > R::zero(),
        "A profile must have a positive total share"
    );
    if total == R::one() {
        return;
    }
    if !total.is_close(&R::one(), &R::default_tolerance()) {
        log::warn!("Shares of the profile sum to {total}, normalizing to 1");
    }
    for share in shares {
        *share = &*share / &total;
    }
}
