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

//! Profiles that only know the rankings of the voters.

use super::{normalize, Profile, UtilitySplit};
use crate::arithmetic::{Rational, RationalRef};
use crate::types::{Ranking, VotingRule, WeakOrder};
use std::fmt::{self, Display};

/// Profile given by the share of each ranking and weak order.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileOrdinal<R> {
    voting_rule: VotingRule,
    rankings: [R; 6],
    weak_orders: [R; 6],
}

/// Builder for a [`ProfileOrdinal`].
pub struct ProfileOrdinalBuilder<R> {
    voting_rule: VotingRule,
    rankings: [R; 6],
    weak_orders: [R; 6],
}

impl<R> ProfileOrdinal<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Starts building a profile for the given voting rule.
    pub fn builder(voting_rule: VotingRule) -> ProfileOrdinalBuilder<R> {
        ProfileOrdinalBuilder {
            voting_rule,
            rankings: std::array::from_fn(|_| R::zero()),
            weak_orders: std::array::from_fn(|_| R::zero()),
        }
    }
}

impl<R> ProfileOrdinalBuilder<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Adds voters with a ranking.
    pub fn ranking(mut self, ranking: Ranking, share: R) -> Self {
        assert!(
            share >= R::zero(),
            "Share must be non-negative, found {share} for {ranking}"
        );
        self.rankings[ranking.index()] += share;
        self
    }

    /// Adds voters with a weak order.
    pub fn weak_order(mut self, weak_order: WeakOrder, share: R) -> Self {
        assert!(
            share >= R::zero(),
            "Share must be non-negative, found {share} for {weak_order}"
        );
        self.weak_orders[weak_order.index()] += share;
        self
    }

    /// Finishes the profile, normalizing the shares so that they sum to 1.
    pub fn build(mut self) -> ProfileOrdinal<R> {
        normalize(self.rankings.iter_mut().chain(self.weak_orders.iter_mut()));
        ProfileOrdinal {
            voting_rule: self.voting_rule,
            rankings: self.rankings,
            weak_orders: self.weak_orders,
        }
    }
}

impl<R> Profile<R> for ProfileOrdinal<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    fn voting_rule(&self) -> VotingRule {
        self.voting_rule
    }

    fn share(&self, ranking: Ranking) -> R {
        self.rankings[ranking.index()].clone()
    }

    fn share_weak_order(&self, weak_order: WeakOrder) -> R {
        self.weak_orders[weak_order.index()].clone()
    }

    fn split(&self, _ranking: Ranking, _utility: &R) -> Option<UtilitySplit<R>> {
        None
    }

    fn has_utilities(&self) -> bool {
        false
    }
}

impl<R> Display for ProfileOrdinal<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rankings = Ranking::ALL
            .iter()
            .map(|r| (r.to_string(), &self.rankings[r.index()]));
        let weak_orders = WeakOrder::ALL
            .iter()
            .map(|w| (w.to_string(), &self.weak_orders[w.index()]));
        let items: Vec<String> = rankings
            .chain(weak_orders)
            .filter(|(_, share)| **share != R::zero())
            .map(|(name, share)| format!("{name}: {share}"))
            .collect();
        write!(f, "{{{}}} ({})", items.join(", "), self.voting_rule)
    }
}
