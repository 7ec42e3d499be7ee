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

//! Profiles where the utilities take finitely many values.

use super::{normalize, Profile, UtilitySplit};
use crate::arithmetic::{Rational, RationalRef};
use crate::types::{Ranking, VotingRule, WeakOrder};
use std::fmt::{self, Display};

/// Group of voters sharing the same ranking and utility.
#[derive(Clone, Debug, PartialEq)]
pub struct Atom<R> {
    /// Utility for the middle candidate, in `[0, 1]`.
    pub utility: R,
    /// Share of the electorate.
    pub share: R,
}

/// Profile made of finitely many groups of voters, each with a ranking and a
/// utility for their middle candidate, plus voters with weak orders.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileDiscrete<R> {
    voting_rule: VotingRule,
    atoms: [Vec<Atom<R>>; 6],
    weak_orders: [R; 6],
}

/// Builder for a [`ProfileDiscrete`].
pub struct ProfileDiscreteBuilder<R> {
    voting_rule: VotingRule,
    atoms: [Vec<Atom<R>>; 6],
    weak_orders: [R; 6],
}

impl<R> ProfileDiscrete<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Starts building a profile for the given voting rule.
    pub fn builder(voting_rule: VotingRule) -> ProfileDiscreteBuilder<R> {
        ProfileDiscreteBuilder {
            voting_rule,
            atoms: Default::default(),
            weak_orders: std::array::from_fn(|_| R::zero()),
        }
    }

    /// Groups of voters of the given ranking.
    pub fn atoms(&self, ranking: Ranking) -> &[Atom<R>] {
        &self.atoms[ranking.index()]
    }
}

impl<R> ProfileDiscreteBuilder<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Adds a group of voters. Groups with the same ranking and utility are
    /// merged.
    pub fn ranking(mut self, ranking: Ranking, utility: R, share: R) -> Self {
        assert!(
            utility >= R::zero() && utility <= R::one(),
            "Utility must be in [0, 1], found {utility} for {ranking}"
        );
        assert!(
            share >= R::zero(),
            "Share must be non-negative, found {share} for {ranking}"
        );
        let atoms = &mut self.atoms[ranking.index()];
        match atoms.iter_mut().find(|atom| atom.utility == utility) {
            Some(atom) => atom.share += share,
            None => atoms.push(Atom { utility, share }),
        }
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
    pub fn build(mut self) -> ProfileDiscrete<R> {
        for atoms in self.atoms.iter_mut() {
            atoms.retain(|atom| atom.share != R::zero());
            atoms.sort_by(|x, y| {
                x.utility
                    .partial_cmp(&y.utility)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        normalize(
            self.atoms
                .iter_mut()
                .flat_map(|atoms| atoms.iter_mut().map(|atom| &mut atom.share))
                .chain(self.weak_orders.iter_mut()),
        );
        ProfileDiscrete {
            voting_rule: self.voting_rule,
            atoms: self.atoms,
            weak_orders: self.weak_orders,
        }
    }
}

impl<R> Profile<R> for ProfileDiscrete<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    fn voting_rule(&self) -> VotingRule {
        self.voting_rule
    }

    fn share(&self, ranking: Ranking) -> R {
        self.atoms[ranking.index()]
            .iter()
            .map(|atom| &atom.share)
            .sum()
    }

    fn share_weak_order(&self, weak_order: WeakOrder) -> R {
        self.weak_orders[weak_order.index()].clone()
    }

    fn split(&self, ranking: Ranking, utility: &R) -> Option<UtilitySplit<R>> {
        let mut split = UtilitySplit {
            above: R::zero(),
            equal: R::zero(),
            below: R::zero(),
        };
        for atom in &self.atoms[ranking.index()] {
            if atom.utility > *utility {
                split.above += &atom.share;
            } else if atom.utility < *utility {
                split.below += &atom.share;
            } else {
                split.equal += &atom.share;
            }
        }
        Some(split)
    }

    fn has_utilities(&self) -> bool {
        true
    }
}

impl<R> Display for ProfileDiscrete<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut items: Vec<String> = Vec::new();
        for ranking in Ranking::ALL {
            for atom in &self.atoms[ranking.index()] {
                items.push(format!("{ranking} {}: {}", atom.utility, atom.share));
            }
        }
        for weak_order in WeakOrder::ALL {
            let share = &self.weak_orders[weak_order.index()];
            if *share != R::zero() {
                items.push(format!("{weak_order}: {share}"));
            }
        }
        write!(f, "{{{}}} ({})", items.join(", "), self.voting_rule)
    }
}
