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

//! Best-response dynamics searching for an equilibrium.
//!
//! At each episode, voters respond to a perceived tau-vector, which slowly
//! follows the actual tau-vector. The actual tau-vector itself moves towards
//! the tau-vector of the best responses.

mod fictitious_play;
mod iterated_voting;

pub use fictitious_play::{fictitious_play, FictitiousPlayResult};
pub use iterated_voting::{iterated_voting, IteratedVotingResult, Trajectory};

use crate::arithmetic::{Rational, RationalRef};
use crate::profile::{self, Profile};
use crate::strategy::Strategy;
use crate::tau::TauVector;
use crate::types::{Candidate, Ranking};
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt::{self, Display};

/// Weight given to the new value when a quantity is updated at episode `t`
/// (starting at 1).
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateRatio<R> {
    /// `1 / t`, i.e. the running average of all the values.
    OneOverT,
    /// `1 / sqrt(t)`.
    OneOverSqrtT,
    /// A constant weight.
    Constant(R),
}

impl<R> UpdateRatio<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Weight at the given episode.
    pub fn at(&self, t: usize) -> R {
        assert!(t >= 1, "Episodes start at 1");
        match self {
            UpdateRatio::OneOverT => R::ratio(1, t),
            UpdateRatio::OneOverSqrtT => R::from_f64(1.0 / (t as f64).sqrt()),
            UpdateRatio::Constant(ratio) => ratio.clone(),
        }
    }
}

impl<R: Display> Display for UpdateRatio<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UpdateRatio::OneOverT => f.write_str("1/t"),
            UpdateRatio::OneOverSqrtT => f.write_str("1/sqrt(t)"),
            UpdateRatio::Constant(ratio) => write!(f, "{ratio}"),
        }
    }
}

/// Initial tau-vector of a search.
#[derive(Clone, Debug, PartialEq)]
pub enum Init<R> {
    /// Tau-vector induced by the given strategy.
    Strategy(Strategy<R>),
    /// The given tau-vector.
    Tau(TauVector<R>),
    /// Tau-vector of the sincere strategy.
    Sincere,
    /// Tau-vector of the fanatic strategy.
    Fanatic,
    /// Voters of each ranking split uniformly at random between their two
    /// undominated ballots.
    RandomUndominated {
        /// Seed of the random generator.
        seed: u64,
    },
}

/// Parameters of the dynamics.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicsOptions<R> {
    /// Maximal number of episodes.
    pub n_max_episodes: usize,
    /// Weight of the actual tau-vector when updating the perceived one.
    pub perception_update_ratio: UpdateRatio<R>,
    /// Weight of the best responses when updating the actual tau-vector.
    pub ballot_update_ratio: UpdateRatio<R>,
    /// Weight of the current winners when updating the winning frequencies.
    pub winning_frequency_update_ratio: UpdateRatio<R>,
    /// Absolute tolerance to compare tau-vectors.
    pub tolerance: R,
}

impl<R> DynamicsOptions<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Fictitious play: both tau-vectors are running averages.
    pub fn fictitious_play() -> Self {
        DynamicsOptions {
            n_max_episodes: 100,
            perception_update_ratio: UpdateRatio::OneOverT,
            ballot_update_ratio: UpdateRatio::OneOverT,
            winning_frequency_update_ratio: UpdateRatio::OneOverT,
            tolerance: R::default_tolerance(),
        }
    }

    /// Iterated voting: voters respond to the last election.
    pub fn iterated_voting() -> Self {
        DynamicsOptions {
            n_max_episodes: 100,
            perception_update_ratio: UpdateRatio::Constant(R::one()),
            ballot_update_ratio: UpdateRatio::Constant(R::one()),
            winning_frequency_update_ratio: UpdateRatio::OneOverT,
            tolerance: R::default_tolerance(),
        }
    }

    /// Sets the maximal number of episodes.
    pub fn with_n_max_episodes(mut self, n_max_episodes: usize) -> Self {
        self.n_max_episodes = n_max_episodes;
        self
    }

    /// Sets the perception update ratio.
    pub fn with_perception_update_ratio(mut self, ratio: UpdateRatio<R>) -> Self {
        self.perception_update_ratio = ratio;
        self
    }

    /// Sets the ballot update ratio.
    pub fn with_ballot_update_ratio(mut self, ratio: UpdateRatio<R>) -> Self {
        self.ballot_update_ratio = ratio;
        self
    }

    /// Sets the winning frequency update ratio.
    pub fn with_winning_frequency_update_ratio(mut self, ratio: UpdateRatio<R>) -> Self {
        self.winning_frequency_update_ratio = ratio;
        self
    }

    /// Sets the tolerance.
    pub fn with_tolerance(mut self, tolerance: R) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Outcome of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    /// The tau-vector reached a fixed point.
    Converged,
    /// The tau-vector reached a periodic orbit.
    Cycling,
    /// The episode budget ran out.
    Exhausted,
}

impl Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            SearchStatus::Converged => "Converged",
            SearchStatus::Cycling => "Cycling",
            SearchStatus::Exhausted => "Exhausted",
        })
    }
}

/// Computes the initial tau-vector of a search.
pub fn initial_tau<R, P>(profile: &P, init: &Init<R>) -> TauVector<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
    P: Profile<R> + ?Sized,
{
    match init {
        Init::Strategy(strategy) => profile.tau(strategy),
        Init::Tau(tau) => {
            assert_eq!(
                tau.voting_rule(),
                profile.voting_rule(),
                "The initial tau-vector and the profile have different voting rules"
            );
            tau.clone()
        }
        Init::Sincere => profile.tau(&profile.sincere_strategy()),
        Init::Fanatic => profile.tau(&profile.fanatic_strategy()),
        Init::RandomUndominated { seed } => random_undominated_tau(profile, *seed),
    }
}

fn random_undominated_tau<R, P>(profile: &P, seed: u64) -> TauVector<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
    P: Profile<R> + ?Sized,
{
    let voting_rule = profile.voting_rule();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shares = profile::weak_order_shares(profile);
    for ranking in Ranking::ALL {
        let share = profile.share(ranking);
        if share == R::zero() {
            continue;
        }
        let ratio_high = R::from_f64(rng.gen::<f64>());
        let high = &share * &ratio_high;
        let low = share * (R::one() - ratio_high);
        shares.push((voting_rule.ballot_high_u(ranking), high));
        shares.push((voting_rule.ballot_low_u(ranking), low));
    }
    TauVector::new(voting_rule, shares)
}

/// State carried from one episode to the next.
struct Episode<R> {
    perceived: TauVector<R>,
    actual: TauVector<R>,
}

/// Result of one episode.
struct EpisodeOutcome<R> {
    strategy: Strategy<R>,
    full_response: TauVector<R>,
}

impl<R> Episode<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    fn new(tau: TauVector<R>) -> Self {
        Episode {
            perceived: tau.clone(),
            actual: tau,
        }
    }

    /// Plays episode `t`, updating the perceived and actual tau-vectors.
    fn play<P>(&mut self, profile: &P, t: usize, options: &DynamicsOptions<R>) -> EpisodeOutcome<R>
    where
        P: Profile<R> + ?Sized,
    {
        self.perceived = self
            .perceived
            .barycenter(&self.actual, &options.perception_update_ratio.at(t));
        let strategy = profile.best_responses_to(&self.perceived);
        let full_response = profile.tau(&strategy);
        self.actual = self
            .actual
            .barycenter(&full_response, &options.ballot_update_ratio.at(t));
        debug!(
            "Episode {t}: perceived = {}, actual = {}",
            self.perceived, self.actual
        );
        trace!("Episode {t}: strategy = {strategy}");
        EpisodeOutcome {
            strategy,
            full_response,
        }
    }
}

/// Splits one win uniformly between the candidates with the highest score.
fn winners_split<R>(tau: &TauVector<R>, tolerance: &R) -> [R; 3]
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    let winners = tau.winners(tolerance);
    let mut split: [R; 3] = std::array::from_fn(|_| R::zero());
    for candidate in &winners {
        split[candidate.index()] = R::ratio(1, winners.len());
    }
    split
}

/// Moves the winning frequencies towards the winners of the tau-vector.
fn update_frequencies<R>(frequencies: &mut [R; 3], tau: &TauVector<R>, ratio: &R, tolerance: &R)
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    let split = winners_split(tau, tolerance);
    let keep = R::one() - ratio;
    for (frequency, win) in frequencies.iter_mut().zip(split) {
        *frequency = &keep * &*frequency + ratio * &win;
    }
}

/// Formats winning frequencies as `a: 0.5, b: 0.5, c: 0`.
struct Frequencies<'a, R>(&'a [R; 3]);

impl<R: Display> Display for Frequencies<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (n, candidate) in Candidate::ALL.iter().enumerate() {
            if n != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{candidate}: {}", self.0[n])?;
        }
        Ok(())
    }
}
