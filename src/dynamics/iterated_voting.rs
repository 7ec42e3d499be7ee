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

//! Iterated voting, searching for a fixed point or a periodic orbit of the
//! dynamics.

use super::{
    initial_tau, update_frequencies, winners_split, DynamicsOptions, Episode, Frequencies, Init,
    SearchStatus,
};
use crate::arithmetic::{Rational, RationalRef};
use crate::profile::Profile;
use crate::strategy::Strategy;
use crate::tau::TauVector;
use log::{debug, info};
use std::fmt::{self, Display};
use std::ops::Range;

/// History of the perceived and actual tau-vectors, and of the best
/// responses.
#[derive(Clone, Debug)]
pub struct Trajectory<R> {
    perceived: Vec<TauVector<R>>,
    actual: Vec<TauVector<R>>,
    strategies: Vec<Strategy<R>>,
}

impl<R> Default for Trajectory<R> {
    fn default() -> Self {
        Trajectory {
            perceived: Vec::new(),
            actual: Vec::new(),
            strategies: Vec::new(),
        }
    }
}

impl<R> Trajectory<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    /// Creates an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded episodes.
    pub fn len(&self) -> usize {
        self.actual.len()
    }

    /// Whether no episode was recorded.
    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }

    /// Records an episode. Returns whether the pair of tau-vectors exactly
    /// repeats an earlier one, in which case the dynamics are periodic from
    /// now on.
    pub fn push(
        &mut self,
        perceived: TauVector<R>,
        actual: TauVector<R>,
        strategy: Strategy<R>,
    ) -> bool {
        let repeat = self
            .perceived
            .iter()
            .zip(&self.actual)
            .any(|(p, a)| *p == perceived && *a == actual);
        self.perceived.push(perceived);
        self.actual.push(actual);
        self.strategies.push(strategy);
        repeat
    }

    /// Finds the shortest cycle ending at the last episode, i.e. episodes
    /// `begin + 1..=end` such that episode `begin` is close to the last
    /// episode `end`.
    pub fn find_cycle(&self, tolerance: &R) -> Option<Range<usize>> {
        let end = self.len().checked_sub(1)?;
        (0..end)
            .rev()
            .find(|&begin| {
                self.perceived[begin].is_close(&self.perceived[end], tolerance)
                    && self.actual[begin].is_close(&self.actual[end], tolerance)
            })
            .map(|begin| begin + 1..end + 1)
    }

    /// Actual tau-vectors of the given episodes.
    pub fn actual(&self, range: Range<usize>) -> &[TauVector<R>] {
        &self.actual[range]
    }

    /// Best responses of the given episodes.
    pub fn strategies(&self, range: Range<usize>) -> &[Strategy<R>] {
        &self.strategies[range]
    }
}

/// Result of iterated voting.
#[derive(Clone, Debug, PartialEq)]
pub struct IteratedVotingResult<R> {
    /// Outcome of the search.
    pub status: SearchStatus,
    /// Actual tau-vectors of the cycle, empty if no cycle was found.
    pub cycle_taus: Vec<TauVector<R>>,
    /// Best responses of the cycle, empty if no cycle was found.
    pub cycle_strategies: Vec<Strategy<R>>,
    /// Number of episodes played.
    pub n_episodes: usize,
    /// Frequency at which each candidate wins. Averaged over the cycle if
    /// there is one, otherwise over all the episodes.
    pub winning_frequencies: [R; 3],
}

/// Runs iterated voting until the pair of perceived and actual tau-vectors
/// repeats exactly, or until the episode budget runs out. Then looks for a
/// cycle at the end of the trajectory.
pub fn iterated_voting<R, P>(
    profile: &P,
    init: &Init<R>,
    options: &DynamicsOptions<R>,
) -> IteratedVotingResult<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
    P: Profile<R> + ?Sized,
{
    assert!(options.n_max_episodes >= 1, "At least one episode is needed");
    let mut episode = Episode::new(initial_tau(profile, init));
    let mut trajectory = Trajectory::new();
    let mut frequencies: [R; 3] = std::array::from_fn(|_| R::zero());
    let mut n_episodes = 0;

    for t in 1..=options.n_max_episodes {
        let outcome = episode.play(profile, t, options);
        n_episodes = t;
        update_frequencies(
            &mut frequencies,
            &episode.actual,
            &options.winning_frequency_update_ratio.at(t),
            &options.tolerance,
        );
        if trajectory.push(
            episode.perceived.clone(),
            episode.actual.clone(),
            outcome.strategy,
        ) {
            debug!("Exact repeat at episode {t}");
            break;
        }
    }

    match trajectory.find_cycle(&options.tolerance) {
        Some(cycle) => {
            let status = if cycle.len() == 1 {
                SearchStatus::Converged
            } else {
                SearchStatus::Cycling
            };
            info!(
                "Iterated voting: {status} with a cycle of length {} after {n_episodes} episodes",
                cycle.len()
            );
            let cycle_taus = trajectory.actual(cycle.clone()).to_vec();
            let weight = R::ratio(1, cycle_taus.len());
            let mut winning_frequencies: [R; 3] = std::array::from_fn(|_| R::zero());
            for tau in &cycle_taus {
                for (frequency, win) in winning_frequencies
                    .iter_mut()
                    .zip(winners_split(tau, &options.tolerance))
                {
                    *frequency += win * &weight;
                }
            }
            IteratedVotingResult {
                status,
                cycle_taus,
                cycle_strategies: trajectory.strategies(cycle).to_vec(),
                n_episodes,
                winning_frequencies,
            }
        }
        None => {
            info!("Iterated voting: no cycle found after {n_episodes} episodes");
            IteratedVotingResult {
                status: SearchStatus::Exhausted,
                cycle_taus: Vec::new(),
                cycle_strategies: Vec::new(),
                n_episodes,
                winning_frequencies: frequencies,
            }
        }
    }
}

impl<R> Display for IteratedVotingResult<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} after {} episodes", self.status, self.n_episodes)?;
        for (n, (tau, strategy)) in self
            .cycle_taus
            .iter()
            .zip(&self.cycle_strategies)
            .enumerate()
        {
            writeln!(f, "[{n}] Tau-vector: {tau}")?;
            writeln!(f, "[{n}] Strategy: {strategy}")?;
        }
        writeln!(
            f,
            "Winning frequencies: {}",
            Frequencies(&self.winning_frequencies)
        )
    }
}
