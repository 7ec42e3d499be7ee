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

//! Fictitious play, searching for a limit point of the dynamics.

use super::{
    initial_tau, update_frequencies, winners_split, DynamicsOptions, Episode, Frequencies, Init,
    SearchStatus,
};
use crate::arithmetic::{Rational, RationalRef};
use crate::profile::Profile;
use crate::strategy::Strategy;
use crate::tau::TauVector;
use log::info;
use std::fmt::{self, Display};

/// Result of fictitious play.
#[derive(Clone, Debug, PartialEq)]
pub struct FictitiousPlayResult<R> {
    /// Either [`SearchStatus::Converged`] or [`SearchStatus::Exhausted`].
    pub status: SearchStatus,
    /// Last actual tau-vector.
    pub tau: TauVector<R>,
    /// Last best responses.
    pub strategy: Strategy<R>,
    /// Number of episodes played.
    pub n_episodes: usize,
    /// Frequency at which each candidate wins. When converged, the winners of
    /// the limit, otherwise the average over the episodes.
    pub winning_frequencies: [R; 3],
}

/// Runs fictitious play until the perceived, actual and best-response
/// tau-vectors are all close to each other, or until the episode budget runs
/// out.
pub fn fictitious_play<R, P>(
    profile: &P,
    init: &Init<R>,
    options: &DynamicsOptions<R>,
) -> FictitiousPlayResult<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
    P: Profile<R> + ?Sized,
{
    assert!(options.n_max_episodes >= 1, "At least one episode is needed");
    let mut episode = Episode::new(initial_tau(profile, init));
    let mut frequencies: [R; 3] = std::array::from_fn(|_| R::zero());
    let mut strategy = Strategy::new(profile.voting_rule());

    for t in 1..=options.n_max_episodes {
        let outcome = episode.play(profile, t, options);
        strategy = outcome.strategy;
        update_frequencies(
            &mut frequencies,
            &episode.actual,
            &options.winning_frequency_update_ratio.at(t),
            &options.tolerance,
        );

        let tolerance = &options.tolerance;
        if episode.perceived.is_close(&outcome.full_response, tolerance)
            && episode.perceived.is_close(&episode.actual, tolerance)
            && episode.actual.is_close(&outcome.full_response, tolerance)
        {
            info!("Fictitious play converged after {t} episodes");
            return FictitiousPlayResult {
                status: SearchStatus::Converged,
                winning_frequencies: winners_split(&episode.actual, tolerance),
                tau: episode.actual,
                strategy,
                n_episodes: t,
            };
        }
    }

    info!(
        "Fictitious play did not converge after {} episodes",
        options.n_max_episodes
    );
    FictitiousPlayResult {
        status: SearchStatus::Exhausted,
        tau: episode.actual,
        strategy,
        n_episodes: options.n_max_episodes,
        winning_frequencies: frequencies,
    }
}

impl<R> Display for FictitiousPlayResult<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} after {} episodes", self.status, self.n_episodes)?;
        writeln!(f, "Tau-vector: {}", self.tau)?;
        writeln!(f, "Strategy: {}", self.strategy)?;
        writeln!(
            f,
            "Winning frequencies: {}",
            Frequencies(&self.winning_frequencies)
        )
    }
}
