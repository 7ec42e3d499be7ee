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

//! Equilibria of three-candidate Poisson voting games, under Approval,
//! Plurality and Anti-Plurality voting.
//!
//! In a Poisson game, the number of voters is a Poisson random variable of
//! large mean `n`. Each voter casts a ballot given their preferences and the
//! expected distribution of the ballots (the tau-vector), by comparing the
//! probabilities of the tie events where their ballot changes the winner.
//! These probabilities are computed asymptotically when `n` goes to infinity,
//! see [`asymptotic`] and [`events`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod arithmetic;
pub mod asymptotic;
pub mod best_response;
pub mod dynamics;
pub mod equilibrium;
pub mod events;
pub mod offsets;
pub mod parse;
pub mod profile;
pub mod strategy;
pub mod tau;
pub mod types;
#[cfg(test)]
mod util;
