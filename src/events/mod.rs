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

//! Tie events of a tau-vector: personalized pivots and trios for each
//! ranking, duos, and the three-way trio with its offsets.
//!
//! All the events of a tau-vector are computed once in a [`TieEvents`]
//! struct, which the best-response computations then borrow.

pub mod cells;
pub mod lattice;

use crate::asymptotic::Asymptotic;
use crate::offsets::{has_two_consecutive_zeros, Offsets};
use crate::types::{Ballot, Candidate, Ranking, VotingRule};
use cells::{PivotCell, TieKind};
use lattice::{Difficulty, LatticeWalk, Step};
use log::{debug, trace};

/// Relative tolerance when comparing the two scores of a duo.
const DUO_SCORE_TOLERANCE: f64 = 1e-9;

/// Score vector of a ballot seen by a voter of the given ranking, i.e.
/// `(s_i - s_j, s_i - s_k)`.
pub fn relative_vector(ranking: Ranking, ballot: Ballot) -> [i64; 2] {
    let (i, j, k) = (ranking.first(), ranking.second(), ranking.third());
    [
        ballot.score(i) - ballot.score(j),
        ballot.score(i) - ballot.score(k),
    ]
}

/// Tie between two candidates, with the third one anywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct Duo {
    /// The two tied candidates.
    pub pair: (Candidate, Candidate),
    /// The third candidate.
    pub excluded: Candidate,
    /// Expected score of each candidate of the pair, conditionally on the
    /// tie.
    pub score_pair: f64,
    /// Expected score of the third candidate, conditionally on the tie.
    pub score_excluded: f64,
    /// Probability of the tie.
    pub asymptotic: Asymptotic,
    /// Whether the pair typically beats the third candidate when tied.
    pub difficulty: Difficulty,
}

impl Duo {
    /// Whether the tie is easy or tight, i.e. the third candidate doesn't
    /// typically beat the pair.
    pub fn is_easy_or_tight(&self) -> bool {
        self.difficulty != Difficulty::Difficult
    }

    fn new(
        walk: &LatticeWalk,
        w: [i64; 2],
        pair: (Candidate, Candidate),
        excluded: Candidate,
        description: &str,
    ) -> Self {
        let slice = walk.slice(w);
        let score = |c: Candidate| -> f64 {
            walk.steps()
                .iter()
                .filter(|s| s.ballot.contains(c))
                .map(|s| s.rate * slice.weight(s.vector))
                .sum()
        };
        let (score_x, score_y) = (score(pair.0), score(pair.1));
        if (score_x - score_y).abs() > DUO_SCORE_TOLERANCE * score_x.max(score_y) {
            panic!(
                "Inconsistent scores in the duo {}{}: {score_x} != {score_y} for {description}",
                pair.0, pair.1
            );
        }
        Duo {
            pair,
            excluded,
            score_pair: score_x,
            score_excluded: score(excluded),
            asymptotic: slice.line([0, 0]),
            difficulty: slice.difficulty(),
        }
    }
}

/// Three-way tie between the candidates.
#[derive(Clone, Debug, PartialEq)]
pub struct Trio {
    /// Probability of the tie.
    pub asymptotic: Asymptotic,
    /// Offsets of the tie.
    pub offsets: Offsets,
}

/// Events relevant to the voters of one ranking `i > j > k`.
#[derive(Clone, Debug, PartialEq)]
pub struct RankingEvents {
    ranking: Ranking,
    walk: LatticeWalk,
    cells: Vec<(PivotCell, Asymptotic)>,
    duo_ij: Option<Duo>,
    duo_jk: Option<Duo>,
}

impl RankingEvents {
    fn new(
        voting_rule: VotingRule,
        ranking: Ranking,
        shares: &[f64; 6],
        description: &str,
    ) -> Self {
        let steps = Ballot::ALL
            .iter()
            .filter(|b| shares[b.index()] > 0.0)
            .map(|&ballot| Step {
                ballot,
                rate: shares[ballot.index()],
                vector: relative_vector(ranking, ballot),
            })
            .collect();
        let walk = LatticeWalk::new(steps);

        let cells: Vec<(PivotCell, Asymptotic)> = voting_rule
            .capabilities()
            .cells
            .iter()
            .map(|cell| {
                let asymptotic = match cell.direction {
                    None => walk.point(cell.base),
                    Some(w) => walk.ray(cell.base, w),
                };
                trace!("[{ranking}] {:?} at {:?}: {asymptotic}", cell.kind, cell.base);
                (*cell, asymptotic)
            })
            .collect();

        let (i, j, k) = (ranking.first(), ranking.second(), ranking.third());
        let (duo_ij, duo_jk) = match walk.saddle() {
            Some(_) => (
                Some(Duo::new(&walk, [0, 1], (i, j), k, description)),
                Some(Duo::new(&walk, [-1, -1], (j, k), i, description)),
            ),
            None => (None, None),
        };

        RankingEvents {
            ranking,
            walk,
            cells,
            duo_ij,
            duo_jk,
        }
    }

    /// Ranking of the voter.
    pub fn ranking(&self) -> Ranking {
        self.ranking
    }

    /// Score walk of the other voters, seen from this ranking.
    pub fn walk(&self) -> &LatticeWalk {
        &self.walk
    }

    /// Pivot cells of the voting rule, with their probabilities.
    pub fn cells(&self) -> &[(PivotCell, Asymptotic)] {
        &self.cells
    }

    /// Total probability of the cells of the given kind.
    pub fn sum(&self, kind: TieKind) -> Asymptotic {
        self.cells
            .iter()
            .filter(|(cell, _)| cell.kind == kind)
            .fold(Asymptotic::zero(), |acc, (_, a)| acc + *a)
    }

    /// Personalized pivot between `i` and `j`.
    pub fn pivot_tij(&self) -> Asymptotic {
        self.sum(TieKind::PivotIJ)
    }

    /// Personalized pivot between `j` and `k`.
    pub fn pivot_tjk(&self) -> Asymptotic {
        self.sum(TieKind::PivotJK)
    }

    /// Personalized trio where the voter's ballot makes `j` win.
    pub fn trio_1t(&self) -> Asymptotic {
        self.sum(TieKind::Trio1t)
    }

    /// Personalized trio where the voter's ballot creates a three-way tie.
    pub fn trio_2t(&self) -> Asymptotic {
        self.sum(TieKind::Trio2t)
    }

    /// Duo between `i` and `j`, if the walk has a saddle point.
    pub fn duo_ij(&self) -> Option<&Duo> {
        self.duo_ij.as_ref()
    }

    /// Duo between `j` and `k`, if the walk has a saddle point.
    pub fn duo_jk(&self) -> Option<&Duo> {
        self.duo_jk.as_ref()
    }
}

/// All the tie events of a tau-vector.
#[derive(Clone, Debug, PartialEq)]
pub struct TieEvents {
    voting_rule: VotingRule,
    has_two_consecutive_zeros: bool,
    description: String,
    trio: Trio,
    rankings: [RankingEvents; 6],
}

impl TieEvents {
    /// Computes the events for the given shares of ballots, indexed like
    /// [`Ballot::ALL`]. The description identifies the tau-vector in panic
    /// messages.
    pub fn new(voting_rule: VotingRule, shares: [f64; 6], description: String) -> Self {
        let rankings =
            Ranking::ALL.map(|r| RankingEvents::new(voting_rule, r, &shares, &description));

        // The walk of the first ranking (abc) uses absolute coordinates.
        let walk = &rankings[0].walk;
        let offsets = match walk.saddle() {
            Some(saddle) => Offsets::new(Ballot::ALL.map(|b| {
                if shares[b.index()] > 0.0 {
                    let v = relative_vector(Ranking::ALL[0], b);
                    Some((saddle.y[0] * v[0] as f64 + saddle.y[1] * v[1] as f64).exp())
                } else {
                    None
                }
            })),
            None => Offsets::undefined(),
        };
        let trio = Trio {
            asymptotic: walk.point([0, 0]),
            offsets,
        };
        debug!("Trio of {description}: {}, offsets {}", trio.asymptotic, trio.offsets);

        TieEvents {
            voting_rule,
            has_two_consecutive_zeros: has_two_consecutive_zeros(|b| shares[b.index()] == 0.0),
            description,
            trio,
            rankings,
        }
    }

    /// Voting rule of the election.
    pub fn voting_rule(&self) -> VotingRule {
        self.voting_rule
    }

    /// Whether two ballots adjacent in the compass order are never cast.
    pub fn has_two_consecutive_zeros(&self) -> bool {
        self.has_two_consecutive_zeros
    }

    /// Description of the tau-vector.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Three-way tie.
    pub fn trio(&self) -> &Trio {
        &self.trio
    }

    /// Events relevant to the given ranking.
    pub fn ranking(&self, ranking: Ranking) -> &RankingEvents {
        &self.rankings[ranking.index()]
    }
}
