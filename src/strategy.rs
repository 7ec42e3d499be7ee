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

//! Strategies, i.e. the behavior of the voters of each ranking.

use crate::types::{Ballot, Ranking, VotingRule};
use std::fmt::{self, Display};

/// Behavior of the voters of one ranking.
#[derive(Clone, Debug, PartialEq)]
pub enum StrategyEntry<R> {
    /// All the voters cast this ballot.
    Ballot(Ballot),
    /// Voters whose utility for their middle candidate is above the threshold
    /// cast the high-utility ballot, those below cast the low-utility ballot.
    Threshold {
        /// Threshold utility.
        utility: R,
        /// Share of the voters exactly at the threshold who cast the
        /// high-utility ballot.
        ratio_optimistic: R,
    },
    /// No behavior is given, which is only valid for rankings that have no
    /// voters.
    Unspecified,
}

/// Behavior of the voters of every ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct Strategy<R> {
    voting_rule: VotingRule,
    entries: [StrategyEntry<R>; 6],
}

impl<R> Strategy<R> {
    /// Creates a strategy where every entry is unspecified.
    pub fn new(voting_rule: VotingRule) -> Self {
        Strategy {
            voting_rule,
            entries: std::array::from_fn(|_| StrategyEntry::Unspecified),
        }
    }

    /// Sets the entry of the given ranking.
    ///
    /// Panics if the entry is a ballot that is illegal under the voting rule.
    pub fn with(mut self, ranking: Ranking, entry: StrategyEntry<R>) -> Self {
        self.set(ranking, entry);
        self
    }

    /// Sets the entry of the given ranking to a ballot.
    pub fn with_ballot(self, ranking: Ranking, ballot: Ballot) -> Self {
        self.with(ranking, StrategyEntry::Ballot(ballot))
    }

    /// Sets the entry of the given ranking.
    pub fn set(&mut self, ranking: Ranking, entry: StrategyEntry<R>) {
        if let StrategyEntry::Ballot(ballot) = &entry {
            assert!(
                self.voting_rule.is_legal(*ballot),
                "Ballot {ballot} is illegal under {}",
                self.voting_rule
            );
        }
        self.entries[ranking.index()] = entry;
    }

    /// Voting rule of the election.
    pub fn voting_rule(&self) -> VotingRule {
        self.voting_rule
    }

    /// Entry of the given ranking.
    pub fn entry(&self, ranking: Ranking) -> &StrategyEntry<R> {
        &self.entries[ranking.index()]
    }
}

impl<R: Display> Display for StrategyEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StrategyEntry::Ballot(ballot) => write!(f, "{ballot}"),
            StrategyEntry::Threshold {
                utility,
                ratio_optimistic,
            } => write!(f, "utility-dependent ({utility}, {ratio_optimistic})"),
            StrategyEntry::Unspecified => f.write_str("-"),
        }
    }
}

impl<R: Display> Display for Strategy<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("<")?;
        for (n, ranking) in Ranking::ALL.iter().enumerate() {
            if n != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ranking}: {}", self.entries[n])?;
        }
        write!(f, "> ({})", self.voting_rule)
    }
}
