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

//! Module computing the best response of a voter to a tau-vector.
//!
//! The best response of a voter of ranking `i > j > k` is described by a
//! threshold utility for their middle candidate: above the threshold, they
//! cast the high-utility ballot (e.g. `{i, j}` in Approval), below they cast
//! the low-utility ballot (e.g. `{i}`). The threshold is computed by trying
//! several methods in order, until one of them gives a defined result.

use crate::arithmetic::{Rational, RationalRef};
use crate::asymptotic::Asymptotic;
use crate::events::TieEvents;
use crate::offsets::RelativeOffsets;
use crate::types::{Ballot, Ranking};
use log::{debug, warn};
use std::fmt::{self, Display};

/// Absolute tolerance used to decide whether a threshold is 0 or 1.
pub const BALLOT_TOLERANCE: f64 = 1e-9;

/// Relative tolerance under which a pseudo-offset that should be less than 1
/// is considered to be 1.
pub const OFFSET_CORRECTION_TOLERANCE: f64 = 0.1;

/// Method that justifies a best response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Justification {
    /// Limit of the ratio of all the pivot events.
    Asymptotic,
    /// Limit of the ratio of the personalized pivots only, when both duos are
    /// easy or tight.
    SimplifiedAsymptotic,
    /// The pivot `ij` is easy and the pivot `jk` is difficult.
    EasyVsDifficult,
    /// The pivot `ij` is difficult and the pivot `jk` is easy.
    DifficultVsEasy,
    /// Both pivots are difficult, and the ratio is given by the offsets of
    /// the trio.
    OffsetMethod,
    /// Same as [`Justification::OffsetMethod`], but a pseudo-offset was
    /// rounded to 1.
    OffsetMethodWithCorrection,
}

impl Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Justification::Asymptotic => "Asymptotic method",
            Justification::SimplifiedAsymptotic => "Simplified asymptotic method",
            Justification::EasyVsDifficult => "Easy vs difficult pivot",
            Justification::DifficultVsEasy => "Difficult vs easy pivot",
            Justification::OffsetMethod => "Offset method",
            Justification::OffsetMethodWithCorrection => "Offset method (with correction)",
        })
    }
}

/// Ballot derived from a best response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BallotChoice {
    /// All the voters of the ranking cast this ballot.
    Ballot(Ballot),
    /// The ballot depends on the utility of the voter.
    UtilityDependent,
}

impl Display for BallotChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BallotChoice::Ballot(ballot) => write!(f, "{ballot}"),
            BallotChoice::UtilityDependent => f.write_str("utility-dependent"),
        }
    }
}

/// Best response of the voters of a ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct BestResponse<R> {
    /// Ranking of the voters.
    pub ranking: Ranking,
    /// Utility of the middle candidate above which the high-utility ballot
    /// is better, in `[0, 1]`.
    pub threshold_utility: R,
    /// Method used to compute the threshold.
    pub justification: Justification,
    /// Ballot implied by the threshold.
    pub ballot: BallotChoice,
}

impl<R> Display for BestResponse<R>
where
    R: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} (threshold {}, {})",
            self.ranking, self.ballot, self.threshold_utility, self.justification
        )
    }
}

type Method = fn(&TieEvents, Ranking) -> Option<(f64, Justification)>;

/// Computes the best response of the voters of the given ranking.
///
/// Panics if no method gives a defined result, which reveals a bug in the
/// computation of the tie events.
pub fn best_response<R>(events: &TieEvents, ranking: Ranking) -> BestResponse<R>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    let voting_rule = events.voting_rule();
    let methods: &[Method] =
        if voting_rule.capabilities().limit_pivot_theorem && !events.has_two_consecutive_zeros() {
            &[limit_pivot_theorem, asymptotic_method]
        } else {
            &[asymptotic_method]
        };

    let (threshold, justification) = methods
        .iter()
        .find_map(|method| method(events, ranking))
        .unwrap_or_else(|| {
            panic!(
                "No method could compute the best response of {ranking} to {}",
                events.description()
            )
        });

    let ballot = if threshold <= BALLOT_TOLERANCE {
        BallotChoice::Ballot(voting_rule.ballot_high_u(ranking))
    } else if threshold >= 1.0 - BALLOT_TOLERANCE {
        BallotChoice::Ballot(voting_rule.ballot_low_u(ranking))
    } else {
        BallotChoice::UtilityDependent
    };
    debug!("Best response of {ranking}: {ballot} (threshold {threshold}, {justification})");

    BestResponse {
        ranking,
        threshold_utility: R::from_f64(threshold),
        justification,
        ballot,
    }
}

/// Compares the expected gains of both ballots over all the pivot cells.
fn asymptotic_method(events: &TieEvents, ranking: Ranking) -> Option<(f64, Justification)> {
    let ranking_events = events.ranking(ranking);
    let mut loss = Asymptotic::zero();
    let mut gain_top = Asymptotic::zero();
    let mut gain_middle = Asymptotic::zero();
    for (cell, asymptotic) in ranking_events.cells() {
        if cell.gain_top < 0.0 {
            loss = loss + *asymptotic * -cell.gain_top;
        } else if cell.gain_top > 0.0 {
            gain_top = gain_top + *asymptotic * cell.gain_top;
        }
        if cell.gain_middle > 0.0 {
            gain_middle = gain_middle + *asymptotic * cell.gain_middle;
        }
    }

    let r = (loss / gain_middle).limit();
    let s = (gain_top / gain_middle).limit();
    if r.is_nan() || s.is_nan() {
        return None;
    }
    let threshold = match (r.is_infinite(), s.is_infinite()) {
        (true, true) => return None,
        (true, false) => 1.0,
        (false, true) => 0.0,
        (false, false) => (r - s).clamp(0.0, 1.0),
    };
    Some((threshold, Justification::Asymptotic))
}

/// Compares the personalized pivots `ij` and `jk`, depending on whether the
/// corresponding duos are easy or difficult.
fn limit_pivot_theorem(events: &TieEvents, ranking: Ranking) -> Option<(f64, Justification)> {
    let ranking_events = events.ranking(ranking);
    let easy_ij = ranking_events.duo_ij()?.is_easy_or_tight();
    let easy_jk = ranking_events.duo_jk()?.is_easy_or_tight();
    match (easy_ij, easy_jk) {
        (true, true) => {
            let half_ij = ranking_events.pivot_tij() * 0.5;
            let half_jk = ranking_events.pivot_tjk() * 0.5;
            let threshold = (half_ij / (half_ij + half_jk)).limit();
            if threshold.is_nan() {
                None
            } else {
                Some((threshold, Justification::SimplifiedAsymptotic))
            }
        }
        (true, false) => Some((1.0, Justification::EasyVsDifficult)),
        (false, true) => Some((0.0, Justification::DifficultVsEasy)),
        (false, false) => {
            let offsets = events.trio().offsets.relative(ranking)?;
            Some(offset_method(&offsets, events.description()))
        }
    }
}

/// Computes the threshold from the pseudo-offsets of the trio, when both
/// personalized pivots are difficult.
///
/// The pseudo-offsets of `k` and `i` must be less than 1. Values slightly
/// above 1 are rounding artifacts and give the limit threshold; larger values
/// are a bug.
pub fn offset_method(offsets: &RelativeOffsets, description: &str) -> (f64, Justification) {
    if offsets.k >= 1.0 {
        if offsets.k < 1.0 + OFFSET_CORRECTION_TOLERANCE {
            warn!("Offset method: correcting psi_k = {} to 1 for {description}", offsets.k);
            return (1.0, Justification::OffsetMethodWithCorrection);
        }
        panic!("Offset method: psi_k = {} >= 1 for {description}", offsets.k);
    }
    if offsets.i >= 1.0 {
        if offsets.i < 1.0 + OFFSET_CORRECTION_TOLERANCE {
            warn!("Offset method: correcting psi_i = {} to 1 for {description}", offsets.i);
            return (0.0, Justification::OffsetMethodWithCorrection);
        }
        panic!("Offset method: psi_i = {} >= 1 for {description}", offsets.i);
    }

    let pij = (1.0 + offsets.ik) / (1.0 - offsets.k);
    let pjk = (1.0 + offsets.j) * offsets.i * offsets.i / (1.0 - offsets.i);
    let p1t = offsets.i;
    let p2t = offsets.ij;
    let threshold = (pij / 2.0 + p1t / 3.0 + p2t / 6.0)
        / (pij / 2.0 + pjk / 2.0 + p1t * 2.0 / 3.0 + p2t / 3.0);
    (threshold, Justification::OffsetMethod)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::VotingRule;
    use crate::util::log_tester::ThreadLocalLogger;
    use log::Level::Warn;
    use num::BigRational;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use rand_distr::Exp1;

    fn events(voting_rule: VotingRule, pairs: &[(Ballot, f64)]) -> TieEvents {
        let mut shares = [0.0; 6];
        for &(ballot, share) in pairs {
            shares[ballot.index()] = share;
        }
        TieEvents::new(voting_rule, shares, format!("{pairs:?}"))
    }

    fn ranking(s: &str) -> Ranking {
        s.parse().unwrap()
    }

    #[test]
    fn test_symmetric_approval() {
        for pairs in [
            vec![(Ballot::A, 1.0 / 3.0), (Ballot::B, 1.0 / 3.0), (Ballot::C, 1.0 / 3.0)],
            Ballot::ALL.iter().map(|&b| (b, 1.0 / 6.0)).collect(),
        ] {
            let events = events(VotingRule::Approval, &pairs);
            for r in Ranking::ALL {
                let response = best_response::<f64>(&events, r);
                assert!(
                    (response.threshold_utility - 0.5).abs() < 1e-9,
                    "{response}"
                );
                assert_eq!(response.justification, Justification::SimplifiedAsymptotic);
                assert_eq!(response.ballot, BallotChoice::UtilityDependent);
            }
        }
    }

    #[test]
    fn test_symmetric_approval_asymptotic_method() {
        let events = events(
            VotingRule::Approval,
            &[(Ballot::A, 1.0 / 3.0), (Ballot::B, 1.0 / 3.0), (Ballot::C, 1.0 / 3.0)],
        );
        for r in Ranking::ALL {
            let (threshold, justification) = asymptotic_method(&events, r).unwrap();
            assert!((threshold - 0.5).abs() < 1e-9, "{threshold}");
            assert_eq!(justification, Justification::Asymptotic);
        }
    }

    #[test]
    fn test_approval_limit_pivot_theorem() {
        let events = events(
            VotingRule::Approval,
            &[(Ballot::A, 0.6), (Ballot::B, 0.3), (Ballot::C, 0.1)],
        );
        let check = |r: &str, threshold: f64, justification: Justification| {
            let response = best_response::<f64>(&events, ranking(r));
            assert_eq!(response.threshold_utility, threshold, "{response}");
            assert_eq!(response.justification, justification, "{response}");
        };
        check("abc", 1.0, Justification::EasyVsDifficult);
        check("bac", 1.0, Justification::EasyVsDifficult);
        check("cab", 0.0, Justification::DifficultVsEasy);
        check("cba", 0.0, Justification::DifficultVsEasy);

        let abc = best_response::<f64>(&events, ranking("abc"));
        assert_eq!(abc.ballot, BallotChoice::Ballot(Ballot::A));
        let cab = best_response::<f64>(&events, ranking("cab"));
        assert_eq!(cab.ballot, BallotChoice::Ballot(Ballot::AC));

        for r in ["acb", "bca"] {
            let response = best_response::<f64>(&events, ranking(r));
            assert_eq!(response.justification, Justification::OffsetMethod, "{response}");
            let (threshold, _) = asymptotic_method(&events, ranking(r)).unwrap();
            assert!(
                (response.threshold_utility - threshold).abs() < 1e-6,
                "{response} != {threshold}"
            );
        }
    }

    #[test]
    fn test_random_approval_methods_agree() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let weights: Vec<f64> = (0..6).map(|_| rng.sample(Exp1)).collect();
            let total: f64 = weights.iter().sum();
            let pairs: Vec<(Ballot, f64)> = Ballot::ALL
                .iter()
                .zip(&weights)
                .map(|(&b, w)| (b, w / total))
                .collect();
            let events = events(VotingRule::Approval, &pairs);
            for r in Ranking::ALL {
                let (lpt, justification) = limit_pivot_theorem(&events, r).unwrap();
                if justification == Justification::OffsetMethodWithCorrection {
                    continue;
                }
                let (asymptotic, _) = asymptotic_method(&events, r).unwrap();
                assert!(
                    (lpt - asymptotic).abs() < 1e-6,
                    "{r}: {lpt} ({justification}) != {asymptotic} for {pairs:?}"
                );
            }
        }
    }

    #[test]
    fn test_two_consecutive_zeros_uses_asymptotic_method() {
        let events = events(
            VotingRule::Approval,
            &[(Ballot::A, 0.5), (Ballot::AC, 0.25), (Ballot::C, 0.25)],
        );
        for r in Ranking::ALL {
            let response = best_response::<f64>(&events, r);
            assert_eq!(response.justification, Justification::Asymptotic);
            assert!((0.0..=1.0).contains(&response.threshold_utility));
        }
    }

    #[test]
    fn test_plurality_best_responses() {
        let events = events(
            VotingRule::Plurality,
            &[(Ballot::A, 0.5), (Ballot::B, 0.3), (Ballot::C, 0.2)],
        );
        let ballot = |r: &str| best_response::<f64>(&events, ranking(r)).ballot;
        assert_eq!(ballot("abc"), BallotChoice::Ballot(Ballot::A));
        assert_eq!(ballot("acb"), BallotChoice::Ballot(Ballot::A));
        assert_eq!(ballot("bac"), BallotChoice::Ballot(Ballot::B));
        assert_eq!(ballot("bca"), BallotChoice::Ballot(Ballot::B));
        assert_eq!(ballot("cab"), BallotChoice::Ballot(Ballot::A));
        assert_eq!(ballot("cba"), BallotChoice::Ballot(Ballot::B));
    }

    #[test]
    fn test_plurality_two_candidates() {
        // Nobody votes for c: the voters of c vote for their favorite among
        // a and b.
        let events = events(VotingRule::Plurality, &[(Ballot::A, 0.7), (Ballot::B, 0.3)]);
        let ballot = |r: &str| best_response::<f64>(&events, ranking(r)).ballot;
        assert_eq!(ballot("abc"), BallotChoice::Ballot(Ballot::A));
        assert_eq!(ballot("bac"), BallotChoice::Ballot(Ballot::B));
        assert_eq!(ballot("cab"), BallotChoice::Ballot(Ballot::A));
        assert_eq!(ballot("cba"), BallotChoice::Ballot(Ballot::B));
    }

    #[test]
    fn test_anti_plurality_best_responses() {
        let events = events(
            VotingRule::AntiPlurality,
            &[(Ballot::AB, 0.5), (Ballot::AC, 0.3), (Ballot::BC, 0.2)],
        );
        for r in Ranking::ALL {
            let response = best_response::<f64>(&events, r);
            assert_eq!(response.justification, Justification::Asymptotic);
            assert!((0.0..=1.0).contains(&response.threshold_utility));
        }
    }

    #[test]
    fn test_exact_threshold() {
        let events = events(
            VotingRule::Approval,
            &[(Ballot::A, 1.0 / 3.0), (Ballot::B, 1.0 / 3.0), (Ballot::C, 1.0 / 3.0)],
        );
        let response = best_response::<BigRational>(&events, ranking("abc"));
        assert_eq!(response.threshold_utility, BigRational::ratio(1, 2));
    }

    #[test]
    fn test_offset_method() {
        let offsets = RelativeOffsets {
            i: 0.5,
            j: 0.5,
            k: 0.5,
            ij: 0.5,
            ik: 0.5,
        };
        let (threshold, justification) = offset_method(&offsets, "test");
        assert_eq!(justification, Justification::OffsetMethod);
        // pij = 3, pjk = 0.75, p1t = p2t = 0.5.
        let expected = (1.5 + 0.5 / 3.0 + 0.5 / 6.0) / (1.5 + 0.375 + 1.0 / 3.0 + 0.5 / 3.0);
        assert!((threshold - expected).abs() < 1e-12);
        assert!((threshold - 0.7368421052631579).abs() < 1e-12);
    }

    #[test]
    fn test_offset_method_correction() {
        let logger = ThreadLocalLogger::start();
        let offsets = RelativeOffsets {
            i: 0.5,
            j: 0.5,
            k: 1.05,
            ij: 0.5,
            ik: 0.5,
        };
        assert_eq!(
            offset_method(&offsets, "test"),
            (1.0, Justification::OffsetMethodWithCorrection)
        );
        let offsets = RelativeOffsets {
            i: 1.0,
            j: 0.5,
            k: 0.5,
            ij: 0.5,
            ik: 0.5,
        };
        assert_eq!(
            offset_method(&offsets, "test"),
            (0.0, Justification::OffsetMethodWithCorrection)
        );
        logger.check_warnings(
            "poisson_approval::best_response",
            [
                (Warn, "Offset method: correcting psi_k = 1.05 to 1 for test"),
                (Warn, "Offset method: correcting psi_i = 1 to 1 for test"),
            ],
        );
    }

    #[test]
    #[should_panic(expected = "Offset method: psi_k = 1.5 >= 1 for test")]
    fn test_offset_method_inconsistent() {
        let offsets = RelativeOffsets {
            i: 0.5,
            j: 0.5,
            k: 1.5,
            ij: 0.5,
            ik: 0.5,
        };
        offset_method(&offsets, "test");
    }

    #[test]
    fn test_display() {
        let response = BestResponse {
            ranking: ranking("abc"),
            threshold_utility: 0.5,
            justification: Justification::SimplifiedAsymptotic,
            ballot: BallotChoice::UtilityDependent,
        };
        assert_eq!(
            response.to_string(),
            "abc: utility-dependent (threshold 0.5, Simplified asymptotic method)"
        );
    }
}
