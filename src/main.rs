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

//! Command-line program searching for equilibria of Poisson voting games.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

use clap::Parser;
use num::BigRational;
use poisson_approval::{
    arithmetic::{Rational, RationalRef},
    dynamics::{fictitious_play, iterated_voting, DynamicsOptions, Init},
    parse::parse_profile,
    profile::Profile,
    types::VotingRule,
};
use std::error::Error;
use std::io::{self, Write};

/// Searches for an equilibrium of a three-candidate Poisson voting game. The
/// profile is read from the standard input.
#[derive(Parser, Debug, PartialEq, Eq)]
struct Cli {
    /// Voting rule: approval, plurality or anti-plurality.
    #[arg(long)]
    voting_rule: VotingRule,

    /// Best-response dynamics to run.
    #[arg(long, value_enum, default_value_t = Dynamics::FictitiousPlay)]
    dynamics: Dynamics,

    /// Initial tau-vector.
    #[arg(long, value_enum, default_value_t = InitKind::Sincere)]
    init: InitKind,

    /// Seed of the random initialization.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Maximal number of episodes.
    #[arg(long, default_value_t = 100)]
    n_max_episodes: usize,

    /// Arithmetic to use.
    #[arg(long, value_enum)]
    arithmetic: Arithmetic,
}

/// Best-response dynamics.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Dynamics {
    /// Fictitious play, converging to a limit point.
    FictitiousPlay,
    /// Iterated voting, detecting periodic orbits.
    IteratedVoting,
}

/// Initial tau-vector.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InitKind {
    /// Sincere voting.
    Sincere,
    /// Every voter casts the ballot with the lowest utility for their middle
    /// candidate.
    Fanatic,
    /// Random split between the undominated ballots.
    Random,
}

/// Arithmetic for rational numbers.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Arithmetic {
    /// Exact rational arithmetic.
    Exact,
    /// 64-bit floating-point arithmetic.
    Float64,
}

impl Cli {
    /// Runs the dynamics on the given profile file.
    fn run(&self, input: impl io::BufRead, output: &mut impl Write) -> Result<(), Box<dyn Error>> {
        match self.arithmetic {
            Arithmetic::Exact => self.run_with::<BigRational>(input, output),
            Arithmetic::Float64 => self.run_with::<f64>(input, output),
        }
    }

    fn run_with<R>(
        &self,
        input: impl io::BufRead,
        output: &mut impl Write,
    ) -> Result<(), Box<dyn Error>>
    where
        R: Rational,
        for<'a> &'a R: RationalRef<R>,
    {
        let profile = parse_profile::<R>(input, self.voting_rule)?;
        writeln!(output, "Profile: {profile}")?;
        writeln!(output, "Arithmetic: {}", R::description())?;

        let init = match self.init {
            InitKind::Sincere => Init::Sincere,
            InitKind::Fanatic => Init::Fanatic,
            InitKind::Random => Init::RandomUndominated { seed: self.seed },
        };
        match self.dynamics {
            Dynamics::FictitiousPlay => {
                let options =
                    DynamicsOptions::fictitious_play().with_n_max_episodes(self.n_max_episodes);
                let result = fictitious_play(&profile, &init, &options);
                write!(output, "{result}")?;
                writeln!(
                    output,
                    "Equilibrium status: {}",
                    profile.is_equilibrium(&result.strategy)
                )?;
            }
            Dynamics::IteratedVoting => {
                let options =
                    DynamicsOptions::iterated_voting().with_n_max_episodes(self.n_max_episodes);
                let result = iterated_voting(&profile, &init, &options);
                write!(output, "{result}")?;
                for (n, strategy) in result.cycle_strategies.iter().enumerate() {
                    writeln!(
                        output,
                        "[{n}] Equilibrium status: {}",
                        profile.is_equilibrium(strategy)
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();

    cli.run(io::stdin().lock(), &mut io::stdout().lock())
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::error::ErrorKind;
    use std::io::Cursor;

    #[test]
    fn test_parse_incomplete() {
        let error = Cli::try_parse_from(["poisson-approval"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_help() {
        let error = Cli::try_parse_from(["poisson-approval", "--help"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from([
            "poisson-approval",
            "--voting-rule=approval",
            "--arithmetic=float64",
        ])
        .unwrap();
        assert_eq!(
            cli,
            Cli {
                voting_rule: VotingRule::Approval,
                dynamics: Dynamics::FictitiousPlay,
                init: InitKind::Sincere,
                seed: 0,
                n_max_episodes: 100,
                arithmetic: Arithmetic::Float64,
            }
        );
    }

    #[test]
    fn test_parse_typo() {
        let error = Cli::try_parse_from([
            "poisson-approval",
            "--voting-rule=Approval",
            "--arithmetic=float64",
        ])
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValueValidation);

        let error = Cli::try_parse_from([
            "poisson-approval",
            "--voting-rule=approval",
            "--arithmetic=Float64",
        ])
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_parse_full() {
        #[rustfmt::skip]
        let cli = Cli::try_parse_from([
            "poisson-approval",
            "--voting-rule", "anti-plurality",
            "--dynamics", "iterated-voting",
            "--init", "random",
            "--seed", "42",
            "--n-max-episodes", "7",
            "--arithmetic", "exact",
        ])
        .unwrap();
        assert_eq!(
            cli,
            Cli {
                voting_rule: VotingRule::AntiPlurality,
                dynamics: Dynamics::IteratedVoting,
                init: InitKind::Random,
                seed: 42,
                n_max_episodes: 7,
                arithmetic: Arithmetic::Exact,
            }
        );
    }

    #[test]
    fn test_run() {
        let cli = Cli::try_parse_from([
            "poisson-approval",
            "--voting-rule=plurality",
            "--dynamics=iterated-voting",
            "--arithmetic=float64",
        ])
        .unwrap();
        let input = "abc 0.5 0.5\nbac 0.3 0.5\ncab 0.2 0.5\n";
        let mut output = Vec::new();
        cli.run(Cursor::new(input), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with(
            "Profile: {abc 0.5: 0.5, bac 0.5: 0.3, cab 0.5: 0.2} (Plurality)
Arithmetic: 64-bit floating-point arithmetic
Converged after 3 episodes
[0] Tau-vector: <a: 0.7, b: 0.3> (Plurality)
"
        ));
        assert!(output.ends_with(
            "Winning frequencies: a: 1, b: 0, c: 0
[0] Equilibrium status: Equilibrium
"
        ));
    }

    #[test]
    fn test_run_invalid_profile() {
        let cli = Cli::try_parse_from([
            "poisson-approval",
            "--voting-rule=plurality",
            "--arithmetic=exact",
        ])
        .unwrap();
        let error = cli
            .run(Cursor::new("abc 1/2\n"), &mut Vec::<u8>::new())
            .unwrap_err();
        assert_eq!(error.to_string(), "Line 1: Invalid line: \"abc 1/2\"");
    }
}
