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

//! Module to parse profile files.
//!
//! Each non-empty line that doesn't start with `#` describes a group of
//! voters, either `<ranking> <share> <utility>` (e.g. `abc 1/2 0.3`) or
//! `<weak order> <share>` (e.g. `a>b~c 1/4`). Numbers are integers,
//! fractions or decimals.

use crate::arithmetic::{Rational, RationalRef};
use crate::profile::{ProfileDiscrete, ProfileDiscreteBuilder};
use crate::types::{Ranking, VotingRule, WeakOrder};
use log::{info, trace};
use regex::Regex;
use std::error::Error;
use std::io::BufRead;

/// Parses a profile file.
pub fn parse_profile<R>(
    input: impl BufRead,
    voting_rule: VotingRule,
) -> Result<ProfileDiscrete<R>, Box<dyn Error>>
where
    R: Rational,
    for<'a> &'a R: RationalRef<R>,
{
    let re_ranking = Regex::new(r"^([a-z]{3})\s+(\S+)\s+(\S+)$")?;
    let re_weak_order = Regex::new(r"^([a-z][>~][a-z][>~][a-z])\s+(\S+)$")?;
    let parser = NumberParser::new()?;

    let mut builder: ProfileDiscreteBuilder<R> = ProfileDiscrete::builder(voting_rule);
    let mut n_groups = 0;
    let mut total = R::zero();
    for (i, line) in input.lines().enumerate() {
        let line_number = i + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let error = |message: String| -> Box<dyn Error> {
            format!("Line {line_number}: {message}").into()
        };
        if let Some(cap) = re_ranking.captures(line) {
            let ranking: Ranking = cap[1].parse().map_err(error)?;
            let share = parser.parse::<R>(&cap[2]).map_err(error)?;
            let utility = parser.parse::<R>(&cap[3]).map_err(error)?;
            if utility > R::one() {
                return Err(error(format!("Utility must be at most 1, found {utility}")));
            }
            trace!("Parsed ranking {ranking} with share {share} and utility {utility}");
            total += &share;
            builder = builder.ranking(ranking, utility, share);
        } else if let Some(cap) = re_weak_order.captures(line) {
            let weak_order: WeakOrder = cap[1].parse().map_err(error)?;
            let share = parser.parse::<R>(&cap[2]).map_err(error)?;
            trace!("Parsed weak order {weak_order} with share {share}");
            total += &share;
            builder = builder.weak_order(weak_order, share);
        } else {
            return Err(error(format!("Invalid line: {line:?}")));
        }
        n_groups += 1;
    }

    if n_groups == 0 {
        return Err("The profile is empty".into());
    }
    if total == R::zero() {
        return Err("The profile has no voters, all the shares are 0".into());
    }
    info!("Parsed {n_groups} groups of voters");
    Ok(builder.build())
}

/// Parser for non-negative numbers written as integers, fractions or
/// decimals.
struct NumberParser {
    re_integer: Regex,
    re_fraction: Regex,
    re_decimal: Regex,
}

impl NumberParser {
    fn new() -> Result<Self, regex::Error> {
        Ok(NumberParser {
            re_integer: Regex::new(r"^[0-9]+$")?,
            re_fraction: Regex::new(r"^([0-9]+)/([0-9]+)$")?,
            re_decimal: Regex::new(r"^[0-9]*\.[0-9]+$")?,
        })
    }

    fn parse<R>(&self, x: &str) -> Result<R, String>
    where
        R: Rational,
        for<'a> &'a R: RationalRef<R>,
    {
        let to_usize = |s: &str| {
            s.parse::<usize>()
                .map_err(|e| format!("Invalid integer {s:?}: {e}"))
        };
        if self.re_integer.is_match(x) {
            Ok(R::from_usize(to_usize(x)?))
        } else if let Some(cap) = self.re_fraction.captures(x) {
            let num = to_usize(&cap[1])?;
            let denom = to_usize(&cap[2])?;
            if denom == 0 {
                return Err(format!("Zero denominator in {x:?}"));
            }
            Ok(R::ratio(num, denom))
        } else if self.re_decimal.is_match(x) {
            let value = x
                .parse::<f64>()
                .map_err(|e| format!("Invalid decimal {x:?}: {e}"))?;
            Ok(R::from_f64(value))
        } else {
            Err(format!("Invalid number: {x:?}"))
        }
    }
}
