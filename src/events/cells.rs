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

//! Tables of pivot cells for each voting rule.
//!
//! Coordinates are relative to a voter of ranking `i > j > k`: a point
//! `(x, y)` means that, among the other voters, `S_i - S_j = x` and
//! `S_i - S_k = y`. A cell lists the score configurations where switching
//! from the low-utility ballot to the high-utility ballot changes the
//! probability that `i` (resp. `j`) wins, ties being broken uniformly at
//! random.

/// Family of tie events that a pivot cell belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TieKind {
    /// Personalized pivot between `i` and `j`, with `k` behind.
    PivotIJ,
    /// Personalized pivot between `j` and `k`, with `i` behind.
    PivotJK,
    /// Personalized pivot between `i` and `k`, with `j` behind.
    PivotIK,
    /// Personalized trio where the high-utility ballot resolves a three-way
    /// tie in favor of `j`.
    Trio1t,
    /// Personalized trio where the high-utility ballot creates a three-way
    /// tie.
    Trio2t,
    /// Any other configuration where the three candidates are within one
    /// point of each other.
    Trio,
}

/// Set of lattice points where the voter's ballot matters: either a single
/// point or a ray `base + t * direction` for `t >= 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PivotCell {
    /// Tie event that this cell belongs to.
    pub kind: TieKind,
    /// First point of the cell.
    pub base: [i64; 2],
    /// Direction of the ray, or [`None`] for a single point.
    pub direction: Option<[i64; 2]>,
    /// Change of the winning probability of `i`.
    pub gain_top: f64,
    /// Change of the winning probability of `j`.
    pub gain_middle: f64,
}

impl PivotCell {
    const fn point(kind: TieKind, base: [i64; 2], gain_top: f64, gain_middle: f64) -> Self {
        PivotCell {
            kind,
            base,
            direction: None,
            gain_top,
            gain_middle,
        }
    }

    const fn ray(
        kind: TieKind,
        base: [i64; 2],
        direction: [i64; 2],
        gain_top: f64,
        gain_middle: f64,
    ) -> Self {
        PivotCell {
            kind,
            base,
            direction: Some(direction),
            gain_top,
            gain_middle,
        }
    }
}

const HALF: f64 = 0.5;
const THIRD: f64 = 1.0 / 3.0;
const SIXTH: f64 = 1.0 / 6.0;

const UP: [i64; 2] = [0, 1];
const RIGHT: [i64; 2] = [1, 0];
const DOWN_LEFT: [i64; 2] = [-1, -1];

/// Approval: the voter adds a point to `j`.
pub static APPROVAL_CELLS: [PivotCell; 6] = [
    PivotCell::ray(TieKind::PivotIJ, [0, 0], UP, -HALF, HALF),
    PivotCell::ray(TieKind::PivotIJ, [-1, 0], UP, -HALF, HALF),
    PivotCell::ray(TieKind::PivotJK, [-2, -2], DOWN_LEFT, 0.0, HALF),
    PivotCell::ray(TieKind::PivotJK, [-1, -2], DOWN_LEFT, 0.0, HALF),
    PivotCell::point(TieKind::Trio1t, [-1, -1], -THIRD, 2.0 * THIRD),
    PivotCell::point(TieKind::Trio2t, [0, -1], -SIXTH, THIRD),
];

/// Plurality: the voter moves a point from `i` to `j`.
pub static PLURALITY_CELLS: [PivotCell; 12] = [
    PivotCell::ray(TieKind::PivotIJ, [0, 0], UP, -1.0, 1.0),
    PivotCell::point(TieKind::Trio, [0, -1], -HALF, HALF),
    PivotCell::ray(TieKind::PivotIJ, [-1, 0], UP, -HALF, HALF),
    PivotCell::point(TieKind::Trio, [-1, -1], -THIRD, 2.0 * THIRD),
    PivotCell::point(TieKind::Trio, [-1, -2], 0.0, HALF),
    PivotCell::ray(TieKind::PivotIJ, [1, 1], UP, -HALF, HALF),
    PivotCell::point(TieKind::Trio, [1, 0], -2.0 * THIRD, THIRD),
    PivotCell::point(TieKind::Trio, [1, -1], -HALF, 0.0),
    PivotCell::ray(TieKind::PivotIK, [2, 0], RIGHT, -HALF, 0.0),
    PivotCell::ray(TieKind::PivotIK, [2, -1], RIGHT, -HALF, 0.0),
    PivotCell::ray(TieKind::PivotJK, [-2, -2], DOWN_LEFT, 0.0, HALF),
    PivotCell::ray(TieKind::PivotJK, [-2, -3], DOWN_LEFT, 0.0, HALF),
];

/// Anti-Plurality: the voter moves a point from `k` to `j`.
pub static ANTI_PLURALITY_CELLS: [PivotCell; 12] = [
    PivotCell::ray(TieKind::PivotJK, [-1, -1], DOWN_LEFT, 0.0, 1.0),
    PivotCell::point(TieKind::Trio, [0, 0], 0.0, HALF),
    PivotCell::ray(TieKind::PivotJK, [-2, -1], DOWN_LEFT, 0.0, HALF),
    PivotCell::point(TieKind::Trio, [-1, 0], -THIRD, 2.0 * THIRD),
    PivotCell::point(TieKind::Trio, [0, 1], -HALF, HALF),
    PivotCell::ray(TieKind::PivotJK, [-1, -2], DOWN_LEFT, 0.0, HALF),
    PivotCell::point(TieKind::Trio, [0, -1], THIRD, THIRD),
    PivotCell::point(TieKind::Trio, [1, 0], HALF, 0.0),
    PivotCell::ray(TieKind::PivotIK, [1, -1], RIGHT, HALF, 0.0),
    PivotCell::ray(TieKind::PivotIK, [2, 0], RIGHT, HALF, 0.0),
    PivotCell::ray(TieKind::PivotIJ, [-1, 1], UP, -HALF, HALF),
    PivotCell::ray(TieKind::PivotIJ, [0, 2], UP, -HALF, HALF),
];
