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

//! Large-deviation asymptotics of a two-dimensional compound Poisson walk.
//!
//! The walk is `D = sum_b X_b * v_b`, where the counts `X_b` are independent
//! Poisson variables of means `n * r_b` and the steps `v_b` have coordinates
//! in `{-1, 0, 1}`. When the origin is in the interior of the convex hull of
//! the steps, probabilities are obtained by exponential tilting at the
//! saddle point of the cumulant `K(y) = sum_b r_b * (exp(y.v_b) - 1)`.
//! Otherwise, the walk is confined to a half-plane and the probabilities are
//! computed by enumerating the finitely many ways of moving away from the
//! boundary.

use crate::asymptotic::Asymptotic;
use crate::types::Ballot;
use log::{trace, warn};

/// Absolute tolerance on the tilted drift below which a ray is tight.
pub const TIGHT_TOLERANCE: f64 = 1e-9;

const NEWTON_TOLERANCE: f64 = 1e-14;
const MAX_NEWTON_ITERATIONS: usize = 200;

/// Half-plane normals that can support the steps of a walk.
const NORMAL_CANDIDATES: [[i64; 2]; 6] = [[0, 1], [0, -1], [1, 0], [-1, 0], [1, -1], [-1, 1]];

/// One kind of step of the walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Ballot that causes this step.
    pub ballot: Ballot,
    /// Positive rate of the step, per unit of `n`.
    pub rate: f64,
    /// Displacement caused by one ballot.
    pub vector: [i64; 2],
}

/// Saddle point of the cumulant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Saddle {
    /// Tilt minimizing the cumulant.
    pub y: [f64; 2],
    /// Minimum of the cumulant, i.e. the magnitude of point events.
    pub mu: f64,
    /// Determinant of the Hessian of the cumulant at the saddle point.
    pub det: f64,
}

#[derive(Clone, Debug, PartialEq)]
enum Geometry {
    Interior(Saddle),
    HalfPlane(Vec<[i64; 2]>),
}

/// Difficulty of a ray, relative to the line that contains it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    /// Conditionally on the line, the walk drifts along the ray.
    Easy,
    /// Conditionally on the line, the walk has no drift.
    Tight,
    /// Conditionally on the line, the walk drifts away from the ray.
    Difficult,
}

/// Conditioning of the walk on a line `g.D = constant`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slice {
    g: [i64; 2],
    alpha: f64,
    beta: f64,
    /// Tilt along `g` that makes the line typical.
    pub y: f64,
    /// Drift along the line under the tilted measure.
    pub tilted_mean: f64,
}

impl Slice {
    /// Tilting weight of a step, i.e. `exp(y * g.v)`. Steps that cross the
    /// line in only one direction have a vanishing weight.
    pub fn weight(&self, vector: [i64; 2]) -> f64 {
        match dot(self.g, vector) {
            0 => 1.0,
            gv if self.alpha > 0.0 && self.beta > 0.0 => (self.y * gv as f64).exp(),
            _ => 0.0,
        }
    }

    /// Probability that the walk is on the line through the given point.
    pub fn line(&self, base: [i64; 2]) -> Asymptotic {
        line_point(self.alpha, self.beta, dot(self.g, base))
    }

    /// Classifies the direction of the line with respect to the tilted drift.
    pub fn difficulty(&self) -> Difficulty {
        if self.tilted_mean.abs() <= TIGHT_TOLERANCE {
            Difficulty::Tight
        } else if self.tilted_mean > 0.0 {
            Difficulty::Easy
        } else {
            Difficulty::Difficult
        }
    }
}

/// Compound Poisson walk on `Z^2`, with its geometry computed once.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeWalk {
    steps: Vec<Step>,
    geometry: Geometry,
}

impl LatticeWalk {
    /// Creates a walk from steps of positive rates.
    pub fn new(steps: Vec<Step>) -> Self {
        assert!(
            steps.iter().all(|s| s.rate > 0.0 && s.vector != [0, 0]),
            "Steps must have a positive rate and a non-zero vector: {steps:?}"
        );
        let normals: Vec<[i64; 2]> = NORMAL_CANDIDATES
            .into_iter()
            .filter(|&f| steps.iter().all(|s| dot(f, s.vector) >= 0))
            .collect();
        let geometry = if normals.is_empty() {
            Geometry::Interior(find_saddle(&steps))
        } else {
            Geometry::HalfPlane(normals)
        };
        trace!("Geometry of the walk: {geometry:?}");
        LatticeWalk { steps, geometry }
    }

    /// Steps of the walk.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Saddle point of the cumulant, if the origin is in the interior of the
    /// convex hull of the steps.
    pub fn saddle(&self) -> Option<&Saddle> {
        match &self.geometry {
            Geometry::Interior(saddle) => Some(saddle),
            Geometry::HalfPlane(_) => None,
        }
    }

    /// Probability that the walk ends at the given point.
    pub fn point(&self, d: [i64; 2]) -> Asymptotic {
        match &self.geometry {
            Geometry::Interior(saddle) => interior_point(saddle, d),
            Geometry::HalfPlane(normals) => self.bounded(normals[0], d, None),
        }
    }

    /// Probability that the walk ends on the ray `base + t * w` for some
    /// integer `t >= 0`.
    pub fn ray(&self, base: [i64; 2], w: [i64; 2]) -> Asymptotic {
        if let Geometry::HalfPlane(normals) = &self.geometry {
            if let Some(&f) = normals.iter().find(|&&f| dot(f, w) <= 0) {
                return self.bounded(f, base, Some(w));
            }
        }

        let slice = self.slice(w);
        match slice.difficulty() {
            Difficulty::Easy => slice.line(base),
            Difficulty::Tight => slice.line(base) * 0.5,
            Difficulty::Difficult => match &self.geometry {
                Geometry::Interior(saddle) => {
                    let z = saddle.y[0] * w[0] as f64 + saddle.y[1] * w[1] as f64;
                    if z <= 0.0 {
                        warn!("Difficult ray {base:?} + t * {w:?} with a non-decaying offset (z = {z})");
                        Asymptotic::undefined()
                    } else {
                        interior_point(saddle, base) / -(-z).exp_m1()
                    }
                }
                Geometry::HalfPlane(_) => {
                    warn!("Difficult ray {base:?} + t * {w:?} on a degenerate walk");
                    Asymptotic::undefined()
                }
            },
        }
    }

    /// Conditions the walk on lines parallel to the given direction.
    pub fn slice(&self, w: [i64; 2]) -> Slice {
        let (g, h) = ray_basis(w);
        let mut alpha = 0.0;
        let mut beta = 0.0;
        for step in &self.steps {
            match dot(g, step.vector) {
                1 => alpha += step.rate,
                -1 => beta += step.rate,
                0 => (),
                gv => panic!("Step {:?} crosses {gv} lines of direction {w:?}", step.vector),
            }
        }
        let y = if alpha > 0.0 && beta > 0.0 {
            0.5 * (beta / alpha).ln()
        } else {
            0.0
        };
        let slice = Slice {
            g,
            alpha,
            beta,
            y,
            tilted_mean: 0.0,
        };
        let tilted_mean = self
            .steps
            .iter()
            .map(|s| s.rate * slice.weight(s.vector) * dot(h, s.vector) as f64)
            .sum();
        Slice {
            tilted_mean,
            ..slice
        }
    }

    /// Exact enumeration on a walk confined to the half-plane `f.D >= 0`.
    fn bounded(&self, f: [i64; 2], base: [i64; 2], direction: Option<[i64; 2]>) -> Asymptotic {
        let bound = dot(f, base);
        if bound < 0 {
            return Asymptotic::zero();
        }

        let u = line_direction(f);
        let pushing: Vec<&Step> = self
            .steps
            .iter()
            .filter(|s| dot(f, s.vector) > 0)
            .collect();
        let alpha: f64 = self
            .steps
            .iter()
            .filter(|s| s.vector == u)
            .map(|s| s.rate)
            .sum();
        let beta: f64 = self
            .steps
            .iter()
            .filter(|s| s.vector == [-u[0], -u[1]])
            .map(|s| s.rate)
            .sum();
        let escape: f64 = pushing.iter().map(|s| s.rate).sum();

        let weights: Vec<i64> = pushing.iter().map(|s| dot(f, s.vector)).collect();
        let mut total = Asymptotic::zero();
        for counts in count_vectors(&weights, bound) {
            let rest = bound - dot_counts(&counts, &weights);
            let displacement = pushing
                .iter()
                .zip(&counts)
                .fold([0, 0], |acc, (s, &x)| {
                    [acc[0] + x * s.vector[0], acc[1] + x * s.vector[1]]
                });
            let residual = |target: [i64; 2]| {
                coordinate(u, [target[0] - displacement[0], target[1] - displacement[1]])
            };

            let walk = match direction {
                None => {
                    if rest != 0 {
                        continue;
                    }
                    line_point(alpha, beta, residual(base))
                }
                Some(w) => {
                    let fw = dot(f, w);
                    if fw == 0 {
                        if rest != 0 {
                            continue;
                        }
                        let k = residual(base);
                        if w == u {
                            line_half(alpha, beta, k)
                        } else {
                            line_half(beta, alpha, -k)
                        }
                    } else {
                        if rest % -fw != 0 {
                            continue;
                        }
                        let m = rest / -fw;
                        let target = [base[0] + m * w[0], base[1] + m * w[1]];
                        line_point(alpha, beta, residual(target))
                    }
                }
            };

            let mut xi = 0.0;
            for (s, &x) in pushing.iter().zip(&counts) {
                xi += x as f64 * s.rate.ln() - ln_factorial(x);
            }
            let nu = counts.iter().sum::<i64>() as f64;
            total = total + Asymptotic::new(-escape, nu, xi) * walk;
        }
        total
    }
}

/// Probability of a point, by tilting at the saddle point.
fn interior_point(saddle: &Saddle, d: [i64; 2]) -> Asymptotic {
    let tilt = saddle.y[0] * d[0] as f64 + saddle.y[1] * d[1] as f64;
    Asymptotic::new(
        saddle.mu,
        -1.0,
        -(2.0 * std::f64::consts::PI * saddle.det.sqrt()).ln() - tilt,
    )
}

/// Minimizes the cumulant with a damped Newton method. The cumulant is
/// strictly convex and coercive when the origin is in the interior of the
/// convex hull of the steps.
fn find_saddle(steps: &[Step]) -> Saddle {
    let mut y = [0.0, 0.0];
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let (value, grad, hess) = cumulant(steps, y);
        if grad[0].hypot(grad[1]) < NEWTON_TOLERANCE {
            break;
        }
        let det = hess[0][0] * hess[1][1] - hess[0][1] * hess[1][0];
        let delta = [
            -(hess[1][1] * grad[0] - hess[0][1] * grad[1]) / det,
            -(hess[0][0] * grad[1] - hess[1][0] * grad[0]) / det,
        ];
        let slope = grad[0] * delta[0] + grad[1] * delta[1];

        let mut t = 1.0;
        loop {
            let candidate = [y[0] + t * delta[0], y[1] + t * delta[1]];
            let (candidate_value, _, _) = cumulant(steps, candidate);
            if candidate_value <= value + 1e-4 * t * slope || t < 1e-12 {
                y = candidate;
                break;
            }
            t *= 0.5;
        }
    }

    let (mu, grad, hess) = cumulant(steps, y);
    trace!("Saddle point {y:?}, K = {mu}, gradient = {grad:?}");
    Saddle {
        y,
        mu,
        det: hess[0][0] * hess[1][1] - hess[0][1] * hess[1][0],
    }
}

/// Value, gradient and Hessian of the cumulant.
fn cumulant(steps: &[Step], y: [f64; 2]) -> (f64, [f64; 2], [[f64; 2]; 2]) {
    let mut value = 0.0;
    let mut grad = [0.0; 2];
    let mut hess = [[0.0; 2]; 2];
    for step in steps {
        let v = [step.vector[0] as f64, step.vector[1] as f64];
        let e = step.rate * (y[0] * v[0] + y[1] * v[1]).exp();
        value += e - step.rate;
        for a in 0..2 {
            grad[a] += e * v[a];
            for b in 0..2 {
                hess[a][b] += e * v[a] * v[b];
            }
        }
    }
    (value, grad, hess)
}

/// Returns `(g, h)` such that `g.w = 0` and `h.w = 1`: `g` indexes the lines
/// parallel to `w` and `h` the position along them.
fn ray_basis(w: [i64; 2]) -> ([i64; 2], [i64; 2]) {
    match w {
        [0, 1] => ([1, 0], [0, 1]),
        [1, 0] => ([0, 1], [1, 0]),
        [-1, -1] => ([1, -1], [-1, 0]),
        [0, -1] => ([1, 0], [0, -1]),
        [-1, 0] => ([0, 1], [-1, 0]),
        [1, 1] => ([1, -1], [1, 0]),
        _ => panic!("Unsupported ray direction: {w:?}"),
    }
}

/// Primitive direction of the boundary line `f.D = 0`.
fn line_direction(f: [i64; 2]) -> [i64; 2] {
    match f {
        [0, _] => [1, 0],
        [_, 0] => [0, 1],
        _ => [1, 1],
    }
}

/// Coordinate of a point of the line spanned by `u`.
fn coordinate(u: [i64; 2], z: [i64; 2]) -> i64 {
    match u {
        [1, 0] => z[0],
        [0, 1] => z[1],
        _ => {
            debug_assert_eq!(z[0], z[1]);
            z[0]
        }
    }
}

/// Probability that `X+ - X- = k`, where `X+` and `X-` are Poisson variables
/// of means `n * alpha` and `n * beta`.
fn line_point(alpha: f64, beta: f64, k: i64) -> Asymptotic {
    match (alpha > 0.0, beta > 0.0) {
        (true, true) => {
            let mu = -(alpha.sqrt() - beta.sqrt()).powi(2);
            let xi = -0.5 * (4.0 * std::f64::consts::PI * (alpha * beta).sqrt()).ln()
                - k as f64 * 0.5 * (beta / alpha).ln();
            Asymptotic::new(mu, -0.5, xi)
        }
        (true, false) => poisson_point(alpha, k),
        (false, true) => poisson_point(beta, -k),
        (false, false) => {
            if k == 0 {
                Asymptotic::one()
            } else {
                Asymptotic::zero()
            }
        }
    }
}

/// Probability that a Poisson variable of mean `n * rate` equals `k`.
fn poisson_point(rate: f64, k: i64) -> Asymptotic {
    if k < 0 {
        Asymptotic::zero()
    } else {
        Asymptotic::new(-rate, k as f64, k as f64 * rate.ln() - ln_factorial(k))
    }
}

/// Probability that `X+ - X- >= k`.
fn line_half(alpha: f64, beta: f64, k: i64) -> Asymptotic {
    if beta == 0.0 {
        if alpha > 0.0 || k <= 0 {
            Asymptotic::one()
        } else {
            Asymptotic::zero()
        }
    } else if alpha == 0.0 {
        if k > 0 {
            Asymptotic::zero()
        } else {
            line_point(alpha, beta, k)
        }
    } else if (alpha - beta).abs() <= 1e-12 * alpha.max(beta) {
        Asymptotic::constant(0.5)
    } else if alpha > beta {
        Asymptotic::one()
    } else {
        line_point(alpha, beta, k) / (1.0 - (alpha / beta).sqrt())
    }
}

/// All the non-negative integer vectors `x` such that `x.weights <= budget`.
fn count_vectors(weights: &[i64], budget: i64) -> Vec<Vec<i64>> {
    match weights.split_first() {
        None => vec![vec![]],
        Some((&first, rest)) => {
            let mut result = Vec::new();
            let mut x = 0;
            while x * first <= budget {
                for mut tail in count_vectors(rest, budget - x * first) {
                    tail.insert(0, x);
                    result.push(tail);
                }
                x += 1;
            }
            result
        }
    }
}

fn dot_counts(counts: &[i64], weights: &[i64]) -> i64 {
    counts.iter().zip(weights).map(|(x, w)| x * w).sum()
}

fn ln_factorial(k: i64) -> f64 {
    (2..=k).map(|i| (i as f64).ln()).sum()
}

/// Dot product of two integer vectors.
pub fn dot(a: [i64; 2], b: [i64; 2]) -> i64 {
    a[0] * b[0] + a[1] * b[1]
}
