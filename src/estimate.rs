//! Critical probability estimation.
//!
//! The percolation probability P(p) of a finite lattice rises from 0 to 1 over a
//! window around p_c. Fitting a logistic curve
//!
//! ```text
//! P(p) = 1 / (1 + exp(-(p - p_c) / w))
//! ```
//!
//! gives p_c as the inflection point (P = 0.5) and `w` as the transition width.
//!
//! The fit is a bounded Levenberg-Marquardt least-squares solve on `(p_c, w)`.
//! Parameter uncertainties come from the usual covariance estimate
//! `(JᵀJ)⁻¹ · SSR / (m - 2)`.

use std::fmt;

use crate::error::{Error, Result};

/// Known site-percolation threshold of the infinite square lattice.
pub const THEORETICAL_PC_2D_SQUARE: f64 = 0.59274621;

/// Below this R² a fit is reported as poor.
const POOR_FIT_R_SQUARED: f64 = 0.95;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MAX: f64 = 1e16;
const REL_TOLERANCE: f64 = 1e-12;

/// Logistic percolation curve.
#[inline]
pub fn sigmoid(p: f64, pc: f64, width: f64) -> f64 {
    1.0 / (1.0 + (-(p - pc) / width).exp())
}

/// Starting point, box constraints, and evaluation budget for [`estimate_pc`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitParams {
    /// Initial `(pc, width)`.
    pub initial_guess: (f64, f64),
    /// Inclusive `(min, max)` for pc.
    pub pc_bounds: (f64, f64),
    /// Inclusive `(min, max)` for width. The minimum must be positive.
    pub width_bounds: (f64, f64),
    /// Maximum number of objective evaluations.
    pub max_evaluations: usize,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            initial_guess: (0.59, 0.05),
            pc_bounds: (0.4, 0.8),
            width_bounds: (0.001, 0.2),
            max_evaluations: 10_000,
        }
    }
}

impl FitParams {
    pub fn with_initial_guess(mut self, pc: f64, width: f64) -> Self {
        self.initial_guess = (pc, width);
        self
    }

    pub fn with_pc_bounds(mut self, min: f64, max: f64) -> Self {
        self.pc_bounds = (min, max);
        self
    }

    pub fn with_width_bounds(mut self, min: f64, max: f64) -> Self {
        self.width_bounds = (min, max);
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let (pc_lo, pc_hi) = self.pc_bounds;
        if !(pc_lo.is_finite() && pc_hi.is_finite() && pc_lo < pc_hi) {
            return Err(Error::InvalidParameter {
                name: "pc_bounds",
                message: "must be finite with min < max",
            });
        }
        let (w_lo, w_hi) = self.width_bounds;
        if !(w_lo.is_finite() && w_hi.is_finite() && w_lo > 0.0 && w_lo < w_hi) {
            return Err(Error::InvalidParameter {
                name: "width_bounds",
                message: "must be finite with 0 < min < max",
            });
        }
        let (pc0, w0) = self.initial_guess;
        if !(pc0.is_finite() && w0.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "initial_guess",
                message: "must be finite",
            });
        }
        if self.max_evaluations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_evaluations",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    fn clamp(&self, theta: [f64; 2]) -> [f64; 2] {
        [
            theta[0].clamp(self.pc_bounds.0, self.pc_bounds.1),
            theta[1].clamp(self.width_bounds.0, self.width_bounds.1),
        ]
    }
}

/// Result of a sigmoid fit.
#[derive(Clone, Debug, PartialEq)]
pub struct PcEstimate {
    /// Fitted critical probability.
    pub pc: f64,
    /// Standard error of `pc`.
    pub pc_stderr: f64,
    /// Fitted transition width.
    pub width: f64,
    /// Standard error of `width`.
    pub width_stderr: f64,
    /// Coefficient of determination. 0 when the data has no variance.
    pub r_squared: f64,
    /// `observed - fitted`, per point.
    pub residuals: Vec<f64>,
    /// Fitted curve evaluated at each input p.
    pub fitted: Vec<f64>,
}

/// Fit a sigmoid to `(p_values, probs)` and return the estimated p_c.
pub fn estimate_pc(p_values: &[f64], probs: &[f64], params: &FitParams) -> Result<PcEstimate> {
    if p_values.len() != probs.len() {
        return Err(Error::DimensionMismatch {
            expected: p_values.len(),
            found: probs.len(),
        });
    }
    if p_values.len() < 3 {
        return Err(Error::InvalidParameter {
            name: "p_values",
            message: "need at least 3 points",
        });
    }
    if p_values.iter().chain(probs).any(|v| !v.is_finite()) {
        return Err(Error::InvalidParameter {
            name: "p_values",
            message: "data must be finite",
        });
    }
    params.validate()?;

    let theta = levenberg_marquardt(p_values, probs, params)?;
    let [pc, width] = theta;

    let fitted: Vec<f64> = p_values.iter().map(|&p| sigmoid(p, pc, width)).collect();
    let residuals: Vec<f64> = probs.iter().zip(&fitted).map(|(y, f)| y - f).collect();
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();

    let mean = probs.iter().sum::<f64>() / probs.len() as f64;
    let ss_tot: f64 = probs.iter().map(|y| (y - mean).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let (pc_var, width_var) = covariance_diagonal(p_values, theta, ss_res)?;

    Ok(PcEstimate {
        pc,
        pc_stderr: pc_var.sqrt(),
        width,
        width_stderr: width_var.sqrt(),
        r_squared,
        residuals,
        fitted,
    })
}

fn sum_sq_residuals(p_values: &[f64], probs: &[f64], theta: [f64; 2]) -> f64 {
    p_values
        .iter()
        .zip(probs)
        .map(|(&p, &y)| (y - sigmoid(p, theta[0], theta[1])).powi(2))
        .sum()
}

/// `(JᵀJ, Jᵀr)` where `J` is the Jacobian of the model and `r = y - f`.
/// `JᵀJ` is returned as `[a, b, d]` for the symmetric matrix `[[a, b], [b, d]]`.
fn normal_equations(
    p_values: &[f64],
    probs: Option<&[f64]>,
    theta: [f64; 2],
) -> ([f64; 3], [f64; 2]) {
    let [pc, width] = theta;
    let mut jtj = [0.0; 3];
    let mut jtr = [0.0; 2];

    for (i, &p) in p_values.iter().enumerate() {
        let f = sigmoid(p, pc, width);
        let z = (p - pc) / width;
        let slope = f * (1.0 - f);
        let d_pc = -slope / width;
        let d_w = -slope * z / width;

        jtj[0] += d_pc * d_pc;
        jtj[1] += d_pc * d_w;
        jtj[2] += d_w * d_w;

        if let Some(y) = probs {
            let r = y[i] - f;
            jtr[0] += d_pc * r;
            jtr[1] += d_w * r;
        }
    }

    (jtj, jtr)
}

fn levenberg_marquardt(p_values: &[f64], probs: &[f64], params: &FitParams) -> Result<[f64; 2]> {
    let mut theta = params.clamp([params.initial_guess.0, params.initial_guess.1]);
    let mut ssr = sum_sq_residuals(p_values, probs, theta);
    let mut evaluations = 1;
    let mut lambda = LAMBDA_INIT;

    if !ssr.is_finite() {
        return Err(Error::FitFailed("non-finite residual at initial guess".into()));
    }

    loop {
        if evaluations >= params.max_evaluations {
            return Err(Error::FitFailed(format!(
                "no convergence within {} evaluations",
                params.max_evaluations
            )));
        }

        let ([a, b, d], g) = normal_equations(p_values, Some(probs), theta);
        if g[0].abs().max(g[1].abs()) < f64::MIN_POSITIVE.sqrt() {
            return Ok(theta);
        }

        let mut accepted = None;
        while lambda <= LAMBDA_MAX && evaluations < params.max_evaluations {
            // Marquardt damping scales the diagonal; the floor keeps a flat
            // direction from making the system singular.
            let a_damped = a + lambda * a.max(1e-12);
            let d_damped = d + lambda * d.max(1e-12);
            let det = a_damped * d_damped - b * b;
            if !det.is_finite() || det <= 0.0 {
                lambda *= 10.0;
                continue;
            }

            let step = [
                (d_damped * g[0] - b * g[1]) / det,
                (a_damped * g[1] - b * g[0]) / det,
            ];
            let candidate = params.clamp([theta[0] + step[0], theta[1] + step[1]]);
            let candidate_ssr = sum_sq_residuals(p_values, probs, candidate);
            evaluations += 1;

            if candidate_ssr.is_finite() && candidate_ssr < ssr {
                lambda = (lambda / 10.0).max(1e-12);
                accepted = Some((candidate, candidate_ssr));
                break;
            }
            lambda *= 10.0;
        }

        let Some((candidate, candidate_ssr)) = accepted else {
            if lambda > LAMBDA_MAX {
                // No damped step lowers the objective: a local minimum.
                return Ok(theta);
            }
            continue;
        };

        let improvement = (ssr - candidate_ssr) / ssr.max(f64::MIN_POSITIVE);
        let moved = (candidate[0] - theta[0])
            .abs()
            .max((candidate[1] - theta[1]).abs() / theta[1]);
        theta = candidate;
        ssr = candidate_ssr;

        if improvement < REL_TOLERANCE || moved < REL_TOLERANCE {
            return Ok(theta);
        }
    }
}

/// Variances of `(pc, width)` at the solution.
fn covariance_diagonal(p_values: &[f64], theta: [f64; 2], ss_res: f64) -> Result<(f64, f64)> {
    let ([a, b, d], _) = normal_equations(p_values, None, theta);
    let det = a * d - b * b;
    if !det.is_finite() || det <= f64::EPSILON * a * d {
        return Err(Error::FitFailed("singular covariance matrix".into()));
    }

    let dof = (p_values.len() - 2) as f64;
    let s2 = ss_res / dof;
    let pc_var = d / det * s2;
    let width_var = a / det * s2;
    if !(pc_var.is_finite() && width_var.is_finite()) {
        return Err(Error::FitFailed("non-finite parameter variance".into()));
    }
    Ok((pc_var, width_var))
}

/// A p_c estimate compared against the known square-lattice threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct PcAnalysis {
    pub estimate: PcEstimate,
    pub theoretical_pc: f64,
    /// `|pc - theoretical_pc|`.
    pub error: f64,
    /// `error / theoretical_pc * 100`.
    pub error_percent: f64,
    /// Hints for a more accurate sweep.
    pub suggestions: Vec<String>,
}

/// Fit p_c and compare it with [`THEORETICAL_PC_2D_SQUARE`].
pub fn analyze(
    p_values: &[f64],
    probs: &[f64],
    size: usize,
    num_trials: usize,
    params: &FitParams,
) -> Result<PcAnalysis> {
    let estimate = estimate_pc(p_values, probs, params)?;
    let error = (estimate.pc - THEORETICAL_PC_2D_SQUARE).abs();

    if estimate.r_squared < POOR_FIT_R_SQUARED {
        log::warn!(
            "poor sigmoid fit (R² = {:.4}); consider more trials, finer p resolution, or larger N",
            estimate.r_squared
        );
    }
    log::debug!(
        "estimated p_c = {:.4} ± {:.4} (width {:.4})",
        estimate.pc,
        estimate.pc_stderr,
        estimate.width
    );

    Ok(PcAnalysis {
        theoretical_pc: THEORETICAL_PC_2D_SQUARE,
        error,
        error_percent: error / THEORETICAL_PC_2D_SQUARE * 100.0,
        suggestions: suggest_improvements(p_values, probs, size, num_trials),
        estimate,
    })
}

/// Suggest sweep changes that would sharpen the estimate.
pub fn suggest_improvements(
    p_values: &[f64],
    probs: &[f64],
    size: usize,
    num_trials: usize,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    if !probs.is_empty() {
        let max = probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = probs.iter().copied().fold(f64::INFINITY, f64::min);
        if max < 0.9 {
            suggestions.push("Increase max(p) to see the full transition (P(p) -> 1)".to_string());
        }
        if min > 0.1 {
            suggestions.push("Decrease min(p) to see the full transition (P(p) -> 0)".to_string());
        }
    }

    let near_pc = p_values.iter().filter(|&&p| p > 0.55 && p < 0.65).count();
    if near_pc < 10 {
        suggestions.push("Add more p values near p_c ≈ 0.593 for better accuracy".to_string());
    }
    if size < 100 {
        suggestions.push(format!(
            "Increase grid size (N={size} -> N>=100) for a sharper transition"
        ));
    }
    if num_trials < 100 {
        suggestions.push(format!("Increase trials (n={num_trials} -> n>=100) to reduce noise"));
    }

    suggestions
}

impl fmt::Display for PcAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.estimate;
        writeln!(f, "Estimated p_c:    {:.4} ± {:.4}", e.pc, e.pc_stderr)?;
        writeln!(f, "Theoretical p_c:  {:.4}", self.theoretical_pc)?;
        writeln!(f, "Absolute error:   {:.4}", self.error)?;
        writeln!(f, "Relative error:   {:.2}%", self.error_percent)?;
        writeln!(f, "Transition width: {:.4} ± {:.4}", e.width, e.width_stderr)?;
        write!(f, "R² (goodness):    {:.4}", e.r_squared)?;
        if e.r_squared < POOR_FIT_R_SQUARED {
            write!(f, "\nWarning: R² < {POOR_FIT_R_SQUARED} suggests a poor fit")?;
        }
        for (i, s) in self.suggestions.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, s)?;
        }
        Ok(())
    }
}
