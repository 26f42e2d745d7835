//! Monte Carlo trial batches and p sweeps.
//!
//! One trial samples a fresh N×N grid at occupation probability `p`, labels it,
//! and checks for a spanning cluster. Trials are independent: every trial owns
//! its grid and its labeler state, and draws from its own RNG seeded from
//! `(base_seed, trial_index)`. A batch therefore gives the same statistics
//! whether it runs sequentially or on the rayon pool.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::cluster::{Algorithm, ClusterLabeler};
use crate::error::{Error, Result};
use crate::estimate::{self, FitParams, PcAnalysis};
use crate::grid::OccupancyGrid;

/// Parameters for a batch of trials at a single `p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialConfig {
    /// Occupation probability.
    pub p: f64,
    /// Grid side N.
    pub size: usize,
    /// Number of independent grids.
    pub num_trials: usize,
    pub algorithm: Algorithm,
    /// Base seed. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Run trials on the rayon pool.
    pub parallel: bool,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            p: 0.5927,
            size: 50,
            num_trials: 100,
            algorithm: Algorithm::default(),
            seed: None,
            parallel: true,
        }
    }
}

impl TrialConfig {
    pub fn new(p: f64, size: usize, num_trials: usize) -> Self {
        Self {
            p,
            size,
            num_trials,
            ..Self::default()
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.p) {
            return Err(Error::InvalidParameter {
                name: "p",
                message: "must be in [0, 1]",
            });
        }
        if self.size == 0 {
            return Err(Error::InvalidParameter {
                name: "size",
                message: "must be at least 1",
            });
        }
        if self.num_trials == 0 {
            return Err(Error::InvalidParameter {
                name: "num_trials",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Running sums over trials. Merging is commutative and associative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TrialTally {
    trials: usize,
    percolating: usize,
    clusters: usize,
    cluster_sites: usize,
    spanning_sites: usize,
}

impl TrialTally {
    fn merge(self, other: Self) -> Self {
        Self {
            trials: self.trials + other.trials,
            percolating: self.percolating + other.percolating,
            clusters: self.clusters + other.clusters,
            cluster_sites: self.cluster_sites + other.cluster_sites,
            spanning_sites: self.spanning_sites + other.spanning_sites,
        }
    }
}

/// Aggregated statistics for one batch.
#[derive(Clone, Debug)]
pub struct TrialStats {
    pub p: f64,
    pub size: usize,
    pub num_trials: usize,
    pub num_percolating: usize,
    /// `num_percolating / num_trials`.
    pub percolation_probability: f64,
    /// Mean number of clusters per grid.
    pub mean_num_clusters: f64,
    /// Mean size over every cluster of every grid.
    pub mean_cluster_size: f64,
    /// Mean size of the spanning cluster over percolating grids.
    pub mean_spanning_size: f64,
    pub algorithm: Algorithm,
    pub elapsed: Duration,
}

impl TrialStats {
    fn from_tally(config: &TrialConfig, tally: TrialTally, elapsed: Duration) -> Self {
        let mean = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        Self {
            p: config.p,
            size: config.size,
            num_trials: tally.trials,
            num_percolating: tally.percolating,
            percolation_probability: mean(tally.percolating, tally.trials),
            mean_num_clusters: mean(tally.clusters, tally.trials),
            mean_cluster_size: mean(tally.cluster_sites, tally.clusters),
            mean_spanning_size: mean(tally.spanning_sites, tally.percolating),
            algorithm: config.algorithm,
            elapsed,
        }
    }
}

#[inline]
fn trial_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add(index as u64)
}

fn run_trial(
    labeler: &dyn ClusterLabeler,
    p: f64,
    size: usize,
    seed: u64,
) -> Result<TrialTally> {
    let mut rng = StdRng::seed_from_u64(seed);
    let grid = OccupancyGrid::random(size, p, &mut rng)?;
    let labeling = labeler.label_clusters(&grid, false)?;

    let clusters = labeling.clusters();
    let percolation = labeling.percolation();
    let spanning_sites = percolation
        .spanning
        .and_then(|id| clusters.get(id))
        .map_or(0, |c| c.size);

    Ok(TrialTally {
        trials: 1,
        percolating: usize::from(percolation.percolates()),
        clusters: clusters.len(),
        cluster_sites: clusters.total_sites(),
        spanning_sites,
    })
}

/// Run a batch of independent trials and aggregate their statistics.
pub fn run_trials(config: &TrialConfig) -> Result<TrialStats> {
    config.validate()?;

    let base = config.seed.unwrap_or_else(|| rand::rng().random());
    let labeler = config.algorithm.labeler();
    let start = Instant::now();

    let tally = if config.parallel {
        (0..config.num_trials)
            .into_par_iter()
            .map(|i| run_trial(labeler, config.p, config.size, trial_seed(base, i)))
            .try_reduce(TrialTally::default, |a, b| Ok(a.merge(b)))?
    } else {
        (0..config.num_trials).try_fold(TrialTally::default(), |acc, i| {
            run_trial(labeler, config.p, config.size, trial_seed(base, i)).map(|t| acc.merge(t))
        })?
    };

    let stats = TrialStats::from_tally(config, tally, start.elapsed());
    log::debug!(
        "p={:.4} N={} trials={} algorithm={}: P(p)={:.3} mean clusters={:.1} in {:?}",
        stats.p,
        stats.size,
        stats.num_trials,
        stats.algorithm,
        stats.percolation_probability,
        stats.mean_num_clusters,
        stats.elapsed
    );
    Ok(stats)
}

/// Parameters for a sweep over evenly spaced `p` values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepConfig {
    pub p_min: f64,
    pub p_max: f64,
    /// Number of p values, endpoints included.
    pub p_steps: usize,
    pub size: usize,
    /// Trials per p value.
    pub num_trials: usize,
    pub algorithm: Algorithm,
    pub seed: Option<u64>,
    pub parallel: bool,
    /// Fit a sigmoid to P(p) after the sweep.
    pub estimate_pc: bool,
    pub fit: FitParams,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            p_min: 0.4,
            p_max: 0.7,
            p_steps: 31,
            size: 50,
            num_trials: 100,
            algorithm: Algorithm::default(),
            seed: None,
            parallel: true,
            estimate_pc: true,
            fit: FitParams::default(),
        }
    }
}

impl SweepConfig {
    pub fn new(p_min: f64, p_max: f64, p_steps: usize) -> Self {
        Self {
            p_min,
            p_max,
            p_steps,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_num_trials(mut self, num_trials: usize) -> Self {
        self.num_trials = num_trials;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_estimate_pc(mut self, estimate_pc: bool) -> Self {
        self.estimate_pc = estimate_pc;
        self
    }

    pub fn with_fit(mut self, fit: FitParams) -> Self {
        self.fit = fit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.p_min) || !unit.contains(&self.p_max) {
            return Err(Error::InvalidParameter {
                name: "p_min/p_max",
                message: "must be in [0, 1]",
            });
        }
        if self.p_max <= self.p_min {
            return Err(Error::InvalidParameter {
                name: "p_max",
                message: "must be greater than p_min",
            });
        }
        if self.p_steps < 2 {
            return Err(Error::InvalidParameter {
                name: "p_steps",
                message: "must be at least 2",
            });
        }
        if self.estimate_pc {
            self.fit.validate()?;
        }
        TrialConfig::new(self.p_min, self.size, self.num_trials).validate()
    }

    /// The `p_steps` evenly spaced values from `p_min` to `p_max`.
    ///
    /// Endpoints are exact; interior values never leave `[p_min, p_max]`.
    pub fn p_values(&self) -> Vec<f64> {
        let last = self.p_steps.saturating_sub(1);
        (0..self.p_steps)
            .map(|i| {
                if i == last {
                    return self.p_max;
                }
                let p = self.p_min + (self.p_max - self.p_min) * i as f64 / last as f64;
                p.min(self.p_max).max(self.p_min)
            })
            .collect()
    }
}

/// Per-p statistics of a sweep plus the optional p_c estimate.
#[derive(Clone, Debug)]
pub struct SweepResult {
    pub points: Vec<TrialStats>,
    /// `None` if estimation was off or the fit failed.
    pub estimate: Option<PcAnalysis>,
    pub elapsed: Duration,
}

impl SweepResult {
    pub fn p_values(&self) -> Vec<f64> {
        self.points.iter().map(|s| s.p).collect()
    }

    pub fn percolation_probabilities(&self) -> Vec<f64> {
        self.points.iter().map(|s| s.percolation_probability).collect()
    }

    pub fn mean_cluster_counts(&self) -> Vec<f64> {
        self.points.iter().map(|s| s.mean_num_clusters).collect()
    }

    pub fn mean_cluster_sizes(&self) -> Vec<f64> {
        self.points.iter().map(|s| s.mean_cluster_size).collect()
    }
}

/// Run [`run_trials`] at every p of the sweep, then optionally estimate p_c.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepResult> {
    config.validate()?;

    let base = config.seed.unwrap_or_else(|| rand::rng().random());
    let start = Instant::now();

    let mut points = Vec::with_capacity(config.p_steps);
    for (i, p) in config.p_values().into_iter().enumerate() {
        let trial = TrialConfig {
            p,
            size: config.size,
            num_trials: config.num_trials,
            algorithm: config.algorithm,
            // Distinct seed stream per p value.
            seed: Some(base.wrapping_add((i as u64) << 32)),
            parallel: config.parallel,
        };
        points.push(run_trials(&trial)?);
    }

    let mut result = SweepResult {
        points,
        estimate: None,
        elapsed: start.elapsed(),
    };

    if config.estimate_pc {
        let analysis = estimate::analyze(
            &result.p_values(),
            &result.percolation_probabilities(),
            config.size,
            config.num_trials,
            &config.fit,
        );
        match analysis {
            Ok(analysis) => result.estimate = Some(analysis),
            Err(e) => log::warn!("p_c estimation skipped: {e}"),
        }
    }

    log::debug!(
        "sweep of {} p values finished in {:?}",
        result.points.len(),
        result.elapsed
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::THEORETICAL_PC_2D_SQUARE;

    #[test]
    fn test_extreme_probabilities() {
        for algorithm in Algorithm::ALL {
            let config = TrialConfig::new(0.0, 10, 5).with_algorithm(algorithm).with_seed(1);
            let empty = run_trials(&config).unwrap();
            assert_eq!(empty.num_percolating, 0);
            assert_eq!(empty.mean_num_clusters, 0.0);
            assert_eq!(empty.mean_cluster_size, 0.0);
            assert_eq!(empty.mean_spanning_size, 0.0);

            let config = TrialConfig::new(1.0, 10, 5).with_algorithm(algorithm).with_seed(1);
            let full = run_trials(&config).unwrap();
            assert_eq!(full.percolation_probability, 1.0);
            assert_eq!(full.mean_num_clusters, 1.0);
            assert_eq!(full.mean_cluster_size, 100.0);
            assert_eq!(full.mean_spanning_size, 100.0);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = TrialConfig::new(0.59, 24, 40).with_seed(99);
        let seq = run_trials(&config.with_parallel(false)).unwrap();
        let par = run_trials(&config.with_parallel(true)).unwrap();

        assert_eq!(seq.num_percolating, par.num_percolating);
        assert_eq!(seq.mean_num_clusters, par.mean_num_clusters);
        assert_eq!(seq.mean_cluster_size, par.mean_cluster_size);
        assert_eq!(seq.mean_spanning_size, par.mean_spanning_size);
    }

    #[test]
    fn test_algorithms_agree_on_seeded_batch() {
        let config = TrialConfig::new(0.6, 20, 25).with_seed(5);
        let bfs = run_trials(&config.with_algorithm(Algorithm::Bfs)).unwrap();
        let uf = run_trials(&config.with_algorithm(Algorithm::UnionFind)).unwrap();

        assert_eq!(bfs.num_percolating, uf.num_percolating);
        assert_eq!(bfs.mean_num_clusters, uf.mean_num_clusters);
        assert_eq!(bfs.mean_cluster_size, uf.mean_cluster_size);
    }

    #[test]
    fn test_tally_merge_is_order_independent() {
        let a = TrialTally {
            trials: 1,
            percolating: 1,
            clusters: 3,
            cluster_sites: 10,
            spanning_sites: 7,
        };
        let b = TrialTally {
            trials: 2,
            percolating: 0,
            clusters: 5,
            cluster_sites: 9,
            spanning_sites: 0,
        };
        assert_eq!(a.merge(b), b.merge(a));
        assert_eq!(a.merge(TrialTally::default()), a);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(run_trials(&TrialConfig::new(-0.1, 10, 5)).is_err());
        assert!(run_trials(&TrialConfig::new(0.5, 0, 5)).is_err());
        assert!(run_trials(&TrialConfig::new(0.5, 10, 0)).is_err());
        assert!(run_sweep(&SweepConfig::new(0.7, 0.4, 5)).is_err());
        assert!(run_sweep(&SweepConfig::new(0.4, 0.7, 1)).is_err());
    }

    #[test]
    fn test_sweep_values_and_monotone_extremes() {
        let config = SweepConfig::new(0.0, 1.0, 5)
            .with_size(12)
            .with_num_trials(10)
            .with_seed(3)
            .with_estimate_pc(false);
        assert_eq!(config.p_values(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let result = run_sweep(&config).unwrap();
        let probs = result.percolation_probabilities();
        assert_eq!(probs.len(), 5);
        assert_eq!(probs[0], 0.0);
        assert_eq!(probs[4], 1.0);
        assert!(result.estimate.is_none());
    }

    #[test]
    fn test_sweep_ends_exactly_at_p_max() {
        // The interpolated last step rounds above 1.0 for this range.
        let config = SweepConfig::new(0.085, 1.0, 31)
            .with_size(8)
            .with_num_trials(2)
            .with_seed(1)
            .with_estimate_pc(false);
        let p_values = config.p_values();
        assert_eq!(p_values[0], 0.085);
        assert_eq!(*p_values.last().unwrap(), 1.0);
        assert!(p_values.iter().all(|&p| (0.085..=1.0).contains(&p)));

        let result = run_sweep(&config).unwrap();
        assert_eq!(result.points.len(), 31);
        assert_eq!(result.points.last().unwrap().p, 1.0);
    }

    #[test]
    fn test_sweep_values_stay_in_range() {
        for k in 1..1000 {
            let p_min = k as f64 / 1000.0;
            let config = SweepConfig::new(p_min, 1.0, 31);
            let p_values = config.p_values();
            assert_eq!(*p_values.last().unwrap(), 1.0, "p_min = {p_min}");
            assert!(p_values.iter().all(|&p| p >= p_min && p <= 1.0), "p_min = {p_min}");
        }
    }

    #[test]
    fn test_sweep_estimates_pc() {
        let config = SweepConfig::new(0.45, 0.75, 16)
            .with_size(40)
            .with_num_trials(60)
            .with_seed(11);
        let result = run_sweep(&config).unwrap();
        let analysis = result.estimate.expect("fit should succeed on a full transition");
        assert!(
            (analysis.estimate.pc - THEORETICAL_PC_2D_SQUARE).abs() < 0.05,
            "pc = {}",
            analysis.estimate.pc
        );
    }
}
