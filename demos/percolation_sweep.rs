//! Sweep the occupation probability, print per-p statistics, and estimate p_c.
//!
//! ```text
//! RUST_LOG=debug cargo run --release --example percolation_sweep -- [algorithm]
//! ```

use percolate::{run_sweep, Algorithm, OccupancyGrid, SweepConfig};
use rand::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let algorithm: Algorithm = match std::env::args().nth(1) {
        Some(name) => name.parse()?,
        None => Algorithm::default(),
    };

    // --- One small grid, labeled and drawn ---
    let mut rng = StdRng::seed_from_u64(7);
    let grid = OccupancyGrid::random(12, 0.6, &mut rng)?;
    let labeling = algorithm.labeler().label_clusters(&grid, false)?;
    let percolation = labeling.percolation();

    println!("=== 12x12 grid at p = 0.60 ({algorithm}) ===");
    for row in 0..grid.rows() {
        let line: String = labeling
            .labels()
            .row(row)
            .iter()
            .map(|&l| match l {
                0 => '.',
                l if Some(l) == percolation.spanning => '#',
                _ => 'o',
            })
            .collect();
        println!("  {line}");
    }
    println!(
        "  {} clusters, percolates: {}",
        labeling.clusters().len(),
        percolation.percolates()
    );

    // --- Sweep ---
    let config = SweepConfig::new(0.50, 0.70, 21)
        .with_size(100)
        .with_num_trials(200)
        .with_algorithm(algorithm)
        .with_seed(42);
    let result = run_sweep(&config)?;

    println!(
        "\n=== Sweep (N = {}, {} trials per p, {}) ===",
        config.size, config.num_trials, algorithm
    );
    println!("      p    P(p)   clusters   mean size");
    for s in &result.points {
        println!(
            "  {:.3}   {:.3}   {:8.1}   {:9.2}",
            s.p, s.percolation_probability, s.mean_num_clusters, s.mean_cluster_size
        );
    }
    println!("  total time: {:?}", result.elapsed);

    match &result.estimate {
        Some(analysis) => println!("\n{analysis}"),
        None => println!("\nCould not estimate p_c"),
    }

    Ok(())
}
