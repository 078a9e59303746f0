//! Quick solver performance test

use std::time::Instant;

use tray_packer::{
    compute::{GameBox, evolution::GeneticSolver},
    schema::{PackingConfig, SolverConfig},
};

fn main() {
    println!("=== Solver Performance Test ===\n");

    let game_box = GameBox::from_config(&PackingConfig::default());

    for population_size in [50, 100, 200, 400] {
        let config = SolverConfig {
            population_size,
            random_seed: Some(42),
            ..Default::default()
        };

        let mut solver = match GeneticSolver::new(&game_box, config) {
            Ok(solver) => solver,
            Err(e) => {
                eprintln!("Population {}: {}", population_size, e);
                continue;
            }
        };
        solver.generate_population();

        let start = Instant::now();
        let result = match solver.solve_with_callback(100, 0.001, |_| {}) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Population {}: {}", population_size, e);
                continue;
            }
        };
        let elapsed = start.elapsed();

        let evaluations = result.stats.generations * population_size;
        println!("Population {}:", population_size);
        println!("  Generations:    {}", result.stats.generations);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!(
            "  Evals/sec:      {:.1}",
            evaluations as f64 / elapsed.as_secs_f64()
        );
        println!("  Best fitness:   {:.4}", result.stats.best_fitness);
        println!("  Mean fitness:   {:.4}", result.stats.final_mean_fitness);
        println!();
    }
}
