//! Tray Packer CLI - Search for a box insert layout from JSON configuration.

use std::path::PathBuf;
use std::time::Instant;

use tray_packer::{
    compute::{GameBox, evolution::GeneticSolver},
    schema::{PackingConfig, StopReason},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [generations]", args[0]);
        eprintln!();
        eprintln!("Search for a tray layout that fills a board game box.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to packing configuration file");
        eprintln!("  generations  Generation budget (default: solver.max_generations)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let config = PackingConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config {}: {}", config_path.display(), e);
        std::process::exit(1);
    });
    let generations: usize = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.solver.max_generations);
    let tolerance = config.solver.tolerance;

    let game_box = GameBox::from_config(&config);
    let (length, width, height) = game_box.dimensions();

    println!("Tray Packer");
    println!("===========");
    println!("Box: {}x{}x{} (length x width x height)", length, width, height);
    println!("Item classes: {}", game_box.catalog().len());
    for (item, count) in game_box.catalog() {
        println!(
            "  {} x {}x{}x{} ({}, {})",
            count, item.length, item.width, item.height, item.orientation, item.plane
        );
    }
    println!("Population: {}", config.solver.population_size);
    println!("Generations: {}", generations);
    println!();

    let mut solver = GeneticSolver::new(&game_box, config.solver.clone()).unwrap_or_else(|e| {
        eprintln!("Error creating solver: {}", e);
        std::process::exit(1);
    });
    solver.generate_population();

    println!("Solving...");
    let start = Instant::now();
    let report_every = (generations / 10).max(1);

    let result = solver
        .solve_with_callback(generations, tolerance, |progress| {
            let done = progress.generation + 1;
            if done % report_every == 0 {
                let elapsed = start.elapsed().as_secs_f32();
                println!(
                    "  Generation {}/{}: best={:.6}, mean={:.3}, std={:.3}, {:.1} gen/s",
                    done,
                    progress.max_generations,
                    progress.best_fitness,
                    progress.mean_fitness,
                    progress.fitness_std,
                    done as f32 / elapsed
                );
            }
        })
        .unwrap_or_else(|e| {
            eprintln!("Error during solve: {}", e);
            std::process::exit(1);
        });

    let breakdown = solver.evaluator().breakdown(&result.best);
    let stats = &result.stats;

    println!();
    println!("Best layout (one line per item class):");
    println!("{}", result.best);
    println!();
    println!("Fitness: {:.6}", stats.best_fitness);
    println!("  Unused space: {:.0}", breakdown.unused_space);
    println!("  Unfit:        {:.0}", breakdown.unfit);
    println!("  Overlap:      {:.0}", breakdown.overlap);
    println!("  Overfit:      {:.0}", breakdown.overfit);
    println!("  Trays:        {}", breakdown.tray_count);
    println!();
    match stats.stop_reason {
        StopReason::ToleranceReached => println!(
            "Converged after {} generations",
            stats.generations
        ),
        StopReason::MaxGenerations => println!(
            "Stopped after {} generations without converging",
            stats.generations
        ),
    }
    println!(
        "Time: {:.2}s ({:.1} generations/s)",
        stats.elapsed_seconds,
        stats.generations as f64 / stats.elapsed_seconds
    );
}

fn print_example_config() {
    match serde_json::to_string_pretty(&PackingConfig::default()) {
        Ok(json) => {
            println!("Example configuration (config.json):");
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("Error serializing example config: {}", e);
            std::process::exit(1);
        }
    }
}
