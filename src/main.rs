use clap::Parser;
use tracing_subscriber::EnvFilter;

use interactive_pathfinding::config::Config;
use interactive_pathfinding::simulation::Simulation;

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("interactive_pathfinding={}", config.log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let config = Config::parse();
    init_logging(&config);

    if !config.quiet {
        println!("Starting pathfinding session...");
        println!("Grid size: {}x{}", config.cols, config.rows);
        println!("Obstacles: {}, Replans: {}", config.num_obstacles, config.replans);
        println!("Heuristic: {} | Mode: {}", config.heuristic, config.step_mode);
        if config.no_visualization {
            println!("Visualization disabled - running in fast mode");
        } else {
            println!("Visualization enabled with {}ms delay", config.delay_ms);
        }
        println!();
    }

    let mut simulation = match Simulation::new(config.clone()) {
        Ok(simulation) => simulation,
        Err(e) => {
            eprintln!("Failed to create simulation: {}", e);
            std::process::exit(1);
        }
    };

    match simulation.run() {
        Ok(stats) => {
            if !config.quiet {
                println!("\n=== FINAL RESULTS ===");
                println!("Seed: {}", simulation.environment().seed);
            }
            println!("{}", stats);
        }
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    }
}
