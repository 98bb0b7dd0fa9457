use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use tracing::{info, warn};

use crate::algorithms::a_star::{SearchOptions, SearchStatus};
use crate::algorithms::common::PathfindingAlgorithm;
use crate::algorithms::reference::ReferenceAStar;
use crate::config::Config;
use crate::error::Result;
use crate::grid::Position;
use crate::session::Session;
use crate::statistics::Statistics;

/// A reproducible scenario: initial obstacles plus the obstacle toggles
/// applied before each replan.
#[derive(Debug, Clone)]
pub struct EnvironmentSetup {
    pub seed: u64,
    pub rows: usize,
    pub cols: usize,
    pub start: Position,
    pub goal: Position,
    pub obstacles: FxHashSet<Position>,
    pub edit_timeline: Vec<FxHashSet<Position>>,
}

impl EnvironmentSetup {
    /// Expects a config that passed `Config::validate`.
    pub fn generate(config: &Config) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let (rows, cols) = (config.rows, config.cols);

        // Start in the top-left quadrant and the goal in the bottom-right
        // one when the grid is big enough to have quadrants.
        let start = Position {
            x: rng.gen_range(0..(cols / 2).max(1)),
            y: rng.gen_range(0..(rows / 2).max(1)),
        };
        let mut goal = Position {
            x: rng.gen_range(cols / 2..cols),
            y: rng.gen_range(rows / 2..rows),
        };
        while goal == start {
            goal = Position {
                x: rng.gen_range(0..cols),
                y: rng.gen_range(0..rows),
            };
        }

        let obstacles = random_cells(&mut rng, config, config.num_obstacles, start, goal);
        let edit_timeline = (0..config.replans)
            .map(|_| random_cells(&mut rng, config, config.edits_per_replan, start, goal))
            .collect::<Vec<_>>();

        info!(
            seed,
            %start,
            %goal,
            obstacles = obstacles.len(),
            edit_rounds = edit_timeline.len(),
            "generated environment"
        );

        EnvironmentSetup {
            seed,
            rows,
            cols,
            start,
            goal,
            obstacles,
            edit_timeline,
        }
    }

    /// Builds a session holding this environment's obstacles and endpoints,
    /// with no search started.
    pub fn create_session(&self, options: SearchOptions) -> Result<Session> {
        let mut session = Session::new(self.rows, self.cols, options, false);
        for &pos in &self.obstacles {
            session.set_obstacle(pos, true)?;
        }
        session.set_start(self.start)?;
        session.set_end(self.goal)?;
        Ok(session)
    }
}

/// Up to `count` distinct cells, never `start` or `goal`.
fn random_cells(
    rng: &mut StdRng,
    config: &Config,
    count: usize,
    start: Position,
    goal: Position,
) -> FxHashSet<Position> {
    let mut cells = FxHashSet::default();
    let mut attempts = 0;
    let max_attempts = count * 10;

    while cells.len() < count && attempts < max_attempts {
        let pos = Position {
            x: rng.gen_range(0..config.cols),
            y: rng.gen_range(0..config.rows),
        };
        if pos != start && pos != goal {
            cells.insert(pos);
        }
        attempts += 1;
    }
    cells
}

pub struct Simulation {
    session: Session,
    config: Config,
    environment: EnvironmentSetup,
    oracle: ReferenceAStar,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let environment = EnvironmentSetup::generate(&config);
        Self::new_with_environment(config, environment)
    }

    pub fn new_with_environment(config: Config, environment: EnvironmentSetup) -> Result<Self> {
        let session = environment.create_session(config.search_options())?;
        Ok(Simulation {
            session,
            config,
            environment,
            oracle: ReferenceAStar::new(),
        })
    }

    pub fn environment(&self) -> &EnvironmentSetup {
        &self.environment
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Searches once, then once more after each round of obstacle edits.
    pub fn run(&mut self) -> Result<Statistics> {
        let mut stats = Statistics::new();

        for round in 0..=self.environment.edit_timeline.len() {
            if round > 0 {
                self.apply_edits(round - 1)?;
            }
            self.run_search(round, &mut stats)?;
        }

        stats.calculate_efficiency();
        Ok(stats)
    }

    fn apply_edits(&mut self, index: usize) -> Result<()> {
        let edits = self.environment.edit_timeline[index].clone();
        for pos in edits {
            self.session.toggle_obstacle(pos)?;
        }
        info!(
            round = index + 1,
            revision = self.session.grid().revision(),
            "applied obstacle edits"
        );
        Ok(())
    }

    fn run_search(&mut self, round: usize, stats: &mut Statistics) -> Result<()> {
        let mut search_time = Duration::ZERO;

        let started = Instant::now();
        let mut status = self.session.search()?;
        search_time += started.elapsed();

        while status == SearchStatus::Running {
            self.render(round);
            let started = Instant::now();
            status = self.session.step();
            search_time += started.elapsed();
        }
        self.render(round);

        let path_length = self.session.path()?.map(|path| path.len().saturating_sub(1));
        let optimal = self.oracle.shortest_length(
            self.session.grid(),
            self.environment.start,
            self.environment.goal,
        );
        if path_length != optimal {
            warn!(
                ?path_length,
                ?optimal,
                reference = self.oracle.name(),
                "path length differs from reference search"
            );
        }

        let search = self.session.engine().stats();
        info!(round, %status, ?path_length, %search, "search finished");
        stats.record(&search, search_time, path_length, optimal);
        Ok(())
    }

    fn render(&self, round: usize) {
        if self.config.no_visualization {
            return;
        }

        let engine = self.session.engine();
        self.clear_screen();
        println!("=== PATHFINDING ===");
        println!(
            "Round: {} | Status: {} | Heuristic: {} | Mode: {}",
            round,
            engine.status(),
            engine.options().heuristic,
            engine.options().step_mode
        );
        println!(
            "Expanded: {} | Frontier: {} | Current: {}",
            engine.stats().expansions,
            engine.frontier_len(),
            engine
                .current()
                .map_or_else(|| "-".to_string(), |p| p.to_string())
        );
        println!("Legend: S=Start, G=Goal, #=Obstacle, *=Path, o=Open, x=Closed, .=Unvisited");
        print!("{}", self.session.grid());
        thread::sleep(Duration::from_millis(self.config.delay_ms));
    }

    fn clear_screen(&self) {
        print!("\x1B[2J\x1B[1;1H");
    }
}
