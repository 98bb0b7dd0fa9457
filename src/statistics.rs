use std::fmt;
use std::time::Duration;

/// Counters for a single search, reset on every `SearchEngine::start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Cells closed.
    pub expansions: usize,
    /// Neighbor cost updates.
    pub relaxations: usize,
    /// Largest number of simultaneously open cells.
    pub peak_frontier: usize,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expansions: {}, relaxations: {}, peak frontier: {}",
            self.expansions, self.relaxations, self.peak_frontier
        )
    }
}

/// Aggregate over every search of a simulation run.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub searches: usize,
    pub successes: usize,
    pub failures: usize,
    pub total_expansions: usize,
    /// Time spent inside the engine, excluding rendering.
    pub total_search_time: Duration,
    /// Sum of path edge counts over successful searches.
    pub total_path_length: usize,
    /// Sum of the oracle's shortest edge counts over the searches where both
    /// found a path.
    pub optimal_path_length: usize,
    /// Searches whose outcome or path length differed from the oracle's.
    pub reference_mismatches: usize,
    pub route_efficiency: f64,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Records one finished search. `path_length` is `None` when no path was
    /// found, `optimal_path_length` likewise for the oracle.
    pub fn record(
        &mut self,
        search: &SearchStats,
        search_time: Duration,
        path_length: Option<usize>,
        optimal_path_length: Option<usize>,
    ) {
        self.searches += 1;
        self.total_expansions += search.expansions;
        self.total_search_time += search_time;
        if path_length != optimal_path_length {
            self.reference_mismatches += 1;
        }
        match (path_length, optimal_path_length) {
            (Some(length), Some(optimal)) => {
                self.successes += 1;
                self.total_path_length += length;
                self.optimal_path_length += optimal;
            }
            (Some(_), None) => self.successes += 1,
            (None, _) => self.failures += 1,
        }
    }

    pub fn calculate_efficiency(&mut self) {
        if self.total_path_length > 0 && self.optimal_path_length > 0 {
            self.route_efficiency =
                self.total_path_length as f64 / self.optimal_path_length as f64;
        } else {
            self.route_efficiency = 0.0;
        }
    }

    pub fn average_search_time(&self) -> Duration {
        if self.searches == 0 {
            Duration::ZERO
        } else {
            self.total_search_time / self.searches as u32
        }
    }

    pub fn average_expansions(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.total_expansions as f64 / self.searches as f64
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Searches: {}", self.searches)?;
        writeln!(f, "Paths found: {}", self.successes)?;
        writeln!(f, "No path: {}", self.failures)?;
        writeln!(f, "Total expansions: {}", self.total_expansions)?;
        writeln!(f, "Average expansions: {:.1}", self.average_expansions())?;
        writeln!(f, "Average search time: {:.2?}", self.average_search_time())?;
        writeln!(f, "Total path length: {}", self.total_path_length)?;
        writeln!(f, "Optimal path length: {}", self.optimal_path_length)?;
        writeln!(f, "Route Efficiency: {:.3}", self.route_efficiency)?;
        writeln!(f, "Reference mismatches: {}", self.reference_mismatches)?;

        if self.route_efficiency > 1.0 {
            writeln!(f, "Warning: paths longer than the reference shortest path")?;
        }
        if self.reference_mismatches > 0 {
            writeln!(f, "Warning: some searches disagreed with the reference search")?;
        }

        Ok(())
    }
}
