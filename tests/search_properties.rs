use interactive_pathfinding::algorithms::heuristic::manhattan;
use interactive_pathfinding::algorithms::reference::ReferenceAStar;
use interactive_pathfinding::{
    CellState, Grid, HeuristicKind, Position, SearchEngine, SearchOptions, SearchStatus, StepMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

const HEURISTICS: [HeuristicKind; 2] = [HeuristicKind::Manhattan, HeuristicKind::Euclidean];

fn engine(heuristic: HeuristicKind, step_mode: StepMode) -> SearchEngine {
    SearchEngine::new(SearchOptions {
        heuristic,
        step_mode,
        ..Default::default()
    })
}

fn random_position(rng: &mut StdRng, grid: &Grid) -> Position {
    Position::new(rng.gen_range(0..grid.cols()), rng.gen_range(0..grid.rows()))
}

/// A random grid with roughly `density` of its cells blocked, never the endpoints.
fn random_case(rng: &mut StdRng, density: f64) -> (Grid, Position, Position) {
    let mut grid = Grid::new(rng.gen_range(2..12), rng.gen_range(2..12));
    let start = random_position(rng, &grid);
    let end = random_position(rng, &grid);
    for y in 0..grid.rows() {
        for x in 0..grid.cols() {
            let pos = Position::new(x, y);
            if pos != start && pos != end && rng.gen_bool(density) {
                grid.set_obstacle(pos, true).unwrap();
            }
        }
    }
    (grid, start, end)
}

fn path_len(engine: &SearchEngine) -> Option<usize> {
    engine.result().unwrap().map(|p| p.len() - 1)
}

#[test]
fn open_grid_path_length_equals_manhattan_distance() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..100 {
        let (mut grid, start, end) = random_case(&mut rng, 0.0);
        for heuristic in HEURISTICS {
            let mut engine = engine(heuristic, StepMode::Batch);
            let status = engine.start(&mut grid, Some(start), Some(end)).unwrap();
            assert_eq!(status, SearchStatus::Succeeded);
            assert_eq!(path_len(&engine), Some(manhattan(start, end) as usize));
        }
    }
}

#[test]
fn paths_are_connected_simple_and_shortest() {
    let mut rng = StdRng::seed_from_u64(2);
    let oracle = ReferenceAStar::new();
    for _ in 0..200 {
        let (mut grid, start, end) = random_case(&mut rng, 0.3);
        let expected = oracle.shortest_length(&grid, start, end);
        for heuristic in HEURISTICS {
            let mut engine = engine(heuristic, StepMode::Batch);
            engine.start(&mut grid, Some(start), Some(end)).unwrap();
            assert_eq!(path_len(&engine), expected);

            if let Some(path) = engine.result().unwrap() {
                assert_eq!(path.first(), Some(&start));
                assert_eq!(path.last(), Some(&end));
                assert!(path.windows(2).all(|w| w[0].is_adjacent(&w[1])));
                assert!(path.iter().all(|p| !grid.is_obstacle(*p)));
                let unique: FxHashSet<Position> = path.iter().copied().collect();
                assert_eq!(unique.len(), path.len());

                for cell in grid.cells() {
                    let on_path = path[1..].contains(&cell.position());
                    assert_eq!(cell.on_path(), on_path);
                }
            }
        }
    }
}

/// Closes one cell per step, recording its costs at the moment it closed.
fn closing_costs(grid: &mut Grid, engine: &mut SearchEngine) -> Vec<(f64, f64)> {
    let mut costs = Vec::new();
    while engine.status() == SearchStatus::Running {
        engine.step(grid);
        if let Some(current) = engine.current() {
            if costs.len() < engine.expansion_order().len() {
                let cell = grid.cell(current).unwrap();
                costs.push((cell.g_cost(), cell.f_cost()));
            }
        }
    }
    costs
}

#[test]
fn closing_order_follows_priority() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..150 {
        let (mut grid, start, end) = random_case(&mut rng, 0.25);
        for heuristic in HEURISTICS {
            let mut engine = engine(heuristic, StepMode::Incremental);
            engine.start(&mut grid, Some(start), Some(end)).unwrap();
            let costs = closing_costs(&mut grid, &mut engine);
            assert_eq!(costs.len(), engine.expansion_order().len());
            for pair in costs.windows(2) {
                assert!(pair[0].1 <= pair[1].1 + 1e-9, "f decreased: {:?}", pair);
            }
        }
    }
}

#[test]
fn open_grid_closes_in_non_decreasing_g() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..100 {
        let (mut grid, start, end) = random_case(&mut rng, 0.0);
        let mut engine = engine(HeuristicKind::Manhattan, StepMode::Incremental);
        engine.start(&mut grid, Some(start), Some(end)).unwrap();
        let costs = closing_costs(&mut grid, &mut engine);
        assert!(costs.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    }
}

#[test]
fn restart_reproduces_path_and_expansion_order() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..100 {
        let (mut grid, start, end) = random_case(&mut rng, 0.2);
        for heuristic in HEURISTICS {
            let mut engine = engine(heuristic, StepMode::Batch);
            engine.start(&mut grid, Some(start), Some(end)).unwrap();
            let first_path = engine.result().unwrap().map(<[Position]>::to_vec);
            let first_order = engine.expansion_order().to_vec();

            engine.reset(&mut grid);
            engine.start(&mut grid, Some(start), Some(end)).unwrap();
            assert_eq!(engine.result().unwrap().map(<[Position]>::to_vec), first_path);
            assert_eq!(engine.expansion_order(), &first_order[..]);
        }
    }
}

#[test]
fn adding_obstacles_never_shortens_the_path() {
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..150 {
        let (mut grid, start, end) = random_case(&mut rng, 0.15);
        let mut engine = engine(HeuristicKind::Manhattan, StepMode::Batch);
        engine.start(&mut grid, Some(start), Some(end)).unwrap();
        let mut previous = path_len(&engine);

        for _ in 0..5 {
            let pos = random_position(&mut rng, &grid);
            if pos == start || pos == end {
                continue;
            }
            grid.set_obstacle(pos, true).unwrap();
            engine.start(&mut grid, Some(start), Some(end)).unwrap();
            let current = path_len(&engine);
            match (previous, current) {
                (Some(before), Some(after)) => assert!(after >= before),
                (None, after) => assert_eq!(after, None),
                (Some(_), None) => {}
            }
            previous = current;
        }
    }
}

#[test]
fn five_by_five_open_grid() {
    let mut grid = Grid::new(5, 5);
    let mut engine = engine(HeuristicKind::Manhattan, StepMode::Batch);
    engine
        .start(&mut grid, Some(Position::new(0, 0)), Some(Position::new(4, 4)))
        .unwrap();
    assert_eq!(path_len(&engine), Some(8));
}

#[test]
fn walled_middle_column_has_no_path() {
    let mut grid = Grid::new(3, 3);
    for y in 0..3 {
        grid.set_obstacle(Position::new(1, y), true).unwrap();
    }
    let mut engine = engine(HeuristicKind::Manhattan, StepMode::Incremental);
    engine
        .start(&mut grid, Some(Position::new(0, 1)), Some(Position::new(2, 1)))
        .unwrap();

    assert_eq!(engine.run_to_completion(&mut grid), SearchStatus::Failed);
    assert_eq!(engine.result().unwrap(), None);
    let closed: Vec<Position> = grid
        .cells()
        .filter(|c| c.state() == CellState::Closed)
        .map(|c| c.position())
        .collect();
    assert_eq!(
        closed,
        vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)]
    );
    assert_eq!(engine.frontier_len(), 0);
}

#[test]
fn stepping_closes_one_cell_per_call_until_goal_selected() {
    let mut grid = Grid::new(5, 5);
    let end = Position::new(4, 4);
    let mut engine = engine(HeuristicKind::Manhattan, StepMode::Incremental);
    engine
        .start(&mut grid, Some(Position::new(0, 0)), Some(end))
        .unwrap();

    let mut calls = 0;
    while engine.status() == SearchStatus::Running {
        let status = engine.step(&mut grid);
        calls += 1;
        assert_eq!(engine.expansion_order().len(), calls);
        assert_eq!(
            status == SearchStatus::Succeeded,
            engine.current() == Some(end)
        );
    }
    assert_eq!(engine.status(), SearchStatus::Succeeded);
    assert_eq!(engine.expansion_order().last(), Some(&end));
}
