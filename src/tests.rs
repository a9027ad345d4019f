#[cfg(test)]
mod tests {
    use std::thread;

    use petgraph::algo::connected_components;
    use petgraph::graphmap::UnGraphMap;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use strum::VariantArray;

    use crate::board::{Board, Encoding};
    use crate::cell::Stroke;
    use crate::config::{GeneratorConfig, RetryBudget};
    use crate::error::{GenerationError, SolutionError};
    use crate::generator::{generate, generate_with, has_loops, has_pair, has_triple, insert_loops, is_acceptable, LOOP_TRIES};
    use crate::grid::{Grid, ParseGridError};
    use crate::location::Location;
    use crate::path::{unrotate, ParsePathError, Path, State, Step, BACKWARD, FORWARD};
    use crate::search::{Prices, SearchIndex, Winding};
    use crate::step::Heading;
    use crate::unionfind::UnionFind;

    // seeded 5x5 board with three flows
    const FIXTURE: &str = "\\..<v
.\\..\\
..>./
./.<.
/.<>\\
";

    fn path(s: &str) -> Path {
        s.parse().unwrap()
    }

    fn fixture() -> Board {
        Board::from(&FIXTURE.parse::<Grid>().unwrap())
    }

    /// Every structural property a generated board promises.
    fn assert_well_formed(board: &Board, numbers: (usize, usize)) {
        let tubes = board.tubes();
        let dims = tubes.dims();

        assert_eq!(tubes.termini(), 2 * tubes.flows(), "{}", board.solution());
        assert!((numbers.0..=numbers.1).contains(&tubes.numbers()), "{} numbers", tubes.numbers());
        assert!(!has_pair(tubes), "{}", board.solution());
        assert!(!has_triple(tubes), "{}", board.solution());

        for location in tubes.locations() {
            for heading in tubes.tube(location).exits() {
                let neighbor = heading.attempt_from(location);
                assert!(neighbor.within(dims), "{location:?} exits {heading:?} off the board");
                assert!(tubes.tube(neighbor).exits().contains(&heading.invert()), "{location:?} exits {heading:?} into a wall");
                assert_eq!(tubes.affiliation(location), tubes.affiliation(neighbor));
            }
        }
    }

    #[test]
    fn path_text() {
        let p = path("2LR2");
        assert_eq!(p.steps().len(), 4);
        assert_eq!(format!("{}", p), "2LR2");
        assert_eq!("2X".parse::<Path>(), Err(ParsePathError('X')));
        assert!(path("").is_empty());
    }

    #[test]
    fn self_crossing_path() {
        let p = path("LLL2");
        assert_eq!(p.trace(FORWARD), vec![(0, 0), (0, 1), (-1, 1), (-1, 0), (0, 0), (1, 0)]);
        assert!(!p.test());
        assert!(!p.test_loop());
    }

    #[test]
    fn loops() {
        let counterclockwise = path("LLLL");
        assert!(!counterclockwise.test());
        assert!(counterclockwise.test_loop());
        assert_eq!(counterclockwise.winding(), -4);
        assert_eq!(counterclockwise.end_state(), State::START);

        let clockwise = path("RR2RR2");
        assert_eq!(clockwise.winding(), 4);
        assert!(clockwise.test_loop());
        assert_eq!(clockwise.end_state(), State::START);
        assert_eq!(clockwise.trace(FORWARD).len(), 9);

        // open walks are loops too, as long as they avoid themselves
        assert!(path("R2R2RR").test_loop());
        // revisits the start halfway through
        assert!(!path("LLL2").test_loop());

        assert_eq!(path("RRRR").winding(), 4);
        assert!(path("RRRR").test_loop());
    }

    #[test]
    fn end_state() {
        assert_eq!(path("R").end_state(), State { x: 0, y: 1, dx: 1, dy: 0 });
        assert_eq!(path("2").end_state(), State { x: 0, y: 2, dx: 0, dy: 1 });
        assert_eq!(path("2L2L").end_state(), State { x: -3, y: 3, dx: 0, dy: -1 });
        assert_eq!(path("2").join(&path("L")), path("2L"));
    }

    #[test]
    fn single_steps_never_cross() {
        for step in Step::VARIANTS {
            assert!(Path::new(vec![*step]).test());
        }
    }

    #[test]
    fn rotation() {
        assert_eq!(unrotate(1, 2, 0, 1), (1, 2));
        assert_eq!(unrotate(1, 2, 1, 0), (-2, 1));
        assert_eq!(unrotate(1, 2, 0, -1), (-1, -2));
        assert_eq!(unrotate(1, 2, -1, 0), (2, -1));
    }

    #[test]
    #[should_panic]
    fn rotation_needs_axis_heading() {
        unrotate(1, 2, 1, 1);
    }

    #[test]
    fn prepare_small_budgets() {
        let empty = SearchIndex::prepare(Prices::default(), 0);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty.walks().collect::<Vec<_>>(), vec![(Path::default(), State::START)]);

        let walks = SearchIndex::prepare(Prices::default(), 3).walks()
            .map(|(walk, end)| {
                assert_eq!(walk.end_state(), end);
                format!("{}", walk)
            })
            .collect::<Vec<_>>();
        assert_eq!(walks, vec!["", "L", "L2", "R", "R2", "2", "2L", "2R", "22", "222"]);

        assert_eq!(SearchIndex::prepare(Prices::default(), 2).len(), 5);
        assert_eq!(SearchIndex::prepare(Prices::default(), 6).len(), 85);
        assert_eq!(SearchIndex::prepare(Prices::default(), 10).len(), 1261);
    }

    #[test]
    fn lookup_rotates_queries() {
        let index = SearchIndex::prepare(Prices::default(), 6);
        assert!(index.lookup(State::START, path("2R").end_state()).contains(&path("2R")));

        // the same walk, started facing right from elsewhere
        let from = State::new((5, -3), (1, 0));
        let to = State::new((8, -3), (0, -1));
        assert!(index.lookup(from, to).contains(&path("2R")));
        assert!(index.lookup(from, State::new((40, 40), (0, 1))).is_empty());
    }

    #[test]
    fn prepared_walks_avoid_themselves() {
        for (walk, _) in SearchIndex::prepare(Prices::default(), 10).walks() {
            assert!(walk.test(), "{walk}");
        }
    }

    #[test]
    fn random_paths_reach_their_target() {
        let index = SearchIndex::prepare(Prices::default(), 6);
        let mut rng = StdRng::seed_from_u64(11);

        let border = State::new((4, 4), BACKWARD);
        for _ in 0..20 {
            let walk = index.rand_path2(border, &mut rng).unwrap();
            assert!(walk.test(), "{walk}");
            assert_eq!(walk.end_state(), border);
        }

        let target = path("22R22R").end_state();
        for _ in 0..20 {
            let walk = index.rand_path(target, &mut rng).unwrap();
            assert!(walk.test(), "{walk}");
            assert_eq!(walk.end_state(), target);
        }
    }

    #[test]
    fn random_loops_wind_as_asked() {
        let index = SearchIndex::prepare(Prices::default(), 8);
        let mut rng = StdRng::seed_from_u64(5);

        for (winding, expected) in [(Winding::Clockwise, Some(4)), (Winding::Counterclockwise, Some(-4)), (Winding::Any, None)] {
            for _ in 0..10 {
                let walk = index.rand_loop(winding, &mut rng).unwrap();
                assert!(walk.test_loop(), "{walk}");
                assert_eq!(walk.end_state(), State::START);
                if let Some(expected) = expected {
                    assert_eq!(walk.winding(), expected);
                }
            }
        }
    }

    #[test]
    fn sets() {
        let mut sets = UnionFind::with_dims((3, 2));
        assert!(sets.union(Location(0, 0), Location(1, 0)));
        assert!(!sets.union(Location(1, 0), Location(0, 0)));
        assert!(sets.union(Location(1, 0), Location(1, 1)));

        assert!(sets.equiv(Location(0, 0), Location(1, 1)));
        assert!(!sets.equiv(Location(0, 0), Location(2, 1)));
        assert_eq!(sets.find(Location(0, 0)), sets.find(Location(1, 1)));
        assert_eq!(sets.find(Location(2, 1)), Location(2, 1));
    }

    #[test]
    #[should_panic]
    fn sets_are_bounded() {
        UnionFind::with_dims((3, 2)).find(Location(3, 0));
    }

    #[test]
    fn strokes() {
        assert_eq!(Stroke::joining((0, 0), (1, 1), (2, 2)), Stroke::Backslash);
        assert_eq!(Stroke::joining((2, 0), (1, 1), (0, 2)), Stroke::Slash);
        assert_eq!(Stroke::joining((0, 0), (1, 1), (2, 0)), Stroke::Tip(Heading::Down));
        assert_eq!(Stroke::joining((0, 2), (1, 1), (2, 2)), Stroke::Tip(Heading::Up));
        assert_eq!(Stroke::joining((0, 0), (1, 1), (0, 2)), Stroke::Tip(Heading::Right));
        assert_eq!(Stroke::joining((2, 0), (1, 1), (2, 2)), Stroke::Tip(Heading::Left));
    }

    #[test]
    fn draw_open_path() {
        let mut grid = Grid::new(5, 5);
        assert!(grid.test_path(&path("2"), Location(0, 0), FORWARD));
        grid.draw_path(&path("2"), Location(0, 0), FORWARD, false);

        assert_eq!(format!("{}", grid), ".....
.\\...
.....
.....
.....
");
        assert!(!grid.test_path(&path("L"), Location(1, 1), FORWARD));
        assert!(!grid.test_path(&path("2"), Location(4, 4), FORWARD));
        assert!(grid.test_path(&path("2"), Location(0, 2), FORWARD));
    }

    #[test]
    fn draw_loop() {
        let mut grid = Grid::new(5, 5);
        grid.draw_path(&path("RRRR"), Location(2, 0), FORWARD, true);

        assert_eq!(format!("{}", grid), "..^..
.<.>.
..v..
.....
.....
");
        assert_eq!(format!("{}", grid.make_tubes().0), "--x--
-x|x-
--x--
-----
-----
");
        assert!(!grid.test_path(&path("RRRR"), Location(2, 0), FORWARD));
    }

    #[test]
    #[should_panic]
    fn drawing_over_strokes_panics() {
        let mut grid = Grid::new(5, 5);
        grid.draw_path(&path("RRRR"), Location(2, 0), FORWARD, true);
        grid.draw_path(&path("RRRR"), Location(2, 0), FORWARD, true);
    }

    #[test]
    fn clear_inside_loop() {
        let mut grid = Grid::new(5, 5);
        grid.set(Location(2, 1), Stroke::Slash);
        grid.set(Location(4, 4), Stroke::Slash);

        grid.clear_path(&path("RRRR"), Location(2, 0));
        assert_eq!(grid.get(Location(2, 1)), Stroke::Empty);
        assert_eq!(grid.get(Location(4, 4)), Stroke::Slash);

        grid.clear();
        assert_eq!(grid, Grid::new(5, 5));
    }

    #[test]
    fn shrink_samples_odd_cells() {
        let mut grid = Grid::new(9, 7);
        grid.set(Location(3, 1), Stroke::Slash);
        grid.set(Location(2, 2), Stroke::Backslash);

        let board = grid.shrink();
        assert_eq!(board.dims(), (4, 3));
        assert_eq!(format!("{}", board), "./..
....
....
");
    }

    #[test]
    fn grid_text() {
        let grid: Grid = FIXTURE.parse().unwrap();
        assert_eq!(grid.dims(), (5, 5));
        assert_eq!(grid.get(Location(3, 0)), Stroke::Tip(Heading::Left));
        assert_eq!(format!("{}", grid), FIXTURE);

        assert_eq!("".parse::<Grid>(), Err(ParseGridError::Empty));
        assert_eq!("..\n.".parse::<Grid>(), Err(ParseGridError::Ragged { row: 1, expected: 2, found: 1 }));
        assert_eq!(".a".parse::<Grid>(), Err(ParseGridError::UnknownStroke('a')));
    }

    #[test]
    fn fixture_tubes() {
        let (tubes, mut sets) = FIXTURE.parse::<Grid>().unwrap().make_tubes();
        assert_eq!(format!("{}", tubes), "┌--xx
|┌--┘
||x-┐
|└-x|
└-xx┘
");
        assert_eq!(tubes.flows(), 3);
        assert_eq!(tubes.termini(), 6);
        assert_eq!(tubes.numbers(), 3);
        assert_eq!(tubes.affiliation(Location(0, 0)), 1);
        assert_eq!(tubes.affiliation(Location(4, 0)), 2);
        assert_eq!(tubes.affiliation(Location(2, 2)), 3);
        assert_eq!(sets.find(Location(3, 0)), sets.find(Location(2, 4)));

        assert!(!has_loops(&tubes));
        assert!(!has_pair(&tubes));
        assert!(!has_triple(&tubes));
        assert!(is_acceptable(&tubes, (3, 7)));
        assert!(!is_acceptable(&tubes, (4, 7)));
        assert!(!is_acceptable(&tubes, (1, 2)));
    }

    #[test]
    fn rejected_shapes() {
        // unbroken rows are flows without termini
        let (rows, _) = Grid::new(2, 2).make_tubes();
        assert_eq!(rows.flows(), 2);
        assert!(has_loops(&rows));

        let (pair, _) = "v\n^".parse::<Grid>().unwrap().make_tubes();
        assert_eq!(pair.flows(), 1);
        assert!(!has_loops(&pair));
        assert!(has_pair(&pair));
        assert!(!has_triple(&pair));

        // a flow folding back on itself
        let (fold, _) = ">../\n>..\\".parse::<Grid>().unwrap().make_tubes();
        assert_eq!(fold.flows(), 1);
        assert!(has_triple(&fold));
    }

    #[test]
    fn board_display() {
        let board = fixture();
        assert_eq!(format!("{}", board), "...AB
.....
..C..
...B.
..AC.
");
        assert_eq!(format!("{}", board.solution()), "aaaAB
abbbb
abCcc
abbBc
aaACc
");
    }

    #[test]
    fn encodings() {
        let board = fixture();

        let puzzle = board.encode(Encoding::Puzzle);
        assert_eq!((puzzle.width, puzzle.height), (5, 5));
        assert_eq!(puzzle.cells, vec![
            vec![0, 0, 0, 1, 2],
            vec![0, 0, 0, 0, 0],
            vec![0, 0, 3, 0, 0],
            vec![0, 0, 0, 2, 0],
            vec![0, 0, 1, 3, 0],
        ]);

        let mask = board.encode(Encoding::Mask);
        assert_eq!(mask.cells.iter().flatten().filter(|cell| **cell == 0).count(), 6);
        assert!(mask.cells.iter().flatten().all(|cell| *cell <= 1));

        let solution = board.encode(Encoding::Solution);
        assert_eq!(solution.cells[1], vec![1, 2, 2, 2, 2]);

        assert_eq!(board.termini().len(), 3);
        assert_eq!(board.termini()[0].0, 1);

        assert_eq!(serde_json::to_value(&puzzle).unwrap(), serde_json::json!({
            "width": 5,
            "height": 5,
            "cells": [[0, 0, 0, 1, 2], [0, 0, 0, 0, 0], [0, 0, 3, 0, 0], [0, 0, 0, 2, 0], [0, 0, 1, 3, 0]],
        }));
    }

    #[test]
    fn check_solutions() {
        let board = fixture();
        let solution = board.encode(Encoding::Solution).cells;
        assert_eq!(board.check_solution(&solution), Ok(()));

        let mut unfilled = solution.clone();
        unfilled[2][1] = 0;
        assert_eq!(board.check_solution(&unfilled), Err(SolutionError::Unfilled(Location(1, 2))));

        let mut unknown = solution.clone();
        unknown[0][0] = 9;
        assert_eq!(board.check_solution(&unknown), Err(SolutionError::UnknownFlow { location: Location(0, 0), affiliation: 9 }));

        let mut recolored = solution.clone();
        recolored[0][3] = 2;
        assert_eq!(board.check_solution(&recolored), Err(SolutionError::TerminusMismatch { location: Location(3, 0), expected: 1, found: 2 }));

        let mut split = solution.clone();
        split[1][2] = 1;
        assert_eq!(board.check_solution(&split), Err(SolutionError::Disconnected(2)));

        let short = solution[1..].to_vec();
        assert_eq!(board.check_solution(&short), Err(SolutionError::DimensionMismatch { expected: (5, 5), found: (5, 4) }));
    }

    #[test]
    fn default_bounds() {
        assert_eq!(GeneratorConfig::default().number_bounds(), (6, 15));
        assert_eq!(GeneratorConfig::new(5, 5, 1).number_bounds(), (3, 7));
        assert_eq!(GeneratorConfig::new(4, 6, 1).number_bounds(), (3, 7));
        assert_eq!(GeneratorConfig { min_numbers: Some(2), ..GeneratorConfig::new(5, 5, 1) }.number_bounds(), (2, 7));

        assert_eq!(GeneratorConfig::new(4, 4, 1).search_budget(), 6);
        assert_eq!(GeneratorConfig::new(4, 12, 1).search_budget(), 12);
        assert_eq!(GeneratorConfig::new(30, 30, 1).search_budget(), 20);
    }

    #[test]
    fn config_from_json() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"width": 6, "budget": {"loop_tries": 10}}"#).unwrap();
        assert_eq!(config.width, 6);
        assert_eq!(config.height, 10);
        assert_eq!(config.count, 1);
        assert_eq!(config.budget.loop_tries, 10);
        assert_eq!(config.budget.max_passes, RetryBudget::default().max_passes);
    }

    #[test]
    fn narrow_boards_spend_the_border_budget() {
        let config = GeneratorConfig {
            budget: RetryBudget { loop_tries: 1, max_passes: 10_000, max_border_draws: 200 },
            ..GeneratorConfig::new(4, 12, 1)
        };

        let err = generate(&config, &mut StdRng::seed_from_u64(2)).unwrap_err();
        // the last pass may draw its right border past the limit
        assert!(matches!(err, GenerationError::GenerationExhausted { border_draws: 200 | 201, .. }), "{err}");
    }

    #[test]
    fn refuse_bad_configs() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(generate(&GeneratorConfig::new(3, 3, 1), &mut rng).unwrap_err(), GenerationError::InvalidDimensions { width: 3, height: 3 });
        assert_eq!(generate(&GeneratorConfig::new(8, 3, 1), &mut rng).unwrap_err(), GenerationError::InvalidDimensions { width: 8, height: 3 });

        let inverted = GeneratorConfig { min_numbers: Some(5), max_numbers: Some(2), ..GeneratorConfig::new(5, 5, 1) };
        assert_eq!(generate(&inverted, &mut rng).unwrap_err(), GenerationError::InvalidNumberBounds { min: 5, max: 2 });
    }

    #[test]
    fn generate_one() {
        let boards = generate(&GeneratorConfig::new(5, 5, 1), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].dims(), (5, 5));

        let encoded = boards[0].encode(Encoding::Mask);
        assert_eq!(encoded.cells.len(), 5);
        assert!(encoded.cells.iter().all(|row| row.len() == 5 && row.iter().all(|cell| *cell <= 1)));
    }

    #[test]
    fn generated_boards_are_well_formed() {
        for (width, height) in [(4, 4), (5, 5), (6, 6), (8, 5), (4, 6), (7, 7)] {
            let config = GeneratorConfig::new(width, height, 3);
            for seed in 0..3 {
                let boards = generate(&config, &mut StdRng::seed_from_u64(seed)).unwrap();
                assert_eq!(boards.len(), 3);
                for board in &boards {
                    assert_eq!(board.dims(), (width, height));
                    assert_well_formed(board, config.number_bounds());
                }
            }
        }
    }

    #[test]
    fn solutions_round_trip() {
        let boards = generate(&GeneratorConfig::new(6, 6, 4), &mut StdRng::seed_from_u64(21)).unwrap();
        for board in boards {
            let solution = board.encode(Encoding::Solution).cells;
            assert_eq!(board.check_solution(&solution), Ok(()));

            let mut graph: UnGraphMap<Location, ()> = UnGraphMap::new();
            for location in board.tubes().locations() {
                graph.add_node(location);
                for heading in Heading::FORWARD_VARIANTS {
                    let neighbor = heading.attempt_from(location);
                    if neighbor.within(board.dims()) && solution[neighbor.1][neighbor.0] == solution[location.1][location.0] {
                        graph.add_edge(location, neighbor, ());
                    }
                }
            }
            assert_eq!(connected_components(&graph), board.flows());

            let puzzle = board.encode(Encoding::Puzzle).cells;
            for (affiliation, ends) in board.termini() {
                assert_eq!(puzzle[ends.0.1][ends.0.0], affiliation);
                assert_eq!(puzzle[ends.1.1][ends.1.0], affiliation);
            }
        }
    }

    #[test]
    fn seeds_are_reproducible() {
        let config = GeneratorConfig::new(6, 5, 2);
        let first = generate(&config, &mut StdRng::seed_from_u64(99)).unwrap();
        let second = generate(&config, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn infeasible_window_is_exhausted() {
        // more terminus pairs than half the cells
        let config = GeneratorConfig {
            min_numbers: Some(13),
            max_numbers: Some(13),
            budget: RetryBudget { loop_tries: 5, max_passes: 3, max_border_draws: 1_000_000 },
            ..GeneratorConfig::new(5, 5, 1)
        };

        let err = generate(&config, &mut StdRng::seed_from_u64(4)).unwrap_err();
        assert!(matches!(err, GenerationError::GenerationExhausted { passes: 3, .. }), "{err}");
    }

    #[test]
    fn loops_past_the_number_limit_abandon_the_pass() {
        let index = SearchIndex::prepare(Prices::default(), 6);
        let mut grid = Grid::new(11, 11);
        let mut rng = StdRng::seed_from_u64(9);

        // any loop on an empty grid leaves at least one pair of termini
        assert_eq!(insert_loops(&mut grid, (5, 5), &index, (0, 0), LOOP_TRIES, &mut rng), None);

        let (width, height) = grid.dims();
        let strokes = (0..height)
            .flat_map(|y| (0..width).map(move |x| Location(x, y)))
            .filter(|location| grid.get(*location) != Stroke::Empty)
            .count();
        // exactly one loop was drawn before giving up
        assert!((1..=12).contains(&strokes), "{strokes} strokes\n{grid}");
        assert!(grid.shrink().make_tubes().0.numbers() > 0);
    }

    #[test]
    fn index_is_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchIndex>();

        let config = GeneratorConfig::new(6, 6, 2);
        let index = SearchIndex::prepare(Prices::default(), config.search_budget());

        let boards = thread::scope(|scope| {
            let workers = (0..3)
                .map(|seed| {
                    let (index, config) = (&index, &config);
                    scope.spawn(move || generate_with(config, index, &mut StdRng::seed_from_u64(seed)))
                })
                .collect::<Vec<_>>();
            workers.into_iter().map(|worker| worker.join().unwrap().unwrap()).collect::<Vec<_>>()
        });

        assert_eq!(boards.len(), 3);
        for board in boards.iter().flatten() {
            assert_well_formed(board, config.number_bounds());
        }
    }
}
