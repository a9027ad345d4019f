use rand::Rng;
use tracing::{debug, trace, warn};

use crate::board::Board;
use crate::cell::{Stroke, Tube};
use crate::config::{GeneratorConfig, RetryBudget};
use crate::error::GenerationError;
use crate::grid::{Grid, TubeGrid};
use crate::location::{Coord, Location};
use crate::path::{State, BACKWARD, FORWARD};
use crate::search::{Prices, SearchIndex, Winding};
use crate::step::Heading;

/// Loop insertions attempted on one pair of borders unless a [`RetryBudget`] says otherwise.
pub const LOOP_TRIES: usize = 1000;

/// Whether some flow closes on itself instead of joining two termini.
pub(crate) fn has_loops(tubes: &TubeGrid) -> bool {
    tubes.termini() != 2 * tubes.flows()
}

/// Whether the two termini of some flow are neighbors, making the flow trivial.
pub(crate) fn has_pair(tubes: &TubeGrid) -> bool {
    let dims = tubes.dims();
    tubes.locations()
        .filter(|location| tubes.tube(*location).is_terminus())
        .any(|location| Heading::FORWARD_VARIANTS.iter()
            .map(|heading| heading.attempt_from(location))
            .filter(|neighbor| neighbor.within(dims))
            .any(|neighbor| tubes.tube(neighbor).is_terminus() && tubes.affiliation(neighbor) == tubes.affiliation(location)))
}

/// Whether some cell touches three or more cells of its own flow, so the flow branches or doubles back beside itself.
pub(crate) fn has_triple(tubes: &TubeGrid) -> bool {
    let dims = tubes.dims();
    tubes.locations().any(|location| {
        let affiliation = tubes.affiliation(location);
        Heading::neighbors_of(location, dims)
            .filter(|(_, neighbor)| tubes.affiliation(*neighbor) == affiliation)
            .count() >= 3
    })
}

/// Whether a board whose tubes are `tubes` is a puzzle worth handing out, with `numbers` giving the inclusive bounds on its terminus pairs.
pub fn is_acceptable(tubes: &TubeGrid, numbers: (usize, usize)) -> bool {
    let (min, max) = numbers;
    (min..=max).contains(&tubes.numbers())
        && !has_loops(tubes)
        && !has_pair(tubes)
        && !has_triple(tubes)
}

#[derive(Clone, Copy, Debug, Default)]
struct Attempts {
    passes: usize,
    border_draws: usize,
}

impl Attempts {
    fn exceed(&self, budget: &RetryBudget) -> bool {
        self.passes >= budget.max_passes || self.border_draws >= budget.max_border_draws
    }
}

/// Draw a random border path down the left edge and another up the right, then insert random loops between them until the board is acceptable.
///
/// Returns the accepted board at board resolution.
pub fn make<R: Rng>(
    width: Coord,
    height: Coord,
    index: &SearchIndex,
    numbers: (usize, usize),
    budget: &RetryBudget,
    rng: &mut R,
) -> Result<Grid, GenerationError> {
    let (right, bottom) = (2 * width, 2 * height);
    // from either corner, a border ends a full board height away along both path axes, turned back on itself
    let target = State::new((height as i32, height as i32), BACKWARD);

    let mut grid = Grid::new(right + 1, bottom + 1);
    let mut attempts = Attempts::default();

    loop {
        if attempts.exceed(budget) {
            warn!(width, height, passes = attempts.passes, border_draws = attempts.border_draws, "generation exhausted");
            return Err(GenerationError::GenerationExhausted { passes: attempts.passes, border_draws: attempts.border_draws });
        }

        grid.clear();

        attempts.border_draws += 1;
        let Some(left_border) = index.rand_path2(target, rng) else { continue };
        if !grid.test_path(&left_border, Location(0, 0), FORWARD) {
            continue;
        }
        grid.draw_path(&left_border, Location(0, 0), FORWARD, false);
        grid.set(Location(0, 0), Stroke::Backslash);
        grid.set(Location(0, bottom), Stroke::Slash);

        attempts.border_draws += 1;
        let Some(right_border) = index.rand_path2(target, rng) else { continue };
        if !grid.test_path(&right_border, Location(right, bottom), BACKWARD) {
            continue;
        }
        grid.draw_path(&right_border, Location(right, bottom), BACKWARD, false);
        grid.set(Location(right, 0), Stroke::Slash);
        grid.set(Location(right, bottom), Stroke::Backslash);

        attempts.passes += 1;

        let board = grid.shrink();
        let (tubes, _) = board.make_tubes();
        let accepted = if is_acceptable(&tubes, numbers) {
            Some(board)
        } else {
            insert_loops(&mut grid, (width, height), index, numbers, budget.loop_tries, rng)
        };

        if let Some(board) = accepted {
            debug!(width, height, passes = attempts.passes, border_draws = attempts.border_draws, "generated board");
            return Ok(board);
        }

        trace!(pass = attempts.passes, "discarding working grid\n{grid}");
    }
}

/// Repeatedly carve a random loop into a straight region of `grid`, returning the board as soon as it is acceptable.
///
/// Gives up once `loop_tries` insertions have been attempted or the board has grown more numbers than allowed.
pub(crate) fn insert_loops<R: Rng>(
    grid: &mut Grid,
    board_dims: (Coord, Coord),
    index: &SearchIndex,
    numbers: (usize, usize),
    loop_tries: usize,
    rng: &mut R,
) -> Option<Grid> {
    let mut tubes = grid.tubes();

    for _ in 0..loop_tries {
        let origin = Location(2 * rng.random_range(0..board_dims.0), 2 * rng.random_range(0..board_dims.1));
        let winding = match tubes[origin.as_index()] {
            Tube::Horizontal => Winding::Clockwise,
            Tube::Vertical => Winding::Counterclockwise,
            _ => continue,
        };

        let Some(looped) = index.rand_loop(winding, rng) else { continue };
        if !grid.test_path(&looped, origin, FORWARD) {
            continue;
        }

        grid.clear_path(&looped, origin);
        grid.draw_path(&looped, origin, FORWARD, true);
        tubes = grid.tubes();

        let board = grid.shrink();
        let (board_tubes, _) = board.make_tubes();
        if board_tubes.numbers() > numbers.1 {
            return None;
        }
        if is_acceptable(&board_tubes, numbers) {
            return Some(board);
        }
    }

    None
}

/// Generate `config.count` boards, preparing a search index suited to their size first.
pub fn generate<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Result<Vec<Board>, GenerationError> {
    config.validate()?;

    let budget = config.search_budget();
    debug!(budget, "preparing search index");
    let index = SearchIndex::prepare(Prices::default(), budget);
    debug!(states = index.len(), "search index ready");

    generate_with(config, &index, rng)
}

/// Generate `config.count` boards using an already prepared `index`.
pub fn generate_with<R: Rng>(config: &GeneratorConfig, index: &SearchIndex, rng: &mut R) -> Result<Vec<Board>, GenerationError> {
    config.validate()?;
    let numbers = config.number_bounds();

    (0..config.count)
        .map(|_| make(config.width, config.height, index, numbers, &config.budget, rng).map(|grid| Board::from(&grid)))
        .collect()
}
