//! Walks on the square lattice and the states they move through.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
use strum::VariantArray;
use thiserror::Error;

/// A point in the frame a [`Path`] is walked in.
pub type Point = (i32, i32);
/// A unit heading `(dx, dy)` in the frame a [`Path`] is walked in.
pub type Offset = (i32, i32);

/// The heading every path starts with unless drawn otherwise.
pub const FORWARD: Offset = (0, 1);
/// [`FORWARD`], rotated by half a turn.
pub const BACKWARD: Offset = (0, -1);

/// One move of a walk.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, VariantArray)]
pub enum Step {
    /// Advance two units without rotating.
    Straight,
    /// Advance one unit, then rotate the heading a quarter turn counter-clockwise.
    Left,
    /// Advance one unit, then rotate the heading a quarter turn clockwise.
    Right,
}

impl Step {
    fn as_char(&self) -> char {
        match self {
            Self::Straight => '2',
            Self::Left => 'L',
            Self::Right => 'R',
        }
    }
}

/// Position and heading of a walk.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct State {
    /// Position, along `x`.
    pub x: i32,
    /// Position, along `y`.
    pub y: i32,
    /// Heading, along `x`.
    pub dx: i32,
    /// Heading, along `y`.
    pub dy: i32,
}

impl State {
    /// The canonical start every stored walk begins at.
    pub const START: Self = Self { x: 0, y: 0, dx: 0, dy: 1 };

    /// A walk at `position` about to move along `heading`.
    pub fn new(position: Point, heading: Offset) -> Self {
        Self { x: position.0, y: position.1, dx: heading.0, dy: heading.1 }
    }

    /// `(x, y)`
    #[inline]
    pub fn position(&self) -> Point {
        (self.x, self.y)
    }

    /// `(dx, dy)`
    #[inline]
    pub fn heading(&self) -> Offset {
        (self.dx, self.dy)
    }

    #[inline]
    pub(crate) fn advance(self) -> Self {
        Self { x: self.x + self.dx, y: self.y + self.dy, ..self }
    }

    #[inline]
    pub(crate) fn turn_left(self) -> Self {
        Self { dx: -self.dy, dy: self.dx, ..self }
    }

    #[inline]
    pub(crate) fn turn_right(self) -> Self {
        Self { dx: self.dy, dy: -self.dx, ..self }
    }

    /// Take `step`, pushing every point it visits onto `visited`.
    pub(crate) fn apply(self, step: Step, visited: &mut Vec<Point>) -> Self {
        let moved = self.advance();
        visited.push(moved.position());
        match step {
            Step::Left => moved.turn_left(),
            Step::Right => moved.turn_right(),
            Step::Straight => {
                let moved = moved.advance();
                visited.push(moved.position());
                moved
            }
        }
    }
}

/// Rotate the vector `(x, y)` by quarter turns until the reference heading `(dx, dy)` becomes `(0, 1)`.
///
/// # Panics
/// If `(dx, dy)` is not a unit axis heading, since no number of quarter turns can then reach `(0, 1)`.
pub fn unrotate(x: i32, y: i32, dx: i32, dy: i32) -> Point {
    let (mut x, mut y, mut dx, mut dy) = (x, y, dx, dy);
    for _ in 0..4 {
        if (dx, dy) == FORWARD {
            return (x, y);
        }
        (x, y, dx, dy) = (-y, x, -dy, dx);
    }

    panic!("reference heading {:?} is not a unit axis heading", (dx, dy))
}

/// A walk made of [`Step`]s, relative to wherever and however it is started.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// The walk taking `steps` in order.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// The steps, in walking order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps, not points visited.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether this walk stays at the origin.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// This path followed by `suffix`.
    pub fn join(&self, suffix: &Path) -> Self {
        Self::new(self.steps.iter().chain(suffix.steps.iter()).copied().collect_vec())
    }

    /// Every point visited when walking from the origin with initial `heading`, the origin included.
    pub fn trace(&self, heading: Offset) -> Vec<Point> {
        let mut visited = Vec::with_capacity(2 * self.steps.len() + 1);
        visited.push((0, 0));
        self.steps.iter()
            .fold(State::new((0, 0), heading), |state, step| state.apply(*step, &mut visited));
        visited
    }

    /// The state after walking this path from [`State::START`].
    pub fn end_state(&self) -> State {
        let mut visited = Vec::new();
        self.steps.iter().fold(State::START, |state, step| state.apply(*step, &mut visited))
    }

    /// Whether no point is visited twice.
    pub fn test(&self) -> bool {
        let trace = self.trace(FORWARD);
        trace.iter().all_unique()
    }

    /// Whether no point is visited twice, except that the walk may end where it started.
    pub fn test_loop(&self) -> bool {
        let trace = self.trace(FORWARD);
        let distinct: HashSet<&Point> = trace.iter().collect();
        distinct.len() == trace.len()
            || (distinct.len() + 1 == trace.len() && trace.first() == trace.last())
    }

    /// Right turns minus left turns; `4` for a simple clockwise loop and `-4` for a counter-clockwise one.
    pub fn winding(&self) -> i32 {
        self.steps.iter()
            .map(|step| match step {
                Step::Right => 1,
                Step::Left => -1,
                Step::Straight => 0,
            })
            .sum()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.steps.iter().map(Step::as_char).collect::<String>())
    }
}

/// A character other than `2`, `L` or `R` appeared in a path.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
#[error("unexpected step {0:?} in path")]
pub struct ParsePathError(pub char);

impl FromStr for Path {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '2' => Ok(Step::Straight),
                'L' => Ok(Step::Left),
                'R' => Ok(Step::Right),
                other => Err(ParsePathError(other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}
