use thiserror::Error;

use crate::location::{Coord, Location};

/// Smallest board side the generator accepts.
pub const MIN_SIDE: Coord = 4;

/// Why [`generate`](crate::generate) produced no boards.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum GenerationError {
    /// Either side is shorter than [`MIN_SIDE`].
    #[error("a {width}x{height} board is too small, both sides must be at least {MIN_SIDE}")]
    InvalidDimensions {
        /// Requested board width.
        width: Coord,
        /// Requested board height.
        height: Coord,
    },
    /// The fewest numbers allowed exceeds the most.
    #[error("no board can have between {min} and {max} numbers")]
    InvalidNumberBounds {
        /// Fewest numbers asked for.
        min: usize,
        /// Most numbers asked for.
        max: usize,
    },
    /// The [`RetryBudget`](crate::RetryBudget) ran out before a board was accepted.
    #[error("gave up after {passes} passes and {border_draws} border draws")]
    GenerationExhausted {
        /// Pairs of borders drawn.
        passes: usize,
        /// Single border draws, rejected ones included.
        border_draws: usize,
    },
}

/// Why a submitted solution does not solve a [`Board`](crate::Board).
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum SolutionError {
    /// Dimensions are given as `(width, height)`.
    #[error("solution is {found:?} but the board is {expected:?}")]
    DimensionMismatch {
        /// Size of the board.
        expected: (Coord, Coord),
        /// Size of the solution.
        found: (Coord, Coord),
    },
    /// A cell carries the null affiliation.
    #[error("cell {0:?} is not filled")]
    Unfilled(Location),
    /// A cell is labelled above the board's highest affiliation.
    #[error("cell {location:?} belongs to flow {affiliation}, which the board does not have")]
    UnknownFlow {
        /// The offending cell.
        location: Location,
        /// Its label.
        affiliation: usize,
    },
    /// A terminus is labelled with some other flow than its own.
    #[error("terminus {location:?} of flow {expected} is covered by flow {found}")]
    TerminusMismatch {
        /// The covered terminus.
        location: Location,
        /// Flow the terminus belongs to.
        expected: usize,
        /// Flow the solution put there.
        found: usize,
    },
    /// The cells of a flow do not form one connected piece holding both its termini.
    #[error("flow {0} does not connect its termini in a single path")]
    Disconnected(usize),
}
