#![warn(missing_docs)]

//! # `flowgen`
//!
//! A generator for [Numberlink](https://en.wikipedia.org/wiki/Numberlink) puzzles as posited in the mobile game Flow Free.
//! Call [`generate`] with a [`GeneratorConfig`] and a random number generator, then [`encode`](Board::encode) or print the [`Board`]s it yields.
//! Every board comes with its solution: one flow per pair of termini, covering the whole board.
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let config = flowgen::GeneratorConfig::new(6, 6, 1);
//! let boards = flowgen::generate(&config, &mut StdRng::seed_from_u64(7)).unwrap();
//! println!("{}", boards[0]);
//! println!("{}", boards[0].solution());
//! ```
//!
//! # Internals
//! Boards are drawn on a working [`Grid`] of twice the resolution, rotated so that paths run along its diagonals.
//! Two random border paths, one down each side, split the board into regions; every region is then read as straight tubes of one orientation,
//! alternating across each drawn path, and each point where a drawn path turns becomes the end of a flow.
//! Random closed loops are carved into the board until the flows it holds satisfy every acceptance rule, or the attempt is abandoned.
//!
//! Long random self-avoiding walks are found by meeting in the middle.
//! A [`SearchIndex`] is prepared once with every cheap walk from a canonical start, keyed by where it ends.
//! A walk to any target is then a cheap random prefix joined with a stored suffix that happens to close the gap.
//! The index is read only once prepared, so one index can serve many generation calls on many threads through [`generate_with`].

pub use board::{Board, EncodedBoard, Encoding};
pub use cell::{AffiliationID, Stroke, Tube};
pub use config::{GeneratorConfig, RetryBudget};
pub use error::{GenerationError, SolutionError, MIN_SIDE};
pub use generator::{generate, generate_with, is_acceptable, make, LOOP_TRIES};
pub use grid::{Grid, ParseGridError, TubeGrid};
pub use location::Location;
pub use path::{ParsePathError, Path, State, Step};
pub use search::{Prices, SearchIndex, Winding, MAX_DRAWS};
pub use step::Heading;
pub use unionfind::UnionFind;

pub(crate) mod board;
mod tests;
pub(crate) mod cell;
pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod generator;
pub mod grid;
pub(crate) mod location;
pub mod path;
pub mod search;
pub(crate) mod step;
pub(crate) mod unionfind;
#[cfg(feature = "wasm")]
pub mod wasm;
