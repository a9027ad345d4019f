use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::algo::connected_components;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use unordered_pair::UnorderedPair;

use crate::cell::AffiliationID;
use crate::error::SolutionError;
use crate::grid::{print, Grid, TubeGrid};
use crate::location::{Coord, Location};
use crate::step::Heading;

// index 0 is the null affiliation
const AFFILIATION_DISPLAYS: &[char] = &[
    '.', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w',
    'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

fn display_of(affiliation: AffiliationID) -> char {
    AFFILIATION_DISPLAYS.get(affiliation).copied().unwrap_or('?')
}

/// How [`Board::encode`] writes each cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// `0` on termini, `1` on every other cell.
    Mask,
    /// The flow of each terminus, `0` on every other cell.
    Puzzle,
    /// The flow of every cell.
    Solution,
}

/// A board as a matrix of small integers, `height` rows of `width` cells each.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EncodedBoard {
    /// Cells per row.
    pub width: Coord,
    /// Number of rows.
    pub height: Coord,
    /// Row-major, one `Vec` per row.
    pub cells: Vec<Vec<usize>>,
}

/// A generated puzzle together with the solution it was generated from.
///
/// Flows are numbered from 1 in row-major order of their first cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    tubes: TubeGrid,
}

impl From<&Grid> for Board {
    /// Read a board-resolution [`Grid`], such as one [`shrink`](Grid::shrink) produced.
    fn from(grid: &Grid) -> Self {
        let (tubes, _) = grid.make_tubes();
        Self { tubes }
    }
}

impl Board {
    /// `(width, height)`
    pub fn dims(&self) -> (Coord, Coord) {
        self.tubes.dims()
    }

    /// The solved board, cell by cell.
    pub fn tubes(&self) -> &TubeGrid {
        &self.tubes
    }

    /// Number of flows, which is also the highest affiliation on the board.
    pub fn flows(&self) -> usize {
        self.tubes.flows()
    }

    /// Write every cell as a small integer, as `encoding` says.
    pub fn encode(&self, encoding: Encoding) -> EncodedBoard {
        let cells = self.cells().map(|&(location, affiliation)| {
            let terminus = self.tubes.tube(location).is_terminus();
            match encoding {
                Encoding::Mask => usize::from(!terminus),
                Encoding::Puzzle if terminus => affiliation,
                Encoding::Puzzle => 0,
                Encoding::Solution => affiliation,
            }
        });

        let (width, height) = self.dims();
        EncodedBoard { width, height, cells: cells.rows().into_iter().map(|row| row.to_vec()).collect() }
    }

    fn cells(&self) -> Array2<(Location, AffiliationID)> {
        let (width, height) = self.dims();
        Array2::from_shape_fn((height, width), |index| {
            let location = Location::from(index);
            (location, self.tubes.affiliation(location))
        })
    }

    /// The two termini of every flow, ordered by affiliation.
    pub fn termini(&self) -> Vec<(AffiliationID, UnorderedPair<Location>)> {
        let mut ends: BTreeMap<AffiliationID, Vec<Location>> = BTreeMap::new();
        for location in self.tubes.locations().filter(|location| self.tubes.tube(*location).is_terminus()) {
            ends.entry(self.tubes.affiliation(location)).or_default().push(location);
        }

        ends.into_iter()
            .filter_map(|(affiliation, locations)| match locations[..] {
                [a, b] => Some((affiliation, UnorderedPair::from((a, b)))),
                _ => None,
            })
            .collect()
    }

    /// Check that `solution`, rows of flow labels, fills this board and joins every pair of termini with one connected flow.
    ///
    /// Any solution doing so is accepted, not only the one the board was generated from.
    pub fn check_solution(&self, solution: &[Vec<usize>]) -> Result<(), SolutionError> {
        let (width, height) = self.dims();
        let found = (solution.first().map(Vec::len).unwrap_or(0), solution.len());
        if found.1 != height || solution.iter().any(|row| row.len() != width) {
            return Err(SolutionError::DimensionMismatch { expected: (width, height), found });
        }

        let label = |location: Location| solution[location.1][location.0];
        let mut graph: UnGraphMap<Location, ()> = UnGraphMap::with_capacity(width * height, 2 * width * height);
        for location in self.tubes.locations() {
            let affiliation = label(location);
            if affiliation == 0 {
                return Err(SolutionError::Unfilled(location));
            }
            if affiliation > self.flows() {
                return Err(SolutionError::UnknownFlow { location, affiliation });
            }
            if self.tubes.tube(location).is_terminus() && affiliation != self.tubes.affiliation(location) {
                return Err(SolutionError::TerminusMismatch { location, expected: self.tubes.affiliation(location), found: affiliation });
            }

            graph.add_node(location);
            for heading in Heading::FORWARD_VARIANTS {
                let neighbor = heading.attempt_from(location);
                if neighbor.within((width, height)) && label(neighbor) == affiliation {
                    graph.add_edge(location, neighbor, ());
                }
            }
        }

        if connected_components(&graph) == self.flows() {
            return Ok(());
        }

        // some flow is split, find which
        for (affiliation, UnorderedPair(start, end)) in self.termini() {
            let mut dfs = Dfs::new(&graph, start);
            let mut reached = 0;
            let mut joined = false;
            while let Some(location) = dfs.next(&graph) {
                reached += 1;
                joined |= location == end;
            }

            let cells = self.tubes.locations().filter(|location| label(*location) == affiliation).count();
            if !joined || reached != cells {
                return Err(SolutionError::Disconnected(affiliation));
            }
        }

        Ok(())
    }

    /// Every cell lettered by its flow, termini in uppercase.
    pub fn solution(&self) -> impl Display + '_ {
        SolutionDisplay(self)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print(self.cells().map(|&(location, affiliation)| {
            if self.tubes.tube(location).is_terminus() {
                display_of(affiliation).to_ascii_uppercase()
            } else {
                '.'
            }
        })))
    }
}

struct SolutionDisplay<'a>(&'a Board);

impl Display for SolutionDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tubes = &self.0.tubes;
        write!(f, "{}", print(self.0.cells().map(|&(location, affiliation)| {
            if tubes.tube(location).is_terminus() {
                display_of(affiliation).to_ascii_uppercase()
            } else {
                display_of(affiliation).to_ascii_lowercase()
            }
        })))
    }
}
