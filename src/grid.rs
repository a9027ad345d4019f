//! The double-resolution working grid and the tubes read off it.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
use ndarray::Array2;
use thiserror::Error;

use crate::cell::{AffiliationID, Orientation, Stroke, Tube};
use crate::location::{Coord, Location};
use crate::path::{Offset, Path, Point, FORWARD};
use crate::step::Heading;
use crate::unionfind::UnionFind;

/// The working canvas paths are drawn on.
///
/// A board of `w` by `h` cells is generated on a `2w + 1` by `2h + 1` grid. Board cells sit at odd coordinates `(2x + 1, 2y + 1)`
/// and the even coordinates between them are the joints paths turn around.
/// Paths are walked in their own frame and projected onto the grid rotated by an eighth turn, so a path heading `(0, 1)` runs down and to the right.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grid {
    cells: Array2<Stroke>,
}

impl Grid {
    /// An empty grid `width` columns wide and `height` rows tall.
    pub fn new(width: Coord, height: Coord) -> Self {
        Self { cells: Array2::default((height, width)) }
    }

    /// `(width, height)`
    pub fn dims(&self) -> (Coord, Coord) {
        let (rows, columns) = self.cells.dim();
        (columns, rows)
    }

    /// Erase every stroke.
    pub fn clear(&mut self) {
        self.cells.fill(Stroke::Empty);
    }

    /// The stroke at `location`.
    ///
    /// # Panics
    /// If `location` is off the grid.
    pub fn get(&self, location: Location) -> Stroke {
        self.cells[location.as_index()]
    }

    /// # Panics
    /// If `location` is off the grid.
    pub fn set(&mut self, location: Location, stroke: Stroke) {
        self.cells[location.as_index()] = stroke;
    }

    /// Where the path-frame `point` lands when the path is started from `origin`, whether or not that is on the grid.
    fn project(origin: Location, point: Point) -> (isize, isize) {
        let (px, py) = (point.0 as isize, point.1 as isize);
        (origin.0 as isize - px + py, origin.1 as isize + px + py)
    }

    fn locate(&self, projected: (isize, isize)) -> Option<Location> {
        let x = usize::try_from(projected.0).ok()?;
        let y = usize::try_from(projected.1).ok()?;
        let location = Location(x, y);
        location.within(self.dims()).then_some(location)
    }

    /// Whether `path`, started at `origin` with `heading`, stays on the grid and only visits empty cells.
    pub fn test_path(&self, path: &Path, origin: Location, heading: Offset) -> bool {
        path.trace(heading).into_iter()
            .all(|point| self.locate(Self::project(origin, point)).is_some_and(|location| self.get(location) == Stroke::Empty))
    }

    /// Draw `path`, started at `origin` with `heading`.
    ///
    /// An open path leaves its two end points untouched. A `looped` path must end where it started and is drawn closed, stroking its start as well.
    ///
    /// # Panics
    /// If the path leaves the grid, crosses something already drawn, or is `looped` without returning to its start.
    /// Call [`test_path`](Self::test_path) first.
    pub fn draw_path(&mut self, path: &Path, origin: Location, heading: Offset, looped: bool) {
        let mut points = path.trace(heading).into_iter()
            .map(|point| Self::project(origin, point))
            .collect_vec();
        if looped {
            assert_eq!(points.first(), points.last(), "looped path {path} does not close");
            if let Some(second) = points.get(1).copied() {
                points.push(second);
            }
        }

        for (prev, cur, next) in points.into_iter().tuple_windows() {
            let location = self.locate(cur)
                .unwrap_or_else(|| panic!("path {path} from {origin:?} runs off the grid at {cur:?}"));
            assert_eq!(self.get(location), Stroke::Empty, "path {path} from {origin:?} crosses itself or another path at {location:?}");
            self.set(location, Stroke::joining(prev, cur, next));
        }
    }

    /// Erase everything enclosed by the loop `path` started at `origin` heading [`FORWARD`].
    ///
    /// The loop itself is not drawn.
    pub fn clear_path(&mut self, path: &Path, origin: Location) {
        let (width, height) = self.dims();
        let mut scratch = Grid::new(width, height);
        scratch.draw_path(path, origin, FORWARD, true);

        for ((row, column), tube) in scratch.tubes().indexed_iter() {
            if *tube == Tube::Vertical {
                self.cells[(row, column)] = Stroke::Empty;
            }
        }
    }

    /// Sample the cells at odd coordinates, giving the board this grid was generated for.
    pub fn shrink(&self) -> Grid {
        let (width, height) = self.dims();
        let mut board = Grid::new(width / 2, height / 2);
        for ((row, column), stroke) in board.cells.indexed_iter_mut() {
            *stroke = self.cells[(2 * row + 1, 2 * column + 1)];
        }
        board
    }

    /// Read every cell as a [`Tube`].
    ///
    /// Each column is scanned from the top starting in a horizontal region; any stroke the column crosses flips the orientation of the region below it.
    pub fn tubes(&self) -> Array2<Tube> {
        let mut tubes = Array2::from_elem(self.cells.dim(), Tube::Horizontal);
        for (column, strokes) in self.cells.columns().into_iter().enumerate() {
            let mut above = Orientation::Horizontal;
            for (row, stroke) in strokes.iter().enumerate() {
                tubes[(row, column)] = Tube::from_stroke(*stroke, above);
                if stroke.crosses_column() {
                    above = above.flip();
                }
            }
        }
        tubes
    }

    /// Read every cell as a [`Tube`] and group the cells into flows along tube connections.
    ///
    /// The union-find the flows were grouped with is returned alongside the labelled tubes.
    pub fn make_tubes(&self) -> (TubeGrid, UnionFind) {
        let tubes = self.tubes();
        let dims = self.dims();
        let mut sets = UnionFind::with_dims(dims);

        for (index, tube) in tubes.indexed_iter() {
            let location = Location::from(index);
            for heading in Heading::FORWARD_VARIANTS {
                if !tube.exits().contains(heading) {
                    continue;
                }
                let neighbor = heading.attempt_from(location);
                if neighbor.within(dims) {
                    sets.union(location, neighbor);
                }
            }
        }

        let mut labels: HashMap<Location, AffiliationID> = HashMap::new();
        let mut affiliations = Array2::from_elem(tubes.dim(), 0);
        for (index, affiliation) in affiliations.indexed_iter_mut() {
            let root = sets.find(Location::from(index));
            let next = labels.len() + 1;
            *affiliation = *labels.entry(root).or_insert(next);
        }

        (TubeGrid { tubes, affiliations, flows: labels.len() }, sets)
    }
}

/// One line per row, each ended by a newline.
pub(crate) fn print(chars: Array2<char>) -> String {
    let mut out = String::with_capacity(chars.nrows() * (chars.ncols() + 1));

    for row in chars.rows() {
        for c in row {
            out.push(*c);
        }
        out.push('\n');
    }

    out
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print(self.cells.map(Stroke::as_char)))
    }
}

/// Failure to read a [`Grid`] from its text form.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ParseGridError {
    /// No rows, or an empty first row.
    #[error("grid has no cells")]
    Empty,
    /// A row differs in width from the first.
    #[error("row {row} is {found} cells wide, expected {expected}")]
    Ragged {
        /// Index of the row, from 0.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        found: usize,
    },
    /// A character that names no [`Stroke`].
    #[error("unexpected stroke {0:?}")]
    UnknownStroke(char),
}

impl FromStr for Grid {
    type Err = ParseGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<Stroke>> = s.lines()
            .map(|line| line.chars()
                .map(|c| Stroke::from_char(c).ok_or(ParseGridError::UnknownStroke(c)))
                .collect::<Result<_, _>>())
            .collect::<Result<_, _>>()?;

        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(ParseGridError::Empty);
        }
        if let Some((row, found)) = rows.iter().map(Vec::len).enumerate().find(|(_, len)| *len != width) {
            return Err(ParseGridError::Ragged { row, expected: width, found });
        }

        let mut grid = Grid::new(width, rows.len());
        for (y, row) in rows.into_iter().enumerate() {
            for (x, stroke) in row.into_iter().enumerate() {
                grid.set(Location(x, y), stroke);
            }
        }
        Ok(grid)
    }
}

/// A grid read as tubes, with every cell labelled by the flow it belongs to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TubeGrid {
    tubes: Array2<Tube>,
    affiliations: Array2<AffiliationID>,
    flows: usize,
}

impl TubeGrid {
    /// `(width, height)`
    pub fn dims(&self) -> (Coord, Coord) {
        let (rows, columns) = self.tubes.dim();
        (columns, rows)
    }

    /// # Panics
    /// If `location` is off the grid.
    pub fn tube(&self, location: Location) -> Tube {
        self.tubes[location.as_index()]
    }

    /// Flows are labelled from 1 in row-major order of the first cell found in each.
    pub fn affiliation(&self, location: Location) -> AffiliationID {
        self.affiliations[location.as_index()]
    }

    /// Number of distinct flows.
    pub fn flows(&self) -> usize {
        self.flows
    }

    /// Number of cells a flow ends in.
    pub fn termini(&self) -> usize {
        self.tubes.iter().filter(|tube| tube.is_terminus()).count()
    }

    /// Number of terminus pairs, the count a solver would see as numbers on the puzzle.
    pub fn numbers(&self) -> usize {
        self.termini() / 2
    }

    /// Every location, in row-major order.
    pub fn locations(&self) -> impl Iterator<Item = Location> {
        let (width, height) = self.dims();
        (0..height).cartesian_product(0..width).map(|(y, x)| Location(x, y))
    }
}

impl Display for TubeGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print(self.tubes.map(Tube::as_char)))
    }
}
