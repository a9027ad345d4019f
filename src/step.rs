use strum::VariantArray;

use crate::location::Location;

/// The four axis-aligned headings of a board cell.
///
/// A flow leaves a cell through one of these; a [`Tip`](crate::cell::Stroke::Tip) points in one of these.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Heading {
    /// Toward row 0.
    Up,
    /// Toward the last row.
    Down,
    /// Toward column 0.
    Left,
    /// Toward the last column.
    Right,
}

impl Heading {
    /// The static array of all "forward" headings.
    ///
    /// Stepping in a forward heading moves to a location indexed higher in row-major order.
    /// Unions during tube analysis are only made in these headings, so every adjacency is considered once.
    pub(crate) const FORWARD_VARIANTS: &'static [Self] = &[Self::Right, Self::Down];

    /// Attempt the step from `location` in the heading specified by `self` and return the resultant [`Location`].
    ///
    /// Stepping off the top or left edge wraps around to a huge coordinate, which any bounds check rejects.
    pub(crate) fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }

    #[cfg(test)]
    pub(crate) fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Every in-bounds neighbor of `location` on a grid of `dims`, together with the heading that reaches it.
    pub(crate) fn neighbors_of(location: Location, dims: (usize, usize)) -> impl Iterator<Item = (Self, Location)> {
        Self::VARIANTS.iter()
            .map(move |heading| (*heading, heading.attempt_from(location)))
            .filter(move |(_, neighbor)| neighbor.within(dims))
    }
}
