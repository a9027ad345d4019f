use std::fmt::{Display, Formatter};

use crate::step::Heading;

/// Flow identity of a cell. Non-null affiliation IDs start at 1.
pub type AffiliationID = usize;

/// What is drawn on a cell of a [`Grid`](crate::grid::Grid).
///
/// Drawn paths run diagonally across the grid. A path continuing straight through a cell leaves a [`Slash`](Stroke::Slash)
/// or [`Backslash`](Stroke::Backslash); a path turning 90° leaves a V-shaped [`Tip`](Stroke::Tip) whose point faces the heading named.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Stroke {
    /// Nothing drawn.
    #[default]
    Empty,
    /// `/`
    Slash,
    /// `\`
    Backslash,
    /// A turn, pointing toward the heading.
    Tip(Heading),
}

impl Stroke {
    /// The stroke left on `cur` by a path going from `prev` through `cur` to `next`.
    ///
    /// All three points must be diagonal neighbors along the path; anything else means the path was not self-avoiding or not drawn on the diagonal lattice.
    pub(crate) fn joining(prev: (isize, isize), cur: (isize, isize), next: (isize, isize)) -> Self {
        let a = (prev.0 - cur.0, prev.1 - cur.1);
        let b = (next.0 - cur.0, next.1 - cur.1);
        assert!(
            [a, b].iter().all(|arm| arm.0.abs() == 1 && arm.1.abs() == 1),
            "path points {prev:?} {cur:?} {next:?} are not diagonal neighbors"
        );

        if a == (-b.0, -b.1) {
            // straight through; arms on the main diagonal make a backslash
            if a.0 == a.1 { Self::Backslash } else { Self::Slash }
        } else if a.1 == b.1 {
            // both arms on the same vertical side, so the point faces away from them
            if a.1 < 0 { Self::Tip(Heading::Down) } else { Self::Tip(Heading::Up) }
        } else if a.0 < 0 {
            Self::Tip(Heading::Right)
        } else {
            Self::Tip(Heading::Left)
        }
    }

    /// Whether a vertical scan passing over this stroke moves into the neighboring region.
    ///
    /// Left and right tips only touch the column they sit on.
    pub(crate) fn crosses_column(&self) -> bool {
        matches!(self, Self::Slash | Self::Backslash | Self::Tip(Heading::Up | Heading::Down))
    }

    pub(crate) fn as_char(&self) -> char {
        match self {
            Self::Empty => '.',
            Self::Slash => '/',
            Self::Backslash => '\\',
            Self::Tip(Heading::Up) => '^',
            Self::Tip(Heading::Down) => 'v',
            Self::Tip(Heading::Left) => '<',
            Self::Tip(Heading::Right) => '>',
        }
    }

    pub(crate) fn from_char(c: char) -> Option<Self> {
        Some(match c {
            ' ' | '.' => Self::Empty,
            '/' => Self::Slash,
            '\\' => Self::Backslash,
            '^' => Self::Tip(Heading::Up),
            'v' => Self::Tip(Heading::Down),
            '<' => Self::Tip(Heading::Left),
            '>' => Self::Tip(Heading::Right),
            _ => return None,
        })
    }
}

/// Orientation of the straight tubes filling a region between drawn paths.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub(crate) fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// The shape a cell takes once its drawn stroke is read against the region it sits in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Tube {
    /// `-`
    Horizontal,
    /// `|`
    Vertical,
    /// `┐`
    DownLeft,
    /// `┌`
    DownRight,
    /// `└`
    UpRight,
    /// `┘`
    UpLeft,
    /// A flow end, leaving the cell in the given heading.
    Terminus(Heading),
}

impl Tube {
    /// Read `stroke` against the orientation of the region directly above it in its column.
    pub(crate) fn from_stroke(stroke: Stroke, above: Orientation) -> Self {
        match (stroke, above) {
            (Stroke::Empty, Orientation::Horizontal) => Self::Horizontal,
            (Stroke::Empty, Orientation::Vertical) => Self::Vertical,
            (Stroke::Slash, Orientation::Horizontal) => Self::DownLeft,
            (Stroke::Slash, Orientation::Vertical) => Self::UpRight,
            (Stroke::Backslash, Orientation::Horizontal) => Self::DownRight,
            (Stroke::Backslash, Orientation::Vertical) => Self::UpLeft,
            (Stroke::Tip(heading), _) => Self::Terminus(heading),
        }
    }

    /// Headings through which a flow leaves this cell.
    pub fn exits(&self) -> &'static [Heading] {
        match self {
            Self::Horizontal => &[Heading::Left, Heading::Right],
            Self::Vertical => &[Heading::Up, Heading::Down],
            Self::DownLeft => &[Heading::Down, Heading::Left],
            Self::DownRight => &[Heading::Down, Heading::Right],
            Self::UpRight => &[Heading::Up, Heading::Right],
            Self::UpLeft => &[Heading::Up, Heading::Left],
            Self::Terminus(Heading::Up) => &[Heading::Up],
            Self::Terminus(Heading::Down) => &[Heading::Down],
            Self::Terminus(Heading::Left) => &[Heading::Left],
            Self::Terminus(Heading::Right) => &[Heading::Right],
        }
    }

    /// Whether a flow ends here.
    pub fn is_terminus(&self) -> bool {
        matches!(self, Self::Terminus(_))
    }

    /// Whether this cell lies in an unbroken region, [`Horizontal`](Self::Horizontal) or [`Vertical`](Self::Vertical).
    pub fn is_straight(&self) -> bool {
        matches!(self, Self::Horizontal | Self::Vertical)
    }

    pub(crate) fn as_char(&self) -> char {
        match self {
            Self::Horizontal => '-',
            Self::Vertical => '|',
            Self::DownLeft => '┐',
            Self::DownRight => '┌',
            Self::UpRight => '└',
            Self::UpLeft => '┘',
            Self::Terminus(_) => 'x',
        }
    }
}

impl Display for Tube {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
