use petgraph::unionfind::UnionFind as IndexUnionFind;

use crate::location::{Coord, Location};

/// Disjoint sets of grid [`Location`]s.
///
/// Backed by [`petgraph`]'s index-based union-find over the row-major index of each location.
/// Representatives are chosen by rank, so a fixed sequence of unions always yields the same representatives.
#[derive(Clone, Debug)]
pub struct UnionFind {
    // width, height
    dims: (Coord, Coord),
    sets: IndexUnionFind<usize>,
}

impl UnionFind {
    /// Every location of a grid of `dims` (in `(x, y)` order) in its own set.
    pub fn with_dims(dims: (Coord, Coord)) -> Self {
        Self {
            dims,
            sets: IndexUnionFind::new(dims.0 * dims.1),
        }
    }

    #[inline]
    fn index_of(&self, location: Location) -> usize {
        assert!(location.within(self.dims), "{location:?} is outside a {:?} union-find", self.dims);
        location.1 * self.dims.0 + location.0
    }

    #[inline]
    fn location_of(&self, index: usize) -> Location {
        Location(index % self.dims.0, index / self.dims.0)
    }

    /// The representative of the set containing `location`, compressing the path to it.
    pub fn find(&mut self, location: Location) -> Location {
        let index = self.index_of(location);
        let root = self.sets.find_mut(index);
        self.location_of(root)
    }

    /// Merge the sets containing `a` and `b`. Returns `false` if they were already one set.
    pub fn union(&mut self, a: Location, b: Location) -> bool {
        let (a, b) = (self.index_of(a), self.index_of(b));
        self.sets.union(a, b)
    }

    /// Whether `a` and `b` are in the same set.
    pub fn equiv(&self, a: Location, b: Location) -> bool {
        self.sets.equiv(self.index_of(a), self.index_of(b))
    }
}
