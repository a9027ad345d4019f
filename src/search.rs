//! Meet-in-the-middle search for long random self-avoiding walks.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::path::{unrotate, Path, Point, State, Step};

/// Number of random restarts tried by each of the random path routines before giving up.
pub const MAX_DRAWS: usize = 100_000;

type NodeId = u32;

/// Costs charged against the search budget per step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Prices {
    /// Cost of a [`Left`](Step::Left) or [`Right`](Step::Right) step.
    pub lr: u32,
    /// Cost of a [`Straight`](Step::Straight) step.
    pub t: u32,
}

impl Default for Prices {
    fn default() -> Self {
        Self { lr: 2, t: 1 }
    }
}

/// Direction a random loop must wind in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Winding {
    /// Either way round.
    Any,
    /// Four more right turns than left.
    Clockwise,
    /// Four more left turns than right.
    Counterclockwise,
}

impl Winding {
    fn accepts(&self, winding: i32) -> bool {
        match self {
            Self::Any => true,
            Self::Clockwise => winding == 4,
            Self::Counterclockwise => winding == -4,
        }
    }
}

/// A search tree node: the walk reaching it is its parent's walk plus `via`.
#[derive(Clone, Copy, Debug)]
struct Node {
    via: Option<(NodeId, Step)>,
    end: State,
}

/// Branch being expanded during [`SearchIndex::prepare`].
struct Frame {
    node: NodeId,
    budget: u32,
    // next child to try: 0 = left, 1 = right, 2 = straight
    next: u8,
    // points this branch added to the visited trace
    pushed: usize,
}

/// The meet-in-the-middle index: every cheap self-avoiding walk from [`State::START`], and the inverse map from where a walk ends to the walks ending there.
///
/// Random long walks are assembled by taking a cheap random prefix and asking the index for a stored suffix closing the gap to the target.
/// Because every stored walk starts heading `(0, 1)`, a query rotates itself into that frame first, so the same table answers queries arriving from any of the four headings.
///
/// The index is never mutated once prepared and may be shared freely between threads.
#[derive(Debug)]
pub struct SearchIndex {
    prices: Prices,
    nodes: Vec<Node>,
    inverse: HashMap<State, Vec<NodeId>>,
}

impl SearchIndex {
    /// Enumerate, depth first, every self-avoiding walk from [`State::START`] whose cost is at most `budget`.
    ///
    /// Walks are recorded in pre-order, trying left, right, then straight at each node.
    /// A straight step is only taken if neither of the two cells it passes has been visited on the current branch.
    pub fn prepare(prices: Prices, budget: u32) -> Self {
        let mut nodes = vec![Node { via: None, end: State::START }];
        let mut visited: Vec<Point> = vec![State::START.position()];
        let mut stack = vec![Frame { node: 0, budget, next: 0, pushed: 1 }];

        while let Some(frame) = stack.last_mut() {
            let branch = frame.next;
            frame.next += 1;
            let (parent, budget) = (frame.node, frame.budget);
            let here = nodes[parent as usize].end;

            let child = match branch {
                0 | 1 if budget >= prices.lr => {
                    let moved = here.advance();
                    (!visited.contains(&moved.position())).then(|| {
                        let (step, end) = if branch == 0 {
                            (Step::Left, moved.turn_left())
                        } else {
                            (Step::Right, moved.turn_right())
                        };
                        (step, end, vec![moved.position()], prices.lr)
                    })
                }
                2 if budget >= prices.t => {
                    let through = here.advance();
                    let end = through.advance();
                    (!visited.contains(&through.position()) && !visited.contains(&end.position()))
                        .then(|| (Step::Straight, end, vec![through.position(), end.position()], prices.t))
                }
                0..=2 => None,
                _ => {
                    let pushed = frame.pushed;
                    visited.truncate(visited.len() - pushed);
                    stack.pop();
                    continue;
                }
            };

            if let Some((step, end, points, cost)) = child {
                let node = nodes.len() as NodeId;
                nodes.push(Node { via: Some((parent, step)), end });
                stack.push(Frame { node, budget: budget - cost, next: 0, pushed: points.len() });
                visited.extend(points);
            }
        }

        let mut inverse: HashMap<State, Vec<NodeId>> = HashMap::new();
        for (id, node) in nodes.iter().enumerate() {
            inverse.entry(node.end).or_default().push(id as NodeId);
        }

        Self { prices, nodes, inverse }
    }

    /// Number of stored walks.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true, the empty walk is always stored.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Prices the index was prepared with.
    pub fn prices(&self) -> Prices {
        self.prices
    }

    /// Every stored walk with the state it ends in, in the order they were discovered.
    pub fn walks(&self) -> impl Iterator<Item = (Path, State)> + '_ {
        (0..self.nodes.len()).map(|id| (self.path_of(id as NodeId), self.nodes[id].end))
    }

    fn path_of(&self, id: NodeId) -> Path {
        let mut steps = Vec::new();
        let mut cursor = id;
        while let Some((parent, step)) = self.nodes[cursor as usize].via {
            steps.push(step);
            cursor = parent;
        }
        steps.reverse();
        Path::new(steps)
    }

    fn suffixes(&self, from: State, to: State) -> &[NodeId] {
        let (x, y) = unrotate(to.x - from.x, to.y - from.y, from.dx, from.dy);
        let (dx, dy) = unrotate(to.dx, to.dy, from.dx, from.dy);
        self.inverse.get(&State { x, y, dx, dy })
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Stored walks that, started at `from`, end exactly at `to`.
    pub fn lookup(&self, from: State, to: State) -> Vec<Path> {
        self.suffixes(from, to).iter().map(|id| self.path_of(*id)).collect()
    }

    fn random_suffix<R: Rng>(&self, from: State, to: State, rng: &mut R) -> Option<Path> {
        let suffixes = self.suffixes(from, to);
        if suffixes.is_empty() {
            return None;
        }
        Some(self.path_of(suffixes[rng.random_range(0..suffixes.len())]))
    }

    fn random_node<R: Rng>(&self, rng: &mut R) -> NodeId {
        rng.random_range(0..self.nodes.len()) as NodeId
    }

    fn random_step<R: Rng>(&self, rng: &mut R) -> Step {
        // weights 1/lr : 1/lr : 2/t, scaled by lr * t
        let (lr, t) = (self.prices.lr, self.prices.t);
        let pick = rng.random_range(0..2 * t + 2 * lr);
        if pick < t {
            Step::Left
        } else if pick < 2 * t {
            Step::Right
        } else {
            Step::Straight
        }
    }

    /// A self-avoiding walk from [`State::START`] to `target`, joining a random stored prefix with a stored suffix.
    pub fn rand_path<R: Rng>(&self, target: State, rng: &mut R) -> Option<Path> {
        for _ in 0..MAX_DRAWS {
            let prefix = self.random_node(rng);
            let Some(suffix) = self.random_suffix(self.nodes[prefix as usize].end, target, rng) else {
                continue;
            };

            let joined = self.path_of(prefix).join(&suffix);
            if joined.test() {
                return Some(joined);
            }
        }

        None
    }

    /// A self-avoiding walk from [`State::START`] to `target`, grown one random step at a time until a stored suffix can finish it.
    ///
    /// A walk that runs into itself, or grows past `2 * (|x| + |y|)` steps of the target, is thrown away and restarted.
    pub fn rand_path2<R: Rng>(&self, target: State, rng: &mut R) -> Option<Path> {
        let cap = 2 * (target.x.unsigned_abs() + target.y.unsigned_abs()) as usize;
        let mut seen: HashSet<Point> = HashSet::with_capacity(2 * cap + 1);
        let mut steps = Vec::with_capacity(cap);
        let mut moved = Vec::with_capacity(2);

        for _ in 0..MAX_DRAWS {
            seen.clear();
            steps.clear();
            let mut state = State::START;
            seen.insert(state.position());

            'walk: for _ in 0..cap {
                let step = self.random_step(rng);
                steps.push(step);
                moved.clear();
                state = state.apply(step, &mut moved);
                for point in &moved {
                    if !seen.insert(*point) {
                        break 'walk;
                    }
                }

                if state == target {
                    return Some(Path::new(steps));
                }

                if let Some(suffix) = self.random_suffix(state, target, rng) {
                    let joined = Path::new(steps.clone()).join(&suffix);
                    if joined.test() {
                        return Some(joined);
                    }
                }
            }
        }

        None
    }

    /// A simple loop leaving [`State::START`] and coming back to it, heading `(0, 1)` again, wound as `winding` asks.
    pub fn rand_loop<R: Rng>(&self, winding: Winding, rng: &mut R) -> Option<Path> {
        for _ in 0..MAX_DRAWS {
            let prefix = self.random_node(rng);
            let Some(suffix) = self.random_suffix(self.nodes[prefix as usize].end, State::START, rng) else {
                continue;
            };

            let joined = self.path_of(prefix).join(&suffix);
            if winding.accepts(joined.winding()) && joined.test_loop() {
                return Some(joined);
            }
        }

        None
    }
}
