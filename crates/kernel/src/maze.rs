use std::collections::VecDeque;

use mazerun_common::{Direction, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Largest supported side length. Keeps `size * size` cell buffers sane.
pub const MAX_MAZE_SIZE: usize = 1024;

/// Errors from maze construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("maze size must be in 1..={max}, got {0}", max = MAX_MAZE_SIZE)]
    InvalidSize(usize),
}

/// One grid cell: a wall flag per side. `true` means the wall is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Cell {
    /// A cell with all four walls standing.
    pub const WALLED: Self = Self {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub fn has_wall(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.top,
            Direction::Right => self.right,
            Direction::Down => self.bottom,
            Direction::Left => self.left,
        }
    }

    fn clear_wall(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.top = false,
            Direction::Right => self.right = false,
            Direction::Down => self.bottom = false,
            Direction::Left => self.left = false,
        }
    }

    /// Number of open sides.
    pub fn openings(&self) -> usize {
        Direction::ALL
            .into_iter()
            .filter(|&d| !self.has_wall(d))
            .count()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::WALLED
    }
}

/// A square perfect maze: every pair of cells is joined by exactly one path.
///
/// Cells are stored row-major. The grid never changes after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    size: usize,
    cells: Vec<Cell>,
}

impl Maze {
    /// Carve a maze with a randomized depth-first search (recursive backtracker).
    ///
    /// The search keeps an explicit stack. At each step the four directions are
    /// shuffled and the first unvisited in-bounds neighbour is carved into;
    /// when none is left the cell is popped. Every cell is visited exactly once,
    /// so the open passages form a spanning tree of the grid.
    ///
    /// Sizes outside `1..=MAX_MAZE_SIZE` are rejected.
    pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, MazeError> {
        if !(1..=MAX_MAZE_SIZE).contains(&size) {
            return Err(MazeError::InvalidSize(size));
        }
        let _span = tracing::info_span!("maze_generate", size).entered();

        let mut maze = Self {
            size,
            cells: vec![Cell::WALLED; size * size],
        };
        let mut visited = vec![false; size * size];
        let mut stack = vec![Position::ORIGIN];
        visited[0] = true;

        let mut directions = Direction::ALL;
        while let Some(&current) = stack.last() {
            directions.shuffle(rng);
            let next = directions.iter().find_map(|&d| {
                current
                    .step(d, size)
                    .filter(|n| !visited[maze.index(*n)])
                    .map(|n| (d, n))
            });

            match next {
                Some((direction, neighbor)) => {
                    maze.carve(current, direction, neighbor);
                    let idx = maze.index(neighbor);
                    visited[idx] = true;
                    stack.push(neighbor);
                }
                None => {
                    stack.pop();
                }
            }
        }

        tracing::debug!(passages = maze.open_passages(), "maze carved");
        Ok(maze)
    }

    /// Generate from a `u64` seed. The same seed always yields the same maze.
    pub fn from_seed(size: usize, seed: u64) -> Result<Self, MazeError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(size, &mut rng)
    }

    fn carve(&mut self, from: Position, direction: Direction, to: Position) {
        let a = self.index(from);
        let b = self.index(to);
        self.cells[a].clear_wall(direction);
        self.cells[b].clear_wall(direction.opposite());
    }

    fn index(&self, pos: Position) -> usize {
        pos.y * self.size + pos.x
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn entry(&self) -> Position {
        Position::ORIGIN
    }

    pub fn exit(&self) -> Position {
        Position::new(self.size - 1, self.size - 1)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get(self.index(pos))
    }

    /// All cells with their positions, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (Position::new(i % self.size, i / self.size), c))
    }

    /// Whether the wall on the `direction` side of `from` is open.
    pub fn can_move(&self, from: Position, direction: Direction) -> bool {
        can_move(self, from, direction)
    }

    /// Positions reachable in one step from `pos`.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = (Direction, Position)> + '_ {
        Direction::ALL.into_iter().filter_map(move |d| {
            if self.can_move(pos, d) {
                pos.step(d, self.size).map(|n| (d, n))
            } else {
                None
            }
        })
    }

    /// Number of carved passages (each shared wall counted once).
    pub fn open_passages(&self) -> usize {
        self.cells
            .iter()
            .map(|c| usize::from(!c.right) + usize::from(!c.bottom))
            .sum()
    }

    /// Cells with exactly one opening.
    pub fn dead_ends(&self) -> usize {
        self.cells.iter().filter(|c| c.openings() == 1).count()
    }

    /// Breadth-first search along open passages. In a perfect maze the
    /// result is the only path between the two cells.
    pub fn solve(&self, from: Position, to: Position) -> Option<Vec<Direction>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        let mut came_from: Vec<Option<(Position, Direction)>> = vec![None; self.cells.len()];
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([from]);
        seen[self.index(from)] = true;

        while let Some(pos) = queue.pop_front() {
            if pos == to {
                break;
            }
            for (d, next) in self.neighbors(pos) {
                let idx = self.index(next);
                if !seen[idx] {
                    seen[idx] = true;
                    came_from[idx] = Some((pos, d));
                    queue.push_back(next);
                }
            }
        }

        if !seen[self.index(to)] {
            return None;
        }
        let mut path = Vec::new();
        let mut cursor = to;
        while let Some((prev, d)) = came_from[self.index(cursor)] {
            path.push(d);
            cursor = prev;
        }
        path.reverse();
        Some(path)
    }

    /// Hash of the wall layout (FNV-1a over the wall bits).
    pub fn layout_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for b in (self.size as u64).to_le_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(0x0100_0000_01b3);
        }
        for c in &self.cells {
            let bits = u8::from(c.top)
                | (u8::from(c.right) << 1)
                | (u8::from(c.bottom) << 2)
                | (u8::from(c.left) << 3);
            h ^= bits as u64;
            h = h.wrapping_mul(0x0100_0000_01b3);
        }
        h
    }
}

/// True iff the cell at `from` has no wall on its `direction` side.
/// Positions outside the grid can never move.
pub fn can_move(maze: &Maze, from: Position, direction: Direction) -> bool {
    maze.cell(from).is_some_and(|c| !c.has_wall(direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reachable_count(maze: &Maze) -> usize {
        let mut seen = vec![false; maze.size() * maze.size()];
        let mut stack = vec![maze.entry()];
        seen[0] = true;
        let mut count = 1;
        while let Some(p) = stack.pop() {
            for (_, n) in maze.neighbors(p) {
                let idx = n.y * maze.size() + n.x;
                if !seen[idx] {
                    seen[idx] = true;
                    count += 1;
                    stack.push(n);
                }
            }
        }
        count
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(Maze::from_seed(0, 1), Err(MazeError::InvalidSize(0)));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let too_big = MAX_MAZE_SIZE + 1;
        let err = Maze::from_seed(too_big, 1).unwrap_err();
        assert_eq!(err, MazeError::InvalidSize(too_big));
        // size * size would overflow here.
        let err = Maze::from_seed(usize::MAX, 1).unwrap_err();
        assert_eq!(err, MazeError::InvalidSize(usize::MAX));
    }

    #[test]
    fn single_cell_is_fully_walled() {
        let maze = Maze::from_seed(1, 7).unwrap();
        assert_eq!(maze.entry(), maze.exit());
        assert_eq!(maze.cell(Position::ORIGIN), Some(&Cell::WALLED));
        assert_eq!(maze.open_passages(), 0);
        assert_eq!(maze.solve(maze.entry(), maze.exit()), Some(vec![]));
    }

    #[test]
    fn perfect_maze_for_many_seeds() {
        for size in [2, 3, 5, 8, 15, 24] {
            for seed in 0..20 {
                let maze = Maze::from_seed(size, seed).unwrap();
                let cells = size * size;
                assert_eq!(reachable_count(&maze), cells, "size={size} seed={seed}");
                assert_eq!(maze.open_passages(), cells - 1, "size={size} seed={seed}");
            }
        }
    }

    #[test]
    fn walls_are_symmetric() {
        for size in [2, 3, 5, 8, 15, 24] {
            for seed in 0..20 {
                let maze = Maze::from_seed(size, seed).unwrap();
                for (pos, _) in maze.cells() {
                    for d in Direction::ALL {
                        let Some(n) = pos.step(d, size) else {
                            continue;
                        };
                        assert_eq!(
                            maze.can_move(pos, d),
                            maze.can_move(n, d.opposite()),
                            "size={size} seed={seed} {pos} {d}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn boundary_walls_stay_closed() {
        let maze = Maze::from_seed(10, 3).unwrap();
        let last = maze.size() - 1;
        for i in 0..maze.size() {
            assert!(!maze.can_move(Position::new(i, 0), Direction::Up));
            assert!(!maze.can_move(Position::new(i, last), Direction::Down));
            assert!(!maze.can_move(Position::new(0, i), Direction::Left));
            assert!(!maze.can_move(Position::new(last, i), Direction::Right));
        }
    }

    #[test]
    fn out_of_grid_cannot_move() {
        let maze = Maze::from_seed(4, 0).unwrap();
        for d in Direction::ALL {
            assert!(!can_move(&maze, Position::new(4, 0), d));
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let a = Maze::from_seed(15, 42).unwrap();
        let b = Maze::from_seed(15, 42).unwrap();
        let c = Maze::from_seed(15, 43).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.layout_hash(), b.layout_hash());
        assert_ne!(a.layout_hash(), c.layout_hash());
    }

    #[test]
    fn solution_reaches_exit() {
        let maze = Maze::from_seed(15, 5).unwrap();
        let path = maze.solve(maze.entry(), maze.exit()).unwrap();
        let mut pos = maze.entry();
        for d in &path {
            assert!(maze.can_move(pos, *d));
            pos = pos.step(*d, maze.size()).unwrap();
        }
        assert_eq!(pos, maze.exit());
        // At least the Manhattan distance.
        assert!(path.len() >= 28);
    }

    #[test]
    fn dead_ends_have_one_opening() {
        let maze = Maze::from_seed(15, 11).unwrap();
        let counted = maze.cells().filter(|(_, c)| c.openings() == 1).count();
        assert_eq!(maze.dead_ends(), counted);
        assert!(maze.dead_ends() >= 2);
    }
}
