use std::collections::VecDeque;

use mazerun_common::Position;

/// Bounded breadcrumb history. When full, pushing evicts the oldest point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trail {
    points: VecDeque<Position>,
    capacity: usize,
}

impl Trail {
    /// An empty trail holding at most `capacity` points. Storage grows with
    /// use, so a large capacity costs nothing up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, pos: Position) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(pos);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.points.iter().copied()
    }

    /// Relative age of the point at `index`: `1.0` for the oldest, falling
    /// towards `1 / len` for the newest. Used for fading the trail out.
    pub fn age(&self, index: usize) -> f32 {
        age_fraction(index, self.points.len())
    }
}

/// Age of item `index` in an oldest-first list of `len` items, in `(0, 1]`.
/// Out-of-range indices count as oldest.
pub fn age_fraction(index: usize, len: usize) -> f32 {
    if len == 0 || index >= len {
        return 1.0;
    }
    (len - index) as f32 / len as f32
}
