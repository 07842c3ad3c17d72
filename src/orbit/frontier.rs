// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! BFS worklist for one orbit walk.

use crate::matrix::AdjacencyMatrix;

/// Append-only queue of matrices with a read cursor.
///
/// Nothing is freed until [`reset`](Self::reset), which keeps the
/// allocation for the next orbit.
#[derive(Debug, Default)]
pub struct OrbitFrontier {
    items: Vec<AdjacencyMatrix>,
    head: usize,
}

impl OrbitFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the queue, retaining capacity.
    pub fn reset(&mut self) {
        self.items.clear();
        self.head = 0;
    }

    #[inline]
    pub fn push(&mut self, matrix: AdjacencyMatrix) {
        self.items.push(matrix);
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<AdjacencyMatrix> {
        let item = self.items.get(self.head).copied()?;
        self.head += 1;
        Some(item)
    }

    /// Matrices pushed but not yet popped.
    #[inline]
    pub fn pending(&self) -> usize {
        self.items.len() - self.head
    }

    /// Matrices pushed since the last reset.
    #[inline]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_and_reset() {
        let mut frontier = OrbitFrontier::new();
        let a = AdjacencyMatrix::empty(2);
        let b = AdjacencyMatrix::from_edges(2, &[(0, 1)]).unwrap();
        frontier.push(a);
        frontier.push(b);
        assert_eq!(frontier.pending(), 2);
        assert_eq!(frontier.pop_front(), Some(a));
        assert_eq!(frontier.pending(), 1);
        assert_eq!(frontier.total(), 2);
        assert_eq!(frontier.pop_front(), Some(b));
        assert_eq!(frontier.pop_front(), None);

        let capacity = frontier.capacity();
        frontier.reset();
        assert_eq!(frontier.total(), 0);
        assert_eq!(frontier.capacity(), capacity);
    }
}
