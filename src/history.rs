/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::VecDeque, mem};

use crate::OpeningTree;

/// Default number of snapshots kept on each of the undo and redo stacks.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Undo/redo stacks of whole-tree snapshots.
///
/// Nothing about *what* changed is recorded; undoing simply swaps the live tree for the previous snapshot.
/// Both stacks are bounded, dropping their oldest entry on overflow.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<OpeningTree>,
    redo: VecDeque<OpeningTree>,
    limit: usize,
}

impl History {
    /// Creates empty stacks that hold at most `limit` snapshots each.
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_DEPTH)),
            redo: VecDeque::new(),
            limit,
        }
    }

    #[inline(always)]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Records `before`, the tree as it was before a mutation. Clears the redo stack.
    pub fn record(&mut self, before: OpeningTree) {
        push_bounded(&mut self.undo, before, self.limit);
        self.redo.clear();
    }

    /// Swaps `current` for the most recent snapshot, saving `current` for redo.
    ///
    /// Returns `false` without touching anything if there is nothing to undo.
    pub fn undo(&mut self, current: &mut OpeningTree) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        let replaced = mem::replace(current, previous);
        push_bounded(&mut self.redo, replaced, self.limit);
        true
    }

    /// Swaps `current` for the most recently undone tree, saving `current` for undo.
    ///
    /// Returns `false` without touching anything if there is nothing to redo.
    pub fn redo(&mut self, current: &mut OpeningTree) -> bool {
        let Some(next) = self.redo.pop_back() else {
            return false;
        };
        let replaced = mem::replace(current, next);
        push_bounded(&mut self.undo, replaced, self.limit);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of snapshots on the undo and redo stacks.
    pub fn depths(&self) -> (usize, usize) {
        (self.undo.len(), self.redo.len())
    }

    /// Forgets every snapshot.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

fn push_bounded(stack: &mut VecDeque<OpeningTree>, tree: OpeningTree, limit: usize) {
    stack.push_back(tree);
    while stack.len() > limit {
        stack.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(moves: usize) -> OpeningTree {
        let mut tree = OpeningTree::default();
        for i in 0..moves {
            let root = tree.root();
            tree.add_child_node(root, &format!("m{i}"), &format!("fen {i}"));
        }
        tree
    }

    #[test]
    fn test_undo_redo_swap() {
        let mut history = History::default();
        let mut current = tree_with(1);
        history.record(tree_with(0));

        assert!(history.undo(&mut current));
        assert_eq!(current, tree_with(0));
        assert_eq!(history.depths(), (0, 1));

        assert!(history.redo(&mut current));
        assert_eq!(current, tree_with(1));
        assert_eq!(history.depths(), (1, 0));
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::default();
        let mut current = tree_with(2);
        assert!(!history.undo(&mut current));
        assert!(!history.redo(&mut current));
        assert_eq!(current, tree_with(2));
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::default();
        let mut current = tree_with(1);
        history.record(tree_with(0));
        history.undo(&mut current);
        assert!(history.can_redo());

        history.record(current.clone());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_bounded_depth_drops_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(tree_with(i));
        }
        assert_eq!(history.depths(), (3, 0));

        let mut current = tree_with(5);
        let mut undone = Vec::new();
        while history.undo(&mut current) {
            undone.push(current.len());
        }
        // Snapshots with 0 and 1 extra nodes were dropped
        assert_eq!(undone, [5, 4, 3]);
        assert_eq!(history.depths(), (0, 3));
    }
}
