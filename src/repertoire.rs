/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use tracing::{debug, warn};

use crate::{
    board::{RulesEngine, StandardRules},
    export_pgn, import_pgn, AddOutcome, AnnotationUpdate, Changeset, History, ImportStats,
    NodeId, OpeningTree, PositionNode, TreeStore, DEFAULT_HISTORY_DEPTH,
};

/// A named opening tree together with everything needed to edit it.
///
/// This owns the live tree, the currently selected node, the undo/redo history and an optional store.
/// Every change to the tree goes through here so that it is recorded for undo and written to the store.
pub struct Repertoire<R = StandardRules> {
    id: String,
    tree: OpeningTree,
    selected: NodeId,
    history: History,
    rules: R,
    store: Option<Box<dyn TreeStore>>,
}

impl Repertoire<StandardRules> {
    /// Creates an empty repertoire for standard chess.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_tree(id, OpeningTree::default(), StandardRules)
    }
}

impl<R: RulesEngine> Repertoire<R> {
    /// Creates a repertoire around an existing tree, with the root selected.
    pub fn with_tree(id: impl Into<String>, tree: OpeningTree, rules: R) -> Self {
        Self {
            id: id.into(),
            selected: tree.root(),
            tree,
            history: History::new(DEFAULT_HISTORY_DEPTH),
            rules,
            store: None,
        }
    }

    /// Replaces the history with one holding at most `limit` snapshots per stack.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history = History::new(limit);
        self
    }

    /// Attaches a store, writing the whole tree to it. Every subsequent change is written as well.
    pub fn store(mut self, mut store: Box<dyn TreeStore>) -> Self {
        if let Err(err) = store.apply(&self.id, &Changeset::full(&self.tree)) {
            warn!(tree = %self.id, "failed to persist tree: {err:#}");
        }
        self.store = Some(store);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tree(&self) -> &OpeningTree {
        &self.tree
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn attached_store(&self) -> Option<&dyn TreeStore> {
        self.store.as_deref()
    }

    #[inline(always)]
    pub fn selected(&self) -> NodeId {
        self.selected
    }

    pub fn selected_node(&self) -> &PositionNode {
        self.tree
            .get(self.selected)
            .unwrap_or_else(|| self.tree.root_node())
    }

    /// Selects node `id`. Returns `false` if there is no such node.
    pub fn select(&mut self, id: NodeId) -> bool {
        if self.tree.contains(id) {
            self.selected = id;
            true
        } else {
            false
        }
    }

    /// Plays `mv` from the selected node and selects wherever it leads.
    ///
    /// Moves the rules reject are ignored, leaving everything untouched.
    pub fn play(&mut self, mv: &str) -> Option<AddOutcome> {
        let applied = match self.rules.apply(&self.selected_node().fen, mv) {
            Ok(applied) => applied,
            Err(err) => {
                debug!("ignoring move: {err}");
                return None;
            }
        };

        let parent = self.selected;
        let outcome = self.add_child_node(parent, &applied.san, &applied.fen)?;
        self.selected = outcome.id;
        Some(outcome)
    }

    /// Adds an already-validated move from `parent`, reusing existing nodes where possible.
    pub fn add_child_node(&mut self, parent: NodeId, mv: &str, fen: &str) -> Option<AddOutcome> {
        self.mutate(|tree| tree.add_child_node(parent, mv, fen))
    }

    /// Changes the annotation of node `id`.
    pub fn update_node(&mut self, id: NodeId, update: AnnotationUpdate) -> bool {
        self.mutate(|tree| tree.update_node(id, update))
    }

    /// Deletes node `id` and its subtree, returning how many nodes were removed.
    ///
    /// If the selection was removed, the deleted node's parent is selected instead.
    pub fn delete_node(&mut self, id: NodeId) -> usize {
        let parent = self.tree.get(id).and_then(|node| node.parent);
        let removed = self.mutate(|tree| tree.delete_node(id));

        if !self.tree.contains(self.selected) {
            self.selected = parent.unwrap_or(self.tree.root());
        }

        removed.len()
    }

    /// Deletes everything below the root, returning how many nodes were removed.
    pub fn clear_graph(&mut self) -> usize {
        let removed = self.mutate(|tree| tree.clear_graph());
        if !self.tree.contains(self.selected) {
            self.selected = self.tree.root();
        }
        removed.len()
    }

    /// Imports every game in `text` as a single undoable change.
    pub fn import_pgn(&mut self, text: &str) -> ImportStats {
        let (merged, stats) = import_pgn(text, &self.tree, &self.rules);
        self.mutate(|tree| *tree = merged);
        stats
    }

    /// Renders the tree as notation text.
    pub fn export_pgn(&self) -> String {
        export_pgn(&self.tree)
    }

    /// Restores the tree as it was before the last change and selects the root.
    ///
    /// Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let before = self.tree.clone();
        if !self.history.undo(&mut self.tree) {
            return false;
        }
        self.selected = self.tree.root();
        self.persist(&before);
        true
    }

    /// Re-applies the last undone change. The selection is left alone.
    ///
    /// Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let before = self.tree.clone();
        if !self.history.redo(&mut self.tree) {
            return false;
        }
        self.persist(&before);
        true
    }

    /// Runs `change` against the live tree, persisting the difference and recording a snapshot.
    ///
    /// The snapshot is recorded even if nothing changed, so every mutation is one undo step and clears redo.
    fn mutate<T>(&mut self, change: impl FnOnce(&mut OpeningTree) -> T) -> T {
        let before = self.tree.clone();
        let out = change(&mut self.tree);

        self.persist(&before);
        self.history.record(before);

        out
    }

    /// Writes the difference between `before` and the live tree to the store.
    ///
    /// Failures are logged and otherwise ignored; the in-memory tree stays authoritative.
    fn persist(&mut self, before: &OpeningTree) {
        let Some(store) = self.store.as_mut() else {
            return;
        };

        let changes = Changeset::between(before, &self.tree);
        if changes.is_empty() {
            return;
        }

        if let Err(err) = store.apply(&self.id, &changes) {
            warn!(tree = %self.id, "failed to persist changes: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_play_selects_and_dedupes() {
        let mut rep = Repertoire::new("main");
        let e4 = rep.play("e4").unwrap().id;
        assert_eq!(rep.selected(), e4);

        assert!(rep.select(rep.tree().root()));
        let again = rep.play("e2e4").unwrap();
        assert_eq!(again.id, e4);
        assert_eq!(rep.tree().len(), 2);

        // Both plays are undo steps, even though the second resolved to an existing node
        assert_eq!(rep.history().depths(), (2, 0));
    }

    #[test]
    fn test_undo_after_existing_move_keeps_node() {
        let mut rep = Repertoire::new("main");
        rep.play("e4").unwrap();
        assert!(rep.select(rep.tree().root()));
        rep.play("e4").unwrap();

        assert!(rep.undo());
        assert!(rep.tree().find_child(rep.tree().root(), "e4").is_some());
        assert_eq!(rep.tree().len(), 2);
    }

    #[test]
    fn test_unchanged_update_clears_redo() {
        let mut rep = Repertoire::new("main");
        rep.play("e4").unwrap();
        assert!(rep.undo());
        assert!(rep.history().can_redo());

        rep.update_node(rep.tree().root(), AnnotationUpdate::default());
        assert!(!rep.history().can_redo());
        assert!(!rep.redo());
        assert_eq!(rep.tree().len(), 1);
    }

    #[test]
    fn test_invalid_move_is_silent_noop() {
        let mut rep = Repertoire::new("main");
        assert_eq!(rep.play("Ke5"), None);
        assert_eq!(rep.tree().len(), 1);
        assert!(!rep.history().can_undo());
    }

    #[test]
    fn test_delete_moves_selection_to_parent() {
        let mut rep = Repertoire::new("main");
        let e4 = rep.play("e4").unwrap().id;
        rep.play("e5").unwrap();
        rep.play("Nf3").unwrap();

        assert_eq!(rep.delete_node(rep.tree().find_child(e4, "e5").unwrap()), 2);
        assert_eq!(rep.selected(), e4);
    }

    #[test]
    fn test_select_unknown_node() {
        let mut rep = Repertoire::new("main");
        assert!(!rep.select(NodeId::new(12)));
        assert_eq!(rep.selected(), rep.tree().root());
    }

    #[test]
    fn test_undo_selects_root_redo_does_not() {
        let mut rep = Repertoire::new("main");
        let e4 = rep.play("e4").unwrap().id;
        assert!(rep.undo());
        assert_eq!(rep.selected(), rep.tree().root());
        assert!(!rep.tree().contains(e4));

        assert!(rep.redo());
        assert!(rep.tree().contains(e4));
        assert_eq!(rep.selected(), rep.tree().root());
    }

    #[test]
    fn test_store_mirrors_tree() {
        let mut rep = Repertoire::new("main").store(Box::new(MemoryStore::new()));
        rep.import_pgn("1. e4 e5 2. Nf3 Nc6 *");
        let e4 = rep.tree().find_child(rep.tree().root(), "e4").unwrap();
        rep.delete_node(rep.tree().get(e4).unwrap().children[0]);

        let stored = rep.attached_store().unwrap().load("main").unwrap().unwrap();
        assert!(stored.nodes().eq(rep.tree().nodes()));

        rep.undo();
        let stored = rep.attached_store().unwrap().load("main").unwrap().unwrap();
        assert_eq!(stored.len(), 5);
        assert!(stored.nodes().eq(rep.tree().nodes()));
    }
}
