/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;

use crate::{NodeId, OpeningTree};

/// Number of leading FEN fields that identify a position for transposition purposes.
///
/// Piece placement, side to move, castling rights and en passant target.
/// The halfmove clock and fullmove number are ignored.
const KEY_FIELDS: usize = 4;

/// Canonical key of a FEN string, used to detect transpositions.
///
/// Two move orders reaching the same board state produce the same key, no matter how many plies it took.
pub fn position_key(fen: &str) -> String {
    fen.split_ascii_whitespace()
        .take(KEY_FIELDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Finds the first node (in id order) whose position matches `fen`, skipping `exclude`.
///
/// This is a linear scan over the whole tree.
pub fn find_transposition(fen: &str, tree: &OpeningTree, exclude: Option<NodeId>) -> Option<NodeId> {
    let key = position_key(fen);
    tree.nodes()
        .filter(|node| Some(node.id) != exclude)
        .find(|node| position_key(&node.fen) == key)
        .map(|node| node.id)
}

/// Maps position keys to the first node holding that position.
///
/// Kept up to date by the import engine so that each incoming move costs a hash lookup instead of a scan.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex(HashMap<String, NodeId>);

impl KeyIndex {
    /// Indexes every node of `tree`. The earliest node wins when several share a key.
    pub fn build(tree: &OpeningTree) -> Self {
        let mut index = Self::default();
        for node in tree.nodes() {
            index.insert(&node.fen, node.id);
        }
        index
    }

    /// Records `id` under the key of `fen`, unless an earlier node already claimed it.
    pub fn insert(&mut self, fen: &str, id: NodeId) {
        self.0.entry(position_key(fen)).or_insert(id);
    }

    /// Looks up the node registered for `fen`'s position.
    pub fn get(&self, fen: &str) -> Option<NodeId> {
        self.0.get(&position_key(fen)).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_drops_counters() {
        let a = "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1";
        let b = "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 7 12";
        assert_eq!(position_key(a), position_key(b));
        assert_eq!(
            position_key(a),
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq -"
        );
    }

    #[test]
    fn test_key_respects_state_fields() {
        let base = "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1";
        assert_ne!(position_key(base), position_key("4k3/8/8/8/8/8/8/R3K3 b Q - 0 1"));
        assert_ne!(position_key(base), position_key("4k3/8/8/8/8/8/8/R3K3 w - - 0 1"));
        assert_ne!(position_key(base), position_key("4k3/8/8/8/8/8/8/R3K3 w Q e3 0 1"));
        assert_ne!(position_key(base), position_key("4k3/8/8/8/8/8/8/R2K4 w Q - 0 1"));
    }

    #[test]
    fn test_find_transposition_first_match() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        let fen = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";
        let first = tree.insert_child(root, "a", fen, Default::default());
        let second = tree.insert_child(root, "b", "4k3/8/8/8/8/8/8/4K3 w - - 4 9", Default::default());

        assert_eq!(find_transposition(fen, &tree, None), Some(first));
        assert_eq!(find_transposition(fen, &tree, Some(first)), Some(second));
        assert_eq!(find_transposition("8/8/8/8/8/8/8/k6K w - - 0 1", &tree, None), None);

        let index = KeyIndex::build(&tree);
        assert_eq!(index.get(fen), Some(first));
        assert_eq!(index.len(), 2);
    }
}
