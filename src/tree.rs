/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    fmt,
    num::ParseIntError,
    str::FromStr,
};

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use crate::{board::FEN_STARTPOS, find_transposition, position_key, KeyIndex};

/// Identifier of a node within an [`OpeningTree`].
///
/// Ids are handed out in increasing order, so sorting by id is sorting by creation time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    #[inline(always)]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse().map(Self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An arrow drawn on the board, from one square to another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    pub from: String,
    pub to: String,
    pub brush: Option<String>,
}

/// A highlighted square on the board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub square: String,
    pub brush: Option<String>,
}

/// User-provided notes about a position. Never inspected by the tree itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub comment: String,
    pub color: Option<String>,
    pub tags: BTreeSet<String>,
    pub arrows: Vec<Arrow>,
    pub highlights: Vec<Highlight>,
}

/// A partial change to an [`Annotation`]. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationUpdate {
    pub comment: Option<String>,
    pub color: Option<Option<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub arrows: Option<Vec<Arrow>>,
    pub highlights: Option<Vec<Highlight>>,
}

impl AnnotationUpdate {
    fn apply_to(self, annotation: &mut Annotation) {
        if let Some(comment) = self.comment {
            annotation.comment = comment;
        }
        if let Some(color) = self.color {
            annotation.color = color;
        }
        if let Some(tags) = self.tags {
            annotation.tags = tags;
        }
        if let Some(arrows) = self.arrows {
            annotation.arrows = arrows;
        }
        if let Some(highlights) = self.highlights {
            annotation.highlights = highlights;
        }
    }
}

/// A move from one node that leads to a node living elsewhere in the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspositionEdge {
    pub target: NodeId,
    pub mv: String,
}

/// A single position in an [`OpeningTree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionNode {
    pub id: NodeId,

    /// Canonical text of the move that produced this position. `None` only for the root.
    pub mv: Option<String>,

    /// FEN of this position.
    pub fen: String,

    pub annotation: Annotation,

    /// `None` only for the root.
    pub parent: Option<NodeId>,

    /// Children in the order they were created.
    pub children: Vec<NodeId>,

    /// Moves from this position that reach nodes elsewhere in the tree.
    pub transpositions: Vec<TranspositionEdge>,
}

/// How a move was resolved against the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// An existing child already had this move.
    ExistingChild,

    /// An existing transposition edge already had this move.
    ExistingTransposition,

    /// The position already existed elsewhere, so a new transposition edge was recorded.
    NewTransposition,

    /// A new node was created.
    Created,
}

impl Resolution {
    /// Returns `true` if no new node was needed.
    #[inline(always)]
    pub const fn is_reuse(&self) -> bool {
        !matches!(self, Self::Created)
    }
}

/// Outcome of resolving a single move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddOutcome {
    /// The node the move leads to.
    pub id: NodeId,
    pub resolution: Resolution,
}

/// Summary numbers about a tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub nodes: usize,
    pub transpositions: usize,
    pub max_depth: usize,
}

/// A tree of positions connected by moves, plus an overlay of transposition edges.
///
/// Parent/child links form a strict tree rooted at [`OpeningTree::root`].
/// Transposition edges may point anywhere and are never followed when walking the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TreeDocument", into = "TreeDocument")]
pub struct OpeningTree {
    nodes: BTreeMap<NodeId, PositionNode>,
    root: NodeId,
    next_id: u64,
}

impl OpeningTree {
    /// Creates a tree containing only a root at `fen`.
    pub fn new(fen: impl Into<String>) -> Self {
        let root = NodeId(0);
        let node = PositionNode {
            id: root,
            mv: None,
            fen: fen.into(),
            annotation: Annotation::default(),
            parent: None,
            children: Vec::new(),
            transpositions: Vec::new(),
        };

        Self {
            nodes: BTreeMap::from([(root, node)]),
            root,
            next_id: 1,
        }
    }

    /// Rebuilds a tree from a flat list of nodes, as read back from a store.
    pub fn from_nodes(nodes: impl IntoIterator<Item = PositionNode>) -> Result<Self> {
        let nodes = nodes
            .into_iter()
            .map(|node| (node.id, node))
            .collect::<BTreeMap<_, _>>();

        let mut roots = nodes.values().filter(|node| node.parent.is_none());
        let root = roots.next().ok_or(anyhow!("Tree has no root node"))?.id;
        if roots.next().is_some() {
            bail!("Tree has more than one root node");
        }

        let next_id = nodes.keys().last().map_or(0, |id| id.0) + 1;
        let tree = Self {
            nodes,
            root,
            next_id,
        };
        tree.check_invariants()?;

        Ok(tree)
    }

    /// Raises the next id to hand out to at least `next_id`, so ids used before a reload are never reused.
    pub fn with_next_id(mut self, next_id: u64) -> Self {
        self.next_id = self.next_id.max(next_id);
        self
    }

    /// Id the next created node will get.
    #[inline(always)]
    pub const fn next_id(&self) -> NodeId {
        NodeId(self.next_id)
    }

    #[inline(always)]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &PositionNode {
        // Safe index: the root is never removed
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: NodeId) -> Option<&PositionNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &PositionNode> {
        self.nodes.values()
    }

    /// Returns the child of `parent` reached by `mv`, if there is one.
    pub fn find_child(&self, parent: NodeId, mv: &str) -> Option<NodeId> {
        let node = self.get(parent)?;
        node.children
            .iter()
            .copied()
            .find(|child| self.get(*child).and_then(|c| c.mv.as_deref()) == Some(mv))
    }

    /// Returns the target of `parent`'s transposition edge for `mv`, if there is one.
    pub fn find_transposition_edge(&self, parent: NodeId, mv: &str) -> Option<NodeId> {
        self.get(parent)?
            .transpositions
            .iter()
            .find(|edge| edge.mv == mv)
            .map(|edge| edge.target)
    }

    /// Move texts leading from the root to `id`, or `None` if `id` is not in the tree.
    pub fn path_to(&self, id: NodeId) -> Option<Vec<String>> {
        let mut path = Vec::new();
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            if let Some(mv) = &current.mv {
                path.push(mv.clone());
            }
            current = self.get(parent)?;
        }
        path.reverse();
        Some(path)
    }

    /// Counts nodes and transposition edges, and measures the deepest line.
    pub fn stats(&self) -> TreeStats {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get(id) {
                stack.extend(node.children.iter().map(|child| (*child, depth + 1)));
            }
        }

        TreeStats {
            nodes: self.len(),
            transpositions: self.nodes().map(|n| n.transpositions.len()).sum(),
            max_depth,
        }
    }

    /// Creates a new child of `parent` and returns its id.
    ///
    /// No de-duplication happens here; callers go through [`OpeningTree::add_child_node`] or the import engine.
    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        mv: &str,
        fen: &str,
        annotation: Annotation,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.nodes.insert(
            id,
            PositionNode {
                id,
                mv: Some(mv.to_string()),
                fen: fen.to_string(),
                annotation,
                parent: Some(parent),
                children: Vec::new(),
                transpositions: Vec::new(),
            },
        );

        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(id);
        }

        id
    }

    /// Resolves a single already-validated move from `parent` to `fen`.
    ///
    /// Checked in order, first match wins:
    /// 1. a child of `parent` with the same move,
    /// 2. a transposition edge of `parent` with the same move,
    /// 3. a node elsewhere with the same position that is not already a child of `parent`,
    ///    which gets linked with a new transposition edge,
    /// 4. otherwise a new child is created, inheriting `parent`'s color.
    ///
    /// When `index` is provided it is consulted before the linear scan and updated with any new node.
    /// Returns `None` if `parent` does not exist.
    pub(crate) fn resolve_move(
        &mut self,
        parent: NodeId,
        mv: &str,
        fen: &str,
        comment: Option<&str>,
        mut index: Option<&mut KeyIndex>,
    ) -> Option<AddOutcome> {
        let parent_node = self.get(parent)?;
        let inherited_color = parent_node.annotation.color.clone();

        if let Some(id) = self.find_child(parent, mv) {
            if let (Some(comment), Some(node)) = (comment, self.nodes.get_mut(&id)) {
                if node.annotation.comment.is_empty() && !comment.is_empty() {
                    node.annotation.comment = comment.to_string();
                }
            }
            return Some(AddOutcome {
                id,
                resolution: Resolution::ExistingChild,
            });
        }

        if let Some(id) = self.find_transposition_edge(parent, mv) {
            return Some(AddOutcome {
                id,
                resolution: Resolution::ExistingTransposition,
            });
        }

        let target = {
            let tree: &Self = self;
            index
                .as_deref()
                .and_then(|index| index.get(fen))
                .filter(|id| tree.contains(*id))
                .or_else(|| find_transposition(fen, tree, Some(parent)))
                .filter(|id| *id != parent && !tree.nodes[&parent].children.contains(id))
        };

        if let Some(target) = target {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.transpositions.push(TranspositionEdge {
                    target,
                    mv: mv.to_string(),
                });
            }
            return Some(AddOutcome {
                id: target,
                resolution: Resolution::NewTransposition,
            });
        }

        let annotation = Annotation {
            comment: comment.unwrap_or_default().to_string(),
            color: inherited_color,
            ..Default::default()
        };
        let id = self.insert_child(parent, mv, fen, annotation);
        if let Some(index) = index.as_deref_mut() {
            index.insert(fen, id);
        }

        Some(AddOutcome {
            id,
            resolution: Resolution::Created,
        })
    }

    /// Adds a single move from `parent`, reusing an existing node whenever one matches.
    ///
    /// `fen` must be the position after `mv` is played; validation happens before this is called.
    pub fn add_child_node(&mut self, parent: NodeId, mv: &str, fen: &str) -> Option<AddOutcome> {
        self.resolve_move(parent, mv, fen, None, None)
    }

    /// Applies `update` to the annotation of node `id`. Structural fields are never touched.
    ///
    /// Returns `false` if there is no such node.
    pub fn update_node(&mut self, id: NodeId, update: AnnotationUpdate) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        update.apply_to(&mut node.annotation);
        true
    }

    /// Deletes node `id` and its entire subtree.
    ///
    /// Does nothing for the root or an unknown id. Returns every removed id.
    pub fn delete_node(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root {
            return Vec::new();
        }
        let Some(parent) = self.get(id).and_then(|node| node.parent) else {
            return Vec::new();
        };

        let removed = self.remove_subtrees(&[id]);
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|child| *child != id);
        }

        removed
    }

    /// Deletes everything below the root and resets the root's edges and drawings.
    ///
    /// The root's position, comment, color and tags are kept. Returns every removed id.
    pub fn clear_graph(&mut self) -> Vec<NodeId> {
        let children = self.root_node().children.clone();
        let removed = self.remove_subtrees(&children);

        if let Some(root) = self.nodes.get_mut(&self.root) {
            root.children.clear();
            root.transpositions.clear();
            root.annotation.arrows.clear();
            root.annotation.highlights.clear();
        }

        removed
    }

    /// Removes every node in the subtrees of `tops`, then strips transposition edges into them from all survivors.
    fn remove_subtrees(&mut self, tops: &[NodeId]) -> Vec<NodeId> {
        let mut removed = Vec::new();
        let mut stack = tops.to_vec();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                stack.extend(node.children);
                removed.push(id);
            }
        }

        let gone = removed.iter().copied().collect::<HashSet<_>>();
        for node in self.nodes.values_mut() {
            node.transpositions.retain(|edge| !gone.contains(&edge.target));
        }

        removed
    }

    /// Verifies the structural invariants of the tree.
    ///
    /// - exactly one root, with no move and no parent
    /// - parent and child links agree, and every node is reachable from the root
    /// - no two children of a node share a move
    /// - every transposition edge points at an existing node
    pub fn check_invariants(&self) -> Result<()> {
        let root = self
            .get(self.root)
            .ok_or(anyhow!("Root {} is missing", self.root))?;
        if root.parent.is_some() || root.mv.is_some() {
            bail!("Root {} must have no parent and no move", self.root);
        }

        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                bail!("Node {id} is reachable twice");
            }
            let node = self.get(id).ok_or(anyhow!("Child {id} is missing"))?;
            if node.id != id {
                bail!("Node stored under {id} claims id {}", node.id);
            }

            let mut moves = HashSet::new();
            for child in &node.children {
                let child_node = self.get(*child).ok_or(anyhow!("Child {child} is missing"))?;
                if child_node.parent != Some(id) {
                    bail!("Child {child} does not point back at parent {id}");
                }
                if !moves.insert(child_node.mv.as_deref()) {
                    bail!("Node {id} has two children with the move {:?}", child_node.mv);
                }
                stack.push(*child);
            }

            if let Some(edge) = node.transpositions.iter().find(|e| !self.contains(e.target)) {
                bail!("Node {id} has a transposition to missing node {}", edge.target);
            }
        }

        if seen.len() != self.len() {
            bail!(
                "{} node(s) are unreachable from the root",
                self.len() - seen.len()
            );
        }

        Ok(())
    }

    /// Returns `true` if the positions of `a` and `b` are transpositions of each other.
    pub fn same_position(&self, a: NodeId, b: NodeId) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => position_key(&a.fen) == position_key(&b.fen),
            _ => false,
        }
    }
}

impl Default for OpeningTree {
    /// A tree rooted at the standard starting position.
    fn default() -> Self {
        Self::new(FEN_STARTPOS)
    }
}

/// Serialized form of an [`OpeningTree`]: a flat node list, since JSON maps can only have string keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct TreeDocument {
    root: NodeId,
    next_id: u64,
    nodes: Vec<PositionNode>,
}

impl From<OpeningTree> for TreeDocument {
    fn from(tree: OpeningTree) -> Self {
        Self {
            root: tree.root,
            next_id: tree.next_id,
            nodes: tree.nodes.into_values().collect(),
        }
    }
}

impl TryFrom<TreeDocument> for OpeningTree {
    type Error = anyhow::Error;
    fn try_from(doc: TreeDocument) -> Result<Self> {
        let tree = Self::from_nodes(doc.nodes)?;
        if tree.root != doc.root {
            bail!("Tree document names root {} but {} has no parent", doc.root, tree.root);
        }
        Ok(tree.with_next_id(doc.next_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
    const E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
    const E4_C5: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";

    #[test]
    fn test_add_child_node_deduplicates() {
        let mut tree = OpeningTree::default();
        let root = tree.root();

        let first = tree.add_child_node(root, "e4", E4).unwrap();
        assert_eq!(first.resolution, Resolution::Created);

        let second = tree.add_child_node(root, "e4", E4).unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.resolution, Resolution::ExistingChild);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_add_child_node_unknown_parent() {
        let mut tree = OpeningTree::default();
        assert_eq!(tree.add_child_node(NodeId::new(99), "e4", E4), None);
    }

    #[test]
    fn test_add_child_node_records_transposition() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        let e4 = tree.add_child_node(root, "e4", E4).unwrap().id;
        let e5 = tree.add_child_node(e4, "e5", E4_E5).unwrap().id;

        // Pretend another move from the root reaches the same position as 1. e4 e5
        let outcome = tree.add_child_node(root, "Xx", E4_E5).unwrap();
        assert_eq!(outcome.resolution, Resolution::NewTransposition);
        assert_eq!(outcome.id, e5);
        assert_eq!(
            tree.root_node().transpositions,
            vec![TranspositionEdge {
                target: e5,
                mv: "Xx".into()
            }]
        );

        // Playing it again follows the recorded edge
        let again = tree.add_child_node(root, "Xx", E4_E5).unwrap();
        assert_eq!(again.resolution, Resolution::ExistingTransposition);
        assert_eq!(tree.stats().transpositions, 1);
    }

    #[test]
    fn test_child_color_is_inherited() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        tree.update_node(
            root,
            AnnotationUpdate {
                color: Some(Some("green".into())),
                ..Default::default()
            },
        );
        let e4 = tree.add_child_node(root, "e4", E4).unwrap().id;
        assert_eq!(tree.get(e4).unwrap().annotation.color.as_deref(), Some("green"));
    }

    #[test]
    fn test_update_node_only_touches_annotation() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        let e4 = tree.add_child_node(root, "e4", E4).unwrap().id;
        let before = tree.get(e4).unwrap().clone();

        assert!(tree.update_node(
            e4,
            AnnotationUpdate {
                comment: Some("King's pawn".into()),
                tags: Some(BTreeSet::from(["main".to_string()])),
                ..Default::default()
            }
        ));

        let after = tree.get(e4).unwrap();
        assert_eq!(after.annotation.comment, "King's pawn");
        assert!(after.annotation.tags.contains("main"));
        assert_eq!(after.fen, before.fen);
        assert_eq!(after.mv, before.mv);
        assert_eq!(after.parent, before.parent);
        assert!(!tree.update_node(NodeId::new(42), AnnotationUpdate::default()));
    }

    #[test]
    fn test_delete_node_cascades_and_strips_edges() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        let e4 = tree.add_child_node(root, "e4", E4).unwrap().id;
        let e5 = tree.add_child_node(e4, "e5", E4_E5).unwrap().id;
        let c5 = tree.add_child_node(e4, "c5", E4_C5).unwrap().id;
        tree.add_child_node(root, "Xx", E4_E5).unwrap();
        assert_eq!(tree.stats().transpositions, 1);

        let removed = tree.delete_node(e4);
        assert_eq!(removed.len(), 3);
        for id in [e4, e5, c5] {
            assert!(removed.contains(&id));
            assert!(!tree.contains(id));
        }
        assert!(tree.root_node().children.is_empty());
        assert!(tree.root_node().transpositions.is_empty());
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_root_is_noop() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        tree.add_child_node(root, "e4", E4).unwrap();
        assert!(tree.delete_node(root).is_empty());
        assert!(tree.delete_node(NodeId::new(77)).is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_clear_graph_keeps_root_notes() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        tree.update_node(
            root,
            AnnotationUpdate {
                comment: Some("start".into()),
                arrows: Some(vec![Arrow {
                    from: "e2".into(),
                    to: "e4".into(),
                    brush: None,
                }]),
                ..Default::default()
            },
        );
        let e4 = tree.add_child_node(root, "e4", E4).unwrap().id;
        tree.add_child_node(e4, "e5", E4_E5).unwrap();

        assert_eq!(tree.clear_graph().len(), 2);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_node().annotation.comment, "start");
        assert!(tree.root_node().annotation.arrows.is_empty());
        assert_eq!(tree.root_node().fen, FEN_STARTPOS);
    }

    #[test]
    fn test_path_to() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        let e4 = tree.add_child_node(root, "e4", E4).unwrap().id;
        let e5 = tree.add_child_node(e4, "e5", E4_E5).unwrap().id;
        assert_eq!(tree.path_to(e5).unwrap(), ["e4", "e5"]);
        assert_eq!(tree.path_to(root).unwrap(), Vec::<String>::new());
        assert_eq!(tree.path_to(NodeId::new(9)), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut tree = OpeningTree::default();
        let root = tree.root();
        let e4 = tree.add_child_node(root, "e4", E4).unwrap().id;
        tree.add_child_node(e4, "e5", E4_E5).unwrap();
        tree.add_child_node(root, "Xx", E4_E5).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let back: OpeningTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_from_nodes_rejects_broken_trees() {
        let tree = OpeningTree::default();
        let mut orphan = tree.root_node().clone();
        orphan.id = NodeId::new(5);
        orphan.parent = Some(NodeId::new(4));
        let nodes = vec![tree.root_node().clone(), orphan];
        assert!(OpeningTree::from_nodes(nodes).is_err());
        assert!(OpeningTree::from_nodes(Vec::new()).is_err());
    }
}
