/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{NodeId, OpeningTree, PositionNode};

/// Node-level difference between two versions of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    /// Nodes that are new or changed.
    pub upserts: Vec<PositionNode>,

    /// Ids of nodes that no longer exist.
    pub deletions: Vec<NodeId>,
}

impl Changeset {
    /// Computes what must be written to turn the stored `before` into `after`.
    pub fn between(before: &OpeningTree, after: &OpeningTree) -> Self {
        let upserts = after
            .nodes()
            .filter(|node| before.get(node.id) != Some(*node))
            .cloned()
            .collect();

        let deletions = before
            .nodes()
            .filter(|node| !after.contains(node.id))
            .map(|node| node.id)
            .collect();

        Self { upserts, deletions }
    }

    /// A changeset that writes every node of `tree`.
    pub fn full(tree: &OpeningTree) -> Self {
        Self {
            upserts: tree.nodes().cloned().collect(),
            deletions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletions.is_empty()
    }
}

/// Durable storage for trees, keyed by tree id and node id.
///
/// Every operation must be idempotent: writing the same nodes or deleting the same ids twice is harmless.
pub trait TreeStore {
    /// Inserts or replaces `nodes` in tree `tree_id`.
    fn put_nodes(&mut self, tree_id: &str, nodes: &[PositionNode]) -> Result<()>;

    /// Removes `ids` from tree `tree_id`. Unknown ids are ignored.
    fn delete_nodes(&mut self, tree_id: &str, ids: &[NodeId]) -> Result<()>;

    /// Reads tree `tree_id` back, if anything was stored for it.
    fn load(&self, tree_id: &str) -> Result<Option<OpeningTree>>;

    /// Writes a whole [`Changeset`].
    fn apply(&mut self, tree_id: &str, changes: &Changeset) -> Result<()> {
        if !changes.upserts.is_empty() {
            self.put_nodes(tree_id, &changes.upserts)?;
        }
        if !changes.deletions.is_empty() {
            self.delete_nodes(tree_id, &changes.deletions)?;
        }
        Ok(())
    }
}

/// Nodes of every stored tree, plus the lowest id each tree has never written.
///
/// The id counter only grows, so deleting the newest nodes and reloading never hands their ids out again.
#[derive(Debug, Clone, Default)]
struct NodeTable {
    nodes: BTreeMap<String, BTreeMap<NodeId, PositionNode>>,
    next_ids: BTreeMap<String, u64>,
}

impl NodeTable {
    fn put(&mut self, tree_id: &str, nodes: &[PositionNode]) {
        let tree = self.nodes.entry(tree_id.to_string()).or_default();
        let next_id = self.next_ids.entry(tree_id.to_string()).or_default();
        for node in nodes {
            *next_id = (*next_id).max(node.id.get() + 1);
            tree.insert(node.id, node.clone());
        }
    }

    fn delete(&mut self, tree_id: &str, ids: &[NodeId]) {
        if let Some(tree) = self.nodes.get_mut(tree_id) {
            for id in ids {
                tree.remove(id);
            }
        }
    }

    fn load(&self, tree_id: &str) -> Result<Option<OpeningTree>> {
        match self.nodes.get(tree_id) {
            Some(nodes) if !nodes.is_empty() => OpeningTree::from_nodes(nodes.values().cloned())
                .with_context(|| format!("Stored tree {tree_id:?} is corrupt"))
                .map(|tree| Some(tree.with_next_id(self.next_id(tree_id)))),
            _ => Ok(None),
        }
    }

    fn next_id(&self, tree_id: &str) -> u64 {
        self.next_ids.get(tree_id).copied().unwrap_or_default()
    }
}

/// A [`TreeStore`] that lives entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    trees: NodeTable,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TreeStore for MemoryStore {
    fn put_nodes(&mut self, tree_id: &str, nodes: &[PositionNode]) -> Result<()> {
        self.trees.put(tree_id, nodes);
        Ok(())
    }

    fn delete_nodes(&mut self, tree_id: &str, ids: &[NodeId]) -> Result<()> {
        self.trees.delete(tree_id, ids);
        Ok(())
    }

    fn load(&self, tree_id: &str) -> Result<Option<OpeningTree>> {
        self.trees.load(tree_id)
    }
}

/// A [`TreeStore`] backed by a single JSON document on disk.
///
/// The whole document is rewritten after every operation.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    trees: NodeTable,
}

/// On-disk layout of a [`JsonFileStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    trees: BTreeMap<String, Vec<PositionNode>>,

    /// Lowest id each tree has never written. Older documents without it fall back to the highest stored id.
    #[serde(default)]
    next_ids: BTreeMap<String, u64>,
}

impl JsonFileStore {
    /// Opens the store at `path`, reading it if the file already exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let document = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store {}", path.display()))?;
            serde_json::from_str::<StoreDocument>(&contents)
                .with_context(|| format!("Failed to parse store {}", path.display()))?
        } else {
            StoreDocument::default()
        };

        let trees = NodeTable {
            nodes: document
                .trees
                .into_iter()
                .map(|(id, nodes)| (id, nodes.into_iter().map(|n| (n.id, n)).collect()))
                .collect(),
            next_ids: document.next_ids,
        };

        Ok(Self { path, trees })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let document = StoreDocument {
            trees: self
                .trees
                .nodes
                .iter()
                .map(|(id, nodes)| (id.clone(), nodes.values().cloned().collect()))
                .collect(),
            next_ids: self.trees.next_ids.clone(),
        };

        let json = serde_json::to_string_pretty(&document).context("Failed to encode store")?;

        // Write to a sibling file first so a crash never leaves a half-written store behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }
}

impl TreeStore for JsonFileStore {
    fn put_nodes(&mut self, tree_id: &str, nodes: &[PositionNode]) -> Result<()> {
        self.trees.put(tree_id, nodes);
        self.flush()
    }

    fn delete_nodes(&mut self, tree_id: &str, ids: &[NodeId]) -> Result<()> {
        self.trees.delete(tree_id, ids);
        self.flush()
    }

    fn load(&self, tree_id: &str) -> Result<Option<OpeningTree>> {
        self.trees.load(tree_id)
    }

    fn apply(&mut self, tree_id: &str, changes: &Changeset) -> Result<()> {
        self.trees.put(tree_id, &changes.upserts);
        self.trees.delete(tree_id, &changes.deletions);
        self.flush()
    }
}
