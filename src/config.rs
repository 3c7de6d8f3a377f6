/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::{
    board::StandardRules, JsonFileStore, OpeningTree, Repertoire, TreeStore, DEFAULT_HISTORY_DEPTH,
};

/// Command-line options for the `repertoire` binary.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// JSON file the tree is loaded from and saved to. Without one, nothing is saved.
    #[arg(short, long, env = "REPERTOIRE_STORE")]
    pub store: Option<PathBuf>,

    /// Id of the tree to open within the store.
    #[arg(short, long, default_value = "main")]
    pub tree: String,

    /// Number of changes that can be undone.
    #[arg(long, default_value_t = DEFAULT_HISTORY_DEPTH)]
    pub history: usize,

    /// Commands to run on startup, in order, before reading from stdin.
    #[arg(short = 'x', long = "exec", value_name = "COMMAND")]
    pub exec: Vec<String>,

    /// Exit after running the startup commands instead of reading from stdin.
    #[arg(short, long, default_value = "false")]
    pub batch: bool,
}

impl Config {
    /// Opens the configured tree, loading it from the store if it was saved before.
    pub fn open_repertoire(&self) -> Result<Repertoire> {
        let Some(path) = &self.store else {
            return Ok(Repertoire::new(&self.tree).history_limit(self.history));
        };

        let store = JsonFileStore::open(path)?;
        let tree = match store.load(&self.tree)? {
            Some(tree) => {
                info!(tree = %self.tree, nodes = tree.len(), "loaded tree");
                tree
            }
            None => {
                info!(tree = %self.tree, "created tree");
                OpeningTree::default()
            }
        };

        Ok(Repertoire::with_tree(&self.tree, tree, StandardRules)
            .history_limit(self.history)
            .store(Box::new(store)))
    }
}
