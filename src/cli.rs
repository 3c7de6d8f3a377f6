/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{path::PathBuf, str::FromStr};

use clap::Parser;

use crate::NodeId;

/// A command to be run against the open repertoire.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<COMMAND> [ARGS]")
)]
pub enum TreeCommand {
    /// Print the selected node: its path from the root, position and annotation.
    #[command(alias = "d")]
    Display,

    /// Play a move from the selected node and select the resulting node.
    ///
    /// Accepts standard algebraic notation or coordinates (`e2e4`). Illegal moves are ignored.
    #[command(aliases = ["move", "m"])]
    Play { mv: String },

    /// Select a node by id, or the root if no id is given.
    #[command(alias = "s")]
    Select { id: Option<NodeId> },

    /// Select the parent of the selected node.
    #[command(alias = "b")]
    Back,

    /// Merge every game in a notation file into the tree.
    Import { path: PathBuf },

    /// Write the tree as notation, to a file or to stdout.
    Export { path: Option<PathBuf> },

    /// Set the comment of the selected node. With no text, the comment is cleared.
    #[command(alias = "c")]
    Comment { text: Vec<String> },

    /// Set the highlight color of the selected node, or clear it if none is given.
    Color { color: Option<String> },

    /// Add a tag to the selected node.
    Tag {
        tag: String,

        /// Remove the tag instead of adding it.
        #[arg(short, long, default_value = "false")]
        remove: bool,
    },

    /// Delete a node and everything below it. Defaults to the selected node.
    #[command(alias = "del")]
    Delete { id: Option<NodeId> },

    /// Delete every node except the root.
    Clear,

    /// Revert the last change.
    #[command(alias = "u")]
    Undo,

    /// Re-apply the last reverted change.
    #[command(alias = "r")]
    Redo,

    /// Print the FEN of the selected node.
    Fen,

    /// List the moves leaving the selected node, including transpositions.
    Moves {
        /// If set, every legal move in the position is listed instead.
        #[arg(short, long, default_value = "false")]
        legal: bool,
    },

    /// Print the size of the tree and the state of the undo history.
    Stats,

    /// Quit.
    #[command(aliases = ["quit", "q"])]
    Exit,
}

impl FromStr for TreeCommand {
    type Err = clap::Error;
    /// Attempt to parse a [`TreeCommand`] from a line of input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}
