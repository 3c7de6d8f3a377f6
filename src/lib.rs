/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Chess rules on top of `chessie`: FEN checks, move notation and the rules engine.
pub mod board;

/// Reading games out of notation text.
pub mod notation;

/// Interactive commands.
mod cli;

/// Command-line configuration of the binary.
mod config;

/// Writing a tree back out as notation text.
mod export;

/// Undo/redo snapshots.
mod history;

/// Merging parsed games into a tree.
mod import;

/// The editable repertoire: tree, selection, history and storage.
mod repertoire;

/// The interactive command loop.
mod session;

/// Saving and loading trees.
mod store;

/// Detecting positions reached by different move orders.
mod transposition;

/// The opening tree itself.
mod tree;

pub use cli::*;
pub use config::*;
pub use export::*;
pub use history::*;
pub use import::*;
pub use repertoire::*;
pub use session::*;
pub use store::*;
pub use transposition::*;
pub use tree::*;
