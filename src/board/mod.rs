/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// FEN checks run before a position reaches the move generator.
mod fen;

/// The [`RulesEngine`] seam and its standard-chess implementation.
mod rules;

/// Standard Algebraic Notation parsing and rendering.
mod san;

pub use chessie::{perft, Game, Move, FEN_STARTPOS};
pub use fen::*;
pub use rules::*;
pub use san::*;
