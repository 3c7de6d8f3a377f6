/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Result;
use chessie::Game;

use super::{normalize_fen, Algebraic};

/// A move was rejected by a [`RulesEngine`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid move {mv:?}: {message}")]
pub struct InvalidMove {
    /// The move text as it was supplied.
    pub mv: String,

    /// Why the move was rejected.
    pub message: String,
}

impl InvalidMove {
    pub fn new(mv: impl Into<String>, message: impl ToString) -> Self {
        Self {
            mv: mv.into(),
            message: message.to_string(),
        }
    }
}

/// Result of successfully applying a move to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// FEN of the resulting position.
    pub fen: String,

    /// Canonical rendering of the move that was applied.
    pub san: String,
}

/// Anything that can validate a move against a position and play it.
///
/// The tree and import engine never inspect board state themselves; everything goes through this trait.
pub trait RulesEngine {
    /// Applies `mv` to the position encoded by `fen`.
    fn apply(&self, fen: &str, mv: &str) -> Result<Applied, InvalidMove>;
}

/// [`RulesEngine`] for standard chess, backed by [`chessie`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRules;

impl StandardRules {
    /// Builds a [`Game`] from `fen`, rejecting anything the move generator cannot handle.
    pub fn game(fen: &str) -> Result<Game> {
        Game::from_fen(&normalize_fen(fen)?)
    }

    /// FEN of `game`, with the en passant square only written when the capture is actually legal.
    ///
    /// Two move orders reaching the same position then produce the same FEN.
    pub fn fen_of(game: &Game) -> String {
        let fen = game.to_fen();
        if game.ep_square().is_none() || game.get_legal_moves().iter().any(|mv| mv.is_en_passant())
        {
            return fen;
        }

        let mut fields = fen.split(' ').collect::<Vec<_>>();
        if let Some(ep) = fields.get_mut(3) {
            *ep = "-";
        }
        fields.join(" ")
    }
}

impl RulesEngine for StandardRules {
    fn apply(&self, fen: &str, mv: &str) -> Result<Applied, InvalidMove> {
        let game = Self::game(fen)
            .map_err(|err| InvalidMove::new(mv, format!("cannot read position: {err}")))?;

        let legal = game.get_legal_moves();
        let parsed = game.parse_move(mv).map_err(|err| InvalidMove::new(mv, err))?;

        Ok(Applied {
            san: game.to_san_with(parsed, &legal),
            fen: Self::fen_of(&game.with_move_made(parsed)),
        })
    }
}
