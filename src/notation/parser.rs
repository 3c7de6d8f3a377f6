/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{tokenize, Token};

/// Deepest variation nesting the parser will descend into.
///
/// Anything nested further is skipped whole and reported as [`NotationError::VariationTooDeep`].
pub const MAX_VARIATION_DEPTH: usize = 64;

/// Structural problems found while parsing notation.
///
/// None of these stop parsing; they are collected alongside the games that could be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum NotationError {
    #[error("variation opened at token {index} was never closed")]
    UnclosedVariation { index: usize },

    #[error("unmatched ')' at token {index}")]
    UnmatchedClose { index: usize },

    #[error("variation at token {index} nests deeper than {limit} levels and was skipped")]
    VariationTooDeep { index: usize, limit: usize },
}

/// A single move of a parsed game, along with everything attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveNode {
    /// Move text exactly as written.
    pub text: String,

    /// Comments following this move, joined by single spaces.
    pub comment: Option<String>,

    /// Alternatives to this move, each a line of moves starting from the position before it.
    pub variations: Vec<Vec<MoveNode>>,
}

impl MoveNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Appends `comment` to this move's comment, never overwriting an existing one.
    fn append_comment(&mut self, comment: &str) {
        match self.comment.as_mut() {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(comment);
            }
            None => self.comment = Some(comment.to_string()),
        }
    }
}

/// A single game read from notation text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub headers: BTreeMap<String, String>,
    pub moves: Vec<MoveNode>,
    pub result: Option<String>,
}

/// Everything read from a notation document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedNotation {
    pub games: Vec<Game>,
    pub errors: Vec<NotationError>,
}

/// Tokenizes and parses `text` into games.
pub fn parse_games(text: &str) -> ParsedNotation {
    Parser::new(tokenize(text)).parse()
}

/// Recursive-descent parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<NotationError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Consumes the whole token stream, producing every game that had headers or moves.
    pub fn parse(mut self) -> ParsedNotation {
        let mut games = Vec::new();

        while self.pos < self.tokens.len() {
            let start = self.pos;
            let mut game = Game::default();

            while let Some(Token::Header(_)) = self.peek() {
                if let Some((name, value)) = self.tokens[self.pos].header_pair() {
                    game.headers.insert(name, value);
                }
                self.pos += 1;
            }

            game.moves = self.parse_movetext(0);

            if let Some(Token::Result(result)) = self.peek() {
                game.result = Some(result.clone());
                self.pos += 1;
            }

            if !game.headers.is_empty() || !game.moves.is_empty() {
                games.push(game);
            }

            // Nothing consumed means the current token can't start anything; drop it
            if self.pos == start {
                self.pos += 1;
            }
        }

        ParsedNotation {
            games,
            errors: self.errors,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Parses a line of moves until a variation close, a result, a header, or the end of input.
    ///
    /// The terminating token is left unconsumed for the caller.
    fn parse_movetext(&mut self, depth: usize) -> Vec<MoveNode> {
        let mut moves: Vec<MoveNode> = Vec::new();

        while let Some(token) = self.peek() {
            match token {
                Token::MoveNumber(_) | Token::Annotation(_) => self.pos += 1,

                Token::Comment(comment) => {
                    // A comment before the first move has nothing to attach to
                    if let Some(last) = moves.last_mut() {
                        last.append_comment(comment);
                    }
                    self.pos += 1;
                }

                Token::Move(text) => {
                    moves.push(MoveNode::new(text.as_str()));
                    self.pos += 1;
                }

                Token::VariationOpen => {
                    let index = self.pos;
                    self.pos += 1;

                    if depth + 1 >= MAX_VARIATION_DEPTH {
                        self.skip_variation();
                        self.errors.push(NotationError::VariationTooDeep {
                            index,
                            limit: MAX_VARIATION_DEPTH,
                        });
                        continue;
                    }

                    let variation = self.parse_movetext(depth + 1);

                    if let Some(Token::VariationClose) = self.peek() {
                        self.pos += 1;
                    } else {
                        self.errors.push(NotationError::UnclosedVariation { index });
                    }

                    // Orphaned variations with no preceding move are dropped
                    if let Some(last) = moves.last_mut() {
                        last.variations.push(variation);
                    }
                }

                Token::VariationClose if depth == 0 => {
                    self.errors.push(NotationError::UnmatchedClose { index: self.pos });
                    self.pos += 1;
                }

                Token::VariationClose | Token::Result(_) | Token::Header(_) => break,
            }
        }

        moves
    }

    /// Skips past the close matching an already-consumed `(`, or to the end of input.
    fn skip_variation(&mut self) {
        let mut depth = 1;
        while let Some(token) = self.peek() {
            match token {
                Token::VariationOpen => depth += 1,
                Token::VariationClose => depth -= 1,
                _ => {}
            }
            self.pos += 1;
            if depth == 0 {
                break;
            }
        }
    }
}
