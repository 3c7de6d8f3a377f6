/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{anyhow, bail, Result};
use chessie::{Game, Move, PieceKind, Square};

/// Standard Algebraic Notation on top of a [`Game`]'s legal moves.
pub trait Algebraic {
    /// Renders `mv` in Standard Algebraic Notation, including any check or mate suffix.
    ///
    /// Disambiguation is minimal: file first, then rank, then both.
    fn to_san(&self, mv: Move) -> String;

    /// Same as [`Algebraic::to_san`], but reuses an already-generated list of legal moves.
    fn to_san_with(&self, mv: Move, legal: &[Move]) -> String;

    /// Resolves move text into a legal [`Move`].
    ///
    /// Accepts SAN with optional capture markers, check/mate suffixes, annotation glyphs,
    /// over-disambiguation, `=Q` or bare `Q` promotions, and `0-0` style castling.
    /// Coordinate notation such as `e2e4` or `e7e8q` is accepted as well.
    fn parse_move(&self, text: &str) -> Result<Move>;
}

impl Algebraic for Game {
    fn to_san(&self, mv: Move) -> String {
        self.to_san_with(mv, &self.get_legal_moves())
    }

    fn to_san_with(&self, mv: Move, legal: &[Move]) -> String {
        let mut san = String::with_capacity(8);
        let kind = self.board().kind_at(mv.from());

        if mv.is_short_castle() {
            san.push_str("O-O");
        } else if mv.is_long_castle() {
            san.push_str("O-O-O");
        } else if kind == Some(PieceKind::Pawn) {
            if mv.is_capture() {
                san.push(mv.from().file().char());
                san.push('x');
            }
            san.push_str(&mv.to().to_string());
            if let Some(promotion) = mv.promotion() {
                san.push('=');
                san.push(piece_letter(promotion));
            }
        } else {
            if let Some(kind) = kind {
                san.push(piece_letter(kind));
            }

            // Other pieces of the same kind that could also reach the destination
            let rivals = legal
                .iter()
                .filter(|other| {
                    other.to() == mv.to()
                        && other.from() != mv.from()
                        && !other.is_castle()
                        && self.board().kind_at(other.from()) == kind
                })
                .collect::<Vec<_>>();

            if !rivals.is_empty() {
                let from = mv.from();
                let shares_file = rivals.iter().any(|o| o.from().file() == from.file());
                let shares_rank = rivals.iter().any(|o| o.from().rank() == from.rank());
                if !shares_file {
                    san.push(from.file().char());
                } else if !shares_rank {
                    san.push(from.rank().char());
                } else {
                    san.push_str(&from.to_string());
                }
            }

            if mv.is_capture() {
                san.push('x');
            }
            san.push_str(&mv.to().to_string());
        }

        let next = self.with_move_made(mv);
        if next.is_in_check() {
            san.push(if next.get_legal_moves().is_empty() {
                '#'
            } else {
                '+'
            });
        }

        san
    }

    fn parse_move(&self, text: &str) -> Result<Move> {
        let trimmed = text.trim().trim_end_matches(['+', '#', '!', '?']);
        if trimmed.is_empty() {
            bail!("Cannot parse empty move");
        }

        let legal = self.get_legal_moves();

        let castle = match trimmed {
            "O-O" | "0-0" => Some(true),
            "O-O-O" | "0-0-0" => Some(false),
            _ => None,
        };
        if let Some(short) = castle {
            return legal
                .into_iter()
                .find(|mv| if short { mv.is_short_castle() } else { mv.is_long_castle() })
                .ok_or(anyhow!("Castling {trimmed:?} is not legal here"));
        }

        let uci = trimmed.to_ascii_lowercase();
        if let Some(mv) = legal.iter().find(|mv| mv.to_uci() == uci) {
            return Ok(*mv);
        }

        let (body, promotion) = split_promotion(trimmed)?;

        let mut chars = body.chars().peekable();
        let kind = match chars.peek() {
            Some(c) if c.is_ascii_uppercase() => {
                let kind = piece_from_letter(*c)?;
                chars.next();
                kind
            }
            _ => PieceKind::Pawn,
        };

        let rest = chars
            .filter(|c| !matches!(c, 'x' | ':' | '-'))
            .collect::<Vec<_>>();
        if rest.len() < 2 || rest.len() > 4 {
            bail!("Could not parse move {text:?}");
        }

        let (hint, target) = rest.split_at(rest.len() - 2);
        let to = Square::from_uci(&target.iter().collect::<String>())?;

        let mut from_file = None;
        let mut from_rank = None;
        for c in hint {
            match c {
                'a'..='h' => from_file = Some(*c),
                '1'..='8' => from_rank = Some(*c),
                _ => bail!("Could not parse move {text:?}"),
            }
        }

        let candidates = legal
            .into_iter()
            .filter(|mv| {
                mv.to() == to
                    && !mv.is_castle()
                    && mv.promotion() == promotion
                    && self.board().kind_at(mv.from()) == Some(kind)
                    && from_file.map_or(true, |f| mv.from().file().char() == f)
                    && from_rank.map_or(true, |r| mv.from().rank().char() == r)
            })
            .collect::<Vec<_>>();

        match candidates.as_slice() {
            [mv] => Ok(*mv),
            [] => bail!("{text:?} is not a legal move in this position"),
            _ => bail!("{text:?} is ambiguous in this position"),
        }
    }
}

/// Uppercase SAN letter of a piece kind.
fn piece_letter(kind: PieceKind) -> char {
    kind.char().to_ascii_uppercase()
}

/// Reads an uppercase SAN piece letter. Pawns have none.
fn piece_from_letter(c: char) -> Result<PieceKind> {
    match c {
        'N' => Ok(PieceKind::Knight),
        'B' => Ok(PieceKind::Bishop),
        'R' => Ok(PieceKind::Rook),
        'Q' => Ok(PieceKind::Queen),
        'K' => Ok(PieceKind::King),
        _ => bail!("Invalid SAN piece letter {c:?}"),
    }
}

/// Reads a promotion letter, in either case.
fn promotion_from_letter(c: char) -> Result<PieceKind> {
    match piece_from_letter(c.to_ascii_uppercase())? {
        PieceKind::King => bail!("Cannot promote to a King"),
        kind => Ok(kind),
    }
}

/// Splits a trailing promotion off of SAN move text, as either `e8=Q` or `e8Q`.
fn split_promotion(text: &str) -> Result<(&str, Option<PieceKind>)> {
    if let Some((body, promo)) = text.split_once('=') {
        let mut chars = promo.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            bail!("Invalid promotion in {text:?}");
        };
        return Ok((body, Some(promotion_from_letter(c)?)));
    }

    let mut rev = text.chars().rev();
    if let (Some(last), Some(prev)) = (rev.next(), rev.next()) {
        if prev.is_ascii_digit() && matches!(last, 'Q' | 'R' | 'B' | 'N' | 'q' | 'r' | 'b' | 'n') {
            let body = &text[..text.len() - last.len_utf8()];
            return Ok((body, Some(promotion_from_letter(last)?)));
        }
    }

    Ok((text, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn san_after(fen: &str, text: &str) -> String {
        let game = Game::from_fen(fen).unwrap();
        let mv = game.parse_move(text).unwrap();
        game.to_san(mv)
    }

    #[test]
    fn test_simple_san() {
        let game = Game::default();
        assert_eq!(game.to_san(game.parse_move("e4").unwrap()), "e4");
        assert_eq!(game.to_san(game.parse_move("Nf3").unwrap()), "Nf3");
        assert_eq!(game.to_san(game.parse_move("g1f3").unwrap()), "Nf3");
        assert_eq!(game.to_san(game.parse_move("Ngf3!?").unwrap()), "Nf3");
    }

    #[test]
    fn test_rejects_illegal_and_garbage() {
        let game = Game::default();
        assert!(game.parse_move("Zz9").is_err());
        assert!(game.parse_move("e5").is_err());
        assert!(game.parse_move("Ke2").is_err());
        assert!(game.parse_move("O-O").is_err());
        assert!(game.parse_move("").is_err());
    }

    #[test]
    fn test_disambiguation() {
        // Two Knights can reach d2
        let fen = "4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1";
        assert_eq!(san_after(fen, "Nbd2"), "Nbd2");
        assert_eq!(san_after(fen, "Nfd2"), "Nfd2");
        assert!(Game::from_fen(fen).unwrap().parse_move("Nd2").is_err());

        // Two Rooks on the same file
        let fen = "4k3/8/8/R7/8/8/8/R3K3 w - - 0 1";
        assert_eq!(san_after(fen, "R1a3"), "R1a3");
        assert_eq!(san_after(fen, "a5a3"), "R5a3");
    }

    #[test]
    fn test_castling_and_promotion() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san_after(fen, "0-0"), "O-O");
        assert_eq!(san_after(fen, "O-O-O"), "O-O-O");
        assert_eq!(san_after(fen, "e1g1"), "O-O");

        let fen = "8/4P3/8/8/8/8/8/k3K3 w - - 0 1";
        assert_eq!(san_after(fen, "e8=Q"), "e8=Q");
        assert_eq!(san_after(fen, "e8N"), "e8=N");
        assert!(Game::from_fen(fen).unwrap().parse_move("e8").is_err());
        assert!(Game::from_fen(fen).unwrap().parse_move("e8=K").is_err());
    }

    #[test]
    fn test_check_and_mate_suffixes() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";
        assert_eq!(san_after(fen, "Qh4"), "Qh4#");

        let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1";
        assert_eq!(san_after(fen, "Ra8"), "Ra8+");
    }

    #[test]
    fn test_pawn_captures() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        assert_eq!(san_after(fen, "exd5"), "exd5");
        assert_eq!(san_after(fen, "ed5"), "exd5");
    }

    #[test]
    fn test_en_passant() {
        let fen = "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1";
        assert_eq!(san_after(fen, "dxe3"), "dxe3");
        assert_eq!(san_after(fen, "d4e3"), "dxe3");
    }
}
