/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{anyhow, bail, Result};
use chessie::{Game, Square};

/// Mailbox of FEN piece chars, indexed by `[rank][file]` from White's side.
type Placements = [[Option<char>; 8]; 8];

/// Checks `fen` and rewrites it as the six-field FEN that [`Game::from_fen`] can take without panicking.
///
/// Only the piece placements are required; any missing trailing fields default to `w - - 0 1`.
/// Castling rights without their King and Rook on the home squares are dropped,
/// as is an en passant square with no pawn behind it to capture.
pub fn normalize_fen(fen: &str) -> Result<String> {
    let mut fields = fen.split_ascii_whitespace();
    let placements = fields
        .next()
        .ok_or(anyhow!("FEN string must have piece placements."))?;
    let board = read_placements(placements)?;

    let white_to_move = match fields.next().unwrap_or("w") {
        "w" => true,
        "b" => false,
        other => bail!("FEN side to move must be 'w' or 'b'. Got {other:?}"),
    };

    let castling = read_castling(fields.next().unwrap_or("-"), &board)?;
    let ep = read_ep_square(fields.next().unwrap_or("-"), &board, white_to_move)?;

    let halfmove = fields.next().unwrap_or("0");
    let halfmove: u32 = halfmove.parse().or(Err(anyhow!(
        "FEN string must have valid halfmove counter. Got {halfmove:?}"
    )))?;

    let fullmove = fields.next().unwrap_or("1");
    let fullmove: u32 = fullmove.parse().or(Err(anyhow!(
        "FEN string must have valid fullmove counter. Got {fullmove:?}"
    )))?;

    // The player who just moved cannot have left their own King in check
    let side = if white_to_move { "w" } else { "b" };
    let idle = if white_to_move { "b" } else { "w" };
    if Game::from_fen(&format!("{placements} {idle} - - 0 1"))?.is_in_check() {
        bail!("FEN has the side not to move in check");
    }

    Ok(format!(
        "{placements} {side} {castling} {ep} {halfmove} {fullmove}"
    ))
}

fn read_placements(placements: &str) -> Result<Placements> {
    let rows = placements.split('/').collect::<Vec<_>>();
    if rows.len() != 8 {
        bail!("FEN must have piece placements for all 8 ranks. Got {placements:?}");
    }

    let mut board: Placements = Default::default();

    // Ranks are listed from the 8th down to the 1st
    for (rank, row) in rows.into_iter().rev().enumerate() {
        let mut file = 0usize;
        for c in row.chars() {
            match c {
                '1'..='8' => file += c as usize - '0' as usize,
                'P' | 'N' | 'B' | 'R' | 'Q' | 'K' | 'p' | 'n' | 'b' | 'r' | 'q' | 'k' => {
                    if file >= 8 {
                        bail!("FEN rank {row:?} has more than 8 files");
                    }
                    board[rank][file] = Some(c);
                    file += 1;
                }
                _ => bail!("FEN placements must contain piece chars or digits 1-8. Got {c:?}"),
            }

            if file > 8 {
                bail!("FEN rank {row:?} has more than 8 files");
            }
        }

        if file != 8 {
            bail!("FEN rank {row:?} must describe exactly 8 files");
        }
    }

    for king in ['K', 'k'] {
        let count = board.iter().flatten().filter(|c| **c == Some(king)).count();
        if count != 1 {
            bail!("FEN must have exactly one {king:?}. Found {count}");
        }
    }

    if board[0].iter().chain(&board[7]).any(|c| matches!(c, Some('P' | 'p'))) {
        bail!("FEN cannot have pawns on the first or last rank");
    }

    Ok(board)
}

fn read_castling(castling: &str, board: &Placements) -> Result<String> {
    if castling == "-" {
        return Ok(String::from("-"));
    }

    for c in castling.chars() {
        if !matches!(c, 'K' | 'Q' | 'k' | 'q') || castling.matches(c).count() > 1 {
            bail!("Invalid castling rights {castling:?}");
        }
    }

    // Each right needs the King on e1/e8 and its Rook in the corner
    let mut rights = String::with_capacity(4);
    for (c, rank, king, rook, rook_file) in [
        ('K', 0, 'K', 'R', 7),
        ('Q', 0, 'K', 'R', 0),
        ('k', 7, 'k', 'r', 7),
        ('q', 7, 'k', 'r', 0),
    ] {
        if castling.contains(c)
            && board[rank][4] == Some(king)
            && board[rank][rook_file] == Some(rook)
        {
            rights.push(c);
        }
    }

    if rights.is_empty() {
        rights.push('-');
    }
    Ok(rights)
}

fn read_ep_square(ep: &str, board: &Placements, white_to_move: bool) -> Result<String> {
    if ep == "-" {
        return Ok(String::from("-"));
    }

    let square = Square::from_uci(ep)?;
    let file = square.file().index();

    // White captures onto the 6th rank, past a black pawn on the 5th, and vice versa
    let (target, origin, victim, pawn) = if white_to_move {
        (5, 6, 4, 'p')
    } else {
        (2, 1, 3, 'P')
    };

    let capturable = square.rank().index() == target
        && board[target][file].is_none()
        && board[origin][file].is_none()
        && board[victim][file] == Some(pawn);

    Ok(if capturable {
        square.to_string()
    } else {
        String::from("-")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessie::FEN_STARTPOS;

    #[test]
    fn test_startpos_unchanged() {
        assert_eq!(normalize_fen(FEN_STARTPOS).unwrap(), FEN_STARTPOS);
    }

    #[test]
    fn test_fen_defaults_missing_fields() {
        assert_eq!(
            normalize_fen("4k3/8/8/8/8/8/8/4K3").unwrap(),
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1"
        );
    }

    #[test]
    fn test_fen_rejects_garbage() {
        assert!(normalize_fen("").is_err());
        assert!(normalize_fen("8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(normalize_fen("4k3/8/8/8/8/8/8/4K2 w - - 0 1").is_err());
        assert!(normalize_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
        assert!(normalize_fen("4k3/8/8/8/8/8/8/4K3 w Z - 0 1").is_err());
        assert!(normalize_fen("4k3/8/8/8/8/8/8/4K3 w KK - 0 1").is_err());
        assert!(normalize_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
        assert!(normalize_fen("4k3/8/8/8/8/8/8/4K3 w - - -1 1").is_err());
        assert!(normalize_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn test_oversized_ranks_rejected() {
        assert!(normalize_fen("99999999999999999999999999999/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(normalize_fen("88888888/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
        assert!(normalize_fen("4k3p/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn test_counters_are_bounded() {
        let huge = format!("4k3/8/8/8/8/8/8/4K3 w - - {} 1", u64::MAX);
        assert!(normalize_fen(&huge).is_err());
    }

    #[test]
    fn test_stale_castling_and_ep_dropped() {
        // No Rook on h1, and nothing to capture on e3
        assert_eq!(
            normalize_fen("r3k2r/8/8/8/8/8/8/R3K3 b KQkq e3 0 1").unwrap(),
            "r3k2r/8/8/8/8/8/8/R3K3 b Qkq - 0 1"
        );

        assert_eq!(
            normalize_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap(),
            "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1"
        );
    }

    #[test]
    fn test_idle_side_in_check_rejected() {
        assert!(normalize_fen("4k3/8/8/8/8/8/8/4KR2 w - - 0 1").is_ok());
        assert!(normalize_fen("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1").is_err());
    }
}
