/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    board::RulesEngine,
    notation::{parse_games, MoveNode},
    KeyIndex, NodeId, OpeningTree, Resolution,
};

/// A problem encountered during an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    /// 1-based number of the game the problem was found in, or `0` for structural notation errors.
    pub game: usize,

    /// The offending move text. Empty for structural errors.
    #[serde(rename = "move")]
    pub mv: String,

    pub message: String,
}

/// Totals gathered over a whole import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub games_processed: usize,
    pub nodes_created: usize,

    /// Moves that resolved to an existing node, including new transpositions.
    pub nodes_reused: usize,

    /// Moves that were linked to an existing node elsewhere with a new transposition edge.
    pub transpositions_found: usize,

    pub errors: Vec<ImportError>,
}

/// Folds every game in `text` into a copy of `tree`.
///
/// `tree` itself is never modified; the merged tree is returned alongside the totals.
/// Import never fails outright: anything that can't be read or played is recorded in [`ImportStats::errors`]
/// and everything before it is kept.
pub fn import_pgn<R: RulesEngine + ?Sized>(
    text: &str,
    tree: &OpeningTree,
    rules: &R,
) -> (OpeningTree, ImportStats) {
    let parsed = parse_games(text);

    let mut importer = Importer {
        index: KeyIndex::build(tree),
        tree: tree.clone(),
        rules,
        stats: ImportStats::default(),
    };

    for err in parsed.errors {
        warn!("notation error: {err}");
        importer.stats.errors.push(ImportError {
            game: 0,
            mv: String::new(),
            message: err.to_string(),
        });
    }

    let root = importer.tree.root();
    for (i, game) in parsed.games.iter().enumerate() {
        importer.merge_line(i + 1, root, &game.moves);
        importer.stats.games_processed += 1;
    }

    let Importer { tree, stats, .. } = importer;
    info!(
        games = stats.games_processed,
        created = stats.nodes_created,
        reused = stats.nodes_reused,
        transpositions = stats.transpositions_found,
        errors = stats.errors.len(),
        "import finished"
    );

    (tree, stats)
}

/// Working state of a single import.
struct Importer<'a, R: ?Sized> {
    tree: OpeningTree,
    index: KeyIndex,
    rules: &'a R,
    stats: ImportStats,
}

impl<R: RulesEngine + ?Sized> Importer<'_, R> {
    /// Walks `moves` starting from `parent`, resolving each move against the tree.
    ///
    /// Variations branch from the position *before* the move they are attached to.
    /// The first move the rules reject ends this line, and its own variations are not visited.
    fn merge_line(&mut self, game: usize, parent: NodeId, moves: &[MoveNode]) {
        let mut current = parent;

        for mv in moves {
            let Some(fen) = self.tree.get(current).map(|node| node.fen.clone()) else {
                return;
            };

            let applied = match self.rules.apply(&fen, &mv.text) {
                Ok(applied) => applied,
                Err(err) => {
                    warn!(game, mv = %mv.text, "{}", err.message);
                    self.stats.errors.push(ImportError {
                        game,
                        mv: mv.text.clone(),
                        message: err.message,
                    });
                    return;
                }
            };

            let Some(outcome) = self.tree.resolve_move(
                current,
                &applied.san,
                &applied.fen,
                mv.comment.as_deref(),
                Some(&mut self.index),
            ) else {
                return;
            };

            debug!(
                game,
                mv = %applied.san,
                node = %outcome.id,
                resolution = ?outcome.resolution,
                "resolved move"
            );
            match outcome.resolution {
                Resolution::Created => self.stats.nodes_created += 1,
                Resolution::NewTransposition => {
                    self.stats.nodes_reused += 1;
                    self.stats.transpositions_found += 1;
                }
                Resolution::ExistingChild | Resolution::ExistingTransposition => {
                    self.stats.nodes_reused += 1
                }
            }

            for variation in &mv.variations {
                self.merge_line(game, current, variation);
            }

            current = outcome.id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::StandardRules;

    #[test]
    fn test_comment_fills_empty_but_never_overwrites() {
        let (tree, _) = import_pgn("1. e4 e5 *", &OpeningTree::default(), &StandardRules);
        let (tree, stats) = import_pgn("1. e4 {Best by test} e5 *", &tree, &StandardRules);
        assert_eq!(stats.nodes_reused, 2);

        let e4 = tree.find_child(tree.root(), "e4").unwrap();
        assert_eq!(tree.get(e4).unwrap().annotation.comment, "Best by test");

        let (tree, _) = import_pgn("1. e4 {Something else} *", &tree, &StandardRules);
        assert_eq!(tree.get(e4).unwrap().annotation.comment, "Best by test");
    }

    #[test]
    fn test_structural_errors_reported_as_game_zero() {
        let (_, stats) = import_pgn("1. e4 (1. d4", &OpeningTree::default(), &StandardRules);
        assert_eq!(stats.nodes_created, 2);
        assert_eq!(stats.errors.len(), 1);
        assert_eq!(stats.errors[0].game, 0);
        assert!(stats.errors[0].mv.is_empty());
    }

    #[test]
    fn test_moves_are_stored_canonically() {
        let (tree, _) = import_pgn("1. g1f3 Ng8f6 2. 0-0?? *", &OpeningTree::default(), &StandardRules);
        let nf3 = tree.find_child(tree.root(), "Nf3").unwrap();
        assert!(tree.find_child(nf3, "Nf6").is_some());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let (_, stats) = import_pgn("1. e4 Zz9 *", &OpeningTree::default(), &StandardRules);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["gamesProcessed"], 1);
        assert_eq!(json["nodesCreated"], 1);
        assert_eq!(json["errors"][0]["move"], "Zz9");
    }
}
