/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{board::FEN_STARTPOS, transposition::position_key, NodeId, OpeningTree};

/// Renders `tree` as a single game of notation text.
///
/// The first child of every node is the main line and all other continuations become variations.
/// Transposition moves are written as one-move variations, since the line they lead to is written elsewhere.
/// A root that isn't the standard starting position is recorded in a `FEN` header.
pub fn export_pgn(tree: &OpeningTree) -> String {
    let mut writer = Writer::default();

    let root = tree.root_node();
    if position_key(&root.fen) != position_key(FEN_STARTPOS) {
        writer.out.push_str("[SetUp \"1\"]\n");
        writer
            .out
            .push_str(&format!("[FEN \"{}\"]\n\n", root.fen.replace('"', "'")));
    }

    writer.line(tree, tree.root(), true);
    writer.word("*");
    writer.out.push('\n');
    writer.out
}

/// One way out of a node.
struct Continuation<'a> {
    mv: &'a str,
    target: NodeId,

    /// Set for moves along a transposition edge, whose target is written on another line.
    linked: bool,
}

fn continuations(tree: &OpeningTree, id: NodeId) -> Vec<Continuation<'_>> {
    let Some(node) = tree.get(id) else {
        return Vec::new();
    };

    let children = node.children.iter().filter_map(|&child| {
        let mv = tree.get(child)?.mv.as_deref()?;
        Some(Continuation {
            mv,
            target: child,
            linked: false,
        })
    });

    let edges = node.transpositions.iter().map(|edge| Continuation {
        mv: edge.mv.as_str(),
        target: edge.target,
        linked: true,
    });

    children.chain(edges).collect()
}

/// Move number text for a move played from `fen`.
///
/// Black's moves only get a number (with an ellipsis) when `force` is set.
fn move_number(fen: &str, force: bool) -> Option<String> {
    let mut fields = fen.split_whitespace();
    let black = fields.nth(1) == Some("b");
    let number = fields.nth(3).and_then(|n| n.parse::<u32>().ok()).unwrap_or(1);

    if black {
        force.then(|| format!("{number}..."))
    } else {
        Some(format!("{number}."))
    }
}

/// Swaps any brace without a partner for a parenthesis, so the comment reads back as one brace comment.
///
/// Balanced pairs are kept, since the tokenizer reads nested braces literally.
fn escape_braces(comment: &str) -> String {
    let mut chars = comment.chars().collect::<Vec<_>>();
    let mut open = Vec::new();

    for (i, c) in chars.iter_mut().enumerate() {
        match c {
            '{' => open.push(i),
            '}' if open.pop().is_none() => *c = ')',
            _ => {}
        }
    }
    for i in open {
        chars[i] = '(';
    }

    chars.into_iter().collect()
}

#[derive(Default)]
struct Writer {
    out: String,
}

impl Writer {
    fn word(&mut self, word: &str) {
        if !(self.out.is_empty() || self.out.ends_with(['\n', '('])) {
            self.out.push(' ');
        }
        self.out.push_str(word);
    }

    fn comment(&mut self, comment: &str) {
        if !comment.is_empty() {
            self.word(&format!("{{{}}}", escape_braces(comment)));
        }
    }

    /// Writes a single move, its number and its comment. Returns `true` if a comment was written.
    fn play(&mut self, tree: &OpeningTree, from: NodeId, step: &Continuation, force: bool) -> bool {
        if let Some(number) = tree.get(from).and_then(|n| move_number(&n.fen, force)) {
            self.word(&number);
        }
        self.word(step.mv);

        if step.linked {
            return false;
        }

        let comment = tree
            .get(step.target)
            .map(|n| n.annotation.comment.as_str())
            .unwrap_or_default();
        self.comment(comment);
        !comment.is_empty()
    }

    /// Writes every line leaving `from`. The main line is followed iteratively; only variations recurse.
    fn line(&mut self, tree: &OpeningTree, mut from: NodeId, mut force: bool) {
        loop {
            let steps = continuations(tree, from);
            let Some((main, rest)) = steps.split_first() else {
                return;
            };

            let commented = self.play(tree, from, main, force);

            for alt in rest {
                self.word("(");
                let commented = self.play(tree, from, alt, true);
                if !alt.linked {
                    self.line(tree, alt.target, commented);
                }
                self.out.push(')');
            }

            if main.linked {
                return;
            }

            // Black's reply needs its number again after anything interrupts the line
            force = commented || !rest.is_empty();
            from = main.target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{board::StandardRules, import_pgn};

    fn import(text: &str) -> OpeningTree {
        import_pgn(text, &OpeningTree::default(), &StandardRules).0
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(export_pgn(&OpeningTree::default()), "*\n");
    }

    #[test]
    fn test_mainline_with_variation_and_comment() {
        let tree = import("1. e4 {King's pawn} e5 (1... c5 2. Nf3) 2. Nf3 *");
        assert_eq!(
            export_pgn(&tree),
            "1. e4 {King's pawn} 1... e5 (1... c5 2. Nf3) 2. Nf3 *\n"
        );
    }

    #[test]
    fn test_balanced_braces_in_comment_survive() {
        let tree = import("1. e4 {Main line {or so}} e5 *");
        let text = export_pgn(&tree);
        assert_eq!(text, "1. e4 {Main line {or so}} 1... e5 *\n");
        assert_eq!(export_pgn(&import(&text)), text);
    }

    #[test]
    fn test_unbalanced_braces_in_comment_escaped() {
        assert_eq!(escape_braces("a {b} c"), "a {b} c");
        assert_eq!(escape_braces("close } here"), "close ) here");
        assert_eq!(escape_braces("open { here"), "open ( here");
        assert_eq!(escape_braces("} {x} {"), ") {x} (");

        let mut tree = OpeningTree::default();
        let root = tree.root();
        let e4 = tree
            .add_child_node(root, "e4", "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
            .unwrap()
            .id;
        tree.update_node(
            e4,
            crate::AnnotationUpdate {
                comment: Some("a } b".into()),
                ..Default::default()
            },
        );
        assert_eq!(export_pgn(&tree), "1. e4 {a ) b} *\n");
    }

    #[test]
    fn test_transposition_written_as_variation() {
        let tree = import("1. d4 Nf6 2. c4 e6 * 1. c4 e6 2. d4 Nf6 *");
        let text = export_pgn(&tree);
        assert_eq!(text, "1. d4 (1. c4 e6 2. d4 Nf6) 1... Nf6 2. c4 e6 *\n");
    }

    #[test]
    fn test_custom_root_gets_fen_header() {
        let fen = "4k3/8/8/8/8/8/4P3/4K3 b - - 0 7";
        let mut tree = OpeningTree::new(fen);
        let root = tree.root();
        tree.add_child_node(root, "Kd7", "8/3k4/8/8/8/8/4P3/4K3 w - - 1 8");

        let text = export_pgn(&tree);
        assert!(text.starts_with("[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 7\"]\n\n"));
        assert!(text.ends_with("7... Kd7 *\n"));
    }

    #[test]
    fn test_export_reimport_keeps_shape() {
        let tree = import("1. d4 Nf6 2. c4 e6 3. Nc3 * 1. c4 e6 2. d4 Nf6 (2... d5) *");
        let again = import(&export_pgn(&tree));

        let (before, after) = (tree.stats(), again.stats());
        assert_eq!(after.nodes, before.nodes);
        assert_eq!(after.transpositions, before.transpositions);
    }
}
