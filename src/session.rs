/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fs, io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::{
    board::{Algebraic, RulesEngine, StandardRules},
    AnnotationUpdate, Repertoire, TreeCommand,
};

/// An interactive editing session over a single [`Repertoire`].
///
/// Commands arrive over a channel, either from [`Session::send_command`] or from a thread reading `stdin`,
/// and are executed one at a time on the thread that called [`Session::run`].
pub struct Session<R = StandardRules> {
    /// The repertoire being edited.
    repertoire: Repertoire<R>,

    /// One half of a channel, responsible for sending commands to the session to execute.
    sender: Sender<TreeCommand>,

    /// One half of a channel, responsible for receiving commands for the session to execute.
    receiver: Receiver<TreeCommand>,
}

impl<R: RulesEngine> Session<R> {
    /// Constructs a new [`Session`] around `repertoire`, to be executed with [`Session::run`].
    pub fn new(repertoire: Repertoire<R>) -> Self {
        let (sender, receiver) = channel();

        Self {
            repertoire,
            sender,
            receiver,
        }
    }

    pub fn repertoire(&self) -> &Repertoire<R> {
        &self.repertoire
    }

    /// Sends a [`TreeCommand`] to the session to be executed.
    pub fn send_command(&self, command: TreeCommand) {
        // Safe unwrap: `send` can only fail if its corresponding receiver doesn't exist,
        //  and our `Receiver` lives exactly as long as the session does.
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop of the session.
    ///
    /// This spawns a thread to handle input from `stdin` and executes received commands until told to exit.
    pub fn run(&mut self) -> Result<()> {
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                debug!("input handler stopped: {err:#}");
            }
        });

        self.drain()
    }

    /// Executes queued commands until [`TreeCommand::Exit`] is received or every sender is gone.
    ///
    /// Failing commands are reported and do not stop the session.
    pub fn drain(&mut self) -> Result<()> {
        while let Ok(cmd) = self.receiver.recv() {
            if cmd == TreeCommand::Exit {
                break;
            }

            if let Err(err) = self.execute(cmd) {
                eprintln!("Error: {err:#}");
            }
        }

        Ok(())
    }

    /// Executes a single [`TreeCommand`].
    pub fn execute(&mut self, cmd: TreeCommand) -> Result<()> {
        match cmd {
            TreeCommand::Display => self.display(),

            TreeCommand::Play { mv } => match self.repertoire.play(&mv) {
                Some(outcome) => println!("{} ({:?})", outcome.id, outcome.resolution),
                None => println!("{mv:?} cannot be played here"),
            },

            TreeCommand::Select { id } => {
                let id = id.unwrap_or(self.repertoire.tree().root());
                if !self.repertoire.select(id) {
                    bail!("No node {id}");
                }
            }

            TreeCommand::Back => {
                if let Some(parent) = self.repertoire.selected_node().parent {
                    self.repertoire.select(parent);
                }
            }

            TreeCommand::Import { path } => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let stats = self.repertoire.import_pgn(&text);
                let json = serde_json::to_string_pretty(&stats)
                    .context("Failed to encode import stats")?;
                println!("{json}");
            }

            TreeCommand::Export { path } => {
                let text = self.repertoire.export_pgn();
                match path {
                    Some(path) => fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?,
                    None => print!("{text}"),
                }
            }

            TreeCommand::Comment { text } => self.annotate(AnnotationUpdate {
                comment: Some(text.join(" ")),
                ..Default::default()
            }),

            TreeCommand::Color { color } => self.annotate(AnnotationUpdate {
                color: Some(color),
                ..Default::default()
            }),

            TreeCommand::Tag { tag, remove } => {
                let mut tags = self.repertoire.selected_node().annotation.tags.clone();
                if remove {
                    tags.remove(&tag);
                } else {
                    tags.insert(tag);
                }
                self.annotate(AnnotationUpdate {
                    tags: Some(tags),
                    ..Default::default()
                });
            }

            TreeCommand::Delete { id } => {
                let id = id.unwrap_or(self.repertoire.selected());
                if id == self.repertoire.tree().root() {
                    bail!("The root cannot be deleted; use `clear` instead");
                }
                if !self.repertoire.tree().contains(id) {
                    bail!("No node {id}");
                }
                let removed = self.repertoire.delete_node(id);
                println!("Deleted {removed} node(s)");
            }

            TreeCommand::Clear => {
                let removed = self.repertoire.clear_graph();
                println!("Deleted {removed} node(s)");
            }

            TreeCommand::Undo => {
                if !self.repertoire.undo() {
                    println!("Nothing to undo");
                }
            }

            TreeCommand::Redo => {
                if !self.repertoire.redo() {
                    println!("Nothing to redo");
                }
            }

            TreeCommand::Fen => println!("{}", self.repertoire.selected_node().fen),

            TreeCommand::Moves { legal } => self.moves(legal)?,

            TreeCommand::Stats => {
                let stats = self.repertoire.tree().stats();
                let (undo, redo) = self.repertoire.history().depths();
                println!(
                    "{} nodes, {} transpositions, deepest line {} ply",
                    stats.nodes, stats.transpositions, stats.max_depth
                );
                println!("{undo} undo / {redo} redo");
            }

            // Handled by the event loop
            TreeCommand::Exit => {}
        }

        Ok(())
    }

    /// Executes the `display` command, printing everything known about the selected node.
    fn display(&self) {
        let tree = self.repertoire.tree();
        let node = self.repertoire.selected_node();
        let path = tree.path_to(node.id).unwrap_or_default();

        println!("Node {}: {}", node.id, path.join(" "));

        match StandardRules::game(&node.fen) {
            Ok(game) => println!("\n{game}\n"),
            Err(_) => println!("FEN: {}", node.fen),
        }

        let annotation = &node.annotation;
        if !annotation.comment.is_empty() {
            println!("Comment: {}", annotation.comment);
        }
        if let Some(color) = &annotation.color {
            println!("Color: {color}");
        }
        if !annotation.tags.is_empty() {
            let tags = annotation.tags.iter().cloned().collect::<Vec<_>>();
            println!("Tags: {}", tags.join(", "));
        }
    }

    /// Executes the `moves` command.
    fn moves(&self, legal: bool) -> Result<()> {
        let tree = self.repertoire.tree();
        let node = self.repertoire.selected_node();

        let moves = if legal {
            let game = StandardRules::game(&node.fen)?;
            let moves = game.get_legal_moves();
            moves
                .iter()
                .map(|&mv| game.to_san_with(mv, &moves))
                .collect::<Vec<_>>()
        } else {
            let children = node
                .children
                .iter()
                .filter_map(|&id| Some(format!("{} {}", tree.get(id)?.mv.as_deref()?, id)));
            let edges = node
                .transpositions
                .iter()
                .map(|edge| format!("{} -> {}", edge.mv, edge.target));
            children.chain(edges).collect()
        };

        if moves.is_empty() {
            println!("(none)");
        } else {
            println!("{}", moves.join(", "));
        }

        Ok(())
    }

    /// Applies `update` to the selected node.
    fn annotate(&mut self, update: AnnotationUpdate) {
        let id = self.repertoire.selected();
        self.repertoire.update_node(id, update);
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<TreeCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line from stdin")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(TreeCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();
        if buf.is_empty() {
            continue;
        }

        match buf.parse::<TreeCommand>() {
            Ok(cmd) => sender.send(cmd).context("Failed to send command to session")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}
