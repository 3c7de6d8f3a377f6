/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::Parser;
use repertoire::{Config, Session, TreeCommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    init_tracing();
    let config = Config::parse();

    let repertoire = match config.open_repertoire() {
        Ok(repertoire) => repertoire,
        Err(e) => {
            eprintln!("{} failed to start: {e:#}", env!("CARGO_PKG_NAME"));
            std::process::exit(1);
        }
    };

    let mut session = Session::new(repertoire);

    for line in &config.exec {
        match line.parse::<TreeCommand>() {
            Ok(cmd) => session.send_command(cmd),
            Err(e) => eprintln!("ERROR on startup command {line:?}:\n{e}"),
        }
    }

    let result = if config.batch {
        session.send_command(TreeCommand::Exit);
        session.drain()
    } else {
        session.run()
    };

    if let Err(e) = result {
        eprintln!("{} encountered an error: {e:#}", env!("CARGO_PKG_NAME"));
    }
}

/// Logs go to stderr so that stdout only ever carries command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("REPERTOIRE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("repertoire=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
