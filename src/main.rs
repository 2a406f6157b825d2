//! Durable tic-tac-toe - command-line driver
//!
//! Bootstraps the session store and exposes create, show, and move.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use durable_tictactoe::{
    GameSession, GameStatus, SessionId, SessionManager, SessionRepository, StoreConfig,
};
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = load_config(&cli)?;
    let manager = match SessionRepository::bootstrap(&config) {
        Ok(repo) => SessionManager::new(repo),
        Err(e) => {
            error!(error = %e, "Session store unavailable");
            return Err(e).context("bootstrapping session store");
        }
    };

    match cli.command {
        Command::Init => {
            info!(database_url = %config.database_url(), "Session store ready");
            Ok(())
        }
        Command::New { players } => {
            let session = manager.create_session(players.into())?;
            println!("{}", session.id());
            Ok(())
        }
        Command::Show { id, json } => show(&manager, id, json),
        Command::Move { id, row, col } => {
            let session = manager.play_turn(id, row, col)?;
            print_session(&session);
            Ok(())
        }
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,durable_tictactoe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolves store settings: defaults, then file, then environment, then flags.
#[instrument(skip(cli))]
fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    let config = config.apply_env()?;
    Ok(match &cli.database_url {
        Some(url) => config.with_database_url(url.clone()),
        None => config,
    })
}

#[instrument(skip(manager))]
fn show(manager: &SessionManager, id: SessionId, json: bool) -> Result<()> {
    let session = manager.load_session(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        print_session(&session);
    }
    Ok(())
}

fn print_session(session: &GameSession) {
    print!("{}", session.board());
    match session.status() {
        GameStatus::Ongoing => println!("Game {}: {} to move", session.id(), session.turn()),
        GameStatus::Won(mark) => println!("Game {}: {} wins", session.id(), mark),
        GameStatus::Drawn => println!("Game {}: draw", session.id()),
    }
}
