//! Command-line interface for durable_tictactoe.

use clap::{Parser, Subcommand, ValueEnum};
use durable_tictactoe::{Players, SessionId};

/// Durable tic-tac-toe - play persisted games from the terminal
#[derive(Parser, Debug)]
#[command(name = "durable_tictactoe")]
#[command(about = "Tic-tac-toe sessions persisted to SQLite", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML file with store settings
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Database path (overrides config file and DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wait for the database and create the session table
    Init,

    /// Start a new game and print its id
    New {
        /// 1 to play against the computer, 2 for two humans
        #[arg(short, long, value_enum, default_value = "1")]
        players: PlayerCount,
    },

    /// Show a game's board and status
    Show {
        /// Session id
        id: SessionId,

        /// Print a JSON snapshot instead of the board
        #[arg(long)]
        json: bool,
    },

    /// Play a move (and the computer's reply in single-player games)
    Move {
        /// Session id
        id: SessionId,

        /// Row (0-2)
        row: usize,

        /// Column (0-2)
        col: usize,
    },
}

/// Player count accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlayerCount {
    /// Human against the computer
    #[value(name = "1")]
    One,
    /// Two humans
    #[value(name = "2")]
    Two,
}

impl From<PlayerCount> for Players {
    fn from(count: PlayerCount) -> Self {
        match count {
            PlayerCount::One => Players::One,
            PlayerCount::Two => Players::Two,
        }
    }
}
