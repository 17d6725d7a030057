//! `palace` command line: monthly gates, the arcade, and settings flags.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use palace_core::model::{RoomId, Track, UserId};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{Config, DEFAULT_DB_URL};

#[derive(Parser)]
#[command(name = "palace", version, about = "Palace study program and arcade")]
struct Cli {
    /// SQLite database URL or file path
    #[arg(long, env = "PALACE_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    db: String,

    /// Signed-in user id; omit to practise without saving
    #[arg(long, env = "PALACE_USER_ID", global = true)]
    user: Option<UserId>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work through the monthly gate of a track
    Gate {
        #[command(subcommand)]
        action: GateAction,
    },

    /// Play a simulated arcade session
    Arcade {
        /// Seed for reproducible block spawning
        #[arg(long)]
        seed: Option<u64>,

        /// Game time to simulate
        #[arg(long, default_value = "60")]
        seconds: u32,

        /// Play a single room instead of the whole palace
        #[arg(long)]
        room: Option<RoomId>,
    },

    /// Dismiss a banner or hint
    Dismiss { key: String },

    /// Show whether a flag has been dismissed
    Flags { key: String },
}

#[derive(Subcommand)]
enum GateAction {
    /// Show the questions of the current gate
    Open {
        #[arg(long, default_value = "visual")]
        track: Track,
    },

    /// Submit answers for the current gate
    Submit {
        #[arg(long, default_value = "visual")]
        track: Track,

        /// JSON object mapping question id to `{"choice": n}` or `{"text": "..."}`
        #[arg(long)]
        answers: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("palace=info,services=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match Config::new(&cli.db, cli.user) {
        Ok(config) => match cli.command {
            Commands::Gate {
                action: GateAction::Open { track },
            } => commands::gate::open(&config, track).await,
            Commands::Gate {
                action: GateAction::Submit { track, answers },
            } => commands::gate::submit(&config, track, answers).await,
            Commands::Arcade {
                seed,
                seconds,
                room,
            } => commands::arcade::execute(&config, seed, seconds, room),
            Commands::Dismiss { key } => commands::flags::dismiss(&config, &key).await,
            Commands::Flags { key } => commands::flags::show(&config, &key).await,
        },
        Err(err) => Err(err),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
