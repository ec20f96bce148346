use std::path::PathBuf;

use crate::replay::{self, ReplayArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use maat_court_data::consumer::QueueKind;
use maat_court_data::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "MAAT Court Data",
    about = "Link legal-aid applications to court cases and apply court events",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Push newline-delimited JSON messages for one queue through the consumer pool
    Replay {
        /// Queue the messages belong to: link, unlink, laa-status, hearing-resulted, result-code
        #[arg(long)]
        queue: QueueKind,
        /// File holding one JSON payload per line
        file: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Replay { queue, file } => replay::run(ReplayArgs { queue, file }).await,
    }
}
