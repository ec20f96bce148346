mod cli;
mod infra;
mod replay;
mod routes;
mod server;

use maat_court_data::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
