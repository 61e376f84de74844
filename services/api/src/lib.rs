mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use outlet_audit::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
