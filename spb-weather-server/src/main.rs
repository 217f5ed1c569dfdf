//! Binary crate for the `spb-weather-server` HTTP service.
//!
//! This crate focuses on:
//! - Parsing process arguments
//! - Logging setup
//! - Serving the aggregated weather endpoint

use clap::Parser;

mod cli;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env file; must load before clap reads its env fallbacks.
    let _ = dotenv::dotenv();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
