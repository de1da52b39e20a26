//! SmartBuy CLI — construction material and vendor estimates.
//!
//! Estimates the materials a project needs and finds vendors for them,
//! degrading to rule-based and placeholder data when the model or the
//! vendor directory is unavailable.

mod commands;
mod report;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
