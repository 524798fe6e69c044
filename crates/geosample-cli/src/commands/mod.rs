//! Command implementations

mod config;
mod generate;
mod geodesy;
mod ingest;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Distance(args) => geodesy::distance(args, &output),
        Commands::Destination(args) => geodesy::destination(args, &output),
        Commands::Tile(args) => geodesy::tile(args, &output),
        Commands::Polyline(args) => geodesy::polyline(args, &output),
        Commands::Generate(args) => generate::execute(args, config_path, &output).await,
        Commands::Ingest(args) => ingest::execute(args, config_path, &output).await,
        Commands::Config => config::execute(config_path, &output),
    }
}
