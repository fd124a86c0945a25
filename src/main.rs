//! Forgekit CLI entry point.

use anyhow::Result;
use clap::Parser;

use forgekit::cli::commands::run::RunOptions;
use forgekit::cli::{Cli, Commands};
use forgekit::infrastructure::config::ConfigLoader;
use forgekit::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config.as_deref(), cli.json) {
        forgekit::cli::handle_error(err, cli.json);
    }
}

fn run(command: Commands, config_path: Option<&std::path::Path>, json_mode: bool) -> Result<()> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging)?;

    match command {
        Commands::List => forgekit::cli::commands::list::execute(&config, json_mode),
        Commands::Run {
            line,
            as_player,
            looking_at,
            grant,
        } => forgekit::cli::commands::run::execute(
            RunOptions {
                line,
                as_player,
                looking_at,
                grant,
            },
            &config,
            json_mode,
        ),
        Commands::Check => forgekit::cli::commands::check::execute(&config, json_mode),
    }
}
