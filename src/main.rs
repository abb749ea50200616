//! Autotest CLI - author scenarios and bind test data from the command line

use clap::Parser;
use std::path::PathBuf;

use autotest::commands::Commands;
use autotest::common::{config::Config, logging};
use autotest::cli;

#[derive(Parser)]
#[command(name = "autotest", about = "Scenario authoring and test data CLI")]
#[command(version, long_about = None)]
struct Cli {
    /// Workspace directory (overrides the config file)
    #[arg(long, short = 'w', global = true, env = "AUTOTEST_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let result = async move {
        let config = Config::load()?;
        let workspace = cli.workspace.unwrap_or_else(|| config.workspace.dir.clone());
        cli::dispatch(cli.command, &workspace, &config).await
    }
    .await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
