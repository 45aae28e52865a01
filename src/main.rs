use clap::Parser;
use std::process::ExitCode;

use weather_mcp_gateway::cli::{run_commands, Cli, Commands};
use weather_mcp_gateway::infra;

#[tokio::main]
async fn main() -> ExitCode {
    infra::logging::init();

    let cli = Cli::parse();
    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}
