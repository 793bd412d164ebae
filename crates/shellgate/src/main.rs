mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries command results
    shellgate_runtime::init_logging();

    let cli = Cli::parse();

    // Handle init command early (doesn't need config)
    if let Commands::Init { path } = &cli.command {
        commands::init::run_init(path)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = config::load_config(cli.config.as_deref())?.sandbox;
    if let Some(workspace) = &cli.workspace {
        config.workspace_root = config::expand_path(workspace);
    }
    config.dry_run = cli.execution_mode.dry_run(config.dry_run);

    let success = match cli.command {
        Commands::Init { .. } => {
            // Already handled above
            unreachable!()
        }
        Commands::Check { command } => commands::check::execute(&command, &config)?,
        Commands::Exec {
            command,
            cwd,
            timeout,
        } => commands::exec::execute(command, cwd, timeout, &config).await?,
        Commands::Call { tool, params } => commands::call::execute(tool, params, &config).await?,
        Commands::RunPlan { file } => commands::run_plan::execute(file, &config).await?,
        Commands::Tools => {
            commands::tools::execute(&config)?;
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
