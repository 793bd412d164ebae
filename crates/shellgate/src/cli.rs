use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum ExecutionMode {
    /// Use sandbox.dry_run from the config (default)
    Auto,
    /// Force dry-run: commands are validated but never spawned
    DryRun,
    /// Force real execution regardless of config
    Execute,
}

impl ExecutionMode {
    /// Resolve the dry-run flag, falling back to the configured value.
    pub fn dry_run(&self, configured: bool) -> bool {
        match self {
            ExecutionMode::Auto => configured,
            ExecutionMode::DryRun => true,
            ExecutionMode::Execute => false,
        }
    }
}

#[derive(Parser)]
#[command(name = "shellgate")]
#[command(about = "Shellgate - validate-then-execute tool gateway", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Execution mode: auto (use config), dry-run (force safe), execute (force real)
    #[arg(long, global = true, default_value = "auto", value_enum)]
    pub execution_mode: ExecutionMode,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the sandbox workspace root
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "shellgate.toml")]
        path: PathBuf,
    },
    /// Print the command guard verdict without running anything
    Check {
        /// Full command line to validate
        command: String,
    },
    /// Run a shell command through the gateway
    Exec {
        /// Full command line, passed to `sh -c`
        command: String,
        /// Working directory, relative to the workspace
        #[arg(long)]
        cwd: Option<String>,
        /// Timeout in seconds
        #[arg(long)]
        timeout: Option<f64>,
    },
    /// Call a single tool with JSON params
    Call {
        /// Tool name
        tool: String,
        /// JSON object of tool params
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Run a plan from JSON file
    RunPlan {
        /// Path to plan JSON file
        #[arg(long)]
        file: PathBuf,
    },
    /// List registered tools and their schemas
    Tools,
}
