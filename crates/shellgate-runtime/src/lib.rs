pub mod config;
pub mod error;
pub mod gateway;
pub mod policy;
pub mod tool;

pub use config::SandboxConfig;
pub use error::ToolError;
pub use gateway::ToolGateway;
pub use policy::{Access, CommandGuard, PathGuard, Verdict};
pub use tool::{PermissionLevel, Tool, ToolSchemaInfo};

/// Initialize structured JSON logging on stderr (stdout carries tool results)
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
