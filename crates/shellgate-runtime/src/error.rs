use thiserror::Error;

/// Failure taxonomy shared by every tool.
///
/// Tools return `anyhow::Result` and raise these variants; the gateway
/// downcasts to pick the `error_kind` reported to the caller. Any error that
/// is not a `ToolError` is reported as an operation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// A guard refused the request before any I/O happened.
    #[error("{0}")]
    PolicyRejection(String),

    /// A size or time bound was exceeded.
    #[error("{0}")]
    ResourceLimitExceeded(String),

    /// The OS or filesystem failed during an approved operation.
    #[error("{0}")]
    OperationFailure(String),

    /// Parameters were missing or malformed.
    #[error("{0}")]
    InvalidInput(String),
}

impl ToolError {
    /// Stable machine-readable name for the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::PolicyRejection(_) => "policy_rejection",
            ToolError::ResourceLimitExceeded(_) => "resource_limit_exceeded",
            ToolError::OperationFailure(_) => "operation_failure",
            ToolError::InvalidInput(_) => "invalid_input",
        }
    }

    /// Classify an arbitrary error, defaulting to `OperationFailure`.
    pub fn classify(err: &anyhow::Error) -> ToolError {
        match err.downcast_ref::<ToolError>() {
            Some(tool_err) => tool_err.clone(),
            None => ToolError::OperationFailure(format!("{:#}", err)),
        }
    }
}
