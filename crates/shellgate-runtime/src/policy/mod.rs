//! Guards: pure allow/deny decisions made before any command or file I/O.
//!
//! Both guards are heuristic defense-in-depth over a cooperative allow-list.
//! They are not an isolation boundary: a determined caller with an
//! allow-listed interpreter (`python3 -c ...`) can still reach the host.

pub mod command;
pub mod path;

pub use command::CommandGuard;
pub use path::PathGuard;

/// Result of a guard evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Request may proceed
    Allow,
    /// Request refused, with a human-readable reason
    Deny(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    /// Reason text; "OK" for an allowed request.
    pub fn reason(&self) -> &str {
        match self {
            Verdict::Allow => "OK",
            Verdict::Deny(reason) => reason,
        }
    }

    /// Tuple form `(safe, reason)`.
    pub fn into_pair(self) -> (bool, String) {
        match self {
            Verdict::Allow => (true, "OK".to_string()),
            Verdict::Deny(reason) => (false, reason),
        }
    }
}

/// What the caller intends to do with a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}
