//! Error mapping guide:
//! - Map a missing external tool (and io::ErrorKind::NotFound) to exit code 127; all others to 1.
//! - Non-fatal failures (command injection, cosmetic tmux setup) never become an `LfgError`;
//!   they are reported through `warn_print` and recorded as `tracing::debug!` events at the
//!   call site.
use std::fmt;
use std::io;

/// Fatal failures surfaced to the caller of a provisioning or worktree operation.
#[derive(Debug)]
pub enum LfgError {
    /// Layout data absent or unparseable, or a path the config points at does not exist.
    Configuration(String),
    /// The external program could not be located on PATH (or via its override variable).
    ToolUnavailable { tool: String },
    /// A structural tmux operation (create/split/rename) failed; `step` names the row or pane.
    Split { step: String, detail: String },
    /// Any other external command that must succeed (attach, git) returned failure.
    Command { program: String, detail: String },
    Io(io::Error),
    Other(anyhow::Error),
}

impl LfgError {
    pub fn split(step: impl Into<String>, detail: impl Into<String>) -> Self {
        LfgError::Split {
            step: step.into(),
            detail: detail.into(),
        }
    }

    pub fn command(program: impl Into<String>, detail: impl Into<String>) -> Self {
        LfgError::Command {
            program: program.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for LfgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LfgError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            LfgError::ToolUnavailable { tool } => {
                write!(f, "{tool} is not installed or not in PATH")
            }
            LfgError::Split { step, detail } => write!(f, "failed to create {step}: {detail}"),
            LfgError::Command { program, detail } => write!(f, "{program} failed: {detail}"),
            LfgError::Io(e) => write!(f, "{e}"),
            LfgError::Other(e) => write!(f, "{e:#}"),
        }
    }
}

impl std::error::Error for LfgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LfgError::Io(e) => Some(e),
            LfgError::Other(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<io::Error> for LfgError {
    fn from(e: io::Error) -> Self {
        LfgError::Io(e)
    }
}

impl From<anyhow::Error> for LfgError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<LfgError>() {
            Ok(inner) => inner,
            Err(e) => LfgError::Other(e),
        }
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert LfgError to exit code (parity with io::Error mapping).
pub fn exit_code_for_error(e: &LfgError) -> u8 {
    match e {
        LfgError::ToolUnavailable { .. } => 127,
        LfgError::Io(ioe) => exit_code_for_io_error(ioe),
        LfgError::Other(err) => err
            .chain()
            .find_map(|c| c.downcast_ref::<io::Error>())
            .map(exit_code_for_io_error)
            .unwrap_or(1),
        _ => 1,
    }
}
