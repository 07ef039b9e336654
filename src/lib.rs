//! lfg: git worktrees bound to tmux sessions with a fixed pane layout.
//!
//! The library is split the same way the binary uses it:
//! - `layout`: config rows -> canonical `LayoutSpec` and the split arithmetic (pure).
//! - `session`: drives tmux to materialize a `LayoutSpec`, reconciles existing sessions, attaches.
//! - `config`, `git`: collaborators that feed the two above.
//! - `util::exec`: the process-execution seam every external call goes through.

pub mod color;
pub mod config;
pub mod errors;
pub mod git;
pub mod layout;
pub mod session;
pub mod telemetry;
pub mod ui;
pub mod util;

pub use color::{
    color_enabled_stderr, color_enabled_stdout, log_error_stderr, log_info_stderr,
    log_warn_stderr, paint, set_color_mode, ColorMode,
};
pub use config::{Config, CONFIG_FILE_NAME};
pub use errors::{exit_code_for_error, LfgError};
pub use git::Worktree;
pub use layout::{resolve_layout, LayoutSpec, Pane, Row, SplitPlan, Window};
pub use session::{sanitize_session_name, Outcome, SessionProvisioner, Tmux};
pub use ui::warn::warn_print;
pub use util::exec::{CommandRunner, DryRunRunner, ExecOutput, ExecRequest, SystemRunner};
pub use util::{shell_escape, shell_join};
