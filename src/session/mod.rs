//! tmux session provisioning for one worktree.
//!
//! Window layout (top to bottom):
//! - pane 0: status pane, top 5%
//! - pane 1: agent pane, 45% of the remaining 95%
//! - pane 2..: the configured rows, in the remaining ~52%
//!
//! A session whose window named after the worktree exists is assumed to be complete and is
//! only attached. The check is by name only; a window with that name but a different pane
//! shape is reused as-is.

mod attach;
mod build;
mod reconcile;
pub mod target;
pub mod tmux;

use std::path::Path;

use tracing::{debug, info, instrument};

pub use attach::inside_tmux_from_env;
pub use target::PaneRef;
pub use tmux::{exact_session, SplitDirection, Tmux, WindowEntry, TMUX_BIN_ENV};

use crate::errors::LfgError;
use crate::layout::LayoutSpec;
use crate::util::exec::ExecOutput;
use build::WindowBuild;
use target::parse_created;

/// tmux session names cannot contain dots.
///
/// Distinct worktree names may collide after sanitizing ("a.b" and "a_b"); that is not detected.
pub fn sanitize_session_name(name: &str) -> String {
    name.replace('.', "_")
}

/// Commands typed into the fixed panes right after they are created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneCommands {
    pub status: Option<String>,
    pub agent: Option<String>,
}

/// What provisioning did before attaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No session existed; it was created and built.
    Created,
    /// The session existed without its marker window; windows were replaced and rebuilt.
    Rebuilt,
    /// The marker window was present; nothing was changed.
    Reused,
}

pub struct SessionProvisioner<'a, 'r> {
    tmux: &'a Tmux<'r>,
    pane_commands: PaneCommands,
    mouse: bool,
    inside_tmux: bool,
}

impl<'a, 'r> SessionProvisioner<'a, 'r> {
    pub fn new(tmux: &'a Tmux<'r>) -> Self {
        Self {
            tmux,
            pane_commands: PaneCommands::default(),
            mouse: true,
            inside_tmux: inside_tmux_from_env(),
        }
    }

    pub fn with_pane_commands(mut self, commands: PaneCommands) -> Self {
        self.pane_commands = commands;
        self
    }

    pub fn with_mouse(mut self, mouse: bool) -> Self {
        self.mouse = mouse;
        self
    }

    /// Override `$TMUX` detection (switch-client vs attach-session).
    pub fn inside_tmux(mut self, inside: bool) -> Self {
        self.inside_tmux = inside;
        self
    }

    /// Make sure the session for `worktree` exists with its layout, then attach or switch to it.
    #[instrument(level = "info", skip(self, layout), fields(rows = layout.len()), err)]
    pub fn provision_and_attach(
        &self,
        worktree: &str,
        working_dir: &Path,
        layout: &LayoutSpec,
    ) -> Result<Outcome, LfgError> {
        let outcome = self.provision(worktree, working_dir, layout)?;
        attach::attach(self.tmux, &sanitize_session_name(worktree), self.inside_tmux)?;
        Ok(outcome)
    }

    /// Create, rebuild or reuse the session without attaching.
    pub fn provision(
        &self,
        worktree: &str,
        working_dir: &Path,
        layout: &LayoutSpec,
    ) -> Result<Outcome, LfgError> {
        let session = sanitize_session_name(worktree);
        let outcome = if self.tmux.has_session(&session)? {
            reconcile::reconcile(self, &session, worktree, working_dir, layout)?
        } else {
            self.create(&session, worktree, working_dir, layout)?;
            Outcome::Created
        };
        info!(session = %session, ?outcome, "session ready");
        Ok(outcome)
    }

    fn create(
        &self,
        session: &str,
        marker: &str,
        dir: &Path,
        layout: &LayoutSpec,
    ) -> Result<(), LfgError> {
        ensure_buildable(dir, layout)?;

        let out = self
            .tmux
            .new_session(session, dir)
            .map_err(|e| LfgError::split(format!("session {session}"), format!("{e:#}")))?;
        if !out.success {
            return Err(LfgError::split(
                format!("session {session}"),
                out.failure_detail(),
            ));
        }
        let created = parse_created(&out.stdout);

        let window = created.window_target(session);
        let renamed = self
            .tmux
            .rename_window(&window, marker)
            .map_err(|e| LfgError::split("window name", format!("{e:#}")))?;
        if !renamed.success {
            return Err(LfgError::split("window name", renamed.failure_detail()));
        }

        if self.mouse {
            report_nonfatal(
                self.tmux.set_option(session, "mouse", "on"),
                "failed to enable mouse mode",
            );
        }

        self.build(&window, created.pane_id.as_deref(), dir, layout)
    }

    fn build(
        &self,
        window: &str,
        base_pane: Option<&str>,
        dir: &Path,
        layout: &LayoutSpec,
    ) -> Result<(), LfgError> {
        WindowBuild {
            tmux: self.tmux,
            window,
            base: PaneRef::resolve(base_pane, window, crate::layout::split::STATUS_PANE_INDEX),
            dir,
            commands: &self.pane_commands,
        }
        .run(layout)
    }
}

fn ensure_buildable(dir: &Path, layout: &LayoutSpec) -> Result<(), LfgError> {
    if !dir.is_dir() {
        return Err(LfgError::Configuration(format!(
            "path does not exist: {}",
            dir.display()
        )));
    }
    if layout.is_empty() {
        return Err(LfgError::Configuration(
            "no layout defined in config".to_string(),
        ));
    }
    Ok(())
}

/// Warn (stderr and tracing) when a non-essential tmux call fails; never aborts.
pub(crate) fn report_nonfatal(result: anyhow::Result<ExecOutput>, what: &str) {
    let detail = match result {
        Ok(out) if out.success => return,
        Ok(out) => out.failure_detail(),
        Err(e) => format!("{e:#}"),
    };
    debug!(detail = %detail, "{what}");
    crate::warn_print(&format!("{what}: {detail}"));
}
