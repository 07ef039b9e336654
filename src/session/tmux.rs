use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::errors::LfgError;
use crate::util::exec::{CommandRunner, ExecOutput, ExecRequest};

/// Environment variable naming an alternative tmux binary.
pub const TMUX_BIN_ENV: &str = "LFG_TMUX";

/// Format printed by creation commands so the caller learns the new ids.
pub(crate) const CREATED_WINDOW_FORMAT: &str = "#{window_id} #{window_index} #{pane_id}";
pub(crate) const CREATED_PANE_FORMAT: &str = "#{pane_id}";

/// `-t` value naming exactly `session`. A bare name would also match any session it is
/// a prefix or pattern of.
pub fn exact_session(session: &str) -> String {
    format!("={session}")
}

/// One line of `list-windows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// New pane below (`-v`).
    Vertical,
    /// New pane to the right (`-h`).
    Horizontal,
}

impl SplitDirection {
    fn flag(self) -> &'static str {
        match self {
            SplitDirection::Vertical => "-v",
            SplitDirection::Horizontal => "-h",
        }
    }
}

/// Thin tmux client: one method per subcommand, argv built exactly, no interpretation
/// of success beyond what each query needs. Callers decide what a failure means.
pub struct Tmux<'r> {
    bin: PathBuf,
    runner: &'r dyn CommandRunner,
}

impl<'r> Tmux<'r> {
    /// Resolve the tmux binary (`LFG_TMUX`, else PATH).
    pub fn locate(runner: &'r dyn CommandRunner) -> Result<Self, LfgError> {
        let wanted: OsString = std::env::var_os(TMUX_BIN_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| OsString::from("tmux"));
        let bin = which::which(&wanted).map_err(|_| LfgError::ToolUnavailable {
            tool: wanted.to_string_lossy().into_owned(),
        })?;
        Ok(Self::with_binary(bin, runner))
    }

    pub fn with_binary(bin: impl Into<PathBuf>, runner: &'r dyn CommandRunner) -> Self {
        Self {
            bin: bin.into(),
            runner,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.bin
    }

    fn request<I, S>(&self, args: I) -> ExecRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        ExecRequest::new(self.bin.as_os_str()).args(args)
    }

    fn run<I, S>(&self, args: I) -> Result<ExecOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.runner.run(&self.request(args))
    }

    pub fn version(&self) -> Result<ExecOutput> {
        self.run(["-V"])
    }

    pub fn has_session(&self, session: &str) -> Result<bool> {
        Ok(self
            .run(["has-session", "-t", exact_session(session).as_str()])?
            .success)
    }

    /// Windows of `session`, in index order.
    pub fn list_windows(&self, session: &str) -> Result<Vec<WindowEntry>, LfgError> {
        let out = self.run([
            "list-windows",
            "-t",
            exact_session(session).as_str(),
            "-F",
            "#{window_id} #{window_name}",
        ])?;
        if !out.success {
            return Err(LfgError::command("tmux list-windows", out.failure_detail()));
        }
        Ok(non_empty_lines(&out.stdout)
            .into_iter()
            .map(|line| {
                let (id, name) = line.split_once(' ').unwrap_or((line.as_str(), ""));
                WindowEntry {
                    id: id.to_string(),
                    name: name.to_string(),
                }
            })
            .collect())
    }

    /// All session names; an absent server means no sessions.
    pub fn list_sessions(&self) -> Result<Vec<String>, LfgError> {
        let out = self.run(["list-sessions", "-F", "#{session_name}"])?;
        if !out.success {
            let err = out.stderr.to_ascii_lowercase();
            if err.contains("no server running") || err.contains("error connecting") {
                return Ok(Vec::new());
            }
            return Err(LfgError::command("tmux list-sessions", out.failure_detail()));
        }
        Ok(non_empty_lines(&out.stdout))
    }

    pub fn new_session(&self, session: &str, dir: &Path) -> Result<ExecOutput> {
        self.run([
            OsString::from("new-session"),
            "-d".into(),
            "-s".into(),
            session.into(),
            "-c".into(),
            dir.into(),
            "-P".into(),
            "-F".into(),
            CREATED_WINDOW_FORMAT.into(),
        ])
    }

    pub fn new_window(&self, session: &str, name: &str, dir: &Path) -> Result<ExecOutput> {
        self.run([
            OsString::from("new-window"),
            "-t".into(),
            format!("{}:", exact_session(session)).into(),
            "-n".into(),
            name.into(),
            "-c".into(),
            dir.into(),
            "-P".into(),
            "-F".into(),
            CREATED_WINDOW_FORMAT.into(),
        ])
    }

    pub fn rename_window(&self, window: &str, name: &str) -> Result<ExecOutput> {
        self.run(["rename-window", "-t", window, name])
    }

    pub fn kill_window(&self, window: &str) -> Result<ExecOutput> {
        self.run(["kill-window", "-t", window])
    }

    /// Session option on exactly `session`.
    pub fn set_option(&self, session: &str, option: &str, value: &str) -> Result<ExecOutput> {
        self.run(["set-option", "-t", exact_session(session).as_str(), option, value])
    }

    /// `split-window` giving the new pane `percent`% of `target`; prints the new pane id.
    pub fn split_window(
        &self,
        target: &str,
        direction: SplitDirection,
        percent: u32,
        dir: &Path,
    ) -> Result<ExecOutput> {
        self.run([
            OsString::from("split-window"),
            "-t".into(),
            target.into(),
            direction.flag().into(),
            "-p".into(),
            percent.to_string().into(),
            "-c".into(),
            dir.into(),
            "-P".into(),
            "-F".into(),
            CREATED_PANE_FORMAT.into(),
        ])
    }

    /// Type `keys` into the pane followed by Enter.
    pub fn send_keys(&self, target: &str, keys: &str) -> Result<ExecOutput> {
        self.run(["send-keys", "-t", target, keys, "Enter"])
    }

    pub fn select_pane(&self, target: &str) -> Result<ExecOutput> {
        self.run(["select-pane", "-t", target])
    }

    pub fn switch_client(&self, session: &str) -> Result<ExecOutput> {
        self.run(["switch-client", "-t", exact_session(session).as_str()])
    }

    /// Blocking attach that takes over the caller's terminal until detach.
    pub fn attach_session(&self, session: &str) -> Result<ExecOutput> {
        let target = exact_session(session);
        self.runner
            .run_interactive(&self.request(["attach-session", "-t", target.as_str()]))
    }

    /// Teardown keyed by session name. A session that does not exist is not an error.
    pub fn kill_session(&self, session: &str) -> Result<(), LfgError> {
        if !self.has_session(session)? {
            return Ok(());
        }
        let out = self.run(["kill-session", "-t", exact_session(session).as_str()])?;
        if !out.success {
            return Err(LfgError::command("tmux kill-session", out.failure_detail()));
        }
        Ok(())
    }
}

fn non_empty_lines(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
