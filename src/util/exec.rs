use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::debug;

/// One external program invocation. Arguments are handed to the OS verbatim (no shell).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Arguments as lossy UTF-8 strings (program excluded).
    pub fn argv(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Shell-quoted one-line rendering for previews and logs.
    pub fn preview(&self) -> String {
        let mut words = vec![self.program.to_string_lossy().into_owned()];
        words.extend(self.argv());
        crate::shell_join(&words)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Exit state plus captured streams. Interactive runs leave the streams empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Best available failure text: trimmed stderr, else the exit code.
    pub fn failure_detail(&self) -> String {
        let err = self.stderr.trim();
        if !err.is_empty() {
            return err.to_string();
        }
        match self.code {
            Some(c) => format!("exit status {c}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Process-execution seam. Every tmux and git call goes through one of these.
pub trait CommandRunner {
    /// Run to completion, capturing stdout/stderr.
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput>;

    /// Run to completion with the caller's stdin/stdout/stderr inherited.
    fn run_interactive(&self, request: &ExecRequest) -> Result<ExecOutput>;
}

/// Real process execution via `std::process::Command`. No timeouts are applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput> {
        debug!(command = %request.preview(), "exec");
        let output = request
            .command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to spawn {:?}", request.program))?;
        Ok(ExecOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_interactive(&self, request: &ExecRequest) -> Result<ExecOutput> {
        debug!(command = %request.preview(), "exec (interactive)");
        let status = request
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to spawn {:?}", request.program))?;
        Ok(ExecOutput {
            success: status.success(),
            code: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Prints each invocation instead of executing it.
///
/// Read-only queries (as listed in `queries`) report failure so callers take their
/// "nothing exists yet" path; everything else reports success with empty output.
#[derive(Debug, Clone)]
pub struct DryRunRunner {
    queries: &'static [&'static str],
}

/// tmux subcommands that only inspect state.
pub const TMUX_QUERIES: &[&str] = &["has-session", "list-windows", "list-sessions", "list-panes"];

impl DryRunRunner {
    pub fn new(queries: &'static [&'static str]) -> Self {
        Self { queries }
    }

    pub fn for_tmux() -> Self {
        Self::new(TMUX_QUERIES)
    }

    fn is_query(&self, request: &ExecRequest) -> bool {
        request
            .argv()
            .first()
            .map(|sub| self.queries.contains(&sub.as_str()))
            .unwrap_or(false)
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput> {
        let use_err = crate::color_enabled_stderr();
        crate::log_info_stderr(use_err, &format!("lfg: dry-run: {}", request.preview()));
        if self.is_query(request) {
            Ok(ExecOutput::failed(1, "dry-run"))
        } else {
            Ok(ExecOutput::ok(""))
        }
    }

    fn run_interactive(&self, request: &ExecRequest) -> Result<ExecOutput> {
        self.run(request)
    }
}
