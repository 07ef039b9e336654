use std::path::Path;

use lfg::util::exec::{CommandRunner, SystemRunner};
use lfg::{LfgError, Tmux};

fn value(use_color: bool, s: &str) -> String {
    lfg::paint(use_color, "\x1b[34;1m", s)
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}

/// Report tool availability, config location and build info on stderr.
///
/// Only fails when neither tmux nor git can be found.
pub(crate) fn run_doctor(config: Option<&Path>, verbose: bool) -> Result<(), LfgError> {
    let use_err = lfg::color_enabled_stderr();
    let runner = SystemRunner;

    eprintln!("lfg doctor");
    eprintln!();
    eprintln!("  version: v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "  host:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if verbose {
        eprintln!("  build:   {}", env!("LFG_BUILD_DATE"));
        eprintln!("  target:  {}", env!("LFG_BUILD_TARGET"));
        eprintln!("  profile: {}", env!("LFG_BUILD_PROFILE"));
        eprintln!("  rustc:   {}", env!("LFG_BUILD_RUSTC"));
    }
    eprintln!();

    let tmux_ok = match Tmux::locate(&runner) {
        Ok(tmux) => {
            let version = tmux
                .version()
                .ok()
                .filter(|o| o.success)
                .map(|o| first_line(&o.stdout).to_string())
                .unwrap_or_default();
            eprintln!(
                "  tmux:    {} {}",
                value(use_err, &tmux.binary().display().to_string()),
                version
            );
            true
        }
        Err(e) => {
            lfg::log_warn_stderr(use_err, &format!("  tmux:    {e}"));
            false
        }
    };

    let git_ok = match which::which("git") {
        Ok(p) => {
            let version = runner
                .run(&lfg::ExecRequest::new(p.as_os_str()).arg("--version"))
                .ok()
                .filter(|o| o.success)
                .map(|o| first_line(&o.stdout).to_string())
                .unwrap_or_default();
            eprintln!(
                "  git:     {} {}",
                value(use_err, &p.display().to_string()),
                version
            );
            true
        }
        Err(_) => {
            lfg::log_warn_stderr(use_err, "  git:     not installed or not in PATH");
            false
        }
    };

    match lfg::config::resolve_config_path(config, &runner) {
        Ok(path) => {
            let state = if path.exists() {
                "present"
            } else {
                "missing (run `lfg init`)"
            };
            eprintln!(
                "  config:  {} ({state})",
                value(use_err, &path.display().to_string())
            );
        }
        Err(e) => eprintln!("  config:  unavailable ({e:#})"),
    }

    let inside = lfg::session::inside_tmux_from_env();
    eprintln!(
        "  attach:  {}",
        if inside {
            "switch-client (inside tmux)"
        } else {
            "attach-session"
        }
    );
    eprintln!();

    if !tmux_ok && !git_ok {
        return Err(LfgError::ToolUnavailable {
            tool: "tmux and git".to_string(),
        });
    }
    Ok(())
}
