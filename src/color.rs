#![allow(clippy::module_name_repetitions)]
//! Color mode configuration and ANSI painting helpers.
//!
//! Logging helpers policy (stderr one-liners):
//! - Apply only to stderr single-line messages; `--json` output is never colored.
//! - Use log_info_stderr for progress, log_warn_stderr for notes,
//!   and log_error_stderr for fatal errors.
//! - Precompute once per scope and reuse:
//!     let use_err = lfg::color_enabled_stderr();
//! - Structured diagnostics go through `tracing`; these helpers are for the user-facing line.

use clap::ValueEnum;
use once_cell::sync::OnceCell;

/// Color mode selected by `--color` or `LFG_COLOR`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

static COLOR_MODE: OnceCell<ColorMode> = OnceCell::new();

pub fn set_color_mode(mode: ColorMode) {
    let _ = COLOR_MODE.set(mode);
}

fn parse_color_mode(s: &str) -> Option<ColorMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(ColorMode::Auto),
        "always" | "on" | "true" | "yes" => Some(ColorMode::Always),
        "never" | "off" | "false" | "no" => Some(ColorMode::Never),
        _ => None,
    }
}

impl ColorMode {
    fn resolve(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => is_tty,
        }
    }
}

/// Precedence: NO_COLOR, then `--color`, then `LFG_COLOR`, then TTY detection.
fn color_enabled_for(is_tty: bool) -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    COLOR_MODE
        .get()
        .copied()
        .or_else(|| {
            std::env::var("LFG_COLOR")
                .ok()
                .and_then(|v| parse_color_mode(&v))
        })
        .map(|mode| mode.resolve(is_tty))
        .unwrap_or(is_tty)
}

pub fn color_enabled_stdout() -> bool {
    color_enabled_for(atty::is(atty::Stream::Stdout))
}

pub fn color_enabled_stderr() -> bool {
    color_enabled_for(atty::is(atty::Stream::Stderr))
}

/// Wrap string with ANSI color code when enabled; otherwise return unchanged.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

/// Color-aware stderr one-liners; the message text is never altered.
pub fn log_info_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, "\x1b[36;1m", msg));
}

pub fn log_warn_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, "\x1b[33m", msg));
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, "\x1b[31;1m", msg));
}
