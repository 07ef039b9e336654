//! Tracing subscriber setup: fmt layer on stderr filtered by `LFG_LOG` (default `warn`).

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directive (e.g. `lfg=debug`).
pub const LOG_ENV: &str = "LFG_LOG";

static INIT: OnceCell<()> = OnceCell::new();

fn filter_directive(verbose: bool) -> String {
    match env::var(LOG_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ if verbose => "lfg=debug,warn".to_string(),
        _ => "warn".to_string(),
    }
}

/// Install the global subscriber once. Returns false when one was already installed.
pub fn init(verbose: bool) -> bool {
    if INIT.get().is_some() {
        return false;
    }

    let env_filter = EnvFilter::try_new(filter_directive(verbose))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(crate::color_enabled_stderr());

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("lfg: tracing init skipped (global subscriber already set)");
        return false;
    }

    let _ = INIT.set(());
    true
}
