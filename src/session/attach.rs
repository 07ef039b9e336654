use tracing::info;

use super::tmux::Tmux;
use crate::errors::LfgError;

/// True when running inside a tmux client (`$TMUX` set and non-empty).
pub fn inside_tmux_from_env() -> bool {
    std::env::var("TMUX")
        .ok()
        .filter(|s| !s.is_empty())
        .is_some()
}

/// Switch the current client (inside tmux) or take over the terminal with a blocking attach.
pub(super) fn attach(tmux: &Tmux<'_>, session: &str, inside_tmux: bool) -> Result<(), LfgError> {
    let (what, out) = if inside_tmux {
        ("tmux switch-client", tmux.switch_client(session)?)
    } else {
        ("tmux attach-session", tmux.attach_session(session)?)
    };
    if !out.success {
        return Err(LfgError::command(what, out.failure_detail()));
    }
    info!(session, inside_tmux, "attached");
    Ok(())
}
