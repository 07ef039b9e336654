use std::path::Path;

use tracing::{debug, info};

use super::target::parse_created;
use super::{ensure_buildable, Outcome, SessionProvisioner};
use crate::errors::LfgError;
use crate::layout::LayoutSpec;

/// Existing session: reuse it when the marker window is present, otherwise replace its
/// windows with a freshly built one.
///
/// The replacement window is created before the old ones are killed; killing a session's
/// last window would destroy the session itself.
pub(super) fn reconcile(
    provisioner: &SessionProvisioner<'_, '_>,
    session: &str,
    marker: &str,
    dir: &Path,
    layout: &LayoutSpec,
) -> Result<Outcome, LfgError> {
    let tmux = provisioner.tmux;
    let windows = tmux.list_windows(session)?;
    if windows.iter().any(|w| w.name == marker) {
        info!(session, marker, "marker window present; reusing session");
        return Ok(Outcome::Reused);
    }

    ensure_buildable(dir, layout)?;
    info!(session, marker, stale = windows.len(), "marker window missing; rebuilding");

    let step = format!("window {marker}");
    let out = tmux
        .new_window(session, marker, dir)
        .map_err(|e| LfgError::split(step.clone(), format!("{e:#}")))?;
    if !out.success {
        return Err(LfgError::split(step, out.failure_detail()));
    }
    let created = parse_created(&out.stdout);

    for stale in &windows {
        // Best-effort; a window that is already gone is fine.
        match tmux.kill_window(&stale.id) {
            Ok(o) if o.success => {}
            Ok(o) => debug!(
                window = %stale.name,
                detail = %o.failure_detail(),
                "kill-window failed"
            ),
            Err(e) => debug!(
                window = %stale.name,
                error = %format!("{e:#}"),
                "kill-window failed"
            ),
        }
    }

    let window = created.window_target(session);
    provisioner.build(&window, created.pane_id.as_deref(), dir, layout)?;
    Ok(Outcome::Rebuilt)
}
