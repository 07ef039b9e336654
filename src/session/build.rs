//! Materialize a layout inside one freshly created tmux window.
//!
//! Order is load-bearing: every split targets a pane created by an earlier step, so the
//! steps run strictly one after another and the first structural failure aborts the build.
//! Panes already created are left in place.

use std::path::Path;

use tracing::debug;

use super::target::{parse_pane_id, PaneRef};
use super::tmux::{SplitDirection, Tmux};
use super::{report_nonfatal, PaneCommands};
use crate::errors::LfgError;
use crate::layout::split::{
    sub_pane_split_slot, AGENT_PANE_INDEX, AGENT_SPLIT_PERCENT, FIRST_WORK_PANE_INDEX,
    STATUS_SPLIT_PERCENT,
};
use crate::layout::{non_blank, LayoutSpec, SplitPlan};

pub(super) struct WindowBuild<'a, 'r> {
    pub tmux: &'a Tmux<'r>,
    /// Window target used for index fallbacks (`@id` or `session:name`).
    pub window: &'a str,
    /// The window's only pane before the build; becomes the status pane.
    pub base: PaneRef,
    pub dir: &'a Path,
    pub commands: &'a PaneCommands,
}

impl WindowBuild<'_, '_> {
    pub fn run(&self, layout: &LayoutSpec) -> Result<(), LfgError> {
        let plan = SplitPlan::for_layout(layout);

        let status = self.base.clone();
        let agent_id = self.split(
            &status,
            SplitDirection::Vertical,
            STATUS_SPLIT_PERCENT,
            "status pane",
        )?;
        let agent = PaneRef::resolve(agent_id.as_deref(), self.window, AGENT_PANE_INDEX);
        if let Some(cmd) = self.commands.status.as_deref() {
            self.inject(&status, cmd, "status");
        }

        let work_id = self.split(
            &agent,
            SplitDirection::Vertical,
            AGENT_SPLIT_PERCENT,
            "agent pane",
        )?;
        if let Some(cmd) = self.commands.agent.as_deref() {
            self.inject(&agent, cmd, "agent");
        }

        // Rows: row 0 is the work pane; each split carves rows i.. out of the last pane.
        let mut rows: Vec<PaneRef> = Vec::with_capacity(layout.len());
        rows.push(PaneRef::resolve(
            work_id.as_deref(),
            self.window,
            FIRST_WORK_PANE_INDEX,
        ));
        for split in &plan.vertical {
            let last = rows[rows.len() - 1].clone();
            debug!(
                row = split.row,
                target = %last.target(),
                percent = split.percent,
                remaining_percent = split.remaining_percent,
                remaining_height = split.remaining_height,
                "creating row"
            );
            let id = self.split(
                &last,
                SplitDirection::Vertical,
                split.percent,
                &format!("row {}", split.row),
            )?;
            rows.push(PaneRef::resolve(
                id.as_deref(),
                self.window,
                FIRST_WORK_PANE_INDEX + split.row,
            ));
        }

        // Columns, then commands, row by row.
        for (r, row) in layout.rows().iter().enumerate() {
            let first = rows[r].reindexed(plan.row_starts[r]);
            if !row.is_multi_pane() {
                if let Some(cmd) = non_blank(&row.command) {
                    self.inject(&first, cmd, &row.name);
                }
                continue;
            }

            let mut split_ids: Vec<Option<String>> = Vec::with_capacity(row.panes.len());
            for (j, percent) in plan.horizontal[r].iter().enumerate() {
                debug!(row = r, pane = j + 1, target = %first.target(), percent, "creating column");
                split_ids.push(self.split(
                    &first,
                    SplitDirection::Horizontal,
                    *percent,
                    &format!("pane {} in row {}", j + 1, r),
                )?);
            }

            for (j, pane) in row.panes.iter().enumerate() {
                let Some(cmd) = non_blank(&pane.command) else {
                    continue;
                };
                let target = match sub_pane_split_slot(row.panes.len(), j) {
                    None => first.clone(),
                    Some(slot) => match split_ids[slot].as_deref() {
                        Some(id) => PaneRef::Id(id.to_string()),
                        None => first.reindexed(plan.row_starts[r] + j),
                    },
                };
                self.inject(&target, cmd, &pane.name);
            }
        }

        report_nonfatal(
            self.tmux.select_pane(&agent.target()),
            "failed to select agent pane",
        );
        Ok(())
    }

    /// Structural split; any failure is fatal and names `step`. Returns the new pane id.
    fn split(
        &self,
        target: &PaneRef,
        direction: SplitDirection,
        percent: u32,
        step: &str,
    ) -> Result<Option<String>, LfgError> {
        let out = self
            .tmux
            .split_window(&target.target(), direction, percent, self.dir)
            .map_err(|e| LfgError::split(step, format!("{e:#}")))?;
        if !out.success {
            return Err(LfgError::split(step, out.failure_detail()));
        }
        Ok(parse_pane_id(&out.stdout))
    }

    fn inject(&self, pane: &PaneRef, command: &str, label: &str) {
        report_nonfatal(
            self.tmux.send_keys(&pane.target(), command),
            &format!("failed to run command in pane {label}"),
        );
    }
}
