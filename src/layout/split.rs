//! Split arithmetic for the work area.
//!
//! tmux `split-window -p N` gives the *new* pane N% of the pane being split. Rows are
//! carved top-down by always splitting the last-created pane: the new pane receives every
//! row from `i` onward and the old pane keeps row `i-1`. Columns inside a row are carved by
//! always splitting the row's first pane with `100*(r-1)/r`, where `r` counts the columns
//! still to be made. Because the first pane shrinks each time, the resulting columns are
//! not equal (three panes come out 17 | 17 | 66).

use serde::Serialize;

use super::{LayoutSpec, Row};

/// Pane 0 keeps the top 5%: the new pane gets 95%.
pub const STATUS_SPLIT_PERCENT: u32 = 95;
/// Pane 1 keeps 45% of the remainder: the new work pane gets 55%.
pub const AGENT_SPLIT_PERCENT: u32 = 55;
pub const STATUS_PANE_INDEX: usize = 0;
pub const AGENT_PANE_INDEX: usize = 1;
pub const FIRST_WORK_PANE_INDEX: usize = 2;

/// Parse "40%", "40" or " 40% " into 40. Zero, negative and non-numeric input yield `None`.
pub fn parse_percentage(s: &str) -> Option<u32> {
    let s = s.trim();
    let s = s.strip_suffix('%').unwrap_or(s);
    s.parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

/// Integer height of each row; unusable heights fall back to `100 / rows.len()`.
pub fn effective_heights(rows: &[Row]) -> Vec<u32> {
    if rows.is_empty() {
        return Vec::new();
    }
    let fallback = 100 / rows.len() as u32;
    rows.iter()
        .map(|r| parse_percentage(&r.height).unwrap_or(fallback))
        .collect()
}

/// One vertical split: creates the pane for `row`, splitting the pane of `row - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerticalSplit {
    pub row: usize,
    pub percent: u32,
    pub remaining_height: u32,
    pub remaining_percent: u32,
}

/// Vertical splits for rows `1..n` (row 0 is the base work pane and needs none).
///
/// Heights that over-subscribe the work area can drive the ratio to 100 or beyond (or the
/// divisor to zero); tmux rejects those, so the percent is clamped to `1..=99`. Heights
/// summing to at most 100 never hit the clamp.
pub fn vertical_splits(heights: &[u32]) -> Vec<VerticalSplit> {
    let mut out = Vec::with_capacity(heights.len().saturating_sub(1));
    let mut remaining_percent: i64 = 100;
    for row in 1..heights.len() {
        let remaining_height: i64 = heights[row..].iter().map(|&h| i64::from(h)).sum();
        let raw = if remaining_percent > 0 {
            remaining_height * 100 / remaining_percent
        } else {
            100
        };
        out.push(VerticalSplit {
            row,
            percent: raw.clamp(1, 99) as u32,
            remaining_height: remaining_height as u32,
            remaining_percent: remaining_percent.max(0) as u32,
        });
        remaining_percent -= i64::from(heights[row - 1]);
    }
    out
}

/// Equal-share percentages for splitting one row into `pane_count` columns.
///
/// Split `j` (1-based) gives the new pane `100 * (r - 1) / r` of the first pane where
/// `r = pane_count - j + 1` columns are still to be carved out of it.
pub fn horizontal_split_percents(pane_count: usize) -> Vec<u32> {
    (1..pane_count)
        .map(|j| {
            let remaining = (pane_count - j + 1) as u32;
            100 * (remaining - 1) / remaining
        })
        .collect()
}

/// Which horizontal split (0-based, creation order) produced sub-pane `sub_pane` of a row.
///
/// Each split of the first pane inserts the new pane directly to its right, so the
/// left-to-right order is `first, split[k-2], ..., split[0]`. Sub-pane 0 is the row's
/// original pane and has no split.
pub fn sub_pane_split_slot(pane_count: usize, sub_pane: usize) -> Option<usize> {
    if sub_pane == 0 || sub_pane >= pane_count {
        None
    } else {
        Some(pane_count - 1 - sub_pane)
    }
}

/// Creation-order index of each row's first pane once the whole layout is built.
pub fn row_start_indices(rows: &[Row]) -> Vec<usize> {
    let mut next = FIRST_WORK_PANE_INDEX;
    rows.iter()
        .map(|r| {
            let start = next;
            next += r.pane_count();
            start
        })
        .collect()
}

/// Everything the provisioner computes before talking to tmux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitPlan {
    pub heights: Vec<u32>,
    pub vertical: Vec<VerticalSplit>,
    /// Per row; empty for single-pane rows.
    pub horizontal: Vec<Vec<u32>>,
    pub row_starts: Vec<usize>,
}

impl SplitPlan {
    pub fn for_layout(spec: &LayoutSpec) -> Self {
        let heights = effective_heights(spec.rows());
        let vertical = vertical_splits(&heights);
        let horizontal = spec
            .rows()
            .iter()
            .map(|r| horizontal_split_percents(r.panes.len()))
            .collect();
        Self {
            heights,
            vertical,
            horizontal,
            row_starts: row_start_indices(spec.rows()),
        }
    }

    /// Panes in the window after the build, status and agent panes included.
    pub fn total_panes(&self) -> usize {
        FIRST_WORK_PANE_INDEX
            + self
                .horizontal
                .iter()
                .map(|h| h.len() + 1)
                .sum::<usize>()
    }
}
