//! Declarative pane layout: the rows a user configures below the fixed status and agent panes.
//!
//! `resolve` turns config data (current `layout` rows or legacy `windows`) into a
//! canonical [`LayoutSpec`]; `split` computes the tmux split percentages for it.
//! Nothing in this module touches tmux.

pub mod resolve;
pub mod split;

use serde::{Deserialize, Deserializer, Serialize};

pub use resolve::resolve_layout;
pub use split::{
    effective_heights, horizontal_split_percents, parse_percentage, row_start_indices,
    sub_pane_split_slot, vertical_splits, SplitPlan, VerticalSplit,
};

/// One cell of a multi-pane row.
///
/// `width` is accepted and written back but ignored by the split arithmetic, which
/// only looks at the pane count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pane {
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "opt_percent_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// One horizontal band of the work area.
///
/// `height` is a percentage (`40%`, `"40"` or a bare `40`) of the work area below the agent
/// pane, kept as text.
/// `name`/`command` apply only when `panes` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, deserialize_with = "percent_text")]
    pub height: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panes: Vec<Pane>,
}

impl Row {
    pub fn is_multi_pane(&self) -> bool {
        !self.panes.is_empty()
    }

    /// Number of tmux panes this row occupies once built.
    pub fn pane_count(&self) -> usize {
        self.panes.len().max(1)
    }
}

/// A size as written in YAML: `40%`, `"40"` or a bare number `40`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PercentText {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<PercentText> for String {
    fn from(p: PercentText) -> Self {
        match p {
            PercentText::Text(s) => s,
            PercentText::Int(n) => n.to_string(),
            PercentText::Float(f) => f.to_string(),
        }
    }
}

fn opt_percent_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PercentText>::deserialize(deserializer)?.map(String::from))
}

fn percent_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_percent_text(deserializer)?.unwrap_or_default())
}

/// Deprecated flat window list (name + optional command, no sizes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub name: String,
    #[serde(default)]
    pub command: Option<String>,
}

/// Ordered rows, top to bottom. Built per provisioning call and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayoutSpec {
    rows: Vec<Row>,
}

impl LayoutSpec {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total tmux panes in the work area (excluding status and agent panes).
    pub fn work_pane_count(&self) -> usize {
        self.rows.iter().map(Row::pane_count).sum()
    }
}

impl From<Vec<Row>> for LayoutSpec {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

/// Non-empty, trimmed command text; `None` for absent or blank commands.
pub(crate) fn non_blank(command: &Option<String>) -> Option<&str> {
    command
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
}
