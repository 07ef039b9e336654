use super::{LayoutSpec, Row, Window};

/// Canonical rows from config data.
///
/// A non-empty `layout` wins and is returned as-is. Otherwise each legacy window becomes a
/// single-pane row of `100 / n` percent. With neither, the result is empty; whether that is
/// fatal is the caller's decision.
pub fn resolve_layout(layout: &[Row], windows: &[Window]) -> LayoutSpec {
    if !layout.is_empty() {
        return LayoutSpec::new(layout.to_vec());
    }
    if windows.is_empty() {
        return LayoutSpec::default();
    }

    let height = format!("{}%", 100 / windows.len());
    windows
        .iter()
        .map(|w| Row {
            height: height.clone(),
            name: w.name.clone(),
            command: w.command.clone(),
            panes: Vec::new(),
        })
        .collect::<Vec<_>>()
        .into()
}
