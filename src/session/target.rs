use super::tmux::exact_session;

/// How a pane is addressed in tmux `-t` arguments.
///
/// `Id` is the `%N` handle tmux printed when the pane was created and stays valid no matter
/// how other panes are renumbered. `Index` is the creation-order fallback used when tmux
/// printed nothing; it is only correct as long as every earlier split succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneRef {
    Id(String),
    Index { window: String, index: usize },
}

impl PaneRef {
    pub fn resolve(id: Option<&str>, window: &str, index: usize) -> Self {
        match id {
            Some(id) => PaneRef::Id(id.to_string()),
            None => PaneRef::Index {
                window: window.to_string(),
                index,
            },
        }
    }

    pub fn target(&self) -> String {
        match self {
            PaneRef::Id(id) => id.clone(),
            PaneRef::Index { window, index } => format!("{window}.{index}"),
        }
    }

    /// Same pane, but with the fallback index replaced (ids are unaffected).
    pub fn reindexed(&self, index: usize) -> Self {
        match self {
            PaneRef::Id(id) => PaneRef::Id(id.clone()),
            PaneRef::Index { window, .. } => PaneRef::Index {
                window: window.clone(),
                index,
            },
        }
    }
}

/// Ids printed by `new-session`/`new-window -P -F '#{window_id} #{window_index} #{pane_id}'`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Created {
    pub window_id: Option<String>,
    pub window_index: Option<u32>,
    pub pane_id: Option<String>,
}

impl Created {
    /// Target for the created window: its id, else `=session:index`, else the session's
    /// current window (creation makes the new window current).
    ///
    /// Never built from the window name, which may contain `.` or `:`.
    pub fn window_target(&self, session: &str) -> String {
        match (&self.window_id, self.window_index) {
            (Some(id), _) => id.clone(),
            (None, Some(index)) => format!("{}:{index}", exact_session(session)),
            (None, None) => format!("{}:", exact_session(session)),
        }
    }
}

pub fn parse_created(stdout: &str) -> Created {
    let mut created = Created::default();
    for token in stdout.split_whitespace() {
        if token.len() > 1 && token.starts_with('@') && created.window_id.is_none() {
            created.window_id = Some(token.to_string());
        } else if token.len() > 1 && token.starts_with('%') && created.pane_id.is_none() {
            created.pane_id = Some(token.to_string());
        } else if created.window_index.is_none() {
            created.window_index = token.parse().ok();
        }
    }
    created
}

/// Pane id printed by `split-window -P -F '#{pane_id}'`, if any.
pub fn parse_pane_id(stdout: &str) -> Option<String> {
    parse_created(stdout).pane_id
}
