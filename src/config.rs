//! `lfg-config.yaml`: the layout rows plus the fixed-pane commands.
//!
//! The file lives at the main worktree's root so every worktree shares it. Keys this crate
//! does not model (todos, storage backend, ...) are kept verbatim and written back on save.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::LfgError;
use crate::layout::{resolve_layout, LayoutSpec, Pane, Row, Window};
use crate::session::PaneCommands;
use crate::util::exec::CommandRunner;

pub const CONFIG_FILE_NAME: &str = "lfg-config.yaml";

/// Explicit config path override.
pub const CONFIG_ENV: &str = "LFG_CONFIG";

fn default_mouse() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub worktree_naming: String,
    /// Deprecated flat window list; only read when `layout` is empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<Window>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layout: Vec<Row>,
    /// Typed into the status pane; `{worktree}` and `{config}` are substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_command: Option<String>,
    /// Typed into the agent pane; same placeholders as `status_command`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_command: Option<String>,
    #[serde(default = "default_mouse", skip_serializing_if = "is_true")]
    pub mouse: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: String::new(),
            worktree_naming: String::new(),
            windows: Vec::new(),
            layout: vec![Row {
                height: "100%".to_string(),
                name: "shell".to_string(),
                command: None,
                panes: Vec::new(),
            }],
            status_command: None,
            agent_command: None,
            mouse: true,
            extra: BTreeMap::new(),
            path: None,
        }
    }
}

impl Config {
    /// What `lfg init` writes: an editor row over a split server/shell row.
    pub fn starter(name: &str) -> Self {
        let pane = |n: &str| Pane {
            name: n.to_string(),
            ..Pane::default()
        };
        Self {
            name: name.to_string(),
            layout: vec![
                Row {
                    height: "60%".to_string(),
                    name: "editor".to_string(),
                    ..Row::default()
                },
                Row {
                    height: "40%".to_string(),
                    panes: vec![pane("server"), pane("shell")],
                    ..Row::default()
                },
            ],
            ..Self::default()
        }
    }

    /// Load from `explicit`, else `$LFG_CONFIG`, else `<main worktree>/lfg-config.yaml`.
    ///
    /// A missing file yields the default config (one full-height shell row) bound to that path.
    pub fn load(explicit: Option<&Path>, runner: &dyn CommandRunner) -> Result<Self> {
        let path = resolve_config_path(explicit, runner)?;
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found; using defaults");
            let mut cfg = Self::default();
            cfg.path = Some(path);
            return Ok(cfg);
        }
        Self::load_from_path(&path)
    }

    /// Load from a specific path; the file must exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut cfg = Self::from_yaml(&contents).map_err(|e| {
            LfgError::Configuration(format!("failed to parse {}: {e:#}", path.display()))
        })?;
        cfg.path = Some(path.to_path_buf());
        Ok(cfg)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let doc: serde_yaml::Value = if contents.trim().is_empty() {
            serde_yaml::Value::Null
        } else {
            serde_yaml::from_str(contents)?
        };
        // An empty (or comment-only) document is null, not a mapping.
        let doc = match doc {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
            other => other,
        };
        Ok(serde_yaml::from_value(doc)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("config has no path to save to"))?;
        self.save_to_path(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_yaml()?)
            .with_context(|| format!("failed to write config {}", path.display()))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Canonical layout rows (legacy `windows` converted when `layout` is empty).
    pub fn layout(&self) -> LayoutSpec {
        resolve_layout(&self.layout, &self.windows)
    }

    /// Directory holding the config file, i.e. the main worktree.
    pub fn working_directory_hint(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Status/agent pane commands rendered for `worktree`.
    pub fn pane_commands(&self, worktree: &str) -> PaneCommands {
        let render = |t: &Option<String>| {
            t.as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| self.render_template(t, worktree))
        };
        PaneCommands {
            status: render(&self.status_command),
            agent: render(&self.agent_command),
        }
    }

    fn render_template(&self, template: &str, worktree: &str) -> String {
        let config = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        template
            .replace("{worktree}", &crate::shell_escape(worktree))
            .replace("{config}", &crate::shell_escape(&config))
    }
}

/// Where the config lives for this invocation.
pub fn resolve_config_path(explicit: Option<&Path>, runner: &dyn CommandRunner) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let root = crate::git::repo_root(runner).context("failed to locate repository root")?;
    Ok(root.join(CONFIG_FILE_NAME))
}
