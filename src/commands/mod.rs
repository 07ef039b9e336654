use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde::Serialize;

use lfg::config::{resolve_config_path, Config};
use lfg::git::{self, Worktree};
use lfg::layout::split::{AGENT_SPLIT_PERCENT, STATUS_SPLIT_PERCENT};
use lfg::util::exec::{CommandRunner, DryRunRunner, SystemRunner};
use lfg::{sanitize_session_name, LayoutSpec, LfgError, Outcome, SessionProvisioner, SplitPlan, Tmux};

use crate::cli::Cli;

/// Runners for one invocation: queries always execute, mutations are printed under `--dry-run`.
pub(crate) struct Runners {
    query: SystemRunner,
    tmux_dry: Option<DryRunRunner>,
    git_dry: Option<DryRunRunner>,
}

impl Runners {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            query: SystemRunner,
            tmux_dry: dry_run.then(DryRunRunner::for_tmux),
            git_dry: dry_run.then(|| DryRunRunner::new(&[])),
        }
    }

    fn dry_run(&self) -> bool {
        self.tmux_dry.is_some()
    }

    fn git_query(&self) -> &dyn CommandRunner {
        &self.query
    }

    fn git_mutate(&self) -> &dyn CommandRunner {
        match &self.git_dry {
            Some(d) => d as &dyn CommandRunner,
            None => &self.query,
        }
    }

    /// tmux client; under `--dry-run` a missing binary is not an error.
    fn tmux(&self) -> Result<Tmux<'_>, LfgError> {
        match &self.tmux_dry {
            Some(d) => Ok(Tmux::locate(d).unwrap_or_else(|_| Tmux::with_binary("tmux", d))),
            None => Tmux::locate(&self.query),
        }
    }
}

fn load_config(cli: &Cli, runners: &Runners) -> Result<Config, LfgError> {
    let cfg = Config::load(cli.config.as_deref(), runners.git_query())?;
    if let Some(p) = cfg.path().filter(|p| !p.exists()) {
        let use_err = lfg::color_enabled_stderr();
        lfg::log_warn_stderr(
            use_err,
            &format!(
                "lfg: no config at {}; using a single shell row (run `lfg init`)",
                p.display()
            ),
        );
    }
    Ok(cfg)
}

fn open_session(
    cli: &Cli,
    runners: &Runners,
    name: &str,
    dir: &Path,
    attach: bool,
) -> Result<Outcome, LfgError> {
    let cfg = load_config(cli, runners)?;
    let layout = cfg.layout();
    let tmux = runners.tmux()?;
    let provisioner = SessionProvisioner::new(&tmux)
        .with_pane_commands(cfg.pane_commands(name))
        .with_mouse(cfg.mouse);
    if attach {
        provisioner.provision_and_attach(name, dir, &layout)
    } else {
        provisioner.provision(name, dir, &layout)
    }
}

/// `lfg [WORKTREE]`: provision the worktree's session and attach to it.
///
/// Without a name, the worktree containing the current directory is used.
pub(crate) fn run_jump(cli: &Cli, name: Option<&str>) -> Result<(), LfgError> {
    let runners = Runners::new(cli.dry_run);
    let wt = match name {
        Some(n) => git::find_worktree(runners.git_query(), n)?,
        None => {
            let cwd = std::env::current_dir()?;
            git::worktree_containing(runners.git_query(), &cwd)?.ok_or_else(|| {
                LfgError::Other(anyhow!(
                    "not inside a worktree; pass a name (see `lfg list`)"
                ))
            })?
        }
    };
    let outcome = open_session(cli, &runners, &wt.name(), &wt.path, true)?;
    tracing::debug!(worktree = %wt.name(), ?outcome, "jump finished");
    Ok(())
}

#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    name: String,
    #[serde(flatten)]
    worktree: &'a Worktree,
    session: String,
    session_running: bool,
}

pub(crate) fn run_list(cli: &Cli, json: bool) -> Result<(), LfgError> {
    let runners = Runners::new(cli.dry_run);
    let worktrees = git::list_worktrees(runners.git_query())?;
    // Session state is informational; a missing tmux just shows nothing running.
    let sessions = match Tmux::locate(&runners.query) {
        Ok(tmux) => tmux.list_sessions().unwrap_or_default(),
        Err(_) => Vec::new(),
    };

    let entries: Vec<ListEntry<'_>> = worktrees
        .iter()
        .map(|wt| {
            let session = sanitize_session_name(&wt.name());
            ListEntry {
                name: wt.name(),
                session_running: sessions.contains(&session),
                session,
                worktree: wt,
            }
        })
        .collect();

    if json {
        let s = serde_json::to_string_pretty(&entries)
            .map_err(|e| LfgError::Other(e.into()))?;
        println!("{s}");
        return Ok(());
    }

    let use_out = lfg::color_enabled_stdout();
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for e in &entries {
        let marker = if e.session_running {
            lfg::paint(use_out, "\x1b[32;1m", "*")
        } else {
            " ".to_string()
        };
        let branch = match (&e.worktree.branch, e.worktree.detached, e.worktree.bare) {
            (_, _, true) => "(bare)".to_string(),
            (Some(b), _, _) => b.clone(),
            (None, true, _) => "(detached)".to_string(),
            (None, false, _) => String::new(),
        };
        println!(
            "{marker} {:<width$}  {:<24}  {}",
            e.name,
            branch,
            lfg::paint(use_out, "\x1b[90m", &e.worktree.path.display().to_string()),
        );
    }
    Ok(())
}

pub(crate) fn run_new(
    cli: &Cli,
    name: &str,
    branch: Option<&str>,
    no_attach: bool,
) -> Result<(), LfgError> {
    let runners = Runners::new(cli.dry_run);
    let root = git::repo_root(runners.git_query())?;
    let path = git::create_worktree(runners.git_mutate(), &root, name, branch)?;
    if runners.dry_run() && !path.is_dir() {
        let use_err = lfg::color_enabled_stderr();
        lfg::log_info_stderr(
            use_err,
            &format!(
                "lfg: dry-run: {} does not exist yet; session not planned",
                path.display()
            ),
        );
        return Ok(());
    }
    // Sessions are keyed by the directory name, which is only the last part of a `a/b` name.
    open_session(cli, &runners, &git::worktree_name(&path), &path, !no_attach)?;
    Ok(())
}

pub(crate) fn run_rm(
    cli: &Cli,
    name: &str,
    delete_branch: bool,
    force: bool,
) -> Result<(), LfgError> {
    let runners = Runners::new(cli.dry_run);
    let wt = git::find_worktree(runners.git_query(), name)?;
    let root = git::repo_root(runners.git_query())?;
    if wt.path == root {
        return Err(LfgError::Other(anyhow!(
            "refusing to remove the main worktree {}",
            wt.path.display()
        )));
    }

    let mut force = force;
    if !force && git::is_dirty(runners.git_query(), &wt.path)? {
        let msg = format!("worktree '{name}' has uncommitted changes");
        if !lfg::ui::warn::warn_confirm(&[msg.as_str()], "Remove it anyway?") {
            return Err(LfgError::Other(anyhow!(
                "aborted: {msg} (use --force to remove)"
            )));
        }
        force = true;
    }

    match runners.tmux() {
        Ok(tmux) => tmux.kill_session(&sanitize_session_name(name))?,
        Err(e) => tracing::debug!(error = %e, "tmux unavailable; no session to kill"),
    }

    git::remove_worktree(runners.git_mutate(), &wt.path, force)?;

    if delete_branch {
        match wt.branch.as_deref() {
            Some(branch) => {
                if let Err(e) = git::delete_branch(runners.git_mutate(), &root, branch) {
                    lfg::warn_print(&format!("failed to delete branch {branch}: {e:#}"));
                }
            }
            None => lfg::warn_print(&format!("worktree '{name}' has no branch to delete")),
        }
    }
    Ok(())
}

pub(crate) fn run_kill(cli: &Cli, name: &str) -> Result<(), LfgError> {
    let runners = Runners::new(cli.dry_run);
    runners.tmux()?.kill_session(&sanitize_session_name(name))
}

#[derive(Debug, Serialize)]
struct PlanView<'a> {
    status_split_percent: u32,
    agent_split_percent: u32,
    rows: &'a LayoutSpec,
    #[serde(flatten)]
    plan: &'a SplitPlan,
    total_panes: usize,
}

/// Human-readable split plan, one line per tmux call in build order.
pub(crate) fn render_plan(layout: &LayoutSpec, plan: &SplitPlan) -> Vec<String> {
    let mut lines = vec![
        format!("split pane 0 -v {STATUS_SPLIT_PERCENT}%   (pane 0: status)"),
        format!("split pane 1 -v {AGENT_SPLIT_PERCENT}%   (pane 1: agent)"),
    ];
    for v in &plan.vertical {
        lines.push(format!(
            "split row {} -v {}%   (row {}: {}% of {}% remaining)",
            v.row - 1,
            v.percent,
            v.row,
            v.remaining_height,
            v.remaining_percent
        ));
    }
    for (r, row) in layout.rows().iter().enumerate() {
        let start = plan.row_starts[r];
        for (j, pct) in plan.horizontal[r].iter().enumerate() {
            lines.push(format!(
                "split pane {start} -h {pct}%   (row {r}, pane {})",
                j + 1
            ));
        }
        let label = if row.is_multi_pane() {
            row.panes
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(" | ")
        } else {
            row.name.clone()
        };
        lines.push(format!(
            "row {r}: {}% panes {}..{}  {label}",
            plan.heights[r],
            start,
            start + row.pane_count() - 1
        ));
    }
    lines
}

pub(crate) fn run_plan(cli: &Cli, json: bool) -> Result<(), LfgError> {
    let runners = Runners::new(cli.dry_run);
    let cfg = load_config(cli, &runners)?;
    let layout = cfg.layout();
    if layout.is_empty() {
        return Err(LfgError::Configuration(
            "no layout defined in config".to_string(),
        ));
    }
    let plan = SplitPlan::for_layout(&layout);

    if json {
        let view = PlanView {
            status_split_percent: STATUS_SPLIT_PERCENT,
            agent_split_percent: AGENT_SPLIT_PERCENT,
            rows: &layout,
            plan: &plan,
            total_panes: plan.total_panes(),
        };
        let s =
            serde_json::to_string_pretty(&view).map_err(|e| LfgError::Other(e.into()))?;
        println!("{s}");
        return Ok(());
    }

    for line in render_plan(&layout, &plan) {
        println!("{line}");
    }
    println!("total panes: {}", plan.total_panes());
    Ok(())
}

pub(crate) fn run_init(cli: &Cli, force: bool) -> Result<(), LfgError> {
    let runners = Runners::new(cli.dry_run);
    let path: PathBuf = resolve_config_path(cli.config.as_deref(), runners.git_query())?;
    if path.exists() && !force {
        return Err(LfgError::Configuration(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let name = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cfg = Config::starter(&name).with_path(&path);

    let use_err = lfg::color_enabled_stderr();
    if cli.dry_run {
        lfg::log_info_stderr(use_err, &format!("lfg: dry-run: write {}", path.display()));
        print!("{}", cfg.to_yaml()?);
        return Ok(());
    }
    cfg.save()?;
    lfg::log_info_stderr(use_err, &format!("lfg: wrote {}", path.display()));
    Ok(())
}
