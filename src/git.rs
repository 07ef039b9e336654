//! Git worktree queries and mutations, all through a [`CommandRunner`].

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use crate::errors::LfgError;
use crate::util::exec::{CommandRunner, ExecOutput, ExecRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    /// Short branch name (`refs/heads/` stripped); `None` when detached or bare.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub detached: bool,
    pub bare: bool,
}

impl Worktree {
    /// Directory basename; this is the name sessions and CLI arguments use.
    pub fn name(&self) -> String {
        worktree_name(&self.path)
    }
}

pub fn worktree_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn git(args: &[&str]) -> ExecRequest {
    ExecRequest::new("git").args(args.iter().copied())
}

fn run_checked(runner: &dyn CommandRunner, req: &ExecRequest, what: &str) -> Result<ExecOutput> {
    let out = runner
        .run(req)
        .with_context(|| format!("failed to run {what}"))?;
    if !out.success {
        return Err(LfgError::command(what, out.failure_detail()).into());
    }
    Ok(out)
}

/// Parse `git worktree list --porcelain`. Blocks are separated by blank lines; a final
/// block without a trailing blank line is still taken.
pub fn parse_worktrees(output: &str) -> Vec<Worktree> {
    let mut worktrees = Vec::new();
    let mut current: Option<Worktree> = None;

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            worktrees.extend(current.take());
            continue;
        }
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        match key {
            "worktree" => {
                worktrees.extend(current.take());
                current = Some(Worktree {
                    path: PathBuf::from(value),
                    ..Worktree::default()
                });
            }
            "HEAD" => {
                if let Some(wt) = current.as_mut() {
                    wt.head = Some(value.to_string());
                }
            }
            "branch" => {
                if let Some(wt) = current.as_mut() {
                    let short = value.strip_prefix("refs/heads/").unwrap_or(value);
                    wt.branch = Some(short.to_string());
                }
            }
            "detached" => {
                if let Some(wt) = current.as_mut() {
                    wt.detached = true;
                }
            }
            "bare" => {
                if let Some(wt) = current.as_mut() {
                    wt.bare = true;
                }
            }
            _ => {}
        }
    }
    worktrees.extend(current);
    worktrees
}

pub fn list_worktrees(runner: &dyn CommandRunner) -> Result<Vec<Worktree>> {
    let out = run_checked(
        runner,
        &git(&["worktree", "list", "--porcelain"]),
        "git worktree list",
    )?;
    Ok(parse_worktrees(&out.stdout))
}

pub fn find_worktree(runner: &dyn CommandRunner, name: &str) -> Result<Worktree> {
    list_worktrees(runner)?
        .into_iter()
        .find(|wt| wt.name() == name)
        .ok_or_else(|| anyhow!("worktree '{name}' not found"))
}

/// The worktree containing `dir`, if any (longest matching path wins).
pub fn worktree_containing(runner: &dyn CommandRunner, dir: &Path) -> Result<Option<Worktree>> {
    Ok(list_worktrees(runner)?
        .into_iter()
        .filter(|wt| dir.starts_with(&wt.path))
        .max_by_key(|wt| wt.path.components().count()))
}

/// Root of the main worktree: the first porcelain entry, else `rev-parse --show-toplevel`.
pub fn repo_root(runner: &dyn CommandRunner) -> Result<PathBuf> {
    if let Ok(wts) = list_worktrees(runner) {
        if let Some(first) = wts.into_iter().find(|wt| !wt.bare) {
            return Ok(first.path);
        }
    }
    let out = run_checked(
        runner,
        &git(&["rev-parse", "--show-toplevel"]),
        "git rev-parse",
    )
    .context("not in a git repository")?;
    Ok(PathBuf::from(out.stdout.trim()))
}

/// Where `lfg new <name>` puts a worktree: a sibling of the main worktree.
pub fn worktree_path_for(root: &Path, name: &str) -> PathBuf {
    root.parent().unwrap_or(root).join(name)
}

/// `git worktree add -b <branch> <root>/../<name>`; the branch defaults to `name`.
pub fn create_worktree(
    runner: &dyn CommandRunner,
    root: &Path,
    name: &str,
    branch: Option<&str>,
) -> Result<PathBuf> {
    let path = worktree_path_for(root, name);
    let req = ExecRequest::new("git")
        .args(["worktree", "add", "-b", branch.unwrap_or(name)])
        .arg(path.as_os_str())
        .cwd(root);
    run_checked(runner, &req, "git worktree add")?;
    tracing::info!(path = %path.display(), "worktree created");
    Ok(path)
}

pub fn remove_worktree(runner: &dyn CommandRunner, path: &Path, force: bool) -> Result<()> {
    let mut req = ExecRequest::new("git").args(["worktree", "remove"]);
    if force {
        req = req.arg("--force");
    }
    run_checked(runner, &req.arg(path.as_os_str()), "git worktree remove")?;
    Ok(())
}

/// `git branch -D`; the caller decides whether a failure matters.
pub fn delete_branch(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> Result<()> {
    let req = git(&["branch", "-D", branch]).cwd(repo);
    run_checked(runner, &req, "git branch -D")?;
    Ok(())
}

/// Uncommitted changes (tracked or untracked) in the worktree at `path`.
pub fn is_dirty(runner: &dyn CommandRunner, path: &Path) -> Result<bool> {
    let req = ExecRequest::new("git")
        .arg("-C")
        .arg(path.as_os_str())
        .args(["status", "--porcelain"]);
    let out = run_checked(runner, &req, "git status")?;
    Ok(!out.stdout.trim().is_empty())
}
