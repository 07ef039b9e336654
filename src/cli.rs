use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// List worktrees and whether each has a tmux session
    List {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a worktree next to the main one, then open its session
    New {
        /// Worktree directory name (also the session name)
        name: String,
        /// Branch to create (default: the worktree name)
        #[arg(long, short = 'b')]
        branch: Option<String>,
        /// Only create the worktree and session; do not attach
        #[arg(long = "no-attach")]
        no_attach: bool,
    },

    /// Kill a worktree's session and remove the worktree
    #[command(alias = "remove")]
    Rm {
        name: String,
        /// Also delete the worktree's branch (best-effort)
        #[arg(long = "delete-branch")]
        delete_branch: bool,
        /// Remove even with uncommitted changes, without asking
        #[arg(long)]
        force: bool,
    },

    /// Kill a worktree's tmux session, keeping the worktree
    Kill { name: String },

    /// Print the split plan for the configured layout (no tmux involved)
    Plan {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default lfg-config.yaml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Check tmux, git and config availability
    Doctor,
}

#[derive(Parser, Debug)]
#[command(
    name = "lfg",
    version,
    about = "Jump between git worktrees, each in its own tmux session with a fixed pane layout.",
    after_long_help = "Examples:\n  lfg feature-x\n  lfg new feature-y --branch feat/y\n  lfg plan --json\n  lfg --dry-run feature-x\n\n",
    after_help = "\n"
)]
pub(crate) struct Cli {
    /// Worktree to jump to (directory name)
    pub(crate) worktree: Option<String>,

    /// Config file (default: lfg-config.yaml in the main worktree; env LFG_CONFIG)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum, global = true)]
    pub(crate) color: Option<lfg::ColorMode>,

    /// Print detailed execution info
    #[arg(long, short = 'v', global = true)]
    pub(crate) verbose: bool,

    /// Print tmux and git mutations instead of executing them
    #[arg(long, global = true)]
    pub(crate) dry_run: bool,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}
