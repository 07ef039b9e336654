/*!
Test support helpers shared across integration tests.

- FakeRunner: a scripted CommandRunner that records every argv and answers by subcommand
- have_git()/have_tmux(): tool availability on PATH
- rows()/multi(): terse layout builders

These helpers do not print skip messages themselves so tests can keep their own
"skipping: ..." outputs.
*/

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::process::Command;

use lfg::util::exec::{CommandRunner, ExecOutput, ExecRequest};
use lfg::{Pane, Row};

/// Scripted runner. Unscripted tmux calls behave like a fresh server:
/// `has-session` fails, creation commands print new `@N <index> %N` ids, everything else
/// succeeds.
#[allow(dead_code)]
pub struct FakeRunner {
    calls: RefCell<Vec<Vec<String>>>,
    interactive: RefCell<Vec<Vec<String>>>,
    queued: RefCell<HashMap<String, VecDeque<ExecOutput>>>,
    sticky: RefCell<HashMap<String, ExecOutput>>,
    print_ids: bool,
    next_pane: Cell<u32>,
    next_window: Cell<u32>,
}

#[allow(dead_code)]
impl FakeRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            interactive: RefCell::new(Vec::new()),
            queued: RefCell::new(HashMap::new()),
            sticky: RefCell::new(HashMap::new()),
            print_ids: true,
            next_pane: Cell::new(0),
            next_window: Cell::new(0),
        }
    }

    /// Creation commands print nothing, as an old or wrapped tmux might.
    pub fn without_ids() -> Self {
        Self {
            print_ids: false,
            ..Self::new()
        }
    }

    /// Answer the next call of `sub` (first argv word) with `out`; queued answers are used in order.
    pub fn respond(&self, sub: &str, out: ExecOutput) -> &Self {
        self.queued
            .borrow_mut()
            .entry(sub.to_string())
            .or_default()
            .push_back(out);
        self
    }

    /// Answer every call of `sub` with `out` once the queue for it is empty.
    pub fn always(&self, sub: &str, out: ExecOutput) -> &Self {
        self.sticky.borrow_mut().insert(sub.to_string(), out);
        self
    }

    /// Mark a session as running with the given window names; window `i` has id `@10i`.
    pub fn with_session_windows(&self, windows: &[&str]) -> &Self {
        self.always("has-session", ExecOutput::ok(""));
        let listing: String = windows
            .iter()
            .enumerate()
            .map(|(i, name)| format!("@{} {name}\n", 100 + i))
            .collect();
        self.respond("list-windows", ExecOutput::ok(listing))
    }

    /// Every captured and interactive call, in order, program excluded.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn interactive_calls(&self) -> Vec<Vec<String>> {
        self.interactive.borrow().clone()
    }

    /// First argv word of each call, in order.
    pub fn subcommands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.first().cloned().unwrap_or_default())
            .collect()
    }

    pub fn calls_of(&self, sub: &str) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.first().map(String::as_str) == Some(sub))
            .cloned()
            .collect()
    }

    fn fresh_pane(&self) -> String {
        let n = self.next_pane.get();
        self.next_pane.set(n + 1);
        format!("%{n}")
    }

    fn fresh_window(&self) -> String {
        let n = self.next_window.get();
        self.next_window.set(n + 1);
        format!("@{n}")
    }

    fn answer(&self, argv: &[String]) -> ExecOutput {
        let sub = argv.first().map(String::as_str).unwrap_or("");
        if let Some(out) = self
            .queued
            .borrow_mut()
            .get_mut(sub)
            .and_then(VecDeque::pop_front)
        {
            return out;
        }
        if let Some(out) = self.sticky.borrow().get(sub) {
            return out.clone();
        }
        match sub {
            "has-session" => ExecOutput::failed(1, format!("can't find session: {}", argv[2])),
            "list-sessions" => ExecOutput::failed(1, "no server running on /tmp/tmux-0/default"),
            "new-session" | "new-window" if self.print_ids => {
                let index = self.next_window.get();
                let w = self.fresh_window();
                let p = self.fresh_pane();
                ExecOutput::ok(format!("{w} {index} {p}\n"))
            }
            "split-window" if self.print_ids => ExecOutput::ok(format!("{}\n", self.fresh_pane())),
            _ => ExecOutput::ok(""),
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, request: &ExecRequest) -> anyhow::Result<ExecOutput> {
        let argv = request.argv();
        self.calls.borrow_mut().push(argv.clone());
        Ok(self.answer(&argv))
    }

    fn run_interactive(&self, request: &ExecRequest) -> anyhow::Result<ExecOutput> {
        let argv = request.argv();
        self.calls.borrow_mut().push(argv.clone());
        self.interactive.borrow_mut().push(argv.clone());
        Ok(self.answer(&argv))
    }
}

/// Value following `flag` in an argv, if present.
#[allow(dead_code)]
pub fn flag_value<'a>(argv: &'a [String], flag: &str) -> Option<&'a str> {
    argv.iter()
        .position(|a| a == flag)
        .and_then(|i| argv.get(i + 1))
        .map(String::as_str)
}

#[allow(dead_code)]
pub fn row(height: &str, name: &str, command: Option<&str>) -> Row {
    Row {
        height: height.to_string(),
        name: name.to_string(),
        command: command.map(str::to_string),
        panes: Vec::new(),
    }
}

/// Multi-pane row; each pane is `(name, command)`.
#[allow(dead_code)]
pub fn multi(height: &str, panes: &[(&str, Option<&str>)]) -> Row {
    Row {
        height: height.to_string(),
        name: String::new(),
        command: None,
        panes: panes
            .iter()
            .map(|(n, c)| Pane {
                name: n.to_string(),
                width: None,
                command: c.map(str::to_string),
            })
            .collect(),
    }
}

fn tool_runs(bin: &str, arg: &str) -> bool {
    Command::new(bin)
        .arg(arg)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return true if `git` is available on PATH.
#[allow(dead_code)]
pub fn have_git() -> bool {
    tool_runs("git", "--version")
}

/// Return true if `tmux` is available on PATH.
#[allow(dead_code)]
pub fn have_tmux() -> bool {
    tool_runs("tmux", "-V")
}
