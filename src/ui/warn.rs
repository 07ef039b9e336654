use std::io::{BufRead, Write};

/// Print a standardized warning line to stderr (color-aware).
pub fn warn_print(msg: &str) {
    let use_err = crate::color_enabled_stderr();
    eprintln!(
        "{}",
        crate::paint(use_err, "\x1b[33;1m", &format!("warning: {}", msg))
    );
}

/// Print warning lines and, when interactive, ask a yes/no question on stderr.
///
/// Returns false without prompting when stdin/stderr are not terminals or `CI=1`,
/// so destructive operations never proceed unattended without an explicit flag.
pub fn warn_confirm(lines: &[&str], question: &str) -> bool {
    for l in lines {
        warn_print(l);
    }

    let interactive = atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stderr);
    let ci = std::env::var("CI").ok().as_deref() == Some("1");
    if !interactive || ci {
        return false;
    }

    let use_err = crate::color_enabled_stderr();
    eprint!(
        "{}",
        crate::paint(use_err, "\x1b[90m", &format!("{question} [y/N]: "))
    );
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
