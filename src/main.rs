use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod doctor;

use cli::{Cli, Command};

fn dispatch(cli: &Cli) -> Result<(), lfg::LfgError> {
    match &cli.command {
        Some(Command::List { json }) => commands::run_list(cli, *json),
        Some(Command::New {
            name,
            branch,
            no_attach,
        }) => commands::run_new(cli, name, branch.as_deref(), *no_attach),
        Some(Command::Rm {
            name,
            delete_branch,
            force,
        }) => commands::run_rm(cli, name, *delete_branch, *force),
        Some(Command::Kill { name }) => commands::run_kill(cli, name),
        Some(Command::Plan { json }) => commands::run_plan(cli, *json),
        Some(Command::Init { force }) => commands::run_init(cli, *force),
        Some(Command::Doctor) => doctor::run_doctor(cli.config.as_deref(), cli.verbose),
        None => commands::run_jump(cli, cli.worktree.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(mode) = cli.color {
        lfg::set_color_mode(mode);
    }
    lfg::telemetry::init(cli.verbose);

    match dispatch(&cli) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            let use_err = lfg::color_enabled_stderr();
            lfg::log_error_stderr(use_err, &format!("lfg: {e}"));
            ExitCode::from(lfg::exit_code_for_error(&e))
        }
    }
}
