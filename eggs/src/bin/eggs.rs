//! The `eggs` CLI tool.

use std::process::ExitCode;

use clap::Parser;
use eggs::cli::{Cli, Command};
use simplelog::{ColorChoice, Config, TermLogger};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = TermLogger::init(
        cli.verbose.log_level_filter(),
        Config::default(),
        simplelog::TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger:\n{error}");
        return ExitCode::FAILURE;
    }

    let stdout = std::io::stdout();
    let mut output = stdout.lock();

    let result = match &cli.command {
        Command::Install { requirement, root, force, forceall } => {
            eggs::commands::install(&cli, requirement, *root, *force, *forceall, &mut output)
        }
        Command::Remove { requirement } => eggs::commands::remove(&cli, requirement, &mut output),
        Command::Query { name } => eggs::commands::query(&cli, name.as_deref(), &mut output),
        Command::History => eggs::commands::history(&cli, &mut output),
        Command::Revert { revision } => eggs::commands::revert(&cli, revision, &mut output),
    };

    if let Err(error) = result {
        eprintln!("{error}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
