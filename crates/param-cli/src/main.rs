//! paramtree CLI
//!
//! Renders, flattens and queries parameter files.

mod cli;
mod commands;
mod error;

use std::io;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use commands::Input;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    result.map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.max_iterations),
        None => {
            println!("{} Render and inspect parameter files", "paramtree".green().bold());
            println!();
            println!("Run {} for available commands.", "paramtree --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, max_iterations: usize) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match cmd {
        Commands::Render { file, load, context } => {
            let input = Input {
                file: &file,
                load,
                context: &context,
                max_iterations,
            };
            commands::run_render(&input, &mut stdout)
        }
        Commands::Flatten {
            file,
            load,
            json,
            context,
        } => {
            let input = Input {
                file: &file,
                load,
                context: &context,
                max_iterations,
            };
            commands::run_flatten(&input, json, &mut stdout)
        }
        Commands::Get {
            file,
            path,
            load,
            context,
        } => {
            let input = Input {
                file: &file,
                load,
                context: &context,
                max_iterations,
            };
            commands::run_get(&input, &path, &mut stdout)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "paramtree", &mut stdout);
            Ok(())
        }
    }
}
