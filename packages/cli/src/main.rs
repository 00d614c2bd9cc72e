mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{adjust, list, render, AdjustArgs, ListArgs, RenderArgs};

/// Aerate - Doxygen XML to reStructuredText for Sphinx
#[derive(Parser, Debug)]
#[command(name = "aerate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render documented members as reStructuredText
    Render(RenderArgs),

    /// Print the canonicalized XML of one member or compound
    Adjust(AdjustArgs),

    /// List indexed members
    List(ListArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Render(args) => render(args, &cwd),
        Command::Adjust(args) => adjust(args, &cwd),
        Command::List(args) => list(args, &cwd),
    }
}

fn main() {
    // Diagnostics go to stderr so rendered output can be piped
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
