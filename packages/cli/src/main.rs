mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, css, init, inspect, resolve, ApplyArgs, CssArgs, InitArgs, InspectArgs, ResolveArgs};
use tracing_subscriber::EnvFilter;

/// Blockpage CLI - edit and inspect block-based pages
#[derive(Parser, Debug)]
#[command(name = "blockpage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Blockpage project
    Init(InitArgs),

    /// Print the block tree and forms of a page
    Inspect(InspectArgs),

    /// Show a block's resolved style at a breakpoint
    Resolve(ResolveArgs),

    /// Emit the page stylesheet with media queries
    Css(CssArgs),

    /// Apply an edit script to a page
    Apply(ApplyArgs),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Inspect(args) => inspect(args, &cwd),
        Command::Resolve(args) => resolve(args, &cwd),
        Command::Css(args) => css(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
