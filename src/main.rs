use std::io;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use avl::menu::{Menu, MenuConfig};
use avl::Duplicates;

#[derive(Parser, Debug)]
#[command(
    name = "avl",
    version,
    about = "Insert and delete keys in an AVL tree and print it with balance factors"
)]
struct Cli {
    /// Turn on logging to stderr: -d for info, -dd for debug, -ddd for every rotation.
    /// `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    debug: u8,

    /// Leave the tree unchanged when inserting a key it already holds.
    #[arg(long)]
    reject_duplicates: bool,

    /// Don't print the menu or prompts, only results. For piping choices in.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let config = MenuConfig {
        show_prompts: !cli.quiet,
        duplicates: if cli.reject_duplicates {
            Duplicates::Ignore
        } else {
            Duplicates::Allow
        },
    };
    tracing::debug!(?config, "starting menu");

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(stdin.lock(), stdout.lock(), config)
        .run()
        .context("menu stopped unexpectedly")?;

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
