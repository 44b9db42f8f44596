//! pkgspec CLI
//!
//! Generates a Cabal package description from `package.yaml`.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pkgspec_core::{CompileOptions, InferenceOptions, StandardFetcher};

use cli::Cli;
use commands::GenerateOptions;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .with_target(true)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("Verbose mode enabled");
        }
    }

    let mut fetch = StandardFetcher::new();
    if let Some(dir) = &cli.cache_dir {
        fetch = fetch.with_cache_dir(dir);
    }

    let mut compile = CompileOptions::default().with_hash(cli.hash);
    if cli.no_paths_module {
        compile = compile.with_inference(InferenceOptions::without_paths_module());
    }

    let target = cli.target();
    let options = GenerateOptions {
        force: cli.force,
        hash: cli.hash,
        silent: cli.silent,
        to_stdout: target.to_stdout,
        compile,
    };
    commands::run_generate(&target.path, &fetch, &options)?;
    Ok(())
}
