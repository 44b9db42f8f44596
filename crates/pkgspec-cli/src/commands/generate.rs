//! Generate command implementation
//!
//! Compiles `package.yaml` and writes `<name>.cabal` next to it, keeping the
//! layout of an existing output and refusing to clobber manual edits.

use std::path::Path;

use colored::Colorize;

use pkgspec_core::render::strip_comment_block;
use pkgspec_core::{CompileOptions, Compiled, Compiler, Fetch, Stamp, Warning};
use pkgspec_fs::{DiskFiles, NormalizedPath, io};

use crate::error::{CliError, Result};

/// File read when the target is a directory.
pub const MANIFEST_FILE: &str = "package.yaml";

/// Switches taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub force: bool,
    pub hash: bool,
    pub silent: bool,
    pub to_stdout: bool,
    pub compile: CompileOptions,
}

/// What happened to the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Generated(NormalizedPath),
    UpToDate(NormalizedPath),
    Printed,
}

/// Run the generate command for a directory or a manifest path.
pub fn run_generate(target: &Path, fetch: &dyn Fetch, options: &GenerateOptions) -> Result<Outcome> {
    let manifest = manifest_path(target);
    let Some(text) = io::read_text_if_exists(&manifest)? else {
        return Err(CliError::user(format!("{manifest} does not exist")));
    };
    let directory = manifest
        .parent()
        .unwrap_or_else(|| NormalizedPath::new("."));

    let files = DiskFiles::new();
    let mut compiler = Compiler::new(fetch, &files).with_options(options.compile.clone());

    // The output name depends on the package name; a second pass picks up
    // the previous output's layout. Remote defaults are cached in between.
    let first = compiler.compile(&manifest, &text, None)?;
    let output = directory.join(&format!("{}.cabal", first.name));
    let previous = io::read_text_if_exists(&output)?;
    let compiled = match &previous {
        Some(previous) => {
            let stamp = Stamp::read(previous);
            let hash = options.hash || stamp.hash.is_some();
            let mut compiler = compiler.with_options(options.compile.clone().with_hash(hash));
            compiler.compile(&manifest, &text, Some(previous))?
        }
        None if options.hash => {
            let mut compiler = compiler.with_options(options.compile.clone().with_hash(true));
            compiler.compile(&manifest, &text, None)?
        }
        None => first,
    };

    if !options.silent {
        report_warnings(&compiled.warnings);
    }

    if options.to_stdout {
        print!("{}", compiled.text);
        return Ok(Outcome::Printed);
    }

    if let Some(previous) = &previous {
        check_overwrite(&output, previous, &compiled, options)?;
        if strip_comment_block(previous) == strip_comment_block(&compiled.text) {
            tracing::debug!(output = %output, "output unchanged");
            if !options.silent {
                println!("{} is up-to-date", output);
            }
            return Ok(Outcome::UpToDate(output));
        }
    }

    io::write_text(&output, &compiled.text)?;
    if !options.silent {
        println!("{} {}", "generated".green().bold(), output);
    }
    Ok(Outcome::Generated(output))
}

fn manifest_path(target: &Path) -> NormalizedPath {
    let path = NormalizedPath::new(target);
    if path.is_dir() {
        path.join(MANIFEST_FILE)
    } else {
        path
    }
}

fn check_overwrite(
    output: &NormalizedPath,
    previous: &str,
    compiled: &Compiled,
    options: &GenerateOptions,
) -> Result<()> {
    if options.force {
        return Ok(());
    }
    let stamp = Stamp::read(previous);
    let current = &options.compile.generator_version;
    if stamp.is_newer_than(current) {
        return Err(CliError::user(format!(
            "{output} was generated with a newer version of pkgspec, please upgrade and try again."
        )));
    }
    if stamp.is_modified(previous) && previous != compiled.text {
        return Err(CliError::user(format!(
            "{output} was modified manually, please use --force to overwrite."
        )));
    }
    Ok(())
}

fn report_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{} {}", "WARNING:".yellow().bold(), warning);
    }
}
