//! CLI argument parsing using clap derive

use clap::Parser;
use std::path::PathBuf;

/// pkgspec - Generate a Cabal package description from package.yaml
#[derive(Parser, Debug)]
#[command(name = "pkgspec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Package directory or package.yaml path, then `-` to print to stdout
    ///
    /// Examples:
    ///   pkgspec                  # ./package.yaml -> ./<name>.cabal
    ///   pkgspec lib/             # lib/package.yaml -> lib/<name>.cabal
    ///   pkgspec other.yaml -     # print the result instead of writing it
    #[arg(value_name = "PATH", num_args = 0..=2)]
    pub targets: Vec<String>,

    /// Overwrite the output even if it was modified by hand
    #[arg(short, long)]
    pub force: bool,

    /// Embed a hash of the output, to detect manual edits later
    #[arg(long)]
    pub hash: bool,

    /// Do not infer a Paths_<package> module
    #[arg(long)]
    pub no_paths_module: bool,

    /// Directory for downloaded defaults
    #[arg(long, env = "PKGSPEC_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Suppress status messages and warnings
    #[arg(short, long)]
    pub silent: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where to read from and where to write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub to_stdout: bool,
}

impl Cli {
    pub fn target(&self) -> Target {
        let to_stdout = self.targets.iter().any(|arg| arg == "-");
        let path = self
            .targets
            .iter()
            .find(|arg| arg.as_str() != "-")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Target { path, to_stdout }
    }
}
