//! Command implementations for pkgspec-cli

pub mod generate;

pub use generate::{GenerateOptions, Outcome, run_generate};
