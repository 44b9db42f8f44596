//! Shared test utilities for the pkgspec workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] builder for package directories

pub mod project;

pub use project::TestProject;
