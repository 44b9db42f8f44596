//! Error types for pkgspec-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from pkgspec-core
    #[error(transparent)]
    Core(#[from] pkgspec_core::Error),

    /// Error from pkgspec-fs
    #[error(transparent)]
    Fs(#[from] pkgspec_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_displays_its_message() {
        let error = CliError::user("package.yaml does not exist");
        assert_eq!(error.to_string(), "package.yaml does not exist");
    }

    #[test]
    fn core_errors_pass_through() {
        let error = CliError::from(pkgspec_core::Error::MissingDefaults {
            location: "/pkg/defaults.yaml".into(),
        });
        assert_eq!(
            error.to_string(),
            "Invalid value for \"defaults\"! File /pkg/defaults.yaml does not exist!"
        );
    }
}
