//! Error types for pkgspec-core

/// Result type for pkgspec-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions. Any of these aborts the run before output is produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structural mismatch at a JSON-pointer-like path
    #[error("{origin}: Error while parsing {path} - {message}")]
    Parse {
        origin: String,
        path: String,
        message: String,
    },

    /// The YAML text itself could not be parsed
    #[error("{origin}: {message}")]
    Yaml { origin: String, message: String },

    /// A keyword field holds a value outside its accepted set
    #[error("{origin}: Error while parsing {path} - invalid value \"{value}\", expected one of {expected}")]
    InvalidEnumValue {
        origin: String,
        path: String,
        value: String,
        expected: String,
    },

    /// A referenced defaults document does not exist
    #[error("Invalid value for \"defaults\"! File {location} does not exist!")]
    MissingDefaults { location: String },

    /// A defaults document (transitively) references itself
    #[error("cycle in defaults ({})", cycle.join(" -> "))]
    CyclicDefaults { cycle: Vec<String> },

    /// A defaults reference names both a remote and a local source
    #[error("{origin}: Error while parsing {path} - \"github\" and \"local\" are mutually exclusive")]
    ConflictingDefaultsSource { origin: String, path: String },

    /// The manifest requires a newer compiler
    #[error("The file {origin} requires version {required} of pkgspec, but only {current} is installed.")]
    UnsupportedSpecVersion {
        origin: String,
        required: String,
        current: String,
    },

    /// A remote defaults document could not be retrieved
    #[error("Failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },

    /// Filesystem error from pkgspec-fs
    #[error(transparent)]
    Fs(#[from] pkgspec_fs::Error),
}

impl Error {
    pub fn parse(
        origin: impl Into<String>,
        path: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            origin: origin.into(),
            path: path.to_string(),
            message: message.into(),
        }
    }
}
