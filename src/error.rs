//! Error types for baby

use thiserror::Error;

/// Result type alias using baby's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing or running rules
#[derive(Debug, Error)]
pub enum Error {
    /// No rule with this name exists in the store
    #[error("Rule '{0}' not found")]
    NotFound(String),

    /// A rule with this name already exists and overwriting was declined
    #[error("Rule '{0}' already exists")]
    Conflict(String),

    /// The name collides with a command-line option
    #[error("'{0}' is a reserved name and cannot be used for a rule")]
    Reserved(String),

    /// Name or command fails validation
    #[error("Invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    /// Import text or a stored line could not be decoded
    #[error("Malformed input: {0}")]
    Malformed(String),

    /// Filesystem failure on the store, an import source or an export target
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A rule's command could not be started or exited unsuccessfully
    #[error("Command for rule '{name}' failed: {reason}")]
    Execution { name: String, reason: String },

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Remote import source could not be fetched
    #[error("Failed to fetch rules from {url}: {reason}")]
    Fetch { url: String, reason: String },
}

impl Error {
    /// Wrap an I/O error with a description of what was being attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn invalid_rule(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidRule {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Fatal errors abort the current operation with a non-zero exit code
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Io { .. } | Error::Config(_) | Error::Fetch { .. }
        )
    }
}
