//! Error types for option definition, parsing and file merging.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while defining options or parsing arguments.
///
/// Parsing stops at the first error. Values applied by earlier tokens of the
/// same pass are left in place.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("ambiguous option: {name} (candidates are {})", .candidates.join(", "))]
    AmbiguousOption {
        name: String,
        candidates: Vec<String>,
    },

    #[error("argument required: {0}")]
    ArgumentRequired(String),

    #[error("option argument is unnecessary: {0}")]
    UnnecessaryArgument(String),

    /// `reason` comes from the failed rule. A word that is not a boolean
    /// carries no reason and is reported by option name alone.
    #[error("{}", invalid_argument_message(.name, .value, .reason.as_deref()))]
    InvalidArgument {
        name: String,
        value: String,
        reason: Option<String>,
    },

    #[error("duplicated option: {0}")]
    DuplicatedOption(String),

    #[error("option {0} is already defined")]
    DuplicateOption(String),

    #[error("invalid option name: {0:?}")]
    InvalidOptionName(String),

    #[error("no option name given")]
    NoOptionName,

    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid option schema: {0}")]
    InvalidSchema(String),

    #[error("failed to parse option schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn invalid_argument_message(name: &str, value: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("invalid argument for option `{}': {}: {}", name, reason, value),
        None => format!("invalid boolean value: {}", name),
    }
}
