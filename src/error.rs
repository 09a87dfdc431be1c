// File: src/error.rs
use thiserror::Error;

/// Errors raised while configuring a normalizer or building its reference index.
/// Queries never fail; an unmatched name is reported through `MatchDiagnostics`.
#[derive(Debug, Error)]
pub enum NormalizerError {
    /// The requested name category is not one of the known categories.
    #[error("Name category ({0}) is not one of the following: first, last, last_extended, patronym, cause_of_death, cause_of_death_extended")]
    UnknownCategory(String),

    /// Two reference rows clean to the same key but map to different normalized names.
    /// Only raised when the builder runs with `strict_conflicts`.
    #[error("Incompatible mappings for '{key}': '{existing}' vs '{candidate}'")]
    ConflictingMapping {
        key: String,
        existing: String,
        candidate: String,
    },

    #[error("Malformed reference row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, NormalizerError>;
