//! Filter system error types

use thiserror::Error;

/// Errors raised while configuring or running a filter pass
#[derive(Error, Debug)]
pub enum FilterError {
    /// `push` was called with an empty filter chain
    #[error("Cannot push an empty filter chain")]
    NoFilters,

    /// A filter tried to write to the previous target outside of a pop
    #[error("No filter pass is being applied")]
    NoActivePass,

    /// A filter's own apply step failed
    #[error("Filter '{filter}' failed: {reason}")]
    Apply { filter: String, reason: String },

    /// Invalid filter configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading a [`FilterConfig`](crate::FilterConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document could not be parsed
    #[error("Failed to parse filter config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range
    #[error("Invalid filter config: {0}")]
    Invalid(String),
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;
