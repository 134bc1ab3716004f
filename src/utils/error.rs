//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use serde_json::error::Category;
use thiserror::Error;

/// Errors that can occur while aggregating a facet document
///
/// Both aggregation strategies report failures through this type.
/// None of the variants is recoverable: the request is aborted and no
/// partial result is produced.
#[derive(Error, Debug)]
pub enum FacetError {
    /// Malformed JSON syntax or a document that deviates from the facet schema
    #[error("parse error at {location}: {message}")]
    Parse { location: String, message: String },

    /// A `count` value (or numeric token) that is not a finite number
    #[error("type error at {location}: {message}")]
    Type { location: String, message: String },

    /// Failure reading the input stream
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl FacetError {
    /// Build a `Parse` error
    pub fn parse(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Build a `Type` error
    pub fn type_error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Type {
            location: location.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the client's document rather than the transport
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Type { .. })
    }
}

/// serde_json's message for a number literal beyond the range of `f64`
const NUMBER_OUT_OF_RANGE: &str = "number out of range";

impl From<serde_json::Error> for FacetError {
    fn from(err: serde_json::Error) -> Self {
        let location = format!("line {} column {}", err.line(), err.column());
        match err.classify() {
            Category::Io => Self::Io(err.into()),
            // Numbers are only legal as counts, and a count must be finite
            Category::Syntax if err.to_string().starts_with(NUMBER_OUT_OF_RANGE) => Self::Type {
                location,
                message: "count is not a finite number".to_string(),
            },
            Category::Syntax | Category::Eof | Category::Data => Self::Parse {
                location,
                message: err.to_string(),
            },
        }
    }
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
