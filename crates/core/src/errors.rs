//! Error types for the dockforge-core crate

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for dockforge-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or validating the matrix configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// An OS variant has no entry in the upstream source mapping.
    ///
    /// Raised at configuration load time, before any target runs.
    #[error("OS variant '{os_variant}' has no upstream source mapping")]
    #[diagnostic(
        code(dockforge::config::missing_source),
        help("add an entry for this variant to `source_for_variant`")
    )]
    MissingSourceMapping {
        /// The unmapped OS variant.
        os_variant: String,
    },

    /// The designated latest version is not a member of the runtime-version axis.
    #[error("latest version '{version}' is not in the runtime-version axis")]
    #[diagnostic(code(dockforge::config::unknown_latest))]
    UnknownLatestVersion {
        /// The configured latest version.
        version: String,
    },

    /// An axis contains the same value twice.
    #[error("axis value '{value}' appears more than once")]
    #[diagnostic(code(dockforge::config::duplicate_axis_value))]
    DuplicateAxisValue {
        /// The duplicated value.
        value: String,
    },

    /// Generic configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(dockforge::config::invalid))]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// I/O error with path context.
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(dockforge::io::error))]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// The path involved, if known.
        path: Option<Box<std::path::Path>>,
        /// Description of the operation that failed.
        operation: String,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {message}")]
    #[diagnostic(code(dockforge::serialization))]
    Serialization {
        /// Description of the serialization problem.
        message: String,
    },
}

impl Error {
    /// Create a missing-source-mapping error.
    #[must_use]
    pub fn missing_source_mapping(os_variant: impl Into<String>) -> Self {
        Self::MissingSourceMapping {
            os_variant: os_variant.into(),
        }
    }

    /// Create a generic configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(PathBuf::into_boxed_path),
            operation: operation.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}
