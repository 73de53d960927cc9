//! Error types for artifact generation.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for artifact generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a configuration artifact.
///
/// Every variant fails only the affected target; nothing here is retried
/// internally (the external task engine owns failure policy).
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Error bubbled up from core configuration or lookup tables.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] dockforge_core::Error),

    /// The upstream fetch failed (transport error or non-success status).
    #[error("failed to fetch upstream document {url}: {message}")]
    #[diagnostic(code(dockforge::generate::fetch))]
    Fetch {
        /// The URL that was fetched.
        url: String,
        /// Transport error or HTTP status description.
        message: String,
    },

    /// The patch substitution matched nothing.
    ///
    /// A zero-occurrence substitution means the upstream format drifted and
    /// the patch would silently no-op, shipping an unpatched artifact.
    #[error("patch pattern '{pattern}' matched nothing in the upstream document")]
    #[diagnostic(
        code(dockforge::generate::patch_unmatched),
        help("the upstream document format may have changed; review the patch rules")
    )]
    PatchUnmatched {
        /// The substring that was expected to occur.
        pattern: String,
    },

    /// The variable document has no tier for the requested subtag.
    #[error("variable document has no tier for subtag '{subtag}'")]
    #[diagnostic(code(dockforge::generate::missing_tier))]
    MissingVariableTier {
        /// The subtag that was looked up.
        subtag: String,
    },

    /// The template references a variable absent from both mapping tiers.
    #[error("unresolved template variable: {message}")]
    #[diagnostic(code(dockforge::generate::unresolved_variable))]
    UnresolvedVariable {
        /// The renderer's description of the missing variable.
        message: String,
    },

    /// The template source is malformed.
    #[error("template syntax error: {message}")]
    #[diagnostic(code(dockforge::generate::template_syntax))]
    TemplateSyntax {
        /// The renderer's description of the syntax problem.
        message: String,
    },

    /// Any other rendering failure.
    #[error("template rendering failed: {message}")]
    #[diagnostic(code(dockforge::generate::template_render))]
    TemplateRender {
        /// The renderer's description of the failure.
        message: String,
    },

    /// I/O error with path context.
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(dockforge::generate::io))]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// The path involved, if known.
        path: Option<Box<std::path::Path>>,
        /// Description of the operation that failed.
        operation: String,
    },

    /// The variable document could not be parsed.
    #[error("invalid variable document: {message}")]
    #[diagnostic(code(dockforge::generate::vars_parse))]
    VarsParse {
        /// The parser's description of the problem.
        message: String,
    },
}

impl Error {
    /// Create a fetch error.
    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a patch-matched-nothing error.
    #[must_use]
    pub fn patch_unmatched(pattern: impl Into<String>) -> Self {
        Self::PatchUnmatched {
            pattern: pattern.into(),
        }
    }

    /// Create a missing-variable-tier error.
    #[must_use]
    pub fn missing_variable_tier(subtag: impl Into<String>) -> Self {
        Self::MissingVariableTier {
            subtag: subtag.into(),
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
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::UndefinedError => Self::UnresolvedVariable {
                message: err.to_string(),
            },
            minijinja::ErrorKind::SyntaxError => Self::TemplateSyntax {
                message: err.to_string(),
            },
            _ => Self::TemplateRender {
                message: err.to_string(),
            },
        }
    }
}
