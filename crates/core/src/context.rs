//! Build-metadata context captured from the environment.
//!
//! Captured once at startup and passed explicitly to whatever needs it,
//! instead of living in module-level state.

use chrono::Utc;

/// Environment variable that carries the build-origin URL on CI.
///
/// Its presence is also the signal that we are running in a CI context.
pub const BUILD_URL_VAR: &str = "BUILD_URL";

/// Environment variable carrying the CI build number.
pub const BUILD_NUMBER_VAR: &str = "BUILD_NUMBER";

/// Environment variable carrying the git commit being built.
pub const GIT_COMMIT_VAR: &str = "GIT_COMMIT";

/// Environment variable carrying the commit timestamp.
pub const GIT_COMMIT_DATE_VAR: &str = "GIT_COMMIT_DATE";

/// Immutable build metadata passed through as image build arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Build-origin URL; defaults to `http://{hostname}` outside CI.
    pub build_url: String,
    /// Build timestamp, RFC 3339.
    pub build_date: String,
    /// Build number; defaults to `0.{unix_seconds}` outside CI.
    pub build_number: String,
    /// Commit being built, `unknown` when not provided.
    pub git_commit: String,
    /// Commit timestamp, `unknown` when not provided.
    pub git_commit_date: String,
    /// Whether a CI context was detected at capture time.
    pub ci: bool,
}

impl BuildContext {
    /// Capture the context from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let build_url = std::env::var(BUILD_URL_VAR).ok();
        let ci = build_url.is_some();
        let now = Utc::now();

        Self {
            build_url: build_url.unwrap_or_else(default_build_url),
            build_date: now.to_rfc3339(),
            build_number: std::env::var(BUILD_NUMBER_VAR)
                .unwrap_or_else(|_| format!("0.{}", now.timestamp())),
            git_commit: std::env::var(GIT_COMMIT_VAR).unwrap_or_else(|_| "unknown".to_string()),
            git_commit_date: std::env::var(GIT_COMMIT_DATE_VAR)
                .unwrap_or_else(|_| "unknown".to_string()),
            ci,
        }
    }
}

fn default_build_url() -> String {
    format!("http://{}", gethostname::gethostname().to_string_lossy())
}
