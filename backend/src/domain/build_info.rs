//! Build metadata reported at startup and by `GET /api/build`.

use serde::Serialize;
use utoipa::ToSchema;

/// Version details baked in at compile time.
///
/// `TODO_BUILD_COMMIT` and `TODO_BUILD_DATE` are read from the build
/// environment; unset values report as `"NA"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BuildInfo {
    /// Crate version.
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// Source revision.
    pub commit: &'static str,
    /// Build date.
    pub date: &'static str,
}

impl BuildInfo {
    /// Metadata for the running binary.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: match option_env!("TODO_BUILD_COMMIT") {
                Some(commit) => commit,
                None => "NA",
            },
            date: match option_env!("TODO_BUILD_DATE") {
                Some(date) => date,
                None => "NA",
            },
        }
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "version={} commit={} date={}",
            self.version, self.commit, self.date
        )
    }
}
