use thiserror::Error;

use crate::store::StoreError;

/// Error type for details page requests
///
/// Each variant maps to one HTTP status via [`FrontendError::status_code`].
/// Only `MalformedInput` and `VersionMismatch` carry text meant for users;
/// the causes inside `InternalBug` and `Infrastructure` are for logs only.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Bad path or version syntax
    #[error("malformed input: {message}")]
    MalformedInput {
        message: String,
        secondary_message: Option<String>,
    },

    /// The requested path (at any version) does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The path exists, but not at the requested version
    #[error("{path}@{version} not found, other versions exist")]
    VersionMismatch { path: String, version: String },

    /// Broken internal invariant (e.g. a default tab missing from its registry)
    #[error("BUG: {0}")]
    InternalBug(String),

    /// The store failed for a reason other than a missing record
    #[error("store failure: {0}")]
    Infrastructure(#[source] StoreError),
}

/// Store errors raised outside version resolution mean the store is
/// inconsistent or unavailable, whatever their kind.
impl From<StoreError> for FrontendError {
    fn from(err: StoreError) -> Self {
        FrontendError::Infrastructure(err)
    }
}

impl FrontendError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FrontendError::MalformedInput {
            message: message.into(),
            secondary_message: None,
        }
    }

    /// HTTP status the boundary should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            FrontendError::MalformedInput { .. } => 400,
            FrontendError::NotFound(_) | FrontendError::VersionMismatch { .. } => 404,
            FrontendError::InternalBug(_) | FrontendError::Infrastructure(_) => 500,
        }
    }

    /// Primary message shown to the user
    pub fn message(&self) -> String {
        match self {
            FrontendError::MalformedInput { message, .. } => message.clone(),
            FrontendError::NotFound(_) => "404 Not Found".to_string(),
            FrontendError::VersionMismatch { path, version } => {
                format!("Package {path}@{version} is not available.")
            }
            FrontendError::InternalBug(_) | FrontendError::Infrastructure(_) => {
                "500 Internal Server Error".to_string()
            }
        }
    }

    /// Follow-up message shown under the primary one, if any
    pub fn secondary_message(&self) -> Option<String> {
        match self {
            FrontendError::MalformedInput {
                secondary_message, ..
            } => secondary_message.clone(),
            FrontendError::VersionMismatch { path, .. } => Some(format!(
                r#"There are other versions of this package that are! To view them, <a href="/pkg/{path}?tab=versions">click here</a>."#
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FrontendError::malformed("bad"), 400)]
    #[case(FrontendError::NotFound("x".to_string()), 404)]
    #[case(FrontendError::VersionMismatch { path: "p".to_string(), version: "v1.0.0".to_string() }, 404)]
    #[case(FrontendError::InternalBug("x".to_string()), 500)]
    #[case(FrontendError::Infrastructure(StoreError::LockPoisoned), 500)]
    #[case(FrontendError::Infrastructure(StoreError::NotFound("x".to_string())), 500)]
    fn status_code_returns_expected(#[case] err: FrontendError, #[case] expected: u16) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn version_mismatch_points_at_versions_tab() {
        let err = FrontendError::VersionMismatch {
            path: "example.com/foo".to_string(),
            version: "v1.2.3".to_string(),
        };

        assert_eq!(err.message(), "Package example.com/foo@v1.2.3 is not available.");
        assert!(
            err.secondary_message()
                .unwrap()
                .contains(r#"href="/pkg/example.com/foo?tab=versions""#)
        );
    }

    #[test]
    fn internal_errors_hide_their_cause_from_users() {
        let err = FrontendError::InternalBug("unknown tab \"x\"".to_string());

        assert_eq!(err.message(), "500 Internal Server Error");
        assert_eq!(err.secondary_message(), None);
    }
}
