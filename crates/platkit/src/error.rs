//! Unified error type for platkit.

use platkit_servers::QueryError;
use platkit_types::AppId;
use platkit_utils::UtilsError;

/// Top-level error that wraps the sub-crate errors.
///
/// The `#[from]` variants let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// An async utility call failed.
    #[error(transparent)]
    Utils(#[from] UtilsError),

    /// A server query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The client configuration couldn't be parsed.
    #[error("invalid client config: {0}")]
    Config(#[from] serde_json::Error),

    /// The native layer runs under a different app than configured.
    #[error("configured for {expected} but the native layer reports {actual}")]
    AppIdMismatch { expected: AppId, actual: AppId },
}

#[cfg(test)]
mod tests {
    use platkit_types::AsyncCallHandle;

    use super::*;

    #[test]
    fn test_from_utils_error() {
        let err = UtilsError::CallFailed {
            call: "check_file_signature",
            handle: AsyncCallHandle(7),
        };
        let platform_err: PlatformError = err.into();
        assert!(matches!(platform_err, PlatformError::Utils(_)));
        assert!(platform_err.to_string().contains("check_file_signature"));
    }

    #[test]
    fn test_from_query_error() {
        let platform_err: PlatformError = QueryError::Timeout.into();
        assert!(matches!(platform_err, PlatformError::Query(_)));
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let platform_err: PlatformError = err.into();
        assert!(matches!(platform_err, PlatformError::Config(_)));
    }

    #[test]
    fn test_app_id_mismatch_display() {
        let err = PlatformError::AppIdMismatch {
            expected: AppId(480),
            actual: AppId(570),
        };
        assert_eq!(
            err.to_string(),
            "configured for app-480 but the native layer reports app-570"
        );
    }
}
