//! Integration tests for error types

#[cfg(test)]
mod tests {
    use lts_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://example.com".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_error_display() {
        let err = NetworkError::HttpError {
            url: "https://example.com/a.tar.gz".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "request to https://example.com/a.tar.gz failed with status code 404"
        );
    }

    #[test]
    fn test_checksum_mismatch_carries_both_digests() {
        let err = NetworkError::ChecksumMismatch {
            path: "/tmp/a.zip".into(),
            expected: "aa".into(),
            actual: "bb".into(),
        };
        let message = err.to_string();
        assert!(message.contains("expected aa"));
        assert!(message.contains("got bb"));
        assert_eq!(err.user_code(), Some("network.checksum_mismatch"));
    }

    #[test]
    fn test_fatal_classification() {
        let fatal: Error = InstallError::LibraryDirUnavailable {
            path: "/lib".into(),
            message: "denied".into(),
        }
        .into();
        assert!(fatal.is_fatal());

        let recoverable: Error = InstallError::NoDirectoryAfterExtraction {
            archive: "a.zip".into(),
        }
        .into();
        assert!(!recoverable.is_fatal());

        let network: Error = NetworkError::RedirectWithoutLocation {
            url: "https://example.com".into(),
            status: 302,
        }
        .into();
        assert!(!network.is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
        assert!(err.is_retryable());
    }
}
