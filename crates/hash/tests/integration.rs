//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use lts_errors::{Error, NetworkError};
    use lts_hash::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_verify_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("ltex-ls-15.2.0-linux-x64.tar.gz");

        let data = b"verify this content";
        fs::write(&file_path, data).await.unwrap();

        let expected = Digest::from_data(data).to_hex();
        let verified = verify_file(&file_path, &expected).await.unwrap();
        assert_eq!(verified.to_hex(), expected);

        // Case does not matter
        assert!(verify_file(&file_path, &expected.to_uppercase())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_single_byte_change_flips_result() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("archive.zip");

        let mut data = b"PK\x03\x04 some archive payload".to_vec();
        fs::write(&file_path, &data).await.unwrap();
        let expected = Digest::from_data(&data).to_hex();
        assert!(verify_file(&file_path, &expected).await.is_ok());

        data[5] ^= 0x01;
        fs::write(&file_path, &data).await.unwrap();

        match verify_file(&file_path, &expected).await.unwrap_err() {
            Error::Network(NetworkError::ChecksumMismatch {
                expected: e,
                actual,
                ..
            }) => {
                assert_eq!(e, expected);
                assert_eq!(actual, Digest::from_data(&data).to_hex());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_digest_from_hex_errors() {
        // Too short
        assert!(Digest::from_hex("1234").is_err());

        // Too long
        assert!(Digest::from_hex(&"a".repeat(66)).is_err());

        // Invalid hex
        assert!(Digest::from_hex("xyz123").is_err());
    }
}
