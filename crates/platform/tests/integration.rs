//! Integration tests for platform crate

#[cfg(all(test, unix))]
mod tests {
    use lts_errors::PlatformError;
    use lts_platform::*;
    use std::collections::BTreeMap;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_captures_output_and_exit_code() {
        let mut cmd = PlatformCommand::new("/bin/sh");
        cmd.args(["-c", "echo out; echo err >&2; exit 3"]);

        let output = TokioProcessOperations::new()
            .execute_command(&cmd, Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout_lossy().trim(), "out");
        assert_eq!(output.stderr_lossy().trim(), "err");
    }

    #[tokio::test]
    async fn test_environment_is_replaced_not_inherited() {
        std::env::set_var("LTS_PLATFORM_TEST_AMBIENT", "leaked");

        let mut env = BTreeMap::new();
        env.insert("LTS_ONLY".to_string(), "present".to_string());
        let mut cmd = PlatformCommand::new("/bin/sh");
        cmd.args(["-c", "echo \"$LTS_ONLY:${LTS_PLATFORM_TEST_AMBIENT:-unset}\""])
            .env_clear_and_set(env);

        let output = TokioProcessOperations::new()
            .execute_command(&cmd, Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(output.stdout_lossy().trim(), "present:unset");
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let mut cmd = PlatformCommand::new("/bin/sh");
        cmd.args(["-c", "sleep 30"]);

        let start = Instant::now();
        let err = TokioProcessOperations::new()
            .execute_command(&cmd, Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PlatformError::ProcessTimedOut { timeout_ms: 200, .. }
        ));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_current_target_is_consistent() {
        let target = PlatformTarget::current();
        assert_eq!(target.archive_kind, target.os.archive_kind());
        let json = serde_json::to_value(target).unwrap();
        assert_eq!(json["os"], target.os.token());
    }
}
