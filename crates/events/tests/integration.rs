//! Integration tests for events

#[cfg(test)]
mod tests {
    use lts_events::*;
    use lts_types::{DependencyKind, OriginTier};

    #[tokio::test]
    async fn test_event_emitter() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_progress(12.5, "Downloading ltex-ls");

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1,
            AppEvent::General(GeneralEvent::Error { .. })
        ));

        let event2 = rx.recv().await.unwrap();
        match event2 {
            AppEvent::Progress(ProgressEvent::Reported { increment, message }) => {
                assert!((increment - 12.5).abs() < f64::EPSILON);
                assert_eq!(message, "Downloading ltex-ls");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_tier_failures_log_as_warnings() {
        let event = AppEvent::Install(InstallEvent::TierFailed {
            dependency: DependencyKind::Runtime,
            tier: "library".into(),
            failure: FailureContext::new(Some("probe"), "timed out", None::<String>, true),
        });
        assert_eq!(event.log_level(), tracing::Level::WARN);
        assert_eq!(event.log_target(), "lts::events::install");
        assert_eq!(event.event_source(), EventSource::INSTALL);
    }

    #[test]
    fn test_event_serialization_is_domain_tagged() {
        let event = AppEvent::Install(InstallEvent::Located {
            dependency: DependencyKind::Bundle,
            path: "/lib/ltex-ls-15.2.0".into(),
            origin: OriginTier::Bundled,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "install");
        assert_eq!(json["event"]["type"], "Located");
        assert_eq!(json["event"]["origin"], "bundled");
    }
}
