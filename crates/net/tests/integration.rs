//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use lts_errors::{Error, NetworkError};
    use lts_events::{channel, AppEvent, DownloadEvent};
    use lts_net::*;
    use lts_progress::ProgressStack;
    use tempfile::tempdir;

    fn stack() -> ProgressStack {
        let mut stack = ProgressStack::detached("Installing");
        stack.start_task(0.7, "Downloading ltex-ls").unwrap();
        stack
    }

    #[tokio::test]
    async fn test_download_file() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let content = b"test file content";
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test.tar.gz");
            then.status(200)
                .header("content-length", content.len().to_string())
                .body(content);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("downloaded.tar.gz");
        let client = NetClient::with_defaults().unwrap();
        let mut progress = stack();

        let size = download(&client, &server.url("/test.tar.gz"), &dest, &mut progress, &tx)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(size, content.len() as u64);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), content);
        // Tiny downloads round to zero megabytes
        assert_eq!(progress.task_name(), "Downloading ltex-ls  0MB/0MB");

        let mut saw_start = false;
        let mut saw_complete = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Download(DownloadEvent::Started { .. }) => saw_start = true,
                AppEvent::Download(DownloadEvent::Completed { bytes, .. }) => {
                    assert_eq!(bytes, content.len() as u64);
                    saw_complete = true;
                }
                _ => {}
            }
        }
        assert!(saw_start);
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_three_redirects_match_direct_download() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();
        let content = b"archive bytes behind redirects";

        server.mock(|when, then| {
            when.method(GET).path("/a");
            then.status(301).header("Location", server.url("/b"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/b");
            // Relative locations resolve against the redirecting URL
            then.status(302).header("Location", "/c");
        });
        server.mock(|when, then| {
            when.method(GET).path("/c");
            then.status(307).header("Location", server.url("/final"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/final");
            then.status(200).body(content);
        });

        let temp = tempdir().unwrap();
        let redirected = temp.path().join("redirected.zip");
        let direct = temp.path().join("direct.zip");
        let client = NetClient::with_defaults().unwrap();

        download(&client, &server.url("/a"), &redirected, &mut stack(), &tx)
            .await
            .unwrap();
        download(&client, &server.url("/final"), &direct, &mut stack(), &tx)
            .await
            .unwrap();

        assert_eq!(
            tokio::fs::read(&redirected).await.unwrap(),
            tokio::fs::read(&direct).await.unwrap()
        );

        let mut redirects = 0;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Download(DownloadEvent::Redirected { .. }) = event {
                redirects += 1;
            }
        }
        assert_eq!(redirects, 3);
    }

    #[tokio::test]
    async fn test_redirect_without_location_leaves_no_file() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/moved");
            then.status(302);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("moved.zip");
        let client = NetClient::with_defaults().unwrap();

        let err = download(&client, &server.url("/moved"), &dest, &mut stack(), &tx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::RedirectWithoutLocation { status: 302, .. })
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_http_error_carries_status() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/missing.zip");
            then.status(404).body("not found");
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("missing.zip");
        let client = NetClient::with_defaults().unwrap();

        let err = download(&client, &server.url("/missing.zip"), &dest, &mut stack(), &tx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
        assert!(!dest.exists());

        let failed = std::iter::from_fn(|| rx.try_recv().ok())
            .any(|event| matches!(event, AppEvent::Download(DownloadEvent::Failed { .. })));
        assert!(failed);
    }

    #[tokio::test]
    async fn test_identification_headers() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/releases")
                .header("user-agent", "lts-test")
                .header("authorization", "token secret");
            then.status(200)
                .header("content-type", "application/json; charset=utf-8")
                .body(r#"[{"tag_name":"8.0.0"},{"tag_name":"9.0.0-alpha.1"},{"tag_name":"9.0.0"}]"#);
        });

        let client = NetClient::new(NetConfig {
            user_agent: "lts-test".into(),
            auth_token: Some("secret".into()),
            ..NetConfig::default()
        })
        .unwrap();

        let tags = fetch_release_tags(&client, &server.url("/releases"), &tx)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(tags, vec!["8.0.0", "9.0.0-alpha.1", "9.0.0"]);
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_other_content_types() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/releases");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html></html>");
        });

        let client = NetClient::with_defaults().unwrap();
        let err = fetch_json(&client, &server.url("/releases"), &tx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::UnexpectedContentType { .. })
        ));
    }

    #[tokio::test]
    async fn test_connection_closed_mid_body_removes_partial_file() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            // Announce 1000 bytes, send 100, hang up
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n")
                .await
                .unwrap();
            socket.write_all(&[7u8; 100]).await.unwrap();
            let _ = socket.shutdown().await;
        });

        let (tx, mut rx) = channel();
        let temp = tempdir().unwrap();
        let dest = temp.path().join("truncated.tar.gz");
        let client = NetClient::with_defaults().unwrap();

        let result = download(
            &client,
            &format!("http://{addr}/truncated.tar.gz"),
            &dest,
            &mut stack(),
            &tx,
        )
        .await;
        server.await.unwrap();

        assert!(result.is_err());
        assert!(!dest.exists());
        let failed = std::iter::from_fn(|| rx.try_recv().ok())
            .any(|event| matches!(event, AppEvent::Download(DownloadEvent::Failed { .. })));
        assert!(failed);
    }

    #[tokio::test]
    async fn test_published_digest_is_read_from_checksum_file() {
        let server = MockServer::start();
        let (tx, _rx) = channel();
        let name = "OpenJDK11U-jre_x64_linux_hotspot_11.0.8_10.tar.gz";
        let digest = "ab".repeat(32);

        server.mock(|when, then| {
            when.method(GET).path(format!("/jdk/{name}{CHECKSUM_SUFFIX}"));
            then.status(200).body(format!("{digest}  {name}\n"));
        });
        server.mock(|when, then| {
            when.method(GET).path(format!("/wrong/{name}{CHECKSUM_SUFFIX}"));
            then.status(200).body(format!("{digest}  other.tar.gz\n"));
        });

        let client = NetClient::with_defaults().unwrap();
        let found = fetch_published_digest(&client, &server.url(format!("/jdk/{name}")), name, &tx)
            .await
            .unwrap();
        assert_eq!(found, digest);

        let err = fetch_published_digest(&client, &server.url(format!("/wrong/{name}")), name, &tx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::InvalidBody { .. })
        ));

        let err = fetch_published_digest(&client, &server.url(format!("/absent/{name}")), name, &tx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
    }
}
