//! Tracing setup and structured logging of installer events

use lts_events::{AppEvent, FailureContext};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging
///
/// Logs always go to stderr so stdout stays reserved for command output.
/// `RUST_LOG` overrides the default filter in every mode.
pub fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "info,lts=debug,lts_install=debug,lts_net=debug"
    } else if json_mode {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if json_mode {
        builder.json().init();
    } else if debug_enabled {
        builder.with_target(true).init();
    } else {
        builder.with_target(false).without_time().init();
    }
}

/// Log an `AppEvent` through tracing at the level the event asks for
pub fn log_event(event: &AppEvent) {
    let source = event.event_source();
    let summary = summarize(event);
    let failure = failure_of(event);
    let code = failure.and_then(|f| f.code.as_deref());
    let hint = failure.and_then(|f| f.hint.as_deref());

    match event.log_level() {
        Level::ERROR => tracing::error!(source = source.as_str(), code, hint, "{summary}"),
        Level::WARN => tracing::warn!(source = source.as_str(), code, hint, "{summary}"),
        Level::INFO => tracing::info!(source = source.as_str(), "{summary}"),
        Level::DEBUG => tracing::debug!(source = source.as_str(), "{summary}"),
        _ => tracing::trace!(source = source.as_str(), "{summary}"),
    }
}

fn failure_of(event: &AppEvent) -> Option<&FailureContext> {
    use lts_events::{DownloadEvent, GeneralEvent, InstallEvent};

    match event {
        AppEvent::General(GeneralEvent::OperationFailed { failure, .. })
        | AppEvent::Download(DownloadEvent::Failed { failure, .. })
        | AppEvent::Install(
            InstallEvent::TierFailed { failure, .. } | InstallEvent::Failed { failure, .. },
        ) => Some(failure),
        _ => None,
    }
}

/// One-line description of an event for logs and the terminal
pub fn summarize(event: &AppEvent) -> String {
    use lts_events::{DownloadEvent, GeneralEvent, InstallEvent, ProbeEvent, ProgressEvent};

    match event {
        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => format!("{message} ({context})"),
                None => message.clone(),
            },
            GeneralEvent::Error { message, details } => match details {
                Some(details) => format!("{message}: {details}"),
                None => message.clone(),
            },
            GeneralEvent::DebugLog { message, .. } => message.clone(),
            GeneralEvent::OperationStarted { operation } => format!("{operation} started"),
            GeneralEvent::OperationCompleted { operation, success } => {
                if *success {
                    format!("{operation} completed")
                } else {
                    format!("{operation} finished with errors")
                }
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                format!("{operation} failed: {}", failure.message)
            }
        },
        AppEvent::Download(download) => match download {
            DownloadEvent::Started { url, total_size } => match total_size {
                Some(size) => format!("downloading {url} ({size} bytes)"),
                None => format!("downloading {url}"),
            },
            DownloadEvent::Redirected { from, to, status } => {
                format!("{from} redirected ({status}) to {to}")
            }
            DownloadEvent::Completed { url, bytes, .. } => {
                format!("downloaded {bytes} bytes from {url}")
            }
            DownloadEvent::Failed { url, failure } => {
                format!("download of {url} failed: {}", failure.message)
            }
        },
        AppEvent::Install(install) => match install {
            InstallEvent::StateChanged { state } => format!("state: {state}"),
            InstallEvent::TierStarted {
                dependency,
                tier,
                attempt,
            } => format!("{dependency}: trying {tier} (attempt {attempt})"),
            InstallEvent::TierSkipped {
                dependency,
                tier,
                reason,
            } => format!("{dependency}: skipped {tier}, {reason}"),
            InstallEvent::TierFailed {
                dependency,
                tier,
                failure,
            } => format!("{dependency}: {tier} failed, {}", failure.message),
            InstallEvent::Located {
                dependency,
                path,
                origin,
            } => format!("{dependency}: using {} ({origin})", path.display()),
            InstallEvent::Verified { path, digest } => {
                format!("verified {} (sha256 {digest})", path.display())
            }
            InstallEvent::Extracted { target, .. } => format!("installed {}", target.display()),
            InstallEvent::Ready { bundle, runtime } => match runtime {
                Some(runtime) => format!(
                    "ready: {} with runtime {}",
                    bundle.display(),
                    runtime.display()
                ),
                None => format!("ready: {} with the system runtime", bundle.display()),
            },
            InstallEvent::Failed {
                failure,
                offline_instructions,
            } => format!(
                "{}; you might want to try offline installation, see {offline_instructions}",
                failure.message
            ),
        },
        AppEvent::Progress(ProgressEvent::Reported { increment, message }) => {
            format!("{message} (+{increment:.1}%)")
        }
        AppEvent::Probe(probe) => match probe {
            ProbeEvent::Started { command, args } => {
                format!("running {command} {}", args.join(" "))
            }
            ProbeEvent::Succeeded {
                bundle_version,
                runtime_version,
                runtime_major,
            } => format!(
                "server {bundle_version} runs on Java {runtime_version} (major {runtime_major})"
            ),
            ProbeEvent::Failed {
                command,
                reason,
                stdout,
                stderr,
            } => format!("{command} failed: {reason}; stdout: {stdout:?}; stderr: {stderr:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lts_events::{InstallEvent, ProbeEvent};
    use lts_types::{DependencyKind, OriginTier};
    use std::path::PathBuf;

    #[test]
    fn test_summaries_name_the_essentials() {
        let located = AppEvent::Install(InstallEvent::Located {
            dependency: DependencyKind::Runtime,
            path: PathBuf::from("/lib/jdk-11.0.8-jre"),
            origin: OriginTier::FreshlyDownloaded,
        });
        let text = summarize(&located);
        assert!(text.contains("/lib/jdk-11.0.8-jre"));
        assert!(text.contains(&OriginTier::FreshlyDownloaded.to_string()));

        let failed = AppEvent::Probe(ProbeEvent::Failed {
            command: "ltex-ls".into(),
            reason: "exited with status 1".into(),
            stdout: String::new(),
            stderr: "java: not found".into(),
        });
        assert!(summarize(&failed).contains("java: not found"));
    }

    #[test]
    fn test_failure_context_is_found_for_failures_only() {
        let failed = AppEvent::Install(InstallEvent::Failed {
            failure: FailureContext::new(Some("install.x"), "boom", None::<String>, false),
            offline_instructions: "https://example.com".into(),
        });
        assert_eq!(
            failure_of(&failed).and_then(|f| f.code.as_deref()),
            Some("install.x")
        );

        let state = AppEvent::Install(InstallEvent::StateChanged {
            state: "ready".into(),
        });
        assert!(failure_of(&state).is_none());
    }
}
