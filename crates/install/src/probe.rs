//! Launch descriptor construction and the executable probe

use lts_config::{Config, ProbeConfig};
use lts_errors::PlatformError;
use lts_events::{AppEvent, EventEmitter, EventSender, ProbeEvent};
use lts_platform::{PlatformCommand, PlatformTarget, ProcessOperations};
use lts_types::{ExecutableDescriptor, ProbeFailure, ProbeResult, RuntimeChoice};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Leading `major[.minor]` of a runtime version
static RUNTIME_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:\.(\d+))?").expect("runtime version pattern"));

/// Inputs for [`build_descriptor`] taken from the configuration
#[derive(Debug, Clone)]
pub struct DescriptorSettings {
    pub bundle_name: String,
    pub home_var: String,
    pub options_var: String,
    pub initial_heap_size: Option<u32>,
    pub maximum_heap_size: Option<u32>,
}

impl DescriptorSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            bundle_name: config.bundle.name.clone(),
            home_var: config.runtime.home_var.clone(),
            options_var: config.runtime.options_var.clone(),
            initial_heap_size: config.runtime.initial_heap_size,
            maximum_heap_size: config.runtime.maximum_heap_size,
        }
    }
}

/// Build the launch descriptor for a bundle and runtime pair.
///
/// `ambient` is copied into the descriptor's environment minus any inherited
/// runtime home variable; the resolved home and heap options are then set on
/// the copy. Heap options are only added for configured sizes.
pub fn build_descriptor<I>(
    bundle_dir: &Path,
    runtime: &RuntimeChoice,
    settings: &DescriptorSettings,
    target: &PlatformTarget,
    ambient: I,
) -> ExecutableDescriptor
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: BTreeMap<String, String> = ambient
        .into_iter()
        .filter(|(key, _)| *key != settings.home_var)
        .collect();

    if let Some(home) = runtime.home() {
        env.insert(settings.home_var.clone(), home.display().to_string());
    }

    if let Some(options) = heap_options(settings.initial_heap_size, settings.maximum_heap_size) {
        env.insert(settings.options_var.clone(), options);
    }

    ExecutableDescriptor {
        command: target.bundle_launcher(bundle_dir, &settings.bundle_name),
        args: Vec::new(),
        env,
    }
}

/// The current process environment, skipping entries that are not UTF-8
pub fn ambient_env() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

/// `-Xms<n>m -Xmx<n>m` for whichever sizes are set
#[must_use]
pub fn heap_options(initial: Option<u32>, maximum: Option<u32>) -> Option<String> {
    let options: Vec<String> = [
        initial.map(|n| format!("-Xms{n}m")),
        maximum.map(|n| format!("-Xmx{n}m")),
    ]
    .into_iter()
    .flatten()
    .collect();
    (!options.is_empty()).then(|| options.join(" "))
}

/// Versions reported by a successful probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedVersions {
    pub bundle: String,
    pub runtime: String,
    pub runtime_major: u32,
}

/// Parse the bundle's version output.
///
/// The output must contain the configured marker and be a JSON object with
/// string fields for the bundle and the runtime version.
///
/// # Errors
///
/// Returns `ProbeFailure::InvalidOutput` describing the first problem found.
pub fn parse_version_output(
    stdout: &str,
    config: &ProbeConfig,
) -> Result<ReportedVersions, ProbeFailure> {
    let invalid = |message: String| ProbeFailure::InvalidOutput { message };

    if !stdout.contains(&config.marker) {
        return Err(invalid(format!("output does not mention {}", config.marker)));
    }

    let value: Value = serde_json::from_str(stdout.trim()).map_err(|e| invalid(e.to_string()))?;
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| invalid(format!("missing version field {name}")))
    };

    let bundle = field(&config.bundle_field)?;
    let runtime = field(&config.runtime_field)?;
    let runtime_major = runtime_major(&runtime)
        .ok_or_else(|| invalid(format!("unrecognized runtime version {runtime}")))?;

    Ok(ReportedVersions {
        bundle,
        runtime,
        runtime_major,
    })
}

/// Effective major version of a runtime version string.
///
/// `1.x` style versions report `x` as the major version.
#[must_use]
pub fn runtime_major(version: &str) -> Option<u32> {
    let captures = RUNTIME_VERSION.captures(version)?;
    let major: u32 = captures.get(1)?.as_str().parse().ok()?;
    if major == 1 {
        captures.get(2)?.as_str().parse().ok()
    } else {
        Some(major)
    }
}

/// Runs a descriptor with the version flag and judges the result
pub struct ExecutableProbe<P> {
    ops: P,
    config: ProbeConfig,
    minimum_major: Option<u32>,
}

impl<P: ProcessOperations> ExecutableProbe<P> {
    pub fn new(ops: P, config: ProbeConfig) -> Self {
        Self {
            ops,
            config,
            minimum_major: None,
        }
    }

    /// Treat runtimes older than `minimum` as failures
    #[must_use]
    pub fn with_minimum_major(mut self, minimum: Option<u32>) -> Self {
        self.minimum_major = minimum;
        self
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    /// Run `descriptor` with the version flag appended.
    ///
    /// Never fails: every problem, including a timeout, is a failed
    /// [`ProbeResult`] so the caller can move on to another runtime.
    pub async fn probe(&self, descriptor: &ExecutableDescriptor, tx: &EventSender) -> ProbeResult {
        let descriptor = descriptor.with_arg(&self.config.version_flag);
        let command_name = descriptor.command.display().to_string();

        let mut command = PlatformCommand::new(&descriptor.command);
        command
            .args(&descriptor.args)
            .env_clear_and_set(descriptor.env.clone());

        tracing::info!(command = %command_name, args = ?descriptor.args, "testing executable");
        tx.emit(AppEvent::Probe(ProbeEvent::Started {
            command: command_name.clone(),
            args: descriptor.args.clone(),
        }));

        let result = match self.ops.execute_command(&command, self.timeout()).await {
            Ok(output) => {
                let stdout = output.stdout_lossy();
                let stderr = output.stderr_lossy();
                if let Some(signal) = output.signal {
                    ProbeResult::failed(ProbeFailure::Signal { signal }, stdout, stderr)
                } else if !output.success() {
                    let code = output.code.unwrap_or(-1);
                    ProbeResult::failed(ProbeFailure::NonZeroExit { code }, stdout, stderr)
                } else {
                    match parse_version_output(&stdout, &self.config) {
                        Ok(versions) => self.check_minimum(versions, stdout, stderr),
                        Err(failure) => ProbeResult::failed(failure, stdout, stderr),
                    }
                }
            }
            Err(PlatformError::ProcessTimedOut { timeout_ms, .. }) => ProbeResult::failed(
                ProbeFailure::TimedOut { timeout_ms },
                String::new(),
                String::new(),
            ),
            Err(e) => ProbeResult::failed(
                ProbeFailure::SpawnFailed {
                    message: e.to_string(),
                },
                String::new(),
                String::new(),
            ),
        };

        report(&command_name, &result, tx);
        result
    }

    fn check_minimum(
        &self,
        versions: ReportedVersions,
        stdout: String,
        stderr: String,
    ) -> ProbeResult {
        match self.minimum_major {
            Some(minimum) if versions.runtime_major < minimum => ProbeResult::failed(
                ProbeFailure::RuntimeTooOld {
                    major: versions.runtime_major,
                    minimum,
                },
                stdout,
                stderr,
            ),
            _ => ProbeResult::succeeded(versions.bundle, versions.runtime, versions.runtime_major),
        }
    }
}

fn report(command: &str, result: &ProbeResult, tx: &EventSender) {
    match (
        &result.failure,
        &result.bundle_version,
        &result.runtime_version,
        result.runtime_major,
    ) {
        (None, Some(bundle), Some(runtime), Some(major)) => {
            tracing::info!(
                bundle_version = %bundle,
                runtime_version = %runtime,
                runtime_major = major,
                "test successful"
            );
            tx.emit(AppEvent::Probe(ProbeEvent::Succeeded {
                bundle_version: bundle.clone(),
                runtime_version: runtime.clone(),
                runtime_major: major,
            }));
        }
        (failure, ..) => {
            let reason = failure
                .as_ref()
                .map_or_else(|| "unknown".to_string(), ToString::to_string);
            tracing::warn!(
                command,
                %reason,
                stdout = %result.stdout,
                stderr = %result.stderr,
                "test failed"
            );
            tx.emit(AppEvent::Probe(ProbeEvent::Failed {
                command: command.to_string(),
                reason,
                stdout: result.stdout.clone(),
                stderr: result.stderr.clone(),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lts_types::{InstalledLocation, OriginTier};

    fn probe_config() -> ProbeConfig {
        ProbeConfig {
            marker: "bundle".into(),
            bundle_field: "bundle".into(),
            runtime_field: "runtime".into(),
            ..ProbeConfig::default()
        }
    }

    #[test]
    fn test_legacy_runtime_numbering() {
        let stdout = r#"{"bundle":"11.0.0","runtime":"1.8.0_292"}"#;
        let versions = parse_version_output(stdout, &probe_config()).unwrap();
        assert_eq!(versions.bundle, "11.0.0");
        assert_eq!(versions.runtime, "1.8.0_292");
        assert_eq!(versions.runtime_major, 8);
    }

    #[test]
    fn test_runtime_major() {
        assert_eq!(runtime_major("11.0.8"), Some(11));
        assert_eq!(runtime_major("17"), Some(17));
        assert_eq!(runtime_major("1.8.0_292"), Some(8));
        assert_eq!(runtime_major("1"), None);
        assert_eq!(runtime_major("unknown"), None);
    }

    #[test]
    fn test_parse_rejects_bad_output() {
        let config = probe_config();
        for stdout in [
            "",
            "ltex-ls 15.2.0",
            r#"{"bundle": "1.0.0"}"#,
            r#"{"bundle": "1.0.0", "runtime": 11}"#,
            r#"{"bundle": "1.0.0", "runtime": "abc"}"#,
            r#"["bundle"]"#,
        ] {
            assert!(
                matches!(
                    parse_version_output(stdout, &config),
                    Err(ProbeFailure::InvalidOutput { .. })
                ),
                "{stdout}"
            );
        }
    }

    #[test]
    fn test_heap_options() {
        assert_eq!(heap_options(None, None), None);
        assert_eq!(heap_options(Some(64), None).as_deref(), Some("-Xms64m"));
        assert_eq!(
            heap_options(Some(64), Some(512)).as_deref(),
            Some("-Xms64m -Xmx512m")
        );
    }

    #[test]
    fn test_descriptor_environment_is_a_modified_copy() {
        let settings = DescriptorSettings {
            bundle_name: "ltex-ls".into(),
            home_var: "JAVA_HOME".into(),
            options_var: "JAVA_OPTS".into(),
            initial_heap_size: None,
            maximum_heap_size: Some(2048),
        };
        let ambient = vec![
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("JAVA_HOME".to_string(), "/inherited".to_string()),
        ];
        let target = PlatformTarget::resolve("linux", "x86_64");

        let system = build_descriptor(
            Path::new("/lib/ltex-ls-15.2.0"),
            &RuntimeChoice::System,
            &settings,
            &target,
            ambient.clone(),
        );
        assert_eq!(system.command, Path::new("/lib/ltex-ls-15.2.0/bin/ltex-ls"));
        assert_eq!(system.env_var("PATH"), Some("/usr/bin"));
        assert_eq!(system.env_var("JAVA_HOME"), None);
        assert_eq!(system.env_var("JAVA_OPTS"), Some("-Xmx2048m"));

        let installed = RuntimeChoice::Installed(InstalledLocation::new(
            "/lib/jdk-11.0.8+10-jre",
            OriginTier::Bundled,
        ));
        let descriptor = build_descriptor(
            Path::new("/lib/ltex-ls-15.2.0"),
            &installed,
            &DescriptorSettings {
                maximum_heap_size: None,
                ..settings
            },
            &target,
            ambient,
        );
        assert_eq!(descriptor.env_var("JAVA_HOME"), Some("/lib/jdk-11.0.8+10-jre"));
        assert_eq!(descriptor.env_var("JAVA_OPTS"), None);
    }
}
