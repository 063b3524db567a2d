//! Dependency installer: tiered resolution of the bundle and the runtime
//!
//! The installer walks `ResolvingBundle -> ResolvingRuntime -> Validating ->
//! Ready`, with `Failed` reachable from every step. Resolved locations live in
//! a caller-owned [`InstallSession`], never in process-wide state.

use crate::fetch::install_dependency;
use crate::probe::{ambient_env, build_descriptor, DescriptorSettings, ExecutableProbe};
use crate::tiers::{StrategyChain, TierOutcome};
use chrono::{DateTime, Utc};
use lts_config::{constants, Config};
use lts_errors::{Error, InstallError};
use lts_events::{AppEvent, EventEmitter, EventSender, FailureContext, InstallEvent};
use lts_net::NetClient;
use lts_platform::{PlatformTarget, ProcessOperations};
use lts_progress::ProgressStack;
use lts_resolver::{find_installed, SelectionPolicy};
use lts_types::{
    DependencyKind, DependencySpec, ExecutableDescriptor, InstalledLocation, OriginTier,
    ProbeResult, RuntimeChoice,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::Instrument;
use uuid::Uuid;

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallState {
    ResolvingBundle,
    ResolvingRuntime,
    Validating,
    Ready,
    Failed,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolvingBundle => "resolving_bundle",
            Self::ResolvingRuntime => "resolving_runtime",
            Self::Validating => "validating",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Where to look for the bundle, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleTier {
    ExplicitPath,
    Library,
    Download,
}

/// Where to look for the runtime, in order. Every located runtime is
/// validated before the next tier is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeTier {
    /// The configured path, or the system runtime when none is configured
    ExplicitPath,
    Library,
    Download,
}

pub const BUNDLE_TIERS: [BundleTier; 3] =
    [BundleTier::ExplicitPath, BundleTier::Library, BundleTier::Download];

pub const RUNTIME_TIERS: [RuntimeTier; 3] = [
    RuntimeTier::ExplicitPath,
    RuntimeTier::Library,
    RuntimeTier::Download,
];

impl fmt::Display for BundleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExplicitPath => "explicit-path",
            Self::Library => "library",
            Self::Download => "download",
        })
    }
}

impl fmt::Display for RuntimeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExplicitPath => "explicit-path",
            Self::Library => "library",
            Self::Download => "download",
        })
    }
}

/// State of one installation, owned by the caller
#[derive(Debug, Clone)]
pub struct InstallSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    state: InstallState,
    bundle: Option<InstalledLocation>,
    runtime: Option<RuntimeChoice>,
    /// Number of full installation passes, retries included
    passes: usize,
}

impl InstallSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: InstallState::ResolvingBundle,
            bundle: None,
            runtime: None,
            passes: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> InstallState {
        self.state
    }

    #[must_use]
    pub fn bundle(&self) -> Option<&InstalledLocation> {
        self.bundle.as_ref()
    }

    #[must_use]
    pub fn runtime(&self) -> Option<&RuntimeChoice> {
        self.runtime.as_ref()
    }

    #[must_use]
    pub fn passes(&self) -> usize {
        self.passes
    }

    fn set_state(&mut self, state: InstallState, tx: &EventSender) {
        if self.state != state {
            tracing::debug!(session = %self.id, from = %self.state, to = %state, "state change");
        }
        self.state = state;
        tx.emit(AppEvent::Install(InstallEvent::StateChanged {
            state: state.to_string(),
        }));
    }

    /// Forget everything resolved so far, for a retry from scratch
    fn reset(&mut self) {
        self.bundle = None;
        self.runtime = None;
        self.state = InstallState::ResolvingBundle;
    }
}

impl Default for InstallSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated bundle and runtime pair
#[derive(Debug, Clone, Serialize)]
pub struct ReadyInstallation {
    pub bundle: InstalledLocation,
    pub runtime: RuntimeChoice,
    /// Launch descriptor, without the probe's version flag
    pub descriptor: ExecutableDescriptor,
    pub probe: ProbeResult,
}

/// What the user wants after a failed installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    /// Run the whole installation again from the bundle
    Retry,
    /// Stop and point at the offline installation instructions
    OfflineInstructions,
}

/// Asks how to continue after a non-fatal failure
pub trait RecoveryPrompt {
    fn choose(&self, error: &Error, offline_instructions: &str) -> RecoveryChoice;
}

/// Never retries
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowOfflineInstructions;

impl RecoveryPrompt for ShowOfflineInstructions {
    fn choose(&self, _error: &Error, _offline_instructions: &str) -> RecoveryChoice {
        RecoveryChoice::OfflineInstructions
    }
}

/// Final result of [`DependencyInstaller::install`]
#[derive(Debug)]
pub enum InstallOutcome {
    Ready(ReadyInstallation),
    /// All tiers failed and the user chose the offline instructions
    Failed {
        error: Error,
        offline_instructions: String,
    },
}

/// Locates, fetches and validates the bundle and its runtime
pub struct DependencyInstaller<P> {
    config: Config,
    client: NetClient,
    probe: ExecutableProbe<P>,
    target: PlatformTarget,
    lib_dir: PathBuf,
    policy: SelectionPolicy,
    settings: DescriptorSettings,
    ambient: BTreeMap<String, String>,
    tx: EventSender,
}

impl<P: ProcessOperations> DependencyInstaller<P> {
    /// Create an installer for the current platform and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no library directory can be determined or
    /// `bundle.max_version` is not a semantic version.
    pub fn new(config: Config, client: NetClient, ops: P, tx: EventSender) -> Result<Self, Error> {
        let lib_dir = config.lib_dir()?;
        let policy = SelectionPolicy::from_ceiling(config.bundle.max_version.as_deref())?;
        let probe = ExecutableProbe::new(ops, config.probe.clone())
            .with_minimum_major(config.runtime.minimum_major_version);
        let settings = DescriptorSettings::from_config(&config);

        Ok(Self {
            config,
            client,
            probe,
            target: PlatformTarget::current(),
            lib_dir,
            policy,
            settings,
            ambient: ambient_env().collect(),
            tx,
        })
    }

    #[must_use]
    pub fn with_target(mut self, target: PlatformTarget) -> Self {
        self.target = target;
        self
    }

    /// Replace the environment copied into launch descriptors
    #[must_use]
    pub fn with_ambient_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.ambient = env;
        self
    }

    #[must_use]
    pub fn lib_dir(&self) -> &Path {
        &self.lib_dir
    }

    #[must_use]
    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    #[must_use]
    pub fn target(&self) -> &PlatformTarget {
        &self.target
    }

    /// Run the installation, asking `prompt` how to continue after failures.
    ///
    /// # Errors
    ///
    /// Fatal errors (library directory or temporary files unavailable) are
    /// returned immediately without consulting `prompt`.
    pub async fn install(
        &self,
        session: &mut InstallSession,
        prompt: &dyn RecoveryPrompt,
    ) -> Result<InstallOutcome, Error> {
        loop {
            let span = tracing::info_span!("install", session = %session.id);
            match self.install_once(session).instrument(span).await {
                Ok(ready) => return Ok(InstallOutcome::Ready(ready)),
                Err(error) => {
                    self.fail(session, &error);
                    if error.is_fatal() {
                        return Err(error);
                    }
                    match prompt.choose(&error, constants::OFFLINE_INSTRUCTIONS_URL) {
                        RecoveryChoice::Retry => {
                            tracing::info!(session = %session.id, "retrying installation");
                            session.reset();
                        }
                        RecoveryChoice::OfflineInstructions => {
                            return Ok(InstallOutcome::Failed {
                                error,
                                offline_instructions: constants::OFFLINE_INSTRUCTIONS_URL
                                    .to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    /// One pass through bundle resolution, runtime resolution and validation.
    ///
    /// # Errors
    ///
    /// Returns `BundleAcquisitionFailed` or `RuntimeResolutionFailed` when a
    /// chain runs out of tiers, and fatal errors as they occur.
    pub async fn install_once(
        &self,
        session: &mut InstallSession,
    ) -> Result<ReadyInstallation, Error> {
        session.passes += 1;
        self.tx.emit_operation_started("install");
        self.ensure_lib_dir().await?;

        session.set_state(InstallState::ResolvingBundle, &self.tx);
        let bundle = self.resolve_bundle().await?;
        tracing::info!(path = %bundle.path.display(), origin = %bundle.origin, "using bundle");
        session.bundle = Some(bundle.clone());

        session.set_state(InstallState::ResolvingRuntime, &self.tx);
        let ready = self.resolve_runtime(session, &bundle).await?;
        session.runtime = Some(ready.runtime.clone());

        session.set_state(InstallState::Ready, &self.tx);
        self.tx.emit(AppEvent::Install(InstallEvent::Ready {
            bundle: ready.bundle.path.clone(),
            runtime: ready.runtime.home().map(Path::to_path_buf),
        }));
        self.tx.emit_operation_completed("install", true);
        Ok(ready)
    }

    fn fail(&self, session: &mut InstallSession, error: &Error) {
        tracing::error!(session = %session.id, error = %error, "installation failed");
        tracing::info!(
            "you might want to try offline installation, see {}",
            constants::OFFLINE_INSTRUCTIONS_URL
        );
        session.set_state(InstallState::Failed, &self.tx);
        self.tx.emit(AppEvent::Install(InstallEvent::Failed {
            failure: FailureContext::from_error(error),
            offline_instructions: constants::OFFLINE_INSTRUCTIONS_URL.to_string(),
        }));
    }

    async fn ensure_lib_dir(&self) -> Result<(), Error> {
        let is_dir = tokio::fs::metadata(&self.lib_dir)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if is_dir {
            return Ok(());
        }
        tracing::info!(path = %self.lib_dir.display(), "creating library directory");
        tokio::fs::create_dir_all(&self.lib_dir).await.map_err(|e| {
            InstallError::LibraryDirUnavailable {
                path: self.lib_dir.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn resolve_bundle(&self) -> Result<InstalledLocation, Error> {
        let mut chain = StrategyChain::new(DependencyKind::Bundle, &BUNDLE_TIERS, &self.tx);
        let resolved = chain.run(async |tier| self.bundle_tier(tier).await).await?;

        match resolved {
            Some(resolved) => {
                let location = resolved.value;
                self.tx
                    .emit_located(DependencyKind::Bundle, location.path.clone(), location.origin);
                Ok(location)
            }
            None => Err(InstallError::BundleAcquisitionFailed {
                name: self.config.bundle.name.clone(),
                message: chain
                    .last_error()
                    .map_or_else(|| "no tier produced a bundle".to_string(), ToString::to_string),
            }
            .into()),
        }
    }

    async fn bundle_tier(
        &self,
        tier: BundleTier,
    ) -> Result<TierOutcome<InstalledLocation>, Error> {
        let name = &self.config.bundle.name;
        let prefix = format!("{name}-");

        match tier {
            BundleTier::ExplicitPath => Ok(match self.config.bundle_path() {
                None => TierOutcome::Skipped("bundle.path not set".into()),
                Some(path) if path.is_dir() => {
                    TierOutcome::Found(InstalledLocation::new(path, OriginTier::ExplicitConfig))
                }
                Some(path) => TierOutcome::Skipped(format!(
                    "bundle.path {} is not a directory",
                    path.display()
                )),
            }),
            BundleTier::Library => Ok(
                match find_installed(&self.lib_dir, &prefix, "", &self.policy).await? {
                    Some(found) => {
                        TierOutcome::Found(InstalledLocation::new(found.path, OriginTier::Bundled))
                    }
                    None => TierOutcome::Skipped(format!(
                        "no version of {name} in {}",
                        self.lib_dir.display()
                    )),
                },
            ),
            BundleTier::Download => {
                let (version, tag) = self.bundle_download_version().await?;
                let spec = self.bundle_spec(&version, &tag)?;
                let installed = self.download(&spec).await?;
                Ok(TierOutcome::Found(InstalledLocation::new(
                    installed,
                    OriginTier::FreshlyDownloaded,
                )))
            }
        }
    }

    async fn resolve_runtime(
        &self,
        session: &mut InstallSession,
        bundle: &InstalledLocation,
    ) -> Result<ReadyInstallation, Error> {
        let mut chain = StrategyChain::new(DependencyKind::Runtime, &RUNTIME_TIERS, &self.tx);
        let resolved = chain
            .run(async |tier| self.runtime_tier(session, bundle, tier).await)
            .await?;

        match resolved {
            Some(resolved) => {
                let ready = resolved.value;
                if let RuntimeChoice::Installed(location) = &ready.runtime {
                    self.tx.emit_located(
                        DependencyKind::Runtime,
                        location.path.clone(),
                        location.origin,
                    );
                }
                Ok(ready)
            }
            None => Err(InstallError::RuntimeResolutionFailed {
                attempts: chain.len(),
            }
            .into()),
        }
    }

    async fn runtime_tier(
        &self,
        session: &mut InstallSession,
        bundle: &InstalledLocation,
        tier: RuntimeTier,
    ) -> Result<TierOutcome<ReadyInstallation>, Error> {
        session.set_state(InstallState::ResolvingRuntime, &self.tx);

        let runtime = match self.locate_runtime(tier).await? {
            TierOutcome::Found(runtime) => runtime,
            TierOutcome::Skipped(reason) => return Ok(TierOutcome::Skipped(reason)),
        };

        match runtime.home() {
            Some(home) => tracing::info!(path = %home.display(), "using runtime"),
            None => tracing::info!("using runtime from PATH or the inherited environment"),
        }

        session.set_state(InstallState::Validating, &self.tx);
        let (descriptor, probe) = self.validate(&bundle.path, &runtime).await;
        if probe.success {
            return Ok(TierOutcome::Found(ReadyInstallation {
                bundle: bundle.clone(),
                runtime,
                descriptor,
                probe,
            }));
        }

        Err(InstallError::ValidationFailed {
            path: runtime.home().map_or_else(
                || "system runtime".to_string(),
                |home| home.display().to_string(),
            ),
            reason: probe
                .failure
                .as_ref()
                .map_or_else(|| "unknown".to_string(), ToString::to_string),
        }
        .into())
    }

    async fn locate_runtime(
        &self,
        tier: RuntimeTier,
    ) -> Result<TierOutcome<RuntimeChoice>, Error> {
        let runtime = &self.config.runtime;
        let suffix = "-jre";
        let prefix = format!("{}-", runtime.name);

        match tier {
            RuntimeTier::ExplicitPath => Ok(match self.config.runtime_path() {
                Some(path) if path.is_dir() => TierOutcome::Found(RuntimeChoice::Installed(
                    InstalledLocation::new(path, OriginTier::ExplicitConfig),
                )),
                Some(path) => TierOutcome::Skipped(format!(
                    "runtime.path {} is not a directory",
                    path.display()
                )),
                // Probing an unconfigured runtime on macOS can pop up a system installer dialog
                None if self.target.is_mac() && !runtime.force_system_probe => {
                    TierOutcome::Skipped("runtime.path not set".into())
                }
                None => TierOutcome::Found(RuntimeChoice::System),
            }),
            RuntimeTier::Library => Ok(
                match find_installed(&self.lib_dir, &prefix, suffix, &SelectionPolicy::Latest)
                    .await?
                {
                    Some(found) => TierOutcome::Found(RuntimeChoice::Installed(
                        InstalledLocation::new(
                            self.target.runtime_home(&found.path),
                            OriginTier::Bundled,
                        ),
                    )),
                    None => TierOutcome::Skipped(format!(
                        "no runtime in {}",
                        self.lib_dir.display()
                    )),
                },
            ),
            RuntimeTier::Download => {
                // The directory just installed, not whatever scans highest
                let spec = self.runtime_spec().await?;
                let installed = self.download(&spec).await?;
                Ok(TierOutcome::Found(RuntimeChoice::Installed(
                    InstalledLocation::new(
                        self.target.runtime_home(&installed),
                        OriginTier::FreshlyDownloaded,
                    ),
                )))
            }
        }
    }

    /// Build the launch descriptor for a pair and probe it
    pub async fn validate(
        &self,
        bundle_dir: &Path,
        runtime: &RuntimeChoice,
    ) -> (ExecutableDescriptor, ProbeResult) {
        let descriptor = build_descriptor(
            bundle_dir,
            runtime,
            &self.settings,
            &self.target,
            self.ambient.clone(),
        );
        let probe = self.probe.probe(&descriptor, &self.tx).await;
        (descriptor, probe)
    }

    /// Version tags listed in the configured release manifest
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` without a manifest URL and the
    /// network errors of the fetch.
    pub async fn fetch_bundle_versions(&self) -> Result<Vec<String>, Error> {
        let url = self.config.bundle.manifest_url.as_deref().ok_or_else(|| {
            lts_errors::ConfigError::MissingField {
                field: "bundle.manifest_url".into(),
            }
        })?;
        tracing::info!(url, "fetching list of releases");
        lts_net::fetch_release_tags(&self.client, url, &self.tx).await
    }

    /// Version and release tag to download.
    ///
    /// With a manifest URL the policy picks from the published releases,
    /// otherwise the pinned version is used.
    async fn bundle_download_version(&self) -> Result<(String, String), Error> {
        if self.config.bundle.manifest_url.is_none() {
            return Ok((
                self.config.bundle.version.clone(),
                self.config.bundle.tag.clone(),
            ));
        }
        let tags = self.fetch_bundle_versions().await?;
        let version = self.policy.select_required(&tags)?;
        tracing::info!(%version, policy = %self.policy, "selected release");
        Ok((version.clone(), version))
    }

    /// Download coordinates of the bundle for this platform
    ///
    /// # Errors
    ///
    /// Returns `DigestNotFound` if no digest is configured for the archive.
    pub fn bundle_spec(&self, version: &str, tag: &str) -> Result<DependencySpec, Error> {
        let bundle = &self.config.bundle;
        let file_name = self.target.bundle_archive_name(&bundle.name, version);
        let expected_digest = lookup_digest(&bundle.digests, &file_name)?;
        Ok(DependencySpec {
            name: bundle.name.clone(),
            version: version.to_string(),
            url: self.target.bundle_url(&bundle.release_url, tag, &bundle.name, version),
            expected_digest,
        })
    }

    /// Download coordinates of the runtime for this platform.
    ///
    /// Digests come from `runtime.digests`; for archives missing there the
    /// checksum file published next to the asset is used, unless
    /// `runtime.fetch_published_digests` is off.
    ///
    /// # Errors
    ///
    /// Returns `DigestNotFound` if no digest is configured and none may be
    /// fetched, and the network errors of the checksum file request.
    pub async fn runtime_spec(&self) -> Result<DependencySpec, Error> {
        let runtime = &self.config.runtime;
        let file_name = self.target.runtime_archive_name(&runtime.version);
        tracing::info!(
            file_name,
            "guessed runtime archive name from platform and architecture (may not exist)"
        );
        let url = self.target.runtime_url(&runtime.release_url, &runtime.version);
        let expected_digest = match lookup_digest(&runtime.digests, &file_name) {
            Ok(digest) => digest,
            Err(_) if runtime.fetch_published_digests => {
                lts_net::fetch_published_digest(&self.client, &url, &file_name, &self.tx).await?
            }
            Err(e) => return Err(e),
        };
        Ok(DependencySpec {
            name: runtime.name.clone(),
            version: runtime.version.clone(),
            url,
            expected_digest,
        })
    }

    async fn download(&self, spec: &DependencySpec) -> Result<PathBuf, Error> {
        let mut progress = ProgressStack::new(
            format!("Downloading and extracting {}", spec.name),
            self.tx.clone(),
        );
        install_dependency(&self.client, spec, &self.lib_dir, &mut progress, &self.tx).await
    }
}

fn lookup_digest(digests: &BTreeMap<String, String>, file_name: &str) -> Result<String, Error> {
    digests.get(file_name).cloned().ok_or_else(|| {
        InstallError::DigestNotFound {
            file_name: file_name.to_string(),
        }
        .into()
    })
}
