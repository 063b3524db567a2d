//! Configuration sections and their defaults

use crate::constants;
use lts_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color_choice(),
        }
    }
}

/// Server bundle coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default = "default_bundle_name")]
    pub name: String,
    /// Explicit installation directory; empty means unset
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_bundle_version")]
    pub version: String,
    #[serde(default = "default_bundle_tag")]
    pub tag: String,
    #[serde(default = "default_bundle_release_url")]
    pub release_url: String,
    /// Release list endpoint; when set, the policy-selected version is downloaded
    #[serde(default)]
    pub manifest_url: Option<String>,
    /// Compatibility ceiling for version selection
    #[serde(default)]
    pub max_version: Option<String>,
    #[serde(default = "default_bundle_digests")]
    pub digests: BTreeMap<String, String>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            name: default_bundle_name(),
            path: None,
            version: default_bundle_version(),
            tag: default_bundle_tag(),
            release_url: default_bundle_release_url(),
            manifest_url: None,
            max_version: None,
            digests: default_bundle_digests(),
        }
    }
}

/// Runtime coordinates and launch options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_runtime_name")]
    pub name: String,
    /// Explicit runtime home; empty means unset
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_runtime_version")]
    pub version: String,
    #[serde(default = "default_runtime_release_url")]
    pub release_url: String,
    /// Initial heap size in MB
    #[serde(default)]
    pub initial_heap_size: Option<u32>,
    /// Maximum heap size in MB
    #[serde(default)]
    pub maximum_heap_size: Option<u32>,
    /// Probe the system runtime even where that may trigger an installer prompt
    #[serde(default)]
    pub force_system_probe: bool,
    #[serde(default)]
    pub minimum_major_version: Option<u32>,
    #[serde(default = "default_runtime_home_var")]
    pub home_var: String,
    #[serde(default = "default_runtime_options_var")]
    pub options_var: String,
    /// sha256 digests of runtime archives, keyed by file name
    #[serde(default)]
    pub digests: BTreeMap<String, String>,
    /// Use the checksum file published next to an asset missing from `digests`
    #[serde(default = "default_true")]
    pub fetch_published_digests: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: default_runtime_name(),
            path: None,
            version: default_runtime_version(),
            release_url: default_runtime_release_url(),
            initial_heap_size: None,
            maximum_heap_size: None,
            force_system_probe: false,
            minimum_major_version: None,
            home_var: default_runtime_home_var(),
            options_var: default_runtime_options_var(),
            digests: BTreeMap::new(),
            fetch_published_digests: true,
        }
    }
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Managed library directory; empty means the platform data directory
    pub lib_dir: Option<String>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Environment variable holding an optional authorization token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
            token_env: default_token_env(),
        }
    }
}

/// Executable probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_version_flag")]
    pub version_flag: String,
    /// Text the version output must contain
    #[serde(default = "default_bundle_name")]
    pub marker: String,
    /// JSON key carrying the bundle version
    #[serde(default = "default_bundle_name")]
    pub bundle_field: String,
    /// JSON key carrying the runtime version
    #[serde(default = "default_runtime_field")]
    pub runtime_field: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout_ms(),
            version_flag: default_version_flag(),
            marker: default_bundle_name(),
            bundle_field: default_bundle_name(),
            runtime_field: default_runtime_field(),
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Plain
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_bundle_name() -> String {
    constants::BUNDLE_NAME.to_string()
}

fn default_bundle_version() -> String {
    constants::BUNDLE_VERSION.to_string()
}

fn default_bundle_tag() -> String {
    constants::BUNDLE_TAG.to_string()
}

fn default_bundle_release_url() -> String {
    constants::BUNDLE_RELEASE_URL.to_string()
}

fn default_bundle_digests() -> BTreeMap<String, String> {
    constants::BUNDLE_DIGESTS
        .iter()
        .map(|(name, digest)| ((*name).to_string(), (*digest).to_string()))
        .collect()
}

fn default_runtime_name() -> String {
    constants::RUNTIME_NAME.to_string()
}

fn default_runtime_version() -> String {
    constants::RUNTIME_VERSION.to_string()
}

fn default_runtime_release_url() -> String {
    constants::RUNTIME_RELEASE_URL.to_string()
}

fn default_runtime_home_var() -> String {
    constants::RUNTIME_HOME_VAR.to_string()
}

fn default_runtime_options_var() -> String {
    constants::RUNTIME_OPTIONS_VAR.to_string()
}

fn default_true() -> bool {
    true
}

fn default_runtime_field() -> String {
    "java".to_string()
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    constants::USER_AGENT.to_string()
}

fn default_token_env() -> String {
    constants::TOKEN_ENV.to_string()
}

fn default_probe_timeout_ms() -> u64 {
    10_000
}

fn default_version_flag() -> String {
    "--version".to_string()
}
