//! Fixed release coordinates for the bundle and the runtime
//!
//! These are the values a fresh installation uses when the configuration file
//! does not override them.

pub const BUNDLE_NAME: &str = "ltex-ls";
pub const BUNDLE_VERSION: &str = "15.2.0";
pub const BUNDLE_TAG: &str = "15.2.0";
pub const BUNDLE_RELEASE_URL: &str = "https://github.com/valentjn/ltex-ls/releases/download";
pub const BUNDLE_MANIFEST_URL: &str = "https://api.github.com/repos/valentjn/ltex-ls/releases";

/// sha256 digests of the published bundle archives, keyed by file name
pub const BUNDLE_DIGESTS: &[(&str, &str)] = &[
    (
        "ltex-ls-15.2.0-linux-x64.tar.gz",
        "04d7e2ba6ef0ff91f84983554e39181ada59518f7b6268e559bed6efae0827fc",
    ),
    (
        "ltex-ls-15.2.0-mac-x64.tar.gz",
        "d89b547722f165ca2343962065cbe7ee4a832316825b04266d1d2db3e46487b3",
    ),
    (
        "ltex-ls-15.2.0-windows-x64.zip",
        "66a8449840fd09d7cde27c1e23ecfe94c0cbe6622769c19d36b007965c0c0124",
    ),
];

pub const RUNTIME_NAME: &str = "jdk";
pub const RUNTIME_VERSION: &str = "11.0.8+10";
pub const RUNTIME_RELEASE_URL: &str =
    "https://github.com/AdoptOpenJDK/openjdk11-binaries/releases/download";
pub const RUNTIME_HOME_VAR: &str = "JAVA_HOME";
pub const RUNTIME_OPTIONS_VAR: &str = "JAVA_OPTS";

pub const USER_AGENT: &str = "lts";
pub const TOKEN_ENV: &str = "LTS_GITHUB_OAUTH_TOKEN";

pub const OFFLINE_INSTRUCTIONS_URL: &str =
    "https://valentjn.github.io/vscode-ltex/docs/installation-and-usage.html#offline-installation";
