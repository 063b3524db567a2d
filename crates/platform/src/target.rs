//! Platform and architecture resolution for release asset names
//!
//! Maps an operating system family and CPU architecture to the tokens used in
//! vendor archive names. The mapping is a pure function of its two inputs so
//! every combination can be checked without running on that platform.

use lts_types::ArchiveKind;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Operating system family as far as release assets are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OsFamily {
    Windows,
    Mac,
    Linux,
}

impl OsFamily {
    /// Token used in archive file names
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Linux => "linux",
        }
    }

    /// Archive container published for this family
    #[must_use]
    pub fn archive_kind(self) -> ArchiveKind {
        match self {
            Self::Windows => ArchiveKind::Zip,
            Self::Mac | Self::Linux => ArchiveKind::TarGz,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Resolved platform tokens for one machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformTarget {
    pub os: OsFamily,
    /// Architecture token as the runtime vendor spells it
    pub arch: &'static str,
    pub archive_kind: ArchiveKind,
}

impl PlatformTarget {
    /// Resolve from an operating system and architecture name.
    ///
    /// Both Rust (`macos`, `x86_64`, `powerpc64`) and Node-style (`darwin`,
    /// `ia32`, `arm64`) spellings are accepted. Unknown systems resolve to
    /// Linux and unknown architectures to `x64`; the resulting archive name
    /// then has no digest, which callers treat as a lookup failure.
    #[must_use]
    pub fn resolve(os: &str, arch: &str) -> Self {
        let os = match os {
            "win32" | "windows" => OsFamily::Windows,
            "darwin" | "macos" => OsFamily::Mac,
            _ => OsFamily::Linux,
        };

        let arch = match arch {
            "ia32" | "x86" => "x86-32",
            "arm" => "arm",
            "arm64" | "aarch64" => "aarch64",
            "ppc64" | "powerpc64" => "ppc64",
            "s390x" => "s390x",
            _ => "x64",
        };

        Self {
            os,
            arch,
            archive_kind: os.archive_kind(),
        }
    }

    /// Resolve for the machine this binary runs on
    #[must_use]
    pub fn current() -> Self {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }

    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == OsFamily::Windows
    }

    #[must_use]
    pub fn is_mac(&self) -> bool {
        self.os == OsFamily::Mac
    }

    /// File name of the runtime archive for `version` (e.g. `11.0.8+10`)
    #[must_use]
    pub fn runtime_archive_name(&self, version: &str) -> String {
        format!(
            "OpenJDK11U-jre_{}_{}_hotspot_{}.{}",
            self.arch,
            self.os.token(),
            version.replace('+', "_"),
            self.archive_kind.extension()
        )
    }

    /// Download URL of the runtime archive under `release_url`
    #[must_use]
    pub fn runtime_url(&self, release_url: &str, version: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(version.as_bytes()).collect();
        format!(
            "{}/jdk-{encoded}/{}",
            release_url.trim_end_matches('/'),
            self.runtime_archive_name(version)
        )
    }

    /// File name of the bundle archive; bundles are only published for x64
    #[must_use]
    pub fn bundle_archive_name(&self, name: &str, version: &str) -> String {
        format!(
            "{name}-{version}-{}-x64.{}",
            self.os.token(),
            self.archive_kind.extension()
        )
    }

    /// Download URL of the bundle archive for a release tag
    #[must_use]
    pub fn bundle_url(&self, release_url: &str, tag: &str, name: &str, version: &str) -> String {
        format!(
            "{}/{tag}/{}",
            release_url.trim_end_matches('/'),
            self.bundle_archive_name(name, version)
        )
    }

    /// Home directory of a runtime extracted to `dir`
    #[must_use]
    pub fn runtime_home(&self, dir: &Path) -> PathBuf {
        if self.is_mac() {
            dir.join("Contents").join("Home")
        } else {
            dir.to_path_buf()
        }
    }

    /// Launcher script of a bundle installed at `bundle_dir`
    #[must_use]
    pub fn bundle_launcher(&self, bundle_dir: &Path, name: &str) -> PathBuf {
        let script = if self.is_windows() {
            format!("{name}.bat")
        } else {
            name.to_string()
        };
        bundle_dir.join("bin").join(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architecture_table() {
        let cases = [
            ("ia32", "x86-32"),
            ("x86", "x86-32"),
            ("arm", "arm"),
            ("arm64", "aarch64"),
            ("aarch64", "aarch64"),
            ("ppc64", "ppc64"),
            ("s390x", "s390x"),
            ("x86_64", "x64"),
            ("riscv64", "x64"),
        ];
        for (input, expected) in cases {
            assert_eq!(PlatformTarget::resolve("linux", input).arch, expected, "{input}");
        }
    }

    #[test]
    fn test_platform_table() {
        let win = PlatformTarget::resolve("win32", "x64");
        assert_eq!(win.os, OsFamily::Windows);
        assert_eq!(win.archive_kind, ArchiveKind::Zip);

        let mac = PlatformTarget::resolve("darwin", "arm64");
        assert_eq!(mac.os, OsFamily::Mac);
        assert_eq!(mac.archive_kind, ArchiveKind::TarGz);
        assert_eq!(PlatformTarget::resolve("macos", "aarch64"), mac);

        let other = PlatformTarget::resolve("freebsd", "x86_64");
        assert_eq!(other.os, OsFamily::Linux);
        assert_eq!(other.archive_kind, ArchiveKind::TarGz);
    }

    #[test]
    fn test_runtime_archive_name_and_url() {
        let target = PlatformTarget::resolve("linux", "x86_64");
        assert_eq!(
            target.runtime_archive_name("11.0.8+10"),
            "OpenJDK11U-jre_x64_linux_hotspot_11.0.8_10.tar.gz"
        );
        assert_eq!(
            target.runtime_url("https://example.com/releases/download/", "11.0.8+10"),
            "https://example.com/releases/download/jdk-11.0.8%2B10/OpenJDK11U-jre_x64_linux_hotspot_11.0.8_10.tar.gz"
        );

        let win = PlatformTarget::resolve("windows", "x86");
        assert_eq!(
            win.runtime_archive_name("11.0.8+10"),
            "OpenJDK11U-jre_x86-32_windows_hotspot_11.0.8_10.zip"
        );
    }

    #[test]
    fn test_bundle_archive_is_always_x64() {
        let target = PlatformTarget::resolve("darwin", "arm64");
        assert_eq!(
            target.bundle_archive_name("ltex-ls", "15.2.0"),
            "ltex-ls-15.2.0-mac-x64.tar.gz"
        );
        assert_eq!(
            target.bundle_url("https://example.com/dl", "15.2.0", "ltex-ls", "15.2.0"),
            "https://example.com/dl/15.2.0/ltex-ls-15.2.0-mac-x64.tar.gz"
        );
    }

    #[test]
    fn test_runtime_home_and_launcher() {
        let dir = Path::new("/lib/jdk-11.0.8+10-jre");
        assert_eq!(
            PlatformTarget::resolve("darwin", "x64").runtime_home(dir),
            dir.join("Contents").join("Home")
        );
        assert_eq!(PlatformTarget::resolve("linux", "x64").runtime_home(dir), dir);

        let bundle = Path::new("/lib/ltex-ls-15.2.0");
        assert_eq!(
            PlatformTarget::resolve("win32", "x64").bundle_launcher(bundle, "ltex-ls"),
            bundle.join("bin").join("ltex-ls.bat")
        );
        assert_eq!(
            PlatformTarget::resolve("linux", "x64").bundle_launcher(bundle, "ltex-ls"),
            bundle.join("bin").join("ltex-ls")
        );
    }
}
