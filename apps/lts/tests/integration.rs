//! Integration tests for the lts CLI

use std::path::Path;
use std::process::{Command, Output};

/// Run lts isolated from the user's config file and `LTS_*` overrides
fn lts(config_home: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lts"));
    for (key, _) in std::env::vars() {
        if key.starts_with("LTS_") {
            command.env_remove(key);
        }
    }
    command
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute lts")
}

#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = lts(home.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lts"));
}

#[test]
fn test_cli_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    let output = lts(home.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["install", "probe", "platform", "versions"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_cli_invalid_command() {
    let home = tempfile::tempdir().unwrap();
    let output = lts(home.path(), &["invalid-command"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_platform_json_for_windows() {
    let home = tempfile::tempdir().unwrap();
    let output = lts(
        home.path(),
        &["--json", "platform", "--os", "win32", "--arch", "x64"],
    );

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["result"], "platform");
    assert_eq!(report["target"]["os"], "windows");
    assert_eq!(
        report["runtime_archive"],
        "OpenJDK11U-jre_x64_windows_hotspot_11.0.8_10.zip"
    );
    assert!(report["runtime_url"]
        .as_str()
        .unwrap()
        .contains("/jdk-11.0.8%2B10/"));
    assert_eq!(report["bundle_archive"], "ltex-ls-15.2.0-windows-x64.zip");
}

#[test]
fn test_config_file_and_environment_precedence() {
    let home = tempfile::tempdir().unwrap();
    let config_path = home.path().join("custom.toml");
    std::fs::write(
        &config_path,
        "[runtime]\nversion = \"11.0.9+11\"\n\n[bundle]\nversion = \"16.0.0\"\ntag = \"16.0.0\"\n",
    )
    .unwrap();

    let output = lts(
        home.path(),
        &[
            "--json",
            "--config",
            config_path.to_str().unwrap(),
            "platform",
            "--os",
            "linux",
            "--arch",
            "arm64",
        ],
    );

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        report["runtime_archive"],
        "OpenJDK11U-jre_aarch64_linux_hotspot_11.0.9_11.tar.gz"
    );
    assert_eq!(report["bundle_archive"], "ltex-ls-16.0.0-linux-x64.tar.gz");
}

#[test]
fn test_versions_lists_installed_bundles() {
    let home = tempfile::tempdir().unwrap();
    let lib = home.path().join("lib");
    for dir in ["ltex-ls-14.0.0", "ltex-ls-15.2.0", "jdk-11.0.8-jre"] {
        std::fs::create_dir_all(lib.join(dir)).unwrap();
    }

    let output = lts(
        home.path(),
        &["--json", "--lib-dir", lib.to_str().unwrap(), "versions"],
    );

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["result"], "versions");
    assert_eq!(report["installed"], serde_json::json!(["14.0.0", "15.2.0"]));
    assert_eq!(report["published"], serde_json::json!(["15.2.0"]));
    assert_eq!(report["selected"], "15.2.0");
}

#[test]
fn test_probe_of_missing_bundle_fails() {
    let home = tempfile::tempdir().unwrap();
    let bundle = home.path().join("ltex-ls-15.2.0");

    let output = lts(
        home.path(),
        &["--json", "probe", bundle.to_str().unwrap()],
    );

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["result"], "probed");
    assert_eq!(report["probe"]["success"], false);
    assert_eq!(report["probe"]["failure"]["reason"], "spawn_failed");
}

#[test]
fn test_install_with_unusable_library_dir_is_fatal() {
    let home = tempfile::tempdir().unwrap();
    let blocker = home.path().join("file");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let lib = blocker.join("lib");

    let output = lts(
        home.path(),
        &[
            "--non-interactive",
            "--lib-dir",
            lib.to_str().unwrap(),
            "install",
        ],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("install.library_dir_unavailable"));
}
