//! Output formatting for command results

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::Style;
use lts_install::ReadyInstallation;
use lts_platform::PlatformTarget;
use lts_resolver::SelectionPolicy;
use lts_types::{ExecutableDescriptor, ProbeResult, RuntimeChoice};
use serde::Serialize;
use std::io;

/// Result of a command, ready to render
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    Installed(ReadyInstallation),
    Failed {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<&'static str>,
        offline_instructions: String,
    },
    Probed {
        descriptor: ExecutableDescriptor,
        probe: ProbeResult,
    },
    Platform(PlatformReport),
    Versions(VersionsReport),
}

impl CommandResult {
    /// Whether the command reached its goal
    pub fn is_success(&self) -> bool {
        match self {
            Self::Failed { .. } => false,
            Self::Probed { probe, .. } => probe.success,
            _ => true,
        }
    }
}

/// Download coordinates for one platform
#[derive(Debug, Serialize)]
pub struct PlatformReport {
    pub target: PlatformTarget,
    pub runtime_archive: String,
    pub runtime_url: String,
    pub bundle_archive: String,
    pub bundle_url: String,
}

/// Server versions known to the installer
#[derive(Debug, Serialize)]
pub struct VersionsReport {
    pub policy: SelectionPolicy,
    pub published: Vec<String>,
    pub selected: Option<String>,
    pub installed: Vec<String>,
}

/// Output renderer for CLI results
pub struct OutputRenderer {
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    /// Render a command result to stdout
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            CommandResult::Installed(ready) => self.render_installed(ready),
            CommandResult::Failed {
                message,
                offline_instructions,
                ..
            } => {
                println!("{}", self.style(Style::new().red().bold(), message));
                println!("You might want to try offline installation, see {offline_instructions}");
            }
            CommandResult::Probed { descriptor, probe } => self.render_probe(descriptor, probe),
            CommandResult::Platform(report) => Self::render_platform(report),
            CommandResult::Versions(report) => self.render_versions(report),
        }
        Ok(())
    }

    fn render_installed(&self, ready: &ReadyInstallation) {
        println!(
            "{}",
            self.style(Style::new().green().bold(), "Language server ready")
        );
        println!(
            "Server:  {} ({})",
            ready.bundle.path.display(),
            ready.bundle.origin
        );
        match &ready.runtime {
            RuntimeChoice::System => println!("Runtime: system"),
            RuntimeChoice::Installed(location) => {
                println!("Runtime: {} ({})", location.path.display(), location.origin);
            }
        }
        println!();
        render_descriptor(&ready.descriptor);
    }

    fn render_probe(&self, descriptor: &ExecutableDescriptor, probe: &ProbeResult) {
        if probe.success {
            println!(
                "{} server {}, Java {}",
                self.style(Style::new().green().bold(), "OK"),
                probe.bundle_version.as_deref().unwrap_or("?"),
                probe.runtime_version.as_deref().unwrap_or("?"),
            );
        } else {
            let reason = probe
                .failure
                .as_ref()
                .map_or_else(|| "unknown failure".to_string(), ToString::to_string);
            println!("{} {reason}", self.style(Style::new().red().bold(), "FAILED"));
            if !probe.stdout.is_empty() {
                println!("stdout: {}", probe.stdout.trim_end());
            }
            if !probe.stderr.is_empty() {
                println!("stderr: {}", probe.stderr.trim_end());
            }
        }
        println!();
        render_descriptor(descriptor);
    }

    fn render_platform(report: &PlatformReport) {
        println!("Platform:        {} {}", report.target.os, report.target.arch);
        println!("Runtime archive: {}", report.runtime_archive);
        println!("Runtime URL:     {}", report.runtime_url);
        println!("Server archive:  {}", report.bundle_archive);
        println!("Server URL:      {}", report.bundle_url);
    }

    fn render_versions(&self, report: &VersionsReport) {
        if report.published.is_empty() && report.installed.is_empty() {
            println!("No versions found.");
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Published").add_attribute(Attribute::Bold),
            Cell::new("Installed").add_attribute(Attribute::Bold),
        ]);

        let mut versions: Vec<&String> = report.published.iter().chain(&report.installed).collect();
        versions.sort();
        versions.dedup();
        for version in versions {
            let mark = |present: bool| if present { "yes" } else { "-" };
            table.add_row(vec![
                Cell::new(version),
                Cell::new(mark(report.published.contains(version))),
                Cell::new(mark(report.installed.contains(version))),
            ]);
        }

        println!("{table}");
        match &report.selected {
            Some(selected) => println!(
                "Policy {} selects {}",
                report.policy,
                self.style(Style::new().bold(), selected)
            ),
            None => println!("Policy {} selects nothing", report.policy),
        }
    }

    fn style(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn render_descriptor(descriptor: &ExecutableDescriptor) {
    println!("Command: {}", descriptor.command.display());
    if !descriptor.args.is_empty() {
        println!("Args:    {}", descriptor.args.join(" "));
    }
    // The full environment is large; show what the installer controls
    for (key, value) in &descriptor.env {
        if key.ends_with("_HOME") || key.ends_with("_OPTS") {
            println!("Env:     {key}={value}");
        }
    }
}
