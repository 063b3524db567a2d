//! lts - installer for the LanguageTool language server
//!
//! Locates or downloads the server bundle and a Java runtime, validates the
//! pair and prints how to launch it.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod prompt;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::{CommandResult, OutputRenderer, PlatformReport, VersionsReport};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::logging::init_tracing;
use crate::prompt::TerminalPrompt;
use clap::Parser;
use lts_config::{constants, Config};
use lts_errors::UserFacingError;
use lts_events::{EventReceiver, EventSender};
use lts_install::{
    DependencyInstaller, InstallOutcome, InstallSession, RecoveryPrompt, ShowOfflineInstructions,
};
use lts_net::{NetClient, NetConfig};
use lts_platform::{PlatformTarget, TokioProcessOperations};
use lts_types::{ColorChoice, InstalledLocation, OriginTier, OutputFormat, RuntimeChoice};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Settings shared by every command
struct CommandContext {
    config: Config,
    tx: EventSender,
    interactive: bool,
    colors_enabled: bool,
}

/// Main application logic; returns whether the command succeeded
async fn run(cli: Cli) -> Result<bool, CliError> {
    info!("Starting lts v{}", env!("CARGO_PKG_VERSION"));

    // Defaults, then the config file, then the environment, then flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);

    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;
    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
    };

    let (event_sender, event_receiver) = lts_events::channel();
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, json_output);

    let ctx = CommandContext {
        config,
        tx: event_sender,
        interactive: !(cli.global.non_interactive || json_output),
        colors_enabled,
    };

    let result =
        execute_command_with_events(cli.command, ctx, event_receiver, &mut event_handler).await?;

    OutputRenderer::new(json_output, colors_enabled).render_result(&result)?;

    info!("Command completed");
    Ok(result.is_success())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ctx: CommandContext,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ctx));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    ctx: CommandContext,
) -> Result<CommandResult, CliError> {
    match command {
        Commands::Install { .. } => {
            let installer = build_installer(&ctx)?;
            let mut session = InstallSession::new();
            let prompt: Box<dyn RecoveryPrompt> = if ctx.interactive {
                Box::new(TerminalPrompt::new(ctx.colors_enabled))
            } else {
                Box::new(ShowOfflineInstructions)
            };

            match installer.install(&mut session, prompt.as_ref()).await? {
                InstallOutcome::Ready(ready) => Ok(CommandResult::Installed(ready)),
                InstallOutcome::Failed {
                    error,
                    offline_instructions,
                } => Ok(CommandResult::Failed {
                    message: error.user_message().into_owned(),
                    code: error.user_code(),
                    offline_instructions,
                }),
            }
        }

        Commands::Probe { bundle, runtime } => {
            let installer = build_installer(&ctx)?;
            let runtime = match runtime {
                Some(home) => RuntimeChoice::Installed(InstalledLocation::new(
                    home,
                    OriginTier::ExplicitConfig,
                )),
                None => RuntimeChoice::System,
            };
            let (descriptor, probe) = installer.validate(&bundle, &runtime).await;
            Ok(CommandResult::Probed { descriptor, probe })
        }

        Commands::Platform { os, arch } => {
            let target = match (os, arch) {
                (None, None) => PlatformTarget::current(),
                (os, arch) => PlatformTarget::resolve(
                    os.as_deref().unwrap_or(std::env::consts::OS),
                    arch.as_deref().unwrap_or(std::env::consts::ARCH),
                ),
            };
            let bundle = &ctx.config.bundle;
            let runtime = &ctx.config.runtime;
            Ok(CommandResult::Platform(PlatformReport {
                target,
                runtime_archive: target.runtime_archive_name(&runtime.version),
                runtime_url: target.runtime_url(&runtime.release_url, &runtime.version),
                bundle_archive: target.bundle_archive_name(&bundle.name, &bundle.version),
                bundle_url: target.bundle_url(
                    &bundle.release_url,
                    &bundle.tag,
                    &bundle.name,
                    &bundle.version,
                ),
            }))
        }

        Commands::Versions { .. } => {
            let installer = build_installer(&ctx)?;
            let published = if ctx.config.bundle.manifest_url.is_some() {
                installer.fetch_bundle_versions().await?
            } else {
                vec![ctx.config.bundle.version.clone()]
            };
            let prefix = format!("{}-", ctx.config.bundle.name);
            let installed = lts_resolver::scan_versions(installer.lib_dir(), &prefix, "").await?;
            let policy = installer.policy().clone();
            let selected = policy.select(published.as_slice());

            Ok(CommandResult::Versions(VersionsReport {
                policy,
                published,
                selected,
                installed,
            }))
        }
    }
}

fn build_installer(
    ctx: &CommandContext,
) -> Result<DependencyInstaller<TokioProcessOperations>, CliError> {
    let client = NetClient::new(NetConfig::from_config(&ctx.config.network))?;
    let installer = DependencyInstaller::new(
        ctx.config.clone(),
        client,
        TokioProcessOperations::new(),
        ctx.tx.clone(),
    )?;
    Ok(installer)
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if global.json {
        config.general.default_output = OutputFormat::Json;
    }
    if let Some(lib_dir) = &global.lib_dir {
        config.paths.lib_dir = Some(lib_dir.clone());
    }

    if let Commands::Install {
        bundle_path,
        runtime_path,
        max_version,
        force_system_probe,
    } = command
    {
        if let Some(path) = bundle_path {
            config.bundle.path = Some(path.clone());
        }
        if let Some(path) = runtime_path {
            config.runtime.path = Some(path.clone());
        }
        if let Some(version) = max_version {
            config.bundle.max_version = Some(version.clone());
        }
        if *force_system_probe {
            config.runtime.force_system_probe = true;
        }
    }

    if let Commands::Versions { remote: true } = command {
        if config.bundle.manifest_url.is_none() {
            config.bundle.manifest_url = Some(constants::BUNDLE_MANIFEST_URL.to_string());
        }
    }
}
