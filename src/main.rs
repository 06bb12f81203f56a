//! simple-roles - self-service roles
//!
//! This is the main entry point for the simple-roles binary.
//! `roles` commands run one operation against the persisted group store;
//! `watch` polls the roster of connected users and greets arrivals.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info, warn};

use simple_roles::cli::{Cli, Commands, ConfigSubcommand, RolesSubcommand};
use simple_roles::config::{self, RolesConfig};
use simple_roles::error::{Error, Result};
use simple_roles::logging::{self, LogGuards};
use simple_roles::presence::{FileRoster, PresenceHost, PresenceTracker, TickOutcome};
use simple_roles::roles::{FileGroupStore, IdCodec, MembershipManager, RoleEngine, RoleRegistry};
use simple_roles::version;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        debug!(error = %e.format_for_log(), "Command failed");
        eprint!("{}", e.format_for_terminal());
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // For commands that don't need full logging, use simple setup
    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Roles {
            config,
            user,
            subcommand,
        } => {
            let config = RolesConfig::load(config.as_deref())?;
            let _log_guards = init_logging_from_config(&config, cli.verbose, cli.quiet)?;
            run_roles(&config, user.as_deref(), subcommand, cli.quiet)
        }
        Commands::Watch {
            config,
            roster,
            once,
        } => {
            let config = RolesConfig::load(config.as_deref())?;
            let _log_guards = init_logging_from_config(&config, cli.verbose, cli.quiet)?;

            let build = version::build_info();
            info!(
                version = %build.full_version(),
                target = %build.target,
                "Starting simple-roles watcher"
            );

            let roster = roster.map(PathBuf::from).unwrap_or_else(|| config.roster_path());
            run_watch(config, roster, once)
        }
    }
}

/// Initialize logging from configuration
///
/// The guards must be kept alive for the lifetime of the command.
fn init_logging_from_config(config: &RolesConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    logging::init_logging(&config.logging, verbose, quiet)
}

// ─────────────────────────────────────────────────────────────────
// Role Commands
// ─────────────────────────────────────────────────────────────────

fn run_roles(
    config: &RolesConfig,
    user: Option<&str>,
    subcommand: RolesSubcommand,
    quiet: bool,
) -> Result<()> {
    let store = FileGroupStore::open(config.store_path())?;
    let mut engine = RoleEngine::new(store, &config.roles);

    let notices = engine.execute(user, subcommand.into())?;
    if !quiet {
        for notice in notices {
            println!("{}", notice);
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Presence Watcher
// ─────────────────────────────────────────────────────────────────

fn run_watch(config: RolesConfig, roster: PathBuf, once: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(watch_loop(config, roster, once))
}

async fn watch_loop(config: RolesConfig, roster: PathBuf, once: bool) -> Result<()> {
    let mut host = FileRoster::stdout(&roster);
    let mut tracker = PresenceTracker::new();

    info!(
        roster = %roster.display(),
        store = %config.store_path().display(),
        tick_interval_ms = config.presence.tick_interval_ms,
        "Watching for arrivals"
    );

    if once {
        presence_tick(&config, &mut tracker, &mut host)?;
        return Ok(());
    }

    // Set up graceful shutdown on Ctrl+C
    let shutdown_signal = tokio::signal::ctrl_c();
    tokio::pin!(shutdown_signal);

    let mut tick_timer =
        tokio::time::interval(Duration::from_millis(config.presence.tick_interval_ms));
    tick_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Shutdown signal received");
                break;
            }

            _ = tick_timer.tick() => {
                if let Err(e) = presence_tick(&config, &mut tracker, &mut host) {
                    warn!(error = %e.format_for_log(), "Presence tick failed");
                }
            }
        }
    }

    info!("Watcher stopped");
    Ok(())
}

/// One tick against a fresh view of the group store
fn presence_tick<H: PresenceHost>(
    config: &RolesConfig,
    tracker: &mut PresenceTracker,
    host: &mut H,
) -> Result<TickOutcome> {
    let store = FileGroupStore::open(config.store_path())?;
    let registry = RoleRegistry::new(store, IdCodec::new(config.roles.namespace_prefix.clone()));
    let membership = MembershipManager::new(registry);
    tracker.tick(host, &membership)
}

// ─────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────

fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = RolesConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            RolesConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
