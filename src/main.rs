//! syslog-conf CLI
//!
//! Entry point for the `syslog-conf` command-line tool.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use syslog_conf::lifecycle::SysfsVrfCatalog;
use syslog_conf::{
    logging, BuiltinRenderer, ConfigResolver, EffectiveConfig, Lifecycle, LifecycleError,
    RecordingServiceManager, SchemaDefaults, ServiceManager, Settings, SnapshotStore, Systemctl,
};

#[derive(Parser)]
#[command(name = "syslog-conf")]
#[command(about = "Resolve, render and apply the system syslog configuration", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Snapshots {
    /// Configuration being committed (JSON or TOML)
    #[arg(long)]
    staged: PathBuf,

    /// Configuration currently in effect (missing file = first commit)
    #[arg(long)]
    committed: Option<PathBuf>,

    /// Schema defaults overriding the built-in ones
    #[arg(long)]
    defaults: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as JSON
    Resolve {
        #[command(flatten)]
        snapshots: Snapshots,
    },

    /// Verify, generate and apply the staged configuration
    Commit {
        #[command(flatten)]
        snapshots: Snapshots,

        /// Runtime settings file (default: built-in paths and units)
        #[arg(long, short = 's')]
        settings: Option<PathBuf>,

        /// Render and report without writing files or touching units
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Warning: could not initialise logging: {}", e);
    }

    let result = match cli.command {
        Commands::Resolve { snapshots } => run_resolve(&snapshots),
        Commands::Commit {
            snapshots,
            settings,
            dry_run,
        } => run_commit(&snapshots, settings, dry_run),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(e.exit_code());
    }
}

fn resolve(snapshots: &Snapshots) -> Result<Option<EffectiveConfig>, LifecycleError> {
    let store = SnapshotStore::load(&snapshots.staged, snapshots.committed.as_deref())?;
    let defaults = match snapshots.defaults {
        Some(ref path) => SchemaDefaults::load(path)?,
        None => SchemaDefaults::builtin(),
    };

    Ok(ConfigResolver::new(&defaults, &store).resolve(store.staged()))
}

fn run_resolve(snapshots: &Snapshots) -> Result<(), LifecycleError> {
    let config = resolve(snapshots)?;

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn run_commit(
    snapshots: &Snapshots,
    settings_path: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), LifecycleError> {
    let settings = Settings::load(settings_path.as_deref())?;
    let config = resolve(snapshots)?;

    if dry_run {
        let services = RecordingServiceManager::new();
        commit(&settings, config.as_ref(), &services, true)?;
        for call in services.calls() {
            println!("would run: systemctl {}", call);
        }
    } else {
        commit(&settings, config.as_ref(), &Systemctl::default(), false)?;
    }
    Ok(())
}

fn commit(
    settings: &Settings,
    config: Option<&EffectiveConfig>,
    services: &dyn ServiceManager,
    dry_run: bool,
) -> Result<(), LifecycleError> {
    let renderer = BuiltinRenderer {
        user_log_dir: settings.user_log_dir.clone(),
        ..BuiltinRenderer::default()
    };
    let vrfs = SysfsVrfCatalog::new(&settings.interface_root);

    Lifecycle::new(settings, &renderer, services, &vrfs)
        .dry_run(dry_run)
        .run(config)?;
    Ok(())
}
