//! sailinit - Laravel Sail project setup with per-project ports
//!
//! Command-line interface over the sail-ports registry

use anyhow::Context;
use clap::{ArgGroup, Parser};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use sail_core::compose::{detect_php_version, DEFAULT_PHP_VERSION};
use sail_core::env_file::setup_env;
use sail_core::output::{self, Tone};
use sail_core::project::{confirm_continue, confirm_suffix};
use sail_core::{
    check_all_ports_for_suffix, ContainerStatus, FileRegistryStore, PortRegistry, PortRole,
    SailLauncher,
};

#[derive(Parser)]
#[command(name = "sailinit")]
#[command(version = sail_core::VERSION)]
#[command(about = "Set up a Laravel Sail project on its own port family", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["list", "status", "clean", "remove", "stop", "down"])
        .multiple(false)
))]
struct Cli {
    /// List all registered projects with their port suffixes
    #[arg(long)]
    list: bool,

    /// Show status of all registered projects
    #[arg(long)]
    status: bool,

    /// Remove entries for project directories that no longer exist
    #[arg(long)]
    clean: bool,

    /// Remove the current project from port registry
    #[arg(long)]
    remove: bool,

    /// Run sail stop in the current project
    #[arg(long)]
    stop: bool,

    /// Run sail down in the current project
    #[arg(long)]
    down: bool,

    /// Force re-run composer install even if vendor/bin/sail exists
    #[arg(long)]
    fresh: bool,

    /// Reset database settings to Sail defaults (mysql, laravel, sail/password)
    #[arg(long)]
    reset_db: bool,

    /// Show what would happen without making changes
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// PHP version (e.g. 83); detected from the compose file when omitted
    php_version: Option<String>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_registry() -> anyhow::Result<PortRegistry<FileRegistryStore>> {
    let store = FileRegistryStore::default_location()?;
    tracing::debug!(registry = %store.path().display(), "using port registry");
    Ok(PortRegistry::new(store))
}

fn current_project_dir() -> anyhow::Result<PathBuf> {
    env::current_dir().context("Error getting current directory")
}

/// Handle `sailinit --list`
fn handle_list() -> anyhow::Result<()> {
    let registry = open_registry()?;
    let mut projects = registry.list_all().context("Error listing projects")?;

    if projects.is_empty() {
        output::info("No registered projects found.");
        return Ok(());
    }

    projects.sort_by(|a, b| a.suffix.cmp(&b.suffix).then_with(|| a.path.cmp(&b.path)));

    let rows: Vec<Vec<(String, Tone)>> = projects
        .iter()
        .map(|p| {
            let status = if p.exists_on_disk {
                ("OK".to_string(), Tone::Success)
            } else {
                ("[X] Missing".to_string(), Tone::Error)
            };
            vec![
                (p.path.clone(), Tone::Plain),
                (p.suffix.to_string(), Tone::Plain),
                (p.port(PortRole::App).to_string(), Tone::Plain),
                (p.port(PortRole::ForwardDb).to_string(), Tone::Plain),
                (p.port(PortRole::ForwardRedis).to_string(), Tone::Plain),
                (p.port(PortRole::Vite).to_string(), Tone::Plain),
                status,
            ]
        })
        .collect();

    output::print_table(
        &["Project", "Suffix", "App Port", "DB Port", "Redis Port", "Vite Port", "Status"],
        &rows,
    );
    Ok(())
}

/// Handle `sailinit --status`
fn handle_status() -> anyhow::Result<()> {
    let registry = open_registry()?;
    let mut projects = registry.list_all().context("Error showing status")?;

    if projects.is_empty() {
        output::info("No registered projects found.");
        return Ok(());
    }

    projects.sort_by(|a, b| a.suffix.cmp(&b.suffix).then_with(|| a.path.cmp(&b.path)));

    let rows: Vec<Vec<(String, Tone)>> = projects
        .iter()
        .map(|p| {
            let containers = if !p.exists_on_disk {
                ("[X] Missing".to_string(), Tone::Error)
            } else {
                let status = SailLauncher::new(&p.path).container_status();
                let tone = match status {
                    ContainerStatus::Running(_) => Tone::Success,
                    ContainerStatus::Stopped => Tone::Dim,
                    ContainerStatus::NoSail | ContainerStatus::Unknown => Tone::Plain,
                };
                (status.to_string(), tone)
            };
            vec![
                (p.path.clone(), Tone::Plain),
                (p.suffix.to_string(), Tone::Plain),
                (p.port(PortRole::App).to_string(), Tone::Plain),
                containers,
            ]
        })
        .collect();

    output::print_table(&["Project", "Suffix", "App Port", "Containers"], &rows);
    Ok(())
}

/// Handle `sailinit --clean`
fn handle_clean() -> anyhow::Result<()> {
    let registry = open_registry()?;
    let removed = registry
        .remove_orphans()
        .context("Error cleaning orphaned projects")?;

    for entry in &removed {
        println!(
            "Removing orphaned project: {} (suffix {})",
            entry.path, entry.suffix
        );
    }
    output::success(&format!("Cleaned {} orphaned project(s)", removed.len()));
    Ok(())
}

/// Handle `sailinit --remove`
fn handle_remove() -> anyhow::Result<()> {
    let project_dir = current_project_dir()?;
    let registry = open_registry()?;
    registry
        .remove_project(&project_dir)
        .context("Error removing project")?;
    output::success("Project removed from port registry.");
    Ok(())
}

/// Handle `sailinit --stop`
fn handle_stop() -> anyhow::Result<()> {
    let launcher = SailLauncher::new(current_project_dir()?);
    output::info("Stopping Laravel Sail...");
    launcher.stop().context("Error stopping sail")?;
    Ok(())
}

/// Handle `sailinit --down`
fn handle_down() -> anyhow::Result<()> {
    let launcher = SailLauncher::new(current_project_dir()?);
    output::info("Running sail down...");
    launcher.down().context("Error running sail down")?;
    Ok(())
}

/// Pick the PHP version; None means the user declined to continue
fn resolve_php_version<R: BufRead, W: Write>(
    project_dir: &Path,
    requested: Option<&str>,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Option<String>> {
    let detected = detect_php_version(project_dir);

    match (requested, detected) {
        (Some(requested), Some(detected)) if requested != detected => {
            output::warning(&format!(
                "Warning: Manually specified PHP version ({}) differs from detected version in compose file ({}).",
                requested, detected
            ));
            if !confirm_continue(input, out)? {
                return Ok(None);
            }
            Ok(Some(requested.to_string()))
        }
        (Some(requested), _) => Ok(Some(requested.to_string())),
        (None, Some(detected)) => {
            output::info(&format!("Detected PHP version: {}", detected));
            Ok(Some(detected))
        }
        (None, None) => {
            output::info(&format!(
                "No PHP version detected. Using default: {}",
                DEFAULT_PHP_VERSION
            ));
            Ok(Some(DEFAULT_PHP_VERSION.to_string()))
        }
    }
}

/// Main setup flow: suffix → .env → composer → sail up
fn handle_setup(cli: &Cli) -> anyhow::Result<()> {
    let project_dir = current_project_dir()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let Some(php_version) =
        resolve_php_version(&project_dir, cli.php_version.as_deref(), &mut input, &mut out)?
    else {
        return Ok(());
    };

    output::header(&format!(
        "Starting Laravel Sail setup for PHP {}...",
        php_version
    ));

    let registry = open_registry()?;
    let suggestion = registry
        .suggest(&project_dir)
        .context("Error determining suffix")?;
    let suffix = confirm_suffix(&registry, &project_dir, &suggestion, &mut input, &mut out)?;

    let busy = check_all_ports_for_suffix(suffix);
    if !busy.is_empty() {
        output::warning("Warning: The following ports are already in use:");
        for port in &busy {
            output::warning(&format!("  {}: {}", port.role, port.port));
        }
        if !confirm_continue(&mut input, &mut out)? {
            return Ok(());
        }
    }

    if cli.dry_run {
        output::info(&format!(
            "[dry-run] Would save suffix {} for project {}",
            suffix,
            project_dir.display()
        ));
    } else if let Err(e) = registry.save_project_suffix(&project_dir, suffix) {
        output::error(&format!("Error saving suffix: {}", e));
    }

    output::info(&format!("Using port suffix: {}", suffix));

    if cli.dry_run {
        output::info(&format!("[dry-run] Would configure .env with suffix {}", suffix));
        for role in PortRole::ALL {
            output::info(&format!(
                "[dry-run]   {}={}",
                role.env_key(),
                role.port(suffix)
            ));
        }
    } else {
        output::info("Updating .env configuration...");
        let setup = setup_env(&project_dir, suffix, cli.reset_db)
            .context("Error setting up .env")?;
        if setup.created {
            output::info("Created .env");
        }
    }

    let launcher = SailLauncher::new(&project_dir);
    if cli.dry_run {
        output::info(&format!(
            "[dry-run] Would run composer install via Docker (PHP {})",
            php_version
        ));
        output::info("[dry-run] Would run sail up -d");
        return Ok(());
    }

    if !cli.fresh && launcher.has_sail() {
        output::info("vendor/bin/sail already exists, skipping composer install...");
    } else {
        output::info("Installing composer dependencies via Docker...");
    }
    launcher
        .install_dependencies(&php_version, cli.fresh)
        .context("Error running composer install")?;

    output::info("Starting Laravel Sail (sail up -d)...");
    launcher.up().context("Error running sail up")?;

    output::success("\nSetup complete! Your application is running with the following ports:");
    output::info(&format!(
        "Main App: http://localhost:{}",
        PortRole::App.port(suffix)
    ));
    output::info(&format!(
        "Mailpit Dashboard: http://localhost:{}",
        PortRole::ForwardMailpitDashboard.port(suffix)
    ));
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.list {
        handle_list()
    } else if cli.status {
        handle_status()
    } else if cli.clean {
        handle_clean()
    } else if cli.remove {
        handle_remove()
    } else if cli.stop {
        handle_stop()
    } else if cli.down {
        handle_down()
    } else {
        handle_setup(&cli)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    output::init_colors();

    if let Err(e) = run(cli) {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
