/**
 * launcher.rs
 * Shells out to Docker and the project's `vendor/bin/sail` script
 *
 * - install_dependencies: composer install inside laravelsail/phpXY-composer
 * - up / stop / down: sail up -d, sail stop, sail down
 * - container_status: sail ps --format {{.State}}
 *
 * Child processes inherit stdout/stderr so the user sees their output live.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::errors::{Result, SailError};

/// Launcher script path, relative to the project
pub const SAIL_RELATIVE_PATH: [&str; 3] = ["vendor", "bin", "sail"];

/// Container mount point used by Sail images
const CONTAINER_WORKDIR: &str = "/var/www/html";

/// Container state summary for `--status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    /// Project has no `vendor/bin/sail`
    NoSail,
    /// `sail ps` failed
    Unknown,
    Stopped,
    Running(usize),
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerStatus::NoSail => f.write_str("no sail"),
            ContainerStatus::Unknown => f.write_str("unknown"),
            ContainerStatus::Stopped => f.write_str("stopped"),
            ContainerStatus::Running(n) => write!(f, "{} running", n),
        }
    }
}

/// What [`SailLauncher::install_dependencies`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// `vendor/bin/sail` already present and no force requested
    Skipped,
    Installed,
}

/// Runs Sail tooling for one project directory
pub struct SailLauncher {
    project_dir: PathBuf,
}

impl SailLauncher {
    pub fn new<P: AsRef<Path>>(project_dir: P) -> Self {
        SailLauncher {
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }

    /// `<project>/vendor/bin/sail`
    pub fn sail_path(&self) -> PathBuf {
        SAIL_RELATIVE_PATH
            .iter()
            .fold(self.project_dir.clone(), |path, part| path.join(part))
    }

    pub fn has_sail(&self) -> bool {
        self.sail_path().exists()
    }

    /// Arguments for the composer container run
    ///
    /// `user` is `uid:gid`; omitted on hosts without unix ids.
    pub fn composer_install_args(&self, php_version: &str, user: Option<&str>) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];
        if let Some(user) = user {
            args.push("-u".to_string());
            args.push(user.to_string());
        }
        args.extend([
            "-v".to_string(),
            format!("{}:{}", self.project_dir.display(), CONTAINER_WORKDIR),
            "-w".to_string(),
            CONTAINER_WORKDIR.to_string(),
            format!("laravelsail/php{}-composer:latest", php_version),
            "composer".to_string(),
            "install".to_string(),
            "--ignore-platform-reqs".to_string(),
        ]);
        args
    }

    /// Install composer dependencies through Docker
    ///
    /// Skipped when `vendor/bin/sail` exists, unless `force` is set.
    pub fn install_dependencies(&self, php_version: &str, force: bool) -> Result<InstallOutcome> {
        if !force && self.has_sail() {
            debug!(sail = %self.sail_path().display(), "sail present, skipping composer install");
            return Ok(InstallOutcome::Skipped);
        }

        let user = current_user();
        let args = self.composer_install_args(php_version, user.as_deref());
        info!(php = php_version, dir = %self.project_dir.display(), "running composer install via docker");

        run_inherited(Command::new("docker").args(&args), "docker run")?;
        Ok(InstallOutcome::Installed)
    }

    /// `sail up -d`
    pub fn up(&self) -> Result<()> {
        self.run_sail(&["up", "-d"])
    }

    /// `sail stop`
    pub fn stop(&self) -> Result<()> {
        self.run_sail(&["stop"])
    }

    /// `sail down`
    pub fn down(&self) -> Result<()> {
        self.run_sail(&["down"])
    }

    fn run_sail(&self, args: &[&str]) -> Result<()> {
        let sail = self.sail_path();
        if !sail.exists() {
            return Err(SailError::SailNotFound(sail.display().to_string()));
        }
        info!(sail = %sail.display(), ?args, "running sail");

        let mut command = Command::new(&sail);
        command.args(args).current_dir(&self.project_dir);
        run_inherited(&mut command, &format!("sail {}", args.join(" ")))
    }

    /// Count running containers via `sail ps`
    pub fn container_status(&self) -> ContainerStatus {
        let sail = self.sail_path();
        if !sail.exists() {
            return ContainerStatus::NoSail;
        }

        let output = Command::new(&sail)
            .args(["ps", "--format", "{{.State}}"])
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        match output {
            Ok(output) if output.status.success() => {
                parse_container_states(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                debug!(status = %output.status, "sail ps exited unsuccessfully");
                ContainerStatus::Unknown
            }
            Err(e) => {
                debug!(error = %e, "sail ps could not be started");
                ContainerStatus::Unknown
            }
        }
    }
}

/// Summarise `sail ps --format {{.State}}` output
pub fn parse_container_states(stdout: &str) -> ContainerStatus {
    let running = stdout.lines().filter(|l| l.trim() == "running").count();
    if running == 0 {
        ContainerStatus::Stopped
    } else {
        ContainerStatus::Running(running)
    }
}

fn run_inherited(command: &mut Command, label: &str) -> Result<()> {
    let status = command
        .status()
        .map_err(|e| SailError::Launcher(format!("{} could not be started: {}", label, e)))?;
    if status.success() {
        Ok(())
    } else {
        Err(SailError::Launcher(format!("{} failed: {}", label, status)))
    }
}

#[cfg(unix)]
fn current_user() -> Option<String> {
    use nix::unistd::{getgid, getuid};
    Some(format!("{}:{}", getuid(), getgid()))
}

#[cfg(not(unix))]
fn current_user() -> Option<String> {
    None
}
