//! Project `.env` handling
//!
//! Two jobs, kept apart from the registry:
//! - recover a suffix from an existing `APP_PORT=` line (best effort)
//! - rewrite `.env` with the port block for a confirmed suffix

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{Result, SailError};
use crate::io::atomic_write;
use crate::port::PortRole;

/// Environment file inside a project
pub const ENV_FILE: &str = ".env";

/// Template copied when `.env` does not exist
pub const ENV_EXAMPLE_FILE: &str = ".env.example";

/// Debug mode line always placed last
pub const XDEBUG_LINE: &str = "SAIL_XDEBUG_MODE=develop,debug,coverage";

const XDEBUG_KEY: &str = "SAIL_XDEBUG_MODE";

/// Sail database defaults, applied to new files or on `--reset-db`
pub const DB_DEFAULTS: [(&str, &str); 6] = [
    ("DB_CONNECTION", "mysql"),
    ("DB_HOST", "mysql"),
    ("DB_PORT", "3306"),
    ("DB_DATABASE", "laravel"),
    ("DB_USERNAME", "sail"),
    ("DB_PASSWORD", "password"),
];

/// Result of [`setup_env`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSetup {
    pub path: PathBuf,
    /// `.env` did not exist before this run
    pub created: bool,
    /// Database defaults were written
    pub db_defaults_applied: bool,
}

/// Path of the project's `.env`
pub fn env_path(project_dir: &Path) -> PathBuf {
    project_dir.join(ENV_FILE)
}

fn has_key(trimmed_line: &str, key: &str) -> bool {
    trimmed_line
        .strip_prefix(key)
        .is_some_and(|rest| rest.starts_with('='))
}

/// Leading decimal integer with optional blanks and sign before it.
/// Anything after the digits is ignored.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start_matches([' ', '\t']);
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits_len = text[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    text[..sign_len + digits_len].parse().ok()
}

/// Recover a suffix from `.env` lines
///
/// Scans top to bottom for `APP_PORT=<n>` and returns `n - 8000` from the
/// first line whose value is at least the APP base. Lines with unparsable or
/// smaller values are skipped.
pub fn recover_suffix_from_environment_text<'a, I>(lines: I) -> Option<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    let key = PortRole::App.env_key();
    let base = i64::from(PortRole::App.base());

    lines.into_iter().find_map(|line| {
        let value = line.trim().strip_prefix(key)?.strip_prefix('=')?;
        let port = leading_integer(value)?;
        if port < base {
            return None;
        }
        u32::try_from(port - base).ok()
    })
}

/// Suffix recorded in a project's `.env`, if any
///
/// Read failures count as "nothing to recover".
pub fn read_suffix_from_env_file(project_dir: &Path) -> Option<u32> {
    let path = env_path(project_dir);
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(&path) {
        Ok(content) => recover_suffix_from_environment_text(content.lines()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not read .env for suffix recovery");
            None
        }
    }
}

/// Render a new `.env` body for `suffix`
///
/// Existing port and xdebug lines are dropped. When `apply_db_defaults` is set,
/// existing DB lines are replaced in place and missing ones appended in
/// [`DB_DEFAULTS`] order; otherwise DB lines are left as they are.
pub fn render_env(existing: &str, suffix: u32, apply_db_defaults: bool) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut seen_db = [false; DB_DEFAULTS.len()];

    for line in existing.lines() {
        let trimmed = line.trim();

        let is_port_line = PortRole::ALL.iter().any(|r| has_key(trimmed, r.env_key()));
        if is_port_line || has_key(trimmed, XDEBUG_KEY) {
            continue;
        }

        let db_match = apply_db_defaults
            .then(|| DB_DEFAULTS.iter().position(|(key, _)| has_key(trimmed, key)))
            .flatten();

        match db_match {
            Some(index) => {
                let (key, value) = DB_DEFAULTS[index];
                lines.push(format!("{}={}", key, value));
                seen_db[index] = true;
            }
            None => lines.push(line.to_string()),
        }
    }

    if apply_db_defaults {
        for (index, (key, value)) in DB_DEFAULTS.iter().enumerate() {
            if !seen_db[index] {
                lines.push(format!("{}={}", key, value));
            }
        }
    }

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    lines.push(String::new());
    for role in PortRole::ALL {
        lines.push(format!("{}={}", role.env_key(), role.port(suffix)));
    }
    lines.push(String::new());
    lines.push(XDEBUG_LINE.to_string());

    let mut body = lines.join("\n");
    body.push('\n');
    body
}

/// Write the port block for `suffix` into the project's `.env`
///
/// Creates `.env` from `.env.example` (or empty) when missing. Database
/// defaults are applied only to a freshly created file or when `reset_db` is set.
pub fn setup_env(project_dir: &Path, suffix: u32, reset_db: bool) -> Result<EnvSetup> {
    let path = env_path(project_dir);
    let example = project_dir.join(ENV_EXAMPLE_FILE);

    let created = !path.exists();
    let existing = if created {
        if example.is_file() {
            info!(from = %example.display(), "creating .env from template");
            fs::read_to_string(&example).map_err(|e| {
                SailError::EnvFile(format!("Failed to read {}: {}", example.display(), e))
            })?
        } else {
            info!(path = %path.display(), "creating empty .env");
            String::new()
        }
    } else {
        fs::read_to_string(&path).map_err(|e| {
            SailError::EnvFile(format!("Failed to read {}: {}", path.display(), e))
        })?
    };

    let db_defaults_applied = created || reset_db;
    let body = render_env(&existing, suffix, db_defaults_applied);

    atomic_write(&path, body.as_bytes()).map_err(|e| {
        SailError::EnvFile(format!("Failed to write {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), suffix, created, db_defaults_applied, "updated .env");
    Ok(EnvSetup {
        path,
        created,
        db_defaults_applied,
    })
}
