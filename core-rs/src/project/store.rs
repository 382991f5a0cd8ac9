/**
 * store.rs
 * Persisted port registry and its storage backends
 *
 * Registry file: ~/.laravel-sail-ports.json
 * ```json
 * {
 *   "max_suffix": 52,
 *   "projects": {
 *     "/home/dev/blog": 51,
 *     "/home/dev/shop": 52
 *   }
 * }
 * ```
 *
 * The file is read in full and written in full. There is no locking: two
 * concurrent `sailinit` runs on one host can lose one run's update (last
 * writer wins).
 */

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::errors::{Result, SailError};
use crate::io::atomic_write;

/// Registry file name, placed in the user's home directory
pub const REGISTRY_FILE_NAME: &str = ".laravel-sail-ports.json";

/// Project path → suffix assignments plus the high-water mark
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Largest suffix ever assigned; never decreases
    #[serde(rename = "max_suffix", default)]
    pub high_water_mark: u32,

    /// Absolute project directory → suffix, ordered by path
    #[serde(rename = "projects", default, deserialize_with = "null_as_empty")]
    pub assignments: BTreeMap<String, u32>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, u32>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Registry {
    /// Suffix assigned to a normalized project path
    pub fn get(&self, path: &str) -> Option<u32> {
        self.assignments.get(path).copied()
    }

    /// Assign a suffix and raise the high-water mark if needed
    pub fn assign(&mut self, path: String, suffix: u32) {
        self.assignments.insert(path, suffix);
        self.high_water_mark = self.high_water_mark.max(suffix);
    }

    /// Remove an assignment; the high-water mark is kept
    pub fn unassign(&mut self, path: &str) -> Option<u32> {
        self.assignments.remove(path)
    }
}

/// Storage backend for the registry
///
/// Operations take the store explicitly so tests can swap the home-directory
/// file for a temp path or an in-memory copy.
pub trait RegistryStore {
    /// Load the registry
    ///
    /// # Returns
    /// `(registry, existed)`; a missing backing file yields an empty registry
    /// and `existed = false`, not an error.
    fn load(&self) -> Result<(Registry, bool)>;

    /// Replace the stored registry with `registry`
    fn save(&self, registry: &Registry) -> Result<()>;
}

/// Registry stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileRegistryStore {
    path: PathBuf,
}

impl FileRegistryStore {
    /// Store backed by an explicit file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileRegistryStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at `$HOME/.laravel-sail-ports.json`
    pub fn default_location() -> Result<Self> {
        let home = env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or(SailError::HomeNotFound)?;
        Ok(Self::new(PathBuf::from(home).join(REGISTRY_FILE_NAME)))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, reason: impl ToString) -> SailError {
        SailError::StoreRead {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn write_error(&self, reason: impl ToString) -> SailError {
        SailError::StoreWrite {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl RegistryStore for FileRegistryStore {
    fn load(&self) -> Result<(Registry, bool)> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no port registry yet");
                return Ok((Registry::default(), false));
            }
            Err(e) => return Err(self.read_error(e)),
        };

        let registry: Registry =
            serde_json::from_str(&content).map_err(|e| self.read_error(e))?;

        debug!(
            path = %self.path.display(),
            projects = registry.assignments.len(),
            max_suffix = registry.high_water_mark,
            "loaded port registry"
        );
        Ok((registry, true))
    }

    fn save(&self, registry: &Registry) -> Result<()> {
        let json = serde_json::to_string_pretty(registry).map_err(|e| self.write_error(e))?;
        atomic_write(&self.path, json.as_bytes()).map_err(|e| self.write_error(e))?;

        debug!(
            path = %self.path.display(),
            projects = registry.assignments.len(),
            "saved port registry"
        );
        Ok(())
    }
}

/// Registry kept in memory, for tests
#[derive(Debug, Default)]
pub struct MemoryRegistryStore {
    state: Mutex<Option<Registry>>,
}

impl MemoryRegistryStore {
    /// Empty store; `load` reports `existed = false` until the first save
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `registry`
    pub fn with_registry(registry: Registry) -> Self {
        MemoryRegistryStore {
            state: Mutex::new(Some(registry)),
        }
    }

    /// Current stored copy, if any
    pub fn snapshot(&self) -> Option<Registry> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RegistryStore for MemoryRegistryStore {
    fn load(&self) -> Result<(Registry, bool)> {
        Ok(match self.snapshot() {
            Some(registry) => (registry, true),
            None => (Registry::default(), false),
        })
    }

    fn save(&self, registry: &Registry) -> Result<()> {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(registry.clone());
        Ok(())
    }
}

/// Registry key for a project directory
///
/// Makes the path absolute against the current directory and removes `.` and
/// `..` components lexically, so `./blog` and `/home/dev/blog/../blog` share
/// one entry. Symlinks are not resolved.
pub fn normalize_project_path(project_dir: &Path) -> Result<String> {
    let absolute = std::path::absolute(project_dir).map_err(|e| {
        SailError::InvalidPath(format!("{}: {}", project_dir.display(), e))
    })?;

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }

    cleaned
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| SailError::InvalidPath(format!("{} is not valid UTF-8", cleaned.display())))
}
