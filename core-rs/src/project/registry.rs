/**
 * registry.rs
 * Project → suffix registration on top of a RegistryStore
 *
 * Suggestion order for a project directory:
 * 1. Existing registry entry for the normalized path
 * 2. APP_PORT recovered from the project's own .env (APP_PORT - 8000)
 * 3. High-water mark + 1
 *
 * Collisions are checked against every other path at confirmation time.
 * Entries iterate in path order, so the reported conflict and listing order
 * are stable.
 */

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::env_file::read_suffix_from_env_file;
use crate::errors::{Result, SailError};
use crate::port::{derived_ports, validate_suffix, PortRole};
use crate::project::store::{normalize_project_path, Registry, RegistryStore};

/// Where a suggested suffix came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    /// Project already has a registry entry
    Registry,
    /// Recovered from the project's `.env`
    EnvFile,
    /// Next value after the high-water mark
    NextFree,
}

/// Suffix proposed for a project, before confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub suffix: u32,
    pub source: SuggestionSource,
    /// Registry file existed before this call
    pub registry_existed: bool,
}

impl Suggestion {
    /// True when the suffix was already tied to this project
    pub fn is_existing_assignment(&self) -> bool {
        self.source != SuggestionSource::NextFree
    }

    /// First run on this host for a brand-new project
    pub fn is_first_run(&self) -> bool {
        !self.registry_existed && !self.is_existing_assignment()
    }
}

/// Registry assignment joined with a liveness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub path: String,
    pub suffix: u32,
    pub exists_on_disk: bool,
}

impl ProjectEntry {
    /// Derived port for one role
    pub fn port(&self, role: PortRole) -> u64 {
        role.port(self.suffix)
    }

    /// All seven derived ports
    pub fn ports(&self) -> Vec<(PortRole, u64)> {
        derived_ports(self.suffix)
    }
}

/// A path counts as present unless the filesystem says it is gone.
/// Permission errors keep the entry rather than pruning it.
fn directory_exists(path: &str) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_dir(),
        Err(e) => e.kind() != ErrorKind::NotFound,
    }
}

/// Port registry operations over an injected store
pub struct PortRegistry<S: RegistryStore> {
    store: S,
}

impl<S: RegistryStore> PortRegistry<S> {
    pub fn new(store: S) -> Self {
        PortRegistry { store }
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the full registry
    pub fn load(&self) -> Result<(Registry, bool)> {
        self.store.load()
    }

    /// Suggest a suffix for `project_dir` without changing any state
    pub fn suggest(&self, project_dir: &Path) -> Result<Suggestion> {
        let (registry, registry_existed) = self.store.load()?;
        let key = normalize_project_path(project_dir)?;

        if let Some(suffix) = registry.get(&key) {
            debug!(project = %key, suffix, "suffix from registry");
            return Ok(Suggestion {
                suffix,
                source: SuggestionSource::Registry,
                registry_existed,
            });
        }

        if let Some(suffix) = read_suffix_from_env_file(project_dir) {
            debug!(project = %key, suffix, "suffix recovered from .env");
            return Ok(Suggestion {
                suffix,
                source: SuggestionSource::EnvFile,
                registry_existed,
            });
        }

        let suffix = registry.high_water_mark.saturating_add(1);
        debug!(project = %key, suffix, "suggesting next free suffix");
        Ok(Suggestion {
            suffix,
            source: SuggestionSource::NextFree,
            registry_existed,
        })
    }

    /// Record a confirmed suffix for `project_dir` and persist the registry
    pub fn save_project_suffix(&self, project_dir: &Path, suffix: u32) -> Result<()> {
        validate_suffix(i64::from(suffix))?;

        let (mut registry, _) = self.store.load()?;
        let key = normalize_project_path(project_dir)?;

        info!(project = %key, suffix, "assigning suffix");
        registry.assign(key, suffix);
        self.store.save(&registry)
    }

    /// Another project holding `suffix`
    ///
    /// # Returns
    /// The first other path in path order, or None. The project's own entry
    /// never counts as a conflict.
    pub fn find_conflict(&self, project_dir: &Path, suffix: u32) -> Result<Option<String>> {
        let (registry, _) = self.store.load()?;
        let key = normalize_project_path(project_dir)?;

        let conflict = registry
            .assignments
            .iter()
            .find(|(path, s)| **s == suffix && **path != key)
            .map(|(path, _)| path.clone());

        if let Some(ref other) = conflict {
            debug!(project = %key, suffix, other = %other, "suffix collision");
        }
        Ok(conflict)
    }

    /// Fail with `SuffixCollision` if another project holds `suffix`
    pub fn ensure_available(&self, project_dir: &Path, suffix: u32) -> Result<()> {
        match self.find_conflict(project_dir, suffix)? {
            Some(path) => Err(SailError::SuffixCollision { suffix, path }),
            None => Ok(()),
        }
    }

    /// Every assignment with its liveness, in path order
    pub fn list_all(&self) -> Result<Vec<ProjectEntry>> {
        let (registry, _) = self.store.load()?;
        Ok(registry
            .assignments
            .iter()
            .map(|(path, suffix)| ProjectEntry {
                path: path.clone(),
                suffix: *suffix,
                exists_on_disk: directory_exists(path),
            })
            .collect())
    }

    /// Remove entries whose directory no longer exists
    ///
    /// Saves only when something was removed.
    ///
    /// # Returns
    /// The removed entries
    pub fn remove_orphans(&self) -> Result<Vec<ProjectEntry>> {
        let (mut registry, _) = self.store.load()?;

        let orphans: Vec<ProjectEntry> = registry
            .assignments
            .iter()
            .filter(|(path, _)| !directory_exists(path))
            .map(|(path, suffix)| ProjectEntry {
                path: path.clone(),
                suffix: *suffix,
                exists_on_disk: false,
            })
            .collect();

        if orphans.is_empty() {
            return Ok(orphans);
        }

        for orphan in &orphans {
            info!(project = %orphan.path, suffix = orphan.suffix, "removing orphaned project");
            registry.unassign(&orphan.path);
        }
        self.store.save(&registry)?;

        Ok(orphans)
    }

    /// Remove the entry for `project_dir`
    ///
    /// # Returns
    /// The suffix the project held
    ///
    /// # Errors
    /// `ProjectNotRegistered` if there is no entry; nothing is written then.
    pub fn remove_project(&self, project_dir: &Path) -> Result<u32> {
        let (mut registry, _) = self.store.load()?;
        let key = normalize_project_path(project_dir)?;

        let suffix = registry
            .unassign(&key)
            .ok_or_else(|| SailError::ProjectNotRegistered(key.clone()))?;

        info!(project = %key, suffix, "removed project from registry");
        self.store.save(&registry)?;
        Ok(suffix)
    }
}
