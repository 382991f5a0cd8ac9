/**
 * project module
 * Per-project suffix registry, suggestion and confirmation
 */

pub mod confirm;
pub mod registry;
pub mod store;

pub use confirm::{confirm_continue, confirm_suffix, prompt_first_suffix, DEFAULT_FIRST_SUFFIX};
pub use registry::{PortRegistry, ProjectEntry, Suggestion, SuggestionSource};
pub use store::{
    normalize_project_path, FileRegistryStore, MemoryRegistryStore, Registry, RegistryStore,
    REGISTRY_FILE_NAME,
};
