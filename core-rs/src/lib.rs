//! # sail-ports
//!
//! Port bookkeeping for hosts running several Laravel Sail projects at once.
//!
//! Each project directory gets one integer suffix. Seven service ports are
//! derived from it (`APP_PORT = 8000 + suffix`, `FORWARD_DB_PORT = 3300 + suffix`, ...),
//! so projects never fight over the same host ports.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   suggest / confirm   ┌──────────────────────────┐
//! │   sailinit   │ ────────────────────▶ │  PortRegistry<S: Store>  │
//! │    (CLI)     │                       └────────────┬─────────────┘
//! └──────┬───────┘                                    │ load / save
//!        │ .env, docker, sail             ┌───────────▼────────────────┐
//!        ▼                                │ ~/.laravel-sail-ports.json │
//! ┌──────────────┐                        └────────────────────────────┘
//! │ env_file,    │
//! │ launcher     │
//! └──────────────┘
//! ```
//!
//! The registry file has no lock. Two `sailinit` runs at the same moment can
//! overwrite each other's assignment; last writer wins.

pub mod compose;
pub mod env_file;
pub mod errors;
pub mod io;
pub mod launcher;
pub mod output;
pub mod port;
pub mod project;

pub use errors::{Result, SailError};
pub use launcher::{ContainerStatus, SailLauncher};
pub use port::{check_all_ports_for_suffix, validate_suffix, BusyPort, PortRole, MAX_SUFFIX};
pub use project::{
    FileRegistryStore, MemoryRegistryStore, PortRegistry, ProjectEntry, Registry, RegistryStore,
    Suggestion, SuggestionSource,
};

/// Crate version, shown by `sailinit --version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
