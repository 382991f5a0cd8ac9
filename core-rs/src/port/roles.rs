/**
 * roles.rs
 * Fixed port roles of a Sail project
 *
 * Every project owns one suffix. Each role adds the suffix to its base:
 * - APP: 8000
 * - FORWARD_DB: 3300
 * - FORWARD_REDIS: 6300
 * - FORWARD_MEILISEARCH: 7700
 * - FORWARD_MAILPIT_DASHBOARD: 18100 (highest base, bounds the suffix)
 * - FORWARD_MAILPIT: 1000
 * - VITE: 5100
 *
 * Example:
 * - Suffix 51 → APP_PORT=8051, FORWARD_DB_PORT=3351, VITE_PORT=5151
 */

use std::fmt;

/// Port role, in the order the roles appear in `.env` and in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortRole {
    App,
    ForwardDb,
    ForwardRedis,
    ForwardMeilisearch,
    ForwardMailpitDashboard,
    ForwardMailpit,
    Vite,
}

impl PortRole {
    /// All roles in definition order
    pub const ALL: [PortRole; 7] = [
        PortRole::App,
        PortRole::ForwardDb,
        PortRole::ForwardRedis,
        PortRole::ForwardMeilisearch,
        PortRole::ForwardMailpitDashboard,
        PortRole::ForwardMailpit,
        PortRole::Vite,
    ];

    /// Base offset the suffix is added to
    pub const fn base(self) -> u32 {
        match self {
            PortRole::App => 8000,
            PortRole::ForwardDb => 3300,
            PortRole::ForwardRedis => 6300,
            PortRole::ForwardMeilisearch => 7700,
            PortRole::ForwardMailpitDashboard => 18100,
            PortRole::ForwardMailpit => 1000,
            PortRole::Vite => 5100,
        }
    }

    /// Variable name used in the project's `.env`
    pub const fn env_key(self) -> &'static str {
        match self {
            PortRole::App => "APP_PORT",
            PortRole::ForwardDb => "FORWARD_DB_PORT",
            PortRole::ForwardRedis => "FORWARD_REDIS_PORT",
            PortRole::ForwardMeilisearch => "FORWARD_MEILISEARCH_PORT",
            PortRole::ForwardMailpitDashboard => "FORWARD_MAILPIT_DASHBOARD_PORT",
            PortRole::ForwardMailpit => "FORWARD_MAILPIT_PORT",
            PortRole::Vite => "VITE_PORT",
        }
    }

    /// Derived port for a suffix
    ///
    /// Computed in `u64`: a hand-edited registry can hold any `u32`, and the
    /// sum must neither wrap nor overflow. Values above 65535 are not bindable.
    pub const fn port(self, suffix: u32) -> u64 {
        self.base() as u64 + suffix as u64
    }
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_key())
    }
}

/// All seven `(role, port)` pairs for a suffix, in role order
pub fn derived_ports(suffix: u32) -> Vec<(PortRole, u64)> {
    PortRole::ALL
        .iter()
        .map(|role| (*role, role.port(suffix)))
        .collect()
}
