/**
 * compose.rs
 * PHP runtime detection from a project's compose file
 *
 * Checked files, in order:
 * - compose.yaml, compose.yml, docker-compose.yaml, docker-compose.yml
 *
 * Recognised forms (first hit wins, returned without the dot):
 * - context: './vendor/laravel/sail/runtimes/8.3'  → "83"
 * - image: 'sail-8.4/app'                          → "84"
 * - context: ./docker/8.1                          → "81"
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use tracing::debug;

/// PHP version used when nothing is detected or given
pub const DEFAULT_PHP_VERSION: &str = "84";

/// Compose files checked, in priority order
pub const COMPOSE_FILES: [&str; 4] = [
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

static RUNTIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"runtimes/([0-9]+\.[0-9]+)",
        r"sail-([0-9]+\.[0-9]+)/app",
        r"context: \.?/docker/([0-9]+\.[0-9]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// PHP version named in compose file content, e.g. `"83"`
pub fn php_version_from_compose(content: &str) -> Option<String> {
    RUNTIME_PATTERNS.iter().find_map(|re| {
        re.captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().replace('.', ""))
    })
}

/// Detect the project's PHP version from its compose file
pub fn detect_php_version(project_dir: &Path) -> Option<String> {
    COMPOSE_FILES.iter().find_map(|name| {
        let path = project_dir.join(name);
        let content = fs::read_to_string(&path).ok()?;
        let version = php_version_from_compose(&content);
        debug!(file = %path.display(), version = ?version, "scanned compose file");
        version
    })
}
