//! Default locations used across commands.

use std::path::PathBuf;

/// File name of a cached command registry snapshot.
pub const REGISTRY_FILE_NAME: &str = "commands.json";

/// Returns the default directory for cached build state.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/solution-build` (XDG Base Directory)
/// - macOS: `~/Library/Caches/solution-build`
/// - Windows: `{FOLDERID_LocalAppData}\solution-build`
///
/// Falls back to `.solution-build-cache` in the current directory if the
/// platform cache directory cannot be determined.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".solution-build-cache"))
        .join("solution-build")
}

/// Returns where `registry export` writes, and `check` reads, the command
/// registry snapshot when no path is given.
///
/// Overridden by the `--registry` flag or the `SOLUTION_BUILD_REGISTRY`
/// environment variable.
pub fn default_registry_path() -> PathBuf {
    default_cache_root().join(REGISTRY_FILE_NAME)
}
