use std::path::{Path, PathBuf};

pub const NUDGE_DIR: &str = ".nudge";
pub const CONFIG_FILE: &str = ".nudge/config.yaml";
pub const DEFAULT_DATABASE: &str = ".nudge/adjustments.db";

pub fn nudge_dir(root: &Path) -> PathBuf {
    root.join(NUDGE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root. Absolute paths pass through.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}
