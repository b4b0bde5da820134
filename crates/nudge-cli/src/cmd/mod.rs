pub mod apply;
pub mod columns;
pub mod history;
pub mod init;

use anyhow::Context;
use nudge_core::config::{Config, WarnLevel};
use nudge_core::HistoryStore;
use std::path::Path;

/// Load the project config, falling back to defaults when `.nudge/` is absent.
pub(crate) fn load_config(root: &Path) -> anyhow::Result<Config> {
    let cfg = Config::load_or_default(root).context("failed to load config")?;
    for w in cfg.validate() {
        match w.level {
            WarnLevel::Error => tracing::error!("config: {}", w.message),
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
        }
    }
    Ok(cfg)
}

/// Open the history store for one command, hand it to `f`, then close it.
///
/// On error the store is dropped, which releases the handle as well.
pub(crate) fn with_store<T>(
    root: &Path,
    cfg: &Config,
    f: impl FnOnce(&HistoryStore) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let path = cfg.database_path(root);
    let mut store = HistoryStore::open(&path)
        .with_context(|| format!("failed to open history store '{}'", path.display()))?;
    let value = f(&store)?;
    store.close().context("failed to close history store")?;
    Ok(value)
}
