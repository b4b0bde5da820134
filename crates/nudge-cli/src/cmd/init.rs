use super::with_store;
use anyhow::Context;
use nudge_core::config::Config;
use nudge_core::paths;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    let created = Config::init(root)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    let cfg = super::load_config(root)?;
    with_store(root, &cfg, |_| Ok(()))?;

    if created {
        println!("Initialized nudge in {}", paths::nudge_dir(root).display());
    } else {
        println!("Already initialized: {}", config_path.display());
    }
    println!("History: {}", cfg.database_path(root).display());
    Ok(())
}
