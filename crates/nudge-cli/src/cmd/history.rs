use super::with_store;
use crate::output::{event_rows, print_json, print_table};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let cfg = super::load_config(root)?;
    let limit = limit.unwrap_or(cfg.history_limit);
    let events = with_store(root, &cfg, |store| {
        store.recent(limit).context("failed to read history")
    })?;

    if json {
        print_json(&events)?;
        return Ok(());
    }

    if events.is_empty() {
        println!("No adjustments recorded yet.");
        return Ok(());
    }

    print_table(&["ID", "MAGNITUDE", "SIGN", "TIMESTAMP"], &event_rows(&events));
    Ok(())
}
