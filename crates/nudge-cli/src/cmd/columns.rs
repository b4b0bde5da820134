use crate::output::print_json;
use anyhow::Context;
use nudge_core::Table;
use std::path::Path;

pub fn run(root: &Path, file: &Path, no_banner: bool, json: bool) -> anyhow::Result<()> {
    let cfg = super::load_config(root)?;
    let table = Table::load(file, cfg.skip_banner && !no_banner)
        .with_context(|| format!("failed to read '{}'", file.display()))?;
    let renamable = table.renamable_columns(&cfg.rename_prefix);

    if json {
        let value = serde_json::json!({
            "identifier": table.identifier(),
            "features": table.feature_columns(),
            "renamable": renamable,
            "rows": table.len(),
        });
        print_json(&value)?;
        return Ok(());
    }

    println!("Identifier: {}", table.identifier().unwrap_or("-"));
    println!("Rows:       {}", table.len());
    println!("Features:");
    for c in table.feature_columns() {
        let mark = if renamable.contains(&c.as_str()) {
            "  (renamable)"
        } else {
            ""
        };
        println!("  {c}{mark}");
    }
    Ok(())
}
