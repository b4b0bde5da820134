use super::with_store;
use crate::output::{print_feature_table, print_json};
use anyhow::Context;
use clap::Args;
use nudge_core::delta::{MAX_MAGNITUDE, MIN_MAGNITUDE};
use nudge_core::{
    Adjuster, Delta, DeltaSource, FixedSource, SeededSource, Selection, Sign, Table,
    ThreadRngSource,
};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ApplyArgs {
    /// Table to adjust: .xlsx workbook or CSV
    pub file: PathBuf,

    /// Feature column to adjust (repeatable; default: every feature column)
    #[arg(long = "select", short = 's', value_name = "COLUMN")]
    pub select: Vec<String>,

    /// Rename a prefixed column before adjusting, as OLD=NEW (repeatable)
    #[arg(long = "rename", value_name = "OLD=NEW")]
    pub rename: Vec<String>,

    /// Write the adjusted table here; .xlsx writes a workbook, anything else
    /// CSV (repeatable)
    #[arg(long, short = 'o')]
    pub out: Vec<PathBuf>,

    /// Seed the random draw for a reproducible delta
    #[arg(long, conflicts_with = "magnitude")]
    pub seed: Option<u64>,

    /// Force the magnitude instead of drawing one (requires --sign)
    #[arg(long, requires = "sign")]
    pub magnitude: Option<f64>,

    /// Direction of a forced delta: '+' or '-'
    #[arg(long, requires = "magnitude", allow_hyphen_values = true)]
    pub sign: Option<String>,

    /// Treat the first line as the header row
    #[arg(long)]
    pub no_banner: bool,
}

pub fn run(root: &Path, args: ApplyArgs, json: bool) -> anyhow::Result<()> {
    let cfg = super::load_config(root)?;

    let mut table = Table::load(&args.file, cfg.skip_banner && !args.no_banner)
        .with_context(|| format!("failed to read '{}'", args.file.display()))?;

    let renames = parse_renames(&args.rename)?;
    table
        .rename_columns(&renames, &cfg.rename_prefix)
        .context("failed to rename columns")?;

    let selection = if args.select.is_empty() {
        Selection::all_features(&table)
    } else {
        Selection::new(args.select)
    };

    let source = delta_source(args.seed, args.magnitude, args.sign.as_deref())?;
    let mut adjuster = Adjuster::new(source);
    let adjustment = with_store(root, &cfg, |store| {
        adjuster
            .apply(store, &table, &selection)
            .context("adjustment not applied")
    })?;

    for out in &args.out {
        adjustment
            .table
            .save(out)
            .with_context(|| format!("failed to write '{}'", out.display()))?;
    }

    if json {
        let value = serde_json::json!({
            "event": adjustment.event,
            "renamed": renames,
            "selected": selection.columns(),
            "table": adjustment.table,
            "output": args.out,
        });
        print_json(&value)?;
        return Ok(());
    }

    for (from, to) in renames.iter().filter(|(from, to)| from != to) {
        println!("Renamed: {from} -> {to}");
    }
    print_feature_table(&adjustment.table);
    println!();
    println!(
        "Adjustment applied: {} (history #{})",
        adjustment.delta(),
        adjustment.event.id
    );
    for out in &args.out {
        println!("Saved: {}", out.display());
    }
    Ok(())
}

fn parse_renames(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|r| {
            let (from, to) = r
                .split_once('=')
                .with_context(|| format!("invalid rename '{r}': expected OLD=NEW"))?;
            let (from, to) = (from.trim(), to.trim());
            if from.is_empty() || to.is_empty() {
                anyhow::bail!("invalid rename '{r}': both names must be non-empty");
            }
            Ok((from.to_string(), to.to_string()))
        })
        .collect()
}

fn delta_source(
    seed: Option<u64>,
    magnitude: Option<f64>,
    sign: Option<&str>,
) -> anyhow::Result<Box<dyn DeltaSource>> {
    if let (Some(magnitude), Some(sign)) = (magnitude, sign) {
        if !(MIN_MAGNITUDE..=MAX_MAGNITUDE).contains(&magnitude) {
            anyhow::bail!(
                "magnitude {magnitude} out of range: must be between {MIN_MAGNITUDE} and {MAX_MAGNITUDE}"
            );
        }
        let sign: Sign = sign.parse()?;
        return Ok(Box::new(FixedSource(Delta::new(magnitude, sign)?)));
    }
    Ok(match seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => Box::new(ThreadRngSource),
    })
}
