use nudge_core::{AdjustmentEvent, Table};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render rows under `headers`, two spaces between columns. Numeric cells are
/// right-aligned, everything else left-aligned.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let fmt_row = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| {
                if cell.parse::<f64>().is_ok() {
                    format!("{cell:>w$}")
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(fmt_row(headers.iter().map(|h| h.to_string()).collect()));
    out.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(rows.iter().map(|r| fmt_row(r.clone())));
    out.join("\n")
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", render_table(headers, rows));
}

/// Print a feature table with its own column names as headers.
pub fn print_feature_table(table: &Table) {
    let headers: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|r| {
            std::iter::once(r.label.clone())
                .chain(r.values.iter().map(f64::to_string))
                .collect()
        })
        .collect();
    print_table(&headers, &rows);
}

pub fn event_rows(events: &[AdjustmentEvent]) -> Vec<Vec<String>> {
    events
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.magnitude.to_string(),
                e.sign.to_string(),
                e.timestamp.to_rfc3339(),
            ]
        })
        .collect()
}
