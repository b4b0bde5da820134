//! The adjustment transform: one shared delta applied across selected columns.
//!
//! [`Adjuster::apply`] computes the adjusted table, then records the delta in
//! the [`HistoryStore`]. The table is only handed back once the history row has
//! committed. If the write fails the caller gets the error and no table, so an
//! adjustment is never shown without its log entry.

use chrono::{SubsecRound, Utc};
use serde::Serialize;
use tracing::info;

use crate::delta::{Delta, DeltaSource, ThreadRngSource};
use crate::error::Result;
use crate::history::{AdjustmentEvent, HistoryStore};
use crate::selection::Selection;
use crate::table::Table;

/// Decimal digits kept in every adjusted cell.
pub const PRECISION: i32 = 5;

pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

pub fn round_to_precision(value: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    (value * scale).round() / scale
}

/// Copy of `table` with `delta` added to each listed value index, clamped and rounded.
fn shift_columns(table: &Table, targets: &[usize], delta: Delta) -> Table {
    let step = delta.signed();
    let mut out = table.clone();
    for row in out.rows_mut() {
        for &i in targets {
            row.values[i] = round_to_precision(clamp_unit(row.values[i] + step));
        }
    }
    out
}

/// Apply `delta` to the selected columns of `table` without touching history.
pub fn apply_delta(table: &Table, selection: &Selection, delta: Delta) -> Result<Table> {
    let targets = selection.resolve(table)?;
    Ok(shift_columns(table, &targets, delta))
}

// ---------------------------------------------------------------------------
// Adjuster
// ---------------------------------------------------------------------------

/// Result of one logged adjustment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    pub table: Table,
    pub event: AdjustmentEvent,
}

impl Adjustment {
    pub fn delta(&self) -> Delta {
        self.event.delta()
    }
}

pub struct Adjuster<S = ThreadRngSource> {
    source: S,
}

impl Adjuster<ThreadRngSource> {
    pub fn with_thread_rng() -> Self {
        Self::new(ThreadRngSource)
    }
}

impl<S: DeltaSource> Adjuster<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Draw a delta, apply it to `selection`, and log it to `store`.
    ///
    /// Input problems are reported before anything is drawn or written.
    pub fn apply(
        &mut self,
        store: &HistoryStore,
        table: &Table,
        selection: &Selection,
    ) -> Result<Adjustment> {
        let targets = selection.resolve(table)?;
        let delta = self.source.draw();
        let adjusted = shift_columns(table, &targets, delta);

        // Stored timestamps carry microseconds; match them so the returned
        // event equals what `recent` reads back.
        let timestamp = Utc::now().trunc_subsecs(6);
        let id = store.record(delta.magnitude, delta.sign, timestamp)?;

        info!(
            id,
            delta = %delta,
            columns = selection.len(),
            rows = table.len(),
            "adjustment applied"
        );
        Ok(Adjustment {
            table: adjusted,
            event: AdjustmentEvent {
                id,
                magnitude: delta.magnitude,
                sign: delta.sign,
                timestamp,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
