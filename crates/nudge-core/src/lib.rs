//! Nudge feature tables by a small shared random delta and keep a log of
//! every delta applied.
//!
//! ```no_run
//! use nudge_core::{Adjuster, HistoryStore, Selection, Table};
//! # fn main() -> nudge_core::Result<()> {
//! let table = Table::load("features.xlsx".as_ref(), true)?;
//! let store = HistoryStore::open("adjustments.db".as_ref())?;
//! let selection = Selection::all_features(&table);
//! let adjusted = Adjuster::with_thread_rng().apply(&store, &table, &selection)?;
//! println!("applied {}", adjusted.delta());
//! # Ok(())
//! # }
//! ```

pub mod adjust;
pub mod config;
pub mod delta;
pub mod error;
pub mod history;
pub mod io;
pub mod paths;
pub mod selection;
pub mod table;

pub use adjust::{apply_delta, Adjuster, Adjustment};
pub use delta::{Delta, DeltaSource, FixedSource, SeededSource, Sign, ThreadRngSource};
pub use error::{InputError, NudgeError, Result};
pub use history::{AdjustmentEvent, HistoryStore, DEFAULT_RECENT_LIMIT};
pub use selection::Selection;
pub use table::{Row, Table, TableFormat};
