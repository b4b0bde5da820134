//! In-memory feature table and its CSV and workbook codecs.
//!
//! Column 0 is the identifier column. Its cells are kept as text and never
//! reinterpreted. Every other column is a feature column holding `f64` values.

use crate::error::{InputError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{ColNum, RowNum, Workbook, XlsxError};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Identifier cell, verbatim from the input.
    pub label: String,
    /// One value per feature column, in column order.
    pub values: Vec<f64>,
}

impl Row {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, checking that column names are unique and every row
    /// carries one value per feature column.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(InputError::DuplicateColumn(name.clone()).into());
            }
        }
        let expected = columns.len().saturating_sub(1);
        for (i, row) in rows.iter().enumerate() {
            if row.values.len() != expected {
                return Err(InputError::RaggedRow {
                    row: i + 1,
                    found: row.values.len() + 1,
                    expected: columns.len(),
                }
                .into());
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn identifier(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    pub fn feature_columns(&self) -> &[String] {
        self.columns.get(1..).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` within [`Row::values`], if it is a feature column.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_columns().iter().position(|c| c == name)
    }

    /// Value of feature column `column` in row `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.feature_index(column)?;
        self.rows.get(row).map(|r| r.values[idx])
    }

    // -----------------------------------------------------------------------
    // Renaming
    // -----------------------------------------------------------------------

    /// Feature columns whose names start with `prefix`.
    pub fn renamable_columns(&self, prefix: &str) -> Vec<&str> {
        self.feature_columns()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    /// Relabel columns in one batch. Values are untouched.
    ///
    /// Only feature columns starting with `prefix` may be renamed, and never
    /// to an empty name. The table is left unchanged if any rename is rejected.
    pub fn rename_columns(&mut self, renames: &[(String, String)], prefix: &str) -> Result<()> {
        let mut columns = self.columns.clone();
        for (from, to) in renames {
            if to.trim().is_empty() {
                return Err(InputError::EmptyColumnName(from.clone()).into());
            }
            if from == to {
                continue;
            }
            if self.identifier() == Some(from.as_str()) {
                return Err(InputError::NotRenamable {
                    column: from.clone(),
                    prefix: prefix.to_string(),
                }
                .into());
            }
            let idx = self
                .columns
                .iter()
                .position(|c| c == from)
                .ok_or_else(|| InputError::UnknownColumn(from.clone()))?;
            if !from.starts_with(prefix) {
                return Err(InputError::NotRenamable {
                    column: from.clone(),
                    prefix: prefix.to_string(),
                }
                .into());
            }
            columns[idx] = to.clone();
        }

        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(InputError::DuplicateColumn(name.clone()).into());
            }
        }
        self.columns = columns;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Read `path` as a workbook or as CSV, depending on its extension.
    pub fn load(path: &Path, skip_banner: bool) -> Result<Self> {
        match TableFormat::from_path(path) {
            TableFormat::Csv => Self::from_csv_path(path, skip_banner),
            TableFormat::Xlsx => Self::from_xlsx_path(path, skip_banner),
        }
    }

    /// Build a table from raw records, each tagged with its 1-based line.
    ///
    /// With `skip_banner`, the first record is a banner and the second holds
    /// the column names. A blank header cell is named `Unnamed: <index>`.
    fn from_records<I>(records: I, skip_banner: bool) -> Result<Self>
    where
        I: IntoIterator<Item = Result<(usize, Vec<String>)>>,
    {
        let mut records = records.into_iter();

        if skip_banner {
            if let Some(banner) = records.next() {
                banner?;
            }
        }

        let (_, header) = match records.next() {
            Some(rec) => rec?,
            None => return Err(InputError::MissingIdentifier.into()),
        };
        if header.iter().all(String::is_empty) {
            return Err(InputError::MissingIdentifier.into());
        }
        let columns: Vec<String> = header
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                if name.is_empty() {
                    format!("Unnamed: {i}")
                } else {
                    name
                }
            })
            .collect();

        let mut rows = Vec::new();
        for rec in records {
            let (line, cells) = rec?;
            if cells.len() != columns.len() {
                return Err(InputError::RaggedRow {
                    row: line,
                    found: cells.len(),
                    expected: columns.len(),
                }
                .into());
            }
            let mut cells = cells.into_iter();
            let label = cells.next().unwrap_or_default();
            let values = columns[1..]
                .iter()
                .zip(cells)
                .map(|(column, cell)| parse_cell(line, column, &cell))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.push(Row { label, values });
        }

        Self::new(columns, rows)
    }

    // -----------------------------------------------------------------------
    // CSV
    // -----------------------------------------------------------------------

    /// Parse a table from CSV. Cells are trimmed and blank lines are ignored.
    pub fn from_csv_reader<R: Read>(reader: R, skip_banner: bool) -> Result<Self> {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let records = rdr
            .into_records()
            .map(|rec| -> Result<(usize, Vec<String>)> {
                let rec = rec?;
                let line = rec.position().map(|p| p.line() as usize).unwrap_or(0);
                Ok((line, rec.iter().map(str::to_string).collect()))
            });
        Self::from_records(records, skip_banner)
    }

    pub fn from_csv_path(path: &Path, skip_banner: bool) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file, skip_banner)
    }

    /// Write the table as CSV: one header record, then one record per row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            let mut record = Vec::with_capacity(row.values.len() + 1);
            record.push(row.label.clone());
            record.extend(row.values.iter().map(f64::to_string));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Export to `path` atomically.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let data = self.to_csv_string()?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Workbook
    // -----------------------------------------------------------------------

    /// Parse the first worksheet of a workbook.
    ///
    /// Banner, header and validation rules match [`Table::from_csv_reader`].
    /// Blank sheet rows are ignored like blank CSV lines, so a banner row
    /// left empty is already gone and nothing further is skipped.
    pub fn from_xlsx_path(path: &Path, skip_banner: bool) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => return Err(InputError::MissingIdentifier.into()),
        };
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        let records: Vec<Result<(usize, Vec<String>)>> = range
            .rows()
            .enumerate()
            .filter_map(|(i, cells)| {
                let mut cells: Vec<String> = cells.iter().map(cell_text).collect();
                while cells.last().is_some_and(String::is_empty) {
                    cells.pop();
                }
                (!cells.is_empty()).then(|| Ok((first_row + i + 1, cells)))
            })
            .collect();
        Self::from_records(records, skip_banner && first_row == 0)
    }

    /// Serialize as a single-sheet workbook: header row, then one row per
    /// table row. Labels are written as text, features as numbers.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in self.columns.iter().enumerate() {
            let (r, c) = sheet_cell(0, col)?;
            sheet.write_string(r, c, name.as_str())?;
        }
        for (i, row) in self.rows.iter().enumerate() {
            let (r, c) = sheet_cell(i + 1, 0)?;
            sheet.write_string(r, c, row.label.as_str())?;
            for (j, value) in row.values.iter().enumerate() {
                let (r, c) = sheet_cell(i + 1, j + 1)?;
                sheet.write_number(r, c, *value)?;
            }
        }
        Ok(workbook.save_to_buffer()?)
    }

    /// Export to `path` atomically.
    pub fn save_xlsx(&self, path: &Path) -> Result<()> {
        let data = self.to_xlsx_bytes()?;
        crate::io::atomic_write(path, &data)
    }

    /// Export to `path` as a workbook or as CSV, depending on its extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        match TableFormat::from_path(path) {
            TableFormat::Csv => self.save_csv(path),
            TableFormat::Xlsx => self.save_xlsx(path),
        }
    }
}

// ---------------------------------------------------------------------------
// TableFormat
// ---------------------------------------------------------------------------

/// On-disk encoding of a table, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// `.xlsx` (any case) is a workbook; every other path is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }
}

fn parse_cell(line: usize, column: &str, cell: &str) -> std::result::Result<f64, InputError> {
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(InputError::InvalidCell {
            row: line,
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}

/// Text of a worksheet cell as the CSV reader would see it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn sheet_cell(row: usize, col: usize) -> Result<(RowNum, ColNum)> {
    match (RowNum::try_from(row), ColNum::try_from(col)) {
        (Ok(r), Ok(c)) => Ok((r, c)),
        _ => Err(XlsxError::RowColumnLimitError.into()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
