use crate::error::InputError;
use crate::table::Table;
use serde::Serialize;

/// Feature columns chosen for one adjustment request.
///
/// Keeps the caller's order; repeated names collapse to the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    columns: Vec<String>,
}

impl Selection {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for c in columns {
            let c = c.into();
            if !out.contains(&c) {
                out.push(c);
            }
        }
        Self { columns: out }
    }

    /// Every feature column of `table`.
    pub fn all_features(table: &Table) -> Self {
        Self::new(table.feature_columns().iter().cloned())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Check the selection against `table` and map it to value indices.
    pub fn resolve(&self, table: &Table) -> Result<Vec<usize>, InputError> {
        let identifier = table.identifier().ok_or(InputError::MissingIdentifier)?;
        if self.is_empty() {
            return Err(InputError::EmptySelection);
        }
        self.columns
            .iter()
            .map(|c| {
                if c == identifier {
                    return Err(InputError::IdentifierSelected(c.clone()));
                }
                table
                    .feature_index(c)
                    .ok_or_else(|| InputError::UnknownColumn(c.clone()))
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
