//! Dataset loading and row filtering
//!
//! Historical train/test splits are CSV files named
//! `{dataset_key}_{split}.csv` under the historical-data directory.
//! Every split carries a boolean exclusion-flag column marking rows to
//! drop (modules not written in the primary language) and a binary
//! `fault_prone` target column, plus arbitrary feature columns.
//!
//! The loader filters excluded rows immediately after the read and
//! never mutates the table afterwards: no row or column is renamed,
//! reordered, or coerced beyond the CSV cell text.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::project::ArtifactLayout;
use crate::{Error, Result};

/// Column flagging rows to exclude from every split (kept rows hold 0)
pub const EXCLUSION_FLAG_COLUMN: &str = "isTerraform";

/// Binary ground-truth column present in every split
pub const TARGET_COLUMN: &str = "fault_prone";

/// Dataset split selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    /// Training split, the only split scalers may be fitted on
    Train,
    /// Held-out test split used for scoring
    Test,
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// A filtered, read-only tabular dataset split
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Load the split file for a dataset key and drop excluded rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArtifactNotFound`] if the split file is absent,
    /// [`Error::MalformedDataset`] if the exclusion-flag column is
    /// missing or unreadable.
    pub fn load_split(layout: &ArtifactLayout, dataset_key: &str, split: Split) -> Result<Self> {
        let path = layout.split_path(dataset_key, split);
        let file = open_artifact(&path)?;
        Self::from_reader(file)
    }

    /// Parse a split from any CSV reader and drop excluded rows
    pub fn from_reader(reader: impl io::Read) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| Error::MalformedDataset(format!("unreadable header row: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let flag_index = headers
            .iter()
            .position(|h| h == EXCLUSION_FLAG_COLUMN)
            .ok_or_else(|| {
                Error::MalformedDataset(format!(
                    "missing exclusion flag column '{EXCLUSION_FLAG_COLUMN}'"
                ))
            })?;

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record =
                record.map_err(|e| Error::MalformedDataset(format!("unreadable row: {e}")))?;
            let cells: Vec<String> = record.iter().map(str::to_string).collect();
            let flag = parse_cell(&cells, flag_index, EXCLUSION_FLAG_COLUMN)?;
            if flag == 0.0 {
                rows.push(cells);
            }
        }

        Ok(Self { headers, rows })
    }

    /// Number of rows remaining after the exclusion filter
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the filtered split holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column headers in file order
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Extract the row at `index` as an [`Instance`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDataset`] if `index` is out of range
    /// for the filtered split.
    pub fn instance(&self, index: usize) -> Result<Instance> {
        let cells = self.rows.get(index).ok_or_else(|| {
            Error::MalformedDataset(format!(
                "instance index {index} out of range ({} rows after filtering)",
                self.rows.len()
            ))
        })?;
        Ok(Instance {
            columns: self.headers.clone(),
            cells: cells.clone(),
        })
    }

    /// Numeric value of one cell, addressed by column name and row index
    pub fn numeric_at(&self, column: &str, index: usize) -> Result<f64> {
        let col = self.column_index(column).ok_or_else(|| {
            Error::MalformedDataset(format!("missing required column '{column}'"))
        })?;
        let cells = self.rows.get(index).ok_or_else(|| {
            Error::MalformedDataset(format!(
                "row index {index} out of range ({} rows after filtering)",
                self.rows.len()
            ))
        })?;
        parse_cell(cells, col, column)
    }

    /// Project the split onto `features`, row-major, in feature order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureMismatch`] if any feature name is absent
    /// from the split, [`Error::MalformedDataset`] on non-numeric cells.
    pub fn feature_matrix(&self, features: &[String]) -> Result<Vec<Vec<f64>>> {
        let indices: Vec<usize> = features
            .iter()
            .map(|name| {
                self.column_index(name).ok_or_else(|| {
                    Error::FeatureMismatch(format!("column '{name}' not present in dataset"))
                })
            })
            .collect::<Result<_>>()?;

        self.rows
            .iter()
            .map(|cells| {
                indices
                    .iter()
                    .zip(features)
                    .map(|(&col, name)| parse_cell(cells, col, name))
                    .collect()
            })
            .collect()
    }

    /// Parse an entire column as numeric values
    pub fn numeric_column(&self, column: &str) -> Result<Vec<f64>> {
        let col = self.column_index(column).ok_or_else(|| {
            Error::MalformedDataset(format!("missing required column '{column}'"))
        })?;
        self.rows
            .iter()
            .map(|cells| parse_cell(cells, col, column))
            .collect()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Split a dataset into the feature matrix `X` and target vector `y`.
///
/// Mirrors the preprocessing applied at training time. `y` is returned
/// even when the caller only needs `X`, keeping the signature aligned
/// with the training pipeline.
pub fn preprocess(
    dataset: &Dataset,
    features: &[String],
    target: &str,
) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let x = dataset.feature_matrix(features)?;
    let y = dataset.numeric_column(target)?;
    Ok((x, y))
}

/// One raw row, viewed as ordered (column, cell) pairs
///
/// Ephemeral: constructed per prediction and discarded after. Lookup is
/// by column name, so the stored column order carries no meaning.
#[derive(Debug, Clone)]
pub struct Instance {
    columns: Vec<String>,
    cells: Vec<String>,
}

impl Instance {
    /// Build an instance from parallel column and cell vectors
    #[must_use]
    pub fn from_columns(columns: Vec<String>, cells: Vec<String>) -> Self {
        Self { columns, cells }
    }

    /// Raw cell text for a column, if present
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.cells[i].as_str())
    }

    /// Numeric value for a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureMismatch`] if the column is absent,
    /// [`Error::MalformedDataset`] if the cell is not numeric.
    pub fn numeric(&self, column: &str) -> Result<f64> {
        let cell = self.get(column).ok_or_else(|| {
            Error::FeatureMismatch(format!("column '{column}' not present in instance"))
        })?;
        cell.trim().parse::<f64>().map_err(|_| {
            Error::MalformedDataset(format!("non-numeric cell '{cell}' in column '{column}'"))
        })
    }
}

/// Open an artifact file, mapping absence to [`Error::ArtifactNotFound`]
pub(crate) fn open_artifact(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::ArtifactNotFound(path.display().to_string())
        } else {
            Error::Io(e)
        }
    })
}

fn parse_cell(cells: &[String], index: usize, column: &str) -> Result<f64> {
    let cell = cells.get(index).ok_or_else(|| {
        Error::MalformedDataset(format!("short row: no cell for column '{column}'"))
    })?;
    cell.trim().parse::<f64>().map_err(|_| {
        Error::MalformedDataset(format!("non-numeric cell '{cell}' in column '{column}'"))
    })
}
