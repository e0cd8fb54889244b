//! Feature list store access
//!
//! Each (algorithm, iteration) pair has a feature-importance CSV whose
//! `Feature` column gives the ordered names of the columns the model
//! and scaler were fitted on. The file order is authoritative.

use std::path::Path;

use crate::dataset::open_artifact;
use crate::project::ArtifactLayout;
use crate::{Error, Result};

/// Header of the column holding the ordered feature names
const FEATURE_COLUMN: &str = "Feature";

/// Read the ordered feature list for an (algorithm, iteration) pair.
///
/// # Errors
///
/// Returns [`Error::ArtifactNotFound`] if the list file is absent,
/// [`Error::MalformedDataset`] if it lacks a `Feature` column.
pub fn read_features(
    layout: &ArtifactLayout,
    algorithm: &str,
    iteration: u32,
) -> Result<Vec<String>> {
    let path = layout.features_path(algorithm, iteration);
    let file = open_artifact(&path)?;
    read_feature_column(file, &path)
}

fn read_feature_column(reader: impl std::io::Read, path: &Path) -> Result<Vec<String>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let feature_index = csv_reader
        .headers()
        .map_err(|e| Error::MalformedDataset(format!("unreadable header row: {e}")))?
        .iter()
        .position(|h| h == FEATURE_COLUMN)
        .ok_or_else(|| {
            Error::MalformedDataset(format!(
                "missing '{FEATURE_COLUMN}' column in {}",
                path.display()
            ))
        })?;

    let mut features = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| Error::MalformedDataset(format!("unreadable row: {e}")))?;
        let name = record.get(feature_index).ok_or_else(|| {
            Error::MalformedDataset(format!("short row in {}", path.display()))
        })?;
        features.push(name.to_string());
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_read_feature_column_preserves_order() {
        let csv = "Feature,Importance\nchurn,0.4\nloc,0.3\nage,0.1\n";
        let features =
            read_feature_column(csv.as_bytes(), &PathBuf::from("features.csv")).unwrap();
        assert_eq!(features, vec!["churn", "loc", "age"]);
    }

    #[test]
    fn test_feature_column_anywhere_in_header() {
        let csv = "Importance,Feature\n0.4,churn\n0.3,loc\n";
        let features =
            read_feature_column(csv.as_bytes(), &PathBuf::from("features.csv")).unwrap();
        assert_eq!(features, vec!["churn", "loc"]);
    }

    #[test]
    fn test_missing_feature_column() {
        let csv = "Name,Importance\nchurn,0.4\n";
        let err = read_feature_column(csv.as_bytes(), &PathBuf::from("features.csv")).unwrap_err();
        assert!(matches!(err, Error::MalformedDataset(_)));
    }

    #[test]
    fn test_read_features_missing_file() {
        let layout = ArtifactLayout::new("/nonexistent", "/nonexistent", "/nonexistent");
        let err = read_features(&layout, "RF", 0).unwrap_err();
        assert!(matches!(err, Error::ArtifactNotFound(_)));
    }
}
