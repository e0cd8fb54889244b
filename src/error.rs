//! Error types for Predecir
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Result type alias for Predecir operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during Predecir operations
#[derive(Error, Debug)]
pub enum Error {
    /// Requested dataset, model, scaler, or feature-list file is absent
    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Dataset is missing a required column or holds a non-numeric cell
    #[error("malformed dataset: {0}")]
    MalformedDataset(String),

    /// Feature order references a column absent from the instance
    #[error("feature mismatch: {0}")]
    FeatureMismatch(String),

    /// Scaler dimensionality disagrees with the feature count
    #[error("scaler shape mismatch: fitted on {fitted} features, got {actual}")]
    ShapeMismatch {
        /// Number of features the scaler was fitted on
        fitted: usize,
        /// Number of features in the offending vector
        actual: usize,
    },

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}
