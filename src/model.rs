//! Trained classifier artifacts
//!
//! The inference pipeline treats a classifier as an opaque capability
//! exposing only [`Classifier::predict_proba`]. The persisted artifact
//! shipped with this crate is a [`LinearModel`] (weighted sum through a
//! sigmoid), serialized as versioned JSON; any binary probabilistic
//! classifier meeting the trait contract can be substituted.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::open_artifact;
use crate::project::ArtifactLayout;
use crate::{Error, Result};

/// Binary probabilistic classifier capability
///
/// Implementations must be deterministic: identical inputs always yield
/// identical probabilities.
pub trait Classifier {
    /// Positive-class probability for a scaled feature vector, in [0, 1]
    fn predict_proba(&self, features: &[f64]) -> f64;
}

/// Serialized linear classifier state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    /// Artifact format version
    pub version: String,
    /// Per-feature weights, in feature-list order
    pub weights: Vec<f64>,
    /// Bias term
    pub bias: f64,
}

impl LinearModel {
    /// Create a model from raw weights and bias
    #[must_use]
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            version: "1".to_string(),
            weights,
            bias,
        }
    }

    /// Load a trained classifier artifact for (model key, algorithm, iteration).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArtifactNotFound`] if no artifact exists at the
    /// resolved locator, [`Error::Serialization`] on a corrupt one.
    pub fn load(
        layout: &ArtifactLayout,
        model_key: &str,
        algorithm: &str,
        iteration: u32,
    ) -> Result<Self> {
        let path = layout.model_path(model_key, algorithm, iteration);
        Self::load_from(&path)
    }

    /// Load a classifier artifact from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut json = String::new();
        open_artifact(path)?.read_to_string(&mut json)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Serialization(format!("corrupt model artifact: {e}")))
    }

    /// Save the model to a JSON artifact file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("model serialization failed: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Classifier for LinearModel {
    fn predict_proba(&self, features: &[f64]) -> f64 {
        let score: f64 = self.bias
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();

        // Sigmoid activation
        1.0 / (1.0 + (-score).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_proba_bounded() {
        let model = LinearModel::new(vec![5.0, -3.0], 0.5);
        for features in [[0.0, 0.0], [1.0, 1.0], [100.0, -100.0]] {
            let prob = model.predict_proba(&features);
            assert!((0.0..=1.0).contains(&prob));
        }
    }

    #[test]
    fn test_zero_weights_give_half() {
        let model = LinearModel::new(vec![0.0, 0.0], 0.0);
        let prob = model.predict_proba(&[3.0, 7.0]);
        assert!((prob - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_positive_score_above_half() {
        let model = LinearModel::new(vec![1.0], 0.0);
        assert!(model.predict_proba(&[2.0]) > 0.5);
        assert!(model.predict_proba(&[-2.0]) < 0.5);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let model = LinearModel::new(vec![0.25, -0.75], 0.1);
        model.save(&path).unwrap();

        let loaded = LinearModel::load_from(&path).unwrap();
        assert_eq!(loaded.version, "1");
        assert_eq!(loaded.weights, vec![0.25, -0.75]);
        assert!((loaded.bias - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_missing_artifact() {
        let layout = ArtifactLayout::new("/nonexistent", "/nonexistent", "/nonexistent");
        let err = LinearModel::load(&layout, "org_repo", "RF", 0).unwrap_err();
        assert!(matches!(err, Error::ArtifactNotFound(_)));
        assert!(err.to_string().contains("org_repo_RF__iter_0_.json"));
    }

    #[test]
    fn test_load_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "not json").unwrap();

        let err = LinearModel::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
