//! Project identity and artifact resolution
//!
//! A project is identified by its qualified `org/repo` name. Three
//! canonical keys are derived from that one identity by pure string
//! substitution and used to namespace every on-disk artifact:
//!
//! | Key            | Transform          | Used for                    |
//! |----------------|--------------------|-----------------------------|
//! | `dataset_key`  | `/` → `__`         | historical split CSV files  |
//! | `model_key`    | `/` → `_`          | model and scaler artifacts  |
//! | `local_folder` | `/` → path sep     | per-project working folders |
//!
//! Path construction here is total: any input string yields a
//! syntactically valid locator. Existence is never checked at this
//! layer; a missing file surfaces from the consuming read as
//! [`Error::ArtifactNotFound`](crate::Error::ArtifactNotFound).

use std::path::{PathBuf, MAIN_SEPARATOR_STR};

use crate::dataset::Split;

/// Canonical lookup keys derived from one project identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectKeys {
    /// Double-underscore-joined key for dataset split files
    pub dataset_key: String,
    /// Single-underscore-joined key for model and scaler artifacts
    pub model_key: String,
    /// Path-delimited key for per-project local folders
    pub local_folder: String,
}

impl ProjectKeys {
    /// Derive all three canonical keys from a qualified `org/repo` name.
    ///
    /// Pure and total: no I/O, no validation.
    #[must_use]
    pub fn derive(project_full_name: &str) -> Self {
        Self {
            dataset_key: project_full_name.replace('/', "__"),
            model_key: project_full_name.replace('/', "_"),
            local_folder: project_full_name.replace('/', MAIN_SEPARATOR_STR),
        }
    }
}

/// On-disk layout of the three artifact stores
///
/// Derives deterministic file locators for classifiers, scalers,
/// feature lists, and dataset splits.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    /// Directory of historical train/test split CSV files
    pub historical_dir: PathBuf,
    /// Directory of serialized model and scaler artifacts
    pub models_dir: PathBuf,
    /// Directory of feature-importance CSV files
    pub features_dir: PathBuf,
}

impl ArtifactLayout {
    /// Create a layout rooted at the given store directories
    #[must_use]
    pub fn new(
        historical_dir: impl Into<PathBuf>,
        models_dir: impl Into<PathBuf>,
        features_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            historical_dir: historical_dir.into(),
            models_dir: models_dir.into(),
            features_dir: features_dir.into(),
        }
    }

    /// Locator for a trained classifier artifact
    #[must_use]
    pub fn model_path(&self, model_key: &str, algorithm: &str, iteration: u32) -> PathBuf {
        self.models_dir
            .join(format!("{model_key}_{algorithm}__iter_{iteration}_.json"))
    }

    /// Locator for a fitted scaler artifact
    #[must_use]
    pub fn scaler_path(&self, model_key: &str, algorithm: &str) -> PathBuf {
        self.models_dir
            .join(format!("scaler_{model_key}_{algorithm}.json"))
    }

    /// Locator for an ordered feature-list CSV
    #[must_use]
    pub fn features_path(&self, algorithm: &str, iteration: u32) -> PathBuf {
        self.features_dir
            .join(format!("feature_importances_{algorithm}_iter_{iteration}.csv"))
    }

    /// Locator for a dataset split CSV
    #[must_use]
    pub fn split_path(&self, dataset_key: &str, split: Split) -> PathBuf {
        self.historical_dir.join(format!("{dataset_key}_{split}.csv"))
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::new("./historical_data", "./saved_models", "./features")
    }
}
