//! Min-max feature scaling and the keyed scaler store
//!
//! A scaler is owned by one (model key, algorithm) pair. Provisioning
//! is memoized lazy initialization over an artifact store: load the
//! persisted scaler if one exists (the dominant path in steady-state
//! use), otherwise fit a fresh one from the training split, persist it,
//! and return it. Once persisted, the fit branch never runs again for
//! that key until the artifact is deleted externally.
//!
//! Fitting must only ever see the **train** split; scaling the test
//! split with ranges observed on itself would leak information.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::dataset::{open_artifact, preprocess, Dataset, Split, TARGET_COLUMN};
use crate::project::ArtifactLayout;
use crate::{Error, Result};

/// Per-feature linear rescaling to the fitted [min, max] range
///
/// `transform` maps each value to `(x - min) / (max - min)`. A feature
/// whose fitted range is degenerate (`max == min`) keeps a unit
/// divisor, matching the behavior of the scaler the models were
/// trained against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    /// Artifact format version
    pub version: String,
    /// Per-feature minimum observed at fit time
    pub data_min: Vec<f64>,
    /// Per-feature maximum observed at fit time
    pub data_max: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit a scaler on a row-major training matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDataset`] on an empty matrix and
    /// [`Error::ShapeMismatch`] on ragged rows.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| Error::MalformedDataset("cannot fit scaler on empty matrix".into()))?;
        let width = first.len();

        let mut data_min = first.clone();
        let mut data_max = first.clone();
        for row in &rows[1..] {
            if row.len() != width {
                return Err(Error::ShapeMismatch {
                    fitted: width,
                    actual: row.len(),
                });
            }
            for (i, &value) in row.iter().enumerate() {
                data_min[i] = data_min[i].min(value);
                data_max[i] = data_max[i].max(value);
            }
        }

        Ok(Self {
            version: "1".to_string(),
            data_min,
            data_max,
        })
    }

    /// Number of features the scaler was fitted on
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.data_min.len()
    }

    /// Rescale one raw feature vector into the fitted range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the vector length disagrees
    /// with the fitted feature count.
    pub fn transform(&self, raw: &[f64]) -> Result<Vec<f64>> {
        if raw.len() != self.n_features() {
            return Err(Error::ShapeMismatch {
                fitted: self.n_features(),
                actual: raw.len(),
            });
        }

        Ok(raw
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let range = self.data_max[i] - self.data_min[i];
                let divisor = if range == 0.0 { 1.0 } else { range };
                (value - self.data_min[i]) / divisor
            })
            .collect())
    }

    /// Load a scaler artifact from a JSON file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let mut json = String::new();
        open_artifact(path)?.read_to_string(&mut json)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Serialization(format!("corrupt scaler artifact: {e}")))
    }

    /// Save the scaler to a JSON artifact file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("scaler serialization failed: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Identity of one scaler artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScalerKey {
    /// Single-underscore project model key
    pub model_key: String,
    /// Algorithm name the paired classifier was trained with
    pub algorithm: String,
}

impl ScalerKey {
    /// Create a key for a (model key, algorithm) pair
    #[must_use]
    pub fn new(model_key: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            model_key: model_key.into(),
            algorithm: algorithm.into(),
        }
    }
}

impl std::fmt::Display for ScalerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.model_key, self.algorithm)
    }
}

/// Keyed artifact store for fitted scalers
///
/// Decoupled from filesystem specifics so provisioning can be tested
/// against an in-memory double.
pub trait ScalerStore {
    /// Load the persisted scaler for `key`, if one exists
    fn load(&self, key: &ScalerKey) -> Result<Option<MinMaxScaler>>;

    /// Persist a fitted scaler under `key`
    fn save(&self, key: &ScalerKey, scaler: &MinMaxScaler) -> Result<()>;
}

/// Return the stored scaler for `key`, or fit, persist, and return one.
///
/// The producer runs at most once per key's artifact lifetime; every
/// later call takes the load path.
pub fn get_or_create<F>(
    store: &dyn ScalerStore,
    key: &ScalerKey,
    producer: F,
) -> Result<MinMaxScaler>
where
    F: FnOnce() -> Result<MinMaxScaler>,
{
    if let Some(scaler) = store.load(key)? {
        return Ok(scaler);
    }
    let scaler = producer()?;
    store.save(key, &scaler)?;
    Ok(scaler)
}

/// Fit a scaler from a project's training split, projected onto `features`.
///
/// Only the train split is ever read here. The target column is parsed
/// alongside the matrix for parity with the training pipeline, though
/// fitting needs only `X`.
pub fn fit_from_training(
    layout: &ArtifactLayout,
    dataset_key: &str,
    features: &[String],
) -> Result<MinMaxScaler> {
    let train = Dataset::load_split(layout, dataset_key, Split::Train)?;
    let (x, _y) = preprocess(&train, features, TARGET_COLUMN)?;
    MinMaxScaler::fit(&x)
}

/// Scaler store backed by the model-artifact directory
#[derive(Debug, Clone)]
pub struct FsScalerStore {
    layout: ArtifactLayout,
}

impl FsScalerStore {
    /// Create a store over the layout's model-artifact directory
    #[must_use]
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }
}

impl ScalerStore for FsScalerStore {
    fn load(&self, key: &ScalerKey) -> Result<Option<MinMaxScaler>> {
        let path = self.layout.scaler_path(&key.model_key, &key.algorithm);
        if !path.exists() {
            return Ok(None);
        }
        MinMaxScaler::load_from(&path).map(Some)
    }

    fn save(&self, key: &ScalerKey, scaler: &MinMaxScaler) -> Result<()> {
        std::fs::create_dir_all(&self.layout.models_dir)?;
        let path = self.layout.scaler_path(&key.model_key, &key.algorithm);
        scaler.save(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory store double counting producer invocations via its map
    #[derive(Default)]
    struct MemoryStore {
        scalers: RefCell<HashMap<ScalerKey, MinMaxScaler>>,
    }

    impl ScalerStore for MemoryStore {
        fn load(&self, key: &ScalerKey) -> Result<Option<MinMaxScaler>> {
            Ok(self.scalers.borrow().get(key).cloned())
        }

        fn save(&self, key: &ScalerKey, scaler: &MinMaxScaler) -> Result<()> {
            self.scalers.borrow_mut().insert(key.clone(), scaler.clone());
            Ok(())
        }
    }

    fn fitted_ab_scaler() -> MinMaxScaler {
        MinMaxScaler::fit(&[vec![0.0, 0.0], vec![10.0, 20.0]]).unwrap()
    }

    #[test]
    fn test_fit_records_per_feature_bounds() {
        let scaler = MinMaxScaler::fit(&[
            vec![2.0, 5.0],
            vec![8.0, 1.0],
            vec![4.0, 3.0],
        ])
        .unwrap();
        assert_eq!(scaler.data_min, vec![2.0, 1.0]);
        assert_eq!(scaler.data_max, vec![8.0, 5.0]);
    }

    #[test]
    fn test_transform_maps_into_fitted_range() {
        let scaler = fitted_ab_scaler();
        let scaled = scaler.transform(&[4.0, 10.0]).unwrap();
        assert!((scaled[0] - 0.4).abs() < 1e-12);
        assert!((scaled[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_transform_degenerate_range_keeps_unit_divisor() {
        let scaler = MinMaxScaler::fit(&[vec![5.0], vec![5.0]]).unwrap();
        assert!((scaler.transform(&[5.0]).unwrap()[0]).abs() < f64::EPSILON);
        assert!((scaler.transform(&[7.0]).unwrap()[0] - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transform_shape_mismatch() {
        let scaler = fitted_ab_scaler();
        let err = scaler.transform(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                fitted: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_fit_empty_matrix_fails() {
        let err = MinMaxScaler::fit(&[]).unwrap_err();
        assert!(matches!(err, Error::MalformedDataset(_)));
    }

    #[test]
    fn test_fit_ragged_rows_fail() {
        let err = MinMaxScaler::fit(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");

        let scaler = fitted_ab_scaler();
        scaler.save(&path).unwrap();

        let loaded = MinMaxScaler::load_from(&path).unwrap();
        assert_eq!(loaded.data_min, scaler.data_min);
        assert_eq!(loaded.data_max, scaler.data_max);
    }

    #[test]
    fn test_get_or_create_fits_once() {
        let store = MemoryStore::default();
        let key = ScalerKey::new("org_repo", "RF");
        let fit_count = RefCell::new(0_u32);

        let produce = || {
            *fit_count.borrow_mut() += 1;
            MinMaxScaler::fit(&[vec![0.0], vec![10.0]])
        };

        let first = get_or_create(&store, &key, produce).unwrap();
        assert_eq!(*fit_count.borrow(), 1);

        // Second call must load the persisted artifact, not refit
        let second = get_or_create(&store, &key, || {
            *fit_count.borrow_mut() += 1;
            MinMaxScaler::fit(&[vec![-99.0], vec![99.0]])
        })
        .unwrap();
        assert_eq!(*fit_count.borrow(), 1);
        assert_eq!(second.data_min, first.data_min);
        assert_eq!(second.data_max, first.data_max);
    }

    #[test]
    fn test_get_or_create_distinct_keys_fit_separately() {
        let store = MemoryStore::default();
        let rf = ScalerKey::new("org_repo", "RF");
        let lr = ScalerKey::new("org_repo", "LR");

        get_or_create(&store, &rf, || MinMaxScaler::fit(&[vec![0.0], vec![1.0]])).unwrap();
        let other =
            get_or_create(&store, &lr, || MinMaxScaler::fit(&[vec![0.0], vec![4.0]])).unwrap();
        assert_eq!(other.data_max, vec![4.0]);
    }

    #[test]
    fn test_get_or_create_producer_error_propagates() {
        let store = MemoryStore::default();
        let key = ScalerKey::new("org_repo", "RF");

        let result = get_or_create(&store, &key, || {
            Err(Error::MalformedDataset("no rows".into()))
        });
        assert!(result.is_err());
        // A failed fit must not persist anything
        assert!(store.load(&key).unwrap().is_none());
    }

    #[test]
    fn test_fs_store_load_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path(), dir.path().join("models"), dir.path());
        let store = FsScalerStore::new(layout);

        let key = ScalerKey::new("org_repo", "RF");
        assert!(store.load(&key).unwrap().is_none());
    }

    #[test]
    fn test_fs_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path(), dir.path().join("models"), dir.path());
        let store = FsScalerStore::new(layout.clone());

        let key = ScalerKey::new("org_repo", "RF");
        let scaler = fitted_ab_scaler();
        store.save(&key, &scaler).unwrap();

        assert!(layout.scaler_path("org_repo", "RF").exists());
        let loaded = store.load(&key).unwrap().unwrap();
        assert_eq!(loaded.data_min, scaler.data_min);
    }

    #[test]
    fn test_scaler_key_display() {
        let key = ScalerKey::new("org_repo", "RF");
        assert_eq!(key.to_string(), "org_repo_RF");
    }
}
