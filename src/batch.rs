//! Batch driver over configured (algorithm, project) entries
//!
//! Wires the resolver, loaders, scaler provisioner, and inference
//! pipeline together for each configured entry, strictly in list
//! order, single-threaded. Entries are independent: one entry's
//! artifact or shape failure is recorded in its report and the run
//! continues with the remaining entries.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::dataset::{Dataset, Split, TARGET_COLUMN};
use crate::features::read_features;
use crate::inference::{predict_on_instance, Prediction};
use crate::model::LinearModel;
use crate::project::{ArtifactLayout, ProjectKeys};
use crate::scaling::{fit_from_training, get_or_create, FsScalerStore, ScalerKey, ScalerStore};
use crate::Result;

/// One configured scoring target
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// Algorithm the classifier was trained with (e.g. `RF`)
    pub algorithm: String,
    /// Qualified `org/repo` project identity
    pub project: String,
    /// Training iteration the artifacts belong to
    pub iteration: u32,
}

impl BatchEntry {
    /// Create an entry for iteration 0, the published artifact set
    #[must_use]
    pub fn new(algorithm: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            project: project.into(),
            iteration: 0,
        }
    }

    /// Select a different training iteration's artifacts
    #[must_use]
    pub fn with_iteration(mut self, iteration: u32) -> Self {
        self.iteration = iteration;
        self
    }
}

/// Configuration for one batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Entries to score, processed strictly in list order
    pub entries: Vec<BatchEntry>,
    /// Row index of the test-split instance to score for every entry
    pub instance_index: usize,
    /// Artifact store layout
    pub layout: ArtifactLayout,
    /// Show a progress bar over the entry list
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            entries: vec![BatchEntry::new(
                "RF",
                "cattle-ops/terraform-aws-gitlab-runner",
            )],
            instance_index: 18,
            layout: ArtifactLayout::default(),
            show_progress: true,
        }
    }
}

/// Classification verdict derived solely from the thresholded label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// Label 1: the instance is predicted fault-prone
    DefectFlagged,
    /// Label 0: the instance is predicted clean
    Clean,
}

impl Verdict {
    /// Derive the verdict from a binary label
    #[must_use]
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::DefectFlagged
        } else {
            Self::Clean
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DefectFlagged => write!(f, "defect-flagged"),
            Self::Clean => write!(f, "clean"),
        }
    }
}

/// Result of one entry
#[derive(Debug, Clone, Serialize)]
pub enum EntryOutcome {
    /// The pipeline ran to completion
    Scored {
        /// Probability and thresholded label
        prediction: Prediction,
        /// Ground-truth `fault_prone` label at the scored index
        actual_label: u8,
        /// Verdict derived from the predicted label
        verdict: Verdict,
    },
    /// An artifact, shape, or data error aborted this entry
    Failed {
        /// Rendered error message
        error: String,
    },
}

/// Per-entry report row
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    /// Algorithm from the entry
    pub algorithm: String,
    /// Project identity from the entry
    pub project: String,
    /// What happened
    pub outcome: EntryOutcome,
}

/// Results of a whole batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// One report per configured entry, in list order
    pub entries: Vec<EntryReport>,
}

impl BatchReport {
    /// Number of entries that failed
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::Failed { .. }))
            .count()
    }

    /// Whether every entry was scored
    #[must_use]
    pub fn all_scored(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Run the batch driver over every configured entry.
///
/// Per-entry failures are captured in the report; the run itself never
/// aborts early.
#[must_use]
pub fn run(config: &BatchConfig) -> BatchReport {
    let store = FsScalerStore::new(config.layout.clone());
    run_with_store(config, &store)
}

/// Run the batch driver against an explicit scaler store.
///
/// The store seam exists so tests can observe provisioning with an
/// in-memory double.
pub fn run_with_store(config: &BatchConfig, store: &dyn ScalerStore) -> BatchReport {
    let progress = if config.show_progress {
        let pb = ProgressBar::new(config.entries.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut entries = Vec::with_capacity(config.entries.len());
    for entry in &config.entries {
        progress.set_message(format!("{} {}", entry.algorithm, entry.project));
        let outcome = match run_entry(&config.layout, store, entry, config.instance_index) {
            Ok(outcome) => outcome,
            Err(e) => EntryOutcome::Failed {
                error: e.to_string(),
            },
        };
        entries.push(EntryReport {
            algorithm: entry.algorithm.clone(),
            project: entry.project.clone(),
            outcome,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    BatchReport { entries }
}

fn run_entry(
    layout: &ArtifactLayout,
    store: &dyn ScalerStore,
    entry: &BatchEntry,
    instance_index: usize,
) -> Result<EntryOutcome> {
    let keys = ProjectKeys::derive(&entry.project);

    let test_set = Dataset::load_split(layout, &keys.dataset_key, Split::Test)?;
    let model = LinearModel::load(layout, &keys.model_key, &entry.algorithm, entry.iteration)?;
    let feature_order = read_features(layout, &entry.algorithm, entry.iteration)?;

    let scaler_key = ScalerKey::new(keys.model_key.clone(), entry.algorithm.clone());
    let scaler = get_or_create(store, &scaler_key, || {
        fit_from_training(layout, &keys.dataset_key, &feature_order)
    })?;

    let instance = test_set.instance(instance_index)?;
    let actual = test_set.numeric_at(TARGET_COLUMN, instance_index)?;
    let actual_label = u8::from(actual != 0.0);

    let prediction = predict_on_instance(&instance, &scaler, &model, &feature_order)?;
    let verdict = Verdict::from_label(prediction.label);

    Ok(EntryOutcome::Scored {
        prediction,
        actual_label,
        verdict,
    })
}
