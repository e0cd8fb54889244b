//! Single-instance inference pipeline
//!
//! Reproduces the training-time preprocessing exactly: select the
//! instance's columns by name in the authoritative feature order, scale
//! the raw values with the fitted scaler, ask the classifier for the
//! positive-class probability, and threshold it into a binary label.
//!
//! The pipeline is a pure function of its inputs: no side effects, no
//! internal randomness, no global state.

use serde::Serialize;

use crate::dataset::Instance;
use crate::model::Classifier;
use crate::scaling::MinMaxScaler;
use crate::Result;

/// Decision threshold on the positive-class probability.
///
/// A probability greater than or equal to this value labels the
/// instance fault-prone. Fixed policy, not a tunable.
pub const FAULT_PRONE_THRESHOLD: f64 = 0.5;

/// Outcome of scoring one instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Positive-class probability, in [0, 1]
    pub probability: f64,
    /// Thresholded binary label, 1 = fault-prone
    pub label: u8,
}

/// Score one raw instance against a trained classifier.
///
/// The stored column order of `instance` is irrelevant: columns are
/// re-selected by name into `feature_order` before scaling, so only
/// that order reaches the scaler and model.
///
/// # Errors
///
/// Returns [`Error::FeatureMismatch`](crate::Error::FeatureMismatch) if
/// any name in `feature_order` is absent from the instance — a value is
/// never silently defaulted — and
/// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) if the
/// scaler's fitted dimensionality disagrees with the feature count.
pub fn predict_on_instance(
    instance: &Instance,
    scaler: &MinMaxScaler,
    model: &dyn Classifier,
    feature_order: &[String],
) -> Result<Prediction> {
    let raw: Vec<f64> = feature_order
        .iter()
        .map(|name| instance.numeric(name))
        .collect::<Result<_>>()?;

    let scaled = scaler.transform(&raw)?;
    let probability = model.predict_proba(&scaled);
    let label = u8::from(probability >= FAULT_PRONE_THRESHOLD);

    Ok(Prediction { probability, label })
}
