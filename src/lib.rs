//! Predecir - Offline Batch Inference for Fault-Prone Module Prediction
//!
//! Predecir scores held-out instances against pre-trained per-project
//! defect classifiers, reproducing the exact preprocessing pipeline the
//! models were trained with: select the instance's columns in the
//! authoritative feature order, rescale them with the fitted min-max
//! scaler, take the positive-class probability, and threshold it into a
//! fault-prone label.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       PREDECIR CORE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Resolver   →   Loaders    →   Provisioner  →   Pipeline    │
//! │  (keys)         (CSV data)     (scaler)         (predict)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use predecir::batch::{self, BatchConfig, BatchEntry};
//! use predecir::project::ArtifactLayout;
//!
//! let config = BatchConfig {
//!     entries: vec![BatchEntry::new("RF", "cattle-ops/terraform-aws-gitlab-runner")],
//!     instance_index: 18,
//!     layout: ArtifactLayout::default(),
//!     show_progress: true,
//! };
//!
//! let report = batch::run(&config);
//! assert!(report.all_scored());
//! ```
//!
//! # Modules
//!
//! - [`project`] - Project identity keys and artifact locators
//! - [`dataset`] - Dataset split loading and row filtering
//! - [`features`] - Ordered feature-list store access
//! - [`model`] - Opaque classifier capability and persisted artifacts
//! - [`scaling`] - Min-max scaling and the keyed scaler store
//! - [`inference`] - Single-instance scoring pipeline
//! - [`batch`] - Driver over configured (algorithm, project) entries

// Note: Lint configuration is in Cargo.toml [lints]
#![forbid(unsafe_code)]

pub mod batch;
pub mod dataset;
pub mod error;
pub mod features;
pub mod inference;
pub mod model;
pub mod project;
pub mod scaling;

pub use error::{Error, Result};
