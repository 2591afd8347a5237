//! Core data types for the keystroke sensing pipeline.
//!
//! This module defines the values that flow between pipeline stages:
//! raw accelerometer triples in, averaged samples and history snapshots
//! for rendering, feature vectors for the classifier, and the events the
//! pipeline reports back to its caller.
//!
//! Design principle: if a concept crosses a module boundary it gets a type.
//! Feature vectors in particular are never passed around as bare `Vec<f64>`,
//! so the "stub" (motion only) and "full" (motion + character code) forms
//! cannot be confused.

use serde::{Deserialize, Serialize};

use crate::error::SensingResult;

/// A single raw accelerometer reading.
///
/// Ephemeral: consumed by the signal buffer as soon as it arrives. Values
/// are unconstrained reals in whatever unit the motion source reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RawSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the reading.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl From<[f64; 3]> for RawSample {
    fn from(accel: [f64; 3]) -> Self {
        Self::new(accel[0], accel[1], accel[2])
    }
}

/// Per-axis mean of one full batch of raw samples, plus its magnitude.
///
/// Immutable once created: the magnitude is always derived from the three
/// means, so the fields are only exposed through accessors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AveragedSample {
    avg_x: f64,
    avg_y: f64,
    avg_z: f64,
    magnitude: f64,
}

impl AveragedSample {
    /// Build an averaged sample from per-axis means.
    pub fn from_means(avg_x: f64, avg_y: f64, avg_z: f64) -> Self {
        Self {
            avg_x,
            avg_y,
            avg_z,
            magnitude: (avg_x * avg_x + avg_y * avg_y + avg_z * avg_z).sqrt(),
        }
    }

    pub fn avg_x(&self) -> f64 {
        self.avg_x
    }

    pub fn avg_y(&self) -> f64 {
        self.avg_y
    }

    pub fn avg_z(&self) -> f64 {
        self.avg_z
    }

    /// sqrt(avg_x² + avg_y² + avg_z²).
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }
}

/// Read-only copy of the rolling history, oldest sample first.
///
/// This is what the rendering collaborator receives on every averaged
/// sample. All four sequences always have the same length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub magnitude: Vec<f64>,
}

impl HistorySnapshot {
    /// Number of averaged samples in the snapshot.
    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }

    /// Single-line JSON rendering for external renderers.
    pub fn to_json_line(&self) -> SensingResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Motion part of a feature vector: the three per-axis history blocks.
///
/// Layout is `[x_0..x_{H-1}, y_0..y_{H-1}, z_0..z_{H-1}]`, oldest first,
/// each block exactly `H` long (leading slots zero-padded while the history
/// is still filling).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStub {
    values: Vec<f64>,
}

impl FeatureStub {
    /// Assemble a stub from three equally sized axis blocks.
    pub fn from_axes(x: &[f64], y: &[f64], z: &[f64]) -> Self {
        debug_assert!(x.len() == y.len() && y.len() == z.len());
        let mut values = Vec::with_capacity(x.len() * 3);
        values.extend_from_slice(x);
        values.extend_from_slice(y);
        values.extend_from_slice(z);
        Self { values }
    }

    /// Append a character code, producing the full classifier input.
    pub fn with_code(&self, code: usize) -> FeatureVector {
        let mut values = Vec::with_capacity(self.values.len() + 1);
        values.extend_from_slice(&self.values);
        values.push(code as f64);
        FeatureVector { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fixed-length classifier input: motion stub plus one trailing character code.
///
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The trailing character code.
    pub fn code(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// One labeled example accumulated while in training mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingCase {
    /// Motion history at the key event, without character code.
    pub features: FeatureStub,
    /// The character the user was expected to type.
    pub label: char,
    /// Ideal classifier output for (features, label).
    pub ideal: f64,
}

/// Summary of one completed training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Iterations actually run (never more than the configured cap).
    pub iterations: usize,
    /// Training error measured after the last iteration.
    pub error: f64,
    /// Whether the error reached the target before the cap.
    pub converged: bool,
    /// Number of training cases the run covered.
    pub cases: usize,
}

/// Lifecycle of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrainingPhase {
    /// No training case recorded yet.
    Idle,
    /// At least one case recorded, no run in flight.
    Collecting,
    /// A training run is in flight.
    Training,
}

/// Everything the pipeline reports to its collaborators, in occurrence order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PipelineEvent {
    /// A new averaged sample entered the history (render output).
    Sample(HistorySnapshot),

    /// A key event outside training mode, classified.
    KeyDetected {
        character: char,
        magnitude: f64,
        deviation: f64,
    },

    /// A key event in training mode was recorded as a training case.
    TrainingCaseRecorded {
        expected: char,
        cases: usize,
        /// True if a training run started for this case, false if it was
        /// queued behind a run already in flight.
        started: bool,
        /// Iterations and error of the latest finished training run, if
        /// any has finished yet.
        last_report: Option<TrainingReport>,
    },

    /// A training run finished and its model is now used for inference.
    TrainingFinished(TrainingReport),
}
