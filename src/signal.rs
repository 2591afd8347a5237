//! Signal aggregation: batch averaging and rolling history.
//!
//! This module provides the two stateful stages in front of key detection:
//! - [`SignalBuffer`] collects raw triples and emits one averaged sample per
//!   full batch (tumbling window, not sliding)
//! - [`SignalHistory`] keeps the most recent averaged samples in a fixed
//!   capacity ring, oldest evicted first
//!
//! Both are O(1) amortised per sample and never grow past their capacity.

use std::collections::VecDeque;

use crate::types::{AveragedSample, FeatureStub, HistorySnapshot, RawSample};

/// Tumbling-window accumulator of raw samples.
///
/// Owned exclusively by the pipeline driver.
#[derive(Debug, Clone)]
pub struct SignalBuffer {
    /// Samples per batch.
    capacity: usize,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl SignalBuffer {
    /// Create an empty buffer emitting one average every `capacity` samples.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
        }
    }

    /// Append a raw sample.
    ///
    /// Returns the averaged sample when this push completes a batch; the
    /// buffer is empty again afterwards.
    pub fn push(&mut self, sample: RawSample) -> Option<AveragedSample> {
        self.x.push(sample.x);
        self.y.push(sample.y);
        self.z.push(sample.z);

        if self.x.len() < self.capacity {
            return None;
        }

        let count = self.capacity as f64;
        let averaged = AveragedSample::from_means(
            self.x.iter().sum::<f64>() / count,
            self.y.iter().sum::<f64>() / count,
            self.z.iter().sum::<f64>() / count,
        );
        self.clear();
        Some(averaged)
    }

    /// Samples currently buffered.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop any partial batch.
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
    }
}

/// Fixed-capacity FIFO of averaged samples.
///
/// Samples are stored whole, so the per-axis and magnitude sequences handed
/// out always have equal length and are updated as one unit.
#[derive(Debug, Clone)]
pub struct SignalHistory {
    capacity: usize,
    samples: VecDeque<AveragedSample>,
}

impl SignalHistory {
    /// Create an empty history holding at most `capacity` samples.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a sample, evicting the oldest one on overflow.
    pub fn update(&mut self, sample: AveragedSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Arithmetic mean of the magnitude sequence.
    ///
    /// Returns 0.0 for an empty history. Detection right after start-up is
    /// therefore measured against zero; this cold-start behaviour is
    /// accepted rather than special-cased.
    pub fn mean_magnitude(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|s| s.magnitude()).sum();
        sum / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<&AveragedSample> {
        self.samples.back()
    }

    /// Owned copy of the four sequences for rendering.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            x: self.samples.iter().map(|s| s.avg_x()).collect(),
            y: self.samples.iter().map(|s| s.avg_y()).collect(),
            z: self.samples.iter().map(|s| s.avg_z()).collect(),
            magnitude: self.samples.iter().map(|s| s.magnitude()).collect(),
        }
    }

    /// Classifier input without character code.
    ///
    /// Each axis block is exactly `capacity` long; while the history is
    /// filling the oldest slots are zero so the newest sample keeps a fixed
    /// position.
    pub fn feature_stub(&self) -> FeatureStub {
        let padding = self.capacity - self.samples.len();
        let block = |axis: fn(&AveragedSample) -> f64| -> Vec<f64> {
            std::iter::repeat(0.0)
                .take(padding)
                .chain(self.samples.iter().map(axis))
                .collect()
        };
        FeatureStub::from_axes(
            &block(AveragedSample::avg_x),
            &block(AveragedSample::avg_y),
            &block(AveragedSample::avg_z),
        )
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
