//! Key event detection.
//!
//! A key press shows up as a transient jump of the averaged motion magnitude
//! away from its recent steady state. The detector is a single-threshold
//! change-point test: it compares the newest magnitude with the mean of the
//! history and fires when the absolute deviation is strictly above the
//! threshold.
//!
//! The detector is stateless. The caller decides which mean to compare
//! against; the pipeline uses the history as it was before the new sample
//! was appended.

use crate::config::DetectionConfig;

/// Single-threshold key event detector.
#[derive(Debug, Clone)]
pub struct KeyEventDetector {
    threshold: f64,
}

impl KeyEventDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self::with_threshold(config.key_threshold)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// True iff `|magnitude - mean| > threshold`.
    pub fn check(&self, magnitude: f64, mean: f64) -> bool {
        deviation(magnitude, mean) > self.threshold
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for KeyEventDetector {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

/// Absolute deviation of a magnitude from a reference mean.
pub fn deviation(magnitude: f64, mean: f64) -> f64 {
    (magnitude - mean).abs()
}
