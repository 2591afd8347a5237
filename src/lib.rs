//! Keystroke Sensing Library
//!
//! Infers typed characters from the motion of a device resting near a
//! keyboard. Raw accelerometer triples are averaged in small batches, a
//! key press is flagged when the averaged magnitude jumps away from the
//! recent history, and a trainable classifier names the character.
//!
//! # Design Philosophy
//!
//! - **One owner**: all mutable state (buffer, history, model, training
//!   cursor) lives in a [`KeystrokePipeline`] driven by a single caller.
//! - **Never stall on bad data**: a sample or lookup that cannot be used is
//!   logged and skipped; only construction and source opening fail.
//! - **Pluggable model**: any [`TrainableModel`] can replace the default
//!   feed-forward network.
//! - **Bounded memory**: fixed-size buffer and history per sample.
//!
//! # Example
//!
//! ```
//! use keystroke_sensing::{KeystrokePipeline, PipelineConfig, PipelineEvent, RawSample};
//!
//! let mut pipeline = KeystrokePipeline::new(PipelineConfig::default()).unwrap();
//!
//! // Four quiet batches fill the history, then a sharp spike.
//! let mut samples = vec![RawSample::new(1.0, 1.0, 1.0); 20];
//! samples.extend(vec![RawSample::new(20.0, 20.0, 20.0); 5]);
//!
//! let events = pipeline.push_batch(&samples);
//! assert!(events
//!     .iter()
//!     .any(|e| matches!(e, PipelineEvent::KeyDetected { .. })));
//! ```

pub mod alphabet;
pub mod classifier;
pub mod config;
pub mod detection;
pub mod error;
pub mod pipeline;
pub mod signal;
pub mod source;
pub mod training;
pub mod types;

#[cfg(test)]
mod stress_tests;

// Re-export commonly used types
pub use alphabet::TypeableAlphabet;
pub use classifier::{Classifier, FeedForwardNetwork, TrainableModel, TrainingLimits};
pub use config::PipelineConfig;
pub use detection::KeyEventDetector;
pub use error::{SensingError, SensingResult};
pub use pipeline::{KeystrokePipeline, PipelineStats};
pub use signal::{SignalBuffer, SignalHistory};
pub use source::{MotionSource, ReplaySource, SyntheticSource};
pub use training::{TrainingSession, TrainingTextCursor};
pub use types::{
    AveragedSample, FeatureStub, FeatureVector, HistorySnapshot, PipelineEvent, RawSample,
    TrainingCase, TrainingPhase, TrainingReport,
};
