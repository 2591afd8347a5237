//! Keystroke inference pipeline driving all processing stages.
//!
//! This module orchestrates the data flow from raw accelerometer triples to
//! detected characters:
//! 1. **Buffering**: collect raw samples into fixed-size batches
//! 2. **Averaging**: emit one averaged sample per full batch
//! 3. **Detection**: compare the new magnitude with the history mean
//! 4. **History**: append the averaged sample to the rolling window
//! 5. **Key handling**: on a key event either record a training case or
//!    ask the classifier for the most likely character
//!
//! # Ownership
//! The pipeline is the single owner of the buffer, history, classifier and
//! training session. Samples are processed strictly in arrival order; there
//! is no interior mutability and no shared state apart from the copy of the
//! model handed to a background training run.

use tracing::{debug, info, warn};

use crate::classifier::{Classifier, FeedForwardNetwork, TrainableModel};
use crate::config::PipelineConfig;
use crate::detection::{deviation, KeyEventDetector};
use crate::error::SensingResult;
use crate::signal::{SignalBuffer, SignalHistory};
use crate::training::TrainingSession;
use crate::types::{AveragedSample, HistorySnapshot, PipelineEvent, RawSample, TrainingPhase};

/// Running counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub raw_samples: u64,
    pub averaged_samples: u64,
    pub key_events: u64,
    pub characters_detected: u64,
    /// Averaged samples dropped because they were not finite.
    pub skipped_samples: u64,
}

/// Complete keystroke inference pipeline.
pub struct KeystrokePipeline<M: TrainableModel = FeedForwardNetwork> {
    config: PipelineConfig,

    // Processing stages
    buffer: SignalBuffer,
    history: SignalHistory,
    detector: KeyEventDetector,
    classifier: Classifier<M>,
    session: TrainingSession<M>,

    // Mode toggle, flipped only by the caller
    training_mode: bool,

    stats: PipelineStats,
}

impl KeystrokePipeline<FeedForwardNetwork> {
    /// Creates a pipeline with the default network.
    pub fn new(config: PipelineConfig) -> SensingResult<Self> {
        config.validate()?;
        let classifier = Classifier::from_config(&config)?;
        Self::assemble(config, classifier)
    }
}

impl<M: TrainableModel> KeystrokePipeline<M> {
    /// Creates a pipeline around a caller-supplied model.
    pub fn with_model(config: PipelineConfig, model: M) -> SensingResult<Self> {
        config.validate()?;
        let classifier = Classifier::with_model(&config, model)?;
        Self::assemble(config, classifier)
    }

    fn assemble(config: PipelineConfig, classifier: Classifier<M>) -> SensingResult<Self> {
        Ok(Self {
            buffer: SignalBuffer::new(config.signal.buffer_size),
            history: SignalHistory::new(config.signal.max_history),
            detector: KeyEventDetector::new(&config.detection),
            session: TrainingSession::new(&config.training)?,
            classifier,
            config,
            training_mode: false,
            stats: PipelineStats::default(),
        })
    }

    /// Processes one raw sample through the entire pipeline.
    ///
    /// Returns every event that occurred, in order: a finished background
    /// training run first, then the new history snapshot if a batch
    /// completed, then the key event outcome if one fired. Never fails;
    /// problems inside a step are logged and that step is skipped.
    pub fn push(&mut self, sample: RawSample) -> Vec<PipelineEvent> {
        let mut events = self.session.poll(&mut self.classifier);

        self.stats.raw_samples += 1;
        let Some(averaged) = self.buffer.push(sample) else {
            return events;
        };
        self.stats.averaged_samples += 1;
        if !averaged.magnitude().is_finite() {
            // Non-finite values never enter the history.
            self.stats.skipped_samples += 1;
            warn!(
                x = averaged.avg_x(),
                y = averaged.avg_y(),
                z = averaged.avg_z(),
                "Non-finite averaged sample skipped"
            );
            return events;
        }

        // Deviation is measured against the history before this sample joins it.
        let mean = self.history.mean_magnitude();
        let fired = self.detector.check(averaged.magnitude(), mean);
        self.history.update(averaged);
        debug!(
            x = averaged.avg_x(),
            y = averaged.avg_y(),
            z = averaged.avg_z(),
            magnitude = averaged.magnitude(),
            mean,
            "Averaged sample"
        );
        events.push(PipelineEvent::Sample(self.history.snapshot()));

        if fired {
            self.handle_key_event(averaged, mean, &mut events);
        }
        events
    }

    /// Processes a batch of samples and returns all events.
    pub fn push_batch(&mut self, samples: &[RawSample]) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        for sample in samples {
            events.extend(self.push(*sample));
        }
        events
    }

    /// Installs a finished background training run without pushing a sample.
    pub fn poll_training(&mut self) -> Vec<PipelineEvent> {
        self.session.poll(&mut self.classifier)
    }

    /// Blocks until all recorded cases have been trained on.
    pub fn finish_training(&mut self) -> Vec<PipelineEvent> {
        self.session.finish(&mut self.classifier)
    }

    /// Classifies the current history without waiting for a key event.
    pub fn infer_current(&self) -> Option<char> {
        self.classifier.infer(&self.history.feature_stub())
    }

    pub fn set_training_mode(&mut self, training: bool) {
        if training != self.training_mode {
            info!(training, "Training mode changed");
        }
        self.training_mode = training;
    }

    pub fn is_training_mode(&self) -> bool {
        self.training_mode
    }

    pub fn training_phase(&self) -> TrainingPhase {
        self.session.phase()
    }

    pub fn history(&self) -> &SignalHistory {
        &self.history
    }

    /// Read-only copy of the rolling history for rendering.
    pub fn snapshot(&self) -> HistorySnapshot {
        self.history.snapshot()
    }

    pub fn classifier(&self) -> &Classifier<M> {
        &self.classifier
    }

    pub fn session(&self) -> &TrainingSession<M> {
        &self.session
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Samples waiting in the partial batch.
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    fn handle_key_event(
        &mut self,
        averaged: AveragedSample,
        mean: f64,
        events: &mut Vec<PipelineEvent>,
    ) {
        self.stats.key_events += 1;
        let magnitude = averaged.magnitude();
        let deviation = deviation(magnitude, mean);

        if self.training_mode {
            events.extend(self.session.on_key_event(&self.history, &mut self.classifier));
            return;
        }

        match self.classifier.infer(&self.history.feature_stub()) {
            Some(character) => {
                self.stats.characters_detected += 1;
                info!(character = %character, magnitude, deviation, "Key detected");
                events.push(PipelineEvent::KeyDetected {
                    character,
                    magnitude,
                    deviation,
                });
            }
            None => warn!(magnitude, deviation, "Key event could not be classified"),
        }
    }
}
