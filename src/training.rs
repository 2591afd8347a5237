//! Supervised training from typed text.
//!
//! While training mode is on, every key event is assumed to be the next
//! character of a known training text. The session pairs the current motion
//! history with that character, appends the case to the classifier's
//! training set and retrains over the whole set.
//!
//! Only positive examples (ideal score 1.0) are recorded. The other
//! characters never receive a negative example for the same motion, which
//! limits how discriminative the trained model can be.
//!
//! Training runs either inline (ingestion blocks for the duration) or on a
//! worker thread over a copy of the model. At most one run is in flight per
//! session; key events arriving meanwhile still record their case and queue
//! one follow-up run over the full set.

use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};

use crate::classifier::{Classifier, FeedForwardNetwork, TrainableModel};
use crate::config::TrainingConfig;
use crate::error::{SensingError, SensingResult};
use crate::signal::SignalHistory;
use crate::types::{PipelineEvent, TrainingPhase, TrainingReport};

/// Ideal score recorded for the expected character.
pub const POSITIVE_IDEAL: f64 = 1.0;

/// Position in the cyclic list of training texts.
///
/// ASCII whitespace separates words and is skipped. After the last character
/// of a text the cursor moves on to the next text, wrapping to the first.
#[derive(Debug, Clone)]
pub struct TrainingTextCursor {
    texts: Vec<Vec<char>>,
    text_index: usize,
    char_index: usize,
}

impl TrainingTextCursor {
    pub fn new(texts: &[String]) -> SensingResult<Self> {
        if texts.is_empty() {
            return Err(SensingError::Config(
                "at least one training text is required".to_string(),
            ));
        }
        let texts: Vec<Vec<char>> = texts.iter().map(|t| t.chars().collect()).collect();
        if let Some(index) = texts
            .iter()
            .position(|t| t.iter().all(|c| c.is_ascii_whitespace()))
        {
            return Err(SensingError::Config(format!(
                "training text {index} has no typeable characters"
            )));
        }
        Ok(Self {
            texts,
            text_index: 0,
            char_index: 0,
        })
    }

    /// Character the user is expected to type next; advances the cursor.
    pub fn next_expected(&mut self) -> char {
        loop {
            let text = &self.texts[self.text_index];
            if self.char_index >= text.len() {
                self.text_index = (self.text_index + 1) % self.texts.len();
                self.char_index = 0;
                continue;
            }
            let c = text[self.char_index];
            self.char_index += 1;
            if !c.is_ascii_whitespace() {
                return c;
            }
        }
    }

    /// (text index, character index) of the next character to examine.
    pub fn position(&self) -> (usize, usize) {
        (self.text_index, self.char_index)
    }
}

type TrainingHandle<M> = JoinHandle<SensingResult<(M, TrainingReport)>>;

/// Training state machine: Idle -> Collecting <-> Training.
pub struct TrainingSession<M: TrainableModel = FeedForwardNetwork> {
    cursor: TrainingTextCursor,
    background: bool,
    in_flight: Option<TrainingHandle<M>>,
    retrain_pending: bool,
    cases_recorded: usize,
    runs_completed: usize,
    last_report: Option<TrainingReport>,
}

impl<M: TrainableModel> TrainingSession<M> {
    pub fn new(config: &TrainingConfig) -> SensingResult<Self> {
        Ok(Self {
            cursor: TrainingTextCursor::new(&config.texts)?,
            background: config.background,
            in_flight: None,
            retrain_pending: false,
            cases_recorded: 0,
            runs_completed: 0,
            last_report: None,
        })
    }

    /// Record the current motion as the next expected character and train.
    ///
    /// If a run is already in flight the case is kept and a follow-up run is
    /// queued instead of starting a second concurrent run.
    pub fn on_key_event(
        &mut self,
        history: &SignalHistory,
        classifier: &mut Classifier<M>,
    ) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        let expected = self.cursor.next_expected();
        if !classifier.add_training_case(history.feature_stub(), expected, POSITIVE_IDEAL) {
            return events;
        }
        self.cases_recorded += 1;
        let cases = classifier.cases().len();
        info!(expected = %expected, cases, "Training case recorded");

        let started = self.in_flight.is_none();
        events.push(PipelineEvent::TrainingCaseRecorded {
            expected,
            cases,
            started,
            last_report: self.last_report,
        });
        if started {
            self.start(classifier, &mut events);
        } else {
            self.retrain_pending = true;
        }
        events
    }

    /// Install the result of a finished background run, if any, and start
    /// a queued follow-up run. Never blocks.
    pub fn poll(&mut self, classifier: &mut Classifier<M>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        let finished = self
            .in_flight
            .as_ref()
            .map_or(false, |handle| handle.is_finished());
        if finished {
            if let Some(handle) = self.in_flight.take() {
                self.complete(handle, classifier, &mut events);
            }
        }
        if self.in_flight.is_none() && self.retrain_pending {
            self.retrain_pending = false;
            self.start(classifier, &mut events);
        }
        events
    }

    /// Block until no run is in flight and none is queued.
    pub fn finish(&mut self, classifier: &mut Classifier<M>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        loop {
            if let Some(handle) = self.in_flight.take() {
                self.complete(handle, classifier, &mut events);
            } else if self.retrain_pending {
                self.retrain_pending = false;
                self.start(classifier, &mut events);
            } else {
                break;
            }
        }
        events
    }

    pub fn phase(&self) -> TrainingPhase {
        if self.in_flight.is_some() {
            TrainingPhase::Training
        } else if self.cases_recorded == 0 {
            TrainingPhase::Idle
        } else {
            TrainingPhase::Collecting
        }
    }

    pub fn last_report(&self) -> Option<&TrainingReport> {
        self.last_report.as_ref()
    }

    pub fn runs_completed(&self) -> usize {
        self.runs_completed
    }

    pub fn is_background(&self) -> bool {
        self.background
    }

    fn start(&mut self, classifier: &mut Classifier<M>, events: &mut Vec<PipelineEvent>) {
        if self.background {
            let job = classifier.training_job();
            let spawned = thread::Builder::new()
                .name("keystroke-training".to_string())
                .spawn(move || job.run());
            match spawned {
                Ok(handle) => {
                    self.in_flight = Some(handle);
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "Could not spawn training worker, training inline");
                }
            }
        }

        match classifier.training_job().run() {
            Ok((model, report)) => {
                classifier.install(model);
                self.record(report, events);
            }
            Err(e) => error!(error = %e, "Training run failed"),
        }
    }

    fn complete(
        &mut self,
        handle: TrainingHandle<M>,
        classifier: &mut Classifier<M>,
        events: &mut Vec<PipelineEvent>,
    ) {
        let outcome = handle.join().unwrap_or_else(|_| {
            Err(SensingError::TrainingUnavailable(
                "training worker panicked".to_string(),
            ))
        });
        match outcome {
            Ok((model, report)) => {
                classifier.install(model);
                self.record(report, events);
            }
            // The classifier keeps its previous model.
            Err(e) => error!(error = %e, "Training run failed"),
        }
    }

    fn record(&mut self, report: TrainingReport, events: &mut Vec<PipelineEvent>) {
        info!(
            iterations = report.iterations,
            error = report.error,
            converged = report.converged,
            cases = report.cases,
            "Training run finished"
        );
        self.runs_completed += 1;
        self.last_report = Some(report);
        events.push(PipelineEvent::TrainingFinished(report));
    }
}
