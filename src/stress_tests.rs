//! Long-running and pathological input tests for the keystroke pipeline.
//!
//! These push far more data through the pipeline than a single typing
//! session would, checking that memory stays bounded and that training
//! never exceeds its budget.

use crate::classifier::{Classifier, FeedForwardNetwork, TrainableModel, TrainingLimits};
use crate::config::PipelineConfig;
use crate::pipeline::KeystrokePipeline;
use crate::source::{MotionSource, SyntheticSource};
use crate::types::*;

// ============================================================================
// EXTREME DURATION & THROUGHPUT
// ============================================================================

/// Ten minutes of synthetic input at the default 20 Hz pacing
#[test]
fn stress_ten_minutes_synthetic_stream() {
    let mut pipeline = KeystrokePipeline::new(PipelineConfig::default()).unwrap();
    let mut source = SyntheticSource::with_limit(7, 12_000);

    while let Some(sample) = source.next_sample() {
        for event in pipeline.push(sample.unwrap()) {
            if let PipelineEvent::Sample(snapshot) = event {
                assert!(snapshot.len() <= 4);
            }
        }
    }

    let stats = pipeline.stats();
    assert_eq!(stats.raw_samples, 12_000);
    assert_eq!(stats.averaged_samples, 2_400);
    assert_eq!(stats.key_events, stats.characters_detected);
    assert_eq!(pipeline.history().len(), 4);
    assert_eq!(pipeline.buffered_samples(), 0);
}

/// Training mode over a long random stream with background runs
#[test]
fn stress_background_training_on_random_stream() {
    let mut config = PipelineConfig::default();
    config.classifier.max_iterations = 25;
    config.classifier.hidden_units = 8;
    let mut pipeline = KeystrokePipeline::new(config).unwrap();
    pipeline.set_training_mode(true);

    let mut source = SyntheticSource::with_limit(11, 3_000);
    let mut recorded = 0;
    let mut reports = Vec::new();
    let mut index = 0usize;

    while let Some(sample) = source.next_sample() {
        // A hard tap every 50 batches on top of the random motion.
        let sample = if index % 250 >= 245 {
            RawSample::new(40.0, 40.0, 40.0)
        } else {
            sample.unwrap()
        };
        index += 1;
        for event in pipeline.push(sample) {
            match event {
                PipelineEvent::TrainingCaseRecorded { .. } => recorded += 1,
                PipelineEvent::TrainingFinished(report) => reports.push(report),
                PipelineEvent::KeyDetected { .. } => panic!("inference while training"),
                PipelineEvent::Sample(_) => {}
            }
        }
    }
    for event in pipeline.finish_training() {
        if let PipelineEvent::TrainingFinished(report) = event {
            reports.push(report);
        }
    }

    assert!(recorded >= 12);
    assert_eq!(recorded, pipeline.classifier().cases().len());
    assert!(!reports.is_empty());
    assert!(reports.iter().all(|r| r.iterations <= 25));
    assert_eq!(reports.last().map(|r| r.cases), Some(recorded));
}

// ============================================================================
// TRAINING BUDGET
// ============================================================================

/// An unreachable target must stop exactly at the iteration cap
#[test]
fn stress_unreachable_target_stops_at_cap() {
    let mut network = FeedForwardNetwork::new(13, 6, 3);
    let stub = FeatureStub::from_axes(&[1.0; 4], &[2.0; 4], &[3.0; 4]);
    // Same input, contradictory ideals.
    let inputs = vec![stub.with_code(0), stub.with_code(0)];
    let ideals = vec![0.0, 1.0];
    let limits = TrainingLimits {
        max_iterations: 200,
        target_error: 0.0,
        progress_interval: 50,
    };

    let fit = network.train(&inputs, &ideals, &limits).unwrap();
    assert_eq!(fit.iterations, 200);
    assert!(fit.error > 0.0);
}

/// Many accumulated cases retrained inline, each run within budget
#[test]
fn stress_many_inline_training_runs() {
    let mut config = PipelineConfig::default();
    config.classifier.max_iterations = 10;
    config.classifier.hidden_units = 4;
    let mut classifier = Classifier::from_config(&config).unwrap();

    let letters: Vec<char> = ('a'..='z').collect();
    for i in 0..100 {
        let v = i as f64 * 0.1;
        let stub = FeatureStub::from_axes(&[v; 4], &[v + 1.0; 4], &[v + 2.0; 4]);
        assert!(classifier.add_training_case(stub, letters[i % letters.len()], 1.0));
        let report = classifier.train().unwrap();
        assert!(report.iterations <= 10);
        assert_eq!(report.cases, i + 1);
    }
}

// ============================================================================
// PATHOLOGICAL INPUT
// ============================================================================

/// Huge and tiny magnitudes must not poison inference
#[test]
fn stress_extreme_magnitudes() {
    let mut pipeline = KeystrokePipeline::new(PipelineConfig::default()).unwrap();
    let mut samples = Vec::new();
    for value in [1e-9, 1e9, 0.0, -1e9, 1e6, -3.0] {
        samples.extend(vec![RawSample::new(value, value, value); 5]);
    }

    let events = pipeline.push_batch(&samples);
    assert_eq!(pipeline.stats().averaged_samples, 6);
    let detected = events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::KeyDetected { .. }))
        .count() as u64;
    assert_eq!(detected, pipeline.stats().key_events);
}

/// Alternating quiet and spike batches fire on every transition
#[test]
fn stress_alternating_spikes() {
    let mut pipeline = KeystrokePipeline::new(PipelineConfig::default()).unwrap();
    for i in 0..500 {
        let value = if i % 2 == 0 { 1.0 } else { 30.0 };
        pipeline.push_batch(&vec![RawSample::new(value, value, value); 5]);
    }
    let stats = pipeline.stats();
    assert_eq!(stats.averaged_samples, 500);
    assert!(stats.key_events >= 250);
    assert!(pipeline.history().len() <= 4);
}
