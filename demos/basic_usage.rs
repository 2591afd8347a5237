//! Basic usage example: feed accelerometer samples, get key events
use keystroke_sensing::{
    KeystrokePipeline, PipelineConfig, PipelineEvent, RawSample, SensingResult,
};

fn main() -> SensingResult<()> {
    println!("=== Keystroke Sensing: Basic Example ===\n");

    // Default config: batches of 5 samples, 4 batches of history
    let config = PipelineConfig::default();
    let mut pipeline = KeystrokePipeline::new(config)?;

    // Device at rest for four batches, then a sharp tap
    let mut samples = vec![RawSample::new(1.0, 1.0, 1.0); 20];
    samples.extend(vec![RawSample::new(20.0, 20.0, 20.0); 5]);

    println!("Processing {} samples...\n", samples.len());

    for sample in samples {
        for event in pipeline.push(sample) {
            print_event(&event);
        }
    }

    // Same motion in training mode pairs it with the next text character
    println!("\n--- Training mode ---");
    pipeline.set_training_mode(true);
    let mut tap = vec![RawSample::new(1.0, 1.0, 1.0); 20];
    tap.extend(vec![RawSample::new(20.0, 20.0, 20.0); 5]);
    for event in pipeline.push_batch(&tap) {
        print_event(&event);
    }
    for event in pipeline.finish_training() {
        print_event(&event);
    }

    let stats = pipeline.stats();
    println!("\n=== Summary ===");
    println!("Raw samples: {}", stats.raw_samples);
    println!("Averaged samples: {}", stats.averaged_samples);
    println!("Key events: {}", stats.key_events);
    println!("Training cases: {}", pipeline.classifier().cases().len());
    Ok(())
}

fn print_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::Sample(snapshot) => {
            let latest = snapshot.magnitude.last().copied().unwrap_or_default();
            println!("history {} entries, latest magnitude {:.2}", snapshot.len(), latest);
        }
        PipelineEvent::KeyDetected {
            character,
            magnitude,
            deviation,
        } => {
            println!("KEY '{character}' (magnitude {magnitude:.2}, deviation {deviation:.2})");
        }
        PipelineEvent::TrainingCaseRecorded {
            expected,
            cases,
            started,
            last_report,
        } => {
            let state = if *started { "training started" } else { "queued" };
            println!("recorded '{expected}' ({cases} cases, {state})");
            if let Some(report) = last_report {
                println!(
                    "  last run: {} iterations, error {:.4}",
                    report.iterations, report.error
                );
            }
        }
        PipelineEvent::TrainingFinished(report) => {
            println!(
                "training finished: {} iterations, error {:.4}, converged {}",
                report.iterations, report.error, report.converged
            );
        }
    }
}
