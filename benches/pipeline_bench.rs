//! Ingestion and inference throughput.

use criterion::{criterion_group, criterion_main, Criterion};
use keystroke_sensing::{
    KeystrokePipeline, MotionSource, PipelineConfig, RawSample, SyntheticSource,
};

/// Benchmark: one second of synthetic motion at 100 Hz through the pipeline.
fn bench_pipeline_ingest(c: &mut Criterion) {
    let mut source = SyntheticSource::with_limit(42, 100);
    let mut samples = Vec::with_capacity(100);
    while let Some(Ok(sample)) = source.next_sample() {
        samples.push(sample);
    }

    c.bench_function("bench_pipeline_ingest_100", |b| {
        b.iter(|| {
            let mut pipeline = KeystrokePipeline::new(PipelineConfig::default()).unwrap();
            std::hint::black_box(pipeline.push_batch(&samples))
        })
    });
}

/// Benchmark: scoring all 26 characters against a full history.
fn bench_infer(c: &mut Criterion) {
    let mut pipeline = KeystrokePipeline::new(PipelineConfig::default()).unwrap();
    pipeline.push_batch(&vec![RawSample::new(1.0, 2.0, 3.0); 20]);

    c.bench_function("bench_infer_full_history", |b| {
        b.iter(|| std::hint::black_box(pipeline.infer_current()))
    });
}

/// Benchmark: one inline training run over 20 recorded cases.
fn bench_train(c: &mut Criterion) {
    let mut config = PipelineConfig::default();
    config.training.background = false;
    config.classifier.max_iterations = 100;
    let mut classifier = keystroke_sensing::Classifier::from_config(&config).unwrap();
    for i in 0..20 {
        let v = i as f64;
        let stub = keystroke_sensing::FeatureStub::from_axes(&[v; 4], &[v * 0.5; 4], &[1.0; 4]);
        classifier.add_training_case(stub, (b'a' + (i % 26) as u8) as char, 1.0);
    }

    c.bench_function("bench_train_20_cases_100_iterations", |b| {
        b.iter(|| std::hint::black_box(classifier.training_job().run().unwrap()))
    });
}

criterion_group!(benches, bench_pipeline_ingest, bench_infer, bench_train);
criterion_main!(benches);
