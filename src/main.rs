//! Keystroke Sensing
//!
//! Command-line driver: wires a motion source into the keystroke pipeline
//! and reports what it detects. For library use, see lib.rs.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use keystroke_sensing::{
    KeystrokePipeline, MotionSource, PipelineConfig, PipelineEvent, ReplaySource, SensingError,
    SyntheticSource,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Keystroke Sensing - infer typed characters from accelerometer motion
#[derive(Parser, Debug)]
#[command(name = "keystroke-sensing")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Feed a motion source through the pipeline
    Run {
        /// Where samples come from
        #[arg(short, long, value_enum, default_value = "synthetic")]
        source: SourceKind,

        /// CSV file of x,y,z lines (replay source)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Start in training mode
        #[arg(short, long)]
        train: bool,

        /// Stop after this many raw samples
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print every history snapshot as a JSON line
        #[arg(long)]
        snapshots: bool,

        /// Do not pace synthetic samples
        #[arg(long)]
        fast: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SourceKind {
    Synthetic,
    Replay,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Run {
            source,
            input,
            train,
            limit,
            snapshots,
            fast,
        } => {
            let options = RunOptions {
                train,
                limit,
                snapshots,
                pace: source == SourceKind::Synthetic && !fast,
            };
            run(source, input, options, config)?;
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

struct RunOptions {
    train: bool,
    limit: Option<usize>,
    snapshots: bool,
    pace: bool,
}

fn open_source(
    kind: SourceKind,
    input: Option<PathBuf>,
    config: &PipelineConfig,
) -> Result<Box<dyn MotionSource>, SensingError> {
    match kind {
        SourceKind::Synthetic => Ok(Box::new(SyntheticSource::new(config.source.seed))),
        SourceKind::Replay => {
            let path = input.ok_or_else(|| {
                SensingError::UnsupportedInputSource("replay needs --input PATH".to_string())
            })?;
            Ok(Box::new(ReplaySource::open(&path)?))
        }
    }
}

fn run(
    kind: SourceKind,
    input: Option<PathBuf>,
    options: RunOptions,
    config: PipelineConfig,
) -> anyhow::Result<()> {
    let mut source = match open_source(kind, input, &config) {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Motion source unavailable, pipeline not started");
            return Err(e.into());
        }
    };
    let interval = Duration::from_millis(config.source.sample_interval_ms);

    let mut pipeline = KeystrokePipeline::new(config)?;
    pipeline.set_training_mode(options.train);
    info!(source = source.name(), training = options.train, "Pipeline started");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut typed = String::new();
    let mut consumed = 0usize;

    while options.limit.map_or(true, |limit| consumed < limit) {
        let Some(item) = source.next_sample() else {
            break;
        };
        consumed += 1;
        let sample = match item {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "Skipping unusable sample");
                continue;
            }
        };

        for event in pipeline.push(sample) {
            report(&event, options.snapshots, &mut typed, &mut out)?;
        }
        if options.pace {
            std::thread::sleep(interval);
        }
    }

    for event in pipeline.finish_training() {
        report(&event, options.snapshots, &mut typed, &mut out)?;
    }
    out.flush()?;

    let stats = pipeline.stats();
    info!(
        raw_samples = stats.raw_samples,
        averaged_samples = stats.averaged_samples,
        key_events = stats.key_events,
        characters = stats.characters_detected,
        "Pipeline stopped"
    );
    if !typed.is_empty() {
        info!(text = %typed, "Detected text");
    }
    Ok(())
}

fn report(
    event: &PipelineEvent,
    snapshots: bool,
    typed: &mut String,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match event {
        PipelineEvent::Sample(snapshot) => {
            if snapshots {
                writeln!(out, "{}", snapshot.to_json_line()?)?;
            }
        }
        PipelineEvent::KeyDetected { character, .. } => typed.push(*character),
        PipelineEvent::TrainingCaseRecorded { .. } | PipelineEvent::TrainingFinished(_) => {}
    }
    Ok(())
}
