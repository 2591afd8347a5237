//! Pipeline configuration.
//!
//! Every tunable of the pipeline is a named constant here, and
//! [`PipelineConfig::default`] reproduces those constants exactly. A TOML
//! file can override any subset of them; missing sections fall back to the
//! defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alphabet::TypeableAlphabet;
use crate::error::{SensingError, SensingResult};

/// Raw samples averaged into one averaged sample (tumbling window).
pub const BUFFER_SIZE: usize = 5;

/// Averaged samples retained in the rolling history.
pub const MAX_HISTORY: usize = 4;

/// Magnitude deviation from the history mean that counts as a key event.
pub const KEY_THRESHOLD: f64 = 5.0;

/// Characters the classifier can ever answer with.
pub const TYPEABLE_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Iteration cap for one training run.
pub const MAX_ITERATIONS: usize = 1000;

/// Training stops early once the error is at or below this.
pub const TARGET_ERROR: f64 = 0.1;

/// Texts the user types while training, in order.
pub const TRAINING_TEXTS: [&str; 4] = [
    "the quick brown fox jumps over the lazy dog",
    "how quickly daft jumping zebras vex",
    TYPEABLE_ALPHABET,
    "jinxed wizards pluck ivy from the big quilt",
];

/// Pacing of the synthetic motion source (20 samples/s).
pub const SAMPLE_INTERVAL_MS: u64 = 50;

/// Hidden layer width of the default network.
pub const HIDDEN_UNITS: usize = BUFFER_SIZE * MAX_HISTORY;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub signal: SignalConfig,
    pub detection: DetectionConfig,
    pub classifier: ClassifierConfig,
    pub training: TrainingConfig,
    pub source: SourceConfig,
}

/// Windowing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Raw samples per averaged sample.
    pub buffer_size: usize,
    /// Averaged samples kept in the history (also the feature block length).
    pub max_history: usize,
}

/// Key event detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Strict threshold on |magnitude - history mean|.
    pub key_threshold: f64,
}

/// Classifier and training-run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Typeable alphabet, lowercase ASCII, no duplicates.
    pub alphabet: String,
    /// Width of each hidden layer.
    pub hidden_units: usize,
    /// Seed for weight initialisation.
    pub seed: u64,
    pub max_iterations: usize,
    pub target_error: f64,
    /// Emit a progress log line every this many iterations (0 = never).
    pub progress_interval: usize,
}

/// Training session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Texts typed during training; whitespace separates words and is skipped.
    pub texts: Vec<String>,
    /// Run training on a worker thread instead of inline.
    pub background: bool,
}

/// Motion source parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Interval between synthetic samples.
    pub sample_interval_ms: u64,
    /// Seed for the synthetic generator.
    pub seed: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            buffer_size: BUFFER_SIZE,
            max_history: MAX_HISTORY,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            key_threshold: KEY_THRESHOLD,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            alphabet: TYPEABLE_ALPHABET.to_string(),
            hidden_units: HIDDEN_UNITS,
            seed: 0x6b65_7973,
            max_iterations: MAX_ITERATIONS,
            target_error: TARGET_ERROR,
            progress_interval: 100,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            texts: TRAINING_TEXTS.iter().map(|t| t.to_string()).collect(),
            background: true,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Dimensionality of a full feature vector: three history blocks plus
    /// the character code.
    pub fn feature_dim(&self) -> usize {
        self.signal.max_history * 3 + 1
    }

    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err describing the first invalid field.
    pub fn validate(&self) -> SensingResult<()> {
        if self.signal.buffer_size == 0 {
            return Err(SensingError::Config("buffer_size must be > 0".to_string()));
        }
        if self.signal.max_history == 0 {
            return Err(SensingError::Config("max_history must be > 0".to_string()));
        }
        let threshold = self.detection.key_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(SensingError::Config(format!(
                "key_threshold must be a positive finite number, got {threshold}"
            )));
        }

        let alphabet = TypeableAlphabet::new(&self.classifier.alphabet)?;

        if self.classifier.hidden_units == 0 {
            return Err(SensingError::Config("hidden_units must be > 0".to_string()));
        }
        if self.classifier.max_iterations == 0 {
            return Err(SensingError::Config("max_iterations must be > 0".to_string()));
        }
        let target = self.classifier.target_error;
        if !target.is_finite() || target < 0.0 {
            return Err(SensingError::Config(format!(
                "target_error must be a non-negative finite number, got {target}"
            )));
        }

        if self.training.texts.is_empty() {
            return Err(SensingError::Config(
                "at least one training text is required".to_string(),
            ));
        }
        for (index, text) in self.training.texts.iter().enumerate() {
            if let Some(c) = text
                .chars()
                .find(|c| !c.is_ascii_whitespace() && !alphabet.contains(*c))
            {
                return Err(SensingError::Config(format!(
                    "training text {index} contains untypeable character {c:?}"
                )));
            }
            if text.chars().all(|c| c.is_ascii_whitespace()) {
                return Err(SensingError::Config(format!(
                    "training text {index} has no typeable characters"
                )));
            }
        }
        Ok(())
    }

    /// Load config from a TOML file and validate it.
    pub fn load(path: &Path) -> SensingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML text and validate it.
    pub fn from_toml(content: &str) -> SensingResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Generate TOML representation.
    pub fn to_toml(&self) -> SensingResult<String> {
        toml::to_string_pretty(self).map_err(|e| SensingError::Config(e.to_string()))
    }
}
