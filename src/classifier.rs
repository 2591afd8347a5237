//! Trainable character classifier.
//!
//! The classifier maps a feature vector (motion history + candidate
//! character code) to a scalar score, larger meaning "more likely". Any
//! backend implementing [`TrainableModel`] can sit behind it; the default is
//! a small sigmoid feed-forward network trained with full-batch resilient
//! propagation (iRPROP-).
//!
//! Inference scores every character of the alphabet against the same motion
//! stub and answers with the best one. Ties go to the character that comes
//! first in the alphabet.

use ndarray::{Array1, Array2, Axis, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::alphabet::TypeableAlphabet;
use crate::config::{ClassifierConfig, PipelineConfig};
use crate::error::{SensingError, SensingResult};
use crate::types::{FeatureStub, FeatureVector, TrainingCase, TrainingReport};

/// Initial RPROP update value.
const RPROP_INITIAL_STEP: f64 = 0.1;
const RPROP_ETA_PLUS: f64 = 1.2;
const RPROP_ETA_MINUS: f64 = 0.5;
const RPROP_STEP_MAX: f64 = 50.0;
const RPROP_STEP_MIN: f64 = 1e-6;

/// Stopping rule for one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingLimits {
    /// Hard cap on iterations.
    pub max_iterations: usize,
    /// Stop as soon as the error is at or below this.
    pub target_error: f64,
    /// Log progress every this many iterations (0 = never).
    pub progress_interval: usize,
}

impl From<&ClassifierConfig> for TrainingLimits {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            target_error: config.target_error,
            progress_interval: config.progress_interval,
        }
    }
}

impl Default for TrainingLimits {
    fn default() -> Self {
        Self::from(&ClassifierConfig::default())
    }
}

/// Result of [`TrainableModel::train`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelFit {
    pub iterations: usize,
    pub error: f64,
}

/// A function from feature vectors to scores that can be fitted to labeled
/// examples.
pub trait TrainableModel: Clone + Send + 'static {
    /// Length of the feature vectors this model accepts.
    fn input_dim(&self) -> usize;

    /// Fit the model in place.
    ///
    /// Runs until the error is at or below `limits.target_error` or
    /// `limits.max_iterations` iterations have run, whichever comes first.
    /// Stopping at the cap is not an error.
    fn train(
        &mut self,
        inputs: &[FeatureVector],
        ideals: &[f64],
        limits: &TrainingLimits,
    ) -> SensingResult<ModelFit>;

    /// Score one feature vector. Larger is more likely.
    fn score(&self, input: &FeatureVector) -> f64;
}

#[derive(Debug, Clone)]
struct Layer {
    /// Shape (inputs, outputs).
    weights: Array2<f64>,
    biases: Array1<f64>,
    weight_steps: Array2<f64>,
    weight_prev_grad: Array2<f64>,
    bias_steps: Array1<f64>,
    bias_prev_grad: Array1<f64>,
}

impl Layer {
    fn new(inputs: usize, outputs: usize, rng: &mut StdRng) -> Self {
        let scale = (6.0 / (inputs + outputs) as f64).sqrt();
        Self {
            weights: Array2::from_shape_fn((inputs, outputs), |_| rng.gen_range(-scale..scale)),
            biases: Array1::zeros(outputs),
            weight_steps: Array2::from_elem((inputs, outputs), RPROP_INITIAL_STEP),
            weight_prev_grad: Array2::zeros((inputs, outputs)),
            bias_steps: Array1::from_elem(outputs, RPROP_INITIAL_STEP),
            bias_prev_grad: Array1::zeros(outputs),
        }
    }

    fn forward(&self, input: &Array1<f64>) -> Array1<f64> {
        (input.dot(&self.weights) + &self.biases).mapv(sigmoid)
    }

    fn reset_rprop(&mut self) {
        self.weight_steps.fill(RPROP_INITIAL_STEP);
        self.weight_prev_grad.fill(0.0);
        self.bias_steps.fill(RPROP_INITIAL_STEP);
        self.bias_prev_grad.fill(0.0);
    }

    fn apply_rprop(&mut self, grad_w: &Array2<f64>, grad_b: &Array1<f64>) {
        Zip::from(&mut self.weights)
            .and(grad_w)
            .and(&mut self.weight_prev_grad)
            .and(&mut self.weight_steps)
            .for_each(|w, &g, prev, step| rprop_update(w, g, prev, step));
        Zip::from(&mut self.biases)
            .and(grad_b)
            .and(&mut self.bias_prev_grad)
            .and(&mut self.bias_steps)
            .for_each(|b, &g, prev, step| rprop_update(b, g, prev, step));
    }
}

/// Sigmoid network `input -> hidden -> hidden -> 1`.
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    input_dim: usize,
    layers: Vec<Layer>,
}

impl FeedForwardNetwork {
    /// Randomly initialised network; the same seed gives the same weights.
    pub fn new(input_dim: usize, hidden_units: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let hidden_units = hidden_units.max(1);
        let layers = vec![
            Layer::new(input_dim, hidden_units, &mut rng),
            Layer::new(hidden_units, hidden_units, &mut rng),
            Layer::new(hidden_units, 1, &mut rng),
        ];
        Self { input_dim, layers }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.feature_dim(),
            config.classifier.hidden_units,
            config.classifier.seed,
        )
    }

    /// Mean squared error over a batch. Zero for an empty batch.
    pub fn mean_squared_error(&self, inputs: &[FeatureVector], ideals: &[f64]) -> f64 {
        if inputs.is_empty() {
            return 0.0;
        }
        let sum: f64 = inputs
            .iter()
            .zip(ideals)
            .map(|(input, ideal)| {
                let diff = self.score(input) - ideal;
                diff * diff
            })
            .sum();
        sum / inputs.len() as f64
    }

    /// Layer outputs, the input itself first.
    fn activations(&self, input: &FeatureVector) -> Vec<Array1<f64>> {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(Array1::from(input.as_slice().to_vec()));
        for layer in &self.layers {
            let next = layer.forward(&activations[activations.len() - 1]);
            activations.push(next);
        }
        activations
    }

    /// Batch gradient of the squared error for every layer.
    fn gradients(&self, inputs: &[FeatureVector], ideals: &[f64]) -> Vec<(Array2<f64>, Array1<f64>)> {
        let mut grads: Vec<(Array2<f64>, Array1<f64>)> = self
            .layers
            .iter()
            .map(|l| (Array2::zeros(l.weights.raw_dim()), Array1::zeros(l.biases.raw_dim())))
            .collect();

        let depth = self.layers.len();
        for (input, &ideal) in inputs.iter().zip(ideals) {
            let activations = self.activations(input);
            let output = activations[depth][0];

            let mut delta = activations[depth].mapv(sigmoid_slope) * (output - ideal);
            for l in (0..depth).rev() {
                let a_in = activations[l].view().insert_axis(Axis(1));
                let d_row = delta.view().insert_axis(Axis(0));
                grads[l].0 += &a_in.dot(&d_row);
                grads[l].1 += &delta;

                if l > 0 {
                    let back = self.layers[l].weights.dot(&delta);
                    delta = back * activations[l].mapv(sigmoid_slope);
                }
            }
        }
        grads
    }
}

impl TrainableModel for FeedForwardNetwork {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn train(
        &mut self,
        inputs: &[FeatureVector],
        ideals: &[f64],
        limits: &TrainingLimits,
    ) -> SensingResult<ModelFit> {
        check_batch(self.input_dim, inputs, ideals)?;
        if inputs.is_empty() {
            return Ok(ModelFit {
                iterations: 0,
                error: 0.0,
            });
        }

        for layer in &mut self.layers {
            layer.reset_rprop();
        }

        let mut error = self.mean_squared_error(inputs, ideals);
        let mut iterations = 0;
        while iterations < limits.max_iterations {
            iterations += 1;

            let grads = self.gradients(inputs, ideals);
            for (layer, (grad_w, grad_b)) in self.layers.iter_mut().zip(&grads) {
                layer.apply_rprop(grad_w, grad_b);
            }
            error = self.mean_squared_error(inputs, ideals);

            if limits.progress_interval > 0 && iterations % limits.progress_interval == 0 {
                debug!(iteration = iterations, error, "Training iteration");
            }
            if error <= limits.target_error {
                break;
            }
        }

        Ok(ModelFit { iterations, error })
    }

    fn score(&self, input: &FeatureVector) -> f64 {
        if input.len() != self.input_dim {
            return f64::NAN;
        }
        let mut activation = Array1::from(input.as_slice().to_vec());
        for layer in &self.layers {
            activation = layer.forward(&activation);
        }
        activation[0]
    }
}

/// Snapshot of everything one training run needs.
///
/// Owns a copy of the model, so it can be moved to a worker thread while the
/// classifier keeps answering with its current model.
#[derive(Debug, Clone)]
pub struct TrainingJob<M> {
    model: M,
    inputs: Vec<FeatureVector>,
    ideals: Vec<f64>,
    limits: TrainingLimits,
}

impl<M: TrainableModel> TrainingJob<M> {
    /// Fit the model copy and return it together with the run report.
    ///
    /// A run whose error is not finite has diverged and is reported as
    /// `TrainingUnavailable`; the caller keeps its current model.
    pub fn run(mut self) -> SensingResult<(M, TrainingReport)> {
        let fit = self.model.train(&self.inputs, &self.ideals, &self.limits)?;
        if !fit.error.is_finite() {
            return Err(SensingError::TrainingUnavailable(format!(
                "training diverged after {} iterations over {} cases",
                fit.iterations,
                self.inputs.len()
            )));
        }
        let report = TrainingReport {
            iterations: fit.iterations,
            error: fit.error,
            converged: fit.error <= self.limits.target_error,
            cases: self.inputs.len(),
        };
        if !report.converged {
            warn!(
                iterations = report.iterations,
                error = report.error,
                target = self.limits.target_error,
                "Training stopped at iteration cap"
            );
        }
        Ok((self.model, report))
    }
}

/// Character classifier: a trainable model plus its accumulated training set.
#[derive(Debug, Clone)]
pub struct Classifier<M: TrainableModel = FeedForwardNetwork> {
    model: M,
    alphabet: TypeableAlphabet,
    limits: TrainingLimits,
    cases: Vec<TrainingCase>,
    stub_dim: usize,
}

impl Classifier<FeedForwardNetwork> {
    /// Classifier with the default network sized for `config`.
    pub fn from_config(config: &PipelineConfig) -> SensingResult<Self> {
        Self::with_model(config, FeedForwardNetwork::from_config(config))
    }
}

impl<M: TrainableModel> Classifier<M> {
    /// Classifier around an existing model.
    ///
    /// Fails if the model does not accept `3 * max_history + 1` inputs.
    pub fn with_model(config: &PipelineConfig, model: M) -> SensingResult<Self> {
        let expected = config.feature_dim();
        if model.input_dim() != expected {
            return Err(SensingError::DimensionMismatch {
                expected,
                actual: model.input_dim(),
            });
        }
        Ok(Self {
            model,
            alphabet: TypeableAlphabet::new(&config.classifier.alphabet)?,
            limits: TrainingLimits::from(&config.classifier),
            cases: Vec::new(),
            stub_dim: expected - 1,
        })
    }

    /// Append a labeled example to the training set.
    ///
    /// Returns false, leaving the set unchanged, if the label is not typeable
    /// or the stub has the wrong length or a non-finite value.
    pub fn add_training_case(&mut self, features: FeatureStub, label: char, ideal: f64) -> bool {
        if features.len() != self.stub_dim {
            warn!(
                expected = self.stub_dim,
                actual = features.len(),
                "Feature stub has wrong length, training case skipped"
            );
            return false;
        }
        if !ideal.is_finite() || features.as_slice().iter().any(|v| !v.is_finite()) {
            warn!(label = %label, "Non-finite training case skipped");
            return false;
        }
        if self.alphabet.code_of(label).is_none() {
            return false;
        }
        self.cases.push(TrainingCase {
            features,
            label,
            ideal,
        });
        true
    }

    /// Accumulated training set, in insertion order.
    pub fn cases(&self) -> &[TrainingCase] {
        &self.cases
    }

    /// Full feature vectors and ideal scores for the accumulated cases.
    pub fn training_set(&self) -> (Vec<FeatureVector>, Vec<f64>) {
        self.cases
            .iter()
            .filter_map(|case| {
                self.alphabet
                    .code_of(case.label)
                    .map(|code| (case.features.with_code(code), case.ideal))
            })
            .unzip()
    }

    /// Package the current model and training set for a training run.
    pub fn training_job(&self) -> TrainingJob<M> {
        let (inputs, ideals) = self.training_set();
        TrainingJob {
            model: self.model.clone(),
            inputs,
            ideals,
            limits: self.limits,
        }
    }

    /// Train over the accumulated set in the calling thread.
    pub fn train(&mut self) -> SensingResult<TrainingReport> {
        let (model, report) = self.training_job().run()?;
        self.model = model;
        Ok(report)
    }

    /// Replace the model with one trained elsewhere.
    pub fn install(&mut self, model: M) {
        self.model = model;
    }

    /// Score of `character` for the given motion.
    pub fn score(&self, stub: &FeatureStub, character: char) -> Option<f64> {
        let code = self.alphabet.code_of(character)?;
        Some(self.model.score(&stub.with_code(code)))
    }

    /// Best-scoring character for the given motion.
    ///
    /// Deterministic for a fixed model. Ties resolve to the earliest
    /// character in the alphabet. Returns `None` only if no character
    /// produced a comparable score.
    pub fn infer(&self, stub: &FeatureStub) -> Option<char> {
        if stub.len() != self.stub_dim {
            warn!(
                expected = self.stub_dim,
                actual = stub.len(),
                "Feature stub has wrong length, cannot infer"
            );
            return None;
        }

        let mut best: Option<(char, f64)> = None;
        for &c in self.alphabet.chars() {
            let Some(code) = self.alphabet.code_of(c) else {
                continue;
            };
            let score = self.model.score(&stub.with_code(code));
            if score.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((c, score));
            }
        }
        best.map(|(c, _)| c)
    }

    pub fn alphabet(&self) -> &TypeableAlphabet {
        &self.alphabet
    }
}

fn check_batch(input_dim: usize, inputs: &[FeatureVector], ideals: &[f64]) -> SensingResult<()> {
    if inputs.len() != ideals.len() {
        return Err(SensingError::DimensionMismatch {
            expected: inputs.len(),
            actual: ideals.len(),
        });
    }
    if let Some(bad) = inputs.iter().find(|v| v.len() != input_dim) {
        return Err(SensingError::DimensionMismatch {
            expected: input_dim,
            actual: bad.len(),
        });
    }
    Ok(())
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the sigmoid expressed through its output.
fn sigmoid_slope(y: f64) -> f64 {
    y * (1.0 - y)
}

fn rprop_update(weight: &mut f64, grad: f64, prev_grad: &mut f64, step: &mut f64) {
    let change = grad * *prev_grad;
    if change > 0.0 {
        *step = (*step * RPROP_ETA_PLUS).min(RPROP_STEP_MAX);
        *weight -= grad.signum() * *step;
        *prev_grad = grad;
    } else if change < 0.0 {
        *step = (*step * RPROP_ETA_MINUS).max(RPROP_STEP_MIN);
        *prev_grad = 0.0;
    } else {
        if grad != 0.0 {
            *weight -= grad.signum() * *step;
        }
        *prev_grad = grad;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(values: [f64; 12]) -> FeatureStub {
        FeatureStub::from_axes(&values[0..4], &values[4..8], &values[8..12])
    }

    fn small_batch() -> (Vec<FeatureVector>, Vec<f64>) {
        let a = stub([0.1, 0.2, 0.1, 0.3, 0.0, 0.1, 0.2, 0.1, 0.3, 0.2, 0.1, 0.0]);
        let b = stub([0.9, 0.7, 0.8, 0.6, 1.0, 0.8, 0.9, 0.7, 0.6, 0.8, 0.9, 1.0]);
        (vec![a.with_code(0), b.with_code(1)], vec![1.0, 0.0])
    }

    #[test]
    fn test_network_is_seed_deterministic() {
        let a = FeedForwardNetwork::new(13, 8, 3);
        let b = FeedForwardNetwork::new(13, 8, 3);
        let input = stub([1.0; 12]).with_code(4);
        assert_eq!(a.score(&input), b.score(&input));
    }

    #[test]
    fn test_score_is_bounded_by_sigmoid() {
        let network = FeedForwardNetwork::new(13, 8, 1);
        let score = network.score(&stub([25.0; 12]).with_code(25));
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_score_wrong_dimension_is_nan() {
        let network = FeedForwardNetwork::new(13, 8, 1);
        let short = FeatureStub::from_axes(&[1.0], &[1.0], &[1.0]).with_code(0);
        assert!(network.score(&short).is_nan());
    }

    #[test]
    fn test_train_respects_iteration_cap() {
        let mut network = FeedForwardNetwork::new(13, 8, 5);
        let (inputs, ideals) = small_batch();
        let limits = TrainingLimits {
            max_iterations: 7,
            target_error: 0.0,
            progress_interval: 0,
        };

        let fit = network.train(&inputs, &ideals, &limits).unwrap();
        assert_eq!(fit.iterations, 7);
    }

    #[test]
    fn test_train_stops_once_target_reached() {
        let mut network = FeedForwardNetwork::new(13, 8, 5);
        let (inputs, ideals) = small_batch();
        // Sigmoid outputs against targets in [0, 1] can never exceed 1.0 MSE.
        let limits = TrainingLimits {
            max_iterations: 1000,
            target_error: 1.0,
            progress_interval: 0,
        };

        let fit = network.train(&inputs, &ideals, &limits).unwrap();
        assert_eq!(fit.iterations, 1);
        assert!(fit.error <= 1.0);
    }

    #[test]
    fn test_train_reduces_error() {
        let mut network = FeedForwardNetwork::new(13, 8, 11);
        let (inputs, ideals) = small_batch();
        let before = network.mean_squared_error(&inputs, &ideals);

        let limits = TrainingLimits {
            max_iterations: 300,
            target_error: 1e-4,
            progress_interval: 0,
        };
        let fit = network.train(&inputs, &ideals, &limits).unwrap();

        assert!(fit.iterations <= 300);
        assert!(fit.error < before, "error {} should drop below {}", fit.error, before);
        assert!((network.mean_squared_error(&inputs, &ideals) - fit.error).abs() < 1e-12);
    }

    #[test]
    fn test_train_empty_batch() {
        let mut network = FeedForwardNetwork::new(13, 8, 5);
        let fit = network.train(&[], &[], &TrainingLimits::default()).unwrap();
        assert_eq!(fit.iterations, 0);
        assert_eq!(fit.error, 0.0);
    }

    #[test]
    fn test_train_rejects_mismatched_batch() {
        let mut network = FeedForwardNetwork::new(13, 8, 5);
        let (inputs, _) = small_batch();
        let result = network.train(&inputs, &[1.0], &TrainingLimits::default());
        assert!(matches!(result, Err(SensingError::DimensionMismatch { .. })));

        let short = vec![FeatureStub::from_axes(&[1.0], &[1.0], &[1.0]).with_code(0)];
        let result = network.train(&short, &[1.0], &TrainingLimits::default());
        assert!(matches!(result, Err(SensingError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_classifier_rejects_wrong_model_size() {
        let config = PipelineConfig::default();
        let model = FeedForwardNetwork::new(7, 4, 0);
        assert!(Classifier::with_model(&config, model).is_err());
    }

    #[test]
    fn test_infer_is_deterministic() {
        let classifier = Classifier::from_config(&PipelineConfig::default()).unwrap();
        let motion = stub([1.0, 2.0, 3.0, 4.0, 0.5, 0.5, 0.5, 0.5, 9.0, 9.0, 9.0, 9.0]);

        let first = classifier.infer(&motion);
        let second = classifier.infer(&motion);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_infer_returns_argmax() {
        let classifier = Classifier::from_config(&PipelineConfig::default()).unwrap();
        let motion = stub([0.3; 12]);

        let answer = classifier.infer(&motion).unwrap();
        let best = classifier.score(&motion, answer).unwrap();
        for &c in classifier.alphabet().chars() {
            assert!(classifier.score(&motion, c).unwrap() <= best);
        }
    }

    #[derive(Debug, Clone)]
    struct ConstantModel;

    impl TrainableModel for ConstantModel {
        fn input_dim(&self) -> usize {
            13
        }

        fn train(
            &mut self,
            _inputs: &[FeatureVector],
            _ideals: &[f64],
            _limits: &TrainingLimits,
        ) -> SensingResult<ModelFit> {
            Ok(ModelFit {
                iterations: 0,
                error: 0.0,
            })
        }

        fn score(&self, _input: &FeatureVector) -> f64 {
            0.5
        }
    }

    #[test]
    fn test_infer_tie_breaks_to_first_character() {
        let classifier =
            Classifier::with_model(&PipelineConfig::default(), ConstantModel).unwrap();
        assert_eq!(classifier.infer(&stub([0.0; 12])), Some('a'));
    }

    #[test]
    fn test_infer_rejects_wrong_stub_length() {
        let classifier = Classifier::from_config(&PipelineConfig::default()).unwrap();
        let short = FeatureStub::from_axes(&[1.0], &[1.0], &[1.0]);
        assert_eq!(classifier.infer(&short), None);
    }

    #[test]
    fn test_add_training_case_skips_untypeable_label() {
        let mut classifier = Classifier::from_config(&PipelineConfig::default()).unwrap();
        assert!(classifier.add_training_case(stub([0.0; 12]), 't', 1.0));
        assert!(!classifier.add_training_case(stub([0.0; 12]), 'T', 1.0));
        assert!(!classifier.add_training_case(stub([0.0; 12]), ' ', 1.0));
        assert_eq!(classifier.cases().len(), 1);

        let (inputs, ideals) = classifier.training_set();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].code(), Some(19.0));
        assert_eq!(ideals, vec![1.0]);
    }

    #[test]
    fn test_classifier_train_installs_model() {
        let mut config = PipelineConfig::default();
        config.classifier.max_iterations = 20;
        let mut classifier = Classifier::from_config(&config).unwrap();
        let motion = stub([0.2; 12]);
        classifier.add_training_case(motion.clone(), 'q', 1.0);

        let before = classifier.score(&motion, 'q').unwrap();
        let report = classifier.train().unwrap();
        let after = classifier.score(&motion, 'q').unwrap();

        assert_eq!(report.cases, 1);
        assert!(report.iterations >= 1 && report.iterations <= 20);
        assert_eq!(report.converged, report.error <= config.classifier.target_error);
        assert!(after > before, "score for the trained label should rise");
    }

    #[test]
    fn test_add_training_case_skips_non_finite_motion() {
        let mut classifier = Classifier::from_config(&PipelineConfig::default()).unwrap();
        let mut values = [1.0; 12];
        values[3] = f64::INFINITY;
        assert!(!classifier.add_training_case(stub(values), 'a', 1.0));
        values[3] = f64::NAN;
        assert!(!classifier.add_training_case(stub(values), 'a', 1.0));
        assert!(!classifier.add_training_case(stub([1.0; 12]), 'a', f64::NAN));
        assert!(classifier.cases().is_empty());
    }

    /// Model whose training always blows up.
    #[derive(Debug, Clone)]
    struct DivergingModel {
        level: f64,
    }

    impl TrainableModel for DivergingModel {
        fn input_dim(&self) -> usize {
            13
        }

        fn train(
            &mut self,
            _inputs: &[FeatureVector],
            _ideals: &[f64],
            limits: &TrainingLimits,
        ) -> SensingResult<ModelFit> {
            self.level = f64::NAN;
            Ok(ModelFit {
                iterations: limits.max_iterations,
                error: f64::NAN,
            })
        }

        fn score(&self, _input: &FeatureVector) -> f64 {
            self.level
        }
    }

    #[test]
    fn test_diverged_run_keeps_current_model() {
        let model = DivergingModel { level: 0.25 };
        let mut classifier = Classifier::with_model(&PipelineConfig::default(), model).unwrap();
        assert!(classifier.add_training_case(stub([1.0; 12]), 'k', 1.0));

        let outcome = classifier.train();

        assert!(matches!(outcome, Err(SensingError::TrainingUnavailable(_))));
        assert_eq!(classifier.score(&stub([1.0; 12]), 'k'), Some(0.25));
        assert_eq!(classifier.infer(&stub([1.0; 12])), Some('a'));
    }
}
