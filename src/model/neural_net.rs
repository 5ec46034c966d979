//! Feed-forward neural network classifier.
//!
//! Two hidden ReLU layers (100 then 50 units) with a softmax output,
//! trained full-batch with Adam on cross-entropy plus L2 regularization.
//! Initialization and training are fully deterministic from a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{MailsiftError, Result};
use crate::features::SparseVector;
use crate::model::{Classifier, ClassProbabilities, Label};

const HIDDEN_1: usize = 100;
const HIDDEN_2: usize = 50;
const N_CLASSES: usize = 2;

/// Two-hidden-layer MLP classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    /// L2 regularization strength.
    alpha: f64,
    /// Adam step size.
    learning_rate: f64,
    /// Upper bound on full-batch iterations.
    max_iter: usize,
    /// Minimum loss improvement counted as progress.
    tol: f64,
    /// Iterations without progress before stopping early.
    n_iter_no_change: usize,
    /// Seed for weight initialization.
    seed: u64,

    // Row-major weights: w1[feature * HIDDEN_1 + unit], etc.
    w1: Vec<f64>,
    b1: Vec<f64>,
    w2: Vec<f64>,
    b2: Vec<f64>,
    w3: Vec<f64>,
    b3: Vec<f64>,
    n_features: usize,
    trained: bool,
}

impl Default for MlpClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MlpClassifier {
    /// Create an unfitted network with the fixed training configuration
    /// (alpha = 0.001, at most 500 iterations, seed 42).
    pub fn new() -> Self {
        MlpClassifier {
            alpha: 0.001,
            learning_rate: 0.01,
            max_iter: 500,
            tol: 1e-4,
            n_iter_no_change: 10,
            seed: 42,
            w1: Vec::new(),
            b1: Vec::new(),
            w2: Vec::new(),
            b2: Vec::new(),
            w3: Vec::new(),
            b3: Vec::new(),
            n_features: 0,
            trained: false,
        }
    }

    /// Glorot-uniform initialization of one weight matrix.
    fn init_layer(rng: &mut StdRng, fan_in: usize, fan_out: usize) -> Vec<f64> {
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        (0..fan_in * fan_out)
            .map(|_| rng.random_range(-limit..limit))
            .collect()
    }

    /// Forward pass for one sample, returning all activations.
    fn forward(&self, x: &SparseVector) -> ([f64; N_CLASSES], Vec<f64>, Vec<f64>) {
        let mut z1 = self.b1.clone();
        for (idx, value) in x.iter() {
            if idx < self.n_features {
                let row = &self.w1[idx * HIDDEN_1..(idx + 1) * HIDDEN_1];
                for (h, &w) in row.iter().enumerate() {
                    z1[h] += value * w;
                }
            }
        }
        let a1: Vec<f64> = z1.iter().map(|&z| z.max(0.0)).collect();

        let mut z2 = self.b2.clone();
        for (j, &a) in a1.iter().enumerate() {
            if a != 0.0 {
                let row = &self.w2[j * HIDDEN_2..(j + 1) * HIDDEN_2];
                for (k, &w) in row.iter().enumerate() {
                    z2[k] += a * w;
                }
            }
        }
        let a2: Vec<f64> = z2.iter().map(|&z| z.max(0.0)).collect();

        let mut z3 = [self.b3[0], self.b3[1]];
        for (k, &a) in a2.iter().enumerate() {
            if a != 0.0 {
                z3[0] += a * self.w3[k * N_CLASSES];
                z3[1] += a * self.w3[k * N_CLASSES + 1];
            }
        }

        let max = z3[0].max(z3[1]);
        let e0 = (z3[0] - max).exp();
        let e1 = (z3[1] - max).exp();
        let total = e0 + e1;
        ([e0 / total, e1 / total], a1, a2)
    }
}

/// Adam optimizer state for one parameter group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AdamState {
    m: Vec<f64>,
    v: Vec<f64>,
}

impl AdamState {
    fn new(len: usize) -> Self {
        AdamState {
            m: vec![0.0; len],
            v: vec![0.0; len],
        }
    }

    fn step(&mut self, params: &mut [f64], grads: &[f64], lr: f64, t: usize) {
        const BETA1: f64 = 0.9;
        const BETA2: f64 = 0.999;
        const EPS: f64 = 1e-8;

        let bias1 = 1.0 - BETA1.powi(t as i32);
        let bias2 = 1.0 - BETA2.powi(t as i32);
        for ((p, g), (m, v)) in params
            .iter_mut()
            .zip(grads)
            .zip(self.m.iter_mut().zip(self.v.iter_mut()))
        {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *p -= lr * m_hat / (v_hat.sqrt() + EPS);
        }
    }
}

impl Classifier for MlpClassifier {
    fn fit(&mut self, features: &[SparseVector], labels: &[Label]) -> Result<()> {
        if features.is_empty() || features.len() != labels.len() {
            return Err(MailsiftError::training(
                "MLP requires a non-empty feature/label set of equal length",
            ));
        }

        let n_features = features[0].dim;
        let n = features.len() as f64;

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.n_features = n_features;
        self.w1 = Self::init_layer(&mut rng, n_features, HIDDEN_1);
        self.b1 = vec![0.0; HIDDEN_1];
        self.w2 = Self::init_layer(&mut rng, HIDDEN_1, HIDDEN_2);
        self.b2 = vec![0.0; HIDDEN_2];
        self.w3 = Self::init_layer(&mut rng, HIDDEN_2, N_CLASSES);
        self.b3 = vec![0.0; N_CLASSES];

        let mut adam_w1 = AdamState::new(self.w1.len());
        let mut adam_b1 = AdamState::new(HIDDEN_1);
        let mut adam_w2 = AdamState::new(self.w2.len());
        let mut adam_b2 = AdamState::new(HIDDEN_2);
        let mut adam_w3 = AdamState::new(self.w3.len());
        let mut adam_b3 = AdamState::new(N_CLASSES);

        let mut gw1 = vec![0.0f64; self.w1.len()];
        let mut gb1 = vec![0.0f64; HIDDEN_1];
        let mut gw2 = vec![0.0f64; self.w2.len()];
        let mut gb2 = vec![0.0f64; HIDDEN_2];
        let mut gw3 = vec![0.0f64; self.w3.len()];
        let mut gb3 = vec![0.0f64; N_CLASSES];

        let mut best_loss = f64::INFINITY;
        let mut no_change = 0usize;

        for iter in 1..=self.max_iter {
            gw1.fill(0.0);
            gb1.fill(0.0);
            gw2.fill(0.0);
            gb2.fill(0.0);
            gw3.fill(0.0);
            gb3.fill(0.0);

            let mut loss = 0.0f64;
            for (x, &y) in features.iter().zip(labels) {
                let (probs, a1, a2) = self.forward(x);
                let class = y.index();
                loss -= probs[class].max(1e-12).ln();

                // Output layer delta, averaged over the batch.
                let mut delta3 = [probs[0] / n, probs[1] / n];
                delta3[class] -= 1.0 / n;

                let mut delta2 = vec![0.0f64; HIDDEN_2];
                for (k, &a) in a2.iter().enumerate() {
                    gw3[k * N_CLASSES] += a * delta3[0];
                    gw3[k * N_CLASSES + 1] += a * delta3[1];
                    if a > 0.0 {
                        delta2[k] = self.w3[k * N_CLASSES] * delta3[0]
                            + self.w3[k * N_CLASSES + 1] * delta3[1];
                    }
                }
                gb3[0] += delta3[0];
                gb3[1] += delta3[1];

                let mut delta1 = vec![0.0f64; HIDDEN_1];
                for (j, &a) in a1.iter().enumerate() {
                    let row = &self.w2[j * HIDDEN_2..(j + 1) * HIDDEN_2];
                    if a != 0.0 {
                        for (k, &d) in delta2.iter().enumerate() {
                            gw2[j * HIDDEN_2 + k] += a * d;
                        }
                    }
                    if a > 0.0 {
                        let mut sum = 0.0;
                        for (k, &d) in delta2.iter().enumerate() {
                            sum += row[k] * d;
                        }
                        delta1[j] = sum;
                    }
                }
                for (k, &d) in delta2.iter().enumerate() {
                    gb2[k] += d;
                }

                for (idx, value) in x.iter() {
                    if idx < n_features {
                        let grad_row = &mut gw1[idx * HIDDEN_1..(idx + 1) * HIDDEN_1];
                        for (h, &d) in delta1.iter().enumerate() {
                            grad_row[h] += value * d;
                        }
                    }
                }
                for (h, &d) in delta1.iter().enumerate() {
                    gb1[h] += d;
                }
            }

            // L2 penalty on weights (not biases), scaled by the batch size.
            let reg = self.alpha / n;
            let mut sq = 0.0;
            for (g, &w) in gw1.iter_mut().zip(&self.w1) {
                *g += reg * w;
                sq += w * w;
            }
            for (g, &w) in gw2.iter_mut().zip(&self.w2) {
                *g += reg * w;
                sq += w * w;
            }
            for (g, &w) in gw3.iter_mut().zip(&self.w3) {
                *g += reg * w;
                sq += w * w;
            }
            loss = loss / n + 0.5 * reg * sq;

            adam_w1.step(&mut self.w1, &gw1, self.learning_rate, iter);
            adam_b1.step(&mut self.b1, &gb1, self.learning_rate, iter);
            adam_w2.step(&mut self.w2, &gw2, self.learning_rate, iter);
            adam_b2.step(&mut self.b2, &gb2, self.learning_rate, iter);
            adam_w3.step(&mut self.w3, &gw3, self.learning_rate, iter);
            adam_b3.step(&mut self.b3, &gb3, self.learning_rate, iter);

            if !loss.is_finite() {
                return Err(MailsiftError::training(format!(
                    "MLP loss diverged at iteration {iter}"
                )));
            }

            if loss < best_loss - self.tol {
                best_loss = loss;
                no_change = 0;
            } else {
                no_change += 1;
                if no_change >= self.n_iter_no_change {
                    break;
                }
            }
        }

        self.trained = true;
        Ok(())
    }

    fn predict_proba(&self, features: &SparseVector) -> Result<ClassProbabilities> {
        if !self.is_trained() {
            return Err(MailsiftError::training("MLP model is not fitted"));
        }
        let (probs, _, _) = self.forward(features);
        Ok(ClassProbabilities {
            ham: probs[Label::Ham.index()],
            spam: probs[Label::Spam.index()],
        })
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn name(&self) -> &'static str {
        "neural_network"
    }
}
