//! Fixed-topology layered feedforward network.
//!
//! Each population slot owns one [`LayeredNetwork`] whose topology is chosen
//! at construction and never changes. Evolution happens through
//! [`LayeredNetwork::mutate`] and [`LayeredNetwork::copy_weights_from`]; the
//! network itself knows nothing about lifeforms or scoring beyond the
//! caller-managed `fitness` field.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-width of the uniform interval used for fresh weights and biases.
const INIT_SPAN: f32 = 0.5;

/// Errors raised by network construction and the feedforward/copy contracts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// Input vector length does not match the input layer width.
    #[error("input length {got} does not match input layer width {expected}")]
    InputLength { expected: usize, got: usize },
    /// Source and destination networks have different layer shapes.
    #[error("cannot copy weights between networks with different topologies")]
    TopologyMismatch,
    /// The requested layer shape cannot form a network.
    #[error("invalid topology: {0}")]
    InvalidTopology(&'static str),
}

/// A fully-connected feedforward network with tanh activations.
///
/// Weights are indexed `[transition][to][from]`: `weights[t][j][k]` connects
/// neuron `k` of layer `t` to neuron `j` of layer `t + 1`. Biases cover every
/// non-input layer, indexed `[transition][to]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayeredNetwork {
    id: usize,
    layers: Vec<usize>,
    weights: Vec<Vec<Vec<f32>>>,
    biases: Vec<Vec<f32>>,
    activations: Vec<Vec<f32>>,
    /// Score assigned by the world after each move; not used internally.
    pub fitness: f32,
}

impl LayeredNetwork {
    /// Builds a network with uniform random weights and biases in
    /// [-0.5, 0.5]. `layers` must name at least an input and an output layer,
    /// each at least one neuron wide.
    pub fn new(id: usize, layers: &[usize], rng: &mut dyn RngCore) -> Result<Self, NetworkError> {
        if layers.len() < 2 {
            return Err(NetworkError::InvalidTopology(
                "a network needs an input and an output layer",
            ));
        }
        if layers.iter().any(|&width| width == 0) {
            return Err(NetworkError::InvalidTopology(
                "every layer needs at least one neuron",
            ));
        }

        let mut weights = Vec::with_capacity(layers.len() - 1);
        let mut biases = Vec::with_capacity(layers.len() - 1);
        for transition in layers.windows(2) {
            let (from, to) = (transition[0], transition[1]);
            let layer_weights = (0..to)
                .map(|_| {
                    (0..from)
                        .map(|_| rng.random_range(-INIT_SPAN..=INIT_SPAN))
                        .collect()
                })
                .collect();
            weights.push(layer_weights);
            biases.push(
                (0..to)
                    .map(|_| rng.random_range(-INIT_SPAN..=INIT_SPAN))
                    .collect(),
            );
        }

        Ok(Self {
            id,
            layers: layers.to_vec(),
            weights,
            biases,
            activations: Vec::new(),
            fitness: 0.0,
        })
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    #[must_use]
    pub fn weights(&self) -> &[Vec<Vec<f32>>] {
        &self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[Vec<f32>] {
        &self.biases
    }

    /// Per-layer activations recorded by the most recent
    /// [`feed_forward`](Self::feed_forward) call, input layer first. Empty
    /// before the first call.
    #[must_use]
    pub fn activations(&self) -> &[Vec<f32>] {
        &self.activations
    }

    /// Runs the network on `inputs` and returns the output layer.
    ///
    /// Every activation is `tanh(dot(weights, previous) + bias)`, so outputs
    /// land in (-1, 1). The full activation trace is retained for
    /// [`activations`](Self::activations).
    pub fn feed_forward(&mut self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        if inputs.len() != self.layers[0] {
            return Err(NetworkError::InputLength {
                expected: self.layers[0],
                got: inputs.len(),
            });
        }

        self.activations.clear();
        self.activations.push(inputs.to_vec());

        let mut current = inputs.to_vec();
        for (layer_weights, layer_biases) in self.weights.iter().zip(&self.biases) {
            let next: Vec<f32> = layer_weights
                .iter()
                .zip(layer_biases)
                .map(|(into, bias)| {
                    let sum: f32 = into.iter().zip(&current).map(|(w, a)| w * a).sum();
                    (sum + bias).tanh()
                })
                .collect();
            self.activations.push(next.clone());
            current = next;
        }

        Ok(current)
    }

    /// Perturbs each weight and bias independently with probability
    /// `percent_chance` (0..=100), adding a uniform value in
    /// [-magnitude, magnitude]. A zero chance leaves the network untouched.
    pub fn mutate(&mut self, percent_chance: f32, magnitude: f32, rng: &mut dyn RngCore) {
        for layer_weights in &mut self.weights {
            for into in layer_weights {
                for weight in into {
                    if rng.random_range(0.0..100.0) < percent_chance {
                        *weight += rng.random_range(-magnitude..=magnitude);
                    }
                }
            }
        }
        for layer_biases in &mut self.biases {
            for bias in layer_biases {
                if rng.random_range(0.0..100.0) < percent_chance {
                    *bias += rng.random_range(-magnitude..=magnitude);
                }
            }
        }
    }

    /// Deep-copies weights and biases from `source`, leaving id and fitness
    /// alone. Both networks must share a topology.
    pub fn copy_weights_from(&mut self, source: &Self) -> Result<(), NetworkError> {
        if self.layers != source.layers {
            return Err(NetworkError::TopologyMismatch);
        }
        self.weights = source.weights.clone();
        self.biases = source.biases.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    #[test]
    fn construction_allocates_matching_dimensions() {
        let mut rng = rng(7);
        let net = LayeredNetwork::new(0, &[4, 6, 2], &mut rng).unwrap();
        assert_eq!(net.layers(), &[4, 6, 2]);
        assert_eq!(net.weights().len(), 2);
        assert_eq!(net.weights()[0].len(), 6);
        assert_eq!(net.weights()[0][0].len(), 4);
        assert_eq!(net.weights()[1].len(), 2);
        assert_eq!(net.weights()[1][0].len(), 6);
        assert_eq!(net.biases()[0].len(), 6);
        assert_eq!(net.biases()[1].len(), 2);
        for layer in net.weights() {
            for into in layer {
                for &w in into {
                    assert!((-0.5..=0.5).contains(&w));
                }
            }
        }
    }

    #[test]
    fn construction_rejects_degenerate_topologies() {
        let mut rng = rng(7);
        assert!(matches!(
            LayeredNetwork::new(0, &[3], &mut rng),
            Err(NetworkError::InvalidTopology(_))
        ));
        assert!(matches!(
            LayeredNetwork::new(0, &[3, 0, 2], &mut rng),
            Err(NetworkError::InvalidTopology(_))
        ));
    }

    #[test]
    fn feed_forward_returns_output_layer_in_tanh_range() {
        let mut rng = rng(11);
        let mut net = LayeredNetwork::new(0, &[3, 5, 4], &mut rng).unwrap();
        let out = net.feed_forward(&[0.5, -0.25, 1.0]).unwrap();
        assert_eq!(out.len(), 4);
        for &o in &out {
            assert!((-1.0..=1.0).contains(&o));
        }
        // Snapshot holds input, hidden, and output layers.
        assert_eq!(net.activations().len(), 3);
        assert_eq!(net.activations()[0], vec![0.5, -0.25, 1.0]);
        assert_eq!(net.activations()[2], out);
    }

    #[test]
    fn feed_forward_works_without_hidden_layers() {
        let mut rng = rng(13);
        let mut net = LayeredNetwork::new(0, &[1, 2], &mut rng).unwrap();
        let out = net.feed_forward(&[0.0]).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn feed_forward_rejects_wrong_input_width() {
        let mut rng = rng(17);
        let mut net = LayeredNetwork::new(0, &[3, 2], &mut rng).unwrap();
        assert_eq!(
            net.feed_forward(&[1.0, 2.0]),
            Err(NetworkError::InputLength {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn zero_chance_mutation_changes_nothing() {
        let mut rng = rng(19);
        let mut net = LayeredNetwork::new(0, &[4, 4, 2], &mut rng).unwrap();
        let weights_before = net.weights().to_vec();
        let biases_before = net.biases().to_vec();
        net.mutate(0.0, 10.0, &mut rng);
        assert_eq!(net.weights(), &weights_before[..]);
        assert_eq!(net.biases(), &biases_before[..]);
    }

    #[test]
    fn full_chance_mutation_perturbs_every_parameter() {
        let mut rng = rng(23);
        let mut net = LayeredNetwork::new(0, &[3, 3, 2], &mut rng).unwrap();
        let before = net.clone();
        net.mutate(100.0, 0.5, &mut rng);
        let mut changed = 0usize;
        let mut total = 0usize;
        for (layer, layer_before) in net.weights().iter().zip(before.weights()) {
            for (into, into_before) in layer.iter().zip(layer_before) {
                for (&w, &w0) in into.iter().zip(into_before) {
                    total += 1;
                    if w != w0 {
                        changed += 1;
                    }
                }
            }
        }
        // A zero-width perturbation is possible but vanishingly unlikely for
        // more than a couple of the 15 weights.
        assert!(changed >= total - 2, "{changed}/{total} weights changed");
    }

    #[test]
    fn copy_transfers_weights_but_not_identity() {
        let mut rng = rng(29);
        let source = LayeredNetwork::new(3, &[4, 3, 2], &mut rng).unwrap();
        let mut dest = LayeredNetwork::new(9, &[4, 3, 2], &mut rng).unwrap();
        dest.fitness = 42.0;
        dest.copy_weights_from(&source).unwrap();
        assert_eq!(dest.weights(), source.weights());
        assert_eq!(dest.biases(), source.biases());
        assert_eq!(dest.id(), 9);
        assert_eq!(dest.fitness, 42.0);
    }

    #[test]
    fn copy_rejects_topology_mismatch() {
        let mut rng = rng(31);
        let source = LayeredNetwork::new(0, &[4, 3, 2], &mut rng).unwrap();
        let mut dest = LayeredNetwork::new(1, &[4, 2], &mut rng).unwrap();
        assert_eq!(
            dest.copy_weights_from(&source),
            Err(NetworkError::TopologyMismatch)
        );
    }
}
