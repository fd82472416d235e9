//! Fixed-topology feed-forward networks used as bird policies.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::episode::{Genome, Policy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub inputs: usize,
    pub outputs: usize,
    /// Row-major, one row of `inputs` weights per output.
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl Layer {
    fn random(inputs: usize, outputs: usize, rng: &mut impl Rng) -> Self {
        Self {
            inputs,
            outputs,
            weights: (0..inputs * outputs)
                .map(|_| rng.gen_range(-1.0..1.0))
                .collect(),
            biases: (0..outputs).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        }
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .chunks(self.inputs)
            .zip(&self.biases)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }
}

/// Hidden layers squash with `tanh`, the output layer with a sigmoid so a
/// single output reads as a jump probability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
}

impl Network {
    /// `sizes` lists neuron counts from inputs to outputs.
    pub fn random(sizes: &[usize], rng: &mut impl Rng) -> Self {
        assert!(sizes.len() >= 2, "a network needs inputs and outputs");
        Self {
            layers: sizes
                .windows(2)
                .map(|w| Layer::random(w[0], w[1], rng))
                .collect(),
        }
    }

    pub fn forward(&self, inputs: &[f64]) -> Vec<f64> {
        debug_assert_eq!(inputs.len(), self.layers[0].inputs);
        let last = self.layers.len() - 1;
        let mut activation = inputs.to_vec();
        for (i, layer) in self.layers.iter().enumerate() {
            activation = layer.forward(&activation);
            let squash: fn(f64) -> f64 = if i == last { sigmoid } else { f64::tanh };
            activation.iter_mut().for_each(|a| *a = squash(*a));
        }
        activation
    }

    pub fn params(&self) -> impl Iterator<Item = &f64> {
        self.layers
            .iter()
            .flat_map(|l| l.weights.iter().chain(&l.biases))
    }

    pub fn params_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.weights.iter_mut().chain(l.biases.iter_mut()))
    }

    /// Each parameter is, with probability `rate`, either nudged by up to
    /// `power` or (with probability `replace`) redrawn.
    pub fn mutate(&mut self, rate: f64, power: f64, replace: f64, rng: &mut impl Rng) {
        for p in self.params_mut() {
            if !rng.gen_bool(rate) {
                continue;
            }
            if rng.gen_bool(replace) {
                *p = rng.gen_range(-1.0..1.0);
            } else {
                *p += rng.gen_range(-power..=power);
            }
        }
    }

    /// Uniform crossover; both parents must share a topology.
    pub fn crossover(&self, other: &Network, rng: &mut impl Rng) -> Network {
        let mut child = self.clone();
        for (c, o) in child.params_mut().zip(other.params()) {
            if rng.gen_bool(0.5) {
                *c = *o;
            }
        }
        child
    }
}

impl Policy for Network {
    fn activate(&self, sensors: [f64; 3]) -> f64 {
        self.forward(&sensors)[0]
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetGenome {
    pub net: Network,
    pub fitness: f64,
}

impl NetGenome {
    pub fn random(hidden: usize, rng: &mut impl Rng) -> Self {
        let sizes: &[usize] = if hidden == 0 { &[3, 1] } else { &[3, hidden, 1] };
        Self {
            net: Network::random(sizes, rng),
            fitness: 0.0,
        }
    }
}

impl Genome for NetGenome {
    type Policy = Network;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn policy(&self) -> Network {
        self.net.clone()
    }
}
