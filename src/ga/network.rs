use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

use super::{
    error::GaError,
    record::{GenomeRecord, MatrixRecord},
};
use crate::ensure_config;

/// Weights are initialized and perturbed within this range
const WEIGHT_RANGE: std::ops::RangeInclusive<f64> = -1.0..=1.0;

/// Divisor bounding how many entries of one matrix a single mutation may touch
const MUTATION_SPREAD: usize = 7;

/// Fully-connected feedforward network with tanh activations.
///
/// Each layer transition carries one weight matrix (`layer_sizes[i] x layer_sizes[i + 1]`)
/// and one bias scalar that is broadcast over the whole pre-activation of the next layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    layer_sizes: Vec<usize>,
    weights: Vec<DMatrix<f64>>,
    biases: Vec<f64>,
    pub fitness: f64,
}

impl NeuralNetwork {
    /// Build a network of the given shape with all weights and biases zeroed
    pub fn new(layer_sizes: &[usize]) -> Result<Self, GaError> {
        ensure_config!(
            layer_sizes.len() >= 2,
            "a network needs at least 2 layers, got {}",
            layer_sizes.len()
        );
        ensure_config!(
            layer_sizes.iter().all(|&n| n > 0),
            "layer sizes must be positive, got {:?}",
            layer_sizes
        );

        let weights = layer_sizes
            .windows(2)
            .map(|pair| DMatrix::<f64>::zeros(pair[0], pair[1]))
            .collect::<Vec<_>>();
        let biases = vec![0.0; weights.len()];

        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            weights,
            biases,
            fitness: 0.0,
        })
    }

    /// Build a network of the given shape and randomize it
    pub fn random<R: Rng>(layer_sizes: &[usize], rng: &mut R) -> Result<Self, GaError> {
        let mut network = Self::new(layer_sizes)?;
        network.randomize(rng);
        Ok(network)
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn weights(&self) -> &[DMatrix<f64>] {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Redraw every weight and bias uniformly from `[-1, 1]`.
    ///
    /// Draw order is fixed (per transition: bias, then weights row by row) so a seeded
    /// source always yields the same network.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for (weight, bias) in self.weights.iter_mut().zip(self.biases.iter_mut()) {
            *bias = rng.random_range(WEIGHT_RANGE);
            for row in 0..weight.nrows() {
                for col in 0..weight.ncols() {
                    weight[(row, col)] = rng.random_range(WEIGHT_RANGE);
                }
            }
        }
    }

    /// Run the network on one input vector and return the output layer activations
    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>, GaError> {
        if inputs.len() != self.input_size() {
            return Err(GaError::ShapeMismatch {
                expected: self.input_size(),
                actual: inputs.len(),
            });
        }

        let mut state = DMatrix::from_row_slice(1, inputs.len(), inputs).map(f64::tanh);
        for (weight, &bias) in self.weights.iter().zip(&self.biases) {
            state = (&state * weight).add_scalar(bias).map(f64::tanh);
        }

        // 1 x n, so column-major iteration is the output order
        Ok(state.iter().copied().collect())
    }

    /// Breed a child that takes each whole weight matrix and each bias from one of the parents
    pub fn crossover<R: Rng>(
        a: &NeuralNetwork,
        b: &NeuralNetwork,
        rng: &mut R,
    ) -> Result<Self, GaError> {
        if a.layer_sizes != b.layer_sizes {
            return Err(GaError::ArchitectureMismatch {
                left: a.layer_sizes.clone(),
                right: b.layer_sizes.clone(),
            });
        }

        let weights = a
            .weights
            .iter()
            .zip(&b.weights)
            .map(|(wa, wb)| if rng.random_bool(0.5) { wa.clone() } else { wb.clone() })
            .collect();
        let biases = a
            .biases
            .iter()
            .zip(&b.biases)
            .map(|(&ba, &bb)| if rng.random_bool(0.5) { ba } else { bb })
            .collect();

        Ok(Self {
            layer_sizes: a.layer_sizes.clone(),
            weights,
            biases,
            fitness: 0.0,
        })
    }

    /// Perturb random entries of randomly chosen weight matrices. Biases are left alone.
    ///
    /// Each matrix is picked with probability `rate`; a picked matrix gets between 1 and
    /// `max(1, entries / 7)` point mutations, drawn with replacement, each clamped to `[-1, 1]`.
    pub fn mutate<R: Rng>(&mut self, rate: f64, rng: &mut R) -> Result<(), GaError> {
        let bern = Bernoulli::new(rate).map_err(|_| {
            GaError::Configuration(format!("mutation rate must be within [0, 1], got {}", rate))
        })?;

        for weight in &mut self.weights {
            if !bern.sample(rng) {
                continue;
            }

            let (rows, cols) = weight.shape();
            let max_points = (rows * cols / MUTATION_SPREAD).max(1);
            let points = rng.random_range(1..=max_points);

            for _ in 0..points {
                let row = rng.random_range(0..rows);
                let col = rng.random_range(0..cols);
                let entry = &mut weight[(row, col)];
                *entry = (*entry + rng.random_range(WEIGHT_RANGE)).clamp(-1.0, 1.0);
            }
        }

        Ok(())
    }

    pub fn serialize(&self) -> GenomeRecord {
        GenomeRecord::from(self)
    }

    pub fn deserialize(record: GenomeRecord) -> Result<Self, GaError> {
        Self::try_from(record)
    }
}

impl From<&NeuralNetwork> for GenomeRecord {
    fn from(network: &NeuralNetwork) -> Self {
        let weights = network
            .weights
            .iter()
            .map(|weight| MatrixRecord {
                rows: weight.nrows(),
                cols: weight.ncols(),
                // nalgebra stores column-major, the record is row-major
                flattened: weight.transpose().as_slice().to_vec(),
            })
            .collect();

        GenomeRecord {
            weights,
            biases: network.biases.clone(),
        }
    }
}

impl TryFrom<GenomeRecord> for NeuralNetwork {
    type Error = GaError;

    fn try_from(record: GenomeRecord) -> Result<Self, Self::Error> {
        let corrupt = |msg: String| Err(GaError::CorruptGenomeData(msg));

        if record.weights.is_empty() {
            return corrupt("genome has no weight matrices".to_string());
        }
        if record.weights.len() != record.biases.len() {
            return corrupt(format!(
                "{} weight matrices but {} biases",
                record.weights.len(),
                record.biases.len()
            ));
        }

        let mut layer_sizes = vec![record.weights[0].rows];
        let mut weights = Vec::with_capacity(record.weights.len());

        for (i, matrix) in record.weights.into_iter().enumerate() {
            if matrix.rows == 0 || matrix.cols == 0 {
                return corrupt(format!(
                    "matrix {} has zero-sized shape {}x{}",
                    i, matrix.rows, matrix.cols
                ));
            }
            if matrix.rows.checked_mul(matrix.cols) != Some(matrix.flattened.len()) {
                return corrupt(format!(
                    "matrix {} is {}x{} but holds {} entries",
                    i,
                    matrix.rows,
                    matrix.cols,
                    matrix.flattened.len()
                ));
            }
            let prev = layer_sizes[layer_sizes.len() - 1];
            if matrix.rows != prev {
                return corrupt(format!(
                    "matrix {} has {} rows but the previous layer has {} neurons",
                    i, matrix.rows, prev
                ));
            }

            layer_sizes.push(matrix.cols);
            weights.push(DMatrix::from_row_slice(
                matrix.rows,
                matrix.cols,
                &matrix.flattened,
            ));
        }

        Ok(Self {
            layer_sizes,
            weights,
            biases: record.biases,
            fitness: 0.0,
        })
    }
}
