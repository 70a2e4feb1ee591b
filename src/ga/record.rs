use serde::{Deserialize, Serialize};

/// One weight matrix as stored in a genome file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRecord {
    pub rows: usize,
    pub cols: usize,
    /// Row-major entries, `rows * cols` long
    pub flattened: Vec<f64>,
}

/// Persisted form of a [`NeuralNetwork`](super::network::NeuralNetwork).
///
/// Layer sizes are not stored. They are recovered from the matrix shapes on load:
/// the first layer is the first matrix's row count, every later layer is a column count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeRecord {
    pub weights: Vec<MatrixRecord>,
    pub biases: Vec<f64>,
}
