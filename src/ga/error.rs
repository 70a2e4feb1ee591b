use thiserror::Error;

/// Failures raised by the genetic-algorithm core
#[derive(Debug, Error)]
pub enum GaError {
    #[error("network expects {expected} inputs, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("cannot cross networks with layer sizes {left:?} and {right:?}")]
    ArchitectureMismatch { left: Vec<usize>, right: Vec<usize> },
    #[error("corrupt genome data: {0}")]
    CorruptGenomeData(String),
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("fitness must be a finite number, got {0}")]
    InvalidFitness(f64),
}
