pub mod blueprint;
pub mod persist;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// structs

/// Best and average fitness scores of a single generation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopEvaluation {
    pub best_fitness: f64,
    pub avg_fitness: f64,
}

/// Summary of a generation that just finished, produced when the population is rebuilt
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Zero-based number of the finished generation
    pub generation: u32,
    pub evaluation: PopEvaluation,
    /// Population index the champion held during the finished generation
    pub champion_ix: usize,
    /// Crossover slots that found no distinct parent pair and were randomized instead
    pub exhausted_slots: usize,
}

/// Per-generation fitness history of an experiment
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExpHistory {
    pub start: u64,
    pub best_fitness_vec: Vec<f64>,
    pub avg_fitness_vec: Vec<f64>,
}

impl ExpHistory {
    pub fn push(&mut self, evaluation: PopEvaluation) {
        self.best_fitness_vec.push(evaluation.best_fitness);
        self.avg_fitness_vec.push(evaluation.avg_fitness);
    }
}

// util functions

pub fn env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("${} not set", key))
}

#[macro_export]
macro_rules! ensure_config {
    ($cond:expr) => {
        if !$cond {
            return Err($crate::ga::error::GaError::Configuration(format!(
                "assertion failed: {}",
                stringify!($cond)
            )));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::ga::error::GaError::Configuration(format!($($arg)+)));
        }
    };
}
