//! Generational neuroevolution of small fully-connected tanh networks.
//!
//! [`ga::population::PopulationManager`] hands out one genome at a time, takes back its
//! fitness, and rebuilds the population through elitism, gene pool crossover, mutation and
//! random fill once every genome has been scored.

pub mod env;
pub mod experiment;
pub mod ga;
pub mod util;
