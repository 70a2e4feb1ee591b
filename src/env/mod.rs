pub mod sensor_drill;

use anyhow::Result;

use crate::ga::network::NeuralNetwork;

pub use sensor_drill::SensorDrill;

/// Runs one episode per genome and scores it.
///
/// Implementations own their own termination policy; the returned fitness should be
/// non-negative and finite.
pub trait Environment {
    fn run_episode(&mut self, genome: &NeuralNetwork) -> Result<f64>;
}

impl<E: Environment + ?Sized> Environment for &mut E {
    fn run_episode(&mut self, genome: &NeuralNetwork) -> Result<f64> {
        (**self).run_episode(genome)
    }
}
