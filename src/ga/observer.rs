use super::network::NeuralNetwork;
use crate::util::GenerationReport;

/// Hook for anything that wants to follow the population without owning it, e.g. a renderer.
///
/// All methods default to no-ops.
pub trait PopulationObserver {
    /// A new genome is up for evaluation at `ix`
    fn genome_changed(&mut self, _ix: usize, _genome: &NeuralNetwork) {}

    /// The genome at `ix` finished its episode
    fn fitness_recorded(&mut self, _ix: usize, _fitness: f64) {}

    /// The population was rebuilt after a full generation
    fn generation_completed(&mut self, _report: &GenerationReport) {}
}
