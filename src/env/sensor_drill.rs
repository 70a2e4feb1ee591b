use anyhow::{Result, bail};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::Environment;
use crate::ga::network::NeuralNetwork;

/// Readings before the stall check kicks in, as a fraction of the episode
const GRACE_FRACTION: f64 = 0.25;
/// Episodes averaging less reward per step than this after the grace period end early
const STALL_REWARD: f64 = 0.2;

/// Physics-free steering drill for controllers with 3 inputs and 2 outputs.
///
/// Every episode replays the same seeded stream of (left, front, right) clearances in `[0, 1)`.
/// The controller should yaw toward the open side (`right - left`) and throttle by the front
/// clearance. Output 0 is squashed with a logistic sigmoid to give the throttle, output 1 is
/// the yaw. Each reading scores `max(0, 1 - (|yaw error| + |throttle error|) / 2)`.
#[derive(Debug, Clone)]
pub struct SensorDrill {
    steps: usize,
    seed: u64,
    stall_reward: f64,
    fitness_cap: Option<f64>,
}

impl SensorDrill {
    pub fn new(steps: usize, seed: u64) -> Self {
        Self {
            steps,
            seed,
            stall_reward: STALL_REWARD,
            fitness_cap: None,
        }
    }

    /// Minimum average reward per reading an episode must keep up after the grace period
    pub fn with_stall_reward(mut self, reward: f64) -> Self {
        self.stall_reward = reward;
        self
    }

    /// End an episode as soon as its fitness reaches `cap`
    pub fn with_fitness_cap(mut self, cap: f64) -> Self {
        self.fitness_cap = Some(cap);
        self
    }
}

impl Environment for SensorDrill {
    fn run_episode(&mut self, genome: &NeuralNetwork) -> Result<f64> {
        if genome.output_size() < 2 {
            bail!(
                "Sensor drill needs at least 2 outputs (throttle, yaw), network has {}",
                genome.output_size()
            );
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let grace = (self.steps as f64 * GRACE_FRACTION).ceil() as usize;
        let mut fitness = 0.0;

        for step in 1..=self.steps {
            let [left, front, right]: [f64; 3] = rng.random();
            let outputs = genome.forward(&[left, front, right])?;

            let throttle = sigmoid(outputs[0]);
            let yaw = outputs[1];
            let error = (yaw - (right - left)).abs() + (throttle - front).abs();
            fitness += (1.0 - error / 2.0).max(0.0);

            if step >= grace && fitness < self.stall_reward * step as f64 {
                break;
            }
            if self.fitness_cap.is_some_and(|cap| fitness >= cap) {
                break;
            }
        }

        Ok(fitness)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_network() -> NeuralNetwork {
        // all-zero weights: throttle sigmoid(0) = 0.5, yaw 0
        NeuralNetwork::new(&[3, 2]).unwrap()
    }

    #[test]
    fn episodes_are_repeatable() {
        let genome = NeuralNetwork::random(&[3, 10, 10, 2], &mut StdRng::seed_from_u64(3)).unwrap();
        let mut drill = SensorDrill::new(100, 9);

        let first = drill.run_episode(&genome).unwrap();
        assert_eq!(drill.run_episode(&genome).unwrap(), first);
        assert!(first >= 0.0);
    }

    #[test]
    fn fitness_is_bounded_by_steps() {
        let mut drill = SensorDrill::new(50, 1);
        let fitness = drill.run_episode(&silent_network()).unwrap();

        assert!(fitness > 0.0);
        assert!(fitness <= 50.0);
    }

    #[test]
    fn cap_ends_episode_early() {
        let mut drill = SensorDrill::new(500, 1).with_fitness_cap(5.0);
        let fitness = drill.run_episode(&silent_network()).unwrap();

        assert!(fitness >= 5.0);
        assert!(fitness < 6.0);
    }

    #[test]
    fn stalling_controller_ends_after_grace() {
        let genome = silent_network();
        let full = SensorDrill::new(400, 1)
            .with_stall_reward(0.0)
            .run_episode(&genome)
            .unwrap();
        // nothing averages a perfect score, so the episode ends right after the grace period
        let stalled = SensorDrill::new(400, 1)
            .with_stall_reward(1.0)
            .run_episode(&genome)
            .unwrap();

        assert!(stalled <= 100.0);
        assert!(stalled < full);
    }

    #[test]
    fn rejects_wrong_shapes() {
        let mut drill = SensorDrill::new(10, 1);

        let one_output = NeuralNetwork::new(&[3, 1]).unwrap();
        assert!(drill.run_episode(&one_output).is_err());

        let four_inputs = NeuralNetwork::new(&[4, 2]).unwrap();
        assert!(drill.run_episode(&four_inputs).is_err());
    }
}
