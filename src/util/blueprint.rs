use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ensure_config, ga::error::GaError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Directory saved genomes are written to
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Number of sensor readings per episode of the demo environment
    #[serde(default = "default_episode_steps")]
    pub episode_steps: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            episode_steps: default_episode_steps(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub layer_sizes: Vec<usize>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layer_sizes: vec![3, 10, 10, 2],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GAConfig {
    pub population_count: usize,
    /// Top ranked genomes that enter the gene pool; the very best is also carried over unchanged
    pub best_agent_selection: usize,
    /// Bottom ranked genomes that enter the gene pool
    pub worst_agent_selection: usize,
    pub crossover_count: usize,
    pub mutation_rate: f64,
    #[serde(default = "default_num_generations")]
    pub num_generations: usize,
    #[serde(default)]
    pub fitness_threshold: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Save the generation champion every `save_every` generations, 0 disables
    #[serde(default)]
    pub save_every: usize,
}

impl Default for GAConfig {
    fn default() -> Self {
        Self {
            population_count: 85,
            best_agent_selection: 8,
            worst_agent_selection: 3,
            crossover_count: 39,
            mutation_rate: 0.055,
            num_generations: default_num_generations(),
            fitness_threshold: None,
            seed: None,
            save_every: 0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Blueprint {
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub ga: GAConfig,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("genomes")
}

fn default_episode_steps() -> usize {
    200
}

fn default_num_generations() -> usize {
    50
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), GaError> {
        ensure_config!(
            self.layer_sizes.len() >= 2,
            "network.layer_sizes must list at least 2 layers"
        );
        ensure_config!(
            self.layer_sizes.iter().all(|&n| n > 0),
            "network.layer_sizes entries must be at least 1"
        );
        Ok(())
    }
}

impl GAConfig {
    /// Reject parameters that cannot produce a complete next generation
    pub fn validate(&self) -> Result<(), GaError> {
        ensure_config!(
            self.population_count > 0,
            "ga.population_count must be at least 1"
        );
        ensure_config!(
            self.best_agent_selection > 0,
            "ga.best_agent_selection must be at least 1"
        );
        ensure_config!(
            self.best_agent_selection + self.crossover_count <= self.population_count,
            "sum of ga.best_agent_selection ({}) and ga.crossover_count ({}) must not exceed ga.population_count ({})",
            self.best_agent_selection,
            self.crossover_count,
            self.population_count
        );
        ensure_config!(
            self.worst_agent_selection <= self.population_count,
            "ga.worst_agent_selection must not exceed ga.population_count"
        );
        ensure_config!(
            (0.0..=1.0).contains(&self.mutation_rate),
            "ga.mutation_rate must be between 0 and 1"
        );
        ensure_config!(
            self.num_generations > 0,
            "ga.num_generations must be at least 1"
        );
        ensure_config!(
            self.save_every <= self.num_generations,
            "ga.save_every must be less than or equal to ga.num_generations"
        );
        Ok(())
    }
}

impl Blueprint {
    pub fn validate(&self) -> Result<(), GaError> {
        self.network.validate()?;
        self.ga.validate()?;
        ensure_config!(
            self.experiment.episode_steps > 0,
            "experiment.episode_steps must be at least 1"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Blueprint::default().validate().unwrap();
    }

    #[test]
    fn template_parses_and_validates() {
        let blueprint: Blueprint =
            toml::from_str(include_str!("../../templates/evonet.toml")).unwrap();
        blueprint.validate().unwrap();
        assert_eq!(blueprint.network.layer_sizes, vec![3, 10, 10, 2]);
    }

    #[test]
    fn partial_blueprint_falls_back_to_defaults() {
        let blueprint: Blueprint = toml::from_str(
            r#"
            [ga]
            population_count = 10
            best_agent_selection = 2
            worst_agent_selection = 1
            crossover_count = 5
            mutation_rate = 0.1
            "#,
        )
        .unwrap();

        blueprint.validate().unwrap();
        assert_eq!(blueprint.ga.num_generations, 50);
        assert_eq!(blueprint.ga.seed, None);
        assert_eq!(blueprint.experiment.episode_steps, 200);
    }

    #[test]
    fn rejects_overfull_generation() {
        let mut ga = GAConfig::default();
        ga.crossover_count = ga.population_count;

        assert!(matches!(ga.validate(), Err(GaError::Configuration(_))));
    }

    #[test]
    fn rejects_zero_best_selection() {
        let ga = GAConfig {
            best_agent_selection: 0,
            ..GAConfig::default()
        };
        assert!(matches!(ga.validate(), Err(GaError::Configuration(_))));
    }

    #[test]
    fn rejects_bad_mutation_rate() {
        for rate in [-0.1, 1.1, f64::NAN] {
            let ga = GAConfig {
                mutation_rate: rate,
                ..GAConfig::default()
            };
            assert!(matches!(ga.validate(), Err(GaError::Configuration(_))));
        }
    }

    #[test]
    fn rejects_single_layer_network() {
        let network = NetworkConfig {
            layer_sizes: vec![3],
        };
        assert!(matches!(network.validate(), Err(GaError::Configuration(_))));
    }
}
