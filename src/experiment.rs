use std::{
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use anyhow::Result;
use tracing::{debug, info};

use crate::{
    env::Environment,
    ga::population::PopulationManager,
    util::{ExpHistory, GenerationReport, blueprint::Blueprint, persist},
};

/// How a finished experiment ended
#[derive(Debug, Clone)]
pub struct Outcome {
    pub generations: usize,
    pub reached_threshold: bool,
    pub best_fitness: f64,
    /// Final champion genome file
    pub champion: PathBuf,
}

/// Drives the evaluate-one-genome-at-a-time loop between an environment and a population
pub struct Experiment<E> {
    blueprint: Blueprint,
    population: PopulationManager,
    env: E,
    history: ExpHistory,
}

impl<E: Environment> Experiment<E> {
    pub fn new(blueprint: Blueprint, env: E) -> Result<Self> {
        let population = PopulationManager::from_blueprint(&blueprint)?;
        let history = ExpHistory {
            start: UNIX_EPOCH.elapsed()?.as_secs(),
            best_fitness_vec: Vec::with_capacity(blueprint.ga.num_generations),
            avg_fitness_vec: Vec::with_capacity(blueprint.ga.num_generations),
        };

        Ok(Self {
            blueprint,
            population,
            env,
            history,
        })
    }

    pub fn population(&self) -> &PopulationManager {
        &self.population
    }

    pub fn history(&self) -> &ExpHistory {
        &self.history
    }

    pub fn run(&mut self) -> Result<Outcome> {
        let num_generations = self.blueprint.ga.num_generations;
        let save_every = self.blueprint.ga.save_every;
        debug!(
            "Evolving {} networks with layers {:?} for up to {} generations",
            self.population.config().population_count,
            self.population.layer_sizes(),
            num_generations
        );
        let mut reached_threshold = false;
        let mut generations = 0;

        for g in 1..=num_generations {
            let report = self.run_generation()?;
            generations = g;
            self.history.push(report.evaluation);

            info!(
                "🧬 Generation {}/{}: best {:.3}, avg {:.3}",
                g, num_generations, report.evaluation.best_fitness, report.evaluation.avg_fitness
            );

            if save_every > 0 && g % save_every == 0 {
                self.save_champion(&format!("champion_gen{}", g))?;
            }

            if let Some(f) = self.blueprint.ga.fitness_threshold {
                if report.evaluation.best_fitness >= f {
                    info!("Population reached fitness threshold. Ending experiment.");
                    reached_threshold = true;
                    break;
                }
            }
        }

        let champion = self.save_champion("champion")?;
        let best_fitness = self
            .history
            .best_fitness_vec
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        if self.population.gene_pool_exhaustions() > 0 {
            info!(
                "{} crossover slots were randomized for lack of distinct parents",
                self.population.gene_pool_exhaustions()
            );
        }
        let elapsed = UNIX_EPOCH.elapsed()?.as_secs() - self.history.start;
        info!(
            "🧪 Finished experiment after {} generations in {}s",
            generations, elapsed
        );

        Ok(Outcome {
            generations,
            reached_threshold,
            best_fitness,
            champion,
        })
    }

    /// Evaluate every genome of the current generation once
    fn run_generation(&mut self) -> Result<GenerationReport> {
        loop {
            let genome = self.population.current_genome();
            let fitness = self.env.run_episode(genome)?;
            debug!("{} fitness {:.3}", self.population.episode_label(), fitness);

            if let Some(report) = self.population.evaluate_current_genome(fitness)? {
                return Ok(report);
            }
        }
    }

    /// Slot 0 holds the carried-over champion right after a rebuild
    fn save_champion(&self, stem: &str) -> Result<PathBuf> {
        persist::save_genome(
            &self.population.population()[0],
            &self.blueprint.experiment.out_dir,
            stem,
        )
    }
}

/// Run a saved genome for one episode. Nothing is fed back into any population.
pub fn replay<E: Environment>(env: &mut E, path: &Path) -> Result<f64> {
    let genome = persist::load_genome(path)?;
    let fitness = env.run_episode(&genome)?;
    info!(
        "▶️ {} ({:?}) scored {:.3}",
        path.display(),
        genome.layer_sizes(),
        fitness
    );
    Ok(fitness)
}
