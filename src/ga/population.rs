use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, trace, warn};

use super::{
    error::GaError, network::NeuralNetwork, observer::PopulationObserver, selector::GenePool,
};
use crate::util::{
    GenerationReport, PopEvaluation,
    blueprint::{Blueprint, GAConfig},
    persist,
};

/// Owns a fixed-size population and walks it one genome at a time.
///
/// The caller asks for [`current_genome`](Self::current_genome), runs an episode with it and
/// reports the result through [`evaluate_current_genome`](Self::evaluate_current_genome).
/// Once every genome has a fitness the population is rebuilt and the cursor starts over.
pub struct PopulationManager {
    layer_sizes: Vec<usize>,
    config: GAConfig,
    population: Vec<NeuralNetwork>,
    current_ix: usize,
    generation: u32,
    exhausted_slots: usize,
    rng: StdRng,
    observers: Vec<Box<dyn PopulationObserver>>,
}

impl PopulationManager {
    /// Validate the configuration and allocate a randomized population.
    ///
    /// Randomness comes from `config.seed` when set, otherwise from the OS.
    pub fn new(layer_sizes: &[usize], config: GAConfig) -> Result<Self, GaError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(layer_sizes, config, rng)
    }

    pub fn from_blueprint(blueprint: &Blueprint) -> Result<Self, GaError> {
        blueprint.validate()?;
        Self::new(&blueprint.network.layer_sizes, blueprint.ga.clone())
    }

    /// Like [`new`](Self::new) but draws from the given generator, ignoring `config.seed`
    pub fn with_rng(
        layer_sizes: &[usize],
        config: GAConfig,
        mut rng: StdRng,
    ) -> Result<Self, GaError> {
        config.validate()?;

        let population = (0..config.population_count)
            .map(|_| NeuralNetwork::random(layer_sizes, &mut rng))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Initialized population of {} networks with layers {:?}",
            population.len(),
            layer_sizes
        );

        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            config,
            population,
            current_ix: 0,
            generation: 0,
            exhausted_slots: 0,
            rng,
            observers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: Box<dyn PopulationObserver>) {
        self.observers.push(observer);
    }

    /// Genome whose episode is due next
    pub fn current_genome(&self) -> &NeuralNetwork {
        &self.population[self.current_ix]
    }

    pub fn current_index(&self) -> usize {
        self.current_ix
    }

    /// Number of completed generations
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn population(&self) -> &[NeuralNetwork] {
        &self.population
    }

    pub fn population_count(&self) -> usize {
        self.population.len()
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn config(&self) -> &GAConfig {
        &self.config
    }

    /// Crossover slots that fell back to random genomes over the whole run
    pub fn gene_pool_exhaustions(&self) -> usize {
        self.exhausted_slots
    }

    pub fn episode_label(&self) -> String {
        format!(
            "Generation: {} Episode: {}/{}",
            self.generation + 1,
            self.current_ix + 1,
            self.population.len()
        )
    }

    /// Best and average of the fitness values currently recorded
    pub fn evaluate(&self) -> PopEvaluation {
        let best_fitness = self
            .population
            .iter()
            .map(|x| x.fitness)
            .fold(f64::NEG_INFINITY, f64::max);

        let avg_fitness =
            self.population.iter().map(|x| x.fitness).sum::<f64>() / self.population.len() as f64;

        PopEvaluation {
            best_fitness,
            avg_fitness,
        }
    }

    /// Record the fitness of the current genome and advance the cursor.
    ///
    /// Returns a report when this call completed a generation and the population was rebuilt.
    pub fn evaluate_current_genome(
        &mut self,
        fitness: f64,
    ) -> Result<Option<GenerationReport>, GaError> {
        if !fitness.is_finite() {
            return Err(GaError::InvalidFitness(fitness));
        }

        let ix = self.current_ix;
        self.population[ix].fitness = fitness;
        trace!("{} fitness {}", self.episode_label(), fitness);
        for observer in &mut self.observers {
            observer.fitness_recorded(ix, fitness);
        }

        // repopulate resets the cursor once the rebuild succeeded
        let next = ix + 1;
        let report = if next == self.population.len() {
            Some(self.repopulate()?)
        } else {
            self.current_ix = next;
            None
        };

        let genome = &self.population[self.current_ix];
        for observer in &mut self.observers {
            observer.genome_changed(self.current_ix, genome);
        }

        Ok(report)
    }

    /// Rank the population and replace it with the next generation.
    ///
    /// Slot 0 receives an unchanged copy of the champion. Then up to `crossover_count` mutated
    /// children of gene pool parents follow, and fresh random genomes fill the rest.
    pub fn repopulate(&mut self) -> Result<GenerationReport, GaError> {
        let evaluation = self.evaluate();
        let ranking = self.rank();
        let champion_ix = ranking[0];

        let mut next = Vec::with_capacity(self.population.len());
        next.push(self.population[champion_ix].clone());

        let pool = GenePool::new(
            &ranking,
            self.config.best_agent_selection,
            self.config.worst_agent_selection,
        );

        let mut children = Vec::with_capacity(self.config.crossover_count);
        let mut exhausted = 0;
        for _ in 0..self.config.crossover_count {
            match pool.pick_pair(&mut self.rng) {
                Some((a, b)) => children.push(NeuralNetwork::crossover(
                    &self.population[a],
                    &self.population[b],
                    &mut self.rng,
                )?),
                None => exhausted += 1,
            }
        }
        if exhausted > 0 {
            warn!(
                "Gene pool {:?} yielded no distinct parents for {} of {} crossover slots; randomizing them",
                pool.members(),
                exhausted,
                self.config.crossover_count
            );
        }

        for child in &mut children {
            child.mutate(self.config.mutation_rate, &mut self.rng)?;
        }
        next.extend(children);

        while next.len() < self.population.len() {
            next.push(NeuralNetwork::random(&self.layer_sizes, &mut self.rng)?);
        }

        let report = GenerationReport {
            generation: self.generation,
            evaluation,
            champion_ix,
            exhausted_slots: exhausted,
        };

        self.population = next;
        self.generation += 1;
        self.current_ix = 0;
        self.exhausted_slots += exhausted;

        debug!(
            "Repopulated generation {}: champion #{} ({:.3})",
            report.generation, champion_ix, evaluation.best_fitness
        );
        for observer in &mut self.observers {
            observer.generation_completed(&report);
        }

        Ok(report)
    }

    /// Write the current genome to `dir`
    pub fn save_current_genome(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let name = format!("genome_{}_{}", self.generation, self.current_ix);
        persist::save_genome(self.current_genome(), dir, &name)
    }

    /// Population indices by fitness, best first. Equal fitness keeps index order.
    fn rank(&self) -> Vec<usize> {
        let mut ranking = (0..self.population.len()).collect::<Vec<_>>();
        // sort_by is stable
        ranking.sort_by(|&a, &b| {
            self.population[b]
                .fitness
                .partial_cmp(&self.population[a].fitness)
                .unwrap_or(Ordering::Equal)
        });
        ranking
    }
}
