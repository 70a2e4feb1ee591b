use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use evonet::{
    env::SensorDrill,
    experiment::{Experiment, replay},
    util::{blueprint::Blueprint, env},
};
use tracing::level_filters::LevelFilter;

/// Seed of the sensor stream the demo environment replays every episode
const DRILL_SEED: u64 = 0x5EED;

#[derive(Parser)]
#[clap(version)]
#[command(about = "🧬 evonet - evolve tiny tanh controllers 🧬")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter blueprint into the current directory, or into a new one if a path is specified
    Init {
        /// Path to initialize in
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Validate a blueprint file
    Validate {
        /// Blueprint file
        #[arg(default_value = "evonet.toml")]
        blueprint: PathBuf,
    },
    /// Evolve a population against the built-in sensor drill
    Train {
        /// Blueprint file
        #[arg(default_value = "evonet.toml")]
        blueprint: PathBuf,
        /// Override ga.seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Override ga.num_generations
        #[arg(short, long)]
        generations: Option<usize>,
    },
    /// Run saved genomes through one sensor drill episode each, without training
    Replay {
        /// Genome files written by `train`
        #[arg(required = true)]
        genomes: Vec<PathBuf>,
        /// Episode length
        #[arg(short, long, default_value_t = 200)]
        steps: usize,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match env("EVONET_LOG")
        .unwrap_or_else(|_| "INFO".to_string())
        .to_uppercase()
        .as_str()
    {
        "OFF" => LevelFilter::OFF,
        "ERROR" => LevelFilter::ERROR,
        "WARN" => LevelFilter::WARN,
        "INFO" => LevelFilter::INFO,
        "DEBUG" => LevelFilter::DEBUG,
        "TRACE" => LevelFilter::TRACE,
        x => {
            eprintln!("Invalid log level: {}", x);
            eprintln!("Using default log level: INFO");
            LevelFilter::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .init();

    match args.command {
        Commands::Init { path } => {
            fs::create_dir_all(&path)?;
            let target = path.join("evonet.toml");
            if target.exists() {
                bail!("{} already exists", target.display());
            }
            fs::write(&target, include_bytes!("../templates/evonet.toml"))?;

            println!(
                "🧬 Initialized evonet blueprint in {}",
                path.canonicalize()?.display()
            );
        }
        Commands::Validate { blueprint: bpath } => {
            let blueprint = read_blueprint(&bpath)?;
            blueprint.validate()?;
            println!("✅ Blueprint `{}` is valid", bpath.display());
        }
        Commands::Train {
            blueprint: bpath,
            seed,
            generations,
        } => {
            let mut blueprint = read_blueprint(&bpath)?;
            if seed.is_some() {
                blueprint.ga.seed = seed;
            }
            if let Some(n) = generations {
                if n == 0 {
                    bail!("`generations` must be greater than 0");
                }
                blueprint.ga.num_generations = n;
                blueprint.ga.save_every = blueprint.ga.save_every.min(n);
            }

            let drill = SensorDrill::new(blueprint.experiment.episode_steps, DRILL_SEED);
            let mut experiment = Experiment::new(blueprint, drill)?;
            let outcome = experiment.run()?;

            println!(
                "🏁 Best fitness {:.3} after {} generations{}",
                outcome.best_fitness,
                outcome.generations,
                if outcome.reached_threshold {
                    " (threshold reached)"
                } else {
                    ""
                }
            );
            println!("💾 Champion saved to {}", outcome.champion.display());
        }
        Commands::Replay { genomes, steps } => {
            if steps == 0 {
                bail!("`steps` must be greater than 0");
            }
            let mut drill = SensorDrill::new(steps, DRILL_SEED);
            for path in genomes {
                let fitness = replay(&mut drill, &path)?;
                println!("{}: {:.3}", path.display(), fitness);
            }
        }
    }

    Ok(())
}

fn read_blueprint(bpath: &Path) -> Result<Blueprint> {
    let blueprint_s = fs::read_to_string(bpath)
        .with_context(|| format!("Failed to open blueprint file `{}`", bpath.display()))?;
    let blueprint: Blueprint = toml::from_str(&blueprint_s)
        .with_context(|| format!("Failed to parse blueprint file `{}`", bpath.display()))?;
    Ok(blueprint)
}
