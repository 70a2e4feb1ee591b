use std::{
    fs,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use anyhow::{Context, Result};
use tracing::info;

use crate::ga::{network::NeuralNetwork, record::GenomeRecord};

/// Write a genome as pretty JSON to `<dir>/<stem>_<unix secs>.json`, creating `dir` if needed
pub fn save_genome(genome: &NeuralNetwork, dir: &Path, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create genome directory `{}`", dir.display()))?;

    let path = dir.join(format!("{}_{}.json", stem, UNIX_EPOCH.elapsed()?.as_secs()));
    write_genome(genome, &path)?;

    info!("💾 Saved genome to {}", path.display());
    Ok(path)
}

/// Write a genome as pretty JSON to exactly `path`
pub fn write_genome(genome: &NeuralNetwork, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&genome.serialize())?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write genome file `{}`", path.display()))?;
    Ok(())
}

/// Load a genome saved by [`save_genome`] for replay. Its fitness starts at 0.
pub fn load_genome(path: &Path) -> Result<NeuralNetwork> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to open genome file `{}`", path.display()))?;
    let record: GenomeRecord = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse genome file `{}`", path.display()))?;
    let genome = NeuralNetwork::deserialize(record)
        .with_context(|| format!("Invalid genome in `{}`", path.display()))?;
    Ok(genome)
}
