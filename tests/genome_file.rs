use std::fs;

use anyhow::Result;
use evonet::{
    ga::{error::GaError, network::NeuralNetwork, population::PopulationManager},
    util::{
        blueprint::GAConfig,
        persist::{load_genome, save_genome, write_genome},
    },
};
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn saved_genome_replays_identically() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let genome = NeuralNetwork::random(&[3, 10, 10, 2], &mut StdRng::seed_from_u64(8))?;

    let path = save_genome(&genome, dir.path(), "genome")?;
    let loaded = load_genome(&path)?;

    assert_eq!(loaded.layer_sizes(), genome.layer_sizes());
    for inputs in [[0.0, 0.0, 0.0], [1.0, -1.0, 0.5], [0.33, 0.9, -0.7]] {
        let expected = genome.forward(&inputs)?;
        let actual = loaded.forward(&inputs)?;
        for (x, y) in expected.iter().zip(&actual) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    Ok(())
}

#[test]
fn genome_file_keeps_every_bit() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut rng = StdRng::seed_from_u64(21);

    for i in 0..50 {
        let genome = NeuralNetwork::random(&[3, 10, 10, 2], &mut rng)?;
        let path = dir.path().join(format!("genome_{}.json", i));
        write_genome(&genome, &path)?;
        let loaded = load_genome(&path)?;

        assert_eq!(loaded.weights(), genome.weights());
        assert_eq!(loaded.biases(), genome.biases());
    }

    Ok(())
}

#[test]
fn file_has_no_layer_sizes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("g.json");
    let genome = NeuralNetwork::random(&[2, 3], &mut StdRng::seed_from_u64(8))?;
    write_genome(&genome, &path)?;

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let object = json.as_object().unwrap();

    let mut keys = object.keys().cloned().collect::<Vec<_>>();
    keys.sort();
    assert_eq!(keys, vec!["biases", "weights"]);
    assert_eq!(json["weights"][0]["rows"], 2);
    assert_eq!(json["weights"][0]["cols"], 3);
    assert_eq!(json["weights"][0]["flattened"].as_array().unwrap().len(), 6);

    Ok(())
}

#[test]
fn loads_handwritten_genome() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hand.json");
    fs::write(
        &path,
        r#"{
            "weights": [
                { "rows": 2, "cols": 1, "flattened": [1.0, -1.0] },
                { "rows": 1, "cols": 3, "flattened": [0.5, 0.0, -0.5] }
            ],
            "biases": [0.0, 0.25]
        }"#,
    )?;

    let genome = load_genome(&path)?;
    assert_eq!(genome.layer_sizes(), &[2, 1, 3]);
    assert_eq!(genome.forward(&[0.4, 0.4])?, vec![0.25f64.tanh(); 3]);

    Ok(())
}

#[test]
fn corrupt_genome_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{ "weights": [ { "rows": 2, "cols": 2, "flattened": [1.0, 2.0, 3.0] } ], "biases": [0.0] }"#,
    )?;

    let err = load_genome(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GaError>(),
        Some(GaError::CorruptGenomeData(_))
    ));

    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_genome(&dir.path().join("nope.json")).is_err());
}

#[test]
fn manager_saves_current_genome() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = GAConfig {
        population_count: 3,
        best_agent_selection: 1,
        worst_agent_selection: 1,
        crossover_count: 1,
        mutation_rate: 0.1,
        seed: Some(3),
        ..GAConfig::default()
    };
    let mut manager = PopulationManager::new(&[3, 4, 2], config)?;
    manager.evaluate_current_genome(1.0)?;

    let path = manager.save_current_genome(dir.path())?;
    let loaded = load_genome(&path)?;

    assert!(
        path.file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("genome_0_1_")
    );
    assert_eq!(loaded.weights(), manager.current_genome().weights());
    assert_eq!(loaded.biases(), manager.current_genome().biases());

    Ok(())
}
