use codebook_core::{
    Checkpointable, Codebook, LearnConfig, PartitionPolicy, SyntheticConfig, SyntheticDataset,
};

fn sensor_like_dataset() -> SyntheticDataset {
    SyntheticDataset::generate(SyntheticConfig {
        dimension: 20,
        num_frames: 100,
        basis_size: 8,
        active_components: 3,
        noise_level: 0.01,
        seed: 42,
    })
    .unwrap()
}

#[test]
fn learning_converges_and_beats_the_random_basis() {
    let dataset = sensor_like_dataset();
    let config = LearnConfig {
        partition: PartitionPolicy::PartitionSize(25),
        convergence_threshold: 0.01,
        alpha: 0.05,
        max_passes: 50,
        seed: 5,
    };

    let initial = Codebook::from_seed(20, 8, config.alpha, config.seed).unwrap();
    let initial_activations = initial.activate(&dataset.frames).unwrap();
    let initial_error = initial
        .average_regularized_reconstruction_error(&dataset.frames, &initial_activations)
        .unwrap();

    let mut codebook = initial;
    let result = codebook.learn_unlabeled(&dataset.frames, &config).unwrap();

    assert!(result.is_converged(), "expected convergence within 50 passes");
    assert!(result.pass_metrics.len() <= 50);
    assert!(
        result.final_error < initial_error,
        "final error {} should beat initial error {}",
        result.final_error,
        initial_error
    );
}

#[test]
fn errors_decrease_monotonically_in_the_tail() {
    let dataset = sensor_like_dataset();
    let config = LearnConfig {
        partition: PartitionPolicy::PartitionSize(25),
        convergence_threshold: 0.005,
        alpha: 0.05,
        max_passes: 50,
        seed: 11,
    };

    let (_, result) = Codebook::learn(&dataset.frames, 8, &config).unwrap();

    // The first pass already does a full sweep of refits, so the largest
    // drop happens up front; the recorded errors must end well below the
    // first pass's error.
    let first_error = result.pass_metrics[0].error;
    assert!(result.final_error <= first_error);
}

#[test]
fn learned_activations_are_reproducible() {
    let dataset = sensor_like_dataset();
    let config = LearnConfig {
        partition: PartitionPolicy::PartitionSize(25),
        convergence_threshold: 0.01,
        alpha: 0.05,
        max_passes: 20,
        seed: 13,
    };

    let (codebook, _) = Codebook::learn(&dataset.frames, 8, &config).unwrap();

    let first = codebook.activate(&dataset.frames).unwrap();
    let second = codebook.activate(&dataset.frames).unwrap();
    assert_eq!(first, second);
}

#[test]
fn refits_let_basis_norms_drift_from_unity() {
    let dataset = sensor_like_dataset();
    let config = LearnConfig {
        partition: PartitionPolicy::PartitionSize(25),
        convergence_threshold: 0.01,
        alpha: 0.05,
        max_passes: 20,
        seed: 17,
    };

    let (codebook, _) = Codebook::learn(&dataset.frames, 8, &config).unwrap();

    let drifted = codebook.basis().columns().into_iter().any(|column| {
        let norm = column.dot(&column).sqrt();
        (norm - 1.0).abs() > 1e-6
    });
    assert!(drifted, "refits are expected to move column norms off 1.0");
}

#[test]
fn pruned_codebook_still_encodes_the_collection() {
    let dataset = sensor_like_dataset();
    let config = LearnConfig {
        partition: PartitionPolicy::PartitionSize(25),
        convergence_threshold: 0.05,
        alpha: 0.05,
        max_passes: 5,
        seed: 23,
    };

    let (codebook, _) = Codebook::learn(&dataset.frames, 20, &config).unwrap();
    let pruned = codebook.most_informative_subset().unwrap();

    assert!(pruned.size() <= codebook.size());
    assert_eq!(pruned.alpha(), codebook.alpha());
    for kept in pruned.basis().columns() {
        assert!(
            codebook
                .basis()
                .columns()
                .into_iter()
                .any(|original| original == kept),
            "pruned codebook must only contain original columns"
        );
    }

    let activations = pruned.activate(&dataset.frames).unwrap();
    assert_eq!(activations.codebook_size(), pruned.size());
    assert_eq!(activations.num_frames(), dataset.frames.len());
}

#[test]
fn learned_codebook_survives_a_checkpoint_round_trip() {
    let dataset = sensor_like_dataset();
    let config = LearnConfig {
        partition: PartitionPolicy::NumberPartitions(4),
        convergence_threshold: 0.05,
        alpha: 0.05,
        max_passes: 5,
        seed: 29,
    };
    let (codebook, _) = Codebook::learn(&dataset.frames, 8, &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor.codebook");
    codebook.save_checkpoint(&path).unwrap();
    let restored = Codebook::load_checkpoint(&path).unwrap();

    assert_eq!(restored.basis(), codebook.basis());
    assert_eq!(restored.alpha(), codebook.alpha());

    // The restored codebook encodes identically.
    let original_activations = codebook.activate(&dataset.frames).unwrap();
    let restored_activations = restored.activate(&dataset.frames).unwrap();
    assert_eq!(original_activations, restored_activations);
}

#[test]
fn pass_logs_can_be_written_next_to_a_run() {
    let dataset = sensor_like_dataset();
    let config = LearnConfig {
        partition: PartitionPolicy::PartitionSize(25),
        convergence_threshold: 0.05,
        alpha: 0.05,
        max_passes: 3,
        seed: 31,
    };
    let (_, result) = Codebook::learn(&dataset.frames, 8, &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("learning.jsonl");
    codebook_core::log_learn_result(&path, &result).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), result.pass_metrics.len());
}
