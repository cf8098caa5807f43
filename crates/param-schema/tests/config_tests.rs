//! Loading, templating and saving configuration records

use param_schema::{ConfigSchema, Error, downcast_ref, help_comments, DeclaredType};
use param_test_utils::ConfigDir;
use param_test_utils::fixtures::{self, Accuracy, AdamConfig, ExperimentConfig, Sgd, TrainConfig};
use param_tree::{HandlebarsRenderer, create_context_from_unknown_args};
use pretty_assertions::assert_eq;

fn train() -> TrainConfig {
    TrainConfig {
        batch_size: 2,
        epochs: 1,
        optimizer: Box::new(Sgd { lr: 0.1, momentum: 0.0 }),
        metrics: vec![Box::new(Accuracy { threshold: 0.5 })],
    }
}

#[test]
fn test_to_yaml_annotates_fields() {
    let registry = fixtures::registry();
    insta::assert_snapshot!(train().to_yaml(&registry), @r"
    batch_size: '2'  # Samples per step
    epochs: '1'
    # Optimizer settings
    optimizer:
      module_name: Sgd
      lr: '0.1'  # Learning rate
      momentum: '0.0'
    metrics:
      - module_name: Accuracy
        threshold: '0.5'  # Decision threshold
    ");
}

#[test]
fn test_help_comments_skip_unknown_modules() {
    let registry = param_schema::ModuleRegistry::new();
    let comments = help_comments(&train().to_parameters(), &DeclaredType::record::<TrainConfig>(), &registry);
    assert_eq!(comments.get("batch_size").map(String::as_str), Some("Samples per step"));
    assert!(!comments.contains_key("optimizer.lr"));
}

#[test]
fn test_save_and_reload() {
    let registry = fixtures::registry();
    let dir = ConfigDir::new();
    let file = dir.file("out/train.yaml");

    train().save(&file, &registry).unwrap();
    dir.assert_file_contains("out/train.yaml", "module_name: Sgd");

    let reloaded = TrainConfig::from_yaml_file(&file, &registry).unwrap();
    assert_eq!(reloaded.batch_size, 2);
    assert_eq!(downcast_ref::<Sgd, _>(reloaded.optimizer.as_ref()), Some(&Sgd { lr: 0.1, momentum: 0.0 }));
    assert_eq!(
        downcast_ref::<Accuracy, _>(reloaded.metrics[0].as_ref()),
        Some(&Accuracy { threshold: 0.5 })
    );
}

#[test]
fn test_experiment_round_trip() {
    let registry = fixtures::registry();
    let dir = ConfigDir::new();
    let original = ExperimentConfig::from_yaml_str(fixtures::EXPERIMENT_YAML, &registry).unwrap();

    let file = dir.file("experiment.yaml");
    original.save(&file, &registry).unwrap();
    let reloaded = ExperimentConfig::from_yaml_file(&file, &registry).unwrap();

    assert_eq!(reloaded.to_parameters(), original.to_parameters());
}

#[test]
fn test_templated_file() {
    let registry = fixtures::registry();
    let dir = ConfigDir::new();
    let file = dir.write(
        "train.yaml",
        "batch_size: {{ bs }}\noptimizer:\n  module_name: {{ opt }}\n  lr: 0.1\n",
    );
    let context = create_context_from_unknown_args(&["bs", "16", "opt", "Adam"]).unwrap();

    let cfg = TrainConfig::from_templated_yaml_file(&file, &context, &HandlebarsRenderer::new(), &registry).unwrap();
    assert_eq!(cfg.batch_size, 16);
    assert!(downcast_ref::<AdamConfig, _>(cfg.optimizer.as_ref()).is_some());
}

#[test]
fn test_unsupported_file_format() {
    let registry = fixtures::registry();
    let dir = ConfigDir::new();
    let file = dir.write("train.toml", "batch_size = 1\n");
    let err = TrainConfig::from_yaml_file(&file, &registry).unwrap_err();
    assert!(
        matches!(err, Error::Parameters(param_tree::Error::Fs(param_fs::Error::UnsupportedFormat { .. }))),
        "{err:?}"
    );
}

#[test]
fn test_substitution_divergence_surfaces() {
    let registry = fixtures::registry();
    let err = TrainConfig::from_yaml_str("batch_size: $epochs\nepochs: $batch_size\n", &registry).unwrap_err();
    assert!(matches!(
        err,
        Error::Parameters(param_tree::Error::SubstitutionDivergence { .. })
    ));
}
