//! End-to-end integration tests
//!
//! These exercise the complete flow over files on disk: template rendering
//! -> parsing -> substitution -> typed materialization -> save -> reload.

use std::path::PathBuf;

use param_fs::ParamFile;
use param_schema::{ConfigRecord, ConfigSchema, Error, downcast_ref};
use param_test_utils::ConfigDir;
use param_test_utils::fixtures::{
    self, Accuracy, AdamConfig, AreaUnderCurveConfig, ExperimentConfig, Sgd, TrainConfig,
};
use param_tree::{HandlebarsRenderer, Parameters, TemplateContext};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> ParamFile {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "..", "..", "test-fixtures", "configs", name]
        .iter()
        .collect();
    ParamFile::from(path)
}

#[test]
fn test_experiment_from_file() {
    let registry = fixtures::registry();
    let cfg = ExperimentConfig::from_yaml_file(&fixture("experiment.yaml"), &registry).unwrap();

    assert_eq!(cfg.name, "baseline");
    assert_eq!(cfg.train.batch_size, 32);
    assert_eq!(cfg.train.epochs, 3);

    let adam = downcast_ref::<AdamConfig, _>(cfg.train.optimizer.as_ref()).unwrap();
    assert!((adam.lr - 0.1).abs() < 1e-12);
    assert_eq!(adam.betas, vec![0.9, 0.99]);

    let names: Vec<_> = cfg.train.metrics.iter().map(|m| m.module_name()).collect();
    assert_eq!(names, vec!["Accuracy", "AreaUnderCurveConfig"]);
    assert_eq!(
        downcast_ref::<Accuracy, _>(cfg.train.metrics[0].as_ref()),
        Some(&Accuracy { threshold: 0.5 })
    );
    assert_eq!(
        downcast_ref::<AreaUnderCurveConfig, _>(cfg.train.metrics[1].as_ref()),
        Some(&AreaUnderCurveConfig { num_thresholds: 100 })
    );

    assert!(!cfg.data.shuffle);
    assert_eq!(cfg.data.weights.get("valid"), Some(&0.25));
}

#[test]
fn test_json_input() {
    let registry = fixtures::registry();
    let cfg = ExperimentConfig::from_yaml_file(&fixture("experiment.json"), &registry).unwrap();
    assert_eq!(cfg.name, "from-json");
    assert_eq!(cfg.train.optimizer.module_name(), "Sgd");
    assert!(cfg.data.shuffle);
}

#[test]
fn test_templated_experiment() {
    let registry = fixtures::registry();
    let context: TemplateContext = [
        ("name", "templated"),
        ("batch", "2*8"),
        ("optimizer", "Sgd"),
        ("dataset", "data.csv"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let cfg = ExperimentConfig::from_templated_yaml_file(
        &fixture("templated.yaml"),
        &context,
        &HandlebarsRenderer::new(),
        &registry,
    )
    .unwrap();

    assert_eq!(cfg.name, "templated");
    assert_eq!(cfg.train.batch_size, 16);
    assert_eq!(
        downcast_ref::<Sgd, _>(cfg.train.optimizer.as_ref()),
        Some(&Sgd { lr: 0.1, momentum: 0.0 })
    );
    assert_eq!(cfg.data.paths, vec!["data.csv"]);
}

#[test]
fn test_shorthand_file() {
    let registry = fixtures::registry();
    let cfg = TrainConfig::from_yaml_file(&fixture("shorthand.yaml"), &registry).unwrap();
    assert_eq!(cfg.batch_size, 16);
    assert!(cfg.metrics.is_empty());
}

#[test]
fn test_cyclic_file_diverges() {
    let err = Parameters::from_yaml_file(&fixture("cyclic.yaml")).unwrap_err();
    match err {
        param_tree::Error::SubstitutionDivergence { unresolved, .. } => {
            assert_eq!(unresolved, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected divergence, got {other:?}"),
    }
}

#[test]
fn test_unknown_module_file() {
    let registry = fixtures::registry();
    let err = TrainConfig::from_yaml_file(&fixture("unknown_module.yaml"), &registry).unwrap_err();
    assert!(
        matches!(err, Error::UnknownModule { ref name, ref path, .. } if name == "Lion" && path == "optimizer"),
        "{err:?}"
    );
}

#[test]
fn test_save_reload_preserves_records() {
    let registry = fixtures::registry();
    let dir = ConfigDir::new();
    let original = ExperimentConfig::from_yaml_file(&fixture("experiment.yaml"), &registry).unwrap();

    let saved = dir.file("nested/dir/experiment.yaml");
    original.save(&saved, &registry).unwrap();
    dir.assert_file_contains("nested/dir/experiment.yaml", "# Training loop settings");
    dir.assert_file_contains("nested/dir/experiment.yaml", "module_name: AdamConfig");

    let reloaded = ExperimentConfig::from_yaml_file(&saved, &registry).unwrap();
    assert_eq!(reloaded.to_parameters(), original.to_parameters());
}

#[rstest]
#[case("train.batch_size", "64", 64)]
#[case("train.batch_size", "2**3", -1)]
fn test_update_then_materialize(#[case] path: &str, #[case] value: &str, #[case] expected: i64) {
    let registry = fixtures::registry();
    let mut params = Parameters::from_yaml_file(&fixture("experiment.yaml")).unwrap();
    params.update_str(path, value).unwrap();

    let result = ExperimentConfig::from_parameters(&params, &registry);
    if expected >= 0 {
        assert_eq!(result.unwrap().train.batch_size, expected);
    } else {
        let Err(err) = result else {
            panic!("expected UnsafeExpression");
        };
        assert!(matches!(err, Error::UnsafeExpression { ref path, .. } if path == "train.batch_size"));
    }
}

#[test]
fn test_update_propagates_through_references() {
    let registry = fixtures::registry();
    let mut params = Parameters::from_yaml_file(&fixture("experiment.yaml")).unwrap();
    params.update_str("base_lr", "0.5").unwrap();

    let cfg = ExperimentConfig::from_parameters(&params, &registry).unwrap();
    let adam = downcast_ref::<AdamConfig, _>(cfg.train.optimizer.as_ref()).unwrap();
    assert_eq!(adam.lr, 5.0);
}
