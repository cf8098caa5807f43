//! Tests for the parameter tree: flattening, substitution and updates

use param_tree::{Error, ParameterNode, Parameters, PathSegment, SubstitutionOptions, flatten};
use pretty_assertions::assert_eq;

fn yaml(source: &str) -> ParameterNode {
    serde_yaml::from_str(source).unwrap()
}

#[test]
fn test_substitution_into_sequence_element() {
    let params = Parameters::new(yaml(r#"{"a": "1.0", "b": ["1", "2", "3*$a"]}"#)).unwrap();
    assert_eq!(params.get_str("b.2"), Some(&ParameterNode::from("3*1.0")));
}

#[test]
fn test_partial_token_is_not_substituted() {
    let params = Parameters::from_yaml_str(
        "variable_1: x\nexact: $variable_1\nbraced: ${variable_1}y\npartial: $variable_1y\ndotted: $variable_1.\n",
    )
    .unwrap();

    assert_eq!(params.get_str("exact"), Some(&ParameterNode::from("x")));
    assert_eq!(params.get_str("braced"), Some(&ParameterNode::from("xy")));
    assert_eq!(params.get_str("partial"), Some(&ParameterNode::from("$variable_1y")));
    assert_eq!(params.get_str("dotted"), Some(&ParameterNode::from("x.")));
}

#[test]
fn test_flatten_list_of_mappings() {
    let params = Parameters::from_yaml_str(r#"{"list": [{"param1": 0}, {"param1": 1}]}"#).unwrap();
    let flat = params.flatten();

    let entries: Vec<(&str, &str)> = flat.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(entries, vec![("list.0.param1", "0"), ("list.1.param1", "1")]);
}

#[test]
fn test_reference_to_nested_path() {
    let params = Parameters::from_yaml_str(
        "trainer:\n  lr: 0.01\noptimizer:\n  lr: $trainer.lr\n  schedule:\n  - ${trainer.lr}\n  - $trainer.lr/10\n",
    )
    .unwrap();

    assert_eq!(params.get_str("optimizer.lr"), Some(&ParameterNode::from("0.01")));
    assert_eq!(params.get_str("optimizer.schedule[1]"), Some(&ParameterNode::from("0.01/10")));
}

#[test]
fn test_mutual_reference_diverges() {
    let result = Parameters::from_yaml_str("a: $b\nb: $a\n");
    match result {
        Err(Error::SubstitutionDivergence { unresolved, .. }) => {
            assert_eq!(unresolved, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected divergence, got {other:?}"),
    }
}

#[test]
fn test_iteration_cap_is_configurable() {
    let chain = yaml("a: $b\nb: $c\nc: $d\nd: done\n");

    let tight = Parameters::with_options(chain.clone(), SubstitutionOptions { max_iterations: 1 });
    assert!(matches!(tight, Err(Error::SubstitutionDivergence { iterations: 1, .. })));

    let params = Parameters::with_options(chain, SubstitutionOptions::default()).unwrap();
    assert_eq!(params.get_str("a"), Some(&ParameterNode::from("done")));
}

#[test]
fn test_update_propagates_to_references() {
    let mut params = Parameters::from_yaml_str("base: 2\nscaled: $base*10\n").unwrap();
    params
        .update(&[PathSegment::from("base")], 3)
        .unwrap();
    assert_eq!(params.get_str("scaled"), Some(&ParameterNode::from("3*10")));
}

#[test]
fn test_update_adds_new_leaf_key() {
    let mut params = Parameters::from_yaml_str("trainer:\n  lr: 0.1\n").unwrap();
    params.update_str("trainer.epochs", 10).unwrap();
    assert_eq!(params.get_str("trainer.epochs"), Some(&ParameterNode::from("10")));
}

#[test]
fn test_update_through_scalar_fails() {
    let mut params = Parameters::from_yaml_str("trainer: 1\n").unwrap();
    let result = params.update_str("trainer.lr.value", 1);
    assert!(matches!(result, Err(Error::PathNotFound { .. })));
}

#[test]
fn test_equality_ignores_how_values_were_written() {
    let from_strings = Parameters::from_yaml_str("a: '1'\nb: '2.5'\n").unwrap();
    let from_numbers = Parameters::from_yaml_str("a: 1\nb: 2.5\n").unwrap();
    assert_eq!(from_strings, from_numbers);
}

#[test]
fn test_equality_compares_substituted_data() {
    let referenced = Parameters::from_yaml_str("a: 1\nb: $a\n").unwrap();
    let literal = Parameters::from_yaml_str("a: 1\nb: 1\n").unwrap();
    assert_eq!(referenced, literal);
}

#[test]
fn test_flatten_function_matches_method() {
    let params = Parameters::from_yaml_str("x: [1, {y: 2}]\n").unwrap();
    assert_eq!(flatten(params.data()), params.flatten());
}
