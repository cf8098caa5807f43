//! Conversion of raw nodes into primitive values
//!
//! Integers and floats are read through the restricted arithmetic
//! evaluator, so `"1*5"` converts to `5` and `"0.5*0.5"` to `0.25`.

use param_tree::{ParameterNode, PathSegment, format_path};

use crate::declared::DeclaredType;
use crate::error::{Error, Result};
use crate::expr::{Number, evaluate};
use crate::value::Value;

/// How a float result is turned into an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegerCoercion {
    /// Only integral floats convert; anything else is a lossy conversion
    #[default]
    Strict,
    /// Drop the fractional part
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub integers: IntegerCoercion,
}

/// Convert a raw node to a primitive declared type.
///
/// `path` locates `raw` for error messages.
pub fn convert(
    raw: &ParameterNode,
    declared: &DeclaredType,
    options: &ConvertOptions,
    path: &mut Vec<PathSegment>,
) -> Result<Value> {
    match (declared, raw) {
        (DeclaredType::Int, ParameterNode::Scalar(text)) => to_int(text, options)
            .map(Value::Int)
            .map_err(|e| e.at(&format_path(path))),
        (DeclaredType::Float, ParameterNode::Scalar(text)) => evaluate(text)
            .map(|n| Value::Float(n.as_f64()))
            .map_err(|e| e.at(&format_path(path))),
        (DeclaredType::Str, ParameterNode::Scalar(text)) => Ok(Value::Str(text.clone())),
        (DeclaredType::Bool, ParameterNode::Scalar(text)) => parse_bool(text)
            .map(Value::Bool)
            .ok_or_else(|| Error::InvalidScalar {
                value: text.clone(),
                target: "bool".to_string(),
                path: format_path(path),
            }),
        (DeclaredType::List(inner), ParameterNode::Sequence(items)) if inner.is_primitive() => {
            let mut values = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                let value = convert(item, inner, options, path);
                path.pop();
                values.push(value?);
            }
            Ok(Value::List(values))
        }
        (DeclaredType::Map(key_type, value_type), ParameterNode::Mapping(map))
            if key_type.is_scalar() && value_type.is_primitive() =>
        {
            let mut entries = Vec::with_capacity(map.len());
            for (key, item) in map {
                path.push(PathSegment::Key(key.clone()));
                let key_value = convert(&ParameterNode::Scalar(key.clone()), key_type, options, path);
                let value = key_value.and_then(|k| Ok((k, convert(item, value_type, options, path)?)));
                path.pop();
                entries.push(value?);
            }
            Ok(Value::Map(entries))
        }
        _ => Err(unsupported(raw, declared, path)),
    }
}

pub(crate) fn unsupported(raw: &ParameterNode, declared: &DeclaredType, path: &[PathSegment]) -> Error {
    Error::UnsupportedConversion {
        runtime_type: raw.kind().to_string(),
        raw: raw.excerpt(),
        declared: declared.to_string(),
        path: format_path(path),
    }
}

/// Evaluate `text` and narrow the result to an integer.
pub fn to_int(text: &str, options: &ConvertOptions) -> Result<i64> {
    match evaluate(text)? {
        Number::Int(i) => Ok(i),
        Number::Float(f) => float_to_int(f, options.integers),
    }
}

// Beyond this magnitude `f as i64` saturates.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn float_to_int(value: f64, coercion: IntegerCoercion) -> Result<i64> {
    let lossy = || Error::LossyConversion {
        value: value.to_string(),
        target: "int".to_string(),
        path: String::new(),
    };

    if !value.is_finite() {
        return Err(lossy());
    }
    let whole = match coercion {
        IntegerCoercion::Strict if value.fract() != 0.0 => return Err(lossy()),
        IntegerCoercion::Strict => value,
        IntegerCoercion::Truncate => value.trunc(),
    };
    if whole >= I64_BOUND || whole < -I64_BOUND {
        return Err(lossy());
    }
    Ok(whole as i64)
}

/// `true/yes/on` and `false/no/off`, any case.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn run(raw: impl Into<ParameterNode>, declared: &DeclaredType) -> Result<Value> {
        convert(&raw.into(), declared, &ConvertOptions::default(), &mut Vec::new())
    }

    #[rstest]
    #[case("1*5", 5)]
    #[case("3", 3)]
    #[case("10/2", 5)]
    #[case("-2*(3+1)", -8)]
    #[case("1e3", 1000)]
    fn test_convert_int(#[case] input: &str, #[case] expected: i64) {
        assert_eq!(run(input, &DeclaredType::Int).unwrap(), Value::Int(expected));
    }

    #[rstest]
    #[case("0.5*0.5", 0.25)]
    #[case("1", 1.0)]
    #[case("1/4", 0.25)]
    #[case("-1.5", -1.5)]
    fn test_convert_float(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(run(input, &DeclaredType::Float).unwrap(), Value::Float(expected));
    }

    #[test]
    fn test_non_integral_float_to_int_is_lossy() {
        assert!(matches!(run("3.5", &DeclaredType::Int), Err(Error::LossyConversion { .. })));
        assert!(matches!(run("7/2", &DeclaredType::Int), Err(Error::LossyConversion { .. })));
    }

    #[test]
    fn test_truncate_option() {
        let options = ConvertOptions {
            integers: IntegerCoercion::Truncate,
        };
        assert_eq!(to_int("3.9", &options).unwrap(), 3);
        assert_eq!(to_int("-3.9", &options).unwrap(), -3);
        assert!(matches!(to_int("1e30", &options), Err(Error::LossyConversion { .. })));
    }

    #[test]
    fn test_str_is_identity() {
        assert_eq!(run("1*5", &DeclaredType::Str).unwrap(), Value::Str("1*5".into()));
    }

    #[rstest]
    #[case("true", true)]
    #[case("Yes", true)]
    #[case("ON", true)]
    #[case("false", false)]
    #[case("no", false)]
    #[case("Off", false)]
    fn test_convert_bool(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(run(input, &DeclaredType::Bool).unwrap(), Value::Bool(expected));
    }

    #[test]
    fn test_invalid_bool() {
        assert!(matches!(run("maybe", &DeclaredType::Bool), Err(Error::InvalidScalar { .. })));
    }

    #[test]
    fn test_list_element_error_carries_index() {
        let raw: ParameterNode = vec!["1", "2", "x"].into();
        let err = run(raw, &DeclaredType::list(DeclaredType::Int)).unwrap_err();
        assert_eq!(err.path(), Some("2"));
        assert!(matches!(err, Error::UnsafeExpression { .. }));
    }

    #[test]
    fn test_map_converts_keys_and_values() {
        let raw: ParameterNode = [("1", "0.5"), ("2", "1/4")].into_iter().collect();
        let value = run(raw, &DeclaredType::map(DeclaredType::Int, DeclaredType::Float)).unwrap();
        assert_eq!(
            value,
            Value::Map(vec![
                (Value::Int(1), Value::Float(0.5)),
                (Value::Int(2), Value::Float(0.25)),
            ])
        );
    }

    #[test]
    fn test_shape_mismatch_is_unsupported() {
        let raw: ParameterNode = vec!["1"].into();
        match run(raw, &DeclaredType::Int) {
            Err(Error::UnsupportedConversion { runtime_type, declared, .. }) => {
                assert_eq!(runtime_type, "sequence");
                assert_eq!(declared, "int");
            }
            other => panic!("expected UnsupportedConversion, got {other:?}"),
        }
    }

    #[test]
    fn test_unsafe_expression_is_rejected() {
        assert!(matches!(
            run("__import__('os').system('true')", &DeclaredType::Int),
            Err(Error::UnsafeExpression { .. })
        ));
    }
}
