//! Block-style YAML emission with optional field comments
//!
//! `serde_yaml` cannot attach comments, so trees are written line by line
//! here. Scalars are quoted through `serde_yaml` so every leaf reads back
//! as the same string. Comments are keyed by the flat path of the node
//! they describe; a scalar carries its comment at the end of its line,
//! while mappings and sequences carry it on the line above.

use std::collections::HashMap;

use serde_yaml::Value as YamlValue;

use crate::flatten::FlatPath;
use crate::node::ParameterNode;

/// Comment text keyed by the flat path of the commented node.
pub type Comments = HashMap<FlatPath, String>;

/// Emit a tree as YAML without comments.
pub fn to_yaml_string(node: &ParameterNode) -> String {
    to_yaml_string_with_comments(node, &Comments::new())
}

/// Emit a tree as YAML, attaching the given comments.
pub fn to_yaml_string_with_comments(node: &ParameterNode, comments: &Comments) -> String {
    let lines = match node {
        ParameterNode::Scalar(value) => vec![quote(value)],
        ParameterNode::Mapping(map) if map.is_empty() => vec!["{}".to_string()],
        ParameterNode::Sequence(items) if items.is_empty() => vec!["[]".to_string()],
        ParameterNode::Mapping(_) => mapping_lines(node, "", comments),
        ParameterNode::Sequence(_) => sequence_lines(node, "", comments),
    };

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Quote a scalar so YAML reads it back as exactly this string.
fn quote(value: &str) -> String {
    if value.contains(['\n', '\r']) {
        // A JSON string is a valid double-quoted YAML scalar.
        return serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"));
    }
    match serde_yaml::to_string(&YamlValue::String(value.to_string())) {
        // The emitter folds long plain scalars; keep every scalar on one line.
        Ok(rendered) if !rendered.trim_end_matches('\n').contains('\n') => {
            rendered.trim_end_matches('\n').to_string()
        }
        _ => serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}")),
    }
}

fn comment_text(comments: &Comments, path: &str) -> Option<String> {
    comments
        .get(path)
        .map(|text| text.lines().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.trim().is_empty())
}

fn child_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

/// Inline rendering for scalars and empty containers.
fn inline(node: &ParameterNode) -> Option<String> {
    match node {
        ParameterNode::Scalar(value) => Some(quote(value)),
        ParameterNode::Mapping(map) if map.is_empty() => Some("{}".to_string()),
        ParameterNode::Sequence(items) if items.is_empty() => Some("[]".to_string()),
        _ => None,
    }
}

fn with_trailing_comment(line: String, comment: Option<String>) -> String {
    match comment {
        Some(text) => format!("{line}  # {text}"),
        None => line,
    }
}

fn mapping_lines(node: &ParameterNode, prefix: &str, comments: &Comments) -> Vec<String> {
    let Some(map) = node.as_mapping() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (key, value) in map {
        let path = child_path(prefix, key);
        let comment = comment_text(comments, &path);
        let key = quote(key);

        if let Some(rendered) = inline(value) {
            lines.push(with_trailing_comment(format!("{key}: {rendered}"), comment));
            continue;
        }

        if let Some(text) = comment {
            lines.push(format!("# {text}"));
        }
        lines.push(format!("{key}:"));
        let nested = match value {
            ParameterNode::Mapping(_) => mapping_lines(value, &path, comments),
            _ => sequence_lines(value, &path, comments),
        };
        lines.extend(nested.into_iter().map(|line| format!("  {line}")));
    }
    lines
}

fn sequence_lines(node: &ParameterNode, prefix: &str, comments: &Comments) -> Vec<String> {
    let Some(items) = node.as_sequence() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let path = child_path(prefix, &idx.to_string());
        let comment = comment_text(comments, &path);

        if let Some(rendered) = inline(item) {
            lines.push(with_trailing_comment(format!("- {rendered}"), comment));
            continue;
        }

        if let Some(text) = comment {
            lines.push(format!("# {text}"));
        }
        let nested = match item {
            ParameterNode::Mapping(_) => mapping_lines(item, &path, comments),
            _ => sequence_lines(item, &path, comments),
        };
        for (position, line) in nested.into_iter().enumerate() {
            if position == 0 {
                lines.push(format!("- {line}"));
            } else {
                lines.push(format!("  {line}"));
            }
        }
    }
    lines
}
