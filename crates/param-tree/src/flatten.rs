//! Flattening of parameter trees into dotted paths
//!
//! Every scalar leaf is addressed by the keys and list positions leading to
//! it, joined with `.`: `{"list": [{"p": 0}]}` flattens to `list.0.p -> "0"`.
//! A scalar at the root has the empty path.

use indexmap::IndexMap;

use crate::node::ParameterNode;

/// Dotted path of one scalar leaf (`a.b.2.c`).
pub type FlatPath = String;

/// Leaf values keyed by their flat paths, in depth-first order.
pub type Flattened = IndexMap<FlatPath, String>;

/// Flatten a tree into its scalar leaves.
pub fn flatten(node: &ParameterNode) -> Flattened {
    let mut out = Flattened::new();
    flatten_into(node, String::new(), &mut out);
    out
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn flatten_into(node: &ParameterNode, prefix: String, out: &mut Flattened) {
    match node {
        ParameterNode::Scalar(value) => {
            out.insert(prefix, value.clone());
        }
        ParameterNode::Sequence(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_into(item, join(&prefix, &idx.to_string()), out);
            }
        }
        ParameterNode::Mapping(map) => {
            for (key, value) in map {
                flatten_into(value, join(&prefix, key), out);
            }
        }
    }
}

/// Rebuild a tree of the same shape, rewriting every scalar leaf.
///
/// The closure receives the leaf's flat path and current value.
pub fn map_scalars<F>(node: &ParameterNode, f: &mut F) -> ParameterNode
where
    F: FnMut(&str, &str) -> String,
{
    map_scalars_at(node, "", f)
}

fn map_scalars_at<F>(node: &ParameterNode, prefix: &str, f: &mut F) -> ParameterNode
where
    F: FnMut(&str, &str) -> String,
{
    match node {
        ParameterNode::Scalar(value) => ParameterNode::Scalar(f(prefix, value)),
        ParameterNode::Sequence(items) => ParameterNode::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| map_scalars_at(item, &join(prefix, &idx.to_string()), f))
                .collect(),
        ),
        ParameterNode::Mapping(map) => ParameterNode::Mapping(
            map.iter()
                .map(|(key, value)| (key.clone(), map_scalars_at(value, &join(prefix, key), f)))
                .collect(),
        ),
    }
}
