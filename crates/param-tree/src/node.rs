//! The parameter node type
//!
//! Every leaf of a parameter tree is a string. Numbers and booleans read
//! from YAML are stringified on the way in, so the tree carries no type
//! information beyond its three shapes.

use std::fmt;

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

/// A node in a parameter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterNode {
    /// A leaf holding the string form of its original value
    Scalar(String),
    /// An ordered list of nodes
    Sequence(Vec<ParameterNode>),
    /// An insertion-ordered map of string keys to nodes
    Mapping(IndexMap<String, ParameterNode>),
}

/// The shape of a [`ParameterNode`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Scalar => write!(f, "scalar"),
            NodeKind::Sequence => write!(f, "sequence"),
            NodeKind::Mapping => write!(f, "mapping"),
        }
    }
}

impl ParameterNode {
    /// An empty mapping node.
    pub fn empty_mapping() -> Self {
        Self::Mapping(IndexMap::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar(_) => NodeKind::Scalar,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ParameterNode]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ParameterNode>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut IndexMap<String, ParameterNode>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&ParameterNode> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Short human-readable rendering used in error messages.
    ///
    /// Long renderings are cut at 60 characters.
    pub fn excerpt(&self) -> String {
        let rendered = match self {
            Self::Scalar(s) => format!("{s:?}"),
            other => serde_json::to_string(other).unwrap_or_else(|_| other.kind().to_string()),
        };
        if rendered.chars().count() > 60 {
            let cut: String = rendered.chars().take(57).collect();
            format!("{cut}...")
        } else {
            rendered
        }
    }

    /// Convert into a YAML value with string leaves.
    pub fn to_yaml_value(&self) -> YamlValue {
        match self {
            Self::Scalar(s) => YamlValue::String(s.clone()),
            Self::Sequence(items) => {
                YamlValue::Sequence(items.iter().map(ParameterNode::to_yaml_value).collect())
            }
            Self::Mapping(map) => {
                let mut mapping = serde_yaml::Mapping::new();
                for (key, value) in map {
                    mapping.insert(YamlValue::String(key.clone()), value.to_yaml_value());
                }
                YamlValue::Mapping(mapping)
            }
        }
    }
}

/// Stringify a YAML scalar the way the tree stores it.
fn scalar_text(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::Null => Some("null".to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Tagged(tagged) => scalar_text(&tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => None,
    }
}

fn key_text(key: &YamlValue) -> String {
    scalar_text(key).unwrap_or_else(|| {
        serde_yaml::to_string(key)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default()
    })
}

impl From<YamlValue> for ParameterNode {
    fn from(value: YamlValue) -> Self {
        match value {
            YamlValue::Sequence(items) => {
                Self::Sequence(items.into_iter().map(ParameterNode::from).collect())
            }
            YamlValue::Mapping(mapping) => Self::Mapping(
                mapping
                    .into_iter()
                    .map(|(k, v)| (key_text(&k), ParameterNode::from(v)))
                    .collect(),
            ),
            YamlValue::Tagged(tagged) => ParameterNode::from(tagged.value),
            scalar => Self::Scalar(scalar_text(&scalar).unwrap_or_default()),
        }
    }
}

impl From<&str> for ParameterNode {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for ParameterNode {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<&String> for ParameterNode {
    fn from(s: &String) -> Self {
        Self::Scalar(s.clone())
    }
}

impl From<i64> for ParameterNode {
    fn from(n: i64) -> Self {
        Self::Scalar(n.to_string())
    }
}

impl From<i32> for ParameterNode {
    fn from(n: i32) -> Self {
        Self::Scalar(n.to_string())
    }
}

impl From<u32> for ParameterNode {
    fn from(n: u32) -> Self {
        Self::Scalar(n.to_string())
    }
}

impl From<u64> for ParameterNode {
    fn from(n: u64) -> Self {
        Self::Scalar(n.to_string())
    }
}

impl From<usize> for ParameterNode {
    fn from(n: usize) -> Self {
        Self::Scalar(n.to_string())
    }
}

impl From<f64> for ParameterNode {
    fn from(x: f64) -> Self {
        // Debug keeps the trailing `.0` on integral floats, matching YAML output.
        Self::Scalar(format!("{x:?}"))
    }
}

impl From<f32> for ParameterNode {
    fn from(x: f32) -> Self {
        Self::Scalar(format!("{x:?}"))
    }
}

impl From<bool> for ParameterNode {
    fn from(b: bool) -> Self {
        Self::Scalar(b.to_string())
    }
}

impl<T: Into<ParameterNode>> From<Vec<T>> for ParameterNode {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<ParameterNode>> FromIterator<(K, V)> for ParameterNode {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Mapping(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for ParameterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(s) => serializer.serialize_str(s),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParameterNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        YamlValue::deserialize(deserializer).map(ParameterNode::from)
    }
}
