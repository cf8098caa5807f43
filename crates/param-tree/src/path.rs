//! Path parsing and traversal utilities
//!
//! Paths address nodes of a parameter tree using dot-separated segments.
//! Sequence positions may be written either as plain numeric segments or
//! with brackets.
//!
//! # Path Syntax
//!
//! - Dot-separated keys: `trainer.optimizer.lr`
//! - Numeric segments: `metrics.0.threshold`
//! - Array indexing: `metrics[0].threshold`
//!
//! Whether a segment is read as a mapping key or a list index is decided by
//! the node it is applied to, so `modules.1` works for both a sequence and
//! a mapping with the key `"1"`.
//!
//! # Examples
//!
//! ```
//! use param_tree::path::{parse_path, get_at_path, PathSegment};
//! use param_tree::ParameterNode;
//!
//! let path = parse_path("metrics[0].threshold");
//! assert_eq!(path, vec![
//!     PathSegment::Key("metrics".to_string()),
//!     PathSegment::Index(0),
//!     PathSegment::Key("threshold".to_string()),
//! ]);
//!
//! let tree: ParameterNode = serde_yaml::from_str("metrics:\n- threshold: 0.5\n").unwrap();
//! assert_eq!(
//!     get_at_path(&tree, &path),
//!     Some(&ParameterNode::from("0.5"))
//! );
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::node::ParameterNode;

/// A segment of a path - either a key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A key in a mapping (e.g., "optimizer" in "trainer.optimizer")
    Key(String),
    /// An index in a sequence (e.g., 0 in `metrics[0]`)
    Index(usize),
}

impl PathSegment {
    /// Interpret this segment as a sequence index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(idx) => Some(*idx),
            PathSegment::Key(key) => key.parse().ok(),
        }
    }

    /// Interpret this segment as a mapping key.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Key(key) => Cow::Borrowed(key),
            PathSegment::Index(idx) => Cow::Owned(idx.to_string()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// Parse a path string into segments.
///
/// # Examples
///
/// ```
/// use param_tree::path::{parse_path, PathSegment};
///
/// let path = parse_path("trainer.batch_size");
/// assert_eq!(path, vec![
///     PathSegment::Key("trainer".to_string()),
///     PathSegment::Key("batch_size".to_string()),
/// ]);
/// ```
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
                let mut index_str = String::new();
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                    index_str.push(ch);
                }
                if let Ok(index) = index_str.trim().parse::<usize>() {
                    segments.push(PathSegment::Index(index));
                }
            }
            _ => current_key.push(ch),
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Key(current_key));
    }

    segments
}

/// Join segments into the dotted flat-path form (`a.b.2.c`).
pub fn format_path(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn child<'a>(node: &'a ParameterNode, segment: &PathSegment) -> Option<&'a ParameterNode> {
    match node {
        ParameterNode::Mapping(map) => map.get(segment.as_key().as_ref()),
        ParameterNode::Sequence(items) => items.get(segment.as_index()?),
        ParameterNode::Scalar(_) => None,
    }
}

fn child_mut<'a>(
    node: &'a mut ParameterNode,
    segment: &PathSegment,
) -> Option<&'a mut ParameterNode> {
    match node {
        ParameterNode::Mapping(map) => map.get_mut(segment.as_key().as_ref()),
        ParameterNode::Sequence(items) => items.get_mut(segment.as_index()?),
        ParameterNode::Scalar(_) => None,
    }
}

/// Get the node at the given path.
///
/// Returns `None` if the path doesn't exist.
pub fn get_at_path<'a>(node: &'a ParameterNode, segments: &[PathSegment]) -> Option<&'a ParameterNode> {
    segments
        .iter()
        .try_fold(node, |current, segment| child(current, segment))
}

/// Set a node at the given path.
///
/// Every intermediate segment must exist. The last segment may name a new
/// key of a mapping; a sequence index must already exist.
///
/// Returns `true` if the value was set, `false` otherwise.
pub fn set_at_path(node: &mut ParameterNode, segments: &[PathSegment], new_value: ParameterNode) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        *node = new_value;
        return true;
    };

    let mut current = node;
    for segment in parents {
        match child_mut(current, segment) {
            Some(next) => current = next,
            None => return false,
        }
    }

    match current {
        ParameterNode::Mapping(map) => {
            map.insert(last.as_key().into_owned(), new_value);
            true
        }
        ParameterNode::Sequence(items) => match last.as_index().and_then(|idx| items.get_mut(idx)) {
            Some(slot) => {
                *slot = new_value;
                true
            }
            None => false,
        },
        ParameterNode::Scalar(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(source: &str) -> ParameterNode {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn test_parse_path_simple() {
        assert_eq!(parse_path("name"), vec![PathSegment::Key("name".to_string())]);
    }

    #[test]
    fn test_parse_path_numeric_segment_stays_key() {
        assert_eq!(
            parse_path("list.1.param1"),
            vec![
                PathSegment::Key("list".to_string()),
                PathSegment::Key("1".to_string()),
                PathSegment::Key("param1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_path_bracket_index() {
        assert_eq!(
            parse_path("items[2]"),
            vec![PathSegment::Key("items".to_string()), PathSegment::Index(2)]
        );
    }

    #[test]
    fn test_format_path() {
        let segments = vec![PathSegment::from("list"), PathSegment::from(0), PathSegment::from("x")];
        assert_eq!(format_path(&segments), "list.0.x");
        assert_eq!(format_path(&[]), "");
    }

    #[test]
    fn test_get_at_path_numeric_key_on_sequence() {
        let tree = yaml("list:\n- param1: 0\n- param1: 1\n");
        assert_eq!(
            get_at_path(&tree, &parse_path("list.1.param1")),
            Some(&ParameterNode::from("1"))
        );
    }

    #[test]
    fn test_get_at_path_index_on_mapping_key() {
        let tree = yaml("'0': zero\n");
        assert_eq!(
            get_at_path(&tree, &[PathSegment::Index(0)]),
            Some(&ParameterNode::from("zero"))
        );
    }

    #[test]
    fn test_get_at_path_missing() {
        let tree = yaml("a: 1\n");
        assert_eq!(get_at_path(&tree, &parse_path("a.b")), None);
        assert_eq!(get_at_path(&tree, &parse_path("missing")), None);
    }

    #[test]
    fn test_set_at_path_inserts_leaf_key() {
        let mut tree = yaml("a: {}\n");
        assert!(set_at_path(&mut tree, &parse_path("a.b"), "2".into()));
        assert_eq!(tree, yaml("a:\n  b: '2'\n"));
    }

    #[test]
    fn test_set_at_path_rejects_missing_intermediate() {
        let mut tree = yaml("a: 1\n");
        assert!(!set_at_path(&mut tree, &parse_path("x.y"), "2".into()));
    }

    #[test]
    fn test_set_at_path_rejects_out_of_range_index() {
        let mut tree = yaml("a: [1, 2]\n");
        assert!(!set_at_path(&mut tree, &parse_path("a.5"), "2".into()));
        assert!(set_at_path(&mut tree, &parse_path("a.1"), "3".into()));
        assert_eq!(tree, yaml("a: [1, 3]\n"));
    }
}
