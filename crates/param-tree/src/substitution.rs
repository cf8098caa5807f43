//! `$name` / `${name}` substitution across a parameter tree
//!
//! A substitution pass flattens the tree and rewrites every scalar leaf,
//! replacing references to other leaves' flat paths with their values.
//! Passes repeat until the flattened tree stops changing.
//!
//! A bare reference `$name` only matches when the character after `name`
//! is not an identifier character (`[A-Za-z0-9_]`), so `$rate_2` never
//! matches the key `rate`, while `$rate.` and `$rate` at the end do. The
//! braced form `${name}` always matches.
//!
//! Within one pass each leaf is scanned once, left to right. At every `$`
//! the first key in flattened order that matches is replaced, and the
//! inserted value is not rescanned until the next pass. This can differ
//! from applying each key in turn over the whole string, but both reach
//! the same fixed point.

use crate::error::{Error, Result};
use crate::flatten::{Flattened, flatten, map_scalars};
use crate::node::ParameterNode;

/// Default bound on substitution passes.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Options controlling the substitution fixed-point loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionOptions {
    /// Maximum number of passes before giving up with a divergence error
    pub max_iterations: usize,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Match a reference at the start of `candidate` (which begins with `$`).
///
/// Keys are tried in map order; the first one that matches wins. Returns the
/// matched key, the number of bytes consumed and the replacement value.
fn match_reference<'a>(candidate: &str, subs: &'a Flattened) -> Option<(&'a str, usize, &'a str)> {
    let body = candidate.strip_prefix('$')?;
    subs.iter()
        .filter(|(key, _)| !key.is_empty())
        .find_map(|(key, value)| {
            let braced = body
                .strip_prefix('{')
                .and_then(|rest| rest.strip_prefix(key.as_str()))
                .and_then(|rest| rest.strip_prefix('}'));
            if braced.is_some() {
                return Some((key.as_str(), key.len() + 3, value.as_str()));
            }

            let after = body.strip_prefix(key.as_str())?;
            if after.chars().next().is_none_or(|ch| !is_identifier_char(ch)) {
                Some((key.as_str(), key.len() + 1, value.as_str()))
            } else {
                None
            }
        })
}

/// Rewrite a single string, replacing every reference in one scan.
///
/// Replacement text is not rescanned within the same call.
pub fn substitute_str(text: &str, subs: &Flattened) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match match_reference(candidate, subs) {
            Some((_, consumed, value)) => {
                out.push_str(value);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('$');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Keys referenced from `text` that exist in `subs`.
fn references<'a>(text: &str, subs: &'a Flattened) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        let candidate = &rest[pos..];
        match match_reference(candidate, subs) {
            Some((key, consumed, _)) => {
                found.push(key);
                rest = &candidate[consumed..];
            }
            None => rest = &candidate[1..],
        }
    }
    found
}

/// Apply one substitution pass, producing a new tree of the same shape.
pub fn substitute_once(node: &ParameterNode, subs: &Flattened) -> ParameterNode {
    map_scalars(node, &mut |_, value| substitute_str(value, subs))
}

/// Leaves that still reference other leaves.
fn unresolved_references(flat: &Flattened) -> Vec<String> {
    flat.iter()
        .filter(|(_, value)| !references(value, flat).is_empty())
        .map(|(path, _)| path.clone())
        .collect()
}

/// Substitute until the flattened tree reaches a fixed point.
///
/// A fixed point that still contains resolvable references can only come
/// from a reference cycle (`a: $b`, `b: $a`), and is reported as
/// [`Error::SubstitutionDivergence`], as is exceeding
/// `options.max_iterations` passes.
pub fn perform_substitutions(
    node: &ParameterNode,
    options: &SubstitutionOptions,
) -> Result<ParameterNode> {
    let mut current = node.clone();
    let mut flat = flatten(&current);

    for iteration in 1..=options.max_iterations {
        let next = substitute_once(&current, &flat);
        let next_flat = flatten(&next);

        if next_flat == flat {
            let unresolved = unresolved_references(&next_flat);
            if !unresolved.is_empty() {
                tracing::debug!(iteration, ?unresolved, "substitution reached a cyclic fixed point");
                return Err(Error::SubstitutionDivergence {
                    iterations: iteration,
                    unresolved,
                });
            }
            tracing::debug!(iterations = iteration, leaves = flat.len(), "substitutions converged");
            return Ok(next);
        }

        tracing::trace!(iteration, "substitution pass changed the tree");
        current = next;
        flat = next_flat;
    }

    Err(Error::SubstitutionDivergence {
        iterations: options.max_iterations,
        unresolved: unresolved_references(&flat),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(source: &str) -> ParameterNode {
        serde_yaml::from_str(source).unwrap()
    }

    fn subs(pairs: &[(&str, &str)]) -> Flattened {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bare_reference_at_end() {
        assert_eq!(substitute_str("3*$a", &subs(&[("a", "1.0")])), "3*1.0");
    }

    #[test]
    fn test_braced_reference() {
        assert_eq!(substitute_str("${a}0", &subs(&[("a", "1")])), "10");
    }

    #[test]
    fn test_partial_token_not_substituted() {
        let table = subs(&[("variable_1", "x")]);
        assert_eq!(substitute_str("$variable_1y", &table), "$variable_1y");
        assert_eq!(substitute_str("$variable_1.", &table), "x.");
    }

    #[test]
    fn test_first_key_in_order_wins() {
        let table = subs(&[("a", "A"), ("a.b", "AB")]);
        assert_eq!(substitute_str("$a.b", &table), "A.b");

        let table = subs(&[("a.b", "AB"), ("a", "A")]);
        assert_eq!(substitute_str("$a.b", &table), "AB");
    }

    #[test]
    fn test_replacement_not_rescanned_in_same_pass() {
        let table = subs(&[("a", "$b"), ("b", "2")]);
        assert_eq!(substitute_str("$a", &table), "$b");
    }

    #[test]
    fn test_unknown_reference_left_alone() {
        assert_eq!(substitute_str("cost: $5 and $HOME", &subs(&[("a", "1")])), "cost: $5 and $HOME");
    }

    #[test]
    fn test_perform_substitutions_chain() {
        let tree = yaml("a: '1.0'\nb: ['1', '2', '3*$a']\nc: $b.2\n");
        let result = perform_substitutions(&tree, &SubstitutionOptions::default()).unwrap();
        assert_eq!(result, yaml("a: '1.0'\nb: ['1', '2', '3*1.0']\nc: '3*1.0'\n"));
    }

    #[test]
    fn test_perform_substitutions_cycle_diverges() {
        let tree = yaml("a: $b\nb: $a\n");
        let result = perform_substitutions(&tree, &SubstitutionOptions::default());
        assert!(matches!(result, Err(Error::SubstitutionDivergence { .. })));
    }

    #[test]
    fn test_perform_substitutions_growing_value_hits_cap() {
        let tree = yaml("a: x$a\n");
        let options = SubstitutionOptions { max_iterations: 5 };
        match perform_substitutions(&tree, &options) {
            Err(Error::SubstitutionDivergence { iterations, unresolved }) => {
                assert_eq!(iterations, 5);
                assert_eq!(unresolved, vec!["a".to_string()]);
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }
}
