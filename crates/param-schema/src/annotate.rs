//! Help comments for emitted records

use param_tree::{Comments, ParameterNode};

use crate::config::MODULE_NAME_KEY;
use crate::declared::{DeclaredType, RecordType};
use crate::registry::ModuleRegistry;

/// Collect field help text for `node`, keyed by flat path.
///
/// Variant fields are described by the schema of the module their
/// `module_name` resolves to; unresolvable ones get no comments.
pub fn help_comments(node: &ParameterNode, declared: &DeclaredType, registry: &ModuleRegistry) -> Comments {
    let mut comments = Comments::new();
    collect(node, declared, registry, "", &mut comments);
    comments
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn collect(
    node: &ParameterNode,
    declared: &DeclaredType,
    registry: &ModuleRegistry,
    prefix: &str,
    out: &mut Comments,
) {
    match (declared, node) {
        (DeclaredType::Record(record), ParameterNode::Mapping(_)) => {
            collect_record(node, record, registry, prefix, out);
        }
        (DeclaredType::Variant(family), ParameterNode::Mapping(map)) => {
            let entry = map
                .get(MODULE_NAME_KEY)
                .and_then(ParameterNode::as_scalar)
                .and_then(|name| registry.lookup(family.namespace(), name));
            if let Some(entry) = entry {
                collect_record(node, entry.record_type(), registry, prefix, out);
            }
        }
        (DeclaredType::List(inner), ParameterNode::Sequence(items)) => {
            for (index, item) in items.iter().enumerate() {
                collect(item, inner, registry, &join(prefix, &index.to_string()), out);
            }
        }
        _ => {}
    }
}

fn collect_record(
    node: &ParameterNode,
    record: &RecordType,
    registry: &ModuleRegistry,
    prefix: &str,
    out: &mut Comments,
) {
    for spec in record.schema().fields() {
        let Some(child) = node.get(spec.name()) else {
            continue;
        };
        let path = join(prefix, spec.name());
        if let Some(help) = spec.help_text() {
            out.insert(path.clone(), help.to_string());
        }
        collect(child, spec.declared(), registry, &path, out);
    }
}
