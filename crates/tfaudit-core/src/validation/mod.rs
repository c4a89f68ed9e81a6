//! Schema diff engine.
//!
//! Walks a parsed block body in lock-step with a provider schema block and
//! records a finding for every attribute or nested block the configuration
//! does not set. Suppression scopes accumulate on the way down: a name
//! ignored at depth *k* stays ignored for the whole subtree beneath it.

use crate::findings::Finding;
use crate::parser::suppression::WILDCARD;
use crate::parser::BlockData;
use crate::schema::SchemaBlock;


/// True when `name` is covered by the suppression set, either through the
/// wildcard sentinel or a case-insensitive match.
pub fn is_suppressed(ignore: &[String], name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    ignore.iter().any(|entry| entry == WILDCARD)
        || ignore.iter().any(|entry| entry.eq_ignore_ascii_case(name))
}

/// Diffs one block body against its schema block, appending findings.
/// `path` is the dotted trail from the resource root (`root` at the top).
pub fn validate_block(
    data: &BlockData,
    resource_type: &str,
    path: &str,
    schema: &SchemaBlock,
    parent_ignore: &[String],
    findings: &mut Vec<Finding>,
) {
    let mut ignore = Vec::with_capacity(parent_ignore.len() + data.ignore_changes.len());
    ignore.extend_from_slice(parent_ignore);
    ignore.extend(data.ignore_changes.iter().cloned());

    validate_attributes(data, resource_type, path, schema, &ignore, findings);
    validate_nested_blocks(data, resource_type, path, schema, &ignore, findings);
}

fn validate_attributes(
    data: &BlockData,
    resource_type: &str,
    path: &str,
    schema: &SchemaBlock,
    ignore: &[String],
    findings: &mut Vec<Finding>,
) {
    for (name, attribute) in &schema.attributes {
        // `id` is never user-settable in this schema dialect.
        if name == "id" {
            continue;
        }
        // Purely exported: computed without being settable.
        if attribute.computed && !attribute.optional && !attribute.required {
            continue;
        }
        if is_suppressed(ignore, name) {
            continue;
        }
        if !data.properties.contains(name) {
            findings.push(Finding {
                resource_type: resource_type.to_string(),
                path: path.to_string(),
                name: name.clone(),
                required: attribute.required,
                is_block: false,
                is_data_source: false,
                submodule_name: String::new(),
            });
        }
    }
}

fn validate_nested_blocks(
    data: &BlockData,
    resource_type: &str,
    path: &str,
    schema: &SchemaBlock,
    ignore: &[String],
    findings: &mut Vec<Finding>,
) {
    for (name, block_type) in &schema.block_types {
        // Framework metadata, never part of the resource structure.
        if name == "timeouts" {
            continue;
        }
        if is_suppressed(ignore, name) {
            continue;
        }

        let static_block = data.static_blocks.get(name);
        let dynamic_block = data.dynamic_blocks.get(name);
        let Some(target) = static_block.or(dynamic_block) else {
            findings.push(Finding {
                resource_type: resource_type.to_string(),
                path: path.to_string(),
                name: name.clone(),
                required: block_type.min_items > 0,
                is_block: true,
                is_data_source: false,
                submodule_name: String::new(),
            });
            continue;
        };

        let nested_path = format!("{path}.{name}");
        validate_block(target, resource_type, &nested_path, &block_type.block, ignore, findings);
    }
}
