//! `lifecycle.ignore_changes` extraction.
//!
//! Two independent paths feed the suppression list, and both are kept on
//! purpose. The evaluated path mirrors what a null-context expression
//! evaluation can see: literal string lists. The syntactic path walks the
//! raw expression tree and is the only one that catches bare identifiers
//! (`ignore_changes = [tags]`), which never evaluate without a scope.

use crate::hcl::{expr::Expression, structure::Body};

use super::template_literal;

/// Sentinel produced by `ignore_changes = ["all"]`; matches every name at
/// and below the scope that introduced it.
pub const WILDCARD: &str = "*all*";

/// Evaluated path. Reads `ignore_changes` from a `lifecycle` body as a
/// statically-known string list. Any element that would need an evaluation
/// context aborts the whole list; evaluable non-string elements are skipped.
pub fn ignored_names_from_value(lifecycle_body: &Body) -> Vec<String> {
    let mut names = Vec::new();
    for attr in lifecycle_body.attributes() {
        if attr.key.as_str() != "ignore_changes" {
            continue;
        }
        let Some(values) = static_string_list(&attr.value) else {
            continue;
        };
        for value in values {
            if value == "all" {
                return vec![WILDCARD.to_string()];
            }
            names.push(value);
        }
    }
    names
}

/// Syntactic path. Walks a body's `lifecycle` blocks directly and collects
/// `ignore_changes` entries from three expression shapes: a scoped traversal
/// (root symbol name), a single-literal template, and a bare string literal.
pub fn ignored_names_from_syntax(body: &Body) -> Vec<String> {
    let mut names = Vec::new();
    for block in body.blocks().filter(|b| b.ident.as_str() == "lifecycle") {
        for attr in block.body.attributes() {
            if attr.key.as_str() != "ignore_changes" {
                continue;
            }
            let Expression::Array(items) = &attr.value else {
                continue;
            };
            for item in items.iter() {
                match item {
                    Expression::Variable(variable) => {
                        names.push(variable.as_str().to_string());
                    }
                    Expression::Traversal(traversal) => {
                        if let Some(root) = traversal.expr.as_variable() {
                            names.push(root.as_str().to_string());
                        }
                    }
                    Expression::StringTemplate(template) => {
                        if let Some(value) = template_literal(template) {
                            names.push(value);
                        }
                    }
                    Expression::String(literal) => {
                        names.push(literal.value().to_string());
                    }
                    _ => {}
                }
            }
        }
    }
    names
}

fn static_string_list(expr: &Expression) -> Option<Vec<String>> {
    let Expression::Array(items) = expr else {
        return None;
    };
    let mut values = Vec::new();
    for item in items.iter() {
        match item {
            Expression::String(s) => values.push(s.value().to_string()),
            Expression::StringTemplate(template) => values.push(template_literal(template)?),
            Expression::Bool(_) | Expression::Number(_) | Expression::Null(_) => {}
            _ => return None,
        }
    }
    Some(values)
}
