//! Configuration parsing.
//!
//! Turns Terraform source files into a structural model of what a module
//! concretely sets: attribute names, literal nested blocks, and the content
//! bodies of `dynamic` blocks. Expressions are never evaluated against a
//! scope; anything that needs one is skipped.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::errors::Error;
use crate::hcl::{
    expr::{Expression, ObjectKey},
    structure::{Block, BlockLabel, Body},
    template::{Element, StringTemplate},
};

pub mod suppression;

#[cfg(test)]
mod tests;

pub const REGISTRY_HOST: &str = "registry.terraform.io/";

/// A provider requirement from a `terraform { required_providers { … } }` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub source: String,
    pub version: String,
}

/// A `resource "TYPE" "NAME"` declaration.
#[derive(Debug, Clone)]
pub struct ParsedResource {
    pub type_name: String,
    pub name: String,
    pub data: BlockData,
}

/// A `data "TYPE" "NAME"` declaration.
#[derive(Debug, Clone)]
pub struct ParsedDataSource {
    pub type_name: String,
    pub name: String,
    pub data: BlockData,
}

/// The structural image of one block body.
#[derive(Debug, Clone, Default)]
pub struct BlockData {
    /// Attribute names directly assigned in this body.
    pub properties: HashSet<String>,
    /// Literal nested blocks, one entry per block type (duplicates overwrite).
    pub static_blocks: HashMap<String, BlockData>,
    /// `content` bodies of `dynamic "label"` blocks, merged per label.
    pub dynamic_blocks: HashMap<String, BlockData>,
    /// Names treated as satisfied at this scope and all descendants.
    pub ignore_changes: Vec<String>,
}

impl BlockData {
    /// Merges `other` into `self`: properties union, matching child blocks
    /// merge recursively, suppression lists concatenate. Children of `other`
    /// are moved, never shared.
    pub fn merge_from(&mut self, other: BlockData) {
        self.properties.extend(other.properties);
        for (name, child) in other.static_blocks {
            match self.static_blocks.get_mut(&name) {
                Some(existing) => existing.merge_from(child),
                None => {
                    self.static_blocks.insert(name, child);
                }
            }
        }
        for (name, child) in other.dynamic_blocks {
            match self.dynamic_blocks.get_mut(&name) {
                Some(existing) => existing.merge_from(child),
                None => {
                    self.dynamic_blocks.insert(name, child);
                }
            }
        }
        self.ignore_changes.extend(other.ignore_changes);
    }
}

/// Prefixes the canonical registry host onto shorthand provider sources.
/// Idempotent: already-rooted sources pass through unchanged.
pub fn normalize_source(source: &str) -> String {
    if source.contains('/') && !source.contains(REGISTRY_HOST) {
        return format!("{REGISTRY_HOST}{source}");
    }
    source.to_string()
}

/// Extracts provider requirements from a toolchain configuration file.
/// A missing file is not an error; it yields no requirements.
pub fn parse_provider_requirements(path: &Path) -> Result<IndexMap<String, ProviderConfig>, Error> {
    if !path.exists() {
        return Ok(IndexMap::new());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;
    parse_provider_requirements_source(&content, &path.display().to_string())
}

pub fn parse_provider_requirements_source(
    content: &str,
    file: &str,
) -> Result<IndexMap<String, ProviderConfig>, Error> {
    let body: Body = content
        .parse()
        .map_err(|e| Error::Parse { file: file.to_string(), message: format!("{e}") })?;

    let mut providers = IndexMap::new();
    for block in body.blocks().filter(|b| b.ident.as_str() == "terraform") {
        for inner in block.body.blocks().filter(|b| b.ident.as_str() == "required_providers") {
            for attr in inner.body.attributes() {
                let Expression::Object(object) = &attr.value else {
                    continue;
                };
                let mut config = ProviderConfig::default();
                for (key, value) in object.iter() {
                    let Some(field) = object_key_name(key) else {
                        continue;
                    };
                    let Some(text) = string_literal(value.expr()) else {
                        continue;
                    };
                    match field {
                        "source" => config.source = normalize_source(&text),
                        "version" => config.version = text,
                        _ => {}
                    }
                }
                providers.insert(attr.key.as_str().to_string(), config);
            }
        }
    }
    Ok(providers)
}

/// Extracts resources and data sources from a main configuration file.
pub fn parse_main_file(path: &Path) -> Result<(Vec<ParsedResource>, Vec<ParsedDataSource>), Error> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;
    parse_main_source(&content, &path.display().to_string())
}

pub fn parse_main_source(
    content: &str,
    file: &str,
) -> Result<(Vec<ParsedResource>, Vec<ParsedDataSource>), Error> {
    let body: Body = content
        .parse()
        .map_err(|e| Error::Parse { file: file.to_string(), message: format!("{e}") })?;

    let mut resources = Vec::new();
    let mut data_sources = Vec::new();

    for block in body.blocks() {
        if block.labels.len() < 2 {
            continue;
        }
        let kind = block.ident.as_str();
        if kind != "resource" && kind != "data" {
            continue;
        }
        let (Some(type_name), Some(name)) = (label_value(block, 0), label_value(block, 1)) else {
            continue;
        };

        let mut data = parse_body(&block.body);
        // A second syntactic pass over the declaration body; duplicates are
        // tolerated because suppression matching is case-insensitive.
        data.ignore_changes.extend(suppression::ignored_names_from_syntax(&block.body));

        if kind == "resource" {
            resources.push(ParsedResource {
                type_name: type_name.to_string(),
                name: name.to_string(),
                data,
            });
        } else {
            data_sources.push(ParsedDataSource {
                type_name: type_name.to_string(),
                name: name.to_string(),
                data,
            });
        }
    }
    Ok((resources, data_sources))
}

/// Builds the structural image of a single block body.
pub fn parse_body(body: &Body) -> BlockData {
    let mut data = BlockData::default();
    data.ignore_changes.extend(suppression::ignored_names_from_syntax(body));

    for attr in body.attributes() {
        data.properties.insert(attr.key.as_str().to_string());
    }

    for block in body.blocks() {
        match block.ident.as_str() {
            "lifecycle" => {
                data.ignore_changes.extend(suppression::ignored_names_from_value(&block.body));
            }
            "dynamic" => {
                if block.labels.len() != 1 {
                    continue;
                }
                let Some(label) = label_value(block, 0) else {
                    continue;
                };
                let parsed = parse_body(content_body(&block.body));
                match data.dynamic_blocks.get_mut(label) {
                    Some(existing) => existing.merge_from(parsed),
                    None => {
                        data.dynamic_blocks.insert(label.to_string(), parsed);
                    }
                }
            }
            other => {
                data.static_blocks.insert(other.to_string(), parse_body(&block.body));
            }
        }
    }
    data
}

/// The `content { … }` sub-body of a dynamic block, or the dynamic body
/// itself when no `content` block is present.
fn content_body(body: &Body) -> &Body {
    body.blocks()
        .find(|b| b.ident.as_str() == "content")
        .map(|b| &b.body)
        .unwrap_or(body)
}

fn label_value(block: &Block, index: usize) -> Option<&str> {
    block.labels.get(index).map(|label| match label {
        BlockLabel::String(s) => s.value().as_str(),
        BlockLabel::Ident(i) => i.as_str(),
    })
}

fn object_key_name(key: &ObjectKey) -> Option<&str> {
    match key {
        ObjectKey::Ident(ident) => Some(ident.as_str()),
        ObjectKey::Expression(Expression::String(s)) => Some(s.value().as_str()),
        ObjectKey::Expression(_) => None,
    }
}

/// A string that is statically known: a bare literal, or a template made of
/// exactly one literal part.
fn string_literal(expr: &Expression) -> Option<String> {
    match expr {
        Expression::String(s) => Some(s.value().to_string()),
        Expression::StringTemplate(template) => template_literal(template),
        _ => None,
    }
}

pub(crate) fn template_literal(template: &StringTemplate) -> Option<String> {
    let mut elements = template.iter();
    match (elements.next(), elements.next()) {
        (Some(Element::Literal(literal)), None) => Some(literal.value().to_string()),
        _ => None,
    }
}
