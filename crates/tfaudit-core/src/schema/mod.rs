//! Provider schema catalog, as emitted by `terraform providers schema -json`.

use std::collections::HashMap;

use serde::Deserialize;

pub mod loader;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaCatalog {
    #[serde(default)]
    pub provider_schemas: HashMap<String, ProviderSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSchema {
    #[serde(default)]
    pub resource_schemas: HashMap<String, ResourceSchema>,
    #[serde(default)]
    pub data_source_schemas: HashMap<String, ResourceSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceSchema {
    #[serde(default)]
    pub block: SchemaBlock,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaBlock {
    #[serde(default)]
    pub attributes: HashMap<String, SchemaAttribute>,
    #[serde(default)]
    pub block_types: HashMap<String, SchemaBlockType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaAttribute {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaBlockType {
    #[serde(default)]
    pub nesting: String,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
    #[serde(default)]
    pub block: SchemaBlock,
}
