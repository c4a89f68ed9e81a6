use super::suppression::WILDCARD;
use super::*;

fn parse_single_resource(content: &str) -> ParsedResource {
    let (mut resources, _) = parse_main_source(content, "main.tf").unwrap();
    assert_eq!(resources.len(), 1);
    resources.remove(0)
}

#[test]
fn collects_resources_and_data_sources() {
    let content = r#"
resource "azurerm_key_vault" "vault" {
  name = "kv"
}

data "azurerm_client_config" "current" {}

module "network" {
  source = "./modules/network"
}
"#;
    let (resources, data_sources) = parse_main_source(content, "main.tf").unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].type_name, "azurerm_key_vault");
    assert_eq!(resources[0].name, "vault");
    assert!(resources[0].data.properties.contains("name"));
    assert_eq!(data_sources.len(), 1);
    assert_eq!(data_sources[0].type_name, "azurerm_client_config");
}

#[test]
fn short_label_blocks_are_skipped() {
    let content = r#"
resource "azurerm_key_vault" {
  name = "kv"
}
"#;
    let (resources, data_sources) = parse_main_source(content, "main.tf").unwrap();
    assert!(resources.is_empty());
    assert!(data_sources.is_empty());
}

#[test]
fn empty_source_yields_empty_results() {
    let (resources, data_sources) = parse_main_source("", "main.tf").unwrap();
    assert!(resources.is_empty());
    assert!(data_sources.is_empty());
}

#[test]
fn syntax_errors_surface_the_file_name() {
    let err = parse_main_source("resource \"a\" {", "modules/vault/main.tf").unwrap_err();
    match err {
        crate::Error::Parse { file, .. } => assert_eq!(file, "modules/vault/main.tf"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn nested_blocks_are_recursed() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  name = "kv"

  network_acls {
    bypass         = "AzureServices"
    default_action = "Deny"

    virtual_network_subnet_ids {
      id = "subnet"
    }
  }
}
"#,
    );
    let acls = &resource.data.static_blocks["network_acls"];
    assert!(acls.properties.contains("bypass"));
    assert!(acls.properties.contains("default_action"));
    assert!(acls.static_blocks.contains_key("virtual_network_subnet_ids"));
}

#[test]
fn duplicate_static_blocks_overwrite() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  contact {
    email = "a@b.c"
  }
  contact {
    phone = "123"
  }
}
"#,
    );
    let contact = &resource.data.static_blocks["contact"];
    assert!(contact.properties.contains("phone"));
    assert!(!contact.properties.contains("email"));
}

#[test]
fn dynamic_block_content_is_captured() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  dynamic "access_policy" {
    for_each = var.policies
    content {
      object_id = access_policy.value.object_id
    }
  }
}
"#,
    );
    let policy = &resource.data.dynamic_blocks["access_policy"];
    assert!(policy.properties.contains("object_id"));
    // `for_each` belongs to the generator, not the generated body.
    assert!(!policy.properties.contains("for_each"));
    assert!(resource.data.static_blocks.is_empty());
}

#[test]
fn dynamic_block_without_content_falls_back_to_its_body() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  dynamic "access_policy" {
    for_each  = var.policies
    object_id = "direct"
  }
}
"#,
    );
    let policy = &resource.data.dynamic_blocks["access_policy"];
    assert!(policy.properties.contains("object_id"));
    assert!(policy.properties.contains("for_each"));
}

#[test]
fn repeated_dynamic_labels_merge() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  dynamic "access_policy" {
    for_each = var.a
    content {
      object_id = "x"
      certificate_permissions {
        get = true
      }
    }
  }
  dynamic "access_policy" {
    for_each = var.b
    content {
      tenant_id = "y"
      certificate_permissions {
        list = true
      }
    }
  }
}
"#,
    );
    assert_eq!(resource.data.dynamic_blocks.len(), 1);
    let policy = &resource.data.dynamic_blocks["access_policy"];
    assert!(policy.properties.contains("object_id"));
    assert!(policy.properties.contains("tenant_id"));
    let permissions = &policy.static_blocks["certificate_permissions"];
    assert!(permissions.properties.contains("get"));
    assert!(permissions.properties.contains("list"));
}

#[test]
fn dynamic_block_with_two_labels_is_ignored() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  dynamic "a" "b" {
    content {
      x = 1
    }
  }
}
"#,
    );
    assert!(resource.data.dynamic_blocks.is_empty());
}

#[test]
fn lifecycle_identifiers_reach_ignore_changes() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  lifecycle {
    ignore_changes = [tags, sku_name]
  }
}
"#,
    );
    assert!(resource.data.ignore_changes.iter().any(|n| n == "tags"));
    assert!(resource.data.ignore_changes.iter().any(|n| n == "sku_name"));
    // lifecycle never lands in the structural model
    assert!(resource.data.static_blocks.is_empty());
}

#[test]
fn lifecycle_string_literals_collect_through_both_paths() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  lifecycle {
    ignore_changes = ["tags"]
  }
}
"#,
    );
    let hits =
        resource.data.ignore_changes.iter().filter(|n| n.as_str() == "tags").count();
    assert!(hits >= 2, "both extraction paths should contribute: {:?}", resource.data.ignore_changes);
}

#[test]
fn lifecycle_all_promotes_to_wildcard() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  lifecycle {
    ignore_changes = ["all"]
  }
}
"#,
    );
    assert!(resource.data.ignore_changes.iter().any(|n| n == WILDCARD));
}

#[test]
fn nested_lifecycle_scopes_stay_local() {
    let resource = parse_single_resource(
        r#"
resource "azurerm_key_vault" "vault" {
  network_acls {
    lifecycle {
      ignore_changes = [bypass]
    }
  }
}
"#,
    );
    assert!(resource.data.ignore_changes.is_empty());
    let acls = &resource.data.static_blocks["network_acls"];
    assert!(acls.ignore_changes.iter().any(|n| n == "bypass"));
}

#[test]
fn provider_requirements_are_extracted_and_normalized() {
    let content = r#"
terraform {
  required_version = ">= 1.0"

  required_providers {
    azurerm = {
      source  = "hashicorp/azurerm"
      version = "~> 3.0"
    }
    random = {
      source = "registry.terraform.io/hashicorp/random"
    }
  }
}
"#;
    let providers = parse_provider_requirements_source(content, "terraform.tf").unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers["azurerm"].source, "registry.terraform.io/hashicorp/azurerm");
    assert_eq!(providers["azurerm"].version, "~> 3.0");
    assert_eq!(providers["random"].source, "registry.terraform.io/hashicorp/random");
    assert_eq!(providers["random"].version, "");
}

#[test]
fn non_object_provider_entries_are_skipped() {
    let content = r#"
terraform {
  required_providers {
    azurerm = "hashicorp/azurerm"
  }
}
"#;
    let providers = parse_provider_requirements_source(content, "terraform.tf").unwrap();
    assert!(providers.is_empty());
}

#[test]
fn missing_requirements_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let providers = parse_provider_requirements(&dir.path().join("terraform.tf")).unwrap();
    assert!(providers.is_empty());
}

#[test]
fn normalize_source_is_idempotent() {
    let once = normalize_source("hashicorp/azurerm");
    assert_eq!(once, "registry.terraform.io/hashicorp/azurerm");
    assert_eq!(normalize_source(&once), once);
    assert_eq!(normalize_source("builtin"), "builtin");
    assert_eq!(normalize_source(""), "");
}

#[test]
fn merge_moves_vacant_children_and_concatenates_suppressions() {
    let mut dest = BlockData::default();
    dest.properties.insert("a".to_string());
    dest.ignore_changes.push("tags".to_string());

    let mut child = BlockData::default();
    child.properties.insert("x".to_string());
    let mut src = BlockData::default();
    src.properties.insert("b".to_string());
    src.static_blocks.insert("inner".to_string(), child);
    src.ignore_changes.push("sku".to_string());

    dest.merge_from(src);
    assert!(dest.properties.contains("a") && dest.properties.contains("b"));
    assert!(dest.static_blocks["inner"].properties.contains("x"));
    assert_eq!(dest.ignore_changes, vec!["tags".to_string(), "sku".to_string()]);
}
