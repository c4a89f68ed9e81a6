//! Per-directory audit orchestration.
//!
//! One directory at a time: parse the provider requirements, load the
//! provider schema through the toolchain, parse the main configuration, and
//! diff every resource and data source against its schema. The root module
//! is fatal on error; submodule failures are collected and the run
//! continues.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::warn;

use crate::errors::Error;
use crate::findings::{self, Finding};
use crate::parser::{self, BlockData, ProviderConfig};
use crate::schema::loader;
use crate::schema::SchemaCatalog;
use crate::validation;

/// The directory holding first-level submodules.
pub const MODULES_DIR: &str = "modules";

/// Outcome of a whole-tree audit.
#[derive(Debug, Default)]
pub struct AuditReport {
    /// Deduplicated findings across the root module and all submodules.
    pub findings: Vec<Finding>,
    /// Submodules whose audit failed; the rest of the run continued.
    pub submodule_failures: Vec<SubmoduleFailure>,
}

#[derive(Debug)]
pub struct SubmoduleFailure {
    pub name: String,
    pub error: Error,
}

#[derive(Debug)]
struct Submodule {
    name: String,
    path: PathBuf,
}

/// Removes toolchain artifacts when the directory audit ends, on every exit
/// path including panics.
struct ArtifactCleanup<'a> {
    dir: &'a Path,
}

impl Drop for ArtifactCleanup<'_> {
    fn drop(&mut self) {
        loader::cleanup_artifacts(self.dir);
    }
}

/// Audits the root module and each first-level submodule under `modules/`,
/// returning the deduplicated union of findings.
pub async fn audit_root(root: &Path) -> Result<AuditReport, Error> {
    let mut all = audit_directory(root, "").await?;

    let mut failures = Vec::new();
    for submodule in find_submodules(&root.join(MODULES_DIR))? {
        match audit_directory(&submodule.path, &submodule.name).await {
            Ok(found) => all.extend(found),
            Err(error) => {
                tracing::error!(submodule = %submodule.name, "audit failed: {error}");
                failures.push(SubmoduleFailure { name: submodule.name, error });
            }
        }
    }

    Ok(AuditReport { findings: findings::dedupe(all), submodule_failures: failures })
}

/// Audits one directory. A directory without `main.tf` yields no findings
/// and no error.
pub async fn audit_directory(dir: &Path, submodule_name: &str) -> Result<Vec<Finding>, Error> {
    let main_tf = dir.join("main.tf");
    if !main_tf.exists() {
        return Ok(Vec::new());
    }

    let providers = parser::parse_provider_requirements(&dir.join("terraform.tf"))?;

    let _cleanup = ArtifactCleanup { dir };
    let catalog = loader::load_schema(dir).await?;
    let (resources, data_sources) = parser::parse_main_file(&main_tf)?;

    let mut found = Vec::new();
    for resource in &resources {
        collect_findings(
            &resource.type_name,
            &resource.data,
            false,
            &providers,
            &catalog,
            dir,
            submodule_name,
            &mut found,
        );
    }
    for data_source in &data_sources {
        collect_findings(
            &data_source.type_name,
            &data_source.data,
            true,
            &providers,
            &catalog,
            dir,
            submodule_name,
            &mut found,
        );
    }
    Ok(found)
}

/// Diffs one parsed item against the catalog. Every lookup miss along the
/// way is a logged skip, never an error.
#[allow(clippy::too_many_arguments)]
fn collect_findings(
    type_name: &str,
    data: &BlockData,
    is_data_source: bool,
    providers: &IndexMap<String, ProviderConfig>,
    catalog: &SchemaCatalog,
    dir: &Path,
    submodule_name: &str,
    out: &mut Vec<Finding>,
) {
    let kind = if is_data_source { "data source" } else { "resource" };

    let Some((provider_key, _)) = type_name.split_once('_') else {
        warn!("invalid {kind} type format: {type_name}");
        return;
    };
    let Some(config) = providers.get(provider_key) else {
        warn!("no provider requirement for {kind} type {type_name} in {}", dir.display());
        return;
    };
    let Some(provider_schema) = catalog.provider_schemas.get(&config.source) else {
        warn!("no provider schema for source {} in {}", config.source, dir.display());
        return;
    };
    let per_type = if is_data_source {
        &provider_schema.data_source_schemas
    } else {
        &provider_schema.resource_schemas
    };
    let Some(resource_schema) = per_type.get(type_name) else {
        warn!(
            "no {kind} schema for {type_name} in provider {} (dir={})",
            config.source,
            dir.display()
        );
        return;
    };

    let mut local = Vec::new();
    validation::validate_block(
        data,
        type_name,
        "root",
        &resource_schema.block,
        &data.ignore_changes,
        &mut local,
    );

    for mut finding in local {
        // Outer-level pass over the item's own suppression list; inner-block
        // defaults reseeded by dynamic merges are dropped here.
        let excluded =
            data.ignore_changes.iter().any(|entry| entry.eq_ignore_ascii_case(&finding.name));
        if excluded {
            continue;
        }
        finding.submodule_name = submodule_name.to_string();
        finding.is_data_source = is_data_source;
        out.push(finding);
    }
}

/// First-level subdirectories of `modules_dir` that contain a `main.tf`.
/// A missing modules directory yields no submodules.
fn find_submodules(modules_dir: &Path) -> Result<Vec<Submodule>, Error> {
    let entries = match std::fs::read_dir(modules_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(Error::io(format!("failed to read {}", modules_dir.display()), e));
        }
    };

    let mut submodules = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::io(format!("failed to read {}", modules_dir.display()), e))?;
        let path = entry.path();
        if path.is_dir() && path.join("main.tf").exists() {
            submodules.push(Submodule {
                name: entry.file_name().to_string_lossy().to_string(),
                path,
            });
        }
    }
    submodules.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(submodules)
}
