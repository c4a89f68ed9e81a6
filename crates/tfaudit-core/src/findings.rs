//! Finding records, deduplication, and rendering.

use std::collections::HashSet;
use std::fmt;

/// One schema-declared attribute or nested block the configuration does not
/// set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub resource_type: String,
    /// Dotted trail starting at the literal sentinel `root`.
    pub path: String,
    pub name: String,
    pub required: bool,
    pub is_block: bool,
    pub is_data_source: bool,
    /// Empty for the root module, otherwise the submodule directory name.
    pub submodule_name: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.required { "required" } else { "optional" };
        let item = if self.is_block { "block" } else { "property" };
        let entity = if self.is_data_source { "data source" } else { "resource" };
        write!(
            f,
            "`{}`: missing {status} {item} `{}` in `{}`",
            self.resource_type,
            self.name,
            clean_path(&self.path),
        )?;
        if !self.submodule_name.is_empty() {
            write!(f, " in submodule `{}`", self.submodule_name)?;
        }
        write!(f, " ({entity})")
    }
}

/// Strips the `root` sentinel for display: every `root.` segment is removed
/// and a bare `root` becomes the empty string.
pub fn clean_path(path: &str) -> String {
    if path == "root" {
        return String::new();
    }
    path.replace("root.", "")
}

/// Collapses findings that agree on everything but `required`; the survivor
/// keeps its first-seen position.
pub fn dedupe(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(findings.len());
    for finding in findings {
        let key = (
            finding.resource_type.clone(),
            finding.path.clone(),
            finding.name.clone(),
            finding.is_block,
            finding.is_data_source,
            finding.submodule_name.clone(),
        );
        if seen.insert(key) {
            result.push(finding);
        }
    }
    result
}
