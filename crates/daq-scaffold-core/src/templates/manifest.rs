//! Template set manifest types and parsing

use serde::{Deserialize, Serialize};

/// Template set manifest (`template.yaml` at the root of a template directory)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSetManifest {
    /// Display name of the template set
    pub name: String,

    /// Description of what the template set provides
    pub description: String,

    /// Semver version for CLI compatibility checking
    pub version: String,

    /// Explicit list of template files in the set
    pub files: Vec<String>,
}

impl TemplateSetManifest {
    /// Check if a template file is part of this set
    pub fn lists(&self, file_name: &str) -> bool {
        self.files.iter().any(|f| f == file_name)
    }
}
