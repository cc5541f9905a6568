//! Template sets from the built-in assets or a local directory
//!
//! Both sources are described by a `template.yaml` listing every file in the
//! set. Local sets are read eagerly so a missing file is reported before the
//! destination repository is touched.

use super::manifest::TemplateSetManifest;
use super::TemplateError;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

const MANIFEST_FILE: &str = "template.yaml";

/// Templates compiled into the binary
const BUILTIN: &[(&str, &str)] = &[
    (MANIFEST_FILE, include_str!("../../templates/template.yaml")),
    ("RenameMe.hpp", include_str!("../../templates/RenameMe.hpp")),
    ("RenameMe.cpp", include_str!("../../templates/RenameMe.cpp")),
    ("renameme.jsonnet", include_str!("../../templates/renameme.jsonnet")),
    ("renamemeinfo.jsonnet", include_str!("../../templates/renamemeinfo.jsonnet")),
    ("renameme.cxx", include_str!("../../templates/renameme.cxx")),
    ("module.cpp", include_str!("../../templates/module.cpp")),
    ("renameme.cpp", include_str!("../../templates/renameme.cpp")),
    ("Placeholder_test.cxx", include_str!("../../templates/Placeholder_test.cxx")),
];

/// Template source - either the built-in set or a local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin,
    Local(PathBuf),
}

impl TemplateSource {
    /// Local directory if one was given, built-in set otherwise
    pub fn from_option(template_dir: Option<PathBuf>) -> Self {
        match template_dir {
            Some(path) => Self::Local(path),
            None => Self::Builtin,
        }
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Builtin => write!(f, "built-in templates"),
            TemplateSource::Local(path) => write!(f, "local templates from {}", path.display()),
        }
    }
}

/// A loaded set of templates
#[derive(Debug, Clone)]
pub struct TemplateSet {
    source: TemplateSource,
    manifest: TemplateSetManifest,
    files: HashMap<String, String>,
}

impl TemplateSet {
    /// Load a template set from its source
    pub fn load(source: TemplateSource) -> Result<Self, TemplateError> {
        match source {
            TemplateSource::Builtin => Self::builtin(),
            TemplateSource::Local(path) => Self::from_local(path),
        }
    }

    /// The templates compiled into the binary
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut files: HashMap<String, String> = BUILTIN
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();

        let manifest_content = files.remove(MANIFEST_FILE).unwrap_or_default();
        let manifest = serde_yaml::from_str(&manifest_content).map_err(|source| {
            TemplateError::Manifest {
                path: PathBuf::from(MANIFEST_FILE),
                source,
            }
        })?;

        Ok(Self {
            source: TemplateSource::Builtin,
            manifest,
            files,
        })
    }

    /// Read `template.yaml` and every file it lists from a local directory
    pub fn from_local(path: PathBuf) -> Result<Self, TemplateError> {
        let manifest_path = path.join(MANIFEST_FILE);
        let manifest_content =
            std::fs::read_to_string(&manifest_path).map_err(|source| TemplateError::Read {
                path: manifest_path.clone(),
                source,
            })?;
        let manifest: TemplateSetManifest = serde_yaml::from_str(&manifest_content)
            .map_err(|source| TemplateError::Manifest {
                path: manifest_path,
                source,
            })?;

        let mut files = HashMap::new();
        for name in &manifest.files {
            let file_path = path.join(name);
            let content =
                std::fs::read_to_string(&file_path).map_err(|source| TemplateError::Read {
                    path: file_path,
                    source,
                })?;
            files.insert(name.clone(), content);
        }

        Ok(Self {
            source: TemplateSource::Local(path),
            manifest,
            files,
        })
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    pub fn manifest(&self) -> &TemplateSetManifest {
        &self.manifest
    }

    /// Text of one template
    pub fn get(&self, name: &str) -> Result<&str, TemplateError> {
        self.files
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::Missing {
                name: name.to_string(),
                source_desc: self.source.to_string(),
            })
    }

    /// Fail on the first of `names` the set doesn't have
    pub fn require<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<(), TemplateError> {
        for name in names {
            self.get(name)?;
        }
        Ok(())
    }
}
