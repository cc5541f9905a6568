//! Template loading, instantiation, and compatibility checking
//!
//! This module provides:
//! - Template set manifest types (`template.yaml`)
//! - Template sets loaded from the built-in assets or a local directory
//! - Single-pass placeholder substitution
//! - Template kinds, which decide substitutions and destination directories
//! - Version compatibility checking

pub mod manifest;
pub mod source;
pub mod substitute;
pub mod version;

use std::path::PathBuf;
use thiserror::Error;

pub use manifest::TemplateSetManifest;
pub use source::{TemplateSet, TemplateSource};
pub use substitute::{Placeholder, Substitutions};
pub use version::check_compatibility;

/// DAQModule plugin header
pub const PLUGIN_HEADER: &str = "RenameMe.hpp";
/// DAQModule plugin source
pub const PLUGIN_SOURCE: &str = "RenameMe.cpp";
/// DAQModule configuration schema
pub const MODULE_SCHEMA: &str = "renameme.jsonnet";
/// DAQModule monitoring info schema
pub const MODULE_INFO_SCHEMA: &str = "renamemeinfo.jsonnet";
/// Application source, shared by user and test applications
pub const APPLICATION: &str = "renameme.cxx";
/// Python bindings module entry point
pub const PYBIND_MODULE: &str = "module.cpp";
/// Python bindings registration source
pub const PYBIND_SOURCE: &str = "renameme.cpp";
/// Placeholder unit test
pub const UNIT_TEST: &str = "Placeholder_test.cxx";

/// Errors reading templates
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{name}' not found in {source_desc}")]
    Missing { name: String, source_desc: String },

    #[error("Failed to read template file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse template manifest {}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// What a template produces, which decides its substitutions and destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// DAQModule header/source under `plugins/`
    Plugin,
    /// jsonnet schema under `schema/<package>/`
    Schema,
    /// Python bindings under `pybindsrc/`
    PythonBinding,
    /// User application under `apps/`
    Application,
    /// Integration test application under `test/apps/`
    TestApplication,
    /// Unit test under `unittest/`, copied verbatim
    UnitTest,
}

impl TemplateKind {
    /// Placeholders this kind of template gets substituted
    pub fn placeholders(&self) -> &'static [Placeholder] {
        match self {
            TemplateKind::Plugin => &Placeholder::ALL,
            TemplateKind::Schema => &[Placeholder::PackageLower, Placeholder::TargetLower],
            TemplateKind::PythonBinding => &[Placeholder::PackageLower],
            TemplateKind::Application | TemplateKind::TestApplication => {
                &[Placeholder::TargetLower]
            }
            TemplateKind::UnitTest => &[],
        }
    }

    /// Directory, relative to the repository root, the output lands in
    pub fn directory(&self, package: &str) -> PathBuf {
        match self {
            TemplateKind::Plugin => PathBuf::from("plugins"),
            TemplateKind::Schema => PathBuf::from("schema").join(package),
            TemplateKind::PythonBinding => PathBuf::from("pybindsrc"),
            TemplateKind::Application => PathBuf::from("apps"),
            TemplateKind::TestApplication => PathBuf::from("test").join("apps"),
            TemplateKind::UnitTest => PathBuf::from("unittest"),
        }
    }

    /// Substitutions for a package and target name
    pub fn substitutions(&self, package: &str, target: &str) -> Substitutions {
        match self {
            // The build manifest names the app as given, so its file must too
            TemplateKind::Application | TemplateKind::TestApplication => {
                Substitutions::new().with(Placeholder::TargetLower, target)
            }
            _ => Substitutions::for_placeholders(self.placeholders(), package, target),
        }
    }
}

/// A template instantiated for one target, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the repository root
    pub path: PathBuf,
    pub content: String,
}

/// Instantiate `template_name` from `templates` for `target`.
///
/// The file name goes through the same substitutions as the content, so
/// `RenameMe.hpp` becomes `<Module>.hpp` and `renamemeinfo.jsonnet` becomes
/// `<module>info.jsonnet`.
pub fn instantiate(
    templates: &TemplateSet,
    kind: TemplateKind,
    template_name: &str,
    package: &str,
    target: &str,
) -> Result<GeneratedFile, TemplateError> {
    let text = templates.get(template_name)?;
    let subs = kind.substitutions(package, target);

    Ok(GeneratedFile {
        path: kind.directory(package).join(subs.apply(template_name)),
        content: subs.apply(text),
    })
}
