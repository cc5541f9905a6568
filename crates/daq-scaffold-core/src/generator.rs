//! Capability pass: from a package descriptor to the directories, files, and
//! build manifest of the new package
//!
//! [`plan`] is pure; nothing touches the disk until [`Plan::write`].
//! Capabilities are processed in a fixed order (main library, python
//! bindings, DAQModules, user apps, test apps) and the unit test scaffold is
//! added regardless of what was requested.

use crate::cmake::{self, BuildManifest, Section};
use crate::layout;
use crate::package::{PackageDescriptor, ValidationError};
use crate::templates::{self, GeneratedFile, TemplateError, TemplateKind, TemplateSet};
use crate::transaction::Transaction;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Dependencies every DAQModule needs
const MODULE_DEPENDENCIES: &[&str] = &["appfwk", "opmonlib"];

/// Name of the placeholder unit test target
const UNIT_TEST_TARGET: &str = "Placeholder_test";

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Everything a run will write, computed up front
#[derive(Debug, Clone)]
pub struct Plan {
    /// Package directories relative to the repository root, in creation order
    pub directories: Vec<PathBuf>,
    /// Instantiated templates
    pub files: Vec<GeneratedFile>,
    /// CMakeLists.txt directives
    pub manifest: BuildManifest,
}

impl Plan {
    fn new(package: &str) -> Self {
        Self {
            directories: Vec::new(),
            files: Vec::new(),
            manifest: BuildManifest::new(package),
        }
    }

    fn add_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.directories.contains(&dir) {
            self.directories.push(dir);
        }
    }

    /// Generated file at `path`, if the plan has one
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path.as_ref())
    }

    /// Create the directories and write the files under `repo_dir`, recording
    /// every creation in `tx`. Returns the paths written.
    pub fn write(&self, repo_dir: &Path, tx: &mut Transaction) -> Result<Vec<PathBuf>> {
        for dir in &self.directories {
            layout::make_package_dir(repo_dir, dir, tx)?;
        }

        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let target = repo_dir.join(&file.path);
            if let Some(parent) = target.parent() {
                if !parent.is_dir() {
                    anyhow::bail!(
                        "Directory {} for {} was not created",
                        parent.display(),
                        file.path.display()
                    );
                }
            }
            let existed = target.exists();
            std::fs::write(&target, &file.content)
                .with_context(|| format!("Failed to write file: {}", target.display()))?;
            if !existed {
                tx.created_file(&target);
            }
            written.push(target);
        }

        Ok(written)
    }
}

/// Template files a descriptor will need
pub fn required_templates(descriptor: &PackageDescriptor) -> Vec<&'static str> {
    let mut names = Vec::new();
    if descriptor.python_bindings {
        names.extend([templates::PYBIND_MODULE, templates::PYBIND_SOURCE]);
    }
    if !descriptor.daq_modules.is_empty() {
        names.extend([
            templates::PLUGIN_HEADER,
            templates::PLUGIN_SOURCE,
            templates::MODULE_SCHEMA,
            templates::MODULE_INFO_SCHEMA,
        ]);
    }
    if !descriptor.user_apps.is_empty() || !descriptor.test_apps.is_empty() {
        names.push(templates::APPLICATION);
    }
    names.push(templates::UNIT_TEST);
    names
}

/// Validate `descriptor` and compute everything the run will write
pub fn plan(descriptor: &PackageDescriptor, template_set: &TemplateSet) -> Result<Plan, PlanError> {
    descriptor.validate()?;
    template_set.require(required_templates(descriptor))?;

    let package = descriptor.name.as_str();
    let mut plan = Plan::new(package);

    if descriptor.main_library {
        plan.add_dir("src");
        plan.add_dir(Path::new("include").join(package));
        plan.manifest.push(Section::Library, cmake::add_library());
    }

    if descriptor.python_bindings {
        plan.add_dir(TemplateKind::PythonBinding.directory(package));
        plan.manifest
            .push(Section::PythonBindings, cmake::add_python_bindings());
        for name in [templates::PYBIND_MODULE, templates::PYBIND_SOURCE] {
            plan.files.push(templates::instantiate(
                template_set,
                TemplateKind::PythonBinding,
                name,
                package,
                package,
            )?);
        }
    }

    if !descriptor.daq_modules.is_empty() {
        for dependency in MODULE_DEPENDENCIES {
            plan.manifest
                .push(Section::Dependencies, cmake::find_package(dependency));
        }

        plan.add_dir("src");
        plan.add_dir(TemplateKind::Plugin.directory(package));
        plan.add_dir(TemplateKind::Schema.directory(package));

        for module in &descriptor.daq_modules {
            plan.manifest.push(Section::Plugins, cmake::add_plugin(module));
            plan.manifest
                .push(Section::Codegen, cmake::codegen_schema(module));
            plan.manifest
                .push(Section::Codegen, cmake::codegen_info_schema(module));

            for (kind, name) in [
                (TemplateKind::Plugin, templates::PLUGIN_HEADER),
                (TemplateKind::Plugin, templates::PLUGIN_SOURCE),
                (TemplateKind::Schema, templates::MODULE_SCHEMA),
                (TemplateKind::Schema, templates::MODULE_INFO_SCHEMA),
            ] {
                plan.files.push(templates::instantiate(
                    template_set,
                    kind,
                    name,
                    package,
                    module,
                )?);
            }
        }
    }

    if !descriptor.user_apps.is_empty() {
        plan.add_dir(TemplateKind::Application.directory(package));
        for app in &descriptor.user_apps {
            plan.files.push(templates::instantiate(
                template_set,
                TemplateKind::Application,
                templates::APPLICATION,
                package,
                app,
            )?);
            plan.manifest
                .push(Section::Applications, cmake::add_application(app));
        }
    }

    if !descriptor.test_apps.is_empty() {
        plan.add_dir(TemplateKind::TestApplication.directory(package));
        for app in &descriptor.test_apps {
            plan.files.push(templates::instantiate(
                template_set,
                TemplateKind::TestApplication,
                templates::APPLICATION,
                package,
                app,
            )?);
            plan.manifest
                .push(Section::Applications, cmake::add_test_application(app));
        }
    }

    plan.add_dir(TemplateKind::UnitTest.directory(package));
    plan.files.push(templates::instantiate(
        template_set,
        TemplateKind::UnitTest,
        templates::UNIT_TEST,
        package,
        UNIT_TEST_TARGET,
    )?);
    plan.manifest
        .push(Section::UnitTests, cmake::add_unit_test(UNIT_TEST_TARGET));
    plan.manifest
        .push(Section::Dependencies, cmake::find_boost_unit_test());

    plan.add_dir("docs");
    plan.add_dir("cmake");

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::Placeholder;

    fn builtin() -> TemplateSet {
        TemplateSet::builtin().unwrap()
    }

    fn full_descriptor() -> PackageDescriptor {
        PackageDescriptor {
            name: "ListRev".to_string(),
            main_library: true,
            python_bindings: true,
            daq_modules: vec!["ReverseList".to_string(), "RandomDataListGenerator".to_string()],
            user_apps: vec!["list_app".to_string()],
            test_apps: vec!["list_test".to_string()],
        }
    }

    #[test]
    fn test_minimal_package() {
        let plan = plan(&PackageDescriptor::new("listrev"), &builtin()).unwrap();

        assert_eq!(
            plan.directories,
            vec![
                PathBuf::from("unittest"),
                PathBuf::from("docs"),
                PathBuf::from("cmake")
            ]
        );
        assert_eq!(plan.files.len(), 1);
        assert!(plan.file("unittest/Placeholder_test.cxx").is_some());
        assert_eq!(
            plan.manifest.present_sections(),
            vec![Section::Dependencies, Section::UnitTests]
        );
        assert_eq!(
            plan.manifest.entries(Section::Dependencies),
            &[cmake::find_boost_unit_test()]
        );
    }

    #[test]
    fn test_python_bindings_without_library_plans_nothing() {
        let mut descriptor = PackageDescriptor::new("listrev");
        descriptor.python_bindings = true;
        let err = plan(&descriptor, &builtin()).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Validation(ValidationError::PythonBindingsWithoutMainLibrary)
        ));
    }

    #[test]
    fn test_full_package_layout() {
        let plan = plan(&full_descriptor(), &builtin()).unwrap();

        let dirs: Vec<&str> = plan
            .directories
            .iter()
            .map(|d| d.to_str().unwrap())
            .collect();
        assert_eq!(
            dirs,
            vec![
                "src",
                "include/ListRev",
                "pybindsrc",
                "plugins",
                "schema/ListRev",
                "apps",
                "test/apps",
                "unittest",
                "docs",
                "cmake"
            ]
        );

        for path in [
            "pybindsrc/module.cpp",
            "pybindsrc/renameme.cpp",
            "plugins/ReverseList.hpp",
            "plugins/ReverseList.cpp",
            "schema/ListRev/reverselist.jsonnet",
            "schema/ListRev/reverselistinfo.jsonnet",
            "plugins/RandomDataListGenerator.hpp",
            "schema/ListRev/randomdatalistgeneratorinfo.jsonnet",
            "apps/list_app.cxx",
            "test/apps/list_test.cxx",
            "unittest/Placeholder_test.cxx",
        ] {
            assert!(plan.file(path).is_some(), "missing {}", path);
        }
        assert_eq!(plan.files.len(), 13);
    }

    #[test]
    fn test_module_directives() {
        let plan = plan(&full_descriptor(), &builtin()).unwrap();
        let m = &plan.manifest;

        // Exactly two codegen calls and one plugin per module, in request order
        assert_eq!(m.entries(Section::Codegen).len(), 4);
        assert!(m.entries(Section::Codegen)[0].starts_with("daq_codegen(reverselist.jsonnet"));
        assert!(m.entries(Section::Codegen)[1].starts_with("daq_codegen(reverselistinfo.jsonnet"));
        assert!(m.entries(Section::Codegen)[2]
            .starts_with("daq_codegen(randomdatalistgenerator.jsonnet"));
        assert_eq!(
            m.entries(Section::Plugins),
            &[
                cmake::add_plugin("ReverseList"),
                cmake::add_plugin("RandomDataListGenerator")
            ]
        );
        assert_eq!(
            m.entries(Section::Dependencies),
            &[
                cmake::find_package("appfwk"),
                cmake::find_package("opmonlib"),
                cmake::find_boost_unit_test()
            ]
        );
        assert_eq!(
            m.entries(Section::Applications),
            &[
                cmake::add_application("list_app"),
                cmake::add_test_application("list_test")
            ]
        );
        assert_eq!(m.present_sections(), Section::ALL.to_vec());
    }

    #[test]
    fn test_case_forms_are_consistent() {
        let plan = plan(&full_descriptor(), &builtin()).unwrap();

        let header = &plan.file("plugins/ReverseList.hpp").unwrap().content;
        assert!(header.contains("LISTREV_PLUGINS_REVERSELIST_HPP_"));
        assert!(header.contains("namespace dunedaq::listrev {"));
        assert!(!header.contains("ListRev"));

        for file in &plan.files {
            assert!(
                !file.content.contains(Placeholder::PackageUpper.marker()),
                "{} keeps a package guard placeholder",
                file.path.display()
            );
        }
    }

    #[test]
    fn test_invalid_names_rejected_before_planning() {
        let mut descriptor = PackageDescriptor::new("listrev");
        descriptor.user_apps = vec!["MyApp".to_string()];
        assert!(matches!(
            plan(&descriptor, &builtin()),
            Err(PlanError::Validation(ValidationError::InvalidUserAppName(_)))
        ));
    }

    #[test]
    fn test_app_file_matches_manifest_entry() {
        // Validation only rejects ASCII capitals, so non-ASCII ones get through
        let mut descriptor = PackageDescriptor::new("listrev");
        descriptor.user_apps = vec!["Über_app".to_string()];
        descriptor.test_apps = vec!["Ärger_test".to_string()];
        let plan = plan(&descriptor, &builtin()).unwrap();

        let user = plan.file("apps/Über_app.cxx").unwrap();
        assert!(user.content.contains("Hello world from Über_app"));
        assert!(plan.file("test/apps/Ärger_test.cxx").is_some());
        assert_eq!(
            plan.manifest.entries(Section::Applications),
            &[
                cmake::add_application("Über_app"),
                cmake::add_test_application("Ärger_test")
            ]
        );
        assert!(plan.manifest.entries(Section::Applications)[0]
            .starts_with("daq_add_application(Über_app Über_app.cxx"));
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("template.yaml"),
            "name: t\ndescription: d\nversion: 0.1.0\nfiles:\n  - Placeholder_test.cxx\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("Placeholder_test.cxx"), "// test\n").unwrap();
        let templates = TemplateSet::from_local(dir.path().to_path_buf()).unwrap();

        plan(&PackageDescriptor::new("listrev"), &templates).unwrap();

        let mut descriptor = PackageDescriptor::new("listrev");
        descriptor.user_apps = vec!["my_app".to_string()];
        assert!(matches!(
            plan(&descriptor, &templates),
            Err(PlanError::Template(TemplateError::Missing { .. }))
        ));
    }

    #[test]
    fn test_write_records_everything() {
        let repo = tempfile::tempdir().unwrap();
        let plan = plan(&full_descriptor(), &builtin()).unwrap();
        let mut tx = Transaction::new();

        let written = plan.write(repo.path(), &mut tx).unwrap();

        assert_eq!(written.len(), plan.files.len());
        assert!(repo.path().join("plugins/ReverseList.cpp").is_file());
        assert!(repo.path().join("include/ListRev/.gitkeep").is_file());

        tx.rollback().unwrap();
        assert_eq!(std::fs::read_dir(repo.path()).unwrap().count(), 0);
    }
}
