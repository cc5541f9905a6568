//! Package descriptor and naming-convention checks
//!
//! A [`PackageDescriptor`] captures everything the user asked for on the command
//! line. [`PackageDescriptor::validate`] must pass before anything touches the
//! destination repository.

use thiserror::Error;

/// Where the DUNE DAQ naming conventions are documented
pub const STYLE_GUIDE_URL: &str =
    "https://dune-daq-sw.readthedocs.io/en/latest/packages/styleguide/";

/// Reasons a package request is rejected before any work is done
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Package name \"{0}\" can't be used as a repository directory name")]
    InvalidPackageName(String),

    #[error(
        "To use the --python-bindings option you also need the --main-library option\n\
         as you'll want python bindings to your package's main library."
    )]
    PythonBindingsWithoutMainLibrary,

    #[error(
        "Requested module name \"{0}\" needs to be in PascalCase.\n\
         Please see {url} for more on naming conventions.",
        url = STYLE_GUIDE_URL
    )]
    InvalidModuleName(String),

    #[error(
        "Requested user application name \"{0}\" needs to be in snake_case.\n\
         Please see {url} for more on naming conventions.",
        url = STYLE_GUIDE_URL
    )]
    InvalidUserAppName(String),

    #[error(
        "Requested test application name \"{0}\" needs to be in snake_case.\n\
         Please see {url} for more on naming conventions.",
        url = STYLE_GUIDE_URL
    )]
    InvalidTestAppName(String),
}

/// What the new package should contain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Package (and repository) name, used as given for directory names
    pub name: String,

    /// The package has a package-wide library other packages can link in
    pub main_library: bool,

    /// Python bindings to the main library
    pub python_bindings: bool,

    /// DAQModule names, PascalCase, in command-line order
    pub daq_modules: Vec<String>,

    /// User application names, snake_case, in command-line order
    pub user_apps: Vec<String>,

    /// Integration test application names, snake_case, in command-line order
    pub test_apps: Vec<String>,
}

impl PackageDescriptor {
    /// Descriptor for a package with no optional capabilities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Package name as used in header guards
    pub fn upper_name(&self) -> String {
        self.name.to_uppercase()
    }

    /// Package name as used in namespaces
    pub fn lower_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Check the flag combination and every requested name.
    ///
    /// The first problem found is returned; checks run in the order the
    /// capabilities are processed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_package_name(&self.name) {
            return Err(ValidationError::InvalidPackageName(self.name.clone()));
        }

        if self.python_bindings && !self.main_library {
            return Err(ValidationError::PythonBindingsWithoutMainLibrary);
        }

        if let Some(module) = self.daq_modules.iter().find(|m| !is_module_name(m)) {
            return Err(ValidationError::InvalidModuleName(module.clone()));
        }

        if let Some(app) = self.user_apps.iter().find(|a| !is_app_name(a)) {
            return Err(ValidationError::InvalidUserAppName(app.clone()));
        }

        if let Some(app) = self.test_apps.iter().find(|a| !is_app_name(a)) {
            return Err(ValidationError::InvalidTestAppName(app.clone()));
        }

        Ok(())
    }
}

/// Module names must match `^[A-Z][^_]+`.
///
/// This is intentionally no stricter than that: `Ab` passes, `A_b` doesn't,
/// and anything after the second character is unchecked.
pub fn is_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) => first.is_ascii_uppercase() && second != '_',
        _ => false,
    }
}

/// Application names must not contain an ASCII uppercase letter. They also
/// become file names, so they must be a single path component.
pub fn is_app_name(name: &str) -> bool {
    is_path_component(name) && !name.chars().any(|c| c.is_ascii_uppercase())
}

/// The package name ends up as a directory under the work area
fn is_package_name(name: &str) -> bool {
    is_path_component(name)
}

fn is_path_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
