//! Environment and configuration
//!
//! The work area and build tools are located through the variables daq-buildtools
//! sets up. Remote locations have defaults that can be overridden from the
//! environment, mostly for testing against forks.

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Set by daq-buildtools; where the build tools live
pub const TOOLS_ROOT_ENV: &str = "DBT_ROOT";

/// Set by daq-buildtools; root of the current work area
pub const AREA_ROOT_ENV: &str = "DBT_AREA_ROOT";

/// Override for the organisation new package repositories are cloned from
pub const REPO_BASE_ENV: &str = "DUNEDAQ_PACKAGE_REPO_BASE";

/// Override for the CMake package config template location
pub const CMAKE_CONFIG_URL_ENV: &str = "DUNEDAQ_CMAKE_CONFIG_URL";

pub const DEFAULT_REPO_BASE: &str = "https://github.com/DUNE-DAQ";

pub const DEFAULT_CMAKE_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/DUNE-DAQ/daq-cmake/dunedaq-v2.6.0/configs/Config.cmake.in";

/// Subdirectory of the work area holding package repositories
pub const SOURCE_SUBDIR: &str = "sourcecode";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The environment variable {name} doesn't appear to be defined.\n{hint}")]
    MissingVariable { name: &'static str, hint: &'static str },

    #[error("Invalid URL in {name}: {value}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Where things are read from and written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// daq-buildtools installation
    pub tools_root: PathBuf,
    /// Work area root; packages are cloned under `<area_root>/sourcecode`
    pub area_root: PathBuf,
    /// Organisation URL new package repositories live under
    pub repo_base: Url,
    /// Template of `cmake/<Package>Config.cmake.in`
    pub cmake_config_url: Url,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let tools_root = get(TOOLS_ROOT_ENV).ok_or(ConfigError::MissingVariable {
            name: TOOLS_ROOT_ENV,
            hint: "The daq-buildtools environment needs to be set up for this tool to work.",
        })?;
        let area_root = get(AREA_ROOT_ENV).ok_or(ConfigError::MissingVariable {
            name: AREA_ROOT_ENV,
            hint: "You need to have a work area environment set up for this tool to work.",
        })?;

        let repo_base = parse_url(
            REPO_BASE_ENV,
            get(REPO_BASE_ENV).unwrap_or_else(|| DEFAULT_REPO_BASE.to_string()),
        )?;
        let cmake_config_url = parse_url(
            CMAKE_CONFIG_URL_ENV,
            get(CMAKE_CONFIG_URL_ENV).unwrap_or_else(|| DEFAULT_CMAKE_CONFIG_URL.to_string()),
        )?;

        Ok(Self {
            tools_root: PathBuf::from(tools_root),
            area_root: PathBuf::from(area_root),
            repo_base,
            cmake_config_url,
        })
    }

    /// Directory package repositories are cloned into
    pub fn source_dir(&self) -> PathBuf {
        self.area_root.join(SOURCE_SUBDIR)
    }

    /// Local repository directory of a package
    pub fn repo_dir(&self, package: &str) -> PathBuf {
        self.source_dir().join(package)
    }

    /// Remote repository URL of a package
    pub fn repo_url(&self, package: &str) -> Result<Url, ConfigError> {
        let base = self.repo_base.as_str().trim_end_matches('/');
        parse_url(REPO_BASE_ENV, format!("{}/{}/", base, package))
    }
}

fn parse_url(name: &'static str, value: String) -> Result<Url, ConfigError> {
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            (TOOLS_ROOT_ENV, "/opt/dbt"),
            (AREA_ROOT_ENV, "/work/area"),
        ]))
        .unwrap();

        assert_eq!(settings.tools_root, PathBuf::from("/opt/dbt"));
        assert_eq!(settings.repo_base.as_str(), "https://github.com/DUNE-DAQ");
        assert_eq!(settings.cmake_config_url.as_str(), DEFAULT_CMAKE_CONFIG_URL);
        assert_eq!(
            settings.repo_dir("listrev"),
            PathBuf::from("/work/area/sourcecode/listrev")
        );
        assert_eq!(
            settings.repo_url("listrev").unwrap().as_str(),
            "https://github.com/DUNE-DAQ/listrev/"
        );
    }

    #[test]
    fn test_missing_tools_root() {
        let err = Settings::from_lookup(lookup(&[(AREA_ROOT_ENV, "/work/area")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable { name: TOOLS_ROOT_ENV, .. }
        ));
    }

    #[test]
    fn test_empty_area_root_counts_as_missing() {
        let err = Settings::from_lookup(lookup(&[
            (TOOLS_ROOT_ENV, "/opt/dbt"),
            (AREA_ROOT_ENV, ""),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(AREA_ROOT_ENV));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (TOOLS_ROOT_ENV, "/opt/dbt"),
            (AREA_ROOT_ENV, "/work/area"),
            (REPO_BASE_ENV, "https://github.com/someone/"),
            (CMAKE_CONFIG_URL_ENV, "file:///tmp/Config.cmake.in"),
        ]))
        .unwrap();

        assert_eq!(
            settings.repo_url("listrev").unwrap().as_str(),
            "https://github.com/someone/listrev/"
        );
        assert_eq!(settings.cmake_config_url.scheme(), "file");
    }

    #[test]
    fn test_invalid_override() {
        let err = Settings::from_lookup(lookup(&[
            (TOOLS_ROOT_ENV, "/opt/dbt"),
            (AREA_ROOT_ENV, "/work/area"),
            (REPO_BASE_ENV, "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: REPO_BASE_ENV, .. }));
    }
}
