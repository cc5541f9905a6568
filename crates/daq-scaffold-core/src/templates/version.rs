//! Version comparison for CLI and template set compatibility

use semver::Version;

/// Compare CLI version against template set version
/// Returns a warning message if the CLI is older than the templates expect
pub fn check_compatibility(cli_version: &str, template_version: &str) -> Option<String> {
    let cli_ver = parse_version(cli_version)?;
    let template_ver = parse_version(template_version)?;

    if cli_ver < template_ver {
        Some(format!(
            "These templates were written for create-dunedaq-package {} or newer.\n\
             You are running version {}; the generated boilerplate may not match what the templates expect.",
            template_version, cli_version
        ))
    } else {
        None
    }
}

/// Parse version string, tolerating a leading 'v'
fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_older_than_templates() {
        let warning = check_compatibility("0.1.0", "0.2.0");
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_or_newer() {
        assert!(check_compatibility("0.1.0", "0.1.0").is_none());
        assert!(check_compatibility("0.2.0", "0.1.0").is_none());
    }

    #[test]
    fn test_leading_v_is_accepted() {
        assert!(check_compatibility("v0.1.0", "v0.3.0").is_some());
    }

    #[test]
    fn test_invalid_versions() {
        // Can't compare, no warning
        assert!(check_compatibility("invalid", "0.1.0").is_none());
        assert!(check_compatibility("0.1.0", "dunedaq-v2.6.0").is_none());
    }
}
