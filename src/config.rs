use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::VersionScan;
use crate::error::Result;

/// File name looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "changelog-release.toml";

/// File name looked up in the user config directory.
pub const USER_CONFIG_FILE: &str = ".changelog-release.toml";

/// Represents the complete configuration for changelog-release.
///
/// Every section is optional; a missing file or section falls back to defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub ci: CiConfig,

    #[serde(default)]
    pub git: GitConfig,
}

fn default_changelog_path() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Where the changelog lives and how it is rendered.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    /// Changelog path, relative to the project root
    #[serde(default = "default_changelog_path")]
    pub path: PathBuf,

    /// Override for the new-project template
    #[serde(default)]
    pub new_template: Option<PathBuf>,

    /// Override for the pending-release template
    #[serde(default)]
    pub next_template: Option<PathBuf>,

    /// chrono format string for the release date
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub version_scan: VersionScan,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            path: default_changelog_path(),
            new_template: None,
            next_template: None,
            date_format: default_date_format(),
            version_scan: VersionScan::default(),
        }
    }
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("package.json")
}

/// Package manifest whose version field is kept in sync.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ManifestConfig {
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        ManifestConfig {
            path: default_manifest_path(),
        }
    }
}

fn default_ci_path() -> PathBuf {
    PathBuf::from(".gitlab-ci.yml")
}

fn default_major_key() -> String {
    "MAJOR".to_string()
}

fn default_minor_key() -> String {
    "MINOR".to_string()
}

fn default_patch_key() -> String {
    "PATCH".to_string()
}

/// CI configuration file carrying the version as three integer fields.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CiConfig {
    #[serde(default = "default_ci_path")]
    pub path: PathBuf,

    #[serde(default = "default_major_key")]
    pub major_key: String,

    #[serde(default = "default_minor_key")]
    pub minor_key: String,

    #[serde(default = "default_patch_key")]
    pub patch_key: String,
}

impl Default for CiConfig {
    fn default() -> Self {
        CiConfig {
            path: default_ci_path(),
            major_key: default_major_key(),
            minor_key: default_minor_key(),
            patch_key: default_patch_key(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_pattern() -> String {
    "v{version}".to_string()
}

fn default_commit_message() -> String {
    "Release v{version}".to_string()
}

/// Commit, tag and push settings.
///
/// `tag_pattern` and `commit_message` substitute `{version}`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub push: bool,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            enabled: true,
            push: true,
            remote: default_remote(),
            tag_pattern: default_tag_pattern(),
            commit_message: default_commit_message(),
        }
    }
}

impl GitConfig {
    /// Tag name for a version, e.g. "v{version}" -> "v1.2.3"
    pub fn tag_name(&self, version: &str) -> String {
        self.tag_pattern.replace("{version}", version)
    }

    /// Commit message for a version
    pub fn commit_message_for(&self, version: &str) -> String {
        self.commit_message.replace("{version}", version)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `changelog-release.toml` in the project root
/// 3. `.changelog-release.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, project_root: &Path) -> Result<Config> {
    let project_config = project_root.join(PROJECT_CONFIG_FILE);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if project_config.exists() {
        fs::read_to_string(&project_config)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(USER_CONFIG_FILE);
        if user_config.exists() {
            fs::read_to_string(user_config)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.changelog.path, PathBuf::from("CHANGELOG.md"));
        assert_eq!(config.manifest.path, PathBuf::from("package.json"));
        assert_eq!(config.ci.path, PathBuf::from(".gitlab-ci.yml"));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: Config = toml::from_str("[git]\npush = false\n").unwrap();
        assert!(!config.git.push);
        assert!(config.git.enabled);
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.tag_pattern, "v{version}");
    }

    #[test]
    fn test_version_scan_from_toml() {
        let config: Config = toml::from_str("[changelog]\nversion_scan = \"headings\"\n").unwrap();
        assert_eq!(config.changelog.version_scan, VersionScan::Headings);
    }

    #[test]
    fn test_tag_and_commit_substitution() {
        let git = GitConfig {
            tag_pattern: "release-{version}".to_string(),
            commit_message: "chore(release): {version}".to_string(),
            ..GitConfig::default()
        };
        assert_eq!(git.tag_name("1.2.3"), "release-1.2.3");
        assert_eq!(git.commit_message_for("1.2.3"), "chore(release): 1.2.3");
    }
}
