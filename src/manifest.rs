//! Version patching for the optional package manifest and CI configuration.
//!
//! Both files are edited by targeted text substitution so formatting,
//! comments and key order survive untouched.

use std::fs;
use std::path::Path;

use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::config::CiConfig;
use crate::domain::Version;
use crate::error::{ReleaseError, Result};

/// What happened to an optional file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// File rewritten with the new version
    Updated,
    /// File does not exist
    Missing,
    /// File exists but lacks the expected version field(s); left untouched
    NoVersionField,
}

impl PatchOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, PatchOutcome::Updated)
    }
}

/// Result of rewriting the CI version fields in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CiPatch {
    /// All three keys found; the rewritten content
    Patched(String),
    /// Names of the keys that were not found
    MissingKeys(Vec<String>),
}

/// Manifest syntax, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// `"version": "1.2.3"` (package.json and friends)
    Json,
    /// `version = "1.2.3"` (Cargo.toml, pyproject.toml)
    Toml,
}

impl ManifestKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => ManifestKind::Toml,
            _ => ManifestKind::Json,
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            ManifestKind::Json => r#"("version"\s*:\s*")[^"]*(")"#,
            ManifestKind::Toml => r#"(?m)^(\s*version\s*=\s*")[^"]*(")"#,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| ReleaseError::manifest(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// Replaces the first version field of a manifest.
///
/// # Returns
/// * `Ok(Some(content))` - Rewritten manifest
/// * `Ok(None)` - No version field found
pub fn set_manifest_version(
    content: &str,
    kind: ManifestKind,
    version: Version,
) -> Result<Option<String>> {
    let re = compile(kind.pattern())?;
    if !re.is_match(content) {
        return Ok(None);
    }

    let replaced = re.replacen(content, 1, |caps: &Captures| {
        format!("{}{}{}", &caps[1], version, &caps[2])
    });
    Ok(Some(replaced.into_owned()))
}

/// Sets the major/minor/patch integer fields of a CI configuration.
///
/// Fields look like `MAJOR: 1` or `MAJOR: "1"`; indentation and quoting are
/// kept. Every occurrence of a key is updated.
///
/// Nothing is rewritten unless all three keys are present.
pub fn set_ci_version(content: &str, keys: &CiConfig, version: Version) -> Result<CiPatch> {
    let fields = [
        (&keys.major_key, version.major),
        (&keys.minor_key, version.minor),
        (&keys.patch_key, version.patch),
    ];

    let mut patched = content.to_string();
    let mut missing = Vec::new();

    for (key, value) in fields {
        let re = compile(&format!(
            r#"(?m)^(\s*{}\s*:\s*)(["']?)\d+(["']?)"#,
            regex::escape(key)
        ))?;
        if !re.is_match(&patched) {
            missing.push(key.clone());
            continue;
        }
        patched = re
            .replace_all(&patched, |caps: &Captures| {
                format!("{}{}{}{}", &caps[1], &caps[2], value, &caps[3])
            })
            .into_owned();
    }

    if missing.is_empty() {
        Ok(CiPatch::Patched(patched))
    } else {
        Ok(CiPatch::MissingKeys(missing))
    }
}

/// Writes `version` into the package manifest at `path`, if it exists.
pub fn patch_package_manifest(path: &Path, version: Version) -> Result<PatchOutcome> {
    if !path.is_file() {
        debug!(path = %path.display(), "No package manifest, skipping");
        return Ok(PatchOutcome::Missing);
    }

    let content = fs::read_to_string(path)?;
    match set_manifest_version(&content, ManifestKind::from_path(path), version)? {
        Some(updated) => {
            fs::write(path, updated)?;
            info!(path = %path.display(), %version, "Updated package manifest");
            Ok(PatchOutcome::Updated)
        }
        None => {
            warn!(path = %path.display(), "Package manifest has no version field");
            Ok(PatchOutcome::NoVersionField)
        }
    }
}

/// Writes the version components into the CI configuration, if it exists.
///
/// The file is only rewritten when all three keys are present.
pub fn patch_ci_config(path: &Path, keys: &CiConfig, version: Version) -> Result<PatchOutcome> {
    if !path.is_file() {
        debug!(path = %path.display(), "No CI configuration, skipping");
        return Ok(PatchOutcome::Missing);
    }

    let content = fs::read_to_string(path)?;
    match set_ci_version(&content, keys, version)? {
        CiPatch::Patched(updated) => {
            fs::write(path, updated)?;
            info!(path = %path.display(), %version, "Updated CI configuration");
            Ok(PatchOutcome::Updated)
        }
        CiPatch::MissingKeys(missing) => {
            warn!(
                path = %path.display(),
                missing = ?missing,
                "CI configuration lacks version fields, leaving it untouched"
            );
            Ok(PatchOutcome::NoVersionField)
        }
    }
}
