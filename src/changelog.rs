//! Changelog rendering and release-section insertion.
//!
//! A changelog always carries one pending section headed `vNEXT` with a
//! `Date: TBD` line. Releasing stamps that section with the accepted version
//! and date, then inserts a fresh pending section above it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ChangelogConfig;
use crate::domain::Version;
use crate::error::{ReleaseError, Result};

/// Placeholder replaced with the project name in the new-project template.
pub const PROJECT_NAME_PLACEHOLDER: &str = "PROJECT_NAME";

/// Heading marker of the pending section.
pub const NEXT_MARKER: &str = "vNEXT";

/// Date line of the pending section.
pub const DATE_PLACEHOLDER: &str = "Date: TBD";

const BUILTIN_NEW_TEMPLATE: &str = include_str!("../templates/NEW_TEMPLATE.md");
const BUILTIN_NEXT_TEMPLATE: &str = include_str!("../templates/NEXT_TEMPLATE.md");

/// The two templates a changelog is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Whole-file template for a new project
    New,
    /// Pending section inserted on every release
    Next,
}

impl TemplateKind {
    /// Template compiled into the binary
    pub fn builtin(self) -> &'static str {
        match self {
            TemplateKind::New => BUILTIN_NEW_TEMPLATE,
            TemplateKind::Next => BUILTIN_NEXT_TEMPLATE,
        }
    }

    fn override_path(self, config: &ChangelogConfig) -> Option<&PathBuf> {
        match self {
            TemplateKind::New => config.new_template.as_ref(),
            TemplateKind::Next => config.next_template.as_ref(),
        }
    }

    /// Loads this template, preferring the override file named in config.
    ///
    /// The override path is resolved against `project_root`. A configured
    /// override that cannot be read is an error. Only the template asked
    /// for is read, so a stale override for the other flow never matters.
    pub fn load(self, config: &ChangelogConfig, project_root: &Path) -> Result<String> {
        let template = match self.override_path(config) {
            Some(path) => read_template(&project_root.join(path))?,
            None => self.builtin().to_string(),
        };

        if self == TemplateKind::Next && !template.contains(NEXT_MARKER) {
            warn!(
                marker = NEXT_MARKER,
                "next-release template has no pending marker; later releases will not be stamped"
            );
        }

        Ok(template)
    }
}

fn read_template(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Loading template override");
    fs::read_to_string(path).map_err(|e| {
        ReleaseError::template(format!("Cannot read template {}: {}", path.display(), e))
    })
}

/// The changelog file of a project.
#[derive(Debug, Clone)]
pub struct ChangelogFile {
    path: PathBuf,
}

impl ChangelogFile {
    pub fn new(project_root: &Path, config: &ChangelogConfig) -> Self {
        ChangelogFile {
            path: project_root.join(&config.path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn read(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    pub fn write(&self, content: &str) -> Result<()> {
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Renders the new-project template for `project_name`.
pub fn render_new(template: &str, project_name: &str) -> String {
    template.replace(PROJECT_NAME_PLACEHOLDER, project_name)
}

/// Stamps the pending section with `version` and `date`, then inserts a new
/// pending section before the first `##` heading.
///
/// Without any `##` the new section is appended at the end. The line ending
/// of the inserted block follows the existing content (`\r\n` if it has any).
///
/// # Example
/// ```ignore
/// let out = add_release("# App\n\n## vNEXT\n\nDate: TBD\n", "## vNEXT", Version::new(1, 0, 0), "2024-01-01");
/// assert_eq!(out, "# App\n\n## vNEXT\n\n## v1.0.0\n\nDate: 2024-01-01\n");
/// ```
pub fn add_release(content: &str, next_template: &str, version: Version, date: &str) -> String {
    let eol = detect_line_ending(content);

    let stamped = content
        .replace(NEXT_MARKER, &format!("v{}", version))
        .replacen(DATE_PLACEHOLDER, &format!("Date: {}", date), 1);

    let template = next_template.trim_end_matches(&['\r', '\n'][..]);
    let mut block = normalize_line_endings(template, eol);
    block.push_str(eol);
    block.push_str(eol);

    match stamped.find("##") {
        Some(index) => {
            let mut out = String::with_capacity(stamped.len() + block.len());
            out.push_str(&stamped[..index]);
            out.push_str(&block);
            out.push_str(&stamped[index..]);
            out
        }
        None => {
            let mut out = stamped;
            if !out.is_empty() {
                if !out.ends_with('\n') {
                    out.push_str(eol);
                }
                out.push_str(eol);
            }
            out.push_str(&block);
            out
        }
    }
}

fn detect_line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn normalize_line_endings(text: &str, eol: &str) -> String {
    text.lines().collect::<Vec<_>>().join(eol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extract_latest_version;

    const NEXT: &str = "## vNEXT\n\nDate: TBD\n";

    #[test]
    fn test_render_new_replaces_every_placeholder() {
        let out = render_new(TemplateKind::New.builtin(), "acme");
        assert!(!out.contains(PROJECT_NAME_PLACEHOLDER));
        assert!(out.starts_with("# acme Changelog"));
        assert_eq!(out.matches("acme").count(), 2);
    }

    #[test]
    fn test_builtin_templates_carry_markers() {
        for kind in [TemplateKind::New, TemplateKind::Next] {
            assert!(kind.builtin().contains(NEXT_MARKER));
            assert!(kind.builtin().contains(DATE_PLACEHOLDER));
        }
    }

    #[test]
    fn test_add_release_stamps_and_inserts() {
        let content = "# App\n\n## vNEXT\n\nDate: TBD\n\n- thing\n";
        let out = add_release(content, NEXT, Version::new(1, 0, 0), "2024-05-01");
        assert_eq!(
            out,
            "# App\n\n## vNEXT\n\nDate: TBD\n\n## v1.0.0\n\nDate: 2024-05-01\n\n- thing\n"
        );
    }

    #[test]
    fn test_add_release_only_stamps_first_date() {
        let content = "## vNEXT\n\nDate: TBD\n\n## v0.1.0\n\nDate: TBD\n";
        let out = add_release(content, NEXT, Version::new(0, 1, 1), "today");
        assert_eq!(out.matches("Date: today").count(), 1);
        assert_eq!(out.matches(DATE_PLACEHOLDER).count(), 2);
    }

    #[test]
    fn test_add_release_result_yields_released_version() {
        let content = "# App\n\n## vNEXT\n\nDate: TBD\n\n## v1.4.2\n";
        let out = add_release(content, NEXT, Version::new(1, 4, 3), "2024-05-01");
        assert_eq!(extract_latest_version(&out).unwrap(), Some(Version::new(1, 4, 3)));
    }

    #[test]
    fn test_add_release_without_heading_appends() {
        let out = add_release("# App", NEXT, Version::new(1, 0, 0), "d");
        assert_eq!(out, "# App\n\n## vNEXT\n\nDate: TBD\n\n");
    }

    #[test]
    fn test_add_release_keeps_crlf() {
        let content = "# App\r\n\r\n## vNEXT\r\n\r\nDate: TBD\r\n";
        let out = add_release(content, NEXT, Version::new(2, 0, 0), "d");
        assert!(out.starts_with("# App\r\n\r\n## vNEXT\r\n\r\nDate: TBD\r\n\r\n## v2.0.0"));
        assert!(!out.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_templates_load_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("next.md"), "## vNEXT\n\nDate: TBD\n\n* notes\n").unwrap();
        let config = ChangelogConfig {
            next_template: Some(PathBuf::from("next.md")),
            ..ChangelogConfig::default()
        };

        let next = TemplateKind::Next.load(&config, dir.path()).unwrap();
        assert!(next.contains("* notes"));
        let new = TemplateKind::New.load(&config, dir.path()).unwrap();
        assert_eq!(new, TemplateKind::New.builtin());
    }

    #[test]
    fn test_templates_load_missing_override_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChangelogConfig {
            new_template: Some(PathBuf::from("missing.md")),
            ..ChangelogConfig::default()
        };

        let err = TemplateKind::New.load(&config, dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("Template error"));
    }

    #[test]
    fn test_missing_override_for_other_template_is_not_read() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChangelogConfig {
            new_template: Some(PathBuf::from("gone.md")),
            ..ChangelogConfig::default()
        };

        let next = TemplateKind::Next.load(&config, dir.path()).unwrap();
        assert_eq!(next, TemplateKind::Next.builtin());
    }
}
