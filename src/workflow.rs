//! Release workflow orchestration
//!
//! Branches on whether the changelog exists: absent runs the init flow,
//! present runs the bump flow. All process-wide inputs (project root, date,
//! answers) are passed in so the whole run can be driven from tests.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::{info, info_span};

use crate::changelog::{self, ChangelogFile, TemplateKind};
use crate::config::Config;
use crate::domain::{compute_next_version, extract_latest_version_with, Version};
use crate::error::{ReleaseError, Result};
use crate::git_ops::GitRepo;
use crate::manifest::{self, PatchOutcome};
use crate::ui::{self, Prompter};

/// Fallback project name when the root has no final path component.
const FALLBACK_PROJECT_NAME: &str = "project";

/// Inputs for one run.
///
/// Decoupled from the CLI so the workflow can be called programmatically
/// without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowArgs {
    /// Directory holding the changelog and optional files
    pub project_root: PathBuf,

    /// Already formatted release date
    pub release_date: String,

    /// Skip commit, tag and push regardless of config
    pub no_git: bool,

    /// Skip the push regardless of config
    pub no_push: bool,
}

/// What the git step did
#[derive(Debug, Clone, PartialEq)]
pub struct GitReport {
    /// Short id of the release commit
    pub commit: String,

    /// Annotated tag name
    pub tag: String,

    /// Remote the branch and tag were pushed to, if any
    pub pushed_to: Option<String>,
}

/// Result of the bump flow
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseReport {
    pub version: Version,
    pub changelog: PathBuf,
    pub manifest: PatchOutcome,
    pub ci: PatchOutcome,
    pub git: Option<GitReport>,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    Initialized {
        changelog: PathBuf,
        project_name: String,
    },
    Released(ReleaseReport),
}

/// Formats `date` with a chrono format string.
///
/// Unlike `DateTime::format(..).to_string()`, an invalid format is an error
/// instead of a panic.
pub fn format_release_date<Tz>(date: &DateTime<Tz>, format: &str) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", date.format(format))
        .map_err(|_| ReleaseError::config(format!("Invalid date format '{}'", format)))?;
    Ok(out)
}

/// Directory name of the project root, used as the default project name.
pub fn default_project_name(project_root: &Path) -> String {
    let resolved = project_root
        .canonicalize()
        .unwrap_or_else(|_| project_root.to_path_buf());
    resolved
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string())
}

/// Runs the init or bump flow for the project at `args.project_root`.
///
/// # Returns
/// * `Ok(WorkflowOutcome)` - What was created or released
/// * `Err` - On any I/O, template, config or git failure. Files already
///   rewritten before a failing step are not restored.
pub fn run(
    args: &WorkflowArgs,
    config: &Config,
    prompter: &mut dyn Prompter,
) -> Result<WorkflowOutcome> {
    let changelog = ChangelogFile::new(&args.project_root, &config.changelog);

    if changelog.exists() {
        release(args, config, prompter, &changelog).map(WorkflowOutcome::Released)
    } else {
        init(args, config, prompter, &changelog)
    }
}

fn init(
    args: &WorkflowArgs,
    config: &Config,
    prompter: &mut dyn Prompter,
    changelog: &ChangelogFile,
) -> Result<WorkflowOutcome> {
    let _span = info_span!("init", path = %changelog.path().display()).entered();
    let template = TemplateKind::New.load(&config.changelog, &args.project_root)?;

    let default_name = default_project_name(&args.project_root);
    let project_name = ui::prompt_project_name(prompter, &default_name)?;

    changelog.write(&changelog::render_new(&template, &project_name))?;
    info!(project = %project_name, "Created changelog");

    Ok(WorkflowOutcome::Initialized {
        changelog: changelog.path().to_path_buf(),
        project_name,
    })
}

fn release(
    args: &WorkflowArgs,
    config: &Config,
    prompter: &mut dyn Prompter,
    changelog: &ChangelogFile,
) -> Result<ReleaseReport> {
    let _span = info_span!("release", path = %changelog.path().display()).entered();

    // Opened up front so a missing repository fails before any file is rewritten.
    let git_repo = if config.git.enabled && !args.no_git {
        Some(GitRepo::discover(&args.project_root)?)
    } else {
        None
    };
    let next_template = TemplateKind::Next.load(&config.changelog, &args.project_root)?;

    let content = changelog.read()?;
    let latest = extract_latest_version_with(&content, config.changelog.version_scan)?;
    let suggested = compute_next_version(latest)?;
    info!(latest = ?latest.map(|v| v.to_string()), %suggested, "Computed next version");

    ui::display_suggested_version(latest, suggested);
    let version = ui::prompt_for_version(prompter, suggested, suggested)?;
    info!(%version, "Version accepted");

    let updated = changelog::add_release(&content, &next_template, version, &args.release_date);
    changelog.write(&updated)?;
    info!("Changelog updated");
    ui::display_success(&format!("Added v{} to {}", version, changelog.path().display()));

    let manifest_outcome =
        manifest::patch_package_manifest(&args.project_root.join(&config.manifest.path), version)?;
    let ci_outcome = manifest::patch_ci_config(
        &args.project_root.join(&config.ci.path),
        &config.ci,
        version,
    )?;

    let git = match git_repo {
        Some(repo) => Some(commit_and_tag(&repo, args, config, version)?),
        None => {
            info!("Git step disabled");
            None
        }
    };

    Ok(ReleaseReport {
        version,
        changelog: changelog.path().to_path_buf(),
        manifest: manifest_outcome,
        ci: ci_outcome,
        git,
    })
}

fn commit_and_tag(
    repo: &GitRepo,
    args: &WorkflowArgs,
    config: &Config,
    version: Version,
) -> Result<GitReport> {
    let version_str = version.to_string();
    let message = config.git.commit_message_for(&version_str);
    let tag = config.git.tag_name(&version_str);

    ui::display_status(&format!("Committing and tagging {}", tag));
    repo.stage_all()?;
    let commit = repo.commit(&message)?;
    repo.create_annotated_tag(&tag, &message)?;

    let pushed_to = if config.git.push && !args.no_push {
        ui::display_status(&format!("Pushing {} to {}", tag, config.git.remote));
        repo.push_release(&config.git.remote, &tag)?;
        Some(config.git.remote.clone())
    } else {
        info!(tag = %tag, "Push disabled, release stays local");
        None
    };

    let mut short = commit.to_string();
    short.truncate(7);

    Ok(GitReport {
        commit: short,
        tag,
        pushed_to,
    })
}
