//! Pure formatting functions for UI output.
//!
//! Everything the user is meant to read goes through here; diagnostics go
//! through `tracing` instead.

use std::path::Path;

use console::style;

use crate::domain::Version;
use crate::manifest::PatchOutcome;
use crate::workflow::ReleaseReport;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print why a version answer was refused.
pub fn display_rejection(reason: &str) {
    eprintln!("{} {}", style(">>").red(), style(reason).red());
}

/// Show the latest released version (if any) and the suggested next one.
pub fn display_suggested_version(latest: Option<Version>, suggested: Version) {
    match latest {
        Some(latest) => {
            println!("\n{}", style("Next Release:").bold());
            println!("  Latest:    {}", style(latest).red());
            println!("  Suggested: {}", style(suggested).green());
        }
        None => {
            println!("\n{}", style("Initial Release:").bold());
            println!("  Suggested: {}", style(suggested).green());
        }
    }
}

/// Confirm creation of a new changelog.
pub fn display_initialized(changelog: &Path, project_name: &str) {
    display_success(&format!(
        "Created {} for {}",
        changelog.display(),
        style(project_name).cyan()
    ));
}

fn describe_patch(outcome: PatchOutcome) -> &'static str {
    match outcome {
        PatchOutcome::Updated => "updated",
        PatchOutcome::Missing => "not present",
        PatchOutcome::NoVersionField => "no version field, untouched",
    }
}

/// Summarize everything a release run changed.
pub fn display_release_summary(report: &ReleaseReport) {
    println!(
        "\n{} {}",
        style("Released").green().bold(),
        style(format!("v{}", report.version)).green().bold()
    );
    println!("  Changelog: {}", report.changelog.display());
    println!("  Manifest:  {}", describe_patch(report.manifest));
    println!("  CI config: {}", describe_patch(report.ci));

    match &report.git {
        Some(git) => {
            println!("  Commit:    {}", style(&git.commit).cyan());
            println!("  Tag:       {}", style(&git.tag).cyan());
            match &git.pushed_to {
                Some(remote) => println!("  Pushed to: {}", remote),
                None => println!(
                    "\n{} To push this release later, run:\n  {}",
                    style("→").yellow(),
                    style("git push --follow-tags").cyan()
                ),
            }
        }
        None => println!("  Git:       skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_patch() {
        assert_eq!(describe_patch(PatchOutcome::Updated), "updated");
        assert_eq!(describe_patch(PatchOutcome::Missing), "not present");
    }

    #[test]
    fn test_display_functions_do_not_panic() {
        // Visual verification - output goes to stdout/stderr
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_rejection("Your version number must match X.X.X");
        display_suggested_version(None, Version::new(1, 0, 0));
        display_suggested_version(Some(Version::new(1, 4, 2)), Version::new(1, 4, 3));
    }
}
