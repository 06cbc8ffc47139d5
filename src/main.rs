use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use changelog_release::config;
use changelog_release::ui::{self, TerminalPrompter};
use changelog_release::workflow::{self, WorkflowArgs, WorkflowOutcome};

#[derive(clap::Parser)]
#[command(
    name = "changelog-release",
    version,
    about = "Create a CHANGELOG or cut the next release from it"
)]
struct Args {
    #[arg(short = 'C', long, help = "Project directory (defaults to the current directory)")]
    dir: Option<PathBuf>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Do not commit, tag or push")]
    no_git: bool,

    #[arg(long, help = "Commit and tag, but do not push")]
    no_push: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> Result<()> {
    let project_root = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    let project_root = project_root
        .canonicalize()
        .with_context(|| format!("Project directory {} not found", project_root.display()))?;

    let config = config::load_config(args.config.as_deref(), &project_root)
        .context("Error loading config")?;

    let release_date =
        workflow::format_release_date(&chrono::Local::now(), &config.changelog.date_format)?;

    let workflow_args = WorkflowArgs {
        project_root,
        release_date,
        no_git: args.no_git,
        no_push: args.no_push,
    };

    let mut prompter = TerminalPrompter::stdin();
    match workflow::run(&workflow_args, &config, &mut prompter)? {
        WorkflowOutcome::Initialized {
            changelog,
            project_name,
        } => ui::display_initialized(&changelog, &project_name),
        WorkflowOutcome::Released(report) => ui::display_release_summary(&report),
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
