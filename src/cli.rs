//! Command-line interface module for clean-folder.
//!
//! This module handles:
//! - Argument definitions
//! - Target folder validation
//! - Running the sort and the empty-folder sweep
//! - Reporting the summary

use crate::config::FilterConfig;
use crate::error::{CleanError, CleanResult};
use crate::file_organizer::{FileOrganizer, Summary};
use crate::output::OutputFormatter;
use crate::sweeper::delete_empty_folders;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sort a folder into images, videos, documents, music, archives and other.
#[derive(Debug, Parser)]
#[command(name = "clean-folder", version, about)]
pub struct Cli {
    /// Folder to organize
    pub folder: PathBuf,

    /// TOML file with rules for files to leave untouched
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Everything a finished run reports.
#[derive(Debug, Serialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub summary: Summary,
    pub folders_removed: usize,
}

/// Runs the sort on the folder named by `cli`.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use clean_folder::cli::{Cli, run};
///
/// let cli = Cli::parse_from(["clean-folder", "/home/user/Downloads"]);
/// let report = run(&cli)?;
/// assert!(report.summary.files_processed > 0);
/// # Ok::<(), clean_folder::error::CleanError>(())
/// ```
pub fn run(cli: &Cli) -> CleanResult<RunReport> {
    validate_folder(&cli.folder)?;
    let filters = FilterConfig::load(cli.config.as_deref())?.compile()?;

    if !cli.json {
        OutputFormatter::info(&format!("Organizing contents of: {}", cli.folder.display()));
    }
    info!(folder = %cli.folder.display(), "sorting started");

    let summary = FileOrganizer::new(&cli.folder)
        .with_filters(filters)
        .with_progress(OutputFormatter::create_progress_bar(!cli.json))
        .organize()?;

    if !cli.json {
        OutputFormatter::header("Summary");
        OutputFormatter::summary(&summary);
    }

    let folders_removed = delete_empty_folders(&cli.folder)?;
    let report = RunReport {
        summary,
        folders_removed,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if folders_removed > 0 {
            OutputFormatter::plain(&format!(
                "\nRemoved {} empty {}.",
                folders_removed,
                if folders_removed == 1 { "folder" } else { "folders" }
            ));
        }
        OutputFormatter::success("Sorting completed.");
    }

    Ok(report)
}

/// Checks that `folder` exists and is a directory.
pub fn validate_folder(folder: &Path) -> CleanResult<()> {
    if !folder.exists() {
        return Err(CleanError::FolderNotFound(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(CleanError::NotAFolder(folder.to_path_buf()));
    }
    Ok(())
}
