//! Output formatting and styling module.
//!
//! All console text of the CLI goes through [`OutputFormatter`]: status
//! lines, the progress bar and the end-of-run summary.

use crate::file_organizer::{CategoryContents, Summary};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;

/// Placeholder printed for the empty extension.
const NO_EXTENSION: &str = "<none>";

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    /// OutputFormatter::success("Sorting completed.");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for per-file processing.
    ///
    /// The bar draws on stderr and stays invisible when `visible` is false or
    /// stderr is not a terminal.
    pub fn create_progress_bar(visible: bool) -> ProgressBar {
        if !visible {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints the per-category listing and the extension sets.
    pub fn summary(summary: &Summary) {
        for listing in &summary.categories {
            println!("{}:", listing.category.to_string().bold());
            match &listing.contents {
                CategoryContents::Missing => println!("  - {}", "No folder".dimmed()),
                CategoryContents::Empty => println!("  - {}", "No files".dimmed()),
                CategoryContents::Files(files) => {
                    for file in files {
                        println!("  - {}", file);
                    }
                }
            }
            println!();
        }

        println!("{}", "Known extensions:".bold());
        println!("{}", format_extensions(&summary.known_extensions).green());
        println!("\n{}", "Unknown extensions:".bold());
        println!("{}", format_extensions(&summary.unknown_extensions).yellow());

        if !summary.extracted.is_empty() {
            Self::header("Unpacked archives:");
            for archive in &summary.extracted {
                println!(
                    "  - {} → {} ({} {})",
                    archive.archive.display(),
                    archive.target.display(),
                    archive.entries,
                    if archive.entries == 1 { "file" } else { "files" }
                );
            }
        }

        for path in &summary.not_archives {
            Self::warning(&format!("It is not an archive: {}", path.display()));
        }
        for path in &summary.overwritten {
            Self::warning(&format!("Overwritten: {}", path.display()));
        }
        if summary.files_skipped > 0 {
            Self::info(&format!(
                "Skipped {} {} matching the filter rules.",
                summary.files_skipped,
                if summary.files_skipped == 1 { "file" } else { "files" }
            ));
        }
    }
}

/// Renders an extension set as `{A, B}`.
fn format_extensions(extensions: &BTreeSet<String>) -> String {
    let items: Vec<&str> = extensions
        .iter()
        .map(|ext| if ext.is_empty() { NO_EXTENSION } else { ext.as_str() })
        .collect();
    format!("{{{}}}", items.join(", "))
}
