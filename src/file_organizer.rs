/// Folder processing: classify, rename, move and unpack.
///
/// The whole tree is listed before anything is touched, so category folders
/// created during a run and files unpacked from archives are never visited by
/// the same run.
use crate::archive::{ArchiveFormat, ExtractOutcome, extract_archive};
use crate::config::CompiledFilters;
use crate::error::{CleanError, CleanResult};
use crate::file_category::{Category, classify};
use crate::normalize::{extension_key, normalize, split_extension};
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// An archive that was unpacked during the run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedArchive {
    pub archive: PathBuf,
    pub target: PathBuf,
    pub format: ArchiveFormat,
    pub entries: usize,
}

/// What a category folder holds after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "files", rename_all = "lowercase")]
pub enum CategoryContents {
    /// The folder was never created.
    Missing,
    Empty,
    /// Entry names, sorted.
    Files(Vec<String>),
}

/// Listing of one category folder.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category: Category,
    pub contents: CategoryContents,
}

/// Outcome of [`FileOrganizer::organize`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    /// Files left in place by the filter rules.
    pub files_skipped: usize,
    /// Uppercased extensions that matched a category.
    pub known_extensions: BTreeSet<String>,
    /// Uppercased extensions that fell back to `other`; `""` means no extension.
    pub unknown_extensions: BTreeSet<String>,
    pub extracted: Vec<ExtractedArchive>,
    /// Files in the archives folder that turned out not to be archives.
    pub not_archives: Vec<PathBuf>,
    /// Destinations whose previous content was replaced by a rename or move.
    pub overwritten: Vec<PathBuf>,
    /// Category folder contents, in table order.
    pub categories: Vec<CategoryListing>,
}

impl Summary {
    fn record_extension(&mut self, extension: String, known: bool) {
        if known {
            self.known_extensions.insert(extension);
        } else {
            self.unknown_extensions.insert(extension);
        }
    }
}

/// Sorts the files of one folder tree into category subfolders.
///
/// # Examples
///
/// ```no_run
/// use clean_folder::file_organizer::FileOrganizer;
/// use std::path::Path;
///
/// let summary = FileOrganizer::new(Path::new("/home/user/Downloads")).organize()?;
/// println!("{} files sorted", summary.files_processed);
/// # Ok::<(), clean_folder::error::CleanError>(())
/// ```
pub struct FileOrganizer {
    root: PathBuf,
    filters: CompiledFilters,
    progress: ProgressBar,
}

impl FileOrganizer {
    /// Creates an organizer for `root` that processes every file.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            filters: CompiledFilters::default(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Leaves files rejected by `filters` where they are.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Reports per-file progress on `progress`; its length is set by the run.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the pipeline over a snapshot of the tree.
    ///
    /// # Errors
    ///
    /// Any filesystem failure aborts the run and is returned. Files handled
    /// before the failure stay where they were moved.
    pub fn organize(&self) -> CleanResult<Summary> {
        let files = self.snapshot_files()?;
        let mut summary = Summary::default();

        self.progress.set_length(files.len() as u64);

        // Paths this run has moved a file onto.
        let mut placed: HashSet<PathBuf> = HashSet::new();

        for path in files {
            let relative = path.strip_prefix(&self.root).unwrap_or(path.as_path());
            if !self.filters.should_include(relative) {
                debug!(path = %path.display(), "excluded by filter");
                summary.files_skipped += 1;
                self.progress.inc(1);
                continue;
            }

            if placed.contains(&path) {
                debug!(path = %path.display(), "already placed by this run, skipping");
                self.progress.inc(1);
                continue;
            }

            // An earlier move in this run may have replaced it.
            if fs::symlink_metadata(&path).is_err() {
                warn!(path = %path.display(), "file disappeared during the run, skipping");
                self.progress.inc(1);
                continue;
            }

            let destination = self.process_file(&path, &mut summary)?;
            placed.insert(destination);
            summary.files_processed += 1;
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        summary.categories = self.list_categories()?;
        Ok(summary)
    }

    /// Lists every file under the root, sorted by name per directory.
    ///
    /// Symlinks are listed unless they point at a directory; they are moved as
    /// links and never followed during the walk.
    fn snapshot_files(&self) -> CleanResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| CleanError::walk(&self.root, e))?;
            let file_type = entry.file_type();
            if file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Handles one file and returns where it ended up.
    fn process_file(&self, path: &Path, summary: &mut Summary) -> CleanResult<PathBuf> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extension = extension_key(&file_name);
        let (category, known) = classify(&extension);
        summary.record_extension(extension, known);

        let normalized = normalize(&file_name);
        let renamed = rename_in_place(path, &normalized, summary)?;
        let destination = self.move_to_category(&renamed, category, summary)?;

        if category == Category::Archives {
            if destination.is_file() {
                let (stem, _) = split_extension(&normalized);
                let target = self.root.join(category.dir_name()).join(stem);
                self.unpack(&destination, &target, summary)?;
            } else {
                // a dangling link has nothing to unpack
                info!(path = %destination.display(), "not an archive, left as is");
                summary.not_archives.push(destination.clone());
            }
        }

        Ok(destination)
    }

    /// Moves `file_path` into `<root>/<category>/`, creating the folder if needed.
    ///
    /// An existing file of the same name is replaced.
    fn move_to_category(
        &self,
        file_path: &Path,
        category: Category,
        summary: &mut Summary,
    ) -> CleanResult<PathBuf> {
        let category_path = self.root.join(category.dir_name());
        fs::create_dir_all(&category_path)
            .map_err(|e| CleanError::io("Failed to create directory", &category_path, e))?;

        let Some(file_name) = file_path.file_name() else {
            return Ok(file_path.to_path_buf());
        };
        let destination = category_path.join(file_name);

        if destination != file_path {
            replace_file(file_path, &destination, summary)?;
            debug!(
                from = %file_path.display(),
                to = %destination.display(),
                "moved"
            );
        }

        Ok(destination)
    }

    fn unpack(&self, archive: &Path, target: &Path, summary: &mut Summary) -> CleanResult<()> {
        match extract_archive(archive, target)? {
            ExtractOutcome::Extracted { format, entries } => {
                info!(
                    archive = %archive.display(),
                    target = %target.display(),
                    ?format,
                    entries,
                    "unpacked archive"
                );
                summary.extracted.push(ExtractedArchive {
                    archive: archive.to_path_buf(),
                    target: target.to_path_buf(),
                    format,
                    entries,
                });
            }
            ExtractOutcome::NotAnArchive => {
                info!(path = %archive.display(), "not an archive, left as is");
                summary.not_archives.push(archive.to_path_buf());
            }
        }
        Ok(())
    }

    fn list_categories(&self) -> CleanResult<Vec<CategoryListing>> {
        Category::ALL
            .iter()
            .map(|&category| {
                Ok(CategoryListing {
                    category,
                    contents: list_category(&self.root.join(category.dir_name()))?,
                })
            })
            .collect()
    }
}

/// Renames `path` to `normalized` within its own directory.
fn rename_in_place(path: &Path, normalized: &str, summary: &mut Summary) -> CleanResult<PathBuf> {
    let renamed = path.with_file_name(normalized);
    if renamed != path {
        replace_file(path, &renamed, summary)?;
        debug!(from = %path.display(), to = %renamed.display(), "renamed");
    }
    Ok(renamed)
}

/// Renames `from` onto `to`, warning when `to` already holds a file.
fn replace_file(from: &Path, to: &Path, summary: &mut Summary) -> CleanResult<()> {
    if fs::symlink_metadata(to).is_ok() {
        warn!(path = %to.display(), replaced_by = %from.display(), "overwriting existing file");
        summary.overwritten.push(to.to_path_buf());
    }
    fs::rename(from, to).map_err(|e| CleanError::io("Failed to move", from, e))
}

fn list_category(folder: &Path) -> CleanResult<CategoryContents> {
    if !folder.is_dir() {
        return Ok(CategoryContents::Missing);
    }

    let mut names = fs::read_dir(folder)
        .map_err(|e| CleanError::io("Failed to read directory", folder, e))?
        .map(|entry| {
            entry
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .map_err(|e| CleanError::io("Failed to read directory", folder, e))
        })
        .collect::<CleanResult<Vec<_>>>()?;

    if names.is_empty() {
        return Ok(CategoryContents::Empty);
    }
    names.sort();
    Ok(CategoryContents::Files(names))
}
