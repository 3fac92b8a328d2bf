//! Removal of empty folders left behind after sorting.

use crate::error::{CleanError, CleanResult};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Deletes every empty directory below `root`, deepest first.
///
/// The walk is post-order, so a directory is checked only after all of its
/// subdirectories have been visited. A parent emptied by removing its last
/// child is therefore removed in the same pass. `root` itself is kept.
///
/// Returns the number of directories removed.
///
/// # Examples
///
/// ```no_run
/// use clean_folder::sweeper::delete_empty_folders;
/// use std::path::Path;
///
/// let removed = delete_empty_folders(Path::new("/home/user/Downloads"))?;
/// println!("Removed {removed} empty folders");
/// # Ok::<(), clean_folder::error::CleanError>(())
/// ```
pub fn delete_empty_folders(root: &Path) -> CleanResult<usize> {
    let mut removed = 0;

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
    {
        let entry = entry.map_err(|e| CleanError::walk(root, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let is_empty = fs::read_dir(path)
            .map_err(|e| CleanError::io("Failed to read directory", path, e))?
            .next()
            .is_none();

        if is_empty {
            fs::remove_dir(path)
                .map_err(|e| CleanError::io("Failed to remove directory", path, e))?;
            debug!(path = %path.display(), "removed empty folder");
            removed += 1;
        }
    }

    Ok(removed)
}
