//! clean-folder - sort a messy folder by file type
//!
//! This library walks a folder tree, sorts files into fixed category folders
//! by extension, transliterates their names into a safe ASCII form, unpacks
//! archives next to themselves and removes the folders left empty.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod normalize;
pub mod output;
pub mod sweeper;
pub mod transliteration;

pub use archive::{ArchiveFormat, ExtractOutcome, extract_archive};
pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use error::{CleanError, CleanResult};
pub use file_category::{Category, classify};
pub use file_organizer::{FileOrganizer, Summary};
pub use normalize::normalize;
pub use sweeper::delete_empty_folders;

pub use cli::{Cli, run};
