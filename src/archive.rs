//! Archive extraction with content sniffing.
//!
//! The format is decided by the file's magic bytes, not by its name. Zip, tar
//! and gzip are recognized; a gzip stream whose payload is a tar is unpacked as
//! a tarball, any other gzip payload is written out as a single file.
//!
//! Input that is not an archive is an expected outcome, reported as
//! [`ExtractOutcome::NotAnArchive`], and leaves the filesystem untouched. That
//! includes a gzip signature over a stream that does not decode.

use flate2::read::GzDecoder;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

/// Bytes read from the head of a file for format detection. Tar's magic sits
/// at offset 257.
const SNIFF_LEN: u64 = 512;

/// A recognized container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    /// A gzip stream holding a single non-tar file.
    Gzip,
}

/// Result of an extraction attempt that did not fail with an I/O error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    Extracted {
        format: ArchiveFormat,
        /// Files written into the target directory.
        entries: usize,
    },
    NotAnArchive,
}

/// Fatal extraction errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Corrupt zip archive {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

type ArchiveResult<T> = Result<T, ArchiveError>;

fn io_err(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> ArchiveError {
    let path = path.to_path_buf();
    move |source| ArchiveError::Io {
        action,
        path,
        source,
    }
}

/// Detects the container format of `source`, if any.
///
/// Returns `None` for plain files, including empty ones, and for a gzip
/// signature whose stream does not decode.
pub fn sniff_format(source: &Path) -> io::Result<Option<ArchiveFormat>> {
    let head = read_head(File::open(source)?)?;

    if infer::archive::is_zip(&head) {
        return Ok(Some(ArchiveFormat::Zip));
    }
    if infer::archive::is_tar(&head) {
        return Ok(Some(ArchiveFormat::Tar));
    }
    if infer::archive::is_gz(&head) {
        let inner = match read_head(GzDecoder::new(File::open(source)?)) {
            Ok(inner) => inner,
            Err(e) if is_corrupt_stream(&e) => {
                debug!(
                    path = %source.display(),
                    error = %e,
                    "gzip signature with an undecodable stream"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if infer::archive::is_tar(&inner) {
            return Ok(Some(ArchiveFormat::TarGz));
        }
        return Ok(Some(ArchiveFormat::Gzip));
    }

    Ok(None)
}

fn read_head(reader: impl Read) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    reader.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(head)
}

/// Error kinds `flate2` reports for bad or truncated compressed data.
fn is_corrupt_stream(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}

/// Extracts `source` into `target_dir`.
///
/// `target_dir` is created only when `source` turns out to be an archive.
///
/// # Errors
///
/// I/O failures while reading the archive or writing its contents are fatal
/// and returned as [`ArchiveError`].
///
/// # Examples
///
/// ```no_run
/// use clean_folder::archive::{ExtractOutcome, extract_archive};
/// use std::path::Path;
///
/// let outcome = extract_archive(
///     Path::new("/data/archives/photos.zip"),
///     Path::new("/data/archives/photos"),
/// )?;
/// if outcome == ExtractOutcome::NotAnArchive {
///     println!("It is not an archive");
/// }
/// # Ok::<(), clean_folder::archive::ArchiveError>(())
/// ```
pub fn extract_archive(source: &Path, target_dir: &Path) -> ArchiveResult<ExtractOutcome> {
    let Some(format) = sniff_format(source).map_err(io_err("read", source))? else {
        debug!(path = %source.display(), "no archive signature");
        return Ok(ExtractOutcome::NotAnArchive);
    };

    let entries = match format {
        ArchiveFormat::Zip => {
            let file = File::open(source).map_err(io_err("open", source))?;
            let archive = match ZipArchive::new(file) {
                Ok(archive) => archive,
                Err(ZipError::Io(e)) => return Err(io_err("read", source)(e)),
                Err(e) => {
                    debug!(
                        path = %source.display(),
                        error = %e,
                        "zip signature without a readable central directory"
                    );
                    return Ok(ExtractOutcome::NotAnArchive);
                }
            };
            create_target(target_dir)?;
            extract_zip(archive, source, target_dir)?
        }
        ArchiveFormat::Tar => {
            create_target(target_dir)?;
            let file = File::open(source).map_err(io_err("open", source))?;
            unpack_tar(tar::Archive::new(file), source, target_dir)?
        }
        ArchiveFormat::TarGz => {
            create_target(target_dir)?;
            let file = File::open(source).map_err(io_err("open", source))?;
            unpack_tar(tar::Archive::new(GzDecoder::new(file)), source, target_dir)?
        }
        ArchiveFormat::Gzip => match gunzip(source, target_dir)? {
            Some(entries) => entries,
            None => return Ok(ExtractOutcome::NotAnArchive),
        },
    };

    Ok(ExtractOutcome::Extracted { format, entries })
}

fn create_target(target_dir: &Path) -> ArchiveResult<()> {
    fs::create_dir_all(target_dir).map_err(io_err("create directory", target_dir))
}

fn extract_zip(
    mut archive: ZipArchive<File>,
    source: &Path,
    target_dir: &Path,
) -> ArchiveResult<usize> {
    let mut written = 0;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| match e {
            ZipError::Io(source_err) => io_err("read", source)(source_err),
            other => ArchiveError::Zip {
                path: source.to_path_buf(),
                source: other,
            },
        })?;

        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!(
                archive = %source.display(),
                entry = entry.name(),
                "skipping entry outside target directory"
            );
            continue;
        };
        let out_path = target_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(io_err("create directory", &out_path))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(io_err("create directory", parent))?;
        }
        let mut out_file = File::create(&out_path).map_err(io_err("create", &out_path))?;
        io::copy(&mut entry, &mut out_file).map_err(io_err("write", &out_path))?;
        written += 1;
    }

    Ok(written)
}

fn unpack_tar<R: Read>(
    mut archive: tar::Archive<R>,
    source: &Path,
    target_dir: &Path,
) -> ArchiveResult<usize> {
    let mut written = 0;

    for entry in archive.entries().map_err(io_err("read", source))? {
        let mut entry = entry.map_err(io_err("read", source))?;
        let is_file = entry.header().entry_type().is_file();
        // unpack_in refuses paths that would escape target_dir
        let unpacked = entry
            .unpack_in(target_dir)
            .map_err(io_err("unpack", source))?;
        if !unpacked {
            warn!(archive = %source.display(), "skipping entry outside target directory");
        } else if is_file {
            written += 1;
        }
    }

    Ok(written)
}

/// Decompresses a single-file gzip into `target_dir/<stem>`.
///
/// The payload is staged in a temporary file next to `target_dir`, so a stream
/// that turns out to be corrupt leaves nothing behind and yields `None`.
fn gunzip(source: &Path, target_dir: &Path) -> ArchiveResult<Option<usize>> {
    let file_name = source
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "payload".into());
    let out_path = target_dir.join(file_name);
    let staging_dir = target_dir.parent().unwrap_or(Path::new("."));

    let mut decoder = GzDecoder::new(File::open(source).map_err(io_err("open", source))?);
    let mut staged = NamedTempFile::new_in(staging_dir)
        .map_err(io_err("create temporary file in", staging_dir))?;

    if let Err(e) = io::copy(&mut decoder, staged.as_file_mut()) {
        if is_corrupt_stream(&e) {
            debug!(path = %source.display(), error = %e, "gzip stream is corrupt");
            return Ok(None);
        }
        return Err(io_err("decompress", source)(e));
    }

    create_target(target_dir)?;
    staged
        .persist(&out_path)
        .map_err(|e| io_err("write", &out_path)(e.error))?;

    Ok(Some(1))
}
