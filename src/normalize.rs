//! Filename normalization.
//!
//! A normalized name keeps ASCII letters and digits, transliterates Cyrillic
//! letters and replaces everything else in the stem with `_`. The extension is
//! carried over verbatim.

use crate::transliteration::transliterate;

/// Splits a file name into `(stem, extension)` at the last dot.
///
/// The extension keeps its leading dot. Dots that lead the name belong to the
/// stem, so dotfiles such as `.bashrc` have no extension.
///
/// # Examples
///
/// ```
/// use clean_folder::normalize::split_extension;
///
/// assert_eq!(split_extension("report.pdf"), ("report", ".pdf"));
/// assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// assert_eq!(split_extension("notes"), ("notes", ""));
/// ```
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].chars().any(|c| c != '.') => {
            (&file_name[..dot], &file_name[dot..])
        }
        _ => (file_name, ""),
    }
}

/// Returns the uppercased extension of a file name, without the dot.
///
/// Names without an extension yield an empty string.
///
/// ```
/// use clean_folder::normalize::extension_key;
///
/// assert_eq!(extension_key("photo.jpg"), "JPG");
/// assert_eq!(extension_key("notes"), "");
/// ```
pub fn extension_key(file_name: &str) -> String {
    let (_, extension) = split_extension(file_name);
    extension.trim_start_matches('.').to_uppercase()
}

/// Converts a file name into its safe form.
///
/// # Examples
///
/// ```
/// use clean_folder::normalize::normalize;
///
/// assert_eq!(normalize("Привіт.txt"), "Pryvit.txt");
/// assert_eq!(normalize("файл №1.doc"), "fayl__1.doc");
/// assert_eq!(normalize("my photo (1).JPG"), "my_photo__1_.JPG");
/// ```
pub fn normalize(file_name: &str) -> String {
    let (stem, extension) = split_extension(file_name);
    let mut normalized = String::with_capacity(file_name.len());

    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            normalized.push(c);
        } else if let Some(latin) = transliterate(c) {
            normalized.push_str(latin);
        } else {
            normalized.push('_');
        }
    }

    normalized.push_str(extension);
    normalized
}
