/// File categorization by extension.
///
/// Every file lands in exactly one of six fixed categories. The lookup table
/// is static and ordered; `Other` has no extensions and catches everything
/// the other categories do not claim.
///
/// # Examples
///
/// ```
/// use clean_folder::file_category::{Category, classify};
///
/// assert_eq!(classify("JPG"), (Category::Images, true));
/// assert_eq!(classify(".tar"), (Category::Archives, true));
/// assert_eq!(classify("xyz"), (Category::Other, false));
/// ```
use serde::Serialize;
use std::fmt;

/// One of the fixed destination categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// JPEG, PNG, JPG, SVG
    Images,
    /// AVI, MP4, MOV, MKV
    Videos,
    /// DOC, DOCX, TXT, PDF, XLSX, PPTX
    Documents,
    /// MP3, OGG, WAV, AMR
    Music,
    /// ZIP, GZ, TAR
    Archives,
    /// Anything else, including files without an extension
    Other,
}

impl Category {
    /// All categories in lookup order.
    pub const ALL: [Category; 6] = [
        Category::Images,
        Category::Videos,
        Category::Documents,
        Category::Music,
        Category::Archives,
        Category::Other,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "images");
    /// assert_eq!(Category::Other.dir_name(), "other");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Videos => "videos",
            Category::Documents => "documents",
            Category::Music => "music",
            Category::Archives => "archives",
            Category::Other => "other",
        }
    }

    /// Returns the uppercase extensions recognized for this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => &["JPEG", "PNG", "JPG", "SVG"],
            Category::Videos => &["AVI", "MP4", "MOV", "MKV"],
            Category::Documents => &["DOC", "DOCX", "TXT", "PDF", "XLSX", "PPTX"],
            Category::Music => &["MP3", "OGG", "WAV", "AMR"],
            Category::Archives => &["ZIP", "GZ", "TAR"],
            Category::Other => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Maps an extension to its category.
///
/// The extension may carry a leading dot and any letter case. The second
/// element is `false` when no table entry matched and the file fell back to
/// [`Category::Other`].
pub fn classify(extension: &str) -> (Category, bool) {
    let key = extension.trim_start_matches('.').to_uppercase();

    Category::ALL
        .iter()
        .find(|category| category.extensions().contains(&key.as_str()))
        .map_or((Category::Other, false), |&category| (category, true))
}
