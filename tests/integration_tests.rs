use clap::Parser;
use clean_folder::cli::{Cli, run};
use clean_folder::file_category::Category;
use clean_folder::file_organizer::{CategoryContents, FileOrganizer};
use clean_folder::sweeper::delete_empty_folders;
use clean_folder::{CleanError, FilterConfig};
/// Integration tests for clean-folder
///
/// These tests run the complete pipeline against temporary folder trees.
///
/// Test categories:
/// 1. Basic sorting workflows
/// 2. Renaming and transliteration
/// 3. Archives
/// 4. Empty folder sweep
/// 5. Filtering and CLI edge cases
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary folder with helpers to build and inspect a file tree.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file, creating parent folders as needed.
    fn create_file(&self, rel_path: &str, content: &[u8]) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
    }

    fn create_text_file(&self, rel_path: &str, content: &str) {
        self.create_file(rel_path, content.as_bytes());
    }

    fn create_subdir(&self, rel_path: &str) {
        fs::create_dir_all(self.path().join(rel_path)).expect("Failed to create subdirectory");
    }

    /// Create a zip archive holding the given text files.
    fn create_zip(&self, rel_path: &str, files: &[(&str, &str)]) {
        let file = File::create(self.path().join(rel_path)).expect("Failed to create zip");
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in files {
            writer
                .start_file(*name, zip::write::FileOptions::default())
                .expect("Failed to start zip entry");
            writer
                .write_all(content.as_bytes())
                .expect("Failed to write zip entry");
        }
        writer.finish().expect("Failed to finish zip");
    }

    /// Create a gzip-compressed tarball holding the given text files.
    fn create_tar_gz(&self, rel_path: &str, files: &[(&str, &str)]) {
        let file = File::create(self.path().join(rel_path)).expect("Failed to create tar.gz");
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_entry_type(tar::EntryType::Regular);
            builder
                .append_data(&mut header, name, content.as_bytes())
                .expect("Failed to append tar entry");
        }
        builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .expect("Failed to finish tar.gz");
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_dir(),
            "Directory should exist: {}",
            path.display()
        );
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Should not exist: {}", path.display());
    }

    /// Names of the entries directly under the root, sorted.
    fn top_level(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("Failed to read directory")
            .map(|e| e.expect("Failed to read entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Run the same steps as the binary: sort, then sweep.
    fn clean(&self) -> clean_folder::Summary {
        let summary = FileOrganizer::new(self.path())
            .organize()
            .expect("Sorting failed");
        delete_empty_folders(self.path()).expect("Sweep failed");
        summary
    }
}

fn set(items: &[&str]) -> std::collections::BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// 1. Basic sorting workflows
// ============================================================================

#[test]
fn test_end_to_end_scenario() {
    let fixture = TestFixture::new();
    fixture.create_text_file("report.PDF", "%PDF-1.4");
    fixture.create_file("photo.JPG", &[0xFF, 0xD8, 0xFF, 0xE0]);
    fixture.create_zip("archive.zip", &[("inside.txt", "packed")]);
    fixture.create_text_file("notes", "remember");

    let summary = fixture.clean();

    fixture.assert_file_exists("documents/report.PDF");
    fixture.assert_file_exists("images/photo.JPG");
    fixture.assert_file_exists("archives/archive.zip");
    fixture.assert_dir_exists("archives/archive");
    assert_eq!(fixture.read("archives/archive/inside.txt"), "packed");
    fixture.assert_file_exists("other/notes");

    assert_eq!(summary.known_extensions, set(&["PDF", "JPG", "ZIP"]));
    assert_eq!(summary.unknown_extensions, set(&[""]));
    assert_eq!(summary.files_processed, 4);
    assert_eq!(summary.extracted.len(), 1);
}

#[test]
fn test_all_categories() {
    let fixture = TestFixture::new();
    for name in [
        "a.jpeg", "b.png", "c.svg", "d.avi", "e.mp4", "f.mov", "g.mkv", "h.doc", "i.docx",
        "j.txt", "k.xlsx", "l.pptx", "m.mp3", "n.ogg", "o.wav", "p.amr", "q.exe",
    ] {
        fixture.create_text_file(name, "x");
    }

    fixture.clean();

    assert_eq!(
        fixture.top_level(),
        vec!["documents", "images", "music", "other", "videos"]
    );
    fixture.assert_file_exists("images/c.svg");
    fixture.assert_file_exists("videos/g.mkv");
    fixture.assert_file_exists("documents/l.pptx");
    fixture.assert_file_exists("music/p.amr");
    fixture.assert_file_exists("other/q.exe");
}

#[test]
fn test_nested_files_are_pulled_up_and_folders_swept() {
    let fixture = TestFixture::new();
    fixture.create_text_file("2023/trip/beach.jpg", "img");
    fixture.create_text_file("2023/trip/plan.txt", "plan");
    fixture.create_text_file("deep/a/b/c/song.mp3", "la");
    fixture.create_subdir("empty/also_empty");

    fixture.clean();

    fixture.assert_file_exists("images/beach.jpg");
    fixture.assert_file_exists("documents/plan.txt");
    fixture.assert_file_exists("music/song.mp3");
    fixture.assert_not_exists("2023");
    fixture.assert_not_exists("deep");
    fixture.assert_not_exists("empty");
    assert_eq!(fixture.top_level(), vec!["documents", "images", "music"]);
}

#[test]
fn test_category_listing_in_summary() {
    let fixture = TestFixture::new();
    fixture.create_text_file("b.txt", "");
    fixture.create_text_file("a.pdf", "");

    let summary = fixture.clean();

    let documents = summary
        .categories
        .iter()
        .find(|listing| listing.category == Category::Documents)
        .expect("documents listing");
    assert_eq!(
        documents.contents,
        CategoryContents::Files(vec!["a.pdf".to_string(), "b.txt".to_string()])
    );
    let videos = summary
        .categories
        .iter()
        .find(|listing| listing.category == Category::Videos)
        .expect("videos listing");
    assert_eq!(videos.contents, CategoryContents::Missing);
}

#[test]
fn test_second_run_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Звіт 2024.pdf", "r");
    fixture.create_text_file("clip.mp4", "v");
    fixture.create_text_file("misc.bin", "b");

    fixture.clean();
    let first = fixture.top_level();
    let summary = fixture.clean();

    assert_eq!(fixture.top_level(), first);
    fixture.assert_file_exists("documents/Zvit_2024.pdf");
    fixture.assert_file_exists("videos/clip.mp4");
    fixture.assert_file_exists("other/misc.bin");
    assert!(summary.overwritten.is_empty());
}

#[test]
fn test_existing_category_folders_are_reused() {
    let fixture = TestFixture::new();
    fixture.create_text_file("images/old.png", "old");
    fixture.create_text_file("new.png", "new");

    fixture.clean();

    fixture.assert_file_exists("images/old.png");
    fixture.assert_file_exists("images/new.png");
    assert_eq!(fixture.top_level(), vec!["images"]);
}

// ============================================================================
// 2. Renaming and transliteration
// ============================================================================

#[test]
fn test_names_are_transliterated_and_sanitized() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Привіт.txt", "hi");
    fixture.create_text_file("файл №1.doc", "doc");
    fixture.create_text_file("my song (live).mp3", "la");

    fixture.clean();

    fixture.assert_file_exists("documents/Pryvit.txt");
    fixture.assert_file_exists("documents/fayl__1.doc");
    fixture.assert_file_exists("music/my_song__live_.mp3");
    fixture.assert_not_exists("documents/Привіт.txt");
}

#[test]
fn test_extension_case_is_preserved_in_name() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Фото.JPEG", "img");

    let summary = fixture.clean();

    fixture.assert_file_exists("images/Foto.JPEG");
    assert_eq!(summary.known_extensions, set(&["JPEG"]));
}

#[test]
fn test_name_collision_overwrites_and_is_reported() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a/report.txt", "first");
    fixture.create_text_file("b/report.txt", "second");

    let summary = fixture.clean();

    fixture.assert_file_exists("documents/report.txt");
    assert_eq!(fixture.read("documents/report.txt"), "second");
    assert_eq!(summary.overwritten.len(), 1);
    assert_eq!(summary.files_processed, 2);
}

#[test]
fn test_same_folder_collision_skips_the_replaced_file() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a b.txt", "spaced");
    fixture.create_text_file("a_b.txt", "underscored");

    let summary = fixture.clean();

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.overwritten, vec![fixture.path().join("a_b.txt")]);
    assert_eq!(fixture.read("documents/a_b.txt"), "spaced");
    assert_eq!(fixture.top_level(), vec!["documents"]);
}

// ============================================================================
// 3. Archives
// ============================================================================

#[test]
fn test_corrupt_gzip_is_reported_and_run_continues() {
    let fixture = TestFixture::new();
    let mut bytes = vec![0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0x00, 0xff, 0x07];
    bytes.extend_from_slice(b"plain text after a gzip header");
    fixture.create_file("broken.gz", &bytes);
    fixture.create_text_file("zreport.txt", "report");

    let summary = fixture.clean();

    fixture.assert_file_exists("archives/broken.gz");
    fixture.assert_not_exists("archives/broken");
    fixture.assert_file_exists("documents/zreport.txt");
    assert_eq!(
        summary.not_archives,
        vec![fixture.path().join("archives/broken.gz")]
    );
    assert_eq!(summary.files_processed, 2);
}

#[test]
fn test_archive_moved_onto_later_entry_is_unpacked_once() {
    let fixture = TestFixture::new();
    fixture.create_zip("Bundle.zip", &[("new.txt", "new")]);
    fixture.create_subdir("archives");
    fixture.create_zip("archives/Bundle.zip", &[("old.txt", "old")]);

    let summary = fixture.clean();

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.extracted.len(), 1);
    assert_eq!(fixture.read("archives/Bundle/new.txt"), "new");
    fixture.assert_not_exists("archives/Bundle/old.txt");
}

#[test]
fn test_fake_zip_is_kept_without_extraction() {
    let fixture = TestFixture::new();
    fixture.create_text_file("fake.zip", "this is plain text");

    let summary = fixture.clean();

    fixture.assert_file_exists("archives/fake.zip");
    fixture.assert_not_exists("archives/fake");
    assert_eq!(summary.not_archives.len(), 1);
    assert!(summary.extracted.is_empty());
}

#[test]
fn test_tar_gz_extracts_into_stripped_name() {
    let fixture = TestFixture::new();
    fixture.create_tar_gz("backup.tar.gz", &[("db/dump.sql", "select 1;")]);

    let summary = fixture.clean();

    // only the outer extension is stripped; the inner dot was normalized
    fixture.assert_file_exists("archives/backup_tar.gz");
    assert_eq!(fixture.read("archives/backup_tar/db/dump.sql"), "select 1;");
    assert_eq!(summary.extracted.len(), 1);
    assert_eq!(summary.extracted[0].entries, 1);
}

#[test]
fn test_extracted_files_are_not_sorted_in_same_run() {
    let fixture = TestFixture::new();
    fixture.create_zip("bundle.zip", &[("pic.png", "png"), ("song.mp3", "mp3")]);

    fixture.clean();

    fixture.assert_file_exists("archives/bundle/pic.png");
    fixture.assert_file_exists("archives/bundle/song.mp3");
    fixture.assert_not_exists("images");
    fixture.assert_not_exists("music");
}

#[test]
fn test_empty_archive_folder_is_swept() {
    let fixture = TestFixture::new();
    fixture.create_zip("nothing.zip", &[]);

    fixture.clean();

    fixture.assert_file_exists("archives/nothing.zip");
    fixture.assert_not_exists("archives/nothing");
}

// ============================================================================
// 4. Empty folder sweep
// ============================================================================

#[test]
fn test_sweep_cascades_through_nested_empty_folders() {
    let fixture = TestFixture::new();
    fixture.create_subdir("a/b/c");

    let removed = delete_empty_folders(fixture.path()).expect("Sweep failed");

    assert_eq!(removed, 3);
    fixture.assert_not_exists("a");
    assert!(fixture.path().exists());
}

// ============================================================================
// 5. Filtering and CLI edge cases
// ============================================================================

#[test]
fn test_filtered_files_stay_in_place() {
    let fixture = TestFixture::new();
    fixture.create_text_file("keep/важливо.txt", "stay");
    fixture.create_text_file("draft.tmp", "tmp");
    fixture.create_text_file("move.txt", "go");

    let config: FilterConfig = toml::from_str(
        "[filters]\n[filters.exclude]\nextensions = [\"tmp\"]\npatterns = [\"keep/**\"]\n",
    )
    .expect("valid config");
    let filters = config.compile().expect("valid filters");

    let summary = FileOrganizer::new(fixture.path())
        .with_filters(filters)
        .organize()
        .expect("Sorting failed");

    fixture.assert_file_exists("keep/важливо.txt");
    fixture.assert_file_exists("draft.tmp");
    fixture.assert_file_exists("documents/move.txt");
    assert_eq!(summary.files_skipped, 2);
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.unknown_extensions.len(), 0);
}

#[test]
fn test_run_rejects_missing_folder() {
    let fixture = TestFixture::new();
    let missing = fixture.path().join("nope");
    let cli = Cli::parse_from([OsStr::new("clean-folder"), missing.as_os_str()]);

    let err = run(&cli).expect_err("missing folder must fail");

    assert!(matches!(err, CleanError::FolderNotFound(_)));
    assert_eq!(err.exit_code(), clean_folder::error::exit_code::NOT_FOUND);
}

#[test]
fn test_run_rejects_missing_config() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    let config = fixture.path().join("absent.toml");
    let cli = Cli::parse_from([
        OsStr::new("clean-folder"),
        OsStr::new("--config"),
        config.as_os_str(),
        fixture.path().as_os_str(),
    ]);

    let err = run(&cli).expect_err("missing config must fail");

    assert_eq!(err.exit_code(), clean_folder::error::exit_code::CONFIG);
    // nothing was touched
    fixture.assert_file_exists("a.txt");
}

#[test]
fn test_run_json_report() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    fixture.create_subdir("empty");
    let cli = Cli::parse_from([
        OsStr::new("clean-folder"),
        OsStr::new("--json"),
        fixture.path().as_os_str(),
    ]);

    let report = run(&cli).expect("run failed");

    assert_eq!(report.folders_removed, 1);
    assert_eq!(report.summary.files_processed, 1);
    let json = serde_json::to_value(&report).expect("serializable");
    assert_eq!(json["folders_removed"], 1);
    assert_eq!(json["known_extensions"][0], "TXT");
    assert_eq!(json["categories"][2]["category"], "documents");
    assert_eq!(json["categories"][2]["contents"]["state"], "files");
}
