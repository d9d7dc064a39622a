//! File system scanner for data files.
//!
//! Recursively scans source directories for `.txt` data files, honoring
//! manifest exclude patterns. File order within a source is sorted so
//! extraction output is stable across platforms.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::manifest::Manifest;

/// Result of scanning one data source directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered data files, sorted by path.
    pub files: Vec<PathBuf>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn merge(&mut self, other: ScanResult) {
        self.files.extend(other.files);
    }
}

/// Scan a directory for data files.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if manifest.is_excluded(path) {
            continue;
        }
        if is_data_file(path) {
            result.files.push(path.to_path_buf());
        }
    }

    result.files.sort();
    result
}

/// Resolve a manifest source path against the project root and scan it.
/// A path naming a single file yields that file alone.
pub fn scan_source(source: &str, base_path: &Path, manifest: &Manifest) -> ScanResult {
    let source_path = if Path::new(source).is_absolute() {
        PathBuf::from(source)
    } else {
        base_path.join(source)
    };

    if source_path.is_file() {
        let mut result = ScanResult::new();
        if is_data_file(&source_path) && !manifest.is_excluded(&source_path) {
            result.files.push(source_path);
        }
        return result;
    }

    scan_directory(&source_path, manifest)
}

/// Data files carry a plain `.txt` extension.
pub fn is_data_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "txt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_data_file() {
        assert!(is_data_file(Path::new("ships.txt")));
        assert!(is_data_file(Path::new("data/human/kestrel.txt")));
        assert!(!is_data_file(Path::new("readme.md")));
        assert!(!is_data_file(Path::new("image.png")));
        assert!(!is_data_file(Path::new("noextension")));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempdir().unwrap();
        let result = scan_directory(dir.path(), &Manifest::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ships.txt"), "").unwrap();
        fs::write(dir.path().join("outfits.txt"), "").unwrap();
        fs::write(dir.path().join("readme.md"), "").unwrap();

        let result = scan_directory(dir.path(), &Manifest::default());
        assert_eq!(result.total(), 2);
        assert!(result.files[0].ends_with("outfits.txt"));
        assert!(result.files[1].ends_with("ships.txt"));
    }

    #[test]
    fn test_scan_recursive() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("human")).unwrap();
        fs::write(dir.path().join("human/ships.txt"), "").unwrap();
        fs::write(dir.path().join("fleets.txt"), "").unwrap();

        let result = scan_directory(dir.path(), &Manifest::default());
        assert_eq!(result.total(), 2);
    }

    #[test]
    fn test_scan_with_excludes() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("ships.txt"), "").unwrap();
        fs::write(dir.path().join("drafts/wip.txt"), "").unwrap();

        let manifest = Manifest {
            excludes: vec!["**/drafts/*".to_string()],
            ..Default::default()
        };
        let result = scan_directory(dir.path(), &manifest);
        assert_eq!(result.total(), 1);
        assert!(result.files[0].ends_with("ships.txt"));
    }

    #[test]
    fn test_scan_source_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("ships.txt");
        fs::write(&file, "").unwrap();

        let result = scan_source("ships.txt", dir.path(), &Manifest::default());
        assert_eq!(result.total(), 1);
    }

    #[test]
    fn test_scan_nonexistent_directory() {
        let result = scan_source("missing", Path::new("/nonexistent"), &Manifest::default());
        assert!(result.is_empty());
    }
}
