//! File discovery and source loading.
//!
//! Finds data files for extraction, either through a `shipdex.yaml`
//! manifest in the project root or by scanning directories given on the
//! command line.
//!
//! # Example
//!
//! ```ignore
//! use shipdex::discovery::discover;
//!
//! let result = discover("./my-project")?;
//! let catalog = result.into_catalog();
//! ```

mod loader;
mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogBuilder};
use crate::error::Result;

pub use loader::{load_source, LoadResult};
pub use manifest::{Manifest, SourceEntry};
pub use scanner::{is_data_file, scan_directory, scan_source, ScanResult};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "shipdex.yaml";

/// One discovered source: naming plus the files found for it.
#[derive(Debug)]
pub struct DiscoveredSource {
    pub name: String,
    pub display_name: String,
    pub files: Vec<PathBuf>,
}

/// Result of discovering data sources in a project.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The project root directory.
    pub root: PathBuf,

    /// The loaded manifest (default if no shipdex.yaml found).
    pub manifest: Manifest,

    /// Whether a shipdex.yaml manifest was found.
    pub has_manifest: bool,

    /// Discovered sources, in manifest order.
    pub sources: Vec<DiscoveredSource>,
}

impl DiscoveryResult {
    /// Total number of discovered data files.
    pub fn total_files(&self) -> usize {
        self.sources.iter().map(|s| s.files.len()).sum()
    }

    /// Load every discovered file and build the catalog. Unreadable files
    /// become catalog warnings, never errors.
    pub fn into_catalog(self) -> Catalog {
        let mut builder = CatalogBuilder::new();
        let mut io_warnings = Vec::new();

        for discovered in &self.sources {
            let loaded = load_source(
                &discovered.name,
                &discovered.display_name,
                &discovered.files,
            );
            io_warnings.extend(loaded.warnings);
            builder.parse_source(&loaded.source);
        }

        let mut catalog = builder.finish();
        io_warnings.append(&mut catalog.warnings);
        catalog.warnings = io_warnings;
        catalog
    }
}

/// Discover data sources in a project directory.
///
/// Looks for a `shipdex.yaml` manifest in the root. If found, scans the
/// manifest's source paths in order; otherwise scans the whole directory
/// as a single source named after it.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();

    let manifest_path = root.join(MANIFEST_FILENAME);
    let (manifest, has_manifest) = if manifest_path.exists() {
        (Manifest::load(&manifest_path)?, true)
    } else {
        (Manifest::default(), false)
    };

    let sources = scan_manifest_sources(&manifest, &root);

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest,
        sources,
    })
}

/// Discover data sources through an explicit manifest file. The manifest's
/// parent directory becomes the project root for relative source paths.
pub fn discover_with_manifest(manifest_path: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let manifest_path = manifest_path.as_ref();
    let manifest = Manifest::load(manifest_path)?;
    let root = manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let sources = scan_manifest_sources(&manifest, &root);

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest: true,
        sources,
    })
}

fn scan_manifest_sources(manifest: &Manifest, root: &Path) -> Vec<DiscoveredSource> {
    manifest
        .effective_sources()
        .iter()
        .map(|entry| DiscoveredSource {
            name: entry.name(),
            display_name: entry.display_name(),
            files: scan_source(entry.path(), root, manifest).files,
        })
        .collect()
}

/// Discover data sources from explicit paths (no manifest lookup).
/// Each path becomes its own source, named after its final component.
pub fn discover_paths(paths: &[PathBuf]) -> Result<DiscoveryResult> {
    let manifest = Manifest::default();

    let sources = paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "data".to_string());
            DiscoveredSource {
                display_name: name.clone(),
                name,
                files: scan_source(&path.to_string_lossy(), Path::new("."), &manifest).files,
            }
        })
        .collect();

    let root = paths
        .first()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest: false,
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempdir().unwrap();
        let result = discover(dir.path()).unwrap();

        assert!(!result.has_manifest);
        assert_eq!(result.total_files(), 0);
    }

    #[test]
    fn test_discover_without_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ships.txt"), "ship \"Sparrow\"").unwrap();

        let result = discover(dir.path()).unwrap();
        assert!(!result.has_manifest);
        assert_eq!(result.total_files(), 1);
    }

    #[test]
    fn test_discover_with_manifest() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("shipdex.yaml"),
            "sources:\n  - path: data\n    name: base\n    display-name: Base Data\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/ships.txt"), "ship \"Sparrow\"").unwrap();
        // Outside the manifest source, must not be picked up.
        fs::write(dir.path().join("stray.txt"), "").unwrap();

        let result = discover(dir.path()).unwrap();
        assert!(result.has_manifest);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].name, "base");
        assert_eq!(result.sources[0].display_name, "Base Data");
        assert_eq!(result.sources[0].files.len(), 1);
    }

    #[test]
    fn test_discover_into_catalog() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("ships.txt"),
            "ship \"Sparrow\"\n\tdescription \"A small ship.\"\n",
        )
        .unwrap();

        let catalog = discover(dir.path()).unwrap().into_catalog();
        assert_eq!(catalog.ships.len(), 1);
        assert_eq!(catalog.index.len(), 1);
    }

    #[test]
    fn test_discover_paths() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ships.txt"), "").unwrap();

        let result = discover_paths(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.total_files(), 1);
    }

    #[test]
    fn test_discover_with_explicit_manifest_path() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("custom.yaml"),
            "sources:\n  - path: data\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/ships.txt"), "ship \"Sparrow\"").unwrap();

        let result = discover_with_manifest(dir.path().join("custom.yaml")).unwrap();
        assert!(result.has_manifest);
        assert_eq!(result.root, dir.path());
        assert_eq!(result.total_files(), 1);
    }

    #[test]
    fn test_discover_invalid_manifest_errors() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("shipdex.yaml"), "sources: {bad").unwrap();

        assert!(discover(dir.path()).is_err());
    }
}
