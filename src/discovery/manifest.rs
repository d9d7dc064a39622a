//! Project manifest (shipdex.yaml) parsing.
//!
//! The manifest names the data sources to extract and basic output
//! settings. Each source may be a bare path or a table with an explicit
//! output name and display name.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShipdexError};

/// Project manifest loaded from shipdex.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Data source directories to scan, in output order.
    /// Defaults to the current directory if empty.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,

    /// Output directory for extracted JSON.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Pretty-print the JSON output.
    #[serde(default)]
    pub pretty: bool,

    /// Patterns to exclude from discovery.
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// One manifest source: either a plain path or a table with naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Path(String),
    Named {
        path: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, rename = "display-name")]
        display_name: Option<String>,
    },
}

impl SourceEntry {
    pub fn path(&self) -> &str {
        match self {
            SourceEntry::Path(path) => path,
            SourceEntry::Named { path, .. } => path,
        }
    }

    /// Output name: explicit, or derived from the path's final component.
    pub fn name(&self) -> String {
        let explicit = match self {
            SourceEntry::Path(_) => None,
            SourceEntry::Named { name, .. } => name.clone(),
        };
        explicit.unwrap_or_else(|| {
            Path::new(self.path())
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "data".to_string())
        })
    }

    pub fn display_name(&self) -> String {
        match self {
            SourceEntry::Named {
                display_name: Some(display),
                ..
            } => display.clone(),
            _ => self.name(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            output: default_output(),
            pretty: false,
            excludes: vec![],
        }
    }
}

impl Manifest {
    /// Load manifest from a shipdex.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ShipdexError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ShipdexError::Manifest {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check shipdex.yaml syntax".to_string()),
        })
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.excludes
            .iter()
            .any(|pattern| Self::matches_pattern(&path_str, pattern))
    }

    /// Simple glob pattern matching.
    fn matches_pattern(path: &str, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix("**/") {
            if let Some(dir) = suffix.strip_suffix("/*") {
                return path.contains(&format!("{}/", dir))
                    || path.contains(&format!("/{}/", dir))
                    || path.starts_with(&format!("{}/", dir));
            }
            return path.contains(suffix) || path.ends_with(suffix);
        }

        if pattern.starts_with('*') && !pattern.contains('/') {
            return path.ends_with(&pattern[1..]);
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", prefix))
                || path.contains(&format!("/{}/", prefix));
        }

        path.contains(pattern)
    }

    /// Get effective source entries, defaulting to the current directory.
    pub fn effective_sources(&self) -> Vec<SourceEntry> {
        if self.sources.is_empty() {
            vec![SourceEntry::Named {
                path: ".".to_string(),
                name: Some("data".to_string()),
                display_name: None,
            }]
        } else {
            self.sources.clone()
        }
    }
}
