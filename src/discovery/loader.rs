//! Source loader: reads scanned files into in-memory data sources.
//!
//! A file that cannot be read is reported as a warning and omitted; one
//! bad file never aborts the batch.

use std::fs;
use std::path::PathBuf;

use crate::catalog::{DataSource, SourceFile};

/// Result of loading one data source from disk.
#[derive(Debug)]
pub struct LoadResult {
    pub source: DataSource,
    pub warnings: Vec<String>,
}

/// Read every scanned file into a [`DataSource`].
pub fn load_source(name: &str, display_name: &str, files: &[PathBuf]) -> LoadResult {
    let mut source = DataSource {
        name: name.to_string(),
        display_name: display_name.to_string(),
        files: Vec::with_capacity(files.len()),
    };
    let mut warnings = Vec::new();

    for path in files {
        match fs::read_to_string(path) {
            Ok(text) => source.files.push(SourceFile {
                path: path.display().to_string(),
                text,
            }),
            Err(e) => warnings.push(format!("{}: skipped, {}", path.display(), e)),
        }
    }

    LoadResult { source, warnings }
}
