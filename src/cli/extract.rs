//! Extract command implementation.
//!
//! Parses every discovered data file, resolves variants and governments,
//! and writes the four output collections plus the source index as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::discovery::{discover, discover_paths, discover_with_manifest};
use crate::error::{Result, ShipdexError};
use crate::output::{display_path, plural, Printer};
use crate::validation::{print_diagnostics, validate_catalog};

/// Extract ships, variants, outfits, and effects to JSON
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Files or directories to scan (default: discover via shipdex.yaml)
    pub paths: Vec<PathBuf>,

    /// Manifest file to use instead of ./shipdex.yaml
    #[arg(long, conflicts_with = "paths")]
    pub manifest: Option<PathBuf>,

    /// Output directory (default: manifest `output`, or dist)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Run validation checks and fail on errors
    #[arg(long)]
    pub validate: bool,
}

pub fn run(args: ExtractArgs, printer: &Printer) -> Result<()> {
    let discovery = if let Some(manifest) = &args.manifest {
        discover_with_manifest(manifest)?
    } else if args.paths.is_empty() {
        discover(".")?
    } else {
        discover_paths(&args.paths)?
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| discovery.manifest.output.clone());
    let pretty = args.pretty || discovery.manifest.pretty;

    printer.status(
        "Parsing",
        &plural(discovery.total_files(), "data file", "data files"),
    );
    let catalog = discovery.into_catalog();

    for warning in &catalog.warnings {
        printer.warning("warning", warning);
    }

    if args.validate {
        let result = validate_catalog(&catalog);
        print_diagnostics(&result);
        if result.has_errors() {
            return Err(ShipdexError::Validation {
                message: format!("{} validation error(s)", result.error_count()),
                help: Some("Fix the errors above and re-run".to_string()),
            });
        }
    }

    write_catalog(&catalog, &output, pretty)?;

    printer.status(
        "Extracted",
        &format!(
            "{} to {}",
            plural(catalog.record_count(), "record", "records"),
            display_path(&output)
        ),
    );
    Ok(())
}

/// Write the output collections. File names are part of the output
/// contract; consumers key on them.
fn write_catalog(catalog: &Catalog, output: &Path, pretty: bool) -> Result<()> {
    if !output.exists() {
        fs::create_dir_all(output).map_err(|e| ShipdexError::Io {
            path: output.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    write_json(&output.join("ships.json"), &catalog.ships, pretty)?;
    write_json(&output.join("variants.json"), &catalog.variants, pretty)?;
    write_json(&output.join("outfits.json"), &catalog.outfits, pretty)?;
    write_json(&output.join("effects.json"), &catalog.effects, pretty)?;
    write_json(&output.join("index.json"), &catalog.index, pretty)?;

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| ShipdexError::Output {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        help: None,
    })?;

    fs::write(path, text).map_err(|e| ShipdexError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write output: {}", e),
    })
}
