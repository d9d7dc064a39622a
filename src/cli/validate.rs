//! Validate command implementation.
//!
//! Builds the catalog without writing output and reports diagnostics.

use std::path::PathBuf;

use clap::Args;

use crate::discovery::{discover, discover_paths};
use crate::error::{Result, ShipdexError};
use crate::output::{plural, Printer};
use crate::validation::{print_diagnostics, validate_catalog};

/// Validate data files without writing output
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to scan (default: current directory)
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<()> {
    let discovery = if args.paths.is_empty() {
        discover(".")?
    } else {
        discover_paths(&args.paths)?
    };

    printer.status(
        "Checking",
        &plural(discovery.total_files(), "data file", "data files"),
    );
    let catalog = discovery.into_catalog();

    for warning in &catalog.warnings {
        printer.warning("warning", warning);
    }

    let result = validate_catalog(&catalog);
    print_diagnostics(&result);

    if result.has_errors() {
        return Err(ShipdexError::Validation {
            message: format!("{} validation error(s)", result.error_count()),
            help: Some("Fix the errors above and re-run".to_string()),
        });
    }
    Ok(())
}
