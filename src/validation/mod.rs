//! Validation for extracted catalogs.
//!
//! Runs a suite of checks against a built catalog and reports errors and
//! warnings. Used by both `shipdex validate` and `shipdex extract --validate`.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::catalog::Catalog;

/// Run all validation checks against the catalog.
pub fn validate_catalog(catalog: &Catalog) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_duplicate_names(catalog));
    result.merge(checks::check_shipyard_refs(catalog));
    result.merge(checks::check_outfitter_refs(catalog));
    result.merge(checks::check_planet_refs(catalog));
    result.merge(checks::check_orphan_ships(catalog));

    result
}

/// Print diagnostics to stderr.
pub fn print_diagnostics(result: &ValidationResult) {
    for d in result.iter() {
        eprintln!("  {}[{}]: {}", d.severity, d.code, d.message);
        if let Some(help) = &d.help {
            eprintln!("    help: {}", help);
        }
    }

    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        eprintln!(
            "Validation failed: {} error(s), {} warning(s)",
            errors, warnings
        );
    } else if warnings > 0 {
        eprintln!("Validation passed ({} warning(s))", warnings);
    } else {
        eprintln!("Validation passed.");
    }
}
