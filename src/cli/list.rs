//! List command implementation.
//!
//! Builds the catalog in memory and prints an inventory of extracted
//! record names, grouped by kind.

use std::path::PathBuf;

use clap::Args;

use crate::discovery::{discover, discover_paths};
use crate::error::Result;
use crate::output::{plural, Printer};
use crate::parser::Record;

/// List extracted record names
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Files or directories to scan (default: current directory)
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ListArgs, printer: &Printer) -> Result<()> {
    let discovery = if args.paths.is_empty() {
        discover(".")?
    } else {
        discover_paths(&args.paths)?
    };

    let catalog = discovery.into_catalog();
    for warning in &catalog.warnings {
        printer.warning("warning", warning);
    }

    let groups: &[(&str, &[Record])] = &[
        ("Ships", &catalog.ships),
        ("Variants", &catalog.variants),
        ("Outfits", &catalog.outfits),
        ("Effects", &catalog.effects),
    ];

    for (label, records) in groups {
        if records.is_empty() {
            continue;
        }
        printer.info(label, &sorted_names(records).join(", "));
    }

    printer.status(
        "Found",
        &plural(catalog.record_count(), "record", "records"),
    );
    Ok(())
}

fn sorted_names(records: &[Record]) -> Vec<String> {
    let mut names: Vec<String> = records
        .iter()
        .filter_map(|r| r.name().map(str::to_string))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_list_runs_over_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("data.txt"),
            "ship \"Sparrow\"\n\tdescription \"A small ship.\"\n\
             effect \"spark\"\n\tsprite \"effect/spark\"\n",
        )
        .unwrap();

        let args = ListArgs {
            paths: vec![dir.path().to_path_buf()],
        };
        run(args, &Printer::new()).unwrap();
    }
}
