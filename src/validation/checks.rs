//! Validation checks for a built catalog.
//!
//! Each check takes an `&Catalog` and returns a `ValidationResult`.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::parser::record::Record;

use super::warning::{Diagnostic, ValidationResult};

fn names(records: &[Record]) -> impl Iterator<Item = &str> {
    records.iter().filter_map(Record::name)
}

/// Every name a shipyard or fleet may legitimately reference: extracted
/// ships and variants. Undescribed ships are not extracted, so unknown
/// names here are only warnings.
fn known_ship_names(catalog: &Catalog) -> HashSet<&str> {
    names(&catalog.ships).chain(names(&catalog.variants)).collect()
}

/// Check for duplicate record names within each collection.
pub fn check_duplicate_names(catalog: &Catalog) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (kind, records) in [
        ("ship", &catalog.ships),
        ("variant", &catalog.variants),
        ("outfit", &catalog.outfits),
        ("effect", &catalog.effects),
    ] {
        let mut seen = HashSet::new();
        for name in names(records) {
            if !seen.insert(name) {
                result.push(
                    Diagnostic::error(
                        "shipdex::validate::duplicate-name",
                        format!("Duplicate {} name '{}'", kind, name),
                    )
                    .with_help("Later definitions shadow earlier ones in consumers"),
                );
            }
        }
    }

    result
}

/// Check that shipyard listings name known ships.
pub fn check_shipyard_refs(catalog: &Catalog) -> ValidationResult {
    let mut result = ValidationResult::new();
    let known = known_ship_names(catalog);

    for (shipyard, ships) in catalog.species.shipyards() {
        for ship in ships {
            if !known.contains(ship.as_str()) {
                result.push(
                    Diagnostic::warning(
                        "shipdex::validate::unknown-ship",
                        format!("Shipyard '{}' lists unknown ship '{}'", shipyard, ship),
                    )
                    .with_help("Ships without a description are not extracted"),
                );
            }
        }
    }

    result
}

/// Check that outfitter listings name known outfits.
pub fn check_outfitter_refs(catalog: &Catalog) -> ValidationResult {
    let mut result = ValidationResult::new();
    let known: HashSet<&str> = names(&catalog.outfits).collect();

    for (outfitter, outfits) in catalog.species.outfitters() {
        for outfit in outfits {
            if !known.contains(outfit.as_str()) {
                result.push(
                    Diagnostic::warning(
                        "shipdex::validate::unknown-outfit",
                        format!("Outfitter '{}' lists unknown outfit '{}'", outfitter, outfit),
                    )
                    .with_help("Outfits without a description are not extracted"),
                );
            }
        }
    }

    result
}

/// Check that planet shipyard/outfitter references resolve.
pub fn check_planet_refs(catalog: &Catalog) -> ValidationResult {
    let mut result = ValidationResult::new();
    let shipyards: HashSet<&str> = catalog.species.shipyards().map(|(name, _)| name).collect();
    let outfitters: HashSet<&str> = catalog.species.outfitters().map(|(name, _)| name).collect();

    for planet in catalog.species.planets() {
        for shipyard in &planet.shipyards {
            if !shipyards.contains(shipyard.as_str()) {
                result.push(Diagnostic::warning(
                    "shipdex::validate::unknown-shipyard",
                    format!(
                        "Planet '{}' references unknown shipyard '{}'",
                        planet.name, shipyard
                    ),
                ));
            }
        }
        for outfitter in &planet.outfitters {
            if !outfitters.contains(outfitter.as_str()) {
                result.push(Diagnostic::warning(
                    "shipdex::validate::unknown-outfitter",
                    format!(
                        "Planet '{}' references unknown outfitter '{}'",
                        planet.name, outfitter
                    ),
                ));
            }
        }
    }

    result
}

/// Check for extracted ships that no fleet, mission, or shipyard places
/// under any government.
pub fn check_orphan_ships(catalog: &Catalog) -> ValidationResult {
    let mut result = ValidationResult::new();

    for name in names(&catalog.ships) {
        if catalog.species.governments_for_ship(name).is_empty() {
            result.push(
                Diagnostic::warning(
                    "shipdex::validate::no-government",
                    format!("No government could be inferred for ship '{}'", name),
                )
                .with_help("Add the ship to a fleet, mission npc, or stocked shipyard"),
            );
        }
    }

    result
}
