//! Government inference ("species" resolution).
//!
//! Most records never declare an owning faction directly. Instead the
//! resolver accumulates four independently-populated reference tables
//! during the parse pass - fleet rosters, mission NPC ship instances,
//! shipyard/outfitter listings joined through planet records - plus the
//! per-ship outfit loadouts, then computes per-ship and per-outfit
//! government sets via transitive lookups after the full parse.
//!
//! Result order is first-seen during the set union, and the tables
//! themselves preserve insertion order, so inference is deterministic.

use crate::parser::header_names;
use crate::parser::line::{next_content, skip_block, Line, LineClass};
use crate::parser::record::{Record, Value};
use crate::parser::token::tokenize;

/// One fleet record: a government plus its ship roster.
#[derive(Debug, Clone)]
pub struct FleetRef {
    pub government: Option<String>,
    pub ships: Vec<String>,
}

/// One scripted ship instance from a mission `npc` sub-block.
///
/// Mission files frequently reference full variant display names
/// (`"Carrier (Alpha)"`) while fleet and shipyard files use base names;
/// lookups check both forms.
#[derive(Debug, Clone)]
pub struct NpcRef {
    pub government: Option<String>,
    pub ship: String,
}

/// A planet record: the join point between catalogs and governments.
#[derive(Debug, Clone)]
pub struct PlanetRef {
    pub name: String,
    pub government: Option<String>,
    pub shipyards: Vec<String>,
    pub outfitters: Vec<String>,
}

/// Accumulated reference tables, process-scoped and reset per repository
/// parse.
#[derive(Debug, Default)]
pub struct SpeciesTables {
    fleets: Vec<FleetRef>,
    npcs: Vec<NpcRef>,
    shipyards: Vec<(String, Vec<String>)>,
    outfitters: Vec<(String, Vec<String>)>,
    planets: Vec<PlanetRef>,
    ship_outfits: Vec<(String, Vec<String>)>,
}

impl SpeciesTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record the outfit names carried by a ship (from its `outfits`
    /// sub-block).
    pub fn register_ship_outfits(&mut self, ship: &str, outfits: Vec<String>) {
        if outfits.is_empty() {
            return;
        }
        match self.ship_outfits.iter_mut().find(|(name, _)| name == ship) {
            Some((_, existing)) => {
                for outfit in outfits {
                    if !existing.contains(&outfit) {
                        existing.push(outfit);
                    }
                }
            }
            None => self.ship_outfits.push((ship.to_string(), outfits)),
        }
    }

    /// Intercept a `fleet` block: government plus ship names gathered from
    /// its `variant` sub-blocks.
    pub fn intercept_fleet(&mut self, lines: &[Line], at: usize) -> usize {
        let end = skip_block(lines, at);
        let mut government = None;
        let mut ships: Vec<String> = Vec::new();

        let Some(base) = body_depth(lines, at, end) else {
            return end;
        };

        let mut i = at + 1;
        while i < end {
            let line = &lines[i];
            if line.class != LineClass::Content || line.depth != base {
                i += 1;
                continue;
            }
            if let Some(rest) = line.text.strip_prefix("government ") {
                government = header_names(rest).into_iter().next();
                i += 1;
            } else if line.text == "variant" || line.text.starts_with("variant ") {
                let block_end = skip_block(lines, i);
                for member in &lines[i + 1..block_end] {
                    if member.class != LineClass::Content {
                        continue;
                    }
                    if let Some((name, _)) = tokenize(&member.text) {
                        if !ships.contains(&name) {
                            ships.push(name);
                        }
                    }
                }
                i = block_end;
            } else {
                i = skip_block(lines, i);
            }
        }

        self.fleets.push(FleetRef { government, ships });
        end
    }

    /// Intercept a `mission` block, harvesting its `npc` sub-blocks.
    ///
    /// NPC `ship` lines come in a two-argument "type + instance name" form
    /// and a one-argument bare form; either way the first name is the ship
    /// type being referenced.
    pub fn intercept_mission(&mut self, lines: &[Line], at: usize) -> usize {
        let end = skip_block(lines, at);
        let Some(base) = body_depth(lines, at, end) else {
            return end;
        };

        let mut i = at + 1;
        while i < end {
            let line = &lines[i];
            if line.class != LineClass::Content || line.depth != base {
                i += 1;
                continue;
            }
            if line.text == "npc" || line.text.starts_with("npc ") {
                i = self.intercept_npc(lines, i);
            } else {
                i = skip_block(lines, i);
            }
        }
        end
    }

    fn intercept_npc(&mut self, lines: &[Line], at: usize) -> usize {
        let end = skip_block(lines, at);
        let Some(base) = body_depth(lines, at, end) else {
            return end;
        };

        let mut government = None;
        let mut ships: Vec<String> = Vec::new();

        let mut i = at + 1;
        while i < end {
            let line = &lines[i];
            if line.class != LineClass::Content || line.depth != base {
                i += 1;
                continue;
            }
            if let Some(rest) = line.text.strip_prefix("government ") {
                government = header_names(rest).into_iter().next();
                i += 1;
            } else if let Some(rest) = line.text.strip_prefix("ship ") {
                if let Some(name) = header_names(rest).into_iter().next() {
                    ships.push(name);
                }
                // A full embedded instance may follow; its body is noise
                // for inference.
                i = skip_block(lines, i);
            } else if line.text == "fleet" || line.text.starts_with("fleet ") {
                // Inline fleet instance inside the npc.
                i = self.intercept_fleet_with_government(lines, i, government.clone());
            } else {
                i = skip_block(lines, i);
            }
        }

        for ship in ships {
            self.npcs.push(NpcRef {
                government: government.clone(),
                ship,
            });
        }
        end
    }

    /// Inline `fleet` inside an npc: roster ships inherit the npc's
    /// government when the fleet names none itself.
    fn intercept_fleet_with_government(
        &mut self,
        lines: &[Line],
        at: usize,
        fallback: Option<String>,
    ) -> usize {
        let end = self.intercept_fleet(lines, at);
        if let Some(fleet) = self.fleets.last_mut() {
            if fleet.government.is_none() {
                fleet.government = fallback;
            }
        }
        end
    }

    /// Intercept a `shipyard` block: a named catalog of ship names.
    pub fn intercept_shipyard(&mut self, lines: &[Line], at: usize) -> usize {
        let (name, entries, end) = named_listing(lines, at, "shipyard");
        if let Some(name) = name {
            upsert(&mut self.shipyards, name, entries);
        }
        end
    }

    /// Intercept an `outfitter` block: a named catalog of outfit names.
    pub fn intercept_outfitter(&mut self, lines: &[Line], at: usize) -> usize {
        let (name, entries, end) = named_listing(lines, at, "outfitter");
        if let Some(name) = name {
            upsert(&mut self.outfitters, name, entries);
        }
        end
    }

    /// Intercept a `planet` block: government plus shipyard/outfitter
    /// references.
    pub fn intercept_planet(&mut self, lines: &[Line], at: usize) -> usize {
        let end = skip_block(lines, at);
        let rest = lines[at].text.strip_prefix("planet").unwrap_or("");
        let Some(name) = header_names(rest).into_iter().next() else {
            return end;
        };

        let mut planet = PlanetRef {
            name,
            government: None,
            shipyards: Vec::new(),
            outfitters: Vec::new(),
        };

        let Some(base) = body_depth(lines, at, end) else {
            self.planets.push(planet);
            return end;
        };

        let mut i = at + 1;
        while i < end {
            let line = &lines[i];
            if line.class != LineClass::Content || line.depth != base {
                i += 1;
                continue;
            }
            if let Some(rest) = line.text.strip_prefix("government ") {
                planet.government = header_names(rest).into_iter().next();
            } else if let Some(rest) = line.text.strip_prefix("shipyard ") {
                planet.shipyards.extend(header_names(rest));
            } else if let Some(rest) = line.text.strip_prefix("outfitter ") {
                planet.outfitters.extend(header_names(rest));
            }
            i = skip_block(lines, i);
        }

        self.planets.push(planet);
        end
    }

    /// Shipyard listings, in first-seen order.
    pub fn shipyards(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.shipyards
            .iter()
            .map(|(name, ships)| (name.as_str(), ships.as_slice()))
    }

    /// Outfitter listings, in first-seen order.
    pub fn outfitters(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.outfitters
            .iter()
            .map(|(name, outfits)| (name.as_str(), outfits.as_slice()))
    }

    /// Planet records, in first-seen order.
    pub fn planets(&self) -> impl Iterator<Item = &PlanetRef> {
        self.planets.iter()
    }

    /// Union of governments owning a ship, in first-seen order.
    pub fn governments_for_ship(&self, name: &str) -> Vec<String> {
        let base = variant_base(name);
        let matches = |candidate: &str| {
            candidate == name || base.map_or(false, |b| candidate == b)
        };

        let mut governments: Vec<String> = Vec::new();
        let push = |gov: &Option<String>, out: &mut Vec<String>| {
            if let Some(gov) = gov {
                if !out.iter().any(|g| g == gov) {
                    out.push(gov.clone());
                }
            }
        };

        for fleet in &self.fleets {
            if fleet.ships.iter().any(|s| matches(s)) {
                push(&fleet.government, &mut governments);
            }
        }
        for npc in &self.npcs {
            if matches(&npc.ship) {
                push(&npc.government, &mut governments);
            }
        }
        for (yard, ships) in &self.shipyards {
            if ships.iter().any(|s| matches(s)) {
                for planet in &self.planets {
                    if planet.shipyards.iter().any(|y| y == yard) {
                        push(&planet.government, &mut governments);
                    }
                }
            }
        }

        governments
    }

    /// Union of governments selling or flying an outfit, in first-seen
    /// order: outfitter listings joined through planets, plus every ship
    /// known to carry the outfit, recursively through
    /// [`governments_for_ship`].
    pub fn governments_for_outfit(&self, name: &str) -> Vec<String> {
        let mut governments: Vec<String> = Vec::new();
        let push = |gov: String, out: &mut Vec<String>| {
            if !out.iter().any(|g| g == &gov) {
                out.push(gov);
            }
        };

        for (outfitter, outfits) in &self.outfitters {
            if outfits.iter().any(|o| o == name) {
                for planet in &self.planets {
                    if planet.outfitters.iter().any(|o| o == outfitter) {
                        if let Some(gov) = &planet.government {
                            push(gov.clone(), &mut governments);
                        }
                    }
                }
            }
        }

        for (ship, outfits) in &self.ship_outfits {
            if outfits.iter().any(|o| o == name) {
                for gov in self.governments_for_ship(ship) {
                    push(gov, &mut governments);
                }
            }
        }

        governments
    }

    /// Attachment pass: store each record's government set as an ordered
    /// flag map. Runs after variant resolution so variant names exist.
    pub fn attach_governments(
        &self,
        ships: &mut [Record],
        variants: &mut [Record],
        outfits: &mut [Record],
    ) {
        for ship in ships.iter_mut() {
            let governments = match ship.name() {
                Some(name) => self.governments_for_ship(name),
                None => Vec::new(),
            };
            ship.set("governments", flag_map(governments));
        }

        for variant in variants.iter_mut() {
            // Variant mission references and base fleet references are
            // independent; honor both.
            let mut governments = match variant.name() {
                Some(name) => self.governments_for_ship(name),
                None => Vec::new(),
            };
            if let Some(base) = variant.get("baseShip").and_then(Value::as_str) {
                for gov in self.governments_for_ship(base) {
                    if !governments.iter().any(|g| g == &gov) {
                        governments.push(gov);
                    }
                }
            }
            variant.set("governments", flag_map(governments));
        }

        for outfit in outfits.iter_mut() {
            let governments = match outfit.name() {
                Some(name) => self.governments_for_outfit(name),
                None => Vec::new(),
            };
            outfit.set("governments", flag_map(governments));
        }
    }
}

/// Strip a variant display-name suffix: `"Carrier (Alpha)"` → `"Carrier"`.
fn variant_base(name: &str) -> Option<&str> {
    if !name.ends_with(')') {
        return None;
    }
    let idx = name.find(" (")?;
    Some(&name[..idx])
}

/// Serialize a government set as the flag-map convention consumers expect.
fn flag_map(governments: Vec<String>) -> Value {
    let mut map = Record::new();
    for gov in governments {
        map.set(gov, Value::Bool(true));
    }
    Value::Map(map)
}

/// Depth of the first body line under `at`, if the block has one.
fn body_depth(lines: &[Line], at: usize, end: usize) -> Option<usize> {
    let first = next_content(lines, at + 1)?;
    if first >= end || lines[first].depth <= lines[at].depth {
        return None;
    }
    Some(lines[first].depth)
}

/// Shared shape of shipyard/outfitter blocks: a header name plus one
/// listed name per body line.
fn named_listing(
    lines: &[Line],
    at: usize,
    keyword: &str,
) -> (Option<String>, Vec<String>, usize) {
    let end = skip_block(lines, at);
    let rest = lines[at].text.strip_prefix(keyword).unwrap_or("");
    let name = header_names(rest).into_iter().next();

    let mut entries = Vec::new();
    if let Some(base) = body_depth(lines, at, end) {
        for line in &lines[at + 1..end] {
            if line.class != LineClass::Content || line.depth != base {
                continue;
            }
            if let Some((entry, _)) = tokenize(&line.text) {
                entries.push(entry);
            }
        }
    }
    (name, entries, end)
}

fn upsert(table: &mut Vec<(String, Vec<String>)>, name: String, entries: Vec<String>) {
    match table.iter_mut().find(|(existing, _)| existing == &name) {
        Some((_, listing)) => {
            for entry in entries {
                if !listing.contains(&entry) {
                    listing.push(entry);
                }
            }
        }
        None => table.push((name, entries)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::line::classify_lines;
    use pretty_assertions::assert_eq;

    fn tables_from(source: &str) -> SpeciesTables {
        let mut tables = SpeciesTables::new();
        let lines = classify_lines(source);
        let mut i = 0;
        while i < lines.len() {
            if !lines[i].is_content() || lines[i].depth != 0 {
                i += 1;
                continue;
            }
            let word = lines[i].text.split_whitespace().next().unwrap_or("");
            i = match word {
                "fleet" => tables.intercept_fleet(&lines, i),
                "mission" => tables.intercept_mission(&lines, i),
                "shipyard" => tables.intercept_shipyard(&lines, i),
                "outfitter" => tables.intercept_outfitter(&lines, i),
                "planet" => tables.intercept_planet(&lines, i),
                _ => skip_block(&lines, i),
            };
        }
        tables
    }

    #[test]
    fn test_fleet_roster() {
        let tables = tables_from(
            "fleet \"Small Pirates\"\n\
             \tgovernment \"Pirates\"\n\
             \tnames civilian\n\
             \tvariant 3\n\
             \t\t\"Sparrow\"\n\
             \t\t\"Hawk\" 2\n\
             \tvariant\n\
             \t\t\"Sparrow (Armed)\"",
        );
        assert_eq!(tables.governments_for_ship("Sparrow"), vec!["Pirates"]);
        assert_eq!(tables.governments_for_ship("Hawk"), vec!["Pirates"]);
        // A variant-suffixed roster entry matches itself.
        assert_eq!(
            tables.governments_for_ship("Sparrow (Armed)"),
            vec!["Pirates"]
        );
    }

    #[test]
    fn test_npc_two_argument_form() {
        let tables = tables_from(
            "mission \"Ambush\"\n\
             \tnpc kill\n\
             \t\tgovernment \"Marauders\"\n\
             \t\tship \"Carrier (Alpha)\" \"Vengeance\"\n\
             \t\tship \"Raider\"",
        );
        // Both the full variant name and its stripped base form resolve.
        assert_eq!(
            tables.governments_for_ship("Carrier (Alpha)"),
            vec!["Marauders"]
        );
        assert_eq!(tables.governments_for_ship("Carrier"), vec!["Marauders"]);
        assert_eq!(tables.governments_for_ship("Raider"), vec!["Marauders"]);
    }

    #[test]
    fn test_shipyard_planet_join() {
        let tables = tables_from(
            "shipyard \"Basic Ships\"\n\
             \t\"Sparrow\"\n\
             planet \"Earth\"\n\
             \tgovernment \"Republic\"\n\
             \tshipyard \"Basic Ships\"",
        );
        assert_eq!(tables.governments_for_ship("Sparrow"), vec!["Republic"]);
    }

    #[test]
    fn test_shipyard_without_planet_government() {
        let tables = tables_from(
            "shipyard \"Basic Ships\"\n\
             \t\"Sparrow\"\n\
             planet \"Wayside\"\n\
             \tshipyard \"Basic Ships\"",
        );
        assert!(tables.governments_for_ship("Sparrow").is_empty());
    }

    #[test]
    fn test_government_transitivity() {
        // The cross-table scenario: fleet membership and a shipyard-planet
        // join both contribute, in first-seen order; the outfit inherits
        // through the ship's loadout.
        let mut tables = tables_from(
            "fleet \"Small Pirates\"\n\
             \tgovernment \"Pirates\"\n\
             \tvariant\n\
             \t\t\"Sparrow\"\n\
             shipyard \"Basic Ships\"\n\
             \t\"Sparrow\"\n\
             planet \"Earth\"\n\
             \tgovernment \"Republic\"\n\
             \tshipyard \"Basic Ships\"",
        );
        tables.register_ship_outfits("Sparrow", vec!["Blaster".to_string()]);

        assert_eq!(
            tables.governments_for_ship("Sparrow"),
            vec!["Pirates", "Republic"]
        );
        assert_eq!(
            tables.governments_for_outfit("Blaster"),
            vec!["Pirates", "Republic"]
        );
    }

    #[test]
    fn test_outfitter_planet_join() {
        let tables = tables_from(
            "outfitter \"Basic Outfits\"\n\
             \t\"Blaster\"\n\
             planet \"Earth\"\n\
             \tgovernment \"Republic\"\n\
             \toutfitter \"Basic Outfits\"",
        );
        assert_eq!(tables.governments_for_outfit("Blaster"), vec!["Republic"]);
    }

    #[test]
    fn test_attach_governments_flag_map_order() {
        let mut tables = SpeciesTables::new();
        let lines = classify_lines(
            "fleet \"A\"\n\tgovernment \"Pirates\"\n\tvariant\n\t\t\"Sparrow\"",
        );
        tables.intercept_fleet(&lines, 0);
        let lines = classify_lines(
            "shipyard \"Y\"\n\t\"Sparrow\"\nplanet \"P\"\n\tgovernment \"Republic\"\n\tshipyard \"Y\"",
        );
        tables.intercept_shipyard(&lines, 0);
        tables.intercept_planet(&lines, 2);

        let mut ship = Record::new();
        ship.set("name", Value::str("Sparrow"));
        let mut ships = vec![ship];
        tables.attach_governments(&mut ships, &mut [], &mut []);

        let json = serde_json::to_string(ships[0].get("governments").unwrap()).unwrap();
        assert_eq!(json, r#"{"Pirates":true,"Republic":true}"#);
    }

    #[test]
    fn test_variant_union_of_own_and_base_references() {
        let tables = tables_from(
            "mission \"M\"\n\
             \tnpc\n\
             \t\tgovernment \"Marauders\"\n\
             \t\tship \"Sparrow (Armed)\" \"Instance\"\n\
             fleet \"F\"\n\
             \tgovernment \"Pirates\"\n\
             \tvariant\n\
             \t\t\"Sparrow\"",
        );

        let mut variant = Record::new();
        variant.set("name", Value::str("Sparrow (Armed)"));
        variant.set("baseShip", Value::str("Sparrow"));
        let mut variants = vec![variant];
        tables.attach_governments(&mut [], &mut variants, &mut []);

        let json =
            serde_json::to_string(variants[0].get("governments").unwrap()).unwrap();
        assert_eq!(json, r#"{"Marauders":true,"Pirates":true}"#);
    }

    #[test]
    fn test_reset_clears_tables() {
        let mut tables = tables_from(
            "fleet \"A\"\n\tgovernment \"Pirates\"\n\tvariant\n\t\t\"Sparrow\"",
        );
        assert!(!tables.governments_for_ship("Sparrow").is_empty());
        tables.reset();
        assert!(tables.governments_for_ship("Sparrow").is_empty());
    }

    #[test]
    fn test_variant_base_stripping() {
        assert_eq!(variant_base("Carrier (Alpha)"), Some("Carrier"));
        assert_eq!(variant_base("Carrier"), None);
        assert_eq!(variant_base("Weird)"), None);
    }
}
