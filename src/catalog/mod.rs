//! Catalog assembly.
//!
//! The builder consumes data sources one file at a time, dispatching each
//! top-level block to the matching record parser or resolver interceptor,
//! then runs both resolution passes at `finish`. The barrier matters:
//! variants may name bases from a later file or another source, and
//! government inference reads tables populated across the whole corpus.

use crate::parser::line::{classify_lines, skip_block, Line};
use crate::parser::outfit::{parse_effect, parse_outfit};
use crate::parser::record::{Record, Value};
use crate::parser::ship::{parse_ship, ShipOutcome};
use crate::resolve::{ResolverContext, SpeciesTables};

/// One virtual file: path for diagnostics, full text for parsing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

/// An ordered group of files sharing one output name.
#[derive(Debug, Clone)]
pub struct DataSource {
    pub name: String,
    pub display_name: String,
    pub files: Vec<SourceFile>,
}

/// Per-source index entry carried through to the output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceIndex {
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// The fully resolved output collections.
#[derive(Debug)]
pub struct Catalog {
    pub ships: Vec<Record>,
    pub variants: Vec<Record>,
    pub outfits: Vec<Record>,
    pub effects: Vec<Record>,
    pub index: Vec<SourceIndex>,
    pub warnings: Vec<String>,
    /// Reference tables kept for post-build validation.
    pub species: SpeciesTables,
}

impl Catalog {
    pub fn record_count(&self) -> usize {
        self.ships.len() + self.variants.len() + self.outfits.len() + self.effects.len()
    }
}

/// Accumulates parsed records and resolver state across data sources.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    context: ResolverContext,
    ships: Vec<Record>,
    outfits: Vec<Record>,
    effects: Vec<Record>,
    index: Vec<SourceIndex>,
    warnings: Vec<String>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_source(&mut self, source: &DataSource) {
        self.index.push(SourceIndex {
            name: source.name.clone(),
            display_name: source.display_name.clone(),
        });
        for file in &source.files {
            self.parse_file(&file.path, &file.text);
        }
    }

    /// Parse one file's top-level blocks. Total over any text: unknown
    /// and malformed blocks are skipped, never fatal.
    pub fn parse_file(&mut self, path: &str, text: &str) {
        let lines = classify_lines(text);
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            if !line.is_content() || line.depth != 0 {
                i += 1;
                continue;
            }
            i = self.parse_top_level(&lines, i, path);
        }
    }

    fn parse_top_level(&mut self, lines: &[Line], at: usize, path: &str) -> usize {
        let keyword = lines[at].text.split_whitespace().next().unwrap_or("");
        match keyword {
            "ship" => {
                let (outcome, next) = parse_ship(lines, at);
                match outcome {
                    ShipOutcome::Ship(ship) => self.accept_ship(ship),
                    ShipOutcome::Variant(stub) => self.context.defer_variant(stub),
                    ShipOutcome::Malformed => {
                        self.warnings
                            .push(format!("{path}: malformed ship header, block skipped"));
                    }
                }
                next
            }
            "outfit" => {
                let (outfit, next) = parse_outfit(lines, at);
                match outfit {
                    Some(outfit) if outfit.has_description() => self.outfits.push(outfit),
                    Some(_) => {}
                    None => self
                        .warnings
                        .push(format!("{path}: malformed outfit header, block skipped")),
                }
                next
            }
            "effect" => {
                let (effect, next) = parse_effect(lines, at);
                match effect {
                    Some(effect) => self.effects.push(effect),
                    None => self
                        .warnings
                        .push(format!("{path}: malformed effect header, block skipped")),
                }
                next
            }
            "fleet" => self.context.species.intercept_fleet(lines, at),
            "mission" => self.context.species.intercept_mission(lines, at),
            "shipyard" => self.context.species.intercept_shipyard(lines, at),
            "outfitter" => self.context.species.intercept_outfitter(lines, at),
            "planet" => self.context.species.intercept_planet(lines, at),
            _ => skip_block(lines, at),
        }
    }

    fn accept_ship(&mut self, ship: Record) {
        if let Some(name) = ship.name() {
            let loadout: Vec<String> = ship
                .get("outfits")
                .and_then(Value::as_map)
                .map(|map| map.keys().map(str::to_string).collect())
                .unwrap_or_default();
            self.context.species.register_ship_outfits(name, loadout);
        }
        if ship.has_description() {
            self.ships.push(ship);
        }
    }

    /// The resolution barrier: resolve variants, then attach governments.
    pub fn finish(mut self) -> Catalog {
        let (mut variants, variant_warnings) = self.context.resolve_variants(&self.ships);
        self.warnings.extend(variant_warnings);
        self.context
            .attach_governments(&mut self.ships, &mut variants, &mut self.outfits);

        Catalog {
            ships: self.ships,
            variants,
            outfits: self.outfits,
            effects: self.effects,
            index: self.index,
            warnings: self.warnings,
            species: self.context.species,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(files: &[(&str, &str)]) -> Catalog {
        let mut builder = CatalogBuilder::new();
        builder.parse_source(&DataSource {
            name: "test".to_string(),
            display_name: "Test Data".to_string(),
            files: files
                .iter()
                .map(|(path, text)| SourceFile {
                    path: path.to_string(),
                    text: text.to_string(),
                })
                .collect(),
        });
        builder.finish()
    }

    #[test]
    fn test_sparrow_scenario() {
        let catalog = build(&[(
            "ships.txt",
            "ship \"Sparrow\"\n\
             \tsprite \"ship/sparrow\"\n\
             \tdescription \"A small ship.\"\n\
             \tattributes\n\
             \t\t\"hull\" 600\n\
             \tgun 0 -20\n",
        )]);
        assert_eq!(catalog.ships.len(), 1);

        let json = serde_json::to_value(&catalog.ships[0]).unwrap();
        assert_eq!(json["name"], "Sparrow");
        assert_eq!(json["sprite"], "ship/sparrow");
        assert_eq!(json["description"], "A small ship.");
        assert_eq!(json["attributes"]["hull"], 600);
        assert_eq!(
            json["guns"],
            serde_json::json!([{"x": 0, "y": -20, "gun": ""}])
        );
        assert_eq!(json["engines"], serde_json::json!([]));
        assert_eq!(json["turrets"], serde_json::json!([]));
        assert_eq!(json["bays"], serde_json::json!([]));
    }

    #[test]
    fn test_ship_without_description_discarded() {
        let catalog = build(&[("ships.txt", "ship \"Husk\"\n\tsprite \"ship/husk\"\n")]);
        assert!(catalog.ships.is_empty());
    }

    #[test]
    fn test_variant_base_in_later_file() {
        let catalog = build(&[
            (
                "variants.txt",
                "ship \"Sparrow\" \"Armed\"\n\tsprite \"ship/sparrow armed\"\n",
            ),
            (
                "ships.txt",
                "ship \"Sparrow\"\n\
                 \tsprite \"ship/sparrow\"\n\
                 \tdescription \"A small ship.\"\n",
            ),
        ]);
        assert_eq!(catalog.variants.len(), 1);
        assert_eq!(catalog.variants[0].name(), Some("Sparrow (Armed)"));
        assert!(catalog.warnings.is_empty());
    }

    #[test]
    fn test_missing_variant_base_warns() {
        let catalog = build(&[(
            "variants.txt",
            "ship \"Ghost\" \"Armed\"\n\tsprite \"ship/ghost\"\n",
        )]);
        assert!(catalog.variants.is_empty());
        assert_eq!(catalog.warnings.len(), 1);
    }

    #[test]
    fn test_governments_attached_end_to_end() {
        let catalog = build(&[(
            "data.txt",
            "ship \"Sparrow\"\n\
             \tsprite \"ship/sparrow\"\n\
             \tdescription \"A small ship.\"\n\
             \toutfits\n\
             \t\t\"Blaster\"\n\
             outfit \"Blaster\"\n\
             \tdescription \"A basic gun.\"\n\
             fleet \"Raiders\"\n\
             \tgovernment \"Pirates\"\n\
             \tvariant\n\
             \t\t\"Sparrow\"\n\
             planet \"Earth\"\n\
             \tgovernment \"Republic\"\n\
             \tshipyard \"Basics\"\n\
             shipyard \"Basics\"\n\
             \t\"Sparrow\"\n",
        )]);

        let ship = serde_json::to_value(&catalog.ships[0]).unwrap();
        assert_eq!(
            ship["governments"],
            serde_json::json!({"Pirates": true, "Republic": true})
        );
        let outfit = serde_json::to_value(&catalog.outfits[0]).unwrap();
        assert_eq!(
            outfit["governments"],
            serde_json::json!({"Pirates": true, "Republic": true})
        );
    }

    #[test]
    fn test_undescribed_ship_still_registers_loadout() {
        // The ship record is dropped, but its outfit loadout still feeds
        // government inference.
        let catalog = build(&[(
            "data.txt",
            "ship \"Husk\"\n\
             \toutfits\n\
             \t\t\"Blaster\"\n\
             outfit \"Blaster\"\n\
             \tdescription \"A basic gun.\"\n\
             fleet \"Raiders\"\n\
             \tgovernment \"Pirates\"\n\
             \tvariant\n\
             \t\t\"Husk\"\n",
        )]);
        assert!(catalog.ships.is_empty());
        let outfit = serde_json::to_value(&catalog.outfits[0]).unwrap();
        assert_eq!(outfit["governments"], serde_json::json!({"Pirates": true}));
    }

    #[test]
    fn test_effect_kept_without_description() {
        let catalog = build(&[(
            "effects.txt",
            "effect \"spark\"\n\tsprite \"effect/spark\"\n",
        )]);
        assert_eq!(catalog.effects.len(), 1);
    }

    #[test]
    fn test_unknown_blocks_skipped() {
        let catalog = build(&[(
            "data.txt",
            "system \"Sol\"\n\
             \tpos 0 0\n\
             ship \"Sparrow\"\n\
             \tdescription \"A small ship.\"\n",
        )]);
        assert_eq!(catalog.ships.len(), 1);
    }

    #[test]
    fn test_malformed_headers_warn_and_advance() {
        let catalog = build(&[(
            "data.txt",
            "ship\n\
             outfit\n\
             ship \"Sparrow\"\n\
             \tdescription \"A small ship.\"\n",
        )]);
        assert_eq!(catalog.ships.len(), 1);
        assert_eq!(catalog.warnings.len(), 2);
        assert!(catalog.warnings[0].contains("data.txt"));
    }

    #[test]
    fn test_index_entries_in_source_order() {
        let mut builder = CatalogBuilder::new();
        for name in ["base", "expansion"] {
            builder.parse_source(&DataSource {
                name: name.to_string(),
                display_name: name.to_uppercase(),
                files: Vec::new(),
            });
        }
        let catalog = builder.finish();
        assert_eq!(catalog.index.len(), 2);
        assert_eq!(catalog.index[0].name, "base");
        assert_eq!(catalog.index[1].display_name, "EXPANSION");
    }

    #[test]
    fn test_idempotent_builds() {
        let source = "ship \"Sparrow\"\n\
             \tsprite \"ship/sparrow\"\n\
             \tdescription \"A small ship.\"\n\
             \tattributes\n\
             \t\t\"hull\" 600\n";
        let first = build(&[("a.txt", source)]);
        let second = build(&[("a.txt", source)]);
        assert_eq!(
            serde_json::to_string(&first.ships).unwrap(),
            serde_json::to_string(&second.ships).unwrap()
        );
    }
}
