//! Deferred variant resolution.
//!
//! Variant stubs collected during the parse pass are resolved here after
//! the global barrier, since a stub may name a base ship defined in a
//! later file or another data source. Each stub deep-copies its base,
//! re-parses its own line range as an overlay, and survives only when it
//! both carries a description and differs from the base in a tracked
//! field. Structurally identical survivors collapse to the first one.

use crate::parser::block::{parse_block, BlockOptions};
use crate::parser::hardpoint::HARDPOINT_FIELDS;
use crate::parser::line::{next_content, skip_block, LineClass};
use crate::parser::record::{Record, Value};
use crate::parser::ship::{parse_outfit_map, VariantStub};

/// Resolve every pending stub against the full base-ship pool.
///
/// Returns the retained variant records in stub order plus warnings for
/// stubs whose base ship does not exist. Never fails: a bad stub is
/// dropped, not fatal.
pub fn resolve_variants(
    stubs: Vec<VariantStub>,
    ships: &[Record],
) -> (Vec<Record>, Vec<String>) {
    let mut variants: Vec<Record> = Vec::new();
    let mut warnings = Vec::new();

    for stub in stubs {
        let full_name = format!("{} ({})", stub.base_name, stub.variant_name);
        let Some(base) = ships
            .iter()
            .find(|ship| ship.name() == Some(stub.base_name.as_str()))
        else {
            warnings.push(format!(
                "variant `{full_name}` references unknown base ship `{}`",
                stub.base_name
            ));
            continue;
        };

        if let Some(resolved) = resolve_stub(&stub, base, &full_name) {
            if !variants.iter().any(|kept| is_duplicate(kept, &resolved)) {
                variants.push(resolved);
            }
        }
    }

    (variants, warnings)
}

/// Apply one stub's overlay to a copy of its base. `None` means the
/// variant had no description or no tracked difference.
fn resolve_stub(stub: &VariantStub, base: &Record, full_name: &str) -> Option<Record> {
    let mut resolved = base.clone();
    resolved.set("name", Value::str(full_name));
    resolved.set("baseShip", Value::str(&stub.base_name));

    let mut changed = false;

    // Explicit pass: `outfits` and `add attributes` are intercepted
    // wherever they appear, exactly as in the base-ship parser.
    let mut i = 0;
    while i < stub.body.len() {
        let line = &stub.body[i];
        if line.class != LineClass::Content {
            i += 1;
            continue;
        }
        if line.text == "outfits" {
            let (map, next) = parse_outfit_map(&stub.body, i);
            if base.get("outfits") != Some(&Value::Map(map.clone())) {
                resolved.set("outfits", Value::Map(map));
                changed = true;
            }
            i = next;
        } else if line.text == "add attributes" {
            let end = skip_block(&stub.body, i);
            if let Some(child) = next_content(&stub.body, i + 1) {
                if child < end && stub.body[child].depth > line.depth {
                    let (adds, _) = parse_block(&stub.body, child, &BlockOptions::default());
                    if !adds.is_empty() {
                        merge_attributes(&mut resolved, &adds);
                        changed = true;
                    }
                }
            }
            i = end;
        } else {
            i += 1;
        }
    }

    // Generic pass over everything else.
    let options = BlockOptions {
        hardpoints: true,
        skip: vec!["outfits", "add attributes"],
    };
    let (overlay, _) = parse_block(&stub.body, 0, &options);

    for (key, value) in overlay.iter() {
        match key {
            "name" => {}
            "display name" => {
                resolved.set(key, value.clone());
                changed = true;
            }
            "description" => {
                resolved.set(key, value.clone());
            }
            key if HARDPOINT_FIELDS.contains(&key) => {
                // A respecified sequence replaces the base wholesale.
                if value.as_seq().is_some_and(|seq| !seq.is_empty()) {
                    if base.get(key) != Some(value) {
                        changed = true;
                    }
                    resolved.set(key, value.clone());
                }
            }
            _ => {
                if base.get(key) != Some(value) {
                    resolved.set(key, value.clone());
                    changed = true;
                }
            }
        }
    }

    if changed && resolved.has_description() {
        Some(resolved)
    } else {
        None
    }
}

/// Numeric `add attributes` values sum into the copied attribute map;
/// non-numeric values replace.
fn merge_attributes(resolved: &mut Record, adds: &Record) {
    if !matches!(resolved.get("attributes"), Some(Value::Map(_))) {
        resolved.set("attributes", Value::Map(Record::new()));
    }
    let Some(Value::Map(attributes)) = resolved.get_mut("attributes") else {
        return;
    };
    for (key, value) in adds.iter() {
        let current = attributes.get(key).and_then(Value::as_num);
        match (current, value) {
            (Some(current), Value::Num(delta)) => {
                attributes.set(key, Value::Num(current + delta));
            }
            _ => attributes.set(key, value.clone()),
        }
    }
}

/// Structural identity for the dedup pass: same base, same sprite and
/// thumbnail, same hardpoint positions, same attribute and outfit maps.
/// Display names are deliberately excluded.
fn is_duplicate(kept: &Record, candidate: &Record) -> bool {
    if kept.get("baseShip") != candidate.get("baseShip") {
        return false;
    }
    for key in ["sprite", "thumbnail", "attributes", "outfits"] {
        if kept.get(key) != candidate.get(key) {
            return false;
        }
    }
    HARDPOINT_FIELDS
        .iter()
        .all(|&field| positions(kept.get(field)) == positions(candidate.get(field)))
}

fn positions(value: Option<&Value>) -> Vec<(f64, f64)> {
    let Some(seq) = value.and_then(Value::as_seq) else {
        return Vec::new();
    };
    seq.iter()
        .filter_map(|entry| {
            let map = entry.as_map()?;
            Some((map.get("x")?.as_num()?, map.get("y")?.as_num()?))
        })
        .collect()
}
