//! Ship and ship-variant record parsing.
//!
//! A ship header carries one or two names. Two names mean a variant stub:
//! the body is skipped during the first pass and retained for deferred
//! resolution once every base ship is known. One name means a base ship,
//! parsed with an explicit field-by-field pass (rather than the generic
//! skip-list mechanism) so that `outfits` and `add attributes` sub-blocks
//! are always intercepted regardless of where they appear in the body.

use super::block::{is_description, parse_description, parse_nested, parse_sprite_field};
use super::hardpoint::{parse_hardpoint, HARDPOINT_FIELDS};
use super::line::{next_content, skip_block, Line, LineClass};
use super::record::{Record, Value};
use super::token::tokenize;
use super::header_names;

/// A variant definition awaiting resolution against its base ship.
///
/// Transient: collected during parsing, consumed exactly once by the
/// variant resolver, never serialized. Owns its body lines because the
/// base may live in a different file or data source.
#[derive(Debug, Clone)]
pub struct VariantStub {
    pub base_name: String,
    pub variant_name: String,
    /// The stub's own sub-block, re-parsed during resolution.
    pub body: Vec<Line>,
}

/// Outcome of parsing a `ship` header.
#[derive(Debug)]
pub enum ShipOutcome {
    /// A base ship record (retention rules applied by the caller).
    Ship(Record),
    /// A variant stub for deferred resolution.
    Variant(VariantStub),
    /// No name could be extracted; the record is discarded and the parser
    /// advances exactly one line.
    Malformed,
}

/// Parse the `ship` record whose header is at `at`.
pub fn parse_ship(lines: &[Line], at: usize) -> (ShipOutcome, usize) {
    let rest = lines[at]
        .text
        .strip_prefix("ship")
        .filter(|r| r.is_empty() || r.starts_with(char::is_whitespace))
        .unwrap_or("");
    let names = header_names(rest);

    match names.len() {
        0 => (ShipOutcome::Malformed, at + 1),
        1 => {
            let (record, next) = parse_ship_body(lines, at, &names[0]);
            (ShipOutcome::Ship(record), next)
        }
        _ => {
            let end = skip_block(lines, at);
            let stub = VariantStub {
                base_name: names[0].clone(),
                variant_name: names[1].clone(),
                body: lines[at + 1..end].to_vec(),
            };
            (ShipOutcome::Variant(stub), end)
        }
    }
}

/// Explicit field-by-field pass over a base ship body.
fn parse_ship_body(lines: &[Line], header: usize, name: &str) -> (Record, usize) {
    let mut record = Record::new();
    record.set("name", Value::str(name));

    let header_depth = lines[header].depth;
    let Some(first) = next_content(lines, header + 1) else {
        finish_ship(&mut record);
        return (record, lines.len());
    };
    if lines[first].depth <= header_depth {
        finish_ship(&mut record);
        return (record, first);
    }
    let base = lines[first].depth;

    let mut i = first;
    while i < lines.len() {
        let line = &lines[i];
        if line.class != LineClass::Content {
            i += 1;
            continue;
        }
        if line.depth < base {
            break;
        }
        if line.depth > base {
            i += 1;
            continue;
        }

        if let Some((hardpoint, next)) = parse_hardpoint(lines, i) {
            let field = hardpoint.field();
            match record.get_mut(field) {
                Some(Value::Seq(seq)) => seq.push(hardpoint.into_value()),
                _ => record.set(field, Value::Seq(vec![hardpoint.into_value()])),
            }
            i = next;
            continue;
        }

        if line.text == "outfits" {
            let (outfits, next) = parse_outfit_map(lines, i);
            record.set("outfits", Value::Map(outfits));
            i = next;
            continue;
        }

        if line.text == "add attributes" {
            // Only meaningful as a variant diff; discarded at base level.
            i = skip_block(lines, i);
            continue;
        }

        if is_description(&line.text) {
            i = parse_description(lines, i, base, &mut record);
            continue;
        }

        if let Some(next) = parse_sprite_field(lines, i, &mut record) {
            i = next;
            continue;
        }

        if let Some(next) = parse_nested(lines, i, &mut record) {
            i = next;
            continue;
        }

        if let Some((key, value)) = tokenize(&line.text) {
            record.store(key, value);
            i += 1;
            continue;
        }

        record.append_text("description", &line.text);
        i += 1;
    }

    finish_ship(&mut record);
    (record, i)
}

/// Ensure every hardpoint sequence is present so consumers always see the
/// same shape, even for ships with no attachment points.
fn finish_ship(record: &mut Record) {
    for field in HARDPOINT_FIELDS {
        if !record.contains(field) {
            record.set(field, Value::Seq(Vec::new()));
        }
    }
}

/// Parse an `outfits` sub-block into a name-to-count map.
///
/// Each line names an outfit with an optional integer count; the count
/// defaults to 1 when unspecified.
pub fn parse_outfit_map(lines: &[Line], at: usize) -> (Record, usize) {
    let mut map = Record::new();
    let end = skip_block(lines, at);

    let Some(first) = next_content(lines, at + 1) else {
        return (map, end);
    };
    if first >= end {
        return (map, end);
    }
    let depth = lines[first].depth;

    for line in lines[first..end].iter() {
        if line.class != LineClass::Content || line.depth != depth {
            continue;
        }
        if let Some((name, value)) = tokenize(&line.text) {
            let count = value.as_num().unwrap_or(1.0);
            map.set(name, Value::Num(count));
        }
    }

    (map, end)
}
