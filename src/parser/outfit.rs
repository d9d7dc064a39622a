//! Outfit and effect record parsing.
//!
//! Both use the generic block parser with hardpoints disabled. An outfit
//! is retained only when it has a description; an effect is retained
//! unconditionally (effects frequently lack flavor text).

use super::block::{parse_block, BlockOptions};
use super::header_names;
use super::line::Line;
use super::record::{Record, Value};

/// Parse the `outfit` record whose header is at `at`.
///
/// `None` means a malformed header; the caller advances exactly one line.
pub fn parse_outfit(lines: &[Line], at: usize) -> (Option<Record>, usize) {
    parse_named_record(lines, at, "outfit")
}

/// Parse the `effect` record whose header is at `at`.
pub fn parse_effect(lines: &[Line], at: usize) -> (Option<Record>, usize) {
    parse_named_record(lines, at, "effect")
}

fn parse_named_record(lines: &[Line], at: usize, keyword: &str) -> (Option<Record>, usize) {
    let rest = lines[at]
        .text
        .strip_prefix(keyword)
        .filter(|r| r.is_empty() || r.starts_with(char::is_whitespace))
        .unwrap_or("");

    let names = header_names(rest);
    let Some(name) = names.first() else {
        return (None, at + 1);
    };

    let (body, next) = parse_body(lines, at);
    let mut record = Record::new();
    record.set("name", Value::str(name.clone()));
    for (key, value) in body.iter() {
        if key != "name" {
            record.set(key, value.clone());
        }
    }
    (Some(record), next)
}

/// Parse the indented body below a header line via the generic block
/// parser.
fn parse_body(lines: &[Line], header: usize) -> (Record, usize) {
    let header_depth = lines[header].depth;

    let Some(first) = super::line::next_content(lines, header + 1) else {
        return (Record::new(), lines.len());
    };
    if lines[first].depth <= header_depth {
        return (Record::new(), first);
    }

    parse_block(lines, first, &BlockOptions::default())
}
