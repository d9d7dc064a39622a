//! Parser for the game's indentation-based data-definition language.
//!
//! Blocks nest by indentation depth rather than delimiters, and the same
//! line shape can mean different things depending on accumulated parser
//! state (nested block header, key-value pair, or description
//! continuation). The modules here form a small stack:
//!
//! - [`line`] classifies raw lines (blank / comment / content) and
//!   computes indentation depth;
//! - [`token`] resolves a content line into a typed key-value pair via an
//!   ordered pattern cascade;
//! - [`block`] is the recursive descent engine over classified lines;
//! - [`hardpoint`] recognizes ship attachment-point productions;
//! - [`ship`] and [`outfit`] parse the record kinds, applying per-kind
//!   keep/discard rules.
//!
//! The block parser is total: every line is eventually consumed by some
//! rule and malformed input never raises.

pub mod block;
pub mod hardpoint;
pub mod line;
pub mod outfit;
pub mod record;
pub mod ship;
pub mod token;

pub use block::{parse_block, BlockOptions};
pub use hardpoint::{Hardpoint, HARDPOINT_FIELDS};
pub use line::{classify_lines, Line, LineClass};
pub use record::{Record, Value};
pub use ship::{parse_ship, ShipOutcome, VariantStub};
pub use token::tokenize;

/// Extract the names from a record header line's argument text.
///
/// Names are delimited by double quotes, backticks, or apostrophes; a bare
/// run of non-whitespace is also accepted as a name. An unterminated quote
/// ends extraction.
pub fn header_names(rest: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut text = rest.trim();

    while !text.is_empty() {
        let first = text.chars().next().unwrap();
        if first == '"' || first == '`' || first == '\'' {
            match text[1..].find(first) {
                Some(end) => {
                    names.push(text[1..1 + end].to_string());
                    text = text[2 + end..].trim_start();
                }
                None => break,
            }
        } else {
            let end = text.find(char::is_whitespace).unwrap_or(text.len());
            names.push(text[..end].to_string());
            text = text[end..].trim_start();
        }
    }

    names.retain(|name| !name.is_empty());
    names
}
