//! Recursive block parser.
//!
//! A block is a line plus every line beneath it at strictly greater
//! indentation. `parse_block` walks the line stream at one depth,
//! dispatching each line through an ordered rule list (hardpoints, skip
//! keywords, descriptions, sprite fields, nested blocks, key-value pairs,
//! free text). The final free-text rule makes the parser total: every line
//! is consumed by some rule and malformed input never raises.

use super::hardpoint::parse_hardpoint;
use super::line::{next_content, skip_block, Line, LineClass};
use super::record::{Record, Value};
use super::token::{take_quoted, tokenize};

/// Fields carrying a sprite path with optional animation metadata.
///
/// The deeper-indented sub-block under these keys is stored verbatim under
/// `<key>Data` and passed through opaquely to the animation consumer.
const SPRITE_KEYS: [&str; 5] = [
    "sprite",
    "flare sprite",
    "steering flare sprite",
    "reverse flare sprite",
    "afterburner effect",
];

/// Per-call configuration for [`parse_block`].
#[derive(Debug, Clone, Default)]
pub struct BlockOptions {
    /// Try the hardpoint grammar before other rules. Only the ship-body
    /// pass enables this; child blocks never recognize hardpoints.
    pub hardpoints: bool,
    /// Block headers whose entire sub-block is consumed without being
    /// recorded (fields irrelevant at the current record kind).
    pub skip: Vec<&'static str>,
}

impl BlockOptions {
    pub fn skipping(skip: &[&'static str]) -> Self {
        Self {
            hardpoints: false,
            skip: skip.to_vec(),
        }
    }
}

/// Parse one block starting at `start`, returning the record and the index
/// of the first line past the block.
///
/// The base indent is taken from the first content line at or after
/// `start`; any content line shallower than that terminates the block
/// (never an error). Empty input yields an empty record.
pub fn parse_block(lines: &[Line], start: usize, options: &BlockOptions) -> (Record, usize) {
    let mut record = Record::new();

    let Some(first) = next_content(lines, start) else {
        return (record, lines.len());
    };
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
            // Orphaned deeper line (its parent consumed nothing); skip it
            // rather than stall.
            i += 1;
            continue;
        }

        if options.hardpoints {
            if let Some((hardpoint, next)) = parse_hardpoint(lines, i) {
                let field = hardpoint.field();
                match record.get_mut(field) {
                    Some(Value::Seq(seq)) => seq.push(hardpoint.into_value()),
                    _ => record.set(field, Value::Seq(vec![hardpoint.into_value()])),
                }
                i = next;
                continue;
            }
        }

        if options.skip.iter().any(|&keyword| keyword == line.text) {
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

        // Nothing matched: free text, accumulated as description.
        record.append_text("description", &line.text);
        i += 1;
    }

    (record, i)
}

pub(crate) fn is_description(text: &str) -> bool {
    text == "description"
        || text
            .strip_prefix("description")
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// Description sub-grammar.
///
/// Three forms: single-line fully-quoted; multi-line starting with an
/// opening quote or backtick, joined until a line ending in the matching
/// close character (a sibling line back at `base` depth terminates
/// implicitly); legacy unquoted text terminated purely by indentation.
/// Joined lines concatenate with single spaces, and repeated description
/// fields accumulate.
pub fn parse_description(lines: &[Line], at: usize, base: usize, record: &mut Record) -> usize {
    let rest = lines[at].text["description".len()..].trim_start();

    let open = match rest.chars().next() {
        Some(c @ ('"' | '`')) => c,
        _ => {
            // Legacy unquoted form: the rest of this line plus any deeper
            // continuation lines.
            let mut parts: Vec<&str> = Vec::new();
            if !rest.is_empty() {
                parts.push(rest);
            }
            let mut i = at + 1;
            while i < lines.len() {
                let line = &lines[i];
                if line.class != LineClass::Content {
                    i += 1;
                    continue;
                }
                if line.depth <= base {
                    break;
                }
                parts.push(&line.text);
                i += 1;
            }
            record.append_text("description", &parts.join(" "));
            return i;
        }
    };

    let inner = &rest[1..];
    if !inner.is_empty() && inner.ends_with(open) {
        record.append_text("description", &inner[..inner.len() - 1]);
        return at + 1;
    }

    // Multi-line quoted form.
    let mut parts: Vec<String> = Vec::new();
    if !inner.is_empty() {
        parts.push(inner.to_string());
    }
    let mut i = at + 1;
    while i < lines.len() {
        let line = &lines[i];
        if line.class != LineClass::Content {
            i += 1;
            continue;
        }
        if line.depth < base {
            break;
        }
        if line.text.ends_with(open) {
            parts.push(line.text[..line.text.len() - 1].to_string());
            i += 1;
            break;
        }
        if line.depth == base {
            // Implicit terminator: a sibling field at block depth.
            break;
        }
        parts.push(line.text.clone());
        i += 1;
    }
    record.append_text("description", &parts.join(" "));
    i
}

/// Sprite-bearing field: `<key> <path>` with an optional deeper-indented
/// metadata sub-block stored under `<key>Data`.
pub fn parse_sprite_field(lines: &[Line], at: usize, record: &mut Record) -> Option<usize> {
    let text = lines[at].text.as_str();
    let (key, rest) = SPRITE_KEYS.iter().find_map(|&key| {
        let rest = text.strip_prefix(key)?;
        let rest = rest.strip_prefix(char::is_whitespace)?;
        Some((key, rest.trim_start()))
    })?;
    if rest.is_empty() {
        return None;
    }

    let path = match take_quoted(rest) {
        Some((path, _)) => path,
        None => rest.to_string(),
    };
    record.set(key, Value::Str(path));

    let mut next = at + 1;
    if let Some(child) = next_content(lines, at + 1) {
        if lines[child].depth > lines[at].depth {
            let (data, _) = parse_block(lines, child, &BlockOptions::default());
            record.set(format!("{key}Data"), Value::Map(data));
            next = skip_block(lines, at);
        }
    }
    Some(next)
}

/// Nested-block key: the following content line is deeper, so the current
/// line names a child block. Repeated keys extend an array of blocks.
pub fn parse_nested(lines: &[Line], at: usize, record: &mut Record) -> Option<usize> {
    let child = next_content(lines, at + 1)?;
    if lines[child].depth <= lines[at].depth {
        return None;
    }

    let key = nested_key(&lines[at].text);
    let (block, _) = parse_block(lines, child, &BlockOptions::default());
    record.store(key, Value::Map(block));
    Some(skip_block(lines, at))
}

/// Key for a nested block header: an unquoted single token when the header
/// is one, otherwise the whole stripped line.
fn nested_key(text: &str) -> String {
    match tokenize(text) {
        Some((key, Value::Bool(true))) => key,
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::line::classify_lines;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Record {
        let lines = classify_lines(source);
        parse_block(&lines, 0, &BlockOptions::default()).0
    }

    #[test]
    fn test_empty_input_yields_empty_record() {
        let lines = classify_lines("");
        let (record, next) = parse_block(&lines, 0, &BlockOptions::default());
        assert!(record.is_empty());
        assert_eq!(next, 0);
    }

    #[test]
    fn test_all_blank_and_comment_input() {
        let lines = classify_lines("\n# comment\n\n\t# another\n");
        let (record, next) = parse_block(&lines, 0, &BlockOptions::default());
        assert!(record.is_empty());
        assert!(next <= lines.len());
    }

    #[test]
    fn test_simple_pairs() {
        let record = parse("\"hull\" 600\nshields 1200\ncategory \"Transport\"");
        assert_eq!(record.get("hull"), Some(&Value::Num(600.0)));
        assert_eq!(record.get("shields"), Some(&Value::Num(1200.0)));
        assert_eq!(record.get("category"), Some(&Value::str("Transport")));
    }

    #[test]
    fn test_nested_block() {
        let record = parse("attributes\n\thull 600\n\tdrag 2.5\nmass 80");
        let attrs = record.get("attributes").unwrap().as_map().unwrap();
        assert_eq!(attrs.get("hull"), Some(&Value::Num(600.0)));
        assert_eq!(attrs.get("drag"), Some(&Value::Num(2.5)));
        assert_eq!(record.get("mass"), Some(&Value::Num(80.0)));
    }

    #[test]
    fn test_repeated_nested_blocks_promote_to_array() {
        let record = parse("leak\n\tflame 10\nleak\n\tsparks 20");
        let seq = record.get("leak").unwrap().as_seq().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(
            seq[1].as_map().unwrap().get("sparks"),
            Some(&Value::Num(20.0))
        );
    }

    #[test]
    fn test_description_single_line() {
        let record = parse("description \"A small ship.\"");
        assert_eq!(
            record.get("description"),
            Some(&Value::str("A small ship."))
        );
    }

    #[test]
    fn test_description_multi_line_join() {
        let record = parse("description \"Hello\nworld.\"");
        assert_eq!(record.get("description"), Some(&Value::str("Hello world.")));
    }

    #[test]
    fn test_description_backtick_multi_line() {
        let record = parse("description `One\n\ttwo\n\tthree.`\nmass 10");
        assert_eq!(
            record.get("description"),
            Some(&Value::str("One two three."))
        );
        assert_eq!(record.get("mass"), Some(&Value::Num(10.0)));
    }

    #[test]
    fn test_description_implicit_terminator() {
        // An unterminated quote stops at the next sibling field.
        let record = parse("description \"Hello\nmass 10");
        assert_eq!(record.get("description"), Some(&Value::str("Hello")));
        assert_eq!(record.get("mass"), Some(&Value::Num(10.0)));
    }

    #[test]
    fn test_description_legacy_unquoted() {
        let record = parse("description An old freighter.\n\tStill flies.\nmass 10");
        assert_eq!(
            record.get("description"),
            Some(&Value::str("An old freighter. Still flies."))
        );
    }

    #[test]
    fn test_descriptions_accumulate() {
        let record = parse("description \"First.\"\ndescription \"Second.\"");
        assert_eq!(
            record.get("description"),
            Some(&Value::str("First. Second."))
        );
    }

    #[test]
    fn test_sprite_plain() {
        let record = parse("sprite \"ship/sparrow\"");
        assert_eq!(record.get("sprite"), Some(&Value::str("ship/sparrow")));
        assert!(record.get("spriteData").is_none());
    }

    #[test]
    fn test_sprite_with_metadata() {
        let record = parse("sprite \"ship/flivver\"\n\tframeRate 12\n\trewind\nmass 10");
        assert_eq!(record.get("sprite"), Some(&Value::str("ship/flivver")));
        let data = record.get("spriteData").unwrap().as_map().unwrap();
        assert_eq!(data.get("frameRate"), Some(&Value::Num(12.0)));
        assert_eq!(data.get("rewind"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_flare_sprite_data_key() {
        let record = parse("flare sprite \"effect/ion flare\"\n\tframeRate 30");
        assert_eq!(
            record.get("flare sprite"),
            Some(&Value::str("effect/ion flare"))
        );
        assert!(record.get("flare spriteData").is_some());
    }

    #[test]
    fn test_skip_keyword_consumes_subblock() {
        let options = BlockOptions::skipping(&["add attributes"]);
        let lines = classify_lines("add attributes\n\thull 100\nmass 10");
        let (record, _) = parse_block(&lines, 0, &options);
        assert!(record.get("add attributes").is_none());
        assert!(record.get("hull").is_none());
        assert_eq!(record.get("mass"), Some(&Value::Num(10.0)));
    }

    #[test]
    fn test_hardpoints_disabled_by_default() {
        let record = parse("gun 0 -20");
        // Without hardpoint recognition this is an ordinary pair.
        assert!(record.get("guns").is_none());
        assert_eq!(record.get("gun"), Some(&Value::str("0 -20")));
    }

    #[test]
    fn test_hardpoints_enabled() {
        let options = BlockOptions {
            hardpoints: true,
            ..Default::default()
        };
        let lines = classify_lines("gun 0 -20\ngun 5 -20\nengine 0 40");
        let (record, _) = parse_block(&lines, 0, &options);
        assert_eq!(record.get("guns").unwrap().as_seq().unwrap().len(), 2);
        assert_eq!(record.get("engines").unwrap().as_seq().unwrap().len(), 1);
    }

    #[test]
    fn test_free_text_fallback() {
        // A line with a stray quote matches no pair pattern; it becomes
        // description text and the parser keeps moving.
        let record = parse("this has a stray \" quote\nmass 10");
        assert_eq!(
            record.get("description"),
            Some(&Value::str("this has a stray \" quote"))
        );
        assert_eq!(record.get("mass"), Some(&Value::Num(10.0)));
    }

    #[test]
    fn test_shallower_line_terminates() {
        let lines = classify_lines("\tfirst 1\n\tsecond 2\nship \"Next\"");
        let (record, next) = parse_block(&lines, 0, &BlockOptions::default());
        assert_eq!(record.len(), 2);
        assert_eq!(next, 2);
    }

    #[test]
    fn test_totality_on_hostile_input() {
        let source = "\"\n```\n\t\t\tdeep orphan 1\nkey value\n\tchild\n";
        let lines = classify_lines(source);
        let (_, next) = parse_block(&lines, 0, &BlockOptions::default());
        assert!(next <= lines.len());
    }

    #[test]
    fn test_idempotent_parse() {
        let source = "sprite \"a\"\nattributes\n\thull 600\ndescription \"Hi.\"";
        let first = parse(source);
        let second = parse(source);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
