//! Hardpoint grammar: ship attachment points.
//!
//! Dedicated productions tried before any other block-parser rule when
//! hardpoint recognition is enabled:
//!
//! ```text
//! engine x y [zoom]
//! reverse engine x y [zoom]
//! steering engine x y [zoom]
//! gun x y
//! turret x y
//! bay <type> x y [position]
//! ```
//!
//! Reverse and steering engines accept a deeper-indented free-text
//! position override line; bays accept a deeper-indented sub-block of
//! arbitrary key-value pairs merged into the bay record. A non-match means
//! "not a hardpoint line" and control returns to the block parser.

use super::line::{next_content, skip_block, Line};
use super::record::{Record, Value};
use super::token::take_quoted;

/// A parsed ship attachment point. Identity is positional: hardpoints form
/// ordered sequences per ship and carry no cross-references.
#[derive(Debug, Clone, PartialEq)]
pub enum Hardpoint {
    Engine {
        x: f64,
        y: f64,
        zoom: Option<f64>,
    },
    ReverseEngine {
        x: f64,
        y: f64,
        zoom: Option<f64>,
        position: Option<String>,
    },
    SteeringEngine {
        x: f64,
        y: f64,
        zoom: Option<f64>,
        position: Option<String>,
    },
    Gun {
        x: f64,
        y: f64,
    },
    Turret {
        x: f64,
        y: f64,
    },
    Bay {
        kind: String,
        x: f64,
        y: f64,
        position: Option<String>,
        extra: Record,
    },
}

/// The ship sequence fields consumers key on, in serialization order.
pub const HARDPOINT_FIELDS: [&str; 6] = [
    "engines",
    "reverseEngines",
    "steeringEngines",
    "guns",
    "turrets",
    "bays",
];

impl Hardpoint {
    /// The ship record field this hardpoint belongs in.
    pub fn field(&self) -> &'static str {
        match self {
            Hardpoint::Engine { .. } => "engines",
            Hardpoint::ReverseEngine { .. } => "reverseEngines",
            Hardpoint::SteeringEngine { .. } => "steeringEngines",
            Hardpoint::Gun { .. } => "guns",
            Hardpoint::Turret { .. } => "turrets",
            Hardpoint::Bay { .. } => "bays",
        }
    }

    /// Convert into the record shape downstream consumers expect.
    pub fn into_value(self) -> Value {
        let mut record = Record::new();
        match self {
            Hardpoint::Engine { x, y, zoom } => {
                record.set("x", Value::Num(x));
                record.set("y", Value::Num(y));
                if let Some(zoom) = zoom {
                    record.set("zoom", Value::Num(zoom));
                }
            }
            Hardpoint::ReverseEngine { x, y, zoom, position }
            | Hardpoint::SteeringEngine { x, y, zoom, position } => {
                record.set("x", Value::Num(x));
                record.set("y", Value::Num(y));
                if let Some(zoom) = zoom {
                    record.set("zoom", Value::Num(zoom));
                }
                if let Some(position) = position {
                    record.set("position", Value::Str(position));
                }
            }
            Hardpoint::Gun { x, y } => {
                record.set("x", Value::Num(x));
                record.set("y", Value::Num(y));
                // Empty equipped-item placeholder.
                record.set("gun", Value::str(""));
            }
            Hardpoint::Turret { x, y } => {
                record.set("x", Value::Num(x));
                record.set("y", Value::Num(y));
                record.set("turret", Value::str(""));
            }
            Hardpoint::Bay {
                kind,
                x,
                y,
                position,
                extra,
            } => {
                record.set("type", Value::Str(kind));
                record.set("x", Value::Num(x));
                record.set("y", Value::Num(y));
                if let Some(position) = position {
                    record.set("position", Value::Str(position));
                }
                for (key, value) in extra.iter() {
                    record.set(key, value.clone());
                }
            }
        }
        Value::Map(record)
    }
}

/// Try the hardpoint grammar on the content line at `at`.
///
/// Returns the hardpoint and the index past everything it consumed
/// (including any deeper position line or bay sub-block), or `None` when
/// the line is not a hardpoint.
pub fn parse_hardpoint(lines: &[Line], at: usize) -> Option<(Hardpoint, usize)> {
    let text = lines[at].text.as_str();

    if let Some(rest) = text.strip_prefix("reverse engine ") {
        let (x, y, zoom) = coords(rest)?;
        let (position, next) = position_override(lines, at);
        return Some((Hardpoint::ReverseEngine { x, y, zoom, position }, next));
    }

    if let Some(rest) = text.strip_prefix("steering engine ") {
        let (x, y, zoom) = coords(rest)?;
        let (position, next) = position_override(lines, at);
        return Some((Hardpoint::SteeringEngine { x, y, zoom, position }, next));
    }

    if let Some(rest) = text.strip_prefix("engine ") {
        let (x, y, zoom) = coords(rest)?;
        return Some((Hardpoint::Engine { x, y, zoom }, at + 1));
    }

    if let Some(rest) = text.strip_prefix("gun ") {
        let (x, y, zoom) = coords(rest)?;
        if zoom.is_some() {
            return None;
        }
        return Some((Hardpoint::Gun { x, y }, at + 1));
    }

    if let Some(rest) = text.strip_prefix("turret ") {
        let (x, y, zoom) = coords(rest)?;
        if zoom.is_some() {
            return None;
        }
        return Some((Hardpoint::Turret { x, y }, at + 1));
    }

    if let Some(rest) = text.strip_prefix("bay ") {
        return parse_bay(lines, at, rest);
    }

    None
}

/// `x y [zoom]`, all floating point. More than three tokens is a non-match.
fn coords(rest: &str) -> Option<(f64, f64, Option<f64>)> {
    let mut parts = rest.split_whitespace();
    let x: f64 = parts.next()?.parse().ok()?;
    let y: f64 = parts.next()?.parse().ok()?;
    let zoom = match parts.next() {
        Some(token) => Some(token.parse().ok()?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((x, y, zoom))
}

/// Optional deeper-indented free-text position line.
fn position_override(lines: &[Line], at: usize) -> (Option<String>, usize) {
    if let Some(next) = next_content(lines, at + 1) {
        if lines[next].depth > lines[at].depth {
            return (Some(lines[next].text.clone()), skip_block(lines, at));
        }
    }
    (None, at + 1)
}

/// `bay <type> x y [position]` with optional deeper key-value sub-block.
fn parse_bay(lines: &[Line], at: usize, rest: &str) -> Option<(Hardpoint, usize)> {
    // Bay type may be quoted ("Drone") or bare (Fighter).
    let (kind, tail) = match take_quoted(rest) {
        Some((kind, tail)) => (kind, tail),
        None => {
            let split = rest.find(char::is_whitespace)?;
            let (kind, tail) = rest.split_at(split);
            (kind.to_string(), tail)
        }
    };

    let mut parts = tail.split_whitespace();
    let x: f64 = parts.next()?.parse().ok()?;
    let y: f64 = parts.next()?.parse().ok()?;
    let position = parts.next().map(str::to_string);
    if parts.next().is_some() {
        return None;
    }

    // Deeper sub-block of arbitrary key-value pairs merged into the bay.
    let mut extra = Record::new();
    let mut next = at + 1;
    if let Some(child) = next_content(lines, at + 1) {
        if lines[child].depth > lines[at].depth {
            let options = super::block::BlockOptions::default();
            let (block, _) = super::block::parse_block(lines, child, &options);
            extra = block;
            next = skip_block(lines, at);
        }
    }

    Some((
        Hardpoint::Bay {
            kind,
            x,
            y,
            position,
            extra,
        },
        next,
    ))
}
