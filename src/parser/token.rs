//! Key-value tokenizer for content lines.
//!
//! Resolves a stripped line to a `(key, value)` pair, or `None` when the
//! line is not a simple pair (the caller then treats it as free text).
//!
//! The cascade below is an ordered contract, not an implementation detail:
//! many inputs are ambiguous across several patterns and first match wins.
//! In order:
//!
//! 1-4. quoted key + quoted value, in all four `"`/`` ` `` combinations
//!      (value is always a String);
//! 5-6. quoted key + bare value (numeric coercion attempted);
//! 7-8. bare key + quoted value (value stays a String - quoting
//!      suppresses coercion);
//! 9.   bare key + bare value, only when neither quote character appears
//!      anywhere in the line (numeric coercion attempted).
//!
//! Failing all pair patterns, a single fully-quoted token or a single bare
//! word becomes a boolean flag: `(key, true)`.

use super::record::Value;

/// Tokenize a stripped content line into a key-value pair.
pub fn tokenize(line: &str) -> Option<(String, Value)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Quoted key: patterns 1-6 plus the quoted-flag form.
    if let Some((key, rest)) = take_quoted(line) {
        if rest.is_empty() {
            // Single fully-quoted token: a flag.
            return Some((key, Value::Bool(true)));
        }
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.trim_start();

        if let Some((value, tail)) = take_quoted(rest) {
            if tail.trim().is_empty() {
                return Some((key, Value::Str(value)));
            }
            return None;
        }

        if !has_quote(rest) {
            return Some((key, coerce(rest)));
        }
        return None;
    }

    // Bare key: patterns 7-9.
    if let Some(split) = line.find(char::is_whitespace) {
        let (key, rest) = line.split_at(split);
        if has_quote(key) {
            return None;
        }
        let rest = rest.trim_start();

        if let Some((value, tail)) = take_quoted(rest) {
            if tail.trim().is_empty() {
                return Some((key.to_string(), Value::Str(value)));
            }
            return None;
        }

        if !has_quote(line) {
            return Some((key.to_string(), coerce(rest)));
        }
        return None;
    }

    // Single bare word with no internal whitespace and no quotes: a flag.
    if !has_quote(line) {
        return Some((line.to_string(), Value::Bool(true)));
    }

    None
}

/// Attempt numeric coercion; fall back to String.
///
/// This is the only place text becomes a number. The leading-character
/// guard keeps words like "infinity" textual even though `f64::from_str`
/// would accept them.
pub fn coerce(text: &str) -> Value {
    let numeric_start = text
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.');

    if numeric_start {
        if let Ok(n) = text.parse::<f64>() {
            if n.is_finite() {
                return Value::Num(n);
            }
        }
    }
    Value::str(text)
}

/// Take a leading quoted token (`"…"` or `` `…` ``).
///
/// Returns the unquoted inner text and the remainder after the closing
/// quote. `None` if the text does not start with a quote or the quote is
/// unterminated.
pub fn take_quoted(text: &str) -> Option<(String, &str)> {
    let quote = text.chars().next()?;
    if quote != '"' && quote != '`' {
        return None;
    }
    let inner = &text[1..];
    let end = inner.find(quote)?;
    Some((inner[..end].to_string(), &inner[end + 1..]))
}

fn has_quote(text: &str) -> bool {
    text.contains('"') || text.contains('`')
}
