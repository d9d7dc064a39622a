//! Line classification and indentation depth.
//!
//! The data format nests blocks by indentation rather than delimiters: a
//! block is a line plus every following line at strictly greater depth.
//! Depth is the count of leading tab characters. Blank and comment lines
//! are invisible to all depth comparisons - they neither open nor close
//! blocks.

/// Classification of a raw source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Empty or whitespace-only.
    Blank,
    /// First non-whitespace character is `#`.
    Comment,
    /// Anything else.
    Content,
}

/// A classified source line: indentation depth plus trimmed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Count of leading tab characters.
    pub depth: usize,
    /// The line with leading/trailing whitespace removed.
    pub text: String,
    pub class: LineClass,
}

impl Line {
    /// Classify a raw line from a source file.
    pub fn classify(raw: &str) -> Self {
        let depth = raw.chars().take_while(|&c| c == '\t').count();
        let text = raw.trim();

        let class = if text.is_empty() {
            LineClass::Blank
        } else if text.starts_with('#') {
            LineClass::Comment
        } else {
            LineClass::Content
        };

        Self {
            depth,
            text: text.to_string(),
            class,
        }
    }

    /// Whether this line participates in block structure.
    pub fn is_content(&self) -> bool {
        self.class == LineClass::Content
    }
}

/// Classify every line of a source file.
pub fn classify_lines(source: &str) -> Vec<Line> {
    source.lines().map(Line::classify).collect()
}

/// Index of the next content line at or after `start`, if any.
pub fn next_content(lines: &[Line], start: usize) -> Option<usize> {
    (start..lines.len()).find(|&i| lines[i].is_content())
}

/// Skip past the indented sub-block of the line at `at`.
///
/// Returns the index of the first content line at depth <= the line's
/// depth (or `lines.len()`). Blank and comment lines inside the block are
/// consumed along with it.
pub fn skip_block(lines: &[Line], at: usize) -> usize {
    let depth = lines[at].depth;
    let mut i = at + 1;
    while i < lines.len() {
        if lines[i].is_content() && lines[i].depth <= depth {
            break;
        }
        i += 1;
    }
    i
}
