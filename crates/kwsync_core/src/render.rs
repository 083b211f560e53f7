//! Serialize keyword groups as C string literal lines, and read them back.
//!
//! A group renders as one or more lines of the form `INDENT"w1 w2 ... "`. Every word is followed by a space
//! inside the literal so adjacent literals concatenate into one space-separated list. An empty group renders
//! as `INDENTNULL`.

use crate::classify::KeywordGroup;

/// Rendering configuration for keyword literals.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum line length (indent and quotes included) before wrapping
    pub line_length: usize,
    /// Literal used for a slot with no keywords
    pub empty_literal: &'static str,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_length: 120,
            empty_literal: "NULL",
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum line length
    pub fn with_line_length(mut self, length: usize) -> Self {
        self.line_length = length;
        self
    }
}

/// Line layout inferred from the file being rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout<'a> {
    pub indent: &'a str,
    pub newline: &'a str,
}

/// Writer that packs quoted words into lines of bounded width
struct LiteralWriter<'a> {
    output: String,
    line: String,
    layout: &'a Layout<'a>,
    config: &'a RenderConfig,
}

impl<'a> LiteralWriter<'a> {
    fn new(layout: &'a Layout<'a>, config: &'a RenderConfig) -> Self {
        Self {
            output: String::new(),
            line: String::new(),
            layout,
            config,
        }
    }

    /// Width of the current line if `word` were appended: indent + quotes + words with trailing spaces
    fn width_with(&self, word: &str) -> usize {
        self.layout.indent.chars().count() + 2 + self.line.chars().count() + word.chars().count() + 1
    }

    fn push_word(&mut self, word: &str) {
        let escaped = escape(word);
        if !self.line.is_empty() && self.width_with(&escaped) > self.config.line_length {
            self.flush_line();
        }
        self.line.push_str(&escaped);
        self.line.push(' ');
    }

    fn flush_line(&mut self) {
        if self.line.is_empty() {
            return;
        }
        self.output.push_str(self.layout.indent);
        self.output.push('"');
        self.output.push_str(&self.line);
        self.output.push('"');
        self.output.push_str(self.layout.newline);
        self.line.clear();
    }

    fn finish(mut self) -> String {
        self.flush_line();
        self.output
    }
}

fn escape(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for ch in word.chars() {
        if ch == '\\' || ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Render one group as the full text of a slot region (every line newline-terminated).
pub fn render_group(group: &KeywordGroup, layout: &Layout<'_>, config: &RenderConfig) -> String {
    if group.is_empty() {
        return format!("{}{}{}", layout.indent, config.empty_literal, layout.newline);
    }
    let mut writer = LiteralWriter::new(layout, config);
    for word in group.words() {
        writer.push_word(word);
    }
    writer.finish()
}

/// Wrap width a rewritten region should keep, inferred from its current literal lines.
///
/// ## Returns
/// - `line_length` when the region holds no literal line (`NULL` or empty).
/// - the larger of `line_length` and the line's width when it holds a single literal line; no wrapping
///   can be observed there.
/// - otherwise the widest line that holds more than one word, or the narrowest line when every line holds
///   one word. Greedy packing at that width reproduces the region's current layout for the same words.
pub fn wrap_width(region: &str, line_length: usize) -> usize {
    let lines: Vec<(usize, usize)> = region.lines().filter_map(literal_line).collect();
    match lines.as_slice() {
        [] => line_length,
        [(width, _)] => line_length.max(*width),
        _ => lines
            .iter()
            .filter(|(_, words)| *words > 1)
            .map(|(width, _)| *width)
            .max()
            .or_else(|| lines.iter().map(|(width, _)| *width).min())
            .unwrap_or(line_length),
    }
}

/// `(width up to the closing quote, word count)` of a line holding a string literal.
fn literal_line(line: &str) -> Option<(usize, usize)> {
    let open = line.find('"')?;
    let close = line.rfind('"')?;
    if close == open {
        return None;
    }
    let literal = &line[..=close];
    Some((literal.chars().count(), literal_words(literal).len()))
}

/// Collect the words of every string literal in a slot region.
///
/// ## Notes
/// - Text outside double quotes (e.g. `NULL`, commas, comments) is ignored.
/// - `\"` and `\\` escapes are undone; other escapes keep the escaped character.
pub fn literal_words(region: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_literal = false;
    let mut chars = region.chars();

    while let Some(ch) = chars.next() {
        if !in_literal {
            if ch == '"' {
                in_literal = true;
            }
            continue;
        }
        match ch {
            '"' => {
                in_literal = false;
                take_word(&mut current, &mut words);
            }
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() => take_word(&mut current, &mut words),
            c => current.push(c),
        }
    }
    take_word(&mut current, &mut words);
    words
}

fn take_word(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}
