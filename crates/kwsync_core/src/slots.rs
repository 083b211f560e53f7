//! Locate and rewrite keyword slots inside generated lexer sources.
//!
//! A slot is the run of whole lines between a begin marker and its end marker:
//!
//! ```text
//! //++Autogenerated NP2LEX_RUST 0
//! "as async await "
//! //--Autogenerated NP2LEX_RUST 0
//! ```
//!
//! Markers are found textually. Whatever precedes the `++Autogenerated` / `--Autogenerated` token on the
//! line (a `//`, indentation) is free, so the scanner never needs to understand the host language. Lines
//! carrying the token but no `LEXER_ID INDEX` pair are other generated sections and are ignored.
//!
//! ## Notes
//! - [`scan_slots`] validates the structure of the whole file; a broken file is never partially rewritten.
//! - [`replace_slots`] only touches bytes inside the addressed regions.

use std::ops::Range;

use miette::Diagnostic;
use thiserror::Error;

use crate::classify::KeywordGroup;
use crate::render::{self, Layout, RenderConfig};

/// Token opening a slot region.
pub const BEGIN_TOKEN: &str = "++Autogenerated";
/// Token closing a slot region.
pub const END_TOKEN: &str = "--Autogenerated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Begin,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker<'a> {
    kind: MarkerKind,
    lexer: &'a str,
    index: usize,
}

/// One located slot region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRegion<'a> {
    pub lexer: &'a str,
    pub index: usize,
    /// Byte range of the lines strictly between the marker lines.
    pub content: Range<usize>,
    /// Leading whitespace of the begin marker line.
    pub indent: &'a str,
    /// 1-based line number of the begin marker.
    pub line: usize,
}

/// Structural problem with the slot markers of a file.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SlotError {
    #[error("slot {lexer} {index} opened on line {line} is never closed")]
    #[diagnostic(code(kwsync::slot::unterminated))]
    Unterminated { lexer: String, index: usize, line: usize },

    #[error("slot {lexer} {index} opened on line {line} contains another begin marker on line {nested_line}")]
    #[diagnostic(code(kwsync::slot::nested))]
    Nested {
        lexer: String,
        index: usize,
        line: usize,
        nested_line: usize,
    },

    #[error("end marker for {lexer} {index} on line {line} has no matching begin marker")]
    #[diagnostic(code(kwsync::slot::unexpected_end))]
    UnexpectedEnd { lexer: String, index: usize, line: usize },

    #[error("end marker on line {line} closes {lexer} {index} but {open_lexer} {open_index} is open")]
    #[diagnostic(code(kwsync::slot::mismatched_end))]
    MismatchedEnd {
        lexer: String,
        index: usize,
        open_lexer: String,
        open_index: usize,
        line: usize,
    },

    #[error("slot {lexer} {index} appears twice (lines {first_line} and {line})")]
    #[diagnostic(code(kwsync::slot::duplicate))]
    Duplicate {
        lexer: String,
        index: usize,
        first_line: usize,
        line: usize,
    },

    #[error("slot {lexer} {index} on line {line} is outside the {capacity}-slot table")]
    #[diagnostic(code(kwsync::slot::index_out_of_range))]
    IndexOutOfRange {
        lexer: String,
        index: usize,
        capacity: usize,
        line: usize,
    },

    #[error("no slot markers for {lexer} {index}")]
    #[diagnostic(
        code(kwsync::marker_not_found),
        help("the generated file and the lexer registry disagree; add the marker pair or fix the registry entry")
    )]
    MarkerNotFound { lexer: String, index: usize },
}

fn parse_marker(line: &str) -> Option<Marker<'_>> {
    let (kind, rest) = if let Some(pos) = line.find(BEGIN_TOKEN) {
        (MarkerKind::Begin, &line[pos + BEGIN_TOKEN.len()..])
    } else if let Some(pos) = line.find(END_TOKEN) {
        (MarkerKind::End, &line[pos + END_TOKEN.len()..])
    } else {
        return None;
    };
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut parts = rest.split_whitespace();
    let lexer = parts.next()?;
    let index = parts.next()?.parse::<usize>().ok()?;
    Some(Marker { kind, lexer, index })
}

fn strip_newline(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start().len();
    &line[..end]
}

/// Newline style of a file: `\r\n` if it contains any, `\n` otherwise.
pub fn newline_style(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Find every slot region in `text`, in file order.
///
/// ## Errors
/// - Any [`SlotError`] other than `MarkerNotFound` when the markers are not properly paired, are
///   duplicated, or address an index `>= capacity`.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn scan_slots(text: &str, capacity: usize) -> Result<Vec<SlotRegion<'_>>, SlotError> {
    let mut regions: Vec<SlotRegion<'_>> = Vec::new();
    // (marker, begin line number, content start, indent)
    let mut open: Option<(Marker<'_>, usize, usize, &str)> = None;
    let mut offset = 0usize;

    for (line_idx, raw) in text.split_inclusive('\n').enumerate() {
        let line_no = line_idx + 1;
        let line_start = offset;
        offset += raw.len();

        let line = strip_newline(raw);
        let Some(marker) = parse_marker(line) else {
            continue;
        };

        match (marker.kind, open.take()) {
            (MarkerKind::Begin, Some((outer, outer_line, _, _))) => {
                return Err(SlotError::Nested {
                    lexer: outer.lexer.to_string(),
                    index: outer.index,
                    line: outer_line,
                    nested_line: line_no,
                });
            }
            (MarkerKind::Begin, None) => {
                if marker.index >= capacity {
                    return Err(SlotError::IndexOutOfRange {
                        lexer: marker.lexer.to_string(),
                        index: marker.index,
                        capacity,
                        line: line_no,
                    });
                }
                if let Some(prev) = regions
                    .iter()
                    .find(|r| r.lexer == marker.lexer && r.index == marker.index)
                {
                    return Err(SlotError::Duplicate {
                        lexer: marker.lexer.to_string(),
                        index: marker.index,
                        first_line: prev.line,
                        line: line_no,
                    });
                }
                open = Some((marker, line_no, offset, leading_whitespace(line)));
            }
            (MarkerKind::End, None) => {
                return Err(SlotError::UnexpectedEnd {
                    lexer: marker.lexer.to_string(),
                    index: marker.index,
                    line: line_no,
                });
            }
            (MarkerKind::End, Some((begin, begin_line, content_start, indent))) => {
                if begin.lexer != marker.lexer || begin.index != marker.index {
                    return Err(SlotError::MismatchedEnd {
                        lexer: marker.lexer.to_string(),
                        index: marker.index,
                        open_lexer: begin.lexer.to_string(),
                        open_index: begin.index,
                        line: line_no,
                    });
                }
                regions.push(SlotRegion {
                    lexer: begin.lexer,
                    index: begin.index,
                    content: content_start..line_start,
                    indent,
                    line: begin_line,
                });
            }
        }
    }

    if let Some((begin, begin_line, _, _)) = open {
        return Err(SlotError::Unterminated {
            lexer: begin.lexer.to_string(),
            index: begin.index,
            line: begin_line,
        });
    }

    Ok(regions)
}

/// Rewrite slots `0..groups.len()` of `lexer` with the given groups.
///
/// ## Parameters
/// - `text`: current file contents.
/// - `lexer`: lexer id spelling used in the markers.
/// - `groups`: one group per generated slot, slot 0 first.
/// - `capacity`: total slot count per lexer (marker indices must stay below it).
/// - `config`: literal rendering settings.
///
/// ## Returns
/// - the rewritten file; identical to `text` when the slots already hold these groups.
///
/// ## Errors
/// - [`SlotError::MarkerNotFound`] when any addressed slot is missing, or a structural [`SlotError`] from
///   [`scan_slots`]. Nothing is rewritten in either case.
pub fn replace_slots(
    text: &str,
    lexer: &str,
    groups: &[KeywordGroup],
    capacity: usize,
    config: &RenderConfig,
) -> Result<String, SlotError> {
    let regions = scan_slots(text, capacity)?;
    let newline = newline_style(text);

    let mut edits: Vec<(Range<usize>, String)> = Vec::with_capacity(groups.len());
    for (index, group) in groups.iter().enumerate() {
        let region = regions
            .iter()
            .find(|r| r.lexer == lexer && r.index == index)
            .ok_or_else(|| SlotError::MarkerNotFound {
                lexer: lexer.to_string(),
                index,
            })?;
        let layout = Layout {
            indent: region.indent,
            newline,
        };
        let current = &text[region.content.clone()];
        let config = config
            .clone()
            .with_line_length(render::wrap_width(current, config.line_length));
        edits.push((region.content.clone(), render::render_group(group, &layout, &config)));
    }
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for (range, rendered) in edits {
        out.push_str(&text[cursor..range.start]);
        out.push_str(&rendered);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Count the slots of `lexer` that hold at least one keyword.
///
/// ## Returns
/// - `Ok(None)` when the file has no slot markers for `lexer` at all.
pub fn populated_count(text: &str, lexer: &str, capacity: usize) -> Result<Option<usize>, SlotError> {
    let regions = scan_slots(text, capacity)?;
    let mut found = false;
    let mut populated = 0usize;
    for region in regions.iter().filter(|r| r.lexer == lexer) {
        found = true;
        if !render::literal_words(&text[region.content.clone()]).is_empty() {
            populated += 1;
        }
    }
    Ok(found.then_some(populated))
}
