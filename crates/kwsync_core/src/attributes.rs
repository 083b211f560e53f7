//! Keep the global keyword-attribute table in step with the generated lexer files.
//!
//! The style table holds one generated region:
//!
//! ```text
//! //++Autogenerated keyword-attributes
//! 	{ NP2LEX_RUST, 3 },
//! 	{ NP2LEX_SQL, 7 },
//! //--Autogenerated keyword-attributes
//! ```
//!
//! Each row records how many keyword slots of a lexer are populated. [`synchronize`] is a pure function of
//! the current table text and the freshly computed counts: rows whose count is unchanged keep their exact
//! bytes, changed rows are rewritten in place, lexers without a row are appended, and rows for lexers the
//! caller did not mention are left alone.

use std::collections::HashSet;
use std::ops::Range;

use miette::Diagnostic;
use thiserror::Error;

use crate::slots::newline_style;

/// Token opening the attribute region.
pub const TABLE_BEGIN: &str = "++Autogenerated keyword-attributes";
/// Token closing the attribute region.
pub const TABLE_END: &str = "--Autogenerated keyword-attributes";

/// One parsed `{ LEXER, COUNT },` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow<'a> {
    pub lexer: &'a str,
    pub count: usize,
    /// 1-based line number.
    pub line: usize,
    /// Byte range of the row line, newline excluded.
    span: Range<usize>,
    indent: &'a str,
    /// Trailing `//` or `/*` comment, kept when the row is rewritten.
    comment: &'a str,
}

/// The attribute region of a style table.
#[derive(Debug, Clone)]
pub struct AttributeTable<'a> {
    pub rows: Vec<AttributeRow<'a>>,
    /// Byte offset of the end marker line; new rows are inserted here.
    insert_at: usize,
    /// Indentation for appended rows.
    row_indent: String,
}

impl AttributeTable<'_> {
    pub fn count(&self, lexer: &str) -> Option<usize> {
        self.rows.iter().find(|r| r.lexer == lexer).map(|r| r.count)
    }
}

/// Structural problem with the attribute region.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum AttrError {
    #[error("style table has no keyword-attributes region")]
    #[diagnostic(
        code(kwsync::attr::missing_region),
        help("add `//++Autogenerated keyword-attributes` and `//--Autogenerated keyword-attributes` lines")
    )]
    MissingRegion,

    #[error("attribute region opened on line {line} is never closed")]
    #[diagnostic(code(kwsync::attr::unterminated))]
    Unterminated { line: usize },

    #[error("malformed attribute row on line {line}: {text:?}")]
    #[diagnostic(code(kwsync::attr::malformed_row), help("rows look like `{{ NP2LEX_RUST, 3 }},`"))]
    MalformedRow { line: usize, text: String },

    #[error("{lexer} has two attribute rows (lines {first_line} and {line})")]
    #[diagnostic(code(kwsync::attr::duplicate_row))]
    DuplicateRow {
        lexer: String,
        first_line: usize,
        line: usize,
    },
}

/// A row whose count was written or created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrChange {
    pub lexer: String,
    pub old: Option<usize>,
    pub new: usize,
}

/// Result of [`synchronize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSync {
    pub text: String,
    pub changes: Vec<AttrChange>,
}

/// Split a row into `(lexer, count, trailing comment)`.
fn parse_row(line: &str) -> Option<(&str, usize, &str)> {
    let body = line.trim().strip_prefix('{')?;
    let close = body.find('}')?;
    let tail = body[close + 1..].trim_start();
    let comment = tail.strip_prefix(',').unwrap_or(tail).trim();
    if !comment.is_empty() && !comment.starts_with("//") && !comment.starts_with("/*") {
        return None;
    }
    let mut fields = body[..close].split(',');
    let lexer = fields.next()?.trim();
    let count = fields.next()?.trim().parse::<usize>().ok()?;
    if fields.next().is_some() || lexer.is_empty() || lexer.contains(char::is_whitespace) {
        return None;
    }
    Some((lexer, count, comment))
}

/// Parse the attribute region of a style table.
pub fn parse_table(text: &str) -> Result<AttributeTable<'_>, AttrError> {
    let mut begin: Option<(usize, &str)> = None;
    let mut rows: Vec<AttributeRow<'_>> = Vec::new();
    let mut offset = 0usize;

    for (line_idx, raw) in text.split_inclusive('\n').enumerate() {
        let line_no = line_idx + 1;
        let line_start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\r', '\n']);

        let Some((_, begin_indent)) = begin else {
            if line.contains(TABLE_BEGIN) {
                let indent = &line[..line.len() - line.trim_start().len()];
                begin = Some((line_no, indent));
            }
            continue;
        };

        if line.contains(TABLE_END) {
            let row_indent = rows
                .first()
                .map(|r| r.indent.to_string())
                .unwrap_or_else(|| format!("{begin_indent}\t"));
            return Ok(AttributeTable {
                rows,
                insert_at: line_start,
                row_indent,
            });
        }

        if !line.trim_start().starts_with('{') {
            continue;
        }
        let Some((lexer, count, comment)) = parse_row(line) else {
            return Err(AttrError::MalformedRow {
                line: line_no,
                text: line.to_string(),
            });
        };
        if let Some(prev) = rows.iter().find(|r| r.lexer == lexer) {
            return Err(AttrError::DuplicateRow {
                lexer: lexer.to_string(),
                first_line: prev.line,
                line: line_no,
            });
        }
        rows.push(AttributeRow {
            lexer,
            count,
            line: line_no,
            span: line_start..line_start + line.len(),
            indent: &line[..line.len() - line.trim_start().len()],
            comment,
        });
    }

    match begin {
        Some((line, _)) => Err(AttrError::Unterminated { line }),
        None => Err(AttrError::MissingRegion),
    }
}

fn render_row(indent: &str, lexer: &str, count: usize) -> String {
    format!("{indent}{{ {lexer}, {count} }},")
}

/// Rewrite the attribute region so every lexer in `counts` carries its count.
///
/// ## Parameters
/// - `text`: current style table contents.
/// - `counts`: `(lexer, populated slot count)` pairs, in the order new rows should be appended. Later
///   duplicates of a lexer are ignored.
///
/// ## Returns
/// - the new text (identical to `text` when nothing changed) and the rows that were written.
pub fn synchronize(text: &str, counts: &[(&str, usize)]) -> Result<AttrSync, AttrError> {
    let table = parse_table(text)?;
    let newline = newline_style(text);

    let mut seen = HashSet::new();
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut changes = Vec::new();

    for &(lexer, count) in counts {
        if !seen.insert(lexer) {
            continue;
        }
        match table.rows.iter().find(|r| r.lexer == lexer) {
            Some(row) if row.count == count => {}
            Some(row) => {
                let mut rewritten = render_row(row.indent, lexer, count);
                if !row.comment.is_empty() {
                    rewritten.push(' ');
                    rewritten.push_str(row.comment);
                }
                edits.push((row.span.clone(), rewritten));
                changes.push(AttrChange {
                    lexer: lexer.to_string(),
                    old: Some(row.count),
                    new: count,
                });
            }
            None => {
                let mut line = render_row(&table.row_indent, lexer, count);
                line.push_str(newline);
                edits.push((table.insert_at..table.insert_at, line));
                changes.push(AttrChange {
                    lexer: lexer.to_string(),
                    old: None,
                    new: count,
                });
            }
        }
    }

    // Stable: appended rows keep `counts` order.
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(text.len() + edits.len() * 32);
    let mut cursor = 0usize;
    for (range, replacement) in edits {
        out.push_str(&text[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);

    Ok(AttrSync { text: out, changes })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "static const Attr attrs[] = {\n\
                         //++Autogenerated keyword-attributes\n\
                         \t{ NP2LEX_A, 2 },\n\
                         \t// manual lexers\n\
                         \t{ NP2LEX_MANUAL, 4 },\n\
                         \t{ NP2LEX_B, 1 },\n\
                         //--Autogenerated keyword-attributes\n\
                         };\n";

    #[test]
    fn test_parse_row() {
        assert_eq!(parse_row("\t{ NP2LEX_A, 2 },"), Some(("NP2LEX_A", 2, "")));
        assert_eq!(parse_row("{X,0}"), Some(("X", 0, "")));
        assert_eq!(parse_row("{ X, two },"), None);
        assert_eq!(parse_row("{ X, 1, 2 },"), None);
        assert_eq!(parse_row("{ X, 1 }, junk"), None);
        assert_eq!(parse_row("{ , 1 },"), None);
    }

    #[test]
    fn test_parse_row_with_trailing_comment() {
        assert_eq!(parse_row("\t{ NP2LEX_X, 3 }, // note"), Some(("NP2LEX_X", 3, "// note")));
        assert_eq!(parse_row("{ NP2LEX_X, 3 } /* old */"), Some(("NP2LEX_X", 3, "/* old */")));
        assert_eq!(parse_row("{ X, 1 }, junk // note"), None);
    }

    #[test]
    fn test_rewrite_keeps_row_comment() {
        let text = "//++Autogenerated keyword-attributes\n\t{ NP2LEX_X, 3 }, // note\n//--Autogenerated keyword-attributes\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.count("NP2LEX_X"), Some(3));

        let sync = synchronize(text, &[("NP2LEX_X", 3)]).unwrap();
        assert_eq!(sync.text, text);

        let sync = synchronize(text, &[("NP2LEX_X", 5)]).unwrap();
        assert_eq!(sync.text, text.replace("{ NP2LEX_X, 3 }", "{ NP2LEX_X, 5 }"));
    }

    #[test]
    fn test_parse_table() {
        let table = parse_table(TABLE).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.count("NP2LEX_A"), Some(2));
        assert_eq!(table.count("NP2LEX_MANUAL"), Some(4));
        assert_eq!(table.rows[2].line, 6);
        assert_eq!(table.row_indent, "\t");
    }

    #[test]
    fn test_unchanged_is_identity() {
        let sync = synchronize(TABLE, &[("NP2LEX_A", 2), ("NP2LEX_B", 1)]).unwrap();
        assert_eq!(sync.text, TABLE);
        assert!(sync.changes.is_empty());
    }

    #[test]
    fn test_changed_row_only() {
        let sync = synchronize(TABLE, &[("NP2LEX_A", 3), ("NP2LEX_B", 1)]).unwrap();
        assert_eq!(sync.text, TABLE.replace("{ NP2LEX_A, 2 }", "{ NP2LEX_A, 3 }"));
        assert_eq!(
            sync.changes,
            vec![AttrChange {
                lexer: "NP2LEX_A".to_string(),
                old: Some(2),
                new: 3
            }]
        );
    }

    #[test]
    fn test_appends_missing_rows_in_order() {
        let sync = synchronize(TABLE, &[("NP2LEX_C", 5), ("NP2LEX_D", 0)]).unwrap();
        assert!(sync.text.contains(
            "\t{ NP2LEX_B, 1 },\n\t{ NP2LEX_C, 5 },\n\t{ NP2LEX_D, 0 },\n//--Autogenerated keyword-attributes\n"
        ));
        // rows the caller did not mention survive
        assert!(sync.text.contains("\t{ NP2LEX_MANUAL, 4 },\n"));
    }

    #[test]
    fn test_duplicate_counts_first_wins() {
        let sync = synchronize(TABLE, &[("NP2LEX_A", 2), ("NP2LEX_A", 9)]).unwrap();
        assert!(sync.changes.is_empty());
    }

    #[test]
    fn test_empty_region_uses_marker_indent() {
        let text = "  //++Autogenerated keyword-attributes\r\n  //--Autogenerated keyword-attributes\r\n";
        let sync = synchronize(text, &[("X", 1)]).unwrap();
        assert_eq!(
            sync.text,
            "  //++Autogenerated keyword-attributes\r\n  \t{ X, 1 },\r\n  //--Autogenerated keyword-attributes\r\n"
        );
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(parse_table("nothing here\n").unwrap_err(), AttrError::MissingRegion);
        assert_eq!(
            parse_table("x\n//++Autogenerated keyword-attributes\n{ A, 1 },\n").unwrap_err(),
            AttrError::Unterminated { line: 2 }
        );
        assert!(matches!(
            parse_table("//++Autogenerated keyword-attributes\n{ A 1 }\n//--Autogenerated keyword-attributes\n"),
            Err(AttrError::MalformedRow { line: 2, .. })
        ));
        assert!(matches!(
            parse_table(
                "//++Autogenerated keyword-attributes\n{ A, 1 },\n{ A, 2 },\n//--Autogenerated keyword-attributes\n"
            ),
            Err(AttrError::DuplicateRow {
                first_line: 2,
                line: 3,
                ..
            })
        ));
    }
}
