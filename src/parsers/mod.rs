//! Format parsers: turn a lexer's reference files into raw keyword groups.
//!
//! Registry rows name their format with a [`ParserKind`] tag. A [`ParserTable`] resolves tags to
//! [`KeywordParser`] implementations, so format-specific parsers can be swapped in without touching the
//! registry or the engine.
//!
//! ## Notes
//! - Parsers report "nothing to do" as [`ParseOutcome::NoUpdate`]; that is a normal skip, not an error.
//! - [`ParserTable::builtin`] wires the [`ManifestParser`] for every tag.

mod manifest;

use std::collections::HashMap;
use std::path::PathBuf;

use kwsync_core::{ParseOutcome, ParserKind};

pub use manifest::{ManifestGroup, ManifestParser};

/// A reference-file parser.
pub trait KeywordParser {
    /// Parse the given reference files, in order, into keyword groups.
    ///
    /// Must be deterministic for identical inputs.
    fn parse(&self, paths: &[PathBuf]) -> ParseOutcome;
}

/// Lookup from parser tag to parser implementation.
#[derive(Default)]
pub struct ParserTable {
    parsers: HashMap<ParserKind, Box<dyn KeywordParser>>,
}

impl ParserTable {
    /// An empty table; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// A manifest parser for every tag, using each language's comment leader.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for &kind in ParserKind::ALL {
            table.register(kind, ManifestParser::new(kind.comment_leader()));
        }
        table
    }

    /// Register (or replace) the parser for `kind`.
    pub fn register(&mut self, kind: ParserKind, parser: impl KeywordParser + 'static) {
        self.parsers.insert(kind, Box::new(parser));
    }

    pub fn get(&self, kind: ParserKind) -> Option<&dyn KeywordParser> {
        self.parsers.get(&kind).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
