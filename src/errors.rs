//! Error types for a synchronization run.
//!
//! Every variant that belongs to a single registry entry carries the lexer id so a report can name the
//! offending lexer. Core errors ride along as diagnostic sources, so `miette` shows their codes and help.

use std::io;
use std::path::PathBuf;

use kwsync_core::attributes::AttrError;
use kwsync_core::registry::RegistryError;
use kwsync_core::slots::SlotError;
use kwsync_core::{ClassifyError, LexerId, ParserKind};
use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort one registry entry, the attribute step, or the whole run.
#[derive(Debug, Error, Diagnostic)]
pub enum SyncError {
    #[error("{lexer}: no parser registered for {kind:?}")]
    #[diagnostic(code(kwsync::parser_unavailable))]
    ParserUnavailable { lexer: LexerId, kind: ParserKind },

    #[error("{lexer}: parser failed: {message}")]
    #[diagnostic(code(kwsync::parser_failed))]
    ParserFailed { lexer: LexerId, message: String },

    #[error("{lexer}: {source}")]
    #[diagnostic(code(kwsync::classify))]
    Classify {
        lexer: LexerId,
        #[source]
        #[diagnostic_source]
        source: ClassifyError,
    },

    #[error("{lexer}: {}: {source}", path.display())]
    #[diagnostic(code(kwsync::slots))]
    Slots {
        lexer: LexerId,
        path: PathBuf,
        #[source]
        #[diagnostic_source]
        source: SlotError,
    },

    #[error("cannot read {}: {source}", path.display())]
    #[diagnostic(code(kwsync::read_failure))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {} (after retry): {source}", path.display())]
    #[diagnostic(
        code(kwsync::write_failure),
        help("another process may hold the file open; close it and run again")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    #[diagnostic(code(kwsync::attributes))]
    Attributes {
        path: PathBuf,
        #[source]
        #[diagnostic_source]
        source: AttrError,
    },

    #[error("invalid lexer registry ({} problem(s))", errors.len())]
    #[diagnostic(code(kwsync::registry))]
    Registry {
        #[related]
        errors: Vec<RegistryError>,
    },

    #[error("unknown lexer {name:?}")]
    #[diagnostic(code(kwsync::unknown_lexer), help("run `kwsync list` to see the registered lexers"))]
    UnknownLexer { name: String },
}

impl SyncError {
    /// Lexer the error belongs to, when it is tied to one registry entry.
    pub fn lexer(&self) -> Option<LexerId> {
        match self {
            SyncError::ParserUnavailable { lexer, .. }
            | SyncError::ParserFailed { lexer, .. }
            | SyncError::Classify { lexer, .. }
            | SyncError::Slots { lexer, .. } => Some(*lexer),
            _ => None,
        }
    }
}

/// Result type for a synchronization run.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_lexer() {
        let err = SyncError::Classify {
            lexer: LexerId::new("NP2LEX_RUST"),
            source: ClassifyError::CapacityViolation {
                produced: 17,
                capacity: 16,
            },
        };
        assert_eq!(
            err.to_string(),
            "NP2LEX_RUST: parser produced 17 keyword groups but only 16 slots are generated"
        );
        assert_eq!(err.lexer(), Some(LexerId::new("NP2LEX_RUST")));
    }

    #[test]
    fn test_slot_error_mentions_path() {
        let err = SyncError::Slots {
            lexer: LexerId::new("NP2LEX_GO"),
            path: PathBuf::from("out/stlGO.c"),
            source: SlotError::MarkerNotFound {
                lexer: "NP2LEX_GO".to_string(),
                index: 3,
            },
        };
        assert_eq!(err.to_string(), "NP2LEX_GO: out/stlGO.c: no slot markers for NP2LEX_GO 3");
    }

    #[test]
    fn test_write_error_has_no_lexer() {
        let err = SyncError::Write {
            path: PathBuf::from("x.c"),
            source: io::Error::other("busy"),
        };
        assert!(err.lexer().is_none());
        assert!(err.to_string().contains("after retry"));
    }
}
