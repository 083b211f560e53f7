#![forbid(unsafe_code)]
//! kwsync: regenerate an editor's lexer keyword tables from per-language reference files
//!
//! Each registered lexer owns a generated C source with sixteen keyword slots delimited by
//! `++Autogenerated` / `--Autogenerated` marker comments. This crate reads the lexer's reference files,
//! classifies the identifiers into groups, rewrites the generated slots in place and finally updates the
//! style table's per-lexer keyword-attribute counts. The pure text logic lives in `kwsync_core`; this crate
//! adds file IO, parsers, the run engine and the command line.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fsio;
pub mod parsers;

pub use config::SyncConfig;
pub use engine::{Engine, EntryOutcome, RunReport};
pub use errors::{SyncError, SyncResult};
pub use parsers::{KeywordParser, ManifestParser, ParserTable};
