//! Pure keyword-table logic for `kwsync`: the lexer registry, keyword classification, slot rewriting and
//! attribute-table synchronization.
//!
//! This crate is intentionally IO-free. Callers hand it file contents as `&str` and get rewritten contents
//! back; reading, writing, logging setup and parser plumbing live in the `kwsync` crate.
//!
//! ## Notes
//! - Every lexer exposes exactly [`TOTAL_SLOT_CAPACITY`] keyword slots. An entry reserves the trailing
//!   `reserved_slots` of them for hand-maintained lists; the leading ones are generated.
//! - All rewrites are idempotent: feeding the output back in with the same keywords yields identical text.
//!
//! ## Examples
//! ```rust
//! use kwsync_core::{classify, render::RenderConfig, slots};
//!
//! let file = "//++Autogenerated NP2LEX_DEMO 0\nNULL\n//--Autogenerated NP2LEX_DEMO 0\n";
//! let groups = classify::classify(vec![vec!["while".into(), "if".into(), "else".into()]], 1).unwrap();
//! let out = slots::replace_slots(file, "NP2LEX_DEMO", &groups, 16, &RenderConfig::default()).unwrap();
//! assert!(out.contains("\"else if while \""));
//! ```

pub mod attributes;
pub mod classify;
pub mod registry;
pub mod render;
pub mod slots;

pub use classify::{ClassifyError, KeywordGroup, ParseOutcome, SkipReason};
pub use registry::{LexerId, ParserKind, RegistryEntry};

/// Number of keyword slots every lexer's generated file provides.
pub const TOTAL_SLOT_CAPACITY: usize = 16;
