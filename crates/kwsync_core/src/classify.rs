//! Turn raw parser output into the exact set of keyword groups a lexer's slots receive.
//!
//! Parsers report what they found as a [`ParseOutcome`]. [`classify`] takes the groups of a successful parse
//! and the entry's generated-slot budget and produces exactly that many [`KeywordGroup`]s:
//! - missing trailing groups become empty groups, so stale slot content is always overwritten;
//! - more non-empty groups than slots is a [`ClassifyError::CapacityViolation`]; nothing is truncated;
//! - every group is trimmed, deduplicated and sorted, so the rendered output is reproducible.
//!
//! ## Examples
//! ```rust
//! use kwsync_core::classify::classify;
//!
//! let groups = classify(vec![vec!["if".into(), "else".into(), "if".into()]], 3).unwrap();
//! assert_eq!(groups.len(), 3);
//! assert_eq!(groups[0].words(), ["else", "if"]);
//! assert!(groups[1].is_empty() && groups[2].is_empty());
//! ```

use std::collections::BTreeSet;
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Why a parser produced nothing to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A reference file could not be read.
    MissingInput { path: String, reason: String },
    /// The reference files were read but held no identifiers.
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingInput { path, reason } => write!(f, "missing input {path}: {reason}"),
            SkipReason::Empty => write!(f, "no keywords found"),
        }
    }
}

/// Result of running a format parser over an entry's reference files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Leave the entry's output untouched. Not an error.
    NoUpdate(SkipReason),
    /// Ordered keyword groups, one per slot starting at slot 0.
    Groups(Vec<Vec<String>>),
    /// The reference files were readable but malformed.
    Failed(String),
}

impl ParseOutcome {
    /// Wrap parsed groups, downgrading an all-empty result to `NoUpdate(Empty)`.
    pub fn from_groups(groups: Vec<Vec<String>>) -> Self {
        let has_words = groups.iter().flatten().any(|w| !w.trim().is_empty());
        if has_words {
            ParseOutcome::Groups(groups)
        } else {
            ParseOutcome::NoUpdate(SkipReason::Empty)
        }
    }
}

/// A deduplicated, sorted list of identifiers destined for one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeywordGroup {
    words: Vec<String>,
}

impl KeywordGroup {
    /// Build a group from raw words: trims each word, drops empties, deduplicates and sorts (byte order).
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            words: set.into_iter().collect(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Parser output that cannot be written without losing or corrupting keywords.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ClassifyError {
    #[error("parser produced {produced} keyword groups but only {capacity} slots are generated")]
    #[diagnostic(
        code(kwsync::capacity_violation),
        help("merge groups in the parser or lower the entry's reserved slot count")
    )]
    CapacityViolation { produced: usize, capacity: usize },

    #[error("identifier {identifier:?} in group {group} contains whitespace")]
    #[diagnostic(code(kwsync::invalid_identifier))]
    InvalidIdentifier { group: usize, identifier: String },
}

/// Fit parsed groups into exactly `generated_slots` keyword groups.
///
/// ## Parameters
/// - `groups`: groups as returned by the parser, slot 0 first.
/// - `generated_slots`: number of slots the entry owns.
///
/// ## Returns
/// - exactly `generated_slots` groups, padded with empty groups.
///
/// ## Errors
/// - [`ClassifyError::CapacityViolation`] when more than `generated_slots` groups carry identifiers.
///   Trailing empty groups are not counted.
/// - [`ClassifyError::InvalidIdentifier`] when an identifier contains inner whitespace.
pub fn classify(groups: Vec<Vec<String>>, generated_slots: usize) -> Result<Vec<KeywordGroup>, ClassifyError> {
    let mut groups: Vec<KeywordGroup> = groups
        .into_iter()
        .enumerate()
        .map(|(index, words)| {
            if let Some(bad) = words.iter().find(|w| w.trim().contains(char::is_whitespace)) {
                return Err(ClassifyError::InvalidIdentifier {
                    group: index,
                    identifier: bad.clone(),
                });
            }
            Ok(KeywordGroup::from_words(words))
        })
        .collect::<Result<_, _>>()?;

    while groups.last().is_some_and(KeywordGroup::is_empty) {
        groups.pop();
    }

    if groups.len() > generated_slots {
        return Err(ClassifyError::CapacityViolation {
            produced: groups.len(),
            capacity: generated_slots,
        });
    }

    groups.resize_with(generated_slots, KeywordGroup::default);
    Ok(groups)
}
