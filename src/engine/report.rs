//! Outcome records for a synchronization run.

use kwsync_core::attributes::AttrChange;
use kwsync_core::{LexerId, SkipReason};

use crate::errors::SyncError;

/// What happened to one registry entry.
#[derive(Debug)]
pub enum EntryOutcome {
    /// The output file was rewritten.
    Updated,
    /// The output file already held these keywords.
    Unchanged,
    /// Check mode: the output file would be rewritten.
    WouldUpdate,
    /// The parser had nothing to contribute; the output file was not touched.
    Skipped(SkipReason),
    Failed(SyncError),
}

impl EntryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, EntryOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct EntryReport {
    pub lexer: LexerId,
    pub outcome: EntryOutcome,
}

/// Result of the attribute-table step.
#[derive(Debug, Default)]
pub struct AttrReport {
    /// Rows written (or, in check mode, rows that would be written).
    pub changes: Vec<AttrChange>,
    /// Lexers whose row was left alone because their output file gave no count.
    pub warnings: Vec<String>,
    /// Set when the style table itself could not be read, parsed or written.
    pub failure: Option<SyncError>,
}

/// Everything a run did, in registry order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub entries: Vec<EntryReport>,
    pub attributes: AttrReport,
    pub check: bool,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.attributes.failure.is_some() || self.entries.iter().any(|e| e.outcome.is_failure())
    }

    /// Check mode found files that would change.
    pub fn has_pending_changes(&self) -> bool {
        self.check
            && (!self.attributes.changes.is_empty()
                || self
                    .entries
                    .iter()
                    .any(|e| matches!(e.outcome, EntryOutcome::WouldUpdate)))
    }

    pub fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.outcome.is_failure())
    }
}
