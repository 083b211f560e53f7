//! The synchronization run: regenerate every registry entry's keyword slots, then bring the style table's
//! keyword-attribute rows in line with the generated files.
//!
//! ## Notes
//! - Entries are independent. A failing entry is recorded in the [`RunReport`] and the run moves on.
//! - The attribute step always runs last. In check mode it counts the texts the entries would have written,
//!   so it reports the same row changes a real run makes. Run alone ([`Engine::sync_attributes`]) it reads
//!   only on-disk state.

mod report;

use std::collections::HashMap;

use kwsync_core::registry::{self, RegistryEntry};
use kwsync_core::{ParseOutcome, TOTAL_SLOT_CAPACITY, attributes, classify, slots};

use crate::config::SyncConfig;
use crate::errors::{SyncError, SyncResult};
use crate::fsio;
use crate::parsers::ParserTable;

pub use report::{AttrReport, EntryOutcome, EntryReport, RunReport};

/// Rewritten texts held back by check mode, keyed by output file name.
type Pending = HashMap<&'static str, String>;

/// Drives one synchronization run over a registry.
pub struct Engine<'a> {
    config: SyncConfig,
    registry: &'a [RegistryEntry],
    parsers: ParserTable,
}

impl<'a> Engine<'a> {
    pub fn new(config: SyncConfig, registry: &'a [RegistryEntry], parsers: ParserTable) -> Self {
        Self {
            config,
            registry,
            parsers,
        }
    }

    /// Engine over the builtin registry and parsers.
    pub fn builtin(config: SyncConfig) -> Engine<'static> {
        Engine::new(config, registry::BUILTIN, ParserTable::builtin())
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registry(&self) -> &'a [RegistryEntry] {
        self.registry
    }

    fn validate(&self) -> SyncResult<()> {
        registry::validate(self.registry).map_err(|errors| SyncError::Registry { errors })
    }

    /// Process the registry (or the single lexer named by `only`), then the attribute table.
    ///
    /// ## Errors
    /// - [`SyncError::Registry`] when the registry breaks a structural invariant.
    /// - [`SyncError::UnknownLexer`] when `only` names no registry entry.
    ///
    /// Per-entry and attribute failures do not abort the run; they land in the returned report.
    pub fn run(&self, only: Option<&str>) -> SyncResult<RunReport> {
        self.validate()?;
        match only {
            Some(name) if registry::find(self.registry, name).is_none() => {
                return Err(SyncError::UnknownLexer {
                    name: name.to_string(),
                });
            }
            _ => {}
        }

        let mut pending = Pending::new();
        let mut entries = Vec::new();
        for entry in self
            .registry
            .iter()
            .filter(|e| only.is_none_or(|name| e.lexer.as_str() == name))
        {
            let (outcome, held) = self.process_entry(entry);
            if let Some(text) = held {
                pending.insert(entry.output, text);
            }
            entries.push(EntryReport {
                lexer: entry.lexer,
                outcome,
            });
        }

        Ok(RunReport {
            entries,
            attributes: self.sync_attributes_with(&pending),
            check: self.config.check,
        })
    }

    /// Regenerate one entry's slots.
    pub fn update_entry(&self, entry: &RegistryEntry) -> EntryOutcome {
        self.process_entry(entry).0
    }

    /// Outcome of one entry, plus the rewritten text when check mode held it back.
    #[tracing::instrument(skip_all, fields(lexer = %entry.lexer))]
    fn process_entry(&self, entry: &RegistryEntry) -> (EntryOutcome, Option<String>) {
        match self.try_update_entry(entry) {
            Ok(done) => done,
            Err(e) => {
                tracing::warn!(error = %e, "entry failed");
                (EntryOutcome::Failed(e), None)
            }
        }
    }

    fn try_update_entry(&self, entry: &RegistryEntry) -> SyncResult<(EntryOutcome, Option<String>)> {
        let parser = self.parsers.get(entry.parser).ok_or(SyncError::ParserUnavailable {
            lexer: entry.lexer,
            kind: entry.parser,
        })?;

        let inputs: Vec<_> = entry.inputs.iter().map(|name| self.config.input_path(name)).collect();
        let groups = match parser.parse(&inputs) {
            ParseOutcome::NoUpdate(reason) => {
                tracing::info!(%reason, "skipped");
                return Ok((EntryOutcome::Skipped(reason), None));
            }
            ParseOutcome::Failed(message) => {
                return Err(SyncError::ParserFailed {
                    lexer: entry.lexer,
                    message,
                });
            }
            ParseOutcome::Groups(groups) => groups,
        };

        let groups = classify::classify(groups, entry.generated_slots()).map_err(|source| SyncError::Classify {
            lexer: entry.lexer,
            source,
        })?;

        let path = self.config.output_path(entry.output);
        let current = fsio::read_text(&path)?;
        let updated = slots::replace_slots(
            &current,
            entry.lexer.as_str(),
            &groups,
            TOTAL_SLOT_CAPACITY,
            &self.config.render,
        )
        .map_err(|source| SyncError::Slots {
            lexer: entry.lexer,
            path: path.clone(),
            source,
        })?;

        if updated == current {
            tracing::debug!("unchanged");
            return Ok((EntryOutcome::Unchanged, None));
        }
        if self.config.check {
            return Ok((EntryOutcome::WouldUpdate, Some(updated)));
        }
        fsio::write_atomic(&path, &updated, self.config.retry_delay)?;
        tracing::info!(path = %path.display(), "updated");
        Ok((EntryOutcome::Updated, None))
    }

    /// Recount populated slots for every registry lexer from the files on disk and rewrite the style table
    /// rows that differ.
    ///
    /// An invalid registry is reported as the step's failure and nothing is counted.
    pub fn sync_attributes(&self) -> AttrReport {
        if let Err(e) = self.validate() {
            return AttrReport {
                failure: Some(e),
                ..AttrReport::default()
            };
        }
        self.sync_attributes_with(&Pending::new())
    }

    #[tracing::instrument(skip_all, fields(path = %self.config.style_table().display(), held = pending.len()))]
    fn sync_attributes_with(&self, pending: &Pending) -> AttrReport {
        let mut report = AttrReport::default();
        let mut counts: Vec<(&str, usize)> = Vec::new();

        for entry in self.registry {
            match self.populated_count(entry, pending) {
                Ok(count) => counts.push((entry.lexer.as_str(), count)),
                Err(warning) => {
                    tracing::warn!(lexer = %entry.lexer, "{warning}");
                    report.warnings.push(warning);
                }
            }
        }

        let path = self.config.style_table();
        let result = fsio::read_text(path).and_then(|text| {
            let sync = attributes::synchronize(&text, &counts).map_err(|source| SyncError::Attributes {
                path: path.to_path_buf(),
                source,
            })?;
            if sync.text != text && !self.config.check {
                fsio::write_atomic(path, &sync.text, self.config.retry_delay)?;
            }
            Ok(sync.changes)
        });

        match result {
            Ok(changes) => {
                for change in &changes {
                    tracing::info!(lexer = %change.lexer, old = ?change.old, new = change.new, "attribute row");
                }
                report.changes = changes;
            }
            Err(e) => {
                tracing::warn!(error = %e, "attribute table not synchronized");
                report.failure = Some(e);
            }
        }
        report
    }

    /// Populated slots of one entry's output, preferring a text held back by check mode.
    fn populated_count(&self, entry: &RegistryEntry, pending: &Pending) -> Result<usize, String> {
        let lexer = entry.lexer;
        let path = self.config.output_path(entry.output);
        let on_disk;
        let text = match pending.get(entry.output) {
            Some(text) => text.as_str(),
            None => {
                on_disk = fsio::read_text(&path).map_err(|e| format!("{lexer}: row kept, {e}"))?;
                on_disk.as_str()
            }
        };
        slots::populated_count(text, lexer.as_str(), TOTAL_SLOT_CAPACITY)
            .map_err(|e| format!("{lexer}: row kept, {}: {e}", path.display()))?
            .ok_or_else(|| format!("{lexer}: row kept, no slot markers in its output file"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kwsync_core::{LexerId, ParserKind};
    use std::fs;
    use tempfile::tempdir;

    const DEMO_ENTRY: RegistryEntry = RegistryEntry {
        lexer: LexerId::new("NP2LEX_DEMO"),
        output: "stlDemo.c",
        inputs: &["Demo.txt"],
        reserved_slots: 15,
        parser: ParserKind::Rust,
        parent: None,
    };
    const DEMO: &[RegistryEntry] = &[DEMO_ENTRY];

    #[test]
    fn test_unknown_only_is_rejected() {
        let dir = tempdir().unwrap();
        let config = SyncConfig::new().with_lang_dir(dir.path()).with_output_dir(dir.path());
        let engine = Engine::new(config, DEMO, ParserTable::builtin());
        let err = engine.run(Some("NP2LEX_NOPE")).unwrap_err();
        assert!(matches!(err, SyncError::UnknownLexer { .. }));
    }

    #[test]
    fn test_missing_parser_fails_entry() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Demo.txt"), "fn\n").unwrap();
        let config = SyncConfig::new().with_lang_dir(dir.path()).with_output_dir(dir.path());
        let engine = Engine::new(config, DEMO, ParserTable::new());
        let outcome = engine.update_entry(&DEMO[0]);
        assert!(matches!(
            outcome,
            EntryOutcome::Failed(SyncError::ParserUnavailable { .. })
        ));
    }

    #[test]
    fn test_invalid_registry_aborts() {
        const BROKEN: &[RegistryEntry] = &[RegistryEntry {
            lexer: LexerId::new("NP2LEX_BROKEN"),
            output: "stlBroken.c",
            inputs: &[],
            reserved_slots: 0,
            parser: ParserKind::Rust,
            parent: None,
        }];
        let engine = Engine::new(SyncConfig::new(), BROKEN, ParserTable::builtin());
        let err = engine.run(None).unwrap_err();
        assert!(matches!(err, SyncError::Registry { errors } if errors.len() == 1));
    }

    #[test]
    fn test_attrs_alone_rejects_invalid_registry() {
        const SHARED: &[RegistryEntry] = &[DEMO_ENTRY, DEMO_ENTRY];
        let dir = tempdir().unwrap();
        let styles = dir.path().join("Styles.c");
        let table = "//++Autogenerated keyword-attributes\n//--Autogenerated keyword-attributes\n";
        fs::write(&styles, table).unwrap();
        let config = SyncConfig::new().with_output_dir(dir.path()).with_style_table(&styles);

        let report = Engine::new(config, SHARED, ParserTable::builtin()).sync_attributes();
        assert!(matches!(report.failure, Some(SyncError::Registry { .. })));
        assert!(report.changes.is_empty());
        assert_eq!(fs::read_to_string(&styles).unwrap(), table);
    }
}
