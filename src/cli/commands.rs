//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use kwsync_core::registry::{self, RegistryEntry};
use miette::Report;

use crate::config::SyncConfig;
use crate::engine::{AttrReport, Engine, EntryOutcome, RunReport};
use crate::errors::SyncError;

use super::{CliError, CliResult, ExitCode};

/// Render a run error with its diagnostic code and help.
fn diagnostic(err: SyncError) -> String {
    format!("{:?}", Report::new(err))
}

/// Regenerate keyword slots for the registry (or one lexer), then the attribute table.
pub fn update(config: SyncConfig, only: Option<&str>) -> CliResult<ExitCode> {
    let engine = Engine::builtin(config);
    let report = engine.run(only).map_err(|e| CliError::failure(diagnostic(e)))?;
    finish(report)
}

/// Re-synchronize the keyword-attribute table from the generated files on disk.
pub fn attrs(config: SyncConfig) -> CliResult<ExitCode> {
    let check = config.check;
    let engine = Engine::builtin(config);
    finish(RunReport {
        entries: Vec::new(),
        attributes: engine.sync_attributes(),
        check,
    })
}

/// Print the registry, one lexer per line.
pub fn list() -> CliResult<ExitCode> {
    for entry in registry::BUILTIN {
        println!("{}", describe(entry));
    }
    println!("\n{} lexer(s)", registry::lexers(registry::BUILTIN).len());
    Ok(ExitCode::SUCCESS)
}

fn describe(entry: &RegistryEntry) -> String {
    let mut line = format!(
        "{:<24} {:<24} {} generated / {} reserved  [{}]",
        entry.lexer.as_str(),
        entry.output,
        entry.generated_slots(),
        entry.reserved_slots,
        entry.inputs.join(", "),
    );
    if let Some(parent) = entry.parent {
        line.push_str(&format!("  (dialect of {parent})"));
    }
    line
}

fn print_attributes(attributes: AttrReport, check: bool, failed: &mut usize) {
    for change in &attributes.changes {
        let verb = if check { "Would set" } else { "Set" };
        match change.old {
            Some(old) => println!("{verb} attributes: {} {old} -> {}", change.lexer, change.new),
            None => println!("{verb} attributes: {} (new row) {}", change.lexer, change.new),
        }
    }
    for warning in &attributes.warnings {
        eprintln!("Warning: {warning}");
    }
    if let Some(err) = attributes.failure {
        eprintln!("{}", diagnostic(err));
        *failed += 1;
    }
}

/// Print per-entry lines and a summary, then map the report onto an exit code.
fn finish(report: RunReport) -> CliResult<ExitCode> {
    let pending = report.has_pending_changes();
    let check = report.check;
    let total = report.entries.len();

    let mut updated = 0;
    let mut unchanged = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for entry in report.entries {
        match entry.outcome {
            EntryOutcome::Updated => {
                println!("Updated: {}", entry.lexer);
                updated += 1;
            }
            EntryOutcome::WouldUpdate => {
                println!("Would update: {}", entry.lexer);
                updated += 1;
            }
            EntryOutcome::Unchanged => unchanged += 1,
            EntryOutcome::Skipped(reason) => {
                println!("Skipped: {} ({reason})", entry.lexer);
                skipped += 1;
            }
            EntryOutcome::Failed(err) => {
                eprintln!("Failed: {}", entry.lexer);
                eprintln!("{}", diagnostic(err));
                failed += 1;
            }
        }
    }

    print_attributes(report.attributes, check, &mut failed);

    if total > 0 {
        let verb = if check { "would be updated" } else { "updated" };
        println!(
            "\n✓ {total} lexer(s): {updated} {verb}, {unchanged} unchanged, {skipped} skipped, {failed} failed"
        );
    }

    if failed > 0 {
        return Err(CliError::failure(format!("{failed} failure(s)")));
    }
    if pending {
        return Err(CliError::failure("files would change; run without --check to apply"));
    }
    Ok(ExitCode::SUCCESS)
}
