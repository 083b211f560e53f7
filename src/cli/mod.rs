//! CLI module for kwsync
//!
//! ## Commands
//!
//! - `update` (default) - Regenerate keyword slots, then the attribute table
//! - `attrs` - Re-synchronize the attribute table only
//! - `list` - Print the lexer registry
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::config::SyncConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Regenerate lexer keyword tables from per-language reference files
#[derive(Parser, Debug)]
#[command(name = "kwsync")]
#[command(version = VERSION)]
#[command(about = "Regenerate lexer keyword tables from per-language reference files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding the reference files
    #[arg(long, value_name = "DIR", global = true)]
    pub lang_dir: Option<PathBuf>,

    /// Directory holding the generated lexer sources
    #[arg(long, value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Style table carrying the keyword-attribute rows
    #[arg(long = "styles", value_name = "FILE", global = true)]
    pub style_table: Option<PathBuf>,

    /// Maximum line length of rendered keyword literals
    #[arg(long, value_name = "N", global = true)]
    pub line_length: Option<usize>,

    /// Only regenerate this lexer (e.g. NP2LEX_RUST)
    #[arg(long, value_name = "LEXER_ID", global = true)]
    pub only: Option<String>,

    /// Report what would change without writing; exit 1 if anything would
    #[arg(long, global = true)]
    pub check: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Regenerate keyword slots, then the attribute table (default)
    Update,
    /// Re-synchronize the keyword-attribute table only
    Attrs,
    /// Print the lexer registry
    List,
}

impl Cli {
    /// Map the path and rendering flags onto a run configuration.
    pub fn config(&self) -> SyncConfig {
        let mut config = SyncConfig::new().with_check(self.check);
        if let Some(dir) = &self.lang_dir {
            config = config.with_lang_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(path) = &self.style_table {
            config = config.with_style_table(path);
        }
        if let Some(length) = self.line_length {
            config = config.with_line_length(length);
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.config();
    match cli.command.unwrap_or(Command::Update) {
        Command::Update => commands::update(config, cli.only.as_deref()),
        Command::Attrs => commands::attrs(config),
        Command::List => commands::list(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_cli_parse_default() {
        let cli = Cli::try_parse_from(["kwsync"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.check);
        assert!(cli.only.is_none());
    }

    #[test]
    fn test_cli_parse_subcommands() {
        let cli = Cli::try_parse_from(["kwsync", "attrs"]).unwrap();
        assert_eq!(cli.command, Some(Command::Attrs));

        let cli = Cli::try_parse_from(["kwsync", "list"]).unwrap();
        assert_eq!(cli.command, Some(Command::List));
    }

    #[test]
    fn test_cli_parse_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kwsync", "update", "--only", "NP2LEX_RUST", "--check"]).unwrap();
        assert_eq!(cli.command, Some(Command::Update));
        assert_eq!(cli.only.as_deref(), Some("NP2LEX_RUST"));
        assert!(cli.check);
    }

    #[test]
    fn test_cli_config_overrides() {
        let cli = Cli::try_parse_from([
            "kwsync",
            "--lang-dir",
            "refs",
            "--output-dir",
            "out",
            "--styles",
            "out/Styles.c",
            "--line-length",
            "80",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.lang_dir, Path::new("refs"));
        assert_eq!(config.output_dir, Path::new("out"));
        assert_eq!(config.style_table(), Path::new("out/Styles.c"));
        assert_eq!(config.render.line_length, 80);
    }

    #[test]
    fn test_cli_rejects_bad_line_length() {
        assert!(Cli::try_parse_from(["kwsync", "--line-length", "wide"]).is_err());
    }
}
