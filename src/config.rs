//! Run configuration for kwsync
//!
//! Defaults match the editor's source layout when run from its `tools/` directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use kwsync_core::render::RenderConfig;

/// Run configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Directory holding the per-language reference files
    pub lang_dir: PathBuf,
    /// Directory holding the generated lexer sources
    pub output_dir: PathBuf,
    /// Global style table carrying the keyword-attribute rows
    pub style_table: PathBuf,
    /// Literal rendering (line length)
    pub render: RenderConfig,
    /// Report pending changes without writing anything
    pub check: bool,
    /// Pause before the single retry of a failed write
    pub retry_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            lang_dir: PathBuf::from("lang"),
            output_dir: PathBuf::from("../src/EditLexers"),
            style_table: PathBuf::from("../src/Styles.c"),
            render: RenderConfig::default(),
            check: false,
            retry_delay: Duration::from_millis(200),
        }
    }
}

impl SyncConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reference file directory
    pub fn with_lang_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lang_dir = dir.into();
        self
    }

    /// Set the generated source directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the style table path
    pub fn with_style_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.style_table = path.into();
        self
    }

    /// Set the maximum line length of rendered keyword literals
    pub fn with_line_length(mut self, length: usize) -> Self {
        self.render = self.render.with_line_length(length);
        self
    }

    /// Enable or disable check (dry-run) mode
    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Set the delay before retrying a failed write
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn input_path(&self, name: &str) -> PathBuf {
        self.lang_dir.join(name)
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn style_table(&self) -> &Path {
        &self.style_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = SyncConfig::default();
        assert_eq!(config.lang_dir, PathBuf::from("lang"));
        assert_eq!(config.output_dir, PathBuf::from("../src/EditLexers"));
        assert_eq!(config.style_table(), Path::new("../src/Styles.c"));
        assert!(!config.check);
    }

    #[test]
    fn test_default_line_length() {
        assert_eq!(SyncConfig::default().render.line_length, 120);
    }

    #[test]
    fn test_builder_chain() {
        let config = SyncConfig::new()
            .with_lang_dir("refs")
            .with_output_dir("out")
            .with_style_table("out/Styles.c")
            .with_line_length(80)
            .with_check(true)
            .with_retry_delay(Duration::ZERO);

        assert_eq!(config.input_path("Rust.rs"), PathBuf::from("refs/Rust.rs"));
        assert_eq!(config.output_path("stlRust.c"), PathBuf::from("out/stlRust.c"));
        assert_eq!(config.style_table(), Path::new("out/Styles.c"));
        assert_eq!(config.render.line_length, 80);
        assert!(config.check);
        assert_eq!(config.retry_delay, Duration::ZERO);
    }

    #[test]
    fn test_builder_override() {
        let config = SyncConfig::new().with_line_length(40).with_line_length(100);
        assert_eq!(config.render.line_length, 100); // Last value wins
    }
}
