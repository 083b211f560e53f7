//! Layering guardrails to keep the core crate free of IO-side dependencies.
//!
//! `kwsync_core` holds the pure text logic. Argument parsing and log-subscriber setup belong to the `kwsync`
//! crate; this test scans the core crate's `Cargo.toml` and fails if either shows up in `[dependencies]`.

const FORBIDDEN: &[&str] = &["clap", "tracing-subscriber", "tempfile"];

#[test]
fn core_does_not_depend_on_cli_or_subscriber() {
    let manifest = include_str!("../crates/kwsync_core/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            if line == "[dependencies]" {
                in_dependencies = true;
                continue;
            }
            if in_dependencies {
                break;
            }
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        let name = line_no_comment.split(['=', ' ', '.']).next().unwrap_or("");
        if FORBIDDEN.contains(&name) {
            panic!("`{name}` must not appear in kwsync_core's [dependencies]");
        }
    }
}
