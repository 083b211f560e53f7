//! Reference parser for annotated keyword manifests.
//!
//! A manifest is a plain reference file in the target language's comment syntax:
//!
//! ```text
//! // @group keywords
//! as async await break
//! // @group types
//! bool char i32   // trailing comments are dropped
//! ```
//!
//! Tokens before the first `@group` directive form an implicit first group. Tokens are split on whitespace and
//! trimmed of `,` `;` `(` `)`. Several files merge by group name: a named group joins the group of the same name
//! from an earlier file, and the implicit group always joins the first slot.

use std::fs;
use std::path::PathBuf;

use kwsync_core::{ParseOutcome, SkipReason};

use super::KeywordParser;

const GROUP_DIRECTIVE: &str = "@group";

/// Parser for keyword manifests with a fixed comment leader.
#[derive(Debug, Clone)]
pub struct ManifestParser {
    leader: &'static str,
}

impl ManifestParser {
    pub fn new(leader: &'static str) -> Self {
        Self { leader }
    }

    /// Split one manifest into keyword groups.
    ///
    /// ## Errors
    /// - a `@group` directive without a name, or a name used twice, reported with its 1-based line number.
    pub fn parse_text(&self, text: &str) -> Result<Vec<ManifestGroup>, String> {
        let mut groups = vec![ManifestGroup::default()];

        for (line_idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(comment) = trimmed.strip_prefix(self.leader) {
                let Some(rest) = comment.trim().strip_prefix(GROUP_DIRECTIVE) else {
                    continue;
                };
                if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                    // `@grouping` and friends are ordinary comments
                    continue;
                }
                let name = rest.trim();
                if name.is_empty() {
                    return Err(format!("line {}: {GROUP_DIRECTIVE} needs a name", line_idx + 1));
                }
                if groups.iter().any(|g| g.name.as_deref() == Some(name)) {
                    return Err(format!("line {}: duplicate group `{name}`", line_idx + 1));
                }
                match groups.as_mut_slice() {
                    [implicit] if implicit.name.is_none() && implicit.words.is_empty() => {
                        implicit.name = Some(name.to_string());
                    }
                    _ => groups.push(ManifestGroup::named(name)),
                }
                continue;
            }

            let code = match line.find(self.leader) {
                Some(pos) => &line[..pos],
                None => line,
            };
            let Some(current) = groups.last_mut() else {
                continue;
            };
            for token in code.split_whitespace() {
                let token = token.trim_matches([',', ';', '(', ')']);
                if !token.is_empty() {
                    current.words.push(token.to_string());
                }
            }
        }

        Ok(groups)
    }
}

/// One keyword group of a manifest. The implicit group before any directive has no name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestGroup {
    pub name: Option<String>,
    pub words: Vec<String>,
}

impl ManifestGroup {
    fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            words: Vec::new(),
        }
    }
}

/// Fold one file's groups into the groups merged so far.
///
/// A named group joins the merged group of the same name. Failing that it claims the unnamed merged group at its
/// own position, and otherwise becomes a new trailing group.
fn merge_into(merged: &mut Vec<ManifestGroup>, groups: Vec<ManifestGroup>) {
    for (index, group) in groups.into_iter().enumerate() {
        let slot = match &group.name {
            None => {
                if merged.is_empty() {
                    merged.push(ManifestGroup::default());
                }
                0
            }
            Some(name) => {
                if let Some(found) = merged.iter().position(|m| m.name.as_ref() == Some(name)) {
                    found
                } else if merged.get(index).is_some_and(|m| m.name.is_none()) {
                    merged[index].name = Some(name.clone());
                    index
                } else {
                    merged.push(ManifestGroup::named(name));
                    merged.len() - 1
                }
            }
        };
        merged[slot].words.extend(group.words);
    }
}

impl KeywordParser for ManifestParser {
    #[tracing::instrument(skip_all, fields(files = paths.len()))]
    fn parse(&self, paths: &[PathBuf]) -> ParseOutcome {
        let mut merged: Vec<ManifestGroup> = Vec::new();

        for path in paths {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::info!(path = %path.display(), error = %e, "reference file unavailable");
                    return ParseOutcome::NoUpdate(SkipReason::MissingInput {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    });
                }
            };
            match self.parse_text(&text) {
                Ok(groups) => merge_into(&mut merged, groups),
                Err(msg) => return ParseOutcome::Failed(format!("{}: {msg}", path.display())),
            }
        }

        ParseOutcome::from_groups(merged.into_iter().map(|g| g.words).collect())
    }
}
