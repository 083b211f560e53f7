//! The lexer registry: which lexers get generated keyword tables, where they come from and where they go.
//!
//! The registry is a `const` table ([`BUILTIN`]) of [`RegistryEntry`] rows. Each row names a lexer, the
//! generated source file holding its keyword slots, the reference file(s) to parse, how many trailing slots
//! are hand-maintained, and a [`ParserKind`] tag that the caller resolves to an actual parser.
//!
//! ## Notes
//! - The table is immutable; order only affects the order of logs and reports.
//! - [`RegistryEntry::parent`] records dialect nesting (e.g. Gradle under Groovy under Java). It is
//!   metadata for listings and has no effect on slot budgets or parser selection.
//!
//! ## Examples
//! ```rust
//! use kwsync_core::registry::{self, LexerId};
//!
//! let rust = registry::find(registry::BUILTIN, "NP2LEX_RUST").unwrap();
//! assert_eq!(rust.output, "stlRust.c");
//! assert_eq!(rust.generated_slots(), 16);
//! assert!(registry::validate(registry::BUILTIN).is_ok());
//! assert_eq!(LexerId::new("NP2LEX_RUST").as_str(), "NP2LEX_RUST");
//! ```

use std::collections::HashSet;
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::TOTAL_SLOT_CAPACITY;

/// Stable symbolic identifier of a lexer, as spelled in the generated sources (e.g. `NP2LEX_RUST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LexerId(&'static str);

impl LexerId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for LexerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Tag naming the reference-file format a registry entry is parsed with.
///
/// Tags are resolved to parser implementations by the caller; several lexers may share one tag
/// (ABAQUS and APDL both use [`ParserKind::Apdl`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Apdl,
    ActionScript,
    AutoHotkey,
    Asymptote,
    AviSynth,
    Awk,
    Batch,
    CMake,
    CSharp,
    DLang,
    Dart,
    Gn,
    GraphViz,
    Css,
    Go,
    Haxe,
    InnoSetup,
    Jam,
    Java,
    Groovy,
    Gradle,
    Kotlin,
    JavaScript,
    CoffeeScript,
    TypeScript,
    Julia,
    Llvm,
    Lua,
    Nsis,
    Python,
    R,
    Rebol,
    Ruby,
    Rust,
    Sql,
    Swift,
    Vim,
    WasmLexerKeywords,
}

impl ParserKind {
    /// Every parser tag, in declaration order.
    pub const ALL: &'static [ParserKind] = &[
        ParserKind::Apdl,
        ParserKind::ActionScript,
        ParserKind::AutoHotkey,
        ParserKind::Asymptote,
        ParserKind::AviSynth,
        ParserKind::Awk,
        ParserKind::Batch,
        ParserKind::CMake,
        ParserKind::CSharp,
        ParserKind::DLang,
        ParserKind::Dart,
        ParserKind::Gn,
        ParserKind::GraphViz,
        ParserKind::Css,
        ParserKind::Go,
        ParserKind::Haxe,
        ParserKind::InnoSetup,
        ParserKind::Jam,
        ParserKind::Java,
        ParserKind::Groovy,
        ParserKind::Gradle,
        ParserKind::Kotlin,
        ParserKind::JavaScript,
        ParserKind::CoffeeScript,
        ParserKind::TypeScript,
        ParserKind::Julia,
        ParserKind::Llvm,
        ParserKind::Lua,
        ParserKind::Nsis,
        ParserKind::Python,
        ParserKind::R,
        ParserKind::Rebol,
        ParserKind::Ruby,
        ParserKind::Rust,
        ParserKind::Sql,
        ParserKind::Swift,
        ParserKind::Vim,
        ParserKind::WasmLexerKeywords,
    ];

    /// Line-comment leader of the reference file's language.
    ///
    /// ## Notes
    /// - Languages without line comments use their block-comment opener (CSS).
    pub const fn comment_leader(self) -> &'static str {
        match self {
            ParserKind::Apdl => "!",
            ParserKind::AutoHotkey | ParserKind::InnoSetup | ParserKind::Llvm | ParserKind::Nsis | ParserKind::Rebol => {
                ";"
            }
            ParserKind::Batch => "::",
            ParserKind::Css => "/*",
            ParserKind::Lua | ParserKind::Sql => "--",
            ParserKind::Vim => "\"",
            ParserKind::AviSynth
            | ParserKind::Awk
            | ParserKind::CMake
            | ParserKind::Gn
            | ParserKind::Jam
            | ParserKind::CoffeeScript
            | ParserKind::Julia
            | ParserKind::Python
            | ParserKind::R
            | ParserKind::Ruby
            | ParserKind::WasmLexerKeywords => "#",
            ParserKind::ActionScript
            | ParserKind::Asymptote
            | ParserKind::CSharp
            | ParserKind::DLang
            | ParserKind::Dart
            | ParserKind::GraphViz
            | ParserKind::Go
            | ParserKind::Haxe
            | ParserKind::Java
            | ParserKind::Groovy
            | ParserKind::Gradle
            | ParserKind::Kotlin
            | ParserKind::JavaScript
            | ParserKind::TypeScript
            | ParserKind::Rust
            | ParserKind::Swift => "//",
        }
    }
}

/// One row of the lexer registry.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub lexer: LexerId,
    /// Generated source file name, relative to the output directory.
    pub output: &'static str,
    /// Reference file names, relative to the input directory. Never empty.
    pub inputs: &'static [&'static str],
    /// Trailing slots maintained by hand and never rewritten.
    pub reserved_slots: usize,
    pub parser: ParserKind,
    pub parent: Option<LexerId>,
}

impl RegistryEntry {
    /// Number of leading slots this tool writes: `TOTAL_SLOT_CAPACITY - reserved_slots`.
    pub const fn generated_slots(&self) -> usize {
        TOTAL_SLOT_CAPACITY.saturating_sub(self.reserved_slots)
    }
}

/// Look up an entry by lexer id spelling.
pub fn find<'a>(entries: &'a [RegistryEntry], lexer: &str) -> Option<&'a RegistryEntry> {
    entries.iter().find(|e| e.lexer.as_str() == lexer)
}

/// Distinct lexer ids in first-seen registry order.
pub fn lexers(entries: &[RegistryEntry]) -> Vec<LexerId> {
    let mut seen = HashSet::new();
    entries.iter().map(|e| e.lexer).filter(|id| seen.insert(*id)).collect()
}

/// A registry row that breaks a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum RegistryError {
    #[error("{lexer}: {reserved} reserved slots leave no room in a {capacity}-slot table")]
    #[diagnostic(code(kwsync::registry::reserved_overflow))]
    ReservedOverflow {
        lexer: LexerId,
        reserved: usize,
        capacity: usize,
    },

    #[error("{lexer}: no input files")]
    #[diagnostic(code(kwsync::registry::no_inputs))]
    NoInputs { lexer: LexerId },

    #[error("{lexer}: listed more than once")]
    #[diagnostic(code(kwsync::registry::duplicate_lexer))]
    DuplicateLexer { lexer: LexerId },

    #[error("{lexer}: parent {parent} is not in the registry")]
    #[diagnostic(code(kwsync::registry::unknown_parent))]
    UnknownParent { lexer: LexerId, parent: LexerId },
}

/// Check every structural invariant of a registry table.
///
/// ## Returns
/// - `Ok(())` when the table is usable, otherwise every violation found (in table order).
pub fn validate(entries: &[RegistryEntry]) -> Result<(), Vec<RegistryError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let known: HashSet<LexerId> = entries.iter().map(|e| e.lexer).collect();

    for entry in entries {
        if entry.reserved_slots >= TOTAL_SLOT_CAPACITY {
            errors.push(RegistryError::ReservedOverflow {
                lexer: entry.lexer,
                reserved: entry.reserved_slots,
                capacity: TOTAL_SLOT_CAPACITY,
            });
        }
        if entry.inputs.is_empty() {
            errors.push(RegistryError::NoInputs { lexer: entry.lexer });
        }
        if !seen.insert(entry.lexer) {
            errors.push(RegistryError::DuplicateLexer { lexer: entry.lexer });
        }
        match entry.parent {
            Some(parent) if !known.contains(&parent) => {
                errors.push(RegistryError::UnknownParent {
                    lexer: entry.lexer,
                    parent,
                });
            }
            _ => {}
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

const fn entry(
    lexer: &'static str,
    output: &'static str,
    inputs: &'static [&'static str],
    reserved_slots: usize,
    parser: ParserKind,
) -> RegistryEntry {
    RegistryEntry {
        lexer: LexerId::new(lexer),
        output,
        inputs,
        reserved_slots,
        parser,
        parent: None,
    }
}

const fn dialect(parent: &'static str, base: RegistryEntry) -> RegistryEntry {
    RegistryEntry {
        parent: Some(LexerId::new(parent)),
        ..base
    }
}

/// The editor's lexers whose keyword tables are generated.
pub const BUILTIN: &[RegistryEntry] = &[
    entry("NP2LEX_ABAQUS", "stlABAQUS.c", &["ABAQUS.inp"], 0, ParserKind::Apdl),
    entry("NP2LEX_ACTIONSCRIPT", "stlActionScript.c", &["ActionScript.as"], 1, ParserKind::ActionScript),
    entry(
        "NP2LEX_AHK",
        "stlAutoHotkey.c",
        &["AutoHotkey_L.ahk", "AutoHotkey_H.ahk"],
        0,
        ParserKind::AutoHotkey,
    ),
    entry("NP2LEX_APDL", "stlAPDL.c", &["APDL.cdb"], 0, ParserKind::Apdl),
    entry("NP2LEX_ASYMPTOTE", "stlAsymptote.c", &["Asymptote.asy"], 1, ParserKind::Asymptote),
    entry("NP2LEX_AVS", "stlAviSynth.c", &["AviSynth.avs"], 0, ParserKind::AviSynth),
    entry("NP2LEX_AWK", "stlAwk.c", &["Awk.awk"], 1, ParserKind::Awk),
    entry("NP2LEX_BATCH", "stlBatch.c", &["Batch.bat"], 0, ParserKind::Batch),
    entry("NP2LEX_CMAKE", "stlCMake.c", &["CMake.cmake"], 0, ParserKind::CMake),
    entry("NP2LEX_CSHARP", "stlCSharp.c", &["CSharp.cs"], 1, ParserKind::CSharp),
    entry("NP2LEX_D", "stlD.c", &["D.d"], 1, ParserKind::DLang),
    entry("NP2LEX_DART", "stlDart.c", &["Dart.dart"], 0, ParserKind::Dart),
    entry("NP2LEX_GN", "stlGN.c", &["GN.gn"], 0, ParserKind::Gn),
    entry("NP2LEX_GRAPHVIZ", "stlGraphViz.c", &["GraphViz.dot"], 0, ParserKind::GraphViz),
    dialect(
        "NP2LEX_GRAPHVIZ",
        entry("NP2LEX_BLOCKDIAG", "stlBlockdiag.c", &["blockdiag.diag"], 0, ParserKind::GraphViz),
    ),
    entry("NP2LEX_CSS", "stlCSS.c", &["CSS.css"], 0, ParserKind::Css),
    entry("NP2LEX_GO", "stlGO.c", &["Go.go"], 0, ParserKind::Go),
    entry("NP2LEX_HAXE", "stlHaxe.c", &["Haxe.hx"], 1, ParserKind::Haxe),
    entry("NP2LEX_INNO", "stlInno.c", &["InnoSetup.iss"], 0, ParserKind::InnoSetup),
    entry("NP2LEX_JAM", "stlJamfile.c", &["Jamfile.jam"], 0, ParserKind::Jam),
    entry("NP2LEX_JAVA", "stlJava.c", &["Java.java"], 1, ParserKind::Java),
    dialect(
        "NP2LEX_JAVA",
        entry("NP2LEX_GROOVY", "stlGroovy.c", &["Groovy.groovy"], 1, ParserKind::Groovy),
    ),
    dialect(
        "NP2LEX_GROOVY",
        entry("NP2LEX_GRADLE", "stlGradle.c", &["Gradle.gradle"], 1, ParserKind::Gradle),
    ),
    dialect(
        "NP2LEX_JAVA",
        entry("NP2LEX_KOTLIN", "stlKotlin.c", &["Kotlin.kt"], 0, ParserKind::Kotlin),
    ),
    entry("NP2LEX_JAVASCRIPT", "stlJavaScript.c", &["JavaScript.js"], 1, ParserKind::JavaScript),
    dialect(
        "NP2LEX_JAVASCRIPT",
        entry(
            "NP2LEX_COFFEESCRIPT",
            "stlCoffeeScript.c",
            &["CoffeeScript.coffee"],
            0,
            ParserKind::CoffeeScript,
        ),
    ),
    dialect(
        "NP2LEX_JAVASCRIPT",
        entry("NP2LEX_TYPESCRIPT", "stlTypeScript.c", &["TypeScript.ts"], 1, ParserKind::TypeScript),
    ),
    entry("NP2LEX_JULIA", "stlJulia.c", &["Julia.jl"], 0, ParserKind::Julia),
    entry("NP2LEX_LLVM", "stlLLVM.c", &["LLVM.ll"], 0, ParserKind::Llvm),
    entry("NP2LEX_LUA", "stlLua.c", &["Lua.lua"], 0, ParserKind::Lua),
    entry("NP2LEX_NSIS", "stlNsis.c", &["NSIS.nsi"], 0, ParserKind::Nsis),
    entry("NP2LEX_PYTHON", "stlPython.c", &["Python.py"], 0, ParserKind::Python),
    entry("NP2LEX_R", "stlR.c", &["R.r"], 0, ParserKind::R),
    entry("NP2LEX_REBOL", "stlRebol.c", &["Rebol.r", "Red.red"], 1, ParserKind::Rebol),
    entry("NP2LEX_RUBY", "stlRuby.c", &["Ruby.rb"], 0, ParserKind::Ruby),
    entry("NP2LEX_RUST", "stlRust.c", &["Rust.rs"], 0, ParserKind::Rust),
    // One lexer for every SQL dialect until dialects get their own tables.
    entry(
        "NP2LEX_SQL",
        "stlSQL.c",
        &[
            "MySQL.sql",
            "Oracle.sql",
            "PostgreSQL.sql",
            "SQL.sql",
            "SQLite3.sql",
            "Transact-SQL.sql",
        ],
        0,
        ParserKind::Sql,
    ),
    entry("NP2LEX_SWIFT", "stlSwift.c", &["Swift.swift"], 0, ParserKind::Swift),
    entry("NP2LEX_VIM", "stlVim.c", &["Vim.vim"], 0, ParserKind::Vim),
    // https://github.com/WebAssembly/wabt/blob/main/src/lexer-keywords.txt
    entry(
        "NP2LEX_WASM",
        "stlWASM.c",
        &["wasm-lexer-keywords.txt"],
        0,
        ParserKind::WasmLexerKeywords,
    ),
];
