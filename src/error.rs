//! Error types and source-location diagnostics for the compiler pipeline.
//!
//! ## Error Hierarchy
//!
//! - **Domain errors**: `CompileError` covers every failure kind named by the
//!   specification (`ParseError`, `UnknownComponent`, `MissingRequiredProp`,
//!   `InvalidChild`, `InterfaceMismatch`, `UnknownField`, `NamespaceConflict`,
//!   `IoError`, `ConfigError`). Each variant carries a primary [`Location`];
//!   `InterfaceMismatch` additionally carries a secondary location pointing
//!   at the agent-interface declaration site.
//! - **Reporting**: [`Diagnostic`] renders a `CompileError` (plus the source
//!   text it occurred in) to the exact text format required by the host:
//!   `<file>:<line>:<col> - error: <message>`, a numbered source line, and a
//!   caret positioned under the offending column.
//! - **Service boundary**: `CompileError` converts to `anyhow::Error` at the
//!   one place that composes heterogeneous errors, [`crate::driver`].

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A single point in a source file, 1-indexed per editor convention.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Absolute or workspace-relative path of the source file.
    pub file: PathBuf,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column number.
    pub column: usize,
    /// Byte offset into the source, used to slice the offending line back out.
    pub offset: usize,
}

impl Location {
    /// Builds a `Location` by scanning `source` up to `offset` for line/column.
    pub fn from_offset(file: impl Into<PathBuf>, source: &str, offset: usize) -> Self {
        let mut line = 1usize;
        let mut col = 1usize;
        for ch in source[..offset.min(source.len())].chars() {
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Self {
            file: file.into(),
            line,
            column: col,
            offset,
        }
    }

    fn source_line<'a>(&self, source: &'a str) -> &'a str {
        source.lines().nth(self.line - 1).unwrap_or("")
    }
}

/// Domain-specific error type for the compiler pipeline.
///
/// Every variant names a failure kind from the specification's error
/// taxonomy; all carry at minimum a message and a primary [`Location`].
#[derive(Error, Debug)]
pub enum CompileError {
    /// Malformed TSX; fatal for the file.
    #[error("Failed to parse TSX: {message}")]
    ParseError {
        /// Human-readable parse failure description.
        message: String,
        /// Where parsing failed.
        location: Location,
    },

    /// A JSX tag name outside the closed recognized set (§6.1).
    #[error("Unknown component '{tag}'{suggestion}")]
    UnknownComponent {
        /// The offending tag name.
        tag: String,
        /// A "did you mean '<name>'?" suggestion, pre-formatted (empty if none).
        suggestion: String,
        /// Where the unknown tag appeared.
        location: Location,
    },

    /// A required prop/attribute is absent (e.g. `<a>` without `href`).
    #[error("Missing required prop '{prop}' on <{tag}>")]
    MissingRequiredProp {
        /// The element's tag.
        tag: String,
        /// The missing prop's name.
        prop: String,
        /// Where the element appeared.
        location: Location,
    },

    /// A child appears somewhere the grammar forbids it (block-in-paragraph,
    /// standalone `Else`/`OnStatusDefault`, `Break` outside a `Loop`, ...).
    #[error("Invalid child: {message}")]
    InvalidChild {
        /// What rule was violated.
        message: String,
        /// Where the offending child appeared.
        location: Location,
    },

    /// A `SpawnAgent`'s `input` object literal is missing a required field of
    /// the agent's declared input interface.
    #[error("Input object is missing required field '{field}' of interface '{interface}'")]
    InterfaceMismatch {
        /// The missing field's name.
        field: String,
        /// The agent input interface's name.
        interface: String,
        /// Where the `input={...}` literal appeared.
        location: Location,
        /// Where the interface was declared.
        interface_location: Location,
    },

    /// A `runtimeVarRef` path step disagrees with the declared TypeScript type.
    #[error("Unknown field '{step}' on runtime variable type `{type_text}`")]
    UnknownField {
        /// The offending path step.
        step: String,
        /// The declared (opaque) TypeScript type text.
        type_text: String,
        /// Where the reference appeared.
        location: Location,
    },

    /// Two runtime source paths declare the same bundler namespace.
    #[error("Namespace '{namespace}' is declared by two runtime files")]
    NamespaceConflict {
        /// The conflicting namespace.
        namespace: String,
        /// First declaration site.
        first: Location,
        /// Second declaration site.
        second: Location,
    },

    /// A filesystem read/write failed.
    #[error("I/O error on {path}: {source}")]
    IoError {
        /// The path that could not be read/written.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The JSON configuration is invalid or self-contradictory.
    #[error("Invalid configuration: {message}")]
    ConfigError {
        /// Description of the violated rule.
        message: String,
    },
}

impl CompileError {
    /// The primary location of this error, if it carries one.
    ///
    /// `ConfigError` has no file location (it is build-wide, not per-file).
    pub fn primary_location(&self) -> Option<&Location> {
        match self {
            CompileError::ParseError { location, .. }
            | CompileError::UnknownComponent { location, .. }
            | CompileError::MissingRequiredProp { location, .. }
            | CompileError::InvalidChild { location, .. }
            | CompileError::InterfaceMismatch { location, .. }
            | CompileError::UnknownField { location, .. } => Some(location),
            CompileError::NamespaceConflict { first, .. } => Some(first),
            CompileError::IoError { .. } | CompileError::ConfigError { .. } => None,
        }
    }
}

/// Renders a [`CompileError`] to the host's fixed diagnostic text format.
///
/// ```text
/// <file>:<line>:<col> - error: <message>
///
///    1 | <a>click</a>
///      | ^
/// Agent interface defined at: <file>:<line>:<col>
/// ```
pub struct Diagnostic<'a> {
    error: &'a CompileError,
    /// Source text of the primary file, used to render the offending line.
    source: &'a str,
}

impl<'a> Diagnostic<'a> {
    /// Builds a diagnostic for `error`, whose primary location is inside `source`.
    pub fn new(error: &'a CompileError, source: &'a str) -> Self {
        Self { error, source }
    }

    fn render_snippet(f: &mut fmt::Formatter<'_>, loc: &Location, source: &str) -> fmt::Result {
        let line_text = loc.source_line(source);
        writeln!(f)?;
        writeln!(f, "{:>4} | {line_text}", loc.line)?;
        let pad = " ".repeat(loc.column.saturating_sub(1));
        writeln!(f, "{:>4} | {pad}^", "")
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error {
            CompileError::InterfaceMismatch {
                location,
                interface_location,
                ..
            } => {
                write!(
                    f,
                    "{}:{}:{} - error: {}",
                    location.file.display(),
                    location.line,
                    location.column,
                    self.error
                )?;
                Self::render_snippet(f, location, self.source)?;
                write!(
                    f,
                    "Agent interface defined at: {}:{}:{}",
                    interface_location.file.display(),
                    interface_location.line,
                    interface_location.column
                )
            }
            other => match other.primary_location() {
                Some(location) => {
                    write!(
                        f,
                        "{}:{}:{} - error: {}",
                        location.file.display(),
                        location.line,
                        location.column,
                        other
                    )?;
                    Self::render_snippet(f, location, self.source)
                }
                None => write!(f, "error: {other}"),
            },
        }
    }
}

/// Computes a short "did you mean '<name>'?" suggestion against a closed tag
/// set, using Levenshtein distance capped at a small threshold so unrelated
/// names produce no suggestion at all.
pub fn suggest(unknown: &str, known: &[&str]) -> String {
    const MAX_DISTANCE: usize = 3;

    known
        .iter()
        .map(|candidate| (candidate, levenshtein(unknown, candidate)))
        .filter(|(_, dist)| *dist <= MAX_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(candidate, _)| format!(" (did you mean '{candidate}'?)"))
        .unwrap_or_default()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Wraps a file read/write failure with the path that caused it.
pub fn io_err(path: &Path, source: std::io::Error) -> CompileError {
    CompileError::IoError {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_from_offset_tracks_lines_and_columns() {
        let source = "line one\nline two\nline three";
        let loc = Location::from_offset("f.tsx", source, 9);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 1);
    }

    #[test]
    fn location_from_offset_mid_line() {
        let source = "abc\ndefgh";
        let loc = Location::from_offset("f.tsx", source, 6);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
    }

    #[test]
    fn suggest_finds_close_match() {
        let known = ["SpawnAgent", "OnStatus", "ReadFile"];
        assert_eq!(suggest("SpawnAgnt", &known), " (did you mean 'SpawnAgent'?)");
    }

    #[test]
    fn suggest_returns_nothing_for_unrelated_name() {
        let known = ["SpawnAgent", "OnStatus"];
        assert_eq!(suggest("Zzyzx", &known), "");
    }

    #[test]
    fn diagnostic_renders_fixed_format() {
        let source = "<a>click</a>\n";
        let loc = Location {
            file: PathBuf::from("cmd.tsx"),
            line: 1,
            column: 1,
            offset: 0,
        };
        let err = CompileError::MissingRequiredProp {
            tag: "a".into(),
            prop: "href".into(),
            location: loc,
        };
        let rendered = Diagnostic::new(&err, source).to_string();
        assert!(rendered.starts_with("cmd.tsx:1:1 - error: Missing required prop 'href' on <a>"));
        assert!(rendered.contains("1 | <a>click</a>"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn diagnostic_renders_secondary_location_for_interface_mismatch() {
        let source = "<SpawnAgent input={{}} />\n";
        let err = CompileError::InterfaceMismatch {
            field: "topic".into(),
            interface: "ResearcherInput".into(),
            location: Location {
                file: PathBuf::from("cmd.tsx"),
                line: 1,
                column: 1,
                offset: 0,
            },
            interface_location: Location {
                file: PathBuf::from("types.ts"),
                line: 3,
                column: 1,
                offset: 0,
            },
        };
        let rendered = Diagnostic::new(&err, source).to_string();
        assert!(rendered.contains("Agent interface defined at: types.ts:3:1"));
    }
}
