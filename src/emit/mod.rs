//! Emission: lowers a transformed [`crate::ir::Document`] to on-disk output
//! descriptions (§4.6, §4.7). Writing files is the driver's job; this module
//! only renders content and computes destination paths.

pub mod markdown;
pub mod v1;
pub mod v3;

use std::path::{Path, PathBuf};

use crate::ast::ParsedFile;
use crate::config::Config;
use crate::error::{CompileError, Location};
use crate::ir::Document;

/// A single rendered text file, ready to be written verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    /// Destination path, relative to the workspace root.
    pub path: PathBuf,
    /// File content.
    pub content: String,
}

/// A byte-for-byte file copy the driver must perform after `SKILL.md` is written.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyAction {
    /// Source path, resolved relative to the authoring file's directory.
    pub src: PathBuf,
    /// Destination path, relative to the workspace root.
    pub dest: PathBuf,
}

/// One V3 document's contribution to the shared bundler input (§4.8).
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeContribution {
    /// The bundler namespace (`X` in `<X.Call/>`).
    pub namespace: String,
    /// The relative TS import path this namespace resolves to.
    pub import_path: String,
    /// Function names actually invoked via `<namespace.Call/>` in this document.
    pub called_functions: Vec<String>,
    /// Where the `runtimeFn` binding was declared, for `NamespaceConflict` diagnostics.
    pub location: Location,
}

/// Everything a single document's emission produces.
#[derive(Debug, Default)]
pub struct EmitOutcome {
    /// Rendered Markdown (or SKILL.md / SkillFile) outputs.
    pub files: Vec<RenderedFile>,
    /// Pending static-file copies (Skills only).
    pub copies: Vec<CopyAction>,
    /// Bundler contributions (V3 Commands only; empty otherwise).
    pub runtime_contributions: Vec<RuntimeContribution>,
}

/// Emits one document. `source_dir` is the authoring file's parent
/// directory, used to resolve `SkillStatic.src`; `parsed` is the same file's
/// front-end result, used to locate runtime-function declarations for the
/// bundler's `NamespaceConflict` diagnostics.
pub fn emit_document(
    doc: &Document,
    parsed: &ParsedFile,
    source_dir: &Path,
    config: &Config,
) -> Result<EmitOutcome, CompileError> {
    match doc {
        Document::Command { .. } => v1::emit_command(doc, parsed, config),
        Document::Agent { .. } => v1::emit_agent(doc),
        Document::Skill { .. } => v1::emit_skill(doc, source_dir),
    }
}
