//! Build driver (§4.10, §5): parse → classify → transform → emit → write for
//! every input file, plus the cross-document bundler step. Mirrors the
//! teacher's `BatchRenderOutcome`/`FileRenderOutcome`/`RenderBatchError`
//! trio: a single file's failure is recorded and the build continues.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::bundler::{collect_entries, Bundler};
use crate::cache::Cache;
use crate::classify::{classify, Classification};
use crate::config::Config;
use crate::emit::{emit_document, CopyAction, RuntimeContribution};
use crate::error::{io_err, CompileError, Diagnostic};
use crate::transform::{v1, v3};

/// Per-file build status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileBuildStatus {
    /// Every declared output for this file was written.
    Success,
    /// The file failed to compile; no outputs were written for it.
    Failed,
}

/// A single input file's build result.
#[derive(Debug, Clone)]
pub struct FileBuildOutcome {
    /// Whether this file's compilation and write succeeded.
    pub status: FileBuildStatus,
    /// Output paths written for this file (empty on failure).
    pub output_paths: Vec<PathBuf>,
    /// Rendered diagnostic text, present only on failure.
    pub error: Option<String>,
    /// Non-fatal warnings raised while transforming this file (e.g. `input`
    /// fields not declared on the target agent's interface).
    pub warnings: Vec<String>,
}

impl FileBuildOutcome {
    fn success(output_paths: Vec<PathBuf>, warnings: Vec<String>) -> Self {
        Self { status: FileBuildStatus::Success, output_paths, error: None, warnings }
    }

    fn failure(message: String) -> Self {
        Self { status: FileBuildStatus::Failed, output_paths: Vec::new(), error: Some(message), warnings: Vec::new() }
    }
}

/// One recorded per-file failure.
#[derive(Debug, Clone)]
pub struct BuildError {
    /// The input file that failed.
    pub file: PathBuf,
    /// Rendered diagnostic text.
    pub message: String,
}

/// The outcome of compiling an entire workspace: every file's result, with
/// no single failure aborting the rest of the build.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Total input files processed.
    pub total: usize,
    /// Files that compiled and wrote successfully.
    pub succeeded: usize,
    /// Files that failed.
    pub failed: usize,
    /// Recorded failures, one per failed file.
    pub errors: Vec<BuildError>,
    /// Per-file outcomes, keyed by input path.
    pub files: HashMap<PathBuf, FileBuildOutcome>,
}

impl BuildOutcome {
    fn new(files: HashMap<PathBuf, FileBuildOutcome>, errors: Vec<BuildError>, succeeded: usize, failed: usize) -> Self {
        Self { total: succeeded + failed, succeeded, failed, errors, files }
    }

    /// True iff every input file compiled and wrote successfully.
    pub fn is_all_success(&self) -> bool {
        self.failed == 0
    }

    /// True iff every input file failed (and at least one was processed).
    pub fn is_complete_failure(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }
}

/// Compiles every `.tsx` file in `input_paths`, writing outputs under
/// `workspace_root`, then runs the runtime bundler once over every V3
/// document's contributions.
///
/// Fails fast (before touching any file) if `config` itself is invalid;
/// per-file compile/write failures are recovered and recorded in the
/// returned [`BuildOutcome`] instead.
pub fn compile_workspace(
    input_paths: &[PathBuf],
    workspace_root: &Path,
    config: &Config,
    bundler: &dyn Bundler,
) -> Result<BuildOutcome, CompileError> {
    config.validate()?;

    let cache = Cache::new();
    let mut files = HashMap::new();
    let mut errors = Vec::new();
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut runtime_contributions: Vec<RuntimeContribution> = Vec::new();

    for path in input_paths {
        tracing::info!(file = %path.display(), "compiling");
        match compile_one(path, workspace_root, config, &cache) {
            Ok((written, contributions, warnings)) => {
                succeeded += 1;
                for warning in &warnings {
                    tracing::warn!(file = %path.display(), warning = %warning, "compile warning");
                }
                runtime_contributions.extend(contributions);
                files.insert(path.clone(), FileBuildOutcome::success(written, warnings));
            }
            Err(err) => {
                failed += 1;
                let source = cache.read_source(path).unwrap_or_default();
                let message = Diagnostic::new(&err, &source).to_string();
                tracing::warn!(file = %path.display(), error = %message, "compile failed");
                errors.push(BuildError { file: path.clone(), message: message.clone() });
                files.insert(path.clone(), FileBuildOutcome::failure(message));
            }
        }
    }

    if !runtime_contributions.is_empty() {
        let entries = collect_entries(&runtime_contributions, workspace_root)?;
        let bundled = bundler.bundle(&entries)?;
        let runtime_path = workspace_root.join(&config.runtime_dir).join("runtime.js");
        write_file(&runtime_path, &bundled)?;
    }

    Ok(BuildOutcome::new(files, errors, succeeded, failed))
}

fn compile_one(
    path: &Path,
    workspace_root: &Path,
    config: &Config,
    cache: &Cache,
) -> Result<(Vec<PathBuf>, Vec<RuntimeContribution>, Vec<String>), CompileError> {
    let parsed = cache.get_or_parse(path)?;
    let classification = classify(&parsed)?;

    let (document, warnings) = match classification {
        Classification::RuntimeCommand => v3::transform_runtime_command(&parsed, cache)?,
        Classification::Command => v1::transform_command(&parsed, cache)?,
        Classification::Agent => v1::transform_agent(&parsed, cache)?,
        Classification::Skill => v1::transform_skill(&parsed, cache)?,
    };

    let source_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let outcome = emit_document(&document, &parsed, source_dir, config)?;

    let mut written = Vec::new();
    for file in &outcome.files {
        let absolute = workspace_root.join(&file.path);
        write_file(&absolute, &file.content)?;
        written.push(file.path.clone());
    }
    for copy in &outcome.copies {
        perform_copy(copy, workspace_root)?;
    }

    Ok((written, outcome.runtime_contributions, warnings))
}

fn write_file(path: &Path, content: &str) -> Result<(), CompileError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| io_err(path, e))
}

fn perform_copy(copy: &CopyAction, workspace_root: &Path) -> Result<(), CompileError> {
    let dest = workspace_root.join(&copy.dest);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::copy(&copy.src, &dest).map_err(|e| io_err(&copy.src, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeBundler;
    impl Bundler for FakeBundler {
        fn bundle(&self, entries: &[crate::bundler::BundleEntry]) -> Result<String, CompileError> {
            Ok(entries.iter().map(|e| e.namespace.clone()).collect::<Vec<_>>().join(","))
        }
    }

    #[test]
    fn compiles_minimal_command_to_declared_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hello.tsx");
        std::fs::write(
            &input,
            r#"export default (<Command name="hello" description="say hi"><p>Hi.</p></Command>)"#,
        )
        .unwrap();

        let config = Config::default();
        let outcome = compile_workspace(&[input], dir.path(), &config, &FakeBundler).unwrap();

        assert!(outcome.is_all_success());
        let output = dir.path().join(".claude/commands/hello.md");
        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("name: hello"));
        assert!(content.contains("Hi."));
    }

    #[test]
    fn records_per_file_failure_without_aborting_build() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.tsx");
        std::fs::write(&bad, r#"export default (<Unknown/>)"#).unwrap();
        let good = dir.path().join("good.tsx");
        std::fs::write(
            &good,
            r#"export default (<Command name="good" description="d"><p>x</p></Command>)"#,
        )
        .unwrap();

        let config = Config::default();
        let outcome = compile_workspace(&[bad, good], dir.path(), &config, &FakeBundler).unwrap();

        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
        assert!(!outcome.is_all_success());
        assert!(!outcome.is_complete_failure());
    }
}
