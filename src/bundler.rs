//! Runtime-function bundler adapter (§4.8).
//!
//! The actual JavaScript bundler is an external collaborator — this module
//! only computes its input (one [`BundleEntry`] per distinct runtime-source
//! path, each with its exported-function set) and defines the `Bundler`
//! trait the embedding host implements, so tests can substitute a fake
//! rather than shelling out to a real toolchain.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_ast::ast::{Declaration, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::emit::RuntimeContribution;
use crate::error::{io_err, CompileError, Location};

/// One distinct runtime-source file's contribution to the bundler input.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleEntry {
    /// The bundler namespace this source file is addressed as.
    pub namespace: String,
    /// Absolute or workspace-relative path to the TS runtime source.
    pub source_path: PathBuf,
    /// Top-level `export function` names found in the source file.
    pub exported_functions: Vec<String>,
}

/// The external bundler that turns [`BundleEntry`] inputs into one
/// JavaScript file exposing a `namespace.fnName` dispatch interface.
pub trait Bundler {
    /// Produces the bundled JavaScript source.
    fn bundle(&self, entries: &[BundleEntry]) -> Result<String, CompileError>;
}

/// Merges every V3 document's runtime contributions into the bundler's
/// input set. Two source paths claiming the same namespace is a hard error
/// carrying both declaration locations.
pub fn collect_entries(
    contributions: &[RuntimeContribution],
    workspace_root: &Path,
) -> Result<Vec<BundleEntry>, CompileError> {
    let mut claimed: HashMap<String, (PathBuf, Location)> = HashMap::new();
    let mut entries = Vec::new();

    for contribution in contributions {
        let source_path = workspace_root.join(&contribution.import_path);

        if let Some((existing_path, existing_location)) = claimed.get(&contribution.namespace) {
            if *existing_path != source_path {
                tracing::warn!(
                    namespace = %contribution.namespace,
                    first = %existing_path.display(),
                    second = %source_path.display(),
                    "namespace claimed by two runtime sources"
                );
                return Err(CompileError::NamespaceConflict {
                    namespace: contribution.namespace.clone(),
                    first: existing_location.clone(),
                    second: contribution.location.clone(),
                });
            }
            continue;
        }

        claimed.insert(
            contribution.namespace.clone(),
            (source_path.clone(), contribution.location.clone()),
        );
        tracing::info!(namespace = %contribution.namespace, path = %source_path.display(), "bundling runtime source");
        entries.push(BundleEntry {
            namespace: contribution.namespace.clone(),
            exported_functions: exported_function_names(&source_path)?,
            source_path,
        });
    }

    Ok(entries)
}

fn exported_function_names(path: &Path) -> Result<Vec<String>, CompileError> {
    let source = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_default().with_module(true);
    let parser_return = Parser::new(&allocator, &source, source_type).parse();

    let mut names = Vec::new();
    for stmt in &parser_return.program.body {
        if let Statement::ExportNamedDeclaration(export) = stmt {
            if let Some(Declaration::FunctionDeclaration(func)) = &export.declaration {
                if let Some(id) = &func.id {
                    names.push(id.name.as_str().to_string());
                }
            }
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(namespace: &str, import_path: &str) -> RuntimeContribution {
        RuntimeContribution {
            namespace: namespace.to_string(),
            import_path: import_path.to_string(),
            called_functions: vec!["listIssues".to_string()],
            location: Location { file: PathBuf::from("cmd.tsx"), line: 1, column: 1, offset: 0 },
        }
    }

    #[test]
    fn collects_exported_function_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gh.ts");
        std::fs::write(&path, "export function listIssues() {}\nfunction helper() {}\n").unwrap();

        let contributions = vec![contribution("Gh", "gh.ts")];
        let entries = collect_entries(&contributions, dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].exported_functions, vec!["listIssues".to_string()]);
    }

    #[test]
    fn rejects_namespace_claimed_by_two_source_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gh.ts"), "export function a() {}\n").unwrap();
        std::fs::write(dir.path().join("other.ts"), "export function b() {}\n").unwrap();

        let contributions = vec![contribution("Gh", "gh.ts"), contribution("Gh", "other.ts")];
        let err = collect_entries(&contributions, dir.path()).unwrap_err();
        assert!(matches!(err, CompileError::NamespaceConflict { .. }));
    }
}
