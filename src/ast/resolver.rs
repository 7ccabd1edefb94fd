//! Cross-file type resolution: follows `import { X } from "./path"` chains
//! to the file that declares interface/type-alias `X`.

use std::path::{Path, PathBuf};

use crate::ast::attrs::TypeDescriptor;
use crate::cache::Cache;
use crate::error::{CompileError, Location};

/// Resolves `symbol_name` to its declaring interface/type alias, following
/// relative-import chains starting from `from_file`.
///
/// Returns `None` if `symbol_name` is declared locally in `from_file`
/// (callers should check `ParsedFile::local_types` first); this function is
/// for the case where the symbol must be imported from elsewhere.
pub fn resolve_type(
    cache: &Cache,
    from_file: &Path,
    symbol_name: &str,
) -> Result<Option<(TypeDescriptor, Location)>, CompileError> {
    let parsed = cache.get_or_parse(from_file)?;

    if let Some(descriptor) = parsed.local_types.get(symbol_name) {
        let location = parsed.location_at(descriptor.offset);
        return Ok(Some((descriptor.clone(), location)));
    }

    match parsed.import_sources.get(symbol_name) {
        Some(spec) if spec.starts_with('.') => {
            let path = resolve_relative_module(from_file, spec);
            tracing::debug!(symbol = symbol_name, path = %path.display(), "following import chain");
            resolve_type(cache, &path, symbol_name)
        }
        _ => Ok(None),
    }
}

fn resolve_relative_module(from_file: &Path, spec: &str) -> PathBuf {
    let base = from_file.parent().unwrap_or_else(|| Path::new("."));
    let mut candidate = base.join(spec);
    if candidate.extension().is_none() {
        candidate.set_extension("ts");
        if !candidate.exists() {
            candidate.set_extension("tsx");
        }
    }
    candidate
}
