//! Per-build front-end cache.
//!
//! An owned value, not process-global state (per the design note "cache as
//! a value"): maps absolute path to parsed file, and tracks each file's
//! mtime so a watch host can invalidate only the files that changed between
//! builds. Write-once/read-many within a single build.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

use crate::ast::{parse_file, ParsedFile};
use crate::error::{io_err, CompileError};

struct Entry {
    parsed: Rc<ParsedFile>,
    mtime: Option<SystemTime>,
}

/// A per-build cache of parsed files, keyed by canonical path.
///
/// Not `Sync`: the concurrency model (§5) runs the front-end single-threaded
/// per document, so interior mutability via `RefCell` is sufficient and
/// avoids locking overhead a `Mutex` would add for no benefit here.
#[derive(Default)]
pub struct Cache {
    entries: RefCell<HashMap<PathBuf, Entry>>,
}

impl Cache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed file at `path`, parsing and caching it on first access.
    pub fn get_or_parse(&self, path: &Path) -> Result<Rc<ParsedFile>, CompileError> {
        let key = path.to_path_buf();
        if let Some(entry) = self.entries.borrow().get(&key) {
            tracing::debug!(path = %path.display(), "cache hit");
            return Ok(Rc::clone(&entry.parsed));
        }

        tracing::debug!(path = %path.display(), "cache miss, parsing");
        let source = self.read_source(path)?;
        let parsed = Rc::new(parse_file(path, &source)?);
        let mtime = std::fs::metadata(path).ok().and_then(|m| m.modified().ok());
        self.entries.borrow_mut().insert(
            key,
            Entry {
                parsed: Rc::clone(&parsed),
                mtime,
            },
        );
        Ok(parsed)
    }

    /// Reads a file's raw source text, independent of whether it is cached
    /// as a [`ParsedFile`] (used by the resolver for import-path scanning).
    pub fn read_source(&self, path: &Path) -> Result<String, CompileError> {
        if let Some(entry) = self.entries.borrow().get(path) {
            return Ok(entry.parsed.source.clone());
        }
        std::fs::read_to_string(path).map_err(|e| io_err(path, e))
    }

    /// Drops cache entries for files whose on-disk mtime has since changed,
    /// so the next `get_or_parse` call re-parses them. Files that no longer
    /// exist are also dropped.
    pub fn invalidate_stale(&self) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|path, entry| {
            let current_mtime = std::fs::metadata(path).ok().and_then(|m| m.modified().ok());
            current_mtime == entry.mtime
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_parsed_file_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmd.tsx");
        std::fs::write(
            &path,
            r#"export default (<Command name="hello" description="hi"><p>Hi.</p></Command>)"#,
        )
        .unwrap();

        let cache = Cache::new();
        let first = cache.get_or_parse(&path).unwrap();
        let second = cache.get_or_parse(&path).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalidate_stale_drops_changed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmd.tsx");
        std::fs::write(&path, r#"export default (<Command name="a" description="b"/>)"#).unwrap();

        let cache = Cache::new();
        let first = cache.get_or_parse(&path).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));
        std::fs::write(&path, r#"export default (<Command name="c" description="d"/>)"#).unwrap();

        cache.invalidate_stale();
        let second = cache.get_or_parse(&path).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
    }
}
