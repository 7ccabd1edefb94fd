//! # react-agentic
//!
//! Compiles TSX files describing Claude Code commands, agents, and skills
//! into frontmattered Markdown, plus an optional bundled JavaScript runtime
//! module for commands that declare runtime variables and functions.
//!
//! ## Architecture Overview
//!
//! - **`ast`**: TSX parsing front-end (oxc-based) producing a [`ast::ParsedFile`]
//!   — JSX tree, import table, runtime-variable/function declarations, and
//!   local interface/type tables (`ast::attrs`, `ast::resolver`).
//! - **`classify`**: chooses the V1 (classic) or V3 (runtime) pipeline from
//!   the root element's tag and imports.
//! - **`transform`**: JSX → IR tree-walking, shared between V1 and V3
//!   (`transform::pairing` handles `If`/`Else` and `OnStatus`/`OnStatusDefault`
//!   sibling pairing; `transform::v1`/`transform::v3` are the entry points).
//! - **`ir`**: the document/block/inline intermediate representation.
//! - **`fieldpath`**: validates `runtimeVarRef` path steps against a
//!   declared TypeScript interface/type-alias's field table.
//! - **`emit`**: renders IR to frontmattered Markdown (`emit::markdown`) and
//!   computes each document's literal output path (`emit::v1`), plus
//!   extracts bundler contributions from runtime commands (`emit::v3`).
//! - **`bundler`**: computes the external JavaScript bundler's input and
//!   defines the `Bundler` trait the embedding host implements.
//! - **`driver`**: per-build orchestration — parse → classify → transform →
//!   emit → write for every input file, recovering per-file failures into a
//!   [`driver::BuildOutcome`] without aborting the whole build.
//! - **`cache`**: per-build parsed-file cache, reused across the front-end
//!   and the driver.
//! - **`config`**: JSON build configuration (`outputDir`, `runtimeDir`,
//!   `minify`, `codeSplit`, `agentsDir`).
//! - **`frontmatter`**: YAML frontmatter serialization for document metadata.
//! - **`error`**: the domain error type and fixed-format diagnostic renderer.
//!
//! ### Compilation Pipeline
//!
//! ```text
//! *.tsx
//!   |
//!   +-> Parse (ast::parse_file)
//!   |
//!   +-> Classify (classify::classify)
//!   |
//!   +-> Transform (transform::v1 / transform::v3)
//!   |
//!   +-> Emit (emit::emit_document)
//!   |
//!   +-> Write + bundle (driver::compile_workspace)
//!         |
//!         +-> Frontmattered Markdown + optional runtime.js
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use react_agentic::config::Config;
//! use react_agentic::driver::compile_workspace;
//! use react_agentic::bundler::{Bundler, BundleEntry};
//! use react_agentic::error::CompileError;
//!
//! struct NoopBundler;
//! impl Bundler for NoopBundler {
//!     fn bundle(&self, _entries: &[BundleEntry]) -> Result<String, CompileError> {
//!         Ok(String::new())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let inputs = vec![std::path::PathBuf::from("commands/deploy.tsx")];
//! let outcome = compile_workspace(&inputs, std::path::Path::new("."), &config, &NoopBundler)?;
//! assert!(outcome.is_all_success() || !outcome.errors.is_empty());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod ast;
pub mod bundler;
pub mod cache;
pub mod classify;
pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod fieldpath;
pub mod frontmatter;
pub mod ir;
pub mod transform;
