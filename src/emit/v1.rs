//! V1 emission: renders Command/Agent/Skill documents to frontmatter +
//! Markdown body, computing the literal output paths §6.2/§6.3 define.
//!
//! Command output respects the configurable `outputDir`; Agent and Skill
//! output paths are fixed (`.claude/agents/`, `.claude/skills/`) since the
//! specification lists them as literal conventions, not config knobs.

use std::path::{Path, PathBuf};

use crate::ast::ParsedFile;
use crate::config::Config;
use crate::emit::markdown::render_blocks;
use crate::emit::v3::runtime_contributions;
use crate::emit::{CopyAction, EmitOutcome, RenderedFile};
use crate::error::CompileError;
use crate::frontmatter::to_yaml;
use crate::ir::Document;

const AGENTS_OUTPUT_DIR: &str = ".claude/agents";
const SKILLS_OUTPUT_DIR: &str = ".claude/skills";

fn render_document(content_yaml: &str, body: &str) -> String {
    format!("---\n{content_yaml}---\n\n{body}")
}

/// Emits a Command document (classic or runtime).
pub fn emit_command(doc: &Document, parsed: &ParsedFile, config: &Config) -> Result<EmitOutcome, CompileError> {
    let Document::Command { meta, children, runtime_fns, .. } = doc else {
        unreachable!("emit_command called with a non-Command document")
    };

    let yaml = to_yaml(meta)?;
    let body = render_blocks(children, config);
    let content = render_document(&yaml, &body);

    let mut path = config.output_dir.clone();
    if let Some(folder) = &meta.folder {
        path.push(folder);
    }
    path.push(format!("{}.md", meta.name));

    let runtime_contributions = if runtime_fns.is_empty() {
        Vec::new()
    } else {
        runtime_contributions(doc, parsed)
    };

    Ok(EmitOutcome {
        files: vec![RenderedFile { path, content }],
        copies: Vec::new(),
        runtime_contributions,
    })
}

/// Emits an Agent document.
pub fn emit_agent(doc: &Document) -> Result<EmitOutcome, CompileError> {
    let Document::Agent { meta, children } = doc else {
        unreachable!("emit_agent called with a non-Agent document")
    };

    let yaml = to_yaml(meta)?;
    let body = render_blocks(children, &Config::default());
    let content = render_document(&yaml, &body);
    let path = PathBuf::from(AGENTS_OUTPUT_DIR).join(format!("{}.md", meta.name));

    Ok(EmitOutcome {
        files: vec![RenderedFile { path, content }],
        copies: Vec::new(),
        runtime_contributions: Vec::new(),
    })
}

/// Emits a Skill document: `SKILL.md`, one file per `SkillFile`, and the
/// pending `SkillStatic` copy actions (performed by the driver after
/// `SKILL.md` is written, per the ordering guarantee).
pub fn emit_skill(doc: &Document, source_dir: &Path) -> Result<EmitOutcome, CompileError> {
    let Document::Skill { meta, children, files, statics } = doc else {
        unreachable!("emit_skill called with a non-Skill document")
    };

    let skill_dir = PathBuf::from(SKILLS_OUTPUT_DIR).join(&meta.name);
    let config = Config::default();

    let yaml = to_yaml(meta)?;
    let body = render_blocks(children, &config);
    let mut rendered = vec![RenderedFile {
        path: skill_dir.join("SKILL.md"),
        content: render_document(&yaml, &body),
    }];

    for file in files {
        rendered.push(RenderedFile {
            path: skill_dir.join(&file.name),
            content: render_blocks(&file.children, &config),
        });
    }

    let copies = statics
        .iter()
        .map(|s| {
            let src = source_dir.join(&s.src);
            let dest_rel = s.dest.clone().unwrap_or_else(|| s.src.clone());
            CopyAction { src, dest: skill_dir.join(dest_rel) }
        })
        .collect();

    Ok(EmitOutcome { files: rendered, copies, runtime_contributions: Vec::new() })
}
