//! V1 transformer entry points: assembles a [`crate::ir::Document`] for
//! classic Command, Agent, and Skill files.

use crate::ast::{JsxNode, ParsedFile};
use crate::cache::Cache;
use crate::error::CompileError;
use crate::ir::{AgentMeta, CommandMeta, Document, SkillMeta};
use crate::transform::{
    attr_bool_opt, attr_string, attr_string_array_opt, attr_string_opt, child_elements,
    collect_skill_children, transform_children, TransformCtx,
};

fn new_ctx<'a>(parsed: &'a ParsedFile, cache: &'a Cache) -> TransformCtx<'a> {
    TransformCtx {
        file: &parsed.path,
        source: &parsed.source,
        cache,
        runtime: None,
        warnings: Vec::new(),
        loop_depth: 0,
    }
}

/// Transforms a classic (non-runtime) `Command` document. Returns the
/// document plus any non-fatal warnings accumulated while walking it.
pub fn transform_command(parsed: &ParsedFile, cache: &Cache) -> Result<(Document, Vec<String>), CompileError> {
    let root = root_node(parsed)?;
    let mut ctx = new_ctx(parsed, cache);

    let meta = CommandMeta {
        name: attr_string(root, "name", &ctx)?,
        description: attr_string(root, "description", &ctx)?,
        argument_hint: attr_string_opt(root, "argument-hint").or_else(|| attr_string_opt(root, "argumentHint")),
        agent: attr_string_opt(root, "agent"),
        allowed_tools: attr_string_array_opt(root, "allowedTools"),
        folder: attr_string_opt(root, "folder"),
    };

    let children = transform_children(&child_elements(root), &mut ctx)?;
    let document = Document::Command {
        meta,
        runtime_vars: Vec::new(),
        runtime_fns: Vec::new(),
        children,
    };
    Ok((document, ctx.warnings))
}

/// Transforms an `Agent` document. Returns the document plus any non-fatal
/// warnings accumulated while walking it.
pub fn transform_agent(parsed: &ParsedFile, cache: &Cache) -> Result<(Document, Vec<String>), CompileError> {
    let root = root_node(parsed)?;
    let mut ctx = new_ctx(parsed, cache);

    let meta = AgentMeta {
        name: attr_string(root, "name", &ctx)?,
        description: attr_string(root, "description", &ctx)?,
        tools: attr_string_array_opt(root, "tools"),
        color: attr_string_opt(root, "color"),
        input_type: root.type_arg.clone().or_else(|| attr_string_opt(root, "inputType")),
        output_type: attr_string_opt(root, "outputType"),
    };

    let children = transform_children(&child_elements(root), &mut ctx)?;
    Ok((Document::Agent { meta, children }, ctx.warnings))
}

/// Transforms a `Skill` document. Returns the document plus any non-fatal
/// warnings accumulated while walking it.
pub fn transform_skill(parsed: &ParsedFile, cache: &Cache) -> Result<(Document, Vec<String>), CompileError> {
    let root = root_node(parsed)?;
    let mut ctx = new_ctx(parsed, cache);

    let meta = SkillMeta {
        name: attr_string(root, "name", &ctx)?,
        description: attr_string(root, "description", &ctx)?,
        disable_model_invocation: attr_bool_opt(root, "disableModelInvocation"),
        user_invocable: attr_bool_opt(root, "userInvocable"),
        allowed_tools: attr_string_array_opt(root, "allowedTools"),
        argument_hint: attr_string_opt(root, "argumentHint"),
        model: attr_string_opt(root, "model"),
        context: attr_string_opt(root, "context"),
        agent: attr_string_opt(root, "agent"),
    };

    let (children, files, statics) = collect_skill_children(root, &mut ctx)?;
    Ok((Document::Skill { meta, children, files, statics }, ctx.warnings))
}

fn root_node(parsed: &ParsedFile) -> Result<&JsxNode, CompileError> {
    parsed.root.as_ref().ok_or_else(|| CompileError::ParseError {
        message: "no JSX reachable from `export default`".to_string(),
        location: parsed.location_at(0),
    })
}
