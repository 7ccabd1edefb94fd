//! JSX → IR transformers (§4.3, §4.4): shared tree-walking engine used by
//! both the V1 classic pipeline and the V3 runtime pipeline. The two differ
//! only in which tags they accept (runtime control flow is V3-only) and in
//! how interpolations/conditions resolve (V3 has a runtime-variable table).

pub mod pairing;
pub mod v1;
pub mod v3;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ast::{AttributeValue, JsxChild, JsxNode};
use crate::cache::Cache;
use crate::error::{CompileError, Location};
use crate::fieldpath;
use crate::ir::{
    Block, Condition, InputField, InputValue, Inline, RuntimeFnImport, RuntimeVarDecl, RuntimeVarRef,
    SkillFile, SkillStatic,
};
use crate::transform::pairing::{pair_siblings, PairedChild};

/// Runtime-variable/function context, present only for V3 documents.
pub struct RuntimeContext {
    /// Declared runtime variables, by shell-variable name.
    pub vars: HashMap<String, RuntimeVarDecl>,
    /// Maps a runtime variable's local binding name to its shell name.
    pub local_to_shell: HashMap<String, String>,
    /// Declared runtime-function namespaces, by local binding name.
    pub fns: HashMap<String, RuntimeFnImport>,
    /// Functions actually invoked via `<X.Call/>`, collected as transformation proceeds.
    pub called_functions: Vec<(String, String)>,
}

/// Shared transformation state threaded through the tree walk.
pub struct TransformCtx<'a> {
    /// The file being transformed, for diagnostics.
    pub file: &'a Path,
    /// The file's source text, for diagnostics.
    pub source: &'a str,
    /// Per-build front-end cache, for cross-file agent-interface resolution.
    pub cache: &'a Cache,
    /// Runtime context, `Some` only for V3 documents.
    pub runtime: Option<RuntimeContext>,
    /// Non-fatal warnings accumulated during transformation (extra `input` fields).
    pub warnings: Vec<String>,
    /// Number of `Loop` ancestors enclosing the node currently being walked.
    pub loop_depth: u32,
}

impl<'a> TransformCtx<'a> {
    fn location(&self, offset: usize) -> Location {
        Location::from_offset(self.file.to_path_buf(), self.source, offset)
    }
}

/// Transforms a container's element children into block IR, applying
/// sibling pairing and the per-tag dispatch table.
pub fn transform_children(children: &[JsxNode], ctx: &mut TransformCtx<'_>) -> Result<Vec<Block>, CompileError> {
    let paired = pair_siblings(children, ctx.file, ctx.source)?;
    let mut blocks = Vec::with_capacity(paired.len());
    for entry in paired {
        match entry {
            PairedChild::Plain(node) => blocks.push(transform_block(node, ctx)?),
            PairedChild::IfElse { if_node, else_node } => {
                blocks.extend(transform_if(if_node, else_node, ctx)?)
            }
            PairedChild::OnStatusPair {
                on_status,
                on_status_default,
            } => blocks.extend(transform_on_status(on_status, on_status_default, ctx)?),
            PairedChild::StandaloneOnStatusDefault(node) => {
                let output_ref = attr_identifier(node, "output", ctx)?;
                let children = transform_children(&child_elements(node), ctx)?;
                blocks.push(Block::OnStatusDefault { output_ref, children });
            }
        }
    }
    Ok(blocks)
}

pub(crate) fn child_elements(node: &JsxNode) -> Vec<JsxNode> {
    node.element_children().cloned().collect()
}

fn transform_block(node: &JsxNode, ctx: &mut TransformCtx<'_>) -> Result<Block, CompileError> {
    match node.tag.as_str() {
        "h1" => heading(node, 1, ctx),
        "h2" => heading(node, 2, ctx),
        "h3" => heading(node, 3, ctx),
        "h4" => heading(node, 4, ctx),
        "h5" => heading(node, 5, ctx),
        "h6" => heading(node, 6, ctx),
        "p" | "Markdown" => Ok(Block::Paragraph(inline_children(node, ctx)?)),
        "ul" => list(node, false, ctx),
        "ol" => list(node, true, ctx),
        "li" => Ok(Block::ListItem(transform_children(&child_elements(node), ctx)?)),
        "blockquote" => Ok(Block::Blockquote(transform_children(&child_elements(node), ctx)?)),
        "pre" => code_block(node, ctx),
        "hr" => Ok(Block::ThematicBreak),
        "table" => table(node, ctx),
        "Indent" => Ok(Block::Indent(transform_children(&child_elements(node), ctx)?)),
        "XmlBlock" => Ok(Block::XmlBlock(text_content(node))),
        "ExecutionContext" => Ok(Block::ExecutionContext(transform_children(
            &child_elements(node),
            ctx,
        )?)),
        "Step" => Ok(Block::Step(transform_children(&child_elements(node), ctx)?)),
        "ReadFile" => read_file(node, ctx),
        "SpawnAgent" => spawn_agent(node, ctx),
        "AskUser" => ask_user(node, ctx),
        "Loop" => loop_block(node, ctx),
        "Break" => {
            if ctx.loop_depth == 0 {
                return Err(CompileError::InvalidChild {
                    message: "`Break` used outside a `Loop`".to_string(),
                    location: ctx.location(node.offset),
                });
            }
            Ok(Block::Break {
                message: attr_string_opt(node, "message"),
            })
        }
        "Return" => Ok(Block::Return {
            status: attr_string_opt(node, "status"),
            message: attr_string_opt(node, "message"),
        }),
        tag if tag.ends_with(".Call") => call_site(node, ctx),
        "b" | "strong" | "i" | "em" | "code" | "a" | "br" => {
            Ok(Block::Paragraph(vec![transform_inline(node, ctx)?]))
        }
        other => Err(unknown_component(other, node.offset, ctx)),
    }
}

fn unknown_component(tag: &str, offset: usize, ctx: &TransformCtx<'_>) -> CompileError {
    const KNOWN_TAGS: &[&str] = &[
        "Command", "Agent", "Skill", "SkillFile", "SkillStatic", "h1", "h2", "h3", "h4", "h5", "h6",
        "p", "b", "i", "strong", "em", "code", "a", "ul", "ol", "li", "blockquote", "pre", "br", "hr",
        "Markdown", "XmlBlock", "table", "Step", "ExecutionContext", "Indent", "SpawnAgent",
        "OnStatus", "OnStatusDefault", "ReadFile", "If", "Else", "Loop", "Break", "Return", "AskUser",
    ];
    CompileError::UnknownComponent {
        tag: tag.to_string(),
        suggestion: crate::error::suggest(tag, KNOWN_TAGS),
        location: ctx.location(offset),
    }
}

fn heading(node: &JsxNode, level: u8, ctx: &mut TransformCtx<'_>) -> Result<Block, CompileError> {
    Ok(Block::Heading {
        level,
        children: inline_children(node, ctx)?,
    })
}

fn list(node: &JsxNode, ordered: bool, ctx: &mut TransformCtx<'_>) -> Result<Block, CompileError> {
    let start = attr_number_opt(node, "start").unwrap_or(1.0) as u32;
    let items = child_elements(node)
        .iter()
        .map(|li| transform_block(li, ctx))
        .collect::<Result<_, _>>()?;
    Ok(Block::List { ordered, start, items })
}

fn code_block(node: &JsxNode, ctx: &mut TransformCtx<'_>) -> Result<Block, CompileError> {
    let lang = node
        .element_children()
        .next()
        .and_then(|inner| inner.get_attribute("className"))
        .and_then(AttributeValue::as_str)
        .and_then(|class| class.strip_prefix("language-"))
        .map(str::to_string);
    let code = text_content(node).trim().to_string();
    let _ = ctx;
    Ok(Block::CodeBlock { lang, code })
}

fn table(node: &JsxNode, ctx: &mut TransformCtx<'_>) -> Result<Block, CompileError> {
    let mut header = Vec::new();
    let mut rows = Vec::new();
    for row in table_rows(node) {
        let cells = row
            .element_children()
            .map(|cell| inline_children(cell, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        if row.element_children().next().map(|c| c.tag.as_str()) == Some("th") {
            header = cells;
        } else {
            rows.push(cells);
        }
    }
    Ok(Block::Table { header, rows })
}

/// Flattens optional `thead`/`tbody` wrappers: `<tr>` rows may appear
/// directly under `<table>` or nested one level inside a section element.
fn table_rows(node: &JsxNode) -> Vec<JsxNode> {
    child_elements(node)
        .into_iter()
        .flat_map(|child| {
            if child.tag == "thead" || child.tag == "tbody" {
                child_elements(&child)
            } else {
                vec![child]
            }
        })
        .collect()
}

fn read_file(node: &JsxNode, ctx: &TransformCtx<'_>) -> Result<Block, CompileError> {
    let path = attr_string(node, "path", ctx)?;
    let as_var = attr_string(node, "as", ctx)?;
    let optional = node
        .get_attribute("optional")
        .and_then(AttributeValue::as_bool)
        .unwrap_or(false);
    Ok(Block::ReadFile { path, as_var, optional })
}

fn spawn_agent(node: &JsxNode, ctx: &mut TransformCtx<'_>) -> Result<Block, CompileError> {
    let agent = attr_string(node, "agent", ctx)?;
    let description = attr_string(node, "description", ctx)?;
    let model = attr_string_opt(node, "model");
    let prompt = attr_string_opt(node, "prompt").unwrap_or_default();
    let read_agent_file = node.has_attribute("readAgentFile");
    let input_type = node.type_arg.clone();

    let input = match node.get_attribute("input") {
        Some(AttributeValue::Object(fields)) => {
            let resolved = fields
                .iter()
                .map(|(name, value)| input_field(name, value, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(type_name) = &input_type {
                validate_agent_interface(node, type_name, &resolved, ctx)?;
            }
            Some(resolved)
        }
        Some(AttributeValue::PathRef(_)) | None => None,
        Some(_) => None,
    };

    Ok(Block::SpawnAgent {
        agent,
        description,
        model,
        prompt,
        read_agent_file,
        input,
        input_type,
    })
}

fn input_field(name: &str, value: &AttributeValue, ctx: &TransformCtx<'_>) -> Result<InputField, CompileError> {
    let value = match value {
        AttributeValue::String(s) => InputValue::String(s.clone()),
        AttributeValue::Number(n) => InputValue::Number(*n),
        AttributeValue::Bool(b) => InputValue::Bool(*b),
        AttributeValue::PathRef(path) => InputValue::RuntimeVar(runtime_var_ref(path, ctx)?),
        _ => InputValue::String(String::new()),
    };
    Ok(InputField { name: name.to_string(), value })
}

fn validate_agent_interface(
    node: &JsxNode,
    type_name: &str,
    resolved: &[InputField],
    ctx: &mut TransformCtx<'_>,
) -> Result<(), CompileError> {
    let Some((descriptor, interface_location)) =
        crate::ast::resolver::resolve_type(ctx.cache, ctx.file, type_name)?
    else {
        return Ok(());
    };

    let declared: std::collections::HashSet<&str> =
        descriptor.fields.iter().map(|f| f.name.as_str()).collect();
    let provided: std::collections::HashSet<&str> =
        resolved.iter().map(|f| f.name.as_str()).collect();

    for field in &descriptor.fields {
        if field.required && !provided.contains(field.name.as_str()) {
            return Err(CompileError::InterfaceMismatch {
                field: field.name.clone(),
                interface: type_name.to_string(),
                location: ctx.location(node.offset),
                interface_location,
            });
        }
    }

    for field in resolved {
        if !declared.contains(field.name.as_str()) {
            let location = ctx.location(node.offset);
            ctx.warnings.push(format!(
                "{}:{}:{}: `input` field '{}' is not declared on interface '{type_name}'",
                location.file.display(),
                location.line,
                location.column,
                field.name
            ));
        }
    }
    Ok(())
}

fn ask_user(node: &JsxNode, ctx: &TransformCtx<'_>) -> Result<Block, CompileError> {
    let question = attr_string(node, "question", ctx)?;
    let options = match node.get_attribute("options") {
        Some(AttributeValue::Array(items)) => items
            .iter()
            .filter_map(AttributeValue::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    let header = attr_string_opt(node, "header");
    let description = attr_string_opt(node, "description");
    let output_var = attr_identifier(node, "output", ctx)?;
    Ok(Block::AskUser {
        question,
        options,
        header,
        description,
        output_var,
    })
}

fn loop_block(node: &JsxNode, ctx: &mut TransformCtx<'_>) -> Result<Block, CompileError> {
    let max_iterations = attr_number_opt(node, "times").unwrap_or(1.0) as u32;
    let counter_var = attr_string_opt(node, "counter").unwrap_or_else(|| "I".to_string());
    ctx.loop_depth += 1;
    let children = transform_children(&child_elements(node), ctx);
    ctx.loop_depth -= 1;
    Ok(Block::Loop { max_iterations, counter_var, children: children? })
}

fn call_site(node: &JsxNode, ctx: &mut TransformCtx<'_>) -> Result<Block, CompileError> {
    let (namespace, function) = node
        .tag
        .split_once('.')
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .unwrap_or((node.tag.clone(), String::new()));

    let args = match node.get_attribute("args") {
        Some(AttributeValue::Object(fields)) => fields
            .iter()
            .map(|(name, value)| input_field(name, value, ctx))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };
    let output_var = node
        .get_attribute("output")
        .and_then(AttributeValue::as_identifier)
        .map(str::to_string);

    if let Some(runtime) = ctx.runtime.as_mut() {
        if let Some(import) = runtime.fns.get(&namespace) {
            runtime.called_functions.push((import.namespace.clone(), function.clone()));
        }
    }

    Ok(Block::Call { namespace, function, args, output_var })
}

fn transform_if(
    if_node: &JsxNode,
    else_node: Option<&JsxNode>,
    ctx: &mut TransformCtx<'_>,
) -> Result<Vec<Block>, CompileError> {
    let condition = attr_condition(if_node, "cond", ctx)?;
    let children = transform_children(&child_elements(if_node), ctx)?;
    let mut blocks = vec![Block::If { condition, children }];
    if let Some(else_node) = else_node {
        let else_children = transform_children(&child_elements(else_node), ctx)?;
        blocks.push(Block::Else { children: else_children });
    }
    Ok(blocks)
}

fn transform_on_status(
    on_status: &JsxNode,
    on_status_default: Option<&JsxNode>,
    ctx: &mut TransformCtx<'_>,
) -> Result<Vec<Block>, CompileError> {
    let output_ref = attr_identifier(on_status, "output", ctx)?;
    let status = attr_string(on_status, "status", ctx)?;
    let children = transform_children(&child_elements(on_status), ctx)?;

    let mut combined = vec![Block::OnStatus { output_ref: output_ref.clone(), status, children }];
    if let Some(default_node) = on_status_default {
        let default_children = transform_children(&child_elements(default_node), ctx)?;
        combined.push(Block::OnStatusDefault { output_ref, children: default_children });
    }
    Ok(combined)
}

/// Builds an inline-children vector for a node whose children may mix text,
/// inline elements, and runtime-variable interpolations.
fn inline_children(node: &JsxNode, ctx: &mut TransformCtx<'_>) -> Result<Vec<Inline>, CompileError> {
    let mut inlines = Vec::new();
    for child in &node.children {
        match child {
            JsxChild::Text { value, .. } => inlines.push(Inline::Text(value.clone())),
            JsxChild::Element(el) => inlines.push(transform_inline(el, ctx)?),
            JsxChild::Expression { value, offset } => {
                let path = match value {
                    AttributeValue::PathRef(path) => path.clone(),
                    _ => continue,
                };
                let reference = runtime_var_ref_at(&path, *offset, ctx)?;
                inlines.push(Inline::RuntimeVarInterpolation(reference));
            }
        }
    }
    Ok(inlines)
}

fn transform_inline(node: &JsxNode, ctx: &mut TransformCtx<'_>) -> Result<Inline, CompileError> {
    match node.tag.as_str() {
        "b" | "strong" => Ok(Inline::Bold(inline_children(node, ctx)?)),
        "i" | "em" => Ok(Inline::Italic(inline_children(node, ctx)?)),
        "code" => Ok(Inline::InlineCode(flatten_text(node))),
        "a" => {
            let href = node
                .get_attribute("href")
                .and_then(AttributeValue::as_str)
                .map(str::to_string)
                .ok_or_else(|| CompileError::MissingRequiredProp {
                    tag: "a".to_string(),
                    prop: "href".to_string(),
                    location: ctx.location(node.offset),
                })?;
            Ok(Inline::Link { text: inline_children(node, ctx)?, href })
        }
        "br" => Ok(Inline::LineBreak),
        other => Err(unknown_component(other, node.offset, ctx)),
    }
}

fn flatten_text(node: &JsxNode) -> String {
    text_content(node)
}

fn text_content(node: &JsxNode) -> String {
    let mut out = String::new();
    for child in &node.children {
        match child {
            JsxChild::Text { value, .. } => out.push_str(value),
            JsxChild::Element(el) => out.push_str(&text_content(el)),
            JsxChild::Expression { .. } => {}
        }
    }
    out
}

fn runtime_var_ref(path: &[String], ctx: &TransformCtx<'_>) -> Result<RuntimeVarRef, CompileError> {
    runtime_var_ref_at(path, 0, ctx)
}

fn runtime_var_ref_at(
    path: &[String],
    offset: usize,
    ctx: &TransformCtx<'_>,
) -> Result<RuntimeVarRef, CompileError> {
    let Some(runtime) = ctx.runtime.as_ref() else {
        return Err(CompileError::InvalidChild {
            message: "runtime-variable reference used outside a runtime command".to_string(),
            location: ctx.location(offset),
        });
    };
    let Some((local_name, rest)) = path.split_first() else {
        return Err(CompileError::InvalidChild {
            message: "empty variable reference".to_string(),
            location: ctx.location(offset),
        });
    };
    let Some(shell_name) = runtime.local_to_shell.get(local_name) else {
        return Err(CompileError::InvalidChild {
            message: format!("'{local_name}' is not a declared runtime variable"),
            location: ctx.location(offset),
        });
    };
    let decl = &runtime.vars[shell_name];
    let schema = fieldpath::parse_type_text(&decl.ts_type);
    if let Err(step) = fieldpath::validate_path(&schema, rest) {
        return Err(CompileError::UnknownField {
            step: step.to_string(),
            type_text: decl.ts_type.clone(),
            location: ctx.location(offset),
        });
    }
    Ok(RuntimeVarRef { var_name: shell_name.clone(), path: rest.to_vec() })
}

fn attr_condition(node: &JsxNode, name: &str, ctx: &TransformCtx<'_>) -> Result<Condition, CompileError> {
    match node.get_attribute(name) {
        Some(AttributeValue::Bool(b)) => Ok(Condition::Literal(*b)),
        Some(AttributeValue::PathRef(path)) => Ok(Condition::Ref(runtime_var_ref(path, ctx)?)),
        Some(AttributeValue::Object(fields)) => condition_from_object(fields, ctx),
        _ => Err(CompileError::MissingRequiredProp {
            tag: node.tag.clone(),
            prop: name.to_string(),
            location: ctx.location(node.offset),
        }),
    }
}

fn condition_from_object(
    fields: &[(String, AttributeValue)],
    ctx: &TransformCtx<'_>,
) -> Result<Condition, CompileError> {
    let get = |key: &str| fields.iter().find(|(k, _)| k == key).map(|(_, v)| v);
    match get("type").and_then(AttributeValue::as_str) {
        Some("literal") => Ok(Condition::Literal(
            get("value").and_then(AttributeValue::as_bool).unwrap_or(false),
        )),
        Some("ref") => {
            let path = match get("ref") {
                Some(AttributeValue::PathRef(path)) => path.clone(),
                _ => Vec::new(),
            };
            Ok(Condition::Ref(runtime_var_ref(&path, ctx)?))
        }
        Some("eq") => {
            let left_path = match get("left") {
                Some(AttributeValue::PathRef(path)) => path.clone(),
                _ => Vec::new(),
            };
            let right = get("right").and_then(AttributeValue::as_str).unwrap_or_default();
            Ok(Condition::Eq {
                left: runtime_var_ref(&left_path, ctx)?,
                right: right.to_string(),
            })
        }
        Some("not") => {
            let inner = match get("inner") {
                Some(AttributeValue::Object(fields)) => condition_from_object(fields, ctx)?,
                _ => Condition::Literal(false),
            };
            Ok(Condition::Not(Box::new(inner)))
        }
        Some("and") | Some("or") => {
            let items = match get("items").or_else(|| get("conditions")) {
                Some(AttributeValue::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            let parsed = items
                .iter()
                .filter_map(|item| match item {
                    AttributeValue::Object(fields) => condition_from_object(fields, ctx).ok(),
                    _ => None,
                })
                .collect();
            if get("type").and_then(AttributeValue::as_str) == Some("and") {
                Ok(Condition::And(parsed))
            } else {
                Ok(Condition::Or(parsed))
            }
        }
        _ => Ok(Condition::Literal(false)),
    }
}

pub(crate) fn attr_string(node: &JsxNode, name: &str, ctx: &TransformCtx<'_>) -> Result<String, CompileError> {
    node.get_attribute(name)
        .and_then(AttributeValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| CompileError::MissingRequiredProp {
            tag: node.tag.clone(),
            prop: name.to_string(),
            location: ctx.location(node.offset),
        })
}

pub(crate) fn attr_string_opt(node: &JsxNode, name: &str) -> Option<String> {
    node.get_attribute(name).and_then(AttributeValue::as_str).map(str::to_string)
}

pub(crate) fn attr_string_array_opt(node: &JsxNode, name: &str) -> Option<Vec<String>> {
    match node.get_attribute(name) {
        Some(AttributeValue::Array(items)) => {
            let strings: Vec<String> = items
                .iter()
                .filter_map(AttributeValue::as_str)
                .map(str::to_string)
                .collect();
            if strings.is_empty() {
                None
            } else {
                Some(strings)
            }
        }
        _ => None,
    }
}

pub(crate) fn attr_bool_opt(node: &JsxNode, name: &str) -> Option<bool> {
    node.get_attribute(name).and_then(AttributeValue::as_bool)
}

fn attr_number_opt(node: &JsxNode, name: &str) -> Option<f64> {
    match node.get_attribute(name) {
        Some(AttributeValue::Number(n)) => Some(*n),
        _ => None,
    }
}

fn attr_identifier(node: &JsxNode, name: &str, ctx: &TransformCtx<'_>) -> Result<String, CompileError> {
    node.get_attribute(name)
        .and_then(AttributeValue::as_identifier)
        .map(str::to_string)
        .ok_or_else(|| CompileError::MissingRequiredProp {
            tag: node.tag.clone(),
            prop: name.to_string(),
            location: ctx.location(node.offset),
        })
}

/// Partitions a `<Skill>`'s element children into body blocks, generated
/// files, and static copies (§4.3's skill-collection algorithm).
pub fn collect_skill_children(
    node: &JsxNode,
    ctx: &mut TransformCtx<'_>,
) -> Result<(Vec<Block>, Vec<SkillFile>, Vec<SkillStatic>), CompileError> {
    let mut body = Vec::new();
    let mut files = Vec::new();
    let mut statics = Vec::new();

    for child in node.element_children() {
        match child.tag.as_str() {
            "SkillFile" => {
                let name = attr_string(child, "name", ctx)?;
                let children = transform_children(&child_elements(child), ctx)?;
                files.push(SkillFile { name, children });
            }
            "SkillStatic" => {
                let src = attr_string(child, "src", ctx)?;
                let dest = attr_string_opt(child, "dest");
                statics.push(SkillStatic { src, dest });
            }
            _ => body.push(transform_block(child, ctx)?),
        }
    }

    let mut seen = std::collections::HashSet::new();
    for file in &files {
        if !seen.insert(file.name.clone()) {
            return Err(CompileError::InvalidChild {
                message: format!("duplicate skill output path '{}'", file.name),
                location: ctx.location(node.offset),
            });
        }
    }

    Ok((body, files, statics))
}

pub(crate) fn base_path(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
