//! V3 runtime transformer entry point: assembles a [`crate::ir::Document`]
//! for a runtime-enabled `Command` (§4.4).

use std::collections::HashMap;

use crate::ast::ParsedFile;
use crate::cache::Cache;
use crate::error::CompileError;
use crate::ir::{CommandMeta, Document, RuntimeFnImport, RuntimeVarDecl};
use crate::transform::{
    attr_string, attr_string_array_opt, attr_string_opt, child_elements, transform_children,
    RuntimeContext, TransformCtx,
};

/// Transforms a runtime-enabled `Command` document. Returns the document
/// plus any non-fatal warnings accumulated while walking it.
pub fn transform_runtime_command(
    parsed: &ParsedFile,
    cache: &Cache,
) -> Result<(Document, Vec<String>), CompileError> {
    let root = parsed.root.as_ref().ok_or_else(|| CompileError::ParseError {
        message: "no JSX reachable from `export default`".to_string(),
        location: parsed.location_at(0),
    })?;

    let mut vars = HashMap::new();
    let mut local_to_shell = HashMap::new();
    for decl in &parsed.runtime_var_decls {
        let var_name = decl.shell_name.to_uppercase();
        local_to_shell.insert(decl.local_name.clone(), var_name.clone());
        vars.insert(
            var_name.clone(),
            RuntimeVarDecl { var_name, ts_type: decl.ts_type_text.clone() },
        );
    }

    let mut fns = HashMap::new();
    for decl in &parsed.runtime_fn_decls {
        fns.insert(
            decl.local_name.clone(),
            RuntimeFnImport {
                namespace: decl.local_name.clone(),
                import_path: decl.import_path.clone(),
            },
        );
    }

    let runtime_fn_list: Vec<RuntimeFnImport> = fns.values().cloned().collect();
    let runtime_var_list: Vec<RuntimeVarDecl> = vars.values().cloned().collect();

    let mut ctx = TransformCtx {
        file: &parsed.path,
        source: &parsed.source,
        cache,
        runtime: Some(RuntimeContext { vars, local_to_shell, fns, called_functions: Vec::new() }),
        warnings: Vec::new(),
        loop_depth: 0,
    };

    let meta = CommandMeta {
        name: attr_string(root, "name", &ctx)?,
        description: attr_string(root, "description", &ctx)?,
        argument_hint: attr_string_opt(root, "argumentHint"),
        agent: attr_string_opt(root, "agent"),
        allowed_tools: attr_string_array_opt(root, "allowedTools"),
        folder: attr_string_opt(root, "folder"),
    };

    let children = transform_children(&child_elements(root), &mut ctx)?;

    let document = Document::Command {
        meta,
        runtime_vars: runtime_var_list,
        runtime_fns: runtime_fn_list,
        children,
    };
    Ok((document, ctx.warnings))
}
