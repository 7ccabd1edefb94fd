//! V3 bundler-contribution extraction (§4.7's "Output" paragraph, §4.8's
//! inputs). The rendered Markdown body is identical to V1's — runtime
//! constructs are just additional block kinds [`crate::emit::markdown`]
//! already knows how to render — so this module only computes the
//! `(namespace, import_path, called_functions)` tuples the bundler consumes.

use crate::ast::ParsedFile;
use crate::emit::RuntimeContribution;
use crate::ir::{Block, Document};

/// Walks a runtime Command's declared function imports and call sites to
/// build one contribution per namespace.
pub fn runtime_contributions(doc: &Document, parsed: &ParsedFile) -> Vec<RuntimeContribution> {
    let Document::Command { runtime_fns, children, .. } = doc else {
        return Vec::new();
    };

    runtime_fns
        .iter()
        .map(|decl| {
            let offset = parsed
                .runtime_fn_decls
                .iter()
                .find(|raw| raw.local_name == decl.namespace)
                .map(|raw| raw.offset)
                .unwrap_or(0);
            RuntimeContribution {
                namespace: decl.namespace.clone(),
                import_path: decl.import_path.clone(),
                called_functions: called_functions_for(&decl.namespace, children),
                location: parsed.location_at(offset),
            }
        })
        .collect()
}

fn called_functions_for(namespace: &str, blocks: &[Block]) -> Vec<String> {
    let mut found = Vec::new();
    for block in blocks {
        collect_calls(namespace, block, &mut found);
    }
    found.sort();
    found.dedup();
    found
}

fn collect_calls(namespace: &str, block: &Block, out: &mut Vec<String>) {
    if let Block::Call { namespace: ns, function, .. } = block {
        if ns == namespace {
            out.push(function.clone());
        }
    }
    for child in block_children(block) {
        collect_calls(namespace, child, out);
    }
}

fn block_children(block: &Block) -> &[Block] {
    match block {
        Block::List { items, .. } => items,
        Block::ListItem(children)
        | Block::Blockquote(children)
        | Block::Indent(children)
        | Block::ExecutionContext(children)
        | Block::Step(children)
        | Block::OnStatus { children, .. }
        | Block::OnStatusDefault { children, .. }
        | Block::If { children, .. }
        | Block::Else { children }
        | Block::Loop { children, .. } => children,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CommandMeta, RuntimeFnImport};

    #[test]
    fn collects_nested_call_sites() {
        let doc = Document::Command {
            meta: CommandMeta::default(),
            runtime_vars: Vec::new(),
            runtime_fns: vec![RuntimeFnImport { namespace: "Gh".to_string(), import_path: "./gh.ts".to_string() }],
            children: vec![Block::If {
                condition: crate::ir::Condition::Literal(true),
                children: vec![Block::Call {
                    namespace: "Gh".to_string(),
                    function: "listIssues".to_string(),
                    args: Vec::new(),
                    output_var: Some("ISSUES".to_string()),
                }],
            }],
        };
        let parsed = crate::ast::parse_file(
            std::path::Path::new("cmd.tsx"),
            r#"
import { listIssues } from "./gh.ts";
const Gh = runtimeFn(listIssues);
export default (<Command name="x" description="y"><p>z</p></Command>)
"#,
        )
        .unwrap();

        let contributions = runtime_contributions(&doc, &parsed);
        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].called_functions, vec!["listIssues".to_string()]);
    }
}
