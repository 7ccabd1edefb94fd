//! TSX front-end: parses a single source file with the oxc toolchain and
//! immediately lowers it into the owned representation in
//! [`crate::ast::attrs`], so no borrowed AST/arena lifetime escapes this
//! module (the arena and its `Program` are dropped at the end of
//! [`parse_file`]).

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, BindingPatternKind, Declaration, Expression, JSXAttributeItem, JSXAttributeName,
    JSXAttributeValue, JSXChild as OxcJsxChild, JSXElementName, JSXExpression, ObjectPropertyKind,
    PropertyKey, Statement, TSSignature, TSType, VariableDeclarator,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use crate::ast::attrs::{AttributeValue, JsxChild, JsxNode, LocalTypeTable, TypeDescriptor, TypeField};
use crate::error::{CompileError, Location};

/// A runtime-variable declaration as found at the top level of a file:
/// `const ctx = useRuntimeVar<T>("CTX")`.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRuntimeVarDecl {
    /// The local binding name (`ctx`).
    pub local_name: String,
    /// The shell-variable name string literal argument (`"CTX"`).
    pub shell_name: String,
    /// The raw source text of the type argument `T`.
    pub ts_type_text: String,
    /// Declaration site.
    pub offset: usize,
}

/// A `const X = runtimeFn(fn)` binding as found at the top level of a file.
/// `fn` must itself be an identifier imported from a relative TS module;
/// `X` is the namespace used as `<X.Call/>`'s left-hand side.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRuntimeFnDecl {
    /// The local binding name used as `<X.Call/>`'s `X`.
    pub local_name: String,
    /// The wrapped function's imported identifier name.
    pub function_name: String,
    /// The relative module specifier `function_name` was imported from.
    pub import_path: String,
    /// Declaration site, used for `NamespaceConflict` diagnostics.
    pub offset: usize,
}

/// The fully lowered, self-contained result of parsing one source file.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedFile {
    /// The file's path, for diagnostics.
    pub path: PathBuf,
    /// The file's source text, retained for snippet rendering.
    pub source: String,
    /// The outermost JSX element of `export default (...)`, if found.
    pub root: Option<JsxNode>,
    /// Names imported by this file (from any module specifier), used by the
    /// classifier to detect `useRuntimeVar`/`runtimeFn` usage.
    pub imported_names: Vec<String>,
    /// Maps each imported name to the module specifier it came from, used by
    /// the resolver to follow `import { X } from "./path"` chains.
    pub import_sources: std::collections::HashMap<String, String>,
    /// Top-level `interface`/`type` declarations, by name.
    pub local_types: LocalTypeTable,
    /// Top-level runtime-variable declarations.
    pub runtime_var_decls: Vec<RawRuntimeVarDecl>,
    /// Top-level runtime-function bindings.
    pub runtime_fn_decls: Vec<RawRuntimeFnDecl>,
}

impl ParsedFile {
    /// Builds a [`Location`] at `offset` within this file.
    pub fn location_at(&self, offset: usize) -> Location {
        Location::from_offset(self.path.clone(), &self.source, offset)
    }
}

/// Parses `source` (the contents of `path`) into a [`ParsedFile`].
pub fn parse_file(path: &Path, source: &str) -> Result<ParsedFile, CompileError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_default().with_module(true);

    let parser_return = Parser::new(&allocator, source, source_type).parse();
    if !parser_return.errors.is_empty() {
        let message = parser_return
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let offset = parser_return
            .errors
            .first()
            .and_then(|e| e.labels.as_ref().and_then(|l| l.first()).map(|l| l.offset()))
            .unwrap_or(0);
        return Err(CompileError::ParseError {
            message,
            location: Location::from_offset(path.to_path_buf(), source, offset),
        });
    }

    let program = parser_return.program;

    let mut imported_names = Vec::new();
    let mut import_sources = std::collections::HashMap::new();
    let mut local_types = LocalTypeTable::new();
    let mut runtime_var_decls = Vec::new();
    let mut runtime_fn_decls = Vec::new();
    let mut root = None;

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(import) => {
                if let Some(specifiers) = &import.specifiers {
                    for spec in specifiers {
                        let name = spec.name().as_str().to_string();
                        import_sources.insert(name.clone(), import.source.value.as_str().to_string());
                        imported_names.push(name);
                    }
                }
            }
            Statement::TSInterfaceDeclaration(iface) => {
                let name = iface.id.name.as_str().to_string();
                let fields = iface
                    .body
                    .body
                    .iter()
                    .filter_map(|sig| signature_to_field(sig, source))
                    .collect();
                local_types.insert(
                    name,
                    TypeDescriptor {
                        fields,
                        offset: iface.span().start as usize,
                    },
                );
            }
            Statement::TSTypeAliasDeclaration(alias) => {
                let name = alias.id.name.as_str().to_string();
                if let TSType::TSTypeLiteral(lit) = &alias.type_annotation {
                    let fields = lit
                        .members
                        .iter()
                        .filter_map(|sig| signature_to_field(sig, source))
                        .collect();
                    local_types.insert(
                        name,
                        TypeDescriptor {
                            fields,
                            offset: alias.span().start as usize,
                        },
                    );
                }
            }
            Statement::VariableDeclaration(var_decl) => {
                for decl in &var_decl.declarations {
                    collect_runtime_decls(
                        decl,
                        source,
                        &import_sources,
                        &mut runtime_var_decls,
                        &mut runtime_fn_decls,
                    );
                }
            }
            Statement::ExportDefaultDeclaration(export) => {
                if let Some(expr) = export.declaration.as_expression() {
                    if let Some(jsx) = unwrap_to_jsx(expr) {
                        root = Some(lower_jsx_element(jsx, source));
                    }
                }
            }
            Statement::ExportNamedDeclaration(export) => {
                if let Some(Declaration::VariableDeclaration(var_decl)) = &export.declaration {
                    for decl in &var_decl.declarations {
                        collect_runtime_decls(
                            decl,
                            source,
                            &import_sources,
                            &mut runtime_var_decls,
                            &mut runtime_fn_decls,
                        );
                    }
                }
            }
            _ => {}
        }
    }

    Ok(ParsedFile {
        path: path.to_path_buf(),
        source: source.to_string(),
        root,
        imported_names,
        import_sources,
        local_types,
        runtime_var_decls,
        runtime_fn_decls,
    })
}

fn signature_to_field(sig: &TSSignature, source: &str) -> Option<TypeField> {
    let TSSignature::TSPropertySignature(prop) = sig else {
        return None;
    };
    let name = match &prop.key {
        PropertyKey::StaticIdentifier(id) => id.name.as_str().to_string(),
        _ => return None,
    };
    let type_text = prop
        .type_annotation
        .as_ref()
        .map(|ann| ann.type_annotation.span().source_text(source))
        .unwrap_or_default()
        .to_string();
    Some(TypeField {
        name,
        type_text,
        required: !prop.optional,
    })
}

fn collect_runtime_decls(
    decl: &VariableDeclarator,
    source: &str,
    import_sources: &std::collections::HashMap<String, String>,
    runtime_vars: &mut Vec<RawRuntimeVarDecl>,
    runtime_fns: &mut Vec<RawRuntimeFnDecl>,
) {
    let Some(init) = &decl.init else { return };
    let Expression::CallExpression(call) = init else {
        return;
    };
    let callee_name = callee_identifier_name(&call.callee);
    let Some(callee_name) = callee_name else { return };

    let BindingPatternKind::BindingIdentifier(local) = &decl.id.kind else {
        return;
    };

    match callee_name.as_str() {
        "useRuntimeVar" => {
            let shell_name = call
                .arguments
                .first()
                .and_then(argument_as_string)
                .unwrap_or_default();
            let ts_type_text = call
                .type_arguments
                .as_ref()
                .and_then(|args| args.params.first())
                .map(|t| t.span().source_text(source).to_string())
                .unwrap_or_default();
            runtime_vars.push(RawRuntimeVarDecl {
                local_name: local.name.as_str().to_string(),
                shell_name,
                ts_type_text,
                offset: decl.span().start as usize,
            });
        }
        "runtimeFn" => {
            let function_name = call
                .arguments
                .first()
                .and_then(Argument::as_expression)
                .and_then(callee_identifier_name)
                .unwrap_or_default();
            let import_path = import_sources.get(&function_name).cloned().unwrap_or_default();
            runtime_fns.push(RawRuntimeFnDecl {
                local_name: local.name.as_str().to_string(),
                function_name,
                import_path,
                offset: decl.span().start as usize,
            });
        }
        _ => {}
    }
}

fn callee_identifier_name(expr: &Expression) -> Option<String> {
    match expr {
        Expression::Identifier(id) => Some(id.name.as_str().to_string()),
        _ => None,
    }
}

fn argument_as_string(arg: &Argument) -> Option<String> {
    match arg {
        Argument::StringLiteral(lit) => Some(lit.value.as_str().to_string()),
        _ => None,
    }
}

/// Unwraps parentheses and a possible `return` statement's expression to
/// find the outermost JSX element, per §4.1's `root_element` contract.
fn unwrap_to_jsx(expr: &Expression) -> Option<&oxc_ast::ast::JSXElement> {
    match expr {
        Expression::ParenthesizedExpression(paren) => unwrap_to_jsx(&paren.expression),
        Expression::JSXElement(el) => Some(el),
        _ => None,
    }
}

fn lower_jsx_element(el: &oxc_ast::ast::JSXElement, source: &str) -> JsxNode {
    let tag = element_name_text(&el.opening_element.name);
    let mut attrs = Vec::new();
    for item in &el.opening_element.attributes {
        if let JSXAttributeItem::Attribute(attr) = item {
            let name = match &attr.name {
                JSXAttributeName::Identifier(id) => id.name.as_str().to_string(),
                JSXAttributeName::NamespacedName(ns) => {
                    format!("{}:{}", ns.namespace.name.as_str(), ns.property.name.as_str())
                }
            };
            let value = match &attr.value {
                None => AttributeValue::Bool(true),
                Some(JSXAttributeValue::StringLiteral(lit)) => {
                    AttributeValue::String(lit.value.as_str().to_string())
                }
                Some(JSXAttributeValue::ExpressionContainer(container)) => {
                    match &container.expression {
                        JSXExpression::Expression(expr) => lower_expression(expr, source),
                        _ => AttributeValue::Raw(String::new()),
                    }
                }
                Some(_) => AttributeValue::Raw(attr.span().source_text(source).to_string()),
            };
            attrs.push((name, value));
        }
    }

    let children = el
        .children
        .iter()
        .filter_map(|child| lower_jsx_child(child, source))
        .filter(|child| !child.is_whitespace_only())
        .collect();

    let type_arg = el
        .opening_element
        .type_arguments
        .as_ref()
        .and_then(|args| args.params.first())
        .map(|t| t.span().source_text(source).to_string());

    JsxNode {
        tag,
        attrs,
        type_arg,
        children,
        offset: el.span().start as usize,
    }
}

fn element_name_text(name: &JSXElementName) -> String {
    match name {
        JSXElementName::Identifier(id) => id.name.as_str().to_string(),
        JSXElementName::IdentifierReference(id) => id.name.as_str().to_string(),
        JSXElementName::MemberExpression(member) => {
            format!("{}.{}", member_object_text(member), member.property.name.as_str())
        }
        JSXElementName::NamespacedName(ns) => {
            format!("{}:{}", ns.namespace.name.as_str(), ns.property.name.as_str())
        }
        JSXElementName::ThisExpression(_) => "this".to_string(),
    }
}

fn member_object_text(member: &oxc_ast::ast::JSXMemberExpression) -> String {
    match &member.object {
        oxc_ast::ast::JSXMemberExpressionObject::IdentifierReference(id) => {
            id.name.as_str().to_string()
        }
        oxc_ast::ast::JSXMemberExpressionObject::MemberExpression(inner) => {
            format!("{}.{}", member_object_text(inner), inner.property.name.as_str())
        }
        oxc_ast::ast::JSXMemberExpressionObject::ThisExpression(_) => "this".to_string(),
    }
}

fn lower_jsx_child(child: &OxcJsxChild, source: &str) -> Option<JsxChild> {
    match child {
        OxcJsxChild::Text(text) => {
            let normalized = normalize_whitespace(text.value.as_str());
            Some(JsxChild::Text {
                value: normalized,
                offset: text.span().start as usize,
            })
        }
        OxcJsxChild::Element(el) => Some(JsxChild::Element(lower_jsx_element(el, source))),
        OxcJsxChild::ExpressionContainer(container) => match &container.expression {
            JSXExpression::Expression(expr) => Some(JsxChild::Expression {
                value: lower_expression(expr, source),
                offset: expr.span().start as usize,
            }),
            _ => None,
        },
        OxcJsxChild::Fragment(_) | OxcJsxChild::Spread(_) => None,
    }
}

fn normalize_whitespace(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
}

fn lower_expression(expr: &Expression, source: &str) -> AttributeValue {
    match expr {
        Expression::StringLiteral(lit) => AttributeValue::String(lit.value.as_str().to_string()),
        Expression::NumericLiteral(lit) => AttributeValue::Number(lit.value),
        Expression::BooleanLiteral(lit) => AttributeValue::Bool(lit.value),
        Expression::Identifier(id) => AttributeValue::PathRef(vec![id.name.as_str().to_string()]),
        Expression::ObjectExpression(obj) => {
            let fields = obj
                .properties
                .iter()
                .filter_map(|prop| match prop {
                    ObjectPropertyKind::ObjectProperty(p) => {
                        let key = match &p.key {
                            PropertyKey::StaticIdentifier(id) => id.name.as_str().to_string(),
                            PropertyKey::StringLiteral(lit) => lit.value.as_str().to_string(),
                            _ => return None,
                        };
                        Some((key, lower_expression(&p.value, source)))
                    }
                    ObjectPropertyKind::SpreadProperty(_) => None,
                })
                .collect();
            AttributeValue::Object(fields)
        }
        Expression::ArrayExpression(arr) => {
            let items = arr
                .elements
                .iter()
                .filter_map(|el| el.as_expression().map(|e| lower_expression(e, source)))
                .collect();
            AttributeValue::Array(items)
        }
        Expression::StaticMemberExpression(member) => {
            let mut path = member_path(expr).unwrap_or_default();
            if path.is_empty() {
                path.push(member.property.name.as_str().to_string());
            }
            AttributeValue::PathRef(path)
        }
        Expression::ComputedMemberExpression(_) => {
            AttributeValue::PathRef(member_path(expr).unwrap_or_default())
        }
        _ => AttributeValue::Raw(expr.span().source_text(source).to_string()),
    }
}

/// Flattens a (possibly nested) member/index expression chain into a path,
/// base identifier first: `ctx.phase.id` -> `["ctx", "phase", "id"]`,
/// `items[0]` -> `["items", "0"]`.
fn member_path(expr: &Expression) -> Option<Vec<String>> {
    match expr {
        Expression::Identifier(id) => Some(vec![id.name.as_str().to_string()]),
        Expression::StaticMemberExpression(member) => {
            let mut base = member_path(&member.object)?;
            base.push(member.property.name.as_str().to_string());
            Some(base)
        }
        Expression::ComputedMemberExpression(member) => {
            let mut base = member_path(&member.object)?;
            if let Expression::NumericLiteral(lit) = &member.expression {
                base.push((lit.value as i64).to_string());
            }
            Some(base)
        }
        _ => None,
    }
}
