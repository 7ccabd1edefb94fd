//! Structural validation of `runtimeVarRef` paths against an annotated
//! TypeScript type's text, without a general type checker.
//!
//! The annotated type is parsed once into a [`Schema`] tree; a path is then
//! walked step by step against it. Unrecognized shapes degrade to "any path
//! accepted" rather than erroring, per the graceful-degradation design note.

use std::collections::HashMap;

/// A minimal structural schema parsed out of a TypeScript type's source text.
#[derive(Clone, Debug, PartialEq)]
pub enum Schema {
    /// `{ k: S; ... }`.
    Object(HashMap<String, Schema>),
    /// `S[]`.
    Array(Box<Schema>),
    /// `A | B | ...`. A bare `null`/`undefined` branch is folded away per
    /// Open Question 3: the union is valid at a step iff some non-null
    /// branch accepts it.
    Union(Vec<Schema>),
    /// `string`, `number`, or `boolean`.
    Primitive(Primitive),
    /// Anything not recognized by the mini-parser; every further path step
    /// is accepted against it.
    Unknown,
}

/// The small set of recognized primitive type names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    /// `string`.
    String,
    /// `number`.
    Number,
    /// `boolean`.
    Boolean,
}

/// Parses a TypeScript type's source text into a [`Schema`].
///
/// This is not a general TS parser: it recognizes object literal types,
/// array suffixes, union types, and the three primitive names, falling back
/// to [`Schema::Unknown`] for anything else (named type aliases resolved
/// elsewhere, generics, mapped types, ...).
pub fn parse_type_text(text: &str) -> Schema {
    let mut chars = text.trim().chars().peekable();
    parse_union(&mut chars)
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn parse_union(chars: &mut Chars<'_>) -> Schema {
    let mut branches = vec![parse_array_suffixed(chars)];
    loop {
        skip_ws(chars);
        if matches!(chars.peek(), Some('|')) {
            chars.next();
            skip_ws(chars);
            branches.push(parse_array_suffixed(chars));
        } else {
            break;
        }
    }
    if branches.len() == 1 {
        branches.into_iter().next().unwrap()
    } else {
        Schema::Union(branches)
    }
}

fn parse_array_suffixed(chars: &mut Chars<'_>) -> Schema {
    let mut base = parse_atom(chars);
    loop {
        skip_ws(chars);
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('[') && lookahead.next() == Some(']') {
            chars.next();
            chars.next();
            base = Schema::Array(Box::new(base));
        } else {
            break;
        }
    }
    base
}

fn parse_atom(chars: &mut Chars<'_>) -> Schema {
    skip_ws(chars);
    match chars.peek() {
        Some('{') => parse_object(chars),
        _ => {
            let ident = take_identifier(chars);
            match ident.as_str() {
                "string" => Schema::Primitive(Primitive::String),
                "number" => Schema::Primitive(Primitive::Number),
                "boolean" => Schema::Primitive(Primitive::Boolean),
                "null" | "undefined" => Schema::Unknown,
                _ => Schema::Unknown,
            }
        }
    }
}

fn parse_object(chars: &mut Chars<'_>) -> Schema {
    chars.next(); // consume '{'
    let mut fields = HashMap::new();
    loop {
        skip_ws(chars);
        if matches!(chars.peek(), Some('}') | None) {
            if chars.peek().is_some() {
                chars.next();
            }
            break;
        }
        let key = take_identifier(chars);
        skip_ws(chars);
        if matches!(chars.peek(), Some('?')) {
            chars.next();
            skip_ws(chars);
        }
        if matches!(chars.peek(), Some(':')) {
            chars.next();
        }
        let value = parse_union_until_member_end(chars);
        if !key.is_empty() {
            fields.insert(key, value);
        }
        skip_ws(chars);
        if matches!(chars.peek(), Some(';') | Some(',')) {
            chars.next();
        }
    }
    Schema::Object(fields)
}

/// Parses a union, but stops consuming before a member separator (`;`/`,`)
/// or the enclosing object's `}` — the object parser handles those.
fn parse_union_until_member_end(chars: &mut Chars<'_>) -> Schema {
    let mut branches = vec![parse_array_suffixed(chars)];
    loop {
        let mut lookahead = chars.clone();
        skip_ws(&mut lookahead);
        if matches!(lookahead.peek(), Some('|')) {
            skip_ws(chars);
            chars.next();
            skip_ws(chars);
            branches.push(parse_array_suffixed(chars));
        } else {
            break;
        }
    }
    if branches.len() == 1 {
        branches.into_iter().next().unwrap()
    } else {
        Schema::Union(branches)
    }
}

fn skip_ws(chars: &mut Chars<'_>) {
    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
        chars.next();
    }
}

fn take_identifier(chars: &mut Chars<'_>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

/// Walks `path` against `schema`, returning the offending step on mismatch.
///
/// `Schema::Unknown` accepts any further path (graceful degradation).
/// Numeric-looking steps are treated as array indices.
pub fn validate_path<'a>(schema: &Schema, path: &'a [String]) -> Result<(), &'a str> {
    let mut current = schema;
    for step in path {
        current = match current {
            Schema::Unknown => return Ok(()),
            Schema::Object(fields) => match fields.get(step) {
                Some(next) => next,
                None => return Err(step),
            },
            Schema::Array(elem) => {
                if step.parse::<usize>().is_ok() {
                    elem.as_ref()
                } else {
                    return Err(step);
                }
            }
            Schema::Union(branches) => {
                let accepting = branches
                    .iter()
                    .filter(|b| !matches!(b, Schema::Unknown))
                    .find(|b| validate_path(b, std::slice::from_ref(step)).is_ok());
                match accepting {
                    Some(b) => resolve_branch_step(b, step),
                    None => return Err(step),
                }
            }
            Schema::Primitive(_) => return Err(step),
        };
    }
    Ok(())
}

fn resolve_branch_step<'a>(branch: &'a Schema, step: &str) -> &'a Schema {
    match branch {
        Schema::Object(fields) => fields.get(step).unwrap_or(&Schema::Unknown),
        Schema::Array(elem) => elem.as_ref(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_object_path() {
        let schema = parse_type_text("{ phase: { id: string } }");
        let path = vec!["phase".to_string(), "id".to_string()];
        assert!(validate_path(&schema, &path).is_ok());
    }

    #[test]
    fn rejects_unknown_field() {
        let schema = parse_type_text("{ phase: { id: string } }");
        let path = vec!["phase".to_string(), "wrong".to_string()];
        assert_eq!(validate_path(&schema, &path), Err("wrong"));
    }

    #[test]
    fn array_index_advances_into_element_type() {
        let schema = parse_type_text("{ items: { name: string }[] }");
        let path = vec!["items".to_string(), "0".to_string(), "name".to_string()];
        assert!(validate_path(&schema, &path).is_ok());
    }

    #[test]
    fn nullable_union_accepts_non_null_branch_step() {
        let schema = parse_type_text("{ phase: { id: string } | null }");
        let path = vec!["phase".to_string(), "id".to_string()];
        assert!(validate_path(&schema, &path).is_ok());
    }

    #[test]
    fn unknown_leaf_type_accepts_any_further_path() {
        let schema = parse_type_text("{ meta: SomeImportedType }");
        let path = vec!["meta".to_string(), "anything".to_string(), "nested".to_string()];
        assert!(validate_path(&schema, &path).is_ok());
    }
}
