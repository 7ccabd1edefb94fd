//! Owned JSX attribute values and the closed set of shapes §4.1 recognizes.

use std::collections::HashMap;

/// A JSX attribute's value, normalized into a closed set of shapes.
///
/// Covers every form §4.1 names: string literals, identifier references
/// (including dotted/indexed member paths such as `ctx.phase.id` or
/// `items[0]`), object and array literals, boolean/numeric literals, and
/// boolean shorthand (`<SpawnAgent readAgentFile/>`, modeled as presence
/// rather than a value — see [`JsxNode::has_attribute`]).
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// A plain string literal, e.g. `name="hello"`.
    String(String),
    /// A boolean literal, e.g. `optional={true}`.
    Bool(bool),
    /// A numeric literal, e.g. `times={3}`.
    Number(f64),
    /// A bare identifier or member/index path, e.g. `{ctx.phase.id}` or
    /// `{out}`. The first element is the base identifier; the rest are
    /// member names or (for array indices) decimal digit strings.
    PathRef(Vec<String>),
    /// An object literal, field name to value.
    Object(Vec<(String, AttributeValue)>),
    /// An array literal.
    Array(Vec<AttributeValue>),
    /// Any expression form not covered above, preserved as raw source text.
    Raw(String),
}

impl AttributeValue {
    /// Reads this value as a plain string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Reads this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Reads this value as a single-segment path reference (a bare
    /// identifier with no further member access), if it is one.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            AttributeValue::PathRef(path) if path.len() == 1 => Some(path[0].as_str()),
            _ => None,
        }
    }

    /// Reads this value as an object literal's fields, if it is one.
    pub fn as_object(&self) -> Option<&[(String, AttributeValue)]> {
        match self {
            AttributeValue::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

/// An owned JSX element node, produced by [`crate::ast::parser`].
#[derive(Clone, Debug, PartialEq)]
pub struct JsxNode {
    /// Tag name, e.g. `"SpawnAgent"` or `"p"`. Member-call tags (`X.Call`)
    /// are stored as `"X.Call"`.
    pub tag: String,
    /// Attributes in authoring order. Boolean-shorthand attributes
    /// (`readAgentFile`) are present as `Bool(true)`.
    pub attrs: Vec<(String, AttributeValue)>,
    /// Type-argument text, e.g. the `ResearcherInput` in
    /// `<SpawnAgent<ResearcherInput> .../>`-style generic usage is instead
    /// carried on call expressions, not JSX elements; kept here for JSX
    /// elements whose opening tag records a type argument in source.
    pub type_arg: Option<String>,
    /// Child nodes, in authoring order; whitespace-only text children
    /// between elements have already been dropped.
    pub children: Vec<JsxChild>,
    /// Byte offset of the opening `<` in the source file.
    pub offset: usize,
}

impl JsxNode {
    /// Looks up an attribute by name.
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// True if `name` is present, regardless of its value (shorthand check).
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    /// Iterates over element children only, skipping text/expression children.
    pub fn element_children(&self) -> impl Iterator<Item = &JsxNode> {
        self.children.iter().filter_map(|c| match c {
            JsxChild::Element(node) => Some(node),
            _ => None,
        })
    }
}

/// A single child of a [`JsxNode`].
#[derive(Clone, Debug, PartialEq)]
pub enum JsxChild {
    /// A nested element.
    Element(JsxNode),
    /// Normalized text content (whitespace runs collapsed, edges trimmed).
    Text {
        /// The text content.
        value: String,
        /// Byte offset in the source file.
        offset: usize,
    },
    /// A `{expr}` interpolation that is not itself an element.
    Expression {
        /// The normalized expression value.
        value: AttributeValue,
        /// Byte offset in the source file.
        offset: usize,
    },
}

impl JsxChild {
    /// True if this is a text child containing only whitespace.
    pub fn is_whitespace_only(&self) -> bool {
        matches!(self, JsxChild::Text { value, .. } if value.trim().is_empty())
    }
}

/// A resolved TypeScript interface: an ordered field list plus where it was declared.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDescriptor {
    /// Fields in declaration order.
    pub fields: Vec<TypeField>,
    /// Byte offset of the `interface`/`type` keyword in its source file.
    pub offset: usize,
}

/// A single field of a resolved interface/type.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeField {
    /// Field name.
    pub name: String,
    /// Raw annotated type text, used by [`crate::fieldpath`].
    pub type_text: String,
    /// False when the field is declared with a trailing `?`.
    pub required: bool,
}

/// A map of locally-bound interface/type-alias names to their descriptors,
/// as extracted from a single source file (not yet following imports).
pub type LocalTypeTable = HashMap<String, TypeDescriptor>;
