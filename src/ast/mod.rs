//! The TSX front-end: parsing, owned-AST attribute shapes, and cross-file
//! type resolution. See §4.1 for the three queries this module exposes:
//! [`parser::parse_file`] covers `root_element`, [`attrs::JsxNode::get_attribute`]
//! covers `get_attribute`, and [`resolver::resolve_type`] covers `resolve_type`.

pub mod attrs;
pub mod parser;
pub mod resolver;

pub use attrs::{AttributeValue, JsxChild, JsxNode, TypeDescriptor, TypeField};
pub use parser::{parse_file, ParsedFile};
