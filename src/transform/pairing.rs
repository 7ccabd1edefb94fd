//! Sibling-pairing state machine (§4.9): attaches `Else` to its preceding
//! `If` and `OnStatusDefault` to its preceding `OnStatus`.
//!
//! The front-end already drops whitespace-only JSX text nodes between
//! elements (§4.1's extraction guarantee), so this driver only needs to
//! walk the element sibling list — whitespace invariance (§8 invariant 4)
//! falls out of that guarantee for free rather than needing its own skip
//! logic here.

use std::path::Path;

use crate::ast::JsxNode;
use crate::error::{CompileError, Location};

/// One sibling-level decision made by the pairing driver.
pub enum PairedChild<'a> {
    /// A child with no pairing behavior.
    Plain(&'a JsxNode),
    /// An `If`, with its paired `Else` if one immediately followed.
    IfElse {
        /// The `If` element.
        if_node: &'a JsxNode,
        /// The paired `Else` element, if any.
        else_node: Option<&'a JsxNode>,
    },
    /// An `OnStatus`, with its paired `OnStatusDefault` if one immediately followed.
    OnStatusPair {
        /// The `OnStatus` element.
        on_status: &'a JsxNode,
        /// The paired `OnStatusDefault` element, if any.
        on_status_default: Option<&'a JsxNode>,
    },
    /// An `OnStatusDefault` with an explicit `output` prop, standing alone
    /// with no preceding `OnStatus` sibling.
    StandaloneOnStatusDefault(&'a JsxNode),
}

/// Runs the FSM over `children`, producing one [`PairedChild`] per surviving
/// element (paired partners are consumed into their leader's entry).
pub fn pair_siblings<'a>(
    children: &'a [JsxNode],
    file: &Path,
    source: &str,
) -> Result<Vec<PairedChild<'a>>, CompileError> {
    let mut result = Vec::with_capacity(children.len());
    let mut i = 0;
    while i < children.len() {
        let child = &children[i];
        match child.tag.as_str() {
            "If" => {
                let else_node = children.get(i + 1).filter(|n| n.tag == "Else");
                if else_node.is_some() {
                    i += 1;
                }
                result.push(PairedChild::IfElse {
                    if_node: child,
                    else_node,
                });
            }
            "OnStatus" => {
                let default_node = children.get(i + 1).filter(|n| n.tag == "OnStatusDefault");
                if default_node.is_some() {
                    i += 1;
                }
                result.push(PairedChild::OnStatusPair {
                    on_status: child,
                    on_status_default: default_node,
                });
            }
            "Else" => {
                return Err(CompileError::InvalidChild {
                    message: "<Else> with no preceding <If> sibling".to_string(),
                    location: Location::from_offset(file.to_path_buf(), source, child.offset),
                });
            }
            "OnStatusDefault" => {
                if child.has_attribute("output") {
                    result.push(PairedChild::StandaloneOnStatusDefault(child));
                } else {
                    return Err(CompileError::InvalidChild {
                        message:
                            "<OnStatusDefault> with no preceding <OnStatus> sibling and no explicit `output`"
                                .to_string(),
                        location: Location::from_offset(file.to_path_buf(), source, child.offset),
                    });
                }
            }
            _ => result.push(PairedChild::Plain(child)),
        }
        i += 1;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parser::parse_file;
    use std::path::Path;

    fn root_children(source: &str) -> Vec<JsxNode> {
        let parsed = parse_file(Path::new("f.tsx"), source).unwrap();
        parsed
            .root
            .unwrap()
            .element_children()
            .cloned()
            .collect()
    }

    #[test]
    fn pairs_onstatus_with_following_onstatusdefault() {
        let source = r#"export default (<Command name="a" description="b">
            <OnStatus output={out} status="SUCCESS"><p>ok</p></OnStatus>
            <OnStatusDefault><p>fallback</p></OnStatusDefault>
        </Command>)"#;
        let children = root_children(source);
        let paired = pair_siblings(&children, Path::new("f.tsx"), source).unwrap();
        assert_eq!(paired.len(), 1);
        assert!(matches!(
            paired[0],
            PairedChild::OnStatusPair {
                on_status_default: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn rejects_standalone_onstatusdefault_without_output() {
        let source = r#"export default (<Command name="a" description="b">
            <OnStatusDefault><p>fallback</p></OnStatusDefault>
        </Command>)"#;
        let children = root_children(source);
        assert!(pair_siblings(&children, Path::new("f.tsx"), source).is_err());
    }

    #[test]
    fn rejects_standalone_else() {
        let source = r#"export default (<Command name="a" description="b">
            <Else><p>fallback</p></Else>
        </Command>)"#;
        let children = root_children(source);
        assert!(pair_siblings(&children, Path::new("f.tsx"), source).is_err());
    }
}
