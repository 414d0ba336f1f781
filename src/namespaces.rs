//! Namespace-aware XPath queries over a wrapper document.
//!
//! Every structural query in the crate goes through a [`NamespaceQuery`], which
//! registers the same three prefixes once per document:
//!
//! | prefix | namespace                              |
//! |--------|----------------------------------------|
//! | `n`    | `http://iptc.org/std/nar/2006-10-01/`  |
//! | `h`    | `http://www.w3.org/1999/xhtml`         |
//! | `nitf` | `http://iptc.org/std/NITF/2006-10-18/` |

use std::collections::HashSet;

use libxml::tree::Node;
use libxml::xpath;

use crate::document::WrapperDocument;
use crate::error::{StructuralError, StructuralResult};

pub const NEWSML_NS: &str = "http://iptc.org/std/nar/2006-10-01/";
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
pub const NITF_NS: &str = "http://iptc.org/std/NITF/2006-10-18/";

/// Prefix bindings registered on every query context
pub const BINDINGS: [(&str, &str); 3] = [("n", NEWSML_NS), ("h", XHTML_NS), ("nitf", NITF_NS)];

/// XPath context bound to one wrapper document
pub struct NamespaceQuery<'doc> {
    wrapper: &'doc WrapperDocument,
    context: xpath::Context,
}

impl<'doc> NamespaceQuery<'doc> {
    /// Create a query context for `wrapper` with the fixed prefix bindings.
    pub fn bind(wrapper: &'doc WrapperDocument) -> StructuralResult<Self> {
        let context = xpath::Context::new(wrapper.document()).map_err(|_| {
            StructuralError::Query {
                expression: "<context>".to_string(),
            }
        })?;

        for (prefix, uri) in BINDINGS {
            context
                .register_namespace(prefix, uri)
                .map_err(|_| StructuralError::NamespaceBinding {
                    prefix: prefix.to_string(),
                    uri: uri.to_string(),
                })?;
        }

        Ok(Self { wrapper, context })
    }

    /// The document this context is bound to
    pub fn wrapper(&self) -> &'doc WrapperDocument {
        self.wrapper
    }

    /// Evaluate `expression` against the whole document.
    pub fn select(&self, expression: &str) -> StructuralResult<Vec<Node>> {
        self.context
            .evaluate(expression)
            .map(|found| found.get_nodes_as_vec())
            .map_err(|_| query_error(expression))
    }

    /// Evaluate `expression` with `node` as the context node.
    pub fn select_from(&self, node: &Node, expression: &str) -> StructuralResult<Vec<Node>> {
        self.context
            .node_evaluate(expression, node)
            .map(|found| found.get_nodes_as_vec())
            .map_err(|_| query_error(expression))
    }

    /// First match of `expression` relative to `node`, if any.
    pub fn first_from(&self, node: &Node, expression: &str) -> StructuralResult<Option<Node>> {
        Ok(self.select_from(node, expression)?.into_iter().next())
    }

    /// Serialize `node` as a standalone XML fragment.
    ///
    /// Namespace declarations inherited from ancestors are copied onto the
    /// fragment's root element so the result parses on its own.
    pub fn fragment_xml(&self, node: &Node) -> String {
        self.fragment_with_default(node, None)
    }

    /// Like [`fragment_xml`](Self::fragment_xml), but the fragment's default
    /// namespace is `uri` instead of whatever default an ancestor declared.
    /// The node's own declarations are left untouched.
    pub fn fragment_in_default_namespace(&self, node: &Node, uri: &str) -> String {
        self.fragment_with_default(node, Some(uri))
    }

    fn fragment_with_default(&self, node: &Node, default_ns: Option<&str>) -> String {
        let xml = self.wrapper.document().node_to_string(node);

        let mut declared: HashSet<String> = node
            .get_namespace_declarations()
            .into_iter()
            .map(|ns| ns.get_prefix())
            .collect();
        let mut inherited = Vec::new();
        if let Some(uri) = default_ns {
            if declared.insert(String::new()) {
                inherited.push((String::new(), uri.to_string()));
            }
        }

        let mut current = node.get_parent();
        while let Some(ancestor) = current {
            if ancestor.is_element_node() {
                for ns in ancestor.get_namespace_declarations() {
                    let prefix = ns.get_prefix();
                    if declared.insert(prefix.clone()) {
                        inherited.push((prefix, ns.get_href()));
                    }
                }
            }
            current = ancestor.get_parent();
        }

        if inherited.is_empty() {
            return xml;
        }

        let name_end = xml
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_whitespace() || *c == '/' || *c == '>')
            .map(|(i, _)| i)
            .unwrap_or(xml.len());

        let mut declarations = String::new();
        for (prefix, href) in inherited {
            let href = escape_attribute(&href);
            if prefix.is_empty() {
                declarations.push_str(&format!(" xmlns=\"{}\"", href));
            } else {
                declarations.push_str(&format!(" xmlns:{}=\"{}\"", prefix, href));
            }
        }

        let mut fragment = String::with_capacity(xml.len() + declarations.len());
        fragment.push_str(&xml[..name_end]);
        fragment.push_str(&declarations);
        fragment.push_str(&xml[name_end..]);
        fragment
    }
}

fn query_error(expression: &str) -> StructuralError {
    StructuralError::Query {
        expression: expression.to_string(),
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
