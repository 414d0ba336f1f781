//! Extraction of embedded news items from a wrapper document.

use libxml::tree::Node;

use crate::error::StructuralResult;
use crate::namespaces::NamespaceQuery;

/// Every `newsItem` in the NewsML-G2 namespace, at any depth, in document order
pub const NEWS_ITEM_QUERY: &str = "//n:newsItem";

/// Attribute carrying the caller-visible item identifier
pub const GUID_ATTRIBUTE: &str = "guid";

/// One embedded item, borrowed from its wrapper document.
///
/// The lifetime ties the item to the bound document it was extracted from, so
/// an `ItemNode` cannot outlive the tree its node points into.
pub struct ItemNode<'a> {
    node: Node,
    guid: Option<String>,
    position: usize,
    scope: &'a NamespaceQuery<'a>,
}

impl<'a> ItemNode<'a> {
    /// The `guid` attribute as found on the element, if present
    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    /// Zero-based position in document order
    pub fn position(&self) -> usize {
        self.position
    }

    /// The `newsItem` element
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The namespace bindings of the owning document
    pub fn scope(&self) -> &'a NamespaceQuery<'a> {
        self.scope
    }

    /// Evaluate `expression` relative to this item.
    pub fn select(&self, expression: &str) -> StructuralResult<Vec<Node>> {
        self.scope.select_from(&self.node, expression)
    }

    /// First match of `expression` relative to this item.
    pub fn first(&self, expression: &str) -> StructuralResult<Option<Node>> {
        self.scope.first_from(&self.node, expression)
    }

    /// Standalone XML of a node inside this item.
    pub fn fragment_xml(&self, node: &Node) -> String {
        self.scope.fragment_xml(node)
    }
}

impl std::fmt::Debug for ItemNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemNode")
            .field("guid", &self.guid)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// Extract the embedded items of the document bound to `scope`.
///
/// A wrapper without items yields an empty sequence. Identifiers are carried
/// as-is; uniqueness is not checked here.
pub fn extract_items<'a>(scope: &'a NamespaceQuery<'a>) -> StructuralResult<Vec<ItemNode<'a>>> {
    let nodes = scope.select(NEWS_ITEM_QUERY)?;

    Ok(nodes
        .into_iter()
        .enumerate()
        .map(|(position, node)| ItemNode {
            guid: node.get_attribute(GUID_ATTRIBUTE),
            node,
            position,
            scope,
        })
        .collect())
}
