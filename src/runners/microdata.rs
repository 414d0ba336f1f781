//! Local extraction and checking of HTML microdata.
//!
//! Items are the `itemscope` elements that are not themselves a property of
//! another item. Properties are collected from the item's descendants (not
//! crossing into nested items) and from the elements named by `itemref`, in
//! that order. An item that would become a property of itself through
//! `itemref` is reported as a cycle and not followed; acyclic nesting is cut
//! at [`MAX_NESTING`] levels.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use async_trait::async_trait;
use libxml::tree::Node;
use regex::Regex;

use super::{StandardRunner, Target};
use crate::error::StructuralResult;
use crate::namespaces::NamespaceQuery;
use crate::report::{Finding, MicrodataItem, MicrodataProperty, ValidationResult};
use crate::standards::StandardName;

/// Locates XHTML content relative to the target
pub const HTML_QUERY: &str = ".//h:html";

const SCOPES_QUERY: &str = "descendant-or-self::h:*[@itemscope]";
const TOP_LEVEL_QUERY: &str = "descendant-or-self::h:*[@itemscope and not(@itemprop)]";
const IDS_QUERY: &str = "descendant-or-self::h:*[@id]";
const PROPS_QUERY: &str = "descendant-or-self::h:*[@itemprop]";
const UNSCOPED_PROPS_QUERY: &str =
    "descendant-or-self::h:*[@itemprop and not(ancestor::h:*[@itemscope])]";

/// Deepest item nesting followed during extraction
pub const MAX_NESTING: usize = 16;

static ABSOLUTE_URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn absolute_url_regex() -> &'static Regex {
    ABSOLUTE_URL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").expect("Failed to compile absolute URL regex")
    })
}

pub fn is_absolute_url(value: &str) -> bool {
    absolute_url_regex().is_match(value)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MicrodataRunner;

impl MicrodataRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl StandardRunner for MicrodataRunner {
    fn standard(&self) -> StandardName {
        StandardName::Microdata
    }

    async fn run(&self, target: Target<'_>, item_id: Option<&str>) -> ValidationResult {
        let checked = target.select(HTML_QUERY).and_then(|nodes| match nodes.first() {
            Some(html) => MicrodataScan::new(target.scope(), html)?.run().map(Some),
            None => Ok(None),
        });

        match checked {
            Ok(Some((findings, items))) => {
                ValidationResult::from_findings(StandardName::Microdata, item_id, findings)
                    .with_items(items)
            }
            Ok(None) => ValidationResult::not_applicable(
                StandardName::Microdata,
                item_id,
                "item contains no XHTML content",
            ),
            Err(e) => ValidationResult::inconclusive(StandardName::Microdata, item_id, e.to_string()),
        }
    }
}

/// One pass over an XHTML subtree
struct MicrodataScan<'a> {
    scope: &'a NamespaceQuery<'a>,
    root: Node,
    ids: HashMap<String, Node>,
    findings: Vec<Finding>,
    cycles: HashSet<Node>,
}

impl<'a> MicrodataScan<'a> {
    fn new(scope: &'a NamespaceQuery<'a>, root: &Node) -> StructuralResult<Self> {
        let mut ids = HashMap::new();
        for node in scope.select_from(root, IDS_QUERY)? {
            if let Some(id) = node.get_attribute("id") {
                // First element wins for duplicate ids
                ids.entry(id).or_insert(node);
            }
        }

        Ok(Self {
            scope,
            root: root.clone(),
            ids,
            findings: Vec::new(),
            cycles: HashSet::new(),
        })
    }

    fn run(mut self) -> StructuralResult<(Vec<Finding>, Vec<MicrodataItem>)> {
        let referenced = self.check_scopes()?;
        self.check_properties(&referenced)?;

        let top_level = self.scope.select_from(&self.root, TOP_LEVEL_QUERY)?;
        let mut path = HashSet::new();
        let items = top_level
            .iter()
            .map(|element| self.item(element, &mut path))
            .collect();

        Ok((self.findings, items))
    }

    /// Check `itemtype`, `itemid` and `itemref` on every item; returns the ids
    /// that some `itemref` points at.
    fn check_scopes(&mut self) -> StructuralResult<HashSet<String>> {
        let mut referenced = HashSet::new();

        for element in self.scope.select_from(&self.root, SCOPES_QUERY)? {
            let label = describe(&element);
            let types = tokens(element.get_attribute("itemtype"));

            for item_type in &types {
                if !is_absolute_url(item_type) {
                    self.findings.push(Finding::error(format!(
                        "itemtype \"{item_type}\" on {label} is not an absolute URL"
                    )));
                }
            }

            if element.get_attribute("itemid").is_some() && types.is_empty() {
                self.findings.push(Finding::error(format!(
                    "itemid on {label} requires an itemtype"
                )));
            }

            for reference in tokens(element.get_attribute("itemref")) {
                if self.ids.contains_key(&reference) {
                    referenced.insert(reference);
                } else {
                    self.findings.push(Finding::error(format!(
                        "itemref \"{reference}\" on {label} does not match any element id"
                    )));
                }
            }
        }

        Ok(referenced)
    }

    fn check_properties(&mut self, referenced: &HashSet<String>) -> StructuralResult<()> {
        for element in self.scope.select_from(&self.root, PROPS_QUERY)? {
            if tokens(element.get_attribute("itemprop")).is_empty() {
                self.findings.push(Finding::error(format!(
                    "empty itemprop on {}",
                    describe(&element)
                )));
            }
        }

        for element in self.scope.select_from(&self.root, UNSCOPED_PROPS_QUERY)? {
            if !in_referenced_subtree(&element, referenced) {
                let names = element.get_attribute("itemprop").unwrap_or_default();
                self.findings.push(Finding::error(format!(
                    "itemprop \"{}\" on {} is not part of any item",
                    names.trim(),
                    describe(&element)
                )));
            }
        }

        Ok(())
    }

    /// Build the item rooted at `element`. `path` holds the items currently
    /// being built, outermost first.
    fn item(&mut self, element: &Node, path: &mut HashSet<Node>) -> MicrodataItem {
        let mut item = MicrodataItem {
            item_type: tokens(element.get_attribute("itemtype")),
            item_id: element
                .get_attribute("itemid")
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            properties: Vec::new(),
        };
        if path.len() >= MAX_NESTING {
            return item;
        }
        path.insert(element.clone());

        let mut pending = child_elements(element);
        for reference in tokens(element.get_attribute("itemref")) {
            if let Some(node) = self.ids.get(&reference) {
                pending.push(node.clone());
            }
        }
        pending.reverse();

        // Depth-first, document order; stop at nested items
        while let Some(node) = pending.pop() {
            let is_item = node.get_attribute("itemscope").is_some();
            let names = tokens(node.get_attribute("itemprop"));

            if !names.is_empty() {
                if is_item && path.contains(&node) {
                    self.report_cycle(&node);
                } else {
                    let (value, nested) = self.property(&node, path);
                    item.properties.extend(names.into_iter().map(|name| MicrodataProperty {
                        name,
                        value: value.clone(),
                        item: nested.clone(),
                    }));
                }
            }

            if !is_item {
                pending.extend(child_elements(&node).into_iter().rev());
            }
        }

        path.remove(element);
        item
    }

    /// Text value or nested item of a property element
    fn property(
        &mut self,
        node: &Node,
        path: &mut HashSet<Node>,
    ) -> (Option<String>, Option<Box<MicrodataItem>>) {
        if node.get_attribute("itemscope").is_some() {
            (None, Some(Box::new(self.item(node, path))))
        } else {
            (Some(property_value(node)), None)
        }
    }

    fn report_cycle(&mut self, node: &Node) {
        if self.cycles.insert(node.clone()) {
            self.findings.push(Finding::error(format!(
                "itemref cycle: {} is a property of itself",
                describe(node)
            )));
        }
    }
}

/// Value of a non-item property element
pub fn property_value(node: &Node) -> String {
    let attribute = |name: &str| node.get_attribute(name).unwrap_or_default();

    match node.get_name().as_str() {
        "meta" => attribute("content"),
        "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => attribute("src"),
        "a" | "area" | "link" => attribute("href"),
        "object" => attribute("data"),
        "data" | "meter" => attribute("value"),
        "time" => node
            .get_attribute("datetime")
            .unwrap_or_else(|| node.get_content()),
        _ => node.get_content(),
    }
}

fn tokens(value: Option<String>) -> Vec<String> {
    value
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn child_elements(node: &Node) -> Vec<Node> {
    let mut children = Vec::new();
    let mut current = node.get_first_child();
    while let Some(child) = current {
        if child.is_element_node() {
            children.push(child.clone());
        }
        current = child.get_next_sibling();
    }
    children
}

/// Whether `node` or one of its ancestors carries an id named by an `itemref`
fn in_referenced_subtree(node: &Node, referenced: &HashSet<String>) -> bool {
    let mut current = Some(node.clone());
    while let Some(element) = current {
        if let Some(id) = element.get_attribute("id") {
            if referenced.contains(&id) {
                return true;
            }
        }
        current = element.get_parent();
    }
    false
}

fn describe(node: &Node) -> String {
    match node.get_attribute("id") {
        Some(id) => format!("<{} id=\"{}\">", node.get_name(), id),
        None => format!("<{}>", node.get_name()),
    }
}
