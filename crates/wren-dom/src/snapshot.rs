//! Owned, serializable view of a subtree.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{NodeId, XmlTree};

/// A self-contained copy of one element and its descendants.
///
/// Children appear chain by chain (names in first-seen order, each chain in
/// sibling order). Attributes are sorted by name so output is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    /// Tag name.
    pub name: String,
    /// Attributes, sorted by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Child elements.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

pub(crate) fn build(tree: &XmlTree, id: NodeId) -> Option<NodeSnapshot> {
    let node = tree.get(id)?;
    Some(NodeSnapshot {
        name: tree.name_of(id)?.to_string(),
        attributes: node
            .attrs
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        content: node.content.clone(),
        children: tree
            .children(id)
            .filter_map(|child| build(tree, child))
            .collect(),
    })
}
