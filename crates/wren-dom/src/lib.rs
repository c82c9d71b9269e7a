//! Element tree for the wren XML parser.
//!
//! # Design
//!
//! All nodes of one document live in an arena ([`XmlTree`]) and refer to each
//! other through [`NodeId`] indices. A node does not keep an ordered child
//! list. Instead its `children` map holds **one entry per distinct child tag
//! name**, and that entry is the head of a chain of same-named siblings
//! linked through [`Node::next`]:
//!
//! ```text
//! <feed>                      feed.children["entry"] -> entry#1 -> entry#2 -> entry#3
//!   <entry/> <title/>         feed.children["title"] -> title
//!   <entry/> <entry/>
//! </feed>
//! ```
//!
//! `next` only threads siblings that share a name; it is not a document-order
//! link. Once the builder has closed a parent, each of its chains is in
//! document order (first-seen child is the head).
//!
//! Tag names are interned per tree (see [`names`]), so children-map keys and
//! name comparisons are handle compares. Dropping the tree releases every node,
//! attribute and text payload at once.

pub mod names;
mod snapshot;

use std::collections::{HashMap, VecDeque};

pub use names::{Name, NameTable};
pub use snapshot::NodeSnapshot;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root element is always the first node allocated.
    pub const ROOT: Self = Self(0);
}

/// One element of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Interned tag name.
    pub name: Name,

    /// Attribute name to value. Keys are unique; order is not kept.
    pub attrs: AttributesMap,

    /// Head of the same-name sibling chain for each distinct child name.
    pub children: HashMap<Name, NodeId>,

    /// Distinct child names in the order they were first seen under this node.
    pub child_names: Vec<Name>,

    /// Next sibling under the same parent that has the same name as this node.
    pub next: Option<NodeId>,

    /// Parent element, `None` for the root.
    pub parent: Option<NodeId>,

    /// Text seen while this node was the innermost open element.
    /// A later text run replaces an earlier one.
    pub content: Option<String>,
}

impl Node {
    fn new(name: Name, attrs: AttributesMap) -> Self {
        Self {
            name,
            attrs,
            children: HashMap::new(),
            child_names: Vec::new(),
            next: None,
            parent: None,
            content: None,
        }
    }
}

/// Arena-backed element tree produced by one parse.
///
/// `PartialEq` compares node-by-node, so two parses of the same input are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlTree {
    /// All nodes, indexed by `NodeId`. The root is at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
    names: NameTable,
}

impl XmlTree {
    /// Create an empty tree. The first allocated element becomes the root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the root element ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of elements in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no element has been allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The tree's name table.
    #[must_use]
    pub const fn names(&self) -> &NameTable {
        &self.names
    }

    /// Intern a tag name in this tree's table.
    pub fn intern(&mut self, text: &str) -> Name {
        self.names.intern(text)
    }

    /// The handle for `text`, if any element of this tree uses that name.
    #[must_use]
    pub fn lookup_name(&self, text: &str) -> Option<Name> {
        self.names.lookup(text)
    }

    // =========================================================================
    // Construction (used by the tree builder)
    // =========================================================================

    /// Allocate a new, unattached element and return its ID.
    pub fn alloc_element(&mut self, name: Name, attrs: AttributesMap) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, attrs));
        id
    }

    /// Attach `child` under `parent` as the new head of its name's chain.
    ///
    /// If `parent` already has a child with this name, that child becomes
    /// `child.next`. Chains are therefore newest-first until
    /// [`restore_document_order`](Self::restore_document_order) runs for `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either ID was not allocated by this tree.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].next.is_none());

        let name = self.nodes[child.0].name;
        self.nodes[child.0].parent = Some(parent);

        let previous_head = self.nodes[parent.0].children.insert(name, child);
        match previous_head {
            Some(head) => self.nodes[child.0].next = Some(head),
            None => self.nodes[parent.0].child_names.push(name),
        }
    }

    /// Reverse every multi-node chain under `parent`, turning the
    /// newest-first order left by [`prepend_child`](Self::prepend_child)
    /// into document order.
    ///
    /// Must run exactly once per parent, after its last child was attached.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not allocated by this tree.
    pub fn restore_document_order(&mut self, parent: NodeId) {
        for i in 0..self.nodes[parent.0].child_names.len() {
            let name = self.nodes[parent.0].child_names[i];
            let Some(&head) = self.nodes[parent.0].children.get(&name) else {
                continue;
            };
            if self.nodes[head.0].next.is_none() {
                continue;
            }
            let new_head = self.reverse_chain(head);
            let _ = self.nodes[parent.0].children.insert(name, new_head);
        }
    }

    /// Reverse a `next` chain in place and return its new head.
    fn reverse_chain(&mut self, head: NodeId) -> NodeId {
        let mut prev = None;
        let mut current = Some(head);
        while let Some(id) = current {
            current = self.nodes[id.0].next;
            self.nodes[id.0].next = prev;
            prev = Some(id);
        }
        prev.unwrap_or(head)
    }

    /// Replace the text content of an element.
    pub fn set_content(&mut self, id: NodeId, text: String) {
        if let Some(node) = self.get_mut(id) {
            node.content = Some(text);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The tag name of an element.
    #[must_use]
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| self.names.resolve(n.name))
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id)
            .and_then(|n| n.attrs.get(attr_name))
            .map(String::as_str)
    }

    /// The text content of an element, if any text was seen inside it.
    #[must_use]
    pub fn content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.content.as_deref())
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The first child of `id` named `tag` (the head of that name's chain).
    #[must_use]
    pub fn child(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let name = self.lookup_name(tag)?;
        self.get(id).and_then(|n| n.children.get(&name).copied())
    }

    /// The next sibling with the same name as `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next)
    }

    /// Iterate over `id` and every later sibling sharing its name.
    pub fn siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.get(id).map(|_| id),
        }
    }

    /// Iterate over all children of `id` named `tag`, in chain order.
    pub fn children_named(&self, id: NodeId, tag: &str) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.child(id, tag),
        }
    }

    /// Distinct child tag names of `id`, in first-seen order.
    pub fn child_names(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.get(id)
            .map_or(&[][..], |n| n.child_names.as_slice())
            .iter()
            .filter_map(|&name| self.names.resolve(name))
    }

    /// Iterate over all children of `id`: each name's chain in turn, names in
    /// first-seen order.
    pub fn children(&self, id: NodeId) -> ChildIterator<'_> {
        let names = self.get(id).map_or(&[][..], |n| n.child_names.as_slice());
        ChildIterator {
            tree: self,
            parent: id,
            names: names.iter(),
            current: None,
        }
    }

    /// Iterate over all ancestors of a node, from parent to root.
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Number of ancestors of `id` (the root has depth 0).
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Find the shallowest descendant of `start` named `tag`.
    ///
    /// Nodes are visited level by level. For each visited node its children
    /// map is consulted first, so the returned node has minimum depth below
    /// `start`; among equally deep matches the one under the earliest visited
    /// parent wins, and within a parent the chain head. `start` itself is never
    /// returned. Every member of a same-name chain is explored.
    #[must_use]
    pub fn find(&self, start: NodeId, tag: &str) -> Option<NodeId> {
        let tag = self.lookup_name(tag)?;
        let mut queue = VecDeque::from([start]);

        while let Some(id) = queue.pop_front() {
            let Some(node) = self.get(id) else {
                continue;
            };
            if let Some(&hit) = node.children.get(&tag) {
                return Some(hit);
            }
            queue.extend(self.children(id));
        }
        None
    }

    /// Collect every descendant of `start` named `tag`, in level order.
    #[must_use]
    pub fn find_all(&self, start: NodeId, tag: &str) -> Vec<NodeId> {
        let Some(tag) = self.lookup_name(tag) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        let mut queue = VecDeque::from([start]);

        while let Some(id) = queue.pop_front() {
            for child in self.children(id) {
                if self.get(child).is_some_and(|n| n.name == tag) {
                    found.push(child);
                }
                queue.push_back(child);
            }
        }
        found
    }

    /// Build an owned, serializable copy of the subtree at `id`.
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        snapshot::build(self, id)
    }
}

/// Iterator over a same-name sibling chain.
pub struct SiblingIterator<'a> {
    tree: &'a XmlTree,
    current: Option<NodeId>,
}

impl Iterator for SiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Iterator over all children of a node, chain by chain.
pub struct ChildIterator<'a> {
    tree: &'a XmlTree,
    parent: NodeId,
    names: std::slice::Iter<'a, Name>,
    current: Option<NodeId>,
}

impl Iterator for ChildIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.current {
                self.current = self.tree.next_sibling(id);
                return Some(id);
            }
            let name = self.names.next()?;
            self.current = self
                .tree
                .get(self.parent)
                .and_then(|n| n.children.get(name).copied());
        }
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a XmlTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
