use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::snippet::Snippet;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

pub const ROOT_LABEL: &str = "Snippets";

/// Process-unique identity of a node in a [`SnippetTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Read-only hierarchical model that can be wrapped by a
/// [`FilteredTreeModel`](crate::FilteredTreeModel).
pub trait TreeModel {
    type Node;

    fn root(&self) -> &Self::Node;

    fn child_count(&self, node: &Self::Node) -> usize;

    fn child<'a>(&'a self, node: &'a Self::Node, index: usize) -> Option<&'a Self::Node>;

    fn is_leaf(&self, node: &Self::Node) -> bool {
        self.child_count(node) == 0
    }

    /// Text shown for the node; filters match against it.
    fn label<'a>(&'a self, node: &'a Self::Node) -> &'a str;

    /// Snippet carried by the node, if any.
    fn snippet<'a>(&'a self, _node: &'a Self::Node) -> Option<&'a Snippet> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Category(String),
    Leaf(Snippet),
}

#[derive(Debug, Clone)]
pub struct SnippetNode {
    id: NodeId,
    payload: NodePayload,
    children: Vec<SnippetNode>,
}

impl SnippetNode {
    pub fn category(label: impl Into<String>, children: Vec<SnippetNode>) -> Self {
        Self {
            id: NodeId::next(),
            payload: NodePayload::Category(label.into()),
            children,
        }
    }

    pub fn leaf(snippet: Snippet) -> Self {
        Self {
            id: NodeId::next(),
            payload: NodePayload::Leaf(snippet),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    pub fn children(&self) -> &[SnippetNode] {
        &self.children
    }

    pub fn label(&self) -> &str {
        match &self.payload {
            NodePayload::Category(label) => label,
            NodePayload::Leaf(snippet) => snippet.name(),
        }
    }

    pub fn snippet(&self) -> Option<&Snippet> {
        match &self.payload {
            NodePayload::Leaf(snippet) => Some(snippet),
            NodePayload::Category(_) => None,
        }
    }
}

/// Snapshot of the store shaped as root → language category → snippet leaf.
///
/// The tree owns copies of the snippets; later store mutations are not
/// reflected until a new tree is built.
#[derive(Debug, Clone)]
pub struct SnippetTree {
    root: SnippetNode,
}

impl SnippetTree {
    pub fn new(categories: Vec<SnippetNode>) -> Self {
        Self {
            root: SnippetNode::category(ROOT_LABEL, categories),
        }
    }

    pub fn root(&self) -> &SnippetNode {
        &self.root
    }

    /// Depth-first search for a node by identity.
    pub fn find(&self, id: NodeId) -> Option<&SnippetNode> {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Snippet> {
        self.root
            .children
            .iter()
            .flat_map(|category| category.children.iter())
            .filter_map(SnippetNode::snippet)
    }
}

impl TreeModel for SnippetTree {
    type Node = SnippetNode;

    fn root(&self) -> &SnippetNode {
        &self.root
    }

    fn child_count(&self, node: &SnippetNode) -> usize {
        node.children.len()
    }

    fn child<'a>(&'a self, node: &'a SnippetNode, index: usize) -> Option<&'a SnippetNode> {
        node.children.get(index)
    }

    fn is_leaf(&self, node: &SnippetNode) -> bool {
        matches!(node.payload, NodePayload::Leaf(_))
    }

    fn label<'a>(&'a self, node: &'a SnippetNode) -> &'a str {
        node.label()
    }

    fn snippet<'a>(&'a self, node: &'a SnippetNode) -> Option<&'a Snippet> {
        node.snippet()
    }
}
