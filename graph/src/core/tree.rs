use super::node::Commit;

/// Index of a node inside its owning [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A commit's position in the sparse tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    commit: Option<Commit>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    on_mainline: bool,
}

impl TreeNode {
    fn new(commit: Option<Commit>, on_mainline: bool) -> Self {
        Self {
            commit,
            parent: None,
            children: Vec::new(),
            on_mainline,
        }
    }

    /// The commit this node stands for; `None` only for the root
    pub fn commit(&self) -> Option<&Commit> {
        self.commit.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_on_mainline(&self) -> bool {
        self.on_mainline
    }
}

/// Arena holding every node of one sparse tree.
///
/// Children lists own the placement of a node; parent links are plain
/// back-references used for splicing and ancestry checks.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Create a tree holding only the synthetic root
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(None, false)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Count of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    /// Allocate a detached node for `commit`
    pub(crate) fn insert(&mut self, commit: Commit, on_mainline: bool) -> NodeId {
        self.nodes.push(TreeNode::new(Some(commit), on_mainline));
        NodeId(self.nodes.len() - 1)
    }

    /// Attach `child` under `parent`, detaching it from any previous parent
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(previous) = self.nodes[child.0].parent {
            self.remove_child(previous, child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes[child.0].parent != Some(parent) {
            return;
        }
        self.nodes[child.0].parent = None;
        self.nodes[parent.0].children.retain(|&id| id != child);
    }

    /// Insert `node` between `parent` and its existing child `child`
    pub(crate) fn splice(&mut self, parent: NodeId, node: NodeId, child: NodeId) {
        self.remove_child(parent, child);
        self.add_child(parent, node);
        self.add_child(node, child);
    }

    /// True when the node's commit lists its tree parent's commit as a
    /// parent, i.e. no history was left out between the two.
    pub fn is_direct_child(&self, id: NodeId) -> bool {
        let node = self.node(id);
        let (Some(commit), Some(parent)) = (node.commit(), node.parent) else {
            return false;
        };
        match self.node(parent).commit() {
            Some(parent_commit) => commit.has_parent(&parent_commit.id),
            None => false,
        }
    }

    /// Number of parent links between `id` and the root
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
