use super::tree::{NodeId, Tree};
use std::collections::HashMap;

/// Fast lookup of a tree node by its commit ID
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    lookup: HashMap<String, NodeId>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under its commit ID. Nodes without a commit are ignored.
    pub fn insert(&mut self, tree: &Tree, node: NodeId) {
        if let Some(commit) = tree.node(node).commit() {
            self.lookup.insert(commit.id.clone(), node);
        }
    }

    pub fn get(&self, commit_id: &str) -> Option<NodeId> {
        self.lookup.get(commit_id).copied()
    }

    pub fn contains(&self, commit_id: &str) -> bool {
        self.lookup.contains_key(commit_id)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}
