use super::node::Commit;
use super::provider::CommitGraph;
use super::store::NodeStore;
use super::tree::{NodeId, Tree};
use crate::error::{GraphError, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

/// What happened to a commit handed to [`TreeBuilder::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// New nodes were placed in the tree
    Added,
    /// The commit already had a node
    AlreadyPresent,
    /// Older than the date limit; counted in `skipped_count`
    TooOld,
    /// No common ancestor with the mainline
    Disconnected,
    /// A merge commit sits between the commit and the mainline
    MergeUnsupported,
}

/// Builds a sparse commit tree.
///
/// Each node in the tree is a commit worth showing. Nodes keep a
/// parent/child relationship that loosely follows commit ancestry: the
/// mainline commit and every branch point on its history form a spine
/// under a synthetic root, and branch chains hang off that spine.
pub struct TreeBuilder<'g, G: CommitGraph> {
    graph: &'g G,
    mainline_id: String,
    mainline_node: NodeId,
    date_limit: Option<DateTime<Utc>>,
    skip_count: usize,
    tree: Tree,
    lookup: NodeStore,
}

impl<'g, G: CommitGraph> TreeBuilder<'g, G> {
    pub fn new(graph: &'g G, mainline: Commit, date_limit: Option<DateTime<Utc>>) -> Self {
        let mainline_id = mainline.id.clone();

        let mut tree = Tree::new();
        let mainline_node = tree.insert(mainline, true);
        tree.add_child(tree.root(), mainline_node);

        let mut lookup = NodeStore::new();
        lookup.insert(&tree, mainline_node);

        Self {
            graph,
            mainline_id,
            mainline_node,
            date_limit,
            skip_count: 0,
            tree,
            lookup,
        }
    }

    /// Fold the chain from `commit` down to the mainline into the tree
    pub fn add(&mut self, commit: &Commit, ignore_date_limit: bool) -> Result<AddOutcome> {
        if self.lookup.contains(&commit.id) {
            debug!(commit = %commit.id, "commit is already processed");
            return Ok(AddOutcome::AlreadyPresent);
        }

        if let Some(limit) = self.date_limit {
            if !ignore_date_limit && commit.timestamp < limit {
                self.skip_count += 1;
                debug!(commit = %commit.id, date = %commit.timestamp, "skipping commit as too old");
                return Ok(AddOutcome::TooOld);
            }
        }

        info!(commit = %commit.id, "adding commit");

        let Some(lca_id) = self
            .graph
            .lowest_common_ancestor(&commit.id, &self.mainline_id)?
        else {
            warn!(commit = %commit.id, "commit is not connected to the mainline");
            return Ok(AddOutcome::Disconnected);
        };

        // Walk towards the LCA first and only touch the tree once the whole
        // chain is known to be merge-free.
        let mut chain: Vec<Commit> = Vec::new();
        let mut anchor = None;
        let mut current = commit.clone();
        while current.id != lca_id {
            if let Some(existing) = self.lookup.get(&current.id) {
                anchor = Some(existing);
                break;
            }
            if current.is_merge() {
                error!(commit = %current.id, "merge commits are not supported");
                return Ok(AddOutcome::MergeUnsupported);
            }
            let Some(parent_id) = current.parents.first().cloned() else {
                return Err(GraphError::BrokenAncestry {
                    commit: current.id,
                    lca: lca_id,
                });
            };
            chain.push(current);
            current = self.graph.commit(&parent_id)?;
        }

        let lca_node = match self.lookup.get(&lca_id) {
            Some(node) => node,
            None => {
                let lca_commit = if current.id == lca_id {
                    current
                } else {
                    self.graph.commit(&lca_id)?
                };
                let (parent, child) = self.lca_slot(&lca_id)?;
                let node = self.tree.insert(lca_commit, true);
                self.lookup.insert(&self.tree, node);
                self.tree.splice(parent, node, child);
                node
            }
        };

        // Chain is ordered tip first; each node hangs under the next older one
        let mut newest_below: Option<NodeId> = None;
        for commit in chain {
            let node = self.tree.insert(commit, false);
            self.lookup.insert(&self.tree, node);
            if let Some(child) = newest_below {
                self.tree.add_child(node, child);
            }
            newest_below = Some(node);
        }

        if let Some(top) = newest_below {
            self.tree.add_child(anchor.unwrap_or(lca_node), top);
        }

        Ok(AddOutcome::Added)
    }

    /// Look up `id` through the commit graph and add it
    pub fn add_id(&mut self, id: &str, ignore_date_limit: bool) -> Result<AddOutcome> {
        if self.lookup.contains(id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        let commit = self.graph.commit(id)?;
        self.add(&commit, ignore_date_limit)
    }

    /// Find the spine edge a new mainline ancestor belongs on, walking up
    /// from the mainline tip. Returns the (parent, child) pair to splice
    /// between. Only queries the graph, so a failure leaves the tree as is.
    fn lca_slot(&self, lca_id: &str) -> Result<(NodeId, NodeId)> {
        let root = self.tree.root();

        let mut node = self.mainline_node;
        while let Some(parent) = self.tree.parent(node) {
            let parent_id = match self.tree.node(parent).commit() {
                Some(commit) if parent != root => commit.id.as_str(),
                _ => return Ok((parent, node)),
            };
            let base = self.graph.lowest_common_ancestor(lca_id, parent_id)?;
            if base.as_deref() == Some(parent_id) {
                return Ok((parent, node));
            }
            node = parent;
        }

        Ok((root, node))
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn mainline_node(&self) -> NodeId {
        self.mainline_node
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Number of commits dropped by the date limit
    pub fn skipped_count(&self) -> usize {
        self.skip_count
    }

    pub fn node_for(&self, commit_id: &str) -> Option<NodeId> {
        self.lookup.get(commit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryGraph;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    /// Shape of a tree keyed by commit ID: (parent ID, on mainline, sorted children)
    type Shape = BTreeMap<String, (Option<String>, bool, Vec<String>)>;

    fn id_of(tree: &Tree, node: NodeId) -> Option<String> {
        tree.node(node).commit().map(|c| c.id.clone())
    }

    fn shape(tree: &Tree) -> Shape {
        tree.iter()
            .filter_map(|(id, node)| {
                let commit = node.commit()?;
                let parent = node.parent().and_then(|p| id_of(tree, p));
                let mut children: Vec<String> = tree
                    .children(id)
                    .iter()
                    .filter_map(|&c| id_of(tree, c))
                    .collect();
                children.sort();
                Some((commit.id.clone(), (parent, node.is_on_mainline(), children)))
            })
            .collect()
    }

    fn parent_of(builder: &TreeBuilder<'_, MemoryGraph>, id: &str) -> Option<String> {
        let node = builder.node_for(id)?;
        let parent = builder.tree().parent(node)?;
        id_of(builder.tree(), parent)
    }

    /// M1 <- M2 <- M3 (mainline tip), F1 <- F2 branching off M2
    fn scenario() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        graph.add("M1", &[], 100);
        graph.add("M2", &["M1"], 200);
        graph.add("M3", &["M2"], 300);
        graph.add("F1", &["M2"], 250);
        graph.add("F2", &["F1"], 260);
        graph
    }

    /// A richer history: mainline M1..M5, branches off M1, M2 and M4,
    /// a branch stacked on another branch, and a stale branch behind M3.
    fn forest() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        graph.add("M1", &[], 100);
        graph.add("M2", &["M1"], 200);
        graph.add("M3", &["M2"], 300);
        graph.add("M4", &["M3"], 400);
        graph.add("M5", &["M4"], 500);
        graph.add("A1", &["M1"], 150);
        graph.add("A2", &["A1"], 160);
        graph.add("B1", &["M2"], 250);
        graph.add("C1", &["M4"], 450);
        graph.add("C2", &["C1"], 460);
        graph.add("D1", &["C1"], 470);
        graph
    }

    #[test]
    fn test_new_builder_has_mainline_under_root() {
        let graph = scenario();
        let builder = TreeBuilder::new(&graph, graph.get("M3"), None);
        let tree = builder.tree();

        assert_eq!(tree.children(builder.root()), &[builder.mainline_node()]);
        assert!(tree.node(builder.mainline_node()).is_on_mainline());
        assert_eq!(builder.node_for("M3"), Some(builder.mainline_node()));
    }

    #[test]
    fn test_scenario_splices_branch_point() -> anyhow::Result<()> {
        let graph = scenario();
        let mut builder = TreeBuilder::new(&graph, graph.get("M3"), None);

        assert_eq!(builder.add(&graph.get("F2"), false)?, AddOutcome::Added);

        assert_eq!(parent_of(&builder, "M2"), None::<String>);
        let m2 = builder.node_for("M2").unwrap();
        assert_eq!(builder.tree().parent(m2), Some(builder.root()));
        assert!(builder.tree().node(m2).is_on_mainline());
        assert_eq!(parent_of(&builder, "M3").as_deref(), Some("M2"));
        assert_eq!(parent_of(&builder, "F1").as_deref(), Some("M2"));
        assert_eq!(parent_of(&builder, "F2").as_deref(), Some("F1"));
        assert!(!builder.tree().node(builder.node_for("F1").unwrap()).is_on_mainline());
        assert!(builder.node_for("M1").is_none());
        Ok(())
    }

    #[test]
    fn test_add_is_idempotent() -> anyhow::Result<()> {
        let graph = scenario();
        let mut builder = TreeBuilder::new(&graph, graph.get("M3"), None);

        builder.add(&graph.get("F2"), false)?;
        let before = shape(builder.tree());
        let nodes = builder.tree().len();

        assert_eq!(builder.add(&graph.get("F2"), false)?, AddOutcome::AlreadyPresent);
        assert_eq!(builder.add(&graph.get("M3"), false)?, AddOutcome::AlreadyPresent);
        assert_eq!(shape(builder.tree()), before);
        assert_eq!(builder.tree().len(), nodes);
        Ok(())
    }

    #[test]
    fn test_existing_lca_is_reused() -> anyhow::Result<()> {
        let mut graph = scenario();
        graph.add("G1", &["M2"], 270);
        let mut builder = TreeBuilder::new(&graph, graph.get("M3"), None);

        builder.add(&graph.get("F2"), false)?;
        builder.add(&graph.get("G1"), false)?;

        let m2 = builder.node_for("M2").unwrap();
        let mut children: Vec<String> = builder
            .tree()
            .children(m2)
            .iter()
            .filter_map(|&c| id_of(builder.tree(), c))
            .collect();
        children.sort();
        assert_eq!(children, vec!["F1", "G1", "M3"]);
        // M2 exists exactly once
        assert_eq!(
            builder.tree().iter().filter(|(_, n)| n.commit().map(|c| c.id.as_str()) == Some("M2")).count(),
            1
        );
        Ok(())
    }

    #[test]
    fn test_branch_stacked_on_branch_attaches_to_existing_node() -> anyhow::Result<()> {
        let graph = forest();
        let mut builder = TreeBuilder::new(&graph, graph.get("M5"), None);

        builder.add(&graph.get("C2"), false)?;
        builder.add(&graph.get("D1"), false)?;

        assert_eq!(parent_of(&builder, "D1").as_deref(), Some("C1"));
        assert_eq!(parent_of(&builder, "C2").as_deref(), Some("C1"));
        assert_eq!(parent_of(&builder, "C1").as_deref(), Some("M4"));
        Ok(())
    }

    #[test]
    fn test_ancestor_of_mainline_becomes_spine_node() -> anyhow::Result<()> {
        let graph = forest();
        let mut builder = TreeBuilder::new(&graph, graph.get("M5"), None);

        assert_eq!(builder.add(&graph.get("M3"), false)?, AddOutcome::Added);
        let m3 = builder.node_for("M3").unwrap();
        assert!(builder.tree().node(m3).is_on_mainline());
        assert_eq!(parent_of(&builder, "M5").as_deref(), Some("M3"));
        assert_eq!(builder.tree().parent(m3), Some(builder.root()));
        Ok(())
    }

    #[test]
    fn test_deeper_branch_point_goes_below_existing_spine() -> anyhow::Result<()> {
        let graph = forest();
        let mut builder = TreeBuilder::new(&graph, graph.get("M5"), None);

        builder.add(&graph.get("C2"), false)?;
        builder.add(&graph.get("A2"), false)?;
        builder.add(&graph.get("B1"), false)?;

        // root -> M1 -> M2 -> M4 -> M5
        assert_eq!(parent_of(&builder, "M5").as_deref(), Some("M4"));
        assert_eq!(parent_of(&builder, "M4").as_deref(), Some("M2"));
        assert_eq!(parent_of(&builder, "M2").as_deref(), Some("M1"));
        let m1 = builder.node_for("M1").unwrap();
        assert_eq!(builder.tree().parent(m1), Some(builder.root()));
        assert_eq!(parent_of(&builder, "B1").as_deref(), Some("M2"));
        assert_eq!(parent_of(&builder, "A1").as_deref(), Some("M1"));
        Ok(())
    }

    #[test]
    fn test_order_independence() -> anyhow::Result<()> {
        let graph = forest();
        let tips = ["A2", "B1", "C2", "D1", "M3"];

        let build = |order: &[&str]| -> anyhow::Result<Shape> {
            let mut builder = TreeBuilder::new(&graph, graph.get("M5"), None);
            for id in order {
                builder.add(&graph.get(id), false)?;
            }
            Ok(shape(builder.tree()))
        };

        let expected = build(&tips)?;
        let mut order = tips.to_vec();
        for rotation in 0..tips.len() {
            order.rotate_left(1);
            assert_eq!(build(&order)?, expected, "rotation {}", rotation);
            let reversed: Vec<&str> = order.iter().rev().copied().collect();
            assert_eq!(build(&reversed)?, expected, "reversed rotation {}", rotation);
        }
        Ok(())
    }

    #[test]
    fn test_every_node_reaches_root() -> anyhow::Result<()> {
        let graph = forest();
        let mut builder = TreeBuilder::new(&graph, graph.get("M5"), None);
        for id in ["D1", "A2", "M3", "C2", "B1"] {
            builder.add(&graph.get(id), false)?;
        }

        let tree = builder.tree();
        for (id, node) in tree.iter() {
            if id == tree.root() {
                assert!(!node.has_parent());
                continue;
            }
            assert!(node.has_parent());
            assert!(tree.depth(id) < tree.len());
            let parent = node.parent().unwrap();
            assert_eq!(
                tree.children(parent).iter().filter(|&&c| c == id).count(),
                1
            );
        }
        Ok(())
    }

    #[test]
    fn test_date_limit_skips_and_counts() -> anyhow::Result<()> {
        let graph = scenario();
        let limit = Utc.timestamp_opt(255, 0).unwrap();
        let mut builder = TreeBuilder::new(&graph, graph.get("M3"), Some(limit));

        assert_eq!(builder.add(&graph.get("F1"), false)?, AddOutcome::TooOld);
        assert_eq!(builder.skipped_count(), 1);
        assert!(builder.node_for("F1").is_none());

        assert_eq!(builder.add(&graph.get("F1"), true)?, AddOutcome::Added);
        assert_eq!(builder.skipped_count(), 1);
        assert!(builder.node_for("F1").is_some());

        // F2 is newer than the limit
        assert_eq!(builder.add(&graph.get("F2"), false)?, AddOutcome::Added);
        assert_eq!(builder.skipped_count(), 1);
        Ok(())
    }

    #[test]
    fn test_disconnected_history_is_dropped() -> anyhow::Result<()> {
        let mut graph = scenario();
        graph.add("X1", &[], 400);
        graph.add("X2", &["X1"], 410);
        let mut builder = TreeBuilder::new(&graph, graph.get("M3"), None);

        assert_eq!(builder.add(&graph.get("X2"), false)?, AddOutcome::Disconnected);
        assert!(builder.node_for("X2").is_none());
        assert_eq!(builder.tree().len(), 2);
        Ok(())
    }

    #[test]
    fn test_merge_in_chain_leaves_tree_untouched() -> anyhow::Result<()> {
        let mut graph = scenario();
        graph.add("G1", &["M2"], 270);
        graph.add("G2", &["G1", "F1"], 280);
        graph.add("G3", &["G2"], 290);
        let mut builder = TreeBuilder::new(&graph, graph.get("M3"), None);

        builder.add(&graph.get("F2"), false)?;
        let before = shape(builder.tree());

        assert_eq!(builder.add(&graph.get("G3"), false)?, AddOutcome::MergeUnsupported);
        assert_eq!(shape(builder.tree()), before);
        assert!(builder.node_for("G3").is_none());
        Ok(())
    }

    #[test]
    fn test_merge_commit_as_branch_point() -> anyhow::Result<()> {
        let mut graph = MemoryGraph::new();
        graph.add("M1", &[], 100);
        graph.add("M2", &["M1"], 200);
        graph.add("S1", &["M1"], 210);
        graph.add("MG", &["M2", "S1"], 300);
        graph.add("M3", &["MG"], 400);
        graph.add("F1", &["MG"], 350);
        graph.add("F2", &["F1"], 360);
        let mut builder = TreeBuilder::new(&graph, graph.get("M3"), None);

        assert_eq!(builder.add(&graph.get("F2"), false)?, AddOutcome::Added);

        let mg = builder.node_for("MG").unwrap();
        assert!(builder.tree().node(mg).is_on_mainline());
        assert_eq!(builder.tree().parent(mg), Some(builder.root()));
        assert_eq!(parent_of(&builder, "M3").as_deref(), Some("MG"));
        assert_eq!(parent_of(&builder, "F1").as_deref(), Some("MG"));
        assert_eq!(parent_of(&builder, "F2").as_deref(), Some("F1"));
        assert!(builder.node_for("M2").is_none());
        assert!(builder.node_for("S1").is_none());
        Ok(())
    }

    /// Delegates to a `MemoryGraph` but fails LCA queries against one commit
    struct FailingLca<'a> {
        inner: &'a MemoryGraph,
        poisoned: &'static str,
    }

    impl CommitGraph for FailingLca<'_> {
        fn commit(&self, id: &str) -> Result<Commit> {
            self.inner.commit(id)
        }

        fn lowest_common_ancestor(&self, a: &str, b: &str) -> Result<Option<String>> {
            if a == self.poisoned || b == self.poisoned {
                return Err(GraphError::CommitNotFound(self.poisoned.to_string()));
            }
            self.inner.lowest_common_ancestor(a, b)
        }
    }

    #[test]
    fn test_failed_splice_query_leaves_tree_untouched() -> anyhow::Result<()> {
        let graph = forest();
        let failing = FailingLca {
            inner: &graph,
            poisoned: "M4",
        };
        let mut builder = TreeBuilder::new(&failing, graph.get("M5"), None);

        // M4 becomes a spine node without any query against it
        assert_eq!(builder.add(&graph.get("C2"), false)?, AddOutcome::Added);
        let before = shape(builder.tree());
        let len = builder.tree().len();

        // Placing M2 asks for LCA(M2, M4) while walking the spine
        assert!(builder.add(&graph.get("B1"), false).is_err());
        assert!(builder.node_for("M2").is_none());
        assert!(builder.node_for("B1").is_none());
        assert_eq!(builder.tree().len(), len);
        assert_eq!(shape(builder.tree()), before);
        Ok(())
    }

    #[test]
    fn test_add_id_looks_up_commit() -> anyhow::Result<()> {
        let graph = scenario();
        let mut builder = TreeBuilder::new(&graph, graph.get("M3"), None);

        assert_eq!(builder.add_id("F2", false)?, AddOutcome::Added);
        assert_eq!(builder.add_id("F2", false)?, AddOutcome::AlreadyPresent);
        assert!(matches!(
            builder.add_id("nope", false),
            Err(GraphError::CommitNotFound(id)) if id == "nope"
        ));
        Ok(())
    }
}
