use super::node::Commit;
use crate::error::Result;

/// Read-only access to commit ancestry
pub trait CommitGraph {
    /// Look up a single commit by its full ID
    fn commit(&self, id: &str) -> Result<Commit>;

    /// The unique lowest common ancestor of two commits, or `None` when
    /// their histories are unrelated (or have no single best base)
    fn lowest_common_ancestor(&self, a: &str, b: &str) -> Result<Option<String>>;
}

impl<G: CommitGraph + ?Sized> CommitGraph for &G {
    fn commit(&self, id: &str) -> Result<Commit> {
        (**self).commit(id)
    }

    fn lowest_common_ancestor(&self, a: &str, b: &str) -> Result<Option<String>> {
        (**self).lowest_common_ancestor(a, b)
    }
}
