pub mod node;
pub mod tree;
pub mod store;
pub mod provider;
pub mod builder;

pub use node::{Commit, SHORT_ID_LEN};
pub use tree::{NodeId, Tree, TreeNode};
pub use store::NodeStore;
pub use provider::CommitGraph;
pub use builder::{AddOutcome, TreeBuilder};
