//! Sparse commit tree construction and rendering.
//!
//! Commits of interest (branch tips and the points where they leave the
//! mainline) are folded into a [`Tree`] by [`TreeBuilder`], then printed
//! as an ASCII graph by [`TreeRenderer`].

pub mod core;
pub mod decor;
pub mod error;
pub mod git_backend;
pub mod render;

#[cfg(test)]
mod testing;

pub use self::core::{AddOutcome, Commit, CommitGraph, NodeId, NodeStore, Tree, TreeBuilder, TreeNode};
pub use decor::{Head, RefDescriptor, RefMap};
pub use error::{GraphError, Result};
pub use git_backend::GitWalker;
pub use render::{relative_date, NodeSummary, SummaryFormatter, TreeRenderer, DEFAULT_MAX_CHAIN};
