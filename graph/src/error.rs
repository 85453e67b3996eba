use thiserror::Error;

/// Failures raised while querying commit ancestry
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("commit {0} not found")]
    CommitNotFound(String),

    #[error("commit {0} has an invalid timestamp")]
    InvalidTimestamp(String),

    #[error("commit {commit} has no parent before reaching its common ancestor {lca}")]
    BrokenAncestry { commit: String, lca: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
