use chrono::{DateTime, Utc};

/// Length of the abbreviated commit id shown to users
pub const SHORT_ID_LEN: usize = 7;

/// A commit as seen by the sparse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Unique commit ID (SHA)
    pub id: String,
    /// Parent commit IDs
    pub parents: Vec<String>,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Author name
    pub author: String,
    /// Author email
    pub email: String,
    /// Full commit message
    pub message: String,
}

impl Commit {
    pub fn new(
        id: String,
        parents: Vec<String>,
        timestamp: DateTime<Utc>,
        author: String,
        email: String,
        message: String,
    ) -> Self {
        Self {
            id,
            parents,
            timestamp,
            author,
            email,
            message,
        }
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Whether `id` is one of this commit's recorded parents
    pub fn has_parent(&self, id: &str) -> bool {
        self.parents.iter().any(|parent| parent == id)
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn short_id(&self) -> &str {
        &self.id[..SHORT_ID_LEN.min(self.id.len())]
    }
}
