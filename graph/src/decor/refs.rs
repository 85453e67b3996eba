use std::collections::{BTreeSet, HashMap};

static NO_NAMES: BTreeSet<String> = BTreeSet::new();

/// A named reference resolved to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefDescriptor {
    /// Short display name, e.g. `main` or `origin/main`
    pub name: String,
    /// Full reference name, e.g. `refs/heads/main`
    pub full_name: String,
    /// Target commit ID
    pub target: String,
}

impl RefDescriptor {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            target: target.into(),
        }
    }
}

/// Where HEAD currently points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    /// Full name of the branch HEAD is attached to; `None` when detached
    pub target_ref: Option<String>,
    /// Commit HEAD resolves to
    pub commit: String,
}

impl Head {
    pub fn attached(target_ref: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            target_ref: Some(target_ref.into()),
            commit: commit.into(),
        }
    }

    pub fn detached(commit: impl Into<String>) -> Self {
        Self {
            target_ref: None,
            commit: commit.into(),
        }
    }

    pub fn is_detached(&self) -> bool {
        self.target_ref.is_none()
    }
}

/// Maps a commit ID to the names of the refs pointing at it
#[derive(Debug, Clone)]
pub struct RefMap {
    head: Head,
    names: HashMap<String, BTreeSet<String>>,
}

impl RefMap {
    pub fn new(head: Head) -> Self {
        let mut names: HashMap<String, BTreeSet<String>> = HashMap::new();
        if head.is_detached() {
            names
                .entry(head.commit.clone())
                .or_default()
                .insert("HEAD".to_string());
        }
        Self { head, names }
    }

    pub fn add(&mut self, reference: &RefDescriptor) {
        let name = if self.head.target_ref.as_deref() == Some(reference.full_name.as_str()) {
            format!("HEAD -> {}", reference.name)
        } else {
            reference.name.clone()
        };
        self.names
            .entry(reference.target.clone())
            .or_default()
            .insert(name);
    }

    /// Names for `commit_id`, sorted; empty when nothing points there
    pub fn names_for(&self, commit_id: &str) -> &BTreeSet<String> {
        self.names.get(commit_id).unwrap_or(&NO_NAMES)
    }

    pub fn head(&self) -> &Head {
        &self.head
    }
}
