//! In-memory commit graph used by unit tests

use crate::core::{Commit, CommitGraph};
use crate::error::{GraphError, Result};
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct MemoryGraph {
    commits: HashMap<String, Commit>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit authored by `dev@example.com` whose message is its ID
    pub fn add(&mut self, id: &str, parents: &[&str], seconds: i64) -> Commit {
        self.add_with_message(id, parents, seconds, id)
    }

    pub fn add_with_message(
        &mut self,
        id: &str,
        parents: &[&str],
        seconds: i64,
        message: &str,
    ) -> Commit {
        let commit = Commit::new(
            id.to_string(),
            parents.iter().map(|p| p.to_string()).collect(),
            Utc.timestamp_opt(seconds, 0).unwrap(),
            "Dev".to_string(),
            "dev@example.com".to_string(),
            message.to_string(),
        );
        self.commits.insert(id.to_string(), commit.clone());
        commit
    }

    /// Add a linear run of commits on top of `base`, one second apart
    pub fn add_chain(&mut self, base: &str, ids: &[String], start: i64) {
        let mut parent = base.to_string();
        for (offset, id) in ids.iter().enumerate() {
            self.add(id, &[&parent], start + offset as i64);
            parent = id.clone();
        }
    }

    pub fn get(&self, id: &str) -> Commit {
        self.commits[id].clone()
    }

    fn ancestors(&self, id: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([id.to_string()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&current) {
                queue.extend(commit.parents.iter().cloned());
            }
        }
        seen
    }
}

impl CommitGraph for MemoryGraph {
    fn commit(&self, id: &str) -> Result<Commit> {
        self.commits
            .get(id)
            .cloned()
            .ok_or_else(|| GraphError::CommitNotFound(id.to_string()))
    }

    fn lowest_common_ancestor(&self, a: &str, b: &str) -> Result<Option<String>> {
        let left = self.ancestors(a);
        let right = self.ancestors(b);
        let common: Vec<&String> = left.intersection(&right).collect();

        let lowest: Vec<&String> = common
            .iter()
            .copied()
            .filter(|candidate| {
                !common
                    .iter()
                    .any(|other| other != candidate && self.ancestors(other).contains(*candidate))
            })
            .collect();

        Ok(match lowest.as_slice() {
            [single] => Some((*single).clone()),
            _ => None,
        })
    }
}
