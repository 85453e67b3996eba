use crate::core::{Commit, CommitGraph};
use crate::error::{GraphError, Result};
use chrono::{TimeZone, Utc};
use git2::{ErrorCode, Oid, Repository};

/// Commit ancestry backed by a git repository
pub struct GitWalker<'repo> {
    repo: &'repo Repository,
}

impl<'repo> GitWalker<'repo> {
    pub fn new(repo: &'repo Repository) -> Self {
        Self { repo }
    }

    fn parse_oid(id: &str) -> Result<Oid> {
        Oid::from_str(id).map_err(|_| GraphError::CommitNotFound(id.to_string()))
    }

    /// Convert a git2::Commit to Commit
    fn convert(commit: &git2::Commit) -> Result<Commit> {
        let id = commit.id().to_string();
        let parents: Vec<String> = commit.parent_ids().map(|oid| oid.to_string()).collect();

        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .ok_or_else(|| GraphError::InvalidTimestamp(id.clone()))?;

        let author = commit.author();
        let name = author.name().unwrap_or("Unknown").to_string();
        let email = author.email().unwrap_or("").to_string();

        let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();

        Ok(Commit::new(id, parents, timestamp, name, email, message))
    }
}

impl CommitGraph for GitWalker<'_> {
    fn commit(&self, id: &str) -> Result<Commit> {
        let oid = Self::parse_oid(id)?;
        let commit = self.repo.find_commit(oid).map_err(|err| match err.code() {
            ErrorCode::NotFound => GraphError::CommitNotFound(id.to_string()),
            _ => GraphError::Git(err),
        })?;
        Self::convert(&commit)
    }

    fn lowest_common_ancestor(&self, a: &str, b: &str) -> Result<Option<String>> {
        let one = Self::parse_oid(a)?;
        let two = Self::parse_oid(b)?;

        match self.repo.merge_bases(one, two) {
            // Criss-cross histories have no single best base
            Ok(bases) if bases.len() == 1 => Ok(Some(bases[0].to_string())),
            Ok(_) => Ok(None),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
