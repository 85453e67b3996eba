use anyhow::{Context, Result};
use git2::{BranchType, ErrorCode, Reference, Repository as Git2Repository};
use graph::{GitWalker, Head, RefDescriptor};
use std::path::Path;

pub struct Repository {
    git_repo: Git2Repository,
}

/// A local branch together with the remote branch it tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRefs {
    pub local: RefDescriptor,
    pub upstream: Option<RefDescriptor>,
}

impl Repository {
    /// Open the repository containing `path`, searching parent directories
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let git_repo = Git2Repository::discover(path)
            .with_context(|| format!("Could not find a git repository at {}", path.display()))?;

        Ok(Repository { git_repo })
    }

    /// The `.git` directory
    pub fn git_dir(&self) -> &Path {
        self.git_repo.path()
    }

    /// Commit ancestry provider for this repository
    pub fn walker(&self) -> GitWalker<'_> {
        GitWalker::new(&self.git_repo)
    }

    pub fn head(&self) -> Result<Head> {
        let head = self.git_repo.head().context("Failed to resolve HEAD")?;
        let commit = head.peel_to_commit()?.id().to_string();

        if self.git_repo.head_detached()? {
            return Ok(Head::detached(commit));
        }
        match head.name() {
            Some(name) => Ok(Head::attached(name, commit)),
            None => Ok(Head::detached(commit)),
        }
    }

    /// All local branches, each with its upstream if one resolves
    pub fn local_branches(&self) -> Result<Vec<BranchRefs>> {
        let mut branches = Vec::new();

        for branch in self.git_repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let Some(local) = describe(branch.get())? else {
                continue;
            };

            let upstream = match branch.upstream() {
                Ok(upstream) => describe(upstream.get())?,
                Err(_) => None,
            };

            branches.push(BranchRefs { local, upstream });
        }

        Ok(branches)
    }

    /// Resolve a short ref name such as `origin/main` or `origin/HEAD`
    pub fn find_ref(&self, name: &str) -> Result<Option<RefDescriptor>> {
        match self.git_repo.resolve_reference_from_short_name(name) {
            Ok(reference) => describe(&reference),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to resolve {}", name)),
        }
    }
}

/// Describe a reference by name and the commit it peels to
fn describe(reference: &Reference) -> Result<Option<RefDescriptor>> {
    let Some(full_name) = reference.name() else {
        return Ok(None);
    };
    let commit = reference
        .peel_to_commit()
        .with_context(|| format!("{} does not point at a commit", full_name))?;
    let name = reference.shorthand().unwrap_or(full_name);

    Ok(Some(RefDescriptor::new(name, full_name, commit.id().to_string())))
}
