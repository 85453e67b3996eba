use crate::config::{Config, CONFIG_FILE};
use crate::repository::Repository;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use graph::{
    AddOutcome, CommitGraph, Head, NodeSummary, RefMap, Tree, TreeBuilder, TreeRenderer,
};
use thiserror::Error;
use tracing::debug;

/// Knobs coming from the command line
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Ignore the age limit
    pub all: bool,
    /// Overrides `remote.head` from the config file
    pub mainline: Option<String>,
}

/// Something the user should know about that did not stop the run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Notice {
    #[error("Warning: Unable to process commit that is not connected to mainline: {commit}")]
    Disconnected { commit: String },

    #[error("Unable to find {name} ref. Check configuration in .git/{file} file")]
    MissingRef { name: String, file: &'static str },
}

/// Everything needed to print a smartlog
#[derive(Debug)]
pub struct Smartlog {
    pub tree: Tree,
    pub refs: RefMap,
    pub head: Head,
    /// Branch tips hidden by the age limit
    pub skipped: usize,
    pub notices: Vec<Notice>,
}

impl Smartlog {
    pub fn render(&self, config: &Config, colored: bool, now: DateTime<Utc>) -> Vec<String> {
        let formatter = NodeSummary::new(&self.refs)
            .with_now(now)
            .with_trailer(config.trailer.clone())
            .colored(colored);

        TreeRenderer::new(&formatter, Some(self.head.commit.clone()))
            .with_max_chain(config.max_chain)
            .render(&self.tree)
    }
}

/// Gather HEAD, local branches, their upstreams and any extra refs into a
/// sparse tree anchored at the mainline ref.
pub fn collect(
    repo: &Repository,
    config: &Config,
    options: &CollectOptions,
    now: DateTime<Utc>,
) -> Result<Smartlog> {
    let head = repo.head()?;
    let mut refs = RefMap::new(head.clone());

    let mainline_name = options.mainline.as_deref().unwrap_or(&config.remote.head);
    let mainline_ref = repo
        .find_ref(mainline_name)?
        .ok_or_else(|| anyhow!("Unable to find {} branch", mainline_name))?;
    refs.add(&mainline_ref);

    let walker = repo.walker();
    let mainline = walker
        .commit(&mainline_ref.target)
        .with_context(|| format!("Failed to load mainline commit {}", mainline_ref.target))?;

    let date_limit = if options.all {
        None
    } else {
        config.date_limit(now)
    };

    let mut builder = TreeBuilder::new(&walker, mainline, date_limit);
    let mut notices = Vec::new();

    add_commit(&mut builder, &head.commit, true, &mut notices)?;

    for branch in repo.local_branches()? {
        debug!(branch = %branch.local.name, "adding local branch");
        add_commit(&mut builder, &branch.local.target, false, &mut notices)?;
        refs.add(&branch.local);

        if let Some(upstream) = &branch.upstream {
            debug!(branch = %upstream.name, "adding remote tracking branch");
            if upstream.target != branch.local.target {
                add_commit(&mut builder, &upstream.target, false, &mut notices)?;
            }
            refs.add(upstream);
        }
    }

    for name in &config.extra_refs {
        match repo.find_ref(name)? {
            Some(reference) => {
                refs.add(&reference);
                add_commit(&mut builder, &reference.target, false, &mut notices)?;
            }
            None => notices.push(Notice::MissingRef {
                name: name.clone(),
                file: CONFIG_FILE,
            }),
        }
    }

    let skipped = builder.skipped_count();
    Ok(Smartlog {
        tree: builder.into_tree(),
        refs,
        head,
        skipped,
        notices,
    })
}

fn add_commit<G: CommitGraph>(
    builder: &mut TreeBuilder<'_, G>,
    id: &str,
    ignore_date_limit: bool,
    notices: &mut Vec<Notice>,
) -> Result<()> {
    let outcome = builder
        .add_id(id, ignore_date_limit)
        .with_context(|| format!("Failed to add commit {}", id))?;
    if outcome == AddOutcome::Disconnected {
        notices.push(Notice::Disconnected {
            commit: id.to_string(),
        });
    }
    Ok(())
}
