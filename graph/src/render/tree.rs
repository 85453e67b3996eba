use super::summary::SummaryFormatter;
use crate::core::{NodeId, Tree};
use std::collections::VecDeque;

/// Glyphs making up the printed tree
pub mod glyphs {
    pub const HEAD: char = '*';
    pub const COMMIT: char = 'o';
    pub const DIRECT: char = '|';
    pub const GAP: char = ':';
    pub const JOIN: char = '/';
    pub const FOLD: char = '╷';
    pub const ELLIPSIS: &str = "...";
}

/// Node blocks kept from one uninterrupted linear run
pub const DEFAULT_MAX_CHAIN: usize = 20;

const MIN_SUMMARY_LINES: usize = 2;

/// Prints a sparse tree, newest commits first, one block per node
pub struct TreeRenderer<'a, F: SummaryFormatter> {
    formatter: &'a F,
    head: Option<String>,
    max_chain: usize,
}

impl<'a, F: SummaryFormatter> TreeRenderer<'a, F> {
    pub fn new(formatter: &'a F, head: Option<String>) -> Self {
        Self {
            formatter,
            head,
            max_chain: DEFAULT_MAX_CHAIN,
        }
    }

    /// Fold threshold; values below 2 are raised to 2
    pub fn with_max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain.max(2);
        self
    }

    pub fn render(&self, tree: &Tree) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_node(tree, tree.root(), "", &mut lines);
        lines
    }

    /// Mainline nodes first, the rest oldest first
    fn sorted_children(&self, tree: &Tree, node: NodeId) -> Vec<NodeId> {
        let mut children = tree.children(node).to_vec();
        children.sort_by_key(|&child| {
            let node = tree.node(child);
            if node.is_on_mainline() {
                (false, 0)
            } else {
                (true, node.commit().map_or(0, |c| c.timestamp.timestamp()))
            }
        });
        children
    }

    /// Follow a run of single-child nodes starting at `node`. Returns the
    /// node whose subtree should be printed before `node` itself: `node`
    /// when the run is short, otherwise the last node hidden by the fold.
    fn fold(&self, tree: &Tree, node: NodeId) -> NodeId {
        let keep = self.max_chain - 1;
        let mut run = VecDeque::with_capacity(keep + 1);
        let mut current = node;
        loop {
            let children = tree.children(current);
            if children.len() != 1 {
                break;
            }
            run.push_back(current);
            if run.len() > keep {
                run.pop_front();
            }
            current = children[0];
        }
        run.front().copied().unwrap_or(current)
    }

    fn is_head(&self, tree: &Tree, node: NodeId) -> bool {
        match (tree.node(node).commit(), &self.head) {
            (Some(commit), Some(head)) => &commit.id == head,
            _ => false,
        }
    }

    fn render_node(&self, tree: &Tree, node: NodeId, prefix: &str, lines: &mut Vec<String>) {
        let children = self.sorted_children(tree, node);
        let mut column = String::new();

        for (i, &child) in children.iter().enumerate() {
            let first = i == 0;
            let indent = if first { "" } else { " " };

            let folded = self.fold(tree, child);
            self.render_node(tree, folded, &format!("{}{}{}", prefix, column, indent), lines);
            if folded != child {
                push(lines, format!("{}{} {}", prefix, glyphs::FOLD, glyphs::ELLIPSIS));
                push(lines, format!("{}{}", prefix, glyphs::FOLD));
            }

            let mut summary = self.formatter.summary(tree.node(child).commit());
            if summary.len() < MIN_SUMMARY_LINES {
                summary.resize(MIN_SUMMARY_LINES, String::new());
            }

            let bullet = if self.is_head(tree, child) {
                glyphs::HEAD
            } else {
                glyphs::COMMIT
            };
            push(lines, format!("{}{}{}{}  {}", prefix, column, indent, bullet, summary[0]));

            let connector = if tree.is_direct_child(child) {
                glyphs::DIRECT
            } else {
                glyphs::GAP
            };

            // Later siblings join the first sibling's column diagonally
            if first {
                column = connector.to_string();
                push(lines, format!("{}{}  {}", prefix, column, summary[1]));
            } else {
                push(lines, format!("{}{}{}   {}", prefix, column, glyphs::JOIN, summary[1]));
                column = connector.to_string();
            }

            let body = if first {
                column.clone()
            } else {
                format!("{}  ", connector)
            };
            for line in &summary[MIN_SUMMARY_LINES..] {
                push(lines, format!("{}{}  {}", prefix, body, line));
            }

            push(lines, format!("{}{}", prefix, column));
        }
    }
}

fn push(lines: &mut Vec<String>, line: String) {
    lines.push(line.trim_end().to_string());
}
