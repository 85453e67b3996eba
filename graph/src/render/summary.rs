use super::color::Color;
use crate::core::Commit;
use crate::decor::RefMap;
use chrono::{DateTime, Utc};

/// Trailer label whose value is shown next to the author
pub const DEFAULT_TRAILER: &str = "Differential Revision:";

const SECONDS_PER_DAY: i64 = 24 * 3600;
const INVALID_TIME: &str = "<Invalid time>";

/// Produces the text block printed next to a node's bullet
pub trait SummaryFormatter {
    /// Lines describing `commit`; the root node passes `None`
    fn summary(&self, commit: Option<&Commit>) -> Vec<String>;
}

/// Default node summary:
/// - line 1: short sha, author, trailer tag, ref names, relative time
/// - line 2: commit subject
pub struct NodeSummary<'a> {
    refs: &'a RefMap,
    now: DateTime<Utc>,
    trailer: String,
    colored: bool,
}

impl<'a> NodeSummary<'a> {
    pub fn new(refs: &'a RefMap) -> Self {
        Self {
            refs,
            now: Utc::now(),
            trailer: DEFAULT_TRAILER.to_string(),
            colored: true,
        }
    }

    /// Reference point for relative dates
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_trailer(mut self, label: impl Into<String>) -> Self {
        self.trailer = label.into();
        self
    }

    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if self.colored {
            color.paint(text)
        } else {
            text.to_string()
        }
    }
}

impl SummaryFormatter for NodeSummary<'_> {
    fn summary(&self, commit: Option<&Commit>) -> Vec<String> {
        let Some(commit) = commit else {
            return Vec::new();
        };

        let mut parts = Vec::new();

        let is_head = self.refs.head().commit == commit.id;
        let sha_color = if is_head { Color::Magenta } else { Color::Yellow };
        parts.push(self.paint(sha_color, commit.short_id()));

        parts.push(author_handle(&commit.email).to_string());

        if let Some(tag) = trailer_value(&commit.message, &self.trailer) {
            parts.push(self.paint(Color::Blue, &tag));
        }

        let names = self.refs.names_for(&commit.id);
        if !names.is_empty() {
            let joined = names.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
            parts.push(self.paint(Color::Green, &format!("({})", joined)));
        }

        parts.push(relative_date(Some(commit.timestamp), self.now));

        vec![parts.join("  "), commit.summary().to_string()]
    }
}

/// Local part of an email address
pub fn author_handle(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Last path segment of the first message line starting with `label`
pub fn trailer_value(message: &str, label: &str) -> Option<String> {
    if label.is_empty() {
        return None;
    }
    message
        .lines()
        .find_map(|line| line.strip_prefix(label))
        .map(|value| {
            let value = value.trim();
            value.rsplit('/').next().unwrap_or(value).to_string()
        })
}

/// Human friendly age of `timestamp` relative to `now`
pub fn relative_date(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(then) = timestamp else {
        return "Now".to_string();
    };

    let elapsed = (now - then).num_seconds();
    let day_diff = elapsed.div_euclid(SECONDS_PER_DAY);
    let second_diff = elapsed.rem_euclid(SECONDS_PER_DAY);

    if day_diff < 0 {
        return INVALID_TIME.to_string();
    }

    if day_diff == 0 {
        return match second_diff {
            0..=9 => "just now".to_string(),
            10..=59 => format!("{} seconds ago", second_diff),
            60..=119 => "a minute ago".to_string(),
            120..=3599 => format!("{} minutes ago", rounded(second_diff, 60)),
            3600..=7199 => "an hour ago".to_string(),
            _ => format!("{} hours ago", rounded(second_diff, 3600)),
        };
    }

    match day_diff {
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", day_diff),
        7..=30 => format!("{} weeks ago", rounded(day_diff, 7)),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}

/// Halves round to the even neighbour
fn rounded(value: i64, unit: i64) -> i64 {
    (value as f64 / unit as f64).round_ties_even() as i64
}
