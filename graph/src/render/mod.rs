pub mod color;
pub mod summary;
pub mod tree;

pub use color::Color;
pub use summary::{author_handle, relative_date, trailer_value, NodeSummary, SummaryFormatter, DEFAULT_TRAILER};
pub use tree::{glyphs, TreeRenderer, DEFAULT_MAX_CHAIN};
