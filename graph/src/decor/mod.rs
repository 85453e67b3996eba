pub mod refs;

pub use refs::{Head, RefDescriptor, RefMap};
