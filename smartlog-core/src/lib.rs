pub mod repository;
pub mod config;
pub mod collect;

pub use repository::{BranchRefs, Repository};
pub use config::{Config, RemoteConfig, CONFIG_FILE};
pub use collect::{collect, CollectOptions, Notice, Smartlog};
