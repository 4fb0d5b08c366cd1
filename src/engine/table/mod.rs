pub mod context;

pub use context::{PARTITION_META_FILE, TableContext};
