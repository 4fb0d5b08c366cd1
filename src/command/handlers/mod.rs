pub mod cleans;

pub use cleans::{CleanPartitionRow, CleanRow, clean_partitions, list_cleans};
