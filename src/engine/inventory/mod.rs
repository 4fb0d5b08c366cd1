pub mod builder;
pub mod file_group;

pub use builder::{Inventory, build_inventory};
pub use file_group::{FileGroup, FileSlice};
