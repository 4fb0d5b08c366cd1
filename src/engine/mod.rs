pub mod clean;
pub mod errors;
pub mod inventory;
pub mod table;
pub mod timeline;
