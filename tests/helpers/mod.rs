pub mod factories;

pub use factories::TableFactory;
