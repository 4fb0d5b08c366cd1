pub mod table_factory;

pub use table_factory::TableFactory;
