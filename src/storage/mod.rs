pub mod fact_store;
pub mod seed;

pub use fact_store::FactStore;
