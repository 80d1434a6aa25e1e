pub mod demo;
pub mod filter_cache;
pub mod queries;
pub mod record_store;
pub mod schema;
