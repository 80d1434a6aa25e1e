pub mod errors;
pub mod filter_cache;
pub mod records;
pub mod reporter;
