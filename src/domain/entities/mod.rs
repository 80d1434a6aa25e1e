pub mod column;
pub mod filter;
pub mod record;
pub mod sort;
