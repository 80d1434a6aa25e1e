pub mod import;
pub mod reporter;
pub mod sqlite;
