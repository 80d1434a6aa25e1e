pub mod filter_service;
pub mod grid_service;
pub mod import_service;
