pub mod app_state;
pub mod store;
pub mod view;
