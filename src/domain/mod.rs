pub mod entities;
pub mod format;
pub mod layout;
pub mod selection;
pub mod sort_cycle;
