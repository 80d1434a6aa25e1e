use dioxus::prelude::{use_signal, Signal};

use crate::config::TableConfig;
use crate::usecase::services::grid_service::GridSession;

pub struct AppState {
    pub session: Signal<GridSession>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(table: TableConfig) -> Self {
        Self {
            session: use_signal(move || GridSession::new(table)),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}
