use std::sync::Arc;

use dioxus::prelude::*;

use crate::platform::desktop::blocking::run_blocking;
use crate::usecase::ports::filter_cache::FilterCache;
use crate::usecase::ports::records::RecordSource;
use crate::usecase::ports::reporter::ErrorReporter;
use crate::usecase::services::grid_service::{GridSession, PendingPage, PendingReload};

pub mod cell;
pub mod head_cell;
pub mod loading;
pub mod no_data;
pub mod row_select;
pub mod table;

/// Collaborators shared by the grid components through context.
#[derive(Clone)]
pub struct GridServices {
    pub source: Arc<dyn RecordSource>,
    pub cache: Arc<dyn FilterCache>,
    pub reporter: Arc<dyn ErrorReporter>,
}

pub fn spawn_reload(mut session: Signal<GridSession>, services: GridServices, pending: PendingReload) {
    spawn(async move {
        let result = run_blocking("reload", || services.source.fetch_records(&pending.query));
        session.write().finish_reload(
            pending.ticket,
            result,
            services.cache.as_ref(),
            services.reporter.as_ref(),
        );
    });
}

pub fn spawn_next_page(mut session: Signal<GridSession>, services: GridServices, pending: PendingPage) {
    spawn(async move {
        let result = run_blocking("next page", || services.source.fetch_next(&pending.query));
        session
            .write()
            .finish_lazy(pending.ticket, result, services.reporter.as_ref());
    });
}

pub fn width_style(width: f64) -> String {
    format!("width: {width}px; min-width: {width}px; box-sizing: border-box;")
}
