use serde_json::Value;

use crate::config::{GridConfig, TableConfig};
use crate::domain::entities::record::{PageResult, RowRecord};
use crate::domain::entities::sort::OrderBy;
use crate::domain::layout::ScrollMetrics;
use crate::domain::selection::{RowLock, RowSelection, SelectIndicator};
use crate::domain::sort_cycle::{SortCycle, SortIcon};
use crate::ui::state::store::{GridStore, StoreAction};
use crate::usecase::ports::errors::FetchError;
use crate::usecase::ports::filter_cache::FilterCache;
use crate::usecase::ports::records::{NextPageQuery, RecordQuery, RecordSource};
use crate::usecase::ports::reporter::ErrorReporter;
use crate::usecase::services::filter_service::{merge_recent_filters, sanitize_filter};

pub const DEFAULT_ERROR_MSG: &str = "Something went wrong. Please try again.";

/// Identifies the dataset a fetch was issued for. Every reload starts a new
/// dataset; results carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PendingReload {
    pub ticket: FetchTicket,
    pub query: RecordQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPage {
    pub ticket: FetchTicket,
    pub query: NextPageQuery,
}

/// What the grid body shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyView {
    Loading,
    NoData,
    Rows,
}

/// The grid orchestrator: owns the store, the loading flags, the selection
/// and one sort cycle per column.
#[derive(Debug, Clone)]
pub struct GridSession {
    table: TableConfig,
    store: GridStore,
    sort_cycles: Vec<SortCycle>,
    selection: RowSelection,
    records: PageResult,
    epoch: u64,
    loading: bool,
    lazy_loading: bool,
    fetching_lazy: bool,
}

impl GridSession {
    pub fn new(table: TableConfig) -> Self {
        let sort_cycles = table.columns.iter().map(SortCycle::for_column).collect();
        Self {
            table,
            store: GridStore::default(),
            sort_cycles,
            selection: RowSelection::default(),
            records: PageResult::default(),
            epoch: 0,
            loading: true,
            lazy_loading: false,
            fetching_lazy: false,
        }
    }

    pub fn table(&self) -> &TableConfig {
        &self.table
    }

    pub fn store(&self) -> &GridStore {
        &self.store
    }

    pub fn selection(&self) -> &RowSelection {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_lazy_loading(&self) -> bool {
        self.lazy_loading
    }

    pub fn is_fetching_lazy(&self) -> bool {
        self.fetching_lazy
    }

    pub fn items(&self) -> &[RowRecord] {
        &self.store.data.items
    }

    pub fn has_data(&self) -> bool {
        self.store.data.has_data()
    }

    pub fn body_view(&self) -> BodyView {
        if self.loading {
            BodyView::Loading
        } else if self.has_data() {
            BodyView::Rows
        } else {
            BodyView::NoData
        }
    }

    pub fn show_lazy_loader(&self) -> bool {
        self.has_data() && self.lazy_loading
    }

    pub fn sort_icon(&self, column_idx: usize) -> SortIcon {
        self.sort_cycles
            .get(column_idx)
            .map(SortCycle::icon)
            .unwrap_or_default()
    }

    pub fn error_message(&self) -> String {
        if self.store.error_msg.trim().is_empty() {
            DEFAULT_ERROR_MSG.to_string()
        } else {
            self.store.error_msg.clone()
        }
    }

    fn dispatch(&mut self, action: StoreAction) {
        let reset = matches!(action, StoreAction::ResetData);
        self.store.dispatch(action);
        if reset {
            self.records = PageResult::default();
        }
        self.sync_records();
    }

    /// Keeps the dataset used for continuation lookups in step with the
    /// store, skipping the copy when nothing changed.
    fn sync_records(&mut self) {
        if self.store.data.has_data() && self.records != self.store.data {
            self.records = self.store.data.clone();
        }
    }

    /// One-time initialisation: store config, resolve default filters and
    /// load the first page.
    pub fn initial_setup(
        &mut self,
        config: &GridConfig,
        source: &dyn RecordSource,
        cache: &dyn FilterCache,
        reporter: &dyn ErrorReporter,
    ) {
        self.loading = true;
        let default_error_msg = config
            .filter
            .as_ref()
            .and_then(|filter| filter.error_message.default_error_msg.clone())
            .unwrap_or_default();
        let fields = config
            .filter
            .as_ref()
            .map(|filter| filter.filter_fields.clone())
            .unwrap_or_default();

        self.dispatch(StoreAction::SetUiConfig(config.dashboard.clone()));
        self.dispatch(StoreAction::SetFilters(fields.clone()));
        self.dispatch(StoreAction::SetErrorMessage(default_error_msg));

        let Some(filter_urls) = config
            .filter
            .as_ref()
            .and_then(|filter| filter.filter_urls.clone())
        else {
            log::info!("no filter urls configured, grid starts empty");
            self.loading = false;
            return;
        };

        self.dispatch(StoreAction::SetFilterUrl(filter_urls.clone()));

        let dashboard_type = config.dashboard.dashboard_type();
        let defaults = match cache.most_recent_filters(&dashboard_type) {
            Ok(recent) => merge_recent_filters(&fields, &recent),
            Err(err) => {
                log::warn!("recent filters unavailable for {dashboard_type}: {err}");
                None
            }
        };
        let active = match defaults {
            Some(defaults) => {
                log::debug!("restoring {} recent filters for {dashboard_type}", defaults.len());
                self.dispatch(StoreAction::SetFilters(defaults.clone()));
                defaults
            }
            None => fields,
        };

        let query = RecordQuery {
            url: filter_urls.initial_load_url.clone(),
            filter: sanitize_filter(&active),
            error_message: self.error_message(),
            page_size: filter_urls.initial_load_limit,
            order_by: None,
        };
        log::info!("loading first page from {}", query.url);
        match source.fetch_records(&query) {
            Ok(page) => {
                log::info!("first page loaded: {} records", page.items.len());
                self.dispatch(StoreAction::SetData(page));
            }
            Err(err) => {
                log::error!("initial fetch failed: {err}");
                reporter.report(&err);
                self.dispatch(StoreAction::ResetData);
            }
        }
        self.loading = false;
    }

    /// Starts a filtered/sorted reload: the selection and dataset are cleared
    /// before the request is handed out.
    pub fn begin_reload(&mut self) -> Option<PendingReload> {
        let filter_url = self.store.filter_url.clone()?;

        self.epoch += 1;
        self.loading = true;
        self.selection.clear();
        self.dispatch(StoreAction::ResetData);

        let query = RecordQuery {
            url: filter_url.initial_load_url,
            filter: sanitize_filter(&self.store.filters),
            error_message: self.error_message(),
            page_size: filter_url.initial_load_limit,
            order_by: self.store.order_by.clone(),
        };
        log::debug!(
            "reload #{} with {} filters, order by {:?}",
            self.epoch,
            query.filter.len(),
            query.order_by
        );
        Some(PendingReload {
            ticket: FetchTicket(self.epoch),
            query,
        })
    }

    pub fn finish_reload(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResult, FetchError>,
        cache: &dyn FilterCache,
        reporter: &dyn ErrorReporter,
    ) {
        if ticket != FetchTicket(self.epoch) {
            log::debug!("dropping superseded reload result #{}", ticket.0);
            return;
        }

        match result {
            Ok(page) => {
                log::info!("reload #{} loaded {} records", ticket.0, page.items.len());
                self.dispatch(StoreAction::SetData(page));
                let dashboard_type = self.store.ui.dashboard_type();
                let stored = cache
                    .clear_recent_state(&dashboard_type)
                    .and_then(|_| cache.store_filter_state(&dashboard_type, &self.store.filters));
                if let Err(err) = stored {
                    log::warn!("failed to remember filters for {dashboard_type}: {err}");
                }
            }
            Err(err) => {
                log::error!("reload #{} failed: {err}", ticket.0);
                reporter.report(&err);
                self.dispatch(StoreAction::ResetData);
            }
        }
        self.loading = false;
    }

    pub fn reload(
        &mut self,
        source: &dyn RecordSource,
        cache: &dyn FilterCache,
        reporter: &dyn ErrorReporter,
    ) {
        if let Some(pending) = self.begin_reload() {
            let result = source.fetch_records(&pending.query);
            self.finish_reload(pending.ticket, result, cache, reporter);
        }
    }

    /// Records a new filter value and starts the reload it triggers.
    pub fn change_filter(
        &mut self,
        field_name: impl Into<String>,
        value: Value,
    ) -> Option<PendingReload> {
        self.dispatch(StoreAction::SetFilterValue {
            field_name: field_name.into(),
            value,
        });
        self.begin_reload()
    }

    /// Header click. Returns the reload to run when the sort state changed.
    pub fn click_header(&mut self, column_idx: usize) -> Option<PendingReload> {
        let busy = self.loading || self.lazy_loading;
        let order_by = self.sort_cycles.get_mut(column_idx)?.click(busy)?;
        self.apply_order_by(order_by)
    }

    /// Applies a sort state coming from the store side and lets every column
    /// reconcile against it.
    pub fn apply_order_by(&mut self, order_by: Option<OrderBy>) -> Option<PendingReload> {
        let previous = self.store.order_by.clone();
        self.dispatch(StoreAction::SetOrderBy(order_by));
        let current = self.store.order_by.clone();
        if previous == current {
            return None;
        }

        log::debug!("sort changed from {previous:?} to {current:?}");
        let mut reload = false;
        for cycle in &mut self.sort_cycles {
            let wants_reload = cycle.observe(previous.as_ref(), current.as_ref());
            reload = reload || wants_reload;
        }
        if reload {
            self.begin_reload()
        } else {
            None
        }
    }

    /// Scroll event of the body. Returns the next-page request when the
    /// bottom was reached, more data exists and no lazy fetch is in flight.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<PendingPage> {
        if !metrics.reached_bottom() {
            return None;
        }
        if self.fetching_lazy {
            log::debug!("lazy fetch in flight, scroll event dropped");
            return None;
        }

        let href = self.records.next_link()?.to_string();
        let page_size = self.store.filter_url.as_ref()?.pagination_size;

        self.fetching_lazy = true;
        self.lazy_loading = true;
        log::debug!("fetching next page: {href}");
        Some(PendingPage {
            ticket: FetchTicket(self.epoch),
            query: NextPageQuery {
                href,
                error_message: self.error_message(),
                page_size,
            },
        })
    }

    pub fn finish_lazy(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResult, FetchError>,
        reporter: &dyn ErrorReporter,
    ) {
        match result {
            Ok(_) if ticket != FetchTicket(self.epoch) => {
                log::debug!("dropping next page fetched for a replaced dataset");
            }
            Ok(page) => {
                log::info!("appending {} records", page.items.len());
                self.dispatch(StoreAction::AppendData(page));
            }
            Err(err) => {
                log::error!("next page fetch failed: {err}");
                reporter.report(&err);
            }
        }
        self.lazy_loading = false;
        self.fetching_lazy = false;
    }

    pub fn lazy_load(
        &mut self,
        metrics: ScrollMetrics,
        source: &dyn RecordSource,
        reporter: &dyn ErrorReporter,
    ) {
        if let Some(pending) = self.on_scroll(metrics) {
            let result = source.fetch_next(&pending.query);
            self.finish_lazy(pending.ticket, result, reporter);
        }
    }

    pub fn row_lock(&self, row_idx: usize) -> RowLock {
        match (self.table.selection(), self.items().get(row_idx)) {
            (Some(config), Some(record)) => config.lock_for(record),
            _ => RowLock::Open,
        }
    }

    pub fn select_indicator(&self, row_idx: usize) -> SelectIndicator {
        SelectIndicator::new(self.selection.contains(row_idx), self.row_lock(row_idx))
    }

    /// Toggles a row. No-op when selection is off, the row does not exist,
    /// or the row is approved/declined.
    pub fn toggle_row(&mut self, row_idx: usize) -> bool {
        if self.table.selection().is_none() || row_idx >= self.items().len() {
            return false;
        }
        let lock = self.row_lock(row_idx);
        self.selection.toggle(row_idx, lock)
    }
}
