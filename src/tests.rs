use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::config::{
    DashboardUiConfig, ErrorMessages, FilterConfig, FilterUrlConfig, GridConfig, TableConfig,
};
use crate::domain::entities::column::{ColumnDescriptor, TextFormat, ValueType};
use crate::domain::entities::filter::FilterField;
use crate::domain::entities::record::{Link, PageResult, RowRecord};
use crate::domain::entities::sort::{OrderBy, SortDirection};
use crate::domain::format::{format_value, format_value_at, DASH};
use crate::domain::layout::{column_width, ScrollMetrics};
use crate::domain::selection::{RowLock, SelectableConfig};
use crate::domain::sort_cycle::{SortCycle, SortIcon};
use crate::infra::reporter::LogReporter;
use crate::infra::sqlite::demo::ensure_demo_dataset;
use crate::infra::sqlite::filter_cache::SqliteFilterCache;
use crate::infra::sqlite::queries::create_dataset_from_rows;
use crate::infra::sqlite::record_store::{RecordCursor, SqliteRecordStore};
use crate::infra::sqlite::schema::init_db;
use crate::ui::components::cell::copy_script;
use crate::ui::state::store::{GridStore, StoreAction};
use crate::ui::state::view::{header_views, row_views, CellView};
use crate::usecase::ports::errors::{CacheError, FetchError};
use crate::usecase::ports::filter_cache::FilterCache;
use crate::usecase::ports::records::{NextPageQuery, RecordQuery, RecordSource};
use crate::usecase::ports::reporter::ErrorReporter;
use crate::usecase::services::filter_service::{merge_recent_filters, sanitize_filter};
use crate::usecase::services::grid_service::{BodyView, GridSession, DEFAULT_ERROR_MSG};
use crate::usecase::services::import_service::ImportService;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("lazygrid-{prefix}-{nanos}"))
}

#[derive(Default)]
struct FakeSource {
    first_page: PageResult,
    next_page: PageResult,
    failure: Option<FetchError>,
    record_queries: Mutex<Vec<RecordQuery>>,
    next_queries: Mutex<Vec<NextPageQuery>>,
}

impl FakeSource {
    fn serving(first_page: PageResult) -> Self {
        Self {
            first_page,
            ..Self::default()
        }
    }

    fn record_calls(&self) -> Vec<RecordQuery> {
        self.record_queries.lock().expect("lock should succeed").clone()
    }

    fn next_calls(&self) -> Vec<NextPageQuery> {
        self.next_queries.lock().expect("lock should succeed").clone()
    }
}

impl RecordSource for FakeSource {
    fn fetch_records(&self, query: &RecordQuery) -> Result<PageResult, FetchError> {
        self.record_queries
            .lock()
            .expect("lock should succeed")
            .push(query.clone());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.first_page.clone()),
        }
    }

    fn fetch_next(&self, query: &NextPageQuery) -> Result<PageResult, FetchError> {
        self.next_queries
            .lock()
            .expect("lock should succeed")
            .push(query.clone());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.next_page.clone()),
        }
    }
}

#[derive(Default)]
struct MemoryCache {
    entries: Mutex<BTreeMap<String, Vec<FilterField>>>,
    clears: Mutex<usize>,
}

impl MemoryCache {
    fn stored(&self, dashboard_type: &str) -> Option<Vec<FilterField>> {
        self.entries
            .lock()
            .expect("lock should succeed")
            .get(dashboard_type)
            .cloned()
    }
}

impl FilterCache for MemoryCache {
    fn most_recent_filters(&self, dashboard_type: &str) -> Result<Vec<FilterField>, CacheError> {
        Ok(self.stored(dashboard_type).unwrap_or_default())
    }

    fn clear_recent_state(&self, dashboard_type: &str) -> Result<(), CacheError> {
        *self.clears.lock().expect("lock should succeed") += 1;
        self.entries
            .lock()
            .expect("lock should succeed")
            .remove(dashboard_type);
        Ok(())
    }

    fn store_filter_state(
        &self,
        dashboard_type: &str,
        filters: &[FilterField],
    ) -> Result<(), CacheError> {
        self.entries
            .lock()
            .expect("lock should succeed")
            .insert(dashboard_type.to_string(), filters.to_vec());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingReporter {
    reported: Mutex<Vec<FetchError>>,
}

impl RecordingReporter {
    fn count(&self) -> usize {
        self.reported.lock().expect("lock should succeed").len()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &FetchError) {
        self.reported
            .lock()
            .expect("lock should succeed")
            .push(error.clone());
    }
}

const BOTTOM: ScrollMetrics = ScrollMetrics {
    scroll_top: 399.4,
    client_height: 100.0,
    scroll_height: 500.0,
};

fn status_for(id: usize) -> &'static str {
    match id {
        1 => "approved",
        2 => "declined",
        _ => "pending",
    }
}

fn page(ids: std::ops::Range<usize>, has_more: bool) -> PageResult {
    let end = ids.end;
    let items = ids
        .map(|id| {
            RowRecord::new(id.to_string())
                .with("col_1", format!("name {id}"))
                .with("amount", format!("{}", id * 100))
                .with("status", status_for(id))
        })
        .collect();
    let links = if has_more {
        vec![Link::next(format!("lazygrid://records?dataset=test&offset={end}"))]
    } else {
        Vec::new()
    };
    PageResult {
        items,
        links,
        has_more,
    }
}

fn test_config() -> GridConfig {
    let mut amount = ColumnDescriptor::new("Amount", "amount", 20.0);
    amount.value_type = ValueType::Currency;
    let mut phone = ColumnDescriptor::new("Phone", "phone", 20.0);
    phone.value_type = ValueType::Phone;
    phone.sortable = false;

    GridConfig {
        table: TableConfig {
            min_width: 1000.0,
            columns: vec![ColumnDescriptor::new("Name", "col_1", 50.0), amount, phone],
            selectable: true,
            selectable_config: Some(SelectableConfig {
                data_column: "status".to_string(),
                approve_cases: vec![json!("approved")],
                decline_cases: vec![json!("declined")],
                width: 5.0,
            }),
        },
        filter: Some(FilterConfig {
            filter_fields: vec![
                FilterField::new("col_4").with_attribute("label", "Region"),
                FilterField::new("status").with_attribute("label", "Status"),
            ],
            filter_urls: Some(FilterUrlConfig {
                initial_load_url: "lazygrid://records?dataset=test".to_string(),
                initial_load_limit: 2,
                pagination_size: 3,
            }),
            error_message: ErrorMessages {
                default_error_msg: Some("Unable to load.".to_string()),
            },
        }),
        dashboard: DashboardUiConfig {
            title: "Test Grid".to_string(),
            dashboard_type: Some("test".to_string()),
        },
    }
}

fn ready_session(
    config: &GridConfig,
    source: &FakeSource,
    cache: &MemoryCache,
    reporter: &RecordingReporter,
) -> GridSession {
    let mut session = GridSession::new(config.table.clone());
    session.initial_setup(config, source, cache, reporter);
    session
}

#[test]
fn blank_values_format_as_dash() {
    for value in [json!(null), json!(""), json!(false), json!([]), json!({})] {
        assert_eq!(
            format_value(Some(&value), ValueType::Text, TextFormat::None),
            DASH,
            "{value} should be blank"
        );
    }
    assert_eq!(format_value(None, ValueType::Currency, TextFormat::None), DASH);
}

#[test]
fn numbers_keep_zero_and_hide_negatives() {
    assert_eq!(format_value(Some(&json!(0)), ValueType::Number, TextFormat::None), "0");
    assert_eq!(format_value(Some(&json!(42)), ValueType::Number, TextFormat::None), "42");
    assert_eq!(format_value(Some(&json!("12.5")), ValueType::Number, TextFormat::None), "12.5");
    assert_eq!(format_value(Some(&json!(-3)), ValueType::Number, TextFormat::None), DASH);
}

#[test]
fn currency_renders_usd_with_grouping() {
    let usd = |value: Value| format_value(Some(&value), ValueType::Currency, TextFormat::None);
    assert_eq!(usd(json!(1234.5)), "$1,234.50");
    assert_eq!(usd(json!("1000000")), "$1,000,000.00");
    assert_eq!(usd(json!(0)), "$0.00");
    assert_eq!(usd(json!(-5)), DASH);
    assert_eq!(usd(json!("abc")), DASH);
}

#[test]
fn phone_numbers_are_grouped_when_complete() {
    let phone = |text: &str| format_value(Some(&json!(text)), ValueType::Phone, TextFormat::None);
    assert_eq!(phone("5551234567"), "(555) 123-4567");
    assert_eq!(phone("1-555-123-4567"), "(555) 123-4567");
    assert_eq!(phone("12345"), "12345");
}

#[test]
fn dates_render_month_day_year() {
    let date = |value: Value| format_value(Some(&value), ValueType::Date, TextFormat::None);
    assert_eq!(date(json!("2024-03-05")), "03/05/2024");
    assert_eq!(date(json!("2024-03-05T10:00:00Z")), "03/05/2024");
    assert_eq!(date(json!(0)), "01/01/1970");
    assert_eq!(date(json!("soon")), "soon");
}

#[test]
fn text_formats_change_case() {
    let text = |value: &str, format: TextFormat| {
        format_value(Some(&json!(value)), ValueType::Text, format)
    };
    assert_eq!(text("hello wORLD", TextFormat::TitleCase), "Hello World");
    assert_eq!(text("shout", TextFormat::Uppercase), "SHOUT");
    assert_eq!(text("QUIET", TextFormat::Lowercase), "quiet");
    assert_eq!(text("hELLO there", TextFormat::Capitalize), "Hello there");
    assert_eq!(text("As Is", TextFormat::None), "As Is");
}

#[test]
fn local_time_follows_zip_region_and_daylight_saving() {
    let winter = Utc
        .with_ymd_and_hms(2024, 1, 15, 17, 30, 0)
        .single()
        .expect("valid timestamp");
    let summer = Utc
        .with_ymd_and_hms(2024, 7, 15, 17, 30, 0)
        .single()
        .expect("valid timestamp");
    let local = |zip: &str, now| {
        format_value_at(Some(&json!(zip)), ValueType::LocalTime, TextFormat::None, now)
    };

    assert_eq!(local("10001", winter), "12:30 PM EST");
    assert_eq!(local("10001", summer), "01:30 PM EDT");
    assert_eq!(local("85001", summer), "10:30 AM MST");
    assert_eq!(local("96601", summer), DASH);
    assert_eq!(local("ABCDE", summer), DASH);
}

#[test]
fn column_width_is_percentage_of_min_width() {
    assert_eq!(column_width(1000.0, 50.0), 500.0);
    assert_eq!(column_width(0.0, 30.0), 0.0);
}

#[test]
fn bottom_detection_rounds_scroll_top_up() {
    assert!(BOTTOM.reached_bottom());
    let middle = ScrollMetrics {
        scroll_top: 100.0,
        ..BOTTOM
    };
    assert!(!middle.reached_bottom());
}

#[test]
fn sort_cycle_walks_desc_asc_none() {
    let mut cycle = SortCycle::new("amount", true);
    assert_eq!(
        cycle.click(false),
        Some(Some(OrderBy::new("amount", SortDirection::Desc)))
    );
    assert_eq!(cycle.icon(), SortIcon::Down);
    assert_eq!(
        cycle.click(false),
        Some(Some(OrderBy::new("amount", SortDirection::Asc)))
    );
    assert_eq!(cycle.icon(), SortIcon::Up);
    assert_eq!(cycle.click(false), Some(None));
    assert_eq!(cycle.icon(), SortIcon::None);

    assert_eq!(cycle.click(true), None, "busy grid ignores clicks");
    let mut fixed = SortCycle::new("phone", false);
    assert_eq!(fixed.click(false), None);
    assert_eq!(fixed.icon(), SortIcon::None);
}

#[test]
fn initial_setup_loads_first_page() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, true));
    let cache = MemoryCache::default();
    let reporter = RecordingReporter::default();

    let session = ready_session(&config, &source, &cache, &reporter);

    assert!(!session.is_loading());
    assert_eq!(session.body_view(), BodyView::Rows);
    assert_eq!(session.items().len(), 2);
    let calls = source.record_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, "lazygrid://records?dataset=test");
    assert_eq!(calls[0].page_size, 2);
    assert!(calls[0].filter.is_empty(), "empty filters are not sent");
    assert_eq!(calls[0].error_message, "Unable to load.");
    assert_eq!(session.store().ui.title, "Test Grid");
    assert_eq!(reporter.count(), 0);
}

#[test]
fn initial_setup_without_urls_stays_empty() {
    let mut config = test_config();
    config.filter = None;
    let source = FakeSource::serving(page(0..2, true));

    let session = ready_session(
        &config,
        &source,
        &MemoryCache::default(),
        &RecordingReporter::default(),
    );

    assert!(source.record_calls().is_empty());
    assert!(!session.is_loading());
    assert_eq!(session.body_view(), BodyView::NoData);
    assert_eq!(session.error_message(), DEFAULT_ERROR_MSG);
}

#[test]
fn initial_setup_restores_recent_filters() {
    let config = test_config();
    let cache = MemoryCache::default();
    cache
        .store_filter_state(
            "test",
            &[
                FilterField::new("col_4")
                    .with_value("eu")
                    .with_attribute("label", "Region"),
                FilterField::new("status").with_attribute("label", "Status"),
            ],
        )
        .expect("memory cache should store");
    let source = FakeSource::serving(page(0..1, false));

    let session = ready_session(&config, &source, &cache, &RecordingReporter::default());

    let calls = source.record_calls();
    assert_eq!(calls[0].filter.get("col_4"), Some(&json!("eu")));
    assert_eq!(calls[0].filter.len(), 1);
    assert_eq!(session.store().filters[0].value, json!("eu"));
}

#[test]
fn empty_result_shows_no_data() {
    let config = test_config();
    let source = FakeSource::serving(PageResult::default());

    let mut session = ready_session(
        &config,
        &source,
        &MemoryCache::default(),
        &RecordingReporter::default(),
    );

    assert_eq!(session.body_view(), BodyView::NoData);
    assert!(!session.show_lazy_loader());
    assert!(session.on_scroll(BOTTOM).is_none());
    assert!(row_views(&session).is_empty());
}

#[test]
fn failed_initial_fetch_is_reported() {
    let config = test_config();
    let source = FakeSource {
        failure: Some(FetchError::from_source("Unable to load.", "disk on fire")),
        ..FakeSource::default()
    };
    let reporter = RecordingReporter::default();

    let session = ready_session(&config, &source, &MemoryCache::default(), &reporter);

    assert_eq!(reporter.count(), 1);
    assert_eq!(
        reporter.reported.lock().expect("lock should succeed")[0].to_string(),
        "Unable to load."
    );
    assert!(!session.is_loading());
    assert_eq!(session.body_view(), BodyView::NoData);
}

#[test]
fn scrolling_to_bottom_fetches_one_page() {
    let config = test_config();
    let source = FakeSource {
        first_page: page(0..2, true),
        next_page: page(2..5, false),
        ..FakeSource::default()
    };
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &MemoryCache::default(), &reporter);

    session.lazy_load(BOTTOM, &source, &reporter);

    let next_calls = source.next_calls();
    assert_eq!(next_calls.len(), 1);
    assert_eq!(next_calls[0].page_size, 3);
    assert_eq!(next_calls[0].href, "lazygrid://records?dataset=test&offset=2");
    assert_eq!(session.items().len(), 5);
    assert!(!session.is_lazy_loading());
    assert!(!session.is_fetching_lazy());

    session.lazy_load(BOTTOM, &source, &reporter);
    assert_eq!(source.next_calls().len(), 1, "last page has no continuation");
}

#[test]
fn scroll_while_fetching_is_ignored() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, true));
    let mut session = ready_session(
        &config,
        &source,
        &MemoryCache::default(),
        &RecordingReporter::default(),
    );

    let pending = session.on_scroll(BOTTOM).expect("first scroll should fetch");
    assert!(session.show_lazy_loader());
    assert!(session.on_scroll(BOTTOM).is_none());
    assert!(session.on_scroll(BOTTOM).is_none());

    session.finish_lazy(pending.ticket, Ok(page(2..4, true)), &RecordingReporter::default());
    assert_eq!(session.items().len(), 4);
    assert!(session.on_scroll(BOTTOM).is_some(), "fetch allowed again");
}

#[test]
fn scroll_above_bottom_does_nothing() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, true));
    let mut session = ready_session(
        &config,
        &source,
        &MemoryCache::default(),
        &RecordingReporter::default(),
    );

    let middle = ScrollMetrics {
        scroll_top: 10.0,
        ..BOTTOM
    };
    assert!(session.on_scroll(middle).is_none());
    assert!(!session.is_lazy_loading());
}

#[test]
fn failed_next_page_keeps_loaded_rows() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, true));
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &MemoryCache::default(), &reporter);

    let pending = session.on_scroll(BOTTOM).expect("scroll should fetch");
    session.finish_lazy(
        pending.ticket,
        Err(FetchError::from_source("Unable to load.", "timeout")),
        &reporter,
    );

    assert_eq!(reporter.count(), 1);
    assert_eq!(session.items().len(), 2);
    assert!(!session.is_lazy_loading());
    assert!(!session.is_fetching_lazy());
}

#[test]
fn filter_change_resets_selection_and_data() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, false));
    let cache = MemoryCache::default();
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &cache, &reporter);
    assert!(session.toggle_row(0));
    assert_eq!(session.selection().len(), 1);

    let pending = session
        .change_filter("col_4", json!("eu"))
        .expect("filter change should reload");

    assert!(session.selection().is_empty());
    assert!(session.items().is_empty());
    assert!(session.is_loading());
    assert_eq!(session.body_view(), BodyView::Loading);
    assert_eq!(pending.query.filter.get("col_4"), Some(&json!("eu")));
    assert_eq!(pending.query.page_size, 2);

    session.finish_reload(pending.ticket, Ok(page(0..1, false)), &cache, &reporter);

    assert!(!session.is_loading());
    assert_eq!(session.items().len(), 1);
    assert_eq!(*cache.clears.lock().expect("lock should succeed"), 1);
    let stored = cache.stored("test").expect("filters should be cached");
    assert_eq!(stored[0].value, json!("eu"));
    assert_eq!(stored[0].attributes.get("label"), Some(&json!("Region")));
}

#[test]
fn failed_reload_is_reported_and_leaves_grid_empty() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, false));
    let cache = MemoryCache::default();
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &cache, &reporter);

    let pending = session
        .change_filter("status", json!("pending"))
        .expect("filter change should reload");
    session.finish_reload(
        pending.ticket,
        Err(FetchError::from_source("Unable to load.", "boom")),
        &cache,
        &reporter,
    );

    assert_eq!(reporter.count(), 1);
    assert!(!session.is_loading());
    assert_eq!(session.body_view(), BodyView::NoData);
    assert!(cache.stored("test").is_none());
}

#[test]
fn superseded_reload_result_is_dropped() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, false));
    let cache = MemoryCache::default();
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &cache, &reporter);

    let first = session
        .change_filter("col_4", json!("eu"))
        .expect("first change should reload");
    let second = session
        .change_filter("col_4", json!("us"))
        .expect("second change should reload");

    session.finish_reload(first.ticket, Ok(page(0..4, false)), &cache, &reporter);
    assert!(session.is_loading(), "stale result must not finish the load");
    assert!(session.items().is_empty());

    session.finish_reload(second.ticket, Ok(page(0..1, false)), &cache, &reporter);
    assert!(!session.is_loading());
    assert_eq!(session.items().len(), 1);
}

#[test]
fn next_page_for_replaced_dataset_is_dropped() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, true));
    let cache = MemoryCache::default();
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &cache, &reporter);

    let lazy = session.on_scroll(BOTTOM).expect("scroll should fetch");
    let reload = session
        .change_filter("col_4", json!("eu"))
        .expect("filter change should reload");

    session.finish_lazy(lazy.ticket, Ok(page(2..4, false)), &reporter);
    assert!(session.items().is_empty());
    assert!(!session.is_fetching_lazy());

    session.finish_reload(reload.ticket, Ok(page(0..2, false)), &cache, &reporter);
    assert_eq!(session.items().len(), 2);
}

#[test]
fn header_clicks_cycle_sort_and_reload() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, false));
    let cache = MemoryCache::default();
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &cache, &reporter);

    let desc = session.click_header(0).expect("first click should reload");
    assert_eq!(
        desc.query.order_by,
        Some(OrderBy::new("col_1", SortDirection::Desc))
    );
    assert_eq!(session.sort_icon(0), SortIcon::Down);
    assert!(session.click_header(0).is_none(), "ignored while loading");
    session.finish_reload(desc.ticket, Ok(page(0..2, false)), &cache, &reporter);

    let asc = session.click_header(0).expect("second click should reload");
    assert_eq!(
        asc.query.order_by,
        Some(OrderBy::new("col_1", SortDirection::Asc))
    );
    assert_eq!(session.sort_icon(0), SortIcon::Up);
    session.finish_reload(asc.ticket, Ok(page(0..2, false)), &cache, &reporter);

    let cleared = session.click_header(0).expect("third click should reload");
    assert_eq!(cleared.query.order_by, None);
    assert_eq!(session.sort_icon(0), SortIcon::None);
}

#[test]
fn unsortable_column_ignores_clicks() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, false));
    let mut session = ready_session(
        &config,
        &source,
        &MemoryCache::default(),
        &RecordingReporter::default(),
    );

    assert!(session.click_header(2).is_none());
    assert_eq!(session.sort_icon(2), SortIcon::None);
    assert_eq!(source.record_calls().len(), 1);
}

#[test]
fn header_click_before_first_load_is_ignored() {
    let config = test_config();
    let mut session = GridSession::new(config.table.clone());

    assert!(session.is_loading());
    assert!(session.click_header(0).is_none());
    assert_eq!(session.sort_icon(0), SortIcon::None);
}

#[test]
fn header_click_during_lazy_fetch_is_ignored() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, true));
    let cache = MemoryCache::default();
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &cache, &reporter);

    let lazy = session.on_scroll(BOTTOM).expect("scroll should fetch");
    assert!(session.click_header(0).is_none(), "ignored while paging");
    assert_eq!(session.sort_icon(0), SortIcon::None);
    assert!(session.store().order_by.is_none());

    session.finish_lazy(lazy.ticket, Ok(page(2..4, false)), &reporter);
    let reload = session
        .click_header(0)
        .expect("click after paging should reload");
    assert_eq!(
        reload.query.order_by,
        Some(OrderBy::new("col_1", SortDirection::Desc))
    );
    assert_eq!(session.sort_icon(0), SortIcon::Down);
}

#[test]
fn sorting_another_column_resets_previous_arrow() {
    let config = test_config();
    let source = FakeSource::serving(page(0..2, false));
    let cache = MemoryCache::default();
    let reporter = RecordingReporter::default();
    let mut session = ready_session(&config, &source, &cache, &reporter);

    let first = session.click_header(0).expect("click should reload");
    session.finish_reload(first.ticket, Ok(page(0..2, false)), &cache, &reporter);
    let second = session.click_header(1).expect("click should reload");

    assert_eq!(
        second.query.order_by,
        Some(OrderBy::new("amount", SortDirection::Desc))
    );
    assert_eq!(session.sort_icon(0), SortIcon::None);
    assert_eq!(session.sort_icon(1), SortIcon::Down);
    let headers = header_views(&session);
    assert_eq!(headers[1].icon, SortIcon::Down);
    assert_eq!(headers[0].width, 500.0);
}

#[test]
fn approved_and_declined_rows_are_locked() {
    let config = test_config();
    let source = FakeSource::serving(page(0..3, false));
    let mut session = ready_session(
        &config,
        &source,
        &MemoryCache::default(),
        &RecordingReporter::default(),
    );

    assert_eq!(session.row_lock(1), RowLock::Approved);
    assert!(!session.toggle_row(1));
    let approved = session.select_indicator(1);
    assert!(approved.check_mark && approved.disabled && !approved.cross_mark);

    assert!(!session.toggle_row(2));
    let declined = session.select_indicator(2);
    assert!(declined.cross_mark && declined.disabled && !declined.check_mark);

    assert!(session.toggle_row(0));
    assert!(session.select_indicator(0).check_mark);
    assert!(session.toggle_row(0));
    assert!(!session.selection().contains(0));
    assert!(!session.toggle_row(99));
}

#[test]
fn selection_is_off_without_config() {
    let mut config = test_config();
    config.table.selectable = false;
    let source = FakeSource::serving(page(0..3, false));
    let mut session = ready_session(
        &config,
        &source,
        &MemoryCache::default(),
        &RecordingReporter::default(),
    );

    assert!(!session.toggle_row(0));
    assert!(row_views(&session).iter().all(|row| row.select.is_none()));
}

#[test]
fn cell_view_hides_decorations_for_blank_values() {
    let mut column = ColumnDescriptor::new("Amount", "amount", 10.0);
    column.value_type = ValueType::Currency;
    column.copyable = true;
    column.prefix_icon = Some("money".to_string());

    let filled = CellView::new(&RowRecord::new("7").with("amount", "1234.5"), &column, 1500.0);
    assert_eq!(filled.text, "$1,234.50");
    assert_eq!(filled.width, 150.0);
    assert_eq!(filled.title.as_deref(), Some("$1,234.50"));
    assert!(filled.copyable);
    assert_eq!(filled.prefix_icon.as_deref(), Some("money"));
    assert_eq!(filled.key, "7_amount");

    let blank = CellView::new(&RowRecord::new("8"), &column, 1500.0);
    assert_eq!(blank.text, DASH);
    assert!(!blank.has_value());
    assert!(!blank.copyable);
    assert!(blank.prefix_icon.is_none());
}

#[test]
fn sanitize_drops_empty_filter_values() {
    let fields = vec![
        FilterField::new("none"),
        FilterField::new("blank").with_value("   "),
        FilterField::new("region").with_value("eu"),
        FilterField::new("empty_list").with_value(json!([])),
        FilterField::new("statuses").with_value(json!(["open"])),
        FilterField::new("count").with_value(0),
    ];

    let sanitized = sanitize_filter(&fields);

    assert_eq!(
        sanitized.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["count", "region", "statuses"]
    );
}

#[test]
fn recent_filters_merge_only_when_shape_matches() {
    let configured = vec![
        FilterField::new("region").with_attribute("label", "Region"),
        FilterField::new("status").with_attribute("label", "Status"),
    ];
    let recent = vec![
        FilterField::new("region")
            .with_value("eu")
            .with_attribute("label", "Region"),
        FilterField::new("status").with_attribute("label", "Status"),
    ];

    let merged = merge_recent_filters(&configured, &recent).expect("same shape should merge");
    assert_eq!(merged[0].value, json!("eu"));

    let reordered = vec![recent[1].clone(), recent[0].clone()];
    assert!(merge_recent_filters(&configured, &reordered).is_none());
    assert!(merge_recent_filters(&configured, &recent[..1]).is_none());

    let mut reshaped = recent.clone();
    reshaped[1] = reshaped[1].clone().with_attribute("options", json!(["a"]));
    assert!(merge_recent_filters(&configured, &reshaped).is_none());
}

#[test]
fn store_ignores_values_for_unknown_filters() {
    let mut store = GridStore::default();
    store.dispatch(StoreAction::SetFilters(vec![FilterField::new("region")]));
    store.dispatch(StoreAction::SetFilterValue {
        field_name: "missing".to_string(),
        value: json!("x"),
    });
    assert_eq!(store.filters, vec![FilterField::new("region")]);

    store.dispatch(StoreAction::SetData(page(0..2, true)));
    store.dispatch(StoreAction::AppendData(page(2..3, false)));
    assert_eq!(store.data.items.len(), 3);
    assert!(!store.data.has_more);
    assert_eq!(store.data.next_link(), None);
}

#[test]
fn config_json_uses_defaults_for_missing_and_unknown_values() {
    let json = r#"{
        "table": {
            "min_width": 1200,
            "columns": [
                {"title": "Amount", "data_column": "amount", "type": "currency", "width": 20},
                {"title": "Misc", "data_column": "misc", "type": "weird", "format": "uppercase", "width": 10, "sortable": false}
            ]
        },
        "filter": {
            "filter_fields": [{"field_name": "region", "label": "Region"}],
            "filter_urls": {
                "initial_load_url": "lazygrid://records?dataset=sales",
                "initial_load_limit": 50,
                "pagination_size": 20
            }
        },
        "dashboard": {"title": "Sales Overview"}
    }"#;

    let config: GridConfig = serde_json::from_str(json).expect("config should parse");

    let columns = &config.table.columns;
    assert_eq!(columns[0].value_type, ValueType::Currency);
    assert!(columns[0].sortable);
    assert_eq!(columns[1].value_type, ValueType::Text);
    assert_eq!(columns[1].format, TextFormat::Uppercase);
    assert!(!columns[1].sortable);
    assert!(config.table.selection().is_none());

    let filter = config.filter.expect("filter section should parse");
    assert_eq!(filter.filter_fields[0].value, Value::Null);
    assert_eq!(
        filter.filter_fields[0].attributes.get("label"),
        Some(&json!("Region"))
    );
    assert_eq!(filter.error_message.default_error_msg, None);
    assert_eq!(config.dashboard.dashboard_type(), "sales-overview");
}

#[test]
fn record_cursor_round_trips_through_href() {
    let cursor = RecordCursor {
        dataset: "people".to_string(),
        offset: 4,
        filters: vec![(
            "city".to_string(),
            vec!["Paris".to_string(), "São Paulo".to_string()],
        )],
        sort: Some(("age".to_string(), SortDirection::Desc)),
    };

    let parsed = RecordCursor::parse(&cursor.to_href()).expect("href should parse");

    assert_eq!(parsed, cursor);
    assert!(RecordCursor::parse("lazygrid://records?offset=2").is_err());
    assert!(RecordCursor::parse("https://example.com/records?dataset=x").is_err());
}

#[test]
fn init_db_creates_record_tables() {
    let temp_dir = unique_test_dir("init-db");
    let db_path = temp_dir.join("nested").join("records.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");
    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('dataset','record_column','record_cell','recent_filter')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");
    assert_eq!(table_count, 4, "record tables should exist");
    assert!(init_db(&db_path).is_ok(), "init_db should be repeatable");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

fn seed_people(db_path: &std::path::Path) {
    let columns = ["name", "city", "age"].map(String::from).to_vec();
    let rows = [
        ["Alice", "Paris", "30"],
        ["Bob", "Tokyo", "25"],
        ["Carol", "Paris", "41"],
        ["Dan", "Oslo", "19"],
        ["Eve", "Paris", "35"],
    ]
    .iter()
    .map(|row| row.iter().map(|value| value.to_string()).collect())
    .collect::<Vec<Vec<String>>>();
    create_dataset_from_rows(db_path, "people", "people.csv", &columns, &rows)
        .expect("dataset should be created");
}

fn people_query(page_size: i64) -> RecordQuery {
    RecordQuery {
        url: "lazygrid://records?dataset=people".to_string(),
        filter: BTreeMap::new(),
        error_message: "Unable to load people.".to_string(),
        page_size,
        order_by: None,
    }
}

fn names(page: &PageResult) -> Vec<String> {
    page.items
        .iter()
        .map(|item| {
            item.get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

#[test]
fn sqlite_store_pages_through_continuation_links() {
    let temp_dir = unique_test_dir("store-paging");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("records.sqlite");
    seed_people(&db_path);
    let store = SqliteRecordStore::new(db_path);

    let first = store
        .fetch_records(&people_query(2))
        .expect("first page should load");
    assert_eq!(names(&first), vec!["Alice", "Bob"]);
    assert!(first.has_more);
    let next_href = first.next_link().expect("next link expected").to_string();

    let second = store
        .fetch_next(&NextPageQuery {
            href: next_href,
            error_message: "Unable to load people.".to_string(),
            page_size: 2,
        })
        .expect("second page should load");
    assert_eq!(names(&second), vec!["Carol", "Dan"]);
    assert_eq!(second.items[0].id, "2");

    let third = store
        .fetch_next(&NextPageQuery {
            href: second.next_link().expect("next link expected").to_string(),
            error_message: "Unable to load people.".to_string(),
            page_size: 2,
        })
        .expect("third page should load");
    assert_eq!(names(&third), vec!["Eve"]);
    assert!(!third.has_more);
    assert_eq!(third.next_link(), None);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_store_applies_filter_and_sort_across_pages() {
    let temp_dir = unique_test_dir("store-filter-sort");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("records.sqlite");
    seed_people(&db_path);
    let store = SqliteRecordStore::new(db_path);

    let mut query = people_query(5);
    query.filter.insert("city".to_string(), json!("Paris"));
    query.order_by = Some(OrderBy::new("age", SortDirection::Desc));
    let all = store.fetch_records(&query).expect("filtered page should load");
    assert_eq!(names(&all), vec!["Carol", "Eve", "Alice"]);
    assert!(!all.has_more);

    query.page_size = 2;
    query.order_by = Some(OrderBy::new("age", SortDirection::Asc));
    let first = store.fetch_records(&query).expect("filtered page should load");
    assert_eq!(names(&first), vec!["Alice", "Eve"]);
    let rest = store
        .fetch_next(&NextPageQuery {
            href: first.next_link().expect("next link expected").to_string(),
            error_message: "Unable to load people.".to_string(),
            page_size: 2,
        })
        .expect("next filtered page should load");
    assert_eq!(names(&rest), vec!["Carol"]);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_store_filters_ignore_case() {
    let temp_dir = unique_test_dir("store-filter-case");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("records.sqlite");
    seed_people(&db_path);
    let store = SqliteRecordStore::new(db_path);

    let mut query = people_query(5);
    query.filter.insert("city".to_string(), json!("PARIS"));
    let page = store.fetch_records(&query).expect("filtered page should load");

    assert_eq!(names(&page), vec!["Alice", "Carol", "Eve"]);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_store_sorts_numbers_before_text() {
    let temp_dir = unique_test_dir("store-mixed-sort");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("records.sqlite");
    let columns = ["name", "score"].map(String::from).to_vec();
    let rows = [
        ["Ann", "10"],
        ["Ben", "n/a"],
        ["Cid", "-5"],
        ["Dee", ""],
        ["Eli", "2.5"],
    ]
    .iter()
    .map(|row| row.iter().map(|value| value.to_string()).collect())
    .collect::<Vec<Vec<String>>>();
    create_dataset_from_rows(&db_path, "scores", "scores.csv", &columns, &rows)
        .expect("dataset should be created");
    let store = SqliteRecordStore::new(db_path);

    let mut query = people_query(5);
    query.url = "lazygrid://records?dataset=scores".to_string();
    query.order_by = Some(OrderBy::new("score", SortDirection::Asc));
    let ascending = store.fetch_records(&query).expect("sorted page should load");
    assert_eq!(names(&ascending), vec!["Cid", "Eli", "Ann", "Dee", "Ben"]);

    query.order_by = Some(OrderBy::new("score", SortDirection::Desc));
    let descending = store.fetch_records(&query).expect("sorted page should load");
    assert_eq!(names(&descending), vec!["Ann", "Eli", "Cid", "Ben", "Dee"]);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn copy_script_quotes_cell_text() {
    let script = copy_script("say \"hi\"");

    assert_eq!(
        script,
        "await navigator.clipboard.writeText(\"say \\\"hi\\\"\"); return true;"
    );
}

#[test]
fn sqlite_store_maps_failures_to_fetch_errors() {
    let temp_dir = unique_test_dir("store-errors");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("records.sqlite");
    seed_people(&db_path);
    let store = SqliteRecordStore::new(db_path);

    let mut missing = people_query(2);
    missing.url = "lazygrid://records?dataset=nobody".to_string();
    match store.fetch_records(&missing) {
        Err(FetchError::Source { message, detail }) => {
            assert_eq!(message, "Unable to load people.");
            assert!(detail.contains("nobody"), "detail should name dataset: {detail}");
        }
        other => panic!("expected source error, got {other:?}"),
    }

    assert_eq!(
        store.fetch_records(&people_query(0)),
        Err(FetchError::InvalidPageSize(0))
    );
    assert!(matches!(
        store.fetch_next(&NextPageQuery {
            href: "not a link".to_string(),
            error_message: String::new(),
            page_size: 2,
        }),
        Err(FetchError::InvalidLink(_))
    ));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_filter_cache_round_trip() {
    let temp_dir = unique_test_dir("filter-cache");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let cache = SqliteFilterCache::new(temp_dir.join("records.sqlite"));
    let filters = vec![
        FilterField::new("city")
            .with_value("Paris")
            .with_attribute("label", "City"),
        FilterField::new("age").with_attribute("label", "Age"),
    ];

    cache
        .store_filter_state("people", &filters)
        .expect("store should succeed");
    assert_eq!(
        cache.most_recent_filters("people").expect("load should succeed"),
        filters
    );
    assert!(cache
        .most_recent_filters("other")
        .expect("load should succeed")
        .is_empty());

    cache
        .clear_recent_state("people")
        .expect("clear should succeed");
    assert!(cache
        .most_recent_filters("people")
        .expect("load should succeed")
        .is_empty());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn csv_import_replaces_dataset_with_same_name() {
    let temp_dir = unique_test_dir("csv-import");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("records.sqlite");
    let csv_path = temp_dir.join("people.csv");
    fs::write(&csv_path, "name,city\nAlice,Paris\nBob,Tokyo\n").expect("should write csv fixture");
    let import_service = ImportService::new(db_path.clone());

    let imported = import_service
        .import_file(&csv_path, None)
        .expect("import should succeed");
    assert_eq!(imported.row_count, 2);
    assert_eq!(imported.dataset_name, "people");

    fs::write(&csv_path, "name,city\nCarol,Oslo\n").expect("should rewrite csv fixture");
    import_service
        .import_file(&csv_path, Some("people"))
        .expect("re-import should succeed");

    let store = SqliteRecordStore::new(db_path);
    let loaded = store
        .fetch_records(&people_query(10))
        .expect("imported dataset should load");
    assert_eq!(names(&loaded), vec!["Carol"]);
    assert_eq!(loaded.items[0].get("city"), Some(&json!("Oslo")));

    let unsupported = temp_dir.join("notes.txt");
    fs::write(&unsupported, "hello").expect("should write fixture");
    assert!(import_service.import_file(&unsupported, None).is_err());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn demo_grid_loads_pages_and_remembers_filters() {
    let temp_dir = unique_test_dir("demo-grid");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("records.sqlite");
    let dataset_id =
        ensure_demo_dataset(&db_path, "demo", 30).expect("demo dataset should be seeded");
    assert_eq!(
        ensure_demo_dataset(&db_path, "demo", 30).expect("seeding is idempotent"),
        dataset_id
    );

    let config = GridConfig::demo();
    let source = SqliteRecordStore::new(db_path.clone());
    let cache = SqliteFilterCache::new(db_path.clone());
    let reporter = LogReporter;

    let mut session = GridSession::new(config.table.clone());
    session.initial_setup(&config, &source, &cache, &reporter);
    assert_eq!(session.items().len(), 25);

    session.lazy_load(BOTTOM, &source, &reporter);
    assert_eq!(session.items().len(), 30);
    assert!(session.on_scroll(BOTTOM).is_none());

    session.change_filter("col_4", json!("eu"));
    session.reload(&source, &cache, &reporter);
    assert_eq!(session.items().len(), 10);

    let mut restored = GridSession::new(config.table.clone());
    restored.initial_setup(&config, &source, &cache, &reporter);
    assert_eq!(restored.store().filters[0].value, json!("eu"));
    assert_eq!(restored.items().len(), 10);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
