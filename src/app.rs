use std::path::PathBuf;
use std::sync::Arc;

use dioxus::prelude::*;
use rfd::FileDialog;
use serde_json::Value;

use crate::config::GridConfig;
use crate::domain::entities::filter::FilterField;
use crate::infra::reporter::DialogReporter;
use crate::infra::sqlite::filter_cache::SqliteFilterCache;
use crate::infra::sqlite::record_store::{RecordCursor, SqliteRecordStore};
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::components::table::TableGrid;
use crate::ui::components::{spawn_reload, GridServices};
use crate::ui::state::app_state::AppState;
use crate::usecase::services::import_service::ImportService;

/// Resolved before the window opens and handed to [`App`] through context.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub config: GridConfig,
    pub db_path: PathBuf,
}

fn filter_label(field: &FilterField) -> String {
    field
        .attributes
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or(&field.field_name)
        .to_string()
}

fn filter_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Dataset the configured first-page link points at; imports land there.
fn import_target(config: &GridConfig) -> Option<String> {
    let urls = config.filter.as_ref()?.filter_urls.as_ref()?;
    RecordCursor::parse(&urls.initial_load_url)
        .ok()
        .map(|cursor| cursor.dataset)
}

#[component]
pub fn App() -> Element {
    let launch = use_context::<LaunchContext>();
    let services = use_context_provider(|| GridServices {
        source: Arc::new(SqliteRecordStore::new(launch.db_path.clone())),
        cache: Arc::new(SqliteFilterCache::new(launch.db_path.clone())),
        reporter: Arc::new(DialogReporter {
            title: launch.config.dashboard.title.clone(),
        }),
    });

    let AppState {
        mut session,
        mut busy,
        mut status,
    } = AppState::new(launch.config.table.clone());

    let config_for_init = launch.config.clone();
    let services_for_init = services.clone();
    use_effect(move || {
        *busy.write() = true;
        run_blocking("initial setup", || {
            session.write().initial_setup(
                &config_for_init,
                services_for_init.source.as_ref(),
                services_for_init.cache.as_ref(),
                services_for_init.reporter.as_ref(),
            )
        });
        *busy.write() = false;
    });

    let import_service = Arc::new(ImportService::new(launch.db_path.clone()));
    let target_dataset = import_target(&launch.config);
    let services_for_import = services.clone();
    let handle_import = move |_: MouseEvent| {
        if busy() {
            return;
        }
        let Some(file_path) = FileDialog::new()
            .add_filter("Excel", &["xlsx"])
            .add_filter("CSV", &["csv"])
            .add_filter("All files", &["*"])
            .pick_file()
        else {
            return;
        };

        *busy.write() = true;
        *status.write() = format!("Importing {}", file_path.display());
        let import_result = run_blocking("import", || {
            import_service.import_file(&file_path, target_dataset.as_deref())
        });
        match import_result {
            Ok(imported) => {
                *status.write() = format!(
                    "Imported {} rows into {}",
                    imported.row_count, imported.dataset_name
                );
                let pending = session.write().begin_reload();
                if let Some(pending) = pending {
                    spawn_reload(session, services_for_import.clone(), pending);
                }
            }
            Err(err) => {
                log::error!("import of {} failed: {err:#}", file_path.display());
                *status.write() = format!("Import failed: {err}");
            }
        }
        *busy.write() = false;
    };

    let (filters, record_count, selected_count, loading) = {
        let snapshot = session.read();
        (
            snapshot.store().filters.clone(),
            snapshot.items().len(),
            snapshot.selection().len(),
            snapshot.is_loading(),
        )
    };

    let filter_inputs = filters.into_iter().map(move |field| {
        let services = services.clone();
        let label = filter_label(&field);
        let text = filter_text(&field.value);
        let key = field.field_name.clone();
        let field_name = field.field_name;
        rsx! {
            label {
                key: "{key}",
                style: "display: flex; gap: 4px; align-items: center;",
                "{label}"
                input {
                    value: "{text}",
                    disabled: loading,
                    style: "width: 120px;",
                    onchange: move |evt: FormEvent| {
                        let pending = session
                            .write()
                            .change_filter(field_name.clone(), Value::String(evt.value()));
                        if let Some(pending) = pending {
                            spawn_reload(session, services.clone(), pending);
                        }
                    },
                }
            }
        }
    });

    let title = launch.config.dashboard.title.clone();

    rsx! {
        div {
            style: "display: flex; flex-direction: column; height: 100vh; font-family: sans-serif; font-size: 13px;",
            nav {
                style: "display: flex; gap: 12px; align-items: center; flex-wrap: wrap; padding: 8px;",
                strong { "{title}" }
                button { disabled: busy(), onclick: handle_import, "Import" }
                {filter_inputs}
                span { style: "margin-left: auto; color: #555;", "{status}" }
                span { style: "color: #555;", "{record_count} records, {selected_count} selected" }
            }
            TableGrid { session }
        }
    }
}
