use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::entities::column::{ColumnDescriptor, TextFormat, ValueType};
use crate::domain::entities::filter::FilterField;
use crate::domain::selection::SelectableConfig;

pub const CONFIG_FILE_NAME: &str = "grid.json";
pub const DB_FILE_NAME: &str = "records.sqlite";
pub const LOG_FILE_NAME: &str = "lazygrid.log";
pub const DEMO_DATASET: &str = "demo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub table: TableConfig,
    #[serde(default)]
    pub filter: Option<FilterConfig>,
    #[serde(default)]
    pub dashboard: DashboardUiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub min_width: f64,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub selectable: bool,
    #[serde(default)]
    pub selectable_config: Option<SelectableConfig>,
}

impl TableConfig {
    /// Selection settings, only when selection is switched on.
    pub fn selection(&self) -> Option<&SelectableConfig> {
        self.selectable_config.as_ref().filter(|_| self.selectable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filter_fields: Vec<FilterField>,
    #[serde(default)]
    pub filter_urls: Option<FilterUrlConfig>,
    #[serde(default)]
    pub error_message: ErrorMessages,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterUrlConfig {
    pub initial_load_url: String,
    pub initial_load_limit: i64,
    pub pagination_size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorMessages {
    #[serde(default)]
    pub default_error_msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardUiConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub dashboard_type: Option<String>,
}

impl DashboardUiConfig {
    /// Key under which recent filters of this dashboard are cached.
    pub fn dashboard_type(&self) -> String {
        match &self.dashboard_type {
            Some(kind) if !kind.trim().is_empty() => kind.trim().to_string(),
            _ => self
                .title
                .trim()
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-"),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "lazygrid", "lazygrid")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join(DB_FILE_NAME))
}

pub fn default_log_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join(LOG_FILE_NAME))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview");
    fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

pub fn load_config_file(path: &Path) -> Result<GridConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Explicit path first, then the platform config file, then the demo grid.
pub fn resolve_config(explicit: Option<&Path>) -> Result<GridConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let default_path = default_config_path()?;
    if default_path.exists() {
        return load_config_file(&default_path);
    }
    log::info!(
        "no config at {}, using demo grid",
        default_path.display()
    );
    Ok(GridConfig::demo())
}

impl GridConfig {
    pub fn demo() -> Self {
        let column = |title: &str, key: &str, format: TextFormat, width: f64| {
            let mut column = ColumnDescriptor::new(title, key, width);
            column.format = format;
            column
        };

        let mut reference = column("Reference", "col_1", TextFormat::Capitalize, 14.0);
        reference.prefix_icon = Some("call".to_string());
        let mut notes = column("Notes", "col_2", TextFormat::TitleCase, 20.0);
        notes.copyable = true;
        let mut owner = column("Owner", "col_3", TextFormat::Lowercase, 10.0);
        owner.suffix_icon = Some("magnifying-glass".to_string());
        let region = column("Region", "col_4", TextFormat::Uppercase, 8.0);
        let mut amount = column("Amount", "amount", TextFormat::None, 10.0);
        amount.value_type = ValueType::Currency;
        let mut phone = column("Phone", "phone", TextFormat::None, 12.0);
        phone.value_type = ValueType::Phone;
        phone.sortable = false;
        let mut created = column("Created", "created", TextFormat::None, 10.0);
        created.value_type = ValueType::Date;
        let mut local_time = column("Local time", "zip", TextFormat::None, 8.0);
        local_time.value_type = ValueType::LocalTime;
        local_time.sort_column = Some("zip".to_string());
        let status = column("Status", "status", TextFormat::Capitalize, 4.0);

        GridConfig {
            table: TableConfig {
                min_width: 1500.0,
                columns: vec![
                    reference, notes, owner, region, amount, phone, created, local_time, status,
                ],
                selectable: true,
                selectable_config: Some(SelectableConfig {
                    data_column: "status".to_string(),
                    approve_cases: vec!["approved".into()],
                    decline_cases: vec!["declined".into()],
                    width: 4.0,
                }),
            },
            filter: Some(FilterConfig {
                filter_fields: vec![
                    FilterField::new("col_4").with_attribute("label", "Region"),
                    FilterField::new("status").with_attribute("label", "Status"),
                ],
                filter_urls: Some(FilterUrlConfig {
                    initial_load_url: format!("lazygrid://records?dataset={DEMO_DATASET}"),
                    initial_load_limit: 25,
                    pagination_size: 25,
                }),
                error_message: ErrorMessages {
                    default_error_msg: Some("Unable to load records.".to_string()),
                },
            }),
            dashboard: DashboardUiConfig {
                title: "Lazy Grid".to_string(),
                dashboard_type: Some("demo".to_string()),
            },
        }
    }
}
