use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use simplelog::{Config, LevelFilter, WriteLogger};

mod app;
mod config;
mod domain;
mod infra;
mod platform;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

use crate::app::{App, LaunchContext};
use crate::config::{default_db_path, default_log_path, default_webview_data_dir, resolve_config};
use crate::infra::sqlite::demo::ensure_demo_dataset;
use crate::infra::sqlite::record_store::RecordCursor;
use crate::infra::sqlite::schema::init_db;

const LOG_LEVEL_ENV: &str = "LAZYGRID_LOG";
const DEMO_ROW_COUNT: usize = 240;

fn log_level() -> LevelFilter {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

fn init_logging() -> Result<PathBuf> {
    let log_path = default_log_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir: {}", parent.display()))?;
    }
    let log_file = File::create(&log_path)
        .with_context(|| format!("failed to create log file: {}", log_path.display()))?;
    WriteLogger::init(log_level(), Config::default(), log_file)
        .context("failed to install logger")?;
    Ok(log_path)
}

/// Loads the grid config, opens the record store and seeds the demo dataset
/// when the config points at it.
fn prepare_launch(config_path: Option<PathBuf>) -> Result<LaunchContext> {
    let config = resolve_config(config_path.as_deref())?;
    let db_path = default_db_path()?;
    init_db(&db_path)?;

    let demo_url = config
        .filter
        .as_ref()
        .and_then(|filter| filter.filter_urls.as_ref())
        .and_then(|urls| RecordCursor::parse(&urls.initial_load_url).ok())
        .filter(|cursor| cursor.dataset == config::DEMO_DATASET);
    if demo_url.is_some() {
        ensure_demo_dataset(&db_path, config::DEMO_DATASET, DEMO_ROW_COUNT)?;
    }

    log::info!(
        "launching {:?} with {} columns, store at {}",
        config.dashboard.title,
        config.table.columns.len(),
        db_path.display()
    );
    Ok(LaunchContext { config, db_path })
}

fn main() {
    match init_logging() {
        Ok(log_path) => log::info!("logging to {}", log_path.display()),
        Err(err) => eprintln!("logging disabled: {err:#}"),
    }

    let launch = match prepare_launch(std::env::args_os().nth(1).map(PathBuf::from)) {
        Ok(launch) => launch,
        Err(err) => {
            log::error!("startup failed: {err:#}");
            eprintln!("startup failed: {err:#}");
            std::process::exit(1);
        }
    };

    let mut desktop_cfg = dioxus::desktop::Config::new().with_window(
        dioxus::desktop::WindowBuilder::new().with_title(launch.config.dashboard.title.clone()),
    );
    match default_webview_data_dir() {
        Ok(dir) => desktop_cfg = desktop_cfg.with_data_directory(dir),
        Err(err) => log::warn!("using default webview data dir: {err:#}"),
    }

    dioxus::LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(launch)
        .launch(App);
}
