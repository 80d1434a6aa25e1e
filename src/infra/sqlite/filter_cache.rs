use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::params;

use crate::domain::entities::filter::FilterField;
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::errors::CacheError;
use crate::usecase::ports::filter_cache::FilterCache;

pub fn load_recent_filters(db_path: &Path, dashboard_type: &str) -> Result<Vec<FilterField>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT field_json
             FROM recent_filter
             WHERE dashboard_type = ?1
             ORDER BY position ASC",
        )
        .context("failed to prepare recent filter query")?;

    let rows = stmt
        .query_map([dashboard_type], |row| row.get::<_, String>(0))
        .context("failed to query recent filters")?;

    let mut filters = Vec::new();
    for row in rows {
        let json = row.context("failed to read recent filter row")?;
        let field: FilterField =
            serde_json::from_str(&json).context("failed to decode recent filter")?;
        filters.push(field);
    }
    Ok(filters)
}

pub fn clear_recent_filters(db_path: &Path, dashboard_type: &str) -> Result<()> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    conn.execute(
        "DELETE FROM recent_filter WHERE dashboard_type = ?1",
        [dashboard_type],
    )
    .with_context(|| format!("failed to clear recent filters of {dashboard_type}"))?;
    Ok(())
}

pub fn store_recent_filters(
    db_path: &Path,
    dashboard_type: &str,
    filters: &[FilterField],
) -> Result<()> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start recent filter transaction")?;

    tx.execute(
        "DELETE FROM recent_filter WHERE dashboard_type = ?1",
        [dashboard_type],
    )
    .context("failed to clear existing recent filters")?;

    let mut insert_stmt = tx
        .prepare(
            "INSERT INTO recent_filter(dashboard_type, position, field_json)
             VALUES (?1, ?2, ?3)",
        )
        .context("failed to prepare recent filter insert")?;

    for (position, field) in filters.iter().enumerate() {
        let json = serde_json::to_string(field).context("failed to encode recent filter")?;
        insert_stmt
            .execute(params![dashboard_type, position as i64, json])
            .context("failed to insert recent filter")?;
    }

    drop(insert_stmt);
    tx.commit()
        .context("failed to commit recent filter updates")?;
    Ok(())
}

pub struct SqliteFilterCache {
    pub db_path: PathBuf,
}

impl SqliteFilterCache {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

fn cache_error(err: anyhow::Error) -> CacheError {
    CacheError(format!("{err:#}"))
}

impl FilterCache for SqliteFilterCache {
    fn most_recent_filters(&self, dashboard_type: &str) -> Result<Vec<FilterField>, CacheError> {
        load_recent_filters(&self.db_path, dashboard_type).map_err(cache_error)
    }

    fn clear_recent_state(&self, dashboard_type: &str) -> Result<(), CacheError> {
        clear_recent_filters(&self.db_path, dashboard_type).map_err(cache_error)
    }

    fn store_filter_state(
        &self,
        dashboard_type: &str,
        filters: &[FilterField],
    ) -> Result<(), CacheError> {
        store_recent_filters(&self.db_path, dashboard_type, filters).map_err(cache_error)
    }
}
