use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, types::Value, OptionalExtension};

use crate::domain::entities::sort::SortDirection;
use crate::infra::sqlite::schema::{init_db, open_connection};

/// One page request against a stored dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordPageQuery {
    pub dataset_id: i64,
    pub offset: i64,
    pub limit: i64,
    /// Column name and accepted values; a row matches when its value equals
    /// any of them.
    pub filters: Vec<(String, Vec<String>)>,
    pub sort: Option<(String, SortDirection)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage {
    pub columns: Vec<String>,
    /// `(row_idx, values)` in column order.
    pub rows: Vec<(i64, Vec<String>)>,
    pub total_rows: i64,
}

pub fn insert_header_names(
    tx: &rusqlite::Transaction<'_>,
    dataset_id: i64,
    headers: &[String],
) -> Result<()> {
    let mut insert_header = tx
        .prepare("INSERT INTO record_column(dataset_id, col_idx, name) VALUES (?1, ?2, ?3)")
        .context("failed to prepare header insert")?;

    for (col_idx, name) in headers.iter().enumerate() {
        insert_header
            .execute(params![dataset_id, col_idx as i64, name])
            .context("failed to insert header")?;
    }

    Ok(())
}

pub fn find_dataset_id(db_path: &Path, name: &str) -> Result<Option<i64>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT id FROM dataset WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to look up dataset {name}"))
}

pub fn purge_dataset_tx(tx: &rusqlite::Transaction<'_>, dataset_id: i64) -> Result<()> {
    tx.execute("DELETE FROM record_cell WHERE dataset_id = ?1", params![dataset_id])
        .with_context(|| format!("failed to delete cells for dataset #{dataset_id}"))?;
    tx.execute(
        "DELETE FROM record_column WHERE dataset_id = ?1",
        params![dataset_id],
    )
    .with_context(|| format!("failed to delete columns for dataset #{dataset_id}"))?;
    tx.execute("DELETE FROM dataset WHERE id = ?1", params![dataset_id])
        .with_context(|| format!("failed to delete dataset #{dataset_id}"))?;
    Ok(())
}

/// Stores `rows` as dataset `name`, replacing a dataset of the same name.
pub fn create_dataset_from_rows(
    db_path: &Path,
    name: &str,
    source_path: &str,
    columns: &[String],
    rows: &[Vec<String>],
) -> Result<i64> {
    if columns.is_empty() {
        anyhow::bail!("dataset {name} needs at least one column")
    }

    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start dataset create transaction")?;

    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM dataset WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()
        .context("failed to look up existing dataset")?;
    if let Some(existing) = existing {
        purge_dataset_tx(&tx, existing)?;
    }

    tx.execute(
        "INSERT INTO dataset(name, source_path, row_count) VALUES (?1, ?2, 0)",
        params![name, source_path],
    )
    .context("failed to insert dataset")?;
    let dataset_id = tx.last_insert_rowid();

    insert_header_names(&tx, dataset_id, columns)?;

    let mut insert_cell = tx
        .prepare("INSERT INTO record_cell(dataset_id, row_idx, col_idx, value) VALUES (?1, ?2, ?3, ?4)")
        .context("failed to prepare cell insert")?;
    for (row_idx, row) in rows.iter().enumerate() {
        for col_idx in 0..columns.len() {
            let value = row.get(col_idx).map(String::as_str).unwrap_or("");
            insert_cell
                .execute(params![dataset_id, row_idx as i64, col_idx as i64, value])
                .context("failed to insert record cell")?;
        }
    }
    drop(insert_cell);

    tx.execute(
        "UPDATE dataset SET row_count = ?1 WHERE id = ?2",
        params![rows.len() as i64, dataset_id],
    )
    .context("failed to update dataset row_count")?;

    tx.commit().context("failed to commit dataset create")?;
    Ok(dataset_id)
}

fn column_position(columns: &[String], name: &str, purpose: &str) -> Result<i64> {
    columns
        .iter()
        .position(|column| column == name)
        .map(|idx| idx as i64)
        .with_context(|| format!("unknown {purpose} column: {name}"))
}

// Numeric cells sort before text and empty cells in either direction.
const NUMERIC_CELL: &str = "TRIM(sort_cell.value) GLOB '*[0-9]*' \
     AND TRIM(sort_cell.value) NOT GLOB '*[^0-9.eE+-]*'";

pub fn query_records(db_path: &Path, query: &RecordPageQuery) -> Result<RecordPage> {
    if query.limit <= 0 {
        anyhow::bail!("limit must be greater than zero")
    }

    let conn = open_connection(db_path)?;

    let mut columns_stmt = conn
        .prepare(
            "SELECT name
             FROM record_column
             WHERE dataset_id = ?1
             ORDER BY col_idx ASC",
        )
        .context("failed to prepare columns query")?;
    let columns = columns_stmt
        .query_map([query.dataset_id], |row| row.get::<_, String>(0))
        .context("failed to query columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect columns")?;
    drop(columns_stmt);

    if columns.is_empty() {
        return Ok(RecordPage {
            columns,
            rows: Vec::new(),
            total_rows: 0,
        });
    }

    let mut filter_clauses = vec!["base.dataset_id = ?".to_string()];
    let mut filter_params = vec![Value::Integer(query.dataset_id)];

    for (name, accepted) in &query.filters {
        if accepted.is_empty() {
            continue;
        }
        let col_idx = column_position(&columns, name, "filter")?;
        let placeholders = std::iter::repeat_n("?", accepted.len())
            .collect::<Vec<_>>()
            .join(",");
        filter_clauses.push(format!(
            "EXISTS (
                SELECT 1 FROM record_cell fc
                WHERE fc.dataset_id = ?
                  AND fc.row_idx = base.row_idx
                  AND fc.col_idx = ?
                  AND fc.value COLLATE NOCASE IN ({placeholders})
            )"
        ));
        filter_params.push(Value::Integer(query.dataset_id));
        filter_params.push(Value::Integer(col_idx));
        filter_params.extend(accepted.iter().cloned().map(Value::Text));
    }

    let where_sql = filter_clauses.join(" AND ");

    let count_sql = format!(
        "SELECT COUNT(*)
         FROM (
             SELECT base.row_idx
             FROM record_cell base
             WHERE {where_sql}
             GROUP BY base.row_idx
         ) filtered"
    );
    let total_rows: i64 = conn
        .query_row(
            &count_sql,
            rusqlite::params_from_iter(filter_params.iter().cloned()),
            |row| row.get(0),
        )
        .context("failed to query filtered row count")?;

    let mut row_params = Vec::<Value>::new();
    let mut row_sql = String::from("SELECT base.row_idx FROM record_cell base ");
    let sort_direction = match &query.sort {
        Some((name, direction)) => {
            let sort_col = column_position(&columns, name, "sort")?;
            row_sql.push_str(
                "LEFT JOIN record_cell sort_cell
                 ON sort_cell.dataset_id = base.dataset_id
                AND sort_cell.row_idx = base.row_idx
                AND sort_cell.col_idx = ? ",
            );
            row_params.push(Value::Integer(sort_col));
            Some(match direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            })
        }
        None => None,
    };

    row_sql.push_str(&format!(
        "WHERE {where_sql} GROUP BY base.row_idx ORDER BY "
    ));
    if let Some(direction) = sort_direction {
        row_sql.push_str(&format!(
            "CASE WHEN {NUMERIC_CELL} THEN 0 ELSE 1 END ASC, \
             CAST(sort_cell.value AS REAL) {direction}, \
             COALESCE(sort_cell.value, '') {direction}, "
        ));
    }
    row_sql.push_str("base.row_idx ASC LIMIT ? OFFSET ?");

    row_params.extend(filter_params.iter().cloned());
    row_params.push(Value::Integer(query.limit));
    row_params.push(Value::Integer(query.offset.max(0)));

    let mut row_stmt = conn
        .prepare(&row_sql)
        .context("failed to prepare page row_idx query")?;
    let row_indices = row_stmt
        .query_map(rusqlite::params_from_iter(row_params), |row| {
            row.get::<_, i64>(0)
        })
        .context("failed to query page row_idx")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect page row_idx")?;
    drop(row_stmt);

    if row_indices.is_empty() {
        return Ok(RecordPage {
            columns,
            rows: Vec::new(),
            total_rows,
        });
    }

    let placeholders = std::iter::repeat_n("?", row_indices.len())
        .collect::<Vec<_>>()
        .join(",");
    let hydrate_sql = format!(
        "SELECT row_idx, col_idx, value
         FROM record_cell
         WHERE dataset_id = ? AND row_idx IN ({placeholders})
         ORDER BY row_idx ASC, col_idx ASC"
    );
    let mut hydrate_params = vec![Value::Integer(query.dataset_id)];
    hydrate_params.extend(row_indices.iter().copied().map(Value::Integer));

    let mut rows: Vec<(i64, Vec<String>)> = row_indices
        .iter()
        .map(|&row_idx| (row_idx, vec![String::new(); columns.len()]))
        .collect();
    let row_pos: HashMap<i64, usize> = row_indices
        .iter()
        .copied()
        .enumerate()
        .map(|(idx, row_idx)| (row_idx, idx))
        .collect();

    let mut hydrate_stmt = conn
        .prepare(&hydrate_sql)
        .context("failed to prepare row hydration query")?;

    let mut hydrate_rows = hydrate_stmt
        .query(rusqlite::params_from_iter(hydrate_params))
        .context("failed to run row hydration query")?;

    while let Some(row) = hydrate_rows.next().context("failed to read hydrated row")? {
        let row_idx: i64 = row.get(0).context("failed to read row_idx")?;
        let col_idx: i64 = row.get(1).context("failed to read col_idx")?;
        let value: String = row.get(2).context("failed to read value")?;

        if let Some(dest_cell) = row_pos
            .get(&row_idx)
            .and_then(|&pos| rows.get_mut(pos))
            .and_then(|(_, values)| values.get_mut(col_idx as usize))
        {
            *dest_cell = value;
        }
    }

    Ok(RecordPage {
        columns,
        rows,
        total_rows,
    })
}
