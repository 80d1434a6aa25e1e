use std::path::Path;

use anyhow::Result;

use crate::infra::sqlite::queries::{create_dataset_from_rows, find_dataset_id};

const REGIONS: [&str; 3] = ["eu", "us", "apac"];
const STATUSES: [&str; 4] = ["pending", "approved", "pending", "declined"];
const ZIPS: [&str; 5] = ["10001", "60601", "80202", "94105", "99501"];

pub fn demo_columns() -> Vec<String> {
    [
        "col_1", "col_2", "col_3", "col_4", "amount", "phone", "created", "zip", "status",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

pub fn demo_row(id: usize) -> Vec<String> {
    vec![
        format!("row {id} col 1"),
        format!("row {id} col 2 is with heavy data for checking"),
        format!("OWNER {}", id % 7),
        REGIONS[id % REGIONS.len()].to_string(),
        format!("{:.2}", (id as f64) * 137.25),
        format!("555{:07}", id),
        format!("2024-{:02}-{:02}", id % 12 + 1, id % 28 + 1),
        ZIPS[id % ZIPS.len()].to_string(),
        STATUSES[id % STATUSES.len()].to_string(),
    ]
}

/// Creates the demo dataset unless one with that name already exists.
pub fn ensure_demo_dataset(db_path: &Path, name: &str, row_count: usize) -> Result<i64> {
    if let Some(existing) = find_dataset_id(db_path, name)? {
        return Ok(existing);
    }
    let rows: Vec<Vec<String>> = (1..=row_count).map(demo_row).collect();
    let dataset_id = create_dataset_from_rows(db_path, name, "demo", &demo_columns(), &rows)?;
    log::info!("seeded demo dataset {name} with {row_count} rows");
    Ok(dataset_id)
}
