use std::path::Path;

use anyhow::{Context, Result};

use crate::infra::import::{dataset_name_for, ImportResult};
use crate::infra::sqlite::queries::create_dataset_from_rows;

pub fn import_csv_records(
    db_path: &Path,
    csv_path: &Path,
    dataset_name: Option<&str>,
) -> Result<ImportResult> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let name = dataset_name_for(csv_path, dataset_name);
    let source_path = csv_path.to_string_lossy().into_owned();
    let dataset_id = create_dataset_from_rows(db_path, &name, &source_path, &headers, &rows)?;
    log::info!("imported {} rows from {} as {name}", rows.len(), csv_path.display());

    Ok(ImportResult {
        dataset_id,
        dataset_name: name,
        row_count: rows.len() as i64,
    })
}
