use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::infra::import::{dataset_name_for, ImportResult};
use crate::infra::sqlite::queries::create_dataset_from_rows;

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Imports the first worksheet; its first row holds the column names.
pub fn import_xlsx_records(
    db_path: &Path,
    xlsx_path: &Path,
    dataset_name: Option<&str>,
) -> Result<ImportResult> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("workbook has no sheets: {}", xlsx_path.display()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("failed to read sheet: {sheet}"))?;

    let mut sheet_rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let headers: Vec<String> = sheet_rows
        .next()
        .context("sheet header row is required")?
        .into_iter()
        .map(|header| header.trim().to_string())
        .collect();
    let rows: Vec<Vec<String>> = sheet_rows
        .filter(|row| row.iter().any(|value| !value.trim().is_empty()))
        .collect();

    let name = dataset_name_for(xlsx_path, dataset_name);
    let source_path = xlsx_path.to_string_lossy().into_owned();
    let dataset_id = create_dataset_from_rows(db_path, &name, &source_path, &headers, &rows)?;
    log::info!(
        "imported {} rows from sheet {sheet} of {} as {name}",
        rows.len(),
        xlsx_path.display()
    );

    Ok(ImportResult {
        dataset_id,
        dataset_name: name,
        row_count: rows.len() as i64,
    })
}
