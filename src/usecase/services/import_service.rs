use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::infra::import::csv::import_csv_records;
use crate::infra::import::xlsx::import_xlsx_records;
use crate::infra::import::ImportResult;

pub struct ImportService {
    db_path: PathBuf,
}

impl ImportService {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Imports a CSV or XLSX file into the record store, picking the reader
    /// from the file extension.
    pub fn import_file(&self, path: &Path, dataset_name: Option<&str>) -> Result<ImportResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xls" | "xlsm" | "ods" => {
                import_xlsx_records(&self.db_path, path, dataset_name)
            }
            "csv" => import_csv_records(&self.db_path, path, dataset_name),
            other => anyhow::bail!("unsupported file type: {other:?}"),
        }
    }
}
