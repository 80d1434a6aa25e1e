use std::path::Path;

pub mod csv;
pub mod xlsx;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub dataset_id: i64,
    pub dataset_name: String,
    pub row_count: i64,
}

/// Dataset name for an imported file: the explicit name, else the file stem.
pub fn dataset_name_for(path: &Path, explicit: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            path.file_stem()
                .and_then(|name| name.to_str())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or("dataset")
        .to_string()
}
