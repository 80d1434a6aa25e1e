use std::path::PathBuf;

use anyhow::Result;
use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::domain::entities::filter::SanitizedFilter;
use crate::domain::entities::record::{Link, PageResult, RowRecord};
use crate::domain::entities::sort::{OrderBy, SortDirection};
use crate::infra::sqlite::queries::{find_dataset_id, query_records, RecordPageQuery};
use crate::usecase::ports::errors::FetchError;
use crate::usecase::ports::records::{NextPageQuery, RecordQuery, RecordSource};

pub const LINK_SCHEME: &str = "lazygrid";
const LINK_HOST: &str = "records";
const FILTER_PREFIX: &str = "filter.";

/// Position inside a filtered, sorted dataset. Serialised into the
/// continuation links handed to the grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordCursor {
    pub dataset: String,
    pub offset: i64,
    pub filters: Vec<(String, Vec<String>)>,
    pub sort: Option<(String, SortDirection)>,
}

impl RecordCursor {
    pub fn parse(href: &str) -> Result<Self, FetchError> {
        let url = Url::parse(href).map_err(|_| FetchError::InvalidLink(href.to_string()))?;
        if url.scheme() != LINK_SCHEME || url.host_str() != Some(LINK_HOST) {
            return Err(FetchError::InvalidLink(href.to_string()));
        }

        let mut cursor = RecordCursor::default();
        let mut sort_field = None;
        let mut sort_dir = SortDirection::Asc;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "dataset" => cursor.dataset = value.into_owned(),
                "offset" => {
                    cursor.offset = value
                        .parse()
                        .map_err(|_| FetchError::InvalidLink(href.to_string()))?
                }
                "sort" => sort_field = Some(value.into_owned()),
                "dir" => {
                    sort_dir = SortDirection::parse(&value)
                        .ok_or_else(|| FetchError::InvalidLink(href.to_string()))?
                }
                other => {
                    if let Some(name) = other.strip_prefix(FILTER_PREFIX) {
                        cursor.push_filter(name, value.into_owned());
                    }
                }
            }
        }

        if cursor.dataset.is_empty() {
            return Err(FetchError::InvalidLink(href.to_string()));
        }
        cursor.sort = sort_field.map(|field| (field, sort_dir));
        Ok(cursor)
    }

    fn push_filter(&mut self, name: &str, value: String) {
        match self.filters.iter_mut().find(|(field, _)| field == name) {
            Some((_, values)) => values.push(value),
            None => self.filters.push((name.to_string(), vec![value])),
        }
    }

    pub fn to_href(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("dataset", &self.dataset);
        query.append_pair("offset", &self.offset.to_string());
        if let Some((field, direction)) = &self.sort {
            query.append_pair("sort", field);
            query.append_pair("dir", direction.as_str());
        }
        for (name, values) in &self.filters {
            for value in values {
                query.append_pair(&format!("{FILTER_PREFIX}{name}"), value);
            }
        }
        format!("{LINK_SCHEME}://{LINK_HOST}?{}", query.finish())
    }

    /// Replaces filters and sort with the grid's current criteria and
    /// restarts at the first record.
    pub fn with_criteria(
        mut self,
        filter: &SanitizedFilter,
        order_by: Option<&OrderBy>,
    ) -> Self {
        self.offset = 0;
        self.filters = filter
            .iter()
            .map(|(name, value)| (name.clone(), filter_values(value)))
            .collect();
        self.sort = order_by.map(|order_by| (order_by.field_name.clone(), order_by.direction));
        self
    }
}

fn filter_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(filter_values).collect(),
        Value::String(text) => vec![text.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Record source backed by the local SQLite store.
pub struct SqliteRecordStore {
    pub db_path: PathBuf,
}

impl SqliteRecordStore {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    fn load_page(&self, cursor: &RecordCursor, page_size: i64) -> Result<PageResult> {
        let dataset_id = find_dataset_id(&self.db_path, &cursor.dataset)?
            .ok_or_else(|| anyhow::anyhow!("unknown dataset: {}", cursor.dataset))?;

        let page = query_records(
            &self.db_path,
            &RecordPageQuery {
                dataset_id,
                offset: cursor.offset,
                limit: page_size,
                filters: cursor.filters.clone(),
                sort: cursor.sort.clone(),
            },
        )?;

        let next_offset = cursor.offset.max(0) + page.rows.len() as i64;
        let has_more = next_offset < page.total_rows;
        let self_link = Link {
            rel: "self".to_string(),
            href: cursor.to_href(),
        };
        let mut links = vec![self_link];
        if has_more {
            let next = RecordCursor {
                offset: next_offset,
                ..cursor.clone()
            };
            links.push(Link::next(next.to_href()));
        }

        let items = page
            .rows
            .into_iter()
            .map(|(row_idx, values)| RowRecord {
                id: row_idx.to_string(),
                values: page
                    .columns
                    .iter()
                    .cloned()
                    .zip(values.into_iter().map(Value::String))
                    .collect(),
            })
            .collect();

        Ok(PageResult {
            items,
            links,
            has_more,
        })
    }

    fn fetch(
        &self,
        cursor: &RecordCursor,
        page_size: i64,
        error_message: &str,
    ) -> Result<PageResult, FetchError> {
        if page_size <= 0 {
            return Err(FetchError::InvalidPageSize(page_size));
        }
        self.load_page(cursor, page_size)
            .map_err(|err| FetchError::from_source(error_message, format!("{err:#}")))
    }
}

impl RecordSource for SqliteRecordStore {
    fn fetch_records(&self, query: &RecordQuery) -> Result<PageResult, FetchError> {
        let cursor = RecordCursor::parse(&query.url)?
            .with_criteria(&query.filter, query.order_by.as_ref());
        log::debug!("fetching records {}", cursor.to_href());
        self.fetch(&cursor, query.page_size, &query.error_message)
    }

    fn fetch_next(&self, query: &NextPageQuery) -> Result<PageResult, FetchError> {
        let cursor = RecordCursor::parse(&query.href)?;
        log::debug!("fetching next records at offset {}", cursor.offset);
        self.fetch(&cursor, query.page_size, &query.error_message)
    }
}
