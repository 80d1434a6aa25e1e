use crate::domain::entities::filter::SanitizedFilter;
use crate::domain::entities::record::PageResult;
use crate::domain::entities::sort::OrderBy;
use crate::usecase::ports::errors::FetchError;

/// First-page request built from the active filters and sort.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    pub url: String,
    pub filter: SanitizedFilter,
    pub error_message: String,
    pub page_size: i64,
    pub order_by: Option<OrderBy>,
}

/// Request for the page behind a continuation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPageQuery {
    pub href: String,
    pub error_message: String,
    pub page_size: i64,
}

pub trait RecordSource: Send + Sync {
    fn fetch_records(&self, query: &RecordQuery) -> Result<PageResult, FetchError>;
    fn fetch_next(&self, query: &NextPageQuery) -> Result<PageResult, FetchError>;
}
