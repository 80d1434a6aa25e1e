/// Failure of the record source. Carries the user-facing message the caller
/// configured, plus what actually went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{message}")]
    Source { message: String, detail: String },

    #[error("invalid continuation link: {0}")]
    InvalidLink(String),

    #[error("page size must be greater than zero: {0}")]
    InvalidPageSize(i64),
}

impl FetchError {
    pub fn from_source(message: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        FetchError::Source {
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("filter cache: {0}")]
pub struct CacheError(pub String);
