use crate::domain::entities::filter::FilterField;
use crate::usecase::ports::errors::CacheError;

/// Most-recently-used filter values, namespaced by dashboard type.
pub trait FilterCache: Send + Sync {
    fn most_recent_filters(&self, dashboard_type: &str) -> Result<Vec<FilterField>, CacheError>;
    fn clear_recent_state(&self, dashboard_type: &str) -> Result<(), CacheError>;
    fn store_filter_state(
        &self,
        dashboard_type: &str,
        filters: &[FilterField],
    ) -> Result<(), CacheError>;
}
