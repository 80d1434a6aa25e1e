use serde_json::Value;

use crate::config::{DashboardUiConfig, FilterUrlConfig};
use crate::domain::entities::filter::FilterField;
use crate::domain::entities::record::PageResult;
use crate::domain::entities::sort::OrderBy;

/// Shared grid state. Only [`GridStore::dispatch`] mutates it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridStore {
    pub ui: DashboardUiConfig,
    pub error_msg: String,
    pub data: PageResult,
    pub filter_url: Option<FilterUrlConfig>,
    pub filters: Vec<FilterField>,
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    SetUiConfig(DashboardUiConfig),
    SetErrorMessage(String),
    SetFilterUrl(FilterUrlConfig),
    SetFilters(Vec<FilterField>),
    SetFilterValue { field_name: String, value: Value },
    SetOrderBy(Option<OrderBy>),
    ResetData,
    SetData(PageResult),
    AppendData(PageResult),
}

impl StoreAction {
    fn name(&self) -> &'static str {
        match self {
            StoreAction::SetUiConfig(_) => "set_ui_config",
            StoreAction::SetErrorMessage(_) => "set_error_message",
            StoreAction::SetFilterUrl(_) => "set_filter_url",
            StoreAction::SetFilters(_) => "set_filters",
            StoreAction::SetFilterValue { .. } => "set_filter_value",
            StoreAction::SetOrderBy(_) => "set_order_by",
            StoreAction::ResetData => "reset_data",
            StoreAction::SetData(_) => "set_data",
            StoreAction::AppendData(_) => "append_data",
        }
    }
}

impl GridStore {
    pub fn dispatch(&mut self, action: StoreAction) {
        log::trace!("store action: {}", action.name());
        match action {
            StoreAction::SetUiConfig(ui) => self.ui = ui,
            StoreAction::SetErrorMessage(message) => self.error_msg = message,
            StoreAction::SetFilterUrl(filter_url) => self.filter_url = Some(filter_url),
            StoreAction::SetFilters(filters) => self.filters = filters,
            StoreAction::SetFilterValue { field_name, value } => {
                match self
                    .filters
                    .iter_mut()
                    .find(|field| field.field_name == field_name)
                {
                    Some(field) => field.value = value,
                    None => log::warn!("ignoring value for unknown filter field {field_name}"),
                }
            }
            StoreAction::SetOrderBy(order_by) => self.order_by = order_by,
            StoreAction::ResetData => self.data = PageResult::default(),
            StoreAction::SetData(page) => self.data = page,
            StoreAction::AppendData(page) => self.data.append(page),
        }
    }
}
