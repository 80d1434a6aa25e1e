use crate::domain::entities::column::ColumnDescriptor;
use crate::domain::entities::record::RowRecord;
use crate::domain::format::{format_cell, DASH};
use crate::domain::layout::column_width;
use crate::domain::selection::SelectIndicator;
use crate::domain::sort_cycle::SortIcon;
use crate::usecase::services::grid_service::GridSession;

/// Display data of one body cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub key: String,
    pub text: String,
    pub width: f64,
    /// Tooltip text; only set for real values.
    pub title: Option<String>,
    pub copyable: bool,
    pub prefix_icon: Option<String>,
    pub suffix_icon: Option<String>,
}

impl CellView {
    pub fn new(record: &RowRecord, column: &ColumnDescriptor, min_width: f64) -> Self {
        let text = format_cell(record.get(&column.data_column), column);
        let has_value = text != DASH;
        Self {
            key: format!("{}_{}", record.id, column.data_column),
            width: column_width(min_width, column.width),
            title: has_value.then(|| text.clone()),
            copyable: has_value && column.copyable,
            prefix_icon: column.prefix_icon.clone().filter(|_| has_value),
            suffix_icon: column.suffix_icon.clone().filter(|_| has_value),
            text,
        }
    }

    pub fn has_value(&self) -> bool {
        self.title.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub index: usize,
    /// Present when the grid has row selection switched on.
    pub select: Option<SelectIndicator>,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub index: usize,
    pub title: String,
    pub width: f64,
    pub sortable: bool,
    pub icon: SortIcon,
}

pub fn header_views(session: &GridSession) -> Vec<HeaderView> {
    let table = session.table();
    table
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| HeaderView {
            index,
            title: column.title.clone(),
            width: column_width(table.min_width, column.width),
            sortable: column.sortable,
            icon: session.sort_icon(index),
        })
        .collect()
}

pub fn selection_column_width(session: &GridSession) -> Option<f64> {
    let table = session.table();
    table
        .selection()
        .map(|config| column_width(table.min_width, config.width))
}

pub fn row_views(session: &GridSession) -> Vec<RowView> {
    let table = session.table();
    let selectable = table.selection().is_some();
    session
        .items()
        .iter()
        .enumerate()
        .map(|(index, record)| RowView {
            index,
            select: selectable.then(|| session.select_indicator(index)),
            cells: table
                .columns
                .iter()
                .map(|column| CellView::new(record, column, table.min_width))
                .collect(),
        })
        .collect()
}
