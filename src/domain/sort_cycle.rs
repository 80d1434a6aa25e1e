use crate::domain::entities::column::ColumnDescriptor;
use crate::domain::entities::sort::{OrderBy, SortDirection};

/// Sort arrow currently shown on a header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortIcon {
    #[default]
    None,
    Down,
    Up,
}

/// Per-column sort cycle: none -> desc -> asc -> none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCycle {
    field: String,
    sortable: bool,
    icon: SortIcon,
}

impl SortCycle {
    pub fn new(field: impl Into<String>, sortable: bool) -> Self {
        Self {
            field: field.into(),
            sortable,
            icon: SortIcon::None,
        }
    }

    pub fn for_column(column: &ColumnDescriptor) -> Self {
        Self::new(column.sort_field(), column.sortable)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn icon(&self) -> SortIcon {
        self.icon
    }

    /// Advances the cycle. Returns the new global sort state to apply, or
    /// `None` when the click is ignored (column not sortable, or a fetch in
    /// progress). `Some(None)` clears the sort.
    pub fn click(&mut self, fetch_in_progress: bool) -> Option<Option<OrderBy>> {
        if !self.sortable || fetch_in_progress {
            return None;
        }

        let (icon, order_by) = match self.icon {
            SortIcon::None => (
                SortIcon::Down,
                Some(OrderBy::new(self.field.clone(), SortDirection::Desc)),
            ),
            SortIcon::Down => (
                SortIcon::Up,
                Some(OrderBy::new(self.field.clone(), SortDirection::Asc)),
            ),
            SortIcon::Up => (SortIcon::None, None),
        };
        self.icon = icon;
        Some(order_by)
    }

    /// Reconciles with a change of the global sort state. Returns true when
    /// this column is responsible for reloading the grid.
    pub fn observe(&mut self, previous: Option<&OrderBy>, current: Option<&OrderBy>) -> bool {
        let owns_current = current.is_some_and(|order_by| order_by.field_name == self.field);
        if !owns_current {
            self.icon = SortIcon::None;
        }

        if owns_current && previous != current {
            return true;
        }

        let cleared_from_here = current.is_none()
            && previous.is_some_and(|order_by| {
                order_by.field_name == self.field && order_by.direction == SortDirection::Asc
            });
        cleared_from_here
    }
}
