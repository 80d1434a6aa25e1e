use dioxus::prelude::*;

use crate::domain::sort_cycle::SortIcon;
use crate::ui::components::{spawn_reload, width_style, GridServices};
use crate::ui::state::view::HeaderView;
use crate::usecase::services::grid_service::GridSession;

fn sort_glyph(icon: SortIcon) -> &'static str {
    match icon {
        SortIcon::None => "",
        SortIcon::Down => "▼",
        SortIcon::Up => "▲",
    }
}

#[component]
pub fn TableHeadCell(mut session: Signal<GridSession>, header: HeaderView) -> Element {
    let services = use_context::<GridServices>();
    let cursor = if header.sortable { "pointer" } else { "default" };
    let column_idx = header.index;

    rsx! {
        div {
            class: "table-head-cell",
            style: "{width_style(header.width)} padding: 6px 8px; font-weight: 600; cursor: {cursor}; user-select: none;",
            onclick: move |evt| {
                evt.prevent_default();
                let pending = session.write().click_header(column_idx);
                if let Some(pending) = pending {
                    spawn_reload(session, services.clone(), pending);
                }
            },
            "{header.title}"
            span { style: "margin-left: 4px; font-size: 10px;", "{sort_glyph(header.icon)}" }
        }
    }
}
