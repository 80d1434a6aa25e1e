use std::rc::Rc;

use dioxus::prelude::*;

use crate::domain::layout::ScrollMetrics;
use crate::ui::components::cell::TableCellNonEditable;
use crate::ui::components::head_cell::TableHeadCell;
use crate::ui::components::loading::LoadingView;
use crate::ui::components::no_data::TableNoData;
use crate::ui::components::row_select::TableRowSelect;
use crate::ui::components::{spawn_next_page, width_style, GridServices};
use crate::ui::state::view::{header_views, row_views, selection_column_width};
use crate::usecase::services::grid_service::{BodyView, GridSession};

async fn measure(element: &MountedData) -> Option<ScrollMetrics> {
    let offset = element.get_scroll_offset().await.ok()?;
    let size = element.get_scroll_size().await.ok()?;
    let rect = element.get_client_rect().await.ok()?;
    Some(ScrollMetrics {
        scroll_top: offset.y,
        client_height: rect.size.height,
        scroll_height: size.height,
    })
}

#[component]
pub fn TableGrid(mut session: Signal<GridSession>) -> Element {
    let services = use_context::<GridServices>();
    let mut wrapper = use_signal(|| None::<Rc<MountedData>>);

    let (min_width, headers, rows, select_width, body, lazy_loader) = {
        let snapshot = session.read();
        (
            snapshot.table().min_width,
            header_views(&snapshot),
            row_views(&snapshot),
            selection_column_width(&snapshot),
            snapshot.body_view(),
            snapshot.show_lazy_loader(),
        )
    };

    rsx! {
        div { class: "table-container", style: "flex: 1; min-height: 0; display: flex; flex-direction: column;",
            div {
                class: "table-wrapper",
                style: "min-width: {min_width}px; flex: 1; overflow: auto; position: relative;",
                onmounted: move |evt| wrapper.set(Some(evt.data())),
                onscroll: move |_| {
                    let Some(element) = wrapper() else {
                        return;
                    };
                    let services = services.clone();
                    spawn(async move {
                        let Some(metrics) = measure(&element).await else {
                            log::warn!("could not read scroll position of the grid");
                            return;
                        };
                        let pending = session.write().on_scroll(metrics);
                        if let Some(pending) = pending {
                            spawn_next_page(session, services, pending);
                        }
                    });
                },
                if body == BodyView::Loading {
                    div {
                        class: "table-main-loader",
                        style: "position: absolute; inset: 0; display: flex; justify-content: center; align-items: center; background: rgba(255,255,255,0.7); z-index: 2;",
                        LoadingView {}
                    }
                }
                div {
                    class: "table-head-wrapper",
                    style: "display: flex; position: sticky; top: 0; background: #f6f6f6; border-bottom: 1px solid #ccc; z-index: 1;",
                    if let Some(width) = select_width {
                        div { class: "table-head-cell", style: "{width_style(width)}" }
                    }
                    for header in headers {
                        TableHeadCell { key: "{header.title}", session, header: header.clone() }
                    }
                }
                div { class: "table-body-wrapper",
                    {match body {
                        BodyView::Loading => rsx! {},
                        BodyView::NoData => rsx! { TableNoData {} },
                        BodyView::Rows => rsx! {
                            for row in rows {
                                div {
                                    key: "{row.index}",
                                    class: "table-body-row",
                                    style: "display: flex; border-bottom: 1px solid #eee;",
                                    if let (Some(indicator), Some(width)) = (row.select, select_width) {
                                        div { class: "table-body-row-cell", style: "{width_style(width)} padding: 4px 8px;",
                                            TableRowSelect {
                                                indicator,
                                                on_select: move |_| {
                                                    session.write().toggle_row(row.index);
                                                },
                                            }
                                        }
                                    }
                                    for cell in row.cells.iter().cloned() {
                                        TableCellNonEditable { key: "{cell.key}", view: cell }
                                    }
                                }
                            }
                        },
                    }}
                    if lazy_loader {
                        div { class: "table-body-lazy-loading-wrapper", LoadingView {} }
                    }
                }
            }
        }
    }
}
