use dioxus::prelude::*;

use crate::domain::selection::SelectIndicator;

#[component]
pub fn TableRowSelect(indicator: SelectIndicator, on_select: EventHandler<()>) -> Element {
    let border = if indicator.disabled { "#ccc" } else { "#888" };
    let background = if indicator.check_mark && !indicator.disabled {
        "#eef4ff"
    } else {
        "#fff"
    };
    let cursor = if indicator.disabled { "not-allowed" } else { "pointer" };

    rsx! {
        div {
            class: "table-body-row-cell-checkbox-wrapper",
            style: "width: 16px; height: 16px; border: 1px solid {border}; background: {background}; cursor: {cursor}; display: flex; align-items: center; justify-content: center; font-size: 12px;",
            onclick: move |_| {
                if !indicator.disabled {
                    on_select.call(());
                }
            },
            if indicator.check_mark {
                span { "✓" }
            }
            if indicator.cross_mark {
                span { "✕" }
            }
        }
    }
}
