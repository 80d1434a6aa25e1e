use dioxus::prelude::*;

use crate::ui::components::width_style;
use crate::ui::state::view::CellView;

pub(crate) fn copy_script(text: &str) -> String {
    let literal = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    format!("await navigator.clipboard.writeText({literal}); return true;")
}

#[component]
pub fn TableCellNonEditable(view: CellView) -> Element {
    let title = view.title.clone().unwrap_or_default();
    let copy_text = view.text.clone();

    rsx! {
        div {
            class: "table-body-row-cell",
            style: "{width_style(view.width)} padding: 4px 8px; white-space: nowrap; overflow: hidden; text-overflow: ellipsis;",
            if view.copyable {
                span {
                    class: "table-body-row-cell-copy-wrapper",
                    title: "{title}",
                    style: "cursor: pointer; margin-right: 4px;",
                    onclick: move |_| {
                        let script = copy_script(&copy_text);
                        spawn(async move {
                            if let Err(err) = document::eval(&script).await {
                                log::warn!("copy to clipboard failed: {err}");
                            }
                        });
                    },
                    "⧉"
                }
            }
            if let Some(icon) = view.prefix_icon.clone() {
                span { class: "table-body-row-cell-prefix-icon icon-{icon}", style: "margin-right: 4px;", "•" }
            }
            span {
                class: "table-body-row-cell-value",
                title: "{title}",
                "{view.text}"
            }
            if let Some(icon) = view.suffix_icon.clone() {
                span { class: "table-body-row-cell-suffix-icon icon-{icon}", style: "margin-left: 4px;", "•" }
            }
        }
    }
}
