use dioxus::prelude::*;

pub const NO_DATA_LABEL: &str = "No data found";

#[component]
pub fn TableNoData() -> Element {
    rsx! {
        div {
            class: "table-body-no-data",
            style: "display: flex; flex-direction: column; align-items: center; padding: 48px; color: #999;",
            span { style: "font-size: 32px;", "∅" }
            div { "{NO_DATA_LABEL}" }
        }
    }
}
