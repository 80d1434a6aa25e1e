use dioxus::prelude::*;

#[component]
pub fn LoadingView() -> Element {
    rsx! {
        div {
            class: "loading-view",
            style: "display: flex; justify-content: center; align-items: center; padding: 16px; color: #666;",
            span { style: "display: inline-block; animation: spin 1s linear infinite;", "⟳" }
            span { style: "margin-left: 8px;", "Loading…" }
        }
    }
}
