//! Search field with debounced search.

use dioxus::prelude::*;

use crate::state::*;

/// Record the new text and search for it once typing pauses. Every call
/// supersedes the ones still waiting.
fn update_query(value: String) {
    *INPUT.write() = value.clone();
    let Some(ctl) = controller() else {
        return;
    };
    ctl.set_input(&value);

    let settled = DEBOUNCE.read().settle();
    spawn(async move {
        if settled.await {
            ctl.search(&value).await;
        }
    });
}

#[component]
pub fn SearchInput() -> Element {
    let input = INPUT.read();
    let has_query = !input.is_empty();

    rsx! {
        div {
            class: "search",
            div {
                // Search icon
                svg {
                    class: "search-icon",
                    width: "20",
                    height: "20",
                    view_box: "0 0 24 24",
                    fill: "none",
                    stroke: "currentColor",
                    stroke_width: "2",
                    circle { cx: "11", cy: "11", r: "8" }
                    line { x1: "21", y1: "21", x2: "16.65", y2: "16.65" }
                }

                input {
                    r#type: "text",
                    placeholder: "Search through thousands of movies",
                    value: "{input}",
                    autofocus: true,
                    oninput: move |e: Event<FormData>| update_query(e.value()),
                }

                if has_query {
                    button {
                        class: "search-clear",
                        onclick: move |_| update_query(String::new()),
                        "\u{00D7}"
                    }
                }
            }
        }
    }
}
