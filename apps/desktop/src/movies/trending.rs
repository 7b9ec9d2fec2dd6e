//! Most searched terms, with a button to refresh them.

use dioxus::prelude::*;

use super::poster_src;
use crate::state::*;

#[component]
pub fn TrendingStrip() -> Element {
    let page = PAGE.read();
    if page.trending.is_empty() {
        return rsx! {};
    }

    rsx! {
        section {
            class: "trending",
            h2 { "Trending Movies" }

            ul {
                for item in page.trending.iter() {
                    li {
                        key: "{item.record_id}",
                        p { "{item.rank}" }
                        img { src: poster_src(&item.poster_url), alt: "{item.title}" }
                    }
                }
            }

            button {
                class: "load-more",
                onclick: move |_| {
                    if let Some(ctl) = controller() {
                        spawn(async move {
                            ctl.load_trending().await;
                        });
                    }
                },
                "Load More"
            }
        }
    }
}
