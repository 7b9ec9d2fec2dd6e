use dioxus::prelude::*;
use moviescope_core::view;

use super::poster_src;

static STAR: Asset = asset!("/assets/star.svg");

#[component]
pub fn MovieCard(card: view::MovieCard) -> Element {
    let poster = poster_src(&card.poster_url);

    rsx! {
        li {
            class: "movie-card",
            img { src: "{poster}", alt: "{card.title}" }

            div {
                class: "mt-4",
                h3 { "{card.title}" }

                div {
                    class: "content",
                    div {
                        class: "rating",
                        img { src: STAR, alt: "Star Icon" }
                        p { "{card.rating}" }
                    }
                    span { "\u{2022}" }
                    p { class: "lang", "{card.language}" }
                    span { "\u{2022}" }
                    p { class: "year", "{card.year}" }
                }
            }
        }
    }
}
