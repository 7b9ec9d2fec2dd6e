//! Movie grid and trending strip.

mod movie_card;
mod trending;

use dioxus::prelude::*;
use moviescope_core::view::ResultsView;

use crate::state::*;
use movie_card::MovieCard;
pub use trending::TrendingStrip;

/// Poster shown when a movie or trending entry has none.
pub(crate) static NO_MOVIE: Asset = asset!("/assets/no-movie.svg");

/// Resolve the fallback poster path to the bundled asset.
pub(crate) fn poster_src(url: &str) -> String {
    if url == moviescope_core::types::FALLBACK_POSTER {
        NO_MOVIE.to_string()
    } else {
        url.to_string()
    }
}

#[component]
pub fn AllMovies() -> Element {
    let page = PAGE.read();

    rsx! {
        section {
            class: "all-movies",
            h2 { "All Movies" }

            match &page.results {
                ResultsView::Loading => rsx! { Spinner {} },
                ResultsView::Error(message) => rsx! {
                    p { class: "error", "{message}" }
                },
                ResultsView::Movies(cards) if cards.is_empty() => rsx! {
                    p { class: "empty", "No movies found." }
                },
                ResultsView::Movies(cards) => rsx! {
                    ul {
                        for card in cards.iter() {
                            MovieCard { key: "{card.id}", card: card.clone() }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn Spinner() -> Element {
    rsx! {
        div {
            role: "status",
            class: "spinner",
            span { class: "sr-only", "Loading..." }
        }
    }
}
