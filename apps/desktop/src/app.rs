//! Root application component: hero, search, trending strip, movie grid.

use dioxus::prelude::*;
use moviescope_core::debounce::DebounceGate;
use moviescope_core::view::project;
use moviescope_core::SearchController;
use tracing::info;

use crate::movies::{AllMovies, TrendingStrip};
use crate::search::SearchInput;
use crate::state::*;

static MAIN_CSS: Asset = asset!("/assets/main.css");
static LOGO: Asset = asset!("/assets/logo.svg");
static HERO: Asset = asset!("/assets/hero.svg");

#[component]
pub fn App() -> Element {
    use_hook(|| {
        let config = crate::INITIAL_CONFIG.lock().ok().and_then(|mut c| c.take());
        if let Some(config) = config {
            *IMAGE_BASE.write() = config.image_base_url.clone();
            *DEBOUNCE.write() = DebounceGate::new(config.debounce);
            let ctl = SearchController::from_config(&config);
            info!(trending = ctl.has_trending(), "Search session ready");
            *CONTROLLER.write() = Some(ctl);
        }
    });

    // Mirror the session into PAGE, then run the initial loads.
    use_future(|| async move {
        let Some(ctl) = controller() else {
            return;
        };
        let mut changes = ctl.subscribe();

        spawn({
            let ctl = ctl.clone();
            async move {
                ctl.load_trending().await;
            }
        });
        spawn({
            let ctl = ctl.clone();
            async move {
                ctl.search("").await;
            }
        });

        loop {
            let page = project(&ctl.snapshot(), &IMAGE_BASE.read());
            *PAGE.write() = page;
            if changes.changed().await.is_err() {
                break;
            }
        }
    });

    rsx! {
        document::Stylesheet { href: MAIN_CSS }

        main {
            div { class: "pattern" }

            div {
                class: "wrapper",

                header {
                    img { class: "logo", src: LOGO, alt: "logo" }
                    img { class: "hero", src: HERO, alt: "Hero Banner" }
                    h1 {
                        "Find "
                        span { class: "text-gradient", "Movies" }
                        " You'll Enjoy Without the Hassle"
                    }
                    SearchInput {}
                }

                TrendingStrip {}
                AllMovies {}
            }
        }
    }
}
