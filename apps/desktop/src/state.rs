//! Global application state using Dioxus signals.

use dioxus::prelude::*;
use moviescope_core::debounce::DebounceGate;
use moviescope_core::view::{PageView, ResultsView};
use moviescope_core::SearchController;

// ---------------------------------------------------------------------------
// Global signals
// ---------------------------------------------------------------------------

/// Search session, set once at startup
pub static CONTROLLER: GlobalSignal<Option<SearchController>> = Signal::global(|| None);

/// Base URL for poster images
pub static IMAGE_BASE: GlobalSignal<String> = Signal::global(String::new);

/// Text in the search box
pub static INPUT: GlobalSignal<String> = Signal::global(String::new);

/// Debounce shared by all keystrokes; replaced at startup with the configured interval
pub static DEBOUNCE: GlobalSignal<DebounceGate> = Signal::global(DebounceGate::default);

/// Latest projection of the session state, refreshed on every change
pub static PAGE: GlobalSignal<PageView> = Signal::global(|| PageView {
    input: String::new(),
    trending: Vec::new(),
    results: ResultsView::Loading,
});

pub fn controller() -> Option<SearchController> {
    CONTROLLER.read().clone()
}
