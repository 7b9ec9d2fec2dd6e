//! Rendering as a pure projection of [`UiState`].
//!
//! Front-ends (terminal, HTTP, desktop) all draw from a [`PageView`], so the
//! spinner / error / list precedence and the display fallbacks live in one
//! place.

use std::fmt;

use serde::Serialize;

use crate::session::UiState;
use crate::types::{Movie, TrendingMovie};

/// One card in the movie grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub id: u64,
    pub title: String,
    pub rating: String,
    pub year: String,
    pub language: String,
    pub poster_url: String,
}

impl MovieCard {
    pub fn from_movie(movie: &Movie, image_base: &str) -> Self {
        Self {
            id: movie.id,
            title: movie.display_title().to_string(),
            rating: movie.rating_label(),
            year: movie.year_label().to_string(),
            language: movie.language_label().to_string(),
            poster_url: movie.poster_url(image_base),
        }
    }
}

/// The movie section: spinner wins over error, error wins over the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResultsView {
    Loading,
    Error(String),
    Movies(Vec<MovieCard>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub input: String,
    /// Empty when the trending section should be omitted.
    pub trending: Vec<TrendingMovie>,
    pub results: ResultsView,
}

pub fn project(state: &UiState, image_base: &str) -> PageView {
    let results = if state.loading {
        ResultsView::Loading
    } else if let Some(message) = state.error.as_ref().filter(|m| !m.is_empty()) {
        ResultsView::Error(message.clone())
    } else {
        ResultsView::Movies(
            state.movies.iter().map(|m| MovieCard::from_movie(m, image_base)).collect(),
        )
    };

    PageView { input: state.input.clone(), trending: state.trending.clone(), results }
}

// ---------------------------------------------------------------------------
// Plain-text rendering
// ---------------------------------------------------------------------------

impl fmt::Display for MovieCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<48} \u{2605} {:>4}  {:<3}  {}",
            self.title, self.rating, self.language, self.year
        )
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.trending.is_empty() {
            writeln!(f, "Trending Movies")?;
            for item in &self.trending {
                writeln!(
                    f,
                    "  {:>2}. {:<40} ({} searches for \"{}\")",
                    item.rank, item.title, item.count, item.search_term
                )?;
            }
            writeln!(f)?;
        }

        writeln!(f, "All Movies")?;
        match &self.results {
            ResultsView::Loading => writeln!(f, "  Loading...")?,
            ResultsView::Error(message) => writeln!(f, "  {message}")?,
            ResultsView::Movies(cards) if cards.is_empty() => writeln!(f, "  No movies found.")?,
            ResultsView::Movies(cards) => {
                for card in cards {
                    writeln!(f, "  {card}")?;
                }
            }
        }
        Ok(())
    }
}
